/// Buffer layout engine.
///
/// A BufferLayout is an ordered list of named typed fields. Offsets are
/// assigned by a single linear pass over declaration order with flat
/// packing (no alignment padding): each field starts where the previous
/// one ends, and the stride is the total byte size.
///
/// Shaders consuming these buffers must declare matching flat layouts
/// (or pad explicitly with extra fields, as the presets do).

use crate::engine_contract;
use crate::error::Result;

const SOURCE: &str = "galaxy3d::BufferLayout";

// ===== FIELD TYPE =====

/// Data type of a layout field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    UInt,
    /// Stored as a 32-bit value, matching the shader-side boolean
    Bool,
}

impl FieldType {
    /// Byte width of one element
    pub fn component_size(&self) -> u32 {
        match self {
            FieldType::Float => 4,
            FieldType::Float2 => 8,
            FieldType::Float3 => 12,
            FieldType::Float4 => 16,
            FieldType::Mat3 => 36,
            FieldType::Mat4 => 64,
            FieldType::Int => 4,
            FieldType::Int2 => 8,
            FieldType::Int3 => 12,
            FieldType::Int4 => 16,
            FieldType::UInt => 4,
            FieldType::Bool => 4,
        }
    }

    /// Number of scalar components in one element
    pub fn component_count(&self) -> u32 {
        match self {
            FieldType::Float | FieldType::Int | FieldType::UInt | FieldType::Bool => 1,
            FieldType::Float2 | FieldType::Int2 => 2,
            FieldType::Float3 | FieldType::Int3 => 3,
            FieldType::Float4 | FieldType::Int4 => 4,
            FieldType::Mat3 => 9,
            FieldType::Mat4 => 16,
        }
    }
}

// ===== FIELD DESC =====

/// A named field in a buffer layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDesc {
    pub name: String,
    pub field_type: FieldType,
    /// Array element count (1 for scalars)
    pub count: u32,
    /// Byte size; 0 until the layout pass derives it
    pub size: u32,
    /// Byte offset; assigned by the layout pass
    pub offset: u32,
}

impl FieldDesc {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            count: 1,
            size: 0,
            offset: 0,
        }
    }

    /// Declare an array of `count` elements
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Override the derived byte size (opaque structs)
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// None when `count` elements do not fit in a u32 byte size
    fn resolved_size(&self) -> Option<u32> {
        if self.size > 0 {
            Some(self.size)
        } else {
            self.count.checked_mul(self.field_type.component_size())
        }
    }
}

// ===== BUFFER LAYOUT =====

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferLayout {
    fields: Vec<FieldDesc>,
    stride: u32,
}

impl BufferLayout {
    /// Run the offset pass over `fields` in declaration order
    ///
    /// # Panics
    ///
    /// Panics when the layout is larger than `u32::MAX` bytes. Use
    /// [`BufferLayout::try_build`] for descriptions that come from data.
    pub fn build(fields: Vec<FieldDesc>) -> Self {
        match Self::try_build(fields) {
            Ok(layout) => layout,
            Err(err) => panic!("{}", err),
        }
    }

    /// `build` that reports a layout overflowing `u32` bytes as a contract violation
    pub fn try_build(mut fields: Vec<FieldDesc>) -> Result<Self> {
        let mut offset = 0u32;
        for field in fields.iter_mut() {
            let size = field.resolved_size().ok_or_else(|| {
                engine_contract!(
                    SOURCE,
                    "Field '{}' of {} x {:?} overflows the layout size",
                    field.name,
                    field.count,
                    field.field_type
                )
            })?;
            field.size = size;
            field.offset = offset;
            offset = offset.checked_add(size).ok_or_else(|| {
                engine_contract!(
                    SOURCE,
                    "Layout exceeds {} bytes at field '{}'",
                    u32::MAX,
                    field.name
                )
            })?;
        }
        Ok(Self { fields, stride: offset })
    }

    pub fn new(fields: &[FieldDesc]) -> Self {
        Self::build(fields.to_vec())
    }

    // ===== ACCESSORS =====

    /// Total byte size of the layout
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }

    /// First field declared with `name`
    pub fn field(&self, name: &str) -> Option<&FieldDesc> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDesc> {
        self.fields.iter()
    }

    // ===== PRESETS =====

    /// Per-view camera matrices and depth reconstruction constants
    pub fn camera() -> Self {
        Self::build(vec![
            FieldDesc::new("u_Camera.ViewProjectionMatrix", FieldType::Mat4),
            FieldDesc::new("u_Camera.InverseViewProjectionMatrix", FieldType::Mat4),
            FieldDesc::new("u_Camera.ProjectionMatrix", FieldType::Mat4),
            FieldDesc::new("u_Camera.InverseProjectionMatrix", FieldType::Mat4),
            FieldDesc::new("u_Camera.ViewMatrix", FieldType::Mat4),
            FieldDesc::new("u_Camera.InverseViewMatrix", FieldType::Mat4),
            FieldDesc::new("u_Camera.NDCToViewMul", FieldType::Float2),
            FieldDesc::new("u_Camera.NDCToViewAdd", FieldType::Float2),
            FieldDesc::new("u_Camera.DepthUnpackConsts", FieldType::Float2),
            FieldDesc::new("u_Camera.CameraTanHalfFOV", FieldType::Float2),
        ])
    }

    pub fn screen_data() -> Self {
        Self::build(vec![
            FieldDesc::new("u_ScreenData.InvFullResolution", FieldType::Float2),
            FieldDesc::new("u_ScreenData.FullResolution", FieldType::Float2),
            FieldDesc::new("u_ScreenData.InvHalfResolution", FieldType::Float2),
            FieldDesc::new("u_ScreenData.HalfResolution", FieldType::Float2),
        ])
    }

    /// Shadow cascade settings and debug toggles
    pub fn renderer_data() -> Self {
        Self::build(vec![
            FieldDesc::new("u_RendererData.CascadeSplits", FieldType::Float4),
            FieldDesc::new("u_RendererData.LightSize", FieldType::Float),
            FieldDesc::new("u_RendererData.MaxShadowDistance", FieldType::Float),
            FieldDesc::new("u_RendererData.ShadowFade", FieldType::Float),
            FieldDesc::new("u_RendererData.CascadeTransitionFade", FieldType::Float),
            FieldDesc::new("u_RendererData.TilesCountX", FieldType::Int),
            FieldDesc::new("u_RendererData.ShowLightComplexity", FieldType::Bool),
            FieldDesc::new("u_RendererData.ShowCascades", FieldType::Bool),
            FieldDesc::new("u_RendererData.SoftShadows", FieldType::Bool),
            FieldDesc::new("u_RendererData.CascadeFading", FieldType::Bool),
        ])
    }

    /// Horizon-based ambient occlusion parameters
    pub fn hbao_data() -> Self {
        Self::build(vec![
            FieldDesc::new("u_HBAO.Float2Offsets", FieldType::Float4).with_count(16),
            FieldDesc::new("u_HBAO.Jitters", FieldType::Float4).with_count(16),
            FieldDesc::new("u_HBAO.PerspectiveInfo", FieldType::Float4),
            FieldDesc::new("u_HBAO.RadiusToScreen", FieldType::Float),
            FieldDesc::new("u_HBAO.NegInvR2", FieldType::Float),
            FieldDesc::new("u_HBAO.NDotVBias", FieldType::Float),
            FieldDesc::new("u_HBAO.AOMultiplier", FieldType::Float),
            FieldDesc::new("u_HBAO.PowExponent", FieldType::Float),
            FieldDesc::new("u_HBAO.Padding1", FieldType::Float3),
            FieldDesc::new("u_HBAO.ShadowTolerance", FieldType::Float),
            FieldDesc::new("u_HBAO.InvQuarterResolution", FieldType::Float2),
            FieldDesc::new("u_HBAO.Padding2", FieldType::Float2),
            FieldDesc::new("u_HBAO.IsOrtho", FieldType::Bool),
        ])
    }

    /// Directional light matrices for four shadow cascades
    pub fn shadow_data() -> Self {
        Self::build(vec![
            FieldDesc::new("u_DirShadow.DirLightMatrices", FieldType::Mat4).with_count(4),
        ])
    }

    pub fn scene_data() -> Self {
        Self::build(vec![
            // Opaque light struct: 2 x vec4
            FieldDesc::new("u_Scene.DirectionalLights", FieldType::Float4).with_count(2),
            FieldDesc::new("u_Scene.CameraPosition", FieldType::Float3),
            FieldDesc::new("u_Scene.EnvironmentMapIntensity", FieldType::Float),
        ])
    }

    pub fn scene_composite() -> Self {
        Self::build(vec![
            FieldDesc::new("u_Uniforms.Exposure", FieldType::Float),
            FieldDesc::new("u_Uniforms.BloomIntensity", FieldType::Float),
            FieldDesc::new("u_Uniforms.BloomDirtIntensity", FieldType::Float),
        ])
    }

    pub fn point_light_data() -> Self {
        Self::build(vec![
            FieldDesc::new("u_PointLights.LightCount", FieldType::UInt),
            // Opaque light struct: 3 x vec4 each
            FieldDesc::new("u_PointLights.Lights", FieldType::Float4).with_count(3),
        ])
    }
}

impl FromIterator<FieldDesc> for BufferLayout {
    fn from_iter<I: IntoIterator<Item = FieldDesc>>(iter: I) -> Self {
        Self::build(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BufferLayout {
    type Item = &'a FieldDesc;
    type IntoIter = std::slice::Iter<'a, FieldDesc>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
#[path = "buffer_layout_tests.rs"]
mod tests;
