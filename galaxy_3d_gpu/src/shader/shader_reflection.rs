/// Reflection of a compiled shader: its uniform buffers and sampled resources.
///
/// The shader compiler collaborator produces this description; the GPU
/// layer only reads it.

// ===== UNIFORM TYPES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderUniformType {
    Bool,
    Int,
    UInt,
    Float,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ShaderUniformType {
    /// Size in bytes (booleans are 32-bit)
    pub fn size(&self) -> u32 {
        match self {
            ShaderUniformType::Bool
            | ShaderUniformType::Int
            | ShaderUniformType::UInt
            | ShaderUniformType::Float => 4,
            ShaderUniformType::Vec2 | ShaderUniformType::IVec2 => 8,
            ShaderUniformType::Vec3 | ShaderUniformType::IVec3 => 12,
            ShaderUniformType::Vec4 | ShaderUniformType::IVec4 | ShaderUniformType::Mat2 => 16,
            ShaderUniformType::Mat3 => 36,
            ShaderUniformType::Mat4 => 64,
        }
    }
}

/// A uniform inside a shader buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderUniform {
    pub name: String,
    pub uniform_type: ShaderUniformType,
    pub size: u32,
    /// Offset relative to the owning buffer
    pub offset: u32,
}

impl ShaderUniform {
    pub fn new(name: impl Into<String>, uniform_type: ShaderUniformType, offset: u32) -> Self {
        Self {
            name: name.into(),
            uniform_type,
            size: uniform_type.size(),
            offset,
        }
    }
}

/// A reflected uniform block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBuffer {
    pub name: String,
    pub size: u32,
    pub uniforms: Vec<ShaderUniform>,
}

impl ShaderBuffer {
    /// Block sized to the end of its last uniform
    pub fn new(name: impl Into<String>, uniforms: Vec<ShaderUniform>) -> Self {
        let size = uniforms.iter().map(|u| u.offset + u.size).max().unwrap_or(0);
        Self { name: name.into(), size, uniforms }
    }

    /// Uniforms declared one after another, without padding
    pub fn packed(name: impl Into<String>, uniforms: &[(&str, ShaderUniformType)]) -> Self {
        let mut offset = 0;
        let uniforms = uniforms
            .iter()
            .map(|(uniform_name, uniform_type)| {
                let uniform = ShaderUniform::new(*uniform_name, *uniform_type, offset);
                offset += uniform.size;
                uniform
            })
            .collect();
        Self::new(name, uniforms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    Texture2D,
    Texture3D,
}

/// A sampled resource (texture or texture array)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderResourceDeclaration {
    pub name: String,
    /// First binding slot
    pub register: u32,
    /// Array length (1 for single textures)
    pub count: u32,
    pub dimension: ResourceDimension,
}

impl ShaderResourceDeclaration {
    pub fn new(name: impl Into<String>, register: u32, dimension: ResourceDimension) -> Self {
        Self { name: name.into(), register, count: 1, dimension }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// Uniform located in a material's shadow storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedUniform {
    pub uniform_type: ShaderUniformType,
    pub size: u32,
    /// Offset from the start of the concatenated buffers
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderReflection {
    pub buffers: Vec<ShaderBuffer>,
    pub resources: Vec<ShaderResourceDeclaration>,
}

impl ShaderReflection {
    pub fn new(buffers: Vec<ShaderBuffer>, resources: Vec<ShaderResourceDeclaration>) -> Self {
        Self { buffers, resources }
    }

    /// Sum of every buffer size
    pub fn total_buffer_size(&self) -> u32 {
        self.buffers.iter().map(|b| b.size).sum()
    }

    /// Find a uniform by name across all buffers
    pub fn uniform(&self, name: &str) -> Option<ResolvedUniform> {
        let mut base = 0;
        for buffer in &self.buffers {
            if let Some(uniform) = buffer.uniforms.iter().find(|u| u.name == name) {
                return Some(ResolvedUniform {
                    uniform_type: uniform.uniform_type,
                    size: uniform.size,
                    offset: base + uniform.offset,
                });
            }
            base += buffer.size;
        }
        None
    }

    /// Every uniform with its resolved location, in declaration order
    pub fn uniforms(&self) -> Vec<(&str, ResolvedUniform)> {
        let mut base = 0;
        let mut resolved = Vec::new();
        for buffer in &self.buffers {
            for uniform in &buffer.uniforms {
                resolved.push((
                    uniform.name.as_str(),
                    ResolvedUniform {
                        uniform_type: uniform.uniform_type,
                        size: uniform.size,
                        offset: base + uniform.offset,
                    },
                ));
            }
            base += buffer.size;
        }
        resolved
    }

    pub fn resource(&self, name: &str) -> Option<&ShaderResourceDeclaration> {
        self.resources.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
#[path = "shader_reflection_tests.rs"]
mod tests;
