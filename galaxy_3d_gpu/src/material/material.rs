/// Material: named shader properties backed by a CPU shadow buffer.
///
/// A Material is created from a Shader and resolves every property name
/// against the shader's reflection:
/// - uniforms live in a zeroed shadow storage sized to the reflected
///   uniform buffers (laid out back to back)
/// - 2D textures live in a slot-indexed table (texture arrays take
///   `register + index`)
/// - 3D textures live in a sparse slot-indexed table
///
/// When the shader is reloaded, the material is flagged and re-resolves
/// its properties before the next write or render update. Values whose
/// name and type survive the reload are kept; the rest are dropped.
/// Reads issued while the reload is pending already answer as if the
/// properties had been re-resolved.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use bitflags::bitflags;
use crate::buffer::UniformBufferSet;
use crate::error::{Error, Result};
use crate::material::material_value::MaterialValue;
use crate::shader::{
    Shader, ShaderReflection, ShaderResourceDeclaration, ShaderUniformType, ResourceDimension,
    ReloadCallbackKey,
};
use crate::texture::{Texture2D, Texture3D};
use crate::{engine_contract, engine_contract_bail, engine_debug, engine_info, engine_warn};

const SOURCE: &str = "galaxy3d::Material";

bitflags! {
    /// Fixed-function state requested by a material
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialFlags: u32 {
        const DEPTH_TEST = 1 << 1;
        const BLEND = 1 << 2;
        const TWO_SIDED = 1 << 3;
        const DISABLE_SHADOW_CASTING = 1 << 4;
    }
}

impl Default for MaterialFlags {
    fn default() -> Self {
        MaterialFlags::DEPTH_TEST | MaterialFlags::BLEND
    }
}

/// Where a uniform value currently lives
struct UniformSlot {
    uniform_type: ShaderUniformType,
    size: usize,
    /// Offset in `storage`; None when the value reads as zero
    offset: Option<usize>,
}

pub struct Material {
    name: String,
    shader: Arc<Shader>,
    /// Reflection the storage and texture tables are laid out against
    reflection: Arc<ShaderReflection>,
    storage: Vec<u8>,
    texture2ds: BTreeMap<u32, Arc<Texture2D>>,
    texture3ds: Vec<Option<Arc<Texture3D>>>,
    flags: MaterialFlags,
    reload_pending: Arc<AtomicBool>,
    reload_key: ReloadCallbackKey,
}

impl Material {
    pub fn new(shader: Arc<Shader>, name: impl Into<String>) -> Self {
        let reflection = shader.reflection();
        let storage = vec![0u8; reflection.total_buffer_size() as usize];
        let material = Self::assemble(
            name.into(),
            shader,
            reflection,
            storage,
            BTreeMap::new(),
            Vec::new(),
            false,
        );
        engine_debug!(
            SOURCE,
            "Created material '{}' ({} bytes of uniform storage)",
            material.name,
            material.storage.len()
        );
        material
    }

    /// Copy of another material's properties under a new name
    pub fn from_material(other: &Material, name: impl Into<String>) -> Self {
        let mut material = Self::assemble(
            name.into(),
            other.shader.clone(),
            other.reflection.clone(),
            other.storage.clone(),
            other.texture2ds.clone(),
            other.texture3ds.clone(),
            other.reload_pending.load(Ordering::Acquire),
        );
        material.flags = other.flags;
        material
    }

    fn assemble(
        name: String,
        shader: Arc<Shader>,
        reflection: Arc<ShaderReflection>,
        storage: Vec<u8>,
        texture2ds: BTreeMap<u32, Arc<Texture2D>>,
        texture3ds: Vec<Option<Arc<Texture3D>>>,
        pending: bool,
    ) -> Self {
        let reload_pending = Arc::new(AtomicBool::new(pending));
        let flag = reload_pending.clone();
        let reload_key = shader.add_reload_callback(move |_| flag.store(true, Ordering::Release));

        Self {
            name,
            shader,
            reflection,
            storage,
            texture2ds,
            texture3ds,
            flags: MaterialFlags::default(),
            reload_pending,
            reload_key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shader(&self) -> &Arc<Shader> {
        &self.shader
    }

    // ===== SHADER RELOAD =====

    fn is_reload_pending(&self) -> bool {
        self.reload_pending.load(Ordering::Acquire)
    }

    /// Re-resolve the properties if the shader was reloaded
    pub fn sync_with_shader(&mut self) {
        if !self.reload_pending.swap(false, Ordering::AcqRel) {
            return;
        }

        let latest = self.shader.reflection();
        let mut storage = vec![0u8; latest.total_buffer_size() as usize];
        let mut dropped = Vec::new();

        for (name, old) in self.reflection.uniforms() {
            match latest.uniform(name) {
                Some(new) if new.uniform_type == old.uniform_type => {
                    let (from, to) = (old.offset as usize, new.offset as usize);
                    let size = old.size.min(new.size) as usize;
                    if from + size <= self.storage.len() && to + size <= storage.len() {
                        storage[to..to + size].copy_from_slice(&self.storage[from..from + size]);
                    } else {
                        dropped.push(name.to_string());
                    }
                }
                _ => dropped.push(name.to_string()),
            }
        }

        let mut texture2ds = BTreeMap::new();
        let mut texture3ds: Vec<Option<Arc<Texture3D>>> = Vec::new();
        for old in &self.reflection.resources {
            let survivor = latest
                .resource(&old.name)
                .filter(|new| new.dimension == old.dimension);

            match (old.dimension, survivor) {
                (ResourceDimension::Texture2D, Some(new)) => {
                    for index in 0..old.count.min(new.count) {
                        if let Some(texture) = self.texture2ds.get(&(old.register + index)) {
                            texture2ds.insert(new.register + index, texture.clone());
                        }
                    }
                }
                (ResourceDimension::Texture3D, Some(new)) => {
                    if let Some(Some(texture)) = self.texture3ds.get(old.register as usize) {
                        let slot = new.register as usize;
                        if texture3ds.len() <= slot {
                            texture3ds.resize(slot + 1, None);
                        }
                        texture3ds[slot] = Some(texture.clone());
                    }
                }
                (_, None) => {
                    if self.resource_is_set(old) {
                        dropped.push(old.name.clone());
                    }
                }
            }
        }

        self.reflection = latest;
        self.storage = storage;
        self.texture2ds = texture2ds;
        self.texture3ds = texture3ds;

        engine_info!(
            SOURCE,
            "Material '{}' re-resolved against reloaded shader '{}'",
            self.name,
            self.shader.name()
        );
        if !dropped.is_empty() {
            engine_warn!(
                SOURCE,
                "Material '{}' dropped properties after shader reload: {}",
                self.name,
                dropped.join(", ")
            );
        }
    }

    fn resource_is_set(&self, decl: &ShaderResourceDeclaration) -> bool {
        match decl.dimension {
            ResourceDimension::Texture2D => {
                (0..decl.count).any(|i| self.texture2ds.contains_key(&(decl.register + i)))
            }
            ResourceDimension::Texture3D => {
                matches!(self.texture3ds.get(decl.register as usize), Some(Some(_)))
            }
        }
    }

    // ===== LOOKUPS =====

    /// Locate a uniform, answering with the post-reload view when a reload is pending
    fn uniform_slot(&self, name: &str) -> Option<UniformSlot> {
        let current = self.reflection.uniform(name);
        if !self.is_reload_pending() {
            return current.map(|u| UniformSlot {
                uniform_type: u.uniform_type,
                size: u.size as usize,
                offset: Some(u.offset as usize),
            });
        }

        let fresh = self.shader.reflection().uniform(name)?;
        let survivor = current.filter(|old| old.uniform_type == fresh.uniform_type);
        Some(UniformSlot {
            uniform_type: fresh.uniform_type,
            // Only the bytes the migration will carry over
            size: survivor.as_ref().map_or(fresh.size, |old| old.size.min(fresh.size)) as usize,
            offset: survivor.map(|old| old.offset as usize),
        })
    }

    /// Register (in the current tables) of a texture property that survives any pending reload
    fn texture_register(&self, name: &str, dimension: ResourceDimension) -> Option<u32> {
        let current = self
            .reflection
            .resource(name)
            .filter(|decl| decl.dimension == dimension)?;
        if self.is_reload_pending() {
            self.shader
                .reflection()
                .resource(name)
                .filter(|decl| decl.dimension == dimension)?;
        }
        Some(current.register)
    }

    fn has_resource(&self, name: &str) -> bool {
        if self.is_reload_pending() {
            self.shader.reflection().resource(name).is_some()
        } else {
            self.reflection.resource(name).is_some()
        }
    }

    /// True when the shader declares a uniform or resource with this name
    pub fn has(&self, name: &str) -> bool {
        self.uniform_slot(name).is_some() || self.has_resource(name)
    }

    // ===== UNIFORM PROPERTIES =====

    /// Write a uniform property; unknown names log a warning and are ignored
    pub fn set<T: MaterialValue>(&mut self, name: &str, value: T) -> Result<()> {
        self.sync_with_shader();

        let Some(uniform) = self.reflection.uniform(name) else {
            engine_warn!(SOURCE, "Cannot find material property: {}", name);
            return Ok(());
        };
        if uniform.uniform_type != T::UNIFORM_TYPE {
            engine_contract_bail!(
                SOURCE,
                "Material property '{}' is {:?}, not {:?}",
                name,
                uniform.uniform_type,
                T::UNIFORM_TYPE
            );
        }

        let Some(range) = value_range(self.storage.len(), uniform.offset as usize, uniform.size as usize, T::UNIFORM_TYPE) else {
            engine_contract_bail!(
                SOURCE,
                "Material property '{}' ({} bytes at offset {}) does not fit a {:?} in {} bytes of storage",
                name,
                uniform.size,
                uniform.offset,
                T::UNIFORM_TYPE,
                self.storage.len()
            );
        };
        value.write_to(&mut self.storage[range]);
        Ok(())
    }

    pub fn get<T: MaterialValue>(&self, name: &str) -> Result<T> {
        let slot = self
            .uniform_slot(name)
            .ok_or_else(|| Error::PropertyNotFound(name.to_string()))?;
        if slot.uniform_type != T::UNIFORM_TYPE {
            return Err(engine_contract!(
                SOURCE,
                "Material property '{}' is {:?}, not {:?}",
                name,
                slot.uniform_type,
                T::UNIFORM_TYPE
            ));
        }
        self.read_slot(&slot).ok_or_else(|| {
            engine_contract!(
                SOURCE,
                "Material property '{}' ({} bytes) does not fit a {:?} in {} bytes of storage",
                name,
                slot.size,
                T::UNIFORM_TYPE,
                self.storage.len()
            )
        })
    }

    /// `get` without errors: None for unknown names and type mismatches
    pub fn try_get<T: MaterialValue>(&self, name: &str) -> Option<T> {
        let slot = self.uniform_slot(name)?;
        if slot.uniform_type != T::UNIFORM_TYPE {
            return None;
        }
        self.read_slot(&slot)
    }

    /// The value's leading bytes of the slot; None when they fall outside the storage
    fn read_slot<T: MaterialValue>(&self, slot: &UniformSlot) -> Option<T> {
        match slot.offset {
            Some(start) => {
                let range = value_range(self.storage.len(), start, slot.size, T::UNIFORM_TYPE)?;
                Some(T::read_from(&self.storage[range]))
            }
            None if slot.size >= T::UNIFORM_TYPE.size() as usize => {
                Some(T::read_from(&vec![0u8; T::UNIFORM_TYPE.size() as usize]))
            }
            None => None,
        }
    }

    // ===== TEXTURE PROPERTIES =====

    fn texture_declaration(&self, name: &str, dimension: ResourceDimension) -> Option<ShaderResourceDeclaration> {
        let Some(decl) = self.reflection.resource(name) else {
            engine_warn!(SOURCE, "Cannot find material property: {}", name);
            return None;
        };
        if decl.dimension != dimension {
            engine_warn!(
                SOURCE,
                "Material property '{}' is a {:?}, not a {:?}",
                name,
                decl.dimension,
                dimension
            );
            return None;
        }
        Some(decl.clone())
    }

    pub fn set_texture2d(&mut self, name: &str, texture: Arc<Texture2D>) -> Result<()> {
        self.sync_with_shader();
        if let Some(decl) = self.texture_declaration(name, ResourceDimension::Texture2D) {
            self.texture2ds.insert(decl.register, texture);
        }
        Ok(())
    }

    /// Set one element of a texture array
    pub fn set_texture2d_at(&mut self, name: &str, texture: Arc<Texture2D>, array_index: u32) -> Result<()> {
        self.sync_with_shader();
        let Some(decl) = self.texture_declaration(name, ResourceDimension::Texture2D) else {
            return Ok(());
        };
        if array_index >= decl.count {
            engine_contract_bail!(
                SOURCE,
                "Index {} out of range for texture array '{}' of {} elements",
                array_index,
                name,
                decl.count
            );
        }
        self.texture2ds.insert(decl.register + array_index, texture);
        Ok(())
    }

    pub fn set_texture3d(&mut self, name: &str, texture: Arc<Texture3D>) -> Result<()> {
        self.sync_with_shader();
        if let Some(decl) = self.texture_declaration(name, ResourceDimension::Texture3D) {
            let slot = decl.register as usize;
            if self.texture3ds.len() <= slot {
                self.texture3ds.resize(slot + 1, None);
            }
            self.texture3ds[slot] = Some(texture);
        }
        Ok(())
    }

    pub fn get_texture2d(&self, name: &str) -> Result<Arc<Texture2D>> {
        self.try_get_texture2d(name)
            .ok_or_else(|| Error::PropertyNotFound(name.to_string()))
    }

    pub fn try_get_texture2d(&self, name: &str) -> Option<Arc<Texture2D>> {
        let register = self.texture_register(name, ResourceDimension::Texture2D)?;
        self.texture2ds.get(&register).cloned()
    }

    pub fn get_texture3d(&self, name: &str) -> Result<Arc<Texture3D>> {
        self.try_get_texture3d(name)
            .ok_or_else(|| Error::PropertyNotFound(name.to_string()))
    }

    pub fn try_get_texture3d(&self, name: &str) -> Option<Arc<Texture3D>> {
        let register = self.texture_register(name, ResourceDimension::Texture3D)?;
        self.texture3ds.get(register as usize).cloned().flatten()
    }

    /// Bound 2D textures by slot
    pub fn texture2d_slots(&self) -> impl Iterator<Item = (u32, &Arc<Texture2D>)> {
        self.texture2ds.iter().map(|(slot, texture)| (*slot, texture))
    }

    /// Bound 3D textures by slot
    pub fn texture3d_slots(&self) -> impl Iterator<Item = (u32, &Arc<Texture3D>)> {
        self.texture3ds
            .iter()
            .enumerate()
            .filter_map(|(slot, texture)| texture.as_ref().map(|t| (slot as u32, t)))
    }

    // ===== FLAGS =====

    pub fn flags(&self) -> MaterialFlags {
        self.flags
    }

    pub fn get_flag(&self, flag: MaterialFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: MaterialFlags, value: bool) {
        self.flags.set(flag, value);
    }

    // ===== RENDERING =====

    /// Shadow bytes of the uniform properties (as of the last sync)
    pub fn uniform_storage(&self) -> &[u8] {
        &self.storage
    }

    /// Bind shader, uniform buffers and textures for the next draw
    pub fn update_for_rendering(&mut self, uniform_buffers: Option<&UniformBufferSet>) -> Result<()> {
        self.sync_with_shader();
        self.shader.bind()?;

        match uniform_buffers {
            Some(set) => set.try_for_each(|buffer| buffer.bind())?,
            None => engine_warn!(SOURCE, "Missing uniform buffer set!"),
        }

        for (slot, texture) in &self.texture2ds {
            texture.bind(*slot)?;
        }
        for (slot, texture) in self.texture3d_slots() {
            texture.bind(slot)?;
        }
        Ok(())
    }
}

/// Bytes a `value_type` occupies at the start of a uniform slot
///
/// Array and padded uniforms declare more bytes than one value; only the
/// first element is addressed.
fn value_range(
    storage_len: usize,
    offset: usize,
    declared_size: usize,
    value_type: ShaderUniformType,
) -> Option<Range<usize>> {
    let len = value_type.size() as usize;
    if declared_size < len {
        return None;
    }
    let end = offset.checked_add(len)?;
    (end <= storage_len).then_some(offset..end)
}

impl Drop for Material {
    fn drop(&mut self) {
        self.shader.remove_reload_callback(self.reload_key);
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("shader", &self.shader.name())
            .field("storage_bytes", &self.storage.len())
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
