/// CPU-shadowed GPU buffer (uniform or storage).
///
/// A GpuBuffer owns a zero-initialised shadow copy of its contents and an
/// index of named variables built from a BufferLayout. Writes land in the
/// shadow first and are then pushed to the device buffer:
///
/// - `set_data` / `set_variable` upload immediately
/// - `write_data` / `write_variable` only stage the write (dirty flag);
///   `upload_if_dirty` pushes every staged write at once
///
/// The buffer kind is a type parameter: `GpuBuffer<Uniform>` re-binds to
/// its slot on every upload, `GpuBuffer<Storage>` only uploads.

use std::marker::PhantomData;
use std::sync::Arc;
use bytemuck::Pod;
use rustc_hash::FxHashMap;
use crate::device::{GraphicsDevice, BufferHandle, BufferKind};
use crate::error::{Error, Result};
use crate::layout::BufferLayout;
use crate::{engine_contract_bail, engine_error, engine_trace, engine_warn};

// ===== BUFFER KIND MARKERS =====

/// Compile-time buffer kind
pub trait BufferKindMarker: Send + Sync + 'static {
    const KIND: BufferKind;
    /// Log source of single buffers
    const SOURCE: &'static str;
    /// Log source of buffer sets
    const SET_SOURCE: &'static str;
}

/// Uniform (constant) buffer kind
#[derive(Debug, Clone, Copy)]
pub struct Uniform;

/// Shader storage buffer kind
#[derive(Debug, Clone, Copy)]
pub struct Storage;

impl BufferKindMarker for Uniform {
    const KIND: BufferKind = BufferKind::Uniform;
    const SOURCE: &'static str = "galaxy3d::UniformBuffer";
    const SET_SOURCE: &'static str = "galaxy3d::UniformBufferSet";
}

impl BufferKindMarker for Storage {
    const KIND: BufferKind = BufferKind::Storage;
    const SOURCE: &'static str = "galaxy3d::StorageBuffer";
    const SET_SOURCE: &'static str = "galaxy3d::StorageBufferSet";
}

pub type UniformBuffer = GpuBuffer<Uniform>;
pub type StorageBuffer = GpuBuffer<Storage>;

// ===== GPU BUFFER =====

pub struct GpuBuffer<K: BufferKindMarker> {
    device: Arc<dyn GraphicsDevice>,
    handle: BufferHandle,
    binding: u32,
    /// name -> (size, offset)
    variables: FxHashMap<String, (u32, u32)>,
    data: Vec<u8>,
    dirty: bool,
    _kind: PhantomData<K>,
}

impl<K: BufferKindMarker> GpuBuffer<K> {
    /// Create a buffer sized to the layout stride
    pub fn create(device: Arc<dyn GraphicsDevice>, layout: &BufferLayout, binding: u32) -> Result<Self> {
        Self::with_size(device, 0, binding, layout)
    }

    /// Create a buffer of at least `size` bytes (never smaller than the layout stride)
    pub fn with_size(
        device: Arc<dyn GraphicsDevice>,
        size: u32,
        binding: u32,
        layout: &BufferLayout,
    ) -> Result<Self> {
        let size = size.max(layout.stride());

        let variables = layout
            .iter()
            .map(|field| (field.name.clone(), (field.size, field.offset)))
            .collect();

        let handle = device
            .create_buffer(size as u64, binding, K::KIND)
            .map_err(|err| {
                engine_error!(K::SOURCE, "Failed to create {} byte buffer at binding {}: {}", size, binding, err);
                Error::from(err)
            })?;

        engine_trace!(K::SOURCE, "Created {} byte buffer at binding {}", size, binding);

        Ok(Self {
            device,
            handle,
            binding,
            variables,
            data: vec![0u8; size as usize],
            dirty: false,
            _kind: PhantomData,
        })
    }

    // ===== ACCESSORS =====

    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Byte size of the buffer
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn kind(&self) -> BufferKind {
        K::KIND
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Shadow bytes (what the next upload sends)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True when staged writes have not been uploaded yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// (size, offset) of a named variable
    pub fn variable_range(&self, name: &str) -> Option<(u32, u32)> {
        self.variables.get(name).copied()
    }

    // ===== WRITES =====

    /// Copy `bytes` at `offset`, then upload
    pub fn set_data(&mut self, bytes: &[u8], offset: u32) -> Result<()> {
        self.write_data(bytes, offset)?;
        self.upload_to_shader()
    }

    /// Copy `bytes` at `offset` into the shadow only
    pub fn write_data(&mut self, bytes: &[u8], offset: u32) -> Result<()> {
        let start = offset as usize;
        let end = start + bytes.len();
        if end > self.data.len() {
            engine_contract_bail!(
                K::SOURCE,
                "Write of {} bytes at offset {} exceeds buffer size {}",
                bytes.len(),
                offset,
                self.data.len()
            );
        }
        self.data[start..end].copy_from_slice(bytes);
        self.dirty = true;
        Ok(())
    }

    /// Write a named variable, then upload. Unknown names are ignored.
    pub fn set_variable(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        if self.write_variable(name, bytes)? {
            self.upload_to_shader()?;
        }
        Ok(())
    }

    /// Stage a named variable; returns false when the name is unknown
    ///
    /// Input longer than the variable is truncated.
    pub fn write_variable(&mut self, name: &str, bytes: &[u8]) -> Result<bool> {
        let Some(&(size, offset)) = self.variables.get(name) else {
            return Ok(false);
        };

        if bytes.len() < size as usize {
            engine_contract_bail!(
                K::SOURCE,
                "Variable '{}' needs {} bytes, got {}",
                name,
                size,
                bytes.len()
            );
        }
        self.write_data(&bytes[..size as usize], offset)?;
        Ok(true)
    }

    /// Typed `set_variable`
    pub fn set_value<T: Pod>(&mut self, name: &str, value: &T) -> Result<()> {
        self.set_variable(name, bytemuck::bytes_of(value))
    }

    // ===== READS =====

    /// Fresh copy of a named variable's bytes
    pub fn get_variable(&self, name: &str) -> Option<Vec<u8>> {
        let &(size, offset) = self.variables.get(name)?;
        let start = offset as usize;
        Some(self.data[start..start + size as usize].to_vec())
    }

    /// Typed read of the leading bytes of a named variable
    pub fn get_value<T: Pod>(&self, name: &str) -> Option<T> {
        let bytes = self.get_variable(name)?;
        let width = std::mem::size_of::<T>();
        if bytes.len() < width {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(&bytes[..width]))
    }

    // ===== DEVICE =====

    /// Push the whole shadow to the device (uniform buffers also re-bind)
    pub fn upload_to_shader(&mut self) -> Result<()> {
        self.device.upload_buffer(self.handle, &self.data, 0)?;
        self.dirty = false;
        engine_trace!(K::SOURCE, "Uploaded {} bytes to binding {}", self.data.len(), self.binding);

        if K::KIND == BufferKind::Uniform {
            self.bind()?;
        }
        Ok(())
    }

    /// Upload staged writes; returns true when an upload happened
    pub fn upload_if_dirty(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.upload_to_shader()?;
        Ok(true)
    }

    /// Bind to the buffer's own slot
    pub fn bind(&self) -> Result<()> {
        self.device.bind_buffer(self.handle, self.binding, K::KIND)?;
        Ok(())
    }

    /// Re-create the device buffer with a new byte size
    ///
    /// The shadow prefix is kept; variables that no longer fit are dropped.
    pub fn resize(&mut self, new_size: u32) -> Result<()> {
        if new_size == 0 {
            engine_contract_bail!(K::SOURCE, "Cannot resize buffer at binding {} to 0 bytes", self.binding);
        }

        let handle = self.device.create_buffer(new_size as u64, self.binding, K::KIND)?;
        if let Err(err) = self.device.destroy_buffer(self.handle) {
            engine_warn!(K::SOURCE, "Failed to release resized buffer: {}", err);
        }
        self.handle = handle;

        self.data.resize(new_size as usize, 0);
        self.variables.retain(|_, &mut (size, offset)| offset + size <= new_size);
        self.upload_to_shader()
    }
}

impl<K: BufferKindMarker> Drop for GpuBuffer<K> {
    fn drop(&mut self) {
        if let Err(err) = self.device.destroy_buffer(self.handle) {
            engine_warn!(K::SOURCE, "Failed to destroy buffer at binding {}: {}", self.binding, err);
        }
    }
}

impl<K: BufferKindMarker> std::fmt::Debug for GpuBuffer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("kind", &K::KIND)
            .field("binding", &self.binding)
            .field("size", &self.data.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
#[path = "gpu_buffer_tests.rs"]
mod tests;
