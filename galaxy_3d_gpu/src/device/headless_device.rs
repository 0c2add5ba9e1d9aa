/// Headless device: a CPU-memory backend (no GPU required)
///
/// Buffers and images live in slot-map tables behind a mutex. Every call is
/// counted so callers (and tests) can observe upload and bind traffic.

use std::sync::{Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::device::graphics_device::{
    GraphicsDevice, BufferHandle, ImageHandle, ProgramHandle, BufferKind, ImageDesc,
    DeviceResourceError, DeviceResult,
};
use crate::device::texture_format::TextureFormat;

/// Configuration of a headless device
#[derive(Debug, Clone)]
pub struct HeadlessDeviceConfig {
    /// Name reported by `backend_name()`
    pub backend_name: String,
    /// Total bytes available for buffers and images (None = unlimited)
    pub memory_budget: Option<u64>,
}

impl Default for HeadlessDeviceConfig {
    fn default() -> Self {
        Self {
            backend_name: "headless".to_string(),
            memory_budget: None,
        }
    }
}

/// Operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    pub buffers_created: u64,
    pub buffers_destroyed: u64,
    pub buffer_uploads: u64,
    pub buffer_binds: u64,
    pub images_created: u64,
    pub images_destroyed: u64,
    pub image_binds: u64,
    pub image_clears: u64,
    pub program_binds: u64,
}

/// Description of a live headless image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub samples: u32,
}

struct HeadlessBuffer {
    kind: BufferKind,
    binding: u32,
    data: Vec<u8>,
}

struct HeadlessImage {
    info: ImageInfo,
    texels: Vec<u8>,
}

#[derive(Default)]
struct HeadlessState {
    buffers: SlotMap<BufferHandle, HeadlessBuffer>,
    images: SlotMap<ImageHandle, HeadlessImage>,
    programs: SlotMap<ProgramHandle, String>,
    bound_buffers: FxHashMap<(BufferKind, u32), BufferHandle>,
    bound_images: FxHashMap<u32, ImageHandle>,
    bound_program: Option<ProgramHandle>,
    memory_used: u64,
    stats: HeadlessStats,
}

pub struct HeadlessDevice {
    config: HeadlessDeviceConfig,
    state: Mutex<HeadlessState>,
}

impl HeadlessDevice {
    pub fn new(config: HeadlessDeviceConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HeadlessState::default()),
        }
    }

    fn lock(&self) -> DeviceResult<MutexGuard<'_, HeadlessState>> {
        self.state
            .lock()
            .map_err(|_| DeviceResourceError::Backend("headless state lock poisoned".to_string()))
    }

    fn reserve(&self, state: &mut HeadlessState, bytes: u64) -> DeviceResult<()> {
        if let Some(budget) = self.config.memory_budget {
            let available = budget.saturating_sub(state.memory_used);
            if bytes > available {
                return Err(DeviceResourceError::OutOfMemory { requested: bytes, available });
            }
        }
        state.memory_used += bytes;
        Ok(())
    }

    /// Register a program handle (stands in for the shader compiler)
    pub fn create_program(&self, name: &str) -> DeviceResult<ProgramHandle> {
        let mut state = self.lock()?;
        Ok(state.programs.insert(name.to_string()))
    }

    // ===== INSPECTION =====

    pub fn stats(&self) -> HeadlessStats {
        self.lock().map(|s| s.stats).unwrap_or_default()
    }

    pub fn memory_used(&self) -> u64 {
        self.lock().map(|s| s.memory_used).unwrap_or(0)
    }

    pub fn live_buffer_count(&self) -> usize {
        self.lock().map(|s| s.buffers.len()).unwrap_or(0)
    }

    pub fn live_image_count(&self) -> usize {
        self.lock().map(|s| s.images.len()).unwrap_or(0)
    }

    /// Copy of the device-visible bytes of a buffer
    pub fn buffer_contents(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        let state = self.lock().ok()?;
        state.buffers.get(handle).map(|b| b.data.clone())
    }

    /// Binding the buffer was created for
    pub fn buffer_binding(&self, handle: BufferHandle) -> Option<u32> {
        let state = self.lock().ok()?;
        state.buffers.get(handle).map(|b| b.binding)
    }

    pub fn bound_buffer(&self, kind: BufferKind, slot: u32) -> Option<BufferHandle> {
        let state = self.lock().ok()?;
        state.bound_buffers.get(&(kind, slot)).copied()
    }

    pub fn bound_image(&self, slot: u32) -> Option<ImageHandle> {
        let state = self.lock().ok()?;
        state.bound_images.get(&slot).copied()
    }

    pub fn bound_program(&self) -> Option<ProgramHandle> {
        self.lock().ok()?.bound_program
    }

    pub fn image_info(&self, handle: ImageHandle) -> Option<ImageInfo> {
        let state = self.lock().ok()?;
        state.images.get(handle).map(|i| i.info)
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new(HeadlessDeviceConfig::default())
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn backend_name(&self) -> &str {
        &self.config.backend_name
    }

    fn create_buffer(&self, size: u64, binding: u32, kind: BufferKind) -> DeviceResult<BufferHandle> {
        let mut state = self.lock()?;
        self.reserve(&mut state, size)?;
        state.stats.buffers_created += 1;
        Ok(state.buffers.insert(HeadlessBuffer {
            kind,
            binding,
            data: vec![0u8; size as usize],
        }))
    }

    fn upload_buffer(&self, handle: BufferHandle, data: &[u8], offset: u64) -> DeviceResult<()> {
        let mut state = self.lock()?;
        let buffer = state
            .buffers
            .get_mut(handle)
            .ok_or_else(|| DeviceResourceError::InvalidHandle("buffer".to_string()))?;

        let start = offset as usize;
        let end = start + data.len();
        if end > buffer.data.len() {
            return Err(DeviceResourceError::OutOfBounds(format!(
                "upload of {} bytes at offset {} into buffer of {} bytes",
                data.len(),
                offset,
                buffer.data.len()
            )));
        }
        buffer.data[start..end].copy_from_slice(data);
        state.stats.buffer_uploads += 1;
        Ok(())
    }

    fn bind_buffer(&self, handle: BufferHandle, slot: u32, kind: BufferKind) -> DeviceResult<()> {
        let mut state = self.lock()?;
        match state.buffers.get(handle) {
            Some(buffer) if buffer.kind == kind => {}
            Some(_) => {
                return Err(DeviceResourceError::InvalidHandle(format!(
                    "buffer bound as {:?} but created with another kind",
                    kind
                )))
            }
            None => return Err(DeviceResourceError::InvalidHandle("buffer".to_string())),
        }
        state.bound_buffers.insert((kind, slot), handle);
        state.stats.buffer_binds += 1;
        Ok(())
    }

    fn destroy_buffer(&self, handle: BufferHandle) -> DeviceResult<()> {
        let mut state = self.lock()?;
        let buffer = state
            .buffers
            .remove(handle)
            .ok_or_else(|| DeviceResourceError::InvalidHandle("buffer".to_string()))?;
        state.memory_used -= buffer.data.len() as u64;
        state.bound_buffers.retain(|_, bound| *bound != handle);
        state.stats.buffers_destroyed += 1;
        Ok(())
    }

    fn create_image(&self, desc: &ImageDesc) -> DeviceResult<ImageHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(DeviceResourceError::CreationFailed(format!(
                "image extent {}x{} has zero area",
                desc.width, desc.height
            )));
        }

        let byte_size = desc.byte_size();
        let texels = match desc.data {
            Some(bytes) if bytes.len() as u64 != byte_size => {
                return Err(DeviceResourceError::CreationFailed(format!(
                    "image data is {} bytes, expected {}",
                    bytes.len(),
                    byte_size
                )))
            }
            Some(bytes) => bytes.to_vec(),
            None => vec![0u8; byte_size as usize],
        };

        let mut state = self.lock()?;
        self.reserve(&mut state, byte_size)?;
        state.stats.images_created += 1;
        Ok(state.images.insert(HeadlessImage {
            info: ImageInfo {
                format: desc.format,
                width: desc.width,
                height: desc.height,
                depth: desc.depth.max(1),
                samples: desc.samples.max(1),
            },
            texels,
        }))
    }

    fn destroy_image(&self, handle: ImageHandle) -> DeviceResult<()> {
        let mut state = self.lock()?;
        let image = state
            .images
            .remove(handle)
            .ok_or_else(|| DeviceResourceError::InvalidHandle("image".to_string()))?;
        state.memory_used -= image.texels.len() as u64;
        state.bound_images.retain(|_, bound| *bound != handle);
        state.stats.images_destroyed += 1;
        Ok(())
    }

    fn bind_image(&self, handle: ImageHandle, slot: u32) -> DeviceResult<()> {
        let mut state = self.lock()?;
        if !state.images.contains_key(handle) {
            return Err(DeviceResourceError::InvalidHandle("image".to_string()));
        }
        state.bound_images.insert(slot, handle);
        state.stats.image_binds += 1;
        Ok(())
    }

    fn clear_image(&self, handle: ImageHandle, value: i32) -> DeviceResult<()> {
        let mut state = self.lock()?;
        let image = state
            .images
            .get_mut(handle)
            .ok_or_else(|| DeviceResourceError::InvalidHandle("image".to_string()))?;

        // The value fills the first component; remaining bytes are zeroed
        let texel_size = image.info.format.bytes_per_texel() as usize;
        let value_bytes = value.to_le_bytes();
        let copied = texel_size.min(value_bytes.len());
        for texel in image.texels.chunks_exact_mut(texel_size) {
            texel.fill(0);
            texel[..copied].copy_from_slice(&value_bytes[..copied]);
        }
        state.stats.image_clears += 1;
        Ok(())
    }

    fn read_image_pixel(&self, handle: ImageHandle, x: u32, y: u32) -> DeviceResult<i32> {
        let state = self.lock()?;
        let image = state
            .images
            .get(handle)
            .ok_or_else(|| DeviceResourceError::InvalidHandle("image".to_string()))?;

        if x >= image.info.width || y >= image.info.height {
            return Err(DeviceResourceError::OutOfBounds(format!(
                "pixel ({}, {}) outside {}x{} image",
                x, y, image.info.width, image.info.height
            )));
        }

        let texel_size = image.info.format.bytes_per_texel() as usize;
        let start = (y as usize * image.info.width as usize + x as usize) * texel_size;
        let mut raw = [0u8; 4];
        let copied = texel_size.min(4);
        raw[..copied].copy_from_slice(&image.texels[start..start + copied]);
        Ok(i32::from_le_bytes(raw))
    }

    fn bind_program(&self, program: ProgramHandle) -> DeviceResult<()> {
        let mut state = self.lock()?;
        if !state.programs.contains_key(program) {
            return Err(DeviceResourceError::InvalidHandle("program".to_string()));
        }
        state.bound_program = Some(program);
        state.stats.program_binds += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "headless_device_tests.rs"]
mod tests;
