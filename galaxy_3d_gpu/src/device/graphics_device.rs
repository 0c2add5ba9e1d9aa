/// Graphics device trait - the primitive interface every backend implements
///
/// The GPU layer never talks to Vulkan, OpenGL or DirectX directly: it only
/// creates, uploads, binds and destroys opaque resources through this trait.
/// Backends are selected at context construction and may coexist.

use std::fmt;
use slotmap::new_key_type;
use crate::device::texture_format::TextureFormat;

new_key_type! {
    /// Opaque handle to a device-side buffer
    pub struct BufferHandle;

    /// Opaque handle to a device-side image (texture or attachment)
    pub struct ImageHandle;

    /// Opaque handle to a compiled shader program
    pub struct ProgramHandle;
}

/// Binding policy of a device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Constant buffer (small, read-only in shaders)
    Uniform,
    /// Shader storage buffer (large, read-write in shaders)
    Storage,
}

/// Parameters for creating a device image
#[derive(Debug, Clone, Copy)]
pub struct ImageDesc<'a> {
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    /// 1 for 2D images
    pub depth: u32,
    pub samples: u32,
    /// Initial texel bytes, tightly packed (None = undefined contents)
    pub data: Option<&'a [u8]>,
}

impl<'a> ImageDesc<'a> {
    /// 2D single-sampled image without initial data
    pub fn new_2d(format: TextureFormat, width: u32, height: u32) -> Self {
        Self { format, width, height, depth: 1, samples: 1, data: None }
    }

    /// Byte size of the full image
    pub fn byte_size(&self) -> u64 {
        self.width as u64
            * self.height as u64
            * self.depth.max(1) as u64
            * self.format.bytes_per_texel() as u64
    }
}

/// Device-level failure, recoverable by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceResourceError {
    /// Allocation exceeds the remaining device memory
    OutOfMemory { requested: u64, available: u64 },
    /// Handle was never created or has already been destroyed
    InvalidHandle(String),
    /// Backend refused to create the resource
    CreationFailed(String),
    /// Upload or read outside the resource bounds
    OutOfBounds(String),
    /// Backend-internal failure (lost device, poisoned state, ...)
    Backend(String),
}

impl fmt::Display for DeviceResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceResourceError::OutOfMemory { requested, available } => write!(
                f,
                "out of device memory (requested {} bytes, {} available)",
                requested, available
            ),
            DeviceResourceError::InvalidHandle(what) => write!(f, "invalid handle: {}", what),
            DeviceResourceError::CreationFailed(msg) => write!(f, "creation failed: {}", msg),
            DeviceResourceError::OutOfBounds(msg) => write!(f, "out of bounds: {}", msg),
            DeviceResourceError::Backend(msg) => write!(f, "backend failure: {}", msg),
        }
    }
}

impl std::error::Error for DeviceResourceError {}

/// Result type for device primitives
pub type DeviceResult<T> = std::result::Result<T, DeviceResourceError>;

/// Primitive device interface
///
/// All methods take `&self`: backends synchronize internally so a device
/// can be shared as `Arc<dyn GraphicsDevice>`.
pub trait GraphicsDevice: Send + Sync {
    /// Human-readable backend name ("headless", "vulkan", ...)
    fn backend_name(&self) -> &str;

    // ===== BUFFERS =====

    /// Create a zero-filled buffer of `size` bytes intended for `binding`
    fn create_buffer(&self, size: u64, binding: u32, kind: BufferKind) -> DeviceResult<BufferHandle>;

    /// Copy `data` into the buffer at byte `offset`
    fn upload_buffer(&self, handle: BufferHandle, data: &[u8], offset: u64) -> DeviceResult<()>;

    /// Bind the buffer to a shader slot
    fn bind_buffer(&self, handle: BufferHandle, slot: u32, kind: BufferKind) -> DeviceResult<()>;

    fn destroy_buffer(&self, handle: BufferHandle) -> DeviceResult<()>;

    // ===== IMAGES =====

    fn create_image(&self, desc: &ImageDesc) -> DeviceResult<ImageHandle>;

    fn destroy_image(&self, handle: ImageHandle) -> DeviceResult<()>;

    /// Bind the image as a sampled texture at `slot`
    fn bind_image(&self, handle: ImageHandle, slot: u32) -> DeviceResult<()>;

    /// Fill every texel with `value`
    fn clear_image(&self, handle: ImageHandle, value: i32) -> DeviceResult<()>;

    /// Read back one texel as a signed integer (picking buffers)
    fn read_image_pixel(&self, handle: ImageHandle, x: u32, y: u32) -> DeviceResult<i32>;

    // ===== PROGRAMS =====

    fn bind_program(&self, program: ProgramHandle) -> DeviceResult<()>;
}
