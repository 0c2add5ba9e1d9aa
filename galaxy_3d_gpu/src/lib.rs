/*!
# Galaxy 3D GPU

GPU resource and state layer of the Galaxy 3D engine.

This crate turns flat field layouts into GPU buffers, multiplexes them across
frames in flight, manages render targets whose size follows the window, and
binds shader-reflected material properties. Device backends plug in behind
the small `GraphicsDevice` trait; `HeadlessDevice` keeps everything in CPU
memory for headless runs and tests.

## Architecture

- **BufferLayout**: named, typed fields packed in declaration order
- **GpuBuffer**: uniform / storage buffer with a CPU shadow copy
- **BufferSet**: one buffer per (frame, set, binding)
- **Framebuffer**: color + depth attachments rebuilt on resize
- **FramebufferPool**: broadcasts window resizes to pooled framebuffers
- **Material**: shader properties resolved through reflection
- **RenderContext**: owns the device, the pool and the current frame
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod device;
pub mod layout;
pub mod buffer;
pub mod framebuffer;
pub mod shader;
pub mod texture;
pub mod material;
pub mod context;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub use crate::device::{
        GraphicsDevice, BufferHandle, ImageHandle, ProgramHandle, BufferKind, ImageDesc,
        DeviceResourceError, DeviceResult, TextureFormat, HeadlessDevice, HeadlessDeviceConfig,
        HeadlessStats, ImageInfo, SurfaceExtent, Extent2D,
    };
    pub use crate::layout::{BufferLayout, FieldDesc, FieldType};
    pub use crate::buffer::{
        GpuBuffer, BufferKindMarker, Uniform, Storage, UniformBuffer, StorageBuffer,
        BufferSet, SlotKey, UniformBufferSet, StorageBufferSet,
    };
    pub use crate::framebuffer::{
        Framebuffer, FramebufferSpec, FramebufferTextureSpec, FramebufferBlendMode, ResizeCallback,
        FramebufferPool, SharedFramebuffer, DEFAULT_MAX_FRAMEBUFFERS, FramebufferBuilder,
    };
    pub use crate::shader::{
        Shader, ShaderReflection, ShaderBuffer, ShaderUniform, ShaderUniformType,
        ShaderResourceDeclaration, ResourceDimension, ResolvedUniform, ReloadCallbackKey,
        ReloadCallback,
    };
    pub use crate::texture::{Texture2D, Texture3D};
    pub use crate::material::{Material, MaterialFlags, MaterialValue};
    pub use crate::context::{RenderContext, Config};
}

// Re-export math library at crate root
pub use glam;
