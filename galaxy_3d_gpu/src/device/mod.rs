//! Primitive device contract and the in-crate headless backend

pub mod graphics_device;
pub mod texture_format;
pub mod headless_device;
pub mod surface;

pub use graphics_device::{
    GraphicsDevice, BufferHandle, ImageHandle, ProgramHandle, BufferKind, ImageDesc,
    DeviceResourceError, DeviceResult,
};
pub use texture_format::TextureFormat;
pub use headless_device::{HeadlessDevice, HeadlessDeviceConfig, HeadlessStats, ImageInfo};
pub use surface::{SurfaceExtent, Extent2D};
