/// Sampled textures built from raw texel bytes.
///
/// Decoding image files belongs to the asset importer; these types only
/// move already-decoded bytes to a device image and bind it.

use std::sync::Arc;
use crate::device::{GraphicsDevice, ImageHandle, ImageDesc, TextureFormat};
use crate::error::{Error, Result};
use crate::{engine_debug, engine_error, engine_warn};

// ===== TEXTURE 2D =====

pub struct Texture2D {
    device: Arc<dyn GraphicsDevice>,
    image: ImageHandle,
    name: String,
    format: TextureFormat,
    width: u32,
    height: u32,
}

impl Texture2D {
    /// Create a 2D texture; `data` must hold exactly width * height texels
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        name: impl Into<String>,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> Result<Self> {
        let name = name.into();
        let desc = ImageDesc { data, ..ImageDesc::new_2d(format, width, height) };
        let image = device.create_image(&desc).map_err(|err| {
            engine_error!("galaxy3d::Texture2D", "Failed to create texture '{}': {}", name, err);
            Error::from(err)
        })?;

        engine_debug!("galaxy3d::Texture2D", "Created texture '{}' ({}x{} {:?})", name, width, height, format);

        Ok(Self { device, image, name, format, width, height })
    }

    /// 1x1 texture of a single RGBA8 texel (placeholder textures)
    pub fn solid_color(device: Arc<dyn GraphicsDevice>, name: impl Into<String>, rgba: [u8; 4]) -> Result<Self> {
        Self::create(device, name, TextureFormat::R8G8B8A8_UNORM, 1, 1, Some(&rgba))
    }

    pub fn bind(&self, slot: u32) -> Result<()> {
        self.device.bind_image(self.image, slot)?;
        Ok(())
    }

    pub fn image(&self) -> ImageHandle {
        self.image
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        if let Err(err) = self.device.destroy_image(self.image) {
            engine_warn!("galaxy3d::Texture2D", "Failed to destroy texture '{}': {}", self.name, err);
        }
    }
}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

// ===== TEXTURE 3D =====

pub struct Texture3D {
    device: Arc<dyn GraphicsDevice>,
    image: ImageHandle,
    name: String,
    format: TextureFormat,
    width: u32,
    height: u32,
    depth: u32,
}

impl Texture3D {
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        name: impl Into<String>,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
        data: Option<&[u8]>,
    ) -> Result<Self> {
        let name = name.into();
        let desc = ImageDesc {
            depth,
            data,
            ..ImageDesc::new_2d(format, width, height)
        };
        let image = device.create_image(&desc).map_err(|err| {
            engine_error!("galaxy3d::Texture3D", "Failed to create texture '{}': {}", name, err);
            Error::from(err)
        })?;

        Ok(Self { device, image, name, format, width, height, depth })
    }

    pub fn bind(&self, slot: u32) -> Result<()> {
        self.device.bind_image(self.image, slot)?;
        Ok(())
    }

    pub fn image(&self) -> ImageHandle {
        self.image
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Drop for Texture3D {
    fn drop(&mut self) {
        if let Err(err) = self.device.destroy_image(self.image) {
            engine_warn!("galaxy3d::Texture3D", "Failed to destroy texture '{}': {}", self.name, err);
        }
    }
}

impl std::fmt::Debug for Texture3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture3D")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("extent", &(self.width, self.height, self.depth))
            .finish()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
