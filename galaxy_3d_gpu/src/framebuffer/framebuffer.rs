/// Framebuffer: a set of color attachments plus an optional depth attachment.
///
/// Attachments are described by an ordered list of texture specs. Depth
/// formats go to the depth slot, everything else becomes a color
/// attachment in declaration order. Resizing destroys and recreates every
/// image, bumps the rebuild generation and notifies resize callbacks.

use std::sync::Arc;
use glam::Vec4;
use crate::device::{GraphicsDevice, ImageHandle, ImageDesc, TextureFormat, SurfaceExtent};
use crate::error::{Error, Result};
use crate::{engine_contract, engine_contract_bail, engine_debug, engine_warn};

const SOURCE: &str = "galaxy3d::Framebuffer";

// ===== CREATION PARAMETERS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramebufferBlendMode {
    #[default]
    None,
    OneZero,
    SrcAlphaOneMinusSrcAlpha,
    Additive,
    ZeroSrcColor,
}

/// One attachment of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramebufferTextureSpec {
    pub format: TextureFormat,
    pub blend: bool,
    pub blend_mode: FramebufferBlendMode,
}

impl FramebufferTextureSpec {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            blend: true,
            blend_mode: FramebufferBlendMode::SrcAlphaOneMinusSrcAlpha,
        }
    }
}

impl From<TextureFormat> for FramebufferTextureSpec {
    fn from(format: TextureFormat) -> Self {
        Self::new(format)
    }
}

/// Framebuffer creation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FramebufferSpec {
    /// Multiplier applied to width and height when images are built
    pub scale: f32,
    /// 0 = surface width
    pub width: u32,
    /// 0 = surface height
    pub height: u32,
    pub clear_color: Vec4,
    pub depth_clear_value: f32,
    pub attachments: Vec<FramebufferTextureSpec>,
    pub samples: u32,
    pub clear_on_load: bool,
    pub clear_color_on_load: bool,
    pub clear_depth_on_load: bool,
    pub should_sample: bool,
    /// Ignore non-forced resizes (window resize broadcasts)
    pub no_resize: bool,
    pub swapchain_target: bool,
    pub blend: bool,
    pub blend_mode: FramebufferBlendMode,
    pub debug_name: String,
}

impl Default for FramebufferSpec {
    fn default() -> Self {
        Self {
            scale: 1.0,
            width: 0,
            height: 0,
            clear_color: Vec4::ONE,
            depth_clear_value: 0.0,
            attachments: Vec::new(),
            samples: 1,
            clear_on_load: true,
            clear_color_on_load: true,
            clear_depth_on_load: true,
            should_sample: true,
            no_resize: false,
            swapchain_target: false,
            blend: true,
            blend_mode: FramebufferBlendMode::None,
            debug_name: String::new(),
        }
    }
}

// ===== FRAMEBUFFER =====

/// Called with the rebuilt framebuffer after every resize
pub type ResizeCallback = Box<dyn FnMut(&Framebuffer) + Send>;

pub struct Framebuffer {
    device: Arc<dyn GraphicsDevice>,
    spec: FramebufferSpec,
    color_formats: Vec<TextureFormat>,
    depth_format: Option<TextureFormat>,
    color_images: Vec<ImageHandle>,
    depth_image: Option<ImageHandle>,
    width: u32,
    height: u32,
    generation: u64,
    callbacks: Vec<ResizeCallback>,
}

impl Framebuffer {
    /// Create and build a framebuffer
    ///
    /// A zero width or height in `spec` is replaced by the surface extent.
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        spec: FramebufferSpec,
        surface: &dyn SurfaceExtent,
    ) -> Result<Self> {
        if spec.attachments.is_empty() {
            engine_contract_bail!(SOURCE, "Framebuffer '{}' has no attachments", spec.debug_name);
        }

        let mut color_formats = Vec::new();
        let mut depth_format = None;
        for attachment in &spec.attachments {
            if attachment.format.is_depth() {
                if depth_format.is_some() {
                    engine_contract_bail!(
                        SOURCE,
                        "Framebuffer '{}' declares more than one depth attachment",
                        spec.debug_name
                    );
                }
                depth_format = Some(attachment.format);
            } else {
                color_formats.push(attachment.format);
            }
        }

        let extent = surface.extent();
        let width = if spec.width == 0 { extent.width } else { spec.width };
        let height = if spec.height == 0 { extent.height } else { spec.height };

        let mut framebuffer = Self {
            device,
            spec,
            color_formats,
            depth_format,
            color_images: Vec::new(),
            depth_image: None,
            width: 0,
            height: 0,
            generation: 0,
            callbacks: Vec::new(),
        };
        framebuffer.resize(width, height, true)?;
        Ok(framebuffer)
    }

    /// Rebuild every image at the new size; returns true when a rebuild happened
    ///
    /// Without `force`, the call is a no-op for `no_resize` framebuffers and
    /// when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32, force: bool) -> Result<bool> {
        if width == 0 || height == 0 {
            engine_contract_bail!(
                SOURCE,
                "Cannot resize framebuffer '{}' to {}x{}",
                self.spec.debug_name,
                width,
                height
            );
        }
        if !force && (self.spec.no_resize || (width == self.width && height == self.height)) {
            return Ok(false);
        }

        self.release_images();
        if let Err(err) = self.build_images(self.scale(width), self.scale(height)) {
            // Unbuilt: the next resize rebuilds whatever size it asks for
            self.release_images();
            self.width = 0;
            self.height = 0;
            return Err(err);
        }
        self.width = width;
        self.height = height;
        self.spec.width = width;
        self.spec.height = height;
        self.generation += 1;

        engine_debug!(
            SOURCE,
            "Framebuffer '{}' rebuilt at {}x{} (generation {})",
            self.spec.debug_name,
            self.scaled_width(),
            self.scaled_height(),
            self.generation
        );

        let mut callbacks = std::mem::take(&mut self.callbacks);
        for callback in callbacks.iter_mut() {
            callback(&*self);
        }
        self.callbacks = callbacks;
        Ok(true)
    }

    fn build_images(&mut self, width: u32, height: u32) -> Result<()> {
        let samples = self.spec.samples.max(1);

        for &format in &self.color_formats {
            let desc = ImageDesc { samples, ..ImageDesc::new_2d(format, width, height) };
            let image = self.device.create_image(&desc)?;
            self.color_images.push(image);
        }
        if let Some(format) = self.depth_format {
            let desc = ImageDesc { samples, ..ImageDesc::new_2d(format, width, height) };
            self.depth_image = Some(self.device.create_image(&desc)?);
        }
        Ok(())
    }

    fn release_images(&mut self) {
        let mut images: Vec<ImageHandle> = self.color_images.drain(..).collect();
        images.extend(self.depth_image.take());
        for image in images {
            if let Err(err) = self.device.destroy_image(image) {
                engine_warn!(SOURCE, "Failed to destroy attachment of '{}': {}", self.spec.debug_name, err);
            }
        }
    }

    /// Register a callback invoked after every rebuild
    pub fn add_resize_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Framebuffer) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    // ===== ATTACHMENT OPERATIONS =====

    fn attachment(&self, index: u32) -> Result<ImageHandle> {
        self.color_images.get(index as usize).copied().ok_or_else(|| {
            engine_contract!(
                SOURCE,
                "Attachment {} out of range ('{}' has {} color attachments)",
                index,
                self.spec.debug_name,
                self.color_images.len()
            )
        })
    }

    /// Bind a color attachment as a sampled texture
    pub fn bind_texture(&self, attachment: u32, slot: u32) -> Result<()> {
        let image = self.attachment(attachment)?;
        self.device.bind_image(image, slot)?;
        Ok(())
    }

    pub fn clear_attachment(&self, attachment: u32, value: i32) -> Result<()> {
        let image = self.attachment(attachment)?;
        self.device.clear_image(image, value)?;
        Ok(())
    }

    /// Read one texel of a color attachment (entity picking)
    pub fn read_pixel(&self, attachment: u32, x: u32, y: u32) -> Result<i32> {
        let image = self.attachment(attachment)?;
        self.device.read_image_pixel(image, x, y).map_err(Error::from)
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn scale(&self, extent: u32) -> u32 {
        ((extent as f32 * self.spec.scale) as u32).max(1)
    }

    /// Width of the images after applying the scale
    pub fn scaled_width(&self) -> u32 {
        self.scale(self.width)
    }

    pub fn scaled_height(&self) -> u32 {
        self.scale(self.height)
    }

    /// False after a rebuild failed; every attachment is then released
    pub fn is_built(&self) -> bool {
        self.width != 0 && self.height != 0
    }

    pub fn image(&self, attachment: u32) -> Result<ImageHandle> {
        self.attachment(attachment)
    }

    pub fn depth_image(&self) -> Option<ImageHandle> {
        self.depth_image
    }

    pub fn color_attachment_count(&self) -> usize {
        self.color_formats.len()
    }

    pub fn has_depth_attachment(&self) -> bool {
        self.depth_format.is_some()
    }

    pub fn spec(&self) -> &FramebufferSpec {
        &self.spec
    }

    /// Number of rebuilds since creation (1 after `create`)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_resizable(&self) -> bool {
        !self.spec.no_resize
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.release_images();
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("debug_name", &self.spec.debug_name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_attachments", &self.color_formats)
            .field("depth_attachment", &self.depth_format)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
