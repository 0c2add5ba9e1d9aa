/// Fluent construction of framebuffer specs.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use galaxy_3d_gpu::galaxy3d::*;
/// # fn demo(device: Arc<dyn GraphicsDevice>) -> Result<()> {
/// let gbuffer = FramebufferBuilder::new()
///     .debug_name("GBuffer")
///     .attachments([TextureFormat::R16G16B16A16_SFLOAT, TextureFormat::DEPTH])
///     .with_no_resize()
///     .build(device, &Extent2D::new(1280, 720))?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use glam::Vec4;
use crate::device::{GraphicsDevice, SurfaceExtent};
use crate::error::Result;
use crate::framebuffer::framebuffer::{
    Framebuffer, FramebufferSpec, FramebufferTextureSpec, FramebufferBlendMode,
};

#[derive(Debug, Clone, Default)]
pub struct FramebufferBuilder {
    spec: FramebufferSpec,
}

impl FramebufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug_name(mut self, name: impl Into<String>) -> Self {
        self.spec.debug_name = name.into();
        self
    }

    pub fn clear_color(mut self, color: Vec4) -> Self {
        self.spec.clear_color = color;
        self
    }

    pub fn samples(mut self, samples: u32) -> Self {
        self.spec.samples = samples;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.spec.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.spec.height = height;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.spec.scale = scale;
        self
    }

    pub fn depth_clear_value(mut self, value: f32) -> Self {
        self.spec.depth_clear_value = value;
        self
    }

    pub fn with_clear_on_load(mut self) -> Self {
        self.spec.clear_on_load = true;
        self
    }

    pub fn with_clear_color_on_load(mut self) -> Self {
        self.spec.clear_color_on_load = true;
        self
    }

    pub fn with_clear_depth_on_load(mut self) -> Self {
        self.spec.clear_depth_on_load = true;
        self
    }

    pub fn with_sampling(mut self) -> Self {
        self.spec.should_sample = true;
        self
    }

    pub fn with_no_resize(mut self) -> Self {
        self.spec.no_resize = true;
        self
    }

    pub fn with_swapchain_target(mut self) -> Self {
        self.spec.swapchain_target = true;
        self
    }

    pub fn with_blending(mut self) -> Self {
        self.spec.blend = true;
        self
    }

    pub fn blend_mode(mut self, mode: FramebufferBlendMode) -> Self {
        self.spec.blend_mode = mode;
        self
    }

    /// Replace the attachment list
    pub fn attachments<I, T>(mut self, attachments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FramebufferTextureSpec>,
    {
        self.spec.attachments = attachments.into_iter().map(Into::into).collect();
        self
    }

    pub fn spec(&self) -> &FramebufferSpec {
        &self.spec
    }

    pub fn into_spec(self) -> FramebufferSpec {
        self.spec
    }

    pub fn build(self, device: Arc<dyn GraphicsDevice>, surface: &dyn SurfaceExtent) -> Result<Framebuffer> {
        Framebuffer::create(device, self.spec, surface)
    }
}

#[cfg(test)]
#[path = "framebuffer_builder_tests.rs"]
mod tests;
