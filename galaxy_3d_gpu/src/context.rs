/// Render context: owns the device, the framebuffer pool and the frame-in-flight index.
///
/// Everything that needs "the current frame" or "all framebuffers" goes
/// through a context passed by reference instead of a process-wide global.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use galaxy_3d_gpu::galaxy3d::{RenderContext, Config, HeadlessDevice, GraphicsDevice};
///
/// let device: Arc<dyn GraphicsDevice> = Arc::new(HeadlessDevice::default());
/// let mut context = RenderContext::new(device, Config::default())?;
///
/// assert_eq!(context.current_frame(), 0);
/// context.advance_frame();
/// assert_eq!(context.current_frame(), 1);
/// # Ok::<(), galaxy_3d_gpu::galaxy3d::Error>(())
/// ```

use std::sync::{Arc, Mutex};
use crate::buffer::{UniformBufferSet, StorageBufferSet};
use crate::device::{GraphicsDevice, ProgramHandle, SurfaceExtent};
use crate::error::{Error, Result};
use crate::framebuffer::{Framebuffer, FramebufferSpec, FramebufferPool, SharedFramebuffer, DEFAULT_MAX_FRAMEBUFFERS};
use crate::shader::{Shader, ShaderReflection};
use crate::{engine_debug, engine_error, engine_info, engine_trace};

const SOURCE: &str = "galaxy3d::RenderContext";

/// Render context configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of frames the CPU may prepare ahead of the GPU
    pub frames_in_flight: u32,
    /// Framebuffer pool capacity
    pub max_pooled_framebuffers: usize,
    /// Application name
    pub app_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frames_in_flight: 3,
            max_pooled_framebuffers: DEFAULT_MAX_FRAMEBUFFERS,
            app_name: "Galaxy3D Application".to_string(),
        }
    }
}

pub struct RenderContext {
    device: Arc<dyn GraphicsDevice>,
    config: Config,
    framebuffer_pool: FramebufferPool,
    current_frame: u32,
    frame_count: u64,
}

impl RenderContext {
    pub fn new(device: Arc<dyn GraphicsDevice>, config: Config) -> Result<Self> {
        if config.frames_in_flight == 0 {
            engine_error!(SOURCE, "frames_in_flight must be at least 1");
            return Err(Error::InitializationFailed(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }

        engine_info!(
            SOURCE,
            "Render context '{}' created on {} backend ({} frames in flight)",
            config.app_name,
            device.backend_name(),
            config.frames_in_flight
        );

        Ok(Self {
            framebuffer_pool: FramebufferPool::new(config.max_pooled_framebuffers),
            device,
            config,
            current_frame: 0,
            frame_count: 0,
        })
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frames_in_flight(&self) -> u32 {
        self.config.frames_in_flight
    }

    /// Index of the frame-in-flight currently being prepared
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Number of completed `advance_frame` calls
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Hand the current frame over and move to the next slot; returns the new index
    pub fn advance_frame(&mut self) -> u32 {
        self.current_frame = (self.current_frame + 1) % self.config.frames_in_flight;
        self.frame_count += 1;
        engine_trace!(SOURCE, "Advanced to frame-in-flight {}", self.current_frame);
        self.current_frame
    }

    // ===== RESOURCE CREATION =====

    /// Empty uniform buffer set sized to the frames in flight
    pub fn create_uniform_buffer_set(&self) -> UniformBufferSet {
        UniformBufferSet::new(self.config.frames_in_flight)
    }

    /// Empty storage buffer set sized to the frames in flight
    pub fn create_storage_buffer_set(&self) -> StorageBufferSet {
        StorageBufferSet::new(self.config.frames_in_flight)
    }

    pub fn create_shader(
        &self,
        name: impl Into<String>,
        program: ProgramHandle,
        reflection: ShaderReflection,
    ) -> Arc<Shader> {
        Arc::new(Shader::new(self.device.clone(), name, program, reflection))
    }

    /// Create a framebuffer and register it for resize broadcasts
    ///
    /// When the pool is full the framebuffer is still returned, it just
    /// stops following window resizes.
    pub fn create_framebuffer(
        &mut self,
        spec: FramebufferSpec,
        surface: &dyn SurfaceExtent,
    ) -> Result<SharedFramebuffer> {
        let framebuffer = Framebuffer::create(self.device.clone(), spec, surface)?;
        let shared = Arc::new(Mutex::new(framebuffer));
        if !self.framebuffer_pool.add(shared.clone()) {
            engine_trace!(SOURCE, "Framebuffer pool full, new framebuffer is not pooled");
        }
        Ok(shared)
    }

    pub fn framebuffer_pool(&self) -> &FramebufferPool {
        &self.framebuffer_pool
    }

    pub fn framebuffer_pool_mut(&mut self) -> &mut FramebufferPool {
        &mut self.framebuffer_pool
    }

    // ===== EVENTS =====

    /// Propagate a window resize to every pooled resizable framebuffer
    pub fn on_window_resized(&self, width: u32, height: u32) -> Result<usize> {
        let rebuilt = self.framebuffer_pool.broadcast_resize(width, height)?;
        engine_debug!(SOURCE, "Window resized to {}x{}, {} framebuffers rebuilt", width, height, rebuilt);
        Ok(rebuilt)
    }

    /// Release pooled framebuffers
    ///
    /// Framebuffers still shared elsewhere are destroyed when their last owner drops them.
    pub fn shutdown(&mut self) {
        let pooled = self.framebuffer_pool.len();
        self.framebuffer_pool.clear();
        engine_info!(SOURCE, "Render context '{}' shut down ({} framebuffers released)", self.config.app_name, pooled);
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("backend", &self.device.backend_name())
            .field("config", &self.config)
            .field("current_frame", &self.current_frame)
            .field("pooled_framebuffers", &self.framebuffer_pool.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
