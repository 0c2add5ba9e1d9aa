/// Bounded collection of shared framebuffers.
///
/// The pool is owned by the render context. Window resize events are
/// broadcast through it to every resizable framebuffer.

use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::framebuffer::framebuffer::Framebuffer;
use crate::{engine_err, engine_trace, engine_warn};

const SOURCE: &str = "galaxy3d::FramebufferPool";

pub const DEFAULT_MAX_FRAMEBUFFERS: usize = 32;

/// Framebuffer shared between the pool and its users
pub type SharedFramebuffer = Arc<Mutex<Framebuffer>>;

pub struct FramebufferPool {
    framebuffers: Vec<SharedFramebuffer>,
    capacity: usize,
}

impl FramebufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            framebuffers: Vec::new(),
            capacity,
        }
    }

    /// Append a framebuffer; returns false without pooling it when full
    pub fn add(&mut self, framebuffer: SharedFramebuffer) -> bool {
        if self.framebuffers.len() >= self.capacity {
            return false;
        }
        self.framebuffers.push(framebuffer);
        true
    }

    pub fn all(&self) -> &[SharedFramebuffer] {
        &self.framebuffers
    }

    pub fn len(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.framebuffers.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.framebuffers.clear();
    }

    /// Resize every resizable framebuffer; returns how many were rebuilt
    ///
    /// A zero dimension (minimised window) skips the broadcast entirely.
    /// A framebuffer that fails to rebuild does not stop the others; the
    /// first failure is returned once every framebuffer has been visited.
    pub fn broadcast_resize(&self, width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            engine_trace!(SOURCE, "Skipping resize broadcast for {}x{}", width, height);
            return Ok(0);
        }

        let mut rebuilt = 0;
        let mut first_error = None;
        for shared in &self.framebuffers {
            let result = shared
                .lock()
                .map_err(|_| engine_err!(SOURCE, "Framebuffer lock poisoned"))
                .and_then(|mut framebuffer| {
                    if framebuffer.is_resizable() {
                        framebuffer.resize(width, height, false)
                    } else {
                        Ok(false)
                    }
                });
            match result {
                Ok(true) => rebuilt += 1,
                Ok(false) => {}
                Err(err) => {
                    engine_warn!(SOURCE, "Framebuffer failed to follow resize to {}x{}: {}", width, height, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(rebuilt),
        }
    }
}

impl Default for FramebufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAMEBUFFERS)
    }
}

#[cfg(test)]
#[path = "framebuffer_pool_tests.rs"]
mod tests;
