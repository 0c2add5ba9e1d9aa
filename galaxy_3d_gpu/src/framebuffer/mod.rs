//! Render targets: framebuffers, their shared pool and a fluent builder

pub mod framebuffer;
pub mod framebuffer_pool;
pub mod framebuffer_builder;

pub use framebuffer::{
    Framebuffer, FramebufferSpec, FramebufferTextureSpec, FramebufferBlendMode, ResizeCallback,
};
pub use framebuffer_pool::{FramebufferPool, SharedFramebuffer, DEFAULT_MAX_FRAMEBUFFERS};
pub use framebuffer_builder::FramebufferBuilder;
