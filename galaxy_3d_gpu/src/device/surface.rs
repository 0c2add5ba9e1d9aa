/// Surface extent provider
///
/// Framebuffers whose width or height is left at 0 take the size of the
/// surface they are created against.

use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Width and height in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimised window reports a zero dimension
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<PhysicalSize<u32>> for Extent2D {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self { width: size.width, height: size.height }
    }
}

/// Anything that can report the current drawable size
pub trait SurfaceExtent {
    fn extent(&self) -> Extent2D;
}

impl SurfaceExtent for Extent2D {
    fn extent(&self) -> Extent2D {
        *self
    }
}

impl SurfaceExtent for Window {
    fn extent(&self) -> Extent2D {
        self.inner_size().into()
    }
}
