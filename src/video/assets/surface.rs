//! A `Surface` is an off-screen render destination backed by a color render texture.
//! The default framebuffer is not a surface, it is bound with `None`.

use crate::math::Vector2;

use super::texture::RenderTextureHandle;

impl_handle!(SurfaceHandle);

/// The parameters of a off-screen surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceParams {
    /// The color attachment that draws into this surface end up in.
    pub color: RenderTextureHandle,
}

/// The viewport of the currently bound surface, in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceViewport {
    pub position: Vector2<i32>,
    pub size: Vector2<u32>,
}

impl SurfaceViewport {
    #[inline]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        SurfaceViewport {
            position: Vector2::new(x, y),
            size: Vector2::new(width, height),
        }
    }

    /// A viewport covering `dimensions` from the origin.
    #[inline]
    pub fn full(dimensions: Vector2<u32>) -> Self {
        SurfaceViewport {
            position: Vector2::new(0, 0),
            size: dimensions,
        }
    }
}
