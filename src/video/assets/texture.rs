//! A `RenderTexture` object is basicly texture object with special format. It can be
//! used as a render target, and as the source of a texture access from a shader.

use crate::math::Vector2;
use crate::video::errors::{Error, Result};

impl_handle!(RenderTextureHandle);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderTextureParams {
    pub format: RenderTextureFormat,
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    pub dimensions: Vector2<u32>,
}

impl Default for RenderTextureParams {
    fn default() -> Self {
        RenderTextureParams {
            format: RenderTextureFormat::RGBA8,
            wrap: TextureWrap::Clamp,
            filter: TextureFilter::Linear,
            dimensions: Vector2::new(0, 0),
        }
    }
}

impl RenderTextureParams {
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.x == 0 || self.dimensions.y == 0 {
            return Err(Error::RenderTextureInvalid(format!(
                "dimensions {}x{} must be non-zero.",
                self.dimensions.x, self.dimensions.y
            )));
        }

        Ok(())
    }
}

/// Render texture formats. The light map needs an alpha channel, since the ambient
/// darkness is written through it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RenderTextureFormat {
    RGB8,
    RGBA8,
}

impl RenderTextureFormat {
    pub fn has_alpha(self) -> bool {
        self == RenderTextureFormat::RGBA8
    }
}

/// Wrap mode of texture lookups outside [0, 1].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureWrap {
    Repeat,
    Clamp,
}

/// Filter of texture lookups.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureFilter {
    Nearest,
    Linear,
}
