use crate::errors::*;
use crate::video::prelude::*;

/// A pair of source and destination blend factors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Multiplies the scene by the light map.
    pub const DIFFUSE: BlendFunc = BlendFunc {
        src: BlendFactor::Value(BlendValue::DestinationColor),
        dst: BlendFactor::Zero,
    };

    /// Darkens the scene by the alpha of the light map, and adds its color.
    pub const SHADOW: BlendFunc = BlendFunc {
        src: BlendFactor::One,
        dst: BlendFactor::OneMinusValue(BlendValue::SourceAlpha),
    };

    /// Additive blending weighted by source alpha.
    pub const SIMPLE: BlendFunc = BlendFunc {
        src: BlendFactor::Value(BlendValue::SourceAlpha),
        dst: BlendFactor::One,
    };

    #[inline]
    pub fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        BlendFunc { src, dst }
    }

    /// Makes this the active blend function of `video`.
    #[inline]
    pub fn apply(&self, video: &VideoDevice) -> Result<()> {
        video.set_blend_func(self.src, self.dst)?;
        Ok(())
    }
}

/// The three blend functions a `RayHandler` composites with. They start out as the
/// constants of `BlendFunc` and could be tweaked per handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlendFuncs {
    pub diffuse: BlendFunc,
    pub shadow: BlendFunc,
    pub simple: BlendFunc,
}

impl Default for BlendFuncs {
    fn default() -> Self {
        BlendFuncs {
            diffuse: BlendFunc::DIFFUSE,
            shadow: BlendFunc::SHADOW,
            simple: BlendFunc::SIMPLE,
        }
    }
}
