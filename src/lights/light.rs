use crate::errors::*;

use super::handler::RayHandler;

/// A light source driven by a `RayHandler`.
///
/// The handler never looks at the concrete type of a light. Each light culls itself
/// through `RayHandler::intersect`, applies `RayHandler::light_blend_func`, draws with
/// the light shader already bound and reports the draw through
/// `RayHandler::mark_rendered` once it has been issued.
///
/// Whether a light casts shadows does not change its blend function. Shadows only
/// exist inside the light map, where every light accumulates additively with the
/// simple function. The shadow and diffuse functions darken or multiply the scene, so
/// they are applied once by the composite and never per light.
pub trait Light {
    /// Updates the internal state of the light, e.g. culling and ray casting against
    /// the occluders. Must not touch the GPU.
    fn update(&mut self, handler: &RayHandler);

    /// Draws the light into the bound destination.
    fn render(&mut self, handler: &RayHandler) -> Result<()>;
}

impl<L: Light + ?Sized> Light for Box<L> {
    #[inline]
    fn update(&mut self, handler: &RayHandler) {
        (**self).update(handler)
    }

    #[inline]
    fn render(&mut self, handler: &RayHandler) -> Result<()> {
        (**self).render(handler)
    }
}

impl<'a, L: Light + ?Sized> Light for &'a mut L {
    #[inline]
    fn update(&mut self, handler: &RayHandler) {
        (**self).update(handler)
    }

    #[inline]
    fn render(&mut self, handler: &RayHandler) -> Result<()> {
        (**self).render(handler)
    }
}
