use std::ops::{Deref, DerefMut};

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::Color;

use super::fan::{Positional, RayFan};
use super::handler::RayHandler;
use super::light::Light;
use super::mode::LightingMode;

/// A light shining into a cone around `direction`. Angles are in degrees.
pub struct ConeLight {
    fan: RayFan,
    direction: f32,
    cone: f32,
}

impl ConeLight {
    pub fn new(
        mode: &LightingMode,
        rays: usize,
        color: Color,
        distance: f32,
        position: Vector2<f32>,
        direction: f32,
        cone: f32,
    ) -> Self {
        let mut light = ConeLight {
            fan: RayFan::new(mode, color, distance, position),
            direction,
            cone: 0.0,
        };

        light.fan.set_directions(Self::directions(rays.max(2), direction, 0.0));
        light.set_cone(cone);
        light
    }

    #[inline]
    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: f32) {
        self.direction = direction;
        self.rebuild();
    }

    /// Half of the opening angle.
    #[inline]
    pub fn cone(&self) -> f32 {
        self.cone
    }

    /// Sets half of the opening angle, clamped into [0, 180].
    pub fn set_cone(&mut self, cone: f32) {
        self.cone = cone.max(0.0).min(180.0);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let rays = self.fan.rays();
        let dirs = Self::directions(rays, self.direction, self.cone);
        self.fan.set_directions(dirs);
    }

    fn directions(rays: usize, direction: f32, cone: f32) -> impl Iterator<Item = Vector2<f32>> {
        let from = direction - cone;
        let step = 2.0 * cone / (rays - 1) as f32;
        (0..rays).map(move |i| {
            let angle = (from + step * i as f32).to_radians();
            Vector2::new(angle.cos(), angle.sin())
        })
    }
}

impl Deref for ConeLight {
    type Target = RayFan;

    fn deref(&self) -> &Self::Target {
        &self.fan
    }
}

impl DerefMut for ConeLight {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fan
    }
}

impl Positional for ConeLight {
    fn position(&self) -> Vector2<f32> {
        self.fan.position()
    }

    fn set_position(&mut self, position: Vector2<f32>) {
        self.fan.set_position(position);
    }
}

impl Light for ConeLight {
    fn update(&mut self, handler: &RayHandler) {
        self.fan.update(handler);
    }

    fn render(&mut self, handler: &RayHandler) -> Result<()> {
        self.fan.render(handler)
    }
}
