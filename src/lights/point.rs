use std::f32::consts::PI;
use std::ops::{Deref, DerefMut};

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::Color;

use super::fan::{Positional, RayFan};
use super::handler::RayHandler;
use super::light::Light;
use super::mode::LightingMode;

/// A light shining equally in all directions.
pub struct PointLight {
    fan: RayFan,
}

impl PointLight {
    /// Creates a point light casting `rays` rays, at least 3.
    pub fn new(
        mode: &LightingMode,
        rays: usize,
        color: Color,
        distance: f32,
        position: Vector2<f32>,
    ) -> Self {
        let mut fan = RayFan::new(mode, color, distance, position);
        fan.set_directions(Self::directions(rays.max(3)));
        PointLight { fan }
    }

    /// Evenly spaced directions around the circle. The last one repeats the first
    /// one to close the fan.
    fn directions(rays: usize) -> impl Iterator<Item = Vector2<f32>> {
        let step = 2.0 * PI / (rays - 1) as f32;
        (0..rays).map(move |i| {
            let angle = step * i as f32;
            Vector2::new(angle.cos(), angle.sin())
        })
    }
}

impl Deref for PointLight {
    type Target = RayFan;

    fn deref(&self) -> &Self::Target {
        &self.fan
    }
}

impl DerefMut for PointLight {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fan
    }
}

impl Positional for PointLight {
    fn position(&self) -> Vector2<f32> {
        self.fan.position()
    }

    fn set_position(&mut self, position: Vector2<f32>) {
        self.fan.set_position(position);
    }
}

impl Light for PointLight {
    fn update(&mut self, handler: &RayHandler) {
        self.fan.update(handler);
    }

    fn render(&mut self, handler: &RayHandler) -> Result<()> {
        self.fan.render(handler)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn closed_fan() {
        let dirs: Vec<_> = PointLight::directions(5).collect();
        assert_eq!(dirs.len(), 5);
        assert!((dirs[0].x - dirs[4].x).abs() < 1e-5);
        assert!((dirs[0].y - dirs[4].y).abs() < 1e-5);
        assert!((dirs[2].x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn gamma_distance() {
        let light = PointLight::new(
            &LightingMode::new(true, false),
            16,
            Color::white(),
            8.0,
            Vector2::new(0.0, 0.0),
        );

        assert_eq!(light.distance(), 5.0);
        assert_eq!(light.rays(), 16);
    }
}
