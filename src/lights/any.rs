use crate::errors::*;
use crate::math::Vector2;

use super::cone::ConeLight;
use super::fan::{Positional, RayFan};
use super::handler::RayHandler;
use super::light::Light;
use super::point::PointLight;

/// One of the built-in lights, for keeping different kinds in one list.
pub enum AnyLight {
    Point(PointLight),
    Cone(ConeLight),
}

impl AnyLight {
    /// The ray fan shared by all built-in lights.
    pub fn fan(&self) -> &RayFan {
        match self {
            AnyLight::Point(v) => &**v,
            AnyLight::Cone(v) => &**v,
        }
    }

    pub fn fan_mut(&mut self) -> &mut RayFan {
        match self {
            AnyLight::Point(v) => &mut **v,
            AnyLight::Cone(v) => &mut **v,
        }
    }
}

impl From<PointLight> for AnyLight {
    fn from(light: PointLight) -> Self {
        AnyLight::Point(light)
    }
}

impl From<ConeLight> for AnyLight {
    fn from(light: ConeLight) -> Self {
        AnyLight::Cone(light)
    }
}

impl Positional for AnyLight {
    fn position(&self) -> Vector2<f32> {
        self.fan().position()
    }

    fn set_position(&mut self, position: Vector2<f32>) {
        self.fan_mut().set_position(position);
    }
}

impl Light for AnyLight {
    fn update(&mut self, handler: &RayHandler) {
        self.fan_mut().update(handler);
    }

    fn render(&mut self, handler: &RayHandler) -> Result<()> {
        self.fan_mut().render(handler)
    }
}
