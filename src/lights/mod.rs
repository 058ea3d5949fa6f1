//! Light accumulation, blurring and compositing.
//!
//! `RayHandler` is the only type that knows about everything else: `LightMap` never
//! sees individual lights, and lights never see the light map.

pub mod blend;
pub mod handler;
pub mod light;
pub mod light_map;
pub mod mode;
pub mod pass;
pub mod settings;
pub mod shaders;
pub mod world;

mod any;
mod cone;
mod fan;
mod point;

pub use self::any::AnyLight;
pub use self::cone::ConeLight;
pub use self::fan::{Positional, RayFan};
pub use self::point::PointLight;

pub mod prelude {
    pub use super::blend::{BlendFunc, BlendFuncs};
    pub use super::handler::RayHandler;
    pub use super::light::Light;
    pub use super::light_map::LightMap;
    pub use super::mode::{LightingMode, GAMMA_COR};
    pub use super::pass::PassState;
    pub use super::settings::LightingSettings;
    pub use super::world::{OccluderWorld, RayHit, Segments};
    pub use super::{AnyLight, ConeLight, PointLight, Positional, RayFan};
}
