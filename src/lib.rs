//! # What is This?
//!
//! `raylights` accumulates an arbitrary set of 2D light sources into an off-screen
//! light map, applies shadow occlusion and a separable screen-space blur, and
//! composites the result over the rendered scene with configurable blend functions.
//!
//! It is driven once per frame from the render loop of a game:
//!
//! ```rust,ignore
//! handler.set_camera(&camera);
//! handler.update_and_render(&mut lights)?;
//! ```
//!
//! The video layer is an immediate-mode command `Visitor` with an OpenGL backend and
//! a headless backend that records every command, which makes the ordering of GPU
//! passes observable in tests.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;
pub mod video;

pub mod camera;
pub mod lights;
pub mod system;

pub mod prelude {
    pub use crate::camera::OrthoCamera;
    pub use crate::errors::Result;
    pub use crate::lights::prelude::*;
    pub use crate::math::CameraBounds;
    pub use crate::system::{LightObject, LightObjectHandle, LightingSystem, Transform2};
    pub use crate::utils::Color;
    pub use crate::video::prelude::*;
}
