//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::*;

pub mod bounds;
pub use self::bounds::CameraBounds;
