//! A thin, immediate-mode video layer.
//!
//! `VideoDevice` owns the handle pools of every GPU object and forwards commands to a
//! `Visitor`, which is either the OpenGL backend or the headless backend used by tests.
//! Unlike a deferred command buffer, every call reaches the backend before it returns,
//! so global state like the bound surface or the blend function is exactly what the
//! last call set.

pub mod assets;
pub mod backends;
pub mod errors;

mod device;
pub use self::device::{VideoDevice, VideoFrameInfo};

/// Maximum number of attributes in vertex layout.
pub const MAX_VERTEX_ATTRIBUTES: usize = 8;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::backends::headless::{HeadlessCommand, HeadlessRecorder, HeadlessVisitor};
    pub use super::backends::Visitor;
    pub use super::{VideoDevice, VideoFrameInfo};
}
