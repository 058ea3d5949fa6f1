//! A 2D orthographic camera looking down the negative z axis.

use serde::{Deserialize, Serialize};

use crate::math::{ortho, Matrix4, Vector2, Vector3};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthoCamera {
    /// Center of the camera in world space.
    pub position: Vector2<f32>,
    /// Size of the viewport in world units, before zooming.
    pub viewport: Vector2<f32>,
    /// Values above 1 show more of the world.
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoCamera {
    pub fn new(width: f32, height: f32) -> Self {
        OrthoCamera {
            position: Vector2::new(0.0, 0.0),
            viewport: Vector2::new(width, height),
            zoom: 1.0,
            near: -1.0,
            far: 1.0,
        }
    }

    /// Size of the visible area in world units.
    #[inline]
    pub fn extents(&self) -> Vector2<f32> {
        self.viewport * self.zoom
    }

    #[inline]
    pub fn projection(&self) -> Matrix4<f32> {
        let half = self.extents() * 0.5;
        ortho(-half.x, half.x, -half.y, half.y, self.near, self.far)
    }

    #[inline]
    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(-self.position.x, -self.position.y, 0.0))
    }

    /// The combined projection-view matrix.
    #[inline]
    pub fn combined(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }
}
