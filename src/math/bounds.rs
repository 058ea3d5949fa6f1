//! World-space culling bounds of a 2D orthographic camera.

use super::Matrix4;

/// Axis-aligned camera bounds `[x1, x2] x [y1, y2]` in world space.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct CameraBounds {
    pub x1: f32,
    pub x2: f32,
    pub y1: f32,
    pub y2: f32,
}

impl CameraBounds {
    /// Derives the bounds from the camera center and the size of its viewport in
    /// world units (remember to multiply by the zoom of the camera). This is exact for
    /// any camera orientation.
    pub fn from_extents(x: f32, y: f32, width: f32, height: f32) -> Self {
        let half_width = width * 0.5;
        let half_height = height * 0.5;

        CameraBounds {
            x1: x - half_width,
            x2: x + half_width,
            y1: y - half_height,
            y2: y + half_height,
        }
    }

    /// Recovers the bounds from a combined projection-view matrix by reading the
    /// inverse scale terms off its diagonal and the translation terms off its last
    /// column.
    ///
    /// Only correct for an axis-aligned orthographic projection. Under a rotated
    /// camera the diagonal no longer holds the inverse half extents and the bounds
    /// come out wrong; use `from_extents` for those.
    pub fn from_combined(combined: &Matrix4<f32>) -> Self {
        let half_width = 1.0 / combined.x.x;
        let x = -half_width * combined.w.x;

        let half_height = 1.0 / combined.y.y;
        let y = -half_height * combined.w.y;

        CameraBounds {
            x1: x - half_width,
            x2: x + half_width,
            y1: y - half_height,
            y2: y + half_height,
        }
    }

    /// Returns true if the box `[x - radius, x + radius] x [y - radius, y + radius]`
    /// around a light overlaps these bounds.
    ///
    /// Conservative: a circular light is never reported outside while visible, but
    /// one near a corner may be reported inside.
    #[inline]
    pub fn intersect(&self, x: f32, y: f32, radius: f32) -> bool {
        self.x1 < (x + radius)
            && self.x2 > (x - radius)
            && self.y1 < (y + radius)
            && self.y2 > (y - radius)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{ortho, vec3, Matrix4};

    #[test]
    fn extents() {
        let b = CameraBounds::from_extents(10.0, -4.0, 800.0, 600.0);
        assert_eq!(b.x1, 10.0 - 400.0);
        assert_eq!(b.x2, 10.0 + 400.0);
        assert_eq!(b.y1, -4.0 - 300.0);
        assert_eq!(b.y2, -4.0 + 300.0);
        assert_eq!(b.width(), 800.0);
        assert_eq!(b.height(), 600.0);
    }

    #[test]
    fn combined() {
        let projection = ortho(-40.0, 40.0, -30.0, 30.0, 0.0, 1.0);
        let view = Matrix4::from_translation(vec3(-5.0, -2.0, 0.0));
        let b = CameraBounds::from_combined(&(projection * view));

        let expected = CameraBounds::from_extents(5.0, 2.0, 80.0, 60.0);
        assert!((b.x1 - expected.x1).abs() < 1e-4);
        assert!((b.x2 - expected.x2).abs() < 1e-4);
        assert!((b.y1 - expected.y1).abs() < 1e-4);
        assert!((b.y2 - expected.y2).abs() < 1e-4);
    }

    #[test]
    fn combined_ignores_rotation() {
        use crate::math::{Deg, Matrix4};

        let projection = ortho(-40.0, 40.0, -30.0, 30.0, 0.0, 1.0);
        let rotated = projection * Matrix4::from_angle_z(Deg(90.0f32));
        let b = CameraBounds::from_combined(&rotated);

        // The diagonal of a rotated projection carries no extents, the bounds degrade.
        assert!(!b.width().is_finite() || (b.width() - 80.0).abs() > 1.0);
    }

    #[test]
    fn intersect() {
        let b = CameraBounds::from_extents(0.0, 0.0, 20.0, 20.0);

        assert!(b.intersect(0.0, 0.0, 1.0));
        assert!(b.intersect(12.0, 0.0, 3.0));
        assert!(!b.intersect(30.0, 0.0, 5.0));
        assert!(!b.intersect(0.0, -30.0, 5.0));

        // Touching edges are outside with strict inequalities.
        assert!(!b.intersect(15.0, 0.0, 5.0));
        assert!(!b.intersect(0.0, -15.0, 5.0));

        // Box-vs-box: a circle just off the corner still counts.
        assert!(b.intersect(13.0, 13.0, 3.5));
    }
}
