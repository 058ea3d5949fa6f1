//! The occluder geometry shadows are cast from.

use crate::math::{InnerSpace, Vector2};

/// The closest hit of a ray cast.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    pub point: Vector2<f32>,
    /// Position of the hit along the ray, in [0, 1].
    pub fraction: f32,
}

/// A source of occluders, usually backed by a physics world.
pub trait OccluderWorld {
    /// Returns the closest hit on the segment from `from` to `to`.
    fn ray_cast(&self, from: Vector2<f32>, to: Vector2<f32>) -> Option<RayHit>;
}

/// A plain list of occluding segments.
#[derive(Debug, Default, Clone)]
pub struct Segments {
    segments: Vec<(Vector2<f32>, Vector2<f32>)>,
}

impl Segments {
    pub fn new() -> Self {
        Segments::default()
    }

    pub fn add(&mut self, a: Vector2<f32>, b: Vector2<f32>) -> &mut Self {
        self.segments.push((a, b));
        self
    }

    /// Adds the four edges of an axis-aligned box.
    pub fn add_box(&mut self, min: Vector2<f32>, max: Vector2<f32>) -> &mut Self {
        let c0 = min;
        let c1 = Vector2::new(max.x, min.y);
        let c2 = max;
        let c3 = Vector2::new(min.x, max.y);
        self.add(c0, c1).add(c1, c2).add(c2, c3).add(c3, c0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn cross(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

impl OccluderWorld for Segments {
    fn ray_cast(&self, from: Vector2<f32>, to: Vector2<f32>) -> Option<RayHit> {
        let r = to - from;
        if r.magnitude2() <= ::std::f32::EPSILON {
            return None;
        }

        let mut closest: Option<f32> = None;
        for &(a, b) in &self.segments {
            let s = b - a;
            let denom = cross(r, s);
            // Parallel segments never occlude.
            if denom.abs() <= ::std::f32::EPSILON {
                continue;
            }

            let t = cross(a - from, s) / denom;
            let u = cross(a - from, r) / denom;
            if t >= 0.0 && t <= 1.0 && u >= 0.0 && u <= 1.0 {
                closest = Some(closest.map_or(t, |v| v.min(t)));
            }
        }

        closest.map(|fraction| RayHit {
            point: from + r * fraction,
            fraction,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ray_cast() {
        let mut world = Segments::new();
        world.add_box(Vector2::new(2.0, -1.0), Vector2::new(4.0, 1.0));
        assert_eq!(world.len(), 4);

        let hit = world
            .ray_cast(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0))
            .unwrap();

        assert!((hit.fraction - 0.2).abs() < 1e-6);
        assert!((hit.point.x - 2.0).abs() < 1e-6);

        assert!(world
            .ray_cast(Vector2::new(0.0, 0.0), Vector2::new(0.0, 10.0))
            .is_none());

        assert!(world
            .ray_cast(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0))
            .is_none());
    }
}
