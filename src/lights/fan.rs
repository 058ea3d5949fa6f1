use std::rc::Rc;

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::Color;
use crate::video::prelude::*;

use super::handler::RayHandler;
use super::mode::LightingMode;
use super::shaders;

/// Lights that could be moved around, e.g. by `LightingSystem`.
pub trait Positional {
    fn position(&self) -> Vector2<f32>;
    fn set_position(&mut self, position: Vector2<f32>);
}

struct FanMesh {
    video: Rc<VideoDevice>,
    handle: MeshHandle,
    num_verts: usize,
}

impl Drop for FanMesh {
    fn drop(&mut self) {
        self.video.delete_mesh(self.handle);
    }
}

/// The shared core of point and cone lights: rays are cast from `position` along a
/// set of directions, cut short by the occluders of the world, and drawn as a
/// triangle fan that fades out towards `distance`.
pub struct RayFan {
    position: Vector2<f32>,
    color: Color,
    distance: f32,
    gamma: f32,
    active: bool,
    xray: bool,
    culled: bool,

    directions: Vec<Vector2<f32>>,
    verts: Vec<f32>,
    mesh: Option<FanMesh>,
}

impl RayFan {
    pub fn new(mode: &LightingMode, color: Color, distance: f32, position: Vector2<f32>) -> Self {
        let mut fan = RayFan {
            position,
            color,
            distance: 0.0,
            gamma: mode.gamma_correction_parameter(),
            active: true,
            xray: false,
            culled: false,

            directions: Vec::new(),
            verts: Vec::new(),
            mesh: None,
        };

        fan.set_distance(distance);
        fan
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Reach of the rays, gamma corrected.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Sets the reach of the rays. It is scaled by the gamma correction parameter of
    /// the lighting mode and never goes below 0.01.
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = (distance * self.gamma).max(0.01);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Rays of a x-ray light go through occluders.
    #[inline]
    pub fn is_xray(&self) -> bool {
        self.xray
    }

    #[inline]
    pub fn set_xray(&mut self, xray: bool) {
        self.xray = xray;
    }

    /// Returns true if the last update found the light outside of the camera.
    #[inline]
    pub fn is_culled(&self) -> bool {
        self.culled
    }

    #[inline]
    pub fn rays(&self) -> usize {
        self.directions.len()
    }

    /// Replaces the unit directions rays are cast along.
    pub fn set_directions<T>(&mut self, directions: T)
    where
        T: IntoIterator<Item = Vector2<f32>>,
    {
        self.directions.clear();
        self.directions.extend(directions);
    }

    /// The vertices of the fan built by the last update.
    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.verts
    }

    /// Culls the light and casts its rays.
    pub fn update(&mut self, handler: &RayHandler) {
        if !self.active {
            return;
        }

        let p = self.position;
        self.culled = handler.is_culling() && !handler.intersect(p.x, p.y, self.distance);
        if self.culled {
            return;
        }

        let world = if self.xray { None } else { handler.world() };
        let c = self.color;

        self.verts.clear();
        self.verts
            .extend_from_slice(&[p.x, p.y, c.r, c.g, c.b, c.a, 1.0]);

        for &dir in &self.directions {
            let end = p + dir * self.distance;
            let (end, fraction) = match world.and_then(|w| w.ray_cast(p, end)) {
                Some(hit) => (hit.point, hit.fraction),
                None => (end, 1.0),
            };

            self.verts
                .extend_from_slice(&[end.x, end.y, c.r, c.g, c.b, c.a, 1.0 - fraction]);
        }
    }

    /// Draws the fan with the light shader bound by `handler`.
    pub fn render(&mut self, handler: &RayHandler) -> Result<()> {
        if !self.active || self.culled || self.verts.is_empty() {
            return Ok(());
        }

        let video = handler.video();
        let num_verts = self.verts.len() / 7;
        let mesh = self.fan_mesh(video, num_verts)?;

        video.update_vertex_buffer(mesh, 0, VertexLayout::as_bytes(&self.verts))?;
        handler.light_blend_func().apply(video)?;
        video.draw(mesh, 0, num_verts as u32)?;

        handler.mark_rendered();
        Ok(())
    }

    fn fan_mesh(&mut self, video: &Rc<VideoDevice>, num_verts: usize) -> Result<MeshHandle> {
        if let Some(ref mesh) = self.mesh {
            if Rc::ptr_eq(&mesh.video, video) && mesh.num_verts == num_verts {
                return Ok(mesh.handle);
            }
        }

        let params = MeshParams {
            hint: MeshHint::Stream,
            layout: shaders::light_layout(),
            primitive: MeshPrimitive::TriangleFan,
            num_verts,
        };

        let handle = video.create_mesh(params, None)?;
        self.mesh = Some(FanMesh {
            video: video.clone(),
            handle,
            num_verts,
        });

        Ok(handle)
    }
}

impl Positional for RayFan {
    #[inline]
    fn position(&self) -> Vector2<f32> {
        self.position
    }

    #[inline]
    fn set_position(&mut self, position: Vector2<f32>) {
        self.position = position;
    }
}
