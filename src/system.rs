//! The game-facing side of the crate: a list of lights attached to objects of the
//! scene, drawn once per frame through a `RayHandler`.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::camera::OrthoCamera;
use crate::errors::*;
use crate::lights::prelude::*;
use crate::math::Vector2;
use crate::utils::ObjectPool;
use crate::video::prelude::*;

/// The axis-aligned placement of a scene object, anchored at its lower-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform2 {
    pub position: Vector2<f32>,
    pub size: Vector2<f32>,
}

impl Transform2 {
    pub fn new(position: Vector2<f32>, size: Vector2<f32>) -> Self {
        Transform2 { position, size }
    }

    #[inline]
    pub fn center(&self) -> Vector2<f32> {
        self.position + self.size * 0.5
    }
}

/// A light attached to a scene object. Lights with a transform follow its center,
/// disabled lights are neither updated nor drawn.
pub struct LightObject<L> {
    pub light: L,
    pub enabled: bool,
    pub transform: Option<Transform2>,
}

impl<L> LightObject<L> {
    pub fn new(light: L) -> Self {
        LightObject {
            light,
            enabled: true,
            transform: None,
        }
    }

    pub fn with_transform(light: L, transform: Transform2) -> Self {
        LightObject {
            light,
            enabled: true,
            transform: Some(transform),
        }
    }
}

impl_handle!(LightObjectHandle);

/// Owns the lights of a scene and the `RayHandler` drawing them.
pub struct LightingSystem<L> {
    handler: RayHandler,
    camera: OrthoCamera,
    objects: ObjectPool<LightObjectHandle, LightObject<L>>,
}

impl<L: Light + Positional> LightingSystem<L> {
    pub fn new(
        video: Rc<VideoDevice>,
        mode: Rc<LightingMode>,
        world: Option<Rc<dyn OccluderWorld>>,
        camera: OrthoCamera,
    ) -> Result<Self> {
        let handler = RayHandler::new(video, mode, world)?;
        Ok(Self::with_handler(handler, camera))
    }

    pub fn with_handler(handler: RayHandler, camera: OrthoCamera) -> Self {
        LightingSystem {
            handler,
            camera,
            objects: ObjectPool::new(),
        }
    }

    /// Adds a light object. The handle stays valid until the object is removed.
    pub fn add(&mut self, object: LightObject<L>) -> LightObjectHandle {
        self.objects.create(object)
    }

    /// Removes a light object, `None` if it has been removed already.
    pub fn remove(&mut self, handle: LightObjectHandle) -> Option<LightObject<L>> {
        self.objects.free(handle)
    }

    #[inline]
    pub fn get(&self, handle: LightObjectHandle) -> Option<&LightObject<L>> {
        self.objects.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: LightObjectHandle) -> Option<&mut LightObject<L>> {
        self.objects.get_mut(handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LightObject<L>> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LightObject<L>> {
        self.objects.iter_mut()
    }

    /// Moves every light to the center of its transform, then updates and draws the
    /// enabled ones from the current camera.
    pub fn update(&mut self) -> Result<()> {
        for v in self.objects.iter_mut() {
            if let Some(transform) = v.transform {
                v.light.set_position(transform.center());
            }
        }

        let mut lights: Vec<&mut L> = self
            .objects
            .iter_mut()
            .filter(|v| v.enabled)
            .map(|v| &mut v.light)
            .collect();

        self.handler.set_camera(&self.camera);
        self.handler.update_and_render(&mut lights)
    }

    /// Fits the composite into the window of `width` x `height` pixels, skipping the
    /// letterbox gutters on both sides.
    pub fn resize(&mut self, width: f32, height: f32, gutter_width: f32, gutter_height: f32) {
        let w = (width - 2.0 * gutter_width).max(0.0);
        let h = (height - 2.0 * gutter_height).max(0.0);

        self.handler.use_custom_viewport(
            gutter_width as i32,
            gutter_height as i32,
            w as u32,
            h as u32,
        );
    }

    pub fn set_ambient_light(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.handler.set_ambient_rgba(r, g, b, a);
    }

    /// Enables or disables the blur. `blur_num` is only taken when enabling.
    pub fn use_blur(&mut self, blur: bool, blur_num: u32) {
        self.handler.set_blur(blur);
        if blur {
            self.handler.set_blur_num(blur_num);
        }
    }

    pub fn set_culling(&mut self, culling: bool) {
        self.handler.set_culling(culling);
    }

    pub fn use_shadows(&mut self, shadows: bool) {
        self.handler.set_shadows(shadows);
    }

    #[inline]
    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut OrthoCamera {
        &mut self.camera
    }

    #[inline]
    pub fn handler(&self) -> &RayHandler {
        &self.handler
    }

    #[inline]
    pub fn handler_mut(&mut self) -> &mut RayHandler {
        &mut self.handler
    }

    /// Releases the GPU objects of the handler. The lights are kept.
    pub fn dispose(&mut self) {
        self.handler.dispose();
    }
}
