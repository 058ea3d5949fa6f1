use std::cell::Cell;
use std::rc::Rc;

use crate::camera::OrthoCamera;
use crate::errors::*;
use crate::math::{CameraBounds, Matrix4, SquareMatrix, Vector2};
use crate::utils::Color;
use crate::video::prelude::*;

use super::blend::{BlendFunc, BlendFuncs};
use super::light::Light;
use super::light_map::LightMap;
use super::mode::LightingMode;
use super::pass::PassState;
use super::settings::LightingSettings;
use super::shaders;
use super::world::OccluderWorld;

/// Drives the lights of a scene through one frame.
///
/// Every frame the camera is set first, then lights are updated, accumulated into
/// the off-screen `LightMap`, optionally blurred, and composited over the scene:
///
/// ```rust,ignore
/// handler.set_camera(&camera);
/// handler.update_and_render(&mut lights)?;
/// ```
///
/// `prepare_render` and `render_only` split the last step, so the composite could
/// happen after other scene rendering. Call order is checked in debug builds.
pub struct RayHandler {
    video: Rc<VideoDevice>,
    mode: Rc<LightingMode>,
    world: Option<Rc<dyn OccluderWorld>>,

    combined: Matrix4<f32>,
    bounds: CameraBounds,
    camera_set: bool,

    ambient: Color,
    blend_funcs: BlendFuncs,
    culling: bool,
    shadows: bool,
    blur: bool,
    blur_num: u32,
    light_map_rendering: bool,
    custom_viewport: Option<SurfaceViewport>,

    light_map: Option<LightMap>,
    light_shader: Option<ShaderHandle>,

    rendered: Cell<u32>,
    state: PassState,
}

impl RayHandler {
    /// Creates a handler whose light map is a quarter of the screen.
    pub fn new(
        video: Rc<VideoDevice>,
        mode: Rc<LightingMode>,
        world: Option<Rc<dyn OccluderWorld>>,
    ) -> Result<Self> {
        Self::with_settings(video, mode, world, LightingSettings::default())
    }

    /// Creates a handler with a light map of `width` x `height`. Smaller light maps
    /// trade quality for fill rate.
    pub fn with_target_size(
        video: Rc<VideoDevice>,
        mode: Rc<LightingMode>,
        world: Option<Rc<dyn OccluderWorld>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let settings = LightingSettings {
            target_size: Some(Vector2::new(width, height)),
            ..Default::default()
        };

        Self::with_settings(video, mode, world, settings)
    }

    pub fn with_settings(
        video: Rc<VideoDevice>,
        mode: Rc<LightingMode>,
        world: Option<Rc<dyn OccluderWorld>>,
        settings: LightingSettings,
    ) -> Result<Self> {
        let dimensions = settings.target_dimensions(video.dimensions());

        let mut handler = RayHandler {
            video,
            mode,
            world,

            combined: Matrix4::identity(),
            bounds: CameraBounds::default(),
            camera_set: false,

            ambient: settings.ambient.clip(),
            blend_funcs: BlendFuncs::default(),
            culling: settings.culling,
            shadows: settings.shadows,
            blur: settings.blur,
            blur_num: settings.blur_num,
            light_map_rendering: settings.light_map_rendering,
            custom_viewport: None,

            light_map: None,
            light_shader: None,

            rendered: Cell::new(0),
            state: PassState::Idle,
        };

        handler.light_shader = Some(shaders::light(&handler.mode).create(&handler.video)?);
        handler.resize_fbo(dimensions.x, dimensions.y)?;

        info!(
            "RayHandler created with {:?}, light map {}x{}.",
            *handler.mode, dimensions.x, dimensions.y
        );

        Ok(handler)
    }

    fn transit(&mut self, next: PassState) {
        debug_assert!(
            self.state.can_transit(next),
            "RayHandler can not go from {:?} to {:?}.",
            self.state,
            next
        );

        self.state = next;
    }
}

impl RayHandler {
    /// Sets the camera from a combined projection-view matrix alone.
    ///
    /// The culling bounds are recovered from the matrix, which only works for an
    /// axis-aligned orthographic camera. Prefer `set_combined_matrix_with` or
    /// `set_camera`.
    pub fn set_combined_matrix(&mut self, combined: Matrix4<f32>) {
        self.combined = combined;
        self.bounds = CameraBounds::from_combined(&combined);
        self.camera_set = true;
    }

    /// Sets the camera from a combined matrix, the camera center and the size of
    /// its viewport in world units (zoom included).
    pub fn set_combined_matrix_with(
        &mut self,
        combined: Matrix4<f32>,
        x: f32,
        y: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) {
        self.combined = combined;
        self.bounds = CameraBounds::from_extents(x, y, viewport_width, viewport_height);
        self.camera_set = true;
    }

    pub fn set_camera(&mut self, camera: &OrthoCamera) {
        let extents = camera.extents();
        self.set_combined_matrix_with(
            camera.combined(),
            camera.position.x,
            camera.position.y,
            extents.x,
            extents.y,
        );
    }

    /// Returns true if a light at (`x`, `y`) reaching as far as `radius` could be
    /// visible from the camera.
    #[inline]
    pub fn intersect(&self, x: f32, y: f32, radius: f32) -> bool {
        self.bounds.intersect(x, y, radius)
    }
}

impl RayHandler {
    /// Updates every light, in order. No GPU work is done.
    pub fn update<L: Light>(&mut self, lights: &mut [L]) {
        self.transit(PassState::Updated);

        for light in lights.iter_mut() {
            light.update(self);
        }
    }

    /// Accumulates `lights` into the light map and blurs it, without compositing.
    ///
    /// Must not be called between the begin and end of another batch, since it
    /// rebinds the render destination and the shader program.
    pub fn prepare_render<L: Light>(&mut self, lights: &mut [L]) -> Result<()> {
        self.transit(PassState::Accumulating);

        if let Err(err) = self.accumulate(lights) {
            self.state = PassState::Idle;
            return Err(err);
        }

        Ok(())
    }

    fn accumulate<L: Light>(&mut self, lights: &mut [L]) -> Result<()> {
        if !self.camera_set {
            warn!("Rendering lights before any camera has been set.");
        }

        self.rendered.set(0);

        self.video.set_depth_write(false)?;
        self.video.set_blend(true)?;
        self.blend_funcs.simple.apply(&self.video)?;

        let shader = self
            .light_shader
            .ok_or_else(|| format_err!("RayHandler has been disposed."))?;

        let use_light_map = self.uses_light_map();
        if use_light_map {
            self.light_map()?.begin()?;
        }

        let drawn = self.draw_lights(shader, lights);

        // The screen is rebound even if a light failed to draw.
        let viewport = self.viewport();
        let mut restored: Result<()> = self.video.bind_shader(None).map_err(Into::into);
        if use_light_map {
            restored = restored.and(self.light_map().and_then(|v| v.end(viewport)));
        }

        drawn.and(restored)?;

        let rendered = self.rendered.get();
        let mut blurred = false;

        if use_light_map && rendered > 0 && self.blur && self.blur_num > 0 {
            self.transit(PassState::Blurring);
            self.light_map()?.gaussian_blur(self.blur_num, viewport)?;
            blurred = true;
        }

        debug!(
            "{} of {} lights rendered, blur {}.",
            rendered,
            lights.len(),
            if blurred { "done" } else { "skipped" }
        );

        self.transit(PassState::Accumulated);
        Ok(())
    }

    fn draw_lights<L: Light>(&self, shader: ShaderHandle, lights: &mut [L]) -> Result<()> {
        self.video.bind_shader(Some(shader))?;
        self.video.set_uniform("u_projTrans", self.combined)?;

        for light in lights.iter_mut() {
            light.render(self)?;
        }

        Ok(())
    }

    /// Composites the light map prepared by `prepare_render` earlier this frame.
    /// Does nothing if light map rendering is disabled.
    pub fn render_only(&mut self) -> Result<()> {
        self.transit(PassState::Composited);

        if self.light_map_rendering {
            self.light_map()?.render(self)?;
        }

        Ok(())
    }

    /// `prepare_render` followed by `render_only`.
    pub fn render<L: Light>(&mut self, lights: &mut [L]) -> Result<()> {
        self.prepare_render(lights)?;
        self.render_only()
    }

    /// `update` followed by `render`.
    pub fn update_and_render<L: Light>(&mut self, lights: &mut [L]) -> Result<()> {
        self.update(lights);
        self.render(lights)
    }

    /// Replaces the light map with one of `width` x `height`. The old one is released
    /// first.
    pub fn resize_fbo(&mut self, width: u32, height: u32) -> Result<()> {
        debug_assert!(
            !self.state.is_in_pass(),
            "RayHandler can not be resized while rendering."
        );

        if let Some(mut light_map) = self.light_map.take() {
            light_map.dispose();
        }

        let dimensions = Vector2::new(width, height);
        self.light_map = Some(LightMap::new(self.video.clone(), &self.mode, dimensions)?);
        self.state = PassState::Idle;

        info!("RayHandler resized light map to {}x{}.", width, height);
        Ok(())
    }

    /// Releases the light map and the light shader. Calling it more than once is
    /// harmless. The occluder world and the lights are left alone.
    pub fn dispose(&mut self) {
        if let Some(mut light_map) = self.light_map.take() {
            light_map.dispose();
        }

        if let Some(shader) = self.light_shader.take() {
            self.video.delete_shader(shader);
        }

        self.state = PassState::Idle;
    }
}

impl Drop for RayHandler {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl RayHandler {
    pub fn set_culling(&mut self, culling: bool) {
        self.culling = culling;
    }

    pub fn set_blur(&mut self, blur: bool) {
        self.blur = blur;
    }

    /// Sets the number of blur iterations, 0 disables the blur.
    pub fn set_blur_num(&mut self, blur_num: u32) {
        self.blur_num = blur_num;
    }

    pub fn set_shadows(&mut self, shadows: bool) {
        self.shadows = shadows;
    }

    /// Sets the darkness of shadows, clamped into [0, 1].
    pub fn set_ambient_light(&mut self, alpha: f32) {
        self.ambient.a = alpha.max(0.0).min(1.0);
    }

    /// Sets the ambient light, every channel is clamped into [0, 1].
    pub fn set_ambient_rgba(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.set_ambient_color(Color::new(r, g, b, a));
    }

    /// Sets the ambient light, every channel is clamped into [0, 1].
    pub fn set_ambient_color(&mut self, color: Color) {
        self.ambient = color.clip();
    }

    /// Restores `viewport` on the screen instead of the full screen whenever the
    /// light map is unbound. Useful with letterboxing.
    pub fn use_custom_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.custom_viewport = Some(SurfaceViewport::new(x, y, width, height));
    }

    pub fn use_default_viewport(&mut self) {
        self.custom_viewport = None;
    }

    /// Enables or disables compositing at the end of `render`. When disabled, sample
    /// `light_map_texture` manually.
    pub fn set_light_map_rendering(&mut self, enable: bool) {
        self.light_map_rendering = enable;
    }

    pub fn set_world(&mut self, world: Option<Rc<dyn OccluderWorld>>) {
        self.world = world;
    }

    /// Mutable access to the blend functions used when compositing.
    pub fn blend_funcs_mut(&mut self) -> &mut BlendFuncs {
        &mut self.blend_funcs
    }
}

impl RayHandler {
    #[inline]
    pub fn video(&self) -> &Rc<VideoDevice> {
        &self.video
    }

    #[inline]
    pub fn mode(&self) -> &LightingMode {
        &self.mode
    }

    #[inline]
    pub fn world(&self) -> Option<&dyn OccluderWorld> {
        self.world.as_ref().map(|v| v.as_ref())
    }

    #[inline]
    pub fn combined(&self) -> &Matrix4<f32> {
        &self.combined
    }

    #[inline]
    pub fn bounds(&self) -> CameraBounds {
        self.bounds
    }

    #[inline]
    pub fn ambient(&self) -> Color {
        self.ambient
    }

    #[inline]
    pub fn blend_funcs(&self) -> &BlendFuncs {
        &self.blend_funcs
    }

    /// The blend function lights are drawn with. Lights accumulate additively into
    /// the light map; drawn straight onto the scene they follow the lighting mode.
    pub fn light_blend_func(&self) -> BlendFunc {
        if self.uses_light_map() || !self.mode.diffuse {
            self.blend_funcs.simple
        } else {
            self.blend_funcs.diffuse
        }
    }

    #[inline]
    pub fn is_culling(&self) -> bool {
        self.culling
    }

    #[inline]
    pub fn is_shadows(&self) -> bool {
        self.shadows
    }

    #[inline]
    pub fn is_blur(&self) -> bool {
        self.blur
    }

    #[inline]
    pub fn blur_num(&self) -> u32 {
        self.blur_num
    }

    #[inline]
    pub fn is_light_map_rendering(&self) -> bool {
        self.light_map_rendering
    }

    /// Lights go through the light map when they cast shadows or get blurred.
    #[inline]
    pub fn uses_light_map(&self) -> bool {
        self.shadows || self.blur
    }

    #[inline]
    pub fn custom_viewport(&self) -> Option<SurfaceViewport> {
        self.custom_viewport
    }

    /// The viewport restored on the screen when the light map is unbound.
    pub fn viewport(&self) -> SurfaceViewport {
        self.custom_viewport
            .unwrap_or_else(|| SurfaceViewport::full(self.video.dimensions()))
    }

    #[inline]
    pub fn state(&self) -> PassState {
        self.state
    }

    /// Number of lights drawn by the last accumulation pass.
    #[inline]
    pub fn lights_rendered(&self) -> u32 {
        self.rendered.get()
    }

    /// Called by a light after it issued its draw.
    #[inline]
    pub fn mark_rendered(&self) {
        self.rendered.set(self.rendered.get() + 1);
    }

    #[inline]
    pub fn light_shader(&self) -> Option<ShaderHandle> {
        self.light_shader
    }

    /// The texture lights are accumulated into, for compositing manually.
    #[inline]
    pub fn light_map_texture(&self) -> Option<RenderTextureHandle> {
        self.light_map.as_ref().and_then(|v| v.texture())
    }

    /// The surface of the light map. Drawing into it directly is unsupported.
    #[inline]
    pub fn light_map_surface(&self) -> Option<SurfaceHandle> {
        self.light_map.as_ref().and_then(|v| v.surface())
    }

    #[inline]
    pub fn light_map_dimensions(&self) -> Option<Vector2<u32>> {
        self.light_map.as_ref().map(|v| v.dimensions())
    }

    fn light_map(&self) -> Result<&LightMap> {
        self.light_map
            .as_ref()
            .ok_or_else(|| format_err!("RayHandler has been disposed."))
    }
}
