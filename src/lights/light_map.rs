use std::rc::Rc;

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::Color;
use crate::video::prelude::*;

use super::handler::RayHandler;
use super::mode::LightingMode;
use super::shaders;

#[derive(Debug, Copy, Clone)]
struct RenderTarget {
    surface: SurfaceHandle,
    texture: RenderTextureHandle,
}

impl RenderTarget {
    fn new(video: &VideoDevice, dimensions: Vector2<u32>) -> Result<Self> {
        let params = RenderTextureParams {
            format: RenderTextureFormat::RGBA8,
            wrap: TextureWrap::Clamp,
            filter: TextureFilter::Linear,
            dimensions,
        };

        let texture = video.create_render_texture(params)?;
        match video.create_surface(SurfaceParams { color: texture }) {
            Ok(surface) => Ok(RenderTarget { surface, texture }),
            Err(err) => {
                video.delete_render_texture(texture);
                Err(err.into())
            }
        }
    }

    fn delete(self, video: &VideoDevice) {
        video.delete_surface(self.surface);
        video.delete_render_texture(self.texture);
    }
}

/// The off-screen light map.
///
/// Lights are accumulated into `frame`, `pingpong` has the same size and is only
/// written by the blur. Every GPU object is released exactly once, either by
/// `dispose` or when the light map is dropped.
pub struct LightMap {
    video: Rc<VideoDevice>,
    dimensions: Vector2<u32>,

    frame: Option<RenderTarget>,
    pingpong: Option<RenderTarget>,
    quad: Option<MeshHandle>,

    shadow_shader: Option<ShaderHandle>,
    diffuse_shader: Option<ShaderHandle>,
    without_shadow_shader: Option<ShaderHandle>,
    blur_shader: Option<ShaderHandle>,
}

impl LightMap {
    pub fn new(
        video: Rc<VideoDevice>,
        mode: &LightingMode,
        dimensions: Vector2<u32>,
    ) -> Result<Self> {
        let mut map = LightMap {
            video,
            dimensions,
            frame: None,
            pingpong: None,
            quad: None,
            shadow_shader: None,
            diffuse_shader: None,
            without_shadow_shader: None,
            blur_shader: None,
        };

        // Objects created before a failure are released by `Drop`.
        map.frame = Some(RenderTarget::new(&map.video, dimensions)?);
        map.pingpong = Some(RenderTarget::new(&map.video, dimensions)?);
        map.quad = Some(Self::create_quad(&map.video)?);

        map.shadow_shader = Some(shaders::shadow(mode).create(&map.video)?);
        map.diffuse_shader = Some(shaders::diffuse(mode).create(&map.video)?);
        map.without_shadow_shader = Some(shaders::without_shadow(mode).create(&map.video)?);
        map.blur_shader = Some(shaders::blur(mode).create(&map.video)?);

        info!("Created light map of {}x{}.", dimensions.x, dimensions.y);

        Ok(map)
    }

    fn create_quad(video: &VideoDevice) -> Result<MeshHandle> {
        #[cfg_attr(rustfmt, rustfmt_skip)]
        let verts: [f32; 16] = [
            -1.0, -1.0, 0.0, 0.0,
            1.0, -1.0, 1.0, 0.0,
            1.0, 1.0, 1.0, 1.0,
            -1.0, 1.0, 0.0, 1.0,
        ];

        let params = MeshParams {
            hint: MeshHint::Immutable,
            layout: shaders::quad_layout(),
            primitive: MeshPrimitive::TriangleFan,
            num_verts: 4,
        };

        let mesh = video.create_mesh(params, VertexLayout::as_bytes(&verts))?;
        Ok(mesh)
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    /// The texture lights are accumulated into, `None` once disposed.
    #[inline]
    pub fn texture(&self) -> Option<RenderTextureHandle> {
        self.frame.map(|v| v.texture)
    }

    /// The surface lights are accumulated into, `None` once disposed.
    #[inline]
    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.frame.map(|v| v.surface)
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.frame.is_none()
    }

    fn frame(&self) -> Result<RenderTarget> {
        self.frame
            .ok_or_else(|| format_err!("The light map has been disposed."))
    }

    fn objects(&self) -> Result<(RenderTarget, MeshHandle)> {
        match (self.pingpong, self.quad) {
            (Some(pingpong), Some(quad)) => Ok((pingpong, quad)),
            _ => bail!("The light map has been disposed."),
        }
    }

    fn shader(shader: Option<ShaderHandle>) -> Result<ShaderHandle> {
        shader.ok_or_else(|| format_err!("The light map has been disposed."))
    }

    /// Binds the light map as render destination and clears it to transparent.
    pub fn begin(&self) -> Result<()> {
        let frame = self.frame()?;
        self.video.bind_surface(Some(frame.surface))?;
        self.video
            .update_viewport(SurfaceViewport::full(self.dimensions))?;
        self.video.clear(Color::transparent())?;
        Ok(())
    }

    /// Binds the screen again and restores `viewport` on it.
    pub fn end(&self, viewport: SurfaceViewport) -> Result<()> {
        self.video.bind_surface(None)?;
        self.video.update_viewport(viewport)?;
        Ok(())
    }

    /// Blurs the light map `blur_num` times, each time horizontally into the
    /// ping-pong target and vertically back. Blending is disabled while blurring.
    pub fn gaussian_blur(&self, blur_num: u32, viewport: SurfaceViewport) -> Result<()> {
        let frame = self.frame()?;
        let (pingpong, quad) = self.objects()?;
        let shader = Self::shader(self.blur_shader)?;

        let video = &self.video;
        let size = [self.dimensions.x as f32, self.dimensions.y as f32];
        let full = SurfaceViewport::full(self.dimensions);

        video.set_blend(false)?;

        for _ in 0..blur_num {
            video.bind_surface(Some(pingpong.surface))?;
            video.update_viewport(full)?;
            video.bind_shader(Some(shader))?;
            video.set_uniform("u_texture", frame.texture)?;
            video.set_uniform("u_dir", [1.0f32, 0.0])?;
            video.set_uniform("u_size", size)?;
            video.draw(quad, 0, 4)?;
            video.bind_shader(None)?;

            video.bind_surface(Some(frame.surface))?;
            video.update_viewport(full)?;
            video.bind_shader(Some(shader))?;
            video.set_uniform("u_texture", pingpong.texture)?;
            video.set_uniform("u_dir", [0.0f32, 1.0])?;
            video.set_uniform("u_size", size)?;
            video.draw(quad, 0, 4)?;
            video.bind_shader(None)?;
        }

        self.end(viewport)?;
        video.set_blend(true)?;
        Ok(())
    }

    /// Composites the light map over the bound destination.
    ///
    /// With shadows the ambient light darkens (or, in diffuse mode, multiplies) the
    /// scene. Without shadows the light map is only added when some light has been
    /// accumulated into it this frame. Blending is disabled afterwards.
    pub fn render(&self, handler: &RayHandler) -> Result<()> {
        let frame = self.frame()?;
        let (_, quad) = self.objects()?;
        let video = &self.video;
        let ambient = handler.ambient();

        if handler.is_shadows() {
            let blend_funcs = handler.blend_funcs();
            let (shader, ambient) = if handler.mode().diffuse {
                blend_funcs.diffuse.apply(video)?;
                (Self::shader(self.diffuse_shader)?, ambient)
            } else {
                blend_funcs.shadow.apply(video)?;
                let c = Color::new(
                    ambient.r * ambient.a,
                    ambient.g * ambient.a,
                    ambient.b * ambient.a,
                    1.0 - ambient.a,
                );

                (Self::shader(self.shadow_shader)?, c)
            };

            video.bind_shader(Some(shader))?;
            video.set_uniform("u_texture", frame.texture)?;
            video.set_uniform("u_ambient", ambient)?;
            video.draw(quad, 0, 4)?;
            video.bind_shader(None)?;
        } else if handler.uses_light_map() && handler.lights_rendered() > 0 {
            handler.blend_funcs().simple.apply(video)?;

            video.bind_shader(Some(Self::shader(self.without_shadow_shader)?))?;
            video.set_uniform("u_texture", frame.texture)?;
            video.draw(quad, 0, 4)?;
            video.bind_shader(None)?;
        }

        video.set_blend(false)?;
        Ok(())
    }

    /// Releases every GPU object of the light map. Calling it again does nothing.
    pub fn dispose(&mut self) {
        let video = &self.video;

        if let Some(frame) = self.frame.take() {
            frame.delete(video);
        }

        if let Some(pingpong) = self.pingpong.take() {
            pingpong.delete(video);
        }

        if let Some(quad) = self.quad.take() {
            video.delete_mesh(quad);
        }

        let shaders = [
            self.shadow_shader.take(),
            self.diffuse_shader.take(),
            self.without_shadow_shader.take(),
            self.blur_shader.take(),
        ];

        for shader in shaders.iter().filter_map(|v| *v) {
            video.delete_shader(shader);
        }
    }
}

impl Drop for LightMap {
    fn drop(&mut self) {
        self.dispose();
    }
}
