use std::cell::{Cell, RefCell};

use crate::math::Vector2;
use crate::utils::{Color, ObjectPool};

use super::assets::prelude::*;
use super::backends::headless::HeadlessRecorder;
use super::backends::{self, Visitor};
use super::errors::*;

/// The information of video module since the last `advance`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct VideoFrameInfo {
    pub drawcalls: u32,
    pub triangles: u32,
    pub alive_surfaces: u32,
    pub alive_render_textures: u32,
    pub alive_shaders: u32,
    pub alive_meshes: u32,
}

/// The centralized management of GPU objects and render state.
///
/// Handles are allocated from pools owned by the device, so a stale handle is always
/// detected here before it reaches the backend. Deleting an object that is already
/// gone is a no-op.
pub struct VideoDevice {
    visitor: RefCell<Box<dyn Visitor>>,
    dimensions: Cell<Vector2<u32>>,
    frame: Cell<VideoFrameInfo>,

    surfaces: RefCell<ObjectPool<SurfaceHandle, SurfaceParams>>,
    render_textures: RefCell<ObjectPool<RenderTextureHandle, RenderTextureParams>>,
    shaders: RefCell<ObjectPool<ShaderHandle, ShaderParams>>,
    meshes: RefCell<ObjectPool<MeshHandle, MeshParams>>,
}

impl VideoDevice {
    /// Creates a device drawing through `visitor` into a screen of `dimensions`.
    pub fn new(visitor: Box<dyn Visitor>, dimensions: Vector2<u32>) -> Self {
        VideoDevice {
            visitor: RefCell::new(visitor),
            dimensions: Cell::new(dimensions),
            frame: Cell::new(VideoFrameInfo::default()),

            surfaces: RefCell::new(ObjectPool::new()),
            render_textures: RefCell::new(ObjectPool::new()),
            shaders: RefCell::new(ObjectPool::new()),
            meshes: RefCell::new(ObjectPool::new()),
        }
    }

    /// Creates a device without graphics context, and the recorder of everything it
    /// submits.
    pub fn headless(dimensions: Vector2<u32>) -> (Self, HeadlessRecorder) {
        let (visitor, recorder) = backends::new_headless();
        (VideoDevice::new(visitor, dimensions), recorder)
    }

    /// Gets the dimensions of the screen in pixels.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions.get()
    }

    /// Notifies the device that the screen has been resized.
    pub fn resize(&self, dimensions: Vector2<u32>) {
        debug!("Screen resized to {}x{}.", dimensions.x, dimensions.y);

        self.dimensions.set(dimensions);
    }

    /// Returns the counters of the current frame.
    pub fn info(&self) -> VideoFrameInfo {
        let mut info = self.frame.get();
        info.alive_surfaces = self.surfaces.borrow().len() as u32;
        info.alive_render_textures = self.render_textures.borrow().len() as u32;
        info.alive_shaders = self.shaders.borrow().len() as u32;
        info.alive_meshes = self.meshes.borrow().len() as u32;
        info
    }

    /// Advances to next frame, returns the counters of the finished one.
    pub fn advance(&self) -> VideoFrameInfo {
        let info = self.info();
        self.frame.set(VideoFrameInfo::default());
        info
    }
}

impl VideoDevice {
    /// Creates a render texture which could be sampled in shaders and attached to a
    /// surface.
    pub fn create_render_texture(
        &self,
        params: RenderTextureParams,
    ) -> Result<RenderTextureHandle> {
        params.validate()?;

        let handle = self.render_textures.borrow_mut().create(params);
        let result = unsafe {
            self.visitor
                .borrow_mut()
                .create_render_texture(handle, params)
        };

        if let Err(err) = result {
            self.render_textures.borrow_mut().free(handle);
            return Err(err.into());
        }

        Ok(handle)
    }

    /// Gets the `RenderTextureParams` if available.
    pub fn render_texture(&self, handle: RenderTextureHandle) -> Option<RenderTextureParams> {
        self.render_textures.borrow().get(handle).cloned()
    }

    /// Deletes the render texture object.
    pub fn delete_render_texture(&self, handle: RenderTextureHandle) {
        if self.render_textures.borrow_mut().free(handle).is_some() {
            let result = unsafe { self.visitor.borrow_mut().delete_render_texture(handle) };
            if let Err(err) = result {
                warn!("Failed to delete {}: {}", handle, err);
            }
        }
    }

    /// Creates an off-screen surface whose color attachment is `params.color`.
    pub fn create_surface(&self, params: SurfaceParams) -> Result<SurfaceHandle> {
        if !self.render_textures.borrow().is_alive(params.color) {
            return Err(Error::RenderTextureHandleInvalid(params.color));
        }

        let handle = self.surfaces.borrow_mut().create(params);
        let result = unsafe { self.visitor.borrow_mut().create_surface(handle, params) };

        if let Err(err) = result {
            self.surfaces.borrow_mut().free(handle);
            return Err(err.into());
        }

        Ok(handle)
    }

    /// Gets the `SurfaceParams` if available.
    pub fn surface(&self, handle: SurfaceHandle) -> Option<SurfaceParams> {
        self.surfaces.borrow().get(handle).cloned()
    }

    /// Deletes the surface object.
    pub fn delete_surface(&self, handle: SurfaceHandle) {
        if self.surfaces.borrow_mut().free(handle).is_some() {
            let result = unsafe { self.visitor.borrow_mut().delete_surface(handle) };
            if let Err(err) = result {
                warn!("Failed to delete {}: {}", handle, err);
            }
        }
    }

    /// Creates a shader program from GLSL sources.
    pub fn create_shader(&self, params: ShaderParams, vs: &str, fs: &str) -> Result<ShaderHandle> {
        params.validate(vs, fs)?;

        let handle = self.shaders.borrow_mut().create(params.clone());
        let result = unsafe {
            self.visitor
                .borrow_mut()
                .create_shader(handle, params, vs, fs)
        };

        if let Err(err) = result {
            self.shaders.borrow_mut().free(handle);
            return Err(err.into());
        }

        Ok(handle)
    }

    /// Gets the `ShaderParams` if available.
    pub fn shader(&self, handle: ShaderHandle) -> Option<ShaderParams> {
        self.shaders.borrow().get(handle).cloned()
    }

    /// Deletes the shader program.
    pub fn delete_shader(&self, handle: ShaderHandle) {
        if self.shaders.borrow_mut().free(handle).is_some() {
            let result = unsafe { self.visitor.borrow_mut().delete_shader(handle) };
            if let Err(err) = result {
                warn!("Failed to delete {}: {}", handle, err);
            }
        }
    }

    /// Creates a mesh object with optional initial vertices.
    pub fn create_mesh<'a, T>(&self, params: MeshParams, verts: T) -> Result<MeshHandle>
    where
        T: Into<Option<&'a [u8]>>,
    {
        let verts = verts.into();
        params.validate(verts)?;

        let handle = self.meshes.borrow_mut().create(params.clone());
        let result = unsafe {
            self.visitor
                .borrow_mut()
                .create_mesh(handle, params, verts)
        };

        if let Err(err) = result {
            self.meshes.borrow_mut().free(handle);
            return Err(err.into());
        }

        Ok(handle)
    }

    /// Gets the `MeshParams` if available.
    pub fn mesh(&self, handle: MeshHandle) -> Option<MeshParams> {
        self.meshes.borrow().get(handle).cloned()
    }

    /// Updates a subset of dynamic vertex buffer. `offset` is measured in bytes.
    pub fn update_vertex_buffer(
        &self,
        handle: MeshHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        {
            let meshes = self.meshes.borrow();
            let params = meshes
                .get(handle)
                .ok_or_else(|| Error::MeshHandleInvalid(handle))?;

            if offset + data.len() > params.vertex_buffer_len() {
                return Err(Error::OutOfBounds);
            }
        }

        unsafe {
            self.visitor
                .borrow_mut()
                .update_vertex_buffer(handle, offset, data)?;
        }

        Ok(())
    }

    /// Deletes the mesh object.
    pub fn delete_mesh(&self, handle: MeshHandle) {
        if self.meshes.borrow_mut().free(handle).is_some() {
            let result = unsafe { self.visitor.borrow_mut().delete_mesh(handle) };
            if let Err(err) = result {
                warn!("Failed to delete {}: {}", handle, err);
            }
        }
    }
}

impl VideoDevice {
    /// Binds `surface` as render destination. `None` binds the screen.
    pub fn bind_surface(&self, surface: Option<SurfaceHandle>) -> Result<()> {
        if let Some(handle) = surface {
            if !self.surfaces.borrow().is_alive(handle) {
                return Err(Error::SurfaceHandleInvalid(handle));
            }
        }

        unsafe { self.visitor.borrow_mut().bind_surface(surface)? };
        Ok(())
    }

    pub fn update_viewport(&self, vp: SurfaceViewport) -> Result<()> {
        unsafe { self.visitor.borrow_mut().update_viewport(vp)? };
        Ok(())
    }

    /// Clears the color buffer of the bound destination.
    pub fn clear(&self, color: Color) -> Result<()> {
        unsafe { self.visitor.borrow_mut().clear(color)? };
        Ok(())
    }

    pub fn set_depth_write(&self, enable: bool) -> Result<()> {
        unsafe { self.visitor.borrow_mut().set_depth_write(enable)? };
        Ok(())
    }

    pub fn set_blend(&self, enable: bool) -> Result<()> {
        unsafe { self.visitor.borrow_mut().set_blend(enable)? };
        Ok(())
    }

    pub fn set_blend_func(&self, src: BlendFactor, dst: BlendFactor) -> Result<()> {
        unsafe { self.visitor.borrow_mut().set_blend_func(src, dst)? };
        Ok(())
    }

    /// Begins (`Some`) or ends (`None`) a shader program.
    pub fn bind_shader(&self, shader: Option<ShaderHandle>) -> Result<()> {
        if let Some(handle) = shader {
            if !self.shaders.borrow().is_alive(handle) {
                return Err(Error::ShaderHandleInvalid(handle));
            }
        }

        unsafe { self.visitor.borrow_mut().bind_shader(shader)? };
        Ok(())
    }

    /// Sets a uniform variable of the bound shader program.
    pub fn set_uniform<T>(&self, field: &str, variable: T) -> Result<()>
    where
        T: Into<UniformVariable>,
    {
        let variable = variable.into();
        if let UniformVariable::RenderTexture(handle) = variable {
            if !self.render_textures.borrow().is_alive(handle) {
                return Err(Error::RenderTextureHandleInvalid(handle));
            }
        }

        unsafe { self.visitor.borrow_mut().set_uniform(field, variable)? };
        Ok(())
    }

    /// Draws `len` vertices of `mesh` starting at `from` with the bound shader.
    pub fn draw(&self, mesh: MeshHandle, from: u32, len: u32) -> Result<()> {
        if !self.meshes.borrow().is_alive(mesh) {
            return Err(Error::MeshHandleInvalid(mesh));
        }

        let triangles = unsafe { self.visitor.borrow_mut().draw(mesh, from, len)? };

        let mut info = self.frame.get();
        info.drawcalls += 1;
        info.triangles += triangles;
        self.frame.set(info);
        Ok(())
    }

    /// Blocks until all submitted commands are finished.
    pub fn flush(&self) -> Result<()> {
        unsafe { self.visitor.borrow_mut().flush()? };
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::video::backends::headless::HeadlessCommand;

    fn target(device: &VideoDevice) -> (RenderTextureHandle, SurfaceHandle) {
        let params = RenderTextureParams {
            dimensions: Vector2::new(8, 8),
            ..Default::default()
        };

        let color = device.create_render_texture(params).unwrap();
        let surface = device.create_surface(SurfaceParams { color }).unwrap();
        (color, surface)
    }

    #[test]
    fn lifetime() {
        let (device, recorder) = VideoDevice::headless(Vector2::new(64, 64));
        let (color, surface) = target(&device);

        assert_eq!(device.info().alive_surfaces, 1);
        assert_eq!(recorder.alive_render_textures(), 1);

        device.delete_surface(surface);
        device.delete_surface(surface);
        device.delete_render_texture(color);
        device.delete_render_texture(color);

        assert_eq!(device.info().alive_surfaces, 0);
        assert_eq!(device.info().alive_render_textures, 0);
        assert_eq!(recorder.alive_surfaces(), 0);
        assert_eq!(recorder.alive_render_textures(), 0);

        // Double deletes never reach the backend.
        let deletes = recorder
            .commands()
            .iter()
            .filter(|v| match v {
                HeadlessCommand::DeleteSurface(_) | HeadlessCommand::DeleteRenderTexture(_) => true,
                _ => false,
            })
            .count();

        assert_eq!(deletes, 2);
    }

    #[test]
    fn invalid_handles() {
        let (device, _) = VideoDevice::headless(Vector2::new(64, 64));
        let (color, surface) = target(&device);

        device.delete_surface(surface);
        assert!(device.bind_surface(Some(surface)).is_err());
        assert!(device.bind_surface(None).is_ok());

        device.delete_render_texture(color);
        assert!(device.create_surface(SurfaceParams { color }).is_err());
        assert!(device
            .create_render_texture(RenderTextureParams::default())
            .is_err());
    }

    #[test]
    fn counters() {
        let (device, _) = VideoDevice::headless(Vector2::new(64, 64));

        let params = MeshParams {
            hint: MeshHint::Stream,
            layout: VertexLayout::build().with(Attribute::Position, 2).finish(),
            primitive: MeshPrimitive::TriangleFan,
            num_verts: 6,
        };

        let mesh = device.create_mesh(params, None).unwrap();
        assert!(device.update_vertex_buffer(mesh, 0, &[0; 48]).is_ok());
        assert!(device.update_vertex_buffer(mesh, 8, &[0; 48]).is_err());

        device.draw(mesh, 0, 6).unwrap();
        device.draw(mesh, 0, 3).unwrap();
        assert!(device.draw(mesh, 4, 3).is_err());

        let info = device.advance();
        assert_eq!(info.drawcalls, 2);
        assert_eq!(info.triangles, 5);
        assert_eq!(info.alive_meshes, 1);
        assert_eq!(device.info().drawcalls, 0);
    }
}
