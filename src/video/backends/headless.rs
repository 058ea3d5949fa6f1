//! A backend without graphics context. It keeps track of live objects and records
//! every command it receives, so the order of state changes can be asserted on.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::Color;

use super::super::assets::prelude::*;
use super::utils::DataVec;
use super::Visitor;

/// A command received by `HeadlessVisitor`.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessCommand {
    CreateRenderTexture(RenderTextureHandle, Vector2<u32>),
    DeleteRenderTexture(RenderTextureHandle),
    CreateSurface(SurfaceHandle, RenderTextureHandle),
    DeleteSurface(SurfaceHandle),
    CreateShader(ShaderHandle),
    DeleteShader(ShaderHandle),
    CreateMesh(MeshHandle),
    UpdateVertexBuffer(MeshHandle, usize),
    DeleteMesh(MeshHandle),
    BindSurface(Option<SurfaceHandle>),
    UpdateViewport(SurfaceViewport),
    Clear(Color),
    DepthWrite(bool),
    Blend(bool),
    BlendFunc(BlendFactor, BlendFactor),
    BindShader(Option<ShaderHandle>),
    SetUniform(String, UniformVariable),
    Draw(MeshHandle, u32, u32),
    Flush,
}

#[derive(Default)]
struct HeadlessState {
    cmds: Vec<HeadlessCommand>,
    render_textures: DataVec<RenderTextureParams>,
    surfaces: DataVec<SurfaceParams>,
    shaders: DataVec<ShaderParams>,
    meshes: DataVec<MeshParams>,
}

/// A shared view into the commands and live objects of a `HeadlessVisitor`.
#[derive(Clone)]
pub struct HeadlessRecorder {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessRecorder {
    /// Returns all the commands recorded since creation or the last `clear`.
    pub fn commands(&self) -> Ref<[HeadlessCommand]> {
        Ref::map(self.state.borrow(), |v| v.cmds.as_slice())
    }

    /// Forgets the recorded commands, live objects are kept.
    pub fn clear(&self) {
        self.state.borrow_mut().cmds.clear();
    }

    pub fn alive_surfaces(&self) -> usize {
        self.state.borrow().surfaces.len()
    }

    pub fn alive_render_textures(&self) -> usize {
        self.state.borrow().render_textures.len()
    }

    pub fn alive_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn alive_meshes(&self) -> usize {
        self.state.borrow().meshes.len()
    }

    /// Returns the dimensions of a live render texture.
    pub fn render_texture_dimensions(&self, handle: RenderTextureHandle) -> Option<Vector2<u32>> {
        self.state
            .borrow()
            .render_textures
            .get(handle)
            .map(|v| v.dimensions)
    }
}

pub struct HeadlessVisitor {
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            state: Rc::new(RefCell::new(HeadlessState::default())),
        }
    }

    pub fn recorder(&self) -> HeadlessRecorder {
        HeadlessRecorder {
            state: self.state.clone(),
        }
    }

    fn push(&self, cmd: HeadlessCommand) {
        trace!("[Headless] {:?}", cmd);
        self.state.borrow_mut().cmds.push(cmd);
    }
}

impl Visitor for HeadlessVisitor {
    unsafe fn create_render_texture(
        &mut self,
        handle: RenderTextureHandle,
        params: RenderTextureParams,
    ) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state.render_textures.create(handle, params);
        }

        self.push(HeadlessCommand::CreateRenderTexture(
            handle,
            params.dimensions,
        ));
        Ok(())
    }

    unsafe fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state
                .render_textures
                .free(handle)
                .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        }

        self.push(HeadlessCommand::DeleteRenderTexture(handle));
        Ok(())
    }

    unsafe fn create_surface(
        &mut self,
        handle: SurfaceHandle,
        params: SurfaceParams,
    ) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.render_textures.get(params.color).is_none() {
                bail!("{} of surface {} is invalid.", params.color, handle);
            }

            state.surfaces.create(handle, params);
        }

        self.push(HeadlessCommand::CreateSurface(handle, params.color));
        Ok(())
    }

    unsafe fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state
                .surfaces
                .free(handle)
                .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        }

        self.push(HeadlessCommand::DeleteSurface(handle));
        Ok(())
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: ShaderParams,
        _: &str,
        _: &str,
    ) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state.shaders.create(handle, params);
        }

        self.push(HeadlessCommand::CreateShader(handle));
        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state
                .shaders
                .free(handle)
                .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        }

        self.push(HeadlessCommand::DeleteShader(handle));
        Ok(())
    }

    unsafe fn create_mesh(
        &mut self,
        handle: MeshHandle,
        params: MeshParams,
        _: Option<&[u8]>,
    ) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state.meshes.create(handle, params);
        }

        self.push(HeadlessCommand::CreateMesh(handle));
        Ok(())
    }

    unsafe fn update_vertex_buffer(
        &mut self,
        handle: MeshHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let mesh = state
                .meshes
                .get(handle)
                .ok_or_else(|| format_err!("{} is invalid.", handle))?;

            if offset + bytes.len() > mesh.vertex_buffer_len() {
                bail!("Trying to update vertex buffer of {} out of bounds.", handle);
            }
        }

        self.push(HeadlessCommand::UpdateVertexBuffer(handle, bytes.len()));
        Ok(())
    }

    unsafe fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            state
                .meshes
                .free(handle)
                .ok_or_else(|| format_err!("{} is invalid.", handle))?;
        }

        self.push(HeadlessCommand::DeleteMesh(handle));
        Ok(())
    }

    unsafe fn bind_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()> {
        self.push(HeadlessCommand::BindSurface(surface));
        Ok(())
    }

    unsafe fn update_viewport(&mut self, vp: SurfaceViewport) -> Result<()> {
        self.push(HeadlessCommand::UpdateViewport(vp));
        Ok(())
    }

    unsafe fn clear(&mut self, color: Color) -> Result<()> {
        self.push(HeadlessCommand::Clear(color));
        Ok(())
    }

    unsafe fn set_depth_write(&mut self, enable: bool) -> Result<()> {
        self.push(HeadlessCommand::DepthWrite(enable));
        Ok(())
    }

    unsafe fn set_blend(&mut self, enable: bool) -> Result<()> {
        self.push(HeadlessCommand::Blend(enable));
        Ok(())
    }

    unsafe fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> Result<()> {
        self.push(HeadlessCommand::BlendFunc(src, dst));
        Ok(())
    }

    unsafe fn bind_shader(&mut self, shader: Option<ShaderHandle>) -> Result<()> {
        self.push(HeadlessCommand::BindShader(shader));
        Ok(())
    }

    unsafe fn set_uniform(&mut self, field: &str, variable: UniformVariable) -> Result<()> {
        self.push(HeadlessCommand::SetUniform(field.to_owned(), variable));
        Ok(())
    }

    unsafe fn draw(&mut self, mesh: MeshHandle, from: u32, len: u32) -> Result<u32> {
        let primitive = {
            let state = self.state.borrow();
            let params = state
                .meshes
                .get(mesh)
                .ok_or_else(|| format_err!("{} is invalid.", mesh))?;

            if (from + len) as usize > params.num_verts {
                bail!("Draw range of {} is out of bounds.", mesh);
            }

            params.primitive
        };

        self.push(HeadlessCommand::Draw(mesh, from, len));
        Ok(primitive.assemble(len))
    }

    unsafe fn flush(&mut self) -> Result<()> {
        self.push(HeadlessCommand::Flush);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn double_delete() {
        let mut visitor = HeadlessVisitor::new();
        let recorder = visitor.recorder();

        let handle = RenderTextureHandle::default();
        let params = RenderTextureParams {
            dimensions: Vector2::new(4, 4),
            ..Default::default()
        };

        unsafe {
            visitor.create_render_texture(handle, params).unwrap();
            assert_eq!(recorder.alive_render_textures(), 1);
            assert_eq!(
                recorder.render_texture_dimensions(handle),
                Some(Vector2::new(4, 4))
            );

            visitor.delete_render_texture(handle).unwrap();
            assert!(visitor.delete_render_texture(handle).is_err());
        }

        assert_eq!(recorder.alive_render_textures(), 0);
        assert_eq!(recorder.commands().len(), 2);
    }
}
