//! The backend of renderer, which should be responsible for only one thing:
//! submitting state changes and draw-calls using low-level video APIs.

pub mod headless;

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

mod utils;

use crate::errors::*;
use crate::utils::Color;

use super::assets::prelude::*;

/// The immediate-mode command interface of a video backend.
///
/// All methods are `unsafe` because implementations talk to a graphics context that
/// must be current on the calling thread.
pub trait Visitor {
    unsafe fn create_render_texture(
        &mut self,
        handle: RenderTextureHandle,
        params: RenderTextureParams,
    ) -> Result<()>;

    unsafe fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()>;

    unsafe fn create_surface(&mut self, handle: SurfaceHandle, params: SurfaceParams)
        -> Result<()>;

    unsafe fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()>;

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: ShaderParams,
        vs: &str,
        fs: &str,
    ) -> Result<()>;

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn create_mesh(
        &mut self,
        handle: MeshHandle,
        params: MeshParams,
        verts: Option<&[u8]>,
    ) -> Result<()>;

    unsafe fn update_vertex_buffer(
        &mut self,
        handle: MeshHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<()>;

    unsafe fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()>;

    /// Binds an off-screen surface as the render destination, or the default
    /// framebuffer with `None`.
    unsafe fn bind_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()>;

    unsafe fn update_viewport(&mut self, vp: SurfaceViewport) -> Result<()>;

    /// Clears the color buffer of the bound destination.
    unsafe fn clear(&mut self, color: Color) -> Result<()>;

    unsafe fn set_depth_write(&mut self, enable: bool) -> Result<()>;

    unsafe fn set_blend(&mut self, enable: bool) -> Result<()>;

    unsafe fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> Result<()>;

    /// Begins (`Some`) or ends (`None`) a shader program.
    unsafe fn bind_shader(&mut self, shader: Option<ShaderHandle>) -> Result<()>;

    /// Sets a uniform variable of the bound shader program.
    unsafe fn set_uniform(&mut self, field: &str, variable: UniformVariable) -> Result<()>;

    /// Draws `len` vertices of `mesh` starting at `from` with the bound shader program,
    /// and returns the number of assembled triangles.
    unsafe fn draw(&mut self, mesh: MeshHandle, from: u32, len: u32) -> Result<u32>;

    /// Blocks until all execution is complete.
    unsafe fn flush(&mut self) -> Result<()>;
}

pub fn new_headless() -> (Box<dyn Visitor>, headless::HeadlessRecorder) {
    let visitor = headless::HeadlessVisitor::new();
    let recorder = visitor.recorder();
    (Box::new(visitor), recorder)
}
