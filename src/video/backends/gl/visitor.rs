use std::cell::RefCell;
use std::collections::HashMap;
use std::os::raw::c_void;

use gl::types::*;
use smallvec::SmallVec;

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::Color;

use super::super::super::assets::prelude::*;
use super::super::utils::DataVec;
use super::super::Visitor;
use super::capabilities::Capabilities;

#[derive(Debug, Clone)]
struct GLSurfaceData {
    handle: SurfaceHandle,
    id: GLuint,
    color: RenderTextureHandle,
}

#[derive(Debug, Clone)]
struct GLShaderData {
    handle: ShaderHandle,
    id: GLuint,
    params: ShaderParams,
    uniforms: RefCell<HashMap<String, GLint>>,
    attributes: RefCell<HashMap<Attribute, GLint>>,
}

impl GLShaderData {
    unsafe fn uniform_location(&self, name: &str) -> Result<GLint> {
        let mut uniforms = self.uniforms.borrow_mut();
        match uniforms.get(name).cloned() {
            Some(location) => Ok(location),
            None => {
                let c_name = ::std::ffi::CString::new(name.as_bytes())?;
                let location = gl::GetUniformLocation(self.id, c_name.as_ptr());
                check()?;

                uniforms.insert(name.to_owned(), location);
                Ok(location)
            }
        }
    }

    unsafe fn attribute_location(&self, name: Attribute) -> Result<GLint> {
        let mut attributes = self.attributes.borrow_mut();
        match attributes.get(&name).cloned() {
            Some(location) => Ok(location),
            None => {
                let c_name = ::std::ffi::CString::new(name.name().as_bytes())?;
                let location = gl::GetAttribLocation(self.id, c_name.as_ptr());
                check()?;

                attributes.insert(name, location);
                Ok(location)
            }
        }
    }
}

#[derive(Debug, Clone)]
struct GLMeshData {
    handle: MeshHandle,
    vbo: GLuint,
    params: MeshParams,
}

#[derive(Debug, Copy, Clone)]
struct GLRenderTextureData {
    handle: RenderTextureHandle,
    id: GLuint,
    dimensions: Vector2<u32>,
}

struct GLMutableState {
    depth_write: bool,
    blend: bool,
    blend_func: Option<(BlendFactor, BlendFactor)>,
    view: SurfaceViewport,
    vaos: HashMap<(ShaderHandle, MeshHandle), GLuint>,
    binded_surface: Option<SurfaceHandle>,
    binded_shader: Option<ShaderHandle>,
    binded_vao: Option<(ShaderHandle, MeshHandle)>,
    binded_texture_index: usize,
    binded_textures: SmallVec<[Option<RenderTextureHandle>; 8]>,
    // Texture units handed out to sampler uniforms of the bound program.
    samplers: SmallVec<[(String, usize); 4]>,
}

/// OpenGL implementation of `Visitor`. The gl function pointers must have been
/// loaded, and the context must be current on the calling thread.
pub struct GLVisitor {
    state: GLMutableState,
    capabilities: Capabilities,
    surfaces: DataVec<GLSurfaceData>,
    shaders: DataVec<GLShaderData>,
    meshes: DataVec<GLMeshData>,
    render_textures: DataVec<GLRenderTextureData>,
}

impl GLVisitor {
    /// Loads the gl function pointers with `loader` and creates a visitor.
    pub unsafe fn with_loader<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        gl::load_with(loader);
        Self::new()
    }

    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);
        capabilities.validate()?;

        let state = GLMutableState {
            depth_write: false,
            blend: false,
            blend_func: None,
            view: SurfaceViewport::new(0, 0, 0, 0),
            vaos: HashMap::new(),
            binded_surface: None,
            binded_shader: None,
            binded_vao: None,
            binded_texture_index: 0,
            binded_textures: SmallVec::new(),
            samplers: SmallVec::new(),
        };

        let mut visitor = GLVisitor {
            state,
            capabilities,
            surfaces: DataVec::new(),
            shaders: DataVec::new(),
            meshes: DataVec::new(),
            render_textures: DataVec::new(),
        };

        Self::reset_render_state(&mut visitor.state)?;
        Ok(visitor)
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_render_texture(
        &mut self,
        handle: RenderTextureHandle,
        params: RenderTextureParams,
    ) -> Result<()> {
        let (w, h) = self.capabilities.max_viewport_dims;
        if params.dimensions.x > w || params.dimensions.y > h {
            bail!(
                "{} exceeds the maximum viewport dimensions {}x{}.",
                handle,
                w,
                h
            );
        }

        let mut id = 0;
        gl::GenTextures(1, &mut id);
        assert!(id != 0);

        Self::bind_texture(&mut self.state, Some(handle), 0, id)?;

        let wrap: GLenum = params.wrap.into();
        let filter: GLenum = params.filter.into();
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter as GLint);

        let (internal_format, format, pixel_type) = params.format.into();
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            internal_format as GLint,
            params.dimensions.x as GLsizei,
            params.dimensions.y as GLsizei,
            0,
            format,
            pixel_type,
            ::std::ptr::null(),
        );

        check()?;

        self.render_textures
            .create(handle, GLRenderTextureData {
                handle,
                id,
                dimensions: params.dimensions,
            });

        Ok(())
    }

    unsafe fn delete_render_texture(&mut self, handle: RenderTextureHandle) -> Result<()> {
        let rt = self
            .render_textures
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        for v in self.state.binded_textures.iter_mut() {
            if *v == Some(rt.handle) {
                *v = None;
            }
        }

        gl::DeleteTextures(1, &rt.id);
        check()
    }

    unsafe fn create_surface(
        &mut self,
        handle: SurfaceHandle,
        params: SurfaceParams,
    ) -> Result<()> {
        let rt = *self
            .render_textures
            .get(params.color)
            .ok_or_else(|| format_err!("{} of {} is invalid.", params.color, handle))?;

        let mut id = 0;
        gl::GenFramebuffers(1, &mut id);
        assert!(id != 0);

        gl::BindFramebuffer(gl::FRAMEBUFFER, id);
        self.state.binded_surface = None;

        gl::FramebufferTexture2D(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            rt.id,
            0,
        );

        if gl::CheckFramebufferStatus(gl::FRAMEBUFFER) != gl::FRAMEBUFFER_COMPLETE {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            gl::DeleteFramebuffers(1, &id);
            bail!("Framebuffer of {} is incomplete.", handle);
        }

        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        check()?;

        debug!(
            "Created framebuffer of {} with {}x{} {}.",
            handle, rt.dimensions.x, rt.dimensions.y, rt.handle
        );

        self.surfaces.create(
            handle,
            GLSurfaceData {
                handle,
                id,
                color: params.color,
            },
        );

        Ok(())
    }

    unsafe fn delete_surface(&mut self, handle: SurfaceHandle) -> Result<()> {
        let surface = self
            .surfaces
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.render_textures.get(surface.color).is_none() {
            warn!("{} outlived its color attachment.", surface.handle);
        }

        if self.state.binded_surface == Some(surface.handle) {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            self.state.binded_surface = None;
        }

        gl::DeleteFramebuffers(1, &surface.id);
        check()
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: ShaderParams,
        vs: &str,
        fs: &str,
    ) -> Result<()> {
        let vs = Self::compile(gl::VERTEX_SHADER, vs)?;
        let fs = Self::compile(gl::FRAGMENT_SHADER, fs)?;
        let id = Self::link(&[vs, fs])?;

        gl::DetachShader(id, vs);
        gl::DeleteShader(vs);
        gl::DetachShader(id, fs);
        gl::DeleteShader(fs);
        check()?;

        let shader = GLShaderData {
            handle,
            id,
            params,
            uniforms: RefCell::new(HashMap::new()),
            attributes: RefCell::new(HashMap::new()),
        };

        for &(name, _) in shader.params.attributes.iter() {
            let location = shader.attribute_location(name)?;
            if location == -1 {
                gl::DeleteProgram(id);
                bail!("Attribute({:?}) is undefined in shader sources.", name);
            }
        }

        for &(ref name, _) in shader.params.uniforms.iter() {
            let location = shader.uniform_location(name)?;
            if location == -1 {
                gl::DeleteProgram(id);
                bail!("Uniform({:?}) is undefined in shader sources.", name);
            }
        }

        self.shaders.create(handle, shader);
        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let shader = self
            .shaders
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        // Removes deprecated `VertexArrayObject`s.
        self.state.vaos.retain(|&(h, _), vao| {
            if h == shader.handle {
                gl::DeleteVertexArrays(1, vao as *mut u32);
                false
            } else {
                true
            }
        });

        if self.state.binded_vao.map(|v| v.0) == Some(handle) {
            self.state.binded_vao = None;
        }

        if self.state.binded_shader == Some(handle) {
            self.state.binded_shader = None;
        }

        gl::DeleteProgram(shader.id);
        check()
    }

    unsafe fn create_mesh(
        &mut self,
        handle: MeshHandle,
        params: MeshParams,
        verts: Option<&[u8]>,
    ) -> Result<()> {
        let mut vbo = 0;
        gl::GenBuffers(1, &mut vbo);
        assert!(vbo != 0);

        gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

        let value = match verts {
            Some(v) if !v.is_empty() => v.as_ptr() as *const c_void,
            _ => ::std::ptr::null(),
        };

        gl::BufferData(
            gl::ARRAY_BUFFER,
            params.vertex_buffer_len() as isize,
            value,
            params.hint.into(),
        );

        check()?;

        self.meshes
            .create(handle, GLMeshData { handle, vbo, params });

        Ok(())
    }

    unsafe fn update_vertex_buffer(
        &mut self,
        handle: MeshHandle,
        offset: usize,
        bytes: &[u8],
    ) -> Result<()> {
        let mesh = self
            .meshes
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if mesh.params.hint == MeshHint::Immutable {
            bail!("Trying to update immutable buffer");
        }

        if bytes.is_empty() {
            return Ok(());
        }

        gl::BindBuffer(gl::ARRAY_BUFFER, mesh.vbo);
        gl::BufferSubData(
            gl::ARRAY_BUFFER,
            offset as isize,
            bytes.len() as isize,
            bytes.as_ptr() as *const c_void,
        );

        check()
    }

    unsafe fn delete_mesh(&mut self, handle: MeshHandle) -> Result<()> {
        let mesh = self
            .meshes
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        // Removes deprecated `VertexArrayObject`s.
        self.state.vaos.retain(|&(_, h), vao| {
            if h == mesh.handle {
                gl::DeleteVertexArrays(1, vao as *mut u32);
                false
            } else {
                true
            }
        });

        if self.state.binded_vao.map(|v| v.1) == Some(handle) {
            self.state.binded_vao = None;
        }

        gl::DeleteBuffers(1, &mesh.vbo);
        check()
    }

    unsafe fn bind_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()> {
        if self.state.binded_surface == surface {
            return Ok(());
        }

        let id = match surface {
            Some(handle) => {
                self.surfaces
                    .get(handle)
                    .ok_or_else(|| format_err!("{} is invalid.", handle))?
                    .id
            }
            None => 0,
        };

        gl::BindFramebuffer(gl::FRAMEBUFFER, id);
        self.state.binded_surface = surface;
        check()
    }

    unsafe fn update_viewport(&mut self, vp: SurfaceViewport) -> Result<()> {
        Self::set_viewport(&mut self.state, vp)
    }

    unsafe fn clear(&mut self, color: Color) -> Result<()> {
        gl::ClearColor(color.r, color.g, color.b, color.a);
        gl::Clear(gl::COLOR_BUFFER_BIT);
        check()
    }

    unsafe fn set_depth_write(&mut self, enable: bool) -> Result<()> {
        if self.state.depth_write != enable {
            gl::DepthMask(if enable { gl::TRUE } else { gl::FALSE });
            self.state.depth_write = enable;
            check()?;
        }

        Ok(())
    }

    unsafe fn set_blend(&mut self, enable: bool) -> Result<()> {
        if self.state.blend != enable {
            if enable {
                gl::Enable(gl::BLEND);
            } else {
                gl::Disable(gl::BLEND);
            }

            self.state.blend = enable;
            check()?;
        }

        Ok(())
    }

    // Specifies how source and destination are combined.
    unsafe fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) -> Result<()> {
        if self.state.blend_func != Some((src, dst)) {
            gl::BlendFunc(src.into(), dst.into());
            self.state.blend_func = Some((src, dst));
            check()?;
        }

        Ok(())
    }

    unsafe fn bind_shader(&mut self, shader: Option<ShaderHandle>) -> Result<()> {
        if self.state.binded_shader == shader {
            return Ok(());
        }

        self.state.samplers.clear();

        match shader {
            Some(handle) => {
                let shader = self
                    .shaders
                    .get(handle)
                    .ok_or_else(|| format_err!("{} is invalid.", handle))?;

                gl::UseProgram(shader.id);
            }
            None => gl::UseProgram(0),
        }

        self.state.binded_shader = shader;
        check()
    }

    unsafe fn set_uniform(&mut self, field: &str, variable: UniformVariable) -> Result<()> {
        let handle = self
            .state
            .binded_shader
            .ok_or_else(|| format_err!("Uniform {:?} is set without a bound shader.", field))?;

        let shader = self
            .shaders
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        match shader.params.uniforms.variable_type(field) {
            Some(tp) if tp != variable.variable_type() => bail!(
                "The uniform {} needs a {:?} instead of {:?}.",
                field,
                tp,
                variable.variable_type(),
            ),
            None => bail!("Undefined uniform field {:?}.", field),
            _ => {}
        }

        let location = shader.uniform_location(field)?;
        if let UniformVariable::RenderTexture(rt) = variable {
            let index = match self.state.samplers.iter().position(|v| v.0 == field) {
                Some(index) => index,
                None => {
                    let index = self.state.samplers.len();
                    if index >= self.capabilities.max_combined_texture_image_units as usize {
                        bail!("Run out of texture units binding {:?}.", field);
                    }

                    self.state.samplers.push((field.to_owned(), index));
                    index
                }
            };

            let id = self
                .render_textures
                .get(rt)
                .ok_or_else(|| format_err!("{} is invalid.", rt))?
                .id;

            Self::bind_uniform_variable(location, &UniformVariable::I32(index as i32))?;
            Self::bind_texture(&mut self.state, Some(rt), index, id)
        } else {
            Self::bind_uniform_variable(location, &variable)
        }
    }

    unsafe fn draw(&mut self, mesh: MeshHandle, from: u32, len: u32) -> Result<u32> {
        let handle = self
            .state
            .binded_shader
            .ok_or_else(|| format_err!("{} is drawn without a bound shader.", mesh))?;

        let shader = self
            .shaders
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        let mesh = self
            .meshes
            .get(mesh)
            .ok_or_else(|| format_err!("{} is invalid.", mesh))?;

        if (from + len) as usize > mesh.params.num_verts {
            bail!("Draw range of {} is out of bounds.", mesh.handle);
        }

        // Bind vertex buffer and vertex array object.
        Self::bind_mesh(&mut self.state, &shader, &mesh)?;

        gl::DrawArrays(mesh.params.primitive.into(), from as GLint, len as GLsizei);
        check()?;

        Ok(mesh.params.primitive.assemble(len))
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }
}

impl GLVisitor {
    unsafe fn bind_uniform_variable(location: GLint, variable: &UniformVariable) -> Result<()> {
        match *variable {
            UniformVariable::RenderTexture(_) => unreachable!(),
            UniformVariable::I32(v) => gl::Uniform1i(location, v),
            UniformVariable::F32(v) => gl::Uniform1f(location, v),
            UniformVariable::Vector2f(v) => gl::Uniform2f(location, v[0], v[1]),
            UniformVariable::Vector4f(v) => gl::Uniform4f(location, v[0], v[1], v[2], v[3]),
            UniformVariable::Matrix4f(v, transpose) => {
                let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                gl::UniformMatrix4fv(location, 1, transpose, v[0].as_ptr())
            }
        }

        check()
    }

    unsafe fn bind_texture(
        state: &mut GLMutableState,
        sampler: Option<RenderTextureHandle>,
        index: usize,
        id: GLuint,
    ) -> Result<()> {
        if state.binded_texture_index != index {
            state.binded_texture_index = index;
            gl::ActiveTexture(gl::TEXTURE0 + index as GLuint);
        }

        if state.binded_textures.len() <= index {
            state.binded_textures.resize(index + 1, None);
        }

        if state.binded_textures[index] != sampler {
            state.binded_textures[index] = sampler;
            gl::BindTexture(gl::TEXTURE_2D, id);
        }

        check()
    }

    unsafe fn bind_mesh(
        state: &mut GLMutableState,
        shader: &GLShaderData,
        mesh: &GLMeshData,
    ) -> Result<()> {
        assert!(state.binded_shader == Some(shader.handle));

        let k = (shader.handle, mesh.handle);
        if state.binded_vao != Some(k) {
            if let Some(vao) = state.vaos.get(&k).cloned() {
                gl::BindVertexArray(vao);
                check()?;
            } else {
                let mut vao = 0;
                gl::GenVertexArrays(1, &mut vao);
                gl::BindVertexArray(vao);
                gl::BindBuffer(gl::ARRAY_BUFFER, mesh.vbo);

                let stride = mesh.params.layout.stride();
                for &(name, size) in shader.params.attributes.iter() {
                    let offset = mesh.params.layout.offset(name).ok_or_else(|| {
                        format_err!(
                            "Can't find attribute {:?} description in vertex buffer.",
                            name
                        )
                    })?;

                    let location = shader.attribute_location(name)?;
                    gl::EnableVertexAttribArray(location as GLuint);
                    gl::VertexAttribPointer(
                        location as GLuint,
                        GLint::from(size),
                        gl::FLOAT,
                        gl::FALSE,
                        GLsizei::from(stride),
                        offset as usize as *const c_void,
                    );
                }

                check()?;
                state.vaos.insert(k, vao);
            }

            state.binded_vao = Some(k);
        }

        Ok(())
    }

    unsafe fn reset_render_state(state: &mut GLMutableState) -> Result<()> {
        gl::Disable(gl::CULL_FACE);
        gl::Disable(gl::DEPTH_TEST);
        gl::Disable(gl::SCISSOR_TEST);

        gl::DepthMask(gl::FALSE);
        state.depth_write = false;

        gl::Disable(gl::BLEND);
        state.blend = false;
        state.blend_func = None;

        gl::ColorMask(1, 1, 1, 1);
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        check()
    }

    /// Set the viewport relative to the bottom-left corner of the destination, in pixels.
    unsafe fn set_viewport(state: &mut GLMutableState, vp: SurfaceViewport) -> Result<()> {
        if state.view != vp {
            gl::Viewport(
                vp.position.x,
                vp.position.y,
                vp.size.x as i32,
                vp.size.y as i32,
            );

            state.view = vp;
            check()?;
        }

        Ok(())
    }

    unsafe fn compile(shader: GLenum, src: &str) -> Result<GLuint> {
        let shader = gl::CreateShader(shader);
        // Attempt to compile the shader
        let c_str = ::std::ffi::CString::new(src.as_bytes())?;
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ::std::ptr::null());
        gl::CompileShader(shader);

        // Get the compile status
        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        // Fail on error
        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(
                shader,
                len,
                ::std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );

            gl::DeleteShader(shader);
            bail!("{}\n{}", String::from_utf8_lossy(&buf), src);
        } else {
            Ok(shader)
        }
    }

    unsafe fn link<'a, T>(shaders: T) -> Result<GLuint>
    where
        T: IntoIterator<Item = &'a GLuint>,
    {
        let program = gl::CreateProgram();
        for shader in shaders {
            gl::AttachShader(program, *shader)
        }

        gl::LinkProgram(program);
        // Get the link status
        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

        // Fail on error
        if status != GLint::from(gl::TRUE) {
            let mut len: GLint = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetProgramInfoLog(
                program,
                len,
                ::std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );

            gl::DeleteProgram(program);
            bail!("{}", String::from_utf8_lossy(&buf));
        } else {
            Ok(program)
        }
    }
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => {
            bail!("[GL] An unacceptable value is specified for an enumerated argument.")
        }

        gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),

        gl::INVALID_OPERATION => {
            bail!("[GL] The specified operation is not allowed in the current state.")
        }

        gl::INVALID_FRAMEBUFFER_OPERATION => bail!(
            r"[GL] The command is trying to render to or read from the framebufferwhile the \
            currently bound framebuffer is not framebuffer complete."
        ),

        gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        _ => bail!("[GL] Oops, Unknown OpenGL error."),
    }
}
