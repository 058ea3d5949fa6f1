use gl::types::*;
use std::cmp;
use std::ffi;

use crate::errors::*;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Parses a `GL_VERSION` string, e.g. "4.1 Metal - 76.3" or "OpenGL ES 3.0 ...".
    pub fn parse_str(desc: &str) -> Result<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else {
            (false, desc)
        };

        let desc = desc
            .split(' ')
            .next()
            .ok_or_else(|| format_err!("[GL] Version string {:?} is unformaled.", desc))?;

        let mut iter = desc.split('.');
        let mut component = || -> Result<u8> {
            let v = iter
                .next()
                .ok_or_else(|| format_err!("[GL] Version string {:?} is unformaled.", desc))?;
            Ok(v.parse()?)
        };

        let major = component()?;
        let minor = component()?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Obtains the OpenGL version of the current context using the loaded functions.
    ///
    /// # Unsafe
    ///
    /// You must ensure that the functions belong to the current context, otherwise you will get
    /// an undefined behavior.
    pub unsafe fn parse() -> Result<Version> {
        Version::parse_str(&parse_str(gl::VERSION)?)
    }
}

/// The extensions the light map needs on contexts older than GL 3.0 / ES 2.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extensions {
    pub gl_arb_framebuffer_object: bool,
    pub gl_ext_framebuffer_object: bool,
    pub gl_arb_vertex_array_object: bool,
    pub gl_apple_vertex_array_object: bool,
    pub gl_oes_vertex_array_object: bool,
}

impl Extensions {
    pub unsafe fn parse(version: Version) -> Result<Extensions> {
        let strings: Vec<String> = if version >= Version::GL(3, 0) || version >= Version::ES(3, 0)
        {
            let mut num_extensions = 0;
            gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);

            let mut strings = Vec::with_capacity(num_extensions as usize);
            for i in 0..num_extensions {
                let ext = gl::GetStringi(gl::EXTENSIONS, i as GLuint);
                if !ext.is_null() {
                    let ext = ffi::CStr::from_ptr(ext as *const _);
                    strings.push(ext.to_string_lossy().into_owned());
                }
            }

            strings
        } else {
            parse_str(gl::EXTENSIONS)?
                .split(' ')
                .map(|e| e.to_owned())
                .collect()
        };

        let mut extensions = Extensions::default();
        for extension in strings {
            match &extension[..] {
                "GL_ARB_framebuffer_object" => extensions.gl_arb_framebuffer_object = true,
                "GL_EXT_framebuffer_object" => extensions.gl_ext_framebuffer_object = true,
                "GL_ARB_vertex_array_object" => extensions.gl_arb_vertex_array_object = true,
                "GL_APPLE_vertex_array_object" => extensions.gl_apple_vertex_array_object = true,
                "GL_OES_vertex_array_object" => extensions.gl_oes_vertex_array_object = true,
                _ => (),
            }
        }

        Ok(extensions)
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug)]
pub struct Capabilities {
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    /// The name of the renderer.
    pub renderer: String,
    pub extensions: Extensions,
    /// Maximum width and height of `glViewport`.
    pub max_viewport_dims: (u32, u32),
    /// Maximum number of textures that can be bound to a program.
    pub max_combined_texture_image_units: u8,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;
        let extensions = Extensions::parse(version)?;

        let mut dims: [GLint; 2] = [0, 0];
        gl::GetIntegerv(gl::MAX_VIEWPORT_DIMS, dims.as_mut_ptr());

        let mut units = 2;
        gl::GetIntegerv(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, &mut units);

        Ok(Capabilities {
            version,
            extensions,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            max_viewport_dims: (dims[0] as u32, dims[1] as u32),
            max_combined_texture_image_units: units as u8,
        })
    }

    /// Checks that framebuffer objects and vertex array objects are available.
    pub fn validate(&self) -> Result<()> {
        if self.version < Version::GL(3, 0)
            && self.version < Version::ES(2, 0)
            && !self.extensions.gl_ext_framebuffer_object
            && !self.extensions.gl_arb_framebuffer_object
        {
            bail!("The OpenGL implementation does not supports framebuffer objects.");
        }

        if self.version < Version::GL(3, 0)
            && self.version < Version::ES(3, 0)
            && !self.extensions.gl_arb_vertex_array_object
            && !self.extensions.gl_apple_vertex_array_object
            && !self.extensions.gl_oes_vertex_array_object
        {
            bail!("The OpenGL implementation does not supports vertex array objects.");
        }

        Ok(())
    }
}

#[inline]
unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        bail!("[GL] String of {} is null.", id);
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| format_err!("[GL] String of {} is unformaled.", id))
}
