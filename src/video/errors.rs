use crate::video::assets::prelude::*;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "{} is invalid.", _0)]
    SurfaceHandleInvalid(SurfaceHandle),
    #[fail(display = "{} is invalid.", _0)]
    RenderTextureHandleInvalid(RenderTextureHandle),
    #[fail(display = "{} is invalid.", _0)]
    ShaderHandleInvalid(ShaderHandle),
    #[fail(display = "{} is invalid.", _0)]
    MeshHandleInvalid(MeshHandle),
    #[fail(display = "Render texture is invalid: {}", _0)]
    RenderTextureInvalid(String),
    #[fail(display = "Shader is invalid: {}", _0)]
    ShaderInvalid(String),
    #[fail(display = "Mesh is invalid: {}", _0)]
    MeshInvalid(String),
    #[fail(display = "Out of bounds.")]
    OutOfBounds,
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<failure::Error> for Error {
    fn from(err: failure::Error) -> Error {
        Error::Backend(format!("{}", err))
    }
}
