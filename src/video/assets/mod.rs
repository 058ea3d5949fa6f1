pub mod mesh;
pub mod shader;
pub mod surface;
pub mod texture;

pub mod prelude {
    pub use super::surface::{SurfaceHandle, SurfaceParams, SurfaceViewport};

    pub use super::shader::{
        Attribute, BlendFactor, BlendValue, ShaderHandle, ShaderParams, UniformVariable,
        UniformVariableLayout, UniformVariableType,
    };

    pub use super::texture::{
        RenderTextureFormat, RenderTextureHandle, RenderTextureParams, TextureFilter, TextureWrap,
    };

    pub use super::mesh::{MeshHandle, MeshHint, MeshParams, MeshPrimitive, VertexLayout};
}
