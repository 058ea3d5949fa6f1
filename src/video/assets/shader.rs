//! Shader programs, their uniform layout and blending factors.

use crate::math::{Matrix4, Vector2, Vector4};
use crate::utils::Color;
use crate::video::errors::{Error, Result};

use super::mesh::VertexLayout;
use super::texture::RenderTextureHandle;

impl_handle!(ShaderHandle);

/// A `ShaderParams` describes the vertex attributes a program reads, and the uniform
/// variables it exposes.
#[derive(Debug, Clone, Default)]
pub struct ShaderParams {
    pub attributes: VertexLayout,
    pub uniforms: UniformVariableLayout,
}

impl ShaderParams {
    pub fn validate(&self, vs: &str, fs: &str) -> Result<()> {
        if vs.is_empty() {
            return Err(Error::ShaderInvalid(
                "Vertex shader is required to describe a proper render pipeline.".into(),
            ));
        }

        if fs.is_empty() {
            return Err(Error::ShaderInvalid(
                "Fragment shader is required to describe a proper render pipeline.".into(),
            ));
        }

        if self.attributes.is_empty() {
            return Err(Error::ShaderInvalid(
                "A shader without vertex attributes draws nothing.".into(),
            ));
        }

        Ok(())
    }
}

/// The possible pre-defined and named attributes in the vertex component. The names
/// are used verbatim as attribute names in shader sources.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Attribute {
    Position,
    Color0,
    Texcoord0,
}

impl Attribute {
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Position => "Position",
            Attribute::Color0 => "Color0",
            Attribute::Texcoord0 => "Texcoord0",
        }
    }
}

/// Blend values.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlendValue {
    SourceColor,
    SourceAlpha,
    DestinationColor,
    DestinationAlpha,
}

/// Blend factors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlendFactor {
    Zero,
    One,
    Value(BlendValue),
    OneMinusValue(BlendValue),
}

/// Uniform variable type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformVariableType {
    RenderTexture,
    I32,
    F32,
    Vector2f,
    Vector4f,
    Matrix4f,
}

/// Uniform variable for video program object. Matrices are supplied in column major
/// order with a optional transpose.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    RenderTexture(RenderTextureHandle),
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector4f([f32; 4]),
    Matrix4f([[f32; 4]; 4], bool),
}

impl UniformVariable {
    pub fn variable_type(&self) -> UniformVariableType {
        match *self {
            UniformVariable::RenderTexture(_) => UniformVariableType::RenderTexture,
            UniformVariable::I32(_) => UniformVariableType::I32,
            UniformVariable::F32(_) => UniformVariableType::F32,
            UniformVariable::Vector2f(_) => UniformVariableType::Vector2f,
            UniformVariable::Vector4f(_) => UniformVariableType::Vector4f,
            UniformVariable::Matrix4f(_, _) => UniformVariableType::Matrix4f,
        }
    }
}

impl From<RenderTextureHandle> for UniformVariable {
    fn from(v: RenderTextureHandle) -> Self {
        UniformVariable::RenderTexture(v)
    }
}

impl From<i32> for UniformVariable {
    fn from(v: i32) -> Self {
        UniformVariable::I32(v)
    }
}

impl From<f32> for UniformVariable {
    fn from(v: f32) -> Self {
        UniformVariable::F32(v)
    }
}

impl From<[f32; 2]> for UniformVariable {
    fn from(v: [f32; 2]) -> Self {
        UniformVariable::Vector2f(v)
    }
}

impl From<Vector2<f32>> for UniformVariable {
    fn from(v: Vector2<f32>) -> Self {
        UniformVariable::Vector2f(*v.as_ref())
    }
}

impl From<[f32; 4]> for UniformVariable {
    fn from(v: [f32; 4]) -> Self {
        UniformVariable::Vector4f(v)
    }
}

impl From<Vector4<f32>> for UniformVariable {
    fn from(v: Vector4<f32>) -> Self {
        UniformVariable::Vector4f(*v.as_ref())
    }
}

impl From<Color> for UniformVariable {
    fn from(v: Color) -> Self {
        UniformVariable::Vector4f(v.into())
    }
}

impl From<Matrix4<f32>> for UniformVariable {
    fn from(v: Matrix4<f32>) -> Self {
        UniformVariable::Matrix4f(*v.as_ref(), false)
    }
}

/// `UniformVariableLayout` defines the uniforms a program declares.
#[derive(Debug, Clone, Default)]
pub struct UniformVariableLayout {
    variables: Vec<(String, UniformVariableType)>,
}

impl UniformVariableLayout {
    pub fn build() -> UniformVariableLayoutBuilder {
        UniformVariableLayoutBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, UniformVariableType)> {
        self.variables.iter()
    }

    pub fn variable_type(&self, field: &str) -> Option<UniformVariableType> {
        self.variables
            .iter()
            .find(|v| v.0 == field)
            .map(|v| v.1)
    }
}

#[derive(Default)]
pub struct UniformVariableLayoutBuilder(UniformVariableLayout);

impl UniformVariableLayoutBuilder {
    pub fn with<T>(mut self, field: T, v: UniformVariableType) -> Self
    where
        T: Into<String>,
    {
        let field = field.into();
        self.0.variables.retain(|e| e.0 != field);
        self.0.variables.push((field, v));
        self
    }

    #[inline]
    pub fn finish(self) -> UniformVariableLayout {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uniform_layout() {
        let layout = UniformVariableLayout::build()
            .with("u_projTrans", UniformVariableType::Matrix4f)
            .with("u_dir", UniformVariableType::F32)
            .with("u_dir", UniformVariableType::Vector2f)
            .finish();

        assert_eq!(layout.len(), 2);
        assert_eq!(
            layout.variable_type("u_dir"),
            Some(UniformVariableType::Vector2f)
        );
        assert_eq!(layout.variable_type("u_ambient"), None);
    }

    #[test]
    fn uniform_variable_type() {
        let v: UniformVariable = Matrix4::<f32>::from_scale(2.0).into();
        assert_eq!(v.variable_type(), UniformVariableType::Matrix4f);

        let v: UniformVariable = Color::white().into();
        assert_eq!(v, UniformVariable::Vector4f([1.0, 1.0, 1.0, 1.0]));
    }
}
