//! Vertex buffers drawn with `glDrawArrays`. Light fans are rebuilt every frame, so
//! there are no index buffers here.

use crate::video::errors::{Error, Result};
use crate::video::MAX_VERTEX_ATTRIBUTES;

use super::shader::Attribute;

impl_handle!(MeshHandle);

#[derive(Debug, Clone, PartialEq)]
pub struct MeshParams {
    /// Usage hint.
    pub hint: MeshHint,
    /// How a vertex is laid out in the buffer. Every element is a `f32`.
    pub layout: VertexLayout,
    /// How vertices are assembled.
    pub primitive: MeshPrimitive,
    /// Capacity of the vertex buffer, in vertices.
    pub num_verts: usize,
}

impl Default for MeshParams {
    fn default() -> Self {
        MeshParams {
            hint: MeshHint::Immutable,
            layout: VertexLayout::default(),
            primitive: MeshPrimitive::Triangles,
            num_verts: 0,
        }
    }
}

impl MeshParams {
    /// Size of the vertex buffer in bytes.
    #[inline]
    pub fn vertex_buffer_len(&self) -> usize {
        self.num_verts * self.layout.stride() as usize
    }

    pub fn validate(&self, verts: Option<&[u8]>) -> Result<()> {
        if self.num_verts == 0 || self.layout.is_empty() {
            return Err(Error::MeshInvalid("mesh must have vertices.".into()));
        }

        if let Some(buf) = verts {
            if buf.len() > self.vertex_buffer_len() {
                return Err(Error::OutOfBounds);
            }
        }

        Ok(())
    }
}

/// Hint abouts the intended update strategy of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MeshHint {
    /// The resource is initialized with data and cannot be changed later.
    Immutable,
    /// The resource is initialized without data, but will be written by CPU
    /// once per frame.
    Stream,
    /// The resource is initialized without data and will be written by CPU
    /// from time to time.
    Dynamic,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MeshPrimitive {
    Lines,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl MeshPrimitive {
    /// Number of triangles assembled from `verts` vertices.
    pub fn assemble(self, verts: u32) -> u32 {
        match self {
            MeshPrimitive::Lines => 0,
            MeshPrimitive::Triangles => verts / 3,
            MeshPrimitive::TriangleStrip | MeshPrimitive::TriangleFan => {
                if verts >= 3 {
                    verts - 2
                } else {
                    0
                }
            }
        }
    }
}

/// Layout of interleaved float vertex attributes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VertexLayout {
    elements: Vec<(Attribute, u8)>,
}

impl VertexLayout {
    pub fn build() -> VertexLayoutBuilder {
        VertexLayoutBuilder::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements and their number of components.
    pub fn iter(&self) -> impl Iterator<Item = &(Attribute, u8)> {
        self.elements.iter()
    }

    /// Stride of one vertex in bytes.
    pub fn stride(&self) -> u8 {
        self.elements.iter().map(|v| v.1 * 4).sum()
    }

    /// Number of floats of one vertex.
    pub fn components(&self) -> usize {
        self.elements.iter().map(|v| v.1 as usize).sum()
    }

    /// Reinterprets interleaved vertices as the bytes of a vertex buffer.
    pub fn as_bytes(values: &[f32]) -> &[u8] {
        let len = values.len() * ::std::mem::size_of::<f32>();
        unsafe { ::std::slice::from_raw_parts(values.as_ptr() as *const u8, len) }
    }

    /// Byte offset of `attribute` inside a vertex.
    pub fn offset(&self, attribute: Attribute) -> Option<u8> {
        let mut offset = 0;
        for &(name, size) in &self.elements {
            if name == attribute {
                return Some(offset);
            }

            offset += size * 4;
        }

        None
    }
}

#[derive(Default)]
pub struct VertexLayoutBuilder(VertexLayout);

impl VertexLayoutBuilder {
    pub fn with(mut self, attribute: Attribute, size: u8) -> Self {
        assert!(size > 0 && size <= 4);
        assert!(self.0.elements.len() < MAX_VERTEX_ATTRIBUTES);

        if let Some(v) = self.0.elements.iter_mut().find(|v| v.0 == attribute) {
            v.1 = size;
            return self;
        }

        self.0.elements.push((attribute, size));
        self
    }

    #[inline]
    pub fn finish(self) -> VertexLayout {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout() {
        let layout = VertexLayout::build()
            .with(Attribute::Position, 2)
            .with(Attribute::Color0, 4)
            .with(Attribute::Texcoord0, 1)
            .finish();

        assert_eq!(layout.stride(), 28);
        assert_eq!(layout.components(), 7);
        assert_eq!(layout.offset(Attribute::Position), Some(0));
        assert_eq!(layout.offset(Attribute::Color0), Some(8));
        assert_eq!(layout.offset(Attribute::Texcoord0), Some(24));
    }

    #[test]
    fn assemble() {
        assert_eq!(MeshPrimitive::TriangleFan.assemble(4), 2);
        assert_eq!(MeshPrimitive::TriangleFan.assemble(2), 0);
        assert_eq!(MeshPrimitive::Triangles.assemble(6), 2);
    }

    #[test]
    fn validate() {
        let mut params = MeshParams::default();
        assert!(params.validate(None).is_err());

        params.layout = VertexLayout::build().with(Attribute::Position, 2).finish();
        params.num_verts = 4;
        assert!(params.validate(Some(&[0u8; 32])).is_ok());
        assert!(params.validate(Some(&[0u8; 33])).is_err());
    }
}
