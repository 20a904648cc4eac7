//! Flat per-corner vertex streams ready for upload

/// Attribute names bound by the vertex shader
pub mod names {
    /// Corner positions
    pub const POSITION: &str = "a_position";
    /// Corner normals
    pub const NORMAL: &str = "a_normal";
    /// Corner texture coordinates
    pub const UV: &str = "a_uv";
    /// Corner tangents
    pub const TANGENT: &str = "a_tangent";
    /// Corner bitangents
    pub const BITANGENT: &str = "a_bitangent";
}

/// The five expanded streams of one draw call
///
/// Entry `i` of every stream belongs to the same corner. Components are
/// stored as plain arrays so the streams can be viewed as raw bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexAttributes {
    /// Corner positions
    pub positions: Vec<[f32; 3]>,
    /// Corner normals
    pub normals: Vec<[f32; 3]>,
    /// Corner texture coordinates
    pub uvs: Vec<[f32; 2]>,
    /// Corner tangents
    pub tangents: Vec<[f32; 3]>,
    /// Corner bitangents
    pub bitangents: Vec<[f32; 3]>,
}

impl VertexAttributes {
    /// Number of corners to draw
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether every stream has one entry per corner
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.normals.len() == n && self.uvs.len() == n && self.tangents.len() == n && self.bitangents.len() == n
    }

    /// Streams to bind for a draw
    ///
    /// Untextured shading only reads positions and normals, so the UV and
    /// tangent-frame streams are left out unless `textured` is set.
    pub fn streams(&self, textured: bool) -> Vec<AttributeStream<'_>> {
        let mut streams = vec![
            AttributeStream::from_vec3(names::POSITION, &self.positions),
            AttributeStream::from_vec3(names::NORMAL, &self.normals),
        ];
        if textured {
            streams.push(AttributeStream::from_vec3(names::TANGENT, &self.tangents));
            streams.push(AttributeStream::from_vec3(names::BITANGENT, &self.bitangents));
            streams.push(AttributeStream {
                name: names::UV,
                components: 2,
                data: bytemuck::cast_slice(&self.uvs),
            });
        }
        streams
    }
}

/// One named attribute stream borrowed from a [`VertexAttributes`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeStream<'a> {
    /// Shader attribute name
    pub name: &'static str,
    /// Floats per corner
    pub components: usize,
    /// Tightly packed components
    pub data: &'a [f32],
}

impl<'a> AttributeStream<'a> {
    fn from_vec3(name: &'static str, values: &'a [[f32; 3]]) -> Self {
        Self {
            name,
            components: 3,
            data: bytemuck::cast_slice(values),
        }
    }

    /// Number of corners in the stream
    pub fn len(&self) -> usize {
        self.data.len() / self.components
    }

    /// Whether the stream is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The stream as bytes, in native endianness
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> VertexAttributes {
        VertexAttributes {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            tangents: vec![[1.0, 0.0, 0.0]; 3],
            bitangents: vec![[0.0, 1.0, 0.0]; 3],
        }
    }

    #[test]
    fn test_untextured_streams() {
        let attributes = triangle();
        let names: Vec<_> = attributes.streams(false).iter().map(|s| s.name).collect();
        assert_eq!(names, vec![names::POSITION, names::NORMAL]);
    }

    #[test]
    fn test_textured_streams() {
        let attributes = triangle();
        assert!(attributes.is_consistent());

        let streams = attributes.streams(true);
        assert_eq!(streams.len(), 5);
        let uv = streams.iter().find(|s| s.name == names::UV).unwrap();
        assert_eq!(uv.components, 2);
        assert_eq!(uv.len(), 3);
        assert_eq!(uv.data, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(streams[0].as_bytes().len(), 9 * 4);
    }
}
