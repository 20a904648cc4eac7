//! Indexed triangle mesh as read from a Wavefront file
//!
//! The mesh keeps the file's separate position, normal and texture-coordinate
//! arrays and the per-face index triples into them. Drawing needs flat
//! per-corner streams instead, so the `expand_*` methods walk the faces that
//! pass a [`FaceFilter`] and resolve every corner. All of them visit faces in
//! file order and corners in order 0, 1, 2, so streams produced by separate
//! calls with the same filter line up index for index.

use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::assets::materials::Material;
use crate::foundation::math::{utils, Vec2, Vec3};
use crate::render::api::VertexAttributes;

use super::tangent::{TangentFrame, TangentStreams};

/// A 1-based attribute reference as written in a face record
///
/// Index zero cannot be represented. Conversion to a 0-based array slot
/// happens only in [`ObjIndex::slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjIndex(NonZeroU32);

impl ObjIndex {
    /// Wrap a 1-based index; `None` for zero
    pub fn new(one_based: u32) -> Option<Self> {
        NonZeroU32::new(one_based).map(Self)
    }

    /// The index as written in the file
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The 0-based array slot this index addresses
    pub fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Segment ids active when a face was declared
///
/// `None` means no `usemtl`/`g`/`o` directive had been seen yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaceTags {
    /// Material id
    pub material: Option<usize>,
    /// Group id
    pub group: Option<usize>,
    /// Object id
    pub object: Option<usize>,
}

/// One triangle
///
/// UV and normal references are present on all three corners or on none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Position references
    pub positions: [ObjIndex; 3],
    /// Texture-coordinate references
    pub uvs: Option<[ObjIndex; 3]>,
    /// Normal references
    pub normals: Option<[ObjIndex; 3]>,
    /// Segment ids
    pub tags: FaceTags,
}

/// Selects the faces an expansion visits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaceFilter {
    /// Every face
    #[default]
    All,
    /// Faces tagged with this material id
    Material(usize),
    /// Faces tagged with this group id
    Group(usize),
    /// Faces tagged with this object id
    Object(usize),
}

impl FaceFilter {
    /// Whether a face passes this filter
    pub fn accepts(self, face: &Face) -> bool {
        match self {
            Self::All => true,
            Self::Material(id) => face.tags.material == Some(id),
            Self::Group(id) => face.tags.group == Some(id),
            Self::Object(id) => face.tags.object == Some(id),
        }
    }
}

/// The kinds of face segment a mesh can be split by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// `usemtl` segments
    Material,
    /// `g` segments
    Group,
    /// `o` segments
    Object,
}

/// Insertion-ordered name to id table
///
/// The first name interned gets id 0, the next new name id 1, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl NameRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `name`, assigning the next free id on first sight
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Id of a known name
    pub fn id(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    /// Name registered under `id`
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing was registered
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(id, name)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}

/// Mesh construction errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A face references past the end of an attribute array
    #[error("face {face} references {attribute} {index}, but only {available} are defined")]
    IndexOutOfRange {
        /// Position of the face in the face list
        face: usize,
        /// Which attribute array was addressed
        attribute: &'static str,
        /// The 1-based index as written
        index: u32,
        /// Length of the addressed array
        available: usize,
    },
}

/// Indexed triangle mesh with material, group and object segments
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    faces: Vec<Face>,
    materials: Vec<Material>,
    groups: NameRegistry,
    objects: NameRegistry,
    material_libraries: Vec<String>,
}

impl Mesh {
    /// Build a mesh, checking every face reference against its array.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        faces: Vec<Face>,
    ) -> Result<Self, MeshError> {
        for (face_index, face) in faces.iter().enumerate() {
            let references = std::iter::once(("position", &face.positions, positions.len()))
                .chain(face.uvs.as_ref().map(|uvs_ref| ("texture coordinate", uvs_ref, uvs.len())))
                .chain(face.normals.as_ref().map(|n| ("normal", n, normals.len())));

            for (attribute, indices, available) in references {
                if let Some(bad) = indices.iter().find(|i| i.slot() >= available) {
                    return Err(MeshError::IndexOutOfRange {
                        face: face_index,
                        attribute,
                        index: bad.get(),
                        available,
                    });
                }
            }
        }

        Ok(Self {
            positions,
            normals,
            uvs,
            faces,
            materials: Vec::new(),
            groups: NameRegistry::new(),
            objects: NameRegistry::new(),
            material_libraries: Vec::new(),
        })
    }

    /// Attach one default material per registered material name
    pub fn with_materials(mut self, names: &NameRegistry) -> Self {
        self.materials = names.iter().map(|(id, name)| Material::new(name, id)).collect();
        self
    }

    /// Attach the group names
    pub fn with_groups(mut self, groups: NameRegistry) -> Self {
        self.groups = groups;
        self
    }

    /// Attach the object names
    pub fn with_objects(mut self, objects: NameRegistry) -> Self {
        self.objects = objects;
        self
    }

    /// Record the `mtllib` file names the mesh was declared with
    pub fn with_material_libraries(mut self, libraries: Vec<String>) -> Self {
        self.material_libraries = libraries;
        self
    }

    /// Vertex positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex normals
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Texture coordinates
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Faces in file order
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Materials in id order
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Material by name
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Mutable material by name
    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.name == name)
    }

    /// Group names and ids
    pub fn groups(&self) -> &NameRegistry {
        &self.groups
    }

    /// Object names and ids
    pub fn objects(&self) -> &NameRegistry {
        &self.objects
    }

    /// `mtllib` entries in declaration order
    pub fn material_libraries(&self) -> &[String] {
        &self.material_libraries
    }

    /// Number of distinct segments of a kind
    pub fn num_segments(&self, kind: SegmentKind) -> usize {
        match kind {
            SegmentKind::Material => self.materials.len(),
            SegmentKind::Group => self.groups.len(),
            SegmentKind::Object => self.objects.len(),
        }
    }

    /// Component-wise `(min, max)` of all positions
    ///
    /// An empty mesh reports a zero box at the origin.
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        utils::bounds(&self.positions).unwrap_or((Vec3::zeros(), Vec3::zeros()))
    }

    /// Largest extent of the bounding box
    pub fn bounding_size(&self) -> f32 {
        let (min, max) = self.bounding_box();
        (max - min).max()
    }

    /// Translate the bounding-box midpoint to the origin
    pub fn center(&mut self) {
        let (min, max) = self.bounding_box();
        let midpoint = (min + max) * 0.5;
        for position in &mut self.positions {
            *position -= midpoint;
        }
    }

    /// Scale uniformly so that [`Mesh::bounding_size`] becomes `target`.
    ///
    /// Scaling is about the origin, so center first to keep the mesh in
    /// place. Calling it again rescales from the current size. A mesh with
    /// no extent is left alone.
    pub fn resize(&mut self, target: f32) {
        let size = self.bounding_size();
        if size <= 0.0 {
            log::warn!("Cannot resize a mesh without extent ({} vertices)", self.positions.len());
            return;
        }

        let scale = target / size;
        log::debug!("Resizing mesh from {} to {} (scale {})", size, target, scale);
        for position in &mut self.positions {
            *position *= scale;
        }
    }

    /// Faces passing `filter`, in file order
    pub fn filtered_faces(&self, filter: FaceFilter) -> impl Iterator<Item = &Face> {
        self.faces.iter().filter(move |face| filter.accepts(face))
    }

    /// Corner positions of the selected faces
    pub fn expand_face_vertices(&self, filter: FaceFilter) -> Vec<Vec3> {
        self.filtered_faces(filter)
            .flat_map(|face| self.corner_positions(face))
            .collect()
    }

    /// Corner normals of the selected faces
    ///
    /// Faces declared without normals get their geometric normal on all
    /// three corners (zero for a zero-area face).
    pub fn expand_face_normals(&self, filter: FaceFilter) -> Vec<Vec3> {
        self.filtered_faces(filter)
            .flat_map(|face| match face.normals {
                Some(indices) => indices.map(|i| self.normals[i.slot()]),
                None => {
                    let [p0, p1, p2] = self.corner_positions(face);
                    [utils::normalized((p1 - p0).cross(&(p2 - p0))); 3]
                }
            })
            .collect()
    }

    /// Corner texture coordinates of the selected faces
    ///
    /// Faces without UVs get three zero placeholders so the stream length
    /// always matches the position stream.
    pub fn expand_face_uvs(&self, filter: FaceFilter) -> Vec<Vec2> {
        self.filtered_faces(filter)
            .flat_map(|face| self.corner_uvs(face).unwrap_or([Vec2::zeros(); 3]))
            .collect()
    }

    /// Flat tangent frames of the selected faces
    pub fn expand_tangents(&self, filter: FaceFilter) -> TangentStreams {
        let mut streams = TangentStreams::with_face_capacity(self.faces.len());
        for face in self.filtered_faces(filter) {
            let frame = match self.corner_uvs(face) {
                Some(uvs) => {
                    let (frame, degenerate) = TangentFrame::from_triangle(self.corner_positions(face), uvs);
                    if degenerate {
                        streams.degenerate_faces += 1;
                    }
                    frame
                }
                None => TangentFrame::zero(),
            };
            streams.push_face(frame);
        }

        if streams.degenerate_faces > 0 {
            log::debug!(
                "{} faces have a non-positive UV determinant ({:?})",
                streams.degenerate_faces,
                filter
            );
        }
        streams
    }

    /// All five attribute streams of the selected faces
    pub fn expand(&self, filter: FaceFilter) -> VertexAttributes {
        let tangents = self.expand_tangents(filter);
        VertexAttributes {
            positions: self.expand_face_vertices(filter).iter().map(|v| [v.x, v.y, v.z]).collect(),
            normals: self.expand_face_normals(filter).iter().map(|v| [v.x, v.y, v.z]).collect(),
            uvs: self.expand_face_uvs(filter).iter().map(|v| [v.x, v.y]).collect(),
            tangents: tangents.tangents.iter().map(|v| [v.x, v.y, v.z]).collect(),
            bitangents: tangents.bitangents.iter().map(|v| [v.x, v.y, v.z]).collect(),
        }
    }

    /// MTL text for every material, in id order
    pub fn build_mtl(&self) -> String {
        self.materials.iter().map(Material::to_mtl).collect()
    }

    fn corner_positions(&self, face: &Face) -> [Vec3; 3] {
        face.positions.map(|i| self.positions[i.slot()])
    }

    fn corner_uvs(&self, face: &Face) -> Option<[Vec2; 3]> {
        face.uvs.map(|indices| indices.map(|i| self.uvs[i.slot()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn idx(i: u32) -> ObjIndex {
        ObjIndex::new(i).unwrap()
    }

    fn face(p: [u32; 3], uv: Option<[u32; 3]>, material: Option<usize>) -> Face {
        Face {
            positions: p.map(idx),
            uvs: uv.map(|t| t.map(idx)),
            normals: None,
            tags: FaceTags { material, ..FaceTags::default() },
        }
    }

    /// Unit quad in the XY plane split into two textured triangles with
    /// different materials, plus one untextured triangle.
    fn quad() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let faces = vec![
            face([1, 2, 3], Some([1, 2, 3]), Some(0)),
            face([1, 3, 4], Some([1, 3, 4]), Some(1)),
            face([2, 3, 4], None, Some(0)),
        ];
        let mut names = NameRegistry::new();
        names.intern("front");
        names.intern("back");
        Mesh::new(positions, Vec::new(), uvs, faces).unwrap().with_materials(&names)
    }

    #[test]
    fn test_obj_index_slot() {
        assert!(ObjIndex::new(0).is_none());
        assert_eq!(idx(1).slot(), 0);
        assert_eq!(idx(7).slot(), 6);
        assert_eq!(idx(7).get(), 7);
    }

    #[test]
    fn test_registry_reuses_ids() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.intern("a"), 0);
        assert_eq!(registry.intern("b"), 1);
        assert_eq!(registry.intern("a"), 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name(1), Some("b"));
        assert_eq!(registry.id("c"), None);
    }

    #[test]
    fn test_out_of_range_reference_rejected() {
        let result = Mesh::new(
            vec![Vec3::zeros(); 3],
            Vec::new(),
            Vec::new(),
            vec![face([1, 2, 4], None, None)],
        );
        assert_eq!(
            result.unwrap_err(),
            MeshError::IndexOutOfRange { face: 0, attribute: "position", index: 4, available: 3 }
        );

        let result = Mesh::new(vec![Vec3::zeros(); 3], Vec::new(), Vec::new(), vec![face([1, 2, 3], Some([1, 1, 1]), None)]);
        assert!(matches!(result, Err(MeshError::IndexOutOfRange { attribute: "texture coordinate", .. })));
    }

    #[test]
    fn test_streams_stay_aligned() {
        let mesh = quad();
        for filter in [FaceFilter::All, FaceFilter::Material(0), FaceFilter::Material(1), FaceFilter::Group(0)] {
            let faces = mesh.filtered_faces(filter).count();
            assert_eq!(mesh.expand_face_vertices(filter).len(), faces * 3);
            assert_eq!(mesh.expand_face_normals(filter).len(), faces * 3);
            assert_eq!(mesh.expand_face_uvs(filter).len(), faces * 3);
            assert_eq!(mesh.expand_tangents(filter).len(), faces * 3);
        }
    }

    #[test]
    fn test_filter_matches_exact_tag() {
        let mesh = quad();
        let positions = mesh.expand_face_vertices(FaceFilter::Material(0));
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(positions[3], Vec3::new(1.0, 0.0, 0.0));
        assert!(mesh.expand_face_vertices(FaceFilter::Object(0)).is_empty());
    }

    #[test]
    fn test_material_filters_partition_faces() {
        let mesh = quad();
        let mut total = 0;
        for m in 0..mesh.num_segments(SegmentKind::Material) {
            let filter = FaceFilter::Material(m);
            assert!(mesh.filtered_faces(filter).all(|face| face.tags.material == Some(m)));
            total += mesh.expand_face_vertices(filter).len();
        }
        assert_eq!(total, mesh.expand_face_vertices(FaceFilter::All).len());
        assert_eq!(total, 9);
    }

    #[test]
    fn test_uv_placeholders_for_untextured_faces() {
        let mesh = quad();
        let uvs = mesh.expand_face_uvs(FaceFilter::All);
        assert_eq!(uvs[4], Vec2::new(1.0, 1.0));
        assert!(uvs[6..].iter().all(|uv| *uv == Vec2::zeros()));

        let tangents = mesh.expand_tangents(FaceFilter::All);
        assert!(tangents.tangents[6..].iter().all(|t| *t == Vec3::zeros()));
        assert_eq!(tangents.degenerate_faces, 0);
    }

    #[test]
    fn test_quad_tangents_agree() {
        let mesh = quad();
        let streams = mesh.expand_tangents(FaceFilter::All);
        for corner in 0..6 {
            assert_relative_eq!(streams.tangents[corner].normalize(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(streams.bitangents[corner].normalize(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
        }
        assert_relative_eq!(streams.tangents[0], streams.tangents[3], epsilon = 1e-7);
    }

    #[test]
    fn test_geometric_normals_without_vn() {
        let mesh = quad();
        let normals = mesh.expand_face_normals(FaceFilter::All);
        for normal in normals {
            assert_relative_eq!(normal, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_resize_and_center() {
        let mut mesh = Mesh::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.5), Vec3::new(4.0, 0.0, 0.0)],
            Vec::new(),
            Vec::new(),
            vec![face([1, 2, 3], None, None)],
        )
        .unwrap();

        mesh.center();
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min + max, Vec3::zeros(), epsilon = 1e-6);

        mesh.resize(100.0);
        assert_relative_eq!(mesh.bounding_size(), 100.0, epsilon = 1e-4);
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(max.x - min.x, 100.0, epsilon = 1e-4);
        assert_relative_eq!(max.y - min.y, 25.0, epsilon = 1e-4);
    }

    #[test]
    fn test_resize_point_mesh_is_noop() {
        let mut mesh = Mesh::new(vec![Vec3::new(1.0, 1.0, 1.0); 3], Vec::new(), Vec::new(), Vec::new()).unwrap();
        mesh.resize(10.0);
        assert_eq!(mesh.positions()[0], Vec3::new(1.0, 1.0, 1.0));

        let mut empty = Mesh::new(Vec::new(), Vec::new(), Vec::new(), Vec::new()).unwrap();
        empty.resize(10.0);
        assert_eq!(empty.bounding_size(), 0.0);
    }

    #[test]
    fn test_segments_and_mtl() {
        let mesh = quad();
        assert_eq!(mesh.num_segments(SegmentKind::Material), 2);
        assert_eq!(mesh.num_segments(SegmentKind::Group), 0);

        let mtl = mesh.build_mtl();
        let front = mtl.find("newmtl front").unwrap();
        let back = mtl.find("newmtl back").unwrap();
        assert!(front < back);
    }

    #[test]
    fn test_expand_bundle() {
        let mesh = quad();
        let bundle = mesh.expand(FaceFilter::Material(1));
        assert_eq!(bundle.vertex_count(), 3);
        assert_eq!(bundle.positions[2], [0.0, 1.0, 0.0]);
        assert_eq!(bundle.uvs[1], [1.0, 1.0]);
    }
}
