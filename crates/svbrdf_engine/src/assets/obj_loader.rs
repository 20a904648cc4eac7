//! OBJ file loader for 3D models
//!
//! Reads the triangle subset of the Wavefront format: `v`, `vt`, `vn`, `f`
//! with exactly three corners, the `usemtl`/`g`/`o` segment directives and
//! `mtllib`. Everything else is skipped.
//!
//! Parsing is a fold of [`ParseState::parse_line`] over the significant
//! lines of the file, followed by [`ParseState::finish`] which checks every
//! face reference and builds the [`Mesh`]. Nothing is returned until the
//! whole file is known to be valid.

use std::path::Path;

use crate::foundation::math::{Vec2, Vec3};
use crate::render::primitives::{Face, FaceTags, Mesh, MeshError, NameRegistry, ObjIndex};

use super::{LoadError, MtlParser};

/// Significant lines of a Wavefront text file with their 1-based numbers.
///
/// Lines are trimmed; lines shorter than three characters and comments
/// are dropped.
pub(crate) fn records(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| line.len() >= 3 && !line.starts_with('#'))
}

/// Post-processing applied when a mesh is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Translate the bounding-box midpoint to the origin
    pub center: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { center: true }
    }
}

/// Everything read so far while folding over an OBJ file
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    faces: Vec<Face>,
    face_records: Vec<(usize, String)>,
    materials: NameRegistry,
    groups: NameRegistry,
    objects: NameRegistry,
    material_libraries: Vec<String>,
    current: FaceTags,
}

impl ParseState {
    /// Empty state: no attributes, no active segments
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment ids the next face will be tagged with
    pub fn current_tags(&self) -> FaceTags {
        self.current
    }

    /// Faces read so far
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Consume one record. `line` should already be trimmed.
    pub fn parse_line(mut self, line_num: usize, line: &str) -> Result<Self, LoadError> {
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(self);
        };
        let args: Vec<&str> = tokens.collect();

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&args, line_num, line)?;
                self.positions.push(Vec3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&args, line_num, line)?;
                self.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(&args, line_num, line)?;
                self.uvs.push(Vec2::new(u, v));
            }
            "f" => {
                let face = self.parse_face(&args, line_num, line)?;
                self.faces.push(face);
                self.face_records.push((line_num, line.to_string()));
            }
            "usemtl" => {
                let name = segment_name(&args, line_num, line)?;
                self.current.material = Some(self.materials.intern(name));
            }
            "g" => {
                let name = segment_name(&args, line_num, line)?;
                self.current.group = Some(self.groups.intern(name));
            }
            "o" => {
                let name = segment_name(&args, line_num, line)?;
                self.current.object = Some(self.objects.intern(name));
            }
            "mtllib" => {
                self.material_libraries.extend(args.iter().map(|s| s.to_string()));
            }
            _ => log::trace!("Skipping '{}' record on line {}", keyword, line_num),
        }

        Ok(self)
    }

    fn parse_face(&self, args: &[&str], line_num: usize, line: &str) -> Result<Face, LoadError> {
        if args.len() != 3 {
            return Err(LoadError::malformed(
                line_num,
                line,
                format!("faces must have exactly 3 vertices, found {}", args.len()),
            ));
        }

        let c0 = parse_reference(args[0], line_num, line)?;
        let c1 = parse_reference(args[1], line_num, line)?;
        let c2 = parse_reference(args[2], line_num, line)?;

        let uvs = all_or_none([c0.1, c1.1, c2.1])
            .ok_or_else(|| LoadError::malformed(line_num, line, "texture coordinates on some corners only"))?;
        let normals = all_or_none([c0.2, c1.2, c2.2])
            .ok_or_else(|| LoadError::malformed(line_num, line, "normals on some corners only"))?;

        Ok(Face {
            positions: [c0.0, c1.0, c2.0],
            uvs,
            normals,
            tags: self.current,
        })
    }

    /// Check every face reference and build the mesh
    pub fn finish(self, options: LoadOptions) -> Result<Mesh, LoadError> {
        let Self {
            positions,
            normals,
            uvs,
            faces,
            face_records,
            materials,
            groups,
            objects,
            material_libraries,
            ..
        } = self;

        let mesh = Mesh::new(positions, normals, uvs, faces).map_err(|err| {
            let MeshError::IndexOutOfRange { face, .. } = &err;
            let (line, content) = face_records.get(*face).cloned().unwrap_or_default();
            LoadError::MalformedRecord {
                line,
                content,
                reason: err.to_string(),
            }
        })?;

        let mut mesh = mesh
            .with_materials(&materials)
            .with_groups(groups)
            .with_objects(objects)
            .with_material_libraries(material_libraries);

        if options.center {
            mesh.center();
        }

        log::info!(
            "Loaded mesh: {} vertices, {} faces, {} materials",
            mesh.positions().len(),
            mesh.faces().len(),
            mesh.materials().len()
        );
        Ok(mesh)
    }
}

/// Position, UV and normal index of one face corner
type CornerRef = (ObjIndex, Option<ObjIndex>, Option<ObjIndex>);

fn parse_reference(reference: &str, line_num: usize, line: &str) -> Result<CornerRef, LoadError> {
    let parts: Vec<&str> = reference.split('/').collect();
    if parts.len() > 3 {
        return Err(LoadError::malformed(line_num, line, format!("invalid vertex reference '{}'", reference)));
    }

    let index = |part: &str| -> Result<Option<ObjIndex>, LoadError> {
        if part.is_empty() {
            return Ok(None);
        }
        if part.starts_with('-') {
            return Err(LoadError::malformed(line_num, line, "relative indices are not supported"));
        }
        let value: u32 = part
            .parse()
            .map_err(|_| LoadError::malformed(line_num, line, format!("invalid index '{}'", part)))?;
        ObjIndex::new(value)
            .map(Some)
            .ok_or_else(|| LoadError::malformed(line_num, line, "indices start at 1"))
    };

    let position = index(parts[0])?
        .ok_or_else(|| LoadError::malformed(line_num, line, "missing position index"))?;
    let uv = parts.get(1).map_or(Ok(None), |part| index(*part))?;
    let normal = parts.get(2).map_or(Ok(None), |part| index(*part))?;
    Ok((position, uv, normal))
}

fn all_or_none(indices: [Option<ObjIndex>; 3]) -> Option<Option<[ObjIndex; 3]>> {
    match indices {
        [Some(a), Some(b), Some(c)] => Some(Some([a, b, c])),
        [None, None, None] => Some(None),
        _ => None,
    }
}

fn parse_floats<const N: usize>(args: &[&str], line_num: usize, line: &str) -> Result<[f32; N], LoadError> {
    if args.len() < N {
        return Err(LoadError::malformed(
            line_num,
            line,
            format!("expected {} components, found {}", N, args.len()),
        ));
    }
    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(args) {
        *value = token
            .parse()
            .map_err(|_| LoadError::malformed(line_num, line, format!("invalid number '{}'", token)))?;
    }
    Ok(values)
}

fn segment_name<'a>(args: &[&'a str], line_num: usize, line: &str) -> Result<&'a str, LoadError> {
    args.first()
        .copied()
        .ok_or_else(|| LoadError::malformed(line_num, line, "missing name"))
}

/// Wavefront OBJ loader
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file and return a centered mesh
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, LoadError> {
        Self::load_with_options(path, LoadOptions::default())
    }

    /// Load an OBJ file with explicit post-processing options
    pub fn load_with_options<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Mesh, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::MissingPath { path: path.to_path_buf() });
        }
        log::info!("Loading mesh {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::parse_with_options(&contents, options)
    }

    /// Load an OBJ file, then apply every `mtllib` found next to it.
    ///
    /// Libraries that do not exist are skipped with a warning.
    pub fn load_with_materials<P: AsRef<Path>>(path: P) -> Result<Mesh, LoadError> {
        Self::load_with_materials_and_options(path, LoadOptions::default())
    }

    /// [`ObjLoader::load_with_materials`] with explicit post-processing options
    pub fn load_with_materials_and_options<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Mesh, LoadError> {
        let path = path.as_ref();
        let mut mesh = Self::load_with_options(path, options)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        for library in mesh.material_libraries().to_vec() {
            let library_path = base_dir.join(&library);
            if library_path.exists() {
                MtlParser::load_into(&library_path, &mut mesh)?;
            } else {
                log::warn!("Material library {} not found", library_path.display());
            }
        }
        Ok(mesh)
    }

    /// Parse OBJ text into a centered mesh
    pub fn parse(contents: &str) -> Result<Mesh, LoadError> {
        Self::parse_with_options(contents, LoadOptions::default())
    }

    /// Parse OBJ text with explicit post-processing options
    pub fn parse_with_options(contents: &str, options: LoadOptions) -> Result<Mesh, LoadError> {
        records(contents)
            .try_fold(ParseState::new(), |state, (line_num, line)| state.parse_line(line_num, line))?
            .finish(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::{FaceFilter, SegmentKind};
    use approx::assert_relative_eq;

    const CUBE_CORNER: &str = "\
# three faces sharing a corner
mtllib corner.mtl
o corner
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
vt 0 0
vt 1 0 0.5
vt 1 1
vn 0 0 1
g side
usemtl paint
f 1/1/1 2/2/1 3/3/1
s off
usemtl metal
f 1//1 3//1 4//1
g bottom
usemtl paint
f 1 2 5
";

    fn parse(text: &str) -> Result<Mesh, LoadError> {
        ObjLoader::parse_with_options(text, LoadOptions { center: false })
    }

    fn malformed_line(result: Result<Mesh, LoadError>) -> usize {
        match result {
            Err(LoadError::MalformedRecord { line, .. }) => line,
            other => panic!("expected a malformed record, got {:?}", other.map(|m| m.faces().len())),
        }
    }

    #[test]
    fn test_counts_and_ids() {
        let mesh = parse(CUBE_CORNER).unwrap();
        assert_eq!(mesh.positions().len(), 5);
        assert_eq!(mesh.uvs().len(), 3);
        assert_eq!(mesh.uvs()[1], Vec2::new(1.0, 0.0));
        assert_eq!(mesh.faces().len(), 3);

        assert_eq!(mesh.num_segments(SegmentKind::Material), 2);
        assert_eq!(mesh.num_segments(SegmentKind::Group), 2);
        assert_eq!(mesh.num_segments(SegmentKind::Object), 1);
        assert_eq!(mesh.material("paint").unwrap().index, 0);
        assert_eq!(mesh.material("metal").unwrap().index, 1);
        assert_eq!(mesh.material_libraries(), ["corner.mtl".to_string()]);
    }

    #[test]
    fn test_tags_thread_onto_faces() {
        let mesh = parse(CUBE_CORNER).unwrap();
        let tags: Vec<_> = mesh.faces().iter().map(|f| f.tags).collect();
        assert_eq!(tags[0], FaceTags { material: Some(0), group: Some(0), object: Some(0) });
        assert_eq!(tags[1], FaceTags { material: Some(1), group: Some(0), object: Some(0) });
        // Repeated usemtl reuses the first id
        assert_eq!(tags[2], FaceTags { material: Some(0), group: Some(1), object: Some(0) });

        assert_eq!(mesh.expand_face_vertices(FaceFilter::Material(0)).len(), 6);
        assert_eq!(mesh.expand_face_vertices(FaceFilter::Group(1)).len(), 3);
    }

    #[test]
    fn test_corner_references() {
        let mesh = parse(CUBE_CORNER).unwrap();
        let faces = mesh.faces();
        assert!(faces[0].uvs.is_some() && faces[0].normals.is_some());
        assert!(faces[1].uvs.is_none() && faces[1].normals.is_some());
        assert!(faces[2].uvs.is_none() && faces[2].normals.is_none());
        assert_eq!(faces[1].positions[2].slot(), 3);
    }

    #[test]
    fn test_faces_before_directives_are_untagged() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.faces()[0].tags, FaceTags::default());
        assert!(mesh.materials().is_empty());
    }

    #[test]
    fn test_parse_line_in_isolation() {
        let state = ParseState::new().parse_line(1, "usemtl skin").unwrap();
        assert_eq!(state.current_tags().material, Some(0));
        let state = state.parse_line(2, "g head neck").unwrap();
        assert_eq!(state.current_tags().group, Some(0));
        let state = state.parse_line(3, "f 1 2 3").unwrap();
        assert_eq!(state.faces()[0].tags.material, Some(0));
    }

    #[test]
    fn test_centers_by_default() {
        let mesh = ObjLoader::parse("v 2 2 2\nv 4 2 2\nv 4 6 2\nf 1 2 3\n").unwrap();
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min, Vec3::new(-1.0, -2.0, 0.0));
        assert_relative_eq!(max, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_polygon_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        assert_eq!(malformed_line(parse(text)), 5);
    }

    #[test]
    fn test_partial_uvs_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nf 1/1 2 3\n";
        assert_eq!(malformed_line(parse(text)), 5);
    }

    #[test]
    fn test_bad_indices_rejected() {
        assert_eq!(malformed_line(parse("v 0 0 0\nf 0 1 1\n")), 2);
        assert_eq!(malformed_line(parse("v 0 0 0\nf -1 1 1\n")), 2);
        assert_eq!(malformed_line(parse("v 0 0 0\nf a 1 1\n")), 2);
    }

    #[test]
    fn test_out_of_range_reports_face_line() {
        let text = "v 0 0 0\nv 1 0 0\n\n# missing vertex\nf 1 2 3\nv 0 1 0\nf 1 2 4\n";
        let err = parse(text).unwrap_err();
        match err {
            LoadError::MalformedRecord { line, content, .. } => {
                assert_eq!(line, 7);
                assert_eq!(content, "f 1 2 4");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_short_records_rejected() {
        assert_eq!(malformed_line(parse("v 1 2\n")), 1);
        assert_eq!(malformed_line(parse("v 0 0 0\nvt 0.5\n")), 2);
        assert_eq!(malformed_line(parse("vn 0 x 1\n")), 1);
    }

    #[test]
    fn test_comments_and_short_lines_ignored() {
        let mesh = parse("#v 9 9 9\n\ns 1\nv 0 0 0\nl 1 2\n").unwrap();
        assert_eq!(mesh.positions().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let result = ObjLoader::load_obj("/definitely/not/here.obj");
        assert!(matches!(result, Err(LoadError::MissingPath { .. })));
    }

    #[test]
    fn test_load_with_sibling_library() {
        let dir = std::env::temp_dir().join(format!("svbrdf_obj_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tri.obj"), "mtllib tri.mtl missing.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl a\nf 1 2 3\n").unwrap();
        std::fs::write(dir.join("tri.mtl"), "newmtl a\nKd 0.2 0.3 0.4\n").unwrap();

        let mesh = ObjLoader::load_with_materials(dir.join("tri.obj")).unwrap();
        assert_eq!(mesh.material("a").unwrap().diffuse_color, Vec3::new(0.2, 0.3, 0.4));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_library_load_keeps_placement_when_not_centering() {
        let dir = std::env::temp_dir().join(format!("svbrdf_obj_placed_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tri.obj"), "mtllib tri.mtl\nv 2 2 2\nv 4 2 2\nv 4 6 2\nusemtl a\nf 1 2 3\n").unwrap();
        std::fs::write(dir.join("tri.mtl"), "newmtl a\nNs 9\n").unwrap();

        let placed = ObjLoader::load_with_materials_and_options(dir.join("tri.obj"), LoadOptions { center: false }).unwrap();
        assert_eq!(placed.bounding_box(), (Vec3::new(2.0, 2.0, 2.0), Vec3::new(4.0, 6.0, 2.0)));
        assert_eq!(placed.material("a").unwrap().specular_exponent, 9.0);

        let centered = ObjLoader::load_with_materials(dir.join("tri.obj")).unwrap();
        let (min, max) = centered.bounding_box();
        assert_relative_eq!(min + max, Vec3::zeros());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
