// std
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
// others
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
// rs_scene
use crate::core::base::Float;
use crate::core::error::SceneError;
use crate::core::object::PluginObject;
use crate::core::plugin::PluginManager;
use crate::core::properties::Properties;
use crate::core::shape::ShapeBase;
use crate::shapes::mesh::{publish, TriangleMesh};

fn scalar(property: Option<&Property>) -> Option<Float> {
    match property? {
        Property::Float(v) => Some(*v as Float),
        Property::Double(v) => Some(*v as Float),
        Property::Int(v) => Some(*v as Float),
        Property::UInt(v) => Some(*v as Float),
        Property::Short(v) => Some(*v as Float),
        Property::UShort(v) => Some(*v as Float),
        Property::Char(v) => Some(*v as Float),
        Property::UChar(v) => Some(*v as Float),
        _ => None,
    }
}

fn indices(property: Option<&Property>) -> Option<Vec<u32>> {
    match property? {
        Property::ListInt(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListUInt(v) => Some(v.clone()),
        Property::ListShort(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListChar(v) => Some(v.iter().map(|i| *i as u32).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|i| *i as u32).collect()),
        _ => None,
    }
}

/// Vertex positions, triangulated faces and texture coordinates of a
/// PLY file. Polygons are split into fans.
pub fn read_ply(path: &Path) -> Result<(Vec<Float>, Vec<u32>, Vec<Float>), SceneError> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|e| {
        SceneError::construction("ply", format!("could not open \"{}\": {}", name, e))
    })?;
    let mut reader = BufReader::new(file);
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| {
        SceneError::construction("ply", format!("could not parse \"{}\": {}", name, e))
    })?;
    let mut positions: Vec<Float> = Vec::new();
    let mut texcoords: Vec<Float> = Vec::new();
    if let Some(vertices) = ply.payload.get("vertex") {
        for vertex in vertices {
            for axis in ["x", "y", "z"].iter() {
                match scalar(vertex.get(*axis)) {
                    Some(v) => positions.push(v),
                    None => {
                        return Err(SceneError::construction(
                            "ply",
                            format!("vertex without \"{}\" in \"{}\"", axis, name),
                        ))
                    }
                }
            }
            let u = scalar(vertex.get("u")).or_else(|| scalar(vertex.get("s")));
            let v = scalar(vertex.get("v")).or_else(|| scalar(vertex.get("t")));
            if let (Some(u), Some(v)) = (u, v) {
                texcoords.push(u);
                texcoords.push(v);
            }
        }
    }
    let mut faces: Vec<u32> = Vec::new();
    if let Some(elements) = ply.payload.get("face") {
        for face in elements {
            let polygon = indices(face.get("vertex_indices"))
                .or_else(|| indices(face.get("vertex_index")))
                .unwrap_or_default();
            if polygon.len() < 3 {
                log::warn!("skipping degenerate face in \"{}\"", name);
                continue;
            }
            for i in 1..polygon.len() - 1 {
                faces.extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
            }
        }
    }
    if texcoords.len() != 2 * (positions.len() / 3) {
        texcoords.clear();
    }
    log::debug!(
        "read {} vertices and {} triangles from \"{}\"",
        positions.len() / 3,
        faces.len() / 3,
        name
    );
    Ok((positions, faces, texcoords))
}

pub fn create(
    props: &mut Properties,
    manager: &mut PluginManager,
) -> Result<PluginObject, SceneError> {
    let base = ShapeBase::new(props, manager)?;
    let filename: String = props.get("filename")?;
    let (positions, faces, texcoords) = read_ply(Path::new(&filename))?;
    publish(TriangleMesh::new(base, positions, faces, texcoords)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn quad_is_triangulated() {
        let path = std::env::temp_dir().join("rs_scene_quad.ply");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            "ply\nformat ascii 1.0\nelement vertex 4\nproperty float x\nproperty float y\n\
             property float z\nelement face 1\nproperty list uchar int vertex_indices\n\
             end_header\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n"
        )
        .unwrap();
        drop(file);
        let (positions, faces, texcoords) = read_ply(&path).unwrap();
        assert_eq!(positions.len(), 12);
        assert_eq!(faces, vec![0, 1, 2, 0, 2, 3]);
        assert!(texcoords.is_empty());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_fails_construction() {
        match read_ply(Path::new("does/not/exist.ply")) {
            Err(SceneError::ConstructionFailed { .. }) => {}
            other => panic!("unexpected {:?}", other.map(|r| r.0.len())),
        }
    }
}
