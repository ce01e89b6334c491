use crate::AssetError;
use crate::mesh::MeshData;

/// Parse Wavefront OBJ text into a mesh.
///
/// Only `v` and `f` statements are read. Face tokens such as `3/1/2` or
/// `3//2` contribute their first number; negative indices count back from
/// the last vertex seen. Polygons are fan-triangulated, and faces with
/// fewer than three indices are dropped.
pub fn import_obj(text: &str) -> Result<MeshData, AssetError> {
    let mut mesh = MeshData::default();
    let mut dropped = 0usize;

    for (n, raw) in text.lines().enumerate() {
        let line_no = n + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                for _ in 0..3 {
                    let token = tokens.next().ok_or_else(|| AssetError::Parse {
                        line: line_no,
                        message: "vertex needs three coordinates".into(),
                    })?;
                    let value: f32 = token.parse().map_err(|_| AssetError::Parse {
                        line: line_no,
                        message: format!("bad coordinate '{token}'"),
                    })?;
                    mesh.vertices.push(value);
                }
            }
            Some("f") => {
                let mut polygon = Vec::new();
                for token in tokens {
                    let first = token.split('/').next().unwrap_or("");
                    if first.is_empty() {
                        continue;
                    }
                    let index: i64 = first.parse().map_err(|_| AssetError::Parse {
                        line: line_no,
                        message: format!("bad face index '{token}'"),
                    })?;
                    polygon.push(resolve_index(index, mesh.vertex_count(), line_no)?);
                }
                if polygon.len() < 3 {
                    dropped += 1;
                    continue;
                }
                for k in 1..polygon.len() - 1 {
                    mesh.faces.extend([polygon[0], polygon[k], polygon[k + 1]]);
                }
            }
            _ => {}
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, "faces with fewer than three indices were skipped");
    }
    if mesh.vertices.is_empty() || mesh.faces.is_empty() {
        return Err(AssetError::Empty);
    }
    tracing::debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "OBJ imported"
    );
    Ok(mesh)
}

/// Convert an OBJ index to a positive 1-based one.
fn resolve_index(index: i64, vertex_count: usize, line: usize) -> Result<u32, AssetError> {
    let resolved = if index < 0 {
        vertex_count as i64 + 1 + index
    } else {
        index
    };
    if resolved <= 0 || resolved > u32::MAX as i64 {
        return Err(AssetError::Parse {
            line,
            message: format!("face index {index} out of range"),
        });
    }
    Ok(resolved as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a square
v 0 0 0
v 1 0 0
v 1 1 0

v 0 1 0
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = import_obj(QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![1, 2, 3, 1, 3, 4]);
    }

    #[test]
    fn pentagon_yields_three_triangles() {
        let text = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let mesh = import_obj(text).unwrap();
        assert_eq!(mesh.faces, vec![1, 2, 3, 1, 3, 4, 1, 4, 5]);
    }

    #[test]
    fn negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        assert_eq!(import_obj(text).unwrap().faces, vec![1, 2, 3]);
    }

    #[test]
    fn slash_only_normals_take_the_vertex_index() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//7 2//7 3//7\n";
        assert_eq!(import_obj(text).unwrap().faces, vec![1, 2, 3]);
    }

    #[test]
    fn short_faces_are_skipped() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2\nf 1 2 3\n";
        assert_eq!(import_obj(text).unwrap().face_count(), 1);
    }

    #[test]
    fn no_faces_is_empty() {
        assert!(matches!(import_obj("v 0 0 0\n"), Err(AssetError::Empty)));
        assert!(matches!(import_obj(""), Err(AssetError::Empty)));
    }

    #[test]
    fn bad_numbers_report_the_line() {
        let err = import_obj("v 0 0 0\nv 1 x 0\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));

        let err = import_obj("v 0 0 0\nv 1\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));

        let err = import_obj("v 0 0 0\nf 1 0 1\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn imported_mesh_normalizes() {
        let mut mesh = import_obj(QUAD).unwrap();
        mesh.normalize();
        let r = std::f32::consts::FRAC_1_SQRT_2;
        assert!((mesh.vertices[0] + r).abs() < 1e-5);
        assert!((mesh.vertices[1] + r).abs() < 1e-5);
    }
}
