//! Minimal ASCII PLY loader: `element vertex`/`element face` header lines,
//! a six-float vertex body, and an n-gon face body with a trailing
//! pair-edge reconciliation pass.

use std::io::{BufRead, BufReader};
use std::path::Path;

use geomkit_math::Point3;

use crate::error::LoaderError;
use crate::ids::{HalfEdgeId, VertexId};
use crate::mesh::Mesh;

impl Mesh<f64> {
    /// Load a mesh from the ASCII PLY subset described in the loader
    /// error documentation: a header declaring vertex/face counts, a
    /// vertex body of `x y z nx ny nz` floats, and a face body of
    /// `k i0 i1 ... ik-1` index lists.
    ///
    /// Does not call [`Mesh::reconcile`]; callers reconcile once loading
    /// (and any further topology edits) are complete.
    pub fn load_from_ascii_ply<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let path_ref = path.as_ref();
        let file = std::fs::File::open(path_ref).map_err(|source| LoaderError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        let reader = BufReader::new(file);
        let lines: Vec<String> = reader
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|source| LoaderError::Io {
                path: path_ref.display().to_string(),
                source,
            })?;

        let header = Header::parse(&lines)?;
        let mut mesh = Mesh::new();

        let vertex_ids = read_vertices(&lines[header.body_start..], header.vertex_count, &mut mesh)?;

        let face_body_start = header.body_start + header.vertex_count;
        let face_edges = read_faces(
            &lines[face_body_start..],
            header.face_count,
            &vertex_ids,
            &mut mesh,
        )?;

        reconcile_pair_edges(&mut mesh, &face_edges);

        Ok(mesh)
    }
}

struct Header {
    vertex_count: usize,
    face_count: usize,
    body_start: usize,
}

impl Header {
    fn parse(lines: &[String]) -> Result<Self, LoaderError> {
        let mut vertex_count = None;
        let mut face_count = None;
        let mut end_header_line = None;

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("element vertex ") {
                vertex_count = rest.trim().parse::<usize>().ok();
            } else if let Some(rest) = trimmed.strip_prefix("element face ") {
                face_count = rest.trim().parse::<usize>().ok();
            } else if trimmed == "end_header" {
                end_header_line = Some(i);
                break;
            }
        }

        let end_header_line = end_header_line
            .ok_or_else(|| LoaderError::MalformedHeader("missing end_header".into()))?;
        let vertex_count = vertex_count
            .ok_or_else(|| LoaderError::MalformedHeader("missing element vertex".into()))?;
        let face_count =
            face_count.ok_or_else(|| LoaderError::MalformedHeader("missing element face".into()))?;

        Ok(Self {
            vertex_count,
            face_count,
            body_start: end_header_line + 1,
        })
    }
}

fn read_vertices(
    lines: &[String],
    count: usize,
    mesh: &mut Mesh<f64>,
) -> Result<Vec<VertexId>, LoaderError> {
    if lines.len() < count {
        return Err(LoaderError::TruncatedBody {
            kind: "vertex",
            expected: count,
            found: lines.len(),
        });
    }
    let mut ids = Vec::with_capacity(count);
    for (i, line) in lines.iter().take(count).enumerate() {
        let mut fields = line.split_whitespace();
        let mut next_float = |field: &'static str| -> Result<f64, LoaderError> {
            let raw = fields.next().unwrap_or("");
            raw.parse::<f64>().map_err(|source| LoaderError::Parse {
                field,
                line: i + 1,
                source,
            })
        };
        let x = next_float("x")?;
        let y = next_float("y")?;
        let z = next_float("z")?;
        // nx, ny, nz are present in the format but superseded by
        // Mesh::reconcile's own normal computation; read and discard.
        let _ = next_float("nx")?;
        let _ = next_float("ny")?;
        let _ = next_float("nz")?;
        ids.push(mesh.add_vertex(Point3::new(x, y, z)));
    }
    Ok(ids)
}

fn read_faces(
    lines: &[String],
    count: usize,
    vertex_ids: &[VertexId],
    mesh: &mut Mesh<f64>,
) -> Result<Vec<Vec<HalfEdgeId>>, LoaderError> {
    if lines.len() < count {
        return Err(LoaderError::TruncatedBody {
            kind: "face",
            expected: count,
            found: lines.len(),
        });
    }
    let mut all_edges = Vec::with_capacity(count);
    for (face_index, line) in lines.iter().take(count).enumerate() {
        let mut fields = line.split_whitespace();
        let k: usize = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| LoaderError::MalformedHeader(format!("face {face_index} missing count")))?;
        if k < 3 {
            return Err(LoaderError::DegenerateFace {
                face_index,
                count: k,
            });
        }
        let mut seen = std::collections::HashSet::new();
        let mut ring = Vec::with_capacity(k);
        for _ in 0..k {
            let idx: usize = fields
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| LoaderError::MalformedHeader(format!("face {face_index} truncated index list")))?;
            if !seen.insert(idx) {
                return Err(LoaderError::DuplicateRingVertex {
                    face_index,
                    vertex_index: idx,
                });
            }
            ring.push(vertex_ids[idx]);
        }
        let (_, edges) = mesh.add_face(&ring);
        all_edges.push(edges);
    }
    Ok(all_edges)
}

/// For every half-edge `(u → v)`, search the faces incident to `u` for a
/// half-edge `(v → u)` and link the two as pairs.
///
/// PLY gives no edge adjacency directly, so this reconstructs it from
/// shared vertex indices after every face has been added.
fn reconcile_pair_edges(mesh: &mut Mesh<f64>, face_edges: &[Vec<HalfEdgeId>]) {
    use std::collections::HashMap;

    // Map (origin, destination) -> half-edge id, built once over all faces.
    let mut by_endpoints: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();
    for edges in face_edges {
        for &eid in edges {
            let he = &mesh.half_edges[eid];
            let next = he.next.expect("face ring half-edge has a next");
            let dest = mesh.half_edges[next].origin;
            by_endpoints.insert((he.origin, dest), eid);
        }
    }

    let mut linked = std::collections::HashSet::new();
    for edges in face_edges {
        for &eid in edges {
            if linked.contains(&eid) {
                continue;
            }
            let he = &mesh.half_edges[eid];
            let next = he.next.expect("face ring half-edge has a next");
            let dest = mesh.half_edges[next].origin;
            let origin = he.origin;
            if let Some(&pair_id) = by_endpoints.get(&(dest, origin)) {
                mesh.link_pair(eid, pair_id);
                linked.insert(eid);
                linked.insert(pair_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::NormalWeight;
    use std::io::Write;

    fn write_temp_ply(contents: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("geomkit-dcel-test-{nanos}.ply"));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const TETRAHEDRON: &str = "ply\n\
format ascii 1.0\n\
element vertex 4\n\
property float x\n\
property float y\n\
property float z\n\
property float nx\n\
property float ny\n\
property float nz\n\
element face 4\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0 0 0 0\n\
1 0 0 0 0 0\n\
0 1 0 0 0 0\n\
0 0 1 0 0 0\n\
3 0 1 2\n\
3 0 3 1\n\
3 0 2 3\n\
3 1 3 2\n";

    #[test]
    fn loads_a_tetrahedron_and_pairs_every_edge() {
        let path = write_temp_ply(TETRAHEDRON);
        let mut mesh = Mesh::load_from_ascii_ply(&path).expect("valid PLY");
        std::fs::remove_file(&path).ok();

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 4);

        mesh.reconcile(NormalWeight::Average);
        let report = mesh.sanity_check();
        assert_eq!(report.edges_missing_pair, 0, "{report:?}");
    }

    #[test]
    fn rejects_a_face_with_fewer_than_three_vertices() {
        let bad = TETRAHEDRON.replace("3 0 1 2\n", "2 0 1\n");
        let path = write_temp_ply(&bad);
        let err = Mesh::load_from_ascii_ply(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, Err(LoaderError::DegenerateFace { .. })));
    }
}
