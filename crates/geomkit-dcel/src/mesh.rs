//! The mesh: owns the vertex/half-edge/face arenas, and provides
//! `reconcile`, `sanity_check`, and brute-force queries.

use std::sync::Arc;

use geomkit_math::Point3;
use nalgebra::Scalar;
use num_traits::Float;
use slotmap::SlotMap;

use crate::error::TopologyReport;
use crate::face::Face;
use crate::facet::Facet;
use crate::half_edge::HalfEdge;
use crate::ids::{FaceId, HalfEdgeId, VertexId};
use crate::polygon2d::InsideAlgorithm;
use crate::vertex::{self, NormalWeight, Vertex};

/// Which brute-force scan `Mesh::signed_distance` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAlgorithm {
    /// Scan every face's signed distance, keep the smallest magnitude.
    Direct,
    /// Scan every face's squared unsigned distance to find the closest
    /// face, then evaluate that face's signed distance once.
    Direct2,
}

/// Owns the three topology arenas for a closed triangular surface.
#[derive(Debug, Clone)]
pub struct Mesh<T> {
    /// Vertex arena.
    pub vertices: SlotMap<VertexId, Vertex<T>>,
    /// Half-edge arena.
    pub half_edges: SlotMap<HalfEdgeId, HalfEdge<T>>,
    /// Face arena.
    pub faces: SlotMap<FaceId, Face<T>>,
    search_algorithm: SearchAlgorithm,
    inside_algorithm: InsideAlgorithm,
}

impl<T: Scalar + Float> Default for Mesh<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar + Float> Mesh<T> {
    /// An empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            half_edges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            search_algorithm: SearchAlgorithm::Direct2,
            inside_algorithm: InsideAlgorithm::SubtendedAngle,
        }
    }

    /// Insert a vertex at `position`.
    pub fn add_vertex(&mut self, position: Point3<T>) -> VertexId {
        self.vertices.insert(Vertex::new(position))
    }

    /// Insert a face bounded by the given ordered ring of vertices,
    /// creating and circularly linking one half-edge per ring entry.
    ///
    /// Returns the new face's id and the half-edge ids created for its
    /// ring, in ring order, so a loader can pair them against other
    /// faces afterward.
    pub fn add_face(&mut self, ring: &[VertexId]) -> (FaceId, Vec<HalfEdgeId>) {
        let face_id = self.faces.insert(Face::new(HalfEdgeId::default()));

        let edge_ids: Vec<HalfEdgeId> = ring
            .iter()
            .map(|&origin| self.half_edges.insert(HalfEdge::new(origin, face_id)))
            .collect();

        let n = edge_ids.len();
        for i in 0..n {
            let next = edge_ids[(i + 1) % n];
            let prev = edge_ids[(i + n - 1) % n];
            self.half_edges[edge_ids[i]].next = Some(next);
            self.half_edges[edge_ids[i]].prev = Some(prev);
        }

        self.faces[face_id].half_edge = edge_ids[0];
        self.faces[face_id].inside_algorithm = self.inside_algorithm;

        for (&vid, &eid) in ring.iter().zip(edge_ids.iter()) {
            let v = &mut self.vertices[vid];
            if v.outgoing_edge.is_none() {
                v.outgoing_edge = Some(eid);
            }
            v.incident_faces.push(face_id);
        }

        (face_id, edge_ids)
    }

    /// Link two half-edges as each other's pair.
    pub fn link_pair(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edges[a].pair = Some(b);
        self.half_edges[b].pair = Some(a);
    }

    /// Which search algorithm `signed_distance` uses.
    pub fn search_algorithm(&self) -> SearchAlgorithm {
        self.search_algorithm
    }

    /// Select the brute-force search algorithm.
    pub fn set_search_algorithm(&mut self, algorithm: SearchAlgorithm) {
        self.search_algorithm = algorithm;
    }

    /// Select the point-in-polygon algorithm, applying it to every
    /// existing face as well as faces added afterward.
    pub fn set_inside_outside_algorithm(&mut self, algorithm: InsideAlgorithm) {
        self.inside_algorithm = algorithm;
        for (_, face) in self.faces.iter_mut() {
            face.inside_algorithm = algorithm;
        }
    }

    /// Refresh every face's plane geometry, every half-edge's cached
    /// vector/normal, and every vertex's averaged normal, in that order
    /// (edges need face normals; vertices need both).
    pub fn reconcile(&mut self, weight: NormalWeight) {
        self.reconcile_faces();
        self.reconcile_half_edges();
        self.reconcile_vertex_normals(weight);
    }

    fn face_ring_positions(&self, face_id: FaceId) -> (Vec<Point3<T>>, Vec<HalfEdgeId>) {
        let start = self.faces[face_id].half_edge;
        let mut positions = Vec::new();
        let mut edges = Vec::new();
        let mut current = start;
        loop {
            let he = &self.half_edges[current];
            positions.push(self.vertices[he.origin].position);
            edges.push(current);
            current = he.next.expect("face ring half-edge has a next");
            if current == start {
                break;
            }
        }
        (positions, edges)
    }

    fn reconcile_faces(&mut self) {
        let face_ids: Vec<FaceId> = self.faces.keys().collect();
        for face_id in face_ids {
            let (ring, edges) = self.face_ring_positions(face_id);
            self.faces[face_id].reconcile(&ring, edges);
        }
    }

    fn reconcile_half_edges(&mut self) {
        let edge_ids: Vec<HalfEdgeId> = self.half_edges.keys().collect();
        for eid in edge_ids {
            let (origin, next_origin, face_normal, pair_face_normal) = {
                let he = &self.half_edges[eid];
                let next = he.next.expect("reconciled face guarantees a next");
                let origin = self.vertices[he.origin].position;
                let next_origin = self.vertices[self.half_edges[next].origin].position;
                let face_normal = self.faces[he.face].normal;
                let pair_face_normal = he.pair.map(|p| self.faces[self.half_edges[p].face].normal);
                (origin, next_origin, face_normal, pair_face_normal)
            };
            self.half_edges[eid].reconcile(
                &origin,
                &next_origin,
                &face_normal,
                pair_face_normal.as_ref(),
            );
        }
    }

    fn reconcile_vertex_normals(&mut self, weight: NormalWeight) {
        let vertex_ids: Vec<VertexId> = self.vertices.keys().collect();
        for vid in vertex_ids {
            let incident: Vec<FaceId> = self.vertices[vid].incident_faces.clone();
            let normals: Vec<_> = incident.iter().map(|&f| self.faces[f].normal).collect();
            let angles = match weight {
                NormalWeight::Average => None,
                NormalWeight::AngleWeighted => {
                    Some(incident.iter().map(|&f| self.angle_at_vertex(f, vid)).collect::<Vec<_>>())
                }
            };
            self.vertices[vid].normal = vertex::average_normals(&normals, angles.as_deref());
        }
    }

    /// Angle this face's ring subtends at `vertex_id`, used for
    /// [`NormalWeight::AngleWeighted`] averaging.
    fn angle_at_vertex(&self, face_id: FaceId, vertex_id: VertexId) -> T {
        let face = &self.faces[face_id];
        let here = face
            .edges
            .iter()
            .find(|&&eid| self.half_edges[eid].origin == vertex_id)
            .copied()
            .expect("vertex is incident to this face");
        let he = &self.half_edges[here];
        let prev_id = he.prev.expect("reconciled edge has a prev");
        let prev = &self.half_edges[prev_id];

        let to_next = he.edge_vector;
        let to_prev = -prev.edge_vector;
        let v1 = to_next / to_next.norm();
        let v2 = to_prev / to_prev.norm();
        let cos_angle = v1.dot(&v2).max(-T::one()).min(T::one());
        cos_angle.acos()
    }

    /// Accumulated topology warning counts; the mesh remains usable even
    /// when this is non-clean.
    pub fn sanity_check(&self) -> TopologyReport {
        let mut report = TopologyReport::default();

        for (_, face) in self.faces.iter() {
            if face.edges.is_empty() {
                report.faces_without_edges += 1;
            } else if face.has_duplicate_ring_vertex(&self.half_edges) {
                report.degenerate_faces += 1;
            }
        }

        for (_, edge) in self.half_edges.iter() {
            match edge.next {
                Some(next) if self.half_edges[next].origin == edge.origin => {
                    report.degenerate_edges += 1;
                }
                None => report.edges_missing_next += 1,
                _ => {}
            }
            if edge.prev.is_none() {
                report.edges_missing_prev += 1;
            }
            if edge.pair.is_none() {
                report.edges_missing_pair += 1;
            }
        }

        for (eid, edge) in self.half_edges.iter() {
            if let Some(pair) = edge.pair {
                let pair_he = &self.half_edges[pair];
                let bad = pair_he.pair != Some(eid);
                if bad {
                    report.edges_with_bad_pair += 1;
                }
            }
            if let Some(prev) = edge.prev {
                if self.half_edges[prev].next != Some(eid) {
                    report.edges_with_bad_prev_next += 1;
                }
            }
            if let Some(next) = edge.next {
                if self.half_edges[next].prev != Some(eid) {
                    report.edges_with_bad_next_prev += 1;
                }
            }
        }

        for (_, vertex) in self.vertices.iter() {
            if vertex.outgoing_edge.is_none() {
                report.vertices_without_outgoing_edge += 1;
            }
        }

        report
    }

    /// Signed distance from `x` via [`Mesh::search_algorithm`].
    pub fn signed_distance(&self, x: &Point3<T>) -> T {
        match self.search_algorithm {
            SearchAlgorithm::Direct => self.signed_distance_direct(x),
            SearchAlgorithm::Direct2 => self.signed_distance_direct2(x),
        }
    }

    fn signed_distance_direct(&self, x: &Point3<T>) -> T {
        let mut best: Option<T> = None;
        for (_, face) in self.faces.iter() {
            let d = face.signed_distance(x, &self.half_edges, &self.vertices);
            best = Some(match best {
                Some(b) if b.abs() <= d.abs() => b,
                _ => d,
            });
        }
        best.expect("signed_distance called on an empty mesh")
    }

    fn signed_distance_direct2(&self, x: &Point3<T>) -> T {
        let mut best_face: Option<FaceId> = None;
        let mut best2: Option<T> = None;
        for (fid, face) in self.faces.iter() {
            let d2 = face.unsigned_distance2(x, &self.half_edges, &self.vertices);
            if best2.is_none() || d2 < best2.unwrap() {
                best2 = Some(d2);
                best_face = Some(fid);
            }
        }
        let fid = best_face.expect("signed_distance called on an empty mesh");
        self.faces[fid].signed_distance(x, &self.half_edges, &self.vertices)
    }

    /// Bake every face into an arena-free [`Facet`], ready to hand to a
    /// `geomkit_bvh::Node` as primitives.
    pub fn to_facets(&self) -> Vec<Arc<Facet<T>>> {
        self.faces
            .iter()
            .map(|(fid, face)| Arc::new(Facet::from_mesh(fid, face, &self.half_edges, &self.vertices)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_triangle() -> Mesh<f64> {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_face(&[a, b, c]);
        mesh.reconcile(NormalWeight::Average);
        mesh
    }

    #[test]
    fn triangle_query_above_plane_is_positive() {
        let mesh = unit_triangle();
        let d = mesh.signed_distance(&Point3::new(0.3, 0.3, 0.5));
        assert_abs_diff_eq!(d, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn triangle_query_below_plane_is_negative() {
        let mesh = unit_triangle();
        let d = mesh.signed_distance(&Point3::new(0.3, 0.3, -0.5));
        assert_abs_diff_eq!(d, -0.5, epsilon = 1e-9);
    }

    #[test]
    fn direct_and_direct2_agree() {
        let mut mesh = unit_triangle();
        let x = Point3::new(2.0, 0.0, 0.3);
        mesh.set_search_algorithm(SearchAlgorithm::Direct);
        let direct = mesh.signed_distance(&x);
        mesh.set_search_algorithm(SearchAlgorithm::Direct2);
        let direct2 = mesh.signed_distance(&x);
        assert_abs_diff_eq!(direct, direct2, epsilon = 1e-9);
    }

    #[test]
    fn sanity_check_is_clean_for_a_single_well_formed_triangle() {
        let mesh = unit_triangle();
        let report = mesh.sanity_check();
        // A lone triangle's three edges have no pair partner by construction.
        assert_eq!(report.edges_missing_pair, 3);
        assert_eq!(report.degenerate_faces, 0);
        assert_eq!(report.vertices_without_outgoing_edge, 0);
    }

    #[test]
    fn to_facets_matches_mesh_signed_distance() {
        let mesh = unit_triangle();
        let facets = mesh.to_facets();
        assert_eq!(facets.len(), 1);
        let x = Point3::new(0.3, 0.3, 0.5);
        let from_facet = geomkit_bvh::Primitive::signed_distance(facets[0].as_ref(), &x);
        let from_mesh = mesh.signed_distance(&x);
        assert_abs_diff_eq!(from_facet, from_mesh, epsilon = 1e-9);
    }
}
