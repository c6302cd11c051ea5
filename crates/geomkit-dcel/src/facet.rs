//! A self-contained snapshot of a [`crate::face::Face`], suitable for use
//! as a `geomkit_bvh::Primitive`.
//!
//! A BVH leaf stores `Arc<P>` with no lifetime tied back to the mesh
//! arenas, but `Face::signed_distance` needs to resolve half-edge and
//! vertex handles through those arenas. `Facet` bakes everything a
//! distance query touches — the plane geometry, the projected polygon, and
//! each boundary edge's own cached geometry plus its two bounding
//! vertices — into one owned value, taken once after `reconcile`.

use geomkit_math::{Point3, Vec3};
use nalgebra::Scalar;
use num_traits::Float;

use geomkit_bvh::Primitive;

use crate::face::Face;
use crate::half_edge::HalfEdge;
use crate::ids::{FaceId, HalfEdgeId, VertexId};
use crate::polygon2d::{InsideAlgorithm, Polygon2D};
use crate::vertex::Vertex;

/// One baked boundary edge: the half-edge's cached geometry plus its
/// origin and next-origin vertices, resolved out of the mesh arenas.
#[derive(Debug, Clone)]
struct BakedEdge<T> {
    edge: HalfEdge<T>,
    origin: Vertex<T>,
    next_origin: Vertex<T>,
}

/// An owned, arena-free snapshot of a face, queryable as a BVH primitive.
#[derive(Debug, Clone)]
pub struct Facet<T> {
    /// The face this snapshot was baked from, for diagnostics.
    pub source_face: FaceId,
    normal: Vec3<T>,
    centroid: Point3<T>,
    polygon2d: Polygon2D<T>,
    inside_algorithm: InsideAlgorithm,
    edges: Vec<BakedEdge<T>>,
}

impl<T: Scalar + Float> Facet<T> {
    /// Bake a snapshot of `face_id` out of the mesh's arenas.
    ///
    /// Panics if `face_id` has not been reconciled (no cached polygon or
    /// edge ring) — callers build facets only after `Mesh::reconcile`.
    pub fn from_mesh(
        face_id: FaceId,
        face: &Face<T>,
        half_edges: &slotmap::SlotMap<HalfEdgeId, HalfEdge<T>>,
        vertices: &slotmap::SlotMap<VertexId, Vertex<T>>,
    ) -> Self {
        let polygon2d = face
            .polygon2d
            .clone()
            .expect("facet baked from an unreconciled face");
        let edges = face
            .edges
            .iter()
            .map(|&eid| {
                let edge = half_edges[eid].clone();
                let origin = vertices[edge.origin].clone();
                let next_eid = edge.next.expect("reconciled edge has a next");
                let next_origin = vertices[half_edges[next_eid].origin].clone();
                BakedEdge {
                    edge,
                    origin,
                    next_origin,
                }
            })
            .collect();
        Self {
            source_face: face_id,
            normal: face.normal,
            centroid: face.centroid,
            polygon2d,
            inside_algorithm: face.inside_algorithm,
            edges,
        }
    }

    fn is_inside(&self, p: &Point3<T>) -> bool {
        let offset = self.normal.dot(&(p - self.centroid));
        let projected = p - self.normal * offset;
        self.polygon2d
            .is_point_inside(self.polygon2d.project(&projected), self.inside_algorithm)
    }
}

impl<T: Scalar + Float> Primitive<T> for Facet<T> {
    fn signed_distance(&self, x: &Point3<T>) -> T {
        if self.is_inside(x) {
            return self.normal.dot(&(x - self.centroid));
        }
        let mut best: Option<T> = None;
        for be in &self.edges {
            let d = be.edge.signed_distance(x, &be.origin, &be.next_origin);
            best = Some(match best {
                Some(b) if b.abs() <= d.abs() => b,
                _ => d,
            });
        }
        best.expect("baked facet has a nonempty edge ring")
    }

    fn unsigned_distance2(&self, x: &Point3<T>) -> T {
        if self.is_inside(x) {
            let d = self.normal.dot(&(x - self.centroid));
            return d * d;
        }
        let mut best: Option<T> = None;
        for be in &self.edges {
            let d2 = be.edge.unsigned_distance2(x, &be.origin.position);
            best = Some(match best {
                Some(b) if b <= d2 => b,
                _ => d2,
            });
        }
        best.expect("baked facet has a nonempty edge ring")
    }

    fn centroid(&self) -> Point3<T> {
        self.centroid
    }

    fn bounding_points(&self) -> Vec<Point3<T>> {
        self.edges.iter().map(|be| be.origin.position).collect()
    }
}
