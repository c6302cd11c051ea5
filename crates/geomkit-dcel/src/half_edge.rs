//! Directed edges bounding a face, carrying a cached normal and length for
//! distance queries.

use geomkit_math::{Point3, Vec3, Vec3Ext};
use nalgebra::Scalar;
use num_traits::Float;

use crate::ids::{FaceId, HalfEdgeId, VertexId};
use crate::vertex::Vertex;

/// One directed half of an undirected mesh edge.
#[derive(Debug, Clone)]
pub struct HalfEdge<T> {
    /// Vertex this half-edge starts at.
    pub origin: VertexId,
    /// The oppositely-directed half-edge sharing this edge, if any. `None`
    /// only at a boundary; a closed manifold never leaves this unset.
    pub pair: Option<HalfEdgeId>,
    /// Next half-edge around the same face.
    pub next: Option<HalfEdgeId>,
    /// Previous half-edge around the same face.
    pub prev: Option<HalfEdgeId>,
    /// Face this half-edge bounds.
    pub face: FaceId,
    /// Average of this edge's two adjacent face normals, valid after
    /// `reconcile`.
    pub normal: Vec3<T>,
    /// `origin(next).position − origin(self).position`, valid after
    /// `reconcile`.
    pub edge_vector: Vec3<T>,
    /// `1 / ‖edge_vector‖²`, valid after `reconcile`.
    pub inv_len2: T,
}

impl<T: Scalar + Float> HalfEdge<T> {
    /// Create an unreconciled half-edge bounding `face`, originating at
    /// `origin`.
    pub fn new(origin: VertexId, face: FaceId) -> Self {
        Self {
            origin,
            pair: None,
            next: None,
            prev: None,
            face,
            normal: Vec3::zero(),
            edge_vector: Vec3::zero(),
            inv_len2: T::zero(),
        }
    }

    /// Parameter of the foot of perpendicular from `x` onto the edge's
    /// supporting line, `0` at `origin` and `1` at `origin(next)`.
    pub fn parameter_of(&self, x: &Point3<T>, origin: &Point3<T>) -> T {
        (x - origin).dot(&self.edge_vector) * self.inv_len2
    }

    /// Squared distance from `x` to the clamped edge segment.
    pub fn unsigned_distance2(&self, x: &Point3<T>, origin: &Point3<T>) -> T {
        let t = self.parameter_of(x, origin).max(T::zero()).min(T::one());
        let foot = origin + self.edge_vector * t;
        (x - foot).norm_squared()
    }

    /// Signed distance from `x` to this edge, delegating to the bounding
    /// vertices when the foot of perpendicular falls outside the segment.
    pub fn signed_distance(
        &self,
        x: &Point3<T>,
        origin: &Vertex<T>,
        next_origin: &Vertex<T>,
    ) -> T {
        let t = self.parameter_of(x, &origin.position);
        if t <= T::zero() {
            return origin.signed_distance(x);
        }
        if t >= T::one() {
            return next_origin.signed_distance(x);
        }
        let foot = origin.position + self.edge_vector * t;
        let delta = x - foot;
        let sign = if self.normal.dot(&delta) > T::zero() {
            T::one()
        } else {
            -T::one()
        };
        delta.norm() * sign
    }

    /// Recompute `edge_vector`, `inv_len2`, and `normal` from the current
    /// topology.
    ///
    /// `pair_face_normal` is `None` at a boundary, in which case `normal`
    /// is just this edge's own face normal (no averaging partner).
    pub fn reconcile(
        &mut self,
        origin_pos: &Point3<T>,
        next_origin_pos: &Point3<T>,
        face_normal: &Vec3<T>,
        pair_face_normal: Option<&Vec3<T>>,
    ) {
        self.edge_vector = next_origin_pos - origin_pos;
        let len2 = self.edge_vector.norm_squared();
        self.inv_len2 = if len2 > T::zero() {
            T::one() / len2
        } else {
            T::zero()
        };
        let averaged = match pair_face_normal {
            Some(other) => {
                let sum = face_normal + other;
                let len = sum.norm();
                if len > T::zero() {
                    sum / len
                } else {
                    *face_normal
                }
            }
            None => *face_normal,
        };
        self.normal = averaged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reconcile_averages_adjacent_face_normals() {
        let mut e = HalfEdge::<f64>::new(VertexId::default(), FaceId::default());
        e.reconcile(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, 1.0),
            Some(&Vec3::new(0.0, 0.0, -1.0)),
        );
        // Opposing normals cancel; fall back to the unnormalized zero sum.
        assert_eq!(e.normal, Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn parameter_is_zero_at_origin_and_one_at_far_end() {
        let mut e = HalfEdge::<f64>::new(VertexId::default(), FaceId::default());
        e.reconcile(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, 1.0),
            None,
        );
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_abs_diff_eq!(e.parameter_of(&Point3::new(0.0, 1.0, 0.0), &origin), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.parameter_of(&Point3::new(2.0, 1.0, 0.0), &origin), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.parameter_of(&Point3::new(1.0, 1.0, 0.0), &origin), 0.5, epsilon = 1e-12);
    }
}
