//! Mesh vertices: position, averaged normal, and distance to a point.

use geomkit_math::{Point3, Vec3, Vec3Ext};
use nalgebra::Scalar;
use num_traits::Float;

use crate::ids::{FaceId, HalfEdgeId};

/// Which averaging scheme [`crate::mesh::Mesh::reconcile`] uses to derive a
/// vertex normal from its incident face normals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalWeight {
    /// Unweighted average of incident face normals, then normalized.
    Average,
    /// Each incident face normal weighted by the subtended angle at this
    /// vertex before averaging.
    AngleWeighted,
}

/// A vertex in the mesh: a position plus the topology needed to recover its
/// incident edges and faces.
#[derive(Debug, Clone)]
pub struct Vertex<T> {
    /// Position in space.
    pub position: Point3<T>,
    /// Averaged normal, valid only after `reconcile`.
    pub normal: Vec3<T>,
    /// One half-edge originating at this vertex.
    pub outgoing_edge: Option<HalfEdgeId>,
    /// Every face that has a half-edge originating at this vertex.
    pub incident_faces: Vec<FaceId>,
}

impl<T: Scalar + Float> Vertex<T> {
    /// Create a vertex at `position` with no topology attached yet.
    pub fn new(position: Point3<T>) -> Self {
        Self {
            position,
            normal: Vec3::zero(),
            outgoing_edge: None,
            incident_faces: Vec::new(),
        }
    }

    /// `‖x − position‖ · sgn(normal · (x − position))`, with `sgn(0) = −1`.
    pub fn signed_distance(&self, x: &Point3<T>) -> T {
        let delta = x - self.position;
        let sign = if self.normal.dot(&delta) > T::zero() {
            T::one()
        } else {
            -T::one()
        };
        delta.norm() * sign
    }

    /// `‖x − position‖²`.
    pub fn unsigned_distance2(&self, x: &Point3<T>) -> T {
        (x - self.position).norm_squared()
    }
}

/// Average a set of face normals, weighted uniformly or by subtended angle.
///
/// `angles`, when present, must be the same length as `normals` and holds
/// the angle (radians) this vertex subtends within the corresponding face;
/// absent for [`NormalWeight::Average`].
pub(crate) fn average_normals<T: Scalar + Float>(
    normals: &[Vec3<T>],
    angles: Option<&[T]>,
) -> Vec3<T> {
    let mut sum = Vec3::zero();
    match angles {
        Some(angles) => {
            for (n, a) in normals.iter().zip(angles.iter()) {
                sum += n * *a;
            }
        }
        None => {
            for n in normals {
                sum += *n;
            }
        }
    }
    let len = sum.norm();
    if len > T::zero() {
        sum / len
    } else {
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn signed_distance_is_negative_on_inward_side() {
        let mut v = Vertex::new(Point3::new(0.0_f64, 0.0, 0.0));
        v.normal = Vec3::new(1.0, 0.0, 0.0);
        assert!(v.signed_distance(&Point3::new(1.0, 0.0, 0.0)) > 0.0);
        assert!(v.signed_distance(&Point3::new(-1.0, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn signed_distance_sign_is_negative_at_zero_dot() {
        let mut v = Vertex::new(Point3::new(0.0_f64, 0.0, 0.0));
        v.normal = Vec3::new(1.0, 0.0, 0.0);
        assert!(v.signed_distance(&Point3::new(0.0, 1.0, 0.0)) < 0.0);
    }

    #[test]
    fn average_normals_uniform() {
        let normals = vec![Vec3::new(1.0_f64, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let avg = average_normals(&normals, None);
        assert_abs_diff_eq!(avg.norm(), 1.0, epsilon = 1e-12);
    }
}
