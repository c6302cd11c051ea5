#![warn(missing_docs)]

//! Generic numeric vector types for the geomkit signed-distance kernel.
//!
//! Thin extensions over `nalgebra`'s fixed-size vectors, generic over a
//! floating-point scalar `T` (`f32` or `f64`), providing the handful of
//! operations the DCEL and BVH layers need that `nalgebra` does not
//! expose directly: distinguished constants (`zero`, `one`, `infinity`,
//! componentwise `min`/`max`), the dominant-axis `max_dir` used to project
//! a facet normal onto the two remaining coordinate axes, and
//! lexicographic-all comparators.

use nalgebra::{Scalar, Vector2, Vector3};
use num_traits::Float;

/// A vector in 3D space, generic over the scalar type.
pub type Vec3<T> = Vector3<T>;

/// A vector in 2D space, generic over the scalar type.
pub type Vec2<T> = Vector2<T>;

/// A point in 3D space, generic over the scalar type.
pub type Point3<T> = nalgebra::Point3<T>;

/// A point in 2D space, generic over the scalar type.
pub type Point2<T> = nalgebra::Point2<T>;

/// Extension operations on [`Vec3`] that `nalgebra` does not provide.
pub trait Vec3Ext<T> {
    /// The zero vector.
    fn zero() -> Self;
    /// The all-ones vector.
    fn one() -> Self;
    /// Every component set to `+infinity`.
    fn infinity() -> Self;
    /// Every component set to the most negative finite value.
    fn min_value() -> Self;
    /// Every component set to the most positive finite value.
    fn max_value() -> Self;
    /// Componentwise minimum of `self` and `other`.
    fn componentwise_min(&self, other: &Self) -> Self;
    /// Componentwise maximum of `self` and `other`.
    fn componentwise_max(&self, other: &Self) -> Self;
    /// Index (0, 1, or 2) of the dominant component.
    ///
    /// With `abs = true` compares by absolute value; otherwise by signed
    /// value. Ties resolve to the lowest index, matching a left-to-right
    /// scan that only replaces the incumbent on a strict improvement.
    fn max_dir(&self, abs: bool) -> usize;
    /// `true` iff every component of `self` is strictly less than the
    /// corresponding component of `other`.
    fn lt_all(&self, other: &Self) -> bool;
    /// `true` iff every component of `self` is strictly greater than the
    /// corresponding component of `other`.
    fn gt_all(&self, other: &Self) -> bool;
    /// `true` iff every component of `self` is less than or equal to the
    /// corresponding component of `other`.
    fn le_all(&self, other: &Self) -> bool;
    /// `true` iff every component of `self` is greater than or equal to
    /// the corresponding component of `other`.
    fn ge_all(&self, other: &Self) -> bool;
}

impl<T: Scalar + Float> Vec3Ext<T> for Vec3<T> {
    fn zero() -> Self {
        Vec3::new(T::zero(), T::zero(), T::zero())
    }

    fn one() -> Self {
        Vec3::new(T::one(), T::one(), T::one())
    }

    fn infinity() -> Self {
        Vec3::new(T::infinity(), T::infinity(), T::infinity())
    }

    fn min_value() -> Self {
        let m = T::min_value();
        Vec3::new(m, m, m)
    }

    fn max_value() -> Self {
        let m = T::max_value();
        Vec3::new(m, m, m)
    }

    fn componentwise_min(&self, other: &Self) -> Self {
        Vec3::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    fn componentwise_max(&self, other: &Self) -> Self {
        Vec3::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    fn max_dir(&self, abs: bool) -> usize {
        let mut dir = 0usize;
        for d in 1..3 {
            let cur = if abs { self[d].abs() } else { self[d] };
            let best = if abs { self[dir].abs() } else { self[dir] };
            if cur > best {
                dir = d;
            }
        }
        dir
    }

    fn lt_all(&self, other: &Self) -> bool {
        self.x < other.x && self.y < other.y && self.z < other.z
    }

    fn gt_all(&self, other: &Self) -> bool {
        self.x > other.x && self.y > other.y && self.z > other.z
    }

    fn le_all(&self, other: &Self) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }

    fn ge_all(&self, other: &Self) -> bool {
        self.x >= other.x && self.y >= other.y && self.z >= other.z
    }
}

/// Extension operations on [`Vec2`] that `nalgebra` does not provide.
pub trait Vec2Ext<T> {
    /// The zero vector.
    fn zero() -> Self;
    /// The all-ones vector.
    fn one() -> Self;
    /// Every component set to `+infinity`.
    fn infinity() -> Self;
}

impl<T: Scalar + Float> Vec2Ext<T> for Vec2<T> {
    fn zero() -> Self {
        Vec2::new(T::zero(), T::zero())
    }

    fn one() -> Self {
        Vec2::new(T::one(), T::one())
    }

    fn infinity() -> Self {
        Vec2::new(T::infinity(), T::infinity())
    }
}

/// Tolerance constants for geometric comparisons, generic over scalar type.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance<T> {
    /// Linear distance tolerance.
    pub linear: T,
    /// Angular tolerance in radians.
    pub angular: T,
}

impl Tolerance<f64> {
    /// Default double-precision tolerances (1e-9 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-9,
    };
}

impl Tolerance<f32> {
    /// Default single-precision tolerances (1e-5 linear, 1e-5 rad angular).
    pub const DEFAULT_F32: Self = Self {
        linear: 1e-5,
        angular: 1e-5,
    };
}

impl<T: Float> Tolerance<T> {
    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: T) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: T, b: T) -> bool {
        (a - b).abs() < self.angular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_one() {
        assert_eq!(Vec3::<f64>::zero(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(Vec3::<f64>::one(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn max_dir_unsigned() {
        let v = Vec3::new(1.0, 5.0, -9.0);
        assert_eq!(v.max_dir(false), 1);
        assert_eq!(v.max_dir(true), 2);
    }

    #[test]
    fn max_dir_ties_resolve_to_lowest_index() {
        let v = Vec3::new(3.0, 3.0, 1.0);
        assert_eq!(v.max_dir(false), 0);
    }

    #[test]
    fn lexicographic_comparators() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(2.0, 3.0, 4.0);
        assert!(a.lt_all(&b));
        assert!(b.gt_all(&a));
        assert!(!a.lt_all(&Vec3::new(2.0, 1.0, 4.0)));
    }

    #[test]
    fn componentwise_min_max() {
        let a = Vec3::new(1.0, 5.0, -2.0);
        let b = Vec3::new(3.0, 0.0, -9.0);
        assert_eq!(a.componentwise_min(&b), Vec3::new(1.0, 0.0, -9.0));
        assert_eq!(a.componentwise_max(&b), Vec3::new(3.0, 5.0, -2.0));
    }

    #[test]
    fn tolerance_is_zero() {
        let tol = Tolerance::<f64>::DEFAULT;
        assert!(tol.is_zero(1e-12));
        assert!(!tol.is_zero(1e-3));
    }
}
