//! Bounding volume implementations: axis-aligned box and bounding sphere.

use geomkit_math::{Point3, Vec3, Vec3Ext};
use nalgebra::Scalar;
use num_traits::Float;

/// The contract a bounding volume must satisfy to back a BVH node.
pub trait BoundingVolume<T>: Clone {
    /// Build the tightest volume of this kind enclosing `points`.
    ///
    /// `points` is never empty for a node reachable from `Node::build`.
    fn build(points: &[Point3<T>]) -> Self;

    /// Distance from `x` to the closest point of the volume; `0` when `x`
    /// is inside.
    fn distance(&self, x: &Point3<T>) -> T;

    /// `distance(x)` squared, computed without an intermediate `sqrt`.
    fn distance2(&self, x: &Point3<T>) -> T;

    /// Surface area of the volume.
    fn area(&self) -> T;

    /// Volume of the intersection of `self` and `other`, `0` if disjoint.
    fn overlapping_volume(&self, other: &Self) -> T;
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<T> {
    /// Componentwise minimum corner.
    pub lo: Point3<T>,
    /// Componentwise maximum corner.
    pub hi: Point3<T>,
}

impl<T: Scalar + Float> Aabb<T> {
    /// An empty box (inverted corners) that expands to fit the first point
    /// merged into it.
    pub fn empty() -> Self {
        Self {
            lo: Point3::from(Vec3::<T>::max_value()),
            hi: Point3::from(Vec3::<T>::min_value()),
        }
    }

    /// Grow this box, if necessary, to include `p`.
    pub fn include_point(&mut self, p: &Point3<T>) {
        self.lo = Point3::from(self.lo.coords.componentwise_min(&p.coords));
        self.hi = Point3::from(self.hi.coords.componentwise_max(&p.coords));
    }

    /// Extent along each axis (`hi - lo`).
    pub fn extent(&self) -> Vec3<T> {
        self.hi - self.lo
    }

    /// Center of the box.
    pub fn center(&self) -> Point3<T> {
        nalgebra::center(&self.lo, &self.hi)
    }
}

impl<T: Scalar + Float> BoundingVolume<T> for Aabb<T> {
    fn build(points: &[Point3<T>]) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.include_point(p);
        }
        b
    }

    fn distance2(&self, x: &Point3<T>) -> T {
        let zero = T::zero();
        let dx = (self.lo.x - x.x).max(zero).max(x.x - self.hi.x);
        let dy = (self.lo.y - x.y).max(zero).max(x.y - self.hi.y);
        let dz = (self.lo.z - x.z).max(zero).max(x.z - self.hi.z);
        dx * dx + dy * dy + dz * dz
    }

    fn distance(&self, x: &Point3<T>) -> T {
        self.distance2(x).sqrt()
    }

    fn area(&self) -> T {
        let e = self.extent();
        let two = T::one() + T::one();
        two * (e.x * e.y + e.y * e.z + e.x * e.z)
    }

    fn overlapping_volume(&self, other: &Self) -> T {
        let zero = T::zero();
        let ox = (self.hi.x.min(other.hi.x) - self.lo.x.max(other.lo.x)).max(zero);
        let oy = (self.hi.y.min(other.hi.y) - self.lo.y.max(other.lo.y)).max(zero);
        let oz = (self.hi.z.min(other.hi.z) - self.lo.z.max(other.lo.z)).max(zero);
        ox * oy * oz
    }
}

/// A bounding sphere, built with Ritter's approximation algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere<T> {
    /// Center of the sphere.
    pub center: Point3<T>,
    /// Radius of the sphere.
    pub radius: T,
}

impl<T: Scalar + Float> BoundingSphere<T> {
    fn farthest_from(points: &[Point3<T>], from: &Point3<T>) -> Point3<T> {
        let mut best = points[0];
        let mut best_d2 = (points[0] - *from).norm_squared();
        for p in &points[1..] {
            let d2 = (*p - *from).norm_squared();
            if d2 > best_d2 {
                best_d2 = d2;
                best = *p;
            }
        }
        best
    }
}

impl<T: Scalar + Float> BoundingVolume<T> for BoundingSphere<T> {
    fn build(points: &[Point3<T>]) -> Self {
        // Ritter's algorithm: two passes over the point set.
        let p0 = points[0];
        let p1 = Self::farthest_from(points, &p0);
        let p2 = Self::farthest_from(points, &p1);

        let half = T::one() / (T::one() + T::one());
        let mut center = nalgebra::center(&p1, &p2);
        let mut radius = (p2 - p1).norm() * half;

        for p in points {
            let d = (*p - center).norm();
            if d > radius {
                let new_radius = (radius + d) * half;
                let excess = new_radius - radius;
                let dir = (*p - center) / d;
                center += dir * excess;
                radius = new_radius;
            }
        }

        Self { center, radius }
    }

    fn distance(&self, x: &Point3<T>) -> T {
        let zero = T::zero();
        ((*x - self.center).norm() - self.radius).max(zero)
    }

    fn distance2(&self, x: &Point3<T>) -> T {
        let d = self.distance(x);
        d * d
    }

    fn area(&self) -> T {
        let four = T::one() + T::one() + T::one() + T::one();
        four * T::pi() * self.radius * self.radius
    }

    fn overlapping_volume(&self, other: &Self) -> T {
        let zero = T::zero();
        let d = (self.center - other.center).norm();
        let (r, rr) = (self.radius, other.radius);

        if d >= r + rr {
            return zero;
        }

        if d <= (r - rr).abs() {
            let small = r.min(rr);
            let four_thirds = (T::one() + T::one() + T::one() + T::one()) / (T::one() + T::one() + T::one());
            return four_thirds * T::pi() * small * small * small;
        }

        // Standard lens-volume formula for two intersecting spheres.
        let twelve = T::from(12.0).unwrap();
        let three = T::one() + T::one() + T::one();
        let sum = r + rr - d;
        let diff = r - rr;
        T::pi() * sum * sum * (d * d + (T::one() + T::one()) * d * (r + rr) - three * diff * diff) / (twelve * d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cube_points() -> Vec<Point3<f64>> {
        let mut pts = Vec::new();
        for &x in &[0.0, 1.0] {
            for &y in &[0.0, 1.0] {
                for &z in &[0.0, 1.0] {
                    pts.push(Point3::new(x, y, z));
                }
            }
        }
        pts
    }

    #[test]
    fn aabb_from_cube() {
        let aabb = Aabb::build(&cube_points());
        assert_eq!(aabb.lo, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.hi, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn aabb_distance_outside_and_inside() {
        let aabb = Aabb::build(&cube_points());
        assert_eq!(aabb.distance(&Point3::new(0.5, 0.5, 0.5)), 0.0);
        assert_abs_diff_eq!(aabb.distance(&Point3::new(2.0, 0.5, 0.5)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn aabb_area_unit_cube() {
        let aabb = Aabb::build(&cube_points());
        assert_abs_diff_eq!(aabb.area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn aabb_overlap_disjoint_is_zero() {
        let a = Aabb::build(&cube_points());
        let b = Aabb {
            lo: Point3::new(10.0, 10.0, 10.0),
            hi: Point3::new(11.0, 11.0, 11.0),
        };
        assert_eq!(a.overlapping_volume(&b), 0.0);
    }

    #[test]
    fn bounding_sphere_encloses_cube_points() {
        let pts = cube_points();
        let sphere = BoundingSphere::build(&pts);
        for p in &pts {
            assert!((*p - sphere.center).norm() <= sphere.radius + 1e-9);
        }
    }

    #[test]
    fn bounding_sphere_distance_zero_when_inside() {
        let sphere = BoundingSphere {
            center: Point3::new(0.0, 0.0, 0.0),
            radius: 1.0,
        };
        assert_eq!(sphere.distance(&Point3::new(0.5, 0.0, 0.0)), 0.0);
        assert_abs_diff_eq!(sphere.distance(&Point3::new(2.0, 0.0, 0.0)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn spheres_fully_overlapping_gives_small_sphere_volume() {
        let a = BoundingSphere {
            center: Point3::new(0.0, 0.0, 0.0),
            radius: 2.0,
        };
        let b = BoundingSphere {
            center: Point3::new(0.0, 0.0, 0.0),
            radius: 1.0,
        };
        let expected = 4.0 / 3.0 * std::f64::consts::PI;
        assert_abs_diff_eq!(a.overlapping_volume(&b), expected, epsilon = 1e-9);
    }
}
