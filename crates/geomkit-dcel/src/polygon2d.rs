//! 2D point-in-polygon testing for a facet projected along its dominant
//! normal axis.

use geomkit_math::{Point2, Point3, Vec3};
use nalgebra::Scalar;
use num_traits::Float;

/// Which point-in-polygon algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsideAlgorithm {
    /// Count x-axis crossings of the boundary at the query's y-coordinate;
    /// inside iff the count is odd.
    CrossingNumber,
    /// Signed crossing count using the `isLeft` test; inside iff nonzero.
    WindingNumber,
    /// Sum of signed subtended angle differences; inside iff the sum winds
    /// once around the query point.
    SubtendedAngle,
}

/// A facet's vertex ring projected into 2D by dropping its dominant normal
/// axis.
#[derive(Debug, Clone)]
pub struct Polygon2D<T> {
    /// Axis dropped during projection (argmax |normal component|).
    pub ignore_dir: usize,
    /// First retained axis, `< y_dir`.
    pub x_dir: usize,
    /// Second retained axis.
    pub y_dir: usize,
    /// Projected ring, in the same order as the source 3D ring.
    pub points: Vec<Point2<T>>,
}

impl<T: Scalar + Float> Polygon2D<T> {
    /// Project `ring` into 2D by dropping the component of `normal` with
    /// greatest absolute value.
    pub fn from_ring(normal: &Vec3<T>, ring: &[Point3<T>]) -> Self {
        let ignore_dir = dominant_axis(normal);
        let (x_dir, y_dir) = remaining_axes(ignore_dir);
        let points = ring
            .iter()
            .map(|p| Point2::new(p[x_dir], p[y_dir]))
            .collect();
        Self {
            ignore_dir,
            x_dir,
            y_dir,
            points,
        }
    }

    /// Project a single 3D point the same way the ring was projected.
    pub fn project(&self, p: &Point3<T>) -> Point2<T> {
        Point2::new(p[self.x_dir], p[self.y_dir])
    }

    /// Test whether `p` (already projected via [`Polygon2D::project`]) is
    /// inside this polygon under `algorithm`.
    pub fn is_point_inside(&self, p: Point2<T>, algorithm: InsideAlgorithm) -> bool {
        match algorithm {
            InsideAlgorithm::CrossingNumber => self.crossing_number(p) % 2 == 1,
            InsideAlgorithm::WindingNumber => self.winding_number(p) != 0,
            InsideAlgorithm::SubtendedAngle => {
                let two_pi = (T::one() + T::one()) * T::pi();
                let winds = (self.subtended_angle_sum(p) / two_pi).round();
                !winds.is_zero()
            }
        }
    }

    fn crossing_number(&self, p: Point2<T>) -> i64 {
        let n = self.points.len();
        let mut count = 0i64;
        for i in 0..n {
            let p1 = self.points[i];
            let p2 = self.points[(i + 1) % n];
            let straddles = (p1.y <= p.y && p.y < p2.y) || (p2.y <= p.y && p.y < p1.y);
            if !straddles {
                continue;
            }
            let t = (p.y - p1.y) / (p2.y - p1.y);
            let x_intercept = p1.x + t * (p2.x - p1.x);
            if x_intercept > p.x {
                count += 1;
            }
        }
        count
    }

    fn winding_number(&self, p: Point2<T>) -> i64 {
        let n = self.points.len();
        let mut winding = 0i64;
        for i in 0..n {
            let p1 = self.points[i];
            let p2 = self.points[(i + 1) % n];
            if p1.y <= p.y {
                if p2.y > p.y && is_left(p1, p2, p) > T::zero() {
                    winding += 1;
                }
            } else if p2.y <= p.y && is_left(p1, p2, p) < T::zero() {
                winding -= 1;
            }
        }
        winding
    }

    fn subtended_angle_sum(&self, p: Point2<T>) -> T {
        let n = self.points.len();
        let mut sum = T::zero();
        let pi = T::pi();
        let two_pi = (T::one() + T::one()) * pi;
        for i in 0..n {
            let qi = self.points[i] - p;
            let qn = self.points[(i + 1) % n] - p;
            let mut diff = qn.y.atan2(qn.x) - qi.y.atan2(qi.x);
            while diff > pi {
                diff = diff - two_pi;
            }
            while diff <= -pi {
                diff = diff + two_pi;
            }
            sum = sum + diff;
        }
        sum
    }
}

fn is_left<T: Scalar + Float>(p0: Point2<T>, p1: Point2<T>, p2: Point2<T>) -> T {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

fn dominant_axis<T: Scalar + Float>(n: &Vec3<T>) -> usize {
    let mut axis = 0usize;
    let mut best = n.x.abs();
    if n.y.abs() > best {
        axis = 1;
        best = n.y.abs();
    }
    if n.z.abs() > best {
        axis = 2;
    }
    axis
}

fn remaining_axes(ignore_dir: usize) -> (usize, usize) {
    match ignore_dir {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_xy() -> Polygon2D<f64> {
        let ring = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        Polygon2D::from_ring(&Vec3::new(0.0, 0.0, 1.0), &ring)
    }

    #[test]
    fn projection_drops_the_dominant_axis() {
        let poly = unit_square_xy();
        assert_eq!(poly.ignore_dir, 2);
        assert_eq!(poly.x_dir, 0);
        assert_eq!(poly.y_dir, 1);
    }

    #[test]
    fn all_three_algorithms_agree_for_an_interior_point() {
        let poly = unit_square_xy();
        let p = poly.project(&Point3::new(0.5, 0.5, 0.0));
        assert!(poly.is_point_inside(p, InsideAlgorithm::CrossingNumber));
        assert!(poly.is_point_inside(p, InsideAlgorithm::WindingNumber));
        assert!(poly.is_point_inside(p, InsideAlgorithm::SubtendedAngle));
    }

    #[test]
    fn all_three_algorithms_agree_for_an_exterior_point() {
        let poly = unit_square_xy();
        let p = poly.project(&Point3::new(2.0, 2.0, 0.0));
        assert!(!poly.is_point_inside(p, InsideAlgorithm::CrossingNumber));
        assert!(!poly.is_point_inside(p, InsideAlgorithm::WindingNumber));
        assert!(!poly.is_point_inside(p, InsideAlgorithm::SubtendedAngle));
    }
}
