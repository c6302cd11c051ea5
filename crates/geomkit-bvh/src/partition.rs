//! Adapter factories for the `stop`, `partition`, and `bv_construct`
//! closures consumed by [`crate::node::Node::build`].

use std::sync::Arc;

use geomkit_math::Point3;
use nalgebra::Scalar;
use num_traits::Float;

use crate::bounds::BoundingVolume;
use crate::node::{BvConstructFn, PartitionFn, StopFn};
use crate::primitive::Primitive;

/// Stop descending once a leaf holds `max_primitives` or fewer.
pub fn stop_at_leaf_size<'a, T, P>(max_primitives: usize) -> Box<StopFn<'a, T, P>>
where
    P: 'a,
{
    Box::new(move |primitives: &[Arc<P>]| primitives.len() <= max_primitives)
}

/// Stop once a leaf holds one primitive or fewer; the default used when no
/// explicit leaf size is configured.
pub fn default_stop<'a, T, P>() -> Box<StopFn<'a, T, P>>
where
    P: 'a,
{
    stop_at_leaf_size(1)
}

/// Build the tightest enclosing `BV` over a primitive set.
pub fn default_bv_constructor<'a, T, P, BV>() -> Box<BvConstructFn<'a, P, BV>>
where
    T: Scalar + Float + 'a,
    P: Primitive<T> + 'a,
    BV: BoundingVolume<T> + 'a,
{
    Box::new(|primitives: &[Arc<P>]| {
        let points: Vec<Point3<T>> = primitives.iter().flat_map(|p| p.bounding_points()).collect();
        BV::build(&points)
    })
}

fn centroid_bounds<T, P>(primitives: &[Arc<P>]) -> (Point3<T>, Point3<T>)
where
    T: Scalar + Float,
    P: Primitive<T>,
{
    let mut lo = primitives[0].centroid();
    let mut hi = lo;
    for p in &primitives[1..] {
        let c = p.centroid();
        lo.x = lo.x.min(c.x);
        lo.y = lo.y.min(c.y);
        lo.z = lo.z.min(c.z);
        hi.x = hi.x.max(c.x);
        hi.y = hi.y.max(c.y);
        hi.z = hi.z.max(c.z);
    }
    (lo, hi)
}

fn longest_centroid_axis<T, P>(primitives: &[Arc<P>]) -> usize
where
    T: Scalar + Float,
    P: Primitive<T>,
{
    let (lo, hi) = centroid_bounds(primitives);
    let extent = hi - lo;
    let mut axis = 0usize;
    let mut best = extent.x;
    if extent.y > best {
        axis = 1;
        best = extent.y;
    }
    if extent.z > best {
        axis = 2;
    }
    axis
}

fn split_by_median<T, P>(primitives: &[Arc<P>], axis: usize) -> (Vec<Arc<P>>, Vec<Arc<P>>)
where
    T: Scalar + Float,
    P: Primitive<T>,
{
    let mut sorted = primitives.to_vec();
    sorted.sort_by(|a, b| {
        let ca = a.centroid()[axis];
        let cb = b.centroid()[axis];
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });
    let mid = (sorted.len() + 1) / 2;
    let right = sorted.split_off(mid);
    (sorted, right)
}

/// Split along the longest centroid-bounds axis at the median primitive.
///
/// The simplest partition strategy: cheap to build, no attempt to minimize
/// overlap or traversal cost. A reasonable default for small meshes.
pub fn default_partition<'a, T, P>() -> Box<PartitionFn<'a, P>>
where
    T: Scalar + Float + 'a,
    P: Primitive<T> + 'a,
{
    Box::new(move |primitives: &[Arc<P>]| {
        let axis = longest_centroid_axis::<T, _>(primitives);
        split_by_median::<T, _>(primitives, axis)
    })
}

/// Try a median split on each of the three axes and keep whichever gives
/// the smallest overlap between the two children's bounding volumes.
pub fn partition_minimum_overlap<'a, T, P, BV>() -> Box<PartitionFn<'a, P>>
where
    T: Scalar + Float + 'a,
    P: Primitive<T> + 'a,
    BV: BoundingVolume<T> + 'a,
{
    Box::new(move |primitives: &[Arc<P>]| {
        let mut best: Option<(T, Vec<Arc<P>>, Vec<Arc<P>>)> = None;
        for axis in 0..3 {
            let (left, right) = split_by_median::<T, _>(primitives, axis);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let left_pts: Vec<Point3<T>> = left.iter().flat_map(|p| p.bounding_points()).collect();
            let right_pts: Vec<Point3<T>> = right.iter().flat_map(|p| p.bounding_points()).collect();
            let left_bv = BV::build(&left_pts);
            let right_bv = BV::build(&right_pts);
            let overlap = left_bv.overlapping_volume(&right_bv);
            let is_better = match &best {
                None => true,
                Some((b, _, _)) => overlap < *b,
            };
            if is_better {
                best = Some((overlap, left, right));
            }
        }
        match best {
            Some((_, left, right)) => (left, right),
            None => split_by_median::<T, _>(primitives, longest_centroid_axis::<T, _>(primitives)),
        }
    })
}

/// Surface Area Heuristic split: evaluates 16 candidate planes per axis and
/// picks the split minimizing expected traversal cost.
///
/// `cost(split) = (area(L) / area(parent)) * |L| + (area(R) / area(parent)) * |R|`,
/// i.e. unit traversal cost and unit intersection cost. Candidate splits
/// that leave one side empty are skipped, since an empty child can never
/// reduce the expected query cost below leaving the node unsplit.
pub fn partition_sah<'a, T, P, BV>() -> Box<PartitionFn<'a, P>>
where
    T: Scalar + Float + 'a,
    P: Primitive<T> + 'a,
    BV: BoundingVolume<T> + 'a,
{
    const CANDIDATES: usize = 16;

    Box::new(move |primitives: &[Arc<P>]| {
        let parent_pts: Vec<Point3<T>> = primitives.iter().flat_map(|p| p.bounding_points()).collect();
        let parent_area = BV::build(&parent_pts).area();

        let mut best: Option<(T, Vec<Arc<P>>, Vec<Arc<P>>)> = None;

        for axis in 0..3 {
            let (lo, hi) = centroid_bounds::<T, _>(primitives);
            let span = hi[axis] - lo[axis];
            if span <= T::zero() {
                continue;
            }
            for k in 1..=CANDIDATES {
                let t = T::from(k).unwrap() / T::from(CANDIDATES).unwrap();
                let plane = lo[axis] + span * t;

                let mut left = Vec::new();
                let mut right = Vec::new();
                for p in primitives {
                    if p.centroid()[axis] <= plane {
                        left.push(p.clone());
                    } else {
                        right.push(p.clone());
                    }
                }
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_pts: Vec<Point3<T>> = left.iter().flat_map(|p| p.bounding_points()).collect();
                let right_pts: Vec<Point3<T>> = right.iter().flat_map(|p| p.bounding_points()).collect();
                let left_area = BV::build(&left_pts).area();
                let right_area = BV::build(&right_pts).area();

                let cost = (left_area / parent_area) * T::from(left.len()).unwrap()
                    + (right_area / parent_area) * T::from(right.len()).unwrap();

                let is_better = match &best {
                    None => true,
                    Some((b, _, _)) => cost < *b,
                };
                if is_better {
                    best = Some((cost, left, right));
                }
            }
        }

        match best {
            Some((_, left, right)) => (left, right),
            None => split_by_median::<T, _>(primitives, longest_centroid_axis::<T, _>(primitives)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;

    #[derive(Debug, Clone, Copy)]
    struct Point {
        pos: Point3<f64>,
    }

    impl Primitive<f64> for Point {
        fn signed_distance(&self, x: &Point3<f64>) -> f64 {
            (x - self.pos).norm()
        }

        fn unsigned_distance2(&self, x: &Point3<f64>) -> f64 {
            (x - self.pos).norm_squared()
        }

        fn centroid(&self) -> Point3<f64> {
            self.pos
        }

        fn bounding_points(&self) -> Vec<Point3<f64>> {
            vec![self.pos]
        }
    }

    fn sample() -> Vec<Arc<Point>> {
        (0..10)
            .map(|i| {
                Arc::new(Point {
                    pos: Point3::new(i as f64, 0.0, 0.0),
                })
            })
            .collect()
    }

    #[test]
    fn default_partition_splits_evenly_along_the_spread_axis() {
        let partition = default_partition::<f64, Point>();
        let (left, right) = partition(&sample());
        assert_eq!(left.len() + right.len(), 10);
        assert!(!left.is_empty() && !right.is_empty());
    }

    #[test]
    fn minimum_overlap_partition_covers_every_primitive() {
        let partition = partition_minimum_overlap::<f64, Point, Aabb<f64>>();
        let (left, right) = partition(&sample());
        assert_eq!(left.len() + right.len(), 10);
    }

    #[test]
    fn sah_partition_covers_every_primitive_and_skips_empty_sides() {
        let partition = partition_sah::<f64, Point, Aabb<f64>>();
        let (left, right) = partition(&sample());
        assert_eq!(left.len() + right.len(), 10);
        assert!(!left.is_empty() && !right.is_empty());
    }

    #[test]
    fn default_stop_is_true_only_at_one_primitive() {
        let stop = default_stop::<f64, Point>();
        assert!(!stop(&sample()));
        assert!(stop(&sample()[..1]));
    }
}
