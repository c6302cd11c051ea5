//! The generic BVH node: top-down build and distance-pruning traversal.

use std::collections::BinaryHeap;
use std::sync::Arc;

use geomkit_math::Point3;
use nalgebra::Scalar;
use num_traits::Float;

use crate::bounds::BoundingVolume;
use crate::primitive::Primitive;

/// A stop predicate: should this node remain a leaf?
pub type StopFn<'a, T, P> = dyn Fn(&[Arc<P>]) -> bool + 'a;

/// A partition function: split primitives into a left and right set.
pub type PartitionFn<'a, P> = dyn Fn(&[Arc<P>]) -> (Vec<Arc<P>>, Vec<Arc<P>>) + 'a;

/// A bounding-volume constructor over a primitive set.
pub type BvConstructFn<'a, P, BV> = dyn Fn(&[Arc<P>]) -> BV + 'a;

/// Per-query traversal counters, returned alongside the distance so that
/// benchmarking code never needs process-wide mutable state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Number of `Regular` nodes visited.
    pub regular_visits: u64,
    /// Number of `Leaf` nodes visited.
    pub leaf_visits: u64,
}

/// A node in the bounding volume hierarchy.
///
/// Built top-down by [`Node::build`] from a flat primitive list; immutable
/// once built. Leaves own their primitive references; regular nodes own
/// their children — there is no upward-owning link, unlike the tree this
/// traversal scheme was adapted from.
#[derive(Debug, Clone)]
pub enum Node<T, P, BV> {
    /// A leaf holding a nonempty set of primitives.
    Leaf {
        /// Bounding volume enclosing every primitive in this leaf.
        bv: BV,
        /// Depth from the root (root is `0`).
        depth: usize,
        /// The primitives this leaf owns.
        primitives: Vec<Arc<P>>,
        #[doc(hidden)]
        _marker: std::marker::PhantomData<T>,
    },
    /// An internal node with exactly two children.
    Regular {
        /// Bounding volume enclosing every primitive reachable below this node.
        bv: BV,
        /// Depth from the root (root is `0`).
        depth: usize,
        /// Left child.
        left: Box<Node<T, P, BV>>,
        /// Right child.
        right: Box<Node<T, P, BV>>,
    },
}

impl<T, P, BV> Node<T, P, BV>
where
    T: Scalar + Float,
    P: Primitive<T>,
    BV: BoundingVolume<T>,
{
    /// Create an unbuilt root holding all primitives.
    ///
    /// The bounding volume is not yet meaningful; call [`Node::build`] to
    /// perform the actual top-down partition.
    pub fn new(primitives: Vec<Arc<P>>) -> Self {
        let bv = BV::build(&Self::bounding_points(&primitives));
        Node::Leaf {
            bv,
            depth: 0,
            primitives,
            _marker: std::marker::PhantomData,
        }
    }

    fn bounding_points(primitives: &[Arc<P>]) -> Vec<Point3<T>> {
        primitives.iter().flat_map(|p| p.bounding_points()).collect()
    }

    /// Bounding volume of this node.
    pub fn bv(&self) -> &BV {
        match self {
            Node::Leaf { bv, .. } => bv,
            Node::Regular { bv, .. } => bv,
        }
    }

    /// Depth of this node (root is `0`).
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { depth, .. } => *depth,
            Node::Regular { depth, .. } => *depth,
        }
    }

    /// `true` if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// All primitives reachable from this node, in subtree order.
    pub fn primitives(&self) -> Vec<Arc<P>> {
        match self {
            Node::Leaf { primitives, .. } => primitives.clone(),
            Node::Regular { left, right, .. } => {
                let mut v = left.primitives();
                v.extend(right.primitives());
                v
            }
        }
    }

    /// Top-down build: recursively partition primitives until `stop`
    /// returns `true`, computing the bounding volume at every node.
    pub fn build(
        self,
        stop: &StopFn<'_, T, P>,
        partition: &PartitionFn<'_, P>,
        bv_construct: &BvConstructFn<'_, P, BV>,
    ) -> Self {
        let (primitives, depth) = match self {
            Node::Leaf {
                primitives, depth, ..
            } => (primitives, depth),
            Node::Regular { .. } => return self,
        };

        let bv = bv_construct(&primitives);

        if stop(&primitives) {
            return Node::Leaf {
                bv,
                depth,
                primitives,
                _marker: std::marker::PhantomData,
            };
        }

        let (left_prims, right_prims) = partition(&primitives);

        let left = Node::Leaf {
            bv: bv_construct(&left_prims),
            depth: depth + 1,
            primitives: left_prims,
            _marker: std::marker::PhantomData,
        }
        .build(stop, partition, bv_construct);

        let right = Node::Leaf {
            bv: bv_construct(&right_prims),
            depth: depth + 1,
            primitives: right_prims,
            _marker: std::marker::PhantomData,
        }
        .build(stop, partition, bv_construct);

        Node::Regular {
            bv,
            depth,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Ordered, squared-distance pruning traversal (see module docs).
    pub fn prune_ordered2(&self, x: &Point3<T>) -> T {
        self.prune_ordered2_with_stats(x).0
    }

    /// Same as [`Node::prune_ordered2`] but also returns per-query visit
    /// counters, for benchmarking.
    pub fn prune_ordered2_with_stats(&self, x: &Point3<T>) -> (T, TraversalStats) {
        let mut stats = TraversalStats::default();
        let mut best2 = T::infinity();
        let mut best: Option<&Arc<P>> = None;
        self.ordered2_rec(x, &mut best2, &mut best, &mut stats);
        let d = best.map(|p| p.signed_distance(x)).unwrap_or(T::infinity());
        (d, stats)
    }

    fn ordered2_rec<'a>(
        &'a self,
        x: &Point3<T>,
        best2: &mut T,
        best: &mut Option<&'a Arc<P>>,
        stats: &mut TraversalStats,
    ) {
        match self {
            Node::Leaf { primitives, .. } => {
                stats.leaf_visits += 1;
                for p in primitives {
                    let d2 = p.unsigned_distance2(x);
                    if d2 < *best2 {
                        *best2 = d2;
                        *best = Some(p);
                    }
                }
            }
            Node::Regular { left, right, .. } => {
                stats.regular_visits += 1;
                let dl2 = left.bv().distance2(x);
                let dr2 = right.bv().distance2(x);
                let (first, first_d2, second, second_d2) = if dl2 <= dr2 {
                    (left.as_ref(), dl2, right.as_ref(), dr2)
                } else {
                    (right.as_ref(), dr2, left.as_ref(), dl2)
                };
                if first_d2 < *best2 {
                    first.ordered2_rec(x, best2, best, stats);
                }
                if second_d2 < *best2 {
                    second.ordered2_rec(x, best2, best, stats);
                }
            }
        }
    }

    /// Ordered pruning traversal comparing linear (unsquared) distances.
    pub fn prune_ordered(&self, x: &Point3<T>) -> T {
        self.prune_ordered_with_stats(x).0
    }

    /// Same as [`Node::prune_ordered`] but also returns visit counters.
    pub fn prune_ordered_with_stats(&self, x: &Point3<T>) -> (T, TraversalStats) {
        let mut stats = TraversalStats::default();
        let mut closest = T::infinity();
        self.ordered_rec(x, &mut closest, &mut stats);
        (closest, stats)
    }

    fn ordered_rec(&self, x: &Point3<T>, closest: &mut T, stats: &mut TraversalStats) {
        match self {
            Node::Leaf { primitives, .. } => {
                stats.leaf_visits += 1;
                for p in primitives {
                    let d = p.signed_distance(x);
                    if d * d < *closest * *closest {
                        *closest = d;
                    }
                }
            }
            Node::Regular { left, right, .. } => {
                stats.regular_visits += 1;
                let dl = left.bv().distance(x);
                let dr = right.bv().distance(x);
                let (first, first_d, second, second_d) = if dl <= dr {
                    (left.as_ref(), dl, right.as_ref(), dr)
                } else {
                    (right.as_ref(), dr, left.as_ref(), dl)
                };
                if first_d * first_d < *closest * *closest {
                    first.ordered_rec(x, closest, stats);
                }
                if second_d * second_d < *closest * *closest {
                    second.ordered_rec(x, closest, stats);
                }
            }
        }
    }

    /// Unordered, squared-distance pruning traversal: recurses left then
    /// right unconditionally, each gated by the same pruning predicate as
    /// the ordered variant.
    pub fn prune_unordered2(&self, x: &Point3<T>) -> T {
        self.prune_unordered2_with_stats(x).0
    }

    /// Same as [`Node::prune_unordered2`] but also returns visit counters.
    pub fn prune_unordered2_with_stats(&self, x: &Point3<T>) -> (T, TraversalStats) {
        let mut stats = TraversalStats::default();
        let mut best2 = T::infinity();
        let mut best: Option<&Arc<P>> = None;
        self.unordered2_rec(x, &mut best2, &mut best, &mut stats);
        let d = best.map(|p| p.signed_distance(x)).unwrap_or(T::infinity());
        (d, stats)
    }

    fn unordered2_rec<'a>(
        &'a self,
        x: &Point3<T>,
        best2: &mut T,
        best: &mut Option<&'a Arc<P>>,
        stats: &mut TraversalStats,
    ) {
        match self {
            Node::Leaf { primitives, .. } => {
                stats.leaf_visits += 1;
                for p in primitives {
                    let d2 = p.unsigned_distance2(x);
                    if d2 < *best2 {
                        *best2 = d2;
                        *best = Some(p);
                    }
                }
            }
            Node::Regular { left, right, .. } => {
                stats.regular_visits += 1;
                let dl2 = left.bv().distance2(x);
                if dl2 < *best2 {
                    left.unordered2_rec(x, best2, best, stats);
                }
                let dr2 = right.bv().distance2(x);
                if dr2 < *best2 {
                    right.unordered2_rec(x, best2, best, stats);
                }
            }
        }
    }

    /// Unordered pruning traversal comparing linear (unsquared) distances.
    pub fn prune_unordered(&self, x: &Point3<T>) -> T {
        self.prune_unordered_with_stats(x).0
    }

    /// Same as [`Node::prune_unordered`] but also returns visit counters.
    pub fn prune_unordered_with_stats(&self, x: &Point3<T>) -> (T, TraversalStats) {
        let mut stats = TraversalStats::default();
        let mut closest = T::infinity();
        self.unordered_rec(x, &mut closest, &mut stats);
        (closest, stats)
    }

    fn unordered_rec(&self, x: &Point3<T>, closest: &mut T, stats: &mut TraversalStats) {
        match self {
            Node::Leaf { primitives, .. } => {
                stats.leaf_visits += 1;
                for p in primitives {
                    let d = p.signed_distance(x);
                    if d * d < *closest * *closest {
                        *closest = d;
                    }
                }
            }
            Node::Regular { left, right, .. } => {
                stats.regular_visits += 1;
                let dl = left.bv().distance(x);
                if dl * dl < *closest * *closest {
                    left.unordered_rec(x, closest, stats);
                }
                let dr = right.bv().distance(x);
                if dr * dr < *closest * *closest {
                    right.unordered_rec(x, closest, stats);
                }
            }
        }
    }

    /// Priority-queue pruning traversal, squared distances.
    ///
    /// Visits fewer internal nodes than the ordered variant on highly
    /// asymmetric trees; uses a real binary heap rather than re-sorting a
    /// vector on every pop.
    pub fn prune_priority_queue2(&self, x: &Point3<T>) -> T {
        self.prune_priority_queue2_with_stats(x).0
    }

    /// Same as [`Node::prune_priority_queue2`] but also returns visit counters.
    pub fn prune_priority_queue2_with_stats(&self, x: &Point3<T>) -> (T, TraversalStats) {
        let mut stats = TraversalStats::default();
        let mut best2 = T::infinity();
        let mut best: Option<&Arc<P>> = None;

        let mut heap: BinaryHeap<HeapEntry<T, &Node<T, P, BV>>> = BinaryHeap::new();
        heap.push(HeapEntry {
            key: self.bv().distance2(x),
            node: self,
        });

        while let Some(HeapEntry { key, node }) = heap.pop() {
            if key >= best2 {
                continue;
            }
            match node {
                Node::Leaf { primitives, .. } => {
                    stats.leaf_visits += 1;
                    for p in primitives {
                        let d2 = p.unsigned_distance2(x);
                        if d2 < best2 {
                            best2 = d2;
                            best = Some(p);
                        }
                    }
                }
                Node::Regular { left, right, .. } => {
                    stats.regular_visits += 1;
                    let dl2 = left.bv().distance2(x);
                    if dl2 < best2 {
                        heap.push(HeapEntry {
                            key: dl2,
                            node: left,
                        });
                    }
                    let dr2 = right.bv().distance2(x);
                    if dr2 < best2 {
                        heap.push(HeapEntry {
                            key: dr2,
                            node: right,
                        });
                    }
                }
            }
        }

        let d = best.map(|p| p.signed_distance(x)).unwrap_or(T::infinity());
        (d, stats)
    }

    /// Priority-queue pruning traversal, linear distances.
    pub fn prune_priority_queue(&self, x: &Point3<T>) -> T {
        self.prune_priority_queue_with_stats(x).0
    }

    /// Same as [`Node::prune_priority_queue`] but also returns visit counters.
    pub fn prune_priority_queue_with_stats(&self, x: &Point3<T>) -> (T, TraversalStats) {
        let mut stats = TraversalStats::default();
        let mut closest = T::infinity();

        let mut heap: BinaryHeap<HeapEntry<T, &Node<T, P, BV>>> = BinaryHeap::new();
        heap.push(HeapEntry {
            key: self.bv().distance2(x),
            node: self,
        });

        while let Some(HeapEntry { key, node }) = heap.pop() {
            if key >= closest * closest {
                continue;
            }
            match node {
                Node::Leaf { primitives, .. } => {
                    stats.leaf_visits += 1;
                    for p in primitives {
                        let d = p.signed_distance(x);
                        if d * d < closest * closest {
                            closest = d;
                        }
                    }
                }
                Node::Regular { left, right, .. } => {
                    stats.regular_visits += 1;
                    let dl2 = left.bv().distance2(x);
                    if dl2 < closest * closest {
                        heap.push(HeapEntry {
                            key: dl2,
                            node: left,
                        });
                    }
                    let dr2 = right.bv().distance2(x);
                    if dr2 < closest * closest {
                        heap.push(HeapEntry {
                            key: dr2,
                            node: right,
                        });
                    }
                }
            }
        }

        (closest, stats)
    }
}

/// A min-heap entry keyed on BV distance². `BinaryHeap` is a max-heap, so
/// ordering is reversed: the smallest key compares greatest.
struct HeapEntry<T, N> {
    key: T,
    node: N,
}

impl<T: PartialEq, N> PartialEq for HeapEntry<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: PartialEq, N> Eq for HeapEntry<T, N> {}

impl<T: PartialOrd, N> PartialOrd for HeapEntry<T, N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: PartialOrd, N> Ord for HeapEntry<T, N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: smaller key => greater in heap order => popped first.
        other
            .key
            .partial_cmp(&self.key)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::partition::{default_bv_constructor, default_partition, default_stop};
    use approx::assert_abs_diff_eq;

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

    fn sample_points() -> Vec<Arc<Point>> {
        (0..20)
            .map(|i| {
                Arc::new(Point {
                    pos: Point3::new(i as f64, 0.0, 0.0),
                })
            })
            .collect()
    }

    fn build_tree() -> Node<f64, Point, Aabb<f64>> {
        let stop = default_stop::<f64, Point>();
        let partition = default_partition::<f64, Point>();
        let bv_construct = default_bv_constructor::<f64, Point, Aabb<f64>>();
        Node::new(sample_points()).build(&stop, &partition, &bv_construct)
    }

    #[test]
    fn single_primitive_is_immediately_a_leaf() {
        let stop = default_stop::<f64, Point>();
        let partition = default_partition::<f64, Point>();
        let bv_construct = default_bv_constructor::<f64, Point, Aabb<f64>>();
        let tree = Node::new(vec![Arc::new(Point {
            pos: Point3::new(0.0, 0.0, 0.0),
        })])
        .build(&stop, &partition, &bv_construct);
        assert!(tree.is_leaf());
    }

    #[test]
    fn leaf_partition_covers_every_primitive_exactly_once() {
        let tree = build_tree();
        assert_eq!(tree.primitives().len(), 20);
    }

    #[test]
    fn child_depth_is_parent_plus_one() {
        if let Node::Regular { left, right, depth, .. } = &build_tree() {
            assert_eq!(left.depth(), depth + 1);
            assert_eq!(right.depth(), depth + 1);
        } else {
            panic!("expected a regular root for 20 primitives");
        }
    }

    #[test]
    fn all_pruning_variants_agree() {
        let tree = build_tree();
        let x = Point3::new(7.3, 1.0, 0.0);
        let a = tree.prune_ordered2(&x);
        let b = tree.prune_ordered(&x);
        let c = tree.prune_unordered2(&x);
        let d = tree.prune_unordered(&x);
        let e = tree.prune_priority_queue2(&x);
        let f = tree.prune_priority_queue(&x);
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        assert_abs_diff_eq!(a, c, epsilon = 1e-9);
        assert_abs_diff_eq!(a, d, epsilon = 1e-9);
        assert_abs_diff_eq!(a, e, epsilon = 1e-9);
        assert_abs_diff_eq!(a, f, epsilon = 1e-9);
    }
}
