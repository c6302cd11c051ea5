#![warn(missing_docs)]

//! Generic bounding volume hierarchy with distance-pruning nearest-primitive
//! queries.
//!
//! The tree is built top-down over any `Primitive<T>` with a pluggable
//! partition strategy, and queried via six traversal variants that differ in
//! whether children are visited in a distance-sorted order and whether
//! comparisons use squared or linear distance. All six agree on the result;
//! they exist to be benchmarked against each other, not because callers
//! need to pick the "correct" one.

mod bounds;
mod node;
mod partition;
mod primitive;

pub use bounds::{Aabb, BoundingSphere, BoundingVolume};
pub use node::{BvConstructFn, Node, PartitionFn, StopFn, TraversalStats};
pub use partition::{
    default_bv_constructor, default_partition, default_stop, partition_minimum_overlap,
    partition_sah, stop_at_leaf_size,
};
pub use primitive::Primitive;
