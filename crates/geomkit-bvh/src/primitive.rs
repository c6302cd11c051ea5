//! The contract a BVH primitive must satisfy.

use geomkit_math::Point3;

/// A primitive that can be stored in a leaf and queried for distance to a point.
///
/// `Face` (from `geomkit-dcel`) is the primitive this kernel is built for,
/// but the trait has no dependency on the DCEL crate so the tree can be
/// reused over any distance-queryable shape.
pub trait Primitive<T> {
    /// Signed distance from `x` to this primitive.
    fn signed_distance(&self, x: &Point3<T>) -> T;

    /// Squared unsigned distance from `x` to this primitive.
    ///
    /// Used during traversal to avoid a `sqrt` on every comparison; the
    /// final answer is always obtained via [`Primitive::signed_distance`].
    fn unsigned_distance2(&self, x: &Point3<T>) -> T;

    /// Representative point used to sort primitives during partitioning.
    fn centroid(&self) -> Point3<T>;

    /// Points that must be enclosed by any bounding volume built over this
    /// primitive (e.g. a triangle's three vertices).
    fn bounding_points(&self) -> Vec<Point3<T>>;
}
