#![warn(missing_docs)]

//! Signed distance queries against a closed, orientable triangular surface
//! mesh: half-edge topology in [`geomkit_dcel`], a generic distance-pruning
//! BVH in [`geomkit_bvh`], and the numeric vector types both build on in
//! [`geomkit_math`].
//!
//! [`SurfaceField`] is the glue: it owns a reconciled mesh and a BVH built
//! over that mesh's facets, and answers queries through the BVH's default
//! pruning traversal. Callers who need a different partition strategy or
//! traversal variant can build the pieces directly from the re-exported
//! crates instead.

pub use geomkit_bvh::{
    default_bv_constructor, default_partition, default_stop, partition_minimum_overlap,
    partition_sah, stop_at_leaf_size, Aabb, BoundingSphere, BoundingVolume, Node, Primitive,
    TraversalStats,
};
pub use geomkit_dcel::{
    Face, FaceId, Facet, HalfEdge, HalfEdgeId, InsideAlgorithm, LoaderError, Mesh, NormalWeight,
    Polygon2D, SearchAlgorithm, TopologyReport, Vertex, VertexId,
};
pub use geomkit_math::{Point2, Point3, Tolerance, Vec2, Vec2Ext, Vec3, Vec3Ext};

/// A reconciled mesh plus a BVH built over its facets.
///
/// Construction reconciles the mesh and bakes its faces into
/// [`Facet`]s once; after that both the mesh and the BVH are immutable,
/// matching the single-threaded-build/many-reader contract the underlying
/// data structures are designed for.
pub struct SurfaceField<T> {
    mesh: Mesh<T>,
    bvh: Node<T, Facet<T>, Aabb<T>>,
}

impl SurfaceField<f64> {
    /// Reconcile `mesh` with the given vertex-normal weighting, then build
    /// a BVH over its facets using the median-split partitioner and AABB
    /// bounding volumes.
    pub fn build(mut mesh: Mesh<f64>, weight: NormalWeight) -> Self {
        mesh.reconcile(weight);
        let facets = mesh.to_facets();
        let stop = default_stop::<f64, Facet<f64>>();
        let partition = default_partition::<f64, Facet<f64>>();
        let bv_construct = default_bv_constructor::<f64, Facet<f64>, Aabb<f64>>();
        let bvh = Node::new(facets).build(&stop, &partition, &bv_construct);
        Self { mesh, bvh }
    }

    /// Load a mesh from an ASCII PLY file, reconcile it, and build the
    /// default BVH over it.
    pub fn load_from_ascii_ply<P: AsRef<std::path::Path>>(
        path: P,
        weight: NormalWeight,
    ) -> Result<Self, LoaderError> {
        let mesh = Mesh::load_from_ascii_ply(path)?;
        Ok(Self::build(mesh, weight))
    }

    /// The underlying mesh, for brute-force queries or a sanity check.
    pub fn mesh(&self) -> &Mesh<f64> {
        &self.mesh
    }

    /// The BVH built over the mesh's facets.
    pub fn bvh(&self) -> &Node<f64, Facet<f64>, Aabb<f64>> {
        &self.bvh
    }

    /// Signed distance from `x` to the surface, via the BVH's ordered,
    /// squared-distance pruning traversal.
    pub fn signed_distance(&self, x: &Point3<f64>) -> f64 {
        self.bvh.prune_ordered2(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn single_triangle() -> Mesh<f64> {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_face(&[a, b, c]);
        mesh
    }

    #[test]
    fn bvh_and_mesh_direct2_agree_on_a_single_triangle() {
        let field = SurfaceField::build(single_triangle(), NormalWeight::Average);
        let x = Point3::new(0.3, 0.3, 0.5);
        let from_bvh = field.signed_distance(&x);
        let mut mesh = field.mesh().clone();
        mesh.set_search_algorithm(SearchAlgorithm::Direct2);
        let from_mesh = mesh.signed_distance(&x);
        assert_abs_diff_eq!(from_bvh, from_mesh, epsilon = 1e-9);
    }

    #[test]
    fn single_face_mesh_builds_a_one_leaf_bvh() {
        let field = SurfaceField::build(single_triangle(), NormalWeight::Average);
        assert!(field.bvh().is_leaf());
    }
}
