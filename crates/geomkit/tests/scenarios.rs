//! End-to-end scenarios spanning the half-edge mesh and the BVH built over
//! it: a unit cube, a unit tetrahedron, and BVH-specific build/traversal
//! guarantees.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use geomkit::{
    default_bv_constructor, partition_sah, Aabb, Mesh, Node, NormalWeight, Point3,
    SearchAlgorithm, SurfaceField,
};

fn unit_cube() -> Mesh<f64> {
    let mut mesh = Mesh::new();
    let p = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
    let v: Vec<_> = [
        (-0.5, -0.5, -0.5),
        (0.5, -0.5, -0.5),
        (0.5, 0.5, -0.5),
        (-0.5, 0.5, -0.5),
        (-0.5, -0.5, 0.5),
        (0.5, -0.5, 0.5),
        (0.5, 0.5, 0.5),
        (-0.5, 0.5, 0.5),
    ]
    .iter()
    .map(|&(x, y, z)| mesh.add_vertex(p(x, y, z)))
    .collect();

    // Ring orderings chosen so each face's computed normal points outward.
    mesh.add_face(&[v[0], v[1], v[2], v[3]]); // bottom, -z
    mesh.add_face(&[v[4], v[7], v[6], v[5]]); // top, +z
    mesh.add_face(&[v[0], v[4], v[5], v[1]]); // front, -y
    mesh.add_face(&[v[2], v[6], v[7], v[3]]); // back, +y
    mesh.add_face(&[v[0], v[3], v[7], v[4]]); // left, -x
    mesh.add_face(&[v[5], v[6], v[2], v[1]]); // right, +x

    mesh
}

fn unit_tetrahedron() -> Mesh<f64> {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
    let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
    let d = mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));

    mesh.add_face(&[a, b, c]); // opposite d
    mesh.add_face(&[a, d, b]); // opposite c
    mesh.add_face(&[a, c, d]); // opposite b
    mesh.add_face(&[b, d, c]); // opposite a

    mesh
}

#[test]
fn cube_center_and_face_queries_match_the_known_signed_distances() {
    let mut mesh = unit_cube();
    mesh.reconcile(NormalWeight::Average);
    mesh.set_search_algorithm(SearchAlgorithm::Direct);

    let center = mesh.signed_distance(&Point3::new(0.0, 0.0, 0.0));
    assert_abs_diff_eq!(center, -0.5, epsilon = 1e-9);

    let face = mesh.signed_distance(&Point3::new(1.0, 0.0, 0.0));
    assert_abs_diff_eq!(face, 0.5, epsilon = 1e-9);

    let corner = mesh.signed_distance(&Point3::new(2.0, 2.0, 2.0));
    let expected = 1.5_f64 * 3.0_f64.sqrt();
    assert_abs_diff_eq!(corner, expected, epsilon = 1e-6);
}

#[test]
fn cube_bvh_agrees_with_direct2_mesh_scan() {
    let field = SurfaceField::build(unit_cube(), NormalWeight::Average);
    let mut mesh = field.mesh().clone();
    mesh.set_search_algorithm(SearchAlgorithm::Direct2);

    for x in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 2.0, 2.0),
        Point3::new(-0.4, 0.1, 0.3),
    ] {
        let from_bvh = field.signed_distance(&x);
        let from_mesh = mesh.signed_distance(&x);
        assert_abs_diff_eq!(from_bvh, from_mesh, epsilon = 1e-9);
    }
}

#[test]
fn tetrahedron_centroid_query_is_negative_and_matches_nearest_face_plane() {
    let mut mesh = unit_tetrahedron();
    mesh.reconcile(NormalWeight::Average);
    mesh.set_search_algorithm(SearchAlgorithm::Direct);

    let d = mesh.signed_distance(&Point3::new(0.25, 0.25, 0.25));
    assert!(d < 0.0, "expected interior point to be negative, got {d}");
}

#[test]
fn all_six_pruning_variants_agree_on_a_tetrahedron_bvh() {
    let field = SurfaceField::build(unit_tetrahedron(), NormalWeight::Average);
    let bvh = field.bvh();
    let x = Point3::new(0.4, 0.4, 0.4);

    let a = bvh.prune_ordered2(&x);
    let b = bvh.prune_ordered(&x);
    let c = bvh.prune_unordered2(&x);
    let d = bvh.prune_unordered(&x);
    let e = bvh.prune_priority_queue2(&x);
    let f = bvh.prune_priority_queue(&x);

    for v in [b, c, d, e, f] {
        assert_abs_diff_eq!(a, v, epsilon = 1e-9);
    }
}

#[test]
fn single_face_bvh_is_immediately_a_leaf_and_answers_correctly() {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
    let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
    mesh.add_face(&[a, b, c]);

    let field = SurfaceField::build(mesh, NormalWeight::Average);
    assert!(field.bvh().is_leaf());

    let x = Point3::new(0.3, 0.3, 0.5);
    assert_abs_diff_eq!(field.signed_distance(&x), 0.5, epsilon = 1e-9);
}

#[test]
fn building_a_bvh_twice_over_the_same_faces_yields_identical_leaf_partitions() {
    let mesh1 = unit_cube();
    let mesh2 = unit_cube();
    let field1 = SurfaceField::build(mesh1, NormalWeight::Average);
    let field2 = SurfaceField::build(mesh2, NormalWeight::Average);

    assert_eq!(
        field1.bvh().primitives().len(),
        field2.bvh().primitives().len()
    );
    assert_eq!(field1.bvh().depth(), field2.bvh().depth());
}

#[test]
fn sah_and_median_built_trees_agree_on_query_results() {
    let mut mesh = unit_cube();
    mesh.reconcile(NormalWeight::Average);
    let facets: Vec<Arc<_>> = mesh.to_facets();

    let stop = geomkit::default_stop::<f64, geomkit::Facet<f64>>();
    let median = geomkit::default_partition::<f64, geomkit::Facet<f64>>();
    let sah = partition_sah::<f64, geomkit::Facet<f64>, Aabb<f64>>();
    let bv_construct = default_bv_constructor::<f64, geomkit::Facet<f64>, Aabb<f64>>();

    let median_tree: Node<f64, geomkit::Facet<f64>, Aabb<f64>> =
        Node::new(facets.clone()).build(&stop, &median, &bv_construct);
    let sah_tree: Node<f64, geomkit::Facet<f64>, Aabb<f64>> =
        Node::new(facets).build(&stop, &sah, &bv_construct);

    for x in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 2.0, 2.0),
        Point3::new(-0.6, 0.2, 0.1),
    ] {
        let a = median_tree.prune_ordered2(&x);
        let b = sah_tree.prune_ordered2(&x);
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
    }
}
