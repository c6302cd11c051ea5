#![warn(missing_docs)]

//! Half-edge mesh topology and the signed-distance primitives derived from
//! it: per-vertex, per-edge, and per-face distance queries, 3D→2D polygon
//! projection and point-in-polygon testing, and an ASCII PLY loader.
//!
//! Queries are read-only once [`Mesh::reconcile`] has run; the mesh itself
//! is not safe to mutate concurrently with queries against it.

mod error;
mod face;
mod facet;
mod half_edge;
mod ids;
mod mesh;
mod ply;
mod polygon2d;
mod vertex;

pub use error::{LoaderError, TopologyReport};
pub use face::Face;
pub use facet::Facet;
pub use half_edge::HalfEdge;
pub use ids::{FaceId, HalfEdgeId, VertexId};
pub use mesh::{Mesh, SearchAlgorithm};
pub use polygon2d::{InsideAlgorithm, Polygon2D};
pub use vertex::{NormalWeight, Vertex};
