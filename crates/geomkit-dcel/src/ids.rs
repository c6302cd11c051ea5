//! Arena handles for the mesh's three topology tables.

use slotmap::new_key_type;

new_key_type! {
    /// Handle for a vertex in a [`crate::mesh::Mesh`].
    pub struct VertexId;
    /// Handle for a half-edge in a [`crate::mesh::Mesh`].
    pub struct HalfEdgeId;
    /// Handle for a face in a [`crate::mesh::Mesh`].
    pub struct FaceId;
}
