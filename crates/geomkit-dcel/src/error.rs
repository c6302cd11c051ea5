//! Error and diagnostic types surfaced by the loader and the mesh's
//! internal consistency check.

/// Failures that can occur while loading a mesh from a file.
///
/// The loader never panics on malformed input; every failure mode is
/// surfaced through this type instead.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The file could not be opened for reading.
    #[error("could not open {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The header was missing a required `element vertex`/`element face`
    /// declaration, or had no `end_header` line.
    #[error("malformed PLY header: {0}")]
    MalformedHeader(String),
    /// The body had fewer lines than the header's declared vertex or face
    /// count.
    #[error("truncated body: expected {expected} {kind} lines, found {found}")]
    TruncatedBody {
        /// What was being read (`"vertex"` or `"face"`).
        kind: &'static str,
        /// Declared count from the header.
        expected: usize,
        /// Lines actually present before EOF.
        found: usize,
    },
    /// A face line named fewer than 3 vertex indices.
    #[error("face {face_index} has fewer than 3 vertices ({count})")]
    DegenerateFace {
        /// 0-based index of the offending face in the body.
        face_index: usize,
        /// Vertex count the line actually declared.
        count: usize,
    },
    /// A face's ring repeated the same vertex index.
    #[error("face {face_index} repeats vertex index {vertex_index} in its ring")]
    DuplicateRingVertex {
        /// 0-based index of the offending face in the body.
        face_index: usize,
        /// The repeated vertex index.
        vertex_index: usize,
    },
    /// A numeric field in the body could not be parsed.
    #[error("could not parse {field} on line {line}: {source}")]
    Parse {
        /// Which field failed to parse (e.g. `"x"`, `"vertex index"`).
        field: &'static str,
        /// 1-based line number in the body section.
        line: usize,
        /// Underlying parse error.
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Aggregated topology warning counts from [`crate::mesh::Mesh::sanity_check`].
///
/// Every field is a count, not a hard failure — a mesh with a nonzero
/// report remains queryable; the caller decides whether to treat it as
/// fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyReport {
    /// Faces whose designated half-edge ring is empty.
    pub faces_without_edges: usize,
    /// Faces whose ring repeats a vertex.
    pub degenerate_faces: usize,
    /// Half-edges whose origin equals their next half-edge's origin.
    pub degenerate_edges: usize,
    /// Half-edges with no `pair` link.
    pub edges_missing_pair: usize,
    /// Half-edges with no `next` link.
    pub edges_missing_next: usize,
    /// Half-edges with no `prev` link.
    pub edges_missing_prev: usize,
    /// Half-edges whose `pair.pair != self` or `pair.origin` disagreement.
    pub edges_with_bad_pair: usize,
    /// Half-edges with `prev.next != self`.
    pub edges_with_bad_prev_next: usize,
    /// Half-edges with `next.prev != self`.
    pub edges_with_bad_next_prev: usize,
    /// Vertices with no outgoing half-edge.
    pub vertices_without_outgoing_edge: usize,
}

impl TopologyReport {
    /// `true` iff every category is zero.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    /// Sum of every category, for a quick "how bad is it" signal.
    pub fn total(&self) -> usize {
        self.faces_without_edges
            + self.degenerate_faces
            + self.degenerate_edges
            + self.edges_missing_pair
            + self.edges_missing_next
            + self.edges_missing_prev
            + self.edges_with_bad_pair
            + self.edges_with_bad_prev_next
            + self.edges_with_bad_next_prev
            + self.vertices_without_outgoing_edge
    }
}
