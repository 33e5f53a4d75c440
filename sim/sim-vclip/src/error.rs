//! Error types for polyhedron validation and V-Clip queries.

use thiserror::Error;

use crate::feature::Feature;

/// Result type for polyhedron validation.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Malformed polyhedron geometry.
///
/// Every variant names the offending feature so the editing layer can
/// highlight it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// An edge or face references a vertex that does not exist.
    #[error("{feature} references vertex {index} (polyhedron has {vertex_count} vertices)")]
    InvalidReference {
        /// The edge or face holding the bad reference.
        feature: Feature,
        /// The out-of-range vertex index.
        index: usize,
        /// Number of vertices in the polyhedron.
        vertex_count: usize,
    },

    /// A face with fewer than three vertices.
    #[error("{feature} has {vertex_count} vertices, need at least 3")]
    DegenerateFace {
        /// The degenerate face.
        feature: Feature,
        /// Number of vertices it has.
        vertex_count: usize,
    },

    /// A vertex with a `NaN` or infinite coordinate.
    #[error("{feature} has a non-finite position")]
    NonFiniteVertex {
        /// The offending vertex.
        feature: Feature,
    },

    /// An edge whose endpoints coincide (by index or by position).
    #[error("{feature} has zero length")]
    DegenerateEdge {
        /// The degenerate edge.
        feature: Feature,
    },

    /// An edge not shared by exactly two faces with opposite windings.
    #[error("{feature} is bounded by {face_count} faces, expected 2 with opposite winding")]
    NotClosed {
        /// The offending edge.
        feature: Feature,
        /// Number of faces found using it.
        face_count: usize,
    },

    /// A face boundary segment with no matching entry in the edge list.
    #[error("{feature} has a boundary segment {tail}-{head} missing from the edge list")]
    MissingEdge {
        /// The face.
        feature: Feature,
        /// First vertex of the segment.
        tail: usize,
        /// Second vertex of the segment.
        head: usize,
    },

    /// A non-planar face, a reflex face corner, or a vertex in front of a face.
    #[error("{feature} is not convex")]
    NotConvex {
        /// The offending face.
        feature: Feature,
    },

    /// `V - E + F != 2`.
    #[error("Euler characteristic {vertices} - {edges} + {faces} != 2")]
    EulerCharacteristic {
        /// Vertex count.
        vertices: usize,
        /// Edge count.
        edges: usize,
        /// Face count.
        faces: usize,
    },
}

impl GeometryError {
    /// The feature this error is about, if it names one.
    #[must_use]
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Self::InvalidReference { feature, .. }
            | Self::DegenerateFace { feature, .. }
            | Self::NonFiniteVertex { feature }
            | Self::DegenerateEdge { feature }
            | Self::NotClosed { feature, .. }
            | Self::MissingEdge { feature, .. }
            | Self::NotConvex { feature } => Some(*feature),
            Self::EulerCharacteristic { .. } => None,
        }
    }
}

/// Failures of the V-Clip engine and of contact derivation.
///
/// All of these indicate malformed input or a caller bug; none is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VClipError {
    /// The closest-feature walk did not terminate within the cap.
    #[error("V-Clip exceeded {max_iterations} iterations at ({first}, {second})")]
    IterationLimit {
        /// The configured cap.
        max_iterations: usize,
        /// Feature on the first polyhedron when the cap was hit.
        first: Feature,
        /// Feature on the second polyhedron when the cap was hit.
        second: Feature,
    },

    /// A polyhedron with no vertices cannot seed the walk.
    #[error("polyhedron has no vertices")]
    EmptyPolyhedron,

    /// A penetrating terminal state with a pairing other than vertex/face or edge/face.
    #[error("unexpected V-Clip result ({first}, {second})")]
    UnexpectedResult {
        /// Feature on the first polyhedron.
        first: Feature,
        /// Feature on the second polyhedron.
        second: Feature,
    },

    /// Input geometry failed validation.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
