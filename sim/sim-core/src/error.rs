//! Error types for contact generation.

use nalgebra::Vector3;
use sim_types::SimError;
use sim_vclip::VClipError;
use thiserror::Error;

use crate::collision_shape::ShapeType;

/// Result type for contact generation.
pub type Result<T> = std::result::Result<T, ContactError>;

/// Contact generation failures.
///
/// The registry variants are configuration mistakes, not data problems, and
/// are never retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContactError {
    /// No algorithm is registered for this shape pair.
    #[error("no contact algorithm registered for {first} vs {second}")]
    UnregisteredPair {
        /// Lower-ordinal shape kind.
        first: ShapeType,
        /// Higher-ordinal shape kind.
        second: ShapeType,
    },

    /// A shape ordinal outside the registry.
    #[error("shape type ordinal {ordinal} out of range (registry holds {count})")]
    ShapeTypeOutOfRange {
        /// The offending ordinal.
        ordinal: usize,
        /// Number of shape kinds the registry covers.
        count: usize,
    },

    /// An algorithm was handed a primitive of the wrong kind.
    #[error("expected a {expected} primitive, got {found}")]
    ShapeMismatch {
        /// Kind the algorithm handles.
        expected: ShapeType,
        /// Kind it was given.
        found: ShapeType,
    },

    /// A plane was given a normal too short to normalise.
    #[error("plane normal [{}, {}, {}] has no direction", normal.x, normal.y, normal.z)]
    DegeneratePlaneNormal {
        /// The rejected normal.
        normal: Vector3<f64>,
    },

    /// The exact polyhedron query failed.
    #[error("V-Clip query failed: {0}")]
    VClip(#[from] VClipError),

    /// The collision configuration was rejected.
    #[error(transparent)]
    Config(#[from] SimError),
}

impl ContactError {
    /// Whether this error reports a registry or configuration mistake.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnregisteredPair { .. }
                | Self::ShapeTypeOutOfRange { .. }
                | Self::ShapeMismatch { .. }
                | Self::Config(_)
        )
    }
}
