//! Exact closest features between convex polyhedra.
//!
//! This crate implements the V-Clip (Voronoi-Clip) algorithm together with
//! the feature model it walks over:
//!
//! - [`Polyhedron`] - index-based vertices, edges and faces with lazy
//!   adjacency queries and a removal cascade
//! - [`VPlane`] - Voronoi-region boundaries between adjacent features
//! - [`clip_edge`] and [`deriv_check`] - the two sub-algorithms that drive
//!   edge transitions
//! - [`VClip`] - the closest-feature state machine
//! - [`derive_contact`] - contact point, normal and depth from a
//!   penetrating result
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          VClip                               │
//! │  V/V, V/E, V/F, E/E, E/F transitions, iteration cap         │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                clip_edge / deriv_check                       │
//! │  Interval clipping against VPlanes, distance derivative     │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Polyhedron / Feature / VPlane                 │
//! │  Arena + index storage, adjacency, Voronoi planes           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Queries are pure
//! functions of their inputs and may run concurrently on disjoint data.
//!
//! # Quick Start
//!
//! ```
//! use sim_vclip::{derive_contact, Polyhedron, VClip};
//! use sim_types::{BodyId, Pose};
//! use nalgebra::{Point3, Vector3};
//!
//! let table = Polyhedron::cuboid(Vector3::new(1.0, 1.0, 1.0));
//! let block = Polyhedron::cuboid(Vector3::new(0.5, 0.5, 0.5))
//!     .transformed(&Pose::from_position(Point3::new(0.0, 0.0, 1.3)));
//!
//! let result = VClip::default().closest_features(&table, &block)?;
//! assert!(result.is_penetrating());
//!
//! let contact = derive_contact(&table, BodyId::new(0), &block, BodyId::new(1), &result)?
//!     .ok_or(sim_vclip::VClipError::EmptyPolyhedron)?;
//! assert!((contact.penetration - 0.2).abs() < 1e-9);
//! assert!((contact.normal - Vector3::z()).norm() < 1e-9);
//! # Ok::<(), sim_vclip::VClipError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/sim-vclip/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::many_single_char_names,    // Geometry reads best with short names
)]

mod clip;
mod contact;
mod error;
mod feature;
pub mod geometry;
mod polyhedron;
mod validate;
mod vclip;
mod vplane;

pub use clip::{clip_edge, deriv_check, ClipOutcome, ClipResult};
pub use contact::derive_contact;
pub use error::{GeometryError, GeometryResult, VClipError};
pub use feature::{ConvexityHint, Edge, Face, Feature, Vertex};
pub use polyhedron::{Neighbors, Polyhedron};
pub use vclip::{VClip, VClipResult, VClipState, DEFAULT_MAX_ITERATIONS};
pub use vplane::{VPlane, VPlanes};

/// Tolerance for degenerate lengths and normals.
pub const GEOM_EPSILON: f64 = 1e-10;

/// Result type for V-Clip queries.
pub type Result<T> = std::result::Result<T, VClipError>;
