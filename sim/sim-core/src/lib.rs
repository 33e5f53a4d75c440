//! Collision pipeline: broad phase, contact dispatch and narrow phase.
//!
//! This crate turns a set of posed [`Primitive`]s into [`Contact`]s. It builds
//! on [`sim_types`] for the shared data and on [`sim_vclip`] for exact
//! convex-polyhedron queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Broad phase                            │
//! │  Incremental BVH (or brute force) over bounding volumes     │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │  candidate pairs
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ContactGenerator                          │
//! │  Registry keyed by shape-type pair, canonical ordering      │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Pair routines                                │
//! │  Closed form (sphere, box, plane) and V-Clip (polyhedra)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//!
//! - Headless training loops
//! - Hardware control code
//! - Analysis tools
//! - Other engines
//!
//! # Quick Start
//!
//! ```
//! use sim_core::broad_phase::{BroadPhase, BvhBroadPhase};
//! use sim_core::{CollisionShape, ContactGenerator, Primitive};
//! use sim_types::{BodyId, Pose};
//! use nalgebra::{Point3, Vector3};
//!
//! let primitives = vec![
//!     Primitive::new(BodyId::new(0), Pose::identity(), CollisionShape::ground_plane(0.0)),
//!     Primitive::new(
//!         BodyId::new(1),
//!         Pose::from_position(Point3::new(0.0, 0.0, 0.45)),
//!         CollisionShape::box_shape(Vector3::new(0.5, 0.5, 0.5)),
//!     ),
//! ];
//!
//! let mut broad_phase = BvhBroadPhase::new();
//! let generator = ContactGenerator::with_default_algorithms();
//!
//! let pairs = broad_phase.find_potential_pairs(&primitives);
//! let mut contacts = Vec::new();
//! generator.generate_for_pairs(&primitives, &pairs, &mut contacts)?;
//!
//! // One contact per box corner below the ground.
//! assert_eq!(contacts.len(), 4);
//! for contact in &contacts {
//!     assert_eq!(contact.body_a, BodyId::new(0));
//!     assert!((contact.penetration - 0.05).abs() < 1e-9);
//! }
//! # Ok::<(), sim_core::ContactError>(())
//! ```
//!
//! # Shape pairs
//!
//! | Pair | Routine |
//! |------|---------|
//! | Sphere / Sphere, Box, Plane | closed form |
//! | Sphere / Polyhedron | V-Clip against the centre point |
//! | Box / Plane, Plane / Polyhedron | vertex sweep |
//! | Box, Polyhedron / Box, Polyhedron | V-Clip |
//! | Plane / Plane | unregistered |

#![doc(html_root_url = "https://docs.rs/sim-core/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
)]

pub mod analytic;
pub mod bounding;
pub mod broad_phase;
pub mod bvh;
mod collision_shape;
mod dispatch;
mod error;
pub mod narrow;

pub use bounding::{Aabb, BoundingSphere, BoundingVolume};
pub use broad_phase::{
    BroadPhase, BroadPhaseAlgorithm, BroadPhaseConfig, BroadPhaseDetector, BruteForce,
    BvhBroadPhase,
};
pub use bvh::Bvh;
pub use collision_shape::{CollisionShape, Primitive, ShapeType};
pub use dispatch::{ContactAlgorithm, ContactGenerator};
pub use error::{ContactError, Result};

// Re-export key types from sim-types for convenience
pub use sim_types::{BodyId, CollisionConfig, Contact, Pose, SimError};
