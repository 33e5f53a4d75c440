//! Shared types for collision detection.
//!
//! This crate provides the vocabulary exchanged between the collision
//! subsystem and its neighbours:
//!
//! - [`BodyId`] and [`Pose`] - what the dynamics layer hands to collision
//! - [`Contact`] - what collision hands to the constraint solver
//! - [`CollisionConfig`] - iteration caps and margins for the narrow phase
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no collision behaviour of their
//! own; `sim-vclip` and `sim-core` build on them.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Example
//!
//! ```
//! use sim_types::{BodyId, Contact, Pose};
//! use nalgebra::{Point3, Vector3};
//!
//! let pose = Pose::from_position(Point3::new(0.0, 1.8, 0.0));
//! let contact = Contact::new(
//!     BodyId::new(0),
//!     BodyId::new(1),
//!     Point3::new(0.0, 0.9, 0.0),
//!     Vector3::y(),
//!     0.2,
//! );
//!
//! assert_eq!(pose.position.y, 1.8);
//! assert_eq!(contact.flipped().normal, -Vector3::y());
//! ```

#![doc(html_root_url = "https://docs.rs/sim-types/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod body;
mod config;
mod contact;
mod error;

pub use body::{BodyId, Pose};
pub use config::CollisionConfig;
pub use contact::Contact;
pub use error::SimError;

// Re-export math types for convenience
pub use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

/// Result type for shared collision operations.
pub type Result<T> = std::result::Result<T, SimError>;
