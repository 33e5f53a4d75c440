//! Contact-generator registry.
//!
//! [`ContactGenerator`] maps an unordered pair of [`ShapeType`]s to the
//! routine that handles it. Routines are stored once per pair under the
//! canonical order (lower ordinal first) and always receive their primitives
//! in that order. The generator reorders the caller's primitives to match
//! and flips the resulting contacts back, so callers see `body_a` equal to
//! their first argument regardless of how the pair was registered.
//!
//! # Example
//!
//! ```
//! use sim_core::{CollisionShape, ContactGenerator, Primitive};
//! use sim_types::{BodyId, Pose};
//! use nalgebra::Point3;
//!
//! let generator = ContactGenerator::with_default_algorithms();
//! let ball = Primitive::new(
//!     BodyId::new(7),
//!     Pose::from_position(Point3::new(0.0, 5.5, 0.0)),
//!     CollisionShape::sphere(1.0),
//! );
//! let ground = Primitive::new(
//!     BodyId::new(3),
//!     Pose::from_position(Point3::new(0.0, 5.0, 0.0)),
//!     CollisionShape::plane(nalgebra::Vector3::y(), 0.0)?,
//! );
//!
//! let mut contacts = Vec::new();
//! generator.generate_contacts(&ball, &ground, &mut contacts)?;
//!
//! assert_eq!(contacts.len(), 1);
//! assert_eq!(contacts[0].body_a, BodyId::new(7));
//! assert!((contacts[0].penetration - 0.5).abs() < 1e-12);
//! # Ok::<(), sim_core::ContactError>(())
//! ```

use sim_types::{BodyId, CollisionConfig, Contact};
use tracing::debug;

use crate::analytic;
use crate::collision_shape::{Primitive, ShapeType};
use crate::error::{ContactError, Result};
use crate::narrow;

/// A pair routine.
///
/// Receives the primitives in canonical order and appends contacts with
/// `body_a` set to the first primitive's body and the normal pointing from
/// the first toward the second.
pub type ContactAlgorithm =
    fn(&Primitive, &Primitive, &CollisionConfig, &mut Vec<Contact>) -> Result<()>;

/// Registry of pair routines keyed by shape type.
#[derive(Debug, Clone)]
pub struct ContactGenerator {
    algorithms: [[Option<ContactAlgorithm>; ShapeType::COUNT]; ShapeType::COUNT],
    config: CollisionConfig,
}

impl Default for ContactGenerator {
    fn default() -> Self {
        Self::with_default_algorithms()
    }
}

impl ContactGenerator {
    /// An empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithms: [[None; ShapeType::COUNT]; ShapeType::COUNT],
            config: CollisionConfig::default(),
        }
    }

    /// A registry holding the built-in routine for every supported pair.
    ///
    /// Plane-plane is left unregistered.
    #[must_use]
    pub fn with_default_algorithms() -> Self {
        use ShapeType::{Box, ConvexPolyhedron, Plane, Sphere};

        let mut generator = Self::new();
        generator.register(Sphere, Sphere, analytic::sphere_sphere);
        generator.register(Sphere, Box, analytic::sphere_box);
        generator.register(Sphere, Plane, analytic::sphere_plane);
        generator.register(Sphere, ConvexPolyhedron, narrow::sphere_polyhedron);
        generator.register(Box, Box, narrow::convex_convex);
        generator.register(Box, Plane, analytic::box_plane);
        generator.register(Box, ConvexPolyhedron, narrow::convex_convex);
        generator.register(Plane, ConvexPolyhedron, analytic::plane_polyhedron);
        generator.register(ConvexPolyhedron, ConvexPolyhedron, narrow::convex_convex);
        generator
    }

    /// The default registry running under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Config`] if `config` fails validation.
    pub fn from_config(config: CollisionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_default_algorithms().with_config(config))
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CollisionConfig) -> Self {
        self.config = config;
        self
    }

    /// Configuration handed to every routine.
    #[must_use]
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Register `algorithm` for a pair, replacing any previous entry.
    ///
    /// The pair is stored in canonical order; `algorithm` must expect the
    /// lower-ordinal shape first.
    pub fn register(&mut self, first: ShapeType, second: ShapeType, algorithm: ContactAlgorithm) {
        let (lo, hi) = canonical(first, second);
        debug!(first = %lo, second = %hi, "registered contact algorithm");
        self.algorithms[lo.ordinal()][hi.ordinal()] = Some(algorithm);
    }

    /// Remove the routine for a pair. Returns whether one was registered.
    pub fn unregister(&mut self, first: ShapeType, second: ShapeType) -> bool {
        let (lo, hi) = canonical(first, second);
        self.algorithms[lo.ordinal()][hi.ordinal()].take().is_some()
    }

    /// Whether a routine handles this pair, in either order.
    #[must_use]
    pub fn is_registered(&self, first: ShapeType, second: ShapeType) -> bool {
        let (lo, hi) = canonical(first, second);
        self.algorithms[lo.ordinal()][hi.ordinal()].is_some()
    }

    /// Look up the routine for a pair of shape ordinals, in either order.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::ShapeTypeOutOfRange`] if either ordinal is
    /// outside the registry and [`ContactError::UnregisteredPair`] if no
    /// routine handles the pair.
    pub fn algorithm(&self, first: usize, second: usize) -> Result<ContactAlgorithm> {
        let first = shape_type(first)?;
        let second = shape_type(second)?;
        let (lo, hi) = canonical(first, second);
        self.algorithms[lo.ordinal()][hi.ordinal()]
            .ok_or(ContactError::UnregisteredPair { first: lo, second: hi })
    }

    /// Generate contacts between two primitives, appending them to `out`.
    ///
    /// Appended contacts have `body_a == a.body` and normals pointing from
    /// `a` toward `b`. Returns the number of contacts appended. Contacts
    /// already in `out` are left alone.
    ///
    /// # Errors
    ///
    /// Registry errors for unsupported pairs, and any failure of the pair
    /// routine itself (for example the V-Clip iteration cap). Nothing is
    /// appended on error.
    pub fn generate_contacts(
        &self,
        a: &Primitive,
        b: &Primitive,
        out: &mut Vec<Contact>,
    ) -> Result<usize> {
        let algorithm = self.algorithm(a.shape_type().ordinal(), b.shape_type().ordinal())?;
        let swap = (a.shape_type(), a.body) > (b.shape_type(), b.body);
        let (first, second) = if swap { (b, a) } else { (a, b) };

        let start = out.len();
        if let Err(err) = algorithm(first, second, &self.config, out) {
            out.truncate(start);
            return Err(err);
        }
        if swap {
            for contact in &mut out[start..] {
                *contact = contact.flipped();
            }
        }
        Ok(out.len() - start)
    }

    /// Generate contacts for every candidate pair, appending them to `out`.
    ///
    /// Pairs are looked up in `primitives` by body id. Unknown ids are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first failing pair. Contacts from earlier pairs stay in
    /// `out`.
    pub fn generate_for_pairs(
        &self,
        primitives: &[Primitive],
        pairs: &[(BodyId, BodyId)],
        out: &mut Vec<Contact>,
    ) -> Result<usize> {
        let start = out.len();
        for &(id_a, id_b) in pairs {
            let a = primitives.iter().find(|p| p.body == id_a);
            let b = primitives.iter().find(|p| p.body == id_b);
            if let (Some(a), Some(b)) = (a, b) {
                self.generate_contacts(a, b, out)?;
            }
        }
        Ok(out.len() - start)
    }
}

fn canonical(first: ShapeType, second: ShapeType) -> (ShapeType, ShapeType) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

fn shape_type(ordinal: usize) -> Result<ShapeType> {
    ShapeType::from_ordinal(ordinal).ok_or(ContactError::ShapeTypeOutOfRange {
        ordinal,
        count: ShapeType::COUNT,
    })
}
