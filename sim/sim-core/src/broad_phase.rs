//! Broad-phase collision detection.
//!
//! The broad phase narrows the O(n²) set of primitive pairs down to those
//! whose bounding boxes overlap. Every candidate still goes through the
//! contact generator, which discards the false positives.
//!
//! Two algorithms are provided:
//!
//! - [`BruteForce`] - checks every pair, useful for small scenes and as a
//!   reference
//! - [`BvhBroadPhase`] - keeps an incremental [`Bvh`] of enlarged boxes
//!   across calls, so slowly moving primitives are refitted rather than
//!   re-inserted
//!
//! # Example
//!
//! ```
//! use sim_core::broad_phase::{BroadPhase, BvhBroadPhase};
//! use sim_core::{CollisionShape, Primitive};
//! use sim_types::{BodyId, Pose};
//! use nalgebra::Point3;
//!
//! let primitives = vec![
//!     Primitive::new(
//!         BodyId::new(1),
//!         Pose::from_position(Point3::new(0.0, 0.0, 0.0)),
//!         CollisionShape::sphere(1.0),
//!     ),
//!     Primitive::new(
//!         BodyId::new(2),
//!         Pose::from_position(Point3::new(1.5, 0.0, 0.0)),
//!         CollisionShape::sphere(1.0),
//!     ),
//! ];
//!
//! let mut broad_phase = BvhBroadPhase::new();
//! let pairs = broad_phase.find_potential_pairs(&primitives);
//!
//! assert_eq!(pairs, vec![(BodyId::new(1), BodyId::new(2))]);
//! ```

use hashbrown::HashSet;
use sim_types::BodyId;
use tracing::{trace, warn};

use crate::bounding::{Aabb, BoundingVolume};
use crate::bvh::Bvh;
use crate::collision_shape::Primitive;

/// Trait for broad-phase collision detection algorithms.
pub trait BroadPhase {
    /// Find all pairs of primitives that potentially collide.
    ///
    /// Pairs are reported once each as `(lower id, higher id)`, sorted.
    /// The narrow phase should then check these pairs for actual collision.
    fn find_potential_pairs(&mut self, primitives: &[Primitive]) -> Vec<(BodyId, BodyId)>;
}

fn ordered(a: BodyId, b: BodyId) -> (BodyId, BodyId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Simple O(n²) brute-force broad phase for comparison and small scenes.
#[derive(Debug, Clone, Default)]
pub struct BruteForce {
    /// Margin for AABB expansion.
    margin: f64,
}

impl BruteForce {
    /// Create a new brute-force broad phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a predictive margin.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }
}

impl BroadPhase for BruteForce {
    fn find_potential_pairs(&mut self, primitives: &[Primitive]) -> Vec<(BodyId, BodyId)> {
        let boxes: Vec<Aabb> = primitives
            .iter()
            .map(|p| p.aabb().expanded(self.margin))
            .collect();

        let mut pairs = Vec::new();
        for (i, (a, box_a)) in primitives.iter().zip(&boxes).enumerate() {
            for (b, box_b) in primitives.iter().zip(&boxes).skip(i + 1) {
                if a.body != b.body && box_a.overlaps(box_b) {
                    pairs.push(ordered(a.body, b.body));
                }
            }
        }

        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

/// Incremental broad phase over a bounding volume hierarchy.
///
/// Each primitive is stored with its box enlarged by the margin. A primitive
/// whose tight box still fits inside its stored box costs nothing on the
/// next call; one that has moved out is refitted by the tree. Primitives
/// missing from a call are removed.
#[derive(Debug, Clone)]
pub struct BvhBroadPhase {
    tree: Bvh<Aabb>,
    margin: f64,
}

impl Default for BvhBroadPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl BvhBroadPhase {
    /// Create an empty BVH broad phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Bvh::new(),
            margin: 0.0,
        }
    }

    /// Create with a predictive margin.
    ///
    /// Larger margins mean fewer tree updates for moving primitives and more
    /// false positives.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// The underlying tree.
    #[must_use]
    pub fn tree(&self) -> &Bvh<Aabb> {
        &self.tree
    }

    /// Drop every stored primitive.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Bring the tree in line with `primitives`.
    ///
    /// The tree holds one box per body. A later primitive reusing an earlier
    /// one's body id is logged and left out.
    pub fn sync(&mut self, primitives: &[Primitive]) {
        let mut live = HashSet::with_capacity(primitives.len());
        let mut unique = Vec::with_capacity(primitives.len());
        for primitive in primitives {
            if live.insert(primitive.body) {
                unique.push(primitive);
            } else {
                warn!(body = %primitive.body, "duplicate body id in broad phase, ignoring");
            }
        }

        let stale: Vec<BodyId> = self.tree.ids().filter(|id| !live.contains(id)).collect();
        for id in stale {
            self.tree.remove(id);
        }

        for primitive in unique {
            let tight = primitive.aabb();
            match self.tree.volume(primitive.body) {
                Some(stored) if stored.contains(&tight) => {}
                Some(_) => {
                    self.tree.update(primitive.body, tight.expanded(self.margin));
                }
                None => {
                    self.tree.insert(primitive.body, tight.expanded(self.margin));
                }
            }
        }
        trace!(objects = self.tree.len(), height = self.tree.height(), "bvh broad phase sync");
    }
}

impl BroadPhase for BvhBroadPhase {
    fn find_potential_pairs(&mut self, primitives: &[Primitive]) -> Vec<(BodyId, BodyId)> {
        self.sync(primitives);

        let mut pairs = Vec::new();
        self.tree.generate_coarse_collisions(&mut pairs);
        pairs.sort_unstable();
        pairs
    }
}

/// Broad-phase algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadPhaseAlgorithm {
    /// Brute force below the threshold, BVH above it.
    #[default]
    Auto,
    /// Always use brute force O(n²).
    BruteForce,
    /// Always use the incremental BVH.
    Bvh,
}

/// Configuration for broad-phase collision detection.
#[derive(Debug, Clone)]
pub struct BroadPhaseConfig {
    /// Algorithm to use for broad-phase detection.
    pub algorithm: BroadPhaseAlgorithm,
    /// Margin to add to AABBs for predictive detection.
    pub margin: f64,
    /// Threshold primitive count below which brute force is used.
    pub brute_force_threshold: usize,
}

impl Default for BroadPhaseConfig {
    fn default() -> Self {
        Self {
            algorithm: BroadPhaseAlgorithm::Auto,
            margin: 0.0,
            brute_force_threshold: 32,
        }
    }
}

/// Broad phase that picks its algorithm from a [`BroadPhaseConfig`].
#[derive(Debug, Clone)]
pub struct BroadPhaseDetector {
    config: BroadPhaseConfig,
    bvh: BvhBroadPhase,
    brute: BruteForce,
}

impl Default for BroadPhaseDetector {
    fn default() -> Self {
        Self::new(BroadPhaseConfig::default())
    }
}

impl BroadPhaseDetector {
    /// Create a new broad-phase detector with the given configuration.
    #[must_use]
    pub fn new(config: BroadPhaseConfig) -> Self {
        Self {
            bvh: BvhBroadPhase::new().with_margin(config.margin),
            brute: BruteForce::new().with_margin(config.margin),
            config,
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &BroadPhaseConfig {
        &self.config
    }

    /// Update the configuration.
    pub fn set_config(&mut self, config: BroadPhaseConfig) {
        self.bvh = BvhBroadPhase::new().with_margin(config.margin);
        self.brute = BruteForce::new().with_margin(config.margin);
        self.config = config;
    }
}

impl BroadPhase for BroadPhaseDetector {
    fn find_potential_pairs(&mut self, primitives: &[Primitive]) -> Vec<(BodyId, BodyId)> {
        match self.config.algorithm {
            BroadPhaseAlgorithm::Auto => {
                if primitives.len() < self.config.brute_force_threshold {
                    self.brute.find_potential_pairs(primitives)
                } else {
                    self.bvh.find_potential_pairs(primitives)
                }
            }
            BroadPhaseAlgorithm::BruteForce => self.brute.find_potential_pairs(primitives),
            BroadPhaseAlgorithm::Bvh => self.bvh.find_potential_pairs(primitives),
        }
    }
}
