//! Contact records handed to the constraint solver.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BodyId;

/// A single contact between two bodies.
///
/// The normal is a unit vector in world space pointing from `body_a` toward
/// `body_b`. Penetration is non-negative; zero means touching.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contact {
    /// First body of the pair.
    pub body_a: BodyId,
    /// Second body of the pair.
    pub body_b: BodyId,
    /// Contact point in world coordinates.
    pub point: Point3<f64>,
    /// Unit contact normal, from `body_a` toward `body_b`.
    pub normal: Vector3<f64>,
    /// Penetration depth (non-negative).
    pub penetration: f64,
}

impl Contact {
    /// Create a contact, clamping a negative penetration to zero.
    #[must_use]
    pub fn new(
        body_a: BodyId,
        body_b: BodyId,
        point: Point3<f64>,
        normal: Vector3<f64>,
        penetration: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            point,
            normal,
            penetration: penetration.max(0.0),
        }
    }

    /// The same contact seen from the other body: bodies swapped, normal negated.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            body_a: self.body_b,
            body_b: self.body_a,
            point: self.point,
            normal: -self.normal,
            penetration: self.penetration,
        }
    }

    /// Check if the contact contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.point.coords.iter().all(|x| x.is_finite())
            && self.normal.iter().all(|x| x.is_finite())
            && self.penetration.is_finite()
    }
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Contact({} -> {}, point=({:.6}, {:.6}, {:.6}), normal=({:.6}, {:.6}, {:.6}), penetration={:.6})",
            self.body_a,
            self.body_b,
            self.point.x,
            self.point.y,
            self.point.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.penetration
        )
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_flipped_swaps_bodies_and_negates_normal() {
        let c = Contact::new(
            BodyId(1),
            BodyId(2),
            Point3::new(0.0, 0.9, 0.0),
            Vector3::y(),
            0.2,
        );
        let f = c.flipped();
        assert_eq!(f.body_a, BodyId(2));
        assert_eq!(f.body_b, BodyId(1));
        assert_eq!(f.normal, -Vector3::y());
        assert_eq!(f.flipped(), c);
    }

    #[test]
    fn test_negative_penetration_is_clamped() {
        let c = Contact::new(BodyId(0), BodyId(1), Point3::origin(), Vector3::x(), -0.5);
        assert_eq!(c.penetration, 0.0);
        assert!(c.is_finite());
    }

    #[test]
    fn test_display_is_stable() {
        let c = Contact::new(BodyId(0), BodyId(1), Point3::new(0.0, 5.5, 0.0), Vector3::y(), 0.5);
        assert_eq!(
            c.to_string(),
            "Contact(Body(0) -> Body(1), point=(0.000000, 5.500000, 0.000000), \
             normal=(0.000000, 1.000000, 0.000000), penetration=0.500000)"
        );
    }
}
