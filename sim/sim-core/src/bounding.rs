//! Bounding volumes for the broad phase.
//!
//! Two volume kinds are provided, both implementing [`BoundingVolume`]:
//!
//! - [`Aabb`] - axis-aligned box; unions are exact, which keeps BVH refits
//!   bit-for-bit reproducible
//! - [`BoundingSphere`] - centre and radius; cheapest overlap test
//!
//! # Example
//!
//! ```
//! use sim_core::bounding::{Aabb, BoundingVolume};
//! use nalgebra::{Point3, Vector3};
//!
//! let a = Aabb::from_center(Point3::origin(), Vector3::new(1.0, 1.0, 1.0));
//! let b = Aabb::from_center(Point3::new(1.5, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
//!
//! assert!(a.overlaps(&b));
//! assert!(a.union(&b).contains(&b));
//! ```

use std::f64::consts::PI;
use std::fmt::Debug;

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A volume the BVH can store, merge and test for overlap.
pub trait BoundingVolume: Clone + PartialEq + Debug {
    /// Smallest volume of this kind enclosing both `self` and `other`.
    #[must_use]
    fn union(&self, other: &Self) -> Self;

    /// Whether the two volumes touch or intersect.
    fn overlaps(&self, other: &Self) -> bool;

    /// Whether `other` lies entirely inside `self`.
    fn contains(&self, other: &Self) -> bool;

    /// Scalar size used to decide which side of a node pair to split.
    fn size(&self) -> f64;

    /// Cost of enlarging `self` to also enclose `other`.
    ///
    /// Insertion descends into the child with the smaller growth.
    fn growth(&self, other: &Self) -> f64;
}

// =============================================================================
// Axis-aligned box
// =============================================================================

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a new AABB from minimum and maximum corners.
    #[must_use]
    pub const fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with the given half-extents.
    #[must_use]
    pub fn from_center(center: Point3<f64>, half_extents: Vector3<f64>) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Tightest box around a set of points, or `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |aabb, p| Self {
            min: aabb.min.inf(p),
            max: aabb.max.sup(p),
        }))
    }

    /// Expand this AABB by a margin on all sides.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vector3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half the edge length along each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vector3<f64> {
        (self.max - self.min) * 0.5
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}

impl BoundingVolume for Aabb {
    fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
            && self.max.z >= other.max.z
    }

    /// Enclosed volume.
    fn size(&self) -> f64 {
        let d = self.max - self.min;
        d.x * d.y * d.z
    }

    /// Increase in surface area.
    fn growth(&self, other: &Self) -> f64 {
        self.union(other).surface_area() - self.surface_area()
    }
}

// =============================================================================
// Sphere
// =============================================================================

/// Relative outward padding applied by [`BoundingSphere::union`].
const UNION_SLACK: f64 = 8.0 * f64::EPSILON;

/// A bounding sphere.
///
/// A negative radius is clamped to zero on construction, so a degenerate
/// input still yields a valid point-sized volume.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingSphere {
    center: Point3<f64>,
    radius: f64,
}

impl BoundingSphere {
    /// Create a sphere. Negative (and `NaN`) radii become zero.
    #[must_use]
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Centre of the sphere.
    #[must_use]
    pub const fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Radius, never negative.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Box enclosing the sphere.
    #[must_use]
    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_center(self.center, Vector3::repeat(self.radius))
    }
}

impl BoundingVolume for BoundingSphere {
    /// Enclosing sphere, padded outward by a few ulps of the sphere's scale.
    ///
    /// The radius is measured from the rounded centre to the far side of each
    /// input, so the result encloses both under floating-point overlap and
    /// containment tests. A parent never rejects a pair its leaves accept.
    fn union(&self, other: &Self) -> Self {
        let offset = other.center - self.center;
        let distance = offset.norm();

        let center = if distance + other.radius <= self.radius {
            self.center
        } else if distance + self.radius <= other.radius {
            other.center
        } else {
            // Neither encloses the other, so the centres are distinct.
            let shift = (distance + other.radius - self.radius) * 0.5;
            self.center + offset * (shift / distance)
        };

        let reach = ((self.center - center).norm() + self.radius)
            .max((other.center - center).norm() + other.radius);
        let scale = reach + center.coords.amax();
        Self {
            center,
            radius: reach + UNION_SLACK * scale,
        }
    }

    fn overlaps(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        (other.center - self.center).norm_squared() <= reach * reach
    }

    fn contains(&self, other: &Self) -> bool {
        (other.center - self.center).norm() + other.radius <= self.radius
    }

    fn size(&self) -> f64 {
        4.0 / 3.0 * PI * self.radius * self.radius * self.radius
    }

    /// Increase in squared radius, which tracks surface area.
    fn growth(&self, other: &Self) -> f64 {
        let merged = self.union(other);
        merged.radius * merged.radius - self.radius * self.radius
    }
}
