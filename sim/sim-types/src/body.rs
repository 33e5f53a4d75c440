//! Body references consumed by the collision layer.
//!
//! The dynamics layer owns bodies; collision only needs a stable identifier
//! and the body's world transform to map primitive-local geometry into world
//! space.

use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identifier for a rigid body in the simulation.
///
/// Ordered so that collision pairs can be canonicalized as `(low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyId(pub u64);

impl BodyId {
    /// Create a new body ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for BodyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// World transform of a rigid body.
///
/// A position plus a unit quaternion. Collision code maps local shape
/// geometry (sphere offsets, box corners, polyhedron vertices, plane normals)
/// through this before running any narrow-phase routine.
///
/// # Example
///
/// ```
/// use sim_types::Pose;
/// use nalgebra::Point3;
///
/// let pose = Pose::from_position(Point3::new(1.0, 2.0, 3.0));
/// let world = pose.transform_point(&Point3::new(1.0, 0.0, 0.0));
/// assert_eq!(world, Point3::new(2.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// Position in world coordinates.
    pub position: Point3<f64>,
    /// Orientation as a unit quaternion.
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Create an identity pose (origin, no rotation).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pose from position only (identity rotation).
    #[must_use]
    pub fn from_position(position: Point3<f64>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Create a pose from position and rotation.
    #[must_use]
    pub const fn from_position_rotation(
        position: Point3<f64>,
        rotation: UnitQuaternion<f64>,
    ) -> Self {
        Self { position, rotation }
    }

    /// Create a pose from an isometry.
    #[must_use]
    pub fn from_isometry(iso: Isometry3<f64>) -> Self {
        Self {
            position: Point3::from(iso.translation.vector),
            rotation: iso.rotation,
        }
    }

    /// Convert to an isometry.
    #[must_use]
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(self.position.coords.into(), self.rotation)
    }

    /// Rotation part as a 3x3 matrix.
    #[must_use]
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        *self.rotation.to_rotation_matrix().matrix()
    }

    /// Full world transform as a homogeneous 4x4 matrix.
    #[must_use]
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        self.to_isometry().to_homogeneous()
    }

    /// Transform a point from local to world coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.position + self.rotation * local.coords
    }

    /// Transform a vector from local to world coordinates (rotation only).
    #[must_use]
    pub fn transform_vector(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * local
    }

    /// Transform a point from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, world: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation.inverse() * (world - self.position))
    }

    /// Transform a vector from world to local coordinates.
    #[must_use]
    pub fn inverse_transform_vector(&self, world: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse() * world
    }

    /// Compute the inverse pose.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();
        Self {
            position: Point3::from(-(inv_rotation * self.position.coords)),
            rotation: inv_rotation,
        }
    }

    /// Compose two poses: self * other.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            position: self.transform_point(&other.position),
            rotation: self.rotation * other.rotation,
        }
    }

    /// Check if the pose contains `NaN` or `Inf` values.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|x| x.is_finite())
            && self.rotation.coords.iter().all(|x| x.is_finite())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_body_ids_order_by_raw_value() {
        let mut ids = vec![BodyId::new(7), BodyId::new(2), BodyId::from(5)];
        ids.sort();
        assert_eq!(ids, vec![BodyId(2), BodyId(5), BodyId(7)]);
        assert_eq!(BodyId::new(3).to_string(), "Body(3)");
    }

    #[test]
    fn test_pose_roundtrips_points_through_inverse() {
        let pose = Pose::from_position_rotation(
            Point3::new(1.0, -2.0, 0.5),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let local = Point3::new(1.0, 0.0, 0.0);
        let world = pose.transform_point(&local);
        assert_relative_eq!(world, Point3::new(1.0, -1.0, 0.5), epsilon = 1e-12);
        assert_relative_eq!(pose.inverse_transform_point(&world), local, epsilon = 1e-12);
        assert_relative_eq!(
            pose.inverse().transform_point(&world),
            local,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_homogeneous_matrix_matches_point_transform() {
        let pose = Pose::from_position_rotation(
            Point3::new(0.0, 3.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3),
        );
        let local = Point3::new(0.2, 0.4, -1.0);
        let h = pose.to_homogeneous() * local.to_homogeneous();
        let via_matrix = Point3::from_homogeneous(h).unwrap();
        assert_relative_eq!(via_matrix, pose.transform_point(&local), epsilon = 1e-12);
        assert_relative_eq!(
            pose.rotation_matrix() * local.coords,
            pose.transform_vector(&local.coords),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_compose_applies_right_then_left() {
        let a = Pose::from_position(Point3::new(1.0, 0.0, 0.0));
        let b = Pose::from_position(Point3::new(0.0, 2.0, 0.0));
        let ab = a.compose(&b);
        assert_eq!(ab.position, Point3::new(1.0, 2.0, 0.0));
        assert!(ab.is_finite());
    }
}
