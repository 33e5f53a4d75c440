//! Collision shapes and the primitives handed to the contact generator.
//!
//! Shapes are stored in local coordinates. A [`Primitive`] attaches a shape
//! to a body at a world pose and maps it into world space on demand.

use nalgebra::{Point3, Vector3};
use sim_types::{BodyId, Pose};
use sim_vclip::{Polyhedron, GEOM_EPSILON};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounding::{Aabb, BoundingSphere};
use crate::error::{ContactError, Result};

/// Half-extent used to bound an infinite plane.
const PLANE_EXTENT: f64 = 1e6;

/// Shape kinds, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeType {
    /// [`CollisionShape::Sphere`].
    Sphere = 0,
    /// [`CollisionShape::Box`].
    Box = 1,
    /// [`CollisionShape::Plane`].
    Plane = 2,
    /// [`CollisionShape::ConvexPolyhedron`].
    ConvexPolyhedron = 3,
}

impl ShapeType {
    /// Number of shape kinds.
    pub const COUNT: usize = 4;

    /// Every shape kind, by ordinal.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Sphere,
        Self::Box,
        Self::Plane,
        Self::ConvexPolyhedron,
    ];

    /// Position in the registry.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Shape kind with the given ordinal.
    #[must_use]
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sphere => "Sphere",
            Self::Box => "Box",
            Self::Plane => "Plane",
            Self::ConvexPolyhedron => "ConvexPolyhedron",
        };
        f.write_str(name)
    }
}

/// Collision shape for contact detection, in local coordinates.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionShape {
    /// Sphere centred on the local origin.
    Sphere {
        /// Sphere radius in meters.
        radius: f64,
    },
    /// Box centred on the local origin.
    Box {
        /// Half-extents of the box in each axis.
        half_extents: Vector3<f64>,
    },
    /// Infinite two-sided plane `normal · x = offset`.
    Plane {
        /// Unit normal vector of the plane.
        normal: Vector3<f64>,
        /// Signed distance from the origin along the normal.
        offset: f64,
    },
    /// Closed convex polyhedron.
    ConvexPolyhedron(Polyhedron),
}

impl CollisionShape {
    /// Create a sphere collision shape.
    #[must_use]
    pub fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    /// Create a box collision shape.
    #[must_use]
    pub fn box_shape(half_extents: Vector3<f64>) -> Self {
        Self::Box { half_extents }
    }

    /// Create a ground plane (Z-up at given height).
    #[must_use]
    pub fn ground_plane(height: f64) -> Self {
        Self::Plane {
            normal: Vector3::z(),
            offset: height,
        }
    }

    /// Create a plane with custom normal and offset. The normal is normalised.
    ///
    /// # Errors
    ///
    /// [`ContactError::DegeneratePlaneNormal`] if `normal` is (near) zero or
    /// not finite.
    pub fn plane(normal: Vector3<f64>, offset: f64) -> Result<Self> {
        let unit = normal
            .try_normalize(GEOM_EPSILON)
            .filter(|n| n.iter().all(|c| c.is_finite()))
            .ok_or(ContactError::DegeneratePlaneNormal { normal })?;
        Ok(Self::Plane {
            normal: unit,
            offset,
        })
    }

    /// Wrap a convex polyhedron given in local coordinates.
    #[must_use]
    pub fn convex_polyhedron(polyhedron: Polyhedron) -> Self {
        Self::ConvexPolyhedron(polyhedron)
    }

    /// Kind of this shape.
    #[must_use]
    pub const fn shape_type(&self) -> ShapeType {
        match self {
            Self::Sphere { .. } => ShapeType::Sphere,
            Self::Box { .. } => ShapeType::Box,
            Self::Plane { .. } => ShapeType::Plane,
            Self::ConvexPolyhedron(_) => ShapeType::ConvexPolyhedron,
        }
    }

    /// Radius of a sphere about the local origin enclosing the shape.
    ///
    /// Infinite for planes.
    #[must_use]
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Self::Sphere { radius } => *radius,
            Self::Box { half_extents } => half_extents.norm(),
            Self::Plane { .. } => f64::INFINITY,
            Self::ConvexPolyhedron(poly) => poly
                .vertices()
                .iter()
                .map(|v| v.position.coords.norm())
                .fold(0.0, f64::max),
        }
    }
}

/// A shape attached to a body at a world pose.
#[derive(Debug, Clone)]
pub struct Primitive {
    /// Owning body.
    pub body: BodyId,
    /// World pose of the shape's local frame.
    pub pose: Pose,
    /// Shape in local coordinates.
    pub shape: CollisionShape,
}

impl Primitive {
    /// Attach `shape` to `body` at `pose`.
    #[must_use]
    pub const fn new(body: BodyId, pose: Pose, shape: CollisionShape) -> Self {
        Self { body, pose, shape }
    }

    /// Kind of the attached shape.
    #[must_use]
    pub const fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    /// World-space centre of the local frame.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.pose.position
    }

    /// World-space plane as `(unit normal, offset)`, for plane shapes.
    #[must_use]
    pub fn world_plane(&self) -> Option<(Vector3<f64>, f64)> {
        let CollisionShape::Plane { normal, offset } = &self.shape else {
            return None;
        };
        let normal = self.pose.transform_vector(normal);
        Some((normal, offset + normal.dot(&self.pose.position.coords)))
    }

    /// World-space polyhedron for boxes and convex polyhedra.
    #[must_use]
    pub fn world_polyhedron(&self) -> Option<Polyhedron> {
        match &self.shape {
            CollisionShape::Box { half_extents } => {
                Some(Polyhedron::cuboid(*half_extents).transformed(&self.pose))
            }
            CollisionShape::ConvexPolyhedron(poly) => Some(poly.transformed(&self.pose)),
            CollisionShape::Sphere { .. } | CollisionShape::Plane { .. } => None,
        }
    }

    /// World-space axis-aligned bounding box.
    ///
    /// Planes get a large but finite box, thin along the normal when the
    /// plane is axis-aligned.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        let center = self.pose.position;
        match &self.shape {
            CollisionShape::Sphere { radius } => {
                Aabb::from_center(center, Vector3::repeat(radius.max(0.0)))
            }
            CollisionShape::Box { half_extents } => {
                // Extent along each world axis of the rotated box.
                let rotation = self.pose.rotation_matrix().abs();
                Aabb::from_center(center, rotation * half_extents)
            }
            CollisionShape::Plane { .. } => self.plane_slab(),
            CollisionShape::ConvexPolyhedron(poly) => {
                let world: Vec<Point3<f64>> = poly
                    .vertices()
                    .iter()
                    .map(|v| self.pose.transform_point(&v.position))
                    .collect();
                Aabb::from_points(&world).unwrap_or_else(|| Aabb::new(center, center))
            }
        }
    }

    fn plane_slab(&self) -> Aabb {
        let Some((normal, offset)) = self.world_plane() else {
            return Aabb::new(self.pose.position, self.pose.position);
        };
        let point = Point3::from(normal * offset);
        let mut half = Vector3::repeat(PLANE_EXTENT);
        // Only an axis-aligned plane fits in a thin box.
        let axis = normal.iamax();
        if normal[axis].abs() > 1.0 - GEOM_EPSILON {
            half[axis] = 0.01;
        }
        Aabb::from_center(point, half)
    }

    /// World-space bounding sphere about the frame origin.
    ///
    /// Planes get a large sphere centred on the plane point nearest the
    /// world origin.
    #[must_use]
    pub fn bounding_sphere(&self) -> BoundingSphere {
        match self.world_plane() {
            Some((normal, offset)) => {
                BoundingSphere::new(Point3::from(normal * offset), PLANE_EXTENT)
            }
            None => BoundingSphere::new(self.pose.position, self.shape.bounding_radius()),
        }
    }
}
