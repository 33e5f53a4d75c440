//! Closed-form contact routines for spheres, boxes and planes.
//!
//! Every routine takes its primitives in registry order (lower shape ordinal
//! first) and reports contacts with `body_a` set to the first primitive's
//! body and the normal pointing from the first primitive toward the second.
//! A pair produces a contact when its penetration exceeds minus the contact
//! margin.
//!
//! Planes are two-sided: the side a shape's centre lies on decides which way
//! the plane pushes.

use nalgebra::{Point3, Vector3};
use sim_types::{CollisionConfig, Contact};
use sim_vclip::{Polyhedron, GEOM_EPSILON};

use crate::collision_shape::{CollisionShape, Primitive, ShapeType};
use crate::error::{ContactError, Result};

// =============================================================================
// Shape accessors
// =============================================================================

fn mismatch(expected: ShapeType, found: &Primitive) -> ContactError {
    ContactError::ShapeMismatch {
        expected,
        found: found.shape_type(),
    }
}

pub(crate) fn sphere_radius(p: &Primitive) -> Result<f64> {
    match &p.shape {
        CollisionShape::Sphere { radius } => Ok(*radius),
        _ => Err(mismatch(ShapeType::Sphere, p)),
    }
}

pub(crate) fn box_half_extents(p: &Primitive) -> Result<Vector3<f64>> {
    match &p.shape {
        CollisionShape::Box { half_extents } => Ok(*half_extents),
        _ => Err(mismatch(ShapeType::Box, p)),
    }
}

pub(crate) fn world_plane(p: &Primitive) -> Result<(Vector3<f64>, f64)> {
    p.world_plane().ok_or_else(|| mismatch(ShapeType::Plane, p))
}

pub(crate) fn world_polyhedron(p: &Primitive) -> Result<Polyhedron> {
    p.world_polyhedron()
        .ok_or_else(|| mismatch(ShapeType::ConvexPolyhedron, p))
}

/// `+1` on the side the normal points to (or on the plane), `-1` behind.
fn side(signed_distance: f64) -> f64 {
    if signed_distance >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

// =============================================================================
// Sphere pairs
// =============================================================================

/// Sphere-sphere collision.
///
/// The contact point sits midway through the overlap along the line of
/// centres. Coincident centres push along +Z.
pub fn sphere_sphere(
    a: &Primitive,
    b: &Primitive,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let radius1 = sphere_radius(a)?;
    let radius2 = sphere_radius(b)?;

    let diff = b.center() - a.center();
    let dist = diff.norm();
    let penetration = radius1 + radius2 - dist;

    if penetration > -config.contact_margin {
        let normal = if dist > GEOM_EPSILON {
            diff / dist
        } else {
            Vector3::z()
        };
        let point = a.center() + normal * (radius1 - penetration * 0.5);
        out.push(Contact::new(a.body, b.body, point, normal, penetration));
    }
    Ok(())
}

/// Sphere-box collision.
///
/// The sphere centre is clamped into the box frame to find the closest box
/// point, and the contact sits midway through the overlap. A centre inside
/// the box is pushed out through the nearest face.
pub fn sphere_box(
    a: &Primitive,
    b: &Primitive,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let radius = sphere_radius(a)?;
    let half = box_half_extents(b)?;

    let rotation = b.pose.rotation_matrix();
    let box_pos = b.center();
    let sphere_pos = a.center();
    let local_center = rotation.transpose() * (sphere_pos - box_pos);

    let closest_local = Vector3::new(
        local_center.x.clamp(-half.x, half.x),
        local_center.y.clamp(-half.y, half.y),
        local_center.z.clamp(-half.z, half.z),
    );
    let closest_world = box_pos + rotation * closest_local;

    let diff = sphere_pos - closest_world;
    let dist = diff.norm();

    // `outward` points from the box toward the sphere.
    let (outward, penetration, surface) = if dist > GEOM_EPSILON {
        (diff / dist, radius - dist, closest_world)
    } else {
        let mut min_pen = f64::MAX;
        let mut axis = 0;
        let mut sign = 1.0;
        for i in 0..3 {
            let pen_pos = half[i] - local_center[i];
            let pen_neg = half[i] + local_center[i];
            if pen_pos < min_pen {
                min_pen = pen_pos;
                axis = i;
                sign = 1.0;
            }
            if pen_neg < min_pen {
                min_pen = pen_neg;
                axis = i;
                sign = -1.0;
            }
        }
        let mut normal_local = Vector3::zeros();
        normal_local[axis] = sign;
        let mut surface_local = local_center;
        surface_local[axis] = sign * half[axis];
        (
            rotation * normal_local,
            radius + min_pen,
            box_pos + rotation * surface_local,
        )
    };

    if penetration > -config.contact_margin {
        let point = surface - outward * (penetration * 0.5);
        out.push(Contact::new(a.body, b.body, point, -outward, penetration));
    }
    Ok(())
}

/// Sphere-plane collision.
///
/// The contact point is the sphere centre projected onto the plane.
pub fn sphere_plane(
    a: &Primitive,
    b: &Primitive,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let radius = sphere_radius(a)?;
    let (normal, offset) = world_plane(b)?;

    let center = a.center();
    let center_dist = normal.dot(&center.coords) - offset;
    let penetration = radius - center_dist.abs();

    if penetration > -config.contact_margin {
        let point = center - normal * center_dist;
        out.push(Contact::new(
            a.body,
            b.body,
            point,
            -normal * side(center_dist),
            penetration,
        ));
    }
    Ok(())
}

// =============================================================================
// Vertex sweeps against a plane
// =============================================================================

/// One contact per vertex on the far side of the plane from `center`.
///
/// Contact points are the vertices projected onto the plane. `toward_plane`
/// selects the normal orientation: from the vertex set toward the plane, or
/// the reverse.
#[allow(clippy::too_many_arguments)]
fn sweep_vertices<'a>(
    vertices: impl Iterator<Item = &'a Point3<f64>>,
    center: &Point3<f64>,
    (normal, offset): (Vector3<f64>, f64),
    toward_plane: bool,
    first: &Primitive,
    second: &Primitive,
    margin: f64,
    out: &mut Vec<Contact>,
) {
    let facing = side(normal.dot(&center.coords) - offset);
    let contact_normal = if toward_plane {
        -normal * facing
    } else {
        normal * facing
    };

    for &vertex in vertices {
        let dist = normal.dot(&vertex.coords) - offset;
        let penetration = -facing * dist;
        if penetration > -margin {
            out.push(Contact::new(
                first.body,
                second.body,
                vertex - normal * dist,
                contact_normal,
                penetration,
            ));
        }
    }
}

/// Box-plane collision: one contact per corner through the plane.
pub fn box_plane(
    a: &Primitive,
    b: &Primitive,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let half = box_half_extents(a)?;
    let plane = world_plane(b)?;

    let corners: Vec<Point3<f64>> = Polyhedron::cuboid(half)
        .transformed(&a.pose)
        .vertices()
        .iter()
        .map(|v| v.position)
        .collect();

    sweep_vertices(
        corners.iter(),
        &a.center(),
        plane,
        true,
        a,
        b,
        config.contact_margin,
        out,
    );
    Ok(())
}

/// Plane-polyhedron collision: one contact per vertex through the plane.
pub fn plane_polyhedron(
    a: &Primitive,
    b: &Primitive,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let plane = world_plane(a)?;
    let poly = world_polyhedron(b)?;
    let Some(center) = poly.centroid() else {
        return Ok(());
    };

    sweep_vertices(
        poly.vertices().iter().map(|v| &v.position),
        &center,
        plane,
        false,
        a,
        b,
        config.contact_margin,
        out,
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use sim_types::{BodyId, Pose};
    use std::f64::consts::FRAC_PI_4;

    fn at(id: u64, position: Point3<f64>, shape: CollisionShape) -> Primitive {
        Primitive::new(BodyId::new(id), Pose::from_position(position), shape)
    }

    fn run(
        algorithm: fn(&Primitive, &Primitive, &CollisionConfig, &mut Vec<Contact>) -> Result<()>,
        a: &Primitive,
        b: &Primitive,
    ) -> Vec<Contact> {
        let mut out = Vec::new();
        algorithm(a, b, &CollisionConfig::default(), &mut out).unwrap();
        out
    }

    #[test]
    fn test_sphere_sphere_overlap() {
        let a = at(1, Point3::origin(), CollisionShape::sphere(1.0));
        let b = at(2, Point3::new(0.0, 1.8, 0.0), CollisionShape::sphere(1.0));
        let contacts = run(sphere_sphere, &a, &b);

        assert_eq!(contacts.len(), 1);
        let c = contacts[0];
        assert_eq!((c.body_a, c.body_b), (BodyId::new(1), BodyId::new(2)));
        assert_relative_eq!(c.penetration, 0.2, epsilon = 1e-12);
        assert_relative_eq!(c.point, Point3::new(0.0, 0.9, 0.0), epsilon = 1e-12);
        assert_relative_eq!(c.normal, Vector3::y());
    }

    #[test]
    fn test_sphere_sphere_separated() {
        let a = at(1, Point3::origin(), CollisionShape::sphere(1.0));
        let b = at(2, Point3::new(3.0, 0.0, 0.0), CollisionShape::sphere(1.0));
        assert!(run(sphere_sphere, &a, &b).is_empty());
    }

    #[test]
    fn test_sphere_sphere_margin() {
        let a = at(1, Point3::origin(), CollisionShape::sphere(1.0));
        let b = at(2, Point3::new(2.05, 0.0, 0.0), CollisionShape::sphere(1.0));
        let mut out = Vec::new();
        let config = CollisionConfig::default().with_contact_margin(0.1);
        sphere_sphere(&a, &b, &config, &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].penetration, 0.0);
    }

    #[test]
    fn test_sphere_sphere_coincident() {
        let a = at(1, Point3::origin(), CollisionShape::sphere(1.0));
        let b = at(2, Point3::origin(), CollisionShape::sphere(0.5));
        let c = run(sphere_sphere, &a, &b)[0];
        assert_relative_eq!(c.normal, Vector3::z());
        assert_relative_eq!(c.penetration, 1.5);
    }

    #[test]
    fn test_sphere_plane_below() {
        let a = at(1, Point3::new(0.0, 5.0, 0.0), CollisionShape::sphere(1.0));
        let b = at(2, Point3::origin(), CollisionShape::plane(Vector3::y(), 5.5).unwrap());
        let contacts = run(sphere_plane, &a, &b);

        assert_eq!(contacts.len(), 1);
        let c = contacts[0];
        assert_relative_eq!(c.point, Point3::new(0.0, 5.5, 0.0));
        assert_relative_eq!(c.normal, Vector3::y());
        assert_relative_eq!(c.penetration, 0.5);
    }

    #[test]
    fn test_sphere_plane_above() {
        let a = at(1, Point3::new(0.0, 0.0, 0.7), CollisionShape::sphere(1.0));
        let b = at(2, Point3::origin(), CollisionShape::ground_plane(0.0));
        let c = run(sphere_plane, &a, &b)[0];
        assert_relative_eq!(c.normal, -Vector3::z());
        assert_relative_eq!(c.penetration, 0.3, epsilon = 1e-12);
        assert_relative_eq!(c.point, Point3::origin());
    }

    #[test]
    fn test_sphere_box_face() {
        let a = at(1, Point3::new(0.0, 0.0, 1.4), CollisionShape::sphere(0.5));
        let b = at(2, Point3::origin(), CollisionShape::box_shape(Vector3::repeat(1.0)));
        let c = run(sphere_box, &a, &b)[0];
        assert_relative_eq!(c.normal, -Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(c.penetration, 0.1, epsilon = 1e-12);
        assert_relative_eq!(c.point, Point3::new(0.0, 0.0, 0.95), epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_box_centre_inside() {
        let a = at(1, Point3::new(0.8, 0.0, 0.0), CollisionShape::sphere(0.5));
        let b = at(2, Point3::origin(), CollisionShape::box_shape(Vector3::repeat(1.0)));
        let c = run(sphere_box, &a, &b)[0];
        assert_relative_eq!(c.normal, -Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(c.penetration, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_box_corner_miss() {
        let a = at(1, Point3::new(1.5, 1.5, 1.5), CollisionShape::sphere(0.5));
        let b = at(2, Point3::origin(), CollisionShape::box_shape(Vector3::repeat(1.0)));
        assert!(run(sphere_box, &a, &b).is_empty());
    }

    #[test]
    fn test_box_plane_resting_face() {
        let a = at(1, Point3::new(0.0, 0.0, 0.45), CollisionShape::box_shape(Vector3::repeat(0.5)));
        let b = at(2, Point3::origin(), CollisionShape::ground_plane(0.0));
        let contacts = run(box_plane, &a, &b);

        assert_eq!(contacts.len(), 4);
        for c in &contacts {
            assert_relative_eq!(c.normal, -Vector3::z());
            assert_relative_eq!(c.penetration, 0.05, epsilon = 1e-12);
            assert_relative_eq!(c.point.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_box_plane_tilted_corner() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_4);
        let a = Primitive::new(
            BodyId::new(1),
            Pose::from_position_rotation(Point3::new(0.0, 0.0, 0.6), rotation),
            CollisionShape::box_shape(Vector3::repeat(0.5)),
        );
        let b = at(2, Point3::origin(), CollisionShape::ground_plane(0.0));
        let contacts = run(box_plane, &a, &b);

        // The lowest edge (two corners) dips 0.5 * sqrt(2) - 0.6 below.
        assert_eq!(contacts.len(), 2);
        let expected = 0.5 * 2.0_f64.sqrt() - 0.6;
        for c in &contacts {
            assert_relative_eq!(c.penetration, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_plane_polyhedron_pushes_toward_polyhedron() {
        let a = at(1, Point3::origin(), CollisionShape::ground_plane(0.0));
        let b = at(
            2,
            Point3::new(0.0, 0.0, -0.9),
            CollisionShape::convex_polyhedron(Polyhedron::cuboid(Vector3::repeat(1.0))),
        );
        let contacts = run(plane_polyhedron, &a, &b);

        // Centroid below the plane: the top four vertices poke through.
        assert_eq!(contacts.len(), 4);
        for c in &contacts {
            assert_relative_eq!(c.normal, -Vector3::z());
            assert_relative_eq!(c.penetration, 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_wrong_shape_is_reported() {
        let a = at(1, Point3::origin(), CollisionShape::box_shape(Vector3::repeat(1.0)));
        let b = at(2, Point3::origin(), CollisionShape::sphere(1.0));
        let err = sphere_sphere(&a, &b, &CollisionConfig::default(), &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            ContactError::ShapeMismatch {
                expected: ShapeType::Sphere,
                found: ShapeType::Box,
            }
        );
    }
}
