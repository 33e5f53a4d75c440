//! Exact contact routines built on the V-Clip closest-feature walk.
//!
//! Boxes and convex polyhedra are mapped to world space and handed to
//! [`VClip`]. A penetrating result becomes a contact through
//! [`derive_contact`]; a separated result within the contact margin becomes
//! a zero-depth contact along the closest-point segment.
//!
//! Spheres are treated as a single-vertex polyhedron at the centre, with the
//! radius subtracted from the distance afterwards.

use nalgebra::Vector3;
use sim_types::{BodyId, CollisionConfig, Contact};
use sim_vclip::{derive_contact, Feature, Polyhedron, VClip, VClipError, VClipState, GEOM_EPSILON};
use tracing::trace;

use crate::analytic::{sphere_radius, world_polyhedron};
use crate::collision_shape::Primitive;
use crate::error::Result;

/// Contact between two world-space polyhedra.
fn polyhedron_contact(
    a: &Polyhedron,
    body_a: BodyId,
    b: &Polyhedron,
    body_b: BodyId,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let result = VClip::from_config(config).closest_features(a, b)?;
    trace!(%body_a, %body_b, %result, "narrow phase");

    match result.state {
        VClipState::Penetration { .. } => {
            out.extend(derive_contact(a, body_a, b, body_b, &result)?);
        }
        VClipState::Done => {
            if result.distance < config.contact_margin {
                if let Some((p, q)) = result.closest_points {
                    let normal = if result.distance > GEOM_EPSILON {
                        (q - p) / result.distance
                    } else {
                        Vector3::z()
                    };
                    let point = nalgebra::center(&p, &q);
                    out.push(Contact::new(body_a, body_b, point, normal, -result.distance));
                }
            }
        }
        VClipState::Continue => {}
    }
    Ok(())
}

/// Box-box, box-polyhedron and polyhedron-polyhedron collision.
pub fn convex_convex(
    a: &Primitive,
    b: &Primitive,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let poly_a = world_polyhedron(a)?;
    let poly_b = world_polyhedron(b)?;
    polyhedron_contact(&poly_a, a.body, &poly_b, b.body, config, out)
}

/// Sphere-box and sphere-polyhedron collision through V-Clip.
///
/// The centre is walked against the polyhedron as a point. The contact sits
/// midway through the overlap. A centre inside the polyhedron is pushed out
/// through the face V-Clip reports.
pub fn sphere_polyhedron(
    a: &Primitive,
    b: &Primitive,
    config: &CollisionConfig,
    out: &mut Vec<Contact>,
) -> Result<()> {
    let radius = sphere_radius(a)?;
    let center = a.center();
    let poly = world_polyhedron(b)?;

    let result = VClip::from_config(config).closest_features(&Polyhedron::point(center), &poly)?;
    trace!(body_a = %a.body, body_b = %b.body, %result, "narrow phase");

    match result.state {
        VClipState::Done => {
            let penetration = radius - result.distance;
            if penetration <= -config.contact_margin {
                return Ok(());
            }
            let normal = match result.closest_points {
                Some((p, q)) if result.distance > GEOM_EPSILON => (q - p) / result.distance,
                _ => Vector3::z(),
            };
            let point = center + normal * (radius - penetration * 0.5);
            out.push(Contact::new(a.body, b.body, point, normal, penetration));
        }
        VClipState::Penetration { depth } => {
            let Feature::Face(f) = result.second else {
                return Err(VClipError::UnexpectedResult {
                    first: result.first,
                    second: result.second,
                }
                .into());
            };
            let face_normal = poly.face_normal(f);
            // `depth` is the centre's signed distance to the face plane.
            let penetration = radius - depth;
            let point = center - face_normal * (depth + penetration * 0.5);
            out.push(Contact::new(a.body, b.body, point, -face_normal, penetration));
        }
        VClipState::Continue => {}
    }
    Ok(())
}
