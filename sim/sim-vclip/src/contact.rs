//! Contacts from penetrating V-Clip results.

use sim_types::{BodyId, Contact};

use crate::error::VClipError;
use crate::feature::Feature;
use crate::polyhedron::Polyhedron;
use crate::vclip::{VClipResult, VClipState};
use crate::Result;

/// Turn a terminal V-Clip result for `a` (owned by `body_a`) and `b` (owned
/// by `body_b`) into a contact.
///
/// Separated results give `Ok(None)`. A penetrating result must pair a
/// vertex or an edge with a face:
///
/// | Witness | Point | Normal |
/// |---------|-------|--------|
/// | vertex of `a`, face of `b` | the vertex | minus `b`'s face normal |
/// | face of `a`, vertex of `b` | the vertex | `a`'s face normal |
/// | edge of `a`, face of `b` | edge midpoint | minus `b`'s face normal |
/// | face of `a`, edge of `b` | edge midpoint | `a`'s face normal |
///
/// The normal always points from `a` toward `b`. The edge midpoint is an
/// approximation of the contact point, not the exact deepest point.
///
/// # Errors
///
/// [`VClipError::UnexpectedResult`] for any other penetrating pairing.
pub fn derive_contact(
    a: &Polyhedron,
    body_a: BodyId,
    b: &Polyhedron,
    body_b: BodyId,
    result: &VClipResult,
) -> Result<Option<Contact>> {
    let VClipState::Penetration { depth } = result.state else {
        return Ok(None);
    };

    let (point, normal) = match (result.first, result.second) {
        (Feature::Vertex(v), Feature::Face(f)) => (a.position(v), -b.face_normal(f)),
        (Feature::Face(f), Feature::Vertex(v)) => (b.position(v), a.face_normal(f)),
        (Feature::Edge(e), Feature::Face(f)) => (a.edge_midpoint(&e), -b.face_normal(f)),
        (Feature::Face(f), Feature::Edge(e)) => (b.edge_midpoint(&e), a.face_normal(f)),
        (first, second) => return Err(VClipError::UnexpectedResult { first, second }),
    };

    Ok(Some(Contact::new(body_a, body_b, point, normal, -depth)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::feature::Edge;
    use crate::vclip::VClip;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use sim_types::Pose;

    fn cube(half: f64, at: Point3<f64>) -> Polyhedron {
        Polyhedron::cuboid(Vector3::new(half, half, half)).transformed(&Pose::from_position(at))
    }

    fn result(first: Feature, second: Feature, depth: f64) -> VClipResult {
        VClipResult {
            state: VClipState::Penetration { depth },
            first,
            second,
            iterations: 1,
            distance: depth,
            closest_points: None,
        }
    }

    #[test]
    fn test_small_cube_resting_in_large_cube() {
        let a = cube(1.0, Point3::origin());
        let b = cube(0.5, Point3::new(0.0, 0.0, 1.3));
        let r = VClip::default().closest_features(&a, &b).unwrap();
        let contact = derive_contact(&a, BodyId::new(1), &b, BodyId::new(2), &r)
            .unwrap()
            .unwrap();
        assert_eq!(contact.body_a, BodyId::new(1));
        assert_relative_eq!(contact.normal, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(contact.penetration, 0.2, epsilon = 1e-9);
        assert_relative_eq!(contact.point.z, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_vertex_face_normal_points_toward_b() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(0.0, 0.0, 1.9));
        // Vertex 6 of `a` (1, 1, 1) under the bottom face of `b` at z = 0.9.
        let c = derive_contact(
            &a,
            BodyId::new(0),
            &b,
            BodyId::new(1),
            &result(Feature::Vertex(6), Feature::Face(0), -0.1),
        )
        .unwrap()
        .unwrap();
        assert_relative_eq!(c.normal, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(c.point, Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(c.penetration, 0.1);
    }

    #[test]
    fn test_edge_face_uses_midpoint() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(0.0, 0.0, 1.9));
        let c = derive_contact(
            &a,
            BodyId::new(0),
            &b,
            BodyId::new(1),
            &result(Feature::Face(1), Feature::Edge(Edge::new(0, 1)), -0.1),
        )
        .unwrap()
        .unwrap();
        assert_relative_eq!(c.normal, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(c.point, Point3::new(0.0, -1.0, 0.9), epsilon = 1e-12);
    }

    #[test]
    fn test_separated_gives_none() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(3.0, 0.0, 0.0));
        let r = VClip::default().closest_features(&a, &b).unwrap();
        assert!(derive_contact(&a, BodyId::new(0), &b, BodyId::new(1), &r)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unexpected_pairing_is_an_error() {
        let a = cube(1.0, Point3::origin());
        let err = derive_contact(
            &a,
            BodyId::new(0),
            &a,
            BodyId::new(1),
            &result(Feature::Vertex(0), Feature::Vertex(1), -0.1),
        )
        .unwrap_err();
        assert_eq!(
            err,
            VClipError::UnexpectedResult {
                first: Feature::Vertex(0),
                second: Feature::Vertex(1),
            }
        );
    }
}
