//! Edge clipping and the derivative check.
//!
//! An edge is parametrised as `e(l) = tail + l * (head - tail)` for
//! `l` in `[0, 1]`. [`clip_edge`] narrows that interval against a set of
//! Voronoi planes and remembers which neighbour is responsible for each
//! bound. [`deriv_check`] then decides, from the sign of the distance
//! derivative at each bound, whether the closest point lies past it.

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::feature::Feature;
use crate::polyhedron::Polyhedron;
use crate::vplane::VPlane;

/// Clipped parameter interval with the features that set each bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipResult {
    /// Lower bound.
    pub lambda_low: f64,
    /// Upper bound.
    pub lambda_high: f64,
    /// Neighbour whose plane set the lower bound.
    pub neighbor_low: Option<Feature>,
    /// Neighbour whose plane set the upper bound.
    pub neighbor_high: Option<Feature>,
}

impl ClipResult {
    /// The whole edge, no bounding neighbours.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            lambda_low: 0.0,
            lambda_high: 1.0,
            neighbor_low: None,
            neighbor_high: None,
        }
    }
}

impl Default for ClipResult {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for ClipResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.lambda_low, self.lambda_high)?;
        if let Some(n) = self.neighbor_low {
            write!(f, " low={n}")?;
        }
        if let Some(n) = self.neighbor_high {
            write!(f, " high={n}")?;
        }
        Ok(())
    }
}

/// Outcome of [`clip_edge`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipOutcome {
    /// Part of the edge survives.
    Clipped(ClipResult),
    /// Both endpoints violate the same plane; carries that plane's neighbour.
    SimplyExcluded(Feature),
    /// The edge is excluded by two different planes; the interval is empty
    /// (`lambda_low > lambda_high`) but its neighbours are recorded.
    CompoundExcluded(ClipResult),
}

impl ClipOutcome {
    /// The interval, unless the edge was simply excluded.
    #[must_use]
    pub const fn interval(&self) -> Option<ClipResult> {
        match self {
            Self::Clipped(r) | Self::CompoundExcluded(r) => Some(*r),
            Self::SimplyExcluded(_) => None,
        }
    }
}

impl fmt::Display for ClipOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clipped(r) => write!(f, "Clipped({r})"),
            Self::SimplyExcluded(n) => write!(f, "SimplyExcluded({n})"),
            Self::CompoundExcluded(r) => write!(f, "CompoundExcluded({r})"),
        }
    }
}

/// Clip the edge `tail -> head` against `planes`, continuing from `start`.
///
/// Pass [`ClipResult::full`] to clip a fresh edge. Passing an earlier result
/// continues narrowing the same interval with further planes.
#[must_use]
pub fn clip_edge(
    tail: &Point3<f64>,
    head: &Point3<f64>,
    planes: &[VPlane],
    start: ClipResult,
) -> ClipOutcome {
    let mut r = start;

    for plane in planes {
        // Positive means inside the region the planes bound.
        let dt = -plane.signed_distance(tail);
        let dh = -plane.signed_distance(head);

        if dt < 0.0 && dh < 0.0 {
            return ClipOutcome::SimplyExcluded(plane.to);
        }

        if dt < 0.0 {
            let lambda = dt / (dt - dh);
            if lambda > r.lambda_low {
                r.lambda_low = lambda;
                r.neighbor_low = Some(plane.to);
                if r.lambda_low > r.lambda_high {
                    return ClipOutcome::CompoundExcluded(r);
                }
            }
        } else if dh < 0.0 {
            let lambda = dt / (dt - dh);
            if lambda < r.lambda_high {
                r.lambda_high = lambda;
                r.neighbor_high = Some(plane.to);
                if r.lambda_low > r.lambda_high {
                    return ClipOutcome::CompoundExcluded(r);
                }
            }
        }
    }

    ClipOutcome::Clipped(r)
}

/// Sign of the derivative of the distance from `e(l)` to `reference`,
/// moving along `u = head - tail`.
///
/// Edges never serve as a reference: an edge's neighbours are vertices and
/// faces, which is what the caller substitutes.
fn distance_derivative(
    poly: &Polyhedron,
    reference: Feature,
    point: &Point3<f64>,
    u: &Vector3<f64>,
) -> f64 {
    match reference {
        Feature::Vertex(v) => u.dot(&(point - poly.position(v))),
        Feature::Face(f) => {
            let d = poly.face_plane_distance(f, point);
            if d > 0.0 {
                u.dot(&poly.face_normal(f))
            } else if d < 0.0 {
                -u.dot(&poly.face_normal(f))
            } else {
                0.0
            }
        }
        Feature::Edge(_) => 0.0,
    }
}

/// Decide whether the closest point to `x` along the clipped edge lies past
/// one of the clip bounds.
///
/// `x` is a feature of `poly`; the edge `tail -> head` belongs to the other
/// polyhedron. The distance is measured to `x` itself, or to the bounding
/// neighbour when `x` is an edge. Returns the neighbour to move to, if any:
/// the low neighbour when distance grows past `lambda_low`, else the high
/// neighbour when it shrinks past `lambda_high`.
#[must_use]
pub fn deriv_check(
    poly: &Polyhedron,
    x: Feature,
    tail: &Point3<f64>,
    head: &Point3<f64>,
    clip: &ClipResult,
) -> Option<Feature> {
    let u = head - tail;
    let at = |lambda: f64| tail + u * lambda;

    if let Some(n) = clip.neighbor_low {
        let reference = if x.is_edge() { n } else { x };
        if distance_derivative(poly, reference, &at(clip.lambda_low), &u) > 0.0 {
            return Some(n);
        }
    }

    if let Some(n) = clip.neighbor_high {
        let reference = if x.is_edge() { n } else { x };
        if distance_derivative(poly, reference, &at(clip.lambda_high), &u) < 0.0 {
            return Some(n);
        }
    }

    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::feature::Edge;
    use approx::assert_relative_eq;

    fn unit_cube() -> Polyhedron {
        Polyhedron::cuboid(Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_edge_fully_inside_is_untouched() {
        let cube = unit_cube();
        let planes = cube.fe_planes(Feature::Face(1));
        let out = clip_edge(
            &Point3::new(-0.5, 0.0, 2.0),
            &Point3::new(0.5, 0.0, 2.0),
            &planes,
            ClipResult::full(),
        );
        assert_eq!(out, ClipOutcome::Clipped(ClipResult::full()));
    }

    #[test]
    fn test_edge_crossing_one_plane() {
        let cube = unit_cube();
        let planes = cube.fe_planes(Feature::Face(1));
        // Runs from x = 0 to x = 2 above the top face; leaves it at x = 1.
        let out = clip_edge(
            &Point3::new(0.0, 0.0, 2.0),
            &Point3::new(2.0, 0.0, 2.0),
            &planes,
            ClipResult::full(),
        );
        let ClipOutcome::Clipped(r) = out else {
            panic!("expected a clipped interval, got {out}");
        };
        assert_relative_eq!(r.lambda_low, 0.0);
        assert_relative_eq!(r.lambda_high, 0.5, epsilon = 1e-12);
        assert_eq!(r.neighbor_low, None);
        assert_eq!(r.neighbor_high, Some(Feature::Edge(Edge::new(5, 6))));
    }

    #[test]
    fn test_simple_exclusion() {
        let cube = unit_cube();
        let planes = cube.fe_planes(Feature::Face(1));
        let out = clip_edge(
            &Point3::new(1.5, -0.5, 2.0),
            &Point3::new(1.5, 0.5, 2.0),
            &planes,
            ClipResult::full(),
        );
        assert_eq!(out, ClipOutcome::SimplyExcluded(Feature::Edge(Edge::new(5, 6))));
        assert!(out.interval().is_none());
    }

    #[test]
    fn test_compound_exclusion() {
        let cube = unit_cube();
        let planes = cube.fe_planes(Feature::Face(1));
        // Cuts the +x, -y corner of the top face's prism without entering it.
        let out = clip_edge(
            &Point3::new(0.5, -2.0, 2.0),
            &Point3::new(2.0, -0.5, 2.0),
            &planes,
            ClipResult::full(),
        );
        let ClipOutcome::CompoundExcluded(r) = out else {
            panic!("expected compound exclusion, got {out}");
        };
        assert!(r.lambda_low > r.lambda_high);
        assert!(r.neighbor_low.is_some());
        assert!(r.neighbor_high.is_some());
        assert_ne!(r.neighbor_low, r.neighbor_high);
    }

    #[test]
    fn test_clip_continues_from_start() {
        let cube = unit_cube();
        let planes = cube.fe_planes(Feature::Face(1));
        let start = ClipResult {
            lambda_low: 0.2,
            lambda_high: 0.9,
            neighbor_low: Some(Feature::Vertex(0)),
            neighbor_high: None,
        };
        let out = clip_edge(
            &Point3::new(0.0, 0.0, 2.0),
            &Point3::new(2.0, 0.0, 2.0),
            &planes,
            start,
        );
        let r = out.interval().unwrap();
        assert_relative_eq!(r.lambda_low, 0.2);
        assert_eq!(r.neighbor_low, Some(Feature::Vertex(0)));
        assert_relative_eq!(r.lambda_high, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_deriv_check_vertex_reference() {
        let cube = unit_cube();
        let v = Feature::Vertex(6); // (1, 1, 1)
        let planes = cube.ve_planes(v);

        // Enters the corner's region at l = 0.5, already moving away from it.
        let tail = Point3::new(2.0, 0.0, 2.0);
        let head = Point3::new(2.0, 2.0, 4.0);
        let clip = clip_edge(&tail, &head, &planes, ClipResult::full());
        let r = clip.interval().unwrap();
        assert!(r.neighbor_low.is_some());
        assert_eq!(deriv_check(&cube, v, &tail, &head, &r), r.neighbor_low);

        // Reversed, the same segment triggers the upper bound instead.
        let clip = clip_edge(&head, &tail, &planes, ClipResult::full());
        let r = clip.interval().unwrap();
        assert_eq!(deriv_check(&cube, v, &head, &tail, &r), r.neighbor_high);
    }

    #[test]
    fn test_deriv_check_stays_when_minimum_inside() {
        let cube = unit_cube();
        let v = Feature::Vertex(6);
        let planes = cube.ve_planes(v);
        // Symmetric segment through the corner's region.
        let tail = Point3::new(1.5, 2.5, 3.0);
        let head = Point3::new(2.5, 1.5, 3.0);
        let r = clip_edge(&tail, &head, &planes, ClipResult::full())
            .interval()
            .unwrap();
        assert_eq!(deriv_check(&cube, v, &tail, &head, &r), None);
    }

    #[test]
    fn test_display() {
        let r = ClipResult {
            lambda_low: 0.25,
            lambda_high: 0.5,
            neighbor_low: None,
            neighbor_high: Some(Feature::Face(2)),
        };
        assert_eq!(r.to_string(), "[0.250000, 0.500000] high=Face(2)");
        assert_eq!(
            ClipOutcome::SimplyExcluded(Feature::Vertex(1)).to_string(),
            "SimplyExcluded(Vertex(1))"
        );
    }
}
