//! The V-Clip closest-feature walk.
//!
//! V-Clip (Mirtich, 1998) keeps one feature on each polyhedron and moves
//! either of them to a neighbour whenever the other feature's closest point
//! lies outside its Voronoi region. When both features contain each other's
//! closest points the pair is a witness of minimum separation. When the walk
//! detects overlap it stops with a penetration estimate instead.
//!
//! # Transitions
//!
//! | Pair | Checks, in order |
//! |------|------------------|
//! | V/V | each vertex against the other's VE planes |
//! | V/E | vertex against the edge's VE then FE planes; edge clipped against the vertex's planes; derivative check |
//! | V/F | vertex against the face's FE planes; edges of the vertex pointing toward the face; local minimum over all faces |
//! | E/E | four clip passes VE1, FE1, VE2, FE2, each followed by a derivative check |
//! | E/F | edge clipped against the face's FE planes; sign change or derivative check at the bounds |
//!
//! F/F only happens as a seed and is broken by stepping to a boundary edge.
//!
//! Both polyhedra must already be in the same (world) frame.

use std::fmt;

use nalgebra::Point3;
use tracing::{debug, trace};

use sim_types::CollisionConfig;

use crate::clip::{clip_edge, deriv_check, ClipOutcome, ClipResult};
use crate::error::VClipError;
use crate::feature::{Edge, Feature};
use crate::geometry::{feature_closest_points, segment_segment_closest_points};
use crate::polyhedron::Polyhedron;
use crate::Result;

/// Default cap on feature transitions.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// State of the walk after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VClipState {
    /// A feature changed; keep walking.
    Continue,
    /// Separated: the current pair is the closest-feature witness.
    Done,
    /// Overlapping. `depth` is a non-positive signed distance estimate.
    Penetration {
        /// Signed distance of the witness below the supporting face.
        depth: f64,
    },
}

impl VClipState {
    /// Whether the walk has stopped.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

impl fmt::Display for VClipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "Continue"),
            Self::Done => write!(f, "Done"),
            Self::Penetration { depth } => write!(f, "Penetration(depth={depth:.6})"),
        }
    }
}

/// Terminal outcome of a closest-feature query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VClipResult {
    /// [`VClipState::Done`] or [`VClipState::Penetration`].
    pub state: VClipState,
    /// Witness feature on the first polyhedron.
    pub first: Feature,
    /// Witness feature on the second polyhedron.
    pub second: Feature,
    /// Number of steps taken, the final one included.
    pub iterations: usize,
    /// Separation for `Done`, the (non-positive) depth for `Penetration`.
    pub distance: f64,
    /// Closest points (first, second) for `Done`.
    pub closest_points: Option<(Point3<f64>, Point3<f64>)>,
}

impl VClipResult {
    /// Whether the polyhedra overlap.
    #[must_use]
    pub const fn is_penetrating(&self) -> bool {
        matches!(self.state, VClipState::Penetration { .. })
    }

    /// Penetration estimate, if overlapping.
    #[must_use]
    pub const fn penetration(&self) -> Option<f64> {
        match self.state {
            VClipState::Penetration { depth } => Some(depth),
            _ => None,
        }
    }
}

impl fmt::Display for VClipResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at ({}, {}) distance={:.6} after {} iterations",
            self.state, self.first, self.second, self.distance, self.iterations
        )
    }
}

/// Outcome of a single transition, relative to the (first, second) pair it
/// was computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Update {
    First(Feature),
    Second(Feature),
    Done,
    /// Overlap. The optional features replace the current ones.
    Penetration {
        depth: f64,
        first: Option<Feature>,
        second: Option<Feature>,
    },
}

impl Update {
    const fn penetration(depth: f64) -> Self {
        Self::Penetration {
            depth,
            first: None,
            second: None,
        }
    }

    /// Exchange roles, for transitions evaluated with the polyhedra swapped.
    const fn swapped(self) -> Self {
        match self {
            Self::First(f) => Self::Second(f),
            Self::Second(f) => Self::First(f),
            Self::Done => Self::Done,
            Self::Penetration {
                depth,
                first,
                second,
            } => Self::Penetration {
                depth,
                first: second,
                second: first,
            },
        }
    }
}

/// The V-Clip engine. Holds only the iteration cap; queries are pure.
///
/// # Example
///
/// ```
/// use sim_vclip::{Polyhedron, VClip, VClipState};
/// use sim_types::Pose;
/// use nalgebra::{Point3, Vector3};
///
/// let a = Polyhedron::cuboid(Vector3::new(1.0, 1.0, 1.0));
/// let b = a.transformed(&Pose::from_position(Point3::new(3.0, 0.0, 0.0)));
///
/// let result = VClip::default().closest_features(&a, &b)?;
/// assert_eq!(result.state, VClipState::Done);
/// assert!((result.distance - 1.0).abs() < 1e-9);
/// # Ok::<(), sim_vclip::VClipError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VClip {
    max_iterations: usize,
}

impl Default for VClip {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl VClip {
    /// Engine with the given iteration cap.
    #[must_use]
    pub const fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Engine using the cap from `config`.
    #[must_use]
    pub const fn from_config(config: &CollisionConfig) -> Self {
        Self::new(config.max_vclip_iterations)
    }

    /// The iteration cap.
    #[must_use]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Walk from the first vertex of each polyhedron.
    pub fn closest_features(&self, a: &Polyhedron, b: &Polyhedron) -> Result<VClipResult> {
        self.closest_features_from(a, b, Feature::Vertex(0), Feature::Vertex(0))
    }

    /// Walk from a caller-chosen seed pair, e.g. last frame's witness.
    ///
    /// # Errors
    ///
    /// - [`VClipError::EmptyPolyhedron`] if either polyhedron has no vertices
    /// - [`VClipError::Geometry`] if either fails validation or a seed does
    ///   not exist
    /// - [`VClipError::IterationLimit`] if the walk does not terminate
    pub fn closest_features_from(
        &self,
        a: &Polyhedron,
        b: &Polyhedron,
        seed_a: Feature,
        seed_b: Feature,
    ) -> Result<VClipResult> {
        if a.is_empty() || b.is_empty() {
            return Err(VClipError::EmptyPolyhedron);
        }
        a.validate()?;
        b.validate()?;
        check_seed(a, seed_a)?;
        check_seed(b, seed_b)?;

        let (mut first, mut second) = (seed_a, seed_b);
        for iteration in 1..=self.max_iterations {
            let state = match step_pair(a, b, first, second) {
                Update::First(f) => {
                    trace!(iteration, from = %first, to = %f, "vclip: move first");
                    first = f;
                    continue;
                }
                Update::Second(f) => {
                    trace!(iteration, from = %second, to = %f, "vclip: move second");
                    second = f;
                    continue;
                }
                Update::Done => VClipState::Done,
                Update::Penetration {
                    depth,
                    first: new_first,
                    second: new_second,
                } => {
                    first = new_first.unwrap_or(first);
                    second = new_second.unwrap_or(second);
                    VClipState::Penetration { depth }
                }
            };

            let (distance, closest_points) = match state {
                VClipState::Penetration { depth } => (depth, None),
                _ => {
                    let (p, q) = feature_closest_points(a, first, b, second);
                    ((q - p).norm(), Some((p, q)))
                }
            };
            let result = VClipResult {
                state,
                first,
                second,
                iterations: iteration,
                distance,
                closest_points,
            };
            debug!(%result, "vclip terminated");
            return Ok(result);
        }

        Err(VClipError::IterationLimit {
            max_iterations: self.max_iterations,
            first,
            second,
        })
    }

    /// Perform one transition from `(first, second)`.
    ///
    /// Returns the resulting state and feature pair. Both polyhedra must
    /// already be validated and the features must exist.
    #[must_use]
    pub fn step(
        &self,
        a: &Polyhedron,
        b: &Polyhedron,
        first: Feature,
        second: Feature,
    ) -> (VClipState, Feature, Feature) {
        match step_pair(a, b, first, second) {
            Update::First(f) => (VClipState::Continue, f, second),
            Update::Second(f) => (VClipState::Continue, first, f),
            Update::Done => (VClipState::Done, first, second),
            Update::Penetration {
                depth,
                first: new_first,
                second: new_second,
            } => (
                VClipState::Penetration { depth },
                new_first.unwrap_or(first),
                new_second.unwrap_or(second),
            ),
        }
    }
}

fn check_seed(poly: &Polyhedron, seed: Feature) -> Result<()> {
    if poly.has_feature(seed) {
        return Ok(());
    }
    let index = match seed {
        Feature::Vertex(i) | Feature::Face(i) => i,
        Feature::Edge(e) => e.head().max(e.tail()),
    };
    Err(crate::GeometryError::InvalidReference {
        feature: seed,
        index,
        vertex_count: poly.vertices().len(),
    }
    .into())
}

fn step_pair(a: &Polyhedron, b: &Polyhedron, first: Feature, second: Feature) -> Update {
    match (first, second) {
        (Feature::Vertex(va), Feature::Vertex(vb)) => vertex_vertex(a, va, b, vb),
        (Feature::Vertex(v), Feature::Edge(e)) => vertex_edge(a, v, b, e),
        (Feature::Edge(e), Feature::Vertex(v)) => vertex_edge(b, v, a, e).swapped(),
        (Feature::Vertex(v), Feature::Face(f)) => vertex_face(a, v, b, f),
        (Feature::Face(f), Feature::Vertex(v)) => vertex_face(b, v, a, f).swapped(),
        (Feature::Edge(ea), Feature::Edge(eb)) => edge_edge(a, ea, b, eb),
        (Feature::Edge(e), Feature::Face(f)) => edge_face(a, e, b, f),
        (Feature::Face(f), Feature::Edge(e)) => edge_face(b, e, a, f).swapped(),
        (Feature::Face(f), Feature::Face(_)) => match a.face_edges(f).next() {
            Some(e) => Update::First(Feature::Edge(e)),
            None => Update::Done,
        },
    }
}

fn endpoints(poly: &Polyhedron, e: Edge) -> (Point3<f64>, Point3<f64>) {
    (poly.position(e.tail()), poly.position(e.head()))
}

/// Vertex `va` of `a` against vertex `vb` of `b`.
fn vertex_vertex(a: &Polyhedron, va: usize, b: &Polyhedron, vb: usize) -> Update {
    let pa = a.position(va);
    let pb = b.position(vb);

    if let Some(plane) = a
        .ve_planes(Feature::Vertex(va))
        .into_iter()
        .find(|p| p.is_violated_by(&pb))
    {
        return Update::First(plane.to);
    }
    if let Some(plane) = b
        .ve_planes(Feature::Vertex(vb))
        .into_iter()
        .find(|p| p.is_violated_by(&pa))
    {
        return Update::Second(plane.to);
    }
    Update::Done
}

/// Vertex `v` of `pv` (first) against edge `e` of `pe` (second).
fn vertex_edge(pv: &Polyhedron, v: usize, pe: &Polyhedron, e: Edge) -> Update {
    let p = pv.position(v);
    let edge = Feature::Edge(e);

    if let Some(plane) = pe.ve_planes(edge).into_iter().find(|pl| pl.is_violated_by(&p)) {
        return Update::Second(plane.to);
    }
    if let Some(plane) = pe.fe_planes(edge).into_iter().find(|pl| pl.is_violated_by(&p)) {
        return Update::Second(plane.to);
    }

    let (tail, head) = endpoints(pe, e);
    let vertex = Feature::Vertex(v);
    let planes = pv.ve_planes(vertex);
    match clip_edge(&tail, &head, &planes, ClipResult::full()) {
        ClipOutcome::SimplyExcluded(n) => Update::First(n),
        ClipOutcome::Clipped(r) | ClipOutcome::CompoundExcluded(r) => {
            deriv_check(pv, vertex, &tail, &head, &r).map_or(Update::Done, Update::First)
        }
    }
}

/// Vertex `v` of `pv` (first) against face `f` of `pf` (second).
fn vertex_face(pv: &Polyhedron, v: usize, pf: &Polyhedron, f: usize) -> Update {
    let p = pv.position(v);

    let worst = pf
        .fe_planes(Feature::Face(f))
        .into_iter()
        .map(|plane| (plane.signed_distance(&p), plane.to))
        .filter(|(d, _)| *d > 0.0)
        .max_by(|x, y| x.0.total_cmp(&y.0));
    if let Some((_, edge)) = worst {
        return Update::Second(edge);
    }

    // Signed comparison: above the face, move toward a lower neighbour; below
    // it, move toward a shallower one.
    let d = pf.face_plane_distance(f, &p);
    for e in pv.vertex_edges(v) {
        let Some(w) = e.other(v) else { continue };
        let dw = pf.face_plane_distance(f, &pv.position(w));
        if (d > 0.0 && dw < d) || (d < 0.0 && dw > d) {
            return Update::First(Feature::Edge(e));
        }
    }

    if d > 0.0 {
        return Update::Done;
    }

    // Local minimum below the face: find the face `p` is least deep under.
    let (best_face, best) = (0..pf.faces().len())
        .map(|g| (g, pf.face_plane_distance(g, &p)))
        .fold((f, d), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
    if best > 0.0 {
        Update::Second(Feature::Face(best_face))
    } else {
        Update::Penetration {
            depth: best,
            first: None,
            second: Some(Feature::Face(best_face)),
        }
    }
}

/// Edge `ea` of `a` against edge `eb` of `b`.
fn edge_edge(a: &Polyhedron, ea: Edge, b: &Polyhedron, eb: Edge) -> Update {
    let fa = Feature::Edge(ea);
    let fb = Feature::Edge(eb);

    let (t2, h2) = endpoints(b, eb);
    if let Some(n) = clip_against(a, fa, &t2, &h2) {
        return Update::First(n);
    }

    let (t1, h1) = endpoints(a, ea);
    if let Some(n) = clip_against(b, fb, &t1, &h1) {
        return Update::Second(n);
    }

    Update::Done
}

/// Clip the segment `tail -> head` against the VE planes of edge `x`, then
/// its FE planes continuing the same interval, running the derivative check
/// after each pass. Returns the feature of `poly` to move `x` to, if any.
fn clip_against(
    poly: &Polyhedron,
    x: Feature,
    tail: &Point3<f64>,
    head: &Point3<f64>,
) -> Option<Feature> {
    let mut interval = ClipResult::full();
    for planes in [poly.ve_planes(x), poly.fe_planes(x)] {
        match clip_edge(tail, head, &planes, interval) {
            ClipOutcome::SimplyExcluded(n) => return Some(n),
            ClipOutcome::Clipped(r) | ClipOutcome::CompoundExcluded(r) => {
                if let Some(n) = deriv_check(poly, x, tail, head, &r) {
                    return Some(n);
                }
                interval = r;
            }
        }
    }
    None
}

/// Edge `e` of `pe` (first) against face `f` of `pf` (second).
fn edge_face(pe: &Polyhedron, e: Edge, pf: &Polyhedron, f: usize) -> Update {
    let (tail, head) = endpoints(pe, e);
    let planes = pf.fe_planes(Feature::Face(f));

    let r = match clip_edge(&tail, &head, &planes, ClipResult::full()) {
        ClipOutcome::SimplyExcluded(n) => return Update::Second(n),
        ClipOutcome::CompoundExcluded(_) => return closest_boundary_feature(pf, f, &tail, &head),
        ClipOutcome::Clipped(r) => r,
    };

    let u = head - tail;
    let low = tail + u * r.lambda_low;
    let high = tail + u * r.lambda_high;
    let dl = pf.face_plane_distance(f, &low);
    let dh = pf.face_plane_distance(f, &high);

    if dl * dh <= 0.0 {
        return Update::penetration(dl.min(dh));
    }

    // Both bounds are on the same side, so the distance derivative has the
    // same sign at each.
    let un = u.dot(&pf.face_normal(f));
    let slope = if dl > 0.0 { un } else { -un };

    // Edge/face never terminates a separated walk: the update always moves
    // toward an endpoint or a neighbour of the face.
    if slope >= 0.0 {
        r.neighbor_low
            .map_or(Update::First(Feature::Vertex(e.tail())), Update::Second)
    } else {
        r.neighbor_high
            .map_or(Update::First(Feature::Vertex(e.head())), Update::Second)
    }
}

/// Boundary feature of face `f` closest to segment `tail -> head`: the
/// nearest boundary edge, or one of its endpoints when the nearest point is
/// at an end.
fn closest_boundary_feature(
    pf: &Polyhedron,
    f: usize,
    tail: &Point3<f64>,
    head: &Point3<f64>,
) -> Update {
    let nearest = pf
        .face_edges(f)
        .map(|b| {
            let (bt, bh) = endpoints(pf, b);
            let (_, t, c1, c2) = segment_segment_closest_points(tail, head, &bt, &bh);
            (b, t, (c1 - c2).norm_squared())
        })
        .min_by(|x, y| x.2.total_cmp(&y.2));

    match nearest {
        Some((b, t, _)) if t <= 0.0 => Update::Second(Feature::Vertex(b.tail())),
        Some((b, t, _)) if t >= 1.0 => Update::Second(Feature::Vertex(b.head())),
        Some((b, _, _)) => Update::Second(Feature::Edge(b)),
        None => Update::Done,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};
    use sim_types::Pose;

    fn cube(half: f64, at: Point3<f64>) -> Polyhedron {
        Polyhedron::cuboid(Vector3::new(half, half, half)).transformed(&Pose::from_position(at))
    }

    #[test]
    fn test_separated_cubes_face_to_face() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(3.0, 0.0, 0.0));
        let result = VClip::default().closest_features(&a, &b).unwrap();
        assert_eq!(result.state, VClipState::Done);
        assert_relative_eq!(result.distance, 1.0, epsilon = 1e-9);
        let (p, q) = result.closest_points.unwrap();
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(q.x, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_separated_cubes_corner_to_corner() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(3.0, 3.0, 3.0));
        let result = VClip::default().closest_features(&a, &b).unwrap();
        assert_eq!(result.state, VClipState::Done);
        assert_eq!(result.first, Feature::Vertex(6));
        assert_eq!(result.second, Feature::Vertex(0));
        assert_relative_eq!(result.distance, 3.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_rotated_edge_to_face() {
        let a = cube(1.0, Point3::origin());
        // Rotated 45 degrees about z: an edge of `b` faces the +x face of `a`.
        let b = Polyhedron::cuboid(Vector3::new(1.0, 1.0, 1.0)).transformed(
            &Pose::from_position_rotation(
                Point3::new(4.0, 0.3, 0.2),
                UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_4),
            ),
        );
        let result = VClip::default().closest_features(&a, &b).unwrap();
        assert_eq!(result.state, VClipState::Done);
        assert_relative_eq!(result.distance, 3.0 - 2.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_nested_cube_penetrates() {
        let a = cube(1.0, Point3::origin());
        let b = cube(0.5, Point3::new(0.0, 0.0, 1.3));
        let result = VClip::default().closest_features(&a, &b).unwrap();
        assert!(result.is_penetrating());
        assert_eq!(result.first, Feature::Face(1));
        assert_eq!(result.second, Feature::Vertex(0));
        assert_relative_eq!(result.penetration().unwrap(), -0.2, epsilon = 1e-9);
        assert!(result.closest_points.is_none());
    }

    #[test]
    fn test_result_independent_of_seed() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(0.5, 4.0, -0.25));
        let engine = VClip::default();
        let from_vertices = engine.closest_features(&a, &b).unwrap();
        let from_faces = engine
            .closest_features_from(&a, &b, Feature::Face(2), Feature::Face(5))
            .unwrap();
        assert_eq!(from_faces.state, VClipState::Done);
        assert_relative_eq!(from_vertices.distance, 2.0, epsilon = 1e-9);
        assert_relative_eq!(from_faces.distance, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_against_cube() {
        let a = Polyhedron::point(Point3::new(0.2, 0.1, 2.5));
        let b = cube(1.0, Point3::origin());
        let result = VClip::default().closest_features(&a, &b).unwrap();
        assert_eq!(result.state, VClipState::Done);
        assert_eq!(result.first, Feature::Vertex(0));
        assert_eq!(result.second, Feature::Face(1));
        assert_relative_eq!(result.distance, 1.5, epsilon = 1e-9);

        let inside = Polyhedron::point(Point3::new(0.2, 0.1, 0.7));
        let result = VClip::default().closest_features(&inside, &b).unwrap();
        assert_eq!(result.second, Feature::Face(1));
        assert_relative_eq!(result.penetration().unwrap(), -0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_limit_is_an_error() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(3.0, 0.0, 0.0));
        let err = VClip::new(1).closest_features(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            VClipError::IterationLimit {
                max_iterations: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_and_invalid_input() {
        let a = cube(1.0, Point3::origin());
        let engine = VClip::default();
        assert_eq!(
            engine.closest_features(&Polyhedron::new(), &a).unwrap_err(),
            VClipError::EmptyPolyhedron
        );

        let mut broken = a.clone();
        broken.add_edge(Edge::new(0, 40));
        assert!(matches!(
            engine.closest_features(&broken, &a).unwrap_err(),
            VClipError::Geometry(_)
        ));

        assert!(matches!(
            engine
                .closest_features_from(&a, &a, Feature::Face(9), Feature::Vertex(0))
                .unwrap_err(),
            VClipError::Geometry(_)
        ));
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(f64::NAN, 0.0, 0.0));
        let err = VClip::default().closest_features(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            VClipError::Geometry(crate::GeometryError::NonFiniteVertex { .. })
        ));
    }

    #[test]
    fn test_edge_face_always_moves() {
        // Edge of a tilted box above the top face of a cube: the walk must
        // leave the edge/face pair rather than stop on it.
        let a = cube(1.0, Point3::origin());
        let b = Polyhedron::cuboid(Vector3::new(0.5, 0.5, 0.5)).transformed(
            &Pose::from_position_rotation(
                Point3::new(0.1, 0.2, 2.5),
                UnitQuaternion::from_euler_angles(std::f64::consts::FRAC_PI_4, 0.2, 0.0),
            ),
        );
        let top = (0..a.faces().len())
            .find(|&f| a.face_normal(f).z > 0.9)
            .unwrap();
        let engine = VClip::default();
        for e in b.edges() {
            let edge = Feature::Edge(*e);
            let (state, _, _) = engine.step(&b, &a, edge, Feature::Face(top));
            assert_ne!(state, VClipState::Done, "stopped on {edge}");
        }
    }

    #[test]
    fn test_step_reports_continue() {
        let a = cube(1.0, Point3::origin());
        let b = cube(1.0, Point3::new(3.0, 0.0, 0.0));
        let engine = VClip::default();
        let (state, first, second) = engine.step(&a, &b, Feature::Vertex(0), Feature::Vertex(0));
        assert_eq!(state, VClipState::Continue);
        assert!(first != Feature::Vertex(0) || second != Feature::Vertex(0));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(VClipState::Done.to_string(), "Done");
        assert_eq!(
            VClipState::Penetration { depth: -0.2 }.to_string(),
            "Penetration(depth=-0.200000)"
        );
    }
}
