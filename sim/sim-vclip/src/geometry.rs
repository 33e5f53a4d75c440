//! Closest points between features.
//!
//! Used to turn a separated V-Clip witness pair into a distance and a pair
//! of closest points, and by tests as a brute-force reference.

use nalgebra::{Point3, Vector3};

use crate::feature::{Edge, Feature};
use crate::polyhedron::Polyhedron;
use crate::GEOM_EPSILON;

/// Closest point to `p` on segment `a -> b`, with its parameter in `[0, 1]`.
#[must_use]
pub fn closest_point_on_segment(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
) -> (f64, Point3<f64>) {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < GEOM_EPSILON * GEOM_EPSILON {
        return (0.0, *a);
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (t, a + ab * t)
}

/// Closest points between segments `p1 -> q1` and `p2 -> q2`.
///
/// Returns `(s, t, c1, c2)` with `c1 = p1 + s (q1 - p1)` and
/// `c2 = p2 + t (q2 - p2)`.
#[must_use]
pub fn segment_segment_closest_points(
    p1: &Point3<f64>,
    q1: &Point3<f64>,
    p2: &Point3<f64>,
    q2: &Point3<f64>,
) -> (f64, f64, Point3<f64>, Point3<f64>) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);
    let eps = GEOM_EPSILON * GEOM_EPSILON;

    let (s, t) = if a <= eps && e <= eps {
        (0.0, 0.0)
    } else if a <= eps {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= eps {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom > eps {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (s, t, p1 + d1 * s, p2 + d2 * t)
}

/// Closest point to `p` on face `f` of `poly` (boundary included).
#[must_use]
pub fn closest_point_on_face(poly: &Polyhedron, f: usize, p: &Point3<f64>) -> Point3<f64> {
    let normal = poly.face_normal(f);
    let projected = p - normal * poly.face_plane_distance(f, p);

    let inside = poly.face_edges(f).all(|e| {
        let a = poly.position(e.tail());
        let b = poly.position(e.head());
        (b - a).cross(&(projected - a)).dot(&normal) >= 0.0
    });
    if inside {
        return projected;
    }

    poly.face_edges(f)
        .map(|e| {
            closest_point_on_segment(p, &poly.position(e.tail()), &poly.position(e.head())).1
        })
        .min_by(|x, y| (x - p).norm_squared().total_cmp(&(y - p).norm_squared()))
        .unwrap_or(projected)
}

fn closer(
    best: (Point3<f64>, Point3<f64>),
    candidate: (Point3<f64>, Point3<f64>),
) -> (Point3<f64>, Point3<f64>) {
    if (candidate.0 - candidate.1).norm_squared() < (best.0 - best.1).norm_squared() {
        candidate
    } else {
        best
    }
}

fn segment(poly: &Polyhedron, e: &Edge) -> (Point3<f64>, Point3<f64>) {
    (poly.position(e.tail()), poly.position(e.head()))
}

/// Closest points between a segment and a face, assuming they do not cross.
fn segment_face(
    (t, h): (Point3<f64>, Point3<f64>),
    poly: &Polyhedron,
    f: usize,
) -> (Point3<f64>, Point3<f64>) {
    let mut best = (t, closest_point_on_face(poly, f, &t));
    best = closer(best, (h, closest_point_on_face(poly, f, &h)));
    for b in poly.face_edges(f) {
        let (bt, bh) = segment(poly, &b);
        let (_, _, c1, c2) = segment_segment_closest_points(&t, &h, &bt, &bh);
        best = closer(best, (c1, c2));
    }
    best
}

/// Closest points between feature `fa` of `a` and feature `fb` of `b`.
///
/// Exact for every pairing of non-intersecting features. The first point
/// lies on `fa`, the second on `fb`.
#[must_use]
pub fn feature_closest_points(
    a: &Polyhedron,
    fa: Feature,
    b: &Polyhedron,
    fb: Feature,
) -> (Point3<f64>, Point3<f64>) {
    let swap = |(p, q): (Point3<f64>, Point3<f64>)| (q, p);

    match (fa, fb) {
        (Feature::Vertex(va), Feature::Vertex(vb)) => (a.position(va), b.position(vb)),
        (Feature::Vertex(v), Feature::Edge(e)) => {
            let p = a.position(v);
            let (t, h) = segment(b, &e);
            (p, closest_point_on_segment(&p, &t, &h).1)
        }
        (Feature::Edge(_), Feature::Vertex(_)) => swap(feature_closest_points(b, fb, a, fa)),
        (Feature::Vertex(v), Feature::Face(f)) => {
            let p = a.position(v);
            (p, closest_point_on_face(b, f, &p))
        }
        (Feature::Face(_), Feature::Vertex(_)) => swap(feature_closest_points(b, fb, a, fa)),
        (Feature::Edge(ea), Feature::Edge(eb)) => {
            let (t1, h1) = segment(a, &ea);
            let (t2, h2) = segment(b, &eb);
            let (_, _, c1, c2) = segment_segment_closest_points(&t1, &h1, &t2, &h2);
            (c1, c2)
        }
        (Feature::Edge(e), Feature::Face(f)) => segment_face(segment(a, &e), b, f),
        (Feature::Face(_), Feature::Edge(_)) => swap(feature_closest_points(b, fb, a, fa)),
        (Feature::Face(f), Feature::Face(g)) => {
            let mut best: Option<(Point3<f64>, Point3<f64>)> = None;
            for e in a.face_edges(f) {
                let c = segment_face(segment(a, &e), b, g);
                best = Some(best.map_or(c, |bst| closer(bst, c)));
            }
            for e in b.face_edges(g) {
                let c = swap(segment_face(segment(b, &e), a, f));
                best = Some(best.map_or(c, |bst| closer(bst, c)));
            }
            best.unwrap_or_else(|| (a.position(0), b.position(0)))
        }
    }
}

/// Extent of `poly` along `axis` as `(min, max)` of the projected vertices.
fn project(poly: &Polyhedron, axis: &Vector3<f64>) -> (f64, f64) {
    poly.vertices()
        .iter()
        .map(|v| v.position.coords.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

/// Signed gap between the projections of `a` and `b` onto unit `axis`.
///
/// Positive when the projections are apart. Otherwise minus the shortest
/// push along `axis` that would separate them.
#[must_use]
pub fn projected_gap(a: &Polyhedron, b: &Polyhedron, axis: &Vector3<f64>) -> f64 {
    let (a_min, a_max) = project(a, axis);
    let (b_min, b_max) = project(b, axis);
    (b_min - a_max).max(a_min - b_max)
}

/// Largest [`projected_gap`] over the separating-axis candidates: the face
/// normals of both polyhedra and the cross products of their edge
/// directions.
///
/// Positive means the polyhedra are apart; otherwise its magnitude is the
/// shortest separating push over all candidate axes. `None` when neither polyhedron
/// has a face, where the candidates do not cover every separating plane.
#[must_use]
pub fn max_separation(a: &Polyhedron, b: &Polyhedron) -> Option<f64> {
    if a.faces().is_empty() && b.faces().is_empty() {
        return None;
    }

    let mut best = f64::NEG_INFINITY;
    for (p, q) in [(a, b), (b, a)] {
        for f in 0..p.faces().len() {
            best = best.max(projected_gap(p, q, &p.face_normal(f)));
        }
    }
    for ea in a.edges() {
        let (t1, h1) = segment(a, ea);
        for eb in b.edges() {
            let (t2, h2) = segment(b, eb);
            if let Some(axis) = (h1 - t1).cross(&(h2 - t2)).try_normalize(GEOM_EPSILON) {
                best = best.max(projected_gap(a, b, &axis));
            }
        }
    }
    Some(best)
}

/// Separating-axis overlap test. Touching counts as overlapping.
#[must_use]
pub fn polyhedra_overlap(a: &Polyhedron, b: &Polyhedron) -> bool {
    max_separation(a, b).is_some_and(|gap| gap <= 0.0)
}

/// Minimum distance between two convex polyhedra by exhaustive search over
/// vertex/face, vertex/vertex and edge/edge pairs.
///
/// Zero whenever the two overlap, including crossings with no vertex of
/// either inside the other. Quadratic; meant as a reference for tests and
/// diagnostics.
#[must_use]
pub fn brute_force_distance(a: &Polyhedron, b: &Polyhedron) -> f64 {
    if polyhedra_overlap(a, b) {
        return 0.0;
    }

    let mut best = f64::INFINITY;
    for (p, q) in [(a, b), (b, a)] {
        for v in p.vertices() {
            for f in 0..q.faces().len() {
                best = best.min((closest_point_on_face(q, f, &v.position) - v.position).norm());
            }
            for w in q.vertices() {
                best = best.min((w.position - v.position).norm());
            }
        }
    }

    for ea in a.edges() {
        let (t1, h1) = segment(a, ea);
        for eb in b.edges() {
            let (t2, h2) = segment(b, eb);
            let (_, _, c1, c2) = segment_segment_closest_points(&t1, &h1, &t2, &h2);
            best = best.min((c1 - c2).norm());
        }
    }

    best
}
