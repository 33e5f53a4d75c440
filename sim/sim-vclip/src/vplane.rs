//! Voronoi planes.
//!
//! A [`VPlane`] separates the Voronoi region of one feature (`from`) from
//! that of an adjacent feature (`to`). Its direction points out of `from`'s
//! region into `to`'s, so a point with positive signed distance violates the
//! plane and belongs closer to `to`. Every plane has a mirror on the
//! neighbour with the same anchor and the opposite direction.
//!
//! | Feature | VE planes | FE planes |
//! |---------|-----------|-----------|
//! | vertex  | one per incident edge, along the edge | none |
//! | edge    | one per endpoint, pointing past it | one per incident face, pointing into it |
//! | face    | none | one per boundary edge, pointing out of the face |

use std::fmt;

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

use crate::feature::{Edge, Feature};
use crate::polyhedron::Polyhedron;
use crate::GEOM_EPSILON;

/// Plane list for a single feature.
pub type VPlanes = SmallVec<[VPlane; 8]>;

/// A Voronoi-region boundary between two adjacent features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VPlane {
    /// The feature whose region this plane bounds.
    pub from: Feature,
    /// The neighbouring feature on the other side.
    pub to: Feature,
    /// A point on the plane.
    pub anchor: Point3<f64>,
    /// Unit direction pointing into `to`'s region.
    pub direction: Vector3<f64>,
}

impl VPlane {
    /// Signed distance of `point`, positive on `to`'s side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.anchor).dot(&self.direction)
    }

    /// Whether `point` lies strictly outside `from`'s region.
    #[must_use]
    pub fn is_violated_by(&self, point: &Point3<f64>) -> bool {
        self.signed_distance(point) > 0.0
    }

    /// The same plane seen from the neighbour.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            anchor: self.anchor,
            direction: -self.direction,
        }
    }
}

impl fmt::Display for VPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VPlane({} -> {}, anchor=({:.6}, {:.6}, {:.6}), direction=({:.6}, {:.6}, {:.6}))",
            self.from,
            self.to,
            self.anchor.x,
            self.anchor.y,
            self.anchor.z,
            self.direction.x,
            self.direction.y,
            self.direction.z,
        )
    }
}

fn unit(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(GEOM_EPSILON).unwrap_or_else(Vector3::zeros)
}

impl Polyhedron {
    /// Vertex/edge planes of `feature`.
    ///
    /// For a vertex, one per incident edge; for an edge, one per endpoint;
    /// a face has none.
    #[must_use]
    pub fn ve_planes(&self, feature: Feature) -> VPlanes {
        match feature {
            Feature::Vertex(v) => {
                let anchor = self.position(v);
                self.vertex_edges(v)
                    .filter_map(|e| {
                        let other = e.other(v)?;
                        Some(VPlane {
                            from: feature,
                            to: Feature::Edge(e),
                            anchor,
                            direction: unit(self.position(other) - anchor),
                        })
                    })
                    .collect()
            }
            Feature::Edge(e) => {
                let tail = self.position(e.tail());
                let head = self.position(e.head());
                let along = unit(head - tail);
                [
                    VPlane {
                        from: feature,
                        to: Feature::Vertex(e.tail()),
                        anchor: tail,
                        direction: -along,
                    },
                    VPlane {
                        from: feature,
                        to: Feature::Vertex(e.head()),
                        anchor: head,
                        direction: along,
                    },
                ]
                .into_iter()
                .collect()
            }
            Feature::Face(_) => VPlanes::new(),
        }
    }

    /// Face/edge planes of `feature`.
    ///
    /// For an edge, one per incident face; for a face, one per boundary
    /// edge; a vertex has none.
    #[must_use]
    pub fn fe_planes(&self, feature: Feature) -> VPlanes {
        match feature {
            Feature::Vertex(_) => VPlanes::new(),
            Feature::Edge(e) => self
                .edge_faces(e)
                .filter_map(|f| self.edge_face_plane(e, f))
                .collect(),
            Feature::Face(f) => self
                .face_edges(f)
                .filter_map(|e| self.edge_face_plane(e, f).map(|p| p.mirrored()))
                .collect(),
        }
    }

    /// Every Voronoi plane of `feature`: VE planes first, then FE planes.
    #[must_use]
    pub fn voronoi_planes(&self, feature: Feature) -> VPlanes {
        let mut planes = self.ve_planes(feature);
        planes.extend(self.fe_planes(feature));
        planes
    }

    /// Plane from edge `e` into face `f`, anchored at the start of `e` as `f`
    /// traverses it. Its direction is `n x d`, which points into the face
    /// for a counter-clockwise loop.
    fn edge_face_plane(&self, e: Edge, f: usize) -> Option<VPlane> {
        let (from, _) = self.face(f)?.directed(&e)?;
        let d = self.edge_direction_in_face(&e, f)?;
        Some(VPlane {
            from: Feature::Edge(e),
            to: Feature::Face(f),
            anchor: self.position(from),
            direction: unit(self.face_normal(f).cross(&d)),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Polyhedron {
        Polyhedron::cuboid(Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_vertex_planes_follow_edges() {
        let cube = unit_cube();
        let planes = cube.ve_planes(Feature::Vertex(0));
        assert_eq!(planes.len(), 3);
        for p in &planes {
            assert_eq!(p.from, Feature::Vertex(0));
            assert_relative_eq!(p.anchor, Point3::new(-1.0, -1.0, -1.0));
        }
        // Edge 0-3 runs along +y.
        assert_eq!(planes[0].to, Feature::Edge(Edge::new(0, 3)));
        assert_relative_eq!(planes[0].direction, Vector3::y());
        assert!(cube.fe_planes(Feature::Vertex(0)).is_empty());
    }

    #[test]
    fn test_edge_planes() {
        let cube = unit_cube();
        let edge = Feature::Edge(Edge::new(1, 5));
        let ve = cube.ve_planes(edge);
        assert_eq!(ve.len(), 2);
        assert_relative_eq!(ve[0].direction, -Vector3::z());
        assert_relative_eq!(ve[1].direction, Vector3::z());

        // Edge 1-5 sits between the front (-y) and right (+x) faces.
        let fe = cube.fe_planes(edge);
        assert_eq!(fe.len(), 2);
        assert_eq!(fe[0].to, Feature::Face(2));
        assert_relative_eq!(fe[0].direction, -Vector3::x(), epsilon = 1e-12);
        assert_eq!(fe[1].to, Feature::Face(3));
        assert_relative_eq!(fe[1].direction, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_face_planes_point_outward() {
        let cube = unit_cube();
        let planes = cube.fe_planes(Feature::Face(1));
        assert_eq!(planes.len(), 4);
        let centre = Point3::new(0.0, 0.0, 1.0);
        for p in &planes {
            assert_eq!(p.from, Feature::Face(1));
            assert!(p.to.is_edge());
            assert_relative_eq!(p.signed_distance(&centre), -1.0, epsilon = 1e-12);
        }
        assert!(planes.iter().any(|p| p.is_violated_by(&Point3::new(1.5, 0.0, 1.0))));
    }

    #[test]
    fn test_planes_have_mirrors_on_neighbours() {
        let cube = unit_cube();
        let feature = Feature::Edge(Edge::new(2, 6));
        for plane in cube.voronoi_planes(feature) {
            let back = cube
                .voronoi_planes(plane.to)
                .into_iter()
                .find(|p| p.to == feature)
                .unwrap();
            assert_relative_eq!(back.direction, -plane.direction, epsilon = 1e-12);
            assert_relative_eq!(back.signed_distance(&plane.anchor), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_display_is_stable() {
        let cube = unit_cube();
        let plane = cube.ve_planes(Feature::Vertex(0))[0];
        assert_eq!(
            plane.to_string(),
            "VPlane(Vertex(0) -> Edge(0-3), anchor=(-1.000000, -1.000000, -1.000000), \
             direction=(0.000000, 1.000000, 0.000000))"
        );
    }
}
