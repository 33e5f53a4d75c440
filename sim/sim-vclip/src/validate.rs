//! Polyhedron validation.
//!
//! Checks run once, before any query, so the feature walk itself never has
//! to defend against bad indices:
//!
//! - [`Polyhedron::validate_references`] - every index is in range
//! - [`Polyhedron::validate_geometry`] - no degenerate faces or edges
//! - [`Polyhedron::validate_closed_convex`] - closed 2-manifold, convex

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::warn;

use crate::error::{GeometryError, GeometryResult};
use crate::feature::{Edge, Feature};
use crate::polyhedron::Polyhedron;

/// Relative tolerance for planarity and convexity checks.
const CONVEXITY_TOLERANCE: f64 = 1e-9;

fn reject(err: GeometryError) -> GeometryError {
    warn!(error = %err, "rejecting polyhedron");
    err
}

impl Polyhedron {
    /// Check that every edge and face references an existing vertex.
    pub fn validate_references(&self) -> GeometryResult<()> {
        let vertex_count = self.vertices().len();

        for edge in self.edges() {
            if let Some(index) = edge.vertices().into_iter().find(|&v| v >= vertex_count) {
                return Err(reject(GeometryError::InvalidReference {
                    feature: Feature::Edge(*edge),
                    index,
                    vertex_count,
                }));
            }
        }

        for (f, face) in self.faces().iter().enumerate() {
            if let Some(&index) = face.vertices().iter().find(|&&v| v >= vertex_count) {
                return Err(reject(GeometryError::InvalidReference {
                    feature: Feature::Face(f),
                    index,
                    vertex_count,
                }));
            }
        }

        Ok(())
    }

    /// Check that every vertex is finite, every face has at least three
    /// vertices and every edge has positive length.
    pub fn validate_geometry(&self) -> GeometryResult<()> {
        for (v, vertex) in self.vertices().iter().enumerate() {
            if !vertex.position.coords.iter().all(|c| c.is_finite()) {
                return Err(reject(GeometryError::NonFiniteVertex {
                    feature: Feature::Vertex(v),
                }));
            }
        }

        for (f, face) in self.faces().iter().enumerate() {
            if face.len() < 3 {
                return Err(reject(GeometryError::DegenerateFace {
                    feature: Feature::Face(f),
                    vertex_count: face.len(),
                }));
            }
        }

        for edge in self.edges() {
            let (Some(tail), Some(head)) = (self.vertex(edge.tail()), self.vertex(edge.head()))
            else {
                continue;
            };
            if edge.tail() == edge.head() || tail.position == head.position {
                return Err(reject(GeometryError::DegenerateEdge {
                    feature: Feature::Edge(*edge),
                }));
            }
        }

        Ok(())
    }

    /// Reference and geometry checks.
    pub fn validate(&self) -> GeometryResult<()> {
        self.validate_references()?;
        self.validate_geometry()
    }

    /// Full check that this is a closed convex polyhedron.
    ///
    /// On top of [`validate`](Self::validate):
    ///
    /// 1. every face boundary segment is in the edge list
    /// 2. every edge is used by exactly two faces, in opposite directions
    /// 3. `V - E + F = 2`
    /// 4. every face is planar with only convex corners
    /// 5. no vertex lies in front of any face plane
    pub fn validate_closed_convex(&self) -> GeometryResult<()> {
        self.validate()?;

        let mut uses: HashMap<Edge, SmallVec<[(usize, usize); 2]>> = HashMap::new();
        for (f, face) in self.faces().iter().enumerate() {
            for (from, to) in face.boundary() {
                let edge = Edge::new(from, to);
                if !self.edges().contains(&edge) {
                    return Err(reject(GeometryError::MissingEdge {
                        feature: Feature::Face(f),
                        tail: from,
                        head: to,
                    }));
                }
                uses.entry(edge).or_default().push((from, to));
            }
        }

        for edge in self.edges() {
            let traversals = uses.get(edge).map_or(&[][..], SmallVec::as_slice);
            let opposite = matches!(traversals, [(a, b), (c, d)] if a == d && b == c);
            if !opposite {
                return Err(reject(GeometryError::NotClosed {
                    feature: Feature::Edge(*edge),
                    face_count: traversals.len(),
                }));
            }
        }

        let (vertices, edges, faces) = (
            self.vertices().len(),
            self.edges().len(),
            self.faces().len(),
        );
        if vertices + faces != edges + 2 {
            return Err(reject(GeometryError::EulerCharacteristic {
                vertices,
                edges,
                faces,
            }));
        }

        let tolerance = CONVEXITY_TOLERANCE * self.bounding_radius().max(1.0);
        for (f, face) in self.faces().iter().enumerate() {
            let planar = face
                .vertices()
                .iter()
                .all(|&v| self.face_plane_distance(f, &self.position(v)).abs() <= tolerance);
            if !planar || !self.is_face_convex(f) {
                return Err(reject(GeometryError::NotConvex {
                    feature: Feature::Face(f),
                }));
            }

            if self
                .vertices()
                .iter()
                .any(|v| self.face_plane_distance(f, &v.position) > tolerance)
            {
                return Err(reject(GeometryError::NotConvex {
                    feature: Feature::Face(f),
                }));
            }
        }

        Ok(())
    }
}
