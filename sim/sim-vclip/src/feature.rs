//! Vertices, edges, faces and the `Feature` handle.
//!
//! Features reference each other only by index into the owning
//! [`Polyhedron`](crate::Polyhedron)'s arrays. Nothing here holds a pointer
//! back to the polyhedron, so a removal cascade can never leave a dangling
//! reference; it only has to shift indices.

use std::hash::{Hash, Hasher};

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A polyhedron vertex: its position and its own index in the vertex array.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position of the vertex.
    pub position: Point3<f64>,
    /// Index of this vertex in the owning polyhedron.
    pub index: usize,
}

impl Vertex {
    /// Create a vertex.
    #[must_use]
    pub const fn new(position: Point3<f64>, index: usize) -> Self {
        Self { position, index }
    }
}

/// An unordered pair of vertex indices.
///
/// `Edge::new(1, 4) == Edge::new(4, 1)`. The stored order still matters for
/// parametrisation: the edge runs from [`tail`](Self::tail) to
/// [`head`](Self::head).
#[derive(Debug, Clone, Copy, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    tail: usize,
    head: usize,
}

impl Edge {
    /// Create an edge between two vertex indices.
    #[must_use]
    pub const fn new(tail: usize, head: usize) -> Self {
        Self { tail, head }
    }

    /// First endpoint.
    #[must_use]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    /// Second endpoint.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Both endpoints, tail first.
    #[must_use]
    pub const fn vertices(&self) -> [usize; 2] {
        [self.tail, self.head]
    }

    /// Endpoints ordered `(low, high)`.
    #[must_use]
    pub fn sorted(&self) -> (usize, usize) {
        (self.tail.min(self.head), self.tail.max(self.head))
    }

    /// Whether `vertex` is one of the endpoints.
    #[must_use]
    pub const fn contains(&self, vertex: usize) -> bool {
        self.tail == vertex || self.head == vertex
    }

    /// The endpoint opposite `vertex`, if `vertex` is an endpoint.
    #[must_use]
    pub const fn other(&self, vertex: usize) -> Option<usize> {
        if self.tail == vertex {
            Some(self.head)
        } else if self.head == vertex {
            Some(self.tail)
        } else {
            None
        }
    }

    /// Shift endpoint indices above `removed` down by one.
    pub(crate) fn shift_above(&mut self, removed: usize) {
        if self.tail > removed {
            self.tail -= 1;
        }
        if self.head > removed {
            self.head -= 1;
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (low, high) = self.sorted();
        write!(f, "{low}-{high}")
    }
}

/// What is known about a face's convexity before looking at its vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConvexityHint {
    /// Known convex: the normal comes from the first corner alone.
    Convex,
    /// Known non-convex: the normal needs the full boundary sum.
    Nonconvex,
    /// Unknown: treated like `Nonconvex` until checked.
    #[default]
    Unspecified,
}

/// An ordered loop of at least three vertex indices.
///
/// Counter-clockwise winding, seen from outside, defines the outward normal.
/// Two faces are equal when one is a rotation of the other; a reflection
/// (opposite winding) is a different face.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    vertices: Vec<usize>,
    hint: ConvexityHint,
    #[cfg_attr(feature = "serde", serde(skip))]
    normal: Option<Vector3<f64>>,
}

impl Face {
    /// Create a face from a vertex loop.
    #[must_use]
    pub fn new(vertices: Vec<usize>, hint: ConvexityHint) -> Self {
        Self {
            vertices,
            hint,
            normal: None,
        }
    }

    /// Create a face known to be convex.
    #[must_use]
    pub fn convex(vertices: Vec<usize>) -> Self {
        Self::new(vertices, ConvexityHint::Convex)
    }

    /// The vertex loop.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Number of vertices (and boundary edges).
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the loop is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The convexity hint.
    #[must_use]
    pub const fn hint(&self) -> ConvexityHint {
        self.hint
    }

    /// Replace the convexity hint.
    pub fn set_hint(&mut self, hint: ConvexityHint) {
        self.hint = hint;
        self.normal = None;
    }

    /// Replace the vertex loop. Invalidates the cached normal.
    pub fn set_vertices(&mut self, vertices: Vec<usize>) {
        self.vertices = vertices;
        self.normal = None;
    }

    /// The cached outward normal, if one has been computed.
    #[must_use]
    pub const fn cached_normal(&self) -> Option<Vector3<f64>> {
        self.normal
    }

    pub(crate) fn cache_normal(&mut self, normal: Option<Vector3<f64>>) {
        self.normal = normal;
    }

    /// Directed boundary segments `(from, to)` in winding order.
    pub fn boundary(&self) -> impl Iterator<Item = (usize, usize)> + Clone + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Boundary edges in winding order, each oriented along the winding.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + Clone + '_ {
        self.boundary().map(|(from, to)| Edge::new(from, to))
    }

    /// Whether `vertex` is on this face.
    #[must_use]
    pub fn contains_vertex(&self, vertex: usize) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Whether `edge` is one of this face's boundary segments.
    #[must_use]
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.directed(edge).is_some()
    }

    /// `edge` oriented the way this face's winding traverses it.
    #[must_use]
    pub fn directed(&self, edge: &Edge) -> Option<(usize, usize)> {
        self.boundary()
            .find(|&(from, to)| Edge::new(from, to) == *edge)
    }

    /// Shift vertex indices above `removed` down by one.
    pub(crate) fn shift_above(&mut self, removed: usize) {
        let mut changed = false;
        for v in &mut self.vertices {
            if *v > removed {
                *v -= 1;
                changed = true;
            }
        }
        if changed {
            self.normal = None;
        }
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        let n = self.vertices.len();
        if n != other.vertices.len() {
            return false;
        }
        if n == 0 {
            return true;
        }
        let Some(offset) = other.vertices.iter().position(|&v| v == self.vertices[0]) else {
            return false;
        };
        (0..n).all(|i| self.vertices[i] == other.vertices[(i + offset) % n])
    }
}

/// Closed sum over the three feature kinds of a convex polyhedron.
///
/// Vertices and faces are referenced by index, edges by their vertex pair.
/// Equality and hashing follow each variant: edges compare unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Feature {
    /// A vertex, by index.
    Vertex(usize),
    /// An edge, by endpoints.
    Edge(Edge),
    /// A face, by index.
    Face(usize),
}

impl Feature {
    /// Topological dimension: 0 for vertices, 1 for edges, 2 for faces.
    #[must_use]
    pub const fn dimension(&self) -> u8 {
        match self {
            Self::Vertex(_) => 0,
            Self::Edge(_) => 1,
            Self::Face(_) => 2,
        }
    }

    /// Whether this is a vertex.
    #[must_use]
    pub const fn is_vertex(&self) -> bool {
        matches!(self, Self::Vertex(_))
    }

    /// Whether this is an edge.
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        matches!(self, Self::Edge(_))
    }

    /// Whether this is a face.
    #[must_use]
    pub const fn is_face(&self) -> bool {
        matches!(self, Self::Face(_))
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex(v) => write!(f, "Vertex({v})"),
            Self::Edge(e) => write!(f, "Edge({e})"),
            Self::Face(i) => write!(f, "Face({i})"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn test_edges_are_unordered() {
        assert_eq!(Edge::new(1, 4), Edge::new(4, 1));
        assert_ne!(Edge::new(1, 4), Edge::new(1, 5));

        let set: HashSet<Edge> = [Edge::new(1, 4), Edge::new(4, 1), Edge::new(2, 3)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_edge_other_endpoint() {
        let e = Edge::new(3, 7);
        assert_eq!(e.other(3), Some(7));
        assert_eq!(e.other(7), Some(3));
        assert_eq!(e.other(5), None);
    }

    #[test]
    fn test_face_equality_allows_rotation_not_reflection() {
        let f = Face::convex(vec![0, 1, 2, 3]);
        assert_eq!(f, Face::convex(vec![2, 3, 0, 1]));
        assert_eq!(f, Face::new(vec![1, 2, 3, 0], ConvexityHint::Unspecified));
        assert_ne!(f, Face::convex(vec![3, 2, 1, 0]));
        assert_ne!(f, Face::convex(vec![0, 1, 2]));
    }

    #[test]
    fn test_face_directs_edges_along_winding() {
        let f = Face::convex(vec![4, 5, 6]);
        assert_eq!(f.directed(&Edge::new(5, 4)), Some((4, 5)));
        assert_eq!(f.directed(&Edge::new(4, 6)), Some((6, 4)));
        assert_eq!(f.directed(&Edge::new(4, 7)), None);
        assert_eq!(f.edges().count(), 3);
    }

    #[test]
    fn test_set_vertices_invalidates_normal() {
        let mut f = Face::convex(vec![0, 1, 2]);
        f.cache_normal(Some(Vector3::z()));
        assert!(f.cached_normal().is_some());
        f.set_vertices(vec![0, 2, 1]);
        assert!(f.cached_normal().is_none());
    }

    #[test]
    fn test_feature_display_is_stable() {
        assert_eq!(Feature::Vertex(3).to_string(), "Vertex(3)");
        assert_eq!(Feature::Edge(Edge::new(9, 2)).to_string(), "Edge(2-9)");
        assert_eq!(Feature::Face(0).to_string(), "Face(0)");
        assert_eq!(Feature::Face(1).dimension(), 2);
    }
}
