//! Index-based convex polyhedron.
//!
//! A [`Polyhedron`] owns three arrays. Edges and faces point into the vertex
//! array by index; nothing points at edges or faces. Adjacency is derived by
//! scanning, so every adjacency query is a lazy filter over an owned array.
//!
//! Removing a vertex or an edge removes every face that uses it and shifts
//! the indices above the removed vertex down by one. The removed faces are
//! returned so the caller can update whatever it keeps alongside them.

use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;
use tracing::trace;

use sim_types::Pose;

use crate::feature::{ConvexityHint, Edge, Face, Feature, Vertex};
use crate::GEOM_EPSILON;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Neighbour list of a single feature. Most features on the shapes used in
/// practice have at most eight neighbours.
pub type Neighbors = SmallVec<[Feature; 8]>;

/// A convex polyhedron stored as vertex, edge and face arrays.
///
/// # Example
///
/// ```
/// use sim_vclip::{Feature, Polyhedron};
/// use nalgebra::Vector3;
///
/// let cube = Polyhedron::cuboid(Vector3::new(1.0, 1.0, 1.0));
/// assert_eq!(cube.vertices().len(), 8);
/// assert_eq!(cube.edges().len(), 12);
/// assert_eq!(cube.faces().len(), 6);
/// assert_eq!(cube.neighbors(Feature::Vertex(0)).len(), 3);
/// assert!(cube.validate_closed_convex().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyhedron {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
}

impl Polyhedron {
    /// Create an empty polyhedron.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A polyhedron consisting of a single vertex.
    ///
    /// Used to run V-Clip against a point, e.g. a sphere centre.
    #[must_use]
    pub fn point(position: Point3<f64>) -> Self {
        let mut poly = Self::new();
        poly.add_vertex(position);
        poly
    }

    /// Build a polyhedron from vertex positions and face loops.
    ///
    /// The edge list is derived from the face boundaries in first-seen order.
    /// Faces are marked [`ConvexityHint::Convex`].
    #[must_use]
    pub fn from_faces(positions: &[Point3<f64>], faces: &[Vec<usize>]) -> Self {
        let mut poly = Self::new();
        for &p in positions {
            poly.add_vertex(p);
        }

        let mut seen: HashSet<Edge> = HashSet::new();
        for loop_ in faces {
            let face = Face::convex(loop_.clone());
            for edge in face.edges() {
                if seen.insert(edge) {
                    poly.add_edge(edge);
                }
            }
            poly.add_face(face);
        }
        poly
    }

    /// Axis-aligned box centred on the origin.
    ///
    /// Vertices are numbered with x varying fastest around the bottom square
    /// (`z = -h.z`) then the top square. Faces are bottom, top, front (`-y`),
    /// right (`+x`), back (`+y`), left (`-x`).
    #[must_use]
    pub fn cuboid(half_extents: Vector3<f64>) -> Self {
        let h = half_extents.abs();
        let positions = [
            Point3::new(-h.x, -h.y, -h.z),
            Point3::new(h.x, -h.y, -h.z),
            Point3::new(h.x, h.y, -h.z),
            Point3::new(-h.x, h.y, -h.z),
            Point3::new(-h.x, -h.y, h.z),
            Point3::new(h.x, -h.y, h.z),
            Point3::new(h.x, h.y, h.z),
            Point3::new(-h.x, h.y, h.z),
        ];
        let faces = [
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        Self::from_faces(&positions, &faces)
    }

    /// Tetrahedron over four points, wound so every normal faces outward
    /// regardless of the order the points are given in.
    #[must_use]
    pub fn tetrahedron(points: [Point3<f64>; 4]) -> Self {
        let [a, b, c, d] = points;
        let orientation = (b - a).cross(&(c - a)).dot(&(d - a));
        let faces = if orientation >= 0.0 {
            [vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]]
        } else {
            [vec![0, 1, 2], vec![0, 3, 1], vec![1, 3, 2], vec![0, 2, 3]]
        };
        Self::from_faces(&points, &faces)
    }

    /// A copy with every vertex mapped through `pose`.
    #[must_use]
    pub fn transformed(&self, pose: &Pose) -> Self {
        let mut out = self.clone();
        for v in &mut out.vertices {
            v.position = pose.transform_point(&v.position);
        }
        out.refresh_normals();
        out
    }

    // ==================== Accessors ====================

    /// All vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All faces.
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Whether the polyhedron has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex by index.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    /// Face by index.
    #[must_use]
    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    /// Position of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Callers in this crate validate
    /// references before walking features.
    #[must_use]
    pub fn position(&self, index: usize) -> Point3<f64> {
        self.vertices[index].position
    }

    /// Whether `feature` refers to something this polyhedron has.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::Vertex(v) => v < self.vertices.len(),
            Feature::Edge(e) => self.edges.contains(&e),
            Feature::Face(f) => f < self.faces.len(),
        }
    }

    /// Mean of the vertex positions.
    #[must_use]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.position.coords);
        #[allow(clippy::cast_precision_loss)]
        let n = self.vertices.len() as f64;
        Some(Point3::from(sum / n))
    }

    /// Largest distance from the centroid to any vertex.
    #[must_use]
    pub fn bounding_radius(&self) -> f64 {
        let Some(c) = self.centroid() else {
            return 0.0;
        };
        self.vertices
            .iter()
            .map(|v| (v.position - c).norm())
            .fold(0.0, f64::max)
    }

    // ==================== Mutation ====================

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new(position, index));
        index
    }

    /// Append an edge and return its index.
    pub fn add_edge(&mut self, edge: Edge) -> usize {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    /// Append a face, computing its cached normal, and return its index.
    pub fn add_face(&mut self, mut face: Face) -> usize {
        face.cache_normal(self.compute_normal(&face));
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Move a vertex. Faces using it get their normals recomputed.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn set_vertex_position(&mut self, index: usize, position: Point3<f64>) -> bool {
        let Some(v) = self.vertices.get_mut(index) else {
            return false;
        };
        v.position = position;
        for i in 0..self.faces.len() {
            if self.faces[i].contains_vertex(index) {
                let normal = self.compute_normal(&self.faces[i]);
                self.faces[i].cache_normal(normal);
            }
        }
        true
    }

    /// Remove a vertex, every edge and face using it, and shift higher
    /// vertex indices down by one.
    ///
    /// Returns the removed faces as they were before the removal, or `None`
    /// if `index` is out of range.
    pub fn remove_vertex(&mut self, index: usize) -> Option<Vec<Face>> {
        if index >= self.vertices.len() {
            return None;
        }

        self.vertices.remove(index);
        for v in &mut self.vertices[index..] {
            v.index -= 1;
        }

        self.edges.retain(|e| !e.contains(index));
        for e in &mut self.edges {
            e.shift_above(index);
        }

        let (removed, kept): (Vec<Face>, Vec<Face>) = std::mem::take(&mut self.faces)
            .into_iter()
            .partition(|f| f.contains_vertex(index));
        self.faces = kept;
        for f in &mut self.faces {
            f.shift_above(index);
        }
        self.refresh_normals();

        trace!(
            vertex = index,
            removed_faces = removed.len(),
            "removed polyhedron vertex"
        );
        Some(removed)
    }

    /// Remove an edge and every face whose boundary uses it.
    ///
    /// Returns the removed faces, or `None` if the edge is not present.
    pub fn remove_edge(&mut self, edge: Edge) -> Option<Vec<Face>> {
        let position = self.edges.iter().position(|e| *e == edge)?;
        self.edges.remove(position);

        let (removed, kept): (Vec<Face>, Vec<Face>) = std::mem::take(&mut self.faces)
            .into_iter()
            .partition(|f| f.contains_edge(&edge));
        self.faces = kept;

        trace!(%edge, removed_faces = removed.len(), "removed polyhedron edge");
        Some(removed)
    }

    /// Remove a face. Edges and vertices are left in place.
    pub fn remove_face(&mut self, index: usize) -> Option<Face> {
        (index < self.faces.len()).then(|| self.faces.remove(index))
    }

    // ==================== Adjacency ====================

    /// Edges incident to vertex `v`.
    pub fn vertex_edges(&self, v: usize) -> impl Iterator<Item = Edge> + Clone + '_ {
        self.edges.iter().copied().filter(move |e| e.contains(v))
    }

    /// Indices of faces using vertex `v`.
    pub fn vertex_faces(&self, v: usize) -> impl Iterator<Item = usize> + Clone + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.contains_vertex(v))
            .map(|(i, _)| i)
    }

    /// Indices of faces whose boundary contains `edge`.
    pub fn edge_faces(&self, edge: Edge) -> impl Iterator<Item = usize> + Clone + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.contains_edge(&edge))
            .map(|(i, _)| i)
    }

    /// Boundary edges of face `f`, oriented along its winding.
    ///
    /// Empty if `f` is out of range.
    pub fn face_edges(&self, f: usize) -> impl Iterator<Item = Edge> + Clone + '_ {
        self.faces.get(f).into_iter().flat_map(Face::edges)
    }

    /// Vertices of face `f` in winding order.
    pub fn face_vertices(&self, f: usize) -> impl Iterator<Item = usize> + Clone + '_ {
        self.faces
            .get(f)
            .into_iter()
            .flat_map(|face| face.vertices().iter().copied())
    }

    /// Features adjacent to `feature`: edges of a vertex, endpoints then
    /// faces of an edge, boundary edges of a face.
    #[must_use]
    pub fn neighbors(&self, feature: Feature) -> Neighbors {
        match feature {
            Feature::Vertex(v) => self.vertex_edges(v).map(Feature::Edge).collect(),
            Feature::Edge(e) => e
                .vertices()
                .into_iter()
                .map(Feature::Vertex)
                .chain(self.edge_faces(e).map(Feature::Face))
                .collect(),
            Feature::Face(f) => self.face_edges(f).map(Feature::Edge).collect(),
        }
    }

    // ==================== Face geometry ====================

    /// Outward unit normal of face `f`.
    ///
    /// Uses the cached normal when present. Degenerate or missing faces give
    /// the zero vector.
    #[must_use]
    pub fn face_normal(&self, f: usize) -> Vector3<f64> {
        self.faces
            .get(f)
            .and_then(|face| face.cached_normal().or_else(|| self.compute_normal(face)))
            .unwrap_or_else(Vector3::zeros)
    }

    /// Signed distance from `point` to the plane of face `f`, positive on the
    /// outward side.
    #[must_use]
    pub fn face_plane_distance(&self, f: usize, point: &Point3<f64>) -> f64 {
        let Some(&first) = self.faces.get(f).and_then(|face| face.vertices().first()) else {
            return 0.0;
        };
        self.face_normal(f).dot(&(point - self.position(first)))
    }

    /// Direction of `edge` as face `f` traverses it.
    ///
    /// `None` if `edge` is not on `f`'s boundary.
    #[must_use]
    pub fn edge_direction_in_face(&self, edge: &Edge, f: usize) -> Option<Vector3<f64>> {
        let (from, to) = self.faces.get(f)?.directed(edge)?;
        Some(self.position(to) - self.position(from))
    }

    /// Midpoint of `edge`.
    #[must_use]
    pub fn edge_midpoint(&self, edge: &Edge) -> Point3<f64> {
        nalgebra::center(&self.position(edge.tail()), &self.position(edge.head()))
    }

    /// Whether the interior angle of face `f` at loop position `corner` is
    /// at most pi, measured against the face normal.
    #[must_use]
    pub fn is_vertex_convex(&self, f: usize, corner: usize) -> bool {
        let Some(face) = self.faces.get(f) else {
            return false;
        };
        let n = face.len();
        if n < 3 || corner >= n {
            return false;
        }
        let loop_ = face.vertices();
        let prev = self.position(loop_[(corner + n - 1) % n]);
        let cur = self.position(loop_[corner]);
        let next = self.position(loop_[(corner + 1) % n]);
        let turn = (cur - prev).cross(&(next - cur));
        turn.dot(&self.face_normal(f)) >= -GEOM_EPSILON * (1.0 + turn.norm())
    }

    /// Whether every corner of face `f` is convex.
    #[must_use]
    pub fn is_face_convex(&self, f: usize) -> bool {
        self.faces
            .get(f)
            .is_some_and(|face| (0..face.len()).all(|corner| self.is_vertex_convex(f, corner)))
    }

    /// Normal of `face` from current positions, or `None` if degenerate or
    /// referencing missing vertices.
    pub(crate) fn compute_normal(&self, face: &Face) -> Option<Vector3<f64>> {
        let loop_ = face.vertices();
        if loop_.len() < 3 || loop_.iter().any(|&v| v >= self.vertices.len()) {
            return None;
        }

        if face.hint() == ConvexityHint::Convex {
            let p0 = self.position(loop_[0]);
            let p1 = self.position(loop_[1]);
            let p2 = self.position(loop_[2]);
            if let Some(n) = (p1 - p0).cross(&(p2 - p1)).try_normalize(GEOM_EPSILON) {
                return Some(n);
            }
        }

        // Newell's method: robust for non-convex and nearly collinear loops.
        let sum = face.boundary().fold(Vector3::zeros(), |acc, (from, to)| {
            acc + self.position(from).coords.cross(&self.position(to).coords)
        });
        sum.try_normalize(GEOM_EPSILON)
    }

    fn refresh_normals(&mut self) {
        for i in 0..self.faces.len() {
            let normal = self.compute_normal(&self.faces[i]);
            self.faces[i].cache_normal(normal);
        }
    }
}
