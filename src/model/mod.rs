//! Runtime view over a model definition. Scenes only ever see this module's
//! types: the definition tables stay an implementation detail.

pub mod def;
pub mod fixtures;
pub mod source;
pub mod validate;

use std::ops::Range;

use anyhow::Result;
use glam::Vec3;

pub use def::{
    EdgeDef, FaceDef, FaceTypeDef, GroupName, HardwareInfo, LedGroupDef, ModelDef, NeighborDef,
    NeighborEntry, PointDef, Polygon, MAX_GROUP_LEDS, MAX_GROUP_NAME, MAX_NEIGHBORS,
};
pub use validate::{FaceGeometryReport, GeometryChecks, IntegrityChecks, ModelValidation};

/// Boundary segment of a face. `connected_face_id` is `None` for a free
/// edge; this is the `-1`/`NO_CONNECTION` of the wire-level interface.
pub type Edge = EdgeDef;

impl EdgeDef {
    pub fn has_connection(&self) -> bool {
        self.connected_face_id.is_some()
    }
}

/// One LED's position and neighborhood. Constructed once from the model
/// definition, never mutated.
#[derive(Debug, Clone)]
pub struct Point {
    id: u16,
    face_id: u8,
    pos: Vec3,
    neighbors: Vec<NeighborEntry>,
}

impl Point {
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn face_id(&self) -> u8 {
        self.face_id
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    pub fn z(&self) -> f32 {
        self.pos.z
    }

    /// Recorded nearest neighbors, ascending by distance.
    pub fn neighbors(&self) -> &[NeighborEntry] {
        &self.neighbors
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        self.pos.distance(other.pos)
    }

    pub fn is_neighbor(&self, other: &Point) -> bool {
        self.neighbors.iter().any(|n| n.id == other.id)
    }
}

#[derive(Debug, Clone)]
struct FaceRuntime {
    id: u8,
    type_id: u8,
    rotation: u8,
    geometric_id: u8,
    led_offset: u16,
    led_count: u16,
    vertices: Vec<Vec3>,
    /// Group name → global LED indices, resolved at construction.
    groups: Vec<(GroupName, Vec<u16>)>,
}

/// Concrete per-device model: owns the runtime point and face tables and
/// answers every geometry query a scene can make. All lookups are total —
/// invalid input clamps or returns an empty result with a logged warning,
/// never a panic.
#[derive(Debug, Clone)]
pub struct Model {
    def: ModelDef,
    points: Vec<Point>,
    faces: Vec<FaceRuntime>,
    /// geometric position → logical face id
    geom_to_logical: Vec<u8>,
    sphere_radius: f32,
}

impl Model {
    /// Build the runtime view. Fails when the definition violates its
    /// structural invariants; softer geometric problems are reported by
    /// [`Model::validate_model`] instead.
    pub fn new(def: ModelDef) -> Result<Model> {
        def.validate()?;

        let mut faces = Vec::with_capacity(def.faces.len());
        let mut offset = 0u16;
        for face in &def.faces {
            let face_type = def
                .face_type(face.type_id)
                .expect("validated face type exists");
            let groups = def
                .groups
                .iter()
                .filter(|g| g.face_type_id == face.type_id)
                .map(|g| {
                    let global = g.led_indices.iter().map(|i| offset + i).collect();
                    (g.name, global)
                })
                .collect();
            faces.push(FaceRuntime {
                id: face.id,
                type_id: face.type_id,
                rotation: face.rotation,
                geometric_id: face.geometric_id,
                led_offset: offset,
                led_count: face_type.num_leds,
                vertices: face.vertices.clone(),
                groups,
            });
            offset += face_type.num_leds;
        }

        let mut geom_to_logical = vec![0u8; def.faces.len()];
        for face in &def.faces {
            geom_to_logical[face.geometric_id as usize] = face.id;
        }

        let points = def
            .points
            .iter()
            .map(|p| {
                let neighbors = def
                    .neighbors
                    .iter()
                    .find(|n| n.point_id == p.id)
                    .map(|n| n.neighbors.clone())
                    .unwrap_or_default();
                Point {
                    id: p.id,
                    face_id: p.face_id,
                    pos: p.pos,
                    neighbors,
                }
            })
            .collect();

        let sphere_radius = def.resolved_sphere_radius();

        Ok(Model {
            def,
            points,
            faces,
            geom_to_logical,
            sphere_radius,
        })
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn sphere_radius(&self) -> f32 {
        self.sphere_radius
    }

    pub fn hardware(&self) -> &HardwareInfo {
        &self.def.hardware
    }

    pub fn def(&self) -> &ModelDef {
        &self.def
    }

    /// Point by global LED id. Out-of-range ids clamp to the last point.
    pub fn point(&self, id: usize) -> &Point {
        if id >= self.points.len() {
            log::warn!(
                "point index {id} out of range ({}), clamping",
                self.points.len()
            );
            return self.points.last().expect("model has at least one point");
        }
        &self.points[id]
    }

    /// Face at a *geometric position*. Scenes that iterate positions get a
    /// spatially stable order regardless of wiring order; the permutation
    /// declared by the model is consulted here. Out-of-range clamps.
    pub fn face(&self, geometric_index: usize) -> FaceView<'_> {
        let index = if geometric_index >= self.faces.len() {
            log::warn!(
                "face position {geometric_index} out of range ({}), clamping",
                self.faces.len()
            );
            self.faces.len() - 1
        } else {
            geometric_index
        };
        let logical = self.geom_to_logical[index] as usize;
        FaceView {
            model: self,
            face: &self.faces[logical],
        }
    }

    /// Face view by logical (wiring-order) id.
    pub fn face_by_logical_id(&self, face_id: usize) -> Option<FaceView<'_>> {
        self.faces.get(face_id).map(|face| FaceView { model: self, face })
    }

    /// Number of boundary edges of a face (by logical id); 0 when invalid.
    pub fn face_edge_count(&self, face_id: usize) -> usize {
        let Some(face) = self.faces.get(face_id) else {
            log::warn!("face_edge_count: unknown face {face_id}");
            return 0;
        };
        self.def
            .face_type(face.type_id)
            .map(|t| t.polygon.edge_count())
            .unwrap_or(0)
    }

    /// Logical id of the face across edge `edge_index` of face `face_id`;
    /// `None` for free edges and invalid input.
    pub fn face_at_edge(&self, face_id: usize, edge_index: usize) -> Option<u8> {
        if face_id >= self.faces.len() {
            log::warn!("face_at_edge: unknown face {face_id}");
            return None;
        }
        self.def
            .edges
            .iter()
            .find(|e| e.face_id as usize == face_id && e.edge_index as usize == edge_index)
            .and_then(|e| e.connected_face_id)
    }

    /// Global LED indices of a named group on a face (by logical id), in
    /// declared order. Empty on any miss: unknown name, unknown face, or a
    /// group declared for a different face type.
    pub fn group(&self, name: &str, face_id: usize) -> &[u16] {
        let Some(face) = self.faces.get(face_id) else {
            log::warn!("group lookup on unknown face {face_id}");
            return &[];
        };
        for (group_name, indices) in &face.groups {
            if group_name.matches(name) {
                return indices;
            }
        }
        &[]
    }

    /// Edge record by flat index into the edge table.
    pub fn edges(&self, edge_id: usize) -> Option<&Edge> {
        self.def.edges.get(edge_id)
    }

    pub fn edge_count(&self) -> usize {
        self.def.edges.len()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Faces in geometric-position order.
    pub fn faces(&self) -> impl Iterator<Item = FaceView<'_>> {
        (0..self.faces.len()).map(move |i| self.face(i))
    }
}

/// Borrowed view of one face. LED colors are not reachable from here — the
/// buffer belongs to the platform — so LED access composes as
/// `buffer.face_slice_mut(&face)` over [`FaceView::led_range`].
#[derive(Clone, Copy)]
pub struct FaceView<'a> {
    model: &'a Model,
    face: &'a FaceRuntime,
}

impl<'a> FaceView<'a> {
    /// Logical (wiring-order) face id.
    pub fn id(&self) -> u8 {
        self.face.id
    }

    pub fn geometric_id(&self) -> u8 {
        self.face.geometric_id
    }

    pub fn face_type(&self) -> &'a FaceTypeDef {
        self.model
            .def
            .face_type(self.face.type_id)
            .expect("validated face type exists")
    }

    pub fn rotation(&self) -> u8 {
        self.face.rotation
    }

    pub fn led_offset(&self) -> usize {
        self.face.led_offset as usize
    }

    pub fn led_count(&self) -> usize {
        self.face.led_count as usize
    }

    /// Global buffer range owned by this face.
    pub fn led_range(&self) -> Range<usize> {
        let offset = self.face.led_offset as usize;
        offset..offset + self.face.led_count as usize
    }

    pub fn vertices(&self) -> &'a [Vec3] {
        &self.face.vertices
    }

    pub fn edge_count(&self) -> usize {
        self.face_type().polygon.edge_count()
    }

    /// Midpoint of edge `edge_index`; the last edge wraps back to vertex 0.
    pub fn edge_center(&self, edge_index: usize) -> Vec3 {
        let vertices = &self.face.vertices;
        if vertices.is_empty() {
            return Vec3::ZERO;
        }
        let start = vertices[edge_index % vertices.len()];
        let end = vertices[(edge_index + 1) % vertices.len()];
        (start + end) * 0.5
    }

    /// Midpoint between two vertices; `Vec3::ZERO` when either index is out
    /// of range.
    pub fn vertex_midpoint(&self, i: usize, j: usize) -> Vec3 {
        let vertices = &self.face.vertices;
        match (vertices.get(i), vertices.get(j)) {
            (Some(a), Some(b)) => (*a + *b) * 0.5,
            _ => {
                log::warn!("vertex_midpoint({i}, {j}) out of range on face {}", self.face.id);
                Vec3::ZERO
            }
        }
    }

    /// Vertex centroid, falling back to the LED centroid for faces without
    /// vertex data.
    pub fn centroid(&self) -> Vec3 {
        if !self.face.vertices.is_empty() {
            let sum: Vec3 = self.face.vertices.iter().copied().sum();
            return sum / self.face.vertices.len() as f32;
        }
        let range = self.led_range();
        let count = range.len().max(1);
        let sum: Vec3 = range.map(|i| self.model.points[i].pos).sum();
        sum / count as f32
    }

    /// Global LED indices of a named group on this face. Empty on miss.
    pub fn group(&self, name: &str) -> &'a [u16] {
        for (group_name, indices) in &self.face.groups {
            if group_name.matches(name) {
                return indices;
            }
        }
        &[]
    }

    /// Names of every group declared for this face's type.
    pub fn group_names(&self) -> Vec<&'a str> {
        self.face
            .groups
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn face_at_edge(&self, edge_index: usize) -> Option<u8> {
        self.model.face_at_edge(self.face.id as usize, edge_index)
    }

    /// All recorded edges of this face.
    pub fn edges(&self) -> impl Iterator<Item = &'a Edge> {
        let id = self.face.id;
        self.model.def.edges.iter().filter(move |e| e.face_id == id)
    }

    /// Fill `out` with `(global led index, distance)` pairs for this face's
    /// LEDs within `max_distance` of `origin`, sorted ascending. The caller
    /// owns (and can reuse) the buffer, keeping the tick path allocation
    /// free once warm.
    pub fn nearby_leds(&self, origin: Vec3, max_distance: f32, out: &mut Vec<(u16, f32)>) {
        out.clear();
        for index in self.led_range() {
            let distance = self.model.points[index].pos.distance(origin);
            if distance <= max_distance {
                out.push((index as u16, distance));
            }
        }
        out.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    /// Per-face geometry summary used by the validation report and the
    /// inspector.
    pub fn validate_geometry(&self) -> FaceGeometryReport {
        let bound = self.model.sphere_radius * validate::COORDINATE_BOUND_FACTOR;
        let mut coordinates_reasonable = true;
        for vertex in &self.face.vertices {
            if !vertex.is_finite() || vertex.length() > bound {
                coordinates_reasonable = false;
            }
        }
        let mut face_radius = 0.0f32;
        let centroid = self.centroid();
        for index in self.led_range() {
            let pos = self.model.points[index].pos;
            if !pos.is_finite() || pos.length() > bound {
                coordinates_reasonable = false;
            }
            face_radius = face_radius.max(pos.distance(centroid));
        }
        FaceGeometryReport {
            has_vertices: !self.face.vertices.is_empty(),
            has_leds: self.face.led_count > 0,
            coordinates_reasonable,
            vertex_count: self.face.vertices.len(),
            led_count: self.face.led_count as usize,
            face_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pentagon() -> Model {
        Model::new(fixtures::basic_pentagon()).unwrap()
    }

    #[test]
    fn counts_and_radius_come_from_the_definition() {
        let model = pentagon();
        assert_eq!(model.point_count(), 15);
        assert_eq!(model.face_count(), 3);
        assert!((model.sphere_radius() - 395.034).abs() < 1e-3);
    }

    #[test]
    fn face_led_ranges_are_contiguous() {
        let model = pentagon();
        assert_eq!(model.face(0).led_range(), 0..5);
        assert_eq!(model.face(1).led_range(), 5..10);
        assert_eq!(model.face(2).led_range(), 10..15);
    }

    #[test]
    fn point_lookup_clamps_out_of_range() {
        let model = pentagon();
        assert_eq!(model.point(3).id(), 3);
        assert_eq!(model.point(99).id(), 14);
    }

    #[test]
    fn remap_addresses_faces_by_geometric_position() {
        let model = Model::new(fixtures::pyramid_with_remap()).unwrap();
        assert_eq!(model.face(0).id(), 2);
        assert_eq!(model.face(1).id(), 3);
        assert_eq!(model.face(2).id(), 0);
        assert_eq!(model.face(3).id(), 1);
        assert_eq!(model.face(0).led_range(), 6..9);
    }

    #[test]
    fn group_lookup_is_face_relative() {
        let model = pentagon();
        assert_eq!(model.group("center", 0), &[0]);
        assert_eq!(model.group("center", 1), &[5]);
        assert_eq!(model.group("ring1", 2), &[11, 12, 13, 14]);
        assert!(model.group("Center", 0).is_empty());
        assert!(model.group("ring", 0).is_empty());
        assert!(model.group("center", 9).is_empty());
    }

    #[test]
    fn edge_adjacency_reads_the_edge_table() {
        let model = pentagon();
        assert_eq!(model.face_at_edge(0, 1), Some(1));
        assert_eq!(model.face_at_edge(0, 0), None);
        assert_eq!(model.face_at_edge(0, 9), None);
        assert_eq!(model.face_at_edge(7, 0), None);
        assert_eq!(model.face_edge_count(0), 5);
        assert_eq!(model.face_edge_count(9), 0);
    }

    #[test]
    fn face_edges_iterate_only_their_face() {
        let model = pentagon();
        let face = model.face(1);
        let edges: Vec<_> = face.edges().collect();
        assert_eq!(edges.len(), 5);
        assert!(edges.iter().all(|e| e.face_id == 1));
    }

    #[test]
    fn edge_center_wraps_at_the_last_edge() {
        let model = pentagon();
        let face = model.face(0);
        let last = face.edge_center(4);
        let expected = (face.vertices()[4] + face.vertices()[0]) * 0.5;
        assert!((last - expected).length() < 1e-4);
    }

    #[test]
    fn nearby_leds_sorts_and_truncates() {
        let model = pentagon();
        let face = model.face(0);
        let origin = model.point(0).pos();

        let mut out = Vec::new();
        face.nearby_leds(origin, f32::INFINITY, &mut out);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].0, 0);
        assert!(out.windows(2).all(|w| w[0].1 <= w[1].1));

        face.nearby_leds(origin, 10.0, &mut out);
        assert_eq!(out.len(), 1);
        assert!(out.iter().all(|(_, d)| *d <= 10.0));
    }

    #[test]
    fn nearby_leds_is_restricted_to_the_face() {
        let model = pentagon();
        let face = model.face(1);
        let mut out = Vec::new();
        face.nearby_leds(Vec3::ZERO, f32::INFINITY, &mut out);
        assert!(out.iter().all(|(i, _)| (5..10).contains(&(*i as usize))));
    }

    #[test]
    fn neighbors_carry_over_from_the_definition() {
        let model = pentagon();
        let p0 = model.point(0);
        assert_eq!(p0.neighbors().len(), 4);
        assert!(p0.is_neighbor(model.point(2)));
        assert!(!p0.is_neighbor(model.point(9)));
        let d = p0.distance_to(model.point(2));
        assert!((d - 13.08).abs() < 0.05);
    }

    #[test]
    fn face_geometry_report_is_sane() {
        let model = pentagon();
        let report = model.face(0).validate_geometry();
        assert!(report.has_vertices);
        assert!(report.has_leds);
        assert!(report.coordinates_reasonable);
        assert_eq!(report.vertex_count, 5);
        assert_eq!(report.led_count, 5);
        assert!(report.face_radius > 0.0);
    }
}
