//! Aggregated model validation. These checks diagnose suspect model data
//! without aborting the run; hard structural violations are rejected earlier
//! by `ModelDef::validate`.

use glam::Vec3;
use serde::Serialize;

use super::Model;

/// Most error strings kept in a report; failures past the cap still count.
pub const MAX_VALIDATION_ERRORS: usize = 16;

/// Coordinates are "reasonable" within this multiple of the sphere radius.
pub const COORDINATE_BOUND_FACTOR: f32 = 3.0;

/// Planarity and edge-coincidence tolerance, as a fraction of the sphere
/// radius.
pub const GEOMETRY_TOLERANCE_FACTOR: f32 = 1e-3;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GeometryChecks {
    pub all_faces_planar: bool,
    pub coordinates_reasonable: bool,
    pub vertices_within_bounds: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IntegrityChecks {
    pub face_ids_unique: bool,
    pub led_indexing_sequential: bool,
    pub indices_in_bounds: bool,
    pub edges_symmetric: bool,
}

/// Per-face geometry summary returned by `FaceView::validate_geometry`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaceGeometryReport {
    pub has_vertices: bool,
    pub has_leds: bool,
    pub coordinates_reasonable: bool,
    pub vertex_count: usize,
    pub led_count: usize,
    pub face_radius: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelValidation {
    pub is_valid: bool,
    pub total_checks: u32,
    pub failed_checks: u32,
    pub geometric: GeometryChecks,
    pub data_integrity: IntegrityChecks,
    pub errors: Vec<String>,
}

impl ModelValidation {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn record_failure(&mut self, message: String) {
        self.failed_checks += 1;
        if self.errors.len() < MAX_VALIDATION_ERRORS {
            self.errors.push(message);
        }
    }
}

impl Model {
    /// Run the aggregated validation checks. `check_geometry` covers the
    /// floating-point sanity checks (planarity, coordinate bounds);
    /// `check_data_integrity` covers the index/topology checks. Both default
    /// on in the inspector.
    pub fn validate_model(&self, check_geometry: bool, check_data_integrity: bool) -> ModelValidation {
        let mut report = ModelValidation {
            is_valid: true,
            geometric: GeometryChecks {
                all_faces_planar: true,
                coordinates_reasonable: true,
                vertices_within_bounds: true,
            },
            data_integrity: IntegrityChecks {
                face_ids_unique: true,
                led_indexing_sequential: true,
                indices_in_bounds: true,
                edges_symmetric: true,
            },
            ..ModelValidation::default()
        };

        let radius = self.sphere_radius();
        let bound = radius * COORDINATE_BOUND_FACTOR;
        let tolerance = radius * GEOMETRY_TOLERANCE_FACTOR;

        if check_data_integrity {
            self.check_face_ids(&mut report);
            self.check_led_indexing(&mut report);
            self.check_index_bounds(&mut report);
            self.check_edge_symmetry(&mut report, tolerance);
        }

        if check_geometry {
            self.check_coordinates(&mut report, bound);
            self.check_planarity(&mut report, tolerance);
        }

        report.is_valid = report.failed_checks == 0;
        report
    }

    fn check_face_ids(&self, report: &mut ModelValidation) {
        let mut seen = vec![false; self.face_count()];
        for face in &self.def().faces {
            report.total_checks += 1;
            let id = face.id as usize;
            if id >= seen.len() || seen[id] {
                report.data_integrity.face_ids_unique = false;
                report.record_failure(format!("duplicate or out-of-range face id {}", face.id));
            } else {
                seen[id] = true;
            }
        }
    }

    fn check_led_indexing(&self, report: &mut ModelValidation) {
        let mut expected_offset = 0usize;
        for index in 0..self.face_count() {
            report.total_checks += 1;
            let Some(face) = self.face_by_logical_id(index) else {
                continue;
            };
            if face.led_offset() != expected_offset {
                report.data_integrity.led_indexing_sequential = false;
                report.record_failure(format!(
                    "face {} starts at LED {} but {} expected",
                    face.id(),
                    face.led_offset(),
                    expected_offset
                ));
            }
            expected_offset += face.led_count();
        }
        report.total_checks += 1;
        if expected_offset != self.point_count() {
            report.data_integrity.led_indexing_sequential = false;
            report.record_failure(format!(
                "face LED counts sum to {expected_offset}, model has {} points",
                self.point_count()
            ));
        }
    }

    fn check_index_bounds(&self, report: &mut ModelValidation) {
        for point in self.points() {
            report.total_checks += 1;
            if point.face_id() as usize >= self.face_count() {
                report.data_integrity.indices_in_bounds = false;
                report.record_failure(format!(
                    "point {} references face {}",
                    point.id(),
                    point.face_id()
                ));
            }
            for neighbor in point.neighbors() {
                report.total_checks += 1;
                if neighbor.id as usize >= self.point_count() || neighbor.distance <= 0.0 {
                    report.data_integrity.indices_in_bounds = false;
                    report.record_failure(format!(
                        "point {} has invalid neighbor {} at {}",
                        point.id(),
                        neighbor.id,
                        neighbor.distance
                    ));
                }
            }
        }
        for edge in &self.def().edges {
            report.total_checks += 1;
            let connected_ok = edge
                .connected_face_id
                .map(|c| (c as usize) < self.face_count())
                .unwrap_or(true);
            if edge.face_id as usize >= self.face_count() || !connected_ok {
                report.data_integrity.indices_in_bounds = false;
                report.record_failure(format!(
                    "edge {}:{} references an unknown face",
                    edge.face_id, edge.edge_index
                ));
            }
        }
    }

    fn check_edge_symmetry(&self, report: &mut ModelValidation, tolerance: f32) {
        let edges = &self.def().edges;
        for edge in edges {
            let Some(connected) = edge.connected_face_id else {
                continue;
            };
            report.total_checks += 1;
            let mate = edges.iter().any(|other| {
                other.face_id == connected
                    && other.connected_face_id == Some(edge.face_id)
                    && endpoints_coincide(edge.start, edge.end, other.start, other.end, tolerance)
            });
            if !mate {
                report.data_integrity.edges_symmetric = false;
                report.record_failure(format!(
                    "edge {}:{} names face {connected} but no coincident edge points back",
                    edge.face_id, edge.edge_index
                ));
            }
        }
    }

    fn check_coordinates(&self, report: &mut ModelValidation, bound: f32) {
        for point in self.points() {
            report.total_checks += 1;
            let pos = point.pos();
            if !pos.is_finite() || pos.length() > bound {
                report.geometric.coordinates_reasonable = false;
                report.record_failure(format!(
                    "point {} at ({:.1}, {:.1}, {:.1}) is outside the expected bound",
                    point.id(),
                    pos.x,
                    pos.y,
                    pos.z
                ));
            }
        }
        for face in &self.def().faces {
            for (index, vertex) in face.vertices.iter().enumerate() {
                report.total_checks += 1;
                if !vertex.is_finite() || vertex.length() > bound {
                    report.geometric.vertices_within_bounds = false;
                    report.record_failure(format!(
                        "face {} vertex {index} is outside the expected bound",
                        face.id
                    ));
                }
            }
        }
    }

    fn check_planarity(&self, report: &mut ModelValidation, tolerance: f32) {
        for face in &self.def().faces {
            if face.vertices.len() < 4 {
                continue;
            }
            report.total_checks += 1;
            let origin = face.vertices[0];
            let normal = (face.vertices[1] - origin)
                .cross(face.vertices[2] - origin)
                .normalize_or_zero();
            if normal == Vec3::ZERO {
                report.geometric.all_faces_planar = false;
                report.record_failure(format!("face {} has degenerate vertices", face.id));
                continue;
            }
            let worst = face.vertices[3..]
                .iter()
                .map(|v| (*v - origin).dot(normal).abs())
                .fold(0.0f32, f32::max);
            if worst > tolerance {
                report.geometric.all_faces_planar = false;
                report.record_failure(format!(
                    "face {} deviates from its plane by {worst:.3}",
                    face.id
                ));
            }
        }
    }
}

fn endpoints_coincide(a_start: Vec3, a_end: Vec3, b_start: Vec3, b_end: Vec3, tolerance: f32) -> bool {
    let forward = a_start.distance(b_start) <= tolerance && a_end.distance(b_end) <= tolerance;
    let reversed = a_start.distance(b_end) <= tolerance && a_end.distance(b_start) <= tolerance;
    forward || reversed
}
