use anyhow::{bail, Result};
use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Most neighbors recorded per point.
pub const MAX_NEIGHBORS: usize = 7;
/// Longest LED group name, in bytes.
pub const MAX_GROUP_NAME: usize = 15;
/// Most LEDs a single named group may reference.
pub const MAX_GROUP_LEDS: usize = 32;

/// Polygon template of a face type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polygon {
    Strip,
    Circle,
    Triangle,
    Square,
    Pentagon,
    Hexagon,
}

impl Polygon {
    /// Number of boundary edges; strips and circles have no polygonal
    /// boundary.
    pub fn edge_count(self) -> usize {
        match self {
            Polygon::Strip | Polygon::Circle => 0,
            Polygon::Triangle => 3,
            Polygon::Square => 4,
            Polygon::Pentagon => 5,
            Polygon::Hexagon => 6,
        }
    }

    pub fn vertex_count(self) -> usize {
        self.edge_count()
    }
}

/// Interned, fixed-capacity group name. Comparison is exact, case-sensitive,
/// and bounded by the stored length, so "center" never matches "CENTER" or
/// "cent".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupName {
    bytes: [u8; MAX_GROUP_NAME],
    len: u8,
}

impl GroupName {
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            bail!("group name cannot be empty");
        }
        if name.len() > MAX_GROUP_NAME {
            bail!("group name '{name}' exceeds {MAX_GROUP_NAME} bytes");
        }
        let mut bytes = [0u8; MAX_GROUP_NAME];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            bytes,
            len: name.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        // Construction only accepts &str input, so this is valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }

    pub fn matches(&self, candidate: &str) -> bool {
        candidate.len() == self.len as usize
            && candidate.as_bytes() == &self.bytes[..self.len as usize]
    }
}

impl Serialize for GroupName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GroupName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        GroupName::new(&name).map_err(serde::de::Error::custom)
    }
}

/// Read-only hardware description of the LED chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardwareInfo {
    pub led_type: String,
    pub color_order: String,
    pub led_diameter_mm: f32,
    pub led_spacing_mm: f32,
    pub max_current_per_led_ma: u16,
    pub avg_current_per_led_ma: u16,
}

impl Default for HardwareInfo {
    fn default() -> Self {
        Self {
            led_type: "WS2812B".to_string(),
            color_order: "GRB".to_string(),
            led_diameter_mm: 5.0,
            led_spacing_mm: 10.0,
            max_current_per_led_ma: 50,
            avg_current_per_led_ma: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaceTypeDef {
    pub id: u8,
    pub polygon: Polygon,
    pub num_leds: u16,
    pub edge_length_mm: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaceDef {
    pub id: u8,
    pub type_id: u8,
    /// Rotation of the LED layout in fifths/sixths of a turn.
    #[serde(default)]
    pub rotation: u8,
    /// Spatial position on the sculpture; equals `id` when no remap is
    /// declared.
    pub geometric_id: u8,
    #[serde(default)]
    pub vertices: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointDef {
    pub id: u16,
    pub face_id: u8,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeDef {
    pub face_id: u8,
    pub edge_index: u8,
    pub start: Vec3,
    pub end: Vec3,
    /// None = free edge. Serialized forms -1 and 255 both mean None; some
    /// model generators emit one, some the other.
    #[serde(
        default,
        serialize_with = "serialize_connection",
        deserialize_with = "deserialize_connection"
    )]
    pub connected_face_id: Option<u8>,
}

fn serialize_connection<S: Serializer>(
    value: &Option<u8>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(id) => serializer.serialize_i16(*id as i16),
        None => serializer.serialize_i16(-1),
    }
}

fn deserialize_connection<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u8>, D::Error> {
    let raw = Option::<i16>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(-1) | Some(255) => None,
        Some(id) if id >= 0 && id < 255 => Some(id as u8),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "invalid connected_face_id {other}"
            )))
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeighborEntry {
    pub id: u16,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeighborDef {
    pub point_id: u16,
    pub neighbors: Vec<NeighborEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedGroupDef {
    pub name: GroupName,
    pub face_type_id: u8,
    /// Face-local LED indices, in group order.
    pub led_indices: Vec<u16>,
}

/// Complete description of one sculpture: the compile-time schema of the
/// model, either embedded in code or loaded from YAML. Consumers read it
/// through the runtime view; the table shapes here are not a stable API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model_type: String,
    #[serde(default)]
    pub generated_date: Option<String>,
    pub led_count: u16,
    pub face_count: u8,
    /// 0 means "derive from the farthest point".
    #[serde(default)]
    pub sphere_radius: f32,
    #[serde(default)]
    pub hardware: HardwareInfo,
    pub face_types: Vec<FaceTypeDef>,
    pub faces: Vec<FaceDef>,
    pub points: Vec<PointDef>,
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
    #[serde(default)]
    pub groups: Vec<LedGroupDef>,
    #[serde(default)]
    pub neighbors: Vec<NeighborDef>,
}

impl ModelDef {
    /// Declared sphere radius, or the farthest point magnitude when the
    /// definition leaves it at 0.
    pub fn resolved_sphere_radius(&self) -> f32 {
        if self.sphere_radius > 0.0 {
            return self.sphere_radius;
        }
        self.points
            .iter()
            .map(|p| p.pos.length())
            .fold(0.0f32, f32::max)
    }

    pub fn face_type(&self, type_id: u8) -> Option<&FaceTypeDef> {
        self.face_types.iter().find(|t| t.id == type_id)
    }

    /// Structural validation run before the runtime view is built. These are
    /// the constructor-path invariants; the softer geometric diagnostics
    /// live in the runtime `validate_model` report.
    pub fn validate(&self) -> Result<()> {
        if self.led_count == 0 {
            bail!("model '{}' declares zero LEDs", self.name);
        }
        if self.face_count == 0 {
            bail!("model '{}' declares zero faces", self.name);
        }
        if self.faces.len() != self.face_count as usize {
            bail!(
                "face table has {} rows but face_count is {}",
                self.faces.len(),
                self.face_count
            );
        }
        if self.points.len() != self.led_count as usize {
            bail!(
                "point table has {} rows but led_count is {}",
                self.points.len(),
                self.led_count
            );
        }

        for (index, face_type) in self.face_types.iter().enumerate() {
            if face_type.id as usize != index {
                bail!("face type ids must be dense, got {} at row {index}", face_type.id);
            }
            if face_type.num_leds == 0 {
                bail!("face type {} has zero LEDs", face_type.id);
            }
        }

        let mut led_total = 0usize;
        let mut seen_geometric = vec![false; self.face_count as usize];
        for (index, face) in self.faces.iter().enumerate() {
            if face.id as usize != index {
                bail!("face ids must be dense wiring order, got {} at row {index}", face.id);
            }
            let Some(face_type) = self.face_type(face.type_id) else {
                bail!("face {} references unknown face type {}", face.id, face.type_id);
            };
            if !face.vertices.is_empty()
                && face.vertices.len() != face_type.polygon.vertex_count()
            {
                bail!(
                    "face {} has {} vertices, its {:?} template wants {}",
                    face.id,
                    face.vertices.len(),
                    face_type.polygon,
                    face_type.polygon.vertex_count()
                );
            }
            let geometric = face.geometric_id as usize;
            if geometric >= self.face_count as usize {
                bail!("face {} has out-of-range geometric id {}", face.id, face.geometric_id);
            }
            if seen_geometric[geometric] {
                bail!("geometric id {} assigned twice", face.geometric_id);
            }
            seen_geometric[geometric] = true;
            led_total += face_type.num_leds as usize;
        }
        if led_total != self.led_count as usize {
            bail!(
                "per-face LED counts sum to {led_total}, model declares {}",
                self.led_count
            );
        }

        // LED offsets accumulate in wiring order, so point rows must line up
        // with the face that owns each global index.
        let mut offset = 0u16;
        let mut owner_by_led = vec![0u8; self.led_count as usize];
        for face in &self.faces {
            let count = self.face_type(face.type_id).map(|t| t.num_leds).unwrap_or(0);
            for led in offset..offset + count {
                owner_by_led[led as usize] = face.id;
            }
            offset += count;
        }
        for (index, point) in self.points.iter().enumerate() {
            if point.id as usize != index {
                bail!("point ids must be dense, got {} at row {index}", point.id);
            }
            if point.face_id as usize >= self.face_count as usize {
                bail!("point {} references unknown face {}", point.id, point.face_id);
            }
            if owner_by_led[index] != point.face_id {
                bail!(
                    "point {} claims face {} but index {} belongs to face {}",
                    point.id,
                    point.face_id,
                    index,
                    owner_by_led[index]
                );
            }
        }

        for edge in &self.edges {
            let Some(face) = self.faces.get(edge.face_id as usize) else {
                bail!("edge references unknown face {}", edge.face_id);
            };
            let edge_limit = self
                .face_type(face.type_id)
                .map(|t| t.polygon.edge_count())
                .unwrap_or(0);
            if edge.edge_index as usize >= edge_limit {
                bail!(
                    "edge index {} out of range for face {} ({} edges)",
                    edge.edge_index,
                    edge.face_id,
                    edge_limit
                );
            }
            if let Some(connected) = edge.connected_face_id {
                if connected as usize >= self.face_count as usize {
                    bail!("edge on face {} connects to unknown face {connected}", edge.face_id);
                }
            }
        }

        for group in &self.groups {
            let Some(face_type) = self.face_type(group.face_type_id) else {
                bail!(
                    "group '{}' references unknown face type {}",
                    group.name.as_str(),
                    group.face_type_id
                );
            };
            if group.led_indices.is_empty() {
                bail!("group '{}' has no LEDs", group.name.as_str());
            }
            if group.led_indices.len() > MAX_GROUP_LEDS {
                bail!(
                    "group '{}' has {} LEDs, limit is {MAX_GROUP_LEDS}",
                    group.name.as_str(),
                    group.led_indices.len()
                );
            }
            for &index in &group.led_indices {
                if index >= face_type.num_leds {
                    bail!(
                        "group '{}' index {index} exceeds face type LED count {}",
                        group.name.as_str(),
                        face_type.num_leds
                    );
                }
            }
            let duplicates = self
                .groups
                .iter()
                .filter(|g| g.face_type_id == group.face_type_id && g.name == group.name)
                .count();
            if duplicates > 1 {
                bail!(
                    "group '{}' declared twice for face type {}",
                    group.name.as_str(),
                    group.face_type_id
                );
            }
        }

        for row in &self.neighbors {
            if row.point_id >= self.led_count {
                bail!("neighbor row references unknown point {}", row.point_id);
            }
            if row.neighbors.len() > MAX_NEIGHBORS {
                bail!(
                    "point {} lists {} neighbors, limit is {MAX_NEIGHBORS}",
                    row.point_id,
                    row.neighbors.len()
                );
            }
            let mut previous = 0.0f32;
            for neighbor in &row.neighbors {
                if neighbor.id >= self.led_count {
                    bail!("point {} lists unknown neighbor {}", row.point_id, neighbor.id);
                }
                if neighbor.distance.is_nan() || neighbor.distance <= 0.0 {
                    bail!(
                        "point {} neighbor {} has non-positive distance",
                        row.point_id,
                        neighbor.id
                    );
                }
                if neighbor.distance < previous {
                    bail!("point {} neighbors are not sorted by distance", row.point_id);
                }
                previous = neighbor.distance;
            }
        }

        Ok(())
    }
}
