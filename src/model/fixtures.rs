//! Built-in model definitions used by tests, benches, and the examples in
//! the documentation. The pentagon model mirrors the reference three-face
//! build; the pyramid exists to exercise face remapping.

use glam::Vec3;

use super::def::{
    EdgeDef, FaceDef, FaceTypeDef, GroupName, HardwareInfo, LedGroupDef, ModelDef, NeighborDef,
    NeighborEntry, PointDef, Polygon,
};

fn v(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

fn group(name: &str, face_type_id: u8, led_indices: &[u16]) -> LedGroupDef {
    LedGroupDef {
        name: GroupName::new(name).expect("fixture group name fits"),
        face_type_id,
        led_indices: led_indices.to_vec(),
    }
}

fn edge(face_id: u8, edge_index: u8, start: Vec3, end: Vec3, connected: Option<u8>) -> EdgeDef {
    EdgeDef {
        face_id,
        edge_index,
        start,
        end,
        connected_face_id: connected,
    }
}

fn neighbors(point_id: u16, entries: &[(u16, f32)]) -> NeighborDef {
    NeighborDef {
        point_id,
        neighbors: entries
            .iter()
            .map(|&(id, distance)| NeighborEntry { id, distance })
            .collect(),
    }
}

/// Three pentagon faces, five LEDs each, no remap. Carries groups `center`,
/// `ring1`, `edge0`, `edge1` and a fully connected edge table between the
/// three faces.
pub fn basic_pentagon() -> ModelDef {
    let f0 = [
        v(-200.000, 0.000, 262.000),
        v(-61.803, -190.211, 262.000),
        v(161.803, -117.557, 262.000),
        v(161.803, 117.557, 262.000),
        v(-61.803, 190.211, 262.000),
    ];
    let f1 = [
        v(-99.947, -307.933, 61.904),
        v(100.055, -307.938, -61.700),
        v(261.857, -190.376, 61.904),
        v(161.854, -117.712, 261.899),
        v(-61.753, -190.366, 261.899),
    ];
    let f2 = [
        v(323.786, -0.000, -61.700),
        v(261.976, 190.211, 61.904),
        v(161.966, 117.557, 261.899),
        v(161.966, -117.557, 261.899),
        v(261.976, -190.211, 61.904),
    ];

    ModelDef {
        name: "BasicPentagonModel".to_string(),
        version: "1.0".to_string(),
        description: "Three-face pentagon model for exercising the core".to_string(),
        model_type: "Pentagon".to_string(),
        generated_date: None,
        led_count: 15,
        face_count: 3,
        sphere_radius: 395.034,
        hardware: HardwareInfo::default(),
        face_types: vec![FaceTypeDef {
            id: 0,
            polygon: Polygon::Pentagon,
            num_leds: 5,
            edge_length_mm: 50.0,
        }],
        faces: vec![
            FaceDef {
                id: 0,
                type_id: 0,
                rotation: 0,
                geometric_id: 0,
                vertices: f0.to_vec(),
            },
            FaceDef {
                id: 1,
                type_id: 0,
                rotation: 0,
                geometric_id: 1,
                vertices: f1.to_vec(),
            },
            FaceDef {
                id: 2,
                type_id: 0,
                rotation: 0,
                geometric_id: 2,
                vertices: f2.to_vec(),
            },
        ],
        points: vec![
            PointDef { id: 0, face_id: 0, pos: v(-89.915, 273.398, 262.000) },
            PointDef { id: 1, face_id: 0, pos: v(-102.356, 269.356, 262.000) },
            PointDef { id: 2, face_id: 0, pos: v(-89.915, 260.318, 262.000) },
            PointDef { id: 3, face_id: 0, pos: v(-77.474, 269.353, 262.000) },
            PointDef { id: 4, face_id: 0, pos: v(-82.228, 283.984, 262.000) },
            PointDef { id: 5, face_id: 1, pos: v(-121.363, -176.614, 324.891) },
            PointDef { id: 6, face_id: 1, pos: v(-130.365, -183.155, 318.014) },
            PointDef { id: 7, face_id: 1, pos: v(-115.799, -180.657, 313.764) },
            PointDef { id: 8, face_id: 1, pos: v(-108.920, -172.572, 324.889) },
            PointDef { id: 9, face_id: 1, pos: v(-119.240, -170.073, 336.020) },
            PointDef { id: 10, face_id: 2, pos: v(274.550, -273.398, 36.760) },
            PointDef { id: 11, face_id: 2, pos: v(280.114, -269.356, 25.633) },
            PointDef { id: 12, face_id: 2, pos: v(274.550, -260.318, 36.760) },
            PointDef { id: 13, face_id: 2, pos: v(268.985, -269.353, 47.888) },
            PointDef { id: 14, face_id: 2, pos: v(271.111, -283.984, 43.636) },
        ],
        edges: vec![
            edge(0, 0, f0[0], f0[1], None),
            edge(0, 1, f0[1], f0[2], Some(1)),
            edge(0, 2, f0[2], f0[3], Some(2)),
            edge(0, 3, f0[3], f0[4], None),
            edge(0, 4, f0[4], f0[0], None),
            edge(1, 0, f1[0], f1[1], None),
            edge(1, 1, f1[1], f1[2], None),
            edge(1, 2, f1[2], f1[3], Some(2)),
            edge(1, 3, f1[3], f1[4], Some(0)),
            edge(1, 4, f1[4], f1[0], None),
            edge(2, 0, f2[0], f2[1], None),
            edge(2, 1, f2[1], f2[2], None),
            edge(2, 2, f2[2], f2[3], Some(0)),
            edge(2, 3, f2[3], f2[4], Some(1)),
            edge(2, 4, f2[4], f2[0], None),
        ],
        groups: vec![
            group("center", 0, &[0]),
            group("ring1", 0, &[1, 2, 3, 4]),
            group("edge0", 0, &[1, 2]),
            group("edge1", 0, &[2, 3]),
        ],
        neighbors: vec![
            neighbors(0, &[(2, 13.080), (1, 13.081), (3, 13.082), (4, 13.082)]),
            neighbors(1, &[(0, 13.081), (2, 15.377), (3, 24.882), (4, 24.882)]),
            neighbors(2, &[(0, 13.080), (3, 15.376), (1, 15.377), (4, 24.883)]),
            neighbors(3, &[(0, 13.082), (2, 15.376), (4, 15.383), (1, 24.882)]),
            neighbors(4, &[(0, 13.082), (3, 15.383), (1, 24.882), (2, 24.883)]),
            neighbors(5, &[(7, 13.080), (6, 13.081), (9, 13.082), (8, 13.082)]),
            neighbors(6, &[(5, 13.081), (7, 15.377), (9, 24.882), (8, 24.882)]),
            neighbors(7, &[(5, 13.080), (8, 15.376), (6, 15.377), (9, 24.883)]),
            neighbors(8, &[(5, 13.082), (7, 15.376), (9, 15.383), (6, 24.882)]),
            neighbors(9, &[(5, 13.082), (8, 15.383), (6, 24.882), (7, 24.883)]),
            neighbors(10, &[(12, 13.080), (11, 13.081), (13, 13.082), (14, 13.082)]),
            neighbors(11, &[(10, 13.081), (12, 15.377), (13, 24.882), (14, 24.882)]),
            neighbors(12, &[(10, 13.080), (13, 15.376), (11, 15.377), (14, 24.883)]),
            neighbors(13, &[(10, 13.082), (12, 15.376), (14, 15.383), (11, 24.882)]),
            neighbors(14, &[(10, 13.082), (13, 15.383), (11, 24.882), (12, 24.883)]),
        ],
    }
}

/// Four triangular faces wired out of spatial order: the geometric→logical
/// permutation is {0→2, 1→3, 2→0, 3→1}. Used to pin down face remapping
/// behavior.
pub fn pyramid_with_remap() -> ModelDef {
    // Regular tetrahedron, 100 mm scale.
    let a = v(100.0, 100.0, 100.0);
    let b = v(100.0, -100.0, -100.0);
    let c = v(-100.0, 100.0, -100.0);
    let d = v(-100.0, -100.0, 100.0);

    // Logical faces in wiring order; geometric ids invert the remap above.
    let corners = [[a, b, c], [a, c, d], [a, d, b], [b, d, c]];
    let geometric_ids = [2u8, 3, 0, 1];

    let mut faces = Vec::new();
    let mut points = Vec::new();
    for (face_id, verts) in corners.iter().enumerate() {
        faces.push(FaceDef {
            id: face_id as u8,
            type_id: 0,
            rotation: 0,
            geometric_id: geometric_ids[face_id],
            vertices: verts.to_vec(),
        });
        let centroid = (verts[0] + verts[1] + verts[2]) / 3.0;
        for (corner_index, corner) in verts.iter().enumerate() {
            points.push(PointDef {
                id: (face_id * 3 + corner_index) as u16,
                face_id: face_id as u8,
                pos: (*corner + centroid) * 0.5,
            });
        }
    }

    // Shared-edge table for the closed tetrahedron; every edge has a mate
    // with coincident endpoints on the neighboring face.
    let edges = vec![
        edge(0, 0, a, b, Some(2)),
        edge(0, 1, b, c, Some(3)),
        edge(0, 2, c, a, Some(1)),
        edge(1, 0, a, c, Some(0)),
        edge(1, 1, c, d, Some(3)),
        edge(1, 2, d, a, Some(2)),
        edge(2, 0, a, d, Some(1)),
        edge(2, 1, d, b, Some(3)),
        edge(2, 2, b, a, Some(0)),
        edge(3, 0, b, d, Some(2)),
        edge(3, 1, d, c, Some(1)),
        edge(3, 2, c, b, Some(0)),
    ];

    ModelDef {
        name: "PyramidWithRemap".to_string(),
        version: "1.0".to_string(),
        description: "Remapped four-face pyramid for wiring-order tests".to_string(),
        model_type: "Triangle".to_string(),
        generated_date: None,
        led_count: 12,
        face_count: 4,
        sphere_radius: 0.0,
        hardware: HardwareInfo::default(),
        face_types: vec![FaceTypeDef {
            id: 0,
            polygon: Polygon::Triangle,
            num_leds: 3,
            edge_length_mm: 80.0,
        }],
        faces,
        points,
        edges,
        groups: vec![group("corners", 0, &[0, 1, 2])],
        neighbors: Vec::new(),
    }
}
