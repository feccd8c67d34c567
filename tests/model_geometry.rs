use pixelstage::color::Rgb;
use pixelstage::model::{fixtures, Model};
use pixelstage::params::ParamDef;
use pixelstage::platform::{Platform, SimulatorPlatform};
use pixelstage::scene::{Context, Scene, SetupContext};
use pixelstage::theater::Theater;

fn pentagon() -> Model {
    Model::new(fixtures::basic_pentagon()).expect("pentagon fixture builds")
}

fn pyramid() -> Model {
    Model::new(fixtures::pyramid_with_remap()).expect("pyramid fixture builds")
}

#[test]
fn led_indexing_is_total_and_contiguous() {
    for model in [pentagon(), pyramid()] {
        let mut next_offset = 0;
        let mut total = 0;
        for logical in 0..model.face_count() {
            let face = model
                .face_by_logical_id(logical)
                .expect("logical ids are dense");
            assert_eq!(face.led_offset(), next_offset);
            next_offset += face.led_count();
            total += face.led_count();
        }
        assert_eq!(total, model.point_count());
    }
}

#[test]
fn points_are_dense_and_reference_their_faces() {
    let model = pentagon();
    for (index, point) in model.points().enumerate() {
        assert_eq!(point.id() as usize, index);
        assert!((point.face_id() as usize) < model.face_count());
        let face = model
            .face_by_logical_id(point.face_id() as usize)
            .expect("face exists");
        assert!(face.led_range().contains(&index));
    }
}

#[test]
fn edge_adjacency_is_symmetric_within_tolerance() {
    for model in [pentagon(), pyramid()] {
        let tolerance = model.sphere_radius() * 1e-3;
        for index in 0..model.edge_count() {
            let edge = model.edges(index).expect("flat index is valid");
            let Some(connected) = edge.connected_face_id else {
                continue;
            };
            let mate = (0..model.edge_count())
                .filter_map(|j| model.edges(j))
                .find(|other| {
                    other.face_id == connected
                        && other.connected_face_id == Some(edge.face_id)
                        && coincide(edge.start, other.start, edge.end, other.end, tolerance)
                });
            assert!(
                mate.is_some(),
                "edge {}:{} of model '{}' has no symmetric mate",
                edge.face_id,
                edge.edge_index,
                model.def().name
            );
        }
    }
}

fn coincide(
    a_start: glam::Vec3,
    b_start: glam::Vec3,
    a_end: glam::Vec3,
    b_end: glam::Vec3,
    tolerance: f32,
) -> bool {
    let forward = a_start.distance(b_start) <= tolerance && a_end.distance(b_end) <= tolerance;
    let reversed = a_start.distance(b_end) <= tolerance && a_end.distance(b_start) <= tolerance;
    forward || reversed
}

#[test]
fn geometric_positions_form_a_bijection() {
    let model = pyramid();
    let mut logical_ids: Vec<u8> = (0..model.face_count()).map(|k| model.face(k).id()).collect();
    logical_ids.sort_unstable();
    assert_eq!(logical_ids, vec![0, 1, 2, 3]);

    // The declared permutation: position k hosts the face whose
    // geometric_id is k.
    for k in 0..model.face_count() {
        assert_eq!(model.face(k).geometric_id() as usize, k);
    }
}

struct PaintTwoFaces;

impl Scene for PaintTwoFaces {
    fn setup(&mut self, ctx: &mut SetupContext) {
        ctx.param(ParamDef::ratio("unused", 0.5));
    }

    fn tick(&mut self, ctx: &mut Context) {
        ctx.face_leds_mut(0)[0] = Rgb::RED;
        ctx.face_leds_mut(1)[2] = Rgb::BLUE;
    }
}

#[test]
fn pentagon_led_pattern_lands_at_global_indices() {
    let model = pentagon();
    let platform = SimulatorPlatform::new(model.point_count(), 7);
    let mut theater = Theater::new(model, Box::new(platform));
    theater.register_scene("paint", Box::new(PaintTwoFaces));
    theater.update();

    let leds = theater.platform().leds();
    assert_eq!(leds.get(0), Rgb::RED);
    assert_eq!(leds.get(7), Rgb::BLUE);
    for index in 0..leds.len() {
        if index != 0 && index != 7 {
            assert_eq!(leds.get(index), Rgb::BLACK, "index {index} should stay black");
        }
    }
}

struct PaintPositionZero;

impl Scene for PaintPositionZero {
    fn setup(&mut self, _ctx: &mut SetupContext) {}

    fn tick(&mut self, ctx: &mut Context) {
        ctx.face_leds_mut(0)[0] = Rgb::WHITE;
    }
}

#[test]
fn remap_writes_through_to_the_logical_face() {
    let model = pyramid();
    let platform = SimulatorPlatform::new(model.point_count(), 7);
    let mut theater = Theater::new(model, Box::new(platform));
    theater.register_scene("paint", Box::new(PaintPositionZero));
    theater.update();

    // Geometric position 0 hosts logical face 2, whose LEDs start at 6.
    let leds = theater.platform().leds();
    assert_eq!(leds.get(6), Rgb::WHITE);
    assert_eq!(leds.get(0), Rgb::BLACK);
}

#[test]
fn face_at_edge_matches_the_fixture_topology() {
    let model = pentagon();
    assert_eq!(model.face_at_edge(0, 1), Some(1));

    // And some edge of face 1 points back at face 0 with coincident
    // endpoints.
    let tolerance = model.sphere_radius() * 1e-3;
    let forward = (0..model.edge_count())
        .filter_map(|i| model.edges(i))
        .find(|e| e.face_id == 0 && e.edge_index == 1)
        .expect("fixture has edge 0:1")
        .clone();
    let back = (0..model.edge_count())
        .filter_map(|i| model.edges(i))
        .find(|e| {
            e.face_id == 1
                && e.connected_face_id == Some(0)
                && coincide(forward.start, e.start, forward.end, e.end, tolerance)
        });
    assert!(back.is_some());
    assert_eq!(model.face_at_edge(1, back.unwrap().edge_index as usize), Some(0));
}

#[test]
fn face_spans_isolate_writes() {
    let model = pentagon();
    let mut platform = SimulatorPlatform::new(model.point_count(), 7);

    let face = model.face(1);
    let range = face.led_range();
    for led in platform.leds_mut().face_slice_mut(&face) {
        *led = Rgb::GREEN;
    }

    for index in 0..platform.leds().len() {
        let expected = if range.contains(&index) { Rgb::GREEN } else { Rgb::BLACK };
        assert_eq!(platform.leds().get(index), expected);
    }
}

#[test]
fn validation_report_passes_for_both_fixtures() {
    for model in [pentagon(), pyramid()] {
        let report = model.validate_model(true, true);
        assert!(report.is_valid, "model '{}': {:?}", model.def().name, report.errors);
        assert_eq!(report.failed_checks, 0);
    }
}
