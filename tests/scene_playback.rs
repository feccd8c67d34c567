use std::cell::RefCell;
use std::rc::Rc;

use pixelstage::color::Rgb;
use pixelstage::model::{fixtures, Model};
use pixelstage::params::ParamDef;
use pixelstage::platform::{Platform, SimClock, SimulatorPlatform};
use pixelstage::scene::{Context, Scene, SetupContext};
use pixelstage::theater::{PlaybackMode, Theater};

type CallLog = Rc<RefCell<Vec<String>>>;

struct Probe {
    tag: &'static str,
    log: CallLog,
    color: Rgb,
}

impl Probe {
    fn new(tag: &'static str, log: &CallLog, color: Rgb) -> Box<Probe> {
        Box::new(Probe {
            tag,
            log: log.clone(),
            color,
        })
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{event}", self.tag));
    }
}

impl Scene for Probe {
    fn setup(&mut self, ctx: &mut SetupContext) {
        ctx.param(ParamDef::ratio("speed", 0.5));
        self.record("setup");
    }

    fn reset(&mut self, _ctx: &mut Context) {
        self.record("reset");
    }

    fn tick(&mut self, ctx: &mut Context) {
        self.record(&format!("tick{}", ctx.tick_count()));
        let color = self.color;
        ctx.leds_mut().fill(color);
    }
}

fn stage(log: &CallLog) -> (Theater, SimClock) {
    let model = Model::new(fixtures::basic_pentagon()).expect("fixture builds");
    let platform = SimulatorPlatform::new(model.point_count(), 11);
    let clock = platform.clock();
    let mut theater = Theater::new(model, Box::new(platform));
    theater.register_scene("a", Probe::new("a", log, Rgb::RED));
    theater.register_scene("b", Probe::new("b", log, Rgb::GREEN));
    theater.register_scene("c", Probe::new("c", log, Rgb::BLUE));
    (theater, clock)
}

#[test]
fn lifecycle_runs_setup_once_then_reset_then_ticks() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, _clock) = stage(&log);

    theater.update();
    theater.update();

    let events = log.borrow().clone();
    assert_eq!(events, vec!["a:setup", "a:reset", "a:tick1", "a:tick2"]);
}

#[test]
fn switching_preserves_configuration_and_parameters() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, _clock) = stage(&log);

    theater.update();
    theater
        .scene_settings_mut("a")
        .unwrap()
        .set("speed", 0.9);

    theater.play("b");
    theater.update();
    theater.play("a");
    theater.update();

    // Setup ran once per scene; switching back did not reset "a".
    let events = log.borrow().clone();
    let setups: Vec<_> = events.iter().filter(|e| e.ends_with("setup")).collect();
    assert_eq!(setups, vec!["a:setup", "b:setup"]);
    assert_eq!(theater.scene_settings("a").unwrap().get_float("speed"), 0.9);

    // The tick counter kept counting from where scene "a" left off.
    assert!(events.contains(&"a:tick2".to_string()));
}

#[test]
fn advance_mode_cycles_in_registration_order() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, clock) = stage(&log);

    theater.set_playback_mode(PlaybackMode::Advance, 0.1);

    // 100 Hz for 0.35 s of simulated time.
    let mut sequence = Vec::new();
    for _ in 0..35 {
        clock.advance(10);
        theater.update();
        let name = theater.current_scene_name().unwrap().to_string();
        if sequence.last() != Some(&name) {
            sequence.push(name);
        }
    }

    assert_eq!(sequence, vec!["a", "b", "c", "a"]);
}

#[test]
fn advance_interval_counts_switches_exactly() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, clock) = stage(&log);
    theater.set_playback_mode(PlaybackMode::Advance, 0.5);

    let mut switches = 0;
    let mut previous = String::new();
    for _ in 0..200 {
        clock.advance(10);
        theater.update();
        let name = theater.current_scene_name().unwrap().to_string();
        if name != previous && !previous.is_empty() {
            switches += 1;
        }
        previous = name;
    }

    // 2 s of simulated time with a 0.5 s interval: 3 switches after the
    // initial activation (the first interval starts at activation time).
    assert_eq!(switches, 3);
}

#[test]
fn hold_mode_never_switches() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, clock) = stage(&log);
    theater.set_playback_mode(PlaybackMode::Hold, 0.05);

    for _ in 0..50 {
        clock.advance(10);
        theater.update();
    }
    assert_eq!(theater.current_scene_name(), Some("a"));
}

#[test]
fn random_mode_switches_to_a_different_scene() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, clock) = stage(&log);
    theater.set_playback_mode(PlaybackMode::Random, 0.1);

    theater.update();
    let first = theater.current_scene_name().unwrap().to_string();
    clock.advance(150);
    theater.update();
    let second = theater.current_scene_name().unwrap().to_string();
    assert_ne!(first, second);
}

struct Faulty;

impl Scene for Faulty {
    fn setup(&mut self, _ctx: &mut SetupContext) {}

    fn tick(&mut self, _ctx: &mut Context) {
        panic!("scene bug");
    }
}

#[test]
fn panicking_scene_is_retired_and_the_show_goes_on() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let model = Model::new(fixtures::basic_pentagon()).expect("fixture builds");
    let platform = SimulatorPlatform::new(model.point_count(), 11);
    let mut theater = Theater::new(model, Box::new(platform));

    theater.register_scene("faulty", Box::new(Faulty));
    theater.register_scene("steady", Probe::new("s", &log, Rgb::GREEN));

    // Quiet the panic's default stderr hook for this test.
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    theater.update();
    std::panic::set_hook(hook);

    assert_eq!(theater.scene_count(), 1);
    assert_eq!(theater.scene_names(), vec!["steady"]);

    theater.update();
    assert_eq!(theater.current_scene_name(), Some("steady"));
    assert_eq!(theater.platform().leds().get(0), Rgb::GREEN);
}

#[test]
fn schema_is_available_after_configuration() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, _clock) = stage(&log);

    // Before configuration the scene has not declared anything.
    let schema = theater.scene_schema("a").unwrap();
    assert!(schema.parameters.is_empty());

    theater.update();
    let schema = theater.scene_schema("a").unwrap();
    assert_eq!(schema.parameters.len(), 1);
    assert_eq!(schema.parameters[0].name, "speed");
}

#[test]
fn reset_current_restores_defaults_and_tick_count() {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let (mut theater, _clock) = stage(&log);

    theater.update();
    theater.update();
    theater.scene_settings_mut("a").unwrap().set("speed", 0.9);

    theater.reset_current();
    theater.update();

    assert_eq!(theater.scene_settings("a").unwrap().get_float("speed"), 0.5);
    let events = log.borrow().clone();
    // After the reset the tick counter starts over.
    assert_eq!(events.last().unwrap(), "a:tick1");
}
