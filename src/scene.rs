//! The scene contract: a parameterised animation with a three-phase
//! lifecycle. `setup` declares parameters and metadata, `reset` rebuilds
//! state from current parameter values, `tick` paints one frame.

use std::ops::Range;

use crate::buffer::LedBuffer;
use crate::color::Rgb;
use crate::model::Model;
use crate::params::{ParamDef, SceneSchema, Settings};
use crate::platform::Platform;

/// Authorship and identification for one scene.
#[derive(Debug, Clone, Default)]
pub struct SceneMeta {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
}

impl SceneMeta {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }
}

/// What `setup` gets to touch: the settings store and the scene metadata.
/// LEDs are deliberately unreachable from here.
pub struct SetupContext<'a> {
    settings: &'a mut Settings,
    meta: &'a mut SceneMeta,
}

impl<'a> SetupContext<'a> {
    pub(crate) fn new(settings: &'a mut Settings, meta: &'a mut SceneMeta) -> Self {
        Self { settings, meta }
    }

    /// Declare one parameter. Invalid declarations are dropped with a
    /// warning, matching the settings store's behavior.
    pub fn param(&mut self, def: ParamDef) -> bool {
        self.settings.declare(def)
    }

    pub fn set_meta(&mut self, meta: SceneMeta) {
        *self.meta = meta;
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        self.settings
    }
}

/// Per-tick capability bundle: the connected view of model, buffer,
/// parameters, timing, randomness, and logging.
pub struct Context<'a> {
    model: &'a Model,
    platform: &'a mut dyn Platform,
    settings: &'a mut Settings,
    tick_count: u64,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        model: &'a Model,
        platform: &'a mut dyn Platform,
        settings: &'a mut Settings,
        tick_count: u64,
    ) -> Self {
        Self {
            model,
            platform,
            settings,
            tick_count,
        }
    }

    /// The geometric model. The borrow is independent of the context, so a
    /// `FaceView` can be held across buffer writes.
    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn leds(&self) -> &LedBuffer {
        self.platform.leds()
    }

    pub fn leds_mut(&mut self) -> &mut LedBuffer {
        self.platform.leds_mut()
    }

    /// Writable LED span of the face at geometric position `geom_index`.
    pub fn face_leds_mut(&mut self, geom_index: usize) -> &mut [Rgb] {
        let range: Range<usize> = self.model.face(geom_index).led_range();
        self.platform.leds_mut().range_mut(range)
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        self.settings
    }

    pub fn millis(&self) -> u32 {
        self.platform.millis()
    }

    pub fn delta_time(&self) -> f32 {
        self.platform.delta_time()
    }

    /// Ticks this scene has run since its last reset. Already incremented
    /// for the frame being painted.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn random8(&mut self) -> u8 {
        self.platform.random8()
    }

    pub fn random16(&mut self) -> u16 {
        self.platform.random16()
    }

    pub fn random(&mut self, max: u32) -> u32 {
        self.platform.random(max)
    }

    pub fn random_range(&mut self, min: u32, max: u32) -> u32 {
        self.platform.random_range(min, max)
    }

    pub fn random_float(&mut self) -> f32 {
        self.platform.random_float()
    }

    pub fn random_float_range(&mut self, min: f32, max: f32) -> f32 {
        self.platform.random_float_range(min, max)
    }

    pub fn log_info(&self, message: &str) {
        self.platform.log_info(message);
    }

    pub fn log_warning(&self, message: &str) {
        self.platform.log_warning(message);
    }

    pub fn log_error(&self, message: &str) {
        self.platform.log_error(message);
    }
}

/// One animation. Implementations keep their own state; everything shared
/// arrives through the contexts.
pub trait Scene {
    /// Declare parameters and metadata. Called exactly once per
    /// configuration; must not touch LEDs (and cannot, by construction).
    fn setup(&mut self, ctx: &mut SetupContext);

    /// Rebuild derived state from current parameter values. Runs before the
    /// first tick and again whenever the scene is restarted.
    fn reset(&mut self, ctx: &mut Context) {
        let _ = ctx;
    }

    /// Paint one frame into the buffer.
    fn tick(&mut self, ctx: &mut Context);

    /// Most recent status line, if the scene publishes one.
    fn status(&self) -> Option<String> {
        None
    }
}

/// Schema export for a configured scene: its metadata plus every declared
/// parameter.
pub fn scene_schema(meta: &SceneMeta, settings: &Settings) -> SceneSchema {
    SceneSchema::from_settings(&meta.name, &meta.description, settings)
}
