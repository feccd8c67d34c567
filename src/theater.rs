//! The coordinator: owns the platform, the model, and every registered
//! scene; selects the current scene and drives the per-frame cycle of
//! delta-time update, optional switch, tick, and commit.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::model::Model;
use crate::params::{SceneSchema, Settings};
use crate::platform::Platform;
use crate::scene::{scene_schema, Context, Scene, SceneMeta, SetupContext};

/// How the theater moves between scenes once the hold interval elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    Hold,
    Advance,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    /// Bound to an environment, `setup` not yet run.
    Ready,
    /// Parameters declared, not yet reset.
    Configured,
    /// Ticking.
    Running,
}

struct SceneEntry {
    name: String,
    scene: Box<dyn Scene>,
    settings: Settings,
    meta: SceneMeta,
    state: Lifecycle,
    tick_count: u64,
}

const DEFAULT_STATUS_INTERVAL_MS: u32 = 1000;

pub struct Theater {
    model: Model,
    platform: Box<dyn Platform>,
    entries: Vec<SceneEntry>,
    current: Option<usize>,
    mode: PlaybackMode,
    interval_ms: u32,
    last_switch_ms: u32,
    status_interval_ms: u32,
    last_status_ms: u32,
}

impl Theater {
    pub fn new(model: Model, platform: Box<dyn Platform>) -> Self {
        Self {
            model,
            platform,
            entries: Vec::new(),
            current: None,
            mode: PlaybackMode::Hold,
            interval_ms: 0,
            last_switch_ms: 0,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            last_status_ms: 0,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn platform_mut(&mut self) -> &mut dyn Platform {
        self.platform.as_mut()
    }

    pub fn scene_count(&self) -> usize {
        self.entries.len()
    }

    pub fn scene_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn current_scene_name(&self) -> Option<&str> {
        self.current.map(|i| self.entries[i].name.as_str())
    }

    /// Register a scene under a unique name, taking ownership. Registering
    /// the same name again replaces the earlier scene with a warning.
    pub fn register_scene(&mut self, name: &str, scene: Box<dyn Scene>) {
        let entry = SceneEntry {
            name: name.to_string(),
            scene,
            settings: Settings::new(),
            meta: SceneMeta::new(name),
            state: Lifecycle::Ready,
            tick_count: 0,
        };
        if let Some(index) = self.entries.iter().position(|e| e.name == name) {
            log::warn!("scene '{name}' registered twice, replacing the first");
            self.entries[index] = entry;
            if self.current == Some(index) {
                self.current = None;
            }
        } else {
            self.entries.push(entry);
        }
    }

    /// Make the named scene current, configuring it on first activation.
    pub fn play(&mut self, name: &str) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.name == name) else {
            log::warn!("play: unknown scene '{name}'");
            return false;
        };
        self.activate(index);
        true
    }

    /// Drive one frame: refresh delta time, switch scenes if the playback
    /// interval elapsed, tick the current scene, commit the buffer. Not
    /// reentrant; scene switches only ever happen here or in the explicit
    /// switch calls, never mid-tick.
    pub fn update(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        self.platform.update_delta_time();

        if self.current.is_none() {
            self.activate(0);
        } else if self.mode != PlaybackMode::Hold && self.interval_ms > 0 {
            let now = self.platform.millis();
            if now.wrapping_sub(self.last_switch_ms) >= self.interval_ms {
                match self.mode {
                    PlaybackMode::Advance => self.next(),
                    PlaybackMode::Random => self.random(),
                    PlaybackMode::Hold => {}
                }
            }
        }

        self.tick_current();
        self.platform.show();
    }

    /// Switch to the next scene in registration order, wrapping.
    pub fn next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let next = match self.current {
            Some(index) => (index + 1) % self.entries.len(),
            None => 0,
        };
        self.activate(next);
    }

    /// Switch to a uniformly random scene other than the current one. A
    /// registry of one (or none) is a no-op.
    pub fn random(&mut self) {
        if self.entries.len() <= 1 {
            return;
        }
        let pick = match self.current {
            Some(current) => {
                // Draw from the registry minus the current scene.
                let offset = self.platform.random((self.entries.len() - 1) as u32) as usize;
                if offset >= current {
                    offset + 1
                } else {
                    offset
                }
            }
            None => self.platform.random(self.entries.len() as u32) as usize,
        };
        self.activate(pick);
    }

    /// Set the playback mode and hold interval, restarting the switch
    /// timer.
    pub fn set_playback_mode(&mut self, mode: PlaybackMode, interval_seconds: f32) {
        self.mode = mode;
        self.interval_ms = (interval_seconds.max(0.0) * 1000.0) as u32;
        self.last_switch_ms = self.platform.millis();
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn set_status_interval(&mut self, ms: u32) {
        self.status_interval_ms = ms;
    }

    /// Latest status line from the current scene, throttled by the status
    /// cadence.
    pub fn status(&mut self) -> Option<String> {
        let index = self.current?;
        let now = self.platform.millis();
        if now.wrapping_sub(self.last_status_ms) < self.status_interval_ms {
            return None;
        }
        self.last_status_ms = now;
        self.entries[index].scene.status()
    }

    /// Settings of a registered scene, for external control surfaces.
    pub fn scene_settings(&self, name: &str) -> Option<&Settings> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.settings)
    }

    pub fn scene_settings_mut(&mut self, name: &str) -> Option<&mut Settings> {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .map(|e| &mut e.settings)
    }

    /// Parameter schema of a registered scene. Scenes declare parameters in
    /// `setup`, so unconfigured scenes export an empty parameter list.
    pub fn scene_schema(&self, name: &str) -> Option<SceneSchema> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| scene_schema(&e.meta, &e.settings))
    }

    /// Restart the current scene: parameters back to declared defaults,
    /// derived state rebuilt, tick counter cleared.
    pub fn reset_current(&mut self) {
        if let Some(index) = self.current {
            self.reset_entry(index);
        }
    }

    // First activation configures the scene (setup, then reset); later
    // activations only make it current, preserving its parameter state.
    fn activate(&mut self, index: usize) {
        if self.entries[index].state == Lifecycle::Ready {
            self.configure_entry(index);
            self.reset_entry(index);
        }
        self.current = Some(index);
        self.last_switch_ms = self.platform.millis();
    }

    fn configure_entry(&mut self, index: usize) {
        let entry = &mut self.entries[index];
        if entry.state != Lifecycle::Ready {
            return;
        }
        let mut ctx = SetupContext::new(&mut entry.settings, &mut entry.meta);
        entry.scene.setup(&mut ctx);
        entry.state = Lifecycle::Configured;
    }

    fn reset_entry(&mut self, index: usize) {
        let entry = &mut self.entries[index];
        entry.settings.reset();
        entry.tick_count = 0;
        let mut ctx = Context::new(
            &self.model,
            self.platform.as_mut(),
            &mut entry.settings,
            entry.tick_count,
        );
        entry.scene.reset(&mut ctx);
        entry.state = Lifecycle::Running;
    }

    fn tick_current(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        let entry = &mut self.entries[index];
        if entry.state != Lifecycle::Running {
            return;
        }
        entry.tick_count += 1;

        let mut ctx = Context::new(
            &self.model,
            self.platform.as_mut(),
            &mut entry.settings,
            entry.tick_count,
        );
        let outcome = catch_unwind(AssertUnwindSafe(|| entry.scene.tick(&mut ctx)));

        if outcome.is_err() {
            // A scene must not fail across the tick boundary; retire it and
            // let the rest of the playlist keep running.
            log::error!("scene '{}' panicked during tick, removing it", entry.name);
            self.entries.remove(index);
            self.current = None;
        }
    }
}
