//! Runtime for authoring and executing LED scenes on three-dimensional LED
//! sculptures. A scene gets a connected view of the hardware — the LED
//! buffer, the geometric model, timing, and random sources — and writes
//! colors into the buffer each tick; the theater drives the current scene
//! and commits frames through the platform.

pub mod buffer;
pub mod color;
pub mod model;
pub mod palette;
pub mod params;
pub mod platform;
pub mod scene;
pub mod theater;

pub use buffer::LedBuffer;
pub use color::{Hsv, Rgb};
pub use model::{Model, ModelDef};
pub use params::{ParamDef, ParamFlags, ParamType, ParamValue, Preset, SceneSchema, Settings};
pub use platform::{
    HardwarePlatform, LedDriver, NativePlatform, Platform, SimClock, SimulatorPlatform,
};
pub use scene::{Context, Scene, SceneMeta, SetupContext};
pub use theater::{PlaybackMode, Theater};
