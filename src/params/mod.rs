//! Typed per-scene parameter system: declarations, validated writes,
//! presets, and the JSON schema the simulator UI builds controls from.

pub mod def;
pub mod preset;
pub mod schema;
pub mod settings;
pub mod types;
pub mod value;

pub use def::ParamDef;
pub use preset::{Preset, PresetBuilder};
pub use schema::{ParamSchema, SceneSchema};
pub use settings::Settings;
pub use types::{ParamFlags, ParamType};
pub use value::ParamValue;
