//! Machine-readable description of a scene's parameters, consumed by the
//! simulator UI to build controls.

use anyhow::Result;
use serde::Serialize;

use super::settings::Settings;
use super::types::Underlying;

/// Numeric bound that serializes as an integer for integer-backed types.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Bound {
    Int(i64),
    Float(f32),
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_float: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_int: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_bool: Option<bool>,
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneSchema {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub parameters: Vec<ParamSchema>,
}

impl SceneSchema {
    /// Snapshot the declared parameters of a settings store. Parameters come
    /// out sorted by name, matching the store's iteration order.
    pub fn from_settings(name: &str, description: &str, settings: &Settings) -> SceneSchema {
        let parameters = settings
            .names()
            .filter_map(|param_name| settings.def(param_name))
            .map(|def| {
                let param_type = def.param_type();
                let mut schema = ParamSchema {
                    name: def.name().to_string(),
                    type_tag: param_type.tag().to_string(),
                    description: def.description().to_string(),
                    min_value: None,
                    max_value: None,
                    default_float: None,
                    default_int: None,
                    default_bool: None,
                    flags: def.flags().names().iter().map(|f| f.to_string()).collect(),
                    options: None,
                };
                match param_type.underlying() {
                    Underlying::Float => {
                        let (min, max) = def.float_bounds();
                        schema.min_value = Some(Bound::Float(min));
                        schema.max_value = Some(Bound::Float(max));
                        schema.default_float = Some(def.default_value().as_float());
                    }
                    Underlying::Int => {
                        let (min, max) = def.int_bounds();
                        schema.min_value = Some(Bound::Int(min as i64));
                        schema.max_value = Some(Bound::Int(max as i64));
                        schema.default_int = Some(def.default_value().as_int());
                        if !def.options().is_empty() {
                            schema.options = Some(def.options().to_vec());
                        }
                    }
                    Underlying::Bool => {
                        schema.default_bool = Some(def.default_value().as_bool());
                    }
                }
                schema
            })
            .collect();

        SceneSchema {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
