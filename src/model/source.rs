//! Loading model definitions from their YAML source form. Generators emit
//! the same tables the embedded fixtures carry; this loader accepts that
//! document directly and validates it before handing it to the runtime.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::def::ModelDef;

/// Parse a model definition from YAML text and run structural validation.
pub fn parse_model_def(yaml: &str) -> Result<ModelDef> {
    let def: ModelDef = serde_yaml::from_str(yaml).context("failed to parse model definition")?;
    def.validate()
        .with_context(|| format!("model '{}' failed validation", def.name))?;
    Ok(def)
}

/// Load and validate a model definition file.
pub fn load_model_def<P: AsRef<Path>>(path: P) -> Result<ModelDef> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read model definition {}", path.display()))?;
    parse_model_def(&text)
}

impl ModelDef {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        parse_model_def(yaml)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_model_def(path)
    }
}
