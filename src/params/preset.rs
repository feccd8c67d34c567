use super::value::ParamValue;

/// Named bag of parameter values. Building is fluent; application goes
/// through `Settings::apply_preset`, which validates each write the same
/// way a direct `set` would.
#[derive(Debug, Clone)]
pub struct Preset {
    name: String,
    values: Vec<(String, ParamValue)>,
}

impl Preset {
    pub fn builder(name: &str) -> PresetBuilder {
        PresetBuilder {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[(String, ParamValue)] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PresetBuilder {
    name: String,
    values: Vec<(String, ParamValue)>,
}

impl PresetBuilder {
    pub fn set(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.values.push((name.to_string(), value.into()));
        self
    }

    pub fn build(self) -> Preset {
        Preset {
            name: self.name,
            values: self.values,
        }
    }
}
