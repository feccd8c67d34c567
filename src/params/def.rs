use anyhow::{bail, Result};

use super::types::{ParamFlags, ParamType, Underlying};
use super::value::ParamValue;

/// One declared parameter: type, bounds, default, flags, description, and
/// (for selects) the option list. Built via the typed constructors inside a
/// scene's `setup`.
#[derive(Debug, Clone)]
pub struct ParamDef {
    name: String,
    param_type: ParamType,
    float_bounds: (f32, f32),
    int_bounds: (i32, i32),
    default: ParamValue,
    flags: ParamFlags,
    description: String,
    options: Vec<String>,
}

impl ParamDef {
    fn semantic(name: &str, param_type: ParamType, default: f32) -> Self {
        let bounds = param_type
            .default_bounds()
            .expect("semantic types carry bounds");
        Self {
            name: name.to_string(),
            param_type,
            float_bounds: bounds,
            int_bounds: (0, 0),
            default: ParamValue::Float(default),
            flags: ParamFlags::NONE,
            description: String::new(),
            options: Vec::new(),
        }
    }

    /// 0.0 ..= 1.0
    pub fn ratio(name: &str, default: f32) -> Self {
        Self::semantic(name, ParamType::Ratio, default)
    }

    /// -1.0 ..= 1.0
    pub fn signed_ratio(name: &str, default: f32) -> Self {
        Self::semantic(name, ParamType::SignedRatio, default)
    }

    /// 0.0 ..= 2π
    pub fn angle(name: &str, default: f32) -> Self {
        Self::semantic(name, ParamType::Angle, default)
    }

    /// -π ..= π
    pub fn signed_angle(name: &str, default: f32) -> Self {
        Self::semantic(name, ParamType::SignedAngle, default)
    }

    /// 0.0 ..= 100.0
    pub fn percent(name: &str, default: f32) -> Self {
        Self::semantic(name, ParamType::Percent, default)
    }

    /// Custom float range.
    pub fn range(name: &str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name: name.to_string(),
            param_type: ParamType::Range,
            float_bounds: (min, max),
            int_bounds: (0, 0),
            default: ParamValue::Float(default),
            flags: ParamFlags::NONE,
            description: String::new(),
            options: Vec::new(),
        }
    }

    /// Custom inclusive integer range.
    pub fn count(name: &str, min: i32, max: i32, default: i32) -> Self {
        Self {
            name: name.to_string(),
            param_type: ParamType::Count,
            float_bounds: (0.0, 0.0),
            int_bounds: (min, max),
            default: ParamValue::Int(default),
            flags: ParamFlags::NONE,
            description: String::new(),
            options: Vec::new(),
        }
    }

    /// Boolean toggle. Flags are ignored for switches.
    pub fn switch(name: &str, default: bool) -> Self {
        Self {
            name: name.to_string(),
            param_type: ParamType::Switch,
            float_bounds: (0.0, 0.0),
            int_bounds: (0, 1),
            default: ParamValue::Bool(default),
            flags: ParamFlags::NONE,
            description: String::new(),
            options: Vec::new(),
        }
    }

    /// Named enum stored as the option index.
    pub fn select(name: &str, options: &[&str], default_index: i32) -> Self {
        let upper = options.len().saturating_sub(1) as i32;
        Self {
            name: name.to_string(),
            param_type: ParamType::Select,
            float_bounds: (0.0, 0.0),
            int_bounds: (0, upper),
            default: ParamValue::Int(default_index),
            flags: ParamFlags::NONE,
            description: String::new(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn flags(&self) -> ParamFlags {
        self.flags
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn default_value(&self) -> ParamValue {
        self.default
    }

    pub fn float_bounds(&self) -> (f32, f32) {
        self.float_bounds
    }

    pub fn int_bounds(&self) -> (i32, i32) {
        self.int_bounds
    }

    /// Declaration-time validation: identifier-shaped name, sane bounds,
    /// valid default, no conflicting flags.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            bail!("parameter name '{}' is not an identifier", self.name);
        }
        if self.flags.conflicts() {
            bail!("parameter '{}' sets both CLAMP and WRAP", self.name);
        }

        match self.param_type.underlying() {
            Underlying::Float => {
                let (min, max) = self.float_bounds;
                if !min.is_finite() || !max.is_finite() {
                    bail!("parameter '{}' has non-finite bounds", self.name);
                }
                if min >= max {
                    bail!("parameter '{}' bounds [{min}, {max}] are inverted", self.name);
                }
                let default = self.default.as_float();
                if !default.is_finite() || default < min || default > max {
                    bail!(
                        "parameter '{}' default {default} outside [{min}, {max}]",
                        self.name
                    );
                }
            }
            Underlying::Int => {
                let (min, max) = self.int_bounds;
                if min > max {
                    bail!("parameter '{}' bounds [{min}, {max}] are inverted", self.name);
                }
                if self.param_type == ParamType::Select && self.options.is_empty() {
                    bail!("select parameter '{}' has no options", self.name);
                }
                let default = self.default.as_int();
                if default < min || default > max {
                    bail!(
                        "parameter '{}' default {default} outside [{min}, {max}]",
                        self.name
                    );
                }
            }
            Underlying::Bool => {}
        }

        Ok(())
    }

    /// Run a write through the declaration's flag pipeline. Returns the
    /// value to store; `Invalid` when the write is rejected.
    pub(crate) fn apply(&self, value: ParamValue) -> ParamValue {
        match self.param_type.underlying() {
            Underlying::Bool => match value {
                ParamValue::Bool(v) => ParamValue::Bool(v),
                _ => {
                    log::warn!("parameter '{}': expected a bool", self.name);
                    ParamValue::Invalid
                }
            },
            Underlying::Float => {
                let raw = match value {
                    ParamValue::Float(v) => v,
                    // Integer writes to float parameters widen silently.
                    ParamValue::Int(v) => v as f32,
                    _ => {
                        log::warn!("parameter '{}': expected a float", self.name);
                        return ParamValue::Invalid;
                    }
                };
                if !raw.is_finite() {
                    log::warn!("parameter '{}': rejected non-finite value", self.name);
                    return ParamValue::Invalid;
                }
                let (min, max) = self.float_bounds;
                if self.flags.has(ParamFlags::CLAMP) {
                    ParamValue::Float(raw.clamp(min, max))
                } else if self.flags.has(ParamFlags::WRAP) {
                    if self.param_type.is_wrap_friendly() {
                        ParamValue::Float(wrap_float(raw, min, max))
                    } else {
                        ParamValue::Float(raw.clamp(min, max))
                    }
                } else if raw < min || raw > max {
                    log::warn!(
                        "parameter '{}': {raw} out of range [{min}, {max}]",
                        self.name
                    );
                    ParamValue::Invalid
                } else {
                    ParamValue::Float(raw)
                }
            }
            Underlying::Int => {
                let raw = match value {
                    ParamValue::Int(v) => v,
                    _ => {
                        log::warn!("parameter '{}': expected an int", self.name);
                        return ParamValue::Invalid;
                    }
                };
                let (min, max) = self.int_bounds;
                if self.flags.has(ParamFlags::CLAMP) {
                    ParamValue::Int(raw.clamp(min, max))
                } else if self.flags.has(ParamFlags::WRAP) {
                    ParamValue::Int(wrap_int(raw, min, max))
                } else if raw < min || raw > max {
                    log::warn!(
                        "parameter '{}': {raw} out of range [{min}, {max}]",
                        self.name
                    );
                    ParamValue::Invalid
                } else {
                    ParamValue::Int(raw)
                }
            }
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Fold into [min, max) by float modulo.
fn wrap_float(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range <= 0.0 {
        return min;
    }
    let folded = (value - min).rem_euclid(range);
    min + folded
}

/// Fold into [min, max] inclusive.
fn wrap_int(value: i32, min: i32, max: i32) -> i32 {
    let range = (max - min) as i64 + 1;
    if range <= 1 {
        return min;
    }
    let folded = ((value as i64 - min as i64).rem_euclid(range)) as i32;
    min + folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_constructors_pick_up_default_bounds() {
        let def = ParamDef::ratio("speed", 0.5);
        assert_eq!(def.float_bounds(), (0.0, 1.0));
        let def = ParamDef::signed_angle("heading", 0.0);
        let (min, max) = def.float_bounds();
        assert!(min < 0.0 && max > 3.14);
    }

    #[test]
    fn validate_rejects_bad_names_and_defaults() {
        assert!(ParamDef::ratio("speed", 0.5).validate().is_ok());
        assert!(ParamDef::ratio("9speed", 0.5).validate().is_err());
        assert!(ParamDef::ratio("spe ed", 0.5).validate().is_err());
        assert!(ParamDef::ratio("speed", 2.0).validate().is_err());
        assert!(ParamDef::count("n", 5, 1, 3).validate().is_err());
        assert!(ParamDef::select("mode", &[], 0).validate().is_err());
        let conflicted = ParamDef::ratio("speed", 0.5)
            .with_flags(ParamFlags::CLAMP | ParamFlags::WRAP);
        assert!(conflicted.validate().is_err());
    }

    #[test]
    fn clamp_snaps_into_range() {
        let def = ParamDef::ratio("speed", 0.5).with_flags(ParamFlags::CLAMP);
        assert_eq!(def.apply(ParamValue::Float(2.0)).as_float(), 1.0);
        assert_eq!(def.apply(ParamValue::Float(-0.5)).as_float(), 0.0);
        assert_eq!(def.apply(ParamValue::Float(0.25)).as_float(), 0.25);
    }

    #[test]
    fn wrap_folds_periodic_types() {
        let def = ParamDef::ratio("phase", 0.0).with_flags(ParamFlags::WRAP);
        let wrapped = def.apply(ParamValue::Float(1.25)).as_float();
        assert!((wrapped - 0.25).abs() < 1e-6);
        let wrapped = def.apply(ParamValue::Float(-0.25)).as_float();
        assert!((wrapped - 0.75).abs() < 1e-6);
    }

    #[test]
    fn wrap_on_non_periodic_types_clamps() {
        let def = ParamDef::percent("level", 50.0).with_flags(ParamFlags::WRAP);
        assert_eq!(def.apply(ParamValue::Float(150.0)).as_float(), 100.0);
    }

    #[test]
    fn none_rejects_out_of_range_with_sentinel() {
        let def = ParamDef::ratio("gain", 0.5);
        let stored = def.apply(ParamValue::Float(2.0));
        assert!(!stored.is_valid());
        assert!(stored.as_float().is_nan());
    }

    #[test]
    fn int_wrap_is_inclusive() {
        let def = ParamDef::count("step", 0, 4, 0).with_flags(ParamFlags::WRAP);
        assert_eq!(def.apply(ParamValue::Int(5)).as_int(), 0);
        assert_eq!(def.apply(ParamValue::Int(7)).as_int(), 2);
        assert_eq!(def.apply(ParamValue::Int(-1)).as_int(), 4);
    }

    #[test]
    fn type_mismatch_stores_invalid() {
        let def = ParamDef::switch("enabled", true);
        assert!(!def.apply(ParamValue::Float(1.0)).is_valid());
        let def = ParamDef::count("n", 0, 10, 5);
        assert!(!def.apply(ParamValue::Float(3.0)).is_valid());
    }

    #[test]
    fn int_widens_to_float_parameters() {
        let def = ParamDef::range("size", 0.0, 10.0, 5.0);
        assert_eq!(def.apply(ParamValue::Int(3)).as_float(), 3.0);
    }
}
