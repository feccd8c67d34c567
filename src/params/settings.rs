use std::collections::BTreeMap;
use std::ops::Index;

use super::def::ParamDef;
use super::preset::Preset;
use super::value::ParamValue;

static INVALID: ParamValue = ParamValue::Invalid;

#[derive(Debug, Clone)]
struct Slot {
    def: ParamDef,
    value: ParamValue,
}

/// Per-scene settings store. Declarations happen in `setup`; reads and
/// writes are total — problems are logged and surface as sentinel values,
/// never as panics or errors.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    slots: BTreeMap<String, Slot>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a parameter declaration. Invalid or duplicate declarations are
    /// dropped with a warning; the rest of the scene keeps working.
    pub fn declare(&mut self, def: ParamDef) -> bool {
        if let Err(error) = def.validate() {
            log::warn!("dropping parameter declaration: {error}");
            return false;
        }
        if self.slots.contains_key(def.name()) {
            log::warn!("duplicate parameter '{}' dropped", def.name());
            return false;
        }
        let value = def.default_value();
        self.slots.insert(def.name().to_string(), Slot { def, value });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Declared names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn def(&self, name: &str) -> Option<&ParamDef> {
        self.slots.get(name).map(|slot| &slot.def)
    }

    /// Write a value through the declaration's validation pipeline.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        let Some(slot) = self.slots.get_mut(name) else {
            log::warn!("set on unknown parameter '{name}'");
            return;
        };
        slot.value = slot.def.apply(value.into());
    }

    /// Read a value. Unknown names warn and return the invalid sentinel.
    pub fn get(&self, name: &str) -> ParamValue {
        match self.slots.get(name) {
            Some(slot) => slot.value,
            None => {
                log::warn!("get on unknown parameter '{name}'");
                ParamValue::Invalid
            }
        }
    }

    pub fn get_float(&self, name: &str) -> f32 {
        self.get(name).as_float()
    }

    pub fn get_int(&self, name: &str) -> i32 {
        self.get(name).as_int()
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).as_bool()
    }

    /// Restore every declared parameter to its default.
    pub fn reset(&mut self) {
        for slot in self.slots.values_mut() {
            slot.value = slot.def.default_value();
        }
    }

    /// Apply a preset: `set` per key, warning on and skipping keys this
    /// scene never declared.
    pub fn apply_preset(&mut self, preset: &Preset) {
        for (name, value) in preset.values() {
            if !self.contains(name) {
                log::warn!(
                    "preset '{}': unknown parameter '{name}' skipped",
                    preset.name()
                );
                continue;
            }
            self.set(name, *value);
        }
    }
}

impl Index<&str> for Settings {
    type Output = ParamValue;

    fn index(&self, name: &str) -> &ParamValue {
        match self.slots.get(name) {
            Some(slot) => &slot.value,
            None => &INVALID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::types::ParamFlags;

    fn store() -> Settings {
        let mut settings = Settings::new();
        settings.declare(ParamDef::ratio("speed", 0.5).with_flags(ParamFlags::CLAMP));
        settings.declare(ParamDef::ratio("gain", 0.5));
        settings.declare(ParamDef::count("blobs", 1, 10, 3).with_flags(ParamFlags::CLAMP));
        settings.declare(ParamDef::switch("enabled", true));
        settings
    }

    #[test]
    fn declare_rejects_duplicates_and_bad_defs() {
        let mut settings = store();
        assert_eq!(settings.len(), 4);
        assert!(!settings.declare(ParamDef::ratio("speed", 0.1)));
        assert!(!settings.declare(ParamDef::ratio("2fast", 0.1)));
        assert_eq!(settings.len(), 4);
    }

    #[test]
    fn defaults_are_live_immediately() {
        let settings = store();
        assert_eq!(settings.get_float("speed"), 0.5);
        assert_eq!(settings.get_int("blobs"), 3);
        assert!(settings.get_bool("enabled"));
    }

    #[test]
    fn clamped_writes_round_trip_clamped() {
        let mut settings = store();
        settings.set("speed", 2.0);
        assert_eq!(settings.get_float("speed"), 1.0);
        settings.set("blobs", 99);
        assert_eq!(settings.get_int("blobs"), 10);
    }

    #[test]
    fn unflagged_out_of_range_write_reads_as_sentinel() {
        let mut settings = store();
        settings.set("gain", 2.0);
        assert!(settings.get_float("gain").is_nan());
        assert!(!settings.get("gain").is_valid());
    }

    #[test]
    fn unknown_names_are_total() {
        let mut settings = store();
        settings.set("nope", 1.0);
        assert!(settings.get("nope").as_float().is_nan());
        assert!(!settings["nope"].is_valid());
    }

    #[test]
    fn reset_restores_declared_defaults() {
        let mut settings = store();
        settings.set("speed", 0.9);
        settings.set("enabled", false);
        settings.set("gain", 7.0);
        settings.reset();
        assert_eq!(settings.get_float("speed"), 0.5);
        assert!(settings.get_bool("enabled"));
        assert_eq!(settings.get_float("gain"), 0.5);
    }

    #[test]
    fn index_sugar_matches_get() {
        let mut settings = store();
        settings.set("speed", 0.75);
        assert_eq!(settings["speed"].as_float(), 0.75);
        assert_eq!(settings["speed"], settings.get("speed"));
    }

    #[test]
    fn names_come_back_sorted() {
        let settings = store();
        let names: Vec<_> = settings.names().collect();
        assert_eq!(names, vec!["blobs", "enabled", "gain", "speed"]);
    }
}
