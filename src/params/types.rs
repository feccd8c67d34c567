use std::f32::consts::PI;

/// Parameter type tags. Semantic types carry fixed bounds; `Range` and
/// `Count` take theirs from the declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Ratio,
    SignedRatio,
    Angle,
    SignedAngle,
    Percent,
    Range,
    Count,
    Switch,
    Select,
}

/// What a parameter of this type stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underlying {
    Float,
    Int,
    Bool,
}

impl ParamType {
    pub fn tag(self) -> &'static str {
        match self {
            ParamType::Ratio => "ratio",
            ParamType::SignedRatio => "signed_ratio",
            ParamType::Angle => "angle",
            ParamType::SignedAngle => "signed_angle",
            ParamType::Percent => "percent",
            ParamType::Range => "range",
            ParamType::Count => "count",
            ParamType::Switch => "switch",
            ParamType::Select => "select",
        }
    }

    pub fn from_tag(tag: &str) -> Option<ParamType> {
        Some(match tag {
            "ratio" => ParamType::Ratio,
            "signed_ratio" => ParamType::SignedRatio,
            "angle" => ParamType::Angle,
            "signed_angle" => ParamType::SignedAngle,
            "percent" => ParamType::Percent,
            "range" => ParamType::Range,
            "count" => ParamType::Count,
            "switch" => ParamType::Switch,
            "select" => ParamType::Select,
            _ => return None,
        })
    }

    pub fn underlying(self) -> Underlying {
        match self {
            ParamType::Ratio
            | ParamType::SignedRatio
            | ParamType::Angle
            | ParamType::SignedAngle
            | ParamType::Percent
            | ParamType::Range => Underlying::Float,
            ParamType::Count | ParamType::Select => Underlying::Int,
            ParamType::Switch => Underlying::Bool,
        }
    }

    /// Types where WRAP folds instead of clamping: periodic quantities.
    pub fn is_wrap_friendly(self) -> bool {
        matches!(
            self,
            ParamType::Ratio | ParamType::SignedRatio | ParamType::Angle | ParamType::SignedAngle
        )
    }

    /// Built-in bounds for the semantic float types.
    pub fn default_bounds(self) -> Option<(f32, f32)> {
        match self {
            ParamType::Ratio => Some((0.0, 1.0)),
            ParamType::SignedRatio => Some((-1.0, 1.0)),
            ParamType::Angle => Some((0.0, 2.0 * PI)),
            ParamType::SignedAngle => Some((-PI, PI)),
            ParamType::Percent => Some((0.0, 100.0)),
            _ => None,
        }
    }
}

/// Behavior on out-of-range writes. `CLAMP` and `WRAP` are mutually
/// exclusive; with neither set, a bad write stores the type's sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParamFlags(u8);

impl ParamFlags {
    pub const NONE: ParamFlags = ParamFlags(0);
    pub const CLAMP: ParamFlags = ParamFlags(1 << 0);
    pub const WRAP: ParamFlags = ParamFlags(1 << 1);

    pub fn has(self, flag: ParamFlags) -> bool {
        self.0 & flag.0 == flag.0 && flag.0 != 0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn conflicts(self) -> bool {
        self.has(ParamFlags::CLAMP) && self.has(ParamFlags::WRAP)
    }

    /// Flag names for the schema export.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.has(ParamFlags::CLAMP) {
            names.push("CLAMP");
        }
        if self.has(ParamFlags::WRAP) {
            names.push("WRAP");
        }
        names
    }
}

impl std::ops::BitOr for ParamFlags {
    type Output = ParamFlags;

    fn bitor(self, rhs: ParamFlags) -> ParamFlags {
        ParamFlags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for ty in [
            ParamType::Ratio,
            ParamType::SignedRatio,
            ParamType::Angle,
            ParamType::SignedAngle,
            ParamType::Percent,
            ParamType::Range,
            ParamType::Count,
            ParamType::Switch,
            ParamType::Select,
        ] {
            assert_eq!(ParamType::from_tag(ty.tag()), Some(ty));
        }
        assert_eq!(ParamType::from_tag("palette"), None);
    }

    #[test]
    fn wrap_friendliness_covers_periodic_types() {
        assert!(ParamType::Angle.is_wrap_friendly());
        assert!(ParamType::Ratio.is_wrap_friendly());
        assert!(!ParamType::Percent.is_wrap_friendly());
        assert!(!ParamType::Count.is_wrap_friendly());
    }

    #[test]
    fn flag_sets_detect_conflicts() {
        let both = ParamFlags::CLAMP | ParamFlags::WRAP;
        assert!(both.conflicts());
        assert!(!ParamFlags::CLAMP.conflicts());
        assert!(ParamFlags::NONE.is_none());
        assert_eq!(both.names(), vec!["CLAMP", "WRAP"]);
    }
}
