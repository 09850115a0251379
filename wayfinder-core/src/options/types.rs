use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;

use super::{KEY_MODE, KEY_RESTRICTIONS, KEY_WALK_SPEED, RawRouteOptions};
use crate::OptionsError;
use crate::model::{WayType, WayTypeCatalog};

/// Closed set of string choices for one option key
pub trait OptionChoice: Copy + Sized + 'static {
    /// Human-readable name used in error messages
    const LABEL: &'static str;
    const CHOICES: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Result<Self, OptionsError> {
        Self::CHOICES
            .iter()
            .copied()
            .find(|choice| choice.as_str() == value)
            .ok_or_else(|| {
                OptionsError::invalid(format!(
                    "{} must be one of {}, got '{value}'",
                    Self::LABEL,
                    Self::CHOICES.iter().map(|choice| choice.as_str()).join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    Fastest,
    Shortest,
}

impl OptionChoice for RouteMode {
    const LABEL: &'static str = KEY_MODE;
    const CHOICES: &'static [Self] = &[RouteMode::Fastest, RouteMode::Shortest];

    fn as_str(self) -> &'static str {
        match self {
            RouteMode::Fastest => "fastest",
            RouteMode::Shortest => "shortest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkSpeed {
    Slow,
    Default,
    Fast,
}

impl WalkSpeed {
    pub fn multiplier(self) -> f64 {
        match self {
            WalkSpeed::Slow => 0.8,
            WalkSpeed::Default => 1.0,
            WalkSpeed::Fast => 1.2,
        }
    }
}

impl OptionChoice for WalkSpeed {
    const LABEL: &'static str = KEY_WALK_SPEED;
    const CHOICES: &'static [Self] = &[WalkSpeed::Slow, WalkSpeed::Default, WalkSpeed::Fast];

    fn as_str(self) -> &'static str {
        match self {
            WalkSpeed::Slow => "slow",
            WalkSpeed::Default => "default",
            WalkSpeed::Fast => "fast",
        }
    }
}

/// Preference for routing through restricted areas the caller can see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionPreference {
    Avoid,
    Normal,
    Prefer,
}

impl OptionChoice for RestrictionPreference {
    const LABEL: &'static str = KEY_RESTRICTIONS;
    const CHOICES: &'static [Self] = &[
        RestrictionPreference::Avoid,
        RestrictionPreference::Normal,
        RestrictionPreference::Prefer,
    ];

    fn as_str(self) -> &'static str {
        match self {
            RestrictionPreference::Avoid => "avoid",
            RestrictionPreference::Normal => "normal",
            RestrictionPreference::Prefer => "prefer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WayTypePolicy {
    Allow,
    Avoid,
    AvoidUp,
    AvoidDown,
}

impl WayTypePolicy {
    pub fn is_directional(self) -> bool {
        matches!(self, WayTypePolicy::AvoidUp | WayTypePolicy::AvoidDown)
    }

    /// Policy a way type starts with before any preference is applied
    pub fn default_for(waytype: &WayType) -> Self {
        if waytype.avoid_by_default {
            WayTypePolicy::Avoid
        } else {
            WayTypePolicy::Allow
        }
    }
}

impl OptionChoice for WayTypePolicy {
    const LABEL: &'static str = "way type policy";
    const CHOICES: &'static [Self] = &[
        WayTypePolicy::Allow,
        WayTypePolicy::Avoid,
        WayTypePolicy::AvoidUp,
        WayTypePolicy::AvoidDown,
    ];

    fn as_str(self) -> &'static str {
        match self {
            WayTypePolicy::Allow => "allow",
            WayTypePolicy::Avoid => "avoid",
            WayTypePolicy::AvoidUp => "avoid_up",
            WayTypePolicy::AvoidDown => "avoid_down",
        }
    }
}

/// Complete, validated routing preferences for one request.
///
/// Only obtainable through [`RouteOptions::defaults`] and
/// [`resolve`](super::resolve), so every way type of the catalog it was
/// resolved against carries a policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteOptions {
    pub(super) mode: RouteMode,
    pub(super) walk_speed: WalkSpeed,
    pub(super) restrictions: RestrictionPreference,
    /// Keyed by way type name
    pub(super) way_types: BTreeMap<String, WayTypePolicy>,
}

impl RouteOptions {
    /// Built-in defaults: fastest route, default speed, restrictions treated
    /// normally, way types avoided only when the catalog says so
    pub fn defaults(catalog: &WayTypeCatalog) -> Self {
        Self {
            mode: RouteMode::Fastest,
            walk_speed: WalkSpeed::Default,
            restrictions: RestrictionPreference::Normal,
            way_types: catalog
                .iter()
                .map(|waytype| (waytype.name.clone(), WayTypePolicy::default_for(waytype)))
                .collect(),
        }
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn walk_speed(&self) -> WalkSpeed {
        self.walk_speed
    }

    pub fn restrictions(&self) -> RestrictionPreference {
        self.restrictions
    }

    /// Policy for a way type by name; way types unknown to these options are allowed
    pub fn policy(&self, waytype: &str) -> WayTypePolicy {
        self.way_types
            .get(waytype)
            .copied()
            .unwrap_or(WayTypePolicy::Allow)
    }

    pub fn way_types(&self) -> impl Iterator<Item = (&str, WayTypePolicy)> {
        self.way_types
            .iter()
            .map(|(name, policy)| (name.as_str(), *policy))
    }

    /// Flat key/value form, the inverse of resolving
    pub fn to_raw(&self) -> RawRouteOptions {
        let mut raw = RawRouteOptions::new();
        raw.insert(KEY_MODE, self.mode.as_str());
        raw.insert(KEY_WALK_SPEED, self.walk_speed.as_str());
        raw.insert(KEY_RESTRICTIONS, self.restrictions.as_str());
        for (name, policy) in &self.way_types {
            raw.insert(
                format!("{}{name}", super::WAYTYPE_KEY_PREFIX),
                policy.as_str(),
            );
        }
        raw
    }

    /// Stable `key=value,key=value` serialization, e.g. for shareable links
    pub fn serialize(&self) -> String {
        self.to_raw().to_string()
    }

    /// Short description of the active preferences, e.g.
    /// "Fastest route, fast walking speed, avoiding stairs upwards"
    pub fn summary(&self, catalog: &WayTypeCatalog) -> String {
        let mut parts = vec![match self.mode {
            RouteMode::Fastest => "fastest route".to_string(),
            RouteMode::Shortest => "shortest route".to_string(),
        }];
        match self.walk_speed {
            WalkSpeed::Slow => parts.push("slow walking speed".to_string()),
            WalkSpeed::Fast => parts.push("fast walking speed".to_string()),
            WalkSpeed::Default => {}
        }
        match self.restrictions {
            RestrictionPreference::Avoid => parts.push("avoiding restricted areas".to_string()),
            RestrictionPreference::Prefer => parts.push("preferring restricted areas".to_string()),
            RestrictionPreference::Normal => {}
        }
        for waytype in catalog.iter() {
            let title = waytype.title_plural.to_lowercase();
            match self.policy(&waytype.name) {
                WayTypePolicy::Allow => {}
                WayTypePolicy::Avoid => parts.push(format!("avoiding {title}")),
                WayTypePolicy::AvoidUp => parts.push(format!("avoiding {title} upwards")),
                WayTypePolicy::AvoidDown => parts.push(format!("avoiding {title} downwards")),
            }
        }

        let joined = parts.join(", ");
        let mut chars = joined.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => joined,
        }
    }
}
