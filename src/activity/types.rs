//! Activity identifiers and the per-type definition table loaded from config.
use std::{borrow::Cow, collections::HashMap, fmt, fs, path::Path};

use bevy::{log::warn, prelude::Resource};
use serde::{Deserialize, Serialize};

const ACTIVITY_CONFIG_PATH: &str = "config/activities.toml";
const DEFAULT_EXERTION_LEVEL: f32 = 1.0;

/// Stable type tag shared by an activity record, its actor and the save format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(Cow<'static, str>);

impl ActivityId {
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const ACT_WASH: ActivityId = ActivityId::from_static("ACT_WASH");

#[derive(Debug, Clone, Deserialize)]
struct ActivityTypesConfig {
    activities: Vec<ActivityTypeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct ActivityTypeConfig {
    id: String,
    verb: String,
    #[serde(default = "default_exertion_level")]
    exertion_level: f32,
    #[serde(default)]
    suspendable: bool,
}

fn default_exertion_level() -> f32 {
    DEFAULT_EXERTION_LEVEL
}

/// Static definition of an activity type.
#[derive(Debug, Clone)]
pub struct ActivityType {
    pub id: ActivityId,
    pub verb: String,
    pub exertion_level: f32,
    /// Cancelled activities of this type are kept in the backlog for resuming.
    pub suspendable: bool,
}

/// Lookup table of every known activity type.
#[derive(Resource, Debug, Clone)]
pub struct ActivityTypes {
    types: HashMap<ActivityId, ActivityType>,
}

impl ActivityTypes {
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data =
            fs::read_to_string(&path).map_err(|err| format!("unable to read file: {err}"))?;
        let config: ActivityTypesConfig =
            toml::from_str(&data).map_err(|err| format!("invalid activity config: {err}"))?;
        Self::from_config(config)
    }

    fn from_config(config: ActivityTypesConfig) -> Result<Self, String> {
        if config.activities.is_empty() {
            return Err("activity config must define at least one activity".to_string());
        }

        let mut types = HashMap::new();
        for entry in config.activities {
            if entry.id.trim().is_empty() {
                return Err("activity id cannot be empty".to_string());
            }
            if !entry.exertion_level.is_finite() || entry.exertion_level < 0.0 {
                return Err(format!(
                    "activity '{}' has invalid exertion level {}",
                    entry.id, entry.exertion_level
                ));
            }

            let id = ActivityId::new(entry.id);
            if types.contains_key(&id) {
                return Err(format!("activity '{id}' is defined more than once"));
            }
            types.insert(
                id.clone(),
                ActivityType {
                    id,
                    verb: entry.verb,
                    exertion_level: entry.exertion_level,
                    suspendable: entry.suspendable,
                },
            );
        }

        Ok(Self { types })
    }

    fn fallback() -> Self {
        let fallback_config = ActivityTypesConfig {
            activities: vec![ActivityTypeConfig {
                id: ACT_WASH.as_str().to_string(),
                verb: "washing".to_string(),
                exertion_level: 2.0,
                suspendable: true,
            }],
        };

        Self::from_config(fallback_config).expect("fallback activity config should be valid")
    }

    pub fn get(&self, id: &ActivityId) -> Option<&ActivityType> {
        self.types.get(id)
    }

    pub fn exertion_level(&self, id: &ActivityId) -> f32 {
        self.get(id)
            .map(|kind| kind.exertion_level)
            .unwrap_or(DEFAULT_EXERTION_LEVEL)
    }

    pub fn is_suspendable(&self, id: &ActivityId) -> bool {
        self.get(id).map(|kind| kind.suspendable).unwrap_or(false)
    }

    pub fn verb<'a>(&'a self, id: &'a ActivityId) -> &'a str {
        self.get(id)
            .map(|kind| kind.verb.as_str())
            .unwrap_or_else(|| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }
}

impl Default for ActivityTypes {
    fn default() -> Self {
        match Self::load_from_file(ACTIVITY_CONFIG_PATH) {
            Ok(types) => types,
            Err(error) => {
                warn!(
                    "Failed to load activity types from {}: {error}. Falling back to defaults.",
                    ACTIVITY_CONFIG_PATH
                );
                Self::fallback()
            }
        }
    }
}

#[cfg(test)]
impl ActivityTypes {
    /// Builds a table from inline TOML for tests.
    pub fn from_toml(data: &str) -> Result<Self, String> {
        let config: ActivityTypesConfig =
            toml::from_str(data).map_err(|err| format!("invalid activity config: {err}"))?;
        Self::from_config(config)
    }

    pub fn builtin() -> Self {
        Self::fallback()
    }
}
