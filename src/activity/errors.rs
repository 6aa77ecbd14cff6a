//! Error types surfaced when persisting and restoring activities.
use std::fmt;

use super::types::ActivityId;

/// Failures of the save/load pipeline for a single activity.
#[derive(Debug)]
pub enum ActivityError {
    /// No deserializer is registered for the persisted type tag.
    UnknownType { id: ActivityId },
    /// The type is known but its fields could not be parsed.
    Malformed {
        id: ActivityId,
        source: serde_json::Error,
    },
    /// A deserializer produced an actor reporting a different type.
    TypeMismatch {
        expected: ActivityId,
        found: ActivityId,
    },
    Serialize(serde_json::Error),
    /// The save document itself is not valid.
    Parse(serde_json::Error),
}

impl ActivityError {
    pub fn unknown_type(id: ActivityId) -> Self {
        Self::UnknownType { id }
    }

    pub fn malformed(id: ActivityId, source: serde_json::Error) -> Self {
        Self::Malformed { id, source }
    }

    pub fn type_mismatch(expected: ActivityId, found: ActivityId) -> Self {
        Self::TypeMismatch { expected, found }
    }
}

impl fmt::Display for ActivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { id } => write!(f, "Unknown activity type '{}'", id),
            Self::Malformed { id, source } => {
                write!(f, "Malformed data for activity '{}': {}", id, source)
            }
            Self::TypeMismatch { expected, found } => write!(
                f,
                "Deserializer for '{}' produced an activity of type '{}'",
                expected, found
            ),
            Self::Serialize(err) => write!(f, "Failed to serialize activity: {}", err),
            Self::Parse(err) => write!(f, "Failed to parse activity save: {}", err),
        }
    }
}

impl std::error::Error for ActivityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed { source, .. } => Some(source),
            Self::Serialize(err) | Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ActivityError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}
