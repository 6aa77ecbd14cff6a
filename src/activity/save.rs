//! Save/load of in-progress activities. Each actor is stored as `{type, fields}` and
//! rebuilt through the deserializer registry; a broken entry never sinks the whole load.
use std::{fs, path::Path};

use bevy::log::warn;
use serde::{Deserialize, Serialize};

use super::{
    errors::ActivityError,
    record::PlayerActivity,
    registry::{ActivityDeserializers, SavedActor},
    runner::{ActivityRunner, RunningActivity},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedActivity {
    pub record: PlayerActivity,
    pub actor: SavedActor,
}

impl SavedActivity {
    pub fn capture(running: &RunningActivity) -> Result<Self, ActivityError> {
        Ok(Self {
            record: running.record.clone(),
            actor: SavedActor::capture(running.actor.as_ref())?,
        })
    }

    pub fn restore(
        &self,
        registry: &ActivityDeserializers,
    ) -> Result<RunningActivity, ActivityError> {
        let actor = registry.deserialize(&self.actor)?;
        Ok(RunningActivity::new(self.record.clone(), actor))
    }
}

/// Persisted activities of one character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedRunner {
    pub character: String,
    #[serde(default)]
    pub activity: Option<SavedActivity>,
    #[serde(default)]
    pub backlog: Vec<SavedActivity>,
}

impl SavedRunner {
    pub fn capture(character: &str, runner: &ActivityRunner) -> Result<Self, ActivityError> {
        Ok(Self {
            character: character.to_string(),
            activity: runner.current().map(SavedActivity::capture).transpose()?,
            backlog: runner
                .backlog()
                .map(SavedActivity::capture)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Rebuilds the runner, skipping entries that fail to deserialize.
    pub fn restore(
        &self,
        registry: &ActivityDeserializers,
    ) -> (ActivityRunner, Vec<ActivityError>) {
        let mut failures = Vec::new();
        let mut rebuild = |saved: &SavedActivity| match saved.restore(registry) {
            Ok(running) => Some(running),
            Err(err) => {
                failures.push(err);
                None
            }
        };

        let current = self.activity.as_ref().and_then(&mut rebuild);
        let backlog = self.backlog.iter().filter_map(&mut rebuild).collect();
        (ActivityRunner::restored(current, backlog), failures)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub turn: u64,
    pub runners: Vec<SavedRunner>,
}

/// A restored runner keyed by character name.
#[derive(Debug)]
pub struct RestoredRunner {
    pub character: String,
    pub runner: ActivityRunner,
}

/// Outcome of loading a save: what came back and which entries were dropped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub turn: u64,
    pub runners: Vec<RestoredRunner>,
    pub failures: Vec<ActivityError>,
}

impl LoadReport {
    pub fn restored_activities(&self) -> usize {
        self.runners
            .iter()
            .map(|entry| usize::from(entry.runner.is_active()) + entry.runner.backlog().count())
            .sum()
    }
}

pub fn save_to_string(save: &SaveGame) -> Result<String, ActivityError> {
    Ok(serde_json::to_string_pretty(save)?)
}

/// Parses a save. Only a broken document is an error; broken activities land in
/// [`LoadReport::failures`].
pub fn load_from_str(
    data: &str,
    registry: &ActivityDeserializers,
) -> Result<LoadReport, ActivityError> {
    let save: SaveGame = serde_json::from_str(data).map_err(ActivityError::Parse)?;
    let mut report = LoadReport {
        turn: save.turn,
        ..LoadReport::default()
    };

    for saved in &save.runners {
        let (runner, failures) = saved.restore(registry);
        for failure in &failures {
            warn!("Dropping saved activity of {}: {failure}", saved.character);
        }
        report.failures.extend(failures);
        report.runners.push(RestoredRunner {
            character: saved.character.clone(),
            runner,
        });
    }
    Ok(report)
}

pub fn write_save(path: impl AsRef<Path>, save: &SaveGame) -> Result<(), String> {
    let path = path.as_ref();
    let data = save_to_string(save).map_err(|err| err.to_string())?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("unable to create {}: {err}", parent.display()))?;
    }
    fs::write(path, data).map_err(|err| format!("unable to write {}: {err}", path.display()))
}

/// Reads a save file; `Ok(None)` when there is none yet.
pub fn read_save(
    path: impl AsRef<Path>,
    registry: &ActivityDeserializers,
) -> Result<Option<LoadReport>, String> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path).map_err(|err| format!("unable to read file: {err}"))?;
    load_from_str(&data, registry)
        .map(Some)
        .map_err(|err| format!("invalid save: {err}"))
}
