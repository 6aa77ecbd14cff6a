//! CorePlugin wires the turn clock that converts real frame time into simulated turns.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

const CONFIG_PATH: &str = "config/turns.toml";
const DEFAULT_TIME_SCALE: f32 = 1.0;
const MIN_TIME_SCALE: f32 = 0.001;
const MIN_SECONDS_PER_TURN: f32 = 0.001;
/// Upper bound on turns processed in a single frame after a long stall.
const MAX_TURNS_PER_FRAME: u32 = 600;

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTurnConfig {
    seconds_per_turn: f32,
    moves_per_turn: i32,
    autosave_interval_turns: u64,
    progress_interval_turns: u64,
    save_path: String,
}

impl Default for RawTurnConfig {
    fn default() -> Self {
        Self {
            seconds_per_turn: 0.05,
            moves_per_turn: 100,
            autosave_interval_turns: 50,
            progress_interval_turns: 10,
            save_path: "saves/activities.json".to_string(),
        }
    }
}

/// Tunable parameters describing how turns are produced and spent.
#[derive(Resource, Debug, Clone)]
pub struct TurnSettings {
    pub seconds_per_turn: f32,
    pub moves_per_turn: i32,
    /// Zero disables autosaving.
    pub autosave_interval_turns: u64,
    /// Zero disables progress reporting.
    pub progress_interval_turns: u64,
    pub save_path: String,
}

impl TurnSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => match toml::from_str::<RawTurnConfig>(&data) {
                Ok(raw) => raw.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        CONFIG_PATH, err
                    );
                    RawTurnConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawTurnConfig::default().into()
            }
        }
    }
}

impl Default for TurnSettings {
    fn default() -> Self {
        RawTurnConfig::default().into()
    }
}

impl From<RawTurnConfig> for TurnSettings {
    fn from(value: RawTurnConfig) -> Self {
        Self {
            seconds_per_turn: value.seconds_per_turn.max(MIN_SECONDS_PER_TURN),
            moves_per_turn: value.moves_per_turn.max(1),
            autosave_interval_turns: value.autosave_interval_turns,
            progress_interval_turns: value.progress_interval_turns,
            save_path: value.save_path,
        }
    }
}

/// Accumulates scaled frame time and hands out whole simulated turns.
#[derive(Resource, Debug)]
pub struct TurnClock {
    time_scale: f32,
    turn_length: Duration,
    accumulated: Duration,
    pending_turns: u32,
    turn: u64,
}

impl TurnClock {
    /// Creates a clock with the provided turn length and time-scale multiplier.
    pub fn new(turn_length: Duration, time_scale: f32) -> Self {
        let min_length = Duration::from_secs_f32(MIN_SECONDS_PER_TURN);
        Self {
            time_scale: time_scale.max(MIN_TIME_SCALE),
            turn_length: turn_length.max(min_length),
            accumulated: Duration::ZERO,
            pending_turns: 0,
            turn: 0,
        }
    }

    /// Sets the time-scale multiplier (clamped to a small positive minimum).
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(MIN_TIME_SCALE);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Number of turns completed since the clock was created.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Turns produced by the last tick that have not been consumed yet.
    pub fn pending_turns(&self) -> u32 {
        self.pending_turns
    }

    /// Applies a real delta, converting whole turn lengths into pending turns.
    pub fn tick(&mut self, real_delta: Duration) {
        self.accumulated += real_delta.mul_f32(self.time_scale);
        while self.accumulated >= self.turn_length && self.pending_turns < MAX_TURNS_PER_FRAME {
            self.accumulated -= self.turn_length;
            self.pending_turns += 1;
        }
        if self.pending_turns >= MAX_TURNS_PER_FRAME {
            self.accumulated = Duration::ZERO;
        }
    }

    /// Consumes one pending turn, returning its number.
    pub fn take_turn(&mut self) -> Option<u64> {
        if self.pending_turns == 0 {
            return None;
        }
        self.pending_turns -= 1;
        self.turn += 1;
        Some(self.turn)
    }
}

/// Registers the turn clock and its settings.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    time_scale: f32,
}

impl CorePlugin {
    /// Creates a CorePlugin with the provided time-scale multiplier.
    pub const fn with_time_scale(time_scale: f32) -> Self {
        Self { time_scale }
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_time_scale(DEFAULT_TIME_SCALE)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        let settings = TurnSettings::load_or_default();
        let clock = TurnClock::new(
            Duration::from_secs_f32(settings.seconds_per_turn),
            self.time_scale,
        );

        app.insert_resource(settings)
            .insert_resource(clock)
            .add_systems(Startup, log_startup_turn_rate)
            .add_systems(Update, update_turn_clock);

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_turn_ticks.after(update_turn_clock));
        }
    }
}

pub fn update_turn_clock(mut clock: ResMut<TurnClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn log_startup_turn_rate(clock: Res<TurnClock>, settings: Res<TurnSettings>) {
    info!(
        "CorePlugin initialised: {:.3}s per turn, {} moves per turn, time scale {:.3}",
        settings.seconds_per_turn,
        settings.moves_per_turn,
        clock.time_scale()
    );
}

#[cfg(feature = "core_debug")]
fn log_turn_ticks(mut timer: ResMut<DebugTickTimer>, clock: Res<TurnClock>, time: Res<Time>) {
    if timer.timer.tick(time.delta()).just_finished() {
        info!(
            target: "core_debug",
            "Turn {} | pending: {} | scale: {:.3}",
            clock.turn(),
            clock.pending_turns(),
            clock.time_scale(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_converts_scaled_time_into_turns() {
        let mut clock = TurnClock::new(Duration::from_millis(100), 2.0);
        clock.tick(Duration::from_millis(260));

        // 520ms of scaled time covers five whole turns.
        assert_eq!(clock.pending_turns(), 5);
        assert_eq!(clock.take_turn(), Some(1));
        assert_eq!(clock.pending_turns(), 4);
        while clock.take_turn().is_some() {}
        assert_eq!(clock.turn(), 5);
        assert_eq!(clock.take_turn(), None);

        // The leftover 20ms plus 80ms completes one more turn.
        clock.tick(Duration::from_millis(40));
        assert_eq!(clock.pending_turns(), 1);
    }

    #[test]
    fn clock_caps_turns_after_a_stall() {
        let mut clock = TurnClock::new(Duration::from_millis(1), 1.0);
        clock.tick(Duration::from_secs(10));
        assert_eq!(clock.pending_turns(), MAX_TURNS_PER_FRAME);
    }

    #[test]
    fn clock_clamps_min_time_scale() {
        let mut clock = TurnClock::new(Duration::from_millis(100), 0.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);

        clock.set_time_scale(-5.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn settings_clamp_invalid_values() {
        let settings: TurnSettings = RawTurnConfig {
            seconds_per_turn: 0.0,
            moves_per_turn: -3,
            ..RawTurnConfig::default()
        }
        .into();
        assert!((settings.seconds_per_turn - MIN_SECONDS_PER_TURN).abs() < f32::EPSILON);
        assert_eq!(settings.moves_per_turn, 1);
    }
}
