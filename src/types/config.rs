//! Game configuration
//!
//! Defaults come from the crate constants; a JSON file and CLI flags can
//! override individual fields.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::types::{GameError, Result, StreakPolicy};
use crate::{COUNTDOWN_START_SECS, FRAME_INTERVAL_MS, MAX_GESTURE_SCORE, MIN_GESTURE_SCORE, TICK_INTERVAL_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Countdown start value in ticks
    pub countdown_secs: u32,
    /// Milliseconds between countdown ticks
    pub tick_interval_ms: u64,
    /// Milliseconds between capture-feed frames
    pub frame_interval_ms: u64,
    /// Classifier cutoff on the 0-10 score scale
    pub min_gesture_score: f64,
    /// What the streak counter counts
    pub streak_policy: StreakPolicy,
    /// Seed for the opponent RNG; entropy when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            countdown_secs: COUNTDOWN_START_SECS,
            tick_interval_ms: TICK_INTERVAL_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            min_gesture_score: MIN_GESTURE_SCORE,
            streak_policy: StreakPolicy::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.countdown_secs == 0 {
            return Err(GameError::InvalidConfig("countdown_secs must be at least 1".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(GameError::InvalidConfig("tick_interval_ms must be at least 1".into()));
        }
        if !(0.0..=MAX_GESTURE_SCORE).contains(&self.min_gesture_score) {
            return Err(GameError::InvalidConfig(format!(
                "min_gesture_score must be within 0-{}, got {}",
                MAX_GESTURE_SCORE, self.min_gesture_score
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
