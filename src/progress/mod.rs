//! Authoritative game progress and the only code allowed to mutate it.
//!
//! [`ProgressTracker`] wraps a [`GameProgress`] record and a [`ProgressStore`].
//! Every mutator writes the record back to storage; storage failures are
//! logged and swallowed so play continues on the in-memory state.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, warn};

use crate::persistence::{ProgressStore, StorageError};

/// Number of energy keys needed to open the basement quiz.
pub const MAX_KEYS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    #[serde(rename = "opening")]
    OpeningScene,
    #[serde(rename = "menu")]
    MainMenu,
    #[serde(rename = "level1")]
    Level1,
    #[serde(rename = "level2")]
    Level2,
    #[serde(rename = "level3")]
    Level3,
    #[serde(rename = "level4")]
    Level4,
    #[serde(rename = "ending")]
    EndingScene,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::OpeningScene => "opening",
            GameState::MainMenu => "menu",
            GameState::Level1 => "level1",
            GameState::Level2 => "level2",
            GameState::Level3 => "level3",
            GameState::Level4 => "level4",
            GameState::EndingScene => "ending",
        }
    }

    pub fn is_level(self) -> bool {
        matches!(
            self,
            GameState::Level1 | GameState::Level2 | GameState::Level3 | GameState::Level4
        )
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted progress record.
///
/// Field names and defaults match the stored JSON. A record missing
/// `gameState` resumes at the main menu, while a fresh process starts at the
/// opening scene (see the `Default` impl).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    #[serde(default = "default_saved_state")]
    pub game_state: GameState,
    #[serde(default, deserialize_with = "lenient_keys")]
    pub keys_collected: u8,
    #[serde(default)]
    pub level1_cable_solved: bool,
    #[serde(default, rename = "level1TVSolved")]
    pub level1_tv_solved: bool,
    #[serde(default = "default_efficiency")]
    pub level2_efficiency: f64,
    #[serde(default)]
    pub level3_bill: f64,
    #[serde(default)]
    pub quiz_progress: usize,
}

fn default_saved_state() -> GameState {
    GameState::MainMenu
}
fn default_efficiency() -> f64 {
    100.0
}

/// Non-finite values cannot round-trip through JSON, so they fall back to the default.
fn clamp_efficiency(efficiency: f64) -> f64 {
    if efficiency.is_finite() {
        efficiency.clamp(0.0, 100.0)
    } else {
        default_efficiency()
    }
}

fn clamp_bill(bill: f64) -> f64 {
    if bill.is_finite() { bill.max(0.0) } else { 0.0 }
}

/// Accept any JSON number for the key count and pull it into `0..=MAX_KEYS`.
fn lenient_keys<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.clamp(0.0, f64::from(MAX_KEYS)) as u8)
}

impl Default for GameProgress {
    fn default() -> Self {
        GameProgress {
            game_state: GameState::OpeningScene,
            keys_collected: 0,
            level1_cable_solved: false,
            level1_tv_solved: false,
            level2_efficiency: default_efficiency(),
            level3_bill: 0.0,
            quiz_progress: 0,
        }
    }
}

impl GameProgress {
    /// Parse a stored record, then pull out-of-range values back into range.
    pub fn from_json(record: &str) -> Result<Self, StorageError> {
        let progress: GameProgress =
            serde_json::from_str(record).map_err(|e| StorageError::Deserialize(e.to_string()))?;
        Ok(progress.sanitized())
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialize(e.to_string()))
    }

    fn sanitized(mut self) -> Self {
        self.keys_collected = self.keys_collected.min(MAX_KEYS);
        self.level2_efficiency = clamp_efficiency(self.level2_efficiency);
        self.level3_bill = clamp_bill(self.level3_bill);
        self
    }
}

/// Owns the progress record and writes it through to storage after every change.
pub struct ProgressTracker {
    progress: GameProgress,
    store: Box<dyn ProgressStore>,
}

impl ProgressTracker {
    pub fn new(store: Box<dyn ProgressStore>) -> Self {
        ProgressTracker {
            progress: GameProgress::default(),
            store,
        }
    }

    pub fn progress(&self) -> &GameProgress {
        &self.progress
    }

    pub fn state(&self) -> GameState {
        self.progress.game_state
    }

    pub fn keys(&self) -> u8 {
        self.progress.keys_collected
    }

    pub fn change_state(&mut self, to: GameState) {
        info!(from = %self.progress.game_state, to = %to, "State transition");
        self.progress.game_state = to;
        self.save();
    }

    /// Collect one key. The count saturates at [`MAX_KEYS`]. Returns the new total.
    pub fn add_key(&mut self) -> u8 {
        if self.progress.keys_collected >= MAX_KEYS {
            debug!(total = self.progress.keys_collected, "Key count already at maximum");
        } else {
            self.progress.keys_collected += 1;
            info!(total = self.progress.keys_collected, max = MAX_KEYS, "Energy key collected");
        }
        self.save();
        self.progress.keys_collected
    }

    pub fn set_level1_cable_solved(&mut self, solved: bool) {
        self.progress.level1_cable_solved = solved;
        self.save();
    }

    pub fn set_level1_tv_solved(&mut self, solved: bool) {
        self.progress.level1_tv_solved = solved;
        self.save();
    }

    pub fn set_level2_efficiency(&mut self, efficiency: f64) {
        self.progress.level2_efficiency = clamp_efficiency(efficiency);
        self.save();
    }

    pub fn set_level3_bill(&mut self, bill: f64) {
        self.progress.level3_bill = clamp_bill(bill);
        self.save();
    }

    pub fn set_quiz_progress(&mut self, progress: usize) {
        self.progress.quiz_progress = progress;
        self.save();
    }

    /// Drop all progress and erase the stored record.
    pub fn reset(&mut self) {
        info!("Resetting all progress");
        self.progress = GameProgress::default();
        if let Err(e) = self.store.clear() {
            error!(error = %e, "Failed to clear saved progress");
        }
    }

    /// Replace every field with the stored record.
    ///
    /// Returns `true` if a record was applied. A missing, unreadable or
    /// malformed record leaves the current values untouched.
    pub fn load(&mut self) -> bool {
        let record = match self.store.read() {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No saved progress found");
                return false;
            }
            Err(e) => {
                error!(error = %e, "Failed to read saved progress");
                return false;
            }
        };

        match GameProgress::from_json(&record) {
            Ok(progress) => {
                info!(
                    state = %progress.game_state,
                    keys = progress.keys_collected,
                    "Loaded saved progress"
                );
                self.progress = progress;
                true
            }
            Err(e) => {
                warn!(error = %e, "Saved progress is malformed, keeping current state");
                false
            }
        }
    }

    pub fn save(&mut self) {
        let record = match self.progress.to_json() {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "Failed to encode progress");
                return;
            }
        };
        match self.store.write(&record) {
            Ok(()) => debug!("Progress saved"),
            Err(e) => error!(error = %e, "Failed to save progress"),
        }
    }
}
