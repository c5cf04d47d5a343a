use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::scheduler::Rating;

pub const DEFAULT_SMOOTHING: f64 = 0.06;

/// CEFR-like skill band. Labels are persisted and shown as badges.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Level {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    /// Half-open thresholds, no hysteresis. NaN counts as no progress.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s.is_nan() || s < 0.15 => Level::A1,
            s if s < 0.35 => Level::A2,
            s if s < 0.55 => Level::B1,
            s if s < 0.75 => Level::B2,
            s if s < 0.90 => Level::C1,
            _ => Level::C2,
        }
    }

    /// 1 for A1 through 6 for C2.
    pub const fn ordinal(self) -> u8 {
        self as u8 + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProficiencyConfig {
    /// EMA weight of the newest rating.
    pub smoothing: f64,
}

impl Default for ProficiencyConfig {
    fn default() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "StoredProficiency")]
pub struct ProficiencyState {
    #[serde(rename = "learningScore")]
    score: f64,
    #[serde(rename = "learningLevel")]
    level: Level,
}

/// On-disk shape. The level is re-derived on load so that a stale or
/// hand-edited label cannot disagree with the score.
#[derive(Deserialize)]
struct StoredProficiency {
    #[serde(rename = "learningScore", default)]
    score: f64,
}

impl From<StoredProficiency> for ProficiencyState {
    fn from(stored: StoredProficiency) -> Self {
        Self::with_score(stored.score)
    }
}

impl ProficiencyState {
    /// Clamps `score` into `[0, 1]` and derives the matching level.
    pub fn with_score(score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self {
            score,
            level: Level::from_score(score),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn update(&self, rating: Rating, smoothing: f64) -> Self {
        let quality = rating.proficiency_quality();
        Self::with_score(self.score * (1.0 - smoothing) + quality * smoothing)
    }
}
