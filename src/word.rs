use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Stable identity of a word, valid for the word's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(Uuid);

impl WordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What the learner typed in or accepted. The scheduler never looks at it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordContent {
    pub word: String,
    #[serde(rename = "type")]
    pub part_of_speech: String,
    pub translation: Option<String>,
    pub example: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub breakdown: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    pub from_language: String,
    pub to_language: String,
}

impl WordContent {
    pub fn new(
        word: impl Into<String>,
        part_of_speech: impl Into<String>,
        from_language: impl Into<String>,
        to_language: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            part_of_speech: part_of_speech.into(),
            from_language: from_language.into(),
            to_language: to_language.into(),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// The part of a word that only the scheduler writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// Never below [`crate::SchedulerConfig::minimum_ease_factor`].
    pub ease_factor: f64,
    pub interval_days: u32,
    /// Consecutive successful reviews, zeroed by a lapse.
    pub repetitions: u32,
    /// Total failures, never reset.
    pub lapses: u32,
    /// `None` means never scheduled, i.e. available right away.
    pub due_date: Option<DateTime<Utc>>,
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            lapses: 0,
            due_date: None,
        }
    }
}

impl SchedulingState {
    pub fn is_due(&self, start_of_today: DateTime<Utc>) -> bool {
        self.due_date.is_none_or(|due| due <= start_of_today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: WordId,
    #[serde(flatten)]
    pub content: WordContent,
    pub date_added: DateTime<Utc>,
    #[serde(flatten)]
    pub scheduling: SchedulingState,
}

impl WordRecord {
    pub fn new(content: WordContent, now: DateTime<Utc>) -> Self {
        Self {
            id: WordId::new(),
            content,
            date_added: now,
            scheduling: SchedulingState::default(),
        }
    }

    pub fn is_due(&self, start_of_today: DateTime<Utc>) -> bool {
        self.scheduling.is_due(start_of_today)
    }
}
