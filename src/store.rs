//! Storage collaborators. The scheduling core only reads word lists and writes
//! scheduling fields and the learner profile through these traits.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};

use crate::error::{IoSnafu, JsonSnafu, Result, WordNotFoundSnafu};
use crate::proficiency::ProficiencyState;
use crate::word::{SchedulingState, WordId, WordRecord};

pub trait WordStore {
    /// All words, in the order they were added.
    fn words(&self) -> Vec<WordRecord>;

    fn get(&self, id: WordId) -> Option<WordRecord>;

    fn add(&mut self, word: WordRecord) -> Result<()>;

    /// Returns whether a word was removed.
    fn remove(&mut self, id: WordId) -> Result<bool>;

    fn clear(&mut self) -> Result<()>;

    /// Count of every word ever added; removing words does not lower it.
    fn total_words_added(&self) -> u64;

    fn update_scheduling(&mut self, id: WordId, scheduling: &SchedulingState) -> Result<()>;
}

pub trait ProfileStore {
    fn load_profile(&self) -> Result<ProficiencyState>;

    fn save_profile(&mut self, profile: &ProficiencyState) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    words: Vec<WordRecord>,
    #[serde(default)]
    total_words_added: u64,
    #[serde(default)]
    profile: ProficiencyState,
}

impl Snapshot {
    fn position(&self, id: WordId) -> Option<usize> {
        self.words.iter().position(|w| w.id == id)
    }

    fn add(&mut self, word: WordRecord) {
        self.words.push(word);
        self.total_words_added += 1;
    }

    fn remove(&mut self, id: WordId) -> bool {
        let before = self.words.len();
        self.words.retain(|w| w.id != id);
        self.words.len() != before
    }

    fn update_scheduling(&mut self, id: WordId, scheduling: &SchedulingState) -> Result<()> {
        let idx = self.position(id).context(WordNotFoundSnafu { id })?;
        self.words[idx].scheduling = scheduling.clone();
        Ok(())
    }
}

/// Keeps everything in memory. Useful for tests and for callers that
/// persist elsewhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(words: impl IntoIterator<Item = WordRecord>) -> Self {
        let mut store = Self::new();
        for word in words {
            store.snapshot.add(word);
        }
        store
    }
}

impl WordStore for MemoryStore {
    fn words(&self) -> Vec<WordRecord> {
        self.snapshot.words.clone()
    }

    fn get(&self, id: WordId) -> Option<WordRecord> {
        self.snapshot.words.iter().find(|w| w.id == id).cloned()
    }

    fn add(&mut self, word: WordRecord) -> Result<()> {
        self.snapshot.add(word);
        Ok(())
    }

    fn remove(&mut self, id: WordId) -> Result<bool> {
        Ok(self.snapshot.remove(id))
    }

    fn clear(&mut self) -> Result<()> {
        self.snapshot.words.clear();
        Ok(())
    }

    fn total_words_added(&self) -> u64 {
        self.snapshot.total_words_added
    }

    fn update_scheduling(&mut self, id: WordId, scheduling: &SchedulingState) -> Result<()> {
        self.snapshot.update_scheduling(id, scheduling)
    }
}

impl ProfileStore for MemoryStore {
    fn load_profile(&self) -> Result<ProficiencyState> {
        Ok(self.snapshot.profile)
    }

    fn save_profile(&mut self, profile: &ProficiencyState) -> Result<()> {
        self.snapshot.profile = *profile;
        Ok(())
    }
}

/// A single JSON document holding words, the added-words counter and the
/// learner profile. Every mutation rewrites the whole file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    snapshot: Snapshot,
}

impl JsonStore {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).context(JsonSnafu)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e).context(IoSnafu),
        };
        info!(
            "opened {} with {} words",
            path.display(),
            snapshot.words.len()
        );
        Ok(Self { path, snapshot })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `next` and makes it the current state. On failure the
    /// in-memory state is left as it was.
    fn commit(&mut self, next: Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(IoSnafu)?;
        }
        let json = serde_json::to_vec_pretty(&next).context(JsonSnafu)?;
        // replace atomically, readers never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).context(IoSnafu)?;
        fs::rename(&tmp, &self.path).context(IoSnafu)?;
        debug!("saved {}", self.path.display());
        self.snapshot = next;
        Ok(())
    }
}

impl WordStore for JsonStore {
    fn words(&self) -> Vec<WordRecord> {
        self.snapshot.words.clone()
    }

    fn get(&self, id: WordId) -> Option<WordRecord> {
        self.snapshot.words.iter().find(|w| w.id == id).cloned()
    }

    fn add(&mut self, word: WordRecord) -> Result<()> {
        let mut next = self.snapshot.clone();
        next.add(word);
        self.commit(next)
    }

    fn remove(&mut self, id: WordId) -> Result<bool> {
        let mut next = self.snapshot.clone();
        if !next.remove(id) {
            return Ok(false);
        }
        self.commit(next)?;
        Ok(true)
    }

    fn clear(&mut self) -> Result<()> {
        let mut next = self.snapshot.clone();
        next.words.clear();
        self.commit(next)
    }

    fn total_words_added(&self) -> u64 {
        self.snapshot.total_words_added
    }

    fn update_scheduling(&mut self, id: WordId, scheduling: &SchedulingState) -> Result<()> {
        let mut next = self.snapshot.clone();
        next.update_scheduling(id, scheduling)?;
        self.commit(next)
    }
}

impl ProfileStore for JsonStore {
    fn load_profile(&self) -> Result<ProficiencyState> {
        Ok(self.snapshot.profile)
    }

    fn save_profile(&mut self, profile: &ProficiencyState) -> Result<()> {
        let next = Snapshot {
            profile: *profile,
            ..self.snapshot.clone()
        };
        self.commit(next)
    }
}
