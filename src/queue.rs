use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::word::{WordId, WordRecord};

/// The first instant of `now`'s local calendar day, in UTC.
///
/// When midnight does not exist locally (a DST gap), the first hour that does is used.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let date = now.date_naive();
    (0..24)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active { index: usize },
    Complete,
}

/// The ordered set of words under review in one practice session.
///
/// Only ids are held; the words themselves stay with the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionQueue {
    items: Vec<WordId>,
    index: usize,
}

impl SessionQueue {
    /// Every word that is due by `start_of_today`, in the order given.
    pub fn build<'a, I>(words: I, start_of_today: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a WordRecord>,
    {
        Self::from_ids(
            words
                .into_iter()
                .filter(|word| word.is_due(start_of_today))
                .map(|word| word.id)
                .collect(),
        )
    }

    pub fn from_ids(items: Vec<WordId>) -> Self {
        Self { items, index: 0 }
    }

    pub fn items(&self) -> &[WordId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    /// Cards left to show, the current one included.
    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.index)
    }

    pub fn current(&self) -> Option<WordId> {
        self.items.get(self.index).copied()
    }

    pub fn state(&self) -> SessionState {
        if self.index < self.items.len() {
            SessionState::Active { index: self.index }
        } else {
            SessionState::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == SessionState::Complete
    }

    /// Moves the current card `offset` places ahead and returns its new index.
    ///
    /// The index does not move, so the card after the failed one becomes current.
    pub fn reinsert_current(&mut self, offset: usize) -> Option<usize> {
        if self.index >= self.items.len() {
            return None;
        }
        let card = self.items.remove(self.index);
        let target = self.index.saturating_add(offset).min(self.items.len());
        self.items.insert(target, card);
        Some(target)
    }

    pub fn advance(&mut self) -> SessionState {
        if self.index < self.items.len() {
            self.index += 1;
        }
        self.state()
    }
}
