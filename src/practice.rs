use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use snafu::OptionExt;

use crate::error::{Result, SessionCompleteSnafu, WordNotFoundSnafu};
use crate::proficiency::{ProficiencyConfig, ProficiencyState};
use crate::queue::{SessionQueue, SessionState, start_of_day};
use crate::scheduler::{Rating, Scheduler};
use crate::store::{ProfileStore, WordStore};
use crate::word::{SchedulingState, WordId, WordRecord};

/// What one rating did.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: WordId,
    pub rating: Rating,
    pub previous: SchedulingState,
    pub updated: SchedulingState,
    pub proficiency: ProficiencyState,
    /// Queue index the card was moved to, for lapses.
    pub reinserted_at: Option<usize>,
    pub state: SessionState,
}

/// One pass over the due words.
///
/// Holds the queue and the learner's proficiency; the scheduler and the store
/// are borrowed from the caller. Writes to the store are best effort: a failed
/// write is logged and the session carries on with its in-memory state.
pub struct PracticeSession<'a, S> {
    scheduler: &'a Scheduler,
    proficiency_config: ProficiencyConfig,
    store: &'a mut S,
    queue: SessionQueue,
    proficiency: ProficiencyState,
    /// Latest scheduling per reviewed word; wins over the store.
    reviewed: HashMap<WordId, SchedulingState>,
}

impl<'a, S> PracticeSession<'a, S>
where
    S: WordStore + ProfileStore,
{
    /// Builds the queue from every word due by the start of `now`'s local day.
    pub fn start<Tz: TimeZone>(
        scheduler: &'a Scheduler,
        proficiency_config: ProficiencyConfig,
        store: &'a mut S,
        now: &DateTime<Tz>,
    ) -> Result<Self> {
        let start_of_today = start_of_day(now);
        let words = store.words();
        let queue = SessionQueue::build(&words, start_of_today);
        let proficiency = store.load_profile()?;
        info!(
            "practice session: {} of {} words due, level {}",
            queue.len(),
            words.len(),
            proficiency.level()
        );
        Ok(Self {
            scheduler,
            proficiency_config,
            store,
            queue,
            proficiency,
            reviewed: HashMap::new(),
        })
    }

    pub fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    pub fn state(&self) -> SessionState {
        self.queue.state()
    }

    pub fn remaining(&self) -> usize {
        self.queue.remaining()
    }

    pub fn proficiency(&self) -> ProficiencyState {
        self.proficiency
    }

    /// The word on screen, `None` once the session is complete.
    pub fn current(&self) -> Option<WordRecord> {
        self.queue.current().and_then(|id| self.word(id))
    }

    fn word(&self, id: WordId) -> Option<WordRecord> {
        let mut word = self.store.get(id)?;
        if let Some(scheduling) = self.reviewed.get(&id) {
            word.scheduling = scheduling.clone();
        }
        Some(word)
    }

    pub fn rate(&mut self, rating: Rating, now: DateTime<Utc>) -> Result<Review> {
        let id = self.queue.current().context(SessionCompleteSnafu)?;
        let word = self.word(id).context(WordNotFoundSnafu { id })?;

        let previous = word.scheduling;
        let updated = self.scheduler.next_state(&previous, rating, now);
        self.reviewed.insert(id, updated.clone());
        if let Err(e) = self.store.update_scheduling(id, &updated) {
            warn!("could not persist scheduling for {id}: {e}");
        }

        self.proficiency = self
            .proficiency
            .update(rating, self.proficiency_config.smoothing);
        if let Err(e) = self.store.save_profile(&self.proficiency) {
            warn!("could not persist proficiency: {e}");
        }

        let reinserted_at = if rating.is_lapse() {
            self.queue
                .reinsert_current(self.scheduler.config().reinsert_offset)
        } else {
            self.queue.advance();
            None
        };
        let state = self.queue.state();
        debug!(
            "rated {} {rating}, {} left, score {:.3}",
            word.content.word,
            self.queue.remaining(),
            self.proficiency.score()
        );
        if state == SessionState::Complete {
            info!("practice session complete");
        }

        Ok(Review {
            id,
            rating,
            previous,
            updated,
            proficiency: self.proficiency,
            reinserted_at,
            state,
        })
    }
}
