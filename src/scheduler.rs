use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{InvalidConfigSnafu, Result};
use crate::word::{DEFAULT_EASE_FACTOR, SchedulingState};

pub const MINIMUM_EASE_FACTOR: f64 = 1.3;

/// The answer the learner gives for the card on screen.
///
/// The labels are part of the persisted vocabulary and must not change.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// SM-2 recall quality driving the ease factor.
    pub const fn quality(self) -> u8 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 3,
            Rating::Good => 4,
            Rating::Easy => 5,
        }
    }

    /// Input to the proficiency moving average. Independent of [`Rating::quality`].
    pub const fn proficiency_quality(self) -> f64 {
        match self {
            Rating::Again => 0.0,
            Rating::Hard => 0.35,
            Rating::Good => 0.7,
            Rating::Easy => 1.0,
        }
    }

    /// Only `Again` falls below quality 3; `Hard` counts as a slow success.
    pub const fn is_lapse(self) -> bool {
        self.quality() < 3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub initial_ease_factor: f64,
    pub minimum_ease_factor: f64,
    pub relearn_delay_minutes: u32,
    pub first_interval_days: u32,
    pub second_interval_days: u32,
    pub maximum_interval_days: u32,
    /// How many places ahead a lapsed card is put back into the session.
    pub reinsert_offset: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease_factor: DEFAULT_EASE_FACTOR,
            minimum_ease_factor: MINIMUM_EASE_FACTOR,
            relearn_delay_minutes: 10,
            first_interval_days: 1,
            second_interval_days: 6,
            maximum_interval_days: 36500,
            reinsert_offset: 2,
        }
    }
}

impl SchedulerConfig {
    fn validate(&self) -> Result<()> {
        if !(self.minimum_ease_factor.is_finite() && self.minimum_ease_factor > 0.0) {
            return InvalidConfigSnafu {
                reason: "minimum_ease_factor must be a positive number",
            }
            .fail();
        }
        if !(self.initial_ease_factor.is_finite()
            && self.initial_ease_factor >= self.minimum_ease_factor)
        {
            return InvalidConfigSnafu {
                reason: "initial_ease_factor must not be below minimum_ease_factor",
            }
            .fail();
        }
        if self.first_interval_days == 0 || self.second_interval_days == 0 {
            return InvalidConfigSnafu {
                reason: "graduating intervals must be at least one day",
            }
            .fail();
        }
        if self.maximum_interval_days < self.second_interval_days.max(self.first_interval_days) {
            return InvalidConfigSnafu {
                reason: "maximum_interval_days is shorter than the graduating intervals",
            }
            .fail();
        }
        Ok(())
    }
}

/// Scheduling state after one hypothetical answer.
#[derive(Debug, Clone, PartialEq)]
pub struct NextStates {
    pub again: SchedulingState,
    pub hard: SchedulingState,
    pub good: SchedulingState,
    pub easy: SchedulingState,
}

impl NextStates {
    pub fn get(&self, rating: Rating) -> &SchedulingState {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Scheduling fields for a word that has never been reviewed.
    pub fn initial_state(&self) -> SchedulingState {
        SchedulingState {
            ease_factor: self.config.initial_ease_factor,
            ..Default::default()
        }
    }

    pub fn next_ease_factor(&self, ease_factor: f64, rating: Rating) -> f64 {
        let q = f64::from(rating.quality());
        let updated = ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
        // `f64::max` also maps a NaN ease factor back onto the floor.
        updated.max(self.config.minimum_ease_factor)
    }

    /// Applies one review to `state`. Total over every input: counters saturate
    /// and due dates past the calendar's end clamp to its last instant.
    pub fn next_state(
        &self,
        state: &SchedulingState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> SchedulingState {
        let ease_factor = self.next_ease_factor(state.ease_factor, rating);

        let next = if rating.is_lapse() {
            SchedulingState {
                ease_factor,
                interval_days: 0,
                repetitions: 0,
                lapses: state.lapses.saturating_add(1),
                due_date: Some(add_or_max(
                    now,
                    Duration::minutes(i64::from(self.config.relearn_delay_minutes)),
                )),
            }
        } else {
            let repetitions = state.repetitions.saturating_add(1);
            let interval_days = match repetitions {
                1 => self.config.first_interval_days,
                2 => self.config.second_interval_days,
                _ => self.grow_interval(state.interval_days, ease_factor),
            };
            SchedulingState {
                ease_factor,
                interval_days,
                repetitions,
                lapses: state.lapses,
                due_date: Some(add_or_max(now, Duration::days(i64::from(interval_days)))),
            }
        };

        debug!(
            "{rating}: ef {:.2} -> {:.2}, ivl {} -> {}, reps {} -> {}",
            state.ease_factor,
            next.ease_factor,
            state.interval_days,
            next.interval_days,
            state.repetitions,
            next.repetitions
        );
        next
    }

    pub fn next_states(&self, state: &SchedulingState, now: DateTime<Utc>) -> NextStates {
        NextStates {
            again: self.next_state(state, Rating::Again, now),
            hard: self.next_state(state, Rating::Hard, now),
            good: self.next_state(state, Rating::Good, now),
            easy: self.next_state(state, Rating::Easy, now),
        }
    }

    fn grow_interval(&self, interval_days: u32, ease_factor: f64) -> u32 {
        let grown = (f64::from(interval_days) * ease_factor).round();
        // `as` saturates for floats, the clamp keeps the cap.
        (grown as u32).clamp(1, self.config.maximum_interval_days)
    }
}

fn add_or_max(now: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    now.checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn state(ease_factor: f64, interval_days: u32, repetitions: u32, lapses: u32) -> SchedulingState {
        SchedulingState {
            ease_factor,
            interval_days,
            repetitions,
            lapses,
            due_date: None,
        }
    }

    #[test]
    fn quality_tables() {
        let qualities = Rating::iter().map(Rating::quality).collect::<Vec<_>>();
        assert_eq!(qualities, [1, 3, 4, 5]);
        let proficiency = Rating::iter()
            .map(Rating::proficiency_quality)
            .collect::<Vec<_>>();
        assert_eq!(proficiency, [0.0, 0.35, 0.7, 1.0]);
        let lapses = Rating::iter().filter(|r| r.is_lapse()).collect::<Vec<_>>();
        assert_eq!(lapses, [Rating::Again]);
    }

    #[test]
    fn rating_labels() {
        for rating in Rating::iter() {
            let label = rating.to_string();
            assert_eq!(Rating::from_str(&label).unwrap(), rating);
            assert_eq!(serde_json::to_string(&rating).unwrap(), format!("\"{label}\""));
        }
        assert_eq!(Rating::Again.to_string(), "Again");
        assert!(Rating::from_str("again!").is_err());
    }

    #[test]
    fn ease_factor_deltas() {
        let scheduler = Scheduler::default();
        let ef = |r| scheduler.next_ease_factor(2.5, r);
        assert!((ef(Rating::Again) - 1.96).abs() < 1e-9);
        assert!((ef(Rating::Hard) - 2.36).abs() < 1e-9);
        assert!((ef(Rating::Good) - 2.5).abs() < 1e-9);
        assert!((ef(Rating::Easy) - 2.6).abs() < 1e-9);
    }

    #[test]
    fn ease_factor_never_below_floor() {
        let scheduler = Scheduler::default();
        let mut current = state(2.5, 40, 6, 0);
        for _ in 0..20 {
            current = scheduler.next_state(&current, Rating::Again, now());
            assert!(current.ease_factor >= MINIMUM_EASE_FACTOR);
        }
        assert_eq!(current.ease_factor, MINIMUM_EASE_FACTOR);
        assert_eq!(current.lapses, 20);

        for rating in Rating::iter() {
            let next = scheduler.next_state(&state(1.3, 3, 3, 0), rating, now());
            assert!(next.ease_factor >= MINIMUM_EASE_FACTOR);
        }
    }

    #[test]
    fn again_resets_and_relearns_in_ten_minutes() {
        let scheduler = Scheduler::default();
        let next = scheduler.next_state(&state(2.5, 15, 3, 2), Rating::Again, now());
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.interval_days, 0);
        assert_eq!(next.lapses, 3);
        assert_eq!(next.due_date, Some(now() + Duration::minutes(10)));
    }

    #[test]
    fn graduating_intervals() {
        let scheduler = Scheduler::default();
        let first = scheduler.next_state(&state(2.5, 0, 0, 0), Rating::Good, now());
        assert_eq!((first.repetitions, first.interval_days), (1, 1));
        assert_eq!(first.due_date, Some(now() + Duration::days(1)));

        let second = scheduler.next_state(&first, Rating::Good, now());
        assert_eq!((second.repetitions, second.interval_days), (2, 6));
        assert_eq!(second.due_date, Some(now() + Duration::days(6)));

        let third = scheduler.next_state(&second, Rating::Good, now());
        assert_eq!((third.repetitions, third.interval_days), (3, 15));
    }

    #[test]
    fn hard_is_a_slow_success() {
        let scheduler = Scheduler::default();
        let next = scheduler.next_state(&state(2.5, 6, 2, 1), Rating::Hard, now());
        assert_eq!(next.repetitions, 3);
        assert_eq!(next.lapses, 1);
        // 6 * 2.36 = 14.16
        assert_eq!(next.interval_days, 14);
    }

    #[test]
    fn interval_floor_and_cap() {
        let scheduler = Scheduler::default();
        let next = scheduler.next_state(&state(1.3, 0, 5, 0), Rating::Hard, now());
        assert_eq!(next.interval_days, 1);

        let next = scheduler.next_state(&state(2.5, u32::MAX, 50, 0), Rating::Easy, now());
        assert_eq!(next.interval_days, 36500);
        assert!(next.due_date.is_some());
    }

    #[test]
    fn saturating_counters() {
        let scheduler = Scheduler::default();
        let next = scheduler.next_state(&state(2.5, 10, u32::MAX, u32::MAX), Rating::Again, now());
        assert_eq!(next.lapses, u32::MAX);
        let next = scheduler.next_state(&state(2.5, 10, u32::MAX, 0), Rating::Good, now());
        assert_eq!(next.repetitions, u32::MAX);
    }

    #[test]
    fn next_states_match_next_state() {
        let scheduler = Scheduler::default();
        let current = state(2.2, 6, 2, 1);
        let preview = scheduler.next_states(&current, now());
        for rating in Rating::iter() {
            assert_eq!(
                preview.get(rating),
                &scheduler.next_state(&current, rating, now())
            );
        }
        assert_eq!(preview.again.interval_days, 0);
        assert!(preview.easy.interval_days > preview.good.interval_days);
        assert!(preview.good.interval_days > preview.hard.interval_days);
    }

    #[test]
    fn config_validation() {
        assert!(Scheduler::new(SchedulerConfig::default()).is_ok());
        let bad = [
            SchedulerConfig {
                minimum_ease_factor: 0.0,
                ..Default::default()
            },
            SchedulerConfig {
                initial_ease_factor: 1.0,
                ..Default::default()
            },
            SchedulerConfig {
                first_interval_days: 0,
                ..Default::default()
            },
            SchedulerConfig {
                maximum_interval_days: 3,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(Scheduler::new(config).is_err());
        }
    }

    #[test]
    fn initial_state_uses_configured_ease() -> Result<()> {
        let scheduler = Scheduler::new(SchedulerConfig {
            initial_ease_factor: 2.0,
            ..Default::default()
        })?;
        assert_eq!(scheduler.initial_state().ease_factor, 2.0);
        assert_eq!(scheduler.initial_state().due_date, None);
        Ok(())
    }
}
