//! Day-by-day Monte-Carlo simulation of a learner practising with the
//! scheduler, for tuning the configuration and for benchmarks.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use itertools::{Itertools, izip};
use log::debug;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use uuid::Uuid;

use crate::error::{DrowordError, InvalidConfigSnafu, Result};
use crate::proficiency::{Level, ProficiencyConfig, ProficiencyState};
use crate::queue::SessionQueue;
use crate::scheduler::{Rating, Scheduler};
use crate::word::{WordContent, WordId, WordRecord};

const RATINGS: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];
/// Simulated learners practise at the same hour every day.
const REVIEW_HOUR: i64 = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub deck_size: usize,
    pub learn_span: usize,
    /// New words added per day.
    pub learn_limit: usize,
    /// Cards shown per session; the rest stay due for the next day.
    pub review_limit: usize,
    /// Rating probabilities for a word's first review.
    pub first_rating_prob: [f64; 4],
    pub review_rating_prob: [f64; 4],
    /// A card failed this many times in one session is left for the next day.
    pub relearn_limit: u32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            deck_size: 1000,
            learn_span: 90,
            learn_limit: 10,
            review_limit: usize::MAX,
            first_rating_prob: [0.3, 0.15, 0.45, 0.1],
            review_rating_prob: [0.1, 0.15, 0.6, 0.15],
            relearn_limit: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub review_cnt_per_day: Vec<usize>,
    pub learn_cnt_per_day: Vec<usize>,
    pub lapse_cnt_per_day: Vec<usize>,
    /// Cards left due when the day's session ended.
    pub backlog_per_day: Vec<usize>,
    pub proficiency_per_day: Vec<f64>,
    pub level_per_day: Vec<Level>,
    pub proficiency: ProficiencyState,
    pub cards: Vec<WordRecord>,
}

impl SimulationResult {
    /// Number of days that ended at each level.
    pub fn days_per_level(&self) -> HashMap<Level, usize> {
        self.level_per_day.iter().copied().counts()
    }

    /// Share of reviews that were lapses over the whole run.
    pub fn lapse_rate(&self) -> f64 {
        let (reviews, lapses) = izip!(&self.review_cnt_per_day, &self.lapse_cnt_per_day)
            .fold((0, 0), |(r, l), (dr, dl)| (r + dr, l + dl));
        if reviews == 0 {
            0.0
        } else {
            lapses as f64 / reviews as f64
        }
    }

    pub fn mean_ease_factor(&self) -> Option<f64> {
        let reviewed = self
            .cards
            .iter()
            .filter(|card| card.scheduling.due_date.is_some())
            .map(|card| card.scheduling.ease_factor)
            .collect_vec();
        (!reviewed.is_empty()).then(|| reviewed.iter().sum::<f64>() / reviewed.len() as f64)
    }
}

fn rating_distribution(weights: [f64; 4], name: &str) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights).map_err(|e| DrowordError::InvalidConfig {
        reason: format!("{name}: {e}"),
    })
}

fn simulated_card(i: usize, epoch: DateTime<Utc>) -> WordRecord {
    let mut card = WordRecord::new(
        WordContent::new(format!("word-{i}"), "noun", "simulated", "simulated"),
        epoch,
    );
    card.id = WordId::from_uuid(Uuid::from_u128(i as u128 + 1));
    card
}

pub fn simulate(
    config: &SimulatorConfig,
    scheduler: &Scheduler,
    proficiency_config: &ProficiencyConfig,
    seed: Option<u64>,
) -> Result<SimulationResult> {
    if config.deck_size == 0 {
        return Err(DrowordError::InvalidDeckSize);
    }
    if config.learn_span == 0 || config.learn_limit == 0 || config.review_limit == 0 {
        return InvalidConfigSnafu {
            reason: "learn_span, learn_limit and review_limit must be positive",
        }
        .fail();
    }
    let first_rating_dist = rating_distribution(config.first_rating_prob, "first_rating_prob")?;
    let review_rating_dist = rating_distribution(config.review_rating_prob, "review_rating_prob")?;

    let mut rng = StdRng::seed_from_u64(seed.unwrap_or(42));
    let epoch = DateTime::<Utc>::UNIX_EPOCH;

    let mut review_cnt_per_day = vec![0; config.learn_span];
    let mut learn_cnt_per_day = vec![0; config.learn_span];
    let mut lapse_cnt_per_day = vec![0; config.learn_span];
    let mut backlog_per_day = vec![0; config.learn_span];
    let mut proficiency_per_day = vec![0.0; config.learn_span];
    let mut level_per_day = vec![Level::A1; config.learn_span];

    let mut cards: Vec<WordRecord> = Vec::with_capacity(config.deck_size);
    let mut index_of: HashMap<WordId, usize> = HashMap::with_capacity(config.deck_size);
    let mut proficiency = ProficiencyState::default();

    for day in 0..config.learn_span {
        let start_of_today = epoch + Duration::days(day as i64);
        let now = start_of_today + Duration::hours(REVIEW_HOUR);

        let introduce = config.learn_limit.min(config.deck_size - cards.len());
        for _ in 0..introduce {
            let card = simulated_card(cards.len(), now);
            index_of.insert(card.id, cards.len());
            cards.push(card);
        }
        learn_cnt_per_day[day] = introduce;

        let due = SessionQueue::build(&cards, start_of_today);
        let shown = due.items().iter().copied().take(config.review_limit).collect_vec();
        backlog_per_day[day] = due.len() - shown.len();
        let mut queue = SessionQueue::from_ids(shown);
        let mut relearns: HashMap<WordId, u32> = HashMap::new();

        while let Some(id) = queue.current() {
            let card = &mut cards[index_of[&id]];
            let first_review = card.scheduling.due_date.is_none();
            let rating = if first_review {
                RATINGS[first_rating_dist.sample(&mut rng)]
            } else {
                RATINGS[review_rating_dist.sample(&mut rng)]
            };

            card.scheduling = scheduler.next_state(&card.scheduling, rating, now);
            proficiency = proficiency.update(rating, proficiency_config.smoothing);
            review_cnt_per_day[day] += 1;

            if rating.is_lapse() {
                lapse_cnt_per_day[day] += 1;
                let failures = relearns.entry(id).or_default();
                *failures += 1;
                if *failures < config.relearn_limit {
                    queue.reinsert_current(scheduler.config().reinsert_offset);
                    continue;
                }
            }
            queue.advance();
        }

        proficiency_per_day[day] = proficiency.score();
        level_per_day[day] = proficiency.level();
        debug!(
            "day {day}: {} reviews, {} lapses, score {:.3}",
            review_cnt_per_day[day],
            lapse_cnt_per_day[day],
            proficiency.score()
        );
    }

    Ok(SimulationResult {
        review_cnt_per_day,
        learn_cnt_per_day,
        lapse_cnt_per_day,
        backlog_per_day,
        proficiency_per_day,
        level_per_day,
        proficiency,
        cards,
    })
}

/// Runs one simulation per seed in parallel.
pub fn simulate_many(
    config: &SimulatorConfig,
    scheduler: &Scheduler,
    proficiency_config: &ProficiencyConfig,
    seeds: &[u64],
) -> Result<Vec<SimulationResult>> {
    seeds
        .par_iter()
        .map(|&seed| simulate(config, scheduler, proficiency_config, Some(seed)))
        .collect()
}
