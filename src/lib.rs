mod adaptation;
mod config;
mod error;
mod practice;
mod proficiency;
mod queue;
mod scheduler;
mod simulation;
mod store;
#[cfg(test)]
mod test_helpers;
mod word;

pub use adaptation::{adapt_example, is_cjk_ideograph};
pub use config::Config;
pub use error::{DrowordError, Result};
pub use practice::{PracticeSession, Review};
pub use proficiency::{DEFAULT_SMOOTHING, Level, ProficiencyConfig, ProficiencyState};
pub use queue::{SessionQueue, SessionState, start_of_day};
pub use scheduler::{MINIMUM_EASE_FACTOR, NextStates, Rating, Scheduler, SchedulerConfig};
pub use simulation::{SimulationResult, SimulatorConfig, simulate, simulate_many};
pub use store::{JsonStore, MemoryStore, ProfileStore, WordStore};
pub use word::{DEFAULT_EASE_FACTOR, SchedulingState, WordContent, WordId, WordRecord};
