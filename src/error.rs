use snafu::Snafu;

use crate::word::WordId;

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum DrowordError {
    #[snafu(display("invalid configuration: {reason}"))]
    InvalidConfig { reason: String },
    InvalidDeckSize,
    #[snafu(display("no word with id {id}"))]
    WordNotFound { id: WordId },
    SessionComplete,
    #[snafu(display("storage I/O failed: {source}"))]
    Io { source: std::io::Error },
    #[snafu(display("malformed JSON: {source}"))]
    Json { source: serde_json::Error },
}

pub type Result<T, E = DrowordError> = std::result::Result<T, E>;
