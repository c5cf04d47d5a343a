use std::sync::Once;

use chrono::{TimeZone, Utc};

use crate::word::{WordContent, WordRecord};

pub(crate) fn word(text: &str) -> WordRecord {
    WordRecord::new(
        WordContent::new(text, "noun", "Nederlands", "English").with_translation(text),
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
    )
}

/// Routes `log` output to stderr at debug level, once per test binary.
pub(crate) fn init_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
            })
            .level(log::LevelFilter::Debug)
            .chain(std::io::stderr())
            .apply();
    });
}
