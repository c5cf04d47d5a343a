//! Simplifies example sentences for learners at the lowest levels.

use crate::proficiency::Level;

const MASK: char = '•';
const ELLIPSIS: char = '…';

const JAPANESE: [&str; 3] = ["日本語", "Japanese", "日本語 (Japanese)"];
const CHINESE: [&str; 4] = ["中文", "汉语", "Chinese", "中文 (Chinese)"];

/// CJK Unified Ideographs, extensions A through F.
const CJK_IDEOGRAPHS: [(u32, u32); 7] = [
    (0x4E00, 0x9FFF),
    (0x3400, 0x4DBF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B73F),
    (0x2B740, 0x2B81F),
    (0x2B820, 0x2CEAF),
    (0x2CEB0, 0x2EBEF),
];

/// Returns `example` as it should be shown to a learner of `target_language`
/// at `level`. From B1 up the sentence is returned untouched.
pub fn adapt_example(example: &str, target_language: &str, level: Level) -> String {
    let ideographic = JAPANESE.contains(&target_language) || CHINESE.contains(&target_language);
    match (ideographic, level) {
        (true, Level::A1 | Level::A2) => shorten(&mask_ideographs(example), 45),
        (false, Level::A1) => shorten(&simplify_punctuation(example), 60),
        (false, Level::A2) => shorten(example, 80),
        _ => example.to_owned(),
    }
}

pub fn is_cjk_ideograph(c: char) -> bool {
    let code = u32::from(c);
    CJK_IDEOGRAPHS
        .iter()
        .any(|&(low, high)| (low..=high).contains(&code))
}

fn mask_ideographs(s: &str) -> String {
    s.chars()
        .map(|c| if is_cjk_ideograph(c) { MASK } else { c })
        .collect()
}

/// Splits clauses joined by semicolons into separate sentences. Commas are
/// kept; the older `,` to `") "` rewrite garbled sentences and is not applied.
fn simplify_punctuation(s: &str) -> String {
    s.replace(';', ". ")
}

/// Keeps the first `max_chars` characters and marks the cut with an ellipsis.
fn shorten(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => {
            let mut short = s[..end].to_owned();
            short.push(ELLIPSIS);
            short
        }
        None => s.to_owned(),
    }
}
