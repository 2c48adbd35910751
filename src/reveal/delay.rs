use super::segmenter::is_list_item;
use crate::util::char_len;
use std::time::Duration;

const BASE_DELAY_MS: f64 = 120.0;
const LIST_ITEM_DELAY_MS: f64 = 180.0;
const QUESTION_DELAY_MS: f64 = 150.0;
const SHORT_SEGMENT_DELAY_MS: f64 = 80.0;
const SHORT_SEGMENT_CHARS: usize = 40;
const WORDS_PER_STEP: f64 = 15.0;
const MAX_WORD_STEPS: f64 = 2.5;
const WORD_STEP_MS: f64 = 70.0;
const MIN_DELAY_MS: f64 = 50.0;

/// How long to wait before `segment` appears.
pub fn segment_delay(segment: &str) -> Duration {
    let trimmed = segment.trim_end();
    let millis = if is_list_item(segment) {
        LIST_ITEM_DELAY_MS
    } else if trimmed.ends_with('?') {
        QUESTION_DELAY_MS
    } else if char_len(segment) < SHORT_SEGMENT_CHARS {
        SHORT_SEGMENT_DELAY_MS
    } else {
        let words = segment.split_whitespace().count() as f64;
        BASE_DELAY_MS + (words / WORDS_PER_STEP).min(MAX_WORD_STEPS) * WORD_STEP_MS
    };
    Duration::from_millis(millis.max(MIN_DELAY_MS).round() as u64)
}

/// Delays for a whole segment sequence, in reveal order.
pub fn schedule_for(segments: &[String]) -> Vec<Duration> {
    segments.iter().map(|segment| segment_delay(segment)).collect()
}
