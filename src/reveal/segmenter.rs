use crate::util::char_len;
use aho_corasick::{AhoCorasick, Anchored, Input, MatchKind, StartKind};
use regex::Regex;
use std::sync::OnceLock;

/// Blocks shorter than this (trimmed, in chars) are revealed as one segment.
pub const SHORT_BLOCK_CHARS: usize = 180;
/// Soft cap for a group of sentences inside a long block.
pub const SENTENCE_GROUP_CHARS: usize = 200;

/// Sentence openers that always start a new segment.
const TRANSITION_WORDS: &[&str] = &[
    "however",
    "nevertheless",
    "therefore",
    "thus",
    "consequently",
    "furthermore",
    "moreover",
    "in addition",
    "besides",
    "alternatively",
    "meanwhile",
    "conversely",
    "on the other hand",
    "in contrast",
    "similarly",
    "likewise",
    "accordingly",
    "as a result",
    "dock",
    "däremot",
    "därför",
    "dessutom",
    "emellertid",
    "följaktligen",
    "alltså",
    "samtidigt",
    "slutligen",
    "å andra sidan",
    "till exempel",
    "med andra ord",
];

fn list_item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+").expect("list item pattern is valid")
    })
}

fn transition_matcher() -> &'static AhoCorasick {
    static MATCHER: OnceLock<AhoCorasick> = OnceLock::new();
    MATCHER.get_or_init(|| {
        AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .start_kind(StartKind::Anchored)
            .build(TRANSITION_WORDS)
            .expect("transition word automaton builds")
    })
}

/// True when the text opens with a bullet (`-`, `*`, `+`, `•`) or a numbered marker.
pub fn is_list_item(text: &str) -> bool {
    list_item_pattern().is_match(text)
}

/// True when the sentence opens with a discourse transition as a whole word.
pub fn starts_with_transition(sentence: &str) -> bool {
    let lowered = sentence.trim_start().to_lowercase();
    let input = Input::new(&lowered).anchored(Anchored::Yes);
    let Some(found) = transition_matcher().find(input) else {
        return false;
    };
    lowered[found.end()..]
        .chars()
        .next()
        .map_or(true, |next| !next.is_alphanumeric())
}

/// Split reply text into display segments, in order.
///
/// Blank lines separate blocks. List items and short blocks are kept whole;
/// longer blocks are broken into sentence groups that stay under
/// [`SENTENCE_GROUP_CHARS`] and never continue across a transition word.
pub fn segment_text(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    for block in split_blocks(text) {
        if is_list_item(&block) || char_len(&block) < SHORT_BLOCK_CHARS {
            segments.push(block);
        } else {
            group_sentences(&block, &mut segments);
        }
    }
    segments
}

fn split_blocks(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in normalized.split('\n') {
        if line.trim().is_empty() {
            push_block(&mut blocks, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_block(&mut blocks, &current);
    blocks
}

fn push_block(blocks: &mut Vec<String>, lines: &[&str]) {
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
}

fn group_sentences(block: &str, segments: &mut Vec<String>) {
    let mut group = String::new();
    for sentence in split_sentences(block) {
        let group_len = char_len(&group);
        let overflows = group_len + char_len(sentence) > SENTENCE_GROUP_CHARS;
        if overflows || (group_len > 0 && starts_with_transition(sentence)) {
            if !group.is_empty() {
                segments.push(std::mem::take(&mut group));
            }
            group.push_str(sentence);
        } else {
            if !group.is_empty() {
                group.push(' ');
            }
            group.push_str(sentence);
        }
    }
    if !group.is_empty() {
        segments.push(group);
    }
}

/// Sentences end at a run of `.`, `!` or `?` followed by whitespace or the end
/// of the block. Punctuation inside tokens ("3.5", "t.ex.") does not split.
fn split_sentences(block: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut chars = block.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let mut end = idx + ch.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?') {
                end = next_idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            push_sentence(&mut sentences, &block[start..end]);
            start = end;
        }
    }
    push_sentence(&mut sentences, &block[start..]);
    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, raw: &'a str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}
