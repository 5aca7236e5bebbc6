use regex::Regex;
use tracing::trace;

use crate::document::CaptionSurface;
use crate::types::caption_data::{CaretNode, Point, SegmentId};

/// Removed from the resolved word wherever they occur.
const STRIPPED_PUNCTUATION: [char; 6] = ['.', ',', '!', '?', ';', ':'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    /// Half-open character range in the scanned text.
    pub start: usize,
    pub end: usize,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWord {
    pub segment: SegmentId,
    pub word: String,
    /// Character offset of the caret inside the segment text.
    pub segment_offset: usize,
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric()
}

// Hyphen only extends a word backwards, so "well-|known" resolves to the
// compound while "well|-known" stops at "well".
fn extends_backward(c: char) -> bool {
    is_word_char(c) || c == '-'
}

/// Scans outward from a caret sitting before character `offset`.
pub fn word_span_at(text: &str, offset: usize) -> Option<WordSpan> {
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());

    let mut start = offset;
    while start > 0 && extends_backward(chars[start - 1]) {
        start -= 1;
    }
    let mut end = offset;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    let raw: String = chars[start..end].iter().collect();
    let word = clean_word(&raw)?;
    Some(WordSpan { start, end, word })
}

/// Trims and drops sentence punctuation. `None` when nothing word-like is left.
pub fn clean_word(raw: &str) -> Option<String> {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    let stripped = stripped.trim();
    if stripped.chars().any(is_word_char) {
        Some(stripped.to_string())
    } else {
        None
    }
}

/// Case-insensitive whole-word pattern. Word boundaries are only anchored on
/// sides that start or end with a word character, so "-word" still matches.
pub fn whole_word_pattern(word: &str) -> Option<Regex> {
    let word = word.trim();
    let first = word.chars().next()?;
    let last = word.chars().next_back()?;
    let lead = if is_word_char(first) { r"\b" } else { "" };
    let tail = if is_word_char(last) { r"\b" } else { "" };
    Regex::new(&format!("(?i){}{}{}", lead, regex::escape(word), tail)).ok()
}

/// Resolves the word under `point`, or `None` on a resolution miss.
///
/// The caret primitive reports the text node it landed in, which after a
/// highlight is only a fragment of the line. The scan runs over the whole
/// segment text so a word split across fragments still resolves in full.
pub fn resolve_word_at<S: CaptionSurface + ?Sized>(surface: &S, point: Point) -> Option<ResolvedWord> {
    let caret = surface.caret_from_point(point)?;
    if caret.node == CaretNode::Element {
        trace!("caret at ({}, {}) landed on an element, not text", point.x, point.y);
        return None;
    }
    let text = surface.text_content(caret.segment)?;
    let span = word_span_at(&text, caret.segment_offset)?;
    trace!("resolved '{}' in {} at char {}", span.word, caret.segment, caret.segment_offset);
    Some(ResolvedWord {
        segment: caret.segment,
        word: span.word,
        segment_offset: caret.segment_offset,
    })
}
