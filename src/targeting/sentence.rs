use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::boundary::whole_word_pattern;
use crate::config::SentencePolicy;
use crate::types::caption_data::{CaptionSegment, SegmentId, SegmentSpan, SentenceUnit};

// A unit runs through one or more terminators plus any closing quotes or
// brackets, or to the end of the text when no terminator remains.
static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^.!?]+[.!?]+["'”’»)\]]*|[^.!?]+$"#).expect("sentence pattern compiles")
});

/// Where one segment's trimmed text sits inside the joined caption text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    pub segment: SegmentId,
    pub start: usize,
    pub end: usize,
    /// Bytes of leading whitespace trimmed off the segment's own text.
    pub lead: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub text: String,
    pub ranges: Vec<SegmentRange>,
}

impl Assembly {
    pub fn range_of(&self, segment: SegmentId) -> Option<&SegmentRange> {
        self.ranges.iter().find(|r| r.segment == segment)
    }
}

/// Joins the trimmed segment texts with single spaces, keeping each segment's
/// byte range. Blank segments contribute nothing.
pub fn concatenate(segments: &[CaptionSegment]) -> Assembly {
    let mut assembly = Assembly::default();
    for segment in segments {
        let trimmed = segment.text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !assembly.text.is_empty() {
            assembly.text.push(' ');
        }
        let start = assembly.text.len();
        assembly.text.push_str(trimmed);
        assembly.ranges.push(SegmentRange {
            segment: segment.id,
            start,
            end: assembly.text.len(),
            lead: segment.text.len() - segment.text.trim_start().len(),
        });
    }
    assembly
}

pub fn split_sentences(text: &str) -> Vec<SentenceUnit> {
    SENTENCE_RE
        .find_iter(text)
        .filter_map(|m| {
            let raw = m.as_str();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            let start = m.start() + (raw.len() - raw.trim_start().len());
            Some(SentenceUnit {
                text: trimmed.to_string(),
                start,
                end: start + trimmed.len(),
            })
        })
        .collect()
}

pub fn assemble_sentences(segments: &[CaptionSegment]) -> Vec<SentenceUnit> {
    split_sentences(&concatenate(segments).text)
}

/// Distance in bytes between `[start, end)` and a segment's range; zero
/// when they overlap.
fn distance(start: usize, end: usize, range: &SegmentRange) -> usize {
    if end <= range.start {
        range.start - end
    } else if start >= range.end {
        start - range.end
    } else {
        0
    }
}

fn gap(unit: &SentenceUnit, range: &SegmentRange) -> usize {
    distance(unit.start, unit.end, range)
}

fn fallback_text(clicked: &CaptionSegment, word: &str) -> String {
    let text = clicked.text.trim();
    if text.is_empty() {
        word.trim().to_string()
    } else {
        text.to_string()
    }
}

/// Finds the sentence unit containing `word` (case-insensitive, whole word).
/// Falls back to the clicked segment's own text, never to an empty string.
pub fn find_sentence_containing(
    word: &str,
    segments: &[CaptionSegment],
    clicked: &CaptionSegment,
    policy: SentencePolicy,
) -> String {
    let assembly = concatenate(segments);
    let units = split_sentences(&assembly.text);
    let Some(pattern) = whole_word_pattern(word) else {
        return fallback_text(clicked, word);
    };

    let mut matching = units.iter().filter(|u| pattern.is_match(&u.text));
    let chosen = match (policy, assembly.range_of(clicked.id)) {
        (SentencePolicy::NearestClickedSegment, Some(range)) => {
            // min_by_key keeps the first of equally near units
            matching.min_by_key(|u| gap(u, range))
        }
        _ => matching.next(),
    };

    match chosen {
        Some(unit) => unit.text.trim().to_string(),
        None => {
            debug!("'{}' not found in any sentence, using the clicked segment", word);
            fallback_text(clicked, word)
        }
    }
}

/// The sentence around a double-click: the unit holding the caret (a character
/// offset into the segment's own text), else the first unit overlapping the
/// segment, else the segment text itself.
pub fn sentence_at(segments: &[CaptionSegment], clicked: SegmentId, caret: Option<usize>) -> Option<String> {
    let segment = segments.iter().find(|s| s.id == clicked)?;
    let assembly = concatenate(segments);
    let Some(range) = assembly.range_of(clicked) else {
        return Some(segment.text.trim().to_string()).filter(|s| !s.is_empty());
    };
    let units = split_sentences(&assembly.text);

    let at_caret = caret.and_then(|chars| {
        let byte = segment
            .text
            .char_indices()
            .nth(chars)
            .map_or(segment.text.len(), |(i, _)| i);
        let absolute = (range.start + byte.saturating_sub(range.lead)).min(range.end);
        units.iter().find(|u| u.start <= absolute && absolute < u.end)
    });
    let unit = at_caret.or_else(|| units.iter().find(|u| gap(u, range) == 0 && u.start < range.end));

    Some(match unit {
        Some(u) => u.text.clone(),
        None => segment.text.trim().to_string(),
    })
}

/// Maps an absolute `[start, end)` range of the joined text onto the segments
/// it covers, in segment-local byte offsets.
pub fn map_span(ranges: &[SegmentRange], start: usize, end: usize) -> Vec<SegmentSpan> {
    ranges
        .iter()
        .filter_map(|r| {
            let from = start.max(r.start);
            let to = end.min(r.end);
            (from < to).then(|| SegmentSpan {
                segment: r.segment,
                local_start: from - r.start + r.lead,
                local_end: to - r.start + r.lead,
            })
        })
        .collect()
}

/// Re-finds `sentence` in a fresh concatenation of `segments` and returns one
/// span per segment it visually covers. When the text occurs more than once,
/// the occurrence overlapping (else nearest to) `near` wins. Empty when the
/// captions moved on.
pub fn locate_span(sentence: &str, segments: &[CaptionSegment], near: Option<SegmentId>) -> Vec<SegmentSpan> {
    let needle = sentence.trim();
    if needle.is_empty() {
        return Vec::new();
    }
    let assembly = concatenate(segments);
    let Ok(pattern) = Regex::new(&format!("(?i){}", regex::escape(needle))) else {
        return Vec::new();
    };
    let matches: Vec<(usize, usize)> = pattern.find_iter(&assembly.text).map(|m| (m.start(), m.end())).collect();

    let chosen = match near.and_then(|id| assembly.range_of(id)) {
        // min_by_key keeps the earliest of equally near matches
        Some(range) => matches.iter().min_by_key(|(start, end)| distance(*start, *end, range)),
        None => matches.first(),
    };
    match chosen {
        Some(&(start, end)) => map_span(&assembly.ranges, start, end),
        None => {
            debug!("sentence no longer on screen: '{}'", needle);
            Vec::new()
        }
    }
}
