use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of one rendered caption segment. Ids are never reused: when the
/// caption renderer replaces a line, the replacement gets a fresh id.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SegmentId(pub u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A snapshot of one caption segment as currently rendered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CaptionSegment {
    pub id: SegmentId,
    pub text: String,
}

impl CaptionSegment {
    pub fn new(id: SegmentId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

/// What the caret-from-point primitive landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum CaretNode {
    /// A text node; holds that node's text only, which after highlighting is
    /// a fragment of the segment rather than the whole line.
    Text(String),
    Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaretPosition {
    pub segment: SegmentId,
    pub node: CaretNode,
    /// Character offset inside `node`.
    pub offset: usize,
    /// Character offset inside the segment's whole text content.
    pub segment_offset: usize,
}

/// Saved original text of a segment carrying injected highlight markup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HighlightRecord {
    pub segment: SegmentId,
    pub original_text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Source language (or auto-detected) to target language.
    #[default]
    Forward,
    /// A single target-language word back toward the source language.
    Reverse,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    pub direction: Direction,
    pub generation: Generation,
}

/// One sentence-like unit of the space-joined caption text. Offsets are byte
/// offsets into that joined string and cover exactly `text`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SentenceUnit {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Part of a located sentence that falls inside one segment. Local offsets
/// are byte offsets into that segment's own text.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan {
    pub segment: SegmentId,
    pub local_start: usize,
    pub local_end: usize,
}

/// One timed subtitle entry; each line becomes its own caption segment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SubtitleCue {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub lines: Vec<String>,
}
