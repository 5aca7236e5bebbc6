use tracing::debug;

use crate::document::CaptionSurface;
use crate::markup::{self, SENTENCE_MARKER, WORD_MARKER};
use crate::targeting::boundary::whole_word_pattern;
use crate::types::caption_data::{HighlightRecord, SegmentId, SegmentSpan};

/// Owns the set of segments currently carrying injected markup. Each record
/// holds the exact text needed to put its segment back.
#[derive(Debug, Default)]
pub struct HighlightManager {
    records: Vec<HighlightRecord>,
}

impl HighlightManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[HighlightRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Restores every recorded segment and empties the record set. Segments
    /// the caption renderer already removed are skipped.
    pub fn clear_all<S: CaptionSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let mut restored = 0;
        for record in self.records.drain(..) {
            if surface.set_text(record.segment, &record.original_text) {
                restored += 1;
            } else {
                debug!("{} vanished before its highlight was reverted", record.segment);
            }
        }
        restored
    }

    /// Marks the first whole-word, case-insensitive match of `word`.
    pub fn apply_word_highlight<S: CaptionSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        segment: SegmentId,
        word: &str,
    ) -> bool {
        self.clear_all(surface);

        let Some(original) = surface.text_content(segment) else {
            return false;
        };
        let Some(found) = whole_word_pattern(word).and_then(|re| re.find(&original)) else {
            debug!("'{}' not present in {}, nothing marked", word, segment);
            return false;
        };
        let markup = markup::wrap_marked(
            &original[..found.start()],
            found.as_str(),
            &original[found.end()..],
            WORD_MARKER,
        );
        if !surface.set_markup(segment, &markup) {
            return false;
        }
        self.records.push(HighlightRecord { segment, original_text: original });
        true
    }

    /// Marks each segment's share of a sentence. Returns how many segments
    /// were marked; one record per marked segment.
    pub fn apply_sentence_highlight<S: CaptionSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        spans: &[SegmentSpan],
    ) -> usize {
        self.clear_all(surface);

        for span in spans {
            if self.records.iter().any(|r| r.segment == span.segment) {
                continue;
            }
            let Some(original) = surface.text_content(span.segment) else {
                continue;
            };
            let end = span.local_end.min(original.len());
            let start = span.local_start.min(end);
            if start == end || !original.is_char_boundary(start) || !original.is_char_boundary(end) {
                debug!("span {}..{} does not fit {}", span.local_start, span.local_end, span.segment);
                continue;
            }
            let markup = markup::wrap_marked(&original[..start], &original[start..end], &original[end..], SENTENCE_MARKER);
            if surface.set_markup(span.segment, &markup) {
                self.records.push(HighlightRecord { segment: span.segment, original_text: original });
            }
        }
        self.records.len()
    }
}
