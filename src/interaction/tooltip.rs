use crate::sequencing::TranslationOutcome;
use crate::targeting::boundary::clean_word;
use crate::types::caption_data::{Generation, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TooltipId(pub u64);

/// A word-level lookup started from inside a settled sentence tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseLookup {
    pub word: String,
    pub generation: Generation,
    pub result: Option<TranslationOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipBody {
    Loading { source: String },
    Word { word: String, translation: String },
    Sentence {
        sentence: String,
        translation: String,
        /// Each word of the translation, clickable for a reverse lookup.
        words: Vec<String>,
        reverse: Option<ReverseLookup>,
    },
    Failed { source: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub id: TooltipId,
    pub anchor: Point,
    pub body: TooltipBody,
}

impl Tooltip {
    pub fn offers_sentence(&self) -> bool {
        matches!(self.body, TooltipBody::Word { .. })
    }

    pub fn offers_retry(&self) -> bool {
        matches!(self.body, TooltipBody::Failed { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.body, TooltipBody::Loading { .. })
    }
}

pub fn clickable_words(translation: &str) -> Vec<String> {
    translation.split_whitespace().filter_map(clean_word).collect()
}

/// The single tooltip attached to the page.
#[derive(Debug, Default)]
pub struct TooltipSlot {
    current: Option<Tooltip>,
}

impl TooltipSlot {
    /// Attaches `tooltip`, detaching and returning whatever was there.
    pub fn show(&mut self, tooltip: Tooltip) -> Option<Tooltip> {
        self.current.replace(tooltip)
    }

    pub fn remove(&mut self) -> Option<Tooltip> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.current.is_some()
    }
}
