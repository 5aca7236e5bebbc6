use serde::{Deserialize, Serialize};

use crate::error::TranslateError;
use crate::types::caption_data::{Direction, Generation, TranslationRequest};

pub const TIMEOUT_MESSAGE: &str = "Translation timed out";
pub const EMPTY_MESSAGE: &str = "Translation error";

/// Which part of the interaction a request belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Word,
    Sentence,
    Reverse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub request: TranslationRequest,
}

impl RequestTicket {
    pub fn generation(&self) -> Generation {
        self.request.generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    Translated(String),
    /// Terminal, human-readable failure text.
    Failed(String),
}

impl TranslationOutcome {
    /// Whatever the backend produced becomes something showable; a blank
    /// translation counts as a failure.
    pub fn from_backend(result: Result<String, TranslateError>) -> Self {
        match result {
            Ok(text) if !text.trim().is_empty() => Self::Translated(text.trim().to_string()),
            Ok(_) => Self::Failed(EMPTY_MESSAGE.to_string()),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Translated(t) | Self::Failed(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationReply {
    pub ticket: RequestTicket,
    pub outcome: TranslationOutcome,
}

/// Monotonic generation counter. Only a reply whose generation equals the
/// current one may touch the page; in-flight requests are never aborted.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    current: Generation,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    /// Starts a new user action and returns its generation.
    pub fn begin_action(&mut self) -> Generation {
        self.current = Generation(self.current.0 + 1);
        self.current
    }

    /// Invalidates everything in flight without starting an action.
    pub fn supersede(&mut self) {
        self.current = Generation(self.current.0 + 1);
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.current
    }

    /// A ticket tagged with the current generation.
    pub fn ticket(&self, kind: RequestKind, text: &str, direction: Direction) -> RequestTicket {
        RequestTicket {
            kind,
            request: TranslationRequest {
                text: text.to_string(),
                direction,
                generation: self.current,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_action_is_the_only_current_one() {
        let mut seq = RequestSequencer::new();
        let a = seq.begin_action();
        let b = seq.begin_action();
        assert!(a < b);
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));

        seq.supersede();
        assert!(!seq.is_current(b));
    }

    #[test]
    fn tickets_capture_generation_at_issue_time() {
        let mut seq = RequestSequencer::new();
        seq.begin_action();
        let ticket = seq.ticket(RequestKind::Word, "mår", Direction::Forward);
        seq.begin_action();
        assert_eq!(ticket.generation(), Generation(1));
        assert!(!seq.is_current(ticket.generation()));
    }

    #[test]
    fn backend_results_normalise() {
        assert_eq!(
            TranslationOutcome::from_backend(Ok("  feel ".to_string())),
            TranslationOutcome::Translated("feel".to_string())
        );
        assert!(TranslationOutcome::from_backend(Ok("   ".to_string())).is_failure());
        let failed = TranslationOutcome::from_backend(Err(TranslateError::MissingApiKey));
        assert!(failed.text().contains("API key"));
    }
}
