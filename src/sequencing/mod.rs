pub mod dispatcher;
pub mod sequencer;

pub use dispatcher::{Dispatch, TokioDispatcher};
pub use sequencer::{RequestKind, RequestSequencer, RequestTicket, TranslationOutcome, TranslationReply};
