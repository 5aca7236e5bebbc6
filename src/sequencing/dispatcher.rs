use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::sequencer::{RequestTicket, TranslationOutcome, TranslationReply, TIMEOUT_MESSAGE};
use crate::translation::Translator;

/// Hands a ticket to whatever performs the translation. Replies come back
/// through a channel and are applied on the UI thread.
pub trait Dispatch {
    fn dispatch(&self, ticket: RequestTicket);
}

pub type Notify = Arc<dyn Fn() + Send + Sync>;

/// Runs each ticket as a tokio task raced against a timeout. A timed-out or
/// failed request still produces a reply, so nothing waits forever.
pub struct TokioDispatcher {
    handle: Handle,
    translator: Arc<dyn Translator>,
    timeout: Duration,
    replies: Sender<TranslationReply>,
    notify: Option<Notify>,
}

impl TokioDispatcher {
    pub fn new(
        handle: Handle,
        translator: Arc<dyn Translator>,
        timeout: Duration,
    ) -> (Self, Receiver<TranslationReply>) {
        let (replies, rx) = mpsc::channel();
        let dispatcher = Self { handle, translator, timeout, replies, notify: None };
        (dispatcher, rx)
    }

    /// Called after every reply is queued, e.g. to wake the UI.
    pub fn with_notify(mut self, notify: Notify) -> Self {
        self.notify = Some(notify);
        self
    }
}

impl Dispatch for TokioDispatcher {
    fn dispatch(&self, ticket: RequestTicket) {
        let translator = Arc::clone(&self.translator);
        let replies = self.replies.clone();
        let notify = self.notify.clone();
        let timeout = self.timeout;

        self.handle.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, translator.translate(&ticket.request)).await {
                Ok(result) => TranslationOutcome::from_backend(result),
                Err(_) => {
                    warn!("{:?} request '{}' timed out after {:?}", ticket.kind, ticket.request.text, timeout);
                    TranslationOutcome::Failed(TIMEOUT_MESSAGE.to_string())
                }
            };
            if let TranslationOutcome::Failed(message) = &outcome {
                warn!("{:?} request for {} failed: {}", ticket.kind, ticket.generation(), message);
            }
            if replies.send(TranslationReply { ticket, outcome }).is_err() {
                debug!("reply receiver dropped");
                return;
            }
            if let Some(notify) = notify {
                notify();
            }
        });
    }
}
