use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Runtime;

use clicktrans_rust_gui::config::SentencePolicy;
use clicktrans_rust_gui::document::CaptionDocument;
use clicktrans_rust_gui::error::TranslateError;
use clicktrans_rust_gui::interaction::{OverlaySession, TooltipBody};
use clicktrans_rust_gui::player::SimulatedPlayer;
use clicktrans_rust_gui::sequencing::TokioDispatcher;
use clicktrans_rust_gui::translation::Translator;
use clicktrans_rust_gui::types::caption_data::{Point, TranslationRequest};

/// Answers slowly for "hur" and quickly for everything else.
struct UnevenBackend;

#[async_trait]
impl Translator for UnevenBackend {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let delay = if request.text == "hur" { 300 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        match request.text.as_str() {
            "hur" => Ok("how".to_string()),
            "tack" => Ok("thanks".to_string()),
            _ => Err(TranslateError::EmptyResult),
        }
    }
}

fn point(doc: &CaptionDocument, row: usize, col: usize) -> Point {
    let g = doc.geometry();
    Point::new(g.char_x(col), g.line_y(row))
}

#[test]
fn slow_early_reply_never_overwrites_a_later_one() {
    let runtime = Runtime::new().unwrap();
    let (dispatcher, replies) =
        TokioDispatcher::new(runtime.handle().clone(), Arc::new(UnevenBackend), Duration::from_secs(5));
    let mut session = OverlaySession::new(dispatcher, SentencePolicy::FirstOccurrence);
    let mut doc = CaptionDocument::from_lines(["Hej, hur mår du?", "Jag mår bra, tack."]);
    let mut player: Option<SimulatedPlayer> = None;

    let p = point(&doc, 0, 6);
    session.pointer_down(&mut doc, &mut player, p);
    let p = point(&doc, 1, 14);
    session.pointer_down(&mut doc, &mut player, p);

    let first = replies.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(first.ticket.request.text, "tack");
    session.deliver(&mut doc, &mut player, first);

    let second = replies.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(second.ticket.request.text, "hur");
    session.deliver(&mut doc, &mut player, second);

    match &session.tooltip().unwrap().body {
        TooltipBody::Word { word, translation } => {
            assert_eq!(word, "tack");
            assert_eq!(translation, "thanks");
        }
        other => panic!("unexpected tooltip {:?}", other),
    }
    assert_eq!(doc.segment_markup(doc.ids()[0]).unwrap(), "Hej, hur mår du?");
}

#[test]
fn backend_error_becomes_a_terminal_message() {
    let runtime = Runtime::new().unwrap();
    let (dispatcher, replies) =
        TokioDispatcher::new(runtime.handle().clone(), Arc::new(UnevenBackend), Duration::from_secs(5));
    let mut session = OverlaySession::new(dispatcher, SentencePolicy::FirstOccurrence);
    let mut doc = CaptionDocument::from_lines(["Hej, hur mår du?"]);
    let mut player: Option<SimulatedPlayer> = None;

    let p = point(&doc, 0, 1);
    session.pointer_down(&mut doc, &mut player, p);
    let reply = replies.recv_timeout(Duration::from_secs(5)).unwrap();
    session.deliver(&mut doc, &mut player, reply);

    match &session.tooltip().unwrap().body {
        TooltipBody::Failed { source, message } => {
            assert_eq!(source, "Hej");
            assert_eq!(message, "Translation error");
        }
        other => panic!("unexpected tooltip {:?}", other),
    }
    assert!(session.tooltip().unwrap().offers_retry());
}
