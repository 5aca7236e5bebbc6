use std::cell::RefCell;
use std::time::Duration;

use clicktrans_rust_gui::config::SentencePolicy;
use clicktrans_rust_gui::document::{CaptionDocument, CaptionSurface};
use clicktrans_rust_gui::interaction::{OverlaySession, TooltipBody};
use clicktrans_rust_gui::markup;
use clicktrans_rust_gui::player::{SimulatedPlayer, VideoPlayer};
use clicktrans_rust_gui::sequencing::{Dispatch, RequestTicket, TranslationOutcome, TranslationReply};
use clicktrans_rust_gui::types::caption_data::{Direction, Point, SubtitleCue};

#[derive(Default)]
struct RecordingDispatcher {
    sent: RefCell<Vec<RequestTicket>>,
}

impl RecordingDispatcher {
    fn last(&self) -> RequestTicket {
        self.sent.borrow().last().cloned().expect("a request was dispatched")
    }

    fn count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Dispatch for RecordingDispatcher {
    fn dispatch(&self, ticket: RequestTicket) {
        self.sent.borrow_mut().push(ticket);
    }
}

struct Fixture {
    doc: CaptionDocument,
    player: SimulatedPlayer,
    session: OverlaySession<RecordingDispatcher>,
}

impl Fixture {
    fn new(lines: &[&str]) -> Self {
        Self::with_policy(lines, SentencePolicy::FirstOccurrence)
    }

    fn with_policy(lines: &[&str], policy: SentencePolicy) -> Self {
        let cue = SubtitleCue {
            index: 1,
            start: Duration::ZERO,
            end: Duration::from_secs(60),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        };
        let mut player = SimulatedPlayer::new(vec![cue]);
        player.play();
        Self {
            doc: CaptionDocument::from_lines(lines.iter().copied()),
            player,
            session: OverlaySession::new(RecordingDispatcher::default(), policy),
        }
    }

    /// Centre of the `nth` character of `needle` on line `row`.
    fn point_in(&self, row: usize, needle: &str, nth: usize) -> Point {
        let text = self.doc.segment_text(self.doc.ids()[row]).unwrap();
        let byte = text.find(needle).unwrap();
        let col = text[..byte].chars().count() + nth;
        let g = self.doc.geometry();
        Point::new(g.char_x(col), g.line_y(row))
    }

    fn click(&mut self, row: usize, needle: &str) -> RequestTicket {
        let point = self.point_in(row, needle, 1);
        self.session.pointer_down(&mut self.doc, &mut self.player, point);
        self.session.dispatcher().last()
    }

    fn reply(&mut self, ticket: &RequestTicket, text: &str) {
        let reply = TranslationReply {
            ticket: ticket.clone(),
            outcome: TranslationOutcome::Translated(text.to_string()),
        };
        self.session.deliver(&mut self.doc, &mut self.player, reply);
    }

    fn markup(&self, row: usize) -> String {
        self.doc.segment_markup(self.doc.ids()[row]).unwrap()
    }
}

fn word_mark(word: &str) -> String {
    format!("<mark class=\"{}\">{}</mark>", markup::WORD_MARKER, word)
}

#[test]
fn word_click_pauses_marks_and_requests() {
    let mut f = Fixture::new(&["Hej, hur mår du?", "Jag mår bra, tack."]);
    let ticket = f.click(0, "mår");

    assert!(!f.player.is_playing());
    assert_eq!(ticket.request.text, "mår");
    assert_eq!(ticket.request.direction, Direction::Forward);
    assert_eq!(f.markup(0), format!("Hej, hur {} du?", word_mark("mår")));
    assert_eq!(f.markup(1), "Jag mår bra, tack.");
    assert!(f.session.tooltip().unwrap().is_loading());
    assert_eq!(f.session.highlights().records().len(), 1);
}

#[test]
fn later_click_wins_whatever_order_replies_arrive_in() {
    let mut f = Fixture::new(&["Hej, hur mår du?", "Jag mår bra, tack."]);
    let first = f.click(0, "hur");
    let second = f.click(1, "tack");
    assert!(second.generation() > first.generation());

    f.reply(&second, "thanks");
    f.reply(&first, "how");

    match &f.session.tooltip().unwrap().body {
        TooltipBody::Word { word, translation } => {
            assert_eq!(word, "tack");
            assert_eq!(translation, "thanks");
        }
        other => panic!("unexpected tooltip {:?}", other),
    }
    assert_eq!(f.markup(0), "Hej, hur mår du?");
    assert_eq!(f.markup(1), format!("Jag mår bra, {}.", word_mark("tack")));
}

#[test]
fn whitespace_click_has_no_side_effects() {
    let mut f = Fixture::new(&["Hej, hur mår du?"]);
    let space = f.point_in(0, " hur", 0);
    f.session.pointer_down(&mut f.doc, &mut f.player, space);

    let g = f.doc.geometry();
    f.session.pointer_down(&mut f.doc, &mut f.player, Point::new(g.char_x(80), g.line_y(0)));

    assert!(f.player.is_playing());
    assert_eq!(f.session.dispatcher().count(), 0);
    assert!(f.session.tooltip().is_none());
    assert_eq!(f.markup(0), "Hej, hur mår du?");
}

#[test]
fn miss_leaves_an_open_tooltip_alone() {
    let mut f = Fixture::new(&["Hej, hur mår du?"]);
    let ticket = f.click(0, "du");
    f.reply(&ticket, "you");

    let space = f.point_in(0, " hur", 0);
    f.session.pointer_down(&mut f.doc, &mut f.player, space);

    assert!(matches!(f.session.tooltip().unwrap().body, TooltipBody::Word { .. }));
    assert_eq!(f.markup(0), format!("Hej, hur mår {}?", word_mark("du")));
}

#[test]
fn highlight_reverts_byte_for_byte() {
    let original = "Tom & Jerry <3 ost";
    let mut f = Fixture::new(&[original]);
    f.click(0, "Jerry");
    assert_eq!(f.markup(0), format!("Tom &amp; {} &lt;3 ost", word_mark("Jerry")));

    f.session.dismiss(&mut f.doc, &mut f.player);
    assert_eq!(f.doc.segment_text(f.doc.ids()[0]).unwrap(), original);
    assert_eq!(f.markup(0), markup::escape_text(original));
}

#[test]
fn cleanup_is_idempotent() {
    let mut f = Fixture::new(&["Hej, hur mår du?", "Jag mår bra, tack."]);
    let ticket = f.click(1, "bra");
    f.reply(&ticket, "good");

    f.session.dismiss(&mut f.doc, &mut f.player);
    let once = f.doc.snapshot();
    let markup_once: Vec<String> = (0..2).map(|row| f.markup(row)).collect();
    f.session.dismiss(&mut f.doc, &mut f.player);

    assert_eq!(f.doc.snapshot(), once);
    assert_eq!((0..2).map(|row| f.markup(row)).collect::<Vec<_>>(), markup_once);
    assert!(f.session.highlights().is_empty());
    assert!(f.session.tooltip().is_none());
}

#[test]
fn sentence_follow_up_spans_segments() {
    let mut f = Fixture::new(&["Vi skulle gå till stranden,", "men det började regna."]);
    let word = f.click(1, "regna");
    f.reply(&word, "rain");

    f.session.request_sentence(&mut f.doc, &mut f.player);
    let sentence = f.session.dispatcher().last();
    assert_eq!(sentence.request.text, "Vi skulle gå till stranden, men det började regna.");
    assert_eq!(sentence.generation(), word.generation());

    let marked = |text: &str| format!("<mark class=\"{}\">{}</mark>", markup::SENTENCE_MARKER, text);
    assert_eq!(f.markup(0), marked("Vi skulle gå till stranden,"));
    assert_eq!(f.markup(1), marked("men det började regna."));
    assert_eq!(f.session.highlights().records().len(), 2);

    f.reply(&sentence, "We were going to the beach, but it started raining.");
    match &f.session.tooltip().unwrap().body {
        TooltipBody::Sentence { words, .. } => assert_eq!(words[0], "We"),
        other => panic!("unexpected tooltip {:?}", other),
    }

    f.session.dismiss(&mut f.doc, &mut f.player);
    assert_eq!(f.markup(0), "Vi skulle gå till stranden,");
    assert_eq!(f.markup(1), "men det började regna.");
}

#[test]
fn double_click_translates_the_sentence_under_the_caret() {
    let mut f = Fixture::new(&["Ja! Bussen går om tio minuter."]);
    let point = f.point_in(0, "tio", 1);
    f.session.double_click(&mut f.doc, &mut f.player, point);

    let ticket = f.session.dispatcher().last();
    assert_eq!(ticket.request.text, "Bussen går om tio minuter.");
    assert!(!f.player.is_playing());
    assert_eq!(
        f.markup(0),
        format!("Ja! <mark class=\"{}\">Bussen går om tio minuter.</mark>", markup::SENTENCE_MARKER)
    );
}

#[test]
fn double_click_marks_the_clicked_copy_of_a_repeated_sentence() {
    let mut f = Fixture::new(&["Jag sa nej.", "Nej."]);
    let point = f.point_in(1, "Nej", 1);
    f.session.double_click(&mut f.doc, &mut f.player, point);

    assert_eq!(f.session.dispatcher().last().request.text, "Nej.");
    assert_eq!(f.markup(0), "Jag sa nej.");
    assert_eq!(f.markup(1), format!("<mark class=\"{}\">Nej.</mark>", markup::SENTENCE_MARKER));
}

#[test]
fn nearest_policy_marks_the_sentence_it_translated() {
    let mut f = Fixture::with_policy(&["Go home.", "Stay.", "Go home."], SentencePolicy::NearestClickedSegment);
    let word = f.click(2, "home");
    f.reply(&word, "hem");
    f.session.request_sentence(&mut f.doc, &mut f.player);

    assert_eq!(f.session.dispatcher().last().request.text, "Go home.");
    assert_eq!(f.markup(0), "Go home.");
    assert_eq!(f.markup(2), format!("<mark class=\"{}\">Go home.</mark>", markup::SENTENCE_MARKER));
}

#[test]
fn resume_cleans_up_once_and_late_replies_are_dropped() {
    let mut f = Fixture::new(&["Hej, hur mår du?"]);
    let ticket = f.click(0, "Hej");
    assert!(f.session.controller().resume_armed());

    assert!(f.player.toggle());
    f.session.video_played(&mut f.doc, &mut f.player);
    assert!(f.session.tooltip().is_none());
    assert_eq!(f.markup(0), "Hej, hur mår du?");
    assert!(!f.session.controller().resume_armed());

    f.reply(&ticket, "Hi");
    assert!(f.session.tooltip().is_none());
    assert_eq!(f.markup(0), "Hej, hur mår du?");
}

#[test]
fn failure_shows_a_message_and_retry_reissues() {
    let mut f = Fixture::new(&["Hej, hur mår du?"]);
    let ticket = f.click(0, "mår");
    let failed = TranslationReply {
        ticket: ticket.clone(),
        outcome: TranslationOutcome::Failed("Translation timed out".to_string()),
    };
    f.session.deliver(&mut f.doc, &mut f.player, failed);
    match &f.session.tooltip().unwrap().body {
        TooltipBody::Failed { message, .. } => assert_eq!(message, "Translation timed out"),
        other => panic!("unexpected tooltip {:?}", other),
    }

    f.session.retry(&mut f.doc, &mut f.player);
    let retried = f.session.dispatcher().last();
    assert_eq!(retried.request.text, "mår");
    assert!(retried.generation() > ticket.generation());
    assert_eq!(f.markup(0), format!("Hej, hur {} du?", word_mark("mår")));

    f.reply(&retried, "feel");
    assert!(matches!(f.session.tooltip().unwrap().body, TooltipBody::Word { .. }));
}

#[test]
fn caption_replaced_under_a_highlight_is_tolerated() {
    let mut f = Fixture::new(&["Hej, hur mår du?"]);
    f.click(0, "mår");
    assert!(f.doc.sync_lines(&["Vi skulle gå till stranden,"]));

    f.session.dismiss(&mut f.doc, &mut f.player);
    assert!(f.session.highlights().is_empty());
    assert_eq!(f.markup(0), "Vi skulle gå till stranden,");

    f.click(0, "stranden");
    assert_eq!(f.markup(0), format!("Vi skulle gå till {},", word_mark("stranden")));
}

#[test]
fn sessions_do_not_share_state() {
    let mut a = Fixture::new(&["Hej, hur mår du?"]);
    let b = Fixture::new(&["Hej, hur mår du?"]);
    a.click(0, "du");
    assert_eq!(b.session.controller().generation().0, 0);
    assert!(b.session.tooltip().is_none());
    assert!(b.doc.segments().iter().all(|s| !s.text.contains('<')));
}
