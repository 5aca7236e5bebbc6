use tracing::{debug, trace};

use super::tooltip::{clickable_words, ReverseLookup, Tooltip, TooltipBody, TooltipId};
use crate::sequencing::{RequestKind, RequestSequencer, RequestTicket, TranslationOutcome, TranslationReply};
use crate::types::caption_data::{Direction, Generation, Point, SegmentId};

/// A word the boundary resolver found under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct WordTarget {
    pub segment: SegmentId,
    pub word: String,
}

/// A sentence picked by double-click, already assembled from the segments.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceTarget {
    pub segment: SegmentId,
    pub sentence: String,
}

/// Inputs to the state machine. Anything that needs the page (word under the
/// pointer, sentence assembly) is read before the event is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `target` is `None` when nothing translatable is under the pointer.
    PointerDown { anchor: Point, target: Option<WordTarget> },
    DoubleClick { anchor: Point, target: Option<SentenceTarget> },
    /// The "translate sentence" affordance, carrying the containing sentence.
    SentenceAffordance { sentence: String },
    ReverseLookup { word: String },
    Retry,
    Reply(TranslationReply),
    VideoPlayed,
    Dismiss,
}

/// Page mutations and I/O the transition asks for, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PauseVideo,
    ClearHighlights,
    HighlightWord { segment: SegmentId, word: String },
    /// `segment` is where the sentence was picked; it decides which
    /// occurrence gets marked when the text repeats.
    HighlightSentence { segment: SegmentId, sentence: String },
    Dispatch(RequestTicket),
    ShowTooltip(Tooltip),
    RemoveTooltip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub segment: SegmentId,
    pub anchor: Point,
    pub word: Option<String>,
    pub sentence: Option<String>,
    pub tooltip: Tooltip,
    /// Last word or sentence request, kept for an explicit retry.
    pub last_request: Option<RequestTicket>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    WordSelected(Selection),
    SentenceRequested(Selection),
    /// Sentence translated (or failed); the tooltip stays until cleanup.
    Settled(Selection),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::WordSelected(_) => "word-selected",
            Phase::SentenceRequested(_) => "sentence-requested",
            Phase::Settled(_) => "settled",
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Phase::Idle => None,
            Phase::WordSelected(s) | Phase::SentenceRequested(s) | Phase::Settled(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub sequencer: RequestSequencer,
    pub phase: Phase,
    /// One-shot: the next play event cleans up, then this is cleared.
    pub resume_armed: bool,
    next_tooltip: u64,
}

impl InteractionState {
    fn new_tooltip(&mut self, anchor: Point, body: TooltipBody) -> Tooltip {
        self.next_tooltip += 1;
        Tooltip { id: TooltipId(self.next_tooltip), anchor, body }
    }

    fn cleanup(&mut self, effects: &mut Vec<Effect>) {
        effects.push(Effect::ClearHighlights);
        effects.push(Effect::RemoveTooltip);
        self.sequencer.supersede();
        self.phase = Phase::Idle;
        self.resume_armed = false;
    }

    /// Shared start of every top-level action: drop the old interaction,
    /// take a fresh generation, pause, arm the resume cleanup.
    fn begin_action(&mut self, effects: &mut Vec<Effect>) -> Generation {
        effects.push(Effect::ClearHighlights);
        effects.push(Effect::RemoveTooltip);
        let generation = self.sequencer.begin_action();
        effects.push(Effect::PauseVideo);
        self.resume_armed = true;
        generation
    }
}

/// Pure transition: no page access, only the returned effects.
pub fn transition(mut state: InteractionState, event: Event) -> (InteractionState, Vec<Effect>) {
    let mut effects = Vec::new();
    let phase = std::mem::take(&mut state.phase);

    state.phase = match (phase, event) {
        (phase, Event::PointerDown { target: None, .. }) | (phase, Event::DoubleClick { target: None, .. }) => {
            trace!("nothing translatable under the pointer");
            phase
        }

        (_, Event::PointerDown { anchor, target: Some(target) }) => {
            let generation = state.begin_action(&mut effects);
            debug!("word '{}' in {} ({})", target.word, target.segment, generation);
            effects.push(Effect::HighlightWord { segment: target.segment, word: target.word.clone() });
            let ticket = state.sequencer.ticket(RequestKind::Word, &target.word, Direction::Forward);
            effects.push(Effect::Dispatch(ticket.clone()));
            let tooltip = state.new_tooltip(anchor, TooltipBody::Loading { source: target.word.clone() });
            effects.push(Effect::ShowTooltip(tooltip.clone()));
            Phase::WordSelected(Selection {
                segment: target.segment,
                anchor,
                word: Some(target.word),
                sentence: None,
                tooltip,
                last_request: Some(ticket),
            })
        }

        (_, Event::DoubleClick { anchor, target: Some(target) }) => {
            let generation = state.begin_action(&mut effects);
            debug!("sentence from {} ({})", target.segment, generation);
            effects.push(Effect::HighlightSentence { segment: target.segment, sentence: target.sentence.clone() });
            let ticket = state.sequencer.ticket(RequestKind::Sentence, &target.sentence, Direction::Forward);
            effects.push(Effect::Dispatch(ticket.clone()));
            let tooltip = state.new_tooltip(anchor, TooltipBody::Loading { source: target.sentence.clone() });
            effects.push(Effect::ShowTooltip(tooltip.clone()));
            Phase::SentenceRequested(Selection {
                segment: target.segment,
                anchor,
                word: None,
                sentence: Some(target.sentence),
                tooltip,
                last_request: Some(ticket),
            })
        }

        // Same generation: this continues the word action rather than starting one.
        (Phase::WordSelected(mut sel), Event::SentenceAffordance { sentence })
            if sel.tooltip.offers_sentence() && !sentence.trim().is_empty() =>
        {
            let sentence = sentence.trim().to_string();
            effects.push(Effect::ClearHighlights);
            effects.push(Effect::HighlightSentence { segment: sel.segment, sentence: sentence.clone() });
            let ticket = state.sequencer.ticket(RequestKind::Sentence, &sentence, Direction::Forward);
            effects.push(Effect::Dispatch(ticket.clone()));
            sel.tooltip.body = TooltipBody::Loading { source: sentence.clone() };
            effects.push(Effect::ShowTooltip(sel.tooltip.clone()));
            sel.sentence = Some(sentence);
            sel.last_request = Some(ticket);
            Phase::SentenceRequested(sel)
        }

        (Phase::Settled(mut sel), Event::ReverseLookup { word })
            if matches!(sel.tooltip.body, TooltipBody::Sentence { .. }) && !word.trim().is_empty() =>
        {
            let generation = state.sequencer.begin_action();
            let word = word.trim().to_string();
            let ticket = state.sequencer.ticket(RequestKind::Reverse, &word, Direction::Reverse);
            effects.push(Effect::Dispatch(ticket));
            if let TooltipBody::Sentence { reverse, .. } = &mut sel.tooltip.body {
                *reverse = Some(ReverseLookup { word, generation, result: None });
            }
            effects.push(Effect::ShowTooltip(sel.tooltip.clone()));
            Phase::Settled(sel)
        }

        (phase, Event::Retry) => retry(&mut state, phase, &mut effects),

        (phase, Event::Reply(reply)) => apply_reply(&mut state, phase, reply, &mut effects),

        (phase, Event::VideoPlayed) => {
            if state.resume_armed {
                debug!("playback resumed, cleaning up");
                state.cleanup(&mut effects);
                Phase::Idle
            } else {
                phase
            }
        }

        (_, Event::Dismiss) => {
            state.cleanup(&mut effects);
            Phase::Idle
        }

        (phase, event) => {
            trace!("{:?} ignored while {}", event, phase.name());
            phase
        }
    };

    (state, effects)
}

fn retry(state: &mut InteractionState, phase: Phase, effects: &mut Vec<Effect>) -> Phase {
    let mut sel = match phase {
        Phase::WordSelected(sel) | Phase::Settled(sel) if sel.tooltip.offers_retry() => sel,
        other => return other,
    };
    let Some(last) = sel.last_request.clone() else {
        return rebuild(sel);
    };

    state.sequencer.begin_action();
    let ticket = state.sequencer.ticket(last.kind, &last.request.text, last.request.direction);
    debug!("retrying {:?} '{}' as {}", ticket.kind, ticket.request.text, ticket.generation());
    effects.push(Effect::Dispatch(ticket.clone()));
    sel.tooltip.body = TooltipBody::Loading { source: last.request.text.clone() };
    effects.push(Effect::ShowTooltip(sel.tooltip.clone()));
    sel.last_request = Some(ticket);

    match last.kind {
        RequestKind::Sentence => Phase::SentenceRequested(sel),
        _ => Phase::WordSelected(sel),
    }
}

fn rebuild(sel: Selection) -> Phase {
    if sel.sentence.is_some() {
        Phase::Settled(sel)
    } else {
        Phase::WordSelected(sel)
    }
}

fn apply_reply(state: &mut InteractionState, phase: Phase, reply: TranslationReply, effects: &mut Vec<Effect>) -> Phase {
    let generation = reply.ticket.generation();
    if !state.sequencer.is_current(generation) {
        trace!("stale {:?} reply for {} dropped", reply.ticket.kind, generation);
        return phase;
    }

    match (phase, reply.ticket.kind) {
        (Phase::WordSelected(mut sel), RequestKind::Word) => {
            let word = sel.word.clone().unwrap_or_else(|| reply.ticket.request.text.clone());
            sel.tooltip.body = match reply.outcome {
                TranslationOutcome::Translated(translation) => TooltipBody::Word { word, translation },
                TranslationOutcome::Failed(message) => TooltipBody::Failed { source: word, message },
            };
            effects.push(Effect::ShowTooltip(sel.tooltip.clone()));
            Phase::WordSelected(sel)
        }
        (Phase::SentenceRequested(mut sel), RequestKind::Sentence) => {
            let sentence = sel.sentence.clone().unwrap_or_else(|| reply.ticket.request.text.clone());
            sel.tooltip.body = match reply.outcome {
                TranslationOutcome::Translated(translation) => TooltipBody::Sentence {
                    sentence,
                    words: clickable_words(&translation),
                    translation,
                    reverse: None,
                },
                TranslationOutcome::Failed(message) => TooltipBody::Failed { source: sentence, message },
            };
            effects.push(Effect::ShowTooltip(sel.tooltip.clone()));
            Phase::Settled(sel)
        }
        (Phase::Settled(mut sel), RequestKind::Reverse) => {
            if let TooltipBody::Sentence { reverse: Some(lookup), .. } = &mut sel.tooltip.body {
                if lookup.generation == generation {
                    lookup.result = Some(reply.outcome);
                    effects.push(Effect::ShowTooltip(sel.tooltip.clone()));
                }
            }
            Phase::Settled(sel)
        }
        (phase, kind) => {
            debug!("{:?} reply does not fit {}", kind, phase.name());
            phase
        }
    }
}

/// Owns the interaction state and feeds events through [`transition`].
#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = transition(state, event);
        self.state = next;
        effects
    }

    pub fn phase(&self) -> &Phase {
        &self.state.phase
    }

    pub fn generation(&self) -> Generation {
        self.state.sequencer.current()
    }

    pub fn resume_armed(&self) -> bool {
        self.state.resume_armed
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.state.phase.selection()
    }
}
