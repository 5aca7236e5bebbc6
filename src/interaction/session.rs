use tracing::debug;

use super::controller::{Effect, Event, InteractionController, SentenceTarget, WordTarget};
use super::tooltip::{Tooltip, TooltipSlot};
use crate::config::SentencePolicy;
use crate::document::CaptionSurface;
use crate::highlight::HighlightManager;
use crate::player::VideoPlayer;
use crate::sequencing::{Dispatch, TranslationReply};
use crate::targeting::boundary::resolve_word_at;
use crate::targeting::sentence::{find_sentence_containing, locate_span, sentence_at};
use crate::types::caption_data::{CaptionSegment, Point};

/// One overlay instance on one page. Reads the page to build events, runs
/// them through the controller and applies the effects it returns.
pub struct OverlaySession<D: Dispatch> {
    controller: InteractionController,
    highlights: HighlightManager,
    tooltip: TooltipSlot,
    dispatcher: D,
    policy: SentencePolicy,
}

impl<D: Dispatch> OverlaySession<D> {
    pub fn new(dispatcher: D, policy: SentencePolicy) -> Self {
        Self {
            controller: InteractionController::new(),
            highlights: HighlightManager::new(),
            tooltip: TooltipSlot::default(),
            dispatcher,
            policy,
        }
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn highlights(&self) -> &HighlightManager {
        &self.highlights
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.current()
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn pointer_down<S, P>(&mut self, surface: &mut S, player: &mut P, point: Point)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        let target = surface
            .segment_at(point)
            .and_then(|_| resolve_word_at(&*surface, point))
            .map(|r| WordTarget { segment: r.segment, word: r.word });
        self.handle(Event::PointerDown { anchor: point, target }, surface, player);
    }

    pub fn double_click<S, P>(&mut self, surface: &mut S, player: &mut P, point: Point)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        let target = surface.segment_at(point).and_then(|segment| {
            let caret = surface
                .caret_from_point(point)
                .filter(|c| c.segment == segment)
                .map(|c| c.segment_offset);
            let sentence = sentence_at(&surface.segments(), segment, caret)?;
            Some(SentenceTarget { segment, sentence })
        });
        self.handle(Event::DoubleClick { anchor: point, target }, surface, player);
    }

    /// The tooltip's "translate sentence" affordance.
    pub fn request_sentence<S, P>(&mut self, surface: &mut S, player: &mut P)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        let Some(selection) = self.controller.selection() else {
            return;
        };
        let Some(word) = selection.word.clone() else {
            return;
        };
        let segments = surface.segments();
        let clicked = segments
            .iter()
            .find(|s| s.id == selection.segment)
            .cloned()
            .unwrap_or_else(|| CaptionSegment::new(selection.segment, String::new()));
        let sentence = find_sentence_containing(&word, &segments, &clicked, self.policy);
        self.handle(Event::SentenceAffordance { sentence }, surface, player);
    }

    pub fn reverse_lookup<S, P>(&mut self, surface: &mut S, player: &mut P, word: &str)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        self.handle(Event::ReverseLookup { word: word.to_string() }, surface, player);
    }

    pub fn retry<S, P>(&mut self, surface: &mut S, player: &mut P)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        self.handle(Event::Retry, surface, player);
    }

    /// The player's play event.
    pub fn video_played<S, P>(&mut self, surface: &mut S, player: &mut P)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        self.handle(Event::VideoPlayed, surface, player);
    }

    pub fn dismiss<S, P>(&mut self, surface: &mut S, player: &mut P)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        self.handle(Event::Dismiss, surface, player);
    }

    pub fn deliver<S, P>(&mut self, surface: &mut S, player: &mut P, reply: TranslationReply)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        self.handle(Event::Reply(reply), surface, player);
    }

    fn handle<S, P>(&mut self, event: Event, surface: &mut S, player: &mut P)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        for effect in self.controller.handle(event) {
            self.apply(effect, surface, player);
        }
    }

    fn apply<S, P>(&mut self, effect: Effect, surface: &mut S, player: &mut P)
    where
        S: CaptionSurface + ?Sized,
        P: VideoPlayer + ?Sized,
    {
        match effect {
            Effect::PauseVideo => player.pause(),
            Effect::ClearHighlights => {
                self.highlights.clear_all(surface);
            }
            Effect::HighlightWord { segment, word } => {
                if !self.highlights.apply_word_highlight(surface, segment, &word) {
                    debug!("could not mark '{}' in {}", word, segment);
                }
            }
            Effect::HighlightSentence { segment, sentence } => {
                let spans = locate_span(&sentence, &surface.segments(), Some(segment));
                let marked = self.highlights.apply_sentence_highlight(surface, &spans);
                debug!("sentence marked across {} segment(s)", marked);
            }
            Effect::Dispatch(ticket) => self.dispatcher.dispatch(ticket),
            Effect::ShowTooltip(tooltip) => {
                self.tooltip.show(tooltip);
            }
            Effect::RemoveTooltip => {
                self.tooltip.remove();
            }
        }
    }
}
