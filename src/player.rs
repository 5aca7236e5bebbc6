use std::time::Duration;

use crate::types::caption_data::SubtitleCue;

/// The playback controls the overlay uses: it only ever pauses. Resuming is
/// the viewer's business and arrives as a play event.
pub trait VideoPlayer {
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
}

/// No player on the page: pausing is a no-op.
impl<P: VideoPlayer> VideoPlayer for Option<P> {
    fn pause(&mut self) {
        if let Some(player) = self {
            player.pause();
        }
    }

    fn is_playing(&self) -> bool {
        self.as_ref().map_or(false, |p| p.is_playing())
    }
}

/// A clock over a cue list standing in for a real video element.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    cues: Vec<SubtitleCue>,
    position: Duration,
    playing: bool,
}

impl SimulatedPlayer {
    pub fn new(cues: Vec<SubtitleCue>) -> Self {
        Self { cues, position: Duration::ZERO, playing: false }
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Duration {
        self.cues.iter().map(|c| c.end).max().unwrap_or_default()
    }

    /// Starts playback. Returns `true` when this is a play event, i.e. the
    /// player was paused before.
    pub fn play(&mut self) -> bool {
        if self.playing {
            return false;
        }
        if self.position >= self.duration() {
            self.position = Duration::ZERO;
        }
        self.playing = true;
        true
    }

    /// Space-bar behaviour. Returns `true` on a play event.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    pub fn advance(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }
        self.position += elapsed;
        let end = self.duration();
        if self.position >= end {
            self.position = end;
            self.playing = false;
        }
    }

    pub fn seek(&mut self, position: Duration) {
        self.position = position.min(self.duration());
    }

    pub fn active_lines(&self) -> Vec<String> {
        self.cues
            .iter()
            .filter(|c| c.start <= self.position && self.position < c.end)
            .flat_map(|c| c.lines.iter().cloned())
            .collect()
    }
}

impl VideoPlayer for SimulatedPlayer {
    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
