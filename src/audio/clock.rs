//! Wall-clock transport used when nothing is streamed

use std::time::Instant;

use super::AudioSink;

/// Wall-clock transport: position grows with elapsed time while playing
#[derive(Debug, Clone)]
pub struct ClockAudio {
    source: Option<String>,
    position_secs: f64,
    last_update: Instant,
    is_playing: bool,
    duration_secs: f64,
    volume: f64,
}

impl Default for ClockAudio {
    fn default() -> Self {
        Self {
            source: None,
            position_secs: 0.0,
            last_update: Instant::now(),
            is_playing: false,
            duration_secs: 0.0,
            volume: 0.5,
        }
    }
}

impl ClockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_position(&self) -> f64 {
        if self.is_playing {
            let elapsed = self.last_update.elapsed().as_secs_f64();
            (self.position_secs + elapsed).min(self.duration_secs)
        } else {
            self.position_secs
        }
    }

    /// Folds elapsed time into the stored position before a state change
    fn settle(&mut self) {
        self.position_secs = self.current_position();
        self.last_update = Instant::now();
    }
}

impl AudioSink for ClockAudio {
    fn load(&mut self, source: &str, duration_secs: f64) {
        tracing::debug!(source, duration_secs, "Loading audio source");
        self.source = Some(source.to_string());
        self.duration_secs = duration_secs.max(0.0);
        self.position_secs = 0.0;
        self.is_playing = false;
        self.last_update = Instant::now();
    }

    fn play(&mut self) {
        if self.source.is_none() {
            return;
        }
        self.settle();
        self.is_playing = true;
        tracing::trace!(position = self.position_secs, volume = self.volume, "Clock playback running");
    }

    fn pause(&mut self) {
        self.settle();
        self.is_playing = false;
    }

    fn seek(&mut self, position_secs: f64) {
        self.position_secs = position_secs.clamp(0.0, self.duration_secs);
        self.last_update = Instant::now();
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn position(&self) -> f64 {
        self.current_position()
    }

    fn duration(&self) -> Option<f64> {
        (self.source.is_some() && self.duration_secs > 0.0).then_some(self.duration_secs)
    }

    fn has_ended(&self) -> bool {
        self.is_playing && self.duration_secs > 0.0 && self.current_position() >= self.duration_secs
    }
}
