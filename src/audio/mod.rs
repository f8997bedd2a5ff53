//! Audio output capability driven by the playback controller
//!
//! The controller only keeps logical state; whatever renders sound sits behind
//! [`AudioSink`]. Two sinks ship:
//!
//! - [`ClockAudio`]: advances a wall clock instead of decoding, so the
//!   transport behaves the same with or without an output device
//! - `StreamAudio` (cargo feature `stream-audio`): fetches the track over HTTP,
//!   decodes it with symphonia and plays it through cpal

mod clock;
mod source;
#[cfg(feature = "stream-audio")]
mod stream;

pub use clock::ClockAudio;

use crate::config::AppConfig;

pub trait AudioSink: Send {
    /// Prepares `source` for playback from position zero, paused
    fn load(&mut self, source: &str, duration_secs: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position_secs: f64);
    fn set_volume(&mut self, volume: f64);
    fn position(&self) -> f64;
    /// `None` until the source's length is known
    fn duration(&self) -> Option<f64>;
    fn has_ended(&self) -> bool;
}

/// Streams through the output device when possible, otherwise the clock
pub fn open_sink(config: &AppConfig) -> Box<dyn AudioSink> {
    if !config.audio_output {
        tracing::info!("Audio output disabled, playing on the clock");
        return Box::new(ClockAudio::new());
    }
    open_stream(config).unwrap_or_else(|| Box::new(ClockAudio::new()))
}

#[cfg(feature = "stream-audio")]
fn open_stream(config: &AppConfig) -> Option<Box<dyn AudioSink>> {
    match stream::StreamAudio::open(&config.api_base_url, config.request_timeout()) {
        Ok(sink) => Some(Box::new(sink)),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output, playing on the clock");
            None
        }
    }
}

#[cfg(not(feature = "stream-audio"))]
fn open_stream(_config: &AppConfig) -> Option<Box<dyn AudioSink>> {
    tracing::info!("Built without stream-audio, playing on the clock");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_output_falls_back_to_the_clock() {
        let config = AppConfig {
            audio_output: false,
            ..AppConfig::default()
        };
        let mut sink = open_sink(&config);
        sink.load("https://cdn.example.org/a.mp3", 90.0);
        assert_eq!(sink.duration(), Some(90.0));
        assert_eq!(sink.position(), 0.0);
    }
}
