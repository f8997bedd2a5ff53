//! Streamed playback through the default output device
//!
//! A decoder thread fetches the whole track, decodes it with symphonia and
//! pushes interleaved PCM into a shared buffer; a cpal callback on the output
//! thread drains it. The two threads and the sink only share atomics and the
//! sample buffer. A wall clock runs alongside and takes over when a source is
//! not streamable or its fetch or decode fails.

use std::collections::VecDeque;
use std::io::{Cursor, ErrorKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

use super::source::{extension_hint, remix, resample_linear, stream_url};
use super::{AudioSink, ClockAudio};
use crate::errors::AudioError;

/// Decoded samples kept ahead of the device
const BUFFER_SAMPLES: usize = 1 << 16;
const DEVICE_WAIT: Duration = Duration::from_secs(2);

/// State shared by the sink, the decoder thread and the output callback
struct Shared {
    samples: Mutex<VecDeque<f32>>,
    playing: AtomicBool,
    /// `f32` bits
    volume: AtomicU32,
    frames_played: AtomicU64,
    duration_ms: AtomicU64,
    /// Bumped on every load; stale decoder output is dropped
    generation: AtomicU64,
    /// Decoder reached the end of the stream
    drained: AtomicBool,
    /// Fetch or decode failed; the clock takes over
    failed: AtomicBool,
    shutdown: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(BUFFER_SAMPLES)),
            playing: AtomicBool::new(false),
            volume: AtomicU32::new(0.5f32.to_bits()),
            frames_played: AtomicU64::new(0),
            duration_ms: AtomicU64::new(0),
            generation: AtomicU64::new(0),
            drained: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        }
    }

    fn reset(&self) {
        self.samples.lock().clear();
        self.frames_played.store(0, Ordering::Relaxed);
        self.duration_ms.store(0, Ordering::Relaxed);
        self.drained.store(false, Ordering::Relaxed);
        self.failed.store(false, Ordering::Relaxed);
    }
}

#[derive(Clone, Copy, Debug)]
struct OutputFormat {
    rate: u32,
    channels: u16,
}

enum DecoderCommand {
    Load { url: String, generation: u64 },
    Seek(f64),
    Stop,
}

pub struct StreamAudio {
    shared: Arc<Shared>,
    commands: Sender<DecoderCommand>,
    output: OutputFormat,
    api_base_url: String,
    clock: ClockAudio,
    streaming: bool,
}

impl StreamAudio {
    /// Opens the default output device and starts the decoder thread
    pub fn open(api_base_url: &str, fetch_timeout: Duration) -> Result<Self, AudioError> {
        let shared = Arc::new(Shared::new());

        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let output_shared = shared.clone();
        thread::Builder::new()
            .name("acidwave-output".to_string())
            .spawn(move || run_output(output_shared, ready_tx))
            .map_err(|e| AudioError::Output(e.to_string()))?;
        let output = ready_rx.recv_timeout(DEVICE_WAIT).map_err(|_| AudioError::NoDevice)??;

        let (commands, command_rx) = crossbeam_channel::unbounded();
        let decoder_shared = shared.clone();
        thread::Builder::new()
            .name("acidwave-decoder".to_string())
            .spawn(move || run_decoder(command_rx, decoder_shared, output, fetch_timeout))
            .map_err(|e| AudioError::Output(e.to_string()))?;

        tracing::info!(rate = output.rate, channels = output.channels, "Audio output ready");
        Ok(Self {
            shared,
            commands,
            output,
            api_base_url: api_base_url.to_string(),
            clock: ClockAudio::new(),
            streaming: false,
        })
    }

    fn on_clock(&self) -> bool {
        !self.streaming || self.shared.failed.load(Ordering::Relaxed)
    }

    fn send(&self, command: DecoderCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Decoder thread is gone");
        }
    }
}

impl AudioSink for StreamAudio {
    fn load(&mut self, source: &str, duration_secs: f64) {
        self.clock.load(source, duration_secs);
        self.shared.playing.store(false, Ordering::Relaxed);
        self.shared.reset();
        let generation = self.shared.generation.fetch_add(1, Ordering::Relaxed) + 1;

        match stream_url(&self.api_base_url, source) {
            Some(url) => {
                tracing::debug!(url = %url, "Streaming track");
                self.streaming = true;
                self.send(DecoderCommand::Load { url, generation });
            }
            None => {
                self.streaming = false;
                self.send(DecoderCommand::Stop);
            }
        }
    }

    fn play(&mut self) {
        self.clock.play();
        if self.streaming {
            self.shared.playing.store(true, Ordering::Relaxed);
        }
    }

    fn pause(&mut self) {
        self.clock.pause();
        self.shared.playing.store(false, Ordering::Relaxed);
    }

    fn seek(&mut self, position_secs: f64) {
        self.clock.seek(position_secs);
        if self.streaming {
            let position = self.clock.position();
            let frames = (position * f64::from(self.output.rate)) as u64;
            self.shared.frames_played.store(frames, Ordering::Relaxed);
            self.send(DecoderCommand::Seek(position));
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.clock.set_volume(volume);
        let volume = volume.clamp(0.0, 1.0) as f32;
        self.shared.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn position(&self) -> f64 {
        if self.on_clock() {
            return self.clock.position();
        }
        let frames = self.shared.frames_played.load(Ordering::Relaxed);
        frames as f64 / f64::from(self.output.rate.max(1))
    }

    fn duration(&self) -> Option<f64> {
        let decoded_ms = self.shared.duration_ms.load(Ordering::Relaxed);
        if self.on_clock() || decoded_ms == 0 {
            return self.clock.duration();
        }
        Some(decoded_ms as f64 / 1000.0)
    }

    fn has_ended(&self) -> bool {
        if self.on_clock() {
            return self.clock.has_ended();
        }
        self.shared.playing.load(Ordering::Relaxed)
            && self.shared.drained.load(Ordering::Relaxed)
            && self.shared.samples.lock().is_empty()
    }
}

impl Drop for StreamAudio {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        let _ = self.commands.send(DecoderCommand::Stop);
    }
}

// ============================================================================
// Output thread
// ============================================================================

/// Owns the cpal stream, which is not `Send`, until shutdown
fn run_output(shared: Arc<Shared>, ready: Sender<Result<OutputFormat, AudioError>>) {
    let stream = match build_output(&shared) {
        Ok((stream, format)) => {
            let _ = ready.send(Ok(format));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while !shared.shutdown.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(100));
    }
    drop(stream);
    tracing::debug!("Audio output stopped");
}

fn build_output(shared: &Arc<Shared>) -> Result<(cpal::Stream, OutputFormat), AudioError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioError::Output(e.to_string()))?
        .config();
    let format = OutputFormat {
        rate: config.sample_rate.0,
        channels: config.channels,
    };

    let callback_shared = shared.clone();
    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                fill(&callback_shared, data, format.channels);
            },
            |e| tracing::warn!(error = %e, "Audio output error"),
            None,
        )
        .map_err(|e| AudioError::Output(e.to_string()))?;
    stream.play().map_err(|e| AudioError::Output(e.to_string()))?;
    Ok((stream, format))
}

/// Device callback: buffered samples at the current volume, silence otherwise
fn fill(shared: &Shared, data: &mut [f32], channels: u16) {
    if !shared.playing.load(Ordering::Relaxed) {
        data.fill(0.0);
        return;
    }
    let volume = f32::from_bits(shared.volume.load(Ordering::Relaxed));

    let read = {
        let mut samples = shared.samples.lock();
        let read = data.len().min(samples.len());
        for (out, sample) in data.iter_mut().zip(samples.drain(..read)) {
            *out = sample * volume;
        }
        read
    };
    data[read..].fill(0.0);

    let frames = read / usize::from(channels.max(1));
    shared.frames_played.fetch_add(frames as u64, Ordering::Relaxed);
}

// ============================================================================
// Decoder thread
// ============================================================================

struct DecodedStream {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    generation: u64,
    buffer: Option<SampleBuffer<f32>>,
}

fn run_decoder(
    commands: Receiver<DecoderCommand>,
    shared: Arc<Shared>,
    output: OutputFormat,
    fetch_timeout: Duration,
) {
    let client = match reqwest::blocking::Client::builder().timeout(fetch_timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Could not build the stream client");
            shared.failed.store(true, Ordering::Relaxed);
            return;
        }
    };
    let mut current: Option<DecodedStream> = None;

    loop {
        let command = if current.is_some() {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => return,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => return,
            }
        };

        match command {
            Some(DecoderCommand::Load { url, generation }) => {
                current = match open_stream(&client, &url, generation) {
                    Ok((stream, duration)) => {
                        if let Some(secs) = duration {
                            shared.duration_ms.store((secs * 1000.0) as u64, Ordering::Relaxed);
                        }
                        tracing::debug!(url = %url, duration = ?duration, "Stream opened");
                        Some(stream)
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "Stream unavailable, playing on the clock");
                        if shared.generation.load(Ordering::Relaxed) == generation {
                            shared.failed.store(true, Ordering::Relaxed);
                        }
                        None
                    }
                };
            }
            Some(DecoderCommand::Seek(position)) => {
                if let Some(stream) = current.as_mut() {
                    match stream.seek(position) {
                        Ok(()) => {
                            shared.samples.lock().clear();
                            shared.drained.store(false, Ordering::Relaxed);
                        }
                        Err(e) => tracing::warn!(position, error = %e, "Seek failed"),
                    }
                }
            }
            Some(DecoderCommand::Stop) => current = None,
            None => {}
        }

        let Some(stream) = current.as_mut() else {
            continue;
        };
        if stream.generation != shared.generation.load(Ordering::Relaxed) {
            current = None;
            continue;
        }
        if !shared.playing.load(Ordering::Relaxed) || shared.samples.lock().len() >= BUFFER_SAMPLES {
            thread::sleep(Duration::from_millis(5));
            continue;
        }

        match stream.next_samples(output) {
            Ok(Some(samples)) => shared.samples.lock().extend(samples),
            Ok(None) => {
                shared.drained.store(true, Ordering::Relaxed);
                current = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Decoding stopped, playing on the clock");
                shared.failed.store(true, Ordering::Relaxed);
                current = None;
            }
        }
    }
}

/// Fetches `url` and probes it; also returns the length when the container knows it
fn open_stream(
    client: &reqwest::blocking::Client,
    url: &str,
    generation: u64,
) -> Result<(DecodedStream, Option<f64>), AudioError> {
    let fetch_error = |e: reqwest::Error| AudioError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };
    let bytes = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(fetch_error)?;

    let source = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension_hint(url) {
        hint.with_extension(ext);
    }
    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };
    let probed = symphonia::default::get_probe()
        .format(&hint, source, &format_opts, &MetadataOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let reader = probed.format;
    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track".to_string()))?;
    let track_id = track.id;
    let duration = match (track.codec_params.n_frames, track.codec_params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / f64::from(rate)),
        _ => None,
    };
    let decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let stream = DecodedStream {
        reader,
        decoder,
        track_id,
        generation,
        buffer: None,
    };
    Ok((stream, duration))
}

impl DecodedStream {
    /// Next packet shaped for the device; `None` at end of stream
    fn next_samples(&mut self, output: OutputFormat) -> Result<Option<Vec<f32>>, AudioError> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(e) => return Err(AudioError::Decode(e.to_string())),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::trace!(error = e, "Skipping undecodable packet");
                    continue;
                }
                Err(e) => return Err(AudioError::Decode(e.to_string())),
            };

            let spec = *decoded.spec();
            let capacity = decoded.capacity();
            if self.buffer.as_ref().is_none_or(|b| b.capacity() < capacity) {
                self.buffer = Some(SampleBuffer::new(capacity as u64, spec));
            }
            let Some(buffer) = self.buffer.as_mut() else {
                continue;
            };
            buffer.copy_interleaved_ref(decoded);

            let channels = usize::from(output.channels);
            let mixed = remix(buffer.samples(), spec.channels.count(), channels);
            return Ok(Some(resample_linear(&mixed, channels, spec.rate, output.rate)));
        }
    }

    fn seek(&mut self, position_secs: f64) -> Result<(), AudioError> {
        let position = position_secs.max(0.0);
        let time = Time::new(position.trunc() as u64, position.fract());
        self.reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time,
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        self.decoder.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_with(samples: &[f32]) -> Shared {
        let shared = Shared::new();
        shared.samples.lock().extend(samples.iter().copied());
        shared
    }

    #[test]
    fn paused_output_is_silent_and_keeps_the_buffer() {
        let shared = shared_with(&[0.8; 4]);
        let mut data = [1.0f32; 4];
        fill(&shared, &mut data, 2);
        assert_eq!(data, [0.0; 4]);
        assert_eq!(shared.samples.lock().len(), 4);
        assert_eq!(shared.frames_played.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn playing_output_applies_volume_and_counts_frames() {
        let shared = shared_with(&[1.0, 1.0, 0.5, 0.5]);
        shared.playing.store(true, Ordering::Relaxed);
        shared.volume.store(0.5f32.to_bits(), Ordering::Relaxed);

        let mut data = [9.0f32; 6];
        fill(&shared, &mut data, 2);
        assert_eq!(data, [0.5, 0.5, 0.25, 0.25, 0.0, 0.0]);
        assert_eq!(shared.frames_played.load(Ordering::Relaxed), 2);
        assert!(shared.samples.lock().is_empty());
    }

    #[test]
    fn reset_clears_end_of_stream() {
        let shared = shared_with(&[0.1; 8]);
        shared.drained.store(true, Ordering::Relaxed);
        shared.failed.store(true, Ordering::Relaxed);
        shared.reset();
        assert!(!shared.drained.load(Ordering::Relaxed));
        assert!(!shared.failed.load(Ordering::Relaxed));
        assert!(shared.samples.lock().is_empty());
    }
}
