//! Playback control methods

use crate::model::{PlayQueue, Track, TransportState, parse_timed_lyrics, sample_lyrics};

use super::AppController;

/// Seconds skipped by a relative seek
pub const SEEK_STEP_SECS: f64 = 10.0;
/// Volume change per key press
pub const VOLUME_STEP: f64 = 0.05;

impl AppController {
    /// Starts `track` with `queue` as the collection next/previous walk through.
    /// Listing rows carry no lyrics; those are fetched with the full song record.
    pub async fn play_track(&self, track: Track, queue: Vec<Track>) {
        let fetch_lyrics = track.lyrics.is_none().then(|| track.id.clone());
        let lyrics = track
            .lyrics
            .as_deref()
            .and_then(parse_timed_lyrics)
            .unwrap_or_else(sample_lyrics);
        let source = if track.url.is_empty() {
            tracing::debug!(track_id = %track.id, "Track has no stream URL, playing on the clock");
            format!("acidwave:track:{}", track.id)
        } else {
            track.url.clone()
        };
        let duration = track.duration_secs as f64;
        tracing::info!(
            track_id = %track.id,
            title = %track.title,
            queue_len = queue.len(),
            "Starting playback"
        );

        let (volume, using_sample) = {
            let model = self.model.lock().await;
            model.load_track(track, PlayQueue::new(queue), lyrics).await;
            (model.get_playback().await.volume, model.using_sample().await)
        };

        {
            let mut audio = self.audio.lock().await;
            audio.load(&source, duration);
            audio.set_volume(volume);
            audio.play();
        }

        if let Some(track_id) = fetch_lyrics.filter(|_| !using_sample) {
            let controller = self.clone();
            tokio::spawn(async move {
                controller.fetch_lyrics(&track_id).await;
            });
        }
    }

    /// Applies the song's timed lyrics unless playback moved on meanwhile
    pub(crate) async fn fetch_lyrics(&self, track_id: &str) {
        let song = match self.api.get_song(track_id).await {
            Ok(song) => song,
            Err(e) => {
                tracing::debug!(track_id, error = %e, "Could not fetch song lyrics");
                return;
            }
        };
        let Some(lyrics) = song.lyrics.as_deref().and_then(parse_timed_lyrics) else {
            return;
        };
        if self.model.lock().await.replace_lyrics(track_id, lyrics).await {
            tracing::debug!(track_id, "Loaded timed lyrics");
        }
    }

    pub async fn pause(&self) {
        self.audio.lock().await.pause();
        self.model.lock().await.set_transport(TransportState::Paused).await;
    }

    pub async fn resume(&self) {
        let playback = self.model.lock().await.get_playback().await;
        if playback.track.is_none() {
            return;
        }
        self.audio.lock().await.play();
        self.model.lock().await.set_transport(TransportState::Playing).await;
    }

    pub async fn toggle_playback(&self) {
        let playback = self.model.lock().await.get_playback().await;
        match playback.state {
            TransportState::Playing => self.pause().await,
            TransportState::Paused => self.resume().await,
            TransportState::Idle => {
                tracing::debug!("Nothing loaded, playing the selected track");
                self.play_selected().await;
            }
        }
    }

    /// Circular step through the play queue captured when playback started
    pub async fn next_track(&self) {
        let playback = self.model.lock().await.get_playback().await;
        let Some(current) = playback.track else {
            return;
        };
        let Some(next) = playback.queue.next_after(&current.id).cloned() else {
            return;
        };
        tracing::debug!(from = %current.id, to = %next.id, "Skipping to next track");
        self.play_track(next, playback.queue.tracks).await;
    }

    pub async fn previous_track(&self) {
        let playback = self.model.lock().await.get_playback().await;
        let Some(current) = playback.track else {
            return;
        };
        let Some(previous) = playback.queue.previous_before(&current.id).cloned() else {
            return;
        };
        tracing::debug!(from = %current.id, to = %previous.id, "Skipping to previous track");
        self.play_track(previous, playback.queue.tracks).await;
    }

    /// Seeks to `position`, clamped to `[0, duration]`
    pub async fn seek(&self, position: f64) {
        let model = self.model.lock().await;
        let playback = model.get_playback().await;
        if playback.track.is_none() {
            return;
        }
        let position = playback.clamp_position(position);
        self.audio.lock().await.seek(position);
        model.update_position(position).await;
    }

    pub async fn seek_relative(&self, delta: f64) {
        let current = self.model.lock().await.get_playback().await.position_secs;
        self.seek(current + delta).await;
    }

    /// Sets the volume, clamped to `[0, 1]`
    pub async fn set_volume(&self, volume: f64) {
        let volume = self.model.lock().await.set_volume(volume).await;
        self.audio.lock().await.set_volume(volume);
    }

    pub async fn change_volume(&self, delta: f64) {
        let current = self.model.lock().await.get_playback().await.volume;
        self.set_volume(current + delta).await;
    }

    /// Syncs the session with the audio sink; called once per frame.
    /// Advances to the next queued track when the current one ends.
    pub async fn tick(&self) {
        let (position, duration, ended) = {
            let audio = self.audio.lock().await;
            (audio.position(), audio.duration(), audio.has_ended())
        };

        {
            let model = self.model.lock().await;
            if model.get_playback().await.track.is_none() {
                return;
            }
            if let Some(duration) = duration {
                model.update_duration(duration).await;
            }
            if model.update_position(position).await {
                tracing::trace!(position, "Active lyric line changed");
            }
        }

        if ended {
            tracing::debug!("Track ended, advancing");
            self.next_track().await;
        }
    }
}
