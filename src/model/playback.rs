//! Playback-related types and state management

use super::content::Track;

/// Transport state of the single playback session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Paused,
    Playing,
}

/// One time-stamped lyric line
#[derive(Clone, Debug, PartialEq)]
pub struct LyricLine {
    pub time: f64,
    pub text: String,
}

impl LyricLine {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self { time, text: text.into() }
    }
}

/// Parses `[mm:ss.xx] text` lines. Returns `None` when no line carries a timestamp.
pub fn parse_timed_lyrics(raw: &str) -> Option<Vec<LyricLine>> {
    let mut lines: Vec<LyricLine> = raw
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix('[')?;
            let (stamp, text) = rest.split_once(']')?;
            let (minutes, seconds) = stamp.split_once(':')?;
            let minutes: f64 = minutes.trim().parse().ok()?;
            let seconds: f64 = seconds.trim().parse().ok()?;
            Some(LyricLine::new(minutes * 60.0 + seconds, text.trim()))
        })
        .collect();

    if lines.is_empty() {
        return None;
    }
    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    Some(lines)
}

/// Index of the last line whose timestamp is `<= position`.
pub fn active_lyric_index(lines: &[LyricLine], position: f64) -> Option<usize> {
    let after = lines.partition_point(|line| line.time <= position);
    after.checked_sub(1)
}

/// Explicit play queue captured when playback starts
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayQueue {
    pub tracks: Vec<Track>,
}

impl PlayQueue {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn index_of(&self, track_id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }

    /// Circular successor. A track missing from the queue restarts it from the top.
    pub fn next_after(&self, track_id: &str) -> Option<&Track> {
        if self.tracks.is_empty() {
            return None;
        }
        let next = match self.index_of(track_id) {
            Some(idx) => (idx + 1) % self.tracks.len(),
            None => 0,
        };
        self.tracks.get(next)
    }

    /// Circular predecessor. A track missing from the queue jumps to its end.
    pub fn previous_before(&self, track_id: &str) -> Option<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        let prev = match self.index_of(track_id) {
            Some(idx) => (idx + len - 1) % len,
            None => len - 1,
        };
        self.tracks.get(prev)
    }
}

/// Singleton playback session owned by the playback controller
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackSession {
    pub track: Option<Track>,
    pub state: TransportState,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f64,
    pub queue: PlayQueue,
    pub lyrics: Vec<LyricLine>,
    pub active_lyric: Option<usize>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            track: None,
            state: TransportState::Idle,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: 0.5,
            queue: PlayQueue::default(),
            lyrics: Vec::new(),
            active_lyric: None,
        }
    }
}

impl PlaybackSession {
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Loads a track, resetting position and lyric tracking
    pub fn load(&mut self, track: Track, queue: PlayQueue, lyrics: Vec<LyricLine>) {
        self.duration_secs = track.duration_secs as f64;
        self.track = Some(track);
        self.queue = queue;
        self.lyrics = lyrics;
        self.position_secs = 0.0;
        self.active_lyric = active_lyric_index(&self.lyrics, 0.0);
        self.state = TransportState::Playing;
    }

    pub fn replace_lyrics(&mut self, track_id: &str, lyrics: Vec<LyricLine>) -> bool {
        if self.track.as_ref().is_none_or(|t| t.id != track_id) {
            return false;
        }
        self.lyrics = lyrics;
        self.active_lyric = active_lyric_index(&self.lyrics, self.position_secs);
        true
    }

    pub fn clamp_position(&self, position: f64) -> f64 {
        if position.is_nan() {
            return 0.0;
        }
        position.clamp(0.0, self.duration_secs.max(0.0))
    }

    /// Records a new position. Returns `true` when the highlighted lyric line changed.
    pub fn update_position(&mut self, position: f64) -> bool {
        self.position_secs = self.clamp_position(position);
        let index = active_lyric_index(&self.lyrics, self.position_secs);
        if index != self.active_lyric {
            self.active_lyric = index;
            true
        } else {
            false
        }
    }

    /// The renderer's reported duration wins over catalog metadata once known.
    pub fn update_duration(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration_secs = duration;
        }
    }

    pub fn active_lyric_line(&self) -> Option<&LyricLine> {
        self.active_lyric.and_then(|i| self.lyrics.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::{SongRow, Track};

    fn track(id: &str, duration: f64) -> Track {
        Track::from_row(SongRow {
            id: id.to_string(),
            title: id.to_string(),
            duration: Some(duration),
            ..SongRow::default()
        })
    }

    fn lines(times: &[f64]) -> Vec<LyricLine> {
        times.iter().map(|t| LyricLine::new(*t, format!("at {t}"))).collect()
    }

    #[test]
    fn active_lyric_is_last_line_at_or_before_position() {
        let lyrics = lines(&[0.0, 5.0, 10.0]);
        assert_eq!(active_lyric_index(&lyrics, 7.0), Some(1));
        assert_eq!(active_lyric_index(&lyrics, 10.0), Some(2));
        assert_eq!(active_lyric_index(&lyrics, 0.0), Some(0));
        assert_eq!(active_lyric_index(&lyrics, 999.0), Some(2));
    }

    #[test]
    fn no_active_lyric_before_first_line() {
        let lyrics = lines(&[2.0, 5.0]);
        assert_eq!(active_lyric_index(&lyrics, 1.0), None);
        assert_eq!(active_lyric_index(&[], 1.0), None);
    }

    #[test]
    fn position_update_reports_only_index_changes() {
        let mut session = PlaybackSession::default();
        session.load(track("a", 60.0), PlayQueue::default(), lines(&[0.0, 5.0, 10.0]));

        assert!(!session.update_position(1.0));
        assert!(session.update_position(6.0));
        assert!(!session.update_position(7.0));
        assert_eq!(session.active_lyric, Some(1));
    }

    #[test]
    fn position_is_clamped_to_duration() {
        let mut session = PlaybackSession::default();
        session.load(track("a", 30.0), PlayQueue::default(), Vec::new());
        session.update_position(45.0);
        assert_eq!(session.position_secs, 30.0);
        session.update_position(-3.0);
        assert_eq!(session.position_secs, 0.0);
    }

    #[test]
    fn queue_wraps_in_both_directions() {
        let queue = PlayQueue::new(vec![track("A", 1.0), track("B", 1.0), track("C", 1.0)]);
        assert_eq!(queue.next_after("C").map(|t| t.id.as_str()), Some("A"));
        assert_eq!(queue.previous_before("A").map(|t| t.id.as_str()), Some("C"));
        assert_eq!(queue.next_after("A").map(|t| t.id.as_str()), Some("B"));
    }

    #[test]
    fn queue_handles_foreign_track() {
        let queue = PlayQueue::new(vec![track("A", 1.0), track("B", 1.0)]);
        assert_eq!(queue.next_after("Z").map(|t| t.id.as_str()), Some("A"));
        assert_eq!(queue.previous_before("Z").map(|t| t.id.as_str()), Some("B"));
        assert!(PlayQueue::default().next_after("A").is_none());
    }

    #[test]
    fn timed_lyrics_are_parsed_and_sorted() {
        let parsed = parse_timed_lyrics("[00:10.5] second\nplain line\n[00:01] first\n")
            .expect("has timestamps");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], LyricLine::new(1.0, "first"));
        assert_eq!(parsed[1].time, 10.5);
        assert!(parse_timed_lyrics("no timestamps here").is_none());
    }
}
