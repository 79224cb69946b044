//! Queue and transport state
//!
//! `PlayerState` is a plain state machine: every transport command mutates the
//! state and returns the ordered list of `OutputOp`s the audio output has to
//! apply. It never touches the output itself, so the ordering rules (pause
//! before rewind before load before play) live in one place and can be tested
//! without a sound device.

use std::time::Duration;

use rand::Rng;

use super::content::Track;
use super::types::RepeatMode;
use crate::error::PlaybackError;

/// One step for the audio output, applied in order
#[derive(Clone, Debug, PartialEq)]
pub enum OutputOp {
    Pause,
    /// Back to 0:00 on whatever is loaded
    Rewind,
    Load(Track),
    Play,
    Seek(Duration),
    Volume(f32),
    /// Unload everything
    Stop,
}

/// Where a `play_track` call came from
#[derive(Clone, Debug, Default)]
pub struct PlayContext {
    pub playlist_id: Option<String>,
    pub tracks: Vec<Track>,
}

/// What the player should do after the output reported an error
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// Skip to the next track after the retry delay
    Retry,
    /// Every track in the queue failed in a row; tell the user
    GiveUp(String),
}

/// Snapshot of the playback state for rendering
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub position: usize,
    pub queue: Vec<Track>,
    pub current_playlist: Option<String>,
    pub is_playing: bool,
    pub volume: f32,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub elapsed: Duration,
    pub duration: Duration,
    pub last_error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    queue: Vec<Track>,
    position: usize,
    current: Option<Track>,
    current_playlist: Option<String>,
    playing: bool,
    volume: f32,
    repeat: RepeatMode,
    shuffle: bool,
    elapsed: Duration,
    duration: Duration,
    consecutive_failures: usize,
    last_error: Option<String>,
    restart_threshold: Duration,
}

impl PlayerState {
    pub fn new(volume: f32, restart_threshold: Duration) -> Self {
        Self {
            queue: Vec::new(),
            position: 0,
            current: None,
            current_playlist: None,
            playing: false,
            volume: volume.clamp(0.0, 1.0),
            repeat: RepeatMode::Off,
            shuffle: false,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            consecutive_failures: 0,
            last_error: None,
            restart_threshold,
        }
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        PlaybackInfo {
            track: self.current.clone(),
            position: self.position,
            queue: self.queue.clone(),
            current_playlist: self.current_playlist.clone(),
            is_playing: self.playing,
            volume: self.volume,
            repeat: self.repeat,
            shuffle: self.shuffle,
            elapsed: self.elapsed,
            duration: self.duration,
            last_error: self.last_error.clone(),
        }
    }

    /// Replace the queue with `context`'s tracks (or just `track`) and start `track`.
    /// Position is the index of `track` in the new queue, 0 if it is not there.
    pub fn play_track(&mut self, track: Track, context: Option<PlayContext>) -> Vec<OutputOp> {
        let (playlist_id, tracks) = match context {
            Some(ctx) if !ctx.tracks.is_empty() => (ctx.playlist_id, ctx.tracks),
            Some(ctx) => (ctx.playlist_id, vec![track.clone()]),
            None => (None, vec![track.clone()]),
        };
        self.position = tracks.iter().position(|t| t.id == track.id).unwrap_or(0);
        self.queue = tracks;
        self.current_playlist = playlist_id;
        self.consecutive_failures = 0;
        self.last_error = None;
        self.start(track, true)
    }

    /// Seed the queue without selecting or starting anything
    pub fn set_queue(&mut self, tracks: Vec<Track>) {
        self.queue = tracks;
        self.position = self
            .current
            .as_ref()
            .and_then(|cur| self.queue.iter().position(|t| t.id == cur.id))
            .unwrap_or(0);
    }

    pub fn toggle_play(&mut self) -> Vec<OutputOp> {
        if self.playing {
            self.playing = false;
            return vec![OutputOp::Pause];
        }
        if self.current.is_none() {
            return Vec::new();
        }
        self.playing = true;
        vec![OutputOp::Play]
    }

    pub fn play_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<OutputOp> {
        let len = self.queue.len();
        if len <= 1 {
            return Vec::new();
        }
        let next = if self.shuffle {
            shuffle_pick(rng, len, self.position)
        } else {
            (self.position + 1) % len
        };
        self.start_at(next, true)
    }

    pub fn play_previous<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<OutputOp> {
        let len = self.queue.len();
        if len <= 1 {
            return Vec::new();
        }
        if self.current.is_some() && self.elapsed > self.restart_threshold {
            self.elapsed = Duration::ZERO;
            return vec![OutputOp::Seek(Duration::ZERO)];
        }
        let prev = if self.shuffle {
            shuffle_pick(rng, len, self.position)
        } else {
            (self.position + len - 1) % len
        };
        self.start_at(prev, true)
    }

    pub fn seek_to(&mut self, time: Duration) -> Result<Vec<OutputOp>, PlaybackError> {
        if self.current.is_none() {
            return Err(PlaybackError::NoTrack);
        }
        if time > self.duration {
            return Err(PlaybackError::SeekOutOfRange {
                requested: time.as_secs_f64(),
                duration: self.duration.as_secs_f64(),
            });
        }
        self.elapsed = time;
        Ok(vec![OutputOp::Seek(time)])
    }

    /// Relative seek, clamped to the track bounds
    pub fn seek_by(&mut self, delta_secs: i64) -> Result<Vec<OutputOp>, PlaybackError> {
        let magnitude = Duration::from_secs(delta_secs.unsigned_abs());
        let target = if delta_secs >= 0 {
            (self.elapsed + magnitude).min(self.duration)
        } else {
            self.elapsed.saturating_sub(magnitude)
        };
        self.seek_to(target)
    }

    /// Out-of-range levels are clamped to `[0.0, 1.0]`
    pub fn change_volume(&mut self, level: f32) -> Result<Vec<OutputOp>, PlaybackError> {
        if !level.is_finite() {
            return Err(PlaybackError::InvalidVolume);
        }
        self.volume = level.clamp(0.0, 1.0);
        Ok(vec![OutputOp::Volume(self.volume)])
    }

    pub fn volume_up(&mut self, step: f32) -> Result<Vec<OutputOp>, PlaybackError> {
        self.change_volume(self.volume + step)
    }

    pub fn volume_down(&mut self, step: f32) -> Result<Vec<OutputOp>, PlaybackError> {
        self.change_volume(self.volume - step)
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    pub fn toggle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.next();
        self.repeat
    }

    pub fn add_to_queue(&mut self, track: Track) {
        self.queue.push(track);
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Result<Vec<OutputOp>, PlaybackError> {
        let len = self.queue.len();
        if index >= len {
            return Err(PlaybackError::IndexOutOfRange { index, len });
        }
        self.queue.remove(index);

        if self.queue.is_empty() {
            return Ok(self.reset());
        }
        if index < self.position {
            self.position -= 1;
            return Ok(Vec::new());
        }
        if index > self.position {
            return Ok(Vec::new());
        }

        // Removed the current entry: whatever slid into its slot (or the new last one) takes over
        let replacement = index.min(self.queue.len() - 1);
        if self.current.is_none() {
            self.position = replacement;
            return Ok(Vec::new());
        }
        let was_playing = self.playing;
        Ok(self.start_at(replacement, was_playing))
    }

    pub fn clear_queue(&mut self) -> Vec<OutputOp> {
        self.queue.clear();
        self.reset()
    }

    /// The output finished the current track
    pub fn on_track_ended<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<OutputOp> {
        let len = self.queue.len();
        let restart = self.repeat == RepeatMode::One || (self.repeat == RepeatMode::All && len == 1);
        if restart && self.current.is_some() {
            self.elapsed = Duration::ZERO;
            self.playing = true;
            return vec![OutputOp::Rewind, OutputOp::Play];
        }
        if self.repeat == RepeatMode::All || len > 1 {
            return self.play_next(rng);
        }
        self.playing = false;
        Vec::new()
    }

    /// The output could not play the current track
    pub fn on_error(&mut self, message: String) -> ErrorOutcome {
        self.playing = false;
        self.consecutive_failures += 1;
        if self.queue.len() > 1 && self.consecutive_failures < self.queue.len() {
            return ErrorOutcome::Retry;
        }
        self.consecutive_failures = 0;
        self.last_error = Some(message.clone());
        ErrorOutcome::GiveUp(message)
    }

    /// Audio actually began for the loaded track
    pub fn on_started(&mut self) {
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    pub fn on_time_update(&mut self, elapsed: Duration) {
        self.elapsed = if self.duration.is_zero() {
            elapsed
        } else {
            elapsed.min(self.duration)
        };
    }

    pub fn on_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn start_at(&mut self, index: usize, play: bool) -> Vec<OutputOp> {
        self.position = index;
        let track = self.queue[index].clone();
        self.start(track, play)
    }

    fn start(&mut self, track: Track, play: bool) -> Vec<OutputOp> {
        self.elapsed = Duration::ZERO;
        self.duration = Duration::from_secs(track.duration_secs().unwrap_or(0));
        self.current = Some(track.clone());
        self.playing = play;
        let mut ops = vec![OutputOp::Pause, OutputOp::Rewind, OutputOp::Load(track)];
        if play {
            ops.push(OutputOp::Play);
        }
        ops
    }

    fn reset(&mut self) -> Vec<OutputOp> {
        self.position = 0;
        self.current = None;
        self.current_playlist = None;
        self.playing = false;
        self.elapsed = Duration::ZERO;
        self.duration = Duration::ZERO;
        vec![OutputOp::Stop]
    }
}

/// Uniform over every index in `0..len` except `current`. Needs `len >= 2`.
fn shuffle_pick<R: Rng + ?Sized>(rng: &mut R, len: usize, current: usize) -> usize {
    let r = rng.random_range(0..len - 1);
    if r >= current { r + 1 } else { r }
}

#[cfg(test)]
mod tests;
