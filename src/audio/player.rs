//! Player service: the queue state machine bound to an audio output

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;

use super::{AudioOutput, OutputEvent, OutputEventKind};
use crate::error::PlaybackError;
use crate::model::{ErrorOutcome, OutputOp, PlayContext, PlaybackInfo, PlayerState, RepeatMode, Track};

struct Inner {
    state: PlayerState,
    rng: StdRng,
    /// Bumped by every command that moves playback somewhere new
    intent: u64,
    /// Generation handed to the output with the last load
    loaded: u64,
}

#[derive(Clone)]
pub struct Player {
    inner: Arc<Mutex<Inner>>,
    output: Arc<dyn AudioOutput>,
    retry_delay: Duration,
}

impl Player {
    pub fn new(output: Arc<dyn AudioOutput>, state: PlayerState, retry_delay: Duration) -> Self {
        Self::with_rng(output, state, retry_delay, StdRng::from_os_rng())
    }

    pub fn with_rng(
        output: Arc<dyn AudioOutput>,
        state: PlayerState,
        retry_delay: Duration,
        rng: StdRng,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                rng,
                intent: 0,
                loaded: 0,
            })),
            output,
            retry_delay,
        }
    }

    /// Applies `ops` in order. Called with the state lock held so two
    /// commands can never interleave their output calls.
    fn apply(&self, inner: &mut Inner, ops: Vec<OutputOp>) {
        for op in ops {
            match op {
                OutputOp::Pause => self.output.pause(),
                OutputOp::Rewind => self.output.seek(Duration::ZERO),
                OutputOp::Load(track) => {
                    inner.loaded = inner.intent;
                    tracing::info!(
                        track = %track.name(),
                        artist = %track.artist(),
                        generation = inner.loaded,
                        "Loading track"
                    );
                    self.output.load(track.source(), inner.loaded);
                }
                OutputOp::Play => self.output.play(),
                OutputOp::Seek(position) => self.output.seek(position),
                OutputOp::Volume(volume) => self.output.set_volume(volume),
                OutputOp::Stop => self.output.stop(),
            }
        }
    }

    pub async fn snapshot(&self) -> PlaybackInfo {
        self.inner.lock().await.state.snapshot()
    }

    pub async fn queue_len(&self) -> usize {
        self.inner.lock().await.state.queue().len()
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.inner.lock().await.state.current().cloned()
    }

    pub async fn set_queue(&self, tracks: Vec<Track>) {
        self.inner.lock().await.state.set_queue(tracks);
    }

    pub async fn play_track(&self, track: Track, context: Option<PlayContext>) {
        let mut inner = self.inner.lock().await;
        inner.intent += 1;
        let ops = inner.state.play_track(track, context);
        self.apply(&mut inner, ops);
    }

    pub async fn toggle_play(&self) -> bool {
        let mut inner = self.inner.lock().await;
        inner.intent += 1;
        let ops = inner.state.toggle_play();
        self.apply(&mut inner, ops);
        inner.state.is_playing()
    }

    pub async fn next(&self) {
        let mut inner = self.inner.lock().await;
        inner.intent += 1;
        let Inner { state, rng, .. } = &mut *inner;
        let ops = state.play_next(rng);
        self.apply(&mut inner, ops);
    }

    pub async fn previous(&self) {
        let mut inner = self.inner.lock().await;
        inner.intent += 1;
        let Inner { state, rng, .. } = &mut *inner;
        let ops = state.play_previous(rng);
        self.apply(&mut inner, ops);
    }

    pub async fn seek_to(&self, time: Duration) -> Result<(), PlaybackError> {
        let mut inner = self.inner.lock().await;
        let ops = inner.state.seek_to(time)?;
        self.apply(&mut inner, ops);
        Ok(())
    }

    pub async fn seek_by(&self, delta_secs: i64) -> Result<(), PlaybackError> {
        let mut inner = self.inner.lock().await;
        let ops = inner.state.seek_by(delta_secs)?;
        self.apply(&mut inner, ops);
        Ok(())
    }

    pub async fn change_volume(&self, level: f32) -> Result<f32, PlaybackError> {
        let mut inner = self.inner.lock().await;
        let ops = inner.state.change_volume(level)?;
        self.apply(&mut inner, ops);
        Ok(inner.state.volume())
    }

    pub async fn volume_up(&self, step: f32) -> Result<f32, PlaybackError> {
        let mut inner = self.inner.lock().await;
        let ops = inner.state.volume_up(step)?;
        self.apply(&mut inner, ops);
        Ok(inner.state.volume())
    }

    pub async fn volume_down(&self, step: f32) -> Result<f32, PlaybackError> {
        let mut inner = self.inner.lock().await;
        let ops = inner.state.volume_down(step)?;
        self.apply(&mut inner, ops);
        Ok(inner.state.volume())
    }

    pub async fn toggle_shuffle(&self) -> bool {
        self.inner.lock().await.state.toggle_shuffle()
    }

    pub async fn toggle_repeat(&self) -> RepeatMode {
        self.inner.lock().await.state.toggle_repeat()
    }

    pub async fn add_to_queue(&self, track: Track) {
        self.inner.lock().await.state.add_to_queue(track);
    }

    pub async fn remove_from_queue(&self, index: usize) -> Result<(), PlaybackError> {
        let mut inner = self.inner.lock().await;
        let ops = inner.state.remove_from_queue(index)?;
        if !ops.is_empty() {
            inner.intent += 1;
        }
        self.apply(&mut inner, ops);
        Ok(())
    }

    pub async fn clear_queue(&self) {
        let mut inner = self.inner.lock().await;
        inner.intent += 1;
        let ops = inner.state.clear_queue();
        self.apply(&mut inner, ops);
    }

    pub async fn clear_error(&self) {
        self.inner.lock().await.state.clear_error();
    }

    /// Feeds one output event into the state machine. Events for anything but
    /// the latest load are ignored. Returns a message when playback gave up.
    pub async fn handle_event(&self, event: OutputEvent) -> Option<String> {
        let mut inner = self.inner.lock().await;
        if event.generation != inner.loaded {
            tracing::trace!(
                generation = event.generation,
                loaded = inner.loaded,
                "Ignoring stale output event"
            );
            return None;
        }

        match event.kind {
            OutputEventKind::Started => inner.state.on_started(),
            OutputEventKind::TimeUpdate(elapsed) => inner.state.on_time_update(elapsed),
            OutputEventKind::DurationChange(duration) => inner.state.on_duration(duration),
            OutputEventKind::Ended => {
                tracing::debug!("Track ended");
                inner.intent += 1;
                let Inner { state, rng, .. } = &mut *inner;
                let ops = state.on_track_ended(rng);
                self.apply(&mut inner, ops);
            }
            OutputEventKind::Error(message) => {
                tracing::warn!(error = %message, "Playback error");
                match inner.state.on_error(message) {
                    ErrorOutcome::Retry => {
                        self.output.pause();
                        self.schedule_retry(inner.intent);
                    }
                    ErrorOutcome::GiveUp(message) => {
                        self.output.pause();
                        return Some(message);
                    }
                }
            }
        }
        None
    }

    /// Skips past a failed track after the retry delay, unless the user has
    /// moved on in the meantime
    fn schedule_retry(&self, intent: u64) {
        let player = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(player.retry_delay).await;
            let mut inner = player.inner.lock().await;
            if inner.intent != intent {
                tracing::debug!("Retry superseded by a newer command");
                return;
            }
            inner.intent += 1;
            let Inner { state, rng, .. } = &mut *inner;
            let ops = state.play_next(rng);
            player.apply(&mut inner, ops);
        });
    }
}
