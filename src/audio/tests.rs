use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{AudioOutput, OutputEvent, OutputEventKind, Player};
use crate::model::{PlayContext, PlayerState, Track};

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Load(String, u64),
    Play,
    Pause,
    Seek(Duration),
    Volume(f32),
    Stop,
}

#[derive(Default)]
struct FakeOutput {
    calls: Mutex<Vec<Call>>,
}

impl FakeOutput {
    fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn last_load(&self) -> Option<(String, u64)> {
        self.calls.lock().unwrap().iter().rev().find_map(|c| match c {
            Call::Load(src, generation) => Some((src.clone(), *generation)),
            _ => None,
        })
    }
}

impl AudioOutput for FakeOutput {
    fn load(&self, source: &str, generation: u64) {
        self.calls.lock().unwrap().push(Call::Load(source.to_string(), generation));
    }
    fn play(&self) {
        self.calls.lock().unwrap().push(Call::Play);
    }
    fn pause(&self) {
        self.calls.lock().unwrap().push(Call::Pause);
    }
    fn seek(&self, position: Duration) {
        self.calls.lock().unwrap().push(Call::Seek(position));
    }
    fn set_volume(&self, volume: f32) {
        self.calls.lock().unwrap().push(Call::Volume(volume));
    }
    fn stop(&self) {
        self.calls.lock().unwrap().push(Call::Stop);
    }
}

fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: Some(format!("Song {}", id)),
        file: Some(format!("https://cdn/{}.mp3", id)),
        duration: Some("3:00".to_string()),
        ..Default::default()
    }
}

fn context(ids: &[&str]) -> PlayContext {
    PlayContext {
        playlist_id: Some("p1".to_string()),
        tracks: ids.iter().map(|id| track(id)).collect(),
    }
}

fn player(retry: Duration) -> (Player, Arc<FakeOutput>) {
    let output = Arc::new(FakeOutput::default());
    let state = PlayerState::new(0.5, Duration::from_secs(3));
    let player = Player::with_rng(output.clone(), state, retry, StdRng::seed_from_u64(7));
    (player, output)
}

#[tokio::test]
async fn play_track_pauses_rewinds_then_loads_and_plays() {
    let (player, output) = player(Duration::from_millis(10));
    player.play_track(track("a"), Some(context(&["a", "b"]))).await;

    let calls = output.take();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], Call::Pause);
    assert_eq!(calls[1], Call::Seek(Duration::ZERO));
    assert!(matches!(&calls[2], Call::Load(src, _) if src == "https://cdn/a.mp3"));
    assert_eq!(calls[3], Call::Play);

    let info = player.snapshot().await;
    assert!(info.is_playing);
    assert_eq!(info.queue.len(), 2);
    assert_eq!(info.current_playlist.as_deref(), Some("p1"));
}

#[tokio::test]
async fn events_from_an_older_load_are_ignored() {
    let (player, output) = player(Duration::from_millis(10));
    player.play_track(track("a"), Some(context(&["a", "b", "c"]))).await;
    let (_, first) = output.last_load().unwrap();
    player.next().await;
    let (src, second) = output.last_load().unwrap();
    assert_eq!(src, "https://cdn/b.mp3");
    assert_ne!(first, second);

    // a late "ended" from the first track must not skip "b"
    output.take();
    let gave_up = player.handle_event(OutputEvent::new(first, OutputEventKind::Ended)).await;
    assert!(gave_up.is_none());
    assert!(output.take().is_empty());
    assert_eq!(player.current_track().await.map(|t| t.id).as_deref(), Some("b"));

    player
        .handle_event(OutputEvent::new(second, OutputEventKind::TimeUpdate(Duration::from_secs(12))))
        .await;
    assert_eq!(player.snapshot().await.elapsed, Duration::from_secs(12));
}

#[tokio::test]
async fn ended_advances_through_the_queue() {
    let (player, output) = player(Duration::from_millis(10));
    player.play_track(track("a"), Some(context(&["a", "b"]))).await;
    let (_, generation) = output.last_load().unwrap();

    player.handle_event(OutputEvent::new(generation, OutputEventKind::Ended)).await;
    assert_eq!(output.last_load().map(|(s, _)| s).as_deref(), Some("https://cdn/b.mp3"));
    assert_eq!(player.snapshot().await.position, 1);
}

#[tokio::test]
async fn error_skips_ahead_after_the_retry_delay() {
    let (player, output) = player(Duration::from_millis(20));
    player.play_track(track("a"), Some(context(&["a", "b", "c"]))).await;
    let (_, generation) = output.last_load().unwrap();
    output.take();

    let gave_up = player
        .handle_event(OutputEvent::new(generation, OutputEventKind::Error("decode".into())))
        .await;
    assert!(gave_up.is_none());
    assert_eq!(output.take(), vec![Call::Pause]);
    assert!(!player.snapshot().await.is_playing);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(player.current_track().await.map(|t| t.id).as_deref(), Some("b"));
    assert!(player.snapshot().await.is_playing);
}

#[tokio::test]
async fn newer_command_cancels_a_pending_retry() {
    let (player, output) = player(Duration::from_millis(50));
    player.play_track(track("a"), Some(context(&["a", "b", "c"]))).await;
    let (_, generation) = output.last_load().unwrap();

    player
        .handle_event(OutputEvent::new(generation, OutputEventKind::Error("decode".into())))
        .await;
    player.play_track(track("c"), Some(context(&["a", "b", "c"]))).await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(player.current_track().await.map(|t| t.id).as_deref(), Some("c"));
}

#[tokio::test]
async fn single_track_failure_is_reported() {
    let (player, output) = player(Duration::from_millis(10));
    player.play_track(track("a"), None).await;
    let (_, generation) = output.last_load().unwrap();

    let gave_up = player
        .handle_event(OutputEvent::new(generation, OutputEventKind::Error("404".into())))
        .await;
    assert_eq!(gave_up.as_deref(), Some("404"));
    assert_eq!(player.snapshot().await.last_error.as_deref(), Some("404"));
}

#[tokio::test]
async fn volume_and_queue_removal_reach_the_output() {
    let (player, output) = player(Duration::from_millis(10));
    player.play_track(track("a"), Some(context(&["a", "b"]))).await;
    output.take();

    assert_eq!(player.change_volume(1.7).await.unwrap(), 1.0);
    assert_eq!(output.take(), vec![Call::Volume(1.0)]);

    player.remove_from_queue(1).await.unwrap();
    assert!(output.take().is_empty());
    assert!(player.remove_from_queue(5).await.is_err());

    player.clear_queue().await;
    assert_eq!(output.take(), vec![Call::Stop]);
    assert!(player.snapshot().await.track.is_none());
}
