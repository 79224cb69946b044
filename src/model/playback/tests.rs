use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn track(id: &str, duration: &str) -> Track {
    Track {
        id: id.to_string(),
        name: Some(id.to_uppercase()),
        duration: Some(duration.to_string()),
        file: Some(format!("https://cdn.test/{}.mp3", id)),
        ..Default::default()
    }
}

fn abc() -> Vec<Track> {
    vec![track("a", "3:00"), track("b", "2:30"), track("c", "4:10")]
}

fn state() -> PlayerState {
    PlayerState::new(0.5, Duration::from_secs(3))
}

fn playing_abc(start: &str) -> PlayerState {
    let mut s = state();
    let tracks = abc();
    let first = tracks.iter().find(|t| t.id == start).cloned().unwrap();
    s.play_track(first, Some(PlayContext { playlist_id: Some("pl".into()), tracks }));
    s
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn play_track_pauses_rewinds_loads_then_plays() {
    let mut s = state();
    let ops = s.play_track(track("a", "3:00"), None);
    assert_eq!(
        ops,
        vec![
            OutputOp::Pause,
            OutputOp::Rewind,
            OutputOp::Load(track("a", "3:00")),
            OutputOp::Play
        ]
    );
    assert_eq!(s.queue().len(), 1);
    assert_eq!(s.position(), 0);
    assert!(s.is_playing());
    assert_eq!(s.duration(), Duration::from_secs(180));
}

#[test]
fn play_track_positions_on_the_track_within_its_context() {
    let s = playing_abc("b");
    assert_eq!(s.position(), 1);
    assert_eq!(s.current().map(|t| t.id.as_str()), Some("b"));
    assert_eq!(s.snapshot().current_playlist.as_deref(), Some("pl"));
}

#[test]
fn play_track_missing_from_context_starts_at_zero() {
    let mut s = state();
    s.play_track(track("z", "1:00"), Some(PlayContext { playlist_id: None, tracks: abc() }));
    assert_eq!(s.position(), 0);
    assert_eq!(s.queue().len(), 3);
}

#[test]
fn play_track_resets_elapsed() {
    let mut s = playing_abc("a");
    s.on_time_update(Duration::from_secs(42));
    s.play_track(track("b", "2:30"), None);
    assert_eq!(s.elapsed(), Duration::ZERO);
}

#[test]
fn toggle_play_is_a_noop_without_a_track() {
    let mut s = state();
    assert!(s.toggle_play().is_empty());
    assert!(!s.is_playing());

    s.set_queue(abc());
    assert!(s.toggle_play().is_empty());
}

#[test]
fn toggle_play_flips_between_pause_and_play() {
    let mut s = playing_abc("a");
    assert_eq!(s.toggle_play(), vec![OutputOp::Pause]);
    assert!(!s.is_playing());
    assert_eq!(s.toggle_play(), vec![OutputOp::Play]);
    assert!(s.is_playing());
}

#[test]
fn next_walks_the_queue_and_wraps() {
    let mut s = playing_abc("a");
    let mut r = rng();
    s.play_next(&mut r);
    assert_eq!(s.position(), 1);
    assert_eq!(s.current().map(|t| t.id.as_str()), Some("b"));
    s.play_next(&mut r);
    assert_eq!(s.position(), 2);
    s.play_next(&mut r);
    assert_eq!(s.position(), 0);
    assert_eq!(s.current().map(|t| t.id.as_str()), Some("a"));
}

#[test]
fn n_nexts_return_to_the_start() {
    let mut r = rng();
    for len in 1..=6 {
        let tracks: Vec<Track> = (0..len).map(|i| track(&format!("t{}", i), "1:00")).collect();
        for start in 0..len {
            let mut s = state();
            s.play_track(
                tracks[start].clone(),
                Some(PlayContext { playlist_id: None, tracks: tracks.clone() }),
            );
            for _ in 0..len {
                s.play_next(&mut r);
            }
            assert_eq!(s.position(), start, "len {} start {}", len, start);
        }
    }
}

#[test]
fn previous_wraps_to_the_end() {
    let mut s = playing_abc("a");
    s.play_previous(&mut rng());
    assert_eq!(s.position(), 2);
}

#[test]
fn next_and_previous_ignore_single_entry_queues() {
    let mut s = state();
    s.play_track(track("a", "3:00"), None);
    s.on_time_update(Duration::from_secs(10));
    assert!(s.play_next(&mut rng()).is_empty());
    assert!(s.play_previous(&mut rng()).is_empty());
    assert_eq!(s.elapsed(), Duration::from_secs(10));
}

#[test]
fn previous_after_threshold_restarts_current_track() {
    let mut s = playing_abc("b");
    s.on_time_update(Duration::from_secs(4));
    let ops = s.play_previous(&mut rng());
    assert_eq!(ops, vec![OutputOp::Seek(Duration::ZERO)]);
    assert_eq!(s.position(), 1);
    assert_eq!(s.elapsed(), Duration::ZERO);
}

#[test]
fn previous_at_threshold_moves_back() {
    let mut s = playing_abc("b");
    s.on_time_update(Duration::from_secs(3));
    s.play_previous(&mut rng());
    assert_eq!(s.position(), 0);
}

#[test]
fn shuffle_never_repeats_the_current_position() {
    let mut r = rng();
    let mut s = playing_abc("a");
    s.toggle_shuffle();
    for _ in 0..200 {
        let before = s.position();
        s.play_next(&mut r);
        assert_ne!(s.position(), before);
        assert!(s.position() < 3);
    }
}

#[test]
fn shuffle_on_two_tracks_always_alternates() {
    let mut r = rng();
    let mut s = state();
    let tracks = vec![track("a", "1:00"), track("b", "1:00")];
    s.play_track(tracks[0].clone(), Some(PlayContext { playlist_id: None, tracks }));
    s.toggle_shuffle();
    for i in 0..20 {
        s.play_next(&mut r);
        assert_eq!(s.position(), (i + 1) % 2);
    }
}

#[test]
fn shuffle_reaches_every_other_position() {
    let mut r = rng();
    let mut seen = [0usize; 4];
    for _ in 0..400 {
        seen[shuffle_pick(&mut r, 4, 1)] += 1;
    }
    assert_eq!(seen[1], 0);
    assert!(seen[0] > 0 && seen[2] > 0 && seen[3] > 0);
}

#[test]
fn shuffle_does_not_reorder_the_queue() {
    let mut s = playing_abc("a");
    s.toggle_shuffle();
    let ids: Vec<&str> = s.queue().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn toggle_repeat_cycles_off_all_one() {
    let mut s = state();
    assert_eq!(s.repeat(), RepeatMode::Off);
    assert_eq!(s.toggle_repeat(), RepeatMode::All);
    assert_eq!(s.toggle_repeat(), RepeatMode::One);
    assert_eq!(s.toggle_repeat(), RepeatMode::Off);
}

#[test]
fn seek_within_bounds() {
    let mut s = playing_abc("a");
    assert_eq!(
        s.seek_to(Duration::from_secs(180)),
        Ok(vec![OutputOp::Seek(Duration::from_secs(180))])
    );
    assert_eq!(s.elapsed(), Duration::from_secs(180));
    assert!(matches!(
        s.seek_to(Duration::from_secs(181)),
        Err(PlaybackError::SeekOutOfRange { .. })
    ));
    assert_eq!(s.elapsed(), Duration::from_secs(180));
}

#[test]
fn seek_without_a_track_is_rejected() {
    let mut s = state();
    assert_eq!(s.seek_to(Duration::ZERO), Err(PlaybackError::NoTrack));
}

#[test]
fn seek_by_clamps_to_track_bounds() {
    let mut s = playing_abc("a");
    s.on_time_update(Duration::from_secs(2));
    s.seek_by(-5).unwrap();
    assert_eq!(s.elapsed(), Duration::ZERO);
    s.seek_by(500).unwrap();
    assert_eq!(s.elapsed(), Duration::from_secs(180));
}

#[test]
fn duration_reported_by_output_wins() {
    let mut s = playing_abc("a");
    s.on_duration(Duration::from_secs(200));
    assert!(s.seek_to(Duration::from_secs(190)).is_ok());
}

#[test]
fn volume_is_clamped() {
    let mut s = state();
    assert_eq!(s.change_volume(1.5), Ok(vec![OutputOp::Volume(1.0)]));
    assert_eq!(s.volume(), 1.0);
    s.change_volume(-0.2).unwrap();
    assert_eq!(s.volume(), 0.0);
    assert_eq!(s.change_volume(f32::NAN), Err(PlaybackError::InvalidVolume));
    assert_eq!(s.volume(), 0.0);
}

#[test]
fn volume_steps() {
    let mut s = state();
    s.volume_up(0.25).unwrap();
    assert!((s.volume() - 0.75).abs() < f32::EPSILON);
    s.volume_down(1.0).unwrap();
    assert_eq!(s.volume(), 0.0);
}

#[test]
fn removing_the_only_track_stops_everything() {
    let mut s = state();
    s.play_track(track("a", "3:00"), None);
    let ops = s.remove_from_queue(0).unwrap();
    assert_eq!(ops, vec![OutputOp::Stop]);
    assert!(s.current().is_none());
    assert!(!s.is_playing());
    assert!(s.queue().is_empty());
    assert_eq!(s.position(), 0);
}

#[test]
fn removing_before_current_shifts_position_back() {
    let mut s = playing_abc("c");
    let ops = s.remove_from_queue(0).unwrap();
    assert!(ops.is_empty());
    assert_eq!(s.position(), 1);
    assert_eq!(s.queue()[s.position()].id, "c");
    assert_eq!(s.current().map(|t| t.id.as_str()), Some("c"));
}

#[test]
fn removing_after_current_leaves_position() {
    let mut s = playing_abc("a");
    assert!(s.remove_from_queue(2).unwrap().is_empty());
    assert_eq!(s.position(), 0);
    assert_eq!(s.queue().len(), 2);
}

#[test]
fn removing_current_selects_the_track_that_slid_in() {
    let mut s = playing_abc("b");
    let ops = s.remove_from_queue(1).unwrap();
    assert_eq!(s.position(), 1);
    assert_eq!(s.current().map(|t| t.id.as_str()), Some("c"));
    assert_eq!(ops.last(), Some(&OutputOp::Play));
    assert!(s.is_playing());
}

#[test]
fn removing_current_last_entry_selects_new_last() {
    let mut s = playing_abc("c");
    s.toggle_play();
    let ops = s.remove_from_queue(2).unwrap();
    assert_eq!(s.position(), 1);
    assert_eq!(s.current().map(|t| t.id.as_str()), Some("b"));
    assert!(!ops.contains(&OutputOp::Play));
    assert!(!s.is_playing());
}

#[test]
fn removing_out_of_range_is_an_error() {
    let mut s = playing_abc("a");
    assert_eq!(
        s.remove_from_queue(3),
        Err(PlaybackError::IndexOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(s.queue().len(), 3);
}

#[test]
fn add_to_queue_appends_without_touching_playback() {
    let mut s = playing_abc("b");
    s.add_to_queue(track("d", "1:00"));
    assert_eq!(s.queue().len(), 4);
    assert_eq!(s.position(), 1);
    assert_eq!(s.queue()[3].id, "d");
}

#[test]
fn clear_queue_stops() {
    let mut s = playing_abc("b");
    assert_eq!(s.clear_queue(), vec![OutputOp::Stop]);
    assert!(s.queue().is_empty());
    assert!(s.current().is_none());
    assert!(!s.is_playing());
}

#[test]
fn set_queue_does_not_select_a_track() {
    let mut s = state();
    s.set_queue(abc());
    assert!(s.current().is_none());
    assert!(!s.is_playing());
    assert_eq!(s.position(), 0);
}

#[test]
fn ended_with_repeat_one_restarts_the_same_track() {
    let mut s = playing_abc("b");
    s.toggle_repeat();
    s.toggle_repeat();
    s.on_time_update(Duration::from_secs(150));
    let ops = s.on_track_ended(&mut rng());
    assert_eq!(ops, vec![OutputOp::Rewind, OutputOp::Play]);
    assert_eq!(s.position(), 1);
    assert_eq!(s.elapsed(), Duration::ZERO);
    assert!(s.is_playing());
}

#[test]
fn ended_with_repeat_all_on_one_track_restarts() {
    let mut s = state();
    s.play_track(track("a", "3:00"), None);
    s.toggle_repeat();
    assert_eq!(s.on_track_ended(&mut rng()), vec![OutputOp::Rewind, OutputOp::Play]);
}

#[test]
fn ended_in_a_longer_queue_advances() {
    let mut s = playing_abc("c");
    s.on_track_ended(&mut rng());
    assert_eq!(s.position(), 0);
    assert!(s.is_playing());
}

#[test]
fn ended_single_track_without_repeat_stops() {
    let mut s = state();
    s.play_track(track("a", "3:00"), None);
    assert!(s.on_track_ended(&mut rng()).is_empty());
    assert!(!s.is_playing());
    assert_eq!(s.position(), 0);
    assert!(s.current().is_some());
}

#[test]
fn errors_retry_until_every_track_failed() {
    let mut s = playing_abc("a");
    assert_eq!(s.on_error("boom".into()), ErrorOutcome::Retry);
    assert!(!s.is_playing());
    s.play_next(&mut rng());
    assert_eq!(s.on_error("boom".into()), ErrorOutcome::Retry);
    s.play_next(&mut rng());
    assert_eq!(s.on_error("boom".into()), ErrorOutcome::GiveUp("boom".into()));
    assert_eq!(s.snapshot().last_error.as_deref(), Some("boom"));
}

#[test]
fn a_successful_start_resets_the_failure_count() {
    let mut s = playing_abc("a");
    s.on_error("x".into());
    s.play_next(&mut rng());
    s.on_started();
    s.on_error("y".into());
    s.play_next(&mut rng());
    assert_eq!(s.on_error("z".into()), ErrorOutcome::Retry);
}

#[test]
fn error_on_a_single_track_is_surfaced() {
    let mut s = state();
    s.play_track(track("a", "3:00"), None);
    assert!(matches!(s.on_error("bad".into()), ErrorOutcome::GiveUp(_)));
}
