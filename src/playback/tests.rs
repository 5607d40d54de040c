use std::path::PathBuf;
use std::time::Duration;

use super::error::DeviceCommand;
use super::player::Tick;
use super::testing::{DeviceCall, Fixture, track};
use super::*;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn row_events(events: &[UiEvent]) -> Vec<(usize, RowState)> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::RowState { index, state } => Some((*index, *state)),
            _ => None,
        })
        .collect()
}

#[test]
fn toggle_cycles_stopped_playing_paused_with_frozen_elapsed() {
    let f = Fixture::new(&[("A", 60)]);
    assert_eq!(f.player.status().state, PlaybackState::Stopped);

    f.player.toggle().unwrap();
    assert_eq!(f.player.status().state, PlaybackState::Playing);
    f.secs(2);
    let mut last = f.elapsed();
    assert_eq!(last, secs(2));

    for round in 0..3 {
        f.player.toggle().unwrap();
        assert_eq!(f.player.status().state, PlaybackState::Paused, "round {round}");
        let frozen = f.elapsed();
        assert!(frozen >= last);
        f.secs(4);
        assert_eq!(f.elapsed(), frozen);

        f.player.toggle().unwrap();
        assert_eq!(f.player.status().state, PlaybackState::Playing);
        f.secs(1);
        last = f.elapsed();
        assert_eq!(last, frozen + secs(1));
    }

    assert_eq!(
        f.device.calls(),
        vec![
            DeviceCall::Load(PathBuf::from("/music/A.mp3")),
            DeviceCall::Play,
            DeviceCall::Pause,
            DeviceCall::Resume,
            DeviceCall::Pause,
            DeviceCall::Resume,
            DeviceCall::Pause,
            DeviceCall::Resume,
        ]
    );
}

#[test]
fn activating_second_track_stops_the_first() {
    let f = Fixture::new(&[("A", 10), ("B", 5)]);
    f.player.activate(0).unwrap();
    f.drain();

    f.player.activate(1).unwrap();

    let status = f.player.status();
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(status.index, Some(1));
    assert_eq!(
        f.device.calls()[2..],
        [
            DeviceCall::Stop,
            DeviceCall::Load(PathBuf::from("/music/B.mp3")),
            DeviceCall::Play,
        ]
    );
    assert_eq!(
        f.device.state().loaded.as_deref(),
        Some(std::path::Path::new("/music/B.mp3"))
    );
    assert_eq!(
        row_events(&f.drain()),
        vec![(0, RowState::Idle), (1, RowState::Playing)]
    );
}

#[test]
fn seek_reanchors_elapsed_to_the_new_offset() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.activate(0).unwrap();
    f.secs(7);

    f.player.seek(0.25).unwrap();
    assert!(f.device.calls().contains(&DeviceCall::SetPosition(Duration::from_millis(2500))));
    assert_eq!(f.elapsed(), Duration::from_millis(2500));

    f.secs(1);
    match f.player.tick() {
        Tick::Progress { progress, .. } => assert!((progress - 0.35).abs() < 1e-9),
        other => panic!("unexpected tick {other:?}"),
    }
}

#[test]
fn seek_is_ignored_unless_playing() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.seek(0.5).unwrap();
    assert_eq!(f.player.status().state, PlaybackState::Stopped);

    f.player.activate(0).unwrap();
    f.secs(3);
    f.player.toggle().unwrap();
    f.player.seek(0.9).unwrap();

    assert_eq!(f.player.status().state, PlaybackState::Paused);
    assert_eq!(f.elapsed(), secs(3));
    assert!(
        !f.device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::SetPosition(_)))
    );
}

#[test]
fn seek_clamps_out_of_range_fractions_and_ignores_nan() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.activate(0).unwrap();

    f.player.seek(f64::NAN).unwrap();
    f.player.seek(-1.0).unwrap();
    assert_eq!(f.elapsed(), Duration::ZERO);
    f.player.seek(3.0).unwrap();
    assert_eq!(f.elapsed(), secs(10));
}

#[test]
fn scrub_moves_relative_to_elapsed() {
    let f = Fixture::new(&[("A", 100)]);
    f.player.activate(0).unwrap();
    f.secs(20);

    f.player.scrub(5).unwrap();
    assert_eq!(f.elapsed(), secs(25));
    f.player.scrub(-30).unwrap();
    assert_eq!(f.elapsed(), Duration::ZERO);
}

#[test]
fn next_wraps_and_previous_at_first_track_is_a_no_op() {
    let f = Fixture::new(&[("A", 10), ("B", 10), ("C", 10)]);
    f.player.activate(2).unwrap();

    f.player.next().unwrap();
    assert_eq!(f.player.status().index, Some(0));

    let calls_before = f.device.calls().len();
    f.drain();
    f.player.previous().unwrap();
    assert_eq!(f.player.status().index, Some(0));
    assert_eq!(f.device.calls().len(), calls_before);
    assert!(f.drain().is_empty());

    f.player.next().unwrap();
    f.player.previous().unwrap();
    assert_eq!(f.player.status().index, Some(0));
}

#[test]
fn next_on_single_track_restarts_it() {
    let f = Fixture::new(&[("Only", 10)]);
    f.player.activate(0).unwrap();
    f.secs(6);

    f.player.next().unwrap();
    assert_eq!(f.player.status().index, Some(0));
    assert_eq!(f.elapsed(), Duration::ZERO);
}

#[test]
fn auto_advance_after_two_ticks_on_a_two_second_track() {
    let f = Fixture::new(&[("Short", 2), ("Next", 30)]);
    f.player.activate(0).unwrap();

    f.secs(1);
    assert!(matches!(f.player.tick(), Tick::Progress { .. }));
    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Advanced { index: 1 });

    let status = f.player.status();
    assert_eq!(status.index, Some(1));
    assert_eq!(status.state, PlaybackState::Playing);
    assert_eq!(status.elapsed, Duration::ZERO);
}

#[test]
fn scenario_auto_advance_from_a_to_b() {
    let f = Fixture::new(&[("A", 10), ("B", 5), ("C", 8)]);
    f.player.activate(0).unwrap();
    assert!(f.drain().contains(&UiEvent::TrackChanged {
        name: "A".into(),
        is_playing: true,
        duration: secs(10),
    }));

    let mut advanced = None;
    for _ in 0..11 {
        f.secs(1);
        if let Tick::Advanced { index } = f.player.tick() {
            advanced = Some(index);
            break;
        }
    }
    assert_eq!(advanced, Some(1));

    let events = f.drain();
    assert!(events.contains(&UiEvent::TrackChanged {
        name: "B".into(),
        is_playing: true,
        duration: secs(5),
    }));
    // Progress for A never ran past its length on screen.
    assert!(events.iter().all(|e| match e {
        UiEvent::Progress { progress, elapsed } => *progress <= 1.0 && *elapsed <= secs(10),
        _ => true,
    }));
    assert_eq!(f.elapsed(), Duration::ZERO);
}

#[test]
fn scenario_pause_freezes_and_resume_continues() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.activate(0).unwrap();

    f.secs(3);
    f.player.toggle().unwrap();
    assert_eq!(f.elapsed(), secs(3));

    for _ in 0..5 {
        f.secs(1);
        assert_eq!(
            f.player.tick(),
            Tick::Progress {
                progress: 0.3,
                elapsed: secs(3)
            }
        );
    }

    f.player.toggle().unwrap();
    f.secs(1);
    match f.player.tick() {
        Tick::Progress { elapsed, .. } => assert_eq!(elapsed, secs(4)),
        other => panic!("unexpected tick {other:?}"),
    }
}

#[test]
fn paused_track_at_its_end_does_not_advance() {
    let f = Fixture::new(&[("A", 2), ("B", 2)]);
    f.player.activate(0).unwrap();
    f.secs(3);
    f.player.toggle().unwrap();

    assert!(matches!(f.player.tick(), Tick::Progress { .. }));
    assert_eq!(f.player.status().index, Some(0));
}

#[test]
fn failed_load_leaves_session_stopped_and_marks_the_row() {
    let f = Fixture::new(&[("A", 10), ("Broken", 10)]);
    f.device
        .state()
        .unloadable
        .insert(PathBuf::from("/music/Broken.mp3"));
    f.player.activate(0).unwrap();
    f.drain();

    let err = f.player.activate(1).unwrap_err();
    assert!(matches!(err, PlayerError::Load { .. }));
    assert_eq!(f.player.status().state, PlaybackState::Stopped);
    assert_eq!(f.player.status().index, None);

    let events = f.drain();
    assert_eq!(
        row_events(&events),
        vec![(0, RowState::Idle), (1, RowState::Failed)]
    );
    assert!(events.contains(&UiEvent::TrackCleared));
    assert!(events.iter().any(|e| matches!(e, UiEvent::Error(msg) if msg.contains("Broken"))));

    // The user can still pick another track.
    f.player.activate(0).unwrap();
    assert_eq!(f.player.status().state, PlaybackState::Playing);
}

#[test]
fn failed_play_after_load_releases_the_track() {
    let f = Fixture::new(&[("A", 10)]);
    f.device.state().failing.insert("play");

    let err = f.player.activate(0).unwrap_err();
    assert!(matches!(
        err,
        PlayerError::DeviceCommand {
            command: DeviceCommand::Play,
            ..
        }
    ));
    assert_eq!(f.player.status().state, PlaybackState::Stopped);
    assert_eq!(f.device.state().loaded, None);
}

#[test]
fn failed_pause_keeps_playing_and_reports_actual_state() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.activate(0).unwrap();
    f.drain();
    f.device.state().failing.insert("pause");

    f.secs(2);
    let err = f.player.toggle().unwrap_err();
    assert!(matches!(
        err,
        PlayerError::DeviceCommand {
            command: DeviceCommand::Pause,
            ..
        }
    ));
    assert_eq!(f.player.status().state, PlaybackState::Playing);
    f.secs(1);
    assert_eq!(f.elapsed(), secs(3));

    let events = f.drain();
    assert_eq!(row_events(&events), vec![(0, RowState::Playing)]);
    assert!(events.iter().any(|e| matches!(e, UiEvent::Error(_))));
}

#[test]
fn failed_stop_keeps_the_track_active() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.activate(0).unwrap();
    f.device.state().failing.insert("stop");

    assert!(f.player.stop().is_err());
    assert_eq!(f.player.status().state, PlaybackState::Playing);
}

#[test]
fn stop_is_idempotent() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.activate(0).unwrap();
    f.drain();

    f.player.stop().unwrap();
    let calls = f.device.calls().len();
    f.player.stop().unwrap();

    assert_eq!(f.device.calls().len(), calls);
    assert_eq!(f.player.status().state, PlaybackState::Stopped);
    let events = f.drain();
    assert_eq!(row_events(&events), vec![(0, RowState::Idle)]);
    assert_eq!(
        events.iter().filter(|e| **e == UiEvent::TrackCleared).count(),
        1
    );
}

#[test]
fn toggle_from_stopped_resumes_the_cursor_track() {
    let f = Fixture::new(&[("A", 10), ("B", 10)]);
    f.player.activate(1).unwrap();
    f.player.stop().unwrap();

    f.player.toggle().unwrap();
    assert_eq!(f.player.status().index, Some(1));
}

#[test]
fn empty_playlist_is_reported_not_fatal() {
    let f = Fixture::new(&[]);
    assert!(matches!(f.player.toggle(), Err(PlayerError::EmptyPlaylist)));
    assert!(matches!(f.player.next(), Err(PlayerError::EmptyPlaylist)));
    f.player.previous().unwrap();
    assert!(matches!(
        f.player.activate(0),
        Err(PlayerError::TrackOutOfRange(0))
    ));
    assert_eq!(f.player.tick(), Tick::Idle);
    assert!(f.device.calls().is_empty());
}

#[test]
fn volume_is_clamped_and_forwarded_in_any_state() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.set_volume(1.7).unwrap();
    f.player.set_volume(-0.2).unwrap();
    f.player.adjust_volume(0.25).unwrap();

    assert_eq!(
        f.device.calls(),
        vec![
            DeviceCall::SetVolume(1.0),
            DeviceCall::SetVolume(0.0),
            DeviceCall::SetVolume(0.25),
        ]
    );
    assert_eq!(f.player.status().volume, 0.25);

    f.device.state().failing.insert("set_volume");
    assert!(f.player.set_volume(0.8).is_err());
    assert_eq!(f.player.status().volume, 0.25);
}

#[test]
fn no_loop_stops_after_the_last_track() {
    let tracks = vec![track(0, "A", Some(1)), track(1, "B", Some(1))];
    let f = Fixture::with_tracks(tracks, LoopMode::NoLoop);
    f.player.activate(1).unwrap();

    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Finished);
    assert_eq!(f.player.status().state, PlaybackState::Stopped);

    f.drain();
    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Idle);
    assert_eq!(f.drain(), vec![UiEvent::ProgressHidden]);
    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Idle);
    assert!(f.drain().is_empty());
}

#[test]
fn failed_stop_at_the_end_is_reported_once() {
    let f = Fixture::with_tracks(vec![track(0, "Only", Some(1))], LoopMode::NoLoop);
    f.player.activate(0).unwrap();
    f.device.state().failing.insert("stop");
    f.drain();

    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Failed);
    assert_eq!(f.player.status().state, PlaybackState::Playing);
    f.secs(1);
    assert!(matches!(f.player.tick(), Tick::Progress { .. }));

    let errors = f
        .drain()
        .into_iter()
        .filter(|e| matches!(e, UiEvent::Error(_)))
        .count();
    assert_eq!(errors, 1);

    // Seeking back re-arms the end of the track.
    f.device.state().failing.remove("stop");
    f.player.seek(0.0).unwrap();
    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Finished);
    assert_eq!(f.player.status().state, PlaybackState::Stopped);
}

#[test]
fn auto_advance_into_an_unloadable_track_is_not_reported_as_advanced() {
    let f = Fixture::new(&[("A", 1), ("Broken", 1)]);
    f.device
        .state()
        .unloadable
        .insert(PathBuf::from("/music/Broken.mp3"));
    f.player.activate(0).unwrap();
    f.drain();

    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Failed);
    assert_eq!(f.player.status().state, PlaybackState::Stopped);
    assert_eq!(
        row_events(&f.drain()),
        vec![(0, RowState::Idle), (1, RowState::Failed)]
    );

    assert_eq!(f.player.tick(), Tick::Idle);
}

#[test]
fn loop_one_repeats_the_current_track() {
    let f = Fixture::new(&[("A", 1), ("B", 1)]);
    f.player.set_loop_mode(LoopMode::LoopOne);
    f.player.activate(0).unwrap();

    f.secs(1);
    assert_eq!(f.player.tick(), Tick::Advanced { index: 0 });
    assert_eq!(f.player.status().index, Some(0));
    assert_eq!(f.player.cycle_loop_mode(), LoopMode::NoLoop);
}

#[test]
fn unknown_duration_is_learned_from_the_device() {
    let tracks = vec![track(0, "Untagged", None)];
    let f = Fixture::with_tracks(tracks, LoopMode::LoopAll);
    f.device
        .state()
        .durations
        .insert(PathBuf::from("/music/Untagged.mp3"), secs(42));

    f.player.activate(0).unwrap();
    assert_eq!(f.player.status().duration, secs(42));
}

#[test]
fn unmeasurable_track_advances_when_the_device_drains() {
    let tracks = vec![track(0, "Stream", None), track(1, "Next", Some(5))];
    let f = Fixture::with_tracks(tracks, LoopMode::LoopAll);
    f.player.activate(0).unwrap();

    f.secs(100);
    assert_eq!(
        f.player.tick(),
        Tick::Progress {
            progress: 0.0,
            elapsed: secs(100)
        }
    );

    f.device.state().drained = true;
    assert_eq!(f.player.tick(), Tick::Advanced { index: 1 });
}

#[test]
fn seek_on_unmeasurable_track_keeps_position() {
    let f = Fixture::with_tracks(vec![track(0, "Stream", None)], LoopMode::LoopAll);
    f.player.activate(0).unwrap();
    f.secs(60);

    f.player.seek(0.5).unwrap();

    assert_eq!(f.elapsed(), secs(60));
    assert!(
        !f.device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::SetPosition(_)))
    );
}

#[test]
fn monitor_ticks_in_the_background_until_cancelled() {
    let f = Fixture::new(&[("A", 10)]);
    f.player.activate(0).unwrap();
    f.drain();

    let mut monitor = ProgressMonitor::spawn(f.player.clone(), Duration::from_millis(5));
    assert!(monitor.is_running());
    let first = f
        .events
        .recv_timeout(Duration::from_secs(2))
        .expect("monitor should report progress");
    assert!(matches!(first, UiEvent::Progress { .. }));

    monitor.cancel();
    assert!(!monitor.is_running());
    f.drain();
    std::thread::sleep(Duration::from_millis(30));
    assert!(f.drain().is_empty());
}
