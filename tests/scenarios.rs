//! Full runs against a hand-driven audio clock

use heartbeat_runner::audio::{AudioManager, Cue, RecordingDevice};
use heartbeat_runner::level::{EventKind, Level, Phase, builtin, generate_seeded};
use heartbeat_runner::sim::{Autopilot, GamePhase, Rank, RunOutcome};
use heartbeat_runner::{Game, Settings, Tuning};

const FRAME: f64 = 1.0 / 60.0;

fn new_game(device: &RecordingDevice) -> Game<RecordingDevice> {
    Game::new(
        AudioManager::with_device(device.clone()),
        Tuning::default(),
        Settings::default(),
    )
}

/// Run frames until the game ends, optionally flying the autopilot
fn play(
    game: &mut Game<RecordingDevice>,
    device: &RecordingDevice,
    pilot: Option<Autopilot>,
    max_seconds: f64,
) -> Option<RunOutcome> {
    let frames = (max_seconds / FRAME) as usize;
    for _ in 0..frames {
        device.advance(FRAME);
        game.scheduler_tick();
        let wants_jump = match (pilot, game.state()) {
            (Some(pilot), Some(state)) => pilot.should_jump(state),
            _ => false,
        };
        if wants_jump {
            game.jump();
        }
        if let Some(outcome) = game.frame() {
            return Some(outcome);
        }
    }
    None
}

#[test]
fn test_idle_player_fails_after_five_hits() {
    let device = RecordingDevice::new();
    let mut game = new_game(&device);
    game.start(&builtin::heartbeat(), 42).unwrap();

    let outcome = play(&mut game, &device, None, 130.0).expect("run never ended");

    assert!(!outcome.cleared);
    assert_eq!(outcome.miss_count, 5);
    assert_eq!(outcome.rank(), Rank::C);
    assert_eq!(game.state().unwrap().phase, GamePhase::Failed);
    assert_eq!(game.state().unwrap().stats.life, 0);
    assert_eq!(device.count(Cue::Hit), 5);
    assert_eq!(device.count(Cue::Clear), 0);
    // Fifth obstacle sits in measure five, well before the song ends
    assert!(game.state().unwrap().stats.song_time < 10.0);
    assert!(!game.audio.is_drum_loop_running());
}

#[test]
fn test_timed_jumps_clear_the_song() {
    let device = RecordingDevice::new();
    let mut game = new_game(&device);
    game.start(&builtin::heartbeat(), 7).unwrap();

    let outcome = play(&mut game, &device, Some(Autopilot::new(FRAME)), 130.0)
        .expect("run never ended");

    assert!(outcome.cleared);
    assert_eq!(outcome.miss_count, 0);
    assert_eq!(outcome.rank(), Rank::Perfect);
    assert_eq!(device.count(Cue::Hit), 0);
    assert_eq!(device.count(Cue::Clear), 1);
    assert_eq!(device.count(Cue::Jump), 60);
    // Every jump guide fired its warning
    assert_eq!(device.count(Cue::Warning), 60);

    let state = game.state().unwrap();
    assert!(state.stats.song_time > 120.0);
    assert_eq!(outcome.final_score, (state.stats.distance / 100.0).floor() as u64);
    // Every guide fired; no obstacle was touched
    for event in &state.timeline.events {
        match event.kind() {
            EventKind::Obstacle => assert!(!event.is_spent()),
            _ => assert!(event.is_spent()),
        }
    }
}

#[test]
fn test_drum_pattern_until_stop() {
    let device = RecordingDevice::new();
    device.advance(0.5);
    let mut audio = AudioManager::with_device(device.clone());
    audio.apply_settings(&Settings {
        master_volume: 1.0,
        drum_volume: 1.0,
        ..Settings::default()
    });

    let first_beat = audio.start_drum_loop(120.0);
    assert!((first_beat - 0.6).abs() < 1e-9);

    // 25ms polls for 20 seconds
    for _ in 0..800 {
        device.advance(0.025);
        audio.scheduler_tick();
    }

    let scheduled = device.scheduled();
    let beat_of = |at: f64| ((at - first_beat) / 0.5).round() as i64;

    let mut beats = 0;
    for s in &scheduled {
        let beat = beat_of(s.at);
        assert!((s.at - (first_beat + beat as f64 * 0.5)).abs() < 1e-6);
        // Placed ahead of playback, never more than the lookahead early
        assert!(s.at >= s.requested);
        assert!(s.at - s.requested <= 0.1 + 1e-9);
        match s.cue {
            Cue::Kick => assert_eq!(beat % 2, 0, "kick on beat {beat}"),
            Cue::Snare => assert_eq!(beat % 2, 1, "snare on beat {beat}"),
            Cue::Hihat => beats += 1,
            other => panic!("unexpected {other:?} in drum loop"),
        }
    }
    assert!(beats >= 39);
    assert_eq!(device.count(Cue::Kick) + device.count(Cue::Snare), beats);

    audio.stop_drum_loop();
    let before = device.scheduled().len();
    for _ in 0..100 {
        device.advance(0.025);
        audio.scheduler_tick();
    }
    assert_eq!(device.scheduled().len(), before);

    audio.stop_drum_loop();
    assert!(!audio.is_drum_loop_running());
}

#[test]
fn test_event_on_song_end_is_dropped() {
    // One 4/4 measure, 2s long; offset 4 lands exactly on 2.0
    let level = Level::new(
        "edge",
        120.0,
        vec![Phase::new("4/4", 4, 2, 3, 1, vec![vec![0.0, 1.0, 4.0]])],
    );
    let timeline = generate_seeded(&level, &Tuning::default(), 3).unwrap();

    assert_eq!(timeline.total_duration, 2.0);
    assert!(timeline.events.iter().all(|e| e.time() < 2.0));
    assert!(timeline.events.iter().any(|e| e.time() == 1.5));
}

#[test]
fn test_silent_run_still_keeps_time() {
    let mut game: Game<RecordingDevice> =
        Game::new(AudioManager::silent(), Tuning::default(), Settings::default());
    let first_beat = game.start(&builtin::tutorial(), 1).unwrap();

    assert!(game.audio.is_silent());
    assert!(first_beat >= 0.1);
    assert_eq!(game.frame(), None);
    let state = game.state().unwrap();
    assert_eq!(state.phase, GamePhase::Running);
    assert_eq!(state.stats.frame, 1);
    assert_eq!(state.stats.life, 5);
}
