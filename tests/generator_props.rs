//! Generator invariants over arbitrary well-formed levels

use heartbeat_runner::Tuning;
use heartbeat_runner::level::{Event, EventKind, Level, Phase, generate_seeded};
use proptest::prelude::*;

/// Sorted offsets on a quarter-beat grid, up to and including the next downbeat
fn pattern(beats: u32) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0..=beats * 4, 1..6).prop_map(|mut steps| {
        steps.sort_unstable();
        steps.into_iter().map(|s| s as f64 / 4.0).collect()
    })
}

fn phase() -> impl Strategy<Value = Phase> {
    (2u32..=7).prop_flat_map(|beats| {
        (
            0..beats,
            0..beats,
            0u32..6,
            prop::collection::vec(pattern(beats), 1..=5),
        )
            .prop_map(move |(jump_beat, obstacle_beat, duration, patterns)| {
                Phase::new("p", beats, jump_beat, obstacle_beat, duration, patterns)
            })
    })
}

fn level() -> impl Strategy<Value = Level> {
    (60u32..=200, prop::collection::vec(phase(), 1..=4))
        .prop_map(|(bpm, phases)| Level::new("prop", bpm as f64, phases))
}

proptest! {
    #[test]
    fn test_events_inside_song_and_sorted(level in level(), seed in any::<u64>()) {
        let timeline = generate_seeded(&level, &Tuning::default(), seed).unwrap();

        for event in &timeline.events {
            prop_assert!(event.time() >= 0.0);
            prop_assert!(event.time() < timeline.total_duration);
        }
        prop_assert!(timeline.events.windows(2).all(|w| w[0].time() <= w[1].time()));
    }

    #[test]
    fn test_one_jump_guide_and_obstacle_per_measure(level in level(), seed in any::<u64>()) {
        let timeline = generate_seeded(&level, &Tuning::default(), seed).unwrap();

        prop_assert_eq!(timeline.measures, level.total_measures());
        prop_assert_eq!(timeline.count(EventKind::JumpGuide), level.total_measures() as usize);
        prop_assert_eq!(timeline.count(EventKind::Obstacle), level.total_measures() as usize);
    }

    #[test]
    fn test_rhythm_guides_never_stack(level in level(), seed in any::<u64>()) {
        let timeline = generate_seeded(&level, &Tuning::default(), seed).unwrap();

        let times: Vec<f64> = timeline.iter_kind(EventKind::RhythmGuide).map(Event::time).collect();
        prop_assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_positions_follow_time(level in level(), seed in any::<u64>()) {
        let tuning = Tuning::default();
        let timeline = generate_seeded(&level, &tuning, seed).unwrap();

        for event in &timeline.events {
            let base = tuning.world_x(event.time());
            match event {
                Event::Obstacle { x, .. } => prop_assert_eq!(*x, base + tuning.obstacle_lead),
                _ => prop_assert_eq!(event.x(), base),
            }
            prop_assert!(!event.is_spent());
        }
    }

    #[test]
    fn test_seed_reproduces_timeline(level in level(), seed in any::<u64>()) {
        let tuning = Tuning::default();
        let a = generate_seeded(&level, &tuning, seed).unwrap();
        let b = generate_seeded(&level, &tuning, seed).unwrap();
        prop_assert_eq!(a.events, b.events);
    }
}
