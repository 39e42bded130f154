//! Timeline generation
//!
//! Expands a [`Level`] into a flat, time-ordered list of guide and obstacle
//! events. Randomness only picks which rhythm pattern fills each measure;
//! the timeline is fixed once generated.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Level, LevelError};
use crate::tuning::Tuning;

/// Event discriminant, for filtering and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    RhythmGuide,
    JumpGuide,
    Obstacle,
}

/// A timed event on the run's timeline.
///
/// `x` is the world position: `base_offset + time * scroll_speed`, plus the
/// obstacle lead for obstacles. The flags only ever go from false to true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    RhythmGuide {
        x: f64,
        time: f64,
        triggered: bool,
    },
    JumpGuide {
        x: f64,
        time: f64,
        triggered: bool,
    },
    Obstacle {
        x: f64,
        time: f64,
        width: f64,
        height: f64,
        hit: bool,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RhythmGuide { .. } => EventKind::RhythmGuide,
            Event::JumpGuide { .. } => EventKind::JumpGuide,
            Event::Obstacle { .. } => EventKind::Obstacle,
        }
    }

    /// Song time of the beat this event belongs to
    pub fn time(&self) -> f64 {
        match *self {
            Event::RhythmGuide { time, .. }
            | Event::JumpGuide { time, .. }
            | Event::Obstacle { time, .. } => time,
        }
    }

    pub fn x(&self) -> f64 {
        match *self {
            Event::RhythmGuide { x, .. } | Event::JumpGuide { x, .. } | Event::Obstacle { x, .. } => x,
        }
    }

    /// Screen x after the world has scrolled `distance` pixels
    #[inline]
    pub fn screen_x(&self, distance: f64) -> f64 {
        self.x() - distance
    }

    /// Guide already fired or obstacle already hit
    pub fn is_spent(&self) -> bool {
        match *self {
            Event::RhythmGuide { triggered, .. } | Event::JumpGuide { triggered, .. } => triggered,
            Event::Obstacle { hit, .. } => hit,
        }
    }
}

/// Pattern pool caps by measure index.
///
/// Early measures draw from the first few (simplest) patterns of a phase; the
/// pool widens as the run goes on and never shrinks.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyRamp {
    /// (first measure index past this tier, pool cap)
    tiers: Vec<(u32, usize)>,
}

impl Default for DifficultyRamp {
    fn default() -> Self {
        Self::new(vec![(8, 4), (16, 8), (24, 12)])
    }
}

impl DifficultyRamp {
    /// Build a ramp from (until_measure, cap) tiers. Tiers are sorted and caps
    /// raised where needed so the pool never shrinks.
    pub fn new(mut tiers: Vec<(u32, usize)>) -> Self {
        tiers.sort_by_key(|&(until, _)| until);
        let mut floor = 1;
        for tier in &mut tiers {
            tier.1 = tier.1.max(floor);
            floor = tier.1;
        }
        Self { tiers }
    }

    /// Every pattern is eligible from the first measure
    pub fn flat() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Cap for a measure, before clamping to the phase's pattern count
    pub fn cap(&self, measure: u32) -> usize {
        self.tiers
            .iter()
            .find(|&&(until, _)| measure < until)
            .map(|&(_, cap)| cap)
            .unwrap_or(usize::MAX)
    }

    /// Number of candidate patterns for a measure
    pub fn pool_size(&self, measure: u32, available: usize) -> usize {
        self.cap(measure).min(available).max(1)
    }
}

/// The generated event list for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    /// Events sorted by song time
    pub events: Vec<Event>,
    /// Song length in seconds; no event sits at or past it
    pub total_duration: f64,
    pub bpm: f64,
    pub measures: u32,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn iter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind() == kind)
    }
}

/// Generate with an explicit seed
pub fn generate_seeded(level: &Level, tuning: &Tuning, seed: u64) -> Result<Timeline, LevelError> {
    let mut rng = Pcg32::seed_from_u64(seed);
    generate(level, tuning, &DifficultyRamp::default(), &mut rng)
}

/// Expand a level into its timeline.
///
/// Phases are laid end to end. Each measure gets the rhythm guides of one
/// pattern, one jump guide and one obstacle; anything landing at or past the
/// song's end is dropped.
pub fn generate<R: Rng>(
    level: &Level,
    tuning: &Tuning,
    ramp: &DifficultyRamp,
    rng: &mut R,
) -> Result<Timeline, LevelError> {
    level.validate()?;

    let interval = level.beat_interval();
    let total_duration = level.total_duration();
    let within = |time: f64| time < total_duration;

    let mut events = Vec::new();
    let mut current_time = 0.0;
    let mut measure_count = 0u32;
    // Offsets on a measure's closing downbeat may collide with the next one
    let mut last_rhythm = f64::NEG_INFINITY;

    for phase in &level.phases {
        let measure_seconds = phase.measure_seconds(interval);

        for _ in 0..phase.duration {
            let pool = ramp.pool_size(measure_count, phase.rhythm_patterns.len());
            let pattern = &phase.rhythm_patterns[rng.random_range(0..pool)];

            for &offset in pattern {
                let time = current_time + offset * interval;
                if within(time) && time > last_rhythm {
                    events.push(Event::RhythmGuide {
                        x: tuning.world_x(time),
                        time,
                        triggered: false,
                    });
                    last_rhythm = time;
                }
            }

            let jump_time = current_time + phase.jump_beat as f64 * interval;
            if within(jump_time) {
                events.push(Event::JumpGuide {
                    x: tuning.world_x(jump_time),
                    time: jump_time,
                    triggered: false,
                });
            }

            let obstacle_time = current_time + phase.obstacle_beat as f64 * interval;
            if within(obstacle_time) {
                events.push(Event::Obstacle {
                    x: tuning.world_x(obstacle_time) + tuning.obstacle_lead,
                    time: obstacle_time,
                    width: tuning.obstacle_width,
                    height: tuning.obstacle_height,
                    hit: false,
                });
            }

            current_time += measure_seconds;
            measure_count += 1;
        }
    }

    // Stable: events at equal times keep emission order
    events.sort_by(|a, b| a.time().total_cmp(&b.time()));

    log::debug!(
        "Generated '{}': {} measures, {} events over {:.1}s",
        level.name,
        measure_count,
        events.len(),
        total_duration
    );

    Ok(Timeline {
        events,
        total_duration,
        bpm: level.bpm,
        measures: measure_count,
    })
}
