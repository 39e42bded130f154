//! Level definitions and timeline generation
//!
//! A level is a tempo plus an ordered list of phases, each with its own
//! meter. Levels are static data; the generator expands one into the event
//! timeline a run plays against.

pub mod builtin;
pub mod generator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use generator::{DifficultyRamp, Event, EventKind, Timeline, generate, generate_seeded};

/// Malformed level data. Caught before any event is generated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("invalid level JSON: {0}")]
    Parse(String),

    #[error("level '{level}' has no phases")]
    NoPhases { level: String },

    #[error("level '{level}' has invalid tempo {bpm}")]
    InvalidBpm { level: String, bpm: f64 },

    #[error("phase '{phase}' has zero beats per measure")]
    ZeroBeatsPerMeasure { phase: String },

    #[error("phase '{phase}': {field} {beat} is outside a {beats_per_measure}-beat measure")]
    BeatOutOfRange {
        phase: String,
        field: &'static str,
        beat: u32,
        beats_per_measure: u32,
    },

    #[error("phase '{phase}' has no rhythm patterns")]
    NoPatterns { phase: String },

    #[error("phase '{phase}' pattern {pattern}: invalid offset {offset}")]
    InvalidOffset {
        phase: String,
        pattern: usize,
        offset: f64,
    },
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e.to_string())
    }
}

/// One section of a level with a fixed meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    /// Numerator of an n/4 meter
    pub beats_per_measure: u32,
    /// Beat index of the jump guide in each measure
    pub jump_beat: u32,
    /// Beat index of the obstacle in each measure
    pub obstacle_beat: u32,
    /// Length in measures
    pub duration: u32,
    /// Candidate rhythm patterns, simplest first. Each pattern lists beat
    /// offsets from the start of the measure.
    pub rhythm_patterns: Vec<Vec<f64>>,
}

impl Phase {
    pub fn new(
        name: impl Into<String>,
        beats_per_measure: u32,
        jump_beat: u32,
        obstacle_beat: u32,
        duration: u32,
        rhythm_patterns: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            name: name.into(),
            beats_per_measure,
            jump_beat,
            obstacle_beat,
            duration,
            rhythm_patterns,
        }
    }

    /// Seconds per measure at the given beat interval
    #[inline]
    pub fn measure_seconds(&self, beat_interval: f64) -> f64 {
        self.beats_per_measure as f64 * beat_interval
    }

    /// Check meter, beat indices and patterns.
    ///
    /// Offsets must be finite, non-negative, non-decreasing and no later than
    /// the following downbeat.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.beats_per_measure == 0 {
            return Err(LevelError::ZeroBeatsPerMeasure {
                phase: self.name.clone(),
            });
        }
        for (field, beat) in [("jump beat", self.jump_beat), ("obstacle beat", self.obstacle_beat)] {
            if beat >= self.beats_per_measure {
                return Err(LevelError::BeatOutOfRange {
                    phase: self.name.clone(),
                    field,
                    beat,
                    beats_per_measure: self.beats_per_measure,
                });
            }
        }
        if self.rhythm_patterns.is_empty() {
            return Err(LevelError::NoPatterns {
                phase: self.name.clone(),
            });
        }

        let limit = self.beats_per_measure as f64;
        for (index, pattern) in self.rhythm_patterns.iter().enumerate() {
            let mut previous = 0.0;
            for &offset in pattern {
                if !offset.is_finite() || offset < previous || offset > limit {
                    return Err(LevelError::InvalidOffset {
                        phase: self.name.clone(),
                        pattern: index,
                        offset,
                    });
                }
                previous = offset;
            }
        }
        Ok(())
    }
}

/// A complete playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub bpm: f64,
    pub phases: Vec<Phase>,
}

impl Level {
    pub fn new(name: impl Into<String>, bpm: f64, phases: Vec<Phase>) -> Self {
        Self {
            name: name.into(),
            bpm,
            phases,
        }
    }

    /// Parse a level from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    #[inline]
    pub fn beat_interval(&self) -> f64 {
        crate::beat_interval(self.bpm)
    }

    /// Song length in seconds: every phase's measures laid end to end
    pub fn total_duration(&self) -> f64 {
        let interval = self.beat_interval();
        self.phases
            .iter()
            .map(|p| p.duration as f64 * p.measure_seconds(interval))
            .sum()
    }

    pub fn total_measures(&self) -> u32 {
        self.phases.iter().map(|p| p.duration).sum()
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.phases.is_empty() {
            return Err(LevelError::NoPhases {
                level: self.name.clone(),
            });
        }
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(LevelError::InvalidBpm {
                level: self.name.clone(),
                bpm: self.bpm,
            });
        }
        self.phases.iter().try_for_each(Phase::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_four(duration: u32) -> Phase {
        Phase::new("4/4", 4, 2, 3, duration, vec![vec![0.0, 1.0, 2.0]])
    }

    #[test]
    fn test_total_duration_sums_phases() {
        let level = Level::new(
            "mixed",
            120.0,
            vec![
                four_four(2),
                Phase::new("3/4", 3, 1, 2, 2, vec![vec![0.0, 1.0]]),
            ],
        );
        // 2 * 4 * 0.5 + 2 * 3 * 0.5
        assert_eq!(level.total_duration(), 7.0);
        assert_eq!(level.total_measures(), 4);
    }

    #[test]
    fn test_zero_beats_per_measure_rejected() {
        let level = Level::new("bad", 120.0, vec![Phase::new("0/4", 0, 0, 0, 4, vec![vec![0.0]])]);
        assert!(matches!(
            level.validate(),
            Err(LevelError::ZeroBeatsPerMeasure { .. })
        ));
    }

    #[test]
    fn test_beat_out_of_range_rejected() {
        let level = Level::new("bad", 120.0, vec![Phase::new("2/4", 2, 0, 2, 4, vec![vec![0.0]])]);
        let err = level.validate().unwrap_err();
        assert_eq!(
            err,
            LevelError::BeatOutOfRange {
                phase: "2/4".into(),
                field: "obstacle beat",
                beat: 2,
                beats_per_measure: 2,
            }
        );
    }

    #[test]
    fn test_pattern_offsets_checked() {
        let decreasing = Phase::new("4/4", 4, 2, 3, 1, vec![vec![0.0, 1.0, 0.5]]);
        assert!(matches!(decreasing.validate(), Err(LevelError::InvalidOffset { .. })));

        let negative = Phase::new("4/4", 4, 2, 3, 1, vec![vec![-0.5]]);
        assert!(matches!(negative.validate(), Err(LevelError::InvalidOffset { .. })));

        let nan = Phase::new("4/4", 4, 2, 3, 1, vec![vec![f64::NAN]]);
        assert!(nan.validate().is_err());

        let downbeat = Phase::new("4/4", 4, 2, 3, 1, vec![vec![0.0, 4.0]]);
        assert!(downbeat.validate().is_ok());
    }

    #[test]
    fn test_empty_level_and_bad_tempo_rejected() {
        assert!(matches!(
            Level::new("empty", 120.0, vec![]).validate(),
            Err(LevelError::NoPhases { .. })
        ));
        assert!(matches!(
            Level::new("still", 0.0, vec![four_four(1)]).validate(),
            Err(LevelError::InvalidBpm { .. })
        ));
    }

    #[test]
    fn test_level_from_json() {
        let json = r#"{
            "name": "JSON",
            "bpm": 120,
            "phases": [{
                "name": "4/4",
                "beatsPerMeasure": 4,
                "jumpBeat": 2,
                "obstacleBeat": 3,
                "duration": 8,
                "rhythmPatterns": [[0, 1, 2], [0, 0.5, 1, 1.5, 2]]
            }]
        }"#;
        let level = Level::from_json(json).unwrap();
        assert_eq!(level.phases[0].rhythm_patterns.len(), 2);
        assert_eq!(level.total_duration(), 16.0);

        let broken = json.replace("\"beatsPerMeasure\": 4", "\"beatsPerMeasure\": 0");
        assert!(matches!(
            Level::from_json(&broken),
            Err(LevelError::ZeroBeatsPerMeasure { .. })
        ));

        let truncated = &json[..json.len() / 2];
        let err = Level::from_json(truncated).unwrap_err();
        assert!(matches!(err, LevelError::Parse(_)));
        assert!(err.to_string().starts_with("invalid level JSON"));
    }
}
