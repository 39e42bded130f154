//! Built-in level table
//!
//! Every level runs at 120 BPM. Offsets are in beats.

use super::{Level, Phase};
use crate::consts::BPM;

/// Look up a built-in level by name (case-insensitive)
pub fn by_name(name: &str) -> Option<Level> {
    match name.to_lowercase().as_str() {
        "heartbeat" | "main run" => Some(heartbeat()),
        "tutorial" => Some(tutorial()),
        "main" | "main game" => Some(main_game()),
        "pattern1" | "pattern 1" => Some(pattern1()),
        "pattern2" | "pattern 2" => Some(pattern2()),
        _ => None,
    }
}

/// All built-in levels in menu order
pub fn all() -> Vec<Level> {
    vec![heartbeat(), tutorial(), main_game(), pattern1(), pattern2()]
}

fn patterns(rows: &[&[f64]]) -> Vec<Vec<f64>> {
    rows.iter().map(|r| r.to_vec()).collect()
}

fn short(name: &str, beats: u32, measures: u32, rows: &[&[f64]]) -> Phase {
    // Jump guide one beat before the obstacle, obstacle on the last beat
    Phase::new(name, beats, beats - 2, beats - 1, measures, patterns(rows))
}

/// The default two-minute run: 60 measures of 4/4, sixteen patterns ordered
/// from sparse to dense so the difficulty ramp unlocks them gradually.
pub fn heartbeat() -> Level {
    Level::new(
        "HEARTBEAT",
        BPM,
        vec![Phase::new(
            "HEARTBEAT (4/4)",
            4,
            2,
            3,
            60,
            patterns(&[
                &[0.0, 1.0, 2.0],
                &[0.0, 1.0, 1.5, 2.0],
                &[0.0, 0.5, 1.0, 1.5, 2.0],
                &[0.0, 0.25, 0.5, 0.75, 1.0, 2.0],
                &[0.0, 0.5, 1.5, 2.0],
                &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5],
                &[0.0, 0.33, 0.66, 1.0, 2.0],
                &[0.0, 0.25, 0.5, 1.0, 2.0],
                &[0.0, 1.75, 2.0, 2.25, 2.5, 2.75],
                &[0.0, 0.25, 1.0, 1.25, 2.0],
                &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5],
                &[0.0, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0],
                &[0.5, 1.0, 1.5, 2.0, 2.5],
                &[0.0, 0.25, 0.75, 1.5, 2.0, 2.75],
                &[0.0, 0.125, 0.25, 0.375, 0.5, 1.0, 2.0],
                &[0.0, 0.66, 1.0, 1.66, 2.0],
            ]),
        )],
    )
}

/// 15 measures of 4/4 (30 seconds)
pub fn tutorial() -> Level {
    Level::new(
        "TUTORIAL",
        BPM,
        vec![Phase::new(
            "BASIC RHYTHM (4/4)",
            4,
            2,
            3,
            15,
            patterns(&[
                &[0.0, 1.0, 2.0],
                &[0.0, 1.0, 1.5, 2.0],
                &[0.0, 0.5, 1.0, 1.5, 2.0],
            ]),
        )],
    )
}

/// Mixed meter: 4/4, then 3/4, then 2/4
pub fn main_game() -> Level {
    Level::new(
        "MAIN GAME",
        BPM,
        vec![
            short("PHASE 1 (4/4)", 4, 16, &[&[0.0, 1.0, 2.0], &[0.0, 1.0, 1.5, 2.0]]),
            short("PHASE 2 (3/4)", 3, 16, &[&[0.0, 1.0], &[0.0, 0.5, 1.0]]),
            short("PHASE 3 (2/4)", 2, 32, &[&[0.0], &[0.0, 0.5]]),
        ],
    )
}

/// 4/4 and 3/4 blocks, then alternating every two measures (about 60 seconds)
pub fn pattern1() -> Level {
    Level::new(
        "PATTERN 1",
        BPM,
        vec![
            short(
                "PHASE 1 (4/4)",
                4,
                10,
                &[
                    &[0.0, 1.0, 2.0],
                    &[0.0, 0.5, 1.0, 1.5, 2.0],
                    &[0.0, 0.25, 0.5, 0.75, 1.0, 2.0],
                    &[0.0, 0.5, 1.0, 2.0],
                    &[0.0, 0.25, 0.5, 1.0, 1.5, 2.0],
                    &[0.0, 1.0, 1.25, 1.5, 1.75, 2.0],
                ],
            ),
            short(
                "PHASE 2 (3/4)",
                3,
                13,
                &[
                    &[0.0, 1.0],
                    &[0.0, 0.5, 1.0],
                    &[0.0, 0.25, 0.5, 0.75, 1.0],
                    &[0.0, 0.33, 0.66, 1.0],
                    &[0.0, 0.5, 1.0, 1.5],
                    &[0.0, 0.25, 0.5, 1.0],
                ],
            ),
            short("3/4", 3, 2, &[&[0.0, 0.5, 1.0], &[0.0, 0.33, 0.66, 1.0], &[0.0, 0.25, 0.5, 0.75, 1.0]]),
            short("4/4", 4, 2, &[&[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 0.25, 0.5, 0.75, 1.0, 2.0], &[0.0, 1.0, 1.25, 1.5, 1.75, 2.0]]),
            short("3/4", 3, 2, &[&[0.0, 0.5, 1.0], &[0.0, 0.25, 0.5, 0.75, 1.0], &[0.0, 0.5, 1.0, 1.5]]),
            short("4/4", 4, 2, &[&[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 0.25, 0.5, 1.0, 1.5, 2.0], &[0.0, 1.0, 2.0]]),
            short("3/4", 3, 2, &[&[0.0, 0.5, 1.0], &[0.0, 0.25, 0.5, 1.0], &[0.0, 1.0]]),
            short("4/4", 4, 2, &[&[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 0.25, 0.5, 0.75, 1.0, 2.0], &[0.0, 1.0, 2.0]]),
        ],
    )
}

/// Two-measure blocks cycling through 4/4, 3/4 and 2/4 (about 90 seconds)
pub fn pattern2() -> Level {
    let four: [&[&[f64]]; 10] = [
        &[&[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 0.33, 0.66, 1.0, 1.33, 1.66, 2.0], &[0.0, 0.25, 0.5, 0.75, 1.0, 2.0]],
        &[&[0.0, 1.0, 2.0], &[0.0, 0.25, 0.5, 1.0, 1.5, 2.0], &[0.0, 0.5, 1.0, 2.0]],
        &[&[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 1.0, 1.25, 1.5, 1.75, 2.0], &[0.0, 0.33, 1.0, 1.66, 2.0]],
        &[&[0.0, 0.25, 0.5, 0.75, 1.0, 2.0], &[0.0, 0.5, 1.0, 2.0], &[0.0, 1.0, 2.0]],
        &[&[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 0.33, 0.66, 1.0, 2.0], &[0.0, 1.0, 1.33, 1.66, 2.0]],
        &[&[0.0, 1.0, 2.0], &[0.0, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0], &[0.0, 0.5, 1.0, 1.5, 2.0]],
        &[&[0.0, 0.5, 1.0, 2.0], &[0.0, 1.0, 1.25, 1.5, 1.75, 2.0], &[0.0, 0.33, 1.0, 2.0]],
        &[&[0.0, 0.25, 0.5, 0.75, 1.0, 2.0], &[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 1.0, 2.0]],
        &[&[0.0, 0.5, 1.0, 1.5, 2.0], &[0.0, 0.33, 0.66, 1.0, 1.33, 1.66, 2.0], &[0.0, 1.0, 2.0]],
        &[&[0.0, 1.0, 2.0], &[0.0, 0.5, 1.0, 2.0], &[0.0, 0.25, 0.5, 1.0, 1.5, 2.0]],
    ];
    let three: [&[&[f64]]; 10] = [
        &[&[0.0, 0.5, 1.0], &[0.0, 0.33, 0.66, 1.0], &[0.0, 0.25, 0.5, 0.75, 1.0]],
        &[&[0.0, 1.0], &[0.0, 0.5, 1.0, 1.5], &[0.0, 0.33, 0.66, 1.0]],
        &[&[0.0, 0.5, 1.0], &[0.0, 0.25, 0.5, 0.75, 1.0], &[0.0, 1.0]],
        &[&[0.0, 0.33, 0.66, 1.0], &[0.0, 0.5, 1.0], &[0.0, 0.25, 0.5, 1.0]],
        &[&[0.0, 1.0], &[0.0, 0.5, 1.0, 1.5], &[0.0, 0.33, 0.66, 1.0]],
        &[&[0.0, 0.5, 1.0], &[0.0, 0.25, 0.5, 0.75, 1.0], &[0.0, 0.33, 0.66, 1.0]],
        &[&[0.0, 1.0], &[0.0, 0.5, 1.0], &[0.0, 0.25, 0.5, 1.0]],
        &[&[0.0, 0.5, 1.0], &[0.0, 0.33, 0.66, 1.0], &[0.0, 1.0]],
        &[&[0.0, 1.0], &[0.0, 0.5, 1.0, 1.5], &[0.0, 0.25, 0.5, 0.75, 1.0]],
        &[&[0.0, 0.5, 1.0], &[0.0, 0.33, 0.66, 1.0], &[0.0, 1.0]],
    ];
    let two: [&[&[f64]]; 10] = [
        &[&[0.0], &[0.0, 0.5], &[0.0, 0.33, 0.66]],
        &[&[0.0, 0.5], &[0.0, 0.25, 0.5, 0.75], &[0.0]],
        &[&[0.0], &[0.0, 0.33, 0.66], &[0.0, 0.25, 0.5]],
        &[&[0.0, 0.5], &[0.0], &[0.0, 0.25, 0.5, 0.75]],
        &[&[0.0], &[0.0, 0.5], &[0.0, 0.33, 0.66]],
        &[&[0.0, 0.5], &[0.0, 0.25, 0.5], &[0.0]],
        &[&[0.0], &[0.0, 0.5], &[0.0, 0.25, 0.5, 0.75]],
        &[&[0.0, 0.5], &[0.0, 0.33, 0.66], &[0.0]],
        &[&[0.0], &[0.0, 0.5], &[0.0, 0.25, 0.5]],
        &[&[0.0, 0.5], &[0.0], &[0.0, 0.25, 0.5, 0.75]],
    ];

    // Meter sequence of the 30 two-measure blocks; the last 3/4 block runs
    // three measures.
    const ORDER: &[u32] = &[
        4, 3, 2, 4, 2, 3, 2, 4, 3, 2, 4, 3, 2, 4, 2, 3, 4, 2, 3, 4, 2, 3, 4, 2, 3, 4, 2, 3, 4, 3,
    ];

    let (mut i4, mut i3, mut i2) = (0, 0, 0);
    let phases = ORDER
        .iter()
        .enumerate()
        .map(|(block, &beats)| {
            let measures = if block == ORDER.len() - 1 { 3 } else { 2 };
            let rows = match beats {
                4 => {
                    i4 += 1;
                    four[i4 - 1]
                }
                3 => {
                    i3 += 1;
                    three[i3 - 1]
                }
                _ => {
                    i2 += 1;
                    two[i2 - 1]
                }
            };
            short(&format!("{beats}/4"), beats, measures, rows)
        })
        .collect();

    Level::new("PATTERN 2", BPM, phases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_levels_validate() {
        for level in all() {
            assert!(level.validate().is_ok(), "{} failed validation", level.name);
        }
    }

    #[test]
    fn test_heartbeat_runs_two_minutes() {
        let level = heartbeat();
        assert_eq!(level.total_duration(), 120.0);
        assert_eq!(level.phases[0].rhythm_patterns.len(), 16);
    }

    #[test]
    fn test_tutorial_runs_thirty_seconds() {
        assert_eq!(tutorial().total_duration(), 30.0);
    }

    #[test]
    fn test_pattern2_block_layout() {
        let level = pattern2();
        assert_eq!(level.phases.len(), 30);
        assert_eq!(level.phases.last().map(|p| p.duration), Some(3));
        assert!(level.phases.iter().all(|p| p.jump_beat + 1 == p.obstacle_beat));
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(by_name("Tutorial").map(|l| l.name), Some("TUTORIAL".to_string()));
        assert!(by_name("missing").is_none());
    }
}
