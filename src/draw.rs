//! Race card, field size bounds and the winning-number draw

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{validate_field_size, validate_selection, Result};
use crate::models::FeatureRaceInfo;
use crate::tables::ScheduleTables;

/// Smallest field the draw accepts
pub const MIN_FIELD: u8 = 2;
/// Largest JRA field
pub const MAX_FIELD: u8 = 18;
/// Field size assumed until the user edits it
pub const DEFAULT_FIELD_SIZE: u8 = 16;
/// Races per venue per day
pub const RACES_PER_DAY: u8 = 12;
/// Race number traditionally carrying the main event
pub const MAIN_RACE_NO: u8 = 11;

/// One status stage of the spin sequence
#[derive(Debug, Clone, Copy)]
pub struct SpinStage {
    /// Progress reached at the end of the stage (0-100)
    pub percent: u8,
    pub message: &'static str,
    pub duration: Duration,
}

pub const SPIN_STAGES: [SpinStage; 5] = [
    SpinStage {
        percent: 20,
        message: "JRA全レースデータを解析中...",
        duration: Duration::from_millis(1000),
    },
    SpinStage {
        percent: 40,
        message: "馬のテンションを測定中...",
        duration: Duration::from_millis(700),
    },
    SpinStage {
        percent: 60,
        message: "鞍上の勝負気配を検知...",
        duration: Duration::from_millis(500),
    },
    SpinStage {
        percent: 80,
        message: "運命のプロットを自動生成中...",
        duration: Duration::from_millis(800),
    },
    SpinStage {
        percent: 100,
        message: "最終的な『態度』を決定しています...",
        duration: Duration::from_millis(1200),
    },
];

/// Interval between progress updates
pub const SPIN_TICK: Duration = Duration::from_millis(50);

/// Progress percentages for every tick of the spin sequence.
///
/// Each stage interpolates linearly from the previous stage's end.
pub fn spin_ticks() -> Vec<(usize, f64)> {
    let mut ticks = Vec::new();
    let mut progress = 0.0;

    for (idx, stage) in SPIN_STAGES.iter().enumerate() {
        let start = progress;
        let delta = f64::from(stage.percent) - start;
        let steps = (stage.duration.as_millis() / SPIN_TICK.as_millis()).max(1) as usize;

        for step in 1..=steps {
            progress = start + delta * (step as f64 / steps as f64);
            ticks.push((idx, progress));
        }
    }

    ticks
}

/// User-editable field size, clamped to 2-18
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSize(u8);

impl FieldSize {
    pub fn new(total: u8) -> Result<Self> {
        validate_field_size(total)?;
        Ok(Self(total))
    }

    /// Clamp any value into range
    pub fn clamped(total: i32) -> Self {
        Self(total.clamp(i32::from(MIN_FIELD), i32::from(MAX_FIELD)) as u8)
    }

    /// Step up or down, staying in range
    pub fn adjust(self, delta: i32) -> Self {
        Self::clamped(i32::from(self.0) + delta)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for FieldSize {
    fn default() -> Self {
        Self(DEFAULT_FIELD_SIZE)
    }
}

/// One race on a venue's card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSlot {
    pub race_no: u8,
    pub label: String,
    pub is_main: bool,
    pub field_size: u8,
}

/// The 12-race card for a venue, main race flagged.
///
/// Unknown venues get an empty card. When `main` names a feature race,
/// its name is shown on the main-race slot. Every slot carries the venue's
/// field-size bound.
pub fn race_card(
    venue: &str,
    main: Option<&FeatureRaceInfo>,
    tables: &ScheduleTables,
) -> Vec<RaceSlot> {
    let Some(field_size) = field_bound(venue, tables) else {
        return Vec::new();
    };

    let main_label = match main {
        Some(info) if !info.is_unassigned() && !info.name.is_empty() => {
            if info.grade.is_empty() {
                format!(" ({})", info.name)
            } else {
                format!(" ({} {})", info.name, info.grade)
            }
        }
        _ => " (メイン)".to_string(),
    };

    (1..=RACES_PER_DAY)
        .map(|race_no| {
            let is_main = race_no == MAIN_RACE_NO;
            RaceSlot {
                race_no,
                label: format!("{}R{}", race_no, if is_main { main_label.as_str() } else { "" }),
                is_main,
                field_size,
            }
        })
        .collect()
}

/// Upper bound of the draw for a venue, when the tables know it
pub fn field_bound(venue: &str, tables: &ScheduleTables) -> Option<u8> {
    tables
        .field_range(venue)
        .map(|range| FieldSize::clamped(i32::from(range.max)).get())
}

/// A validated spin: venue and race chosen, field size in range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinRequest {
    pub venue: String,
    pub race: String,
    pub total: FieldSize,
}

impl SpinRequest {
    pub fn new(venue: &str, race: &str, total: u8) -> Result<Self> {
        validate_selection(venue, race)?;
        Ok(Self {
            venue: venue.trim().to_string(),
            race: race.trim().to_string(),
            total: FieldSize::new(total)?,
        })
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> u8 {
        rng.gen_range(1..=self.total.get())
    }
}

/// Uniform winning number in `1..=total`
pub fn draw_winning_number<R: Rng>(total: u8, rng: &mut R) -> Result<u8> {
    let total = FieldSize::new(total)?;
    Ok(rng.gen_range(1..=total.get()))
}
