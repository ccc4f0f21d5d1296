//! Playback schedule: the whole highlight/tone timeline for a round, computed up front.
//!
//! The driver executes a schedule with a single cancellable timer task, so a
//! restart only has to drop one handle instead of chasing nested timers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Pacing knobs. Defaults match the classic browser game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub base_duration_ms: u64,
    pub duration_step_ms: u64,
    pub min_duration_ms: u64,
    pub gap_ms: u64,
    pub min_tone_ms: u64,
    pub tone_ratio: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            base_duration_ms: 1000,
            duration_step_ms: 80,
            min_duration_ms: 300,
            gap_ms: 150,
            min_tone_ms: 120,
            tone_ratio: 0.6,
        }
    }
}

impl Timing {
    /// How long each pad stays lit at `level`. Speeds up per level down to a floor.
    pub fn duration_for_level(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        self.base_duration_ms
            .saturating_sub(steps.saturating_mul(self.duration_step_ms))
            .max(self.min_duration_ms)
    }

    pub fn tone_for_duration(&self, duration_ms: u64) -> u64 {
        let scaled = (duration_ms as f64 * self.tone_ratio).round() as u64;
        scaled.max(self.min_tone_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStep {
    pub index: usize,
    pub color: Color,
    /// Delay from the start of playback.
    pub offset_ms: u64,
    pub highlight_ms: u64,
    pub tone_ms: u64,
}

impl PlaybackStep {
    pub fn offset(&self) -> Duration {
        Duration::from_millis(self.offset_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSchedule {
    pub level: u32,
    pub steps: Vec<PlaybackStep>,
    /// Input opens once this much time has passed.
    pub total_ms: u64,
}

impl PlaybackSchedule {
    pub fn build(sequence: &[Color], level: u32, timing: &Timing) -> Self {
        let duration = timing.duration_for_level(level);
        let slot = duration + timing.gap_ms;
        let tone_ms = timing.tone_for_duration(duration);

        let steps = sequence
            .iter()
            .enumerate()
            .map(|(index, &color)| PlaybackStep {
                index,
                color,
                offset_ms: index as u64 * slot,
                highlight_ms: duration,
                tone_ms,
            })
            .collect();

        Self {
            level,
            steps,
            total_ms: sequence.len() as u64 * slot,
        }
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
