//! Configuration: YAML config + env var overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::schedule::Timing;
use crate::types::{Color, DEFAULT_PALETTE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Colors the sequence draws from
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,

    /// Fixed RNG seed for reproducible games (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Start with audio muted
    #[serde(default)]
    pub muted: bool,

    /// Pad highlight length at level 1 (ms)
    #[serde(default = "default_base_duration")]
    pub base_duration_ms: u64,

    /// How much faster each level plays (ms)
    #[serde(default = "default_duration_step")]
    pub duration_step_ms: u64,

    /// Fastest highlight allowed (ms)
    #[serde(default = "default_min_duration")]
    pub min_duration_ms: u64,

    /// Pause between highlights (ms)
    #[serde(default = "default_gap")]
    pub gap_ms: u64,

    /// Shortest playback tone (ms)
    #[serde(default = "default_min_tone")]
    pub min_tone_ms: u64,

    /// Playback tone length as a fraction of the highlight
    #[serde(default = "default_tone_ratio")]
    pub tone_ratio: f64,

    /// Highlight shown for a player press (ms)
    #[serde(default = "default_press_highlight")]
    pub press_highlight_ms: u64,

    /// Tone played for a player press (ms)
    #[serde(default = "default_press_tone")]
    pub press_tone_ms: u64,

    /// Tone played when start/retry is pressed (ms)
    #[serde(default = "default_start_tone")]
    pub start_tone_ms: u64,

    /// Delay after a wrong press before input reopens (ms)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Delay after a completed sequence before the next round (ms)
    #[serde(default = "default_advance_delay")]
    pub advance_delay_ms: u64,
}

fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE.to_vec()
}
fn default_base_duration() -> u64 {
    1000
}
fn default_duration_step() -> u64 {
    80
}
fn default_min_duration() -> u64 {
    300
}
fn default_gap() -> u64 {
    150
}
fn default_min_tone() -> u64 {
    120
}
fn default_tone_ratio() -> f64 {
    0.6
}
fn default_press_highlight() -> u64 {
    300
}
fn default_press_tone() -> u64 {
    180
}
fn default_start_tone() -> u64 {
    120
}
fn default_retry_delay() -> u64 {
    700
}
fn default_advance_delay() -> u64 {
    2000
}

impl Config {
    /// Load config from a YAML file with env var overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        let mut config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config.yaml")?;

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from the default location (project_root/config.yaml)
    pub fn load_from_dir(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join("config.yaml");
        Self::load(&config_path)
    }

    /// Apply `SIMON_*` overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(seed) = lookup("SIMON_SEED") {
            self.seed = Some(
                seed.trim()
                    .parse()
                    .with_context(|| format!("SIMON_SEED is not a number: {seed}"))?,
            );
        }

        if let Some(muted) = lookup("SIMON_MUTED") {
            self.muted = matches!(muted.trim(), "1" | "true" | "yes" | "on");
        }

        if let Some(palette) = lookup("SIMON_PALETTE") {
            self.palette = palette
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Color>())
                .collect::<Result<Vec<_>, _>>()
                .context("Invalid SIMON_PALETTE")?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            anyhow::bail!("palette must list at least one color");
        }
        if !self.tone_ratio.is_finite() || self.tone_ratio < 0.0 {
            anyhow::bail!("tone_ratio must be a non-negative number");
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            base_duration_ms: self.base_duration_ms,
            duration_step_ms: self.duration_step_ms,
            min_duration_ms: self.min_duration_ms,
            gap_ms: self.gap_ms,
            min_tone_ms: self.min_tone_ms,
            tone_ratio: self.tone_ratio,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            seed: None,
            muted: false,
            base_duration_ms: default_base_duration(),
            duration_step_ms: default_duration_step(),
            min_duration_ms: default_min_duration(),
            gap_ms: default_gap(),
            min_tone_ms: default_min_tone(),
            tone_ratio: default_tone_ratio(),
            press_highlight_ms: default_press_highlight(),
            press_tone_ms: default_press_tone(),
            start_tone_ms: default_start_tone(),
            retry_delay_ms: default_retry_delay(),
            advance_delay_ms: default_advance_delay(),
        }
    }
}
