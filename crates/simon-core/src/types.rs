//! Core types: Color, InputResult, RoundPhase, StatusData, etc.

use serde::{Deserialize, Serialize};

// ── Colors ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    Blue,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Green, Color::Red, Color::Blue, Color::Yellow];

    pub fn name(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Color {
    type Err = crate::error::SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Color::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::error::SequenceError::UnknownColor(s.to_string()))
    }
}

/// The four-pad palette used when a caller doesn't supply one.
pub const DEFAULT_PALETTE: [Color; 4] = Color::ALL;

// ── Input checking ──

/// Outcome of matching one press against the expected sequence position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputResult {
    pub correct: bool,
    pub next_index: usize,
    pub is_complete: bool,
}

// ── Round state ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Nothing played yet.
    Idle,
    /// Sequence is being shown; presses are ignored.
    Playback,
    AwaitingInput,
    /// Wrong press; waiting for retry or the reopen delay.
    Failed,
    /// Sequence completed; next round is queued.
    Advancing,
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundPhase::Idle => write!(f, "idle"),
            RoundPhase::Playback => write!(f, "playback"),
            RoundPhase::AwaitingInput => write!(f, "your turn"),
            RoundPhase::Failed => write!(f, "failed"),
            RoundPhase::Advancing => write!(f, "advancing"),
        }
    }
}

// ── Events (broadcast from Game to frontends) ──

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusData {
    pub phase: RoundPhase,
    pub level: u32,
    pub sequence_len: usize,
    pub cursor: usize,
    pub accepting_input: bool,
    pub muted: bool,
    pub start_label: String,
    /// Start/retry is disabled while playback or the level-up delay is pending.
    pub start_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightData {
    pub color: Color,
    pub duration_ms: u64,
}
