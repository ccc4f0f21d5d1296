//! Audio sink: tone cues are fire-and-forget notifications.
//!
//! The game hands a [`ToneCue`] to whatever sink it was built with and moves
//! on. A sink that can't play (no device, closed channel) drops the cue.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::types::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Square,
    Sawtooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneCue {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub waveform: Waveform,
    /// Exponential sweep target, for the error buzz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_to_hz: Option<f32>,
}

impl ToneCue {
    pub fn for_color(color: Color, duration_ms: u64) -> Self {
        Self {
            frequency_hz: color_frequency(color),
            duration_ms,
            waveform: Waveform::Square,
            sweep_to_hz: None,
        }
    }

    pub fn error() -> Self {
        Self {
            frequency_hz: 220.0,
            duration_ms: 400,
            waveform: Waveform::Sawtooth,
            sweep_to_hz: Some(90.0),
        }
    }
}

pub fn color_frequency(color: Color) -> f32 {
    match color {
        Color::Green => 392.0,
        Color::Red => 440.0,
        Color::Yellow => 494.0,
        Color::Blue => 330.0,
    }
}

/// One-way audio capability. Implementations must not block the caller.
pub trait AudioSink: Send + Sync {
    fn play(&self, cue: ToneCue);
}

/// Discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&self, _cue: ToneCue) {}
}

/// Forwards cues to a receiver, e.g. a frontend that renders or synthesizes them.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ToneCue>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ToneCue>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AudioSink for ChannelSink {
    fn play(&self, cue: ToneCue) {
        if self.tx.send(cue).is_err() {
            debug!("audio receiver gone, dropping {} Hz cue", cue.frequency_hz);
        }
    }
}
