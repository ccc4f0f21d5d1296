//! GameEvent enum: broadcast from a Game task to frontends via tokio::broadcast.

use serde::{Deserialize, Serialize};

use crate::audio::ToneCue;
use crate::types::{HighlightData, InputResult, StatusData};

/// Events broadcast from a Game task to all subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum GameEvent {
    /// Phase/level/cursor changed
    #[serde(rename = "status")]
    Status(StatusData),

    /// Text for the message line
    #[serde(rename = "message")]
    Message(String),

    /// Light a pad for a while
    #[serde(rename = "highlight")]
    Highlight(HighlightData),

    /// A tone was handed to the audio sink
    #[serde(rename = "tone")]
    Tone(ToneCue),

    /// Result of checking a player press
    #[serde(rename = "input")]
    Input(InputResult),

    /// Level counter changed
    #[serde(rename = "level")]
    Level { level: u32 },

    #[serde(rename = "mute")]
    Mute { muted: bool },
}

impl GameEvent {
    /// Serialize to `{"event": "...", "data": {...}}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
