//! App state, input mapping, event handling.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use simon_core::audio::ToneCue;
use simon_core::config::Config;
use simon_core::events::GameEvent;
use simon_core::types::{Color as PadColor, RoundPhase};

/// Keep the log from growing without bound.
const MAX_LOG_LINES: usize = 200;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LogKind {
    Message,
    Hit,
    Miss,
    Level,
    System,
}

#[derive(Clone, Debug)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub kind: LogKind,
    pub text: String,
}

/// The main application state, mirrored from game events.
pub struct App {
    pub palette: Vec<PadColor>,
    pub level: u32,
    pub phase: RoundPhase,
    pub message: String,
    pub start_label: String,
    pub start_enabled: bool,
    pub accepting_input: bool,
    pub muted: bool,
    pub cursor: usize,
    pub sequence_len: usize,
    pub last_tone: Option<ToneCue>,
    pub log: Vec<LogLine>,
    pub should_quit: bool,
    /// Ring the terminal bell for tone cues.
    pub bell: bool,
    /// Lit pads and when they go dark.
    lit: HashMap<PadColor, Instant>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        App {
            palette: config.palette.clone(),
            level: 1,
            phase: RoundPhase::Idle,
            message: "Press Enter to start.".to_string(),
            start_label: "Start".to_string(),
            start_enabled: true,
            accepting_input: false,
            muted: config.muted,
            cursor: 0,
            sequence_len: 0,
            last_tone: None,
            log: Vec::new(),
            should_quit: false,
            bell: true,
            lit: HashMap::new(),
        }
    }

    fn push_log(&mut self, kind: LogKind, text: impl Into<String>) {
        self.log.push(LogLine {
            at: Local::now(),
            kind,
            text: text.into(),
        });
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
    }

    /// Apply one game event at time `now`.
    pub fn handle_event(&mut self, event: GameEvent, now: Instant) {
        match event {
            GameEvent::Status(status) => {
                self.phase = status.phase;
                self.level = status.level;
                self.accepting_input = status.accepting_input;
                self.muted = status.muted;
                self.cursor = status.cursor;
                self.sequence_len = status.sequence_len;
                self.start_label = status.start_label;
                self.start_enabled = status.start_enabled;
            }
            GameEvent::Message(text) => {
                self.message = text.clone();
                self.push_log(LogKind::Message, text);
            }
            GameEvent::Highlight(h) => {
                self.lit
                    .insert(h.color, now + Duration::from_millis(h.duration_ms));
            }
            GameEvent::Tone(cue) => {
                self.last_tone = Some(cue);
            }
            GameEvent::Input(result) => {
                if result.correct {
                    self.push_log(
                        LogKind::Hit,
                        format!("hit {}/{}", result.next_index, self.sequence_len),
                    );
                } else {
                    self.push_log(LogKind::Miss, "miss");
                }
            }
            GameEvent::Level { level } => {
                self.level = level;
                self.push_log(LogKind::Level, format!("Level {}", level));
            }
            GameEvent::Mute { muted } => {
                self.muted = muted;
                self.push_log(
                    LogKind::System,
                    if muted { "Sound off" } else { "Sound on" },
                );
            }
        }
    }

    /// Drop highlights that have run out.
    pub fn tick(&mut self, now: Instant) {
        self.lit.retain(|_, until| *until > now);
    }

    pub fn is_lit(&self, color: PadColor, now: Instant) -> bool {
        self.lit.get(&color).is_some_and(|until| *until > now)
    }
}

/// Pad for a key: `1`-`4` by palette position, or the color's initial letter.
pub fn pad_for_key(palette: &[PadColor], key: char) -> Option<PadColor> {
    if let Some(d) = key.to_digit(10) {
        return (d as usize)
            .checked_sub(1)
            .and_then(|i| palette.get(i))
            .copied();
    }
    let key = key.to_ascii_lowercase();
    palette
        .iter()
        .copied()
        .find(|c| c.name().starts_with(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::types::{HighlightData, InputResult, StatusData};

    #[test]
    fn test_pad_keys() {
        let palette = simon_core::DEFAULT_PALETTE.to_vec();
        assert_eq!(pad_for_key(&palette, '1'), Some(PadColor::Green));
        assert_eq!(pad_for_key(&palette, '4'), Some(PadColor::Yellow));
        assert_eq!(pad_for_key(&palette, '0'), None);
        assert_eq!(pad_for_key(&palette, '5'), None);
        assert_eq!(pad_for_key(&palette, 'B'), Some(PadColor::Blue));
        assert_eq!(pad_for_key(&palette, 'r'), Some(PadColor::Red));
        assert_eq!(pad_for_key(&palette, 'x'), None);
    }

    #[test]
    fn test_highlight_expires() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.handle_event(
            GameEvent::Highlight(HighlightData {
                color: PadColor::Red,
                duration_ms: 300,
            }),
            now,
        );
        assert!(app.is_lit(PadColor::Red, now + Duration::from_millis(100)));
        assert!(!app.is_lit(PadColor::Green, now));

        app.tick(now + Duration::from_millis(301));
        assert!(!app.is_lit(PadColor::Red, now + Duration::from_millis(301)));
    }

    #[test]
    fn test_status_mirrors_controller() {
        let mut app = App::new(&Config::default());
        app.handle_event(
            GameEvent::Status(StatusData {
                phase: RoundPhase::AwaitingInput,
                level: 3,
                sequence_len: 6,
                cursor: 2,
                accepting_input: true,
                muted: true,
                start_label: "Retry".into(),
                start_enabled: true,
            }),
            Instant::now(),
        );
        assert_eq!(app.level, 3);
        assert_eq!(app.phase, RoundPhase::AwaitingInput);
        assert!(app.accepting_input);
        assert!(app.muted);
        assert_eq!(app.start_label, "Retry");
    }

    #[test]
    fn test_log_lines() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();
        app.handle_event(GameEvent::Message("Your turn.".into()), now);
        app.handle_event(
            GameEvent::Input(InputResult {
                correct: false,
                next_index: 0,
                is_complete: false,
            }),
            now,
        );
        assert_eq!(app.message, "Your turn.");
        assert_eq!(app.log.len(), 2);
        assert_eq!(app.log[1].kind, LogKind::Miss);

        for i in 0..(MAX_LOG_LINES + 10) {
            app.handle_event(GameEvent::Message(format!("m{i}")), now);
        }
        assert_eq!(app.log.len(), MAX_LOG_LINES);
    }
}
