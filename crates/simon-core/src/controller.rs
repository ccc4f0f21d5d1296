//! Round controller: level, sequence, cursor and input gating for one game.
//!
//! The controller is synchronous. Every operation returns the [`Effect`]s the
//! driver has to carry out (broadcast, play a tone, arm a timer), which keeps
//! the whole state machine testable without a runtime.
//!
//! Timers are tagged with a generation number. Starting a new playback bumps
//! the generation, so anything armed for an older playback is ignored when it
//! fires, even if it was already queued before the driver cancelled it.

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::audio::ToneCue;
use crate::config::Config;
use crate::events::GameEvent;
use crate::schedule::{PlaybackSchedule, PlaybackStep, Timing};
use crate::sequence::{advance_sequence, check_user_input, random_unit};
use crate::types::{Color, HighlightData, RoundPhase, StatusData};

/// Delayed transitions armed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Reopen input after a wrong press.
    Reopen,
    /// Start the next, longer round after a completed one.
    NextRound,
}

/// Work for the driver, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Emit(GameEvent),
    Play(ToneCue),
    SchedulePlayback {
        schedule: PlaybackSchedule,
        generation: u64,
    },
    ScheduleFollowUp {
        follow_up: FollowUp,
        delay: Duration,
        generation: u64,
    },
    CancelTimers,
}

type UnitRng = Box<dyn FnMut() -> f64 + Send>;

pub struct RoundController {
    config: Config,
    timing: Timing,
    rng: UnitRng,

    level: u32,
    sequence: Vec<Color>,
    cursor: usize,
    accepting_input: bool,
    start_enabled: bool,
    muted: bool,
    phase: RoundPhase,
    generation: u64,
    message: String,
}

impl std::fmt::Debug for RoundController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundController")
            .field("level", &self.level)
            .field("sequence", &self.sequence)
            .field("cursor", &self.cursor)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl RoundController {
    /// Seeded from `config.seed` when set, otherwise from the thread RNG.
    pub fn new(config: Config) -> Self {
        let seed = config.seed;
        match seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                Self::with_rng(config, move || rng.gen::<f64>())
            }
            None => Self::with_rng(config, random_unit),
        }
    }

    pub fn with_rng(config: Config, rng: impl FnMut() -> f64 + Send + 'static) -> Self {
        let timing = config.timing();
        let muted = config.muted;
        Self {
            config,
            timing,
            rng: Box::new(rng),
            level: 1,
            sequence: Vec::new(),
            cursor: 0,
            accepting_input: false,
            start_enabled: true,
            muted,
            phase: RoundPhase::Idle,
            generation: 0,
            message: String::new(),
        }
    }

    // ── Accessors ──

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn sequence(&self) -> &[Color] {
        &self.sequence
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_accepting_input(&self) -> bool {
        self.accepting_input
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn start_label(&self) -> &'static str {
        if self.level > 1 {
            "Retry"
        } else {
            "Start"
        }
    }

    pub fn snapshot(&self) -> StatusData {
        StatusData {
            phase: self.phase,
            level: self.level,
            sequence_len: self.sequence.len(),
            cursor: self.cursor,
            accepting_input: self.accepting_input,
            muted: self.muted,
            start_label: self.start_label().to_string(),
            start_enabled: self.start_enabled,
        }
    }

    // ── Effect helpers ──

    fn set_message(&mut self, fx: &mut Vec<Effect>, text: impl Into<String>) {
        self.message = text.into();
        fx.push(Effect::Emit(GameEvent::Message(self.message.clone())));
    }

    fn tone(&self, fx: &mut Vec<Effect>, cue: ToneCue) {
        if !self.muted {
            fx.push(Effect::Play(cue));
        }
    }

    fn status(&self, fx: &mut Vec<Effect>) {
        fx.push(Effect::Emit(GameEvent::Status(self.snapshot())));
    }

    // ── Operations ──

    /// Start/retry button. Starts a round when there is no sequence yet,
    /// otherwise replays the current one. Ignored while the button is disabled
    /// (during playback and the level-up pause).
    pub fn start(&mut self) -> Vec<Effect> {
        if !self.start_enabled {
            debug!("start ignored while {}", self.phase);
            return Vec::new();
        }

        let mut fx = vec![Effect::CancelTimers];
        self.tone(
            &mut fx,
            ToneCue::for_color(Color::Green, self.config.start_tone_ms),
        );
        fx.push(Effect::Emit(GameEvent::Level { level: self.level }));

        if self.sequence.is_empty() {
            self.start_round(&mut fx);
        } else {
            info!("Replaying level {} ({} colors)", self.level, self.sequence.len());
            self.begin_playback(&mut fx);
        }
        fx
    }

    fn start_round(&mut self, fx: &mut Vec<Effect>) {
        let extended = advance_sequence(
            &self.sequence,
            i64::from(self.level),
            &self.config.palette,
            &mut self.rng,
        );
        match extended {
            Ok(sequence) => {
                self.sequence = sequence;
                info!("Level {} round: {} colors", self.level, self.sequence.len());
                self.begin_playback(fx);
            }
            Err(e) => {
                warn!("Cannot start round: {}", e);
                self.set_message(fx, format!("Cannot start: {e}."));
                self.status(fx);
            }
        }
    }

    fn begin_playback(&mut self, fx: &mut Vec<Effect>) {
        self.generation += 1;
        self.accepting_input = false;
        self.start_enabled = false;
        self.cursor = 0;
        self.phase = RoundPhase::Playback;
        self.set_message(fx, "Watch the sequence...");
        self.status(fx);

        let schedule = PlaybackSchedule::build(&self.sequence, self.level, &self.timing);
        fx.push(Effect::SchedulePlayback {
            schedule,
            generation: self.generation,
        });
    }

    /// One scheduled highlight fired.
    pub fn playback_step(&mut self, step: &PlaybackStep, generation: u64) -> Vec<Effect> {
        if generation != self.generation || self.phase != RoundPhase::Playback {
            debug!("dropping stale playback step {}", step.index);
            return Vec::new();
        }

        let mut fx = vec![Effect::Emit(GameEvent::Highlight(HighlightData {
            color: step.color,
            duration_ms: step.highlight_ms,
        }))];
        self.tone(&mut fx, ToneCue::for_color(step.color, step.tone_ms));
        fx
    }

    /// The last scheduled highlight has run its course; hand over to the player.
    pub fn playback_finished(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.generation || self.phase != RoundPhase::Playback {
            return Vec::new();
        }

        let mut fx = Vec::new();
        self.accepting_input = true;
        self.start_enabled = true;
        self.phase = RoundPhase::AwaitingInput;
        self.set_message(&mut fx, "Your turn.");
        self.status(&mut fx);
        fx
    }

    /// A pad press from the player.
    pub fn press(&mut self, color: Color) -> Vec<Effect> {
        if !self.accepting_input {
            return Vec::new();
        }

        let mut fx = vec![Effect::Emit(GameEvent::Highlight(HighlightData {
            color,
            duration_ms: self.config.press_highlight_ms,
        }))];
        self.tone(
            &mut fx,
            ToneCue::for_color(color, self.config.press_tone_ms),
        );

        let result = check_user_input(&self.sequence, self.cursor, &color);
        debug!(
            "press {} at {} -> correct={} next={}",
            color, self.cursor, result.correct, result.next_index
        );
        fx.push(Effect::Emit(GameEvent::Input(result)));
        self.cursor = result.next_index;

        if !result.correct {
            self.accepting_input = false;
            self.start_enabled = true;
            self.phase = RoundPhase::Failed;
            self.tone(&mut fx, ToneCue::error());
            let retry = if self.level > 1 { "retry" } else { "start" };
            let text = format!("Incorrect. Press {retry} to replay level {}.", self.level);
            info!("Wrong press at level {}", self.level);
            self.set_message(&mut fx, text);
            fx.push(Effect::ScheduleFollowUp {
                follow_up: FollowUp::Reopen,
                delay: Duration::from_millis(self.config.retry_delay_ms),
                generation: self.generation,
            });
        } else if result.is_complete {
            self.accepting_input = false;
            self.start_enabled = false;
            self.level += 1;
            self.phase = RoundPhase::Advancing;
            info!("Sequence complete, advancing to level {}", self.level);
            fx.push(Effect::Emit(GameEvent::Level { level: self.level }));
            self.set_message(&mut fx, "Correct! Next level starting...");
            fx.push(Effect::ScheduleFollowUp {
                follow_up: FollowUp::NextRound,
                delay: Duration::from_millis(self.config.advance_delay_ms),
                generation: self.generation,
            });
        }

        self.status(&mut fx);
        fx
    }

    /// A delayed transition fired.
    pub fn follow_up(&mut self, follow_up: FollowUp, generation: u64) -> Vec<Effect> {
        if generation != self.generation {
            return Vec::new();
        }

        let mut fx = Vec::new();
        match follow_up {
            FollowUp::Reopen => {
                if self.accepting_input || self.phase != RoundPhase::Failed {
                    return fx;
                }
                self.accepting_input = true;
                self.phase = RoundPhase::AwaitingInput;
                self.set_message(&mut fx, "Try again.");
                self.status(&mut fx);
            }
            FollowUp::NextRound => {
                if self.phase != RoundPhase::Advancing {
                    return fx;
                }
                self.start_round(&mut fx);
            }
        }
        fx
    }

    pub fn toggle_mute(&mut self) -> Vec<Effect> {
        self.muted = !self.muted;
        let mut fx = vec![Effect::Emit(GameEvent::Mute { muted: self.muted })];
        self.status(&mut fx);
        fx
    }
}
