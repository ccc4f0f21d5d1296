//! The game loop: runs a RoundController as an independent tokio task.
//!
//! Frontends send [`GameCommand`]s over mpsc and watch [`GameEvent`]s over
//! broadcast. All delayed work (playback highlights, the retry reopen, the
//! level-up pause) runs on one timer task that is aborted whenever new work is
//! armed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info};

use crate::audio::{AudioSink, SilentSink};
use crate::config::Config;
use crate::controller::{Effect, FollowUp, RoundController};
use crate::events::GameEvent;
use crate::schedule::{PlaybackSchedule, PlaybackStep};
use crate::types::Color;

/// Messages that can be sent TO the game (from a frontend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    Start,
    Press(Color),
    ToggleMute,
    Stop,
}

/// Timer firings, tagged with the generation they were armed for.
#[derive(Debug)]
enum Tick {
    Step(PlaybackStep, u64),
    PlaybackDone(u64),
    FollowUp(FollowUp, u64),
}

/// Owns the single pending timer task.
struct Scheduler {
    tick_tx: mpsc::UnboundedSender<Tick>,
    pending: Option<JoinHandle<()>>,
}

impl Scheduler {
    fn new(tick_tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self {
            tick_tx,
            pending: None,
        }
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn playback(&mut self, schedule: PlaybackSchedule, generation: u64) {
        self.cancel();
        let tx = self.tick_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            let started = Instant::now();
            for step in schedule.steps.iter().copied() {
                sleep_until(started + step.offset()).await;
                if tx.send(Tick::Step(step, generation)).is_err() {
                    return;
                }
            }
            sleep_until(started + schedule.total()).await;
            let _ = tx.send(Tick::PlaybackDone(generation));
        }));
    }

    fn after(&mut self, follow_up: FollowUp, delay: Duration, generation: u64) {
        self.cancel();
        let tx = self.tick_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(Tick::FollowUp(follow_up, generation));
        }));
    }
}

/// Owns a RoundController and runs it as an independent tokio task.
pub struct Game {
    controller: RoundController,
    audio: Arc<dyn AudioSink>,

    pub event_tx: broadcast::Sender<GameEvent>,
    pub command_tx: mpsc::Sender<GameCommand>,
    command_rx: Option<mpsc::Receiver<GameCommand>>,
}

impl Game {
    pub fn new(config: Config) -> Self {
        Self::with_controller(RoundController::new(config))
    }

    pub fn with_controller(controller: RoundController) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let (command_tx, command_rx) = mpsc::channel(32);

        Self {
            controller,
            audio: Arc::new(SilentSink),
            event_tx,
            command_tx,
            command_rx: Some(command_rx),
        }
    }

    pub fn with_audio(mut self, audio: Arc<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }

    pub fn command_sender(&self) -> mpsc::Sender<GameCommand> {
        self.command_tx.clone()
    }

    pub fn controller(&self) -> &RoundController {
        &self.controller
    }

    fn broadcast(&self, event: GameEvent) {
        let _ = self.event_tx.send(event);
    }

    fn apply(&self, effects: Vec<Effect>, scheduler: &mut Scheduler) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.broadcast(event),
                Effect::Play(cue) => {
                    // Fire-and-forget: the sink never holds up the loop.
                    self.audio.play(cue);
                    self.broadcast(GameEvent::Tone(cue));
                }
                Effect::SchedulePlayback {
                    schedule,
                    generation,
                } => {
                    debug!(
                        "scheduling {} highlights over {} ms (gen {})",
                        schedule.steps.len(),
                        schedule.total_ms,
                        generation
                    );
                    scheduler.playback(schedule, generation);
                }
                Effect::ScheduleFollowUp {
                    follow_up,
                    delay,
                    generation,
                } => scheduler.after(follow_up, delay, generation),
                Effect::CancelTimers => scheduler.cancel(),
            }
        }
    }

    /// Main loop. Runs until `GameCommand::Stop`.
    pub async fn run(&mut self) {
        let Some(mut command_rx) = self.command_rx.take() else {
            tracing::warn!("Game::run called twice; ignoring");
            return;
        };

        let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(tick_tx);

        info!("Simon is ready.");
        self.broadcast(GameEvent::Status(self.controller.snapshot()));

        loop {
            let effects = tokio::select! {
                cmd = command_rx.recv() => match cmd {
                    Some(GameCommand::Start) => self.controller.start(),
                    Some(GameCommand::Press(color)) => self.controller.press(color),
                    Some(GameCommand::ToggleMute) => self.controller.toggle_mute(),
                    Some(GameCommand::Stop) | None => break,
                },
                Some(tick) = tick_rx.recv() => match tick {
                    Tick::Step(step, generation) => self.controller.playback_step(&step, generation),
                    Tick::PlaybackDone(generation) => self.controller.playback_finished(generation),
                    Tick::FollowUp(follow_up, generation) => {
                        self.controller.follow_up(follow_up, generation)
                    }
                },
            };
            self.apply(effects, &mut scheduler);
        }

        scheduler.cancel();
        info!("Simon stopped at level {}.", self.controller.level());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ChannelSink;
    use crate::types::RoundPhase;

    fn scripted(values: Vec<f64>) -> impl FnMut() -> f64 + Send + 'static {
        let mut i = 0;
        move || {
            let v = values[i % values.len()];
            i += 1;
            v
        }
    }

    fn game() -> Game {
        let controller =
            RoundController::with_rng(Config::default(), scripted(vec![0.1, 0.4, 0.7, 0.9]));
        Game::with_controller(controller)
    }

    /// Receive until `pred` matches, returning everything seen on the way.
    async fn until(
        rx: &mut broadcast::Receiver<GameEvent>,
        pred: impl Fn(&GameEvent) -> bool,
    ) -> Vec<GameEvent> {
        let mut seen = Vec::new();
        loop {
            let ev = rx.recv().await.expect("event stream closed");
            let done = pred(&ev);
            seen.push(ev);
            if done {
                return seen;
            }
        }
    }

    fn awaiting_input(ev: &GameEvent) -> bool {
        matches!(ev, GameEvent::Status(s) if s.phase == RoundPhase::AwaitingInput)
    }

    fn millis_close(actual: Duration, expected_ms: u64) -> bool {
        let ms = actual.as_millis() as u64;
        ms >= expected_ms && ms <= expected_ms + 5
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_follows_schedule() {
        let mut game = game();
        let mut rx = game.subscribe();
        let tx = game.command_sender();
        let handle = tokio::spawn(async move { game.run().await });

        let t0 = Instant::now();
        tx.send(GameCommand::Start).await.unwrap();

        let mut highlights = Vec::new();
        loop {
            match rx.recv().await.unwrap() {
                GameEvent::Highlight(h) => highlights.push((h.color, t0.elapsed())),
                ev if awaiting_input(&ev) => break,
                _ => {}
            }
        }
        let opened_at = t0.elapsed();

        let colors: Vec<Color> = highlights.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            colors,
            vec![Color::Green, Color::Red, Color::Blue, Color::Yellow]
        );
        for ((_, at), expected) in highlights.iter().zip([0, 1150, 2300, 3450]) {
            assert!(millis_close(*at, expected), "{at:?} vs {expected}");
        }
        assert!(millis_close(opened_at, 4600), "{opened_at:?}");

        tx.send(GameCommand::Stop).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_ignored_until_playback_ends() {
        let mut game = game();
        let mut rx = game.subscribe();
        let tx = game.command_sender();
        let handle = tokio::spawn(async move { game.run().await });

        tx.send(GameCommand::Start).await.unwrap();
        tx.send(GameCommand::Press(Color::Green)).await.unwrap();

        let seen = until(&mut rx, awaiting_input).await;
        assert!(!seen.iter().any(|e| matches!(e, GameEvent::Input(_))));

        tx.send(GameCommand::Press(Color::Green)).await.unwrap();
        let seen = until(&mut rx, |e| matches!(e, GameEvent::Input(_))).await;
        match seen.last() {
            Some(GameEvent::Input(r)) => {
                assert!(r.correct);
                assert_eq!(r.next_index, 1);
            }
            other => panic!("unexpected {other:?}"),
        }

        tx.send(GameCommand::Stop).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_round_levels_up_and_extends() {
        let mut game = game();
        let mut rx = game.subscribe();
        let tx = game.command_sender();
        let handle = tokio::spawn(async move {
            game.run().await;
            game
        });

        tx.send(GameCommand::Start).await.unwrap();
        until(&mut rx, awaiting_input).await;

        for c in [Color::Green, Color::Red, Color::Blue, Color::Yellow] {
            tx.send(GameCommand::Press(c)).await.unwrap();
        }
        until(&mut rx, |e| matches!(e, GameEvent::Level { level: 2 })).await;

        // Level 2 replays the same four colors plus one new one.
        let mut replay = Vec::new();
        let seen = until(&mut rx, awaiting_input).await;
        for ev in &seen {
            if let GameEvent::Highlight(h) = ev {
                replay.push(h.color);
            }
        }
        assert_eq!(replay.len(), 5);
        assert_eq!(
            &replay[..4],
            &[Color::Green, Color::Red, Color::Blue, Color::Yellow]
        );

        tx.send(GameCommand::Stop).await.unwrap();
        let game = handle.await.unwrap();
        assert_eq!(game.controller().level(), 2);
        assert_eq!(game.controller().sequence().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_cancels_pending_reopen() {
        let mut game = game();
        let mut rx = game.subscribe();
        let tx = game.command_sender();
        let handle = tokio::spawn(async move { game.run().await });

        tx.send(GameCommand::Start).await.unwrap();
        until(&mut rx, awaiting_input).await;

        // Wrong press, then retry before the 700 ms reopen fires.
        tx.send(GameCommand::Press(Color::Yellow)).await.unwrap();
        until(&mut rx, |e| matches!(e, GameEvent::Input(r) if !r.correct)).await;
        tx.send(GameCommand::Start).await.unwrap();

        let seen = until(&mut rx, awaiting_input).await;
        assert!(!seen
            .iter()
            .any(|e| matches!(e, GameEvent::Message(m) if m == "Try again.")));
        let highlights = seen
            .iter()
            .filter(|e| matches!(e, GameEvent::Highlight(_)))
            .count();
        assert_eq!(highlights, 4);

        tx.send(GameCommand::Stop).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_after_wrong_press() {
        let mut game = game();
        let mut rx = game.subscribe();
        let tx = game.command_sender();
        let handle = tokio::spawn(async move { game.run().await });

        tx.send(GameCommand::Start).await.unwrap();
        until(&mut rx, awaiting_input).await;

        let t0 = Instant::now();
        tx.send(GameCommand::Press(Color::Blue)).await.unwrap();
        until(&mut rx, |e| matches!(e, GameEvent::Message(m) if m == "Try again.")).await;
        assert!(millis_close(t0.elapsed(), 700));

        tx.send(GameCommand::Stop).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_tones_reach_audio_sink() {
        let (sink, mut cues) = ChannelSink::new();
        let mut game = game().with_audio(Arc::new(sink));
        let mut rx = game.subscribe();
        let tx = game.command_sender();
        let handle = tokio::spawn(async move { game.run().await });

        tx.send(GameCommand::Start).await.unwrap();
        until(&mut rx, awaiting_input).await;

        // Start cue plus one per highlight.
        let mut freqs = Vec::new();
        while let Ok(cue) = cues.try_recv() {
            freqs.push(cue.frequency_hz);
        }
        assert_eq!(freqs, vec![392.0, 392.0, 440.0, 330.0, 494.0]);

        tx.send(GameCommand::ToggleMute).await.unwrap();
        until(&mut rx, |e| matches!(e, GameEvent::Mute { muted: true })).await;
        tx.send(GameCommand::Press(Color::Green)).await.unwrap();
        until(&mut rx, |e| matches!(e, GameEvent::Input(_))).await;
        assert!(cues.try_recv().is_err());

        tx.send(GameCommand::Stop).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_playback() {
        let mut game = game();
        let mut rx = game.subscribe();
        let tx = game.command_sender();
        let handle = tokio::spawn(async move {
            game.run().await;
            game
        });

        tx.send(GameCommand::Start).await.unwrap();
        until(&mut rx, |e| matches!(e, GameEvent::Highlight(_))).await;
        tx.send(GameCommand::Stop).await.unwrap();

        let game = handle.await.unwrap();
        assert_eq!(game.controller().phase(), RoundPhase::Playback);
        assert!(!game.controller().is_accepting_input());
    }
}
