//! simon-tui: Terminal front end for the Simon memory game.
//! Uses Ratatui + Crossterm for rendering.

mod app;
mod ui;

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{debug, info, warn};

use simon_core::audio::ChannelSink;
use simon_core::config::Config;
use simon_core::game::{Game, GameCommand};

use app::{pad_for_key, App};

fn load_config() -> Config {
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match Config::load_from_dir(&project_root) {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default config: {:#}", e);
            let mut config = Config::default();
            if let Err(e) = config.apply_overrides(|key| std::env::var(key).ok()) {
                warn!("Ignoring env overrides: {:#}", e);
            }
            if config.validate().is_err() {
                config.palette = Config::default().palette;
            }
            config
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing to a file (not stdout, since we own the terminal)
    let _guard = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(|| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("simon-tui.log")
                .map(|f| Box::new(f) as Box<dyn io::Write>)
                .unwrap_or_else(|_| Box::new(io::sink()))
        })
        .try_init();

    let config = load_config();
    let mut app = App::new(&config);

    let (sink, mut tones) = ChannelSink::new();
    let mut game = Game::new(config).with_audio(Arc::new(sink));
    let mut rx = game.subscribe();
    let command_tx = game.command_sender();

    let game_task = tokio::spawn(async move {
        game.run().await;
    });

    // Forward game events into an unbounded channel so the draw loop never blocks.
    let (fwd_tx, mut events) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    debug!("event {}", event.to_json());
                    if fwd_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("UI lagged {} events", n);
                }
                Err(_) => break,
            }
        }
    });

    info!("Starting Simon TUI");

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &mut events, &mut tones, &command_tx).await;

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    let _ = command_tx.send(GameCommand::Stop).await;
    let _ = game_task.await;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<simon_core::events::GameEvent>,
    tones: &mut tokio::sync::mpsc::UnboundedReceiver<simon_core::audio::ToneCue>,
    command_tx: &tokio::sync::mpsc::Sender<GameCommand>,
) -> Result<()> {
    loop {
        let now = Instant::now();

        // Handle game events (non-blocking)
        while let Ok(event) = events.try_recv() {
            app.handle_event(event, now);
        }
        // No synth in a terminal: one bell per frame stands in for any tones queued.
        let mut ring = false;
        while tones.try_recv().is_ok() {
            ring = true;
        }
        if ring && app.bell {
            let _ = io::stdout().write_all(b"\x07").and_then(|_| io::stdout().flush());
        }
        app.tick(now);

        terminal.draw(|frame| ui::draw(frame, app, now))?;

        // Handle terminal events
        if event::poll(Duration::from_millis(30))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let command = match (key.code, key.modifiers) {
                    (KeyCode::Char('c'), KeyModifiers::CONTROL)
                    | (KeyCode::Char('q'), _)
                    | (KeyCode::Esc, _) => {
                        app.should_quit = true;
                        None
                    }
                    (KeyCode::Enter, _) | (KeyCode::Char(' '), _) if app.start_enabled => {
                        Some(GameCommand::Start)
                    }
                    (KeyCode::Char('m'), _) => Some(GameCommand::ToggleMute),
                    (KeyCode::Char('!'), _) => {
                        app.bell = !app.bell;
                        None
                    }
                    (KeyCode::Char(c), _) => pad_for_key(&app.palette, c).map(GameCommand::Press),
                    _ => None,
                };
                if let Some(cmd) = command {
                    command_tx.send(cmd).await?;
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
