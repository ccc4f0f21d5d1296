//! TUI layout compositing: assembles all UI panels.

mod log;
mod message;
mod pads;
mod status;

use std::time::Instant;

use ratatui::prelude::*;

use crate::app::App;

/// Render the full TUI layout.
pub fn draw(frame: &mut Frame, app: &App, now: Instant) {
    let area = frame.area();

    // ┌──────────────────────────────────┐
    // │ Status bar                       │
    // ├────────────────────┬─────────────┤
    // │   Pads (2x2)       │  Event log  │
    // │                    │             │
    // ├────────────────────┴─────────────┤
    // │ Message + key help               │
    // └──────────────────────────────────┘

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status
            Constraint::Min(10),   // content
            Constraint::Length(4), // message
        ])
        .split(area);

    status::draw(frame, app, main_layout[0]);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(30),    // pads
            Constraint::Length(34), // log
        ])
        .split(main_layout[1]);

    pads::draw(frame, app, content_layout[0], now);
    log::draw(frame, app, content_layout[1]);
    message::draw(frame, app, main_layout[2]);
}
