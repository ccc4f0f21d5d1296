//! The pad grid. Pads light up while a highlight is active.

use std::time::Instant;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use simon_core::types::Color as PadColor;

use crate::app::App;

/// (lit, dim) terminal colors for a pad.
fn pad_style(color: PadColor) -> (Color, Color) {
    match color {
        PadColor::Green => (Color::LightGreen, Color::Rgb(0, 70, 0)),
        PadColor::Red => (Color::LightRed, Color::Rgb(80, 0, 0)),
        PadColor::Blue => (Color::LightBlue, Color::Rgb(0, 0, 90)),
        PadColor::Yellow => (Color::LightYellow, Color::Rgb(90, 80, 0)),
    }
}

pub fn draw(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let block = Block::default()
        .title(" Simon ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(inner);

    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
                .split(*row)
                .to_vec()
        })
        .collect();

    // Palettes longer than four pads only show their first four.
    for (i, (&color, cell)) in app.palette.iter().zip(cells.iter()).enumerate() {
        let (lit, dim) = pad_style(color);
        let bg = if app.is_lit(color, now) { lit } else { dim };
        let label = format!("{} {}", i + 1, color);

        let pad = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(bg).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(pad, *cell);
    }
}
