//! Scrolling event log: messages, hits and misses with timestamps.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{App, LogKind};

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Log ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let start = app.log.len().saturating_sub(visible);

    let lines: Vec<Line> = app.log[start..]
        .iter()
        .map(|line| {
            let fg = match line.kind {
                LogKind::Message => Color::White,
                LogKind::Hit => Color::Green,
                LogKind::Miss => Color::Red,
                LogKind::Level => Color::Magenta,
                LogKind::System => Color::DarkGray,
            };
            Line::from(vec![
                Span::styled(
                    line.at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(line.text.clone(), Style::default().fg(fg)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
