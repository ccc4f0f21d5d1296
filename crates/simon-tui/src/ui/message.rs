//! Message line and key help.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let border_color = if app.accepting_input {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let start_style = if app.start_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines = vec![
        Line::styled(app.message.as_str(), Style::default().fg(Color::White)),
        Line::from(vec![
            Span::styled(format!("Enter {}", app.start_label), start_style),
            Span::styled(
                "  1-4/g r b y press  m mute  ! bell  q quit",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
