//! Status bar: shows phase, level, progress, sound.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use simon_core::types::RoundPhase;

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let phase_color = match app.phase {
        RoundPhase::Idle => Color::DarkGray,
        RoundPhase::Playback => Color::Blue,
        RoundPhase::AwaitingInput => Color::Green,
        RoundPhase::Failed => Color::Red,
        RoundPhase::Advancing => Color::Magenta,
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.phase),
            Style::default().fg(Color::Black).bg(phase_color),
        ),
        Span::raw(format!(" level: {} ", app.level)),
    ];

    if app.accepting_input {
        spans.push(Span::raw(format!(" {}/{} ", app.cursor, app.sequence_len)));
    }

    let sound = if app.muted {
        Span::styled(" muted ", Style::default().fg(Color::DarkGray))
    } else if let Some(cue) = app.last_tone {
        Span::styled(
            format!(" ♪ {:.0} Hz ", cue.frequency_hz),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::raw(" ♪ ")
    };
    spans.push(sound);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
