//! Diagnosis panel: the latest classification in words.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::NORMAL_MESSAGE;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut border = Style::default().fg(app.theme.border);

    let lines = match app.latest {
        None => vec![Line::from(Span::styled(
            "Waiting for the first reading",
            Style::default().add_modifier(Modifier::DIM),
        ))],
        Some(ref snapshot) if snapshot.is_fault() => {
            border = Style::default().fg(app.theme.fault);
            let style = app.theme.status_style(true);
            let mut lines = vec![Line::from(vec![
                Span::styled("⚠ Fault detected at ", style),
                Span::styled(
                    snapshot.reading.timestamp.clone(),
                    style.add_modifier(Modifier::UNDERLINED),
                ),
            ])];
            lines.extend(
                snapshot
                    .classification
                    .messages()
                    .into_iter()
                    .map(|msg| Line::from(format!("  • {}", msg))),
            );
            lines
        }
        Some(ref snapshot) => vec![Line::from(vec![
            Span::styled(format!("✓ {}", NORMAL_MESSAGE), app.theme.status_style(false)),
            Span::styled(
                format!("  (t={})", snapshot.reading.timestamp),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ])],
    };

    let block = Block::default()
        .title(" Diagnosis ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border);

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
