//! Metric cards for the latest reading.
//!
//! One card per channel: the value, and how far it sits from the limit it
//! was evaluated against.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::ThresholdName;
use crate::sink::TickSnapshot;

struct Card {
    title: &'static str,
    value: f64,
    limit: f64,
    delta: f64,
    unit: &'static str,
    precision: usize,
}

impl Card {
    fn for_snapshot(snapshot: &TickSnapshot) -> [Card; 3] {
        let reading = &snapshot.reading;
        let limits = &snapshot.thresholds;
        [
            Card {
                title: " Temperature ",
                value: reading.temperature,
                limit: limits.get(ThresholdName::Temperature),
                delta: limits.delta(ThresholdName::Temperature, reading.temperature),
                unit: "°C",
                precision: 1,
            },
            Card {
                title: " Vibration X ",
                value: reading.vibration_x,
                limit: limits.get(ThresholdName::Vibration),
                delta: limits.delta(ThresholdName::Vibration, reading.vibration_x),
                unit: "",
                precision: 2,
            },
            Card {
                title: " Vibration Z ",
                value: reading.vibration_z,
                limit: limits.get(ThresholdName::Vibration),
                delta: limits.delta(ThresholdName::Vibration, reading.vibration_z),
                unit: "",
                precision: 2,
            },
        ]
    }

    fn is_fault(&self) -> bool {
        self.value > self.limit
    }
}

/// Render the three metric cards side by side.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(area);

    let Some(ref snapshot) = app.latest else {
        for (column, title) in columns
            .iter()
            .zip([" Temperature ", " Vibration X ", " Vibration Z "])
        {
            let block = card_block(app, title, Style::default().fg(app.theme.border));
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "—",
                Style::default().add_modifier(Modifier::DIM),
            )))
            .block(block);
            frame.render_widget(paragraph, *column);
        }
        return;
    };

    for (column, card) in columns.iter().zip(Card::for_snapshot(snapshot)) {
        let style = app.theme.status_style(card.is_fault());
        let lines = vec![
            Line::from(Span::styled(
                format!("{:.*}{}", card.precision, card.value, card.unit),
                style.add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled(format!("{:+.*}", card.precision, card.delta), style),
                Span::styled(
                    format!(" vs limit {:.*}", card.precision, card.limit),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]),
        ];
        let border = if card.is_fault() {
            Style::default().fg(app.theme.fault)
        } else {
            Style::default().fg(app.theme.border)
        };
        frame.render_widget(
            Paragraph::new(lines).block(card_block(app, card.title, border)),
            *column,
        );
    }
}

fn card_block<'a>(app: &App, title: &'a str, border: Style) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border)
}
