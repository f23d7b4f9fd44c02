//! Trend charts over the rolling window.
//!
//! Each chart plots window position on the x axis and draws the limit the
//! latest reading was evaluated against as a flat line.

use std::sync::Arc;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::{App, View};
use crate::sink::TickSnapshot;
use crate::source::Reading;

/// Render the chart for the current view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} trend ", app.current_view.label()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(ref snapshot) = app.latest else {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No data yet. Press s to start the replay.",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    match app.current_view {
        View::Vibration => render_vibration(frame, app, snapshot, block, area),
        View::Temperature => render_temperature(frame, app, snapshot, block, area),
    }
}

fn render_vibration(
    frame: &mut Frame,
    app: &App,
    snapshot: &TickSnapshot,
    block: Block,
    area: Rect,
) {
    let limit = snapshot.thresholds.vibration_limit;
    let x_points = series(&snapshot.window, |r| r.vibration_x);
    let z_points = series(&snapshot.window, |r| r.vibration_z);
    let limit_points = limit_line(snapshot.window.len(), limit);

    let peak = x_points
        .iter()
        .chain(&z_points)
        .map(|(_, y)| *y)
        .fold(limit, f64::max);
    let y_bounds = [0.0, (peak * 1.2).max(1.0)];

    let datasets = vec![
        dataset("X", &x_points, Style::default().fg(app.theme.series_x)),
        dataset("Z", &z_points, Style::default().fg(app.theme.series_z)),
        dataset(
            "limit",
            &limit_points,
            Style::default().fg(app.theme.limit_line),
        ),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis(snapshot))
        .y_axis(y_axis("amplitude", y_bounds, 2));
    frame.render_widget(chart, area);
}

fn render_temperature(
    frame: &mut Frame,
    app: &App,
    snapshot: &TickSnapshot,
    block: Block,
    area: Rect,
) {
    let limit = snapshot.thresholds.temperature_limit;
    let points = series(&snapshot.window, |r| r.temperature);
    let limit_points = limit_line(snapshot.window.len(), limit);

    let (low, high) = points
        .iter()
        .map(|(_, y)| *y)
        .fold((limit, limit), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let y_bounds = [(low - 5.0).floor(), (high + 5.0).ceil()];

    let datasets = vec![
        dataset(
            "temperature",
            &points,
            Style::default().fg(app.theme.series_temperature),
        ),
        dataset(
            "limit",
            &limit_points,
            Style::default().fg(app.theme.limit_line),
        ),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis(snapshot))
        .y_axis(y_axis("°C", y_bounds, 0));
    frame.render_widget(chart, area);
}

fn series(window: &[Arc<Reading>], value: impl Fn(&Reading) -> f64) -> Vec<(f64, f64)> {
    window
        .iter()
        .enumerate()
        .map(|(i, reading)| (i as f64, value(reading)))
        .collect()
}

fn limit_line(len: usize, limit: f64) -> Vec<(f64, f64)> {
    vec![(0.0, limit), (x_max(len), limit)]
}

fn x_max(len: usize) -> f64 {
    len.saturating_sub(1).max(1) as f64
}

fn dataset<'a>(name: &'a str, points: &'a [(f64, f64)], style: Style) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(style)
        .data(points)
}

/// X axis labelled with the oldest and newest timestamps in the window.
fn x_axis(snapshot: &TickSnapshot) -> Axis<'static> {
    let first = snapshot
        .window
        .first()
        .map(|r| r.timestamp.clone())
        .unwrap_or_default();
    let last = snapshot.reading.timestamp.clone();
    Axis::default()
        .bounds([0.0, x_max(snapshot.window.len())])
        .labels(vec![Span::raw(first), Span::raw(last)])
        .style(Style::default().add_modifier(Modifier::DIM))
}

fn y_axis(title: &'static str, bounds: [f64; 2], precision: usize) -> Axis<'static> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    Axis::default()
        .title(title)
        .bounds(bounds)
        .labels(
            [bounds[0], mid, bounds[1]]
                .iter()
                .map(|v| Span::raw(format!("{:.*}", precision, v)))
                .collect::<Vec<_>>(),
        )
        .style(Style::default().add_modifier(Modifier::DIM))
}
