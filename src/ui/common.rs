//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{format_limit, App, View};
use crate::data::duration::format_duration;
use crate::data::ThresholdName;

/// Render the header bar with replay state and progress.
///
/// Displays: state indicator, tick progress, live limits, pacing.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.replay_status();
    let thresholds = app.thresholds();

    let percent = if status.total == 0 {
        0.0
    } else {
        status.cursor as f64 * 100.0 / status.total as f64
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.state_style(status.state)),
        Span::styled("MOTORWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(status.state.label(), app.theme.state_style(status.state)),
        Span::raw(" │ "),
        Span::styled(
            format!("{}/{}", status.cursor, status.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" ({:.0}%) │ ", percent)),
        Span::raw(format!(
            "limits T>{} V>{} │ every {}",
            format_limit(ThresholdName::Temperature, thresholds.temperature_limit),
            format_limit(ThresholdName::Vibration, thresholds.vibration_limit),
            format_duration(app.interval()),
        )),
    ];

    if app.fault_count > 0 {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} faults", app.fault_count),
            Style::default().fg(app.theme.fault),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar for the trend charts.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Vibration "), Line::from(" 2:Temperature ")];

    let selected = match app.current_view {
        View::Vibration => 0,
        View::Temperature => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Temporary messages win, then a session error, then the controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = app.replay_status();
    if let Some(err) = status.last_error {
        let paragraph = Paragraph::new(format!(" Error: {} | s:restart q:quit", err))
            .style(Style::default().fg(app.theme.fault));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if status.state.is_running() {
        "x:stop +/-:temp ]/[:vib Tab:chart e:export ?:help q:quit"
    } else {
        "s:start +/-:temp ]/[:vib Tab:chart e:export ?:help q:quit"
    };
    let text = format!(" {} | {}", app.source_description(), controls);

    let paragraph = Paragraph::new(text).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Replay"),
        Line::from("  s           Start (restarts from the top)"),
        Line::from("  x           Stop after the current tick"),
        Line::from(""),
        section(" Thresholds"),
        Line::from("  + / -       Temperature limit ±1°C"),
        Line::from("  ] / [       Vibration limit ±0.1"),
        Line::from(""),
        section(" View"),
        Line::from("  Tab ←/→     Switch chart"),
        Line::from("  1 / 2       Vibration / Temperature"),
        Line::from(""),
        section(" General"),
        Line::from("  e           Export snapshot to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
