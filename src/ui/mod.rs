//! Terminal rendering with ratatui.
//!
//! ```text
//!  header     state, progress, live limits
//!  metrics    temperature | vibration X | vibration Z
//!  tabs       1:Vibration | 2:Temperature
//!  trend      chart over the rolling window
//!  diagnosis  fault reasons or normal status
//!  status     messages and controls
//! ```

pub mod common;
pub mod diagnosis;
pub mod metrics;
pub mod theme;
pub mod trend;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 20;

/// Draw the whole dashboard.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let top = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(0, top, area.width, 5.min(area.height - top));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(4), // Metric cards
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Trend chart
        Constraint::Length(5), // Diagnosis
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    metrics::render(frame, app, chunks[1]);
    common::render_tabs(frame, app, chunks[2]);
    trend::render(frame, app, chunks[3]);
    diagnosis::render(frame, app, chunks[4]);
    common::render_status_bar(frame, app, chunks[5]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
