//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::replay::ReplayState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for readings within limits.
    pub normal: Color,
    /// Color for readings over a limit.
    pub fault: Color,
    /// Color for a stopped or interrupted session.
    pub warning: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Trend series colors.
    pub series_x: Color,
    pub series_z: Color,
    pub series_temperature: Color,
    /// Color of the limit line drawn across trend charts.
    pub limit_line: Color,
    pub header: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            normal: Color::Green,
            fault: Color::Red,
            warning: Color::Yellow,
            border: Color::Gray,
            series_x: Color::Cyan,
            series_z: Color::Magenta,
            series_temperature: Color::LightRed,
            limit_line: Color::Yellow,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            normal: Color::Green,
            fault: Color::Red,
            warning: Color::Yellow,
            border: Color::DarkGray,
            series_x: Color::Blue,
            series_z: Color::Magenta,
            series_temperature: Color::Red,
            limit_line: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a value that is or isn't over its limit.
    pub fn status_style(&self, is_fault: bool) -> Style {
        if is_fault {
            Style::default().fg(self.fault).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.normal)
        }
    }

    pub fn state_style(&self, state: ReplayState) -> Style {
        match state {
            ReplayState::Idle => Style::default().add_modifier(Modifier::DIM),
            ReplayState::Running => Style::default().fg(self.normal),
            ReplayState::Completed => Style::default().fg(self.highlight),
            ReplayState::Stopped => Style::default().fg(self.warning),
            ReplayState::Failed => Style::default().fg(self.fault).add_modifier(Modifier::BOLD),
        }
    }
}
