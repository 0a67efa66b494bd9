//! Dashboard colors.
//!
//! A [`Palette`] is the small set of base colors that changes between light
//! and dark terminals. [`Theme`] turns it into the styles the views draw
//! with: instance health, metric rows and their values, and the chrome.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use xmrwatch_sdk::MetricState;

use crate::setup::InstanceHealth;

/// Base colors of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Titles, the active tab and status messages.
    pub accent: Color,
    /// Borders, inactive tabs and disabled metrics.
    pub muted: Color,
    /// Background of the selected row.
    pub selection: Color,
    pub healthy: Color,
    pub pending: Color,
    pub errored: Color,
}

impl Palette {
    pub const DARK: Palette = Palette {
        accent: Color::Cyan,
        muted: Color::DarkGray,
        selection: Color::DarkGray,
        healthy: Color::Green,
        pending: Color::Yellow,
        errored: Color::Red,
    };

    pub const LIGHT: Palette = Palette {
        accent: Color::Blue,
        muted: Color::Gray,
        selection: Color::LightBlue,
        healthy: Color::Green,
        pending: Color::Yellow,
        errored: Color::Red,
    };
}

/// Styles for every element of the dashboard, derived from a [`Palette`].
#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
    pub border_type: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_palette(palette: Palette) -> Self {
        Self {
            palette,
            border_type: BorderType::Rounded,
        }
    }

    pub fn dark() -> Self {
        Self::from_palette(Palette::DARK)
    }

    pub fn light() -> Self {
        Self::from_palette(Palette::LIGHT)
    }

    /// Pick light or dark from the terminal's background luminance.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn health_color(&self, health: InstanceHealth) -> Color {
        match health {
            InstanceHealth::Healthy => self.palette.healthy,
            InstanceHealth::Pending => self.palette.pending,
            InstanceHealth::Errored => self.palette.errored,
        }
    }

    /// Style for an instance health; errored is bold.
    pub fn health(&self, health: InstanceHealth) -> Style {
        let style = Style::default().fg(self.health_color(health));
        match health {
            InstanceHealth::Errored => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }

    /// A metric row; disabled metrics are dimmed.
    pub fn metric_row(&self, enabled: bool) -> Style {
        if enabled {
            Style::default()
        } else {
            Style::default().fg(self.palette.muted)
        }
    }

    /// The value cell of a metric.
    pub fn metric_value(&self, state: &MetricState) -> Style {
        if state.is_unknown() {
            Style::default().fg(self.palette.errored)
        } else {
            Style::default()
        }
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    pub fn selected(&self) -> Style {
        Style::default().bg(self.palette.selection).add_modifier(Modifier::BOLD)
    }

    pub fn tab_active(&self) -> Style {
        self.title()
    }

    pub fn tab_inactive(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }
}
