//! Common UI components shared across views.
//!
//! This module contains the header bar, instance tab bar, status bar, and
//! help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::format::{format_age, format_hashrate};
use crate::setup::InstanceHealth;

/// Render the header bar with the fleet overview.
///
/// Displays: status indicator, instance counts by health, combined hashrate.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (healthy, pending, errored) = app.health_counts();
    let total = app.instances.len();

    let overall = if errored > 0 {
        InstanceHealth::Errored
    } else if pending > 0 {
        InstanceHealth::Pending
    } else {
        InstanceHealth::Healthy
    };

    let hashrate: f64 = app
        .instances
        .iter()
        .filter_map(|i| i.registry.get("hashrate10s"))
        .filter_map(|e| app.state_of(&e).as_f64())
        .sum();

    let line = Line::from(vec![
        Span::styled(format!(" {} ", overall.symbol()), app.theme.health(overall)),
        Span::styled("XMRWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", healthy), app.theme.health(InstanceHealth::Healthy)),
        Span::raw(" ok "),
        count_span(pending, app.theme.health(InstanceHealth::Pending)),
        Span::raw(" pending "),
        count_span(errored, app.theme.health(InstanceHealth::Errored)),
        Span::raw(" err │ "),
        Span::styled(format!("{}", total), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" instances │ "),
        Span::raw(format!("Σ {}", format_hashrate(hashrate))),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn count_span(count: usize, style: Style) -> Span<'static> {
    if count > 0 {
        Span::styled(format!("{}", count), style)
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    }
}

/// Render one tab per instance, highlighting the selected one.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app
        .instances
        .iter()
        .enumerate()
        .map(|(i, instance)| {
            let health = instance.health();
            Line::from(vec![
                Span::raw(format!(" {}:", i + 1)),
                Span::styled(health.symbol(), app.theme.health(health)),
                Span::raw(format!(" {} ", instance.name())),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.selected_instance)
        .style(app.theme.tab_inactive())
        .highlight_style(app.theme.tab_active())
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the update signal of the selected instance, time since its last
/// refresh, and available controls. Temporary status messages take over.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph = Paragraph::new(format!(" {} ", msg)).style(app.theme.accent());
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "Tab:instance ↑↓:select space:toggle r:refresh e:export ?:help q:quit";

    let status = match app.current_instance() {
        Some(instance) => {
            let updated = instance
                .controller
                .last_refresh()
                .map(|t| format!("Updated {} ago", format_age(t.elapsed())))
                .unwrap_or_else(|| "Waiting for first refresh".to_string());
            format!(
                " {} | {} | {}",
                instance.controller.update_signal(),
                updated,
                controls
            )
        }
        None => " No instances passed setup | q:quit".to_string(),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.title())]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab ←/→ h/l  Switch instance"),
        Line::from("  1-9          Jump to instance"),
        Line::from("  ↑/↓ j/k      Select metric"),
        Line::from("  Home/End     First/last metric"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Metrics",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  space        Enable/disable updates"),
        Line::from("  r            Refresh instance now"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  e            Export to JSON"),
        Line::from("  q            Quit"),
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
        .border_style(app.theme.accent());

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 21u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
