//! Summary view rendering.
//!
//! Displays the device line and a table of every metric of the selected
//! instance with its current state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use xmrwatch_sdk::DeviceInfo;

use crate::app::App;
use crate::format::format_state;

/// Render the metric table for the selected instance.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(instance) = app.current_instance() else {
        let paragraph = Paragraph::new(" No instance to show")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1), // Device line
        Constraint::Min(3),    // Metric table
    ])
    .split(area);

    let entities = app.current_entities();
    let device = entities
        .first()
        .map(|e| e.device_info())
        .unwrap_or_else(|| DeviceInfo::new(instance.name()));
    frame.render_widget(Paragraph::new(device_line(&device, app)), chunks[0]);

    let header = Row::new(vec![
        Cell::from("Metric"),
        Cell::from("Value"),
        Cell::from("Unit"),
        Cell::from("Icon"),
        Cell::from("Updates"),
    ])
    .height(1)
    .style(app.theme.title());

    let rows: Vec<Row> = entities
        .iter()
        .map(|entity| {
            let state = app.state_of(entity);
            let value_style = app.theme.metric_value(&state);
            let row_style = app.theme.metric_row(entity.is_enabled());

            Row::new(vec![
                Cell::from(entity.name().to_string()),
                Cell::from(format_state(&state, entity.unit())).style(value_style),
                Cell::from(entity.unit().unwrap_or("-")),
                Cell::from(entity.icon()),
                Cell::from(if entity.is_enabled() { "on" } else { "off" }),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Fill(2), // Metric
        Constraint::Fill(2), // Value
        Constraint::Min(6),  // Unit
        Constraint::Fill(2), // Icon
        Constraint::Min(8),  // Updates
    ];

    let selected = app.selected_metric.min(rows.len().saturating_sub(1));
    let position_info = if !rows.is_empty() {
        format!(" [{}/{}]", selected + 1, rows.len())
    } else {
        String::new()
    };
    let title = format!(
        " {} - {}{} ",
        instance.name(),
        instance.controller.endpoint().resource(),
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(app.theme.border()),
        )
        .row_highlight_style(app.theme.selected())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, chunks[1], &mut state);
}

fn device_line(device: &DeviceInfo, app: &App) -> Line<'static> {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    Line::from(vec![
        Span::styled(format!(" {} ", device.name), app.theme.title()),
        Span::raw("│ version "),
        Span::raw(field(&device.sw_version)),
        Span::raw(" │ cpu "),
        Span::raw(field(&device.manufacturer)),
        Span::raw(" │ model "),
        Span::raw(field(&device.model)),
    ])
}
