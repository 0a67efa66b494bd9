//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::runtime::Handle;
use tracing::info;

use xmrwatch_sdk::{MetricEntity, MetricState};

use crate::export::write_export;
use crate::host::TuiHost;
use crate::setup::{shutdown, Instance, InstanceHealth, Rejected};
use crate::ui::Theme;

/// Default file written by the export key.
pub const DEFAULT_EXPORT_PATH: &str = "xmrwatch_export.json";

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    pub instances: Vec<Instance>,
    pub rejected: Vec<Rejected>,
    host: Arc<TuiHost>,
    runtime: Handle,

    // Navigation state
    pub selected_instance: usize,
    pub selected_metric: usize,

    pub export_path: PathBuf,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an app over already set-up instances.
    ///
    /// `runtime` is used to run refreshes requested from the keyboard.
    pub fn new(instances: Vec<Instance>, rejected: Vec<Rejected>, host: Arc<TuiHost>, runtime: Handle) -> Self {
        let mut app = Self {
            running: true,
            show_help: false,
            instances,
            rejected,
            host,
            runtime,
            selected_instance: 0,
            selected_metric: 0,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            theme: Theme::dark(),
            status_message: None,
        };

        if !app.rejected.is_empty() {
            let summary: Vec<String> = app
                .rejected
                .iter()
                .map(|r| format!("{} ({})", r.config.name, r.error.code()))
                .collect();
            app.set_status_message(format!("Rejected: {}", summary.join(", ")));
        }

        app
    }

    /// Use the given theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The instance whose tab is selected.
    pub fn current_instance(&self) -> Option<&Instance> {
        self.instances.get(self.selected_instance)
    }

    /// Entities of the selected instance, in table order.
    pub fn current_entities(&self) -> Vec<Arc<MetricEntity>> {
        self.current_instance()
            .map(|i| self.host.entities_for(i.name()))
            .unwrap_or_default()
    }

    /// State of an entity as last published to the host.
    pub fn state_of(&self, entity: &MetricEntity) -> MetricState {
        self.host.state_of(entity)
    }

    /// The highlighted metric of the selected instance.
    pub fn selected_entity(&self) -> Option<Arc<MetricEntity>> {
        self.current_entities().get(self.selected_metric).cloned()
    }

    /// Instance counts as (healthy, pending, errored).
    pub fn health_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for instance in &self.instances {
            match instance.health() {
                InstanceHealth::Healthy => counts.0 += 1,
                InstanceHealth::Pending => counts.1 += 1,
                InstanceHealth::Errored => counts.2 += 1,
            }
        }
        counts
    }

    /// Whether a registry reported changes since the last frame.
    pub fn take_dirty(&self) -> bool {
        self.host.take_dirty()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Switch to the next instance tab.
    pub fn next_instance(&mut self) {
        if !self.instances.is_empty() {
            self.selected_instance = (self.selected_instance + 1) % self.instances.len();
            self.clamp_metric();
        }
    }

    /// Switch to the previous instance tab.
    pub fn prev_instance(&mut self) {
        if !self.instances.is_empty() {
            self.selected_instance =
                (self.selected_instance + self.instances.len() - 1) % self.instances.len();
            self.clamp_metric();
        }
    }

    /// Move selection down by one metric.
    pub fn select_next(&mut self) {
        let max = self.current_entities().len().saturating_sub(1);
        self.selected_metric = (self.selected_metric + 1).min(max);
    }

    /// Move selection up by one metric.
    pub fn select_prev(&mut self) {
        self.selected_metric = self.selected_metric.saturating_sub(1);
    }

    /// Jump to the first metric.
    pub fn select_first(&mut self) {
        self.selected_metric = 0;
    }

    /// Jump to the last metric.
    pub fn select_last(&mut self) {
        self.selected_metric = self.current_entities().len().saturating_sub(1);
    }

    fn clamp_metric(&mut self) {
        let max = self.current_entities().len().saturating_sub(1);
        self.selected_metric = self.selected_metric.min(max);
    }

    /// Refresh the selected instance now, in the background.
    pub fn refresh_selected(&mut self) {
        let Some(instance) = self.current_instance() else {
            return;
        };
        let controller = instance.controller.clone();
        let name = instance.name().to_string();

        info!("manual refresh of {}", name);
        self.runtime.spawn(async move {
            controller.refresh().await;
        });
        self.set_status_message(format!("Refreshing {}...", name));
    }

    /// Enable or disable updates for the selected metric.
    pub fn toggle_selected(&mut self) {
        let Some(entity) = self.selected_entity() else {
            return;
        };
        let enabled = !entity.is_enabled();
        entity.set_enabled(enabled);
        self.set_status_message(format!(
            "{} {}",
            entity.name(),
            if enabled { "enabled" } else { "disabled" }
        ));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Export current state to the configured export path.
    pub fn export(&mut self) {
        let path = self.export_path.clone();
        match self.export_state(&path) {
            Ok(()) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(e) => self.set_status_message(format!("Export failed: {}", e)),
        }
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        write_export(&self.instances, &self.host, path)
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Stop every controller.
    pub fn shutdown(&self) {
        shutdown(&self.instances);
    }
}
