//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`summary`]: Metric table and device line for the selected instance
//! - [`common`]: Shared components (header, instance tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Instance tabs (common::render_tabs)  │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Metric table (summary::render)       │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod common;
pub mod summary;
pub mod theme;

pub use theme::Theme;
