//! Live terminal dashboard.
//!
//! Layout:
//! - Header with logo, spinner, run count and last refresh time
//! - Run list beside the run meta and the execution graph
//! - Inspection line for the hovered or focused node
//! - Steps table and the selected step's rows
//! - Footer with keybinds or the last error

mod app;
pub mod controller;
mod event_handler;
pub mod graph_widget;
mod renderer;
pub mod state;
pub mod theme;
pub mod widgets;

use anyhow::{Context, Result};

pub use app::TuiApp;
pub use controller::Controller;
pub use state::{ErrorChannel, Selection, ViewModel};

use crate::api::ApiClient;
use crate::config::DashConfig;

/// Entry point for the live dashboard.
pub fn run_dashboard(config: &DashConfig, selection: Selection) -> Result<()> {
    let client = ApiClient::new(&config.api_url, config.request_timeout())
        .with_context(|| format!("Invalid API URL: {}", config.api_url))?;
    tracing::info!(api = %client.base_url(), "starting dashboard");

    let controller = Controller::new(client).with_selection(selection);
    let mut app = TuiApp::new(controller, config.refresh_interval())?;
    app.run()
}
