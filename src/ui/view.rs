use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{prelude::Rect, Frame};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::AdmissionsBackend;
use crate::controller::{NotificationQueue, RoleGate};
use crate::export::{CsvExporter, CsvQuoting};
use crate::table::CellFormat;
use crate::ui::events::AppEvent;

/// Shared services every view works against
pub struct ViewContext {
    pub backend: Arc<dyn AdmissionsBackend>,
    pub events: mpsc::Sender<AppEvent>,
    pub notifications: NotificationQueue,
    pub gate: RoleGate,
    pub exporter: CsvExporter,
    pub cell_format: CellFormat,
    pub quoting: CsvQuoting,
}

impl ViewContext {
    /// Run `work` on the runtime and post its result to the event loop.
    pub fn spawn<F>(&self, work: F)
    where
        F: std::future::Future<Output = AppEvent> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = work.await;
            // The loop is gone when the app is shutting down.
            let _ = events.send(event).await;
        });
    }
}

/// View contract for all TUI views
pub trait View {
    /// Render the view
    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext);

    /// Get the view title
    fn get_title(&self) -> String;

    /// Get the view status text
    fn get_status(&self) -> String;

    /// True while the view captures raw text input, so global keys pass through.
    fn is_editing(&self) -> bool {
        false
    }

    /// Handle view-specific key events. Returns true if the key was handled.
    fn handle_key(&mut self, _key: KeyCode, _ctx: &mut ViewContext) -> Result<bool> {
        Ok(false)
    }

    /// Handle pasted text. Returns true if the paste was used.
    fn handle_paste(&mut self, _text: &str, _ctx: &mut ViewContext) -> Result<bool> {
        Ok(false)
    }

    /// Issue the fetches a freshly shown view needs
    fn mount(&mut self, _ctx: &mut ViewContext) {}

    /// Drop all state, as on a page reload
    fn reset(&mut self) {}
}
