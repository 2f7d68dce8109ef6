use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::sync::Arc;
use tracing::warn;

use crate::api::{ApiError, UploadKind};
use crate::controller::{ops, UploadController, UploadFinish, UploadPhase};
use crate::models::StatsSummary;
use crate::ui::components::{render_error, render_loading_indicator, render_share_bar, render_stat_card};
use crate::ui::events::AppEvent;
use crate::ui::view::{View, ViewContext};

#[derive(Debug, Clone, PartialEq)]
enum StatsState {
    Loading,
    Loaded(StatsSummary),
    Failed,
}

/// Summary figures and the bulk upload panel
pub struct DashboardView {
    stats: StatsState,
    upload: UploadController,
    /// Path being typed into the focused drop zone
    path_input: String,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            stats: StatsState::Loading,
            upload: UploadController::new(),
            path_input: String::new(),
        }
    }

    pub fn stats(&self) -> Option<&StatsSummary> {
        match &self.stats {
            StatsState::Loaded(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn upload(&self) -> &UploadController {
        &self.upload
    }

    pub fn on_stats_loaded(&mut self, outcome: Result<StatsSummary, ApiError>) {
        self.stats = match outcome {
            Ok(stats) => StatsState::Loaded(stats),
            Err(e) => {
                warn!("Failed to fetch stats: {}", e);
                StatsState::Failed
            }
        };
    }

    pub fn on_upload_finished(&mut self, outcome: Result<(), ApiError>, ctx: &mut ViewContext) -> UploadFinish {
        self.upload.finish(outcome, &mut ctx.notifications)
    }

    fn submit(&mut self, ctx: &mut ViewContext) {
        let Some(request) = self.upload.begin_submit(&mut ctx.notifications) else {
            return;
        };
        let backend = Arc::clone(&ctx.backend);
        ctx.spawn(async move {
            AppEvent::UploadFinished(ops::submit_upload(backend.as_ref(), &request).await)
        });
    }

    fn render_stats(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) {
        let stats = match &self.stats {
            StatsState::Loading => return render_loading_indicator(f, area, "Loading..."),
            StatsState::Failed => return render_error(f, area, "Unable to load dashboard statistics."),
            StatsState::Loaded(stats) => stats,
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(rows[0]);

        render_stat_card(f, cards[0], "Total Applications", &stats.total_applications.to_string());
        render_stat_card(f, cards[1], "Accepted Students", &stats.accepted_students.to_string());

        let latest = match stats.latest_iteration_number {
            Some(n) => {
                let date = ctx.cell_format.date(stats.latest_iteration_date);
                if date.is_empty() {
                    format!("#{}", n)
                } else {
                    format!("#{} on {}", n, date)
                }
            }
            None => "None yet".to_string(),
        };
        render_stat_card(f, cards[2], "Latest Iteration", &latest);

        let shares = stats.gender_shares();
        let block = Block::default().borders(Borders::ALL).title("Gender Distribution");
        let inner = block.inner(rows[1]);
        f.render_widget(block, rows[1]);
        if shares.is_empty() {
            f.render_widget(Paragraph::new("No gender data."), inner);
            return;
        }

        let bars = Layout::default()
            .direction(Direction::Vertical)
            .constraints(shares.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
            .split(inner);
        for (share, bar) in shares.iter().zip(bars.iter()) {
            render_share_bar(f, *bar, share);
        }
    }

    fn render_upload_panel(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) {
        let allowed = ctx.gate.allowed_uploads();
        let selected = self.upload.selected_kind();

        let mut type_spans = vec![Span::raw("Type: ")];
        for kind in allowed {
            let style = if Some(*kind) == selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            type_spans.push(Span::styled(format!("[{}] {}", key_for(*kind), kind.caption()), style));
            type_spans.push(Span::raw("  "));
        }

        let drop_line = if self.upload.drag_hover() {
            Line::from(Span::styled(
                format!("Drop or type a file path: {}_", self.path_input),
                Style::default().fg(Color::Yellow),
            ))
        } else {
            match self.upload.phase() {
                UploadPhase::NoTypeSelected => Line::from("Select an upload type first."),
                UploadPhase::TypeSelected(_) => {
                    Line::from("Paste/drop a CSV file here, or press f to type its path.")
                }
                UploadPhase::FileChosen { file, .. } => Line::from(vec![
                    Span::raw("Selected: "),
                    Span::styled(file.display().to_string(), Style::default().fg(Color::Green)),
                    Span::raw("  (Enter to upload)"),
                ]),
                UploadPhase::Submitting { file, .. } => {
                    Line::from(format!("Uploading {}...", file.display()))
                }
            }
        };

        let border = if self.upload.drag_hover() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let panel = Paragraph::new(vec![Line::from(type_spans), Line::from(""), drop_line]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title("Upload Files"),
        );
        f.render_widget(panel, area);
    }
}

/// Number key selecting an upload type
fn key_for(kind: UploadKind) -> char {
    match kind {
        UploadKind::Master => '1',
        UploadKind::Iteration => '2',
        UploadKind::Fees => '3',
        UploadKind::Withdraw => '4',
    }
}

fn kind_for(key: char) -> Option<UploadKind> {
    UploadKind::ALL.into_iter().find(|kind| key_for(*kind) == key)
}

impl View for DashboardView {
    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) {
        if ctx.gate.allowed_uploads().is_empty() {
            self.render_stats(f, area, ctx);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(area);
        self.render_stats(f, chunks[0], ctx);
        self.render_upload_panel(f, chunks[1], ctx);
    }

    fn get_title(&self) -> String {
        "Dashboard".to_string()
    }

    fn get_status(&self) -> String {
        match (&self.stats, self.upload.is_submitting()) {
            (_, true) => "Uploading...".to_string(),
            (StatsState::Loading, _) => "Loading...".to_string(),
            (StatsState::Failed, _) => "Statistics unavailable".to_string(),
            (StatsState::Loaded(_), _) => "Ready".to_string(),
        }
    }

    fn is_editing(&self) -> bool {
        self.upload.drag_hover()
    }

    fn handle_key(&mut self, key: KeyCode, ctx: &mut ViewContext) -> Result<bool> {
        if self.upload.drag_hover() {
            match key {
                KeyCode::Char(c) => self.path_input.push(c),
                KeyCode::Backspace => {
                    self.path_input.pop();
                }
                KeyCode::Enter => {
                    let path = std::mem::take(&mut self.path_input);
                    self.upload.drop_text(&path, &mut ctx.notifications);
                }
                KeyCode::Esc => {
                    self.path_input.clear();
                    self.upload.set_drag_hover(false);
                }
                _ => {}
            }
            return Ok(true);
        }

        if ctx.gate.allowed_uploads().is_empty() {
            return Ok(false);
        }

        match key {
            KeyCode::Char(c) if kind_for(c).is_some() => {
                if let Some(kind) = kind_for(c) {
                    self.upload.select_type(kind, &ctx.gate, &mut ctx.notifications);
                }
                Ok(true)
            }
            KeyCode::Char('f') => {
                if self.upload.selected_kind().is_some() && !self.upload.is_submitting() {
                    self.upload.set_drag_hover(true);
                } else {
                    ctx.notifications.warning("Please select an upload type first.");
                }
                Ok(true)
            }
            KeyCode::Enter => {
                self.submit(ctx);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn handle_paste(&mut self, text: &str, ctx: &mut ViewContext) -> Result<bool> {
        if ctx.gate.allowed_uploads().is_empty() {
            return Ok(false);
        }
        self.path_input.clear();
        self.upload.drop_text(text, &mut ctx.notifications);
        Ok(true)
    }

    fn mount(&mut self, ctx: &mut ViewContext) {
        self.stats = StatsState::Loading;
        let backend = Arc::clone(&ctx.backend);
        ctx.spawn(async move { AppEvent::StatsLoaded(backend.stats().await) });
    }

    fn reset(&mut self) {
        self.stats = StatsState::Loading;
        self.upload.reset();
        self.path_input.clear();
    }
}
