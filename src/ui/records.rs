//! One searchable, exportable record table, parameterised by record type.

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::ApiError;
use crate::controller::{ops, Applied, NotificationQueue, SearchController, SearchPhase, SearchTicket};
use crate::export::ExportError;
use crate::models::{FeeRecord, IterationRecord, ListPayload, StudentRecord};
use crate::table::schemas::{fee_schema, iteration_export_base, iteration_schema, student_schema};
use crate::table::TableSchema;
use crate::ui::components::{render_input, render_loading_indicator, render_message};
use crate::ui::events::AppEvent;
use crate::ui::view::{View, ViewContext};

/// A record type the dashboard can search, show and export
pub trait RecordSource: Sized + Send + 'static {
    fn schema() -> &'static TableSchema<Self>;

    /// Names the data in failure messages
    fn failure_label() -> &'static str;

    /// Spawn the backend request for `ticket`; the answer arrives as an [`AppEvent`].
    fn fetch(ctx: &ViewContext, ticket: SearchTicket);

    fn export_base(_query: &str) -> String {
        Self::schema().export_base.to_string()
    }
}

impl RecordSource for FeeRecord {
    fn schema() -> &'static TableSchema<Self> {
        fee_schema()
    }

    fn failure_label() -> &'static str {
        "fee details"
    }

    fn fetch(ctx: &ViewContext, ticket: SearchTicket) {
        let backend = Arc::clone(&ctx.backend);
        ctx.spawn(async move {
            let outcome = ops::fetch_fees(backend.as_ref(), ticket.query()).await;
            AppEvent::FeesLoaded { ticket, outcome }
        });
    }
}

impl RecordSource for StudentRecord {
    fn schema() -> &'static TableSchema<Self> {
        student_schema()
    }

    fn failure_label() -> &'static str {
        "student details"
    }

    fn fetch(ctx: &ViewContext, ticket: SearchTicket) {
        let backend = Arc::clone(&ctx.backend);
        ctx.spawn(async move {
            let outcome = ops::fetch_students(backend.as_ref(), ticket.query()).await;
            AppEvent::StudentsLoaded { ticket, outcome }
        });
    }
}

impl RecordSource for IterationRecord {
    fn schema() -> &'static TableSchema<Self> {
        iteration_schema()
    }

    fn failure_label() -> &'static str {
        "iteration details"
    }

    fn fetch(ctx: &ViewContext, ticket: SearchTicket) {
        let backend = Arc::clone(&ctx.backend);
        ctx.spawn(async move {
            let outcome = match ticket.query().parse::<u32>() {
                Ok(iteration) => ops::fetch_iterations(backend.as_ref(), iteration).await,
                Err(_) => Err(ApiError::Decode {
                    path: "/api/iterations".to_string(),
                    message: format!("{:?} is not an iteration number", ticket.query()),
                }),
            };
            AppEvent::IterationsLoaded { ticket, outcome }
        });
    }

    fn export_base(query: &str) -> String {
        match query.parse::<u32>() {
            Ok(iteration) => iteration_export_base(iteration),
            Err(_) => Self::schema().export_base.to_string(),
        }
    }
}

/// Extra trailing column a wrapping view adds to the table
pub struct ActionColumn<'a, T> {
    pub header: &'static str,
    pub cell: &'a dyn Fn(&T) -> (String, Style),
}

pub struct RecordTableView<T: RecordSource> {
    search: SearchController<T>,
    editing: bool,
    selected: usize,
    /// Free-text query box; off when a wrapping view supplies the query.
    text_query: bool,
    input_title: &'static str,
    hint: &'static str,
}

impl<T: RecordSource> RecordTableView<T> {
    pub fn new(input_title: &'static str, hint: &'static str) -> Self {
        Self {
            search: SearchController::new(T::failure_label()),
            editing: false,
            selected: 0,
            text_query: true,
            input_title,
            hint,
        }
    }

    /// Table whose query is chosen by the wrapping view
    pub fn without_query_box(hint: &'static str) -> Self {
        Self {
            text_query: false,
            ..Self::new("", hint)
        }
    }

    pub fn search(&self) -> &SearchController<T> {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchController<T> {
        &mut self.search
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn selected_record(&self) -> Option<&T> {
        self.search.results().get(self.selected)
    }

    pub fn start_search(&mut self, ctx: &ViewContext) {
        let ticket = self.search.begin_search();
        info!("Searching {} for {:?}", T::failure_label(), ticket.query());
        T::fetch(ctx, ticket);
    }

    pub fn start_search_for(&mut self, query: impl Into<String>, ctx: &ViewContext) {
        let ticket = self.search.begin_search_for(query);
        info!("Searching {} for {:?}", T::failure_label(), ticket.query());
        T::fetch(ctx, ticket);
    }

    /// Paste into the query box while it is being edited.
    pub fn paste(&mut self, text: &str) -> bool {
        if !self.editing {
            return false;
        }
        self.search.query_mut().push_str(text.trim());
        true
    }

    /// Re-run the last query. False when nothing was searched yet.
    pub fn refresh(&mut self, ctx: &ViewContext) -> bool {
        match self.search.refresh() {
            Some(ticket) => {
                T::fetch(ctx, ticket);
                true
            }
            None => false,
        }
    }

    pub fn apply(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<ListPayload<T>, ApiError>,
        notifications: &mut NotificationQueue,
    ) -> Applied {
        let applied = self.search.apply(ticket, outcome, notifications);
        if applied != Applied::Stale && self.selected >= self.search.results().len() {
            self.selected = 0;
        }
        applied
    }

    pub fn export(&self, ctx: &mut ViewContext) {
        if !self.search.can_export() {
            return;
        }
        let base = T::export_base(self.search.last_query().unwrap_or_default());
        match ops::export_table(
            &ctx.exporter,
            T::schema(),
            &base,
            self.search.results(),
            &ctx.cell_format,
            ctx.quoting,
        ) {
            Ok(path) => ctx
                .notifications
                .success(format!("Saved {}", path.display())),
            Err(ExportError::Busy) => ctx.notifications.info("Downloading..."),
            Err(e) => {
                warn!("Export of {} failed: {}", T::failure_label(), e);
                ctx.notifications.error(format!("Download failed: {}", e));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, ctx: &mut ViewContext) -> Result<bool> {
        if self.editing {
            match key {
                KeyCode::Char(c) => self.search.query_mut().push(c),
                KeyCode::Backspace => {
                    self.search.query_mut().pop();
                }
                KeyCode::Enter => {
                    self.editing = false;
                    self.start_search(ctx);
                }
                KeyCode::Esc => self.editing = false,
                _ => {}
            }
            return Ok(true);
        }

        match key {
            KeyCode::Char('/') if self.text_query => {
                self.editing = true;
                Ok(true)
            }
            KeyCode::Enter if self.text_query => {
                self.start_search(ctx);
                Ok(true)
            }
            KeyCode::Char('e') => {
                self.export(ctx);
                Ok(true)
            }
            KeyCode::Down => {
                if self.selected + 1 < self.search.results().len() {
                    self.selected += 1;
                }
                Ok(true)
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn reset(&mut self) {
        self.search.reset();
        self.editing = false;
        self.selected = 0;
    }

    pub fn status(&self) -> String {
        let title = T::schema().title;
        match self.search.phase() {
            SearchPhase::Idle => format!("{}: not searched yet", title),
            SearchPhase::Searching => format!("{}: searching...", title),
            SearchPhase::Empty => format!("{}: no results", title),
            SearchPhase::Loaded => format!("{}: {} records", title, self.search.results().len()),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) {
        self.render_with(f, area, ctx, None);
    }

    pub fn render_with(
        &self,
        f: &mut Frame,
        area: Rect,
        ctx: &ViewContext,
        action: Option<&ActionColumn<'_, T>>,
    ) {
        let body = if self.text_query {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(area);
            render_input(f, chunks[0], self.input_title, self.search.query(), self.editing);
            chunks[1]
        } else {
            area
        };

        let schema = T::schema();
        match self.search.phase() {
            SearchPhase::Idle => {
                render_message(f, body, schema.title, vec![Line::from(self.hint)]);
            }
            SearchPhase::Searching => render_loading_indicator(f, body, schema.loading_message),
            SearchPhase::Empty => {
                let mut lines = vec![Line::from(Span::styled(
                    schema.empty_message,
                    Style::default().fg(Color::Red),
                ))];
                if let Some(message) = self.search.server_message() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(message.to_string()));
                }
                render_message(f, body, schema.title, lines);
            }
            SearchPhase::Loaded => self.render_table(f, body, ctx, action),
        }
    }

    fn render_table(
        &self,
        f: &mut Frame,
        area: Rect,
        ctx: &ViewContext,
        action: Option<&ActionColumn<'_, T>>,
    ) {
        let schema = T::schema();
        let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

        let mut headers: Vec<Cell> = schema.headers().into_iter().map(Cell::from).collect();
        let mut widths: Vec<Constraint> = schema.widths().into_iter().map(Constraint::Fill).collect();
        if let Some(action) = action {
            headers.push(Cell::from(action.header));
            widths.push(Constraint::Length(14));
        }

        let rows = self.search.results().iter().map(|record| {
            let mut cells: Vec<Cell> = schema
                .row(record, &ctx.cell_format)
                .into_iter()
                .map(Cell::from)
                .collect();
            if let Some(action) = action {
                let (text, style) = (action.cell)(record);
                cells.push(Cell::from(text).style(style));
            }
            let row = Row::new(cells);
            if schema.is_emphasized(record) {
                row.style(Style::default().fg(Color::Red))
            } else {
                row
            }
        });

        let title = format!(
            "{} ({} records, e to download CSV)",
            schema.title,
            self.search.results().len()
        );
        let table = Table::new(rows, widths)
            .header(Row::new(headers).style(header_style))
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(table, area, &mut state);
    }
}

impl View for RecordTableView<FeeRecord> {
    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) {
        RecordTableView::render(self, f, area, ctx);
    }

    fn get_title(&self) -> String {
        "Fees".to_string()
    }

    fn get_status(&self) -> String {
        self.status()
    }

    fn is_editing(&self) -> bool {
        RecordTableView::is_editing(self)
    }

    fn handle_key(&mut self, key: KeyCode, ctx: &mut ViewContext) -> Result<bool> {
        RecordTableView::handle_key(self, key, ctx)
    }

    fn handle_paste(&mut self, text: &str, _ctx: &mut ViewContext) -> Result<bool> {
        Ok(self.paste(text))
    }

    fn reset(&mut self) {
        RecordTableView::reset(self);
    }
}
