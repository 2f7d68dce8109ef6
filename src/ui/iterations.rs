use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::sync::Arc;
use tracing::warn;

use crate::api::ApiError;
use crate::controller::ops;
use crate::models::IterationRecord;
use crate::ui::events::AppEvent;
use crate::ui::records::RecordTableView;
use crate::ui::view::{View, ViewContext};

#[derive(Debug, Clone, PartialEq, Eq)]
enum CountState {
    Loading,
    Loaded(Vec<u32>),
    Failed,
}

/// Offers of one iteration, picked from the iterations conducted so far
pub struct IterationsView {
    pub table: RecordTableView<IterationRecord>,
    count: CountState,
    cursor: usize,
}

impl Default for IterationsView {
    fn default() -> Self {
        Self::new()
    }
}

impl IterationsView {
    pub fn new() -> Self {
        Self {
            table: RecordTableView::without_query_box(
                "Pick an iteration with Left/Right and press Enter.",
            ),
            count: CountState::Loading,
            cursor: 0,
        }
    }

    pub fn numbers(&self) -> &[u32] {
        match &self.count {
            CountState::Loaded(numbers) => numbers,
            _ => &[],
        }
    }

    pub fn highlighted(&self) -> Option<u32> {
        self.numbers().get(self.cursor).copied()
    }

    pub fn on_numbers_loaded(&mut self, outcome: Result<Vec<u32>, ApiError>) {
        self.cursor = 0;
        self.count = match outcome {
            Ok(numbers) => CountState::Loaded(numbers),
            Err(e) => {
                warn!("Failed to fetch iteration count: {}", e);
                CountState::Failed
            }
        };
    }

    fn picker_line(&self) -> Line<'static> {
        match &self.count {
            CountState::Loading => Line::from("Loading iterations..."),
            CountState::Failed => Line::from(Span::styled(
                "Unable to load iteration count.",
                Style::default().fg(Color::Red),
            )),
            CountState::Loaded(numbers) if numbers.is_empty() => {
                Line::from("No iterations have been conducted yet.")
            }
            CountState::Loaded(numbers) => {
                let mut spans = vec![Span::raw("Iteration: ")];
                for (i, n) in numbers.iter().enumerate() {
                    let style = if i == self.cursor {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    spans.push(Span::styled(format!(" {} ", n), style));
                }
                Line::from(spans)
            }
        }
    }
}

impl View for IterationsView {
    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let picker = Paragraph::new(self.picker_line())
            .block(Block::default().borders(Borders::ALL).title("Select Iteration"));
        f.render_widget(picker, chunks[0]);

        self.table.render(f, chunks[1], ctx);
    }

    fn get_title(&self) -> String {
        "Iterations".to_string()
    }

    fn get_status(&self) -> String {
        self.table.status()
    }

    fn handle_key(&mut self, key: KeyCode, ctx: &mut ViewContext) -> Result<bool> {
        match key {
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                Ok(true)
            }
            KeyCode::Right => {
                if self.cursor + 1 < self.numbers().len() {
                    self.cursor += 1;
                }
                Ok(true)
            }
            KeyCode::Enter => {
                if let Some(iteration) = self.highlighted() {
                    self.table.start_search_for(iteration.to_string(), ctx);
                }
                Ok(true)
            }
            _ => self.table.handle_key(key, ctx),
        }
    }

    fn mount(&mut self, ctx: &mut ViewContext) {
        self.count = CountState::Loading;
        let backend = Arc::clone(&ctx.backend);
        ctx.spawn(async move {
            AppEvent::IterationNumbersLoaded(ops::iteration_numbers(backend.as_ref()).await)
        });
    }

    fn reset(&mut self) {
        self.table.reset();
        self.count = CountState::Loading;
        self.cursor = 0;
    }
}
