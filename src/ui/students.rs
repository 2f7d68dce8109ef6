use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{
    prelude::Rect,
    style::{Color, Modifier, Style},
    Frame,
};
use std::sync::Arc;

use crate::api::ApiError;
use crate::controller::{latest_iteration, ops, withdraw_state, WithdrawFlow, WithdrawState};
use crate::models::StudentRecord;
use crate::ui::components::render_confirm;
use crate::ui::events::AppEvent;
use crate::ui::records::{ActionColumn, RecordTableView};
use crate::ui::view::{View, ViewContext};

/// Student search with the per-row withdraw action
pub struct StudentsView {
    pub table: RecordTableView<StudentRecord>,
    withdraw: WithdrawFlow,
}

impl Default for StudentsView {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentsView {
    pub fn new() -> Self {
        Self {
            table: RecordTableView::new(
                "Application number or name (/ to edit, Enter to search)",
                "Press / to enter an application number or name, then Enter to search.",
            ),
            withdraw: WithdrawFlow::new(),
        }
    }

    pub fn withdraw_flow(&self) -> &WithdrawFlow {
        &self.withdraw
    }

    fn request_withdraw(&mut self, ctx: &mut ViewContext) {
        if !ctx.gate.can_withdraw() {
            return;
        }
        let Some(student) = self.table.selected_record() else {
            return;
        };

        let latest = latest_iteration(self.table.search().results());
        match withdraw_state(student, latest) {
            WithdrawState::Available => {
                let app_no = student.app_no.clone().unwrap_or_default();
                let name = student.name.clone().unwrap_or_default();
                self.withdraw.request(app_no, name);
            }
            WithdrawState::Disabled => ctx.notifications.info("This student is already withdrawn."),
            WithdrawState::Hidden => ctx
                .notifications
                .info("Withdraw is only available for the latest iteration."),
        }
    }

    fn confirm_withdraw(&mut self, ctx: &ViewContext) {
        let Some(app_no) = self.withdraw.confirm() else {
            return;
        };
        let backend = Arc::clone(&ctx.backend);
        ctx.spawn(async move {
            let outcome = ops::withdraw_student(backend.as_ref(), &app_no).await;
            AppEvent::WithdrawFinished { app_no, outcome }
        });
    }

    /// Report the outcome and refresh the list with the last query on success.
    pub fn on_withdraw_finished(&mut self, app_no: &str, outcome: Result<(), ApiError>, ctx: &mut ViewContext) {
        if self.withdraw.complete(app_no, outcome, &mut ctx.notifications) {
            self.table.refresh(ctx);
        }
    }
}

fn action_cell(state: WithdrawState) -> (String, Style) {
    match state {
        WithdrawState::Available => (
            "[w] Withdraw".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        WithdrawState::Disabled => ("Withdraw".to_string(), Style::default().fg(Color::DarkGray)),
        WithdrawState::Hidden => (String::new(), Style::default()),
    }
}

impl View for StudentsView {
    fn render(&self, f: &mut Frame, area: Rect, ctx: &ViewContext) {
        if ctx.gate.can_withdraw() {
            let latest = latest_iteration(self.table.search().results());
            let cell = move |student: &StudentRecord| action_cell(withdraw_state(student, latest));
            let column = ActionColumn {
                header: "Action",
                cell: &cell,
            };
            self.table.render_with(f, area, ctx, Some(&column));
        } else {
            self.table.render(f, area, ctx);
        }

        if let Some(pending) = self.withdraw.pending() {
            render_confirm(f, area, &pending.prompt());
        }
    }

    fn get_title(&self) -> String {
        "Students".to_string()
    }

    fn get_status(&self) -> String {
        if self.withdraw.is_in_flight() {
            "Withdrawing...".to_string()
        } else {
            self.table.status()
        }
    }

    fn is_editing(&self) -> bool {
        self.table.is_editing() || self.withdraw.pending().is_some()
    }

    fn handle_key(&mut self, key: KeyCode, ctx: &mut ViewContext) -> Result<bool> {
        if self.withdraw.pending().is_some() {
            match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_withdraw(ctx),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.withdraw.cancel(),
                _ => {}
            }
            return Ok(true);
        }

        if !self.table.is_editing() && key == KeyCode::Char('w') {
            self.request_withdraw(ctx);
            return Ok(true);
        }

        self.table.handle_key(key, ctx)
    }

    fn handle_paste(&mut self, text: &str, _ctx: &mut ViewContext) -> Result<bool> {
        if self.withdraw.pending().is_some() {
            return Ok(false);
        }
        Ok(self.table.paste(text))
    }

    fn reset(&mut self) {
        self.table.reset();
        self.withdraw.reset();
    }
}
