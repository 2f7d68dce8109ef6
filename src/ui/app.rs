use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::AdmissionsBackend;
use crate::controller::{ops, NotificationQueue, RoleGate, UploadFinish};
use crate::export::{CsvExporter, CsvQuoting};
use crate::models::{Config, FeeRecord};
use crate::table::CellFormat;
use crate::ui::{
    components::render_confirm,
    dashboard::DashboardView,
    events::{AppEvent, EventManager},
    iterations::IterationsView,
    layout::TuiLayout,
    records::RecordTableView,
    students::StudentsView,
    view::{View, ViewContext},
};

const VIEW_COUNT: usize = 4;
const LOGOUT_PROMPT: &str = "Are you sure you want to log out?";

/// Main TUI application
pub struct DashboardApp {
    pub ctx: ViewContext,
    events: EventManager,
    pub dashboard: DashboardView,
    pub fees: RecordTableView<FeeRecord>,
    pub students: StudentsView,
    pub iterations: IterationsView,
    pub current_view: usize, // 0 = dashboard, 1 = fees, 2 = students, 3 = iterations
    confirm_logout: bool,
    logged_out: bool,
    pub should_quit: bool,
}

impl DashboardApp {
    pub fn new(config: &Config, backend: Arc<dyn AdmissionsBackend>) -> Self {
        let events = EventManager::new();
        let ctx = ViewContext {
            backend,
            events: events.sender(),
            notifications: NotificationQueue::new(),
            gate: RoleGate::restricted(),
            exporter: CsvExporter::new(config.export_dir.clone()),
            cell_format: CellFormat::new(config.date_format.clone()),
            quoting: CsvQuoting::default(),
        };

        Self {
            ctx,
            events,
            dashboard: DashboardView::new(),
            fees: RecordTableView::new(
                "Application number (/ to edit, Enter to search)",
                "Press / to enter an application number, then Enter to search.",
            ),
            students: StudentsView::new(),
            iterations: IterationsView::new(),
            current_view: 0,
            confirm_logout: false,
            logged_out: false,
            should_quit: false,
        }
    }

    pub fn logged_out(&self) -> bool {
        self.logged_out
    }

    /// Issue every start-up fetch: role, statistics and iteration count.
    pub fn mount(&mut self) {
        let backend = Arc::clone(&self.ctx.backend);
        self.ctx.spawn(async move { AppEvent::RoleLoaded(ops::load_role_gate(backend.as_ref()).await) });
        self.dashboard.mount(&mut self.ctx);
        self.iterations.mount(&mut self.ctx);
    }

    /// Drop all view state and fetch everything again.
    pub fn reload(&mut self) {
        info!("Reloading dashboard");
        self.dashboard.reset();
        self.fees.reset();
        self.students.reset();
        self.iterations.reset();
        self.ctx.gate = RoleGate::restricted();
        self.confirm_logout = false;
        self.mount();
    }

    fn with_current<R>(&mut self, f: impl FnOnce(&mut dyn View, &mut ViewContext) -> R) -> R {
        let ctx = &mut self.ctx;
        let view: &mut dyn View = match self.current_view {
            0 => &mut self.dashboard,
            1 => &mut self.fees,
            2 => &mut self.students,
            _ => &mut self.iterations,
        };
        f(view, ctx)
    }

    fn current(&self) -> &dyn View {
        match self.current_view {
            0 => &self.dashboard,
            1 => &self.fees,
            2 => &self.students,
            _ => &self.iterations,
        }
    }

    fn view_titles(&self) -> Vec<String> {
        vec![
            self.dashboard.get_title(),
            self.fees.get_title(),
            self.students.get_title(),
            self.iterations.get_title(),
        ]
    }

    /// Apply completed backend work
    pub fn handle_event(&mut self, event: AppEvent) {
        debug!("Handling {:?}", event);
        match event {
            AppEvent::RoleLoaded(gate) => self.ctx.gate = gate,
            AppEvent::StatsLoaded(outcome) => self.dashboard.on_stats_loaded(outcome),
            AppEvent::IterationNumbersLoaded(outcome) => self.iterations.on_numbers_loaded(outcome),
            AppEvent::FeesLoaded { ticket, outcome } => {
                self.fees.apply(&ticket, outcome, &mut self.ctx.notifications);
            }
            AppEvent::StudentsLoaded { ticket, outcome } => {
                self.students.table.apply(&ticket, outcome, &mut self.ctx.notifications);
            }
            AppEvent::IterationsLoaded { ticket, outcome } => {
                self.iterations.table.apply(&ticket, outcome, &mut self.ctx.notifications);
            }
            AppEvent::UploadFinished(outcome) => {
                if self.dashboard.on_upload_finished(outcome, &mut self.ctx) == UploadFinish::Reload {
                    self.reload();
                }
            }
            AppEvent::WithdrawFinished { app_no, outcome } => {
                self.students.on_withdraw_finished(&app_no, outcome, &mut self.ctx);
            }
            AppEvent::LoggedOut(Ok(())) => {
                info!("Logged out");
                self.logged_out = true;
                self.should_quit = true;
            }
            AppEvent::LoggedOut(Err(e)) => {
                warn!("Logout failed: {}", e);
                self.ctx.notifications.error("Logout failed.");
            }
        }
    }

    /// Drain every event that is ready without waiting
    pub fn drain_events(&mut self) {
        while let Some(event) = self.events.try_receive() {
            self.handle_event(event);
        }
    }

    /// Wait for the next completed backend task
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events.receive().await
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> Result<()> {
        if self.confirm_logout {
            match key {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_logout = false;
                    let backend = Arc::clone(&self.ctx.backend);
                    self.ctx.spawn(async move { AppEvent::LoggedOut(backend.logout().await) });
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.confirm_logout = false,
                _ => {}
            }
            return Ok(());
        }

        // Text input and modal prompts get every key first
        if self.current().is_editing() {
            self.with_current(|view, ctx| view.handle_key(key, ctx))?;
            return Ok(());
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.current_view = (self.current_view + 1) % VIEW_COUNT,
            KeyCode::BackTab => self.current_view = (self.current_view + VIEW_COUNT - 1) % VIEW_COUNT,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('L') => self.confirm_logout = true,
            _ => {
                self.with_current(|view, ctx| view.handle_key(key, ctx))?;
            }
        }
        Ok(())
    }

    pub fn handle_paste(&mut self, text: &str) -> Result<()> {
        if self.confirm_logout {
            return Ok(());
        }
        self.with_current(|view, ctx| view.handle_paste(text, ctx))?;
        Ok(())
    }

    pub fn draw(&self, f: &mut Frame) {
        let layout = TuiLayout::new(f.area());
        layout.render_tab_bar(f, self.view_titles(), self.current_view, self.ctx.gate.user_name());

        self.current().render(f, layout.content, &self.ctx);

        layout.render_status_bar(f, &self.current().get_status(), self.ctx.notifications.latest());

        if self.confirm_logout {
            render_confirm(f, layout.content, LOGOUT_PROMPT);
        }
    }
}

/// Run the TUI until the user quits or logs out
pub async fn run_app(config: Config, backend: Arc<dyn AdmissionsBackend>) -> Result<bool> {
    let mut app = DashboardApp::new(&config, backend);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    app.mount();
    let result = event_loop(&mut app, &mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|_| app.logged_out())
}

async fn event_loop(
    app: &mut DashboardApp,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    const MAX_EVENTS_PER_CYCLE: usize = 10;

    loop {
        let mut events_processed = false;
        let mut event_count = 0;

        while event_count < MAX_EVENTS_PER_CYCLE && event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key_event(key.code)?;
                }
                Event::Paste(text) => app.handle_paste(&text)?,
                _ => {}
            }
            events_processed = true;
            event_count += 1;

            if app.should_quit {
                break;
            }
        }

        app.drain_events();
        if app.should_quit {
            return Ok(());
        }

        terminal.draw(|f| app.draw(f))?;

        // Shorter delay right after input keeps typing responsive
        let delay_ms = if events_processed { 8 } else { 16 };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
