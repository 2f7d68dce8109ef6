use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::controller::{Level, Notification};

/// Screen split shared by every view
pub struct TuiLayout {
    pub tab_bar: Rect,
    pub content: Rect,
    pub status_bar: Rect,
}

impl TuiLayout {
    /// Create a new layout from the given area
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tab bar
                Constraint::Min(0),    // Content
                Constraint::Length(4), // Status bar
            ])
            .split(area);

        Self {
            tab_bar: chunks[0],
            content: chunks[1],
            status_bar: chunks[2],
        }
    }

    pub fn render_tab_bar(&self, f: &mut Frame, titles: Vec<String>, selected_tab: usize, user: Option<&str>) {
        let heading = match user {
            Some(name) => format!("Admissions Dashboard - {}", name),
            None => "Admissions Dashboard".to_string(),
        };

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title(heading))
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .select(selected_tab);

        f.render_widget(tabs, self.tab_bar);
    }

    /// Key hints, the view status and the newest notification
    pub fn render_status_bar(&self, f: &mut Frame, status_text: &str, toast: Option<&Notification>) {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let gray = |t: &'static str| Span::styled(t, Style::default().fg(Color::Gray));

        let mut lines = vec![
            Line::from(vec![
                key("Tab", Color::Yellow),
                gray(" switch view  "),
                key("r", Color::Green),
                gray(" reload  "),
                key("L", Color::Magenta),
                gray(" logout  "),
                key("q", Color::Red),
                gray(" quit  |  "),
                Span::styled(status_text.to_string(), Style::default().fg(Color::Cyan)),
            ]),
        ];

        if let Some(toast) = toast {
            lines.push(Line::from(Span::styled(
                toast.message.clone(),
                Style::default()
                    .fg(level_color(toast.level))
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::White));

        f.render_widget(paragraph, self.status_bar);
    }
}

pub fn level_color(level: Level) -> Color {
    match level {
        Level::Info => Color::Cyan,
        Level::Success => Color::Green,
        Level::Warning => Color::Yellow,
        Level::Error => Color::Red,
    }
}

/// Rectangle of the given percentage size centred in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
