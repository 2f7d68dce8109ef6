/// Reusable widgets for the dashboard views
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::models::GenderShare;
use crate::ui::layout::centered_rect;

/// Render a loading indicator
pub fn render_loading_indicator(f: &mut Frame, area: Rect, message: &str) {
    let loading = Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL).title("Loading"))
        .style(Style::default().fg(Color::Yellow));

    f.render_widget(loading, area);
}

/// Render error message
pub fn render_error(f: &mut Frame, area: Rect, error: &str) {
    let error_paragraph = Paragraph::new(error)
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });

    f.render_widget(error_paragraph, area);
}

/// Render a neutral message box, e.g. an empty result
pub fn render_message(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'_>>) {
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

/// Single line text input
pub fn render_input(f: &mut Frame, area: Rect, title: &str, value: &str, editing: bool) {
    let (border, text) = if editing {
        (Style::default().fg(Color::Yellow), format!("{}_", value))
    } else {
        (Style::default().fg(Color::Gray), value.to_string())
    };

    let input = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title.to_string()),
    );

    f.render_widget(input, area);
}

/// Modal yes/no prompt drawn over `area`
pub fn render_confirm(f: &mut Frame, area: Rect, prompt: &str) {
    let popup = centered_rect(60, 25, area);
    let lines = vec![
        Line::from(prompt.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" confirm   "),
            Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title("Confirm"),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

/// Headline number with a caption
pub fn render_stat_card(f: &mut Frame, area: Rect, caption: &str, value: &str) {
    let card = Paragraph::new(vec![
        Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(caption.to_string()))
    .alignment(Alignment::Center);

    f.render_widget(card, area);
}

/// One gender slice as a labelled bar
pub fn render_share_bar(f: &mut Frame, area: Rect, share: &GenderShare) {
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(share.label.clone()))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((share.percent / 100.0).clamp(0.0, 1.0))
        .label(share_label(share));

    f.render_widget(gauge, area);
}

pub fn share_label(share: &GenderShare) -> String {
    format!("{}: {} ({})", share.label, share.count, share.percent_label())
}
