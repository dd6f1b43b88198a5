use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::shelf::Severity;
use crate::view::{BookCard, CardAction};

/// Keys that trigger a card action. The first one is shown in the hint line.
pub(crate) fn action_keys(action: CardAction) -> &'static [KeyCode] {
    match action {
        CardAction::Toggle => &[KeyCode::Char('t'), KeyCode::Char(' ')],
        CardAction::Delete => &[KeyCode::Char('d'), KeyCode::Delete],
        CardAction::Edit => &[KeyCode::Char('e')],
    }
}

fn action_hint(card: &BookCard, action: CardAction) -> String {
    let key = match action_keys(action).first() {
        Some(KeyCode::Char(ch)) => ch.to_string(),
        Some(other) => format!("{other:?}"),
        None => String::new(),
    };
    let label = match action {
        CardAction::Toggle => card.toggle_label(),
        CardAction::Delete => "Delete",
        CardAction::Edit => "Edit",
    };
    format!("[{key}] {label}")
}

/// Text lines for one book card. The selected card gets a marker and shows
/// which key triggers each action.
pub(crate) fn card_lines(card: &BookCard, selected: bool) -> Vec<Line<'static>> {
    let title = if selected {
        format!("▶ {}", card.title)
    } else {
        card.title.clone()
    };

    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Author: {}", card.author),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!("Year: {}", card.year),
            Style::default().fg(Color::Gray),
        )),
    ];

    if selected {
        lines.push(Line::from(Span::styled(
            card.actions()
                .into_iter()
                .map(|action| action_hint(card, action))
                .collect::<Vec<_>>()
                .join("  "),
            Style::default().fg(Color::Cyan),
        )));
    }

    lines
}

pub(crate) fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Info => Style::default().fg(Color::Blue),
        Severity::Success => Style::default().fg(Color::Green),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Error => Style::default().fg(Color::Red),
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Window of `len` items, at most `capacity` long, that keeps `selected` in
/// view. Returns the half-open index range.
pub(crate) fn visible_window(len: usize, capacity: usize, selected: usize) -> (usize, usize) {
    let capacity = capacity.max(1);
    let mut start = if selected >= capacity {
        selected + 1 - capacity
    } else {
        0
    };
    if start + capacity > len {
        start = len.saturating_sub(capacity);
    }
    (start, (start + capacity).min(len))
}
