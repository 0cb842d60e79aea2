//! Event stream view rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the event log, oldest first.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let events = app.monitor.events();
    let capacity = app.monitor.config().event_capacity;

    let title = format!(" Events ({}/{}) [c:clear] ", events.len(), capacity);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if events.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "    No events recorded.",
                Style::default().add_modifier(Modifier::DIM),
            )]),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let newest = events.len() - 1;
    let items: Vec<ListItem> = events
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let style = if i == newest {
                Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {:>2} ", i + 1),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(message.clone(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
