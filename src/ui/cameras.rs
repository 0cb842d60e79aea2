//! Cameras view rendering.
//!
//! Left: camera and exposure mode toggles. Right: per stream frame counters.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{App, CameraToggle};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Length(28), Constraint::Min(40)]).split(area);

    render_toggles(frame, app, chunks[0]);
    render_streams(frame, app, chunks[1]);
}

fn render_toggles(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = CameraToggle::ALL
        .iter()
        .map(|toggle| {
            let enabled = app.toggle_enabled(*toggle);
            let (mark, style) = if enabled {
                ("[x]", Style::default().fg(app.theme.healthy))
            } else {
                ("[ ]", Style::default().add_modifier(Modifier::DIM))
            };
            Row::new(vec![Cell::from(mark).style(style), Cell::from(toggle.label())])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(4), Constraint::Fill(1)])
        .block(
            Block::default()
                .title(" Settings [Space:toggle] ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_toggle.min(CameraToggle::ALL.len() - 1)));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_streams(frame: &mut Frame, app: &App, area: Rect) {
    let frames = app.monitor.frames();

    let header = Row::new(vec!["Camera", "Mode", "Last Frame", "Dropped"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = frames
        .iter()
        .map(|(&(camera, mode), tracker)| {
            let enabled = frames.is_enabled((camera, mode));
            let last = tracker
                .last_frame_number()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            let dropped = tracker.dropped_count();
            let dropped_style = if dropped > 0 {
                Style::default().fg(app.theme.warning)
            } else {
                Style::default().fg(app.theme.healthy)
            };
            let row = Row::new(vec![
                Cell::from(camera.label()),
                Cell::from(mode.label()),
                Cell::from(last),
                Cell::from(dropped.to_string()).style(dropped_style),
            ]);
            if enabled {
                row
            } else {
                row.style(Style::default().add_modifier(Modifier::DIM))
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Length(9),
    ];

    let title = format!(
        " Streams ({} dropped, {} duplicate, {} invalid) ",
        frames.total_dropped(),
        frames.duplicate_count(),
        frames.invalid_count()
    );

    let border_color = if frames.total_dropped() > 0 {
        app.theme.warning
    } else {
        app.theme.border
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(border_color)),
    );

    frame.render_widget(table, area);
}
