//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::ui::theme::Health;

/// Render the header bar with the device health overview.
///
/// Displays: status indicator, active alert count, event count, dropped frames.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let monitor = &app.monitor;
    let alerts = monitor.alerts();

    let critical = [alerts.compute_battery_low, alerts.controller_battery_low, alerts.disk_low]
        .iter()
        .filter(|a| **a)
        .count();
    let warning = [alerts.volume_high, alerts.temperature_high, alerts.head_tracking_lost]
        .iter()
        .filter(|a| **a)
        .count();

    let status_style = if critical > 0 {
        app.theme.health_style(Health::Critical)
    } else if warning > 0 {
        app.theme.health_style(Health::Warning)
    } else {
        app.theme.health_style(Health::Ok)
    };

    let count_span = |count: usize, health: Health| {
        if count > 0 {
            Span::styled(count.to_string(), app.theme.health_style(health))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("DEVICE DOCTOR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        count_span(warning, Health::Warning),
        Span::raw(" warn "),
        count_span(critical, Health::Critical),
        Span::raw(" crit │ "),
        Span::styled(
            monitor.events().len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" events │ "),
        Span::raw(format!("{} dropped frames", monitor.frames().total_dropped())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Status "),
        Line::from(" 2:Events "),
        Line::from(" 3:Cameras "),
    ];

    let selected = match app.current_view {
        View::Status => 0,
        View::Events => 1,
        View::Cameras => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else if let Some(updated) = app.last_update {
        let controls = match app.current_view {
            View::Status => "n:suppress Tab:switch ?:help q:quit",
            View::Events => "c:clear n:suppress Tab:switch ?:help q:quit",
            View::Cameras => "↑↓:select Space:toggle Tab:switch ?:help q:quit",
        };

        format!(
            " {} > {} | Updated {:.1}s ago | {}",
            app.source_description(),
            app.current_view.label(),
            updated.elapsed().as_secs_f64(),
            controls,
        )
    } else {
        format!(" Waiting for {}... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2/3       Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Events",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  c         Clear event stream"),
        Line::from("  n         Toggle notification suppression"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Cameras",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Space     Toggle camera or mode"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Reload data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay, shrinking with the terminal
    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 25u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
