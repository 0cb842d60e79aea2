//! Status view rendering.
//!
//! Displays one row per probe with its latest reading, health and, for the
//! compute pack battery, a sparkline trend.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{ConnectionState, HeadTrackingFlag, PowerState};
use crate::ui::theme::Health;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the Status view as a table of probes.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let monitor = &app.monitor;
    let readings = monitor.readings();
    let alerts = monitor.alerts();
    let history = monitor.history();

    let toggle = |value: Option<bool>, on: &str, off: &str| match value {
        Some(true) => (on.to_string(), Health::Ok),
        Some(false) => (off.to_string(), Health::Warning),
        None => ("-".to_string(), Health::Unknown),
    };

    let percent = |value: Option<u8>, critical: bool| match value {
        Some(level) => (format!("{}%", level), Health::from_flags(true, false, critical)),
        None => ("-".to_string(), Health::Unknown),
    };

    let (network, network_health) = toggle(readings.network_connected, "Connected", "Disconnected");
    let (internet, internet_health) =
        toggle(readings.internet_available, "Available", "Unavailable");
    let (compute, compute_health) =
        percent(readings.compute_battery_level, alerts.compute_battery_low);
    let (controller, controller_health) =
        percent(readings.controller_battery_level, alerts.controller_battery_low);

    let temperature = readings
        .compute_battery_temperature
        .map(|c| format!("{:.1} °C", c))
        .unwrap_or_else(|| "-".to_string());
    let temperature_health = Health::from_flags(
        readings.compute_battery_temperature.is_some(),
        alerts.temperature_high,
        false,
    );

    let disk = readings
        .disk_free_ratio
        .map(|r| format!("{:.1}% free", r * 100.0))
        .unwrap_or_else(|| "-".to_string());
    let disk_health = Health::from_flags(readings.disk_free_ratio.is_some(), false, alerts.disk_low);

    let volume = readings
        .master_volume
        .map(|v| format!("{:.0}", v))
        .unwrap_or_else(|| "-".to_string());
    let volume_health =
        Health::from_flags(readings.master_volume.is_some(), alerts.volume_high, false);

    let head_tracking = if alerts.head_tracking_lost {
        HeadTrackingFlag::describe(readings.head_tracking_error)
    } else {
        "Tracking".to_string()
    };
    let head_tracking_health = Health::from_flags(true, alerts.head_tracking_lost, false);

    let memory = readings
        .memory_trim_level
        .map(|level| format!("trim level {}", level))
        .unwrap_or_else(|| "-".to_string());
    let memory_health = Health::from_flags(
        readings.memory_trim_level.is_some(),
        readings.memory_trim_level.is_some_and(|level| level > 0),
        false,
    );

    let power = monitor.controller_power();
    let power_health = match power {
        PowerState::Normal => Health::Ok,
        PowerState::None => Health::Unknown,
        _ => Health::Warning,
    };
    let connection = monitor.controller_connection();
    let connection_health =
        Health::from_flags(true, connection == ConnectionState::Disconnected, false);

    let probes = vec![
        ("Network", network, network_health, String::new()),
        ("Internet", internet, internet_health, String::new()),
        (
            "Compute Battery",
            compute,
            compute_health,
            render_sparkline(&history.battery_sparkline()),
        ),
        (
            "Battery Temp",
            temperature,
            temperature_health,
            render_sparkline(&history.temperature_sparkline()),
        ),
        ("Controller Battery", controller, controller_health, String::new()),
        ("Storage", disk, disk_health, String::new()),
        ("Volume", volume, volume_health, String::new()),
        ("Head Tracking", head_tracking, head_tracking_health, String::new()),
        ("Memory", memory, memory_health, String::new()),
        ("Controller Power", power.description().to_string(), power_health, String::new()),
        (
            "Controller Link",
            connection.description().to_string(),
            connection_health,
            String::new(),
        ),
    ];

    let header = Row::new(vec!["Probe", "Reading", "State", "Trend"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = probes
        .into_iter()
        .map(|(name, value, health, trend)| {
            let style = app.theme.health_style(health);
            Row::new(vec![
                Cell::from(name).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(value).style(style),
                Cell::from(health_label(health)).style(style),
                Cell::from(trend),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(10),
    ];

    let drain = history
        .battery_drain_per_minute()
        .map(|rate| format!(" [drain {:+.2}%/min]", rate))
        .unwrap_or_default();
    let suppressed = if monitor.notifications_suppressed() {
        " [notifications suppressed]"
    } else {
        ""
    };
    let title = format!(" Device Status{}{} ", drain, suppressed);

    let border_color = if alerts.any() {
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

fn health_label(health: Health) -> &'static str {
    match health {
        Health::Ok => "OK",
        Health::Warning => "WARN",
        Health::Critical => "CRIT",
        Health::Unknown => "-",
    }
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkline_keeps_last_eight() {
        let data: Vec<u8> = (0..10).map(|v| v % 8).collect();
        assert_eq!(render_sparkline(&data), "▃▄▅▆▇█▁▂");
        assert_eq!(render_sparkline(&[]), "");
    }
}
