use crate::app::{App, Panel};
use crate::state::DatasetSlot;
use crate::telemetry::{PingRecord, SpeedTestRecord, Timestamp};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

// Color Palette - Elegant & Minimal
const SUCCESS: Color = Color::Rgb(134, 194, 156);     // Soft green
const INFO: Color = Color::Rgb(147, 180, 220);        // Soft blue
const WARN: Color = Color::Rgb(220, 180, 130);        // Soft amber
const ERROR: Color = Color::Rgb(220, 130, 130);       // Soft red
const TEXT_PRIMARY: Color = Color::Rgb(230, 230, 230);
const TEXT_SECONDARY: Color = Color::Rgb(160, 160, 160);
const TEXT_MUTED: Color = Color::Rgb(100, 100, 100);
const BORDER: Color = Color::Rgb(60, 60, 65);
const BORDER_ACTIVE: Color = Color::Rgb(100, 100, 110);

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.expanded {
        draw_expanded_view(frame, area, app);
    } else {
        draw_normal_view(frame, area, app);
    }
}

fn draw_normal_view(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .split(area);

    draw_header(frame, chunks[0], app);

    let panels = Layout::vertical([
        Constraint::Ratio(1, 2),
        Constraint::Ratio(1, 2),
    ])
    .split(chunks[1]);

    draw_pings_panel(frame, panels[0], app, app.selected_panel == Panel::Pings);
    draw_speed_panel(frame, panels[1], app, app.selected_panel == Panel::SpeedTests);

    draw_help(frame, chunks[2], app);
}

fn draw_expanded_view(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .split(area);

    draw_header(frame, chunks[0], app);

    match app.selected_panel {
        Panel::Pings => draw_pings_expanded(frame, chunks[1], app),
        Panel::SpeedTests => draw_speed_expanded(frame, chunks[1], app),
    }

    draw_help(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(BORDER));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::horizontal([
        Constraint::Length(12),
        Constraint::Min(10),
        Constraint::Length(20),
    ])
    .split(inner);

    // Title
    let title = Paragraph::new("linkwatch")
        .style(Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    // Backend in the middle, dataset condition indicator on the right
    let backend = Paragraph::new(app.settings.api_base_url.clone())
        .style(Style::default().fg(TEXT_MUTED))
        .alignment(Alignment::Center);
    frame.render_widget(backend, chunks[1]);

    frame.render_widget(
        Paragraph::new(dataset_indicator(app)).alignment(Alignment::Right),
        chunks[2],
    );
}

fn dataset_indicator(app: &App) -> Line<'static> {
    fn style_for<T>(slot: &DatasetSlot<T>) -> Style {
        if slot.is_pending() {
            Style::default().fg(TEXT_MUTED)
        } else if slot.is_ready() {
            Style::default().fg(SUCCESS)
        } else {
            Style::default().fg(ERROR)
        }
    }

    Line::from(vec![
        Span::styled("pings", style_for(&app.state.pings)),
        Span::styled(" / ", Style::default().fg(TEXT_MUTED)),
        Span::styled("speed", style_for(&app.state.speed_tests)),
    ])
}

// Panels
fn draw_pings_panel(frame: &mut Frame, area: Rect, app: &App, selected: bool) {
    let inner = draw_panel_frame(frame, area, " Reachability ", WARN, selected);
    let slot = &app.state.pings;

    if let Some(placeholder) = slot_placeholder(slot) {
        draw_placeholder(frame, inner, placeholder);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(ping_stats_line(slot.records())).alignment(Alignment::Center),
        chunks[0],
    );

    let series = ping_series(slot.records());
    draw_chart(frame, chunks[1], &[(&series, WARN)], -0.25, 1.25);
}

fn draw_speed_panel(frame: &mut Frame, area: Rect, app: &App, selected: bool) {
    let inner = draw_panel_frame(frame, area, " Throughput ", SUCCESS, selected);
    let slot = &app.state.speed_tests;

    if let Some(placeholder) = slot_placeholder(slot) {
        draw_placeholder(frame, inner, placeholder);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(speed_stats_line(slot.records())).alignment(Alignment::Center),
        chunks[0],
    );

    let download: Vec<f64> = slot.records().iter().map(|r| r.download).collect();
    let upload: Vec<f64> = slot.records().iter().map(|r| r.upload).collect();
    let (y_min, y_max) = series_bounds(&[&download, &upload]);
    draw_chart(
        frame,
        chunks[1],
        &[(&download, SUCCESS), (&upload, INFO)],
        y_min,
        y_max,
    );
}

fn draw_panel_frame(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    color: Color,
    selected: bool,
) -> Rect {
    let border_color = if selected { BORDER_ACTIVE } else { BORDER };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(if selected { color } else { TEXT_SECONDARY }),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

enum Placeholder<'a> {
    Loading,
    Error(&'a str),
}

fn slot_placeholder<T>(slot: &DatasetSlot<T>) -> Option<Placeholder<'_>> {
    if let Some(message) = slot.error() {
        Some(Placeholder::Error(message))
    } else if slot.is_pending() {
        Some(Placeholder::Loading)
    } else {
        None
    }
}

fn draw_placeholder(frame: &mut Frame, area: Rect, placeholder: Placeholder<'_>) {
    let (text, color) = match placeholder {
        Placeholder::Loading => ("Loading…".to_string(), TEXT_MUTED),
        Placeholder::Error(message) => (message.to_string(), ERROR),
    };

    let centered = Layout::vertical([
        Constraint::Ratio(1, 2),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(area)[1];

    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        centered,
    );
}

// Stats
fn ping_stats_line(records: &[PingRecord]) -> Line<'static> {
    let total = records.len();
    let reachable = records.iter().filter(|r| r.success).count();
    let ratio = if total > 0 {
        reachable as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let last_target = records
        .last()
        .map(|r| r.target.clone())
        .unwrap_or_else(|| "—".to_string());

    Line::from(vec![
        Span::styled(
            format!("{reachable}/{total} reachable"),
            Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ·  ", Style::default().fg(TEXT_MUTED)),
        Span::styled(format!("{ratio:.1}%"), Style::default().fg(TEXT_SECONDARY)),
        Span::styled("  ·  ", Style::default().fg(TEXT_MUTED)),
        Span::styled(format!("last {last_target}"), Style::default().fg(TEXT_MUTED)),
    ])
}

fn speed_stats_line(records: &[SpeedTestRecord]) -> Line<'static> {
    let download: Vec<f64> = records.iter().map(|r| r.download).collect();
    let upload: Vec<f64> = records.iter().map(|r| r.upload).collect();
    let latest_down = download.last().copied().unwrap_or(0.0);
    let latest_up = upload.last().copied().unwrap_or(0.0);
    let (avg_down, _, _) = get_stats(&download);
    let (avg_up, _, _) = get_stats(&upload);

    let mut spans = vec![
        Span::styled(
            format!("↓ {}", format_speed(latest_down)),
            Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ·  ", Style::default().fg(TEXT_MUTED)),
        Span::styled(
            format!("↑ {}", format_speed(latest_up)),
            Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ·  ", Style::default().fg(TEXT_MUTED)),
        Span::styled(
            format!("avg ↓ {} ↑ {}", format_speed(avg_down), format_speed(avg_up)),
            Style::default().fg(TEXT_MUTED),
        ),
    ];

    // Latency column only exists on newer backends.
    let latencies: Vec<f64> = records.iter().filter_map(|r| r.ping).collect();
    if !latencies.is_empty() {
        let avg = latencies.iter().sum::<f64>() / latencies.len() as f64;
        spans.push(Span::styled("  ·  ", Style::default().fg(TEXT_MUTED)));
        spans.push(Span::styled(
            format!("{avg:.0} ms"),
            Style::default().fg(TEXT_SECONDARY),
        ));
    }

    Line::from(spans)
}

// Charts
fn draw_chart(
    frame: &mut Frame,
    area: Rect,
    series: &[(&Vec<f64>, Color)],
    y_min: f64,
    y_max: f64,
) {
    if area.width < 4 || area.height < 2 {
        return;
    }

    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|(data, _)| {
            data.iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .collect()
        })
        .collect();

    let len = series
        .iter()
        .map(|(data, _)| data.len())
        .max()
        .unwrap_or(0);
    if len == 0 {
        return;
    }

    let datasets: Vec<Dataset> = points
        .iter()
        .zip(series.iter())
        .map(|(points, (_, color))| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .x_axis(Axis::default().bounds([0.0, (len.saturating_sub(1)).max(1) as f64]))
        .y_axis(Axis::default().bounds([y_min, y_max]));

    frame.render_widget(chart, area);
}

// Expanded views
fn draw_pings_expanded(frame: &mut Frame, area: Rect, app: &App) {
    let inner = draw_panel_frame(frame, area, " Reachability ", WARN, true);
    let slot = &app.state.pings;

    if let Some(placeholder) = slot_placeholder(slot) {
        draw_placeholder(frame, inner, placeholder);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(4),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(ping_stats_line(slot.records())).alignment(Alignment::Center),
        chunks[0],
    );

    let series = ping_series(slot.records());
    let y_labels = vec![
        Span::styled("down", Style::default().fg(TEXT_MUTED)),
        Span::styled("up", Style::default().fg(TEXT_MUTED)),
    ];
    draw_detailed_chart(
        frame,
        chunks[1],
        &[(&series, WARN)],
        -0.25,
        1.25,
        y_labels,
        time_span_labels(slot.records().iter().map(|r| &r.timestamp)),
    );
}

fn draw_speed_expanded(frame: &mut Frame, area: Rect, app: &App) {
    let inner = draw_panel_frame(frame, area, " Throughput ", SUCCESS, true);
    let slot = &app.state.speed_tests;

    if let Some(placeholder) = slot_placeholder(slot) {
        draw_placeholder(frame, inner, placeholder);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(4),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(speed_stats_line(slot.records())).alignment(Alignment::Center),
        chunks[0],
    );

    let download: Vec<f64> = slot.records().iter().map(|r| r.download).collect();
    let upload: Vec<f64> = slot.records().iter().map(|r| r.upload).collect();
    let (y_min, y_max) = series_bounds(&[&download, &upload]);
    let y_labels = vec![
        Span::styled(format!("{y_min:.0}"), Style::default().fg(TEXT_MUTED)),
        Span::styled(format!("{y_max:.0} Mbps"), Style::default().fg(TEXT_MUTED)),
    ];
    draw_detailed_chart(
        frame,
        chunks[1],
        &[(&download, SUCCESS), (&upload, INFO)],
        y_min,
        y_max,
        y_labels,
        time_span_labels(slot.records().iter().map(|r| &r.timestamp)),
    );
}

fn draw_detailed_chart(
    frame: &mut Frame,
    area: Rect,
    series: &[(&Vec<f64>, Color)],
    y_min: f64,
    y_max: f64,
    y_labels: Vec<Span<'static>>,
    x_labels: Vec<Span<'static>>,
) {
    if area.width < 10 || area.height < 3 {
        return;
    }

    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|(data, _)| {
            data.iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .collect()
        })
        .collect();

    let len = series
        .iter()
        .map(|(data, _)| data.len())
        .max()
        .unwrap_or(0);
    if len == 0 {
        return;
    }

    let datasets: Vec<Dataset> = points
        .iter()
        .zip(series.iter())
        .map(|(points, (_, color))| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(BORDER))
                .bounds([0.0, (len.saturating_sub(1)).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(BORDER))
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

fn draw_help(frame: &mut Frame, area: Rect, app: &App) {
    let help = if app.expanded {
        "esc close · q quit"
    } else {
        "tab select · space expand · q quit"
    };

    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(TEXT_MUTED))
            .alignment(Alignment::Center),
        area,
    );
}

// Helpers
fn ping_series(records: &[PingRecord]) -> Vec<f64> {
    records
        .iter()
        .map(|r| if r.success { 1.0 } else { 0.0 })
        .collect()
}

fn time_span_labels<'a>(timestamps: impl Iterator<Item = &'a Timestamp>) -> Vec<Span<'static>> {
    let labels: Vec<String> = timestamps.map(Timestamp::label).collect();
    match (labels.first(), labels.last()) {
        (Some(first), Some(last)) => vec![
            Span::styled(first.clone(), Style::default().fg(TEXT_MUTED)),
            Span::styled(last.clone(), Style::default().fg(TEXT_MUTED)),
        ],
        _ => Vec::new(),
    }
}

fn series_bounds(series: &[&Vec<f64>]) -> (f64, f64) {
    let all: Vec<f64> = series.iter().flat_map(|s| s.iter().copied()).collect();
    let (min_val, max_val) = get_data_range(&all);
    let range = (max_val - min_val).max(1.0);
    ((min_val - range * 0.1).max(0.0), max_val + range * 0.1)
}

fn get_data_range(data: &[f64]) -> (f64, f64) {
    let min = data.iter().cloned().fold(f64::MAX, f64::min);
    let max = data.iter().cloned().fold(f64::MIN, f64::max);
    (if min == f64::MAX { 0.0 } else { min }, if max == f64::MIN { 0.0 } else { max })
}

fn get_stats(data: &[f64]) -> (f64, f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let avg = data.iter().sum::<f64>() / data.len() as f64;
    let max = data.iter().cloned().fold(f64::MIN, f64::max);
    let min = data.iter().cloned().fold(f64::MAX, f64::min);
    (avg, max, if min == f64::MAX { 0.0 } else { min })
}

fn format_speed(mbps: f64) -> String {
    if mbps >= 1000.0 {
        format!("{:.1} Gbps", mbps / 1000.0)
    } else if mbps >= 1.0 {
        format!("{:.1} Mbps", mbps)
    } else if mbps > 0.0 {
        format!("{:.0} Kbps", mbps * 1000.0)
    } else {
        "—".to_string()
    }
}
