//! Chart adapter: hands the posts-over-time sequence to ratatui's `Chart`.
//!
//! The session passes the full, already-ascending series; this module only
//! projects periods onto a numeric axis and derives bounds and labels.

use chrono::DateTime;
use chrono::Utc;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Line;
use ratatui::widgets::Axis;
use ratatui::widgets::Block;
use ratatui::widgets::Chart;
use ratatui::widgets::Dataset;
use ratatui::widgets::GraphType;
use ratatui::widgets::Paragraph;
use tagscope_api_client::model::TimeSeriesPoint;

const CHART_COLOR: Color = Color::Cyan;

pub(crate) fn render(frame: &mut Frame, area: Rect, series: Option<&[TimeSeriesPoint]>) {
    let block = Block::bordered().title("Posts over time");
    let Some(series) = series.filter(|series| series.len() >= 2) else {
        let placeholder = Paragraph::new("no data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let points = chart_points(series);
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(CHART_COLOR))
        .data(&points);

    let x = x_bounds(&points);
    let y = y_bounds(&points);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds(x)
                .labels(x_labels(series).into_iter().map(Line::from)),
        )
        .y_axis(
            Axis::default()
                .bounds(y)
                .labels(y_labels(y).into_iter().map(Line::from)),
        );
    frame.render_widget(chart, area);
}

/// Periods become epoch milliseconds on the x axis.
pub(crate) fn chart_points(series: &[TimeSeriesPoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .map(|point| (point.period_epoch_ms() as f64, point.count as f64))
        .collect()
}

pub(crate) fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => [first.0, last.0],
        _ => [0.0, 1.0],
    }
}

/// Always starts at zero so bar heights stay comparable across tags.
pub(crate) fn y_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let max = points.iter().map(|point| point.1).fold(0.0, f64::max);
    [0.0, if max > 0.0 { max } else { 1.0 }]
}

pub(crate) fn x_labels(series: &[TimeSeriesPoint]) -> Vec<String> {
    let format = |period: DateTime<Utc>| period.format("%Y-%m").to_string();
    match series {
        [] => Vec::new(),
        [only] => vec![format(only.period)],
        [first, .., last] => {
            let middle = &series[series.len() / 2];
            vec![
                format(first.period),
                format(middle.period),
                format(last.period),
            ]
        }
    }
}

pub(crate) fn y_labels(bounds: [f64; 2]) -> Vec<String> {
    let max = bounds[1];
    vec![
        "0".to_string(),
        format_count(max / 2.0),
        format_count(max),
    ]
}

fn format_count(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{}", value.round() as u64)
    }
}
