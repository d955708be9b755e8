//! Assessment result view: verdict line and radial risk gauge.

use std::f64::consts::PI;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::domain::{GaugeSpec, RiskResult};
use crate::tui::styles::MedicalTheme;

/// Radius of the band ring's outer edge; the canvas is sized around it.
const OUTER_RADIUS: f64 = 1.0;
/// Radius of the value bar's outer edge.
const BAR_RADIUS: f64 = 0.7;
/// Arc samples per percentage point.
const SAMPLES_PER_POINT: f64 = 4.0;
/// Radial samples across a ring's width.
const RING_STEPS: usize = 6;

/// Assessment state
#[derive(Debug, Clone, Default)]
pub enum AssessmentState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Completed with result
    Complete { result: RiskResult },
    /// Error occurred
    Error { message: String },
}

/// Render the assessment result
pub fn render_result(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        AssessmentState::Idle => render_idle(f, chunks[1]),
        AssessmentState::Complete { result } => render_complete(f, chunks[1], result),
        AssessmentState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2], state);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prediction Result", MedicalTheme::title()),
        Span::styled(" │ Heart Disease Probability", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Enter patient data to begin",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_complete(f: &mut Frame, area: Rect, result: &RiskResult) {
    let block = Block::default()
        .title(Span::styled(" Risk Assessment ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Verdict
            Constraint::Min(8),    // Gauge
            Constraint::Length(2), // Value and delta
        ])
        .margin(1)
        .split(inner);

    let verdict_style = MedicalTheme::verdict(result.verdict);
    let verdict = Paragraph::new(Line::from(Span::styled(
        result.message(),
        verdict_style.add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(verdict, chunks[0]);

    render_gauge(f, chunks[1], &result.gauge);

    let gauge = &result.gauge;
    let value_style = gauge
        .band_for(gauge.value)
        .map_or_else(MedicalTheme::title, |band| {
            Style::default()
                .fg(MedicalTheme::rgb(band.color))
                .add_modifier(Modifier::BOLD)
        });
    let (delta_text, delta_style) = delta_indicator(gauge.delta());
    let readout = Paragraph::new(Line::from(vec![
        Span::styled(result.percentage_label(), value_style),
        Span::styled("   ", MedicalTheme::text()),
        Span::styled(delta_text, delta_style),
        Span::styled(
            format!(" vs {:.0}", gauge.delta_reference),
            MedicalTheme::text_muted(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(readout, chunks[2]);
}

/// Delta readout at one decimal: an arrow only when the rounded delta is non-zero.
fn delta_indicator(delta: f64) -> (String, Style) {
    let rounded = (delta * 10.0).round() / 10.0;
    if rounded > 0.0 {
        (format!("▲ {rounded:+.1}"), MedicalTheme::danger())
    } else if rounded < 0.0 {
        (format!("▼ {rounded:+.1}"), MedicalTheme::success())
    } else {
        ("0.0".to_string(), MedicalTheme::text_secondary())
    }
}

/// Angle in radians for a gauge value: 0 sits at the left end, 100 at the right.
#[must_use]
pub fn value_to_angle(value: f64, axis: (f64, f64)) -> f64 {
    let (min, max) = axis;
    let fraction = ((value - min) / (max - min)).clamp(0.0, 1.0);
    PI * (1.0 - fraction)
}

/// Points filling the ring between `inner` and `outer` from `from` to `to` on the axis.
#[must_use]
pub fn arc_points(from: f64, to: f64, axis: (f64, f64), inner: f64, outer: f64) -> Vec<(f64, f64)> {
    let samples = (((to - from).abs() * SAMPLES_PER_POINT).ceil() as usize).max(1);
    let mut points = Vec::with_capacity((samples + 1) * (RING_STEPS + 1));
    for step in 0..=RING_STEPS {
        let radius = inner + (outer - inner) * step as f64 / RING_STEPS as f64;
        for i in 0..=samples {
            let value = from + (to - from) * i as f64 / samples as f64;
            let angle = value_to_angle(value, axis);
            points.push((radius * angle.cos(), radius * angle.sin()));
        }
    }
    points
}

fn render_gauge(f: &mut Frame, area: Rect, gauge: &GaugeSpec) {
    let band_inner = OUTER_RADIUS * (1.0 - (1.0 - BAR_RADIUS) * gauge.threshold.thickness);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.25, 1.25])
        .y_bounds([-0.2, 1.15])
        .paint(move |ctx| {
            for band in &gauge.bands {
                let points = arc_points(band.from, band.to, gauge.axis, band_inner, OUTER_RADIUS);
                ctx.draw(&Points {
                    coords: &points,
                    color: MedicalTheme::rgb(band.color),
                });
            }
            ctx.layer();

            let bar = arc_points(gauge.axis.0, gauge.value, gauge.axis, 0.45, BAR_RADIUS);
            ctx.draw(&Points {
                coords: &bar,
                color: MedicalTheme::rgb(gauge.bar_color),
            });
            ctx.layer();

            let angle = value_to_angle(gauge.threshold.value, gauge.axis);
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: 0.0,
                x2: OUTER_RADIUS * angle.cos(),
                y2: OUTER_RADIUS * angle.sin(),
                color: MedicalTheme::TEXT_PRIMARY,
            });

            ctx.print(-1.1, -0.15, Span::styled("0", MedicalTheme::text_muted()));
            ctx.print(-0.04, 1.1, Span::styled("50", MedicalTheme::text_muted()));
            ctx.print(1.0, -0.15, Span::styled("100", MedicalTheme::text_muted()));
        });

    f.render_widget(canvas, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Assessment failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let content = match state {
        AssessmentState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Back to Form ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
        _ => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Edit Inputs ", MedicalTheme::key_desc()),
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Assessment ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
