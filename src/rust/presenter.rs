//! Turns ranked predictions into something a person can look at: a chart
//! description for horizontal bar charts and a one-line headline for the top
//! prediction.

use serde::Serialize;

use crate::annotator::emoji_for;
use crate::batch::ClassificationResult;
use crate::classifier::{ClassifierError, Prediction, DEFAULT_TOP_K};

pub const CHART_TITLE: &str = "Top-5 Prediction";
pub const CHART_HEIGHT: u32 = 400;
/// Bars run horizontally; this is the only layout the chart uses.
pub const CHART_ORIENTATION: &str = "horizontal";
const TEXT_BAR_WIDTH: usize = 40;

/// ColorBrewer "Blues", light to dark.
const BLUES: [(f32, [u8; 3]); 9] = [
    (0.0, [247, 251, 255]),
    (0.125, [222, 235, 247]),
    (0.25, [198, 219, 239]),
    (0.375, [158, 202, 225]),
    (0.5, [107, 174, 214]),
    (0.625, [66, 146, 198]),
    (0.75, [33, 113, 181]),
    (0.875, [8, 81, 156]),
    (1.0, [8, 48, 107]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    /// Confidence in percent
    pub value: f32,
    /// `value` with one decimal and a trailing `%`
    pub text: String,
    /// `#rrggbb`, darker for higher values
    pub color: String,
}

/// Renderer-agnostic description of the prediction bar chart.
///
/// `bars` are ordered bottom to top: the highest-confidence prediction is the
/// last element so it is drawn at the top of a horizontal chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub title_centered: bool,
    pub orientation: &'static str,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub height: u32,
    pub margin: Margin,
    pub color_scale: String,
    pub show_scale: bool,
    pub bars: Vec<ChartBar>,
}

/// Top-1 summary shown above the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub emoji: &'static str,
    pub label: String,
    pub confidence: String,
}

/// Formats a score in [0, 1] as a percentage with one decimal, e.g. `0.91 -> "91.0%"`.
pub fn format_percentage(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Builds the chart for the first `top_k` predictions.
///
/// Shorter inputs produce fewer bars and an empty input produces none.
pub fn build_chart(predictions: &[Prediction], top_k: usize) -> ChartSpec {
    let selected = &predictions[..top_k.min(predictions.len())];
    let values: Vec<f32> = selected.iter().rev().map(|p| p.score * 100.0).collect();

    let (min, max) = values.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });

    let bars = selected
        .iter()
        .rev()
        .zip(&values)
        .map(|(prediction, &value)| ChartBar {
            label: prediction.label.clone(),
            value,
            text: format_percentage(prediction.score),
            color: blues_hex(intensity(value, min, max)),
        })
        .collect();

    ChartSpec {
        title: CHART_TITLE.to_string(),
        title_centered: true,
        orientation: CHART_ORIENTATION,
        x_axis_title: "Confidence".to_string(),
        y_axis_title: "Predicted Label".to_string(),
        height: CHART_HEIGHT,
        margin: Margin { left: 20, right: 20, top: 40, bottom: 20 },
        color_scale: "Blues".to_string(),
        show_scale: false,
        bars,
    }
}

/// [`build_chart`] with the default of five bars.
pub fn build_default_chart(predictions: &[Prediction]) -> ChartSpec {
    build_chart(predictions, DEFAULT_TOP_K)
}

/// Position of `value` within the chart's value range. A flat range maps to the darkest color.
fn intensity(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if !span.is_finite() || span <= f32::EPSILON {
        return 1.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

fn blues_hex(t: f32) -> String {
    let upper = BLUES.iter().position(|(stop, _)| *stop >= t).unwrap_or(BLUES.len() - 1);
    let rgb = if upper == 0 {
        BLUES[0].1
    } else {
        let (lo_stop, lo) = BLUES[upper - 1];
        let (hi_stop, hi) = BLUES[upper];
        let f = (t - lo_stop) / (hi_stop - lo_stop);
        let mut out = [0u8; 3];
        for c in 0..3 {
            out[c] = (lo[c] as f32 + (hi[c] as f32 - lo[c] as f32) * f).round() as u8;
        }
        out
    };
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Headline for the top prediction.
///
/// # Errors
/// `EmptyPredictions` when `predictions` is empty.
pub fn headline(predictions: &[Prediction]) -> Result<Headline, ClassifierError> {
    let top = predictions.first().ok_or(ClassifierError::EmptyPredictions)?;
    Ok(Headline {
        emoji: emoji_for(&top.label),
        label: top.label.clone(),
        confidence: format_percentage(top.score),
    })
}

/// Section title for one image of a batch, e.g. `"🐾 cat.jpg → Egyptian cat (91.0%)"`.
pub fn batch_summary(result: &ClassificationResult) -> Result<String, ClassifierError> {
    let top = headline(&result.predictions)?;
    Ok(format!("{} {} → {} ({})", top.emoji, result.source_name, top.label, top.confidence))
}

/// Plain-text rendering of a chart, highest bar first.
pub fn render_text(chart: &ChartSpec) -> String {
    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');

    if chart.bars.is_empty() {
        out.push_str("  (no predictions)\n");
        return out;
    }

    let label_width = chart.bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    for bar in chart.bars.iter().rev() {
        let filled = ((bar.value / 100.0).clamp(0.0, 1.0) * TEXT_BAR_WIDTH as f32).round() as usize;
        out.push_str(&format!(
            "  {:<width$} │{}{} {}\n",
            bar.label,
            "█".repeat(filled),
            " ".repeat(TEXT_BAR_WIDTH - filled),
            bar.text,
            width = label_width
        ));
    }
    out
}
