mod common;

use std::sync::Arc;

use common::{cat_predictions, solid_image, ten_predictions, FakeClassifier};
use glimpse::presenter::{
    batch_summary, build_chart, build_default_chart, format_percentage, headline, CHART_ORIENTATION, CHART_TITLE,
};
use glimpse::{ClassificationResult, ClassificationService, ClassifierError, Prediction};

#[test]
fn test_chart_keeps_top_five_with_best_last() {
    let predictions = ten_predictions();
    let chart = build_chart(&predictions, 5);

    assert_eq!(chart.bars.len(), 5);
    let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["label_4", "label_3", "label_2", "label_1", "label_0"]);

    for (bar, prediction) in chart.bars.iter().rev().zip(&predictions) {
        assert_eq!(bar.text, format!("{:.1}%", prediction.score * 100.0));
        assert!((bar.value - prediction.score * 100.0).abs() < 1e-4);
    }
}

#[test]
fn test_chart_layout() {
    let chart = build_default_chart(&ten_predictions());
    assert_eq!(chart.title, CHART_TITLE);
    assert_eq!(chart.title, "Top-5 Prediction");
    assert!(chart.title_centered);
    assert_eq!(chart.orientation, CHART_ORIENTATION);
    assert_eq!(chart.orientation, "horizontal");
    assert_eq!(chart.x_axis_title, "Confidence");
    assert_eq!(chart.y_axis_title, "Predicted Label");
    assert_eq!(chart.height, 400);
    assert!(!chart.show_scale);
}

#[test]
fn test_chart_colors_darken_with_confidence() {
    let chart = build_chart(&ten_predictions(), 5);
    let brightness = |hex: &str| {
        let v = u32::from_str_radix(&hex[1..], 16).unwrap();
        (v >> 16) + ((v >> 8) & 0xff) + (v & 0xff)
    };
    for pair in chart.bars.windows(2) {
        assert!(brightness(&pair[1].color) <= brightness(&pair[0].color));
    }
}

#[test]
fn test_empty_predictions_give_empty_chart() {
    let chart = build_chart(&[], 5);
    assert!(chart.bars.is_empty());
    assert_eq!(chart.title, CHART_TITLE);
}

#[test]
fn test_short_input_is_not_an_error() {
    let chart = build_chart(&cat_predictions(), 5);
    assert_eq!(chart.bars.len(), 3);
    assert_eq!(chart.bars.last().unwrap().label, "Egyptian cat");
}

#[test]
fn test_percentage_parses_back_within_rounding() {
    for score in [0.0f32, 0.00049, 0.05, 0.123456, 0.5, 0.91, 0.99951, 1.0] {
        let text = format_percentage(score);
        let parsed: f32 = text.trim_end_matches('%').parse().unwrap();
        assert!((parsed / 100.0 - score).abs() <= 0.05, "{} -> {}", score, text);
        assert_eq!(text.split('.').nth(1).map(|d| d.len()), Some(2)); // one digit + '%'
    }
}

#[test]
fn test_headline_requires_a_prediction() {
    assert!(matches!(headline(&[]), Err(ClassifierError::EmptyPredictions)));
}

#[test]
fn test_egyptian_cat_end_to_end() {
    let service = ClassificationService::from_classifier(Arc::new(FakeClassifier::new(cat_predictions())));
    let predictions = service.predict(&solid_image(32, 32)).unwrap();

    let top = headline(&predictions).unwrap();
    assert_eq!(top.emoji, "🐾");
    assert_eq!(top.label, "Egyptian cat");
    assert_eq!(top.confidence, "91.0%");

    let chart = build_default_chart(&predictions);
    assert_eq!(chart.bars.len(), 3);
}

#[test]
fn test_batch_summary_line() {
    let result = ClassificationResult {
        source_name: "cat.jpg".to_string(),
        image: solid_image(4, 4),
        predictions: cat_predictions(),
    };
    assert_eq!(batch_summary(&result).unwrap(), "🐾 cat.jpg → Egyptian cat (91.0%)");

    let empty = ClassificationResult { predictions: Vec::<Prediction>::new(), ..result };
    assert!(matches!(batch_summary(&empty), Err(ClassifierError::EmptyPredictions)));
}

#[test]
fn test_chart_serializes_to_json() {
    let chart = build_chart(&cat_predictions(), 5);
    let value = serde_json::to_value(&chart).unwrap();
    assert_eq!(value["orientation"], "horizontal");
    assert_eq!(value["bars"].as_array().unwrap().len(), 3);
    assert_eq!(value["bars"][2]["text"], "91.0%");
}
