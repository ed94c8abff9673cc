mod common;

use std::sync::Arc;

use common::{cat_predictions, solid_image, FakeClassifier};
use glimpse::{classify_batch, classify_paths, BatchPolicy, ClassificationService, ClassifierError};

fn inputs() -> Vec<(String, image::DynamicImage)> {
    vec![
        ("a.jpg".to_string(), solid_image(10, 10)),
        ("b.png".to_string(), solid_image(11, 10)),
        ("c.jpeg".to_string(), solid_image(12, 10)),
    ]
}

#[test]
fn test_batch_preserves_order_and_reports_progress() {
    let service = ClassificationService::from_classifier(Arc::new(FakeClassifier::new(cat_predictions())));
    let mut progress = Vec::new();

    let report = classify_batch(&service, inputs(), BatchPolicy::default(), |done, total| {
        progress.push((done, total));
    })
    .unwrap();

    let names: Vec<&str> = report.results.iter().map(|r| r.source_name.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.png", "c.jpeg"]);
    assert_eq!(report.results[1].image.width(), 11);
    assert_eq!(report.results[2].top().unwrap().label, "Egyptian cat");
    assert!(report.failures.is_empty());
    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_fail_fast_stops_at_first_failure() {
    let fake = FakeClassifier::new(cat_predictions()).failing_on(11);
    let calls = Arc::clone(&fake.calls);
    let service = ClassificationService::from_classifier(Arc::new(fake));
    let mut progress = Vec::new();

    let result = classify_batch(&service, inputs(), BatchPolicy::FailFast, |done, _| progress.push(done));

    assert!(matches!(result, Err(ClassifierError::PredictionError(_))));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(progress, vec![1]);
}

#[test]
fn test_isolate_continues_past_failures() {
    let fake = FakeClassifier::new(cat_predictions()).failing_on(11);
    let service = ClassificationService::from_classifier(Arc::new(fake));

    let report = classify_batch(&service, inputs(), BatchPolicy::Isolate, |_, _| {}).unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source_name, "b.png");
    assert_eq!(report.results[1].source_name, "c.jpeg");
}

#[test]
fn test_paths_with_unloadable_files() {
    let dir = std::env::temp_dir().join(format!("glimpse-batch-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let good = dir.join("good.png");
    solid_image(5, 5).save(&good).unwrap();
    let unsupported = dir.join("anim.gif");
    let missing = dir.join("missing.jpg");

    let service = ClassificationService::from_classifier(Arc::new(FakeClassifier::new(cat_predictions())));
    let paths = vec![good.clone(), unsupported.clone(), missing.clone()];

    let report = classify_paths(&service, &paths, BatchPolicy::Isolate, |_, _| {}).unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].source_name, "good.png");
    assert!(matches!(report.failures[0].error, ClassifierError::ValidationError(_)));
    assert!(matches!(report.failures[1].error, ClassifierError::ImageError(_)));

    let result = classify_paths(&service, &paths, BatchPolicy::FailFast, |_, _| {});
    assert!(matches!(result, Err(ClassifierError::ValidationError(_))));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_empty_batch() {
    let service = ClassificationService::new(|| Ok(FakeClassifier::new(cat_predictions())));
    let report = classify_batch(&service, Vec::new(), BatchPolicy::FailFast, |_, _| {}).unwrap();
    assert_eq!(report.total(), 0);
    assert!(!service.is_loaded());
}
