//! Classifier tests. The fixture models in `tests/fixtures` are single
//! `ReduceMean` graphs over a 1x3x4x4 input, so each logit is the normalized
//! mean of one color channel (red, green, blue). Tests marked `#[ignore]` need
//! the real ViT model; run them with `--ignored` once it is cached.

use glimpse::{
    BuiltinModel, ClassificationService, Classifier, ClassifierBuilder, ClassifierError, ImageClassifier,
    ModelCharacteristics, ModelManager, RuntimeConfig,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;
use std::thread;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn channel_characteristics() -> ModelCharacteristics {
    ModelCharacteristics::square(4, [0.5, 0.5, 0.5], [0.5, 0.5, 0.5])
}

fn solid(rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb(rgb)))
}

fn channel_classifier(model: &str, top_k: Option<usize>) -> Result<Classifier, ClassifierError> {
    ClassifierBuilder::new()
        .with_top_k(top_k)
        .with_custom_model(&fixture(model), &fixture("channel_labels.txt"), channel_characteristics())?
        .build()
}

#[test]
fn test_fixture_maps_indices_to_labels() -> Result<(), ClassifierError> {
    let classifier = channel_classifier("channel_mean.onnx", Some(5))?;

    let top = |rgb| -> Result<String, ClassifierError> {
        Ok(classifier.predict(&solid(rgb))?[0].label.clone())
    };
    assert_eq!(top([255, 0, 0])?, "red");
    assert_eq!(top([0, 255, 0])?, "green");
    assert_eq!(top([0, 0, 255])?, "blue");

    let info = classifier.info();
    assert_eq!(info.num_labels, 3);
    assert_eq!((info.input_width, info.input_height), (4, 4));
    Ok(())
}

#[test]
fn test_fixture_scores_are_softmax_and_ranked() -> Result<(), ClassifierError> {
    let classifier = channel_classifier("channel_mean.onnx", Some(2))?;
    let predictions = classifier.predict(&solid([255, 0, 0]))?;

    // logits [1, -1, -1]; the two tied labels keep label order
    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0].label, "red");
    assert_eq!(predictions[1].label, "green");
    let e = std::f32::consts::E;
    assert!((predictions[0].score - e / (e + 2.0 / e)).abs() < 1e-3);
    Ok(())
}

#[test]
fn test_fixture_untruncated_returns_every_label() -> Result<(), ClassifierError> {
    let classifier = channel_classifier("channel_mean.onnx", None)?;
    let predictions = classifier.classify(&solid([10, 200, 90]))?;

    assert_eq!(predictions.len(), 3);
    assert_eq!(predictions[0].label, "green");
    let total: f32 = predictions.iter().map(|p| p.score).sum();
    assert!((total - 1.0).abs() < 1e-4);
    Ok(())
}

#[test]
fn test_dynamic_output_width_is_inferred() -> Result<(), ClassifierError> {
    let classifier = channel_classifier("channel_mean_dynamic.onnx", Some(5))?;
    assert_eq!(classifier.model_characteristics.num_labels, 3);
    assert_eq!(classifier.predict(&solid([0, 0, 255]))?[0].label, "blue");
    Ok(())
}

#[test]
fn test_label_count_mismatch_rejected() {
    for model in ["channel_mean.onnx", "channel_mean_dynamic.onnx"] {
        let result = ClassifierBuilder::new().with_custom_model(
            &fixture(model),
            &fixture("two_labels.json"),
            channel_characteristics(),
        );
        assert!(
            matches!(&result, Err(ClassifierError::BuildError(msg)) if msg.contains("3 scores but 2 labels")),
            "{}: {:?}",
            model,
            result.err()
        );
    }
}

#[test]
fn test_service_with_custom_model() -> Result<(), ClassifierError> {
    let service = ClassificationService::with_custom_model(
        fixture("channel_mean.onnx"),
        fixture("channel_labels.txt"),
        channel_characteristics(),
        RuntimeConfig::with_intra_threads(1),
        Some(1),
    );
    assert!(!service.is_loaded());

    let predictions = service.predict(&solid([0, 255, 0]))?;
    assert!(service.is_loaded());
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].label, "green");
    Ok(())
}

async fn setup_test_classifier(top_k: Option<usize>) -> Result<Classifier, Box<dyn std::error::Error>> {
    let manager = ModelManager::new_default()?;
    manager
        .ensure_model_downloaded(&BuiltinModel::VitBasePatch16_224.get_model_info())
        .await?;
    Ok(Classifier::builder()
        .with_top_k(top_k)
        .with_model(BuiltinModel::VitBasePatch16_224)?
        .build()?)
}

fn gradient_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(300, 200, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

#[tokio::test]
#[ignore = "requires the ViT model"]
async fn test_top_five_ranked() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier(Some(5)).await?;
    let predictions = classifier.predict(&gradient_image())?;

    assert_eq!(predictions.len(), 5);
    assert!(predictions.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(predictions.iter().all(|p| (0.0..=1.0).contains(&p.score)));
    Ok(())
}

#[tokio::test]
#[ignore = "requires the ViT model"]
async fn test_untruncated_scores_sum_to_one() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier(None).await?;
    let predictions = classifier.classify(&gradient_image())?;

    assert_eq!(predictions.len(), 1000);
    let total: f32 = predictions.iter().map(|p| p.score).sum();
    assert!((total - 1.0).abs() < 1e-3);
    Ok(())
}

#[tokio::test]
#[ignore = "requires the ViT model"]
async fn test_thread_safety() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = Arc::new(setup_test_classifier(Some(5)).await?);
    let mut handles = vec![];

    for _ in 0..3 {
        let classifier = Arc::clone(&classifier);
        handles.push(thread::spawn(move || {
            let result = classifier.predict(&gradient_image());
            assert!(result.is_ok());
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    Ok(())
}

#[test]
fn test_custom_model_missing_files() {
    let result = ClassifierBuilder::new().with_custom_model(
        "/nonexistent/model.onnx",
        "/nonexistent/config.json",
        Default::default(),
    );
    assert!(matches!(result, Err(ClassifierError::BuildError(_))));
}

#[test]
fn test_build_requires_model() {
    assert!(matches!(Classifier::builder().build(), Err(ClassifierError::BuildError(_))));
}
