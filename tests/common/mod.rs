#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glimpse::{ClassifierError, ImageClassifier, Prediction};
use image::{DynamicImage, Rgb, RgbImage};

/// Returns a fixed prediction list, failing for images whose width is in `fail_widths`.
pub struct FakeClassifier {
    pub predictions: Vec<Prediction>,
    pub fail_widths: HashSet<u32>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeClassifier {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self {
            predictions,
            fail_widths: HashSet::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_on(mut self, width: u32) -> Self {
        self.fail_widths.insert(width);
        self
    }
}

impl ImageClassifier for FakeClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_widths.contains(&image.width()) {
            return Err(ClassifierError::PredictionError(format!(
                "cannot classify {}px wide image",
                image.width()
            )));
        }
        Ok(self.predictions.clone())
    }
}

/// Slow loader body, so concurrent first calls overlap.
pub fn slow_load<T>(loads: &AtomicUsize, value: T) -> T {
    loads.fetch_add(1, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    value
}

pub fn cat_predictions() -> Vec<Prediction> {
    vec![
        Prediction::new("Egyptian cat", 0.91),
        Prediction::new("tabby cat", 0.05),
        Prediction::new("tiger cat", 0.02),
    ]
}

/// Ten predictions with strictly descending scores.
pub fn ten_predictions() -> Vec<Prediction> {
    (0..10)
        .map(|i| Prediction::new(format!("label_{}", i), 0.30 - i as f32 * 0.03))
        .collect()
}

pub fn solid_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 80, 40])))
}
