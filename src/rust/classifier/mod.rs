use image::DynamicImage;
use serde::{Deserialize, Serialize};

mod error;
mod vision;
mod classifier;
mod labels;
pub mod builder;
mod utils;

pub use error::ClassifierError;
pub use classifier::Classifier;
pub use builder::{ClassifierBuilder, DEFAULT_TOP_K};
pub use vision::preprocess_image;

/// A single (label, confidence) pair produced for an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Anything that maps an image to predictions ranked by descending score.
///
/// `Classifier` is the ONNX-backed implementation; the service only depends on
/// this trait so it can hold any loaded classifier behind an `Arc`.
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError>;
}

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInfo {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the label file
    pub labels_path: String,
    /// Number of labels the model scores
    pub num_labels: usize,
    /// Model input width in pixels
    pub input_width: u32,
    /// Model input height in pixels
    pub input_height: u32,
    /// Maximum number of predictions returned, `None` for all
    pub top_k: Option<usize>,
}
