use std::sync::Arc;
use image::DynamicImage;
use ort::session::Session;
use super::error::ClassifierError;
use super::utils::rank_descending;
use super::vision::VisionInference;
use super::{ImageClassifier, Prediction};
use crate::ModelCharacteristics;

/// A thread-safe image classifier backed by an ONNX vision model.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync` because all of its fields are thread-safe:
/// - `String`, `Option<usize>` and `ModelCharacteristics` are `Send + Sync`
/// - `Session` and the label table are wrapped in `Arc`
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use glimpse::{Classifier, BuiltinModel};
///
/// let classifier = Classifier::builder()
///     .with_model(BuiltinModel::VitBasePatch16_224)?
///     .build()?;
///
/// let image = image::open("cat.jpg")?;
/// for p in classifier.predict(&image)? {
///     println!("{}: {:.1}%", p.label, p.score * 100.0);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Classifier {
    pub model_path: String,
    pub labels_path: String,
    pub session: Arc<Session>,
    pub labels: Arc<Vec<String>>,
    pub model_characteristics: ModelCharacteristics,
    pub top_k: Option<usize>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl VisionInference for Classifier {
    fn session(&self) -> Option<&Session> {
        Some(&*self.session)
    }

    fn characteristics(&self) -> Option<&ModelCharacteristics> {
        Some(&self.model_characteristics)
    }
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            num_labels: self.labels.len(),
            input_width: self.model_characteristics.input_width,
            input_height: self.model_characteristics.input_height,
            top_k: self.top_k,
        }
    }

    /// Classifies an image, returning predictions ranked by descending score.
    ///
    /// Scores are softmax probabilities over all labels. The list is cut to
    /// `top_k` entries when the classifier was built with one.
    pub fn predict(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(ClassifierError::ValidationError("Input image has no pixels".into()));
        }

        let probabilities = self.infer_probabilities(image)?;
        if probabilities.len() != self.labels.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Model produced {} scores for {} labels",
                probabilities.len(),
                self.labels.len()
            )));
        }

        let limit = self.top_k.unwrap_or(probabilities.len());
        let predictions = rank_descending(&probabilities)
            .into_iter()
            .take(limit)
            .map(|i| Prediction::new(self.labels[i].clone(), probabilities[i]))
            .collect::<Vec<_>>();

        log::debug!(
            "Classified {}x{} image, top label: {:?}",
            width,
            height,
            predictions.first().map(|p| p.label.as_str())
        );
        Ok(predictions)
    }
}

impl ImageClassifier for Classifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError> {
        self.predict(image)
    }
}
