use std::path::Path;
use std::sync::Arc;
use image::DynamicImage;
use ort::session::Session;
use ort::value::ValueType;
use log::{info, error};

use super::error::ClassifierError;
use super::vision::VisionInference;
use super::classifier::Classifier;
use super::labels::load_labels;
use crate::{BuiltinModel, ModelCharacteristics, runtime::{RuntimeConfig, create_session_builder}, ModelManager};

/// Number of predictions returned by default, matching the usual top-5 view.
pub const DEFAULT_TOP_K: usize = 5;

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Debug)]
pub struct ClassifierBuilder {
    model_path: Option<String>,
    labels_path: Option<String>,
    session: Option<Session>,
    labels: Option<Vec<String>>,
    model_characteristics: Option<ModelCharacteristics>,
    runtime_config: RuntimeConfig,
    top_k: Option<usize>,
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VisionInference for ClassifierBuilder {
    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn characteristics(&self) -> Option<&ModelCharacteristics> {
        self.model_characteristics.as_ref()
    }
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use glimpse::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            model_path: None,
            labels_path: None,
            session: None,
            labels: None,
            model_characteristics: None,
            runtime_config: RuntimeConfig::default(),
            top_k: Some(DEFAULT_TOP_K),
        }
    }

    /// Sets the runtime configuration for ONNX model execution.
    /// Must be called before the model is set to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Limits predictions to the `k` highest scores; `None` returns every label.
    ///
    /// # Example
    /// ```
    /// use glimpse::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new().with_top_k(Some(10));
    /// ```
    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the model to use for classification using a built-in model type
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The model paths are already set
    ///   - The model is not downloaded
    ///   - The model or label config failed to load
    ///   - The model structure is invalid
    pub fn with_model(mut self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.labels_path.is_some() {
            return Err(ClassifierError::BuildError("Model and labels paths already set".to_string()));
        }

        let manager = ModelManager::new_default()
            .map_err(|e| ClassifierError::BuildError(format!("Failed to create model manager: {}", e)))?;
        let (model_path, labels_path) = manager.require_downloaded(&model.get_model_info().name)?;

        self.load(&model_path, &labels_path, model.characteristics())?;
        Ok(self)
    }

    /// Sets a custom model and label file for the classifier
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `labels_path` - Path to a `config.json` with `id2label`, or a text file with one label per line
    /// * `characteristics` - Input size and normalization the model was trained with
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The model or labels paths are empty
    ///   - The paths are already set
    ///   - The files don't exist
    ///   - The model or labels failed to load
    ///   - The model structure is invalid
    pub fn with_custom_model(
        mut self,
        model_path: &str,
        labels_path: &str,
        characteristics: ModelCharacteristics,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || labels_path.is_empty() {
            return Err(ClassifierError::BuildError("Model and labels paths cannot be empty".to_string()));
        }
        if self.model_path.is_some() || self.labels_path.is_some() {
            return Err(ClassifierError::BuildError("Model and labels paths already set".to_string()));
        }
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", model_path)));
        }
        if !Path::new(labels_path).exists() {
            return Err(ClassifierError::BuildError(format!("Labels file not found: {}", labels_path)));
        }

        self.load(Path::new(model_path), Path::new(labels_path), characteristics)?;
        Ok(self)
    }

    fn load(
        &mut self,
        model_path: &Path,
        labels_path: &Path,
        mut characteristics: ModelCharacteristics,
    ) -> Result<(), ClassifierError> {
        let labels = load_labels(labels_path).map_err(|e| {
            error!("Failed to load labels: {}", e);
            e
        })?;
        info!("Loaded {} labels from {:?}", labels.len(), labels_path);

        info!("Loading ONNX model from {:?}", model_path);
        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;

        let declared_width = Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.session = Some(session);
        self.model_characteristics = Some(characteristics.clone());

        // Dynamic output widths are resolved with a dry run on a blank frame.
        let num_outputs = match declared_width {
            Some(width) => width,
            None => {
                let blank = DynamicImage::new_rgb8(characteristics.input_width, characteristics.input_height);
                let width = self.infer_logits(&blank)?.len();
                info!("Inferred output width from model: {}", width);
                width
            }
        };

        if num_outputs != labels.len() {
            self.session = None;
            return Err(ClassifierError::BuildError(format!(
                "Model outputs {} scores but {} labels were loaded",
                num_outputs,
                labels.len()
            )));
        }

        characteristics.num_labels = num_outputs;
        self.model_characteristics = Some(characteristics);
        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.labels_path = Some(labels_path.to_string_lossy().to_string());
        self.labels = Some(labels);
        Ok(())
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - No model has been set
    ///   - `top_k` is zero
    ///
    /// # Example
    /// ```no_run
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use glimpse::{ClassifierBuilder, BuiltinModel};
    ///
    /// let classifier = ClassifierBuilder::new()
    ///     .with_model(BuiltinModel::VitBasePatch16_224)?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(mut self) -> Result<Classifier, ClassifierError> {
        if self.top_k == Some(0) {
            return Err(ClassifierError::ValidationError("top_k must be at least 1".to_string()));
        }
        let (Some(model_path), Some(labels_path)) = (self.model_path.take(), self.labels_path.take()) else {
            return Err(ClassifierError::BuildError("Model and labels paths must be set".to_string()));
        };

        let session = self.session.take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?;
        let labels = self.labels.take()
            .ok_or_else(|| ClassifierError::BuildError("No labels loaded".into()))?;
        let model_characteristics = self.model_characteristics.take()
            .ok_or_else(|| ClassifierError::BuildError("Model characteristics not set".to_string()))?;

        Ok(Classifier {
            model_path,
            labels_path,
            session: Arc::new(session),
            labels: Arc::new(labels),
            model_characteristics,
            top_k: self.top_k,
        })
    }

    /// Validates that the model has the expected input/output structure and
    /// returns the output width when the model declares a fixed one.
    fn validate_model(session: &Session) -> Result<Option<usize>, ClassifierError> {
        let inputs = &session.inputs;
        if inputs.len() != 1 {
            return Err(ClassifierError::ModelError(
                format!("Model must have exactly 1 input (pixel values), found {}", inputs.len())
            ));
        }
        if let ValueType::Tensor { dimensions, .. } = &inputs[0].input_type {
            if dimensions.len() != 4 {
                return Err(ClassifierError::ModelError(
                    format!("Model input must be 4-dimensional (NCHW), found {:?}", dimensions)
                ));
            }
        }

        let outputs = &session.outputs;
        if outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for logits".to_string()
            ));
        }

        let declared = match &outputs[0].output_type {
            ValueType::Tensor { dimensions, .. } => dimensions
                .last()
                .and_then(|&d| usize::try_from(d).ok())
                .filter(|&d| d > 0),
            _ => None,
        };
        Ok(declared)
    }
}
