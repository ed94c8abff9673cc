use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use log::{error, info};
use once_cell::sync::OnceCell;

use crate::classifier::{Classifier, ClassifierError, ImageClassifier, Prediction};
use crate::models::{BuiltinModel, ModelCharacteristics};
use crate::runtime::RuntimeConfig;

type Loader = Box<dyn Fn() -> Result<Arc<dyn ImageClassifier>, ClassifierError> + Send + Sync>;

/// Owns a lazily loaded classifier and serves predictions from it.
///
/// The classifier is loaded on the first call to [`predict`](Self::predict) or
/// [`ensure_loaded`](Self::ensure_loaded) and kept for the lifetime of the
/// service. Concurrent first callers block on a single load. A failed load is
/// returned to its caller and the next call tries again.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use glimpse::{BuiltinModel, ClassificationService, RuntimeConfig};
///
/// let service = ClassificationService::with_builtin_model(BuiltinModel::VitBasePatch16_224, RuntimeConfig::default(), Some(5));
/// let image = image::open("cat.jpg")?;
/// let predictions = service.predict(&image)?;
/// # Ok(())
/// # }
/// ```
pub struct ClassificationService {
    loader: Loader,
    classifier: OnceCell<Arc<dyn ImageClassifier>>,
}

impl fmt::Debug for ClassificationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationService")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ClassificationService {
    /// Creates a service that loads its classifier with `loader` on first use.
    pub fn new<F, C>(loader: F) -> Self
    where
        F: Fn() -> Result<C, ClassifierError> + Send + Sync + 'static,
        C: ImageClassifier + 'static,
    {
        Self {
            loader: Box::new(move || loader().map(|c| Arc::new(c) as Arc<dyn ImageClassifier>)),
            classifier: OnceCell::new(),
        }
    }

    /// Wraps an already loaded classifier.
    pub fn from_classifier(classifier: Arc<dyn ImageClassifier>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Arc::clone(&classifier));
        Self {
            loader: Box::new(move || Ok(Arc::clone(&classifier))),
            classifier: cell,
        }
    }

    /// Service backed by a downloaded builtin model.
    pub fn with_builtin_model(model: BuiltinModel, config: RuntimeConfig, top_k: Option<usize>) -> Self {
        Self::new(move || {
            Classifier::builder()
                .with_runtime_config(config.clone())
                .with_top_k(top_k)
                .with_model(model)?
                .build()
        })
    }

    /// Service backed by a model file and label file on disk.
    pub fn with_custom_model(
        model_path: String,
        labels_path: String,
        characteristics: ModelCharacteristics,
        config: RuntimeConfig,
        top_k: Option<usize>,
    ) -> Self {
        Self::new(move || {
            Classifier::builder()
                .with_runtime_config(config.clone())
                .with_top_k(top_k)
                .with_custom_model(&model_path, &labels_path, characteristics.clone())?
                .build()
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.get().is_some()
    }

    /// Loads the classifier now if it is not loaded yet.
    pub fn ensure_loaded(&self) -> Result<(), ClassifierError> {
        self.classifier().map(|_| ())
    }

    fn classifier(&self) -> Result<&Arc<dyn ImageClassifier>, ClassifierError> {
        self.classifier.get_or_try_init(|| {
            info!("Loading classification model...");
            let start = Instant::now();
            let loaded = (self.loader)().map_err(|e| {
                error!("Failed to load classification model: {}", e);
                e
            })?;
            info!("Model loaded (took {:.2?})", start.elapsed());
            Ok(loaded)
        })
    }

    /// Classifies `image`, returning the classifier's ranked predictions unchanged.
    pub fn predict(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError> {
        self.classifier()?.classify(image)
    }
}
