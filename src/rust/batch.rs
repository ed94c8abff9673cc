use std::path::Path;

use image::DynamicImage;
use log::{info, warn};

use crate::classifier::{ClassifierError, Prediction};
use crate::service::ClassificationService;

/// File extensions accepted as input images (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// What a batch does when one image fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop at the first failure and return it
    #[default]
    FailFast,
    /// Record the failure and continue with the next image
    Isolate,
}

/// Outcome of classifying one image of a batch
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub source_name: String,
    pub image: DynamicImage,
    pub predictions: Vec<Prediction>,
}

impl ClassificationResult {
    pub fn top(&self) -> Result<&Prediction, ClassifierError> {
        self.predictions.first().ok_or(ClassifierError::EmptyPredictions)
    }
}

#[derive(Debug)]
pub struct BatchFailure {
    pub source_name: String,
    pub error: ClassifierError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful results, in input order
    pub results: Vec<ClassificationResult>,
    /// Failures, in input order; always empty under `FailFast`
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

/// Opens and decodes an image, accepting only [`SUPPORTED_EXTENSIONS`].
pub fn load_image(path: &Path) -> Result<DynamicImage, ClassifierError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ClassifierError::ValidationError(format!(
            "Unsupported image type {:?} (expected one of {})",
            path,
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }
    Ok(image::open(path)?)
}

/// Display name for a path: its file name, or the whole path if it has none.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Classifies decoded images one at a time, in order.
///
/// `on_progress(done, total)` is called after every image, failed or not.
pub fn classify_batch<I, F>(
    service: &ClassificationService,
    inputs: I,
    policy: BatchPolicy,
    on_progress: F,
) -> Result<BatchReport, ClassifierError>
where
    I: IntoIterator<Item = (String, DynamicImage)>,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(usize, usize),
{
    run_batch(service, inputs.into_iter().map(|(name, image)| (name, Ok(image))), policy, on_progress)
}

/// Loads and classifies image files one at a time, in order. A file that
/// cannot be loaded counts as a failure of that item.
pub fn classify_paths<P, F>(
    service: &ClassificationService,
    paths: &[P],
    policy: BatchPolicy,
    on_progress: F,
) -> Result<BatchReport, ClassifierError>
where
    P: AsRef<Path>,
    F: FnMut(usize, usize),
{
    let inputs = paths.iter().map(|path| {
        let path = path.as_ref();
        (source_name(path), load_image(path))
    });
    run_batch(service, inputs, policy, on_progress)
}

fn run_batch<I, F>(
    service: &ClassificationService,
    inputs: I,
    policy: BatchPolicy,
    mut on_progress: F,
) -> Result<BatchReport, ClassifierError>
where
    I: ExactSizeIterator<Item = (String, Result<DynamicImage, ClassifierError>)>,
    F: FnMut(usize, usize),
{
    let total = inputs.len();
    let mut report = BatchReport::default();

    for (index, (source_name, image)) in inputs.enumerate() {
        info!("Processing {}/{}: {}", index + 1, total, source_name);
        let outcome = image.and_then(|image| {
            let predictions = service.predict(&image)?;
            Ok(ClassificationResult { source_name: source_name.clone(), image, predictions })
        });

        match outcome {
            Ok(result) => report.results.push(result),
            Err(error) => match policy {
                BatchPolicy::FailFast => return Err(error),
                BatchPolicy::Isolate => {
                    warn!("Skipping {}: {}", source_name, error);
                    report.failures.push(BatchFailure { source_name, error });
                }
            },
        }
        on_progress(index + 1, total);
    }

    info!(
        "Batch finished: {} classified, {} failed",
        report.results.len(),
        report.failures.len()
    );
    Ok(report)
}
