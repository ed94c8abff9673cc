//! Image classification with a pretrained ONNX vision model, plus the pieces
//! needed to show the result: an emoji annotation for the top label, a top-k
//! bar chart description and a one-line headline.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use glimpse::{BuiltinModel, ClassificationService, RuntimeConfig};
//! use glimpse::presenter::{build_default_chart, headline, render_text};
//!
//! let service = ClassificationService::with_builtin_model(
//!     BuiltinModel::VitBasePatch16_224,
//!     RuntimeConfig::default(),
//!     Some(5),
//! );
//!
//! let image = glimpse::load_image("cat.jpg".as_ref())?;
//! let predictions = service.predict(&image)?;
//!
//! let top = headline(&predictions)?;
//! println!("{} {} ({})", top.emoji, top.label, top.confidence);
//! print!("{}", render_text(&build_default_chart(&predictions)));
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! [`Classifier`] is `Send + Sync` and [`ClassificationService`] loads it at
//! most once, so a single service can be shared across threads with `Arc`.

pub mod annotator;
pub mod batch;
pub mod classifier;
pub mod model_manager;
pub mod models;
pub mod presenter;
mod runtime;
pub mod service;

pub use annotator::{emoji_for, Category, CategoryRule, CATEGORY_RULES, FALLBACK_EMOJI};
pub use batch::{classify_batch, classify_paths, load_image, BatchPolicy, BatchReport, ClassificationResult};
pub use classifier::{Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, ImageClassifier, Prediction, DEFAULT_TOP_K};
pub use model_manager::{ModelManager, ModelError};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use presenter::{build_chart, format_percentage, headline, ChartSpec, Headline};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use service::ClassificationService;

pub fn init_logger() {
    env_logger::init();
}
