use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use glimpse::presenter::{batch_summary, build_chart, headline, render_text};
use glimpse::{
    classify_paths, load_image, BatchPolicy, BuiltinModel, ClassificationService, ModelCharacteristics,
    ModelManager, RuntimeConfig,
};
use log::{error, info};
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about = "Classify images and show the top predictions", long_about = None)]
struct Args {
    /// Images to classify (jpg, jpeg or png). More than one runs a batch.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Force a fresh download of the model files
    #[arg(short, long, conflicts_with = "model_path")]
    fresh: bool,

    /// Number of predictions to show
    #[arg(short = 'k', long, default_value_t = glimpse::DEFAULT_TOP_K)]
    top_k: usize,

    /// Print headline and chart as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Keep going when an image in a batch fails
    #[arg(long)]
    isolate_failures: bool,

    /// Custom ONNX model (requires --labels-path)
    #[arg(long, env = "GLIMPSE_MODEL_PATH", requires = "labels_path")]
    model_path: Option<PathBuf>,

    /// Labels for the custom model: config.json with id2label, or one label per line
    #[arg(long, env = "GLIMPSE_LABELS_PATH", requires = "model_path")]
    labels_path: Option<PathBuf>,

    /// Square input side in pixels of the custom model
    #[arg(long, env = "GLIMPSE_INPUT_SIZE", default_value_t = 224, requires = "model_path")]
    input_size: u32,

    /// Per-channel normalization mean of the custom model, as R,G,B
    #[arg(long, env = "GLIMPSE_MEAN", value_delimiter = ',', default_values_t = [0.5, 0.5, 0.5], requires = "model_path")]
    mean: Vec<f32>,

    /// Per-channel normalization std of the custom model, as R,G,B
    #[arg(long, env = "GLIMPSE_STD", value_delimiter = ',', default_values_t = [0.5, 0.5, 0.5], requires = "model_path")]
    std: Vec<f32>,

    /// Intra-op threads for ONNX Runtime (0 lets the runtime decide)
    #[arg(long, env = "GLIMPSE_THREADS", default_value_t = 0)]
    threads: usize,
}

fn channel_triple(flag: &str, values: &[f32]) -> anyhow::Result<[f32; 3]> {
    <[f32; 3]>::try_from(values)
        .map_err(|_| anyhow!("{} takes 3 comma-separated values, got {}", flag, values.len()))
}

fn custom_characteristics(args: &Args) -> anyhow::Result<ModelCharacteristics> {
    if args.input_size == 0 {
        bail!("--input-size must be at least 1");
    }
    let mean = channel_triple("--mean", &args.mean)?;
    let std = channel_triple("--std", &args.std)?;
    if std.iter().any(|&s| s <= 0.0) {
        bail!("--std values must be positive");
    }
    Ok(ModelCharacteristics::square(args.input_size, mean, std))
}

async fn ensure_model_downloaded(fresh: bool) -> anyhow::Result<()> {
    let manager = ModelManager::new_default()?;
    let info = BuiltinModel::VitBasePatch16_224.get_model_info();

    if fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(&info.name)?;
    }

    manager.ensure_model_downloaded(&info).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.top_k == 0 {
        bail!("--top-k must be at least 1");
    }

    let runtime_config = RuntimeConfig::with_intra_threads(args.threads);
    let service = match (&args.model_path, &args.labels_path) {
        (Some(model_path), Some(labels_path)) => ClassificationService::with_custom_model(
            model_path.to_string_lossy().to_string(),
            labels_path.to_string_lossy().to_string(),
            custom_characteristics(&args)?,
            runtime_config,
            Some(args.top_k),
        ),
        _ => {
            ensure_model_downloaded(args.fresh).await?;
            ClassificationService::with_builtin_model(
                BuiltinModel::VitBasePatch16_224,
                runtime_config,
                Some(args.top_k),
            )
        }
    };

    let start = Instant::now();
    service.ensure_loaded().context("failed to load the classification model")?;
    info!("Service ready (took {:.2?})", start.elapsed());

    if let [path] = args.images.as_slice() {
        classify_single(&service, path, &args)
    } else {
        classify_many(&service, &args)
    }
}

fn classify_single(service: &ClassificationService, path: &Path, args: &Args) -> anyhow::Result<()> {
    let image = load_image(path).with_context(|| format!("failed to open {}", path.display()))?;
    let predictions = service.predict(&image)?;
    let top = headline(&predictions)?;
    let chart = build_chart(&predictions, args.top_k);

    if args.json {
        let output = json!({
            "source": path.display().to_string(),
            "headline": top,
            "chart": chart,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} {}  {}", top.emoji, top.label, top.confidence);
        println!();
        print!("{}", render_text(&chart));
    }
    Ok(())
}

fn classify_many(service: &ClassificationService, args: &Args) -> anyhow::Result<()> {
    let policy = if args.isolate_failures {
        BatchPolicy::Isolate
    } else {
        BatchPolicy::FailFast
    };
    info!("{} images selected", args.images.len());

    let report = classify_paths(service, &args.images, policy, |done, total| {
        eprintln!("Processing {}/{}", done, total);
    })?;

    if args.json {
        let mut items = Vec::with_capacity(report.results.len());
        for result in &report.results {
            items.push(json!({
                "source": result.source_name,
                "headline": headline(&result.predictions)?,
                "chart": build_chart(&result.predictions, args.top_k),
            }));
        }
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| json!({ "source": f.source_name, "error": f.error.to_string() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json!({ "results": items, "failures": failures }))?);
    } else {
        for result in &report.results {
            println!("{}", batch_summary(result)?);
            print!("{}", render_text(&build_chart(&result.predictions, args.top_k)));
            println!();
        }
        for failure in &report.failures {
            error!("{}: {}", failure.source_name, failure.error);
        }
    }

    if !report.failures.is_empty() {
        bail!("{} of {} images failed", report.failures.len(), report.total());
    }
    Ok(())
}
