use serde::{Deserialize, Serialize};

/// Represents the available built-in models in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// Vision Transformer (base, 16x16 patches) fine-tuned on ImageNet-1k
    ///
    /// Characteristics:
    /// - Input: 224x224 RGB, normalized with mean 0.5 / std 0.5
    /// - Labels: 1000 ImageNet classes
    /// - Size: ~346MB
    VitBasePatch16_224,
}

/// Characteristics of a model including its input geometry and normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCharacteristics {
    /// Width in pixels the model expects
    pub input_width: u32,
    /// Height in pixels the model expects
    pub input_height: u32,
    /// Per-channel mean subtracted after scaling to [0, 1]
    pub mean: [f32; 3],
    /// Per-channel standard deviation applied after the mean
    pub std: [f32; 3],
    /// Number of output classes, 0 if unknown
    pub num_labels: usize,
    /// Approximate size of the model on disk
    pub model_size_mb: usize,
}

impl ModelCharacteristics {
    /// Characteristics for a square model with the given side and normalization.
    /// The label count is inferred from the model when the builder loads it.
    pub fn square(side: u32, mean: [f32; 3], std: [f32; 3]) -> Self {
        Self {
            input_width: side,
            input_height: side,
            mean,
            std,
            num_labels: 0,
            model_size_mb: 0,
        }
    }
}

impl Default for ModelCharacteristics {
    fn default() -> Self {
        BuiltinModel::VitBasePatch16_224.characteristics()
    }
}

/// Where a model's files live and how to check them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub labels_url: String,
    /// SHA-256 of the ONNX file; unverified when `None`
    pub model_hash: Option<String>,
    /// SHA-256 of the label config; unverified when `None`
    pub labels_hash: Option<String>,
}

impl BuiltinModel {
    /// Get the characteristics of the model
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            Self::VitBasePatch16_224 => ModelCharacteristics {
                input_width: 224,
                input_height: 224,
                mean: [0.5, 0.5, 0.5],
                std: [0.5, 0.5, 0.5],
                num_labels: 1000,
                model_size_mb: 346,
            },
        }
    }

    /// Get the download locations for the model and its label config
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            Self::VitBasePatch16_224 => ModelInfo {
                name: "vit-base-patch16-224".to_string(),
                model_url: "https://huggingface.co/Xenova/vit-base-patch16-224/resolve/main/onnx/model.onnx".to_string(),
                labels_url: "https://huggingface.co/Xenova/vit-base-patch16-224/resolve/main/config.json".to_string(),
                model_hash: None,
                labels_hash: None,
            },
        }
    }
}
