use std::collections::HashMap;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::{Array1, Array4};
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use super::utils::softmax;
use crate::ModelCharacteristics;

/// Converts an image into the NCHW float tensor a vision model expects.
///
/// The image is converted to RGB, resized exactly to the model input size,
/// scaled to [0, 1] and normalized per channel with the model mean and std.
pub fn preprocess_image(image: &DynamicImage, characteristics: &ModelCharacteristics) -> Array4<f32> {
    let (width, height) = (characteristics.input_width, characteristics.input_height);
    let rgb = if image.dimensions() == (width, height) {
        image.to_rgb8()
    } else {
        image.resize_exact(width, height, FilterType::Triangle).to_rgb8()
    };

    let mean = characteristics.mean;
    let std = characteristics.std;
    Array4::from_shape_fn((1, 3, height as usize, width as usize), |(_, c, y, x)| {
        let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
        (value - mean[c]) / std[c]
    })
}

/// Runs an ONNX vision model over images.
///
/// The ONNX model is expected to:
/// - Accept one input of shape [batch_size, 3, height, width]
/// - Output logits of shape [batch_size, num_labels]
pub(crate) trait VisionInference {
    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Returns the input geometry and normalization of the model
    fn characteristics(&self) -> Option<&ModelCharacteristics>;

    /// Runs the model and returns the raw logits of the first batch entry.
    ///
    /// # Errors
    /// - `ModelError` if the session or characteristics are missing
    /// - `ModelError` if tensor creation, execution or output extraction fails
    fn infer_logits(&self, image: &DynamicImage) -> Result<Array1<f32>, ClassifierError> {
        let session = self.session()
            .ok_or_else(|| ClassifierError::ModelError("Session not initialized".into()))?;
        let characteristics = self.characteristics()
            .ok_or_else(|| ClassifierError::ModelError("Model characteristics not set".into()))?;

        let input_name = session.inputs.first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ClassifierError::ModelError("Model has no inputs".into()))?;

        let pixels = preprocess_image(image, characteristics);
        let mut input_tensors = HashMap::new();
        input_tensors.insert(input_name, Tensor::from_array(pixels)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?);

        let outputs = session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        let shape = output_tensor.shape();
        if shape.len() != 2 || shape[0] < 1 {
            return Err(ClassifierError::ModelError(format!(
                "Expected logits of shape [batch, num_labels], got {:?}", shape
            )));
        }
        let logits = output_tensor.slice(ndarray::s![0, ..]);
        Ok(Array1::from_iter(logits.iter().cloned()))
    }

    /// Runs the model and returns class probabilities in label order.
    fn infer_probabilities(&self, image: &DynamicImage) -> Result<Array1<f32>, ClassifierError> {
        let logits = self.infer_logits(image)?;
        Ok(softmax(logits.view()))
    }
}
