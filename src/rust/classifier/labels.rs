use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::ClassifierError;
use crate::model_manager::ModelError;

#[derive(Deserialize)]
struct LabelConfig {
    id2label: BTreeMap<String, String>,
}

/// Loads class labels indexed by model output position.
///
/// `.json` files are read as a Hugging Face model config and must carry an
/// `id2label` table with contiguous integer keys starting at 0. Any other file
/// is read as one label per line.
pub(crate) fn load_labels(path: &Path) -> Result<Vec<String>, ClassifierError> {
    let text = fs::read_to_string(path)
        .map_err(|e| ClassifierError::BuildError(format!("Failed to read labels {:?}: {}", path, e)))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let labels = if is_json {
        parse_id2label(&text).map_err(|e| ClassifierError::BuildError(format!("{} ({:?})", e, path)))?
    } else {
        parse_lines(&text)
    };

    if labels.is_empty() {
        return Err(ClassifierError::BuildError(format!("No labels found in {:?}", path)));
    }
    Ok(labels)
}

pub(crate) fn parse_id2label(text: &str) -> Result<Vec<String>, ModelError> {
    let config: LabelConfig = serde_json::from_str(text)
        .map_err(|e| ModelError::InvalidLabels(e.to_string()))?;

    let mut indexed = Vec::with_capacity(config.id2label.len());
    for (id, label) in config.id2label {
        let id: usize = id
            .parse()
            .map_err(|_| ModelError::InvalidLabels(format!("label id '{}' is not an integer", id)))?;
        indexed.push((id, label));
    }
    indexed.sort_by_key(|(id, _)| *id);

    if let Some(pos) = indexed.iter().enumerate().position(|(i, (id, _))| i != *id) {
        return Err(ModelError::InvalidLabels(format!("label ids are not contiguous at index {}", pos)));
    }
    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

pub(crate) fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
