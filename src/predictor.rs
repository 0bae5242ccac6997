use std::sync::Arc;

use image::DynamicImage;
use serde::Serialize;

use crate::labels::LabelTable;
use crate::model::{Classifier, ModelError};
use crate::preprocess;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class_id: usize,
    pub class_name: String,
    pub confidence: f32,
}

/// Classifier plus its label table, built once at startup.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    labels: Arc<LabelTable>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelTable) -> Self {
        Self {
            classifier,
            labels: Arc::new(labels),
        }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn predict(&self, image: &DynamicImage) -> Result<Prediction, ModelError> {
        let tensor = preprocess::normalize(image);
        let probabilities = self.classifier.infer(&tensor)?;

        let (class_id, confidence) = argmax(&probabilities).ok_or(ModelError::EmptyOutput)?;
        let class_name = self
            .labels
            .get(class_id)
            .ok_or(ModelError::UnknownClass {
                class_id,
                labels: self.labels.len(),
            })?
            .to_string();

        Ok(Prediction {
            class_id,
            class_name,
            confidence,
        })
    }
}

/// Index and value of the largest entry. Ties go to the lowest index and NaN
/// never wins unless every entry is NaN.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut iter = values.iter().copied().enumerate();
    let first = iter.next()?;
    Some(iter.fold(first, |best, (i, v)| {
        if v > best.1 || (best.1.is_nan() && !v.is_nan()) {
            (i, v)
        } else {
            best
        }
    }))
}
