use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unseen {attribute} category '{label}'")]
    UnseenCategory { attribute: String, label: String },

    #[error("class index {0} has no label")]
    UnknownClass(usize),

    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("invalid model: {0}")]
    Invalid(String),
}

/// One label and its probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Classifier over a dense single-row feature vector.
pub trait TabularClassifier: Send + Sync {
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// Index of the predicted class.
    fn predict(&self, features: &[f32]) -> Result<usize, ModelError>;
}

/// Classifier over free text.
pub trait TextClassifier: Send + Sync {
    /// Every label with its score, best first.
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ModelError>;

    fn top_label(&self, text: &str) -> Result<LabelScore, ModelError> {
        self.classify(text)?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Invalid("classifier returned no labels".to_string()))
    }
}
