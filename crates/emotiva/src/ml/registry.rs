//! Loads the configured artifacts once and hands out shared, read-only models.
//!
//! A missing or broken artifact disables only the endpoint that needs it; the
//! rest of the service keeps running.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::classifier_trait::{ModelError, TabularClassifier, TextClassifier};
use super::encoder::{MoodEncoders, MoodInput, FEATURE_ORDER};
use super::format_detector::FormatDetector;
use super::text_classifier::LinearTextClassifier;
use super::tree_ensemble::TreeEnsemble;
use crate::config::Config;

/// Encoders plus the classifier they were fitted for.
pub struct MoodModel {
    pub encoders: MoodEncoders,
    pub classifier: Arc<dyn TabularClassifier>,
}

impl MoodModel {
    pub fn new(encoders: MoodEncoders, classifier: Arc<dyn TabularClassifier>) -> anyhow::Result<Self> {
        encoders.validate()?;
        if classifier.n_features() != FEATURE_ORDER.len() {
            anyhow::bail!(
                "Mood classifier expects {} features, encoders produce {}",
                classifier.n_features(),
                FEATURE_ORDER.len()
            );
        }
        if classifier.n_classes() != encoders.target.len() {
            anyhow::bail!(
                "Mood classifier has {} classes, target encoder has {} labels",
                classifier.n_classes(),
                encoders.target.len()
            );
        }
        Ok(Self { encoders, classifier })
    }

    /// Encode, predict, decode: the content key of the matching recommendation.
    pub fn content_key(&self, input: &MoodInput) -> Result<String, ModelError> {
        let features = self.encoders.encode(input)?;
        let class_index = self.classifier.predict(&features)?;
        Ok(self.encoders.decode_target(class_index)?.to_string())
    }
}

#[derive(Default)]
pub struct ModelRegistry {
    pub mood: Option<Arc<MoodModel>>,
    pub sentiment: Option<Arc<dyn TextClassifier>>,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_mood(mut self, model: MoodModel) -> Self {
        self.mood = Some(Arc::new(model));
        self
    }

    pub fn with_sentiment(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.sentiment = Some(classifier);
        self
    }

    /// Load every configured artifact. Never fails: whatever cannot be loaded
    /// is logged and left out.
    pub fn load(cfg: &Config) -> Self {
        let mood = match load_mood_model(&cfg.encoders_path, &cfg.mood_model_path) {
            Ok(model) => {
                info!("Mood recommender ready ({} content keys)", model.encoders.target.len());
                Some(Arc::new(model))
            }
            Err(e) => {
                warn!("Mood recommender disabled: {:#}", e);
                None
            }
        };

        let sentiment = match load_sentiment_model(&cfg.sentiment_model_path) {
            Ok(model) => {
                info!("Sentiment classifier ready ({} labels)", model.labels.len());
                Some(Arc::new(model) as Arc<dyn TextClassifier>)
            }
            Err(e) => {
                warn!("Sentiment classifier disabled: {:#}", e);
                None
            }
        };

        Self { mood, sentiment }
    }

    pub fn loaded_models(&self) -> Vec<&'static str> {
        let mut loaded = Vec::new();
        if self.mood.is_some() {
            loaded.push("mood");
        }
        if self.sentiment.is_some() {
            loaded.push("sentiment");
        }
        loaded
    }
}

fn load_mood_model(encoders_path: &Path, model_path: &Path) -> anyhow::Result<MoodModel> {
    let encoders: MoodEncoders = FormatDetector::load(encoders_path)?;
    let ensemble: TreeEnsemble = FormatDetector::load(model_path)?;
    ensemble.validate()?;
    MoodModel::new(encoders, Arc::new(ensemble))
}

fn load_sentiment_model(path: &Path) -> anyhow::Result<LinearTextClassifier> {
    let model: LinearTextClassifier = FormatDetector::load(path)?;
    model.validate()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::encoder::tests::{sample_encoders, sample_input};
    use crate::ml::text_classifier::tests::sample_sentiment;
    use crate::ml::tree_ensemble::tests::sample_forest;
    use std::path::PathBuf;

    fn config_in(dir: &Path) -> Config {
        Config {
            api_host: "127.0.0.1".into(),
            api_port: 0,
            database_path: dir.join("emotiva.db"),
            db_pool_size: 1,
            encoders_path: dir.join("encoders.json"),
            mood_model_path: dir.join("mood_classifier.bin"),
            sentiment_model_path: dir.join("sentiment_classifier.json"),
            content_seed_path: dir.join("recommendations.json"),
            request_timeout_seconds: 5,
        }
    }

    #[test]
    fn test_content_key_runs_full_pipeline() {
        let model = MoodModel::new(sample_encoders(), Arc::new(sample_forest())).unwrap();
        // sad + overwhelmed -> class 0 -> "calm"
        assert_eq!(model.content_key(&sample_input()).unwrap(), "calm");
    }

    #[test]
    fn test_class_count_mismatch_rejected() {
        let mut encoders = sample_encoders();
        encoders.target.classes.pop();
        assert!(MoodModel::new(encoders, Arc::new(sample_forest())).is_err());
    }

    #[test]
    fn test_load_from_mixed_formats() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        std::fs::write(&cfg.encoders_path, serde_json::to_vec(&sample_encoders()).unwrap()).unwrap();
        std::fs::write(&cfg.mood_model_path, bincode::serialize(&sample_forest()).unwrap()).unwrap();
        std::fs::write(&cfg.sentiment_model_path, serde_json::to_vec(&sample_sentiment()).unwrap()).unwrap();

        let registry = ModelRegistry::load(&cfg);
        assert_eq!(registry.loaded_models(), vec!["mood", "sentiment"]);
    }

    #[test]
    fn test_missing_artifacts_disable_models() {
        let cfg = config_in(&PathBuf::from("/nonexistent/emotiva"));
        let registry = ModelRegistry::load(&cfg);
        assert!(registry.mood.is_none());
        assert!(registry.sentiment.is_none());
    }
}
