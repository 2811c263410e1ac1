//!
//! Detects how a model artifact is encoded from its file extension
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn extensions(&self) -> &[&str] {
        match self {
            ArtifactFormat::Json => &["json"],
            ArtifactFormat::Bincode => &["bin", "bincode"],
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ArtifactFormat::Json => "JSON",
            ArtifactFormat::Bincode => "bincode",
        }
    }
}

pub struct FormatDetector;

impl FormatDetector {
    pub fn detect_from_path(path: &Path) -> Option<ArtifactFormat> {
        let extension = path.extension()?.to_str()?.to_lowercase();

        [ArtifactFormat::Json, ArtifactFormat::Bincode]
            .into_iter()
            .find(|fmt| fmt.extensions().contains(&extension.as_str()))
    }

    /// Read and decode an artifact, picking the decoder from the extension.
    pub fn load<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
        let format = Self::detect_from_path(path).ok_or_else(|| {
            anyhow::anyhow!("Unsupported artifact extension: {}", path.display())
        })?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;

        let value = match format {
            ArtifactFormat::Json => serde_json::from_slice(&bytes)
                .with_context(|| format!("Malformed JSON artifact {}", path.display()))?,
            ArtifactFormat::Bincode => bincode::deserialize(&bytes)
                .with_context(|| format!("Malformed bincode artifact {}", path.display()))?,
        };
        info!("Loaded {} artifact: {}", format.name(), path.display());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_json_detection() {
        let path = PathBuf::from("encoders.JSON");
        assert_eq!(FormatDetector::detect_from_path(&path), Some(ArtifactFormat::Json));
    }

    #[test]
    fn test_bincode_detection() {
        assert_eq!(
            FormatDetector::detect_from_path(&PathBuf::from("model.bin")),
            Some(ArtifactFormat::Bincode)
        );
        assert_eq!(
            FormatDetector::detect_from_path(&PathBuf::from("model.bincode")),
            Some(ArtifactFormat::Bincode)
        );
    }

    #[test]
    fn test_pickle_is_unsupported() {
        assert_eq!(FormatDetector::detect_from_path(&PathBuf::from("emotion_model.pkl")), None);
        assert!(FormatDetector::load::<Vec<String>>(&PathBuf::from("emotion_model.pkl")).is_err());
    }

    #[test]
    fn test_bincode_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.bin");
        let labels = vec!["calm".to_string(), "joy".to_string()];
        std::fs::write(&path, bincode::serialize(&labels).unwrap()).unwrap();

        let loaded: Vec<String> = FormatDetector::load(&path).unwrap();
        assert_eq!(loaded, labels);
    }
}
