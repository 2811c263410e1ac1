//! Fitted categorical encoders.
//!
//! A [`LabelEncoder`] maps a category label to its position in `classes`, the
//! same order the classifier was trained with. [`MoodEncoders`] bundles one
//! encoder per mood attribute with the `target` encoder that turns the
//! predicted class index back into a recommendation content key.

use serde::{Deserialize, Serialize};

use super::classifier_trait::ModelError;

/// Attribute order of the feature vector the classifier expects.
pub const FEATURE_ORDER: [&str; 5] = [
    "mood",
    "intensity",
    "socialInteraction",
    "productivity",
    "overwhelmed",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { classes: classes.into_iter().map(Into::into).collect() }
    }

    pub fn transform(&self, attribute: &str, label: &str) -> Result<usize, ModelError> {
        self.classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| ModelError::UnseenCategory {
                attribute: attribute.to_string(),
                label: label.to_string(),
            })
    }

    pub fn inverse_transform(&self, code: usize) -> Result<&str, ModelError> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(ModelError::UnknownClass(code))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The five self-reported mood attributes, already reduced to labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodInput {
    pub mood: String,
    pub intensity: String,
    pub social_interaction: String,
    pub productivity: String,
    pub overwhelmed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEncoders {
    pub mood: LabelEncoder,
    pub intensity: LabelEncoder,
    pub social_interaction: LabelEncoder,
    pub productivity: LabelEncoder,
    pub overwhelmed: LabelEncoder,
    pub target: LabelEncoder,
}

impl MoodEncoders {
    /// Single-row feature vector in [`FEATURE_ORDER`].
    pub fn encode(&self, input: &MoodInput) -> Result<Vec<f32>, ModelError> {
        let pairs = [
            (&self.mood, input.mood.as_str()),
            (&self.intensity, input.intensity.as_str()),
            (&self.social_interaction, input.social_interaction.as_str()),
            (&self.productivity, input.productivity.as_str()),
            (&self.overwhelmed, input.overwhelmed.as_str()),
        ];

        pairs
            .iter()
            .zip(FEATURE_ORDER)
            .map(|((encoder, label), attribute)| {
                encoder.transform(attribute, label).map(|code| code as f32)
            })
            .collect()
    }

    pub fn decode_target(&self, class_index: usize) -> Result<&str, ModelError> {
        self.target.inverse_transform(class_index)
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let encoders = [
            &self.mood,
            &self.intensity,
            &self.social_interaction,
            &self.productivity,
            &self.overwhelmed,
            &self.target,
        ];
        for (encoder, name) in encoders.iter().zip(FEATURE_ORDER.iter().chain(["target"].iter())) {
            if encoder.is_empty() {
                return Err(ModelError::Invalid(format!("encoder '{}' has no classes", name)));
            }
        }
        Ok(())
    }
}
