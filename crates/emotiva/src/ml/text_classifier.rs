//! Bag-of-words linear sentiment classifier.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::classifier_trait::{LabelScore, ModelError, TextClassifier};

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(r"[\p{L}\p{N}']+").unwrap();
}

/// `score[k] = bias[k] + Σ count(term) * weights[k][vocabulary[term]]`,
/// softmaxed over `labels`. Terms outside the vocabulary are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTextClassifier {
    pub labels: Vec<String>,
    pub vocabulary: HashMap<String, usize>,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LinearTextClassifier {
    pub fn validate(&self) -> Result<(), ModelError> {
        let n_labels = self.labels.len();
        if n_labels == 0 {
            return Err(ModelError::Invalid("classifier has no labels".to_string()));
        }
        if self.weights.len() != n_labels || self.bias.len() != n_labels {
            return Err(ModelError::Invalid(format!(
                "{} labels but {} weight rows and {} biases",
                n_labels,
                self.weights.len(),
                self.bias.len()
            )));
        }
        let n_terms = self.vocabulary.len();
        if let Some(row) = self.weights.iter().find(|row| row.len() != n_terms) {
            return Err(ModelError::Invalid(format!(
                "weight row has {} entries for a vocabulary of {}",
                row.len(),
                n_terms
            )));
        }
        if let Some((term, idx)) = self.vocabulary.iter().find(|(_, idx)| **idx >= n_terms) {
            return Err(ModelError::Invalid(format!("term '{}' maps to column {}", term, idx)));
        }
        Ok(())
    }

    fn term_counts(&self, text: &str) -> HashMap<usize, f32> {
        let lowered = text.to_lowercase();
        let mut counts = HashMap::new();
        for token in TOKEN_REGEX.find_iter(&lowered) {
            if let Some(&column) = self.vocabulary.get(token.as_str()) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }
        counts
    }
}

impl TextClassifier for LinearTextClassifier {
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ModelError> {
        let counts = self.term_counts(text);

        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| bias + counts.iter().map(|(col, n)| row[*col] * n).sum::<f32>())
            .collect();

        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exp.iter().sum();

        let mut scored: Vec<LabelScore> = self
            .labels
            .iter()
            .zip(exp)
            .map(|(label, e)| LabelScore { label: label.clone(), score: e / total })
            .collect();
        // Stable sort: equal scores keep label order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(scored)
    }
}
