//! Tree-ensemble classifier evaluated from a flattened, pre-trained artifact.
//!
//! Trees are stored as node arrays rooted at index 0. A split sends a row
//! left when `x[feature] <= threshold`. Children always sit after their
//! parent, which [`TreeEnsemble::validate`] checks so evaluation terminates.

use serde::{Deserialize, Serialize};

use super::classifier_trait::{ModelError, TabularClassifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f32>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn leaf(&self, x: &[f32]) -> &[f32] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    fn validate(&self, n_features: usize, leaf_width: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid("tree has no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(ModelError::Invalid(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, n_features
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ModelError::Invalid(format!("node {} has a NaN threshold", idx)));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(ModelError::Invalid(format!(
                                "node {} points to invalid child {}",
                                idx, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != leaf_width {
                        return Err(ModelError::Invalid(format!(
                            "leaf {} holds {} values, expected {}",
                            idx,
                            value.len(),
                            leaf_width
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeEnsemble {
    /// Leaves hold per-class counts or fractions; trees vote by averaging
    /// their normalized leaf distributions.
    RandomForest {
        n_features: usize,
        n_classes: usize,
        trees: Vec<DecisionTree>,
    },
    /// Leaves hold one raw score. Each stage has one tree per class, or a
    /// single tree when there are two classes.
    GradientBoosting {
        n_features: usize,
        n_classes: usize,
        learning_rate: f32,
        init: Vec<f32>,
        stages: Vec<Vec<DecisionTree>>,
    },
}

impl TreeEnsemble {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            TreeEnsemble::RandomForest { n_features, n_classes, trees } => {
                if *n_classes == 0 || trees.is_empty() {
                    return Err(ModelError::Invalid("forest needs classes and trees".to_string()));
                }
                for tree in trees {
                    tree.validate(*n_features, *n_classes)?;
                }
            }
            TreeEnsemble::GradientBoosting { n_features, n_classes, init, stages, .. } => {
                if *n_classes < 2 || stages.is_empty() {
                    return Err(ModelError::Invalid(
                        "boosting needs at least two classes and one stage".to_string(),
                    ));
                }
                let per_stage = boosting_width(*n_classes);
                if init.len() != per_stage {
                    return Err(ModelError::Invalid(format!(
                        "init holds {} scores, expected {}",
                        init.len(),
                        per_stage
                    )));
                }
                for stage in stages {
                    if stage.len() != per_stage {
                        return Err(ModelError::Invalid(format!(
                            "stage holds {} trees, expected {}",
                            stage.len(),
                            per_stage
                        )));
                    }
                    for tree in stage {
                        tree.validate(*n_features, 1)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Averaged class distribution (forest) or raw per-class scores (boosting).
    pub fn scores(&self, x: &[f32]) -> Result<Vec<f32>, ModelError> {
        let expected = self.n_features();
        if x.len() != expected {
            return Err(ModelError::FeatureCount { expected, actual: x.len() });
        }

        match self {
            TreeEnsemble::RandomForest { n_classes, trees, .. } => {
                let mut proba = vec![0.0f32; *n_classes];
                for tree in trees {
                    let leaf = tree.leaf(x);
                    let total: f32 = leaf.iter().sum();
                    if total > 0.0 {
                        for (p, v) in proba.iter_mut().zip(leaf) {
                            *p += v / total;
                        }
                    }
                }
                let n_trees = trees.len() as f32;
                proba.iter_mut().for_each(|p| *p /= n_trees);
                Ok(proba)
            }
            TreeEnsemble::GradientBoosting { learning_rate, init, stages, .. } => {
                let mut raw = init.clone();
                for stage in stages {
                    for (score, tree) in raw.iter_mut().zip(stage) {
                        *score += learning_rate * tree.leaf(x)[0];
                    }
                }
                Ok(raw)
            }
        }
    }
}

fn boosting_width(n_classes: usize) -> usize {
    if n_classes == 2 { 1 } else { n_classes }
}

/// First index of the maximum; lowest index wins ties.
fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v { (i, v) } else { (best_i, best_v) }
        })
        .0
}

impl TabularClassifier for TreeEnsemble {
    fn n_features(&self) -> usize {
        match self {
            TreeEnsemble::RandomForest { n_features, .. }
            | TreeEnsemble::GradientBoosting { n_features, .. } => *n_features,
        }
    }

    fn n_classes(&self) -> usize {
        match self {
            TreeEnsemble::RandomForest { n_classes, .. }
            | TreeEnsemble::GradientBoosting { n_classes, .. } => *n_classes,
        }
    }

    fn predict(&self, features: &[f32]) -> Result<usize, ModelError> {
        let scores = self.scores(features)?;
        match self {
            TreeEnsemble::GradientBoosting { n_classes: 2, .. } => {
                Ok(if scores[0] > 0.0 { 1 } else { 0 })
            }
            _ => Ok(argmax(&scores)),
        }
    }
}
