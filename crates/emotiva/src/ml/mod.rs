//! Model artifacts loaded once at startup and shared read-only.
//!
//! - `encoder`: fitted categorical encoders for the five mood attributes
//!   plus the target decoder that turns a class index into a content key
//! - `tree_ensemble`: random-forest / gradient-boosted tree classifier
//! - `text_classifier`: bag-of-words sentiment classifier
//! - `classifier_trait`: the seams handlers call through
//! - `format_detector`: artifact encoding from file extension
//! - `registry`: what got loaded, and from where
pub mod classifier_trait;
pub mod encoder;
pub mod format_detector;
pub mod registry;
pub mod text_classifier;
pub mod tree_ensemble;
pub use classifier_trait::{LabelScore, ModelError, TabularClassifier, TextClassifier};
pub use encoder::{LabelEncoder, MoodEncoders, MoodInput, FEATURE_ORDER};
pub use format_detector::{ArtifactFormat, FormatDetector};
pub use registry::{ModelRegistry, MoodModel};
pub use text_classifier::LinearTextClassifier;
pub use tree_ensemble::{DecisionTree, TreeEnsemble, TreeNode};
