//! HazardNexus Classifiers
//!
//! Coarse per-region hazard risk estimation.
//!
//! A random forest is trained once at startup on synthetic feature vectors
//! (rainfall, seismic magnitude, soil moisture, river level) labelled by a
//! fixed priority rule. Inference goes through the [`RiskModel`] trait, so a
//! model trained offline can replace the built-in forest.

pub mod classifier;
pub mod config;
pub mod forest;
pub mod predictor;
pub mod profiles;
pub mod training;

pub use classifier::{
    ClassProbabilities, HazardClass, PredictionResult, RiskModel, RiskProfile, CLASS_COUNT,
    FEATURE_COUNT,
};
pub use config::ClassifierConfig;
pub use forest::{DecisionTree, ForestConfig, RandomForest};
pub use predictor::RiskClassifier;
pub use profiles::{profile_for, reference_states, DEFAULT_PROFILE, STATE_PROFILES};
pub use training::{
    label_for, FeatureDistribution, FeatureDistributions, SyntheticDataGenerator, TrainingSample,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{HazardClass, PredictionResult, RiskModel, RiskProfile};
    pub use crate::config::ClassifierConfig;
    pub use crate::predictor::RiskClassifier;
}
