//! Configuration for the risk classifier

use crate::forest::ForestConfig;
use crate::training::FeatureDistributions;
use serde::{Deserialize, Serialize};

/// Training configuration for the built-in model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Seed for both the data generator and the forest
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of synthetic training samples
    #[serde(default = "default_samples")]
    pub samples: usize,

    #[serde(default = "default_trees")]
    pub trees: usize,

    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default)]
    pub distributions: FeatureDistributions,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            samples: default_samples(),
            trees: default_trees(),
            max_depth: None,
            distributions: FeatureDistributions::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn forest(&self) -> ForestConfig {
        ForestConfig {
            trees: self.trees,
            max_depth: self.max_depth,
            seed: self.seed,
            ..Default::default()
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_samples() -> usize {
    1000
}

fn default_trees() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ClassifierConfig = serde_json::from_str(r#"{"trees": 10}"#).unwrap();
        assert_eq!(config.trees, 10);
        assert_eq!(config.seed, 42);
        assert_eq!(config.samples, 1000);
        assert_eq!(config.distributions, FeatureDistributions::default());
    }

    #[test]
    fn forest_config_carries_seed() {
        let config = ClassifierConfig {
            seed: 7,
            trees: 3,
            ..Default::default()
        };
        let forest = config.forest();
        assert_eq!(forest.seed, 7);
        assert_eq!(forest.trees, 3);
    }
}
