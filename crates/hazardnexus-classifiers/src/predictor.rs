//! Per-region risk prediction

use crate::classifier::{PredictionResult, RiskModel, RiskProfile};
use crate::config::ClassifierConfig;
use crate::forest::RandomForest;
use crate::profiles::{profile_for, STATE_PROFILES};
use crate::training::SyntheticDataGenerator;
use hazardnexus_core::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Turns regional risk profiles into bounded predictions
///
/// Cloning is cheap; the model is shared.
#[derive(Clone)]
pub struct RiskClassifier {
    model: Arc<dyn RiskModel>,
}

impl RiskClassifier {
    /// Wrap an already trained model
    pub fn new(model: Arc<dyn RiskModel>) -> Self {
        Self { model }
    }

    /// Generate synthetic data and train the built-in forest
    pub fn train(config: &ClassifierConfig) -> Result<Self> {
        let start = Instant::now();

        let samples =
            SyntheticDataGenerator::new(config.distributions, config.seed)?.generate(config.samples);
        let forest = RandomForest::fit(&samples, &config.forest())?;

        info!(
            "Trained risk classifier ({} trees, {} samples, seed {}) in {:?}",
            forest.tree_count(),
            samples.len(),
            config.seed,
            start.elapsed()
        );

        Ok(Self::new(Arc::new(forest)))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn predict(&self, state: &str, profile: RiskProfile) -> PredictionResult {
        let probabilities = self.model.predict_proba(&profile.features());
        PredictionResult::from_probabilities(state, profile, &probabilities)
    }

    /// Predict for a named region, using its stored profile
    pub fn predict_state(&self, state: &str) -> PredictionResult {
        self.predict(state, profile_for(state))
    }

    /// Predictions for every known region, in reporting order
    pub fn predict_states(&self) -> Vec<PredictionResult> {
        STATE_PROFILES
            .iter()
            .map(|(state, profile)| self.predict(state, *profile))
            .collect()
    }
}

impl std::fmt::Debug for RiskClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskClassifier")
            .field("model", &self.model.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassProbabilities, HazardClass, FEATURE_COUNT};
    use crate::profiles::DEFAULT_PROFILE;
    use std::sync::Mutex;

    /// Records the features it was asked about
    struct FixedModel {
        probabilities: ClassProbabilities,
        seen: Mutex<Vec<[f64; FEATURE_COUNT]>>,
    }

    impl RiskModel for FixedModel {
        fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> ClassProbabilities {
            self.seen.lock().unwrap().push(*features);
            self.probabilities
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn fixed(probabilities: [f64; 4]) -> Arc<FixedModel> {
        Arc::new(FixedModel {
            probabilities: ClassProbabilities(probabilities),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn maps_model_output_to_result() {
        let model = fixed([0.2, 0.1, 0.6, 0.1]);
        let classifier = RiskClassifier::new(model.clone());

        let result = classifier.predict_state("Assam");
        assert_eq!(result.state, "Assam");
        assert_eq!(result.safety_score, 20);
        assert_eq!(result.confidence, 60);
        assert_eq!(result.predicted_class, HazardClass::Landslide);
        assert_eq!(model.seen.lock().unwrap()[0], [160.0, 3.4, 85.0, 7.8]);
    }

    #[test]
    fn unknown_state_uses_default_profile() {
        let classifier = RiskClassifier::new(fixed([1.0, 0.0, 0.0, 0.0]));
        let result = classifier.predict_state("Goa");
        assert_eq!(result.drivers, DEFAULT_PROFILE);
    }

    #[test]
    fn predicts_every_state_in_order() {
        let classifier = RiskClassifier::new(fixed([0.5, 0.5, 0.0, 0.0]));
        let results = classifier.predict_states();

        assert_eq!(results.len(), STATE_PROFILES.len());
        for (result, (state, profile)) in results.iter().zip(STATE_PROFILES.iter()) {
            assert_eq!(result.state, *state);
            assert_eq!(result.drivers, *profile);
            assert_eq!(result.predicted_class, HazardClass::Safe);
        }
    }
}
