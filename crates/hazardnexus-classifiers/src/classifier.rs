//! Risk model trait and common types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of input features in a [`RiskProfile`]
pub const FEATURE_COUNT: usize = 4;

/// Number of hazard classes
pub const CLASS_COUNT: usize = 4;

/// Trait for all risk models
///
/// Inference is the only contract; how a model was trained is not visible to
/// callers, so a model trained elsewhere can replace the built-in forest.
pub trait RiskModel: Send + Sync {
    /// Class probabilities in [`HazardClass::ALL`] order
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> ClassProbabilities;

    /// Get the model name
    fn name(&self) -> &str;
}

/// Predicted hazard class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardClass {
    Safe,
    Flood,
    Landslide,
    Earthquake,
}

impl HazardClass {
    pub const ALL: [HazardClass; CLASS_COUNT] = [
        HazardClass::Safe,
        HazardClass::Flood,
        HazardClass::Landslide,
        HazardClass::Earthquake,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::Safe => 0,
            Self::Flood => 1,
            Self::Landslide => 2,
            Self::Earthquake => 3,
        }
    }
}

impl fmt::Display for HazardClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Safe => "Safe",
            Self::Flood => "Flood",
            Self::Landslide => "Landslide",
            Self::Earthquake => "Earthquake",
        };
        f.write_str(s)
    }
}

/// Classifier input for one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub rainfall_mm: f64,
    pub seismic_magnitude: f64,
    pub soil_moisture_pct: f64,
    pub river_level_m: f64,
}

impl RiskProfile {
    pub const fn new(
        rainfall_mm: f64,
        seismic_magnitude: f64,
        soil_moisture_pct: f64,
        river_level_m: f64,
    ) -> Self {
        Self {
            rainfall_mm,
            seismic_magnitude,
            soil_moisture_pct,
            river_level_m,
        }
    }

    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.rainfall_mm,
            self.seismic_magnitude,
            self.soil_moisture_pct,
            self.river_level_m,
        ]
    }

    pub fn from_features(features: [f64; FEATURE_COUNT]) -> Self {
        Self::new(features[0], features[1], features[2], features[3])
    }
}

/// Probability per class, indexed by [`HazardClass::index`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities(pub [f64; CLASS_COUNT]);

impl ClassProbabilities {
    pub fn get(&self, class: HazardClass) -> f64 {
        self.0[class.index()]
    }

    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// Safe when P(Safe) is the maximum (ties go to Safe), otherwise the most
    /// probable non-Safe class.
    pub fn predicted_class(&self) -> HazardClass {
        let safe = self.get(HazardClass::Safe);
        let mut best = HazardClass::Safe;
        let mut best_p = safe;

        for class in &HazardClass::ALL[1..] {
            let p = self.get(*class);
            if p > best_p {
                best = *class;
                best_p = p;
            }
        }

        best
    }
}

/// Result of a per-state prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub state: String,

    /// round(100 * P(Safe))
    pub safety_score: u8,

    pub predicted_class: HazardClass,

    /// round(100 * max probability)
    pub confidence: u8,

    /// Echo of the input features
    pub drivers: RiskProfile,
}

impl PredictionResult {
    pub fn from_probabilities(
        state: impl Into<String>,
        profile: RiskProfile,
        probabilities: &ClassProbabilities,
    ) -> Self {
        Self {
            state: state.into(),
            safety_score: to_percent(probabilities.get(HazardClass::Safe)),
            predicted_class: probabilities.predicted_class(),
            confidence: to_percent(probabilities.max()),
            drivers: profile,
        }
    }
}

fn to_percent(p: f64) -> u8 {
    (p * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_wins_when_it_is_the_maximum() {
        let probs = ClassProbabilities([0.55, 0.25, 0.1, 0.1]);
        assert_eq!(probs.predicted_class(), HazardClass::Safe);
    }

    #[test]
    fn safe_wins_ties() {
        let probs = ClassProbabilities([0.4, 0.4, 0.2, 0.0]);
        assert_eq!(probs.predicted_class(), HazardClass::Safe);
    }

    #[test]
    fn most_probable_hazard_otherwise() {
        let probs = ClassProbabilities([0.3, 0.2, 0.45, 0.05]);
        assert_eq!(probs.predicted_class(), HazardClass::Landslide);

        let probs = ClassProbabilities([0.1, 0.0, 0.0, 0.9]);
        assert_eq!(probs.predicted_class(), HazardClass::Earthquake);
    }

    #[test]
    fn prediction_rounds_scores() {
        let profile = RiskProfile::new(1.0, 2.0, 3.0, 4.0);
        let probs = ClassProbabilities([0.31, 0.42, 0.2, 0.07]);
        let result = PredictionResult::from_probabilities("Kerala", profile, &probs);

        assert_eq!(result.safety_score, 31);
        assert_eq!(result.confidence, 42);
        assert_eq!(result.predicted_class, HazardClass::Flood);
        assert_eq!(result.drivers, profile);
    }

    #[test]
    fn prediction_serializes_camel_case() {
        let profile = RiskProfile::new(160.0, 3.4, 85.0, 7.8);
        let probs = ClassProbabilities([1.0, 0.0, 0.0, 0.0]);
        let json =
            serde_json::to_value(PredictionResult::from_probabilities("Assam", profile, &probs))
                .unwrap();

        assert_eq!(json["safetyScore"], 100);
        assert_eq!(json["predictedClass"], "Safe");
        assert_eq!(json["drivers"]["riverLevelM"], 7.8);
    }
}
