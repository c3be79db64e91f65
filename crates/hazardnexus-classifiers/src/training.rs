//! Synthetic training data
//!
//! Feature vectors are drawn from fixed normal distributions and labelled by
//! a deterministic rule, so the same seed always yields the same data set.

use crate::classifier::{HazardClass, RiskProfile, FEATURE_COUNT};
use hazardnexus_core::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Mean and standard deviation of one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureDistribution {
    pub mean: f64,
    pub std_dev: f64,
}

impl FeatureDistribution {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

/// Distributions for the four features, in [`RiskProfile::features`] order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureDistributions {
    pub rainfall_mm: FeatureDistribution,
    pub seismic_magnitude: FeatureDistribution,
    pub soil_moisture_pct: FeatureDistribution,
    pub river_level_m: FeatureDistribution,
}

impl Default for FeatureDistributions {
    fn default() -> Self {
        Self {
            rainfall_mm: FeatureDistribution::new(100.0, 30.0),
            seismic_magnitude: FeatureDistribution::new(2.0, 1.0),
            soil_moisture_pct: FeatureDistribution::new(50.0, 15.0),
            river_level_m: FeatureDistribution::new(5.0, 2.0),
        }
    }
}

impl FeatureDistributions {
    fn as_array(&self) -> [FeatureDistribution; FEATURE_COUNT] {
        [
            self.rainfall_mm,
            self.seismic_magnitude,
            self.soil_moisture_pct,
            self.river_level_m,
        ]
    }
}

/// One labelled feature vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSample {
    pub features: [f64; FEATURE_COUNT],
    pub label: HazardClass,
}

/// Labelling rule, evaluated in priority order
pub fn label_for(profile: &RiskProfile) -> HazardClass {
    if profile.seismic_magnitude > 5.5 {
        HazardClass::Earthquake
    } else if profile.rainfall_mm > 180.0 || profile.river_level_m > 8.0 {
        HazardClass::Flood
    } else if profile.rainfall_mm > 150.0 && profile.soil_moisture_pct > 70.0 {
        HazardClass::Landslide
    } else {
        HazardClass::Safe
    }
}

/// Seedable generator of labelled samples
pub struct SyntheticDataGenerator {
    rng: StdRng,
    normals: [Normal<f64>; FEATURE_COUNT],
}

impl SyntheticDataGenerator {
    pub fn new(distributions: FeatureDistributions, seed: u64) -> Result<Self> {
        let mut normals = Vec::with_capacity(FEATURE_COUNT);
        for dist in distributions.as_array() {
            let normal = Normal::new(dist.mean, dist.std_dev).map_err(|e| {
                Error::config(format!(
                    "invalid feature distribution (mean {}, std dev {}): {e}",
                    dist.mean, dist.std_dev
                ))
            })?;
            normals.push(normal);
        }

        let normals: [Normal<f64>; FEATURE_COUNT] = normals
            .try_into()
            .map_err(|_| Error::internal("feature distribution count mismatch"))?;

        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            normals,
        })
    }

    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::new(FeatureDistributions::default(), seed)
    }

    /// Draw `count` labelled samples
    pub fn generate(&mut self, count: usize) -> Vec<TrainingSample> {
        (0..count)
            .map(|_| {
                let mut features = [0.0; FEATURE_COUNT];
                for (slot, normal) in features.iter_mut().zip(self.normals.iter()) {
                    *slot = normal.sample(&mut self.rng);
                }
                let label = label_for(&RiskProfile::from_features(features));
                TrainingSample { features, label }
            })
            .collect()
    }
}
