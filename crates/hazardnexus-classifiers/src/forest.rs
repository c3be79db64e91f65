//! Random forest of CART trees
//!
//! Each tree is grown on a bootstrap sample, choosing the best Gini split
//! among a random subset of features at every node. Forest probabilities are
//! the mean of the per-tree leaf class distributions.

use crate::classifier::{ClassProbabilities, RiskModel, CLASS_COUNT, FEATURE_COUNT};
use crate::training::TrainingSample;
use hazardnexus_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Forest hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    #[serde(default = "default_trees")]
    pub trees: usize,

    /// Unlimited when absent
    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Candidate features per split; defaults to sqrt(feature count)
    #[serde(default)]
    pub max_features: Option<usize>,

    #[serde(default)]
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: default_trees(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            max_features: None,
            seed: 0,
        }
    }
}

fn default_trees() -> usize {
    100
}

fn default_min_samples_split() -> usize {
    2
}

enum Node {
    Leaf {
        distribution: [f64; CLASS_COUNT],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeParams {
    max_depth: usize,
    min_samples_split: usize,
    max_features: usize,
}

/// One classification tree
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    fn fit(
        samples: &[TrainingSample],
        indices: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            root: grow(samples, indices, 0, params, rng),
        }
    }

    /// Leaf class distribution for a feature vector
    pub fn predict_distribution(&self, features: &[f64; FEATURE_COUNT]) -> [f64; CLASS_COUNT] {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { distribution } => return *distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }
}

fn class_counts(samples: &[TrainingSample], indices: &[usize]) -> [usize; CLASS_COUNT] {
    let mut counts = [0usize; CLASS_COUNT];
    for &i in indices {
        counts[samples[i].label.index()] += 1;
    }
    counts
}

fn gini(counts: &[usize; CLASS_COUNT], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn leaf(counts: &[usize; CLASS_COUNT], total: usize) -> Node {
    let mut distribution = [0.0; CLASS_COUNT];
    if total > 0 {
        for (slot, &count) in distribution.iter_mut().zip(counts.iter()) {
            *slot = count as f64 / total as f64;
        }
    }
    Node::Leaf { distribution }
}

fn grow(
    samples: &[TrainingSample],
    indices: Vec<usize>,
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> Node {
    let counts = class_counts(samples, &indices);
    let total = indices.len();
    let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

    if pure || depth >= params.max_depth || total < params.min_samples_split {
        return leaf(&counts, total);
    }

    let mut features: [usize; FEATURE_COUNT] = [0, 1, 2, 3];
    features.shuffle(rng);

    // Like CART, keep searching past the sampled subset when it has no
    // usable split (all candidate features constant in this node).
    let mut best = best_split(samples, &indices, &features[..params.max_features], &counts);
    if best.is_none() {
        best = best_split(samples, &indices, &features[params.max_features..], &counts);
    }

    let Some(split) = best else {
        return leaf(&counts, total);
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| samples[i].features[split.feature] <= split.threshold);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(samples, left, depth + 1, params, rng)),
        right: Box::new(grow(samples, right, depth + 1, params, rng)),
    }
}

fn best_split(
    samples: &[TrainingSample],
    indices: &[usize],
    features: &[usize],
    parent_counts: &[usize; CLASS_COUNT],
) -> Option<SplitCandidate> {
    let total = indices.len();
    let mut best: Option<SplitCandidate> = None;

    for &feature in features {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            samples[a].features[feature]
                .partial_cmp(&samples[b].features[feature])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_counts = [0usize; CLASS_COUNT];
        for pos in 0..total - 1 {
            let current = samples[sorted[pos]];
            left_counts[current.label.index()] += 1;

            let value = current.features[feature];
            let next_value = samples[sorted[pos + 1]].features[feature];
            if next_value <= value {
                continue;
            }

            let left_total = pos + 1;
            let right_total = total - left_total;
            let mut right_counts = [0usize; CLASS_COUNT];
            for class in 0..CLASS_COUNT {
                right_counts[class] = parent_counts[class] - left_counts[class];
            }

            let impurity = (left_total as f64 * gini(&left_counts, left_total)
                + right_total as f64 * gini(&right_counts, right_total))
                / total as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value + next_value) / 2.0,
                    impurity,
                });
            }
        }
    }

    best
}

/// Bagged ensemble of [`DecisionTree`]s
pub struct RandomForest {
    name: String,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Train a forest; the same samples and seed always produce the same forest
    pub fn fit(samples: &[TrainingSample], config: &ForestConfig) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::config("cannot train a forest on zero samples"));
        }
        if config.trees == 0 {
            return Err(Error::config("forest needs at least one tree"));
        }

        let max_features = config
            .max_features
            .unwrap_or_else(|| (FEATURE_COUNT as f64).sqrt().round() as usize)
            .clamp(1, FEATURE_COUNT);

        let params = TreeParams {
            max_depth: config.max_depth.unwrap_or(usize::MAX),
            min_samples_split: config.min_samples_split.max(2),
            max_features,
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let n = samples.len();
        let trees: Vec<DecisionTree> = (0..config.trees)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(samples, bootstrap, &params, &mut rng)
            })
            .collect();

        debug!(
            "Trained random forest: {} trees on {} samples, max depth {}",
            trees.len(),
            n,
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );

        Ok(Self {
            name: "random-forest".to_string(),
            trees,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl RiskModel for RandomForest {
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> ClassProbabilities {
        let mut sum = [0.0; CLASS_COUNT];
        for tree in &self.trees {
            let distribution = tree.predict_distribution(features);
            for (acc, p) in sum.iter_mut().zip(distribution.iter()) {
                *acc += p;
            }
        }

        let count = self.trees.len().max(1) as f64;
        for p in sum.iter_mut() {
            *p /= count;
        }
        ClassProbabilities(sum)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
