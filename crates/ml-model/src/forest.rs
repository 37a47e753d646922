//! Bagged ensemble of decision trees.
//!
//! Every tree gets its own seed drawn from a master RNG before training
//! starts, so the fitted forest depends only on the data and the config
//! seed, never on how rayon schedules the trees.

use crate::error::{ModelError, Result};
use crate::tree::{DecisionTree, TreeParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Number of features examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    All,
    Count(usize),
}

impl MaxFeatures {
    /// Resolve against the actual feature count (always at least 1)
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features.max(1);
        let k = match self {
            Self::Sqrt => (n as f64).sqrt().floor() as usize,
            Self::Log2 => (n as f64).log2().floor() as usize,
            Self::All => n,
            Self::Count(k) => k.min(n),
        };
        k.max(1)
    }
}

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidConfig("n_trees must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidConfig(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidConfig(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(ModelError::InvalidConfig("max_features must be at least 1".into()));
        }
        Ok(())
    }
}

/// A fitted random forest over class indices `0..n_classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on a dense matrix.
    ///
    /// `y[i]` must be a class index below `n_classes`.
    #[instrument(skip(x, y, config), fields(rows = x.len(), trees = config.n_trees))]
    pub fn fit(x: &[Vec<f64>], y: &[usize], n_classes: usize, config: &ForestConfig) -> Result<Self> {
        config.validate()?;
        if x.is_empty() || x.len() != y.len() {
            return Err(ModelError::InvalidConfig(format!(
                "expected matching non-empty rows and labels, got {} rows and {} labels",
                x.len(),
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(ModelError::InvalidConfig(format!(
                "label index {bad} out of range for {n_classes} classes"
            )));
        }

        let n_features = x[0].len();
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features.resolve(n_features),
        };

        let mut master = StdRng::seed_from_u64(config.seed);
        let seeds: Vec<u64> = (0..config.n_trees).map(|_| master.random()).collect();

        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let weights = if config.bootstrap {
                    bootstrap_weights(x.len(), &mut rng)
                } else {
                    vec![1.0; x.len()]
                };
                DecisionTree::fit(x, y, &weights, n_classes, params, &mut rng)
            })
            .collect();

        debug!(
            "Fitted {} trees (max_features={}, mean nodes={:.1})",
            trees.len(),
            params.max_features,
            trees.iter().map(|t| t.node_count()).sum::<usize>() as f64 / trees.len() as f64
        );

        Ok(Self {
            n_features,
            n_classes,
            trees,
        })
    }

    /// Mean class distribution over all trees
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Most probable class index
    pub fn predict(&self, row: &[f64]) -> usize {
        argmax(&self.predict_proba(row))
    }

    /// Mean of per-tree normalized importances, renormalized to sum to 1
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, v) in totals.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Check every tree agrees with the forest's dimensions
    pub fn is_consistent(&self) -> bool {
        !self.trees.is_empty()
            && self.trees.iter().all(|t| {
                t.is_consistent() && t.n_features() == self.n_features && t.n_classes() == self.n_classes
            })
    }
}

/// Index of the largest value; the first one wins ties
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Draw `n` samples with replacement, returned as per-row multiplicity
fn bootstrap_weights(n: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    for _ in 0..n {
        weights[rng.random_range(0..n)] += 1.0;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.1;
            x.push(vec![1.0 + jitter, 2.0]);
            y.push(0);
            x.push(vec![5.0 + jitter, 2.0]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(4), 2);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::Log2.resolve(8), 3);
        assert_eq!(MaxFeatures::All.resolve(5), 5);
        assert_eq!(MaxFeatures::Count(10).resolve(3), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(0), 1);
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_fit_separates_blobs() {
        let (x, y) = two_blobs();
        let config = ForestConfig::default().with_trees(15);
        let forest = RandomForest::fit(&x, &y, 2, &config).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.predict(&[1.2, 2.0]), 0);
        assert_eq!(forest.predict(&[5.3, 2.0]), 1);
        assert!(forest.is_consistent());

        let importances = forest.feature_importances();
        assert!((importances[0] - 1.0).abs() < 1e-9);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = two_blobs();
        let forest = RandomForest::fit(&x, &y, 3, &ForestConfig::default().with_trees(10)).unwrap();
        let proba = forest.predict_proba(&[3.0, 2.0]);
        assert_eq!(proba.len(), 3);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(proba[2], 0.0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = two_blobs();
        let config = ForestConfig::default().with_trees(8).with_seed(9);
        let a = RandomForest::fit(&x, &y, 2, &config).unwrap();
        let b = RandomForest::fit(&x, &y, 2, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (x, y) = two_blobs();
        let err = RandomForest::fit(&x, &y, 2, &ForestConfig::default().with_trees(0)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig(_)));

        let err = RandomForest::fit(&x, &y, 1, &ForestConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig(_)));
    }

    #[test]
    fn test_bootstrap_weights_total() {
        let mut rng = StdRng::seed_from_u64(1);
        let weights = bootstrap_weights(50, &mut rng);
        assert_eq!(weights.iter().sum::<f64>(), 50.0);
    }
}
