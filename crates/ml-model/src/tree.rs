//! CART decision tree for multi-class classification.
//!
//! ## Algorithm
//! 1. Start with all samples that carry positive weight at the root
//! 2. At each node, visit features in a random order and, for each
//!    non-constant feature, sweep the sorted values to find the threshold
//!    with the largest weighted Gini decrease
//! 3. Stop once `max_features` non-constant features were examined and a
//!    split was found (keep looking past the budget if none was found yet)
//! 4. Recurse until the node is pure, too small or at `max_depth`
//! 5. Leaves store the weighted class distribution
//!
//! Sample weights carry bootstrap multiplicity, so a sample drawn three times
//! counts three times in every impurity computation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Improvements smaller than this are treated as ties
const IMPROVEMENT_EPSILON: f64 = 1e-12;

/// One node of a fitted tree, stored in a flat arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// `row[feature] <= threshold` goes to `left`, otherwise `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class probabilities (sum to 1)
    Leaf { distribution: Vec<f64> },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of non-constant features examined per split
    pub max_features: usize,
}

/// A fitted classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
    /// Total weighted impurity decrease contributed by each feature
    impurity_decrease: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    improvement: f64,
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    params: TreeParams,
    nodes: Vec<Node>,
    impurity_decrease: Vec<f64>,
}

impl DecisionTree {
    /// Fit a tree.
    ///
    /// # Arguments
    /// * `x` - Feature rows, all of equal length
    /// * `y` - Class index per row, each `< n_classes`
    /// * `weights` - Per-row weight; rows with weight 0 are ignored
    /// * `rng` - Drives the per-node feature order
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let mut builder = TreeBuilder {
            x,
            y,
            weights,
            n_classes,
            params,
            nodes: Vec::new(),
            impurity_decrease: vec![0.0; n_features],
        };

        let samples: Vec<usize> = (0..x.len()).filter(|&i| weights[i] > 0.0).collect();
        builder.build(samples, 0, rng);

        Self {
            nodes: builder.nodes,
            n_features,
            n_classes,
            impurity_decrease: builder.impurity_decrease,
        }
    }

    /// Class distribution of the leaf `row` falls into
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    /// Impurity decrease per feature, normalized to sum to 1 (all zeros for a stump)
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.n_features];
        }
        self.impurity_decrease.iter().map(|v| v / total).collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Structural sanity check used when restoring a snapshot.
    ///
    /// Children are always stored after their parent, which also rules out
    /// cycles.
    pub fn is_consistent(&self) -> bool {
        let len = self.nodes.len();
        len > 0
            && self.impurity_decrease.len() == self.n_features
            && self.nodes.iter().enumerate().all(|(idx, node)| match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    *feature < self.n_features
                        && (idx + 1..len).contains(left)
                        && (idx + 1..len).contains(right)
                }
                Node::Leaf { distribution } => distribution.len() == self.n_classes,
            })
    }
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `samples`, returning its node index
    fn build(&mut self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_weights(&samples);
        let total: f64 = counts.iter().sum();
        let impurity = gini(&counts, total);

        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });

        let may_split = samples.len() >= self.params.min_samples_split
            && samples.len() >= 2 * self.params.min_samples_leaf
            && self.params.max_depth.is_none_or(|max| depth < max)
            && impurity > IMPROVEMENT_EPSILON;

        if may_split {
            if let Some(split) = self.best_split(&samples, &counts, total, impurity, rng) {
                let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                    .iter()
                    .partition(|&&s| self.x[s][split.feature] <= split.threshold);

                self.impurity_decrease[split.feature] += split.improvement;

                let left = self.build(left_samples, depth + 1, rng);
                let right = self.build(right_samples, depth + 1, rng);
                self.nodes[node_idx] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                return node_idx;
            }
        }

        let distribution = if total > 0.0 {
            counts.iter().map(|c| c / total).collect()
        } else {
            vec![1.0 / self.n_classes as f64; self.n_classes]
        };
        self.nodes[node_idx] = Node::Leaf { distribution };
        node_idx
    }

    fn class_weights(&self, samples: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &s in samples {
            counts[self.y[s]] += self.weights[s];
        }
        counts
    }

    fn best_split(
        &self,
        samples: &[usize],
        counts: &[f64],
        total: f64,
        impurity: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let n_features = self.impurity_decrease.len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let parent_score = total * impurity;
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;
        let mut order = samples.to_vec();

        for feature in features {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }

            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));
            let lowest = self.x[order[0]][feature];
            let highest = self.x[order[order.len() - 1]][feature];
            if lowest == highest {
                continue; // Constant here, does not count toward max_features
            }
            visited += 1;

            let mut left_counts = vec![0.0; self.n_classes];
            let mut left_weight = 0.0;
            for i in 0..order.len() - 1 {
                let s = order[i];
                left_counts[self.y[s]] += self.weights[s];
                left_weight += self.weights[s];

                let value = self.x[s][feature];
                let next = self.x[order[i + 1]][feature];
                if next <= value {
                    continue;
                }
                let n_left = i + 1;
                if n_left < min_leaf || order.len() - n_left < min_leaf {
                    continue;
                }

                let right_weight = total - left_weight;
                let right_counts: Vec<f64> = counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(all, left)| all - left)
                    .collect();
                let improvement = parent_score
                    - left_weight * gini(&left_counts, left_weight)
                    - right_weight * gini(&right_counts, right_weight);

                if best.is_none_or(|b| improvement > b.improvement + IMPROVEMENT_EPSILON) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: midpoint(value, next),
                        improvement,
                    });
                }
            }
        }

        best
    }
}

/// Gini impurity of weighted class counts
pub fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total) * (c / total)).sum::<f64>()
}

/// Threshold between two adjacent distinct values that keeps `low` on the left
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low / 2.0 + high / 2.0;
    if mid >= high { low } else { mid }
}
