//! Decision tree implementation

use super::linear_models::unique_classes;
use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf {
        value: f64,
        /// Class frequencies in `classes` order (empty for regression)
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity (classification)
    Gini,
    /// Mean squared error (regression)
    MSE,
}

/// CART decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Candidate features sampled at each split (all when `None`)
    pub max_features: Option<usize>,
    /// Seed for candidate feature sampling
    pub random_state: u64,
    criterion: Criterion,
    n_features: usize,
    classes: Vec<f64>,
}

/// Accumulated target statistics for one side of a split
#[derive(Clone)]
struct NodeStats {
    count: usize,
    sum: f64,
    sq_sum: f64,
    class_counts: Vec<usize>,
}

impl NodeStats {
    fn new(n_classes: usize) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sq_sum: 0.0,
            class_counts: vec![0; n_classes],
        }
    }

    fn add(&mut self, y: f64, class_idx: Option<usize>) {
        self.count += 1;
        self.sum += y;
        self.sq_sum += y * y;
        if let Some(c) = class_idx {
            self.class_counts[c] += 1;
        }
    }

    fn minus(&self, other: &NodeStats) -> NodeStats {
        NodeStats {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sq_sum: self.sq_sum - other.sq_sum,
            class_counts: self
                .class_counts
                .iter()
                .zip(&other.class_counts)
                .map(|(a, b)| a - b)
                .collect(),
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        match criterion {
            Criterion::Gini => {
                1.0 - self
                    .class_counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            // Var = E[X²] - E[X]²
            Criterion::MSE => (self.sq_sum / n - (self.sum / n).powi(2)).max(0.0),
        }
    }
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_classifier()
    }
}

impl DecisionTree {
    fn with_criterion(criterion: Criterion) -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: 0,
            criterion,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Create a new classifier tree
    pub fn new_classifier() -> Self {
        Self::with_criterion(Criterion::Gini)
    }

    /// Create a new regressor tree
    pub fn new_regressor() -> Self {
        Self::with_criterion(Criterion::MSE)
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Limit the features considered at each split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn is_classification(&self) -> bool {
        self.criterion == Criterion::Gini
    }

    /// Class labels in probability column order
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let classes = if self.is_classification() {
            unique_classes(y)
        } else {
            Vec::new()
        };
        self.fit_with_classes(x, y, classes)
    }

    /// Fit against a fixed class list, so trees trained on resamples share
    /// the same probability columns
    pub(crate) fn fit_with_classes(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        classes: Vec<f64>,
    ) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::TrainingError("cannot fit on an empty training set".to_string()));
        }

        let class_idx: Vec<Option<usize>> = if self.is_classification() {
            y.iter()
                .map(|&label| {
                    classes
                        .iter()
                        .position(|&c| c == label)
                        .map(Some)
                        .ok_or_else(|| {
                            PipelineError::TrainingError(format!("label {} is not a known class", label))
                        })
                })
                .collect::<Result<_>>()?
        } else {
            vec![None; n_samples]
        };

        self.n_features = x.ncols();
        self.classes = classes;

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &class_idx, &indices, 0, &mut rng));

        Ok(self)
    }

    fn node_stats(&self, y: &Array1<f64>, class_idx: &[Option<usize>], indices: &[usize]) -> NodeStats {
        let mut stats = NodeStats::new(self.classes.len());
        for &i in indices {
            stats.add(y[i], class_idx[i]);
        }
        stats
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        class_idx: &[Option<usize>],
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let stats = self.node_stats(y, class_idx, indices);

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || stats.impurity(self.criterion) <= 1e-12;

        if should_stop {
            return self.make_leaf(&stats);
        }

        let candidates = self.candidate_features(rng);
        match self.find_best_split(x, y, class_idx, indices, &stats, &candidates) {
            Some((feature_idx, threshold)) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);

                let left = Box::new(self.build_tree(x, y, class_idx, &left_indices, depth + 1, rng));
                let right = Box::new(self.build_tree(x, y, class_idx, &right_indices, depth + 1, rng));

                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    n_samples,
                }
            }
            None => self.make_leaf(&stats),
        }
    }

    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.max_features {
            Some(k) if k < self.n_features => {
                let mut features = index::sample(rng, self.n_features, k.max(1)).into_vec();
                features.sort_unstable();
                features
            }
            _ => (0..self.n_features).collect(),
        }
    }

    /// Best (feature, threshold) by impurity decrease
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        class_idx: &[Option<usize>],
        indices: &[usize],
        parent: &NodeStats,
        candidates: &[usize],
    ) -> Option<(usize, f64)> {
        let parent_impurity = parent.impurity(self.criterion);
        let n = indices.len() as f64;

        // Each feature finds its own best split; ordered collect keeps ties deterministic
        let feature_results: Vec<Option<(usize, f64, f64)>> = candidates
            .par_iter()
            .map(|&feature_idx| {
                let mut sorted: Vec<usize> = indices.to_vec();
                sorted.sort_by(|&a, &b| x[[a, feature_idx]].total_cmp(&x[[b, feature_idx]]));

                let mut left = NodeStats::new(self.classes.len());
                let mut best: Option<(f64, f64)> = None;

                for pos in 0..sorted.len().saturating_sub(1) {
                    let i = sorted[pos];
                    left.add(y[i], class_idx[i]);

                    let value = x[[i, feature_idx]];
                    let next_value = x[[sorted[pos + 1], feature_idx]];
                    if value == next_value {
                        continue;
                    }
                    if left.count < self.min_samples_leaf || sorted.len() - left.count < self.min_samples_leaf {
                        continue;
                    }

                    let right = parent.minus(&left);
                    let weighted = (left.count as f64 * left.impurity(self.criterion)
                        + right.count as f64 * right.impurity(self.criterion))
                        / n;
                    let gain = parent_impurity - weighted;

                    if gain > best.map_or(1e-12, |(g, _)| g) {
                        best = Some((gain, (value + next_value) / 2.0));
                    }
                }

                best.map(|(gain, threshold)| (feature_idx, threshold, gain))
            })
            .collect();

        feature_results
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<(usize, f64, f64)>, cand| match acc {
                Some(best) if best.2 >= cand.2 => Some(best),
                _ => Some(cand),
            })
            .map(|(feature_idx, threshold, _)| (feature_idx, threshold))
    }

    fn make_leaf(&self, stats: &NodeStats) -> TreeNode {
        if self.is_classification() {
            let n = stats.count.max(1) as f64;
            let distribution: Vec<f64> = stats.class_counts.iter().map(|&c| c as f64 / n).collect();
            // Most common class; ties go to the smaller label
            let mut best = 0;
            for (j, &c) in stats.class_counts.iter().enumerate() {
                if c > stats.class_counts[best] {
                    best = j;
                }
            }
            TreeNode::Leaf {
                value: self.classes.get(best).copied().unwrap_or(0.0),
                distribution,
                n_samples: stats.count,
            }
        } else {
            TreeNode::Leaf {
                value: if stats.count > 0 { stats.sum / stats.count as f64 } else { 0.0 },
                distribution: Vec::new(),
                n_samples: stats.count,
            }
        }
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<&TreeNode> {
        let root = self.root.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(root)
    }

    fn find_leaf<'a>(node: &'a TreeNode, sample: ndarray::ArrayView1<'_, f64>) -> &'a TreeNode {
        let mut node = node;
        loop {
            match node {
                TreeNode::Leaf { .. } => return node,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if sample[*feature_idx] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.check_input(x)?;

        Ok(x.rows()
            .into_iter()
            .map(|row| match Self::find_leaf(root, row) {
                TreeNode::Leaf { value, .. } => *value,
                TreeNode::Split { .. } => 0.0,
            })
            .collect())
    }

    /// Class frequencies of the reached leaf, one column per class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.check_input(x)?;
        if !self.is_classification() {
            return Err(PipelineError::TrainingError(
                "predict_proba is only available for classification".to_string(),
            ));
        }

        let mut proba = Array2::zeros((x.nrows(), self.classes.len()));
        for (i, row) in x.rows().into_iter().enumerate() {
            if let TreeNode::Leaf { distribution, .. } = Self::find_leaf(root, row) {
                for (j, &p) in distribution.iter().enumerate() {
                    proba[[i, j]] = p;
                }
            }
        }
        Ok(proba)
    }

    /// Number of splits on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }

    /// Get number of leaves
    pub fn n_leaves(&self) -> usize {
        fn count_leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => count_leaves(left) + count_leaves(right),
            }
        }
        self.root.as_ref().map_or(0, count_leaves)
    }
}
