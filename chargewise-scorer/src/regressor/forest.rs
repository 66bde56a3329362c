//! Bagged regression trees.
//!
//! Each tree is grown on a bootstrap sample drawn from a seeded generator,
//! splitting on the threshold that most reduces the squared error of its
//! children. Trees are stored as flat node arenas where every child sits
//! after its parent, so traversal always terminates.

use chargewise_data::seeded_rng;
use ndarray::{ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::TrainingError;

/// Splits must reduce squared error by more than this.
const MIN_GAIN: f64 = 1e-12;

/// Hyper-parameters of a [`RandomForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees.
    pub trees: usize,
    /// Maximum depth of any tree; the root is depth zero.
    pub max_depth: usize,
    /// Smallest node that may still be split.
    pub min_samples_split: usize,
    /// Smallest number of samples on either side of a split.
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 200,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 1,
        }
    }
}

impl ForestParams {
    /// Reject unusable parameter combinations.
    ///
    /// # Errors
    /// [`TrainingError::InvalidForest`] naming the offending parameter.
    pub const fn validate(&self) -> Result<(), TrainingError> {
        if self.trees == 0 {
            return Err(TrainingError::InvalidForest("trees must be at least one"));
        }
        if self.min_samples_split < 2 {
            return Err(TrainingError::InvalidForest(
                "min_samples_split must be at least two",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainingError::InvalidForest(
                "min_samples_leaf must be at least one",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().unwrap_or_default();
                    index = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    fn is_well_formed(&self, width: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().enumerate().all(|(index, node)| match node {
                Node::Leaf { value } => value.is_finite(),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    *feature < width
                        && threshold.is_finite()
                        && *left > index
                        && *right > index
                        && *left < self.nodes.len()
                        && *right < self.nodes.len()
                }
            })
    }
}

/// A fitted forest: the prediction is the mean over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    width: usize,
    trees: Vec<Tree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Grow a forest over `rows`.
    ///
    /// # Errors
    /// Fails on invalid parameters, an empty matrix or a target count that
    /// differs from the row count.
    pub fn fit(
        rows: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
        params: &ForestParams,
        seed: u64,
    ) -> Result<Self, TrainingError> {
        params.validate()?;
        let width = super::check_design(&rows, &targets)?;
        let count = rows.nrows();
        let mut rng = seeded_rng(seed);
        let mut trees = Vec::with_capacity(params.trees);
        let mut importances = vec![0.0; width];
        for _ in 0..params.trees {
            let mut samples: Vec<usize> = (0..count).map(|_| rng.gen_range(0..count)).collect();
            let mut grower = Grower::new(rows.view(), targets.view(), width, params);
            grower.grow(&mut samples, 0);
            accumulate_normalised(&mut importances, &grower.gains);
            trees.push(Tree {
                nodes: grower.nodes,
            });
        }
        normalise(&mut importances);
        Ok(Self {
            width,
            trees,
            importances,
        })
    }

    /// Input width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of trees.
    #[must_use]
    pub const fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Mean impurity decrease per column, summing to one unless no tree
    /// ever split.
    #[must_use]
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Predict one row. Callers check the width.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "mean over a bounded number of trees"
    )]
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        total / self.trees.len() as f64
    }

    /// Whether every tree only references valid nodes and columns.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.trees.is_empty()
            && self.importances.len() == self.width
            && self.trees.iter().all(|tree| tree.is_well_formed(self.width))
    }
}

#[expect(clippy::float_arithmetic, reason = "per-tree normalisation")]
fn accumulate_normalised(acc: &mut [f64], gains: &[f64]) {
    let total: f64 = gains.iter().sum();
    if total <= 0.0 {
        return;
    }
    for (slot, gain) in acc.iter_mut().zip(gains) {
        *slot += gain / total;
    }
}

#[expect(clippy::float_arithmetic, reason = "rescale to unit sum")]
fn normalise(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return;
    }
    for value in values {
        *value /= total;
    }
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    left_count: usize,
    gain: f64,
}

/// Mutable state while growing one tree.
struct Grower<'a> {
    rows: ArrayView2<'a, f64>,
    targets: ArrayView1<'a, f64>,
    width: usize,
    params: &'a ForestParams,
    nodes: Vec<Node>,
    gains: Vec<f64>,
}

impl<'a> Grower<'a> {
    fn new(
        rows: ArrayView2<'a, f64>,
        targets: ArrayView1<'a, f64>,
        width: usize,
        params: &'a ForestParams,
    ) -> Self {
        Self {
            rows,
            targets,
            width,
            params,
            nodes: Vec::new(),
            gains: vec![0.0; width],
        }
    }

    fn value(&self, sample: usize, feature: usize) -> f64 {
        self.rows.get((sample, feature)).copied().unwrap_or_default()
    }

    fn target(&self, sample: usize) -> f64 {
        self.targets.get(sample).copied().unwrap_or_default()
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "leaf value is the sample mean"
    )]
    fn mean(&self, samples: &[usize]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let total: f64 = samples.iter().map(|s| self.target(*s)).sum();
        total / samples.len() as f64
    }

    /// Grow the subtree for `samples` and return its root index.
    fn grow(&mut self, samples: &mut [usize], depth: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: self.mean(samples),
        });
        if depth >= self.params.max_depth || samples.len() < self.params.min_samples_split {
            return index;
        }
        let Some(split) = self.best_split(samples) else {
            return index;
        };
        samples.sort_by(|a, b| {
            self.value(*a, split.feature)
                .total_cmp(&self.value(*b, split.feature))
        });
        let (left_samples, right_samples) = samples.split_at_mut(split.left_count);
        if let Some(gain) = self.gains.get_mut(split.feature) {
            *gain += split.gain;
        }
        let left = self.grow(left_samples, depth + 1);
        let right = self.grow(right_samples, depth + 1);
        if let Some(node) = self.nodes.get_mut(index) {
            *node = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
        }
        index
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "squared-error bookkeeping over prefix sums"
    )]
    fn best_split(&self, samples: &[usize]) -> Option<Split> {
        let count = samples.len();
        let (sum, sum_sq) = samples.iter().fold((0.0, 0.0), |(s, sq), sample| {
            let y = self.target(*sample);
            (s + y, sq + y * y)
        });
        let sse = |s: f64, sq: f64, n: usize| sq - s * s / n as f64;
        let parent = sse(sum, sum_sq, count);
        let min_leaf = self.params.min_samples_leaf;

        let mut order = samples.to_vec();
        let mut best: Option<Split> = None;
        for feature in 0..self.width {
            order.sort_by(|a, b| self.value(*a, feature).total_cmp(&self.value(*b, feature)));
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for (position, pair) in order.windows(2).enumerate() {
                let [current, next] = pair else {
                    continue;
                };
                let y = self.target(*current);
                left_sum += y;
                left_sq += y * y;
                let left_count = position + 1;
                let right_count = count - left_count;
                if left_count < min_leaf || right_count < min_leaf {
                    continue;
                }
                let low = self.value(*current, feature);
                let high = self.value(*next, feature);
                if high <= low {
                    continue;
                }
                let gain = parent
                    - sse(left_sum, left_sq, left_count)
                    - sse(sum - left_sum, sum_sq - left_sq, right_count);
                if best.is_none_or(|b| gain > b.gain) {
                    let midpoint = low + (high - low) / 2.0;
                    let threshold = if midpoint >= high { low } else { midpoint };
                    best = Some(Split {
                        feature,
                        threshold,
                        left_count,
                        gain,
                    });
                }
            }
        }
        best.filter(|split| split.gain > MIN_GAIN)
    }
}
