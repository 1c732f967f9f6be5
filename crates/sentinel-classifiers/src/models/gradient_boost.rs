//! Gradient-boosted trees with logistic loss and Newton leaf values

use super::tree::{DecisionTree, FeatureColumns, GrowParams, NodeStats, SplitCriterion, TreeGrower};
use super::{check_training_input, sigmoid, ScamModel};
use crate::vectorizer::SparseVector;
use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostConfig {
    #[serde(default = "default_n_rounds")]
    pub n_rounds: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// L2 penalty on leaf values
    #[serde(default = "default_lambda")]
    pub lambda: f64,

    /// Minimum hessian sum on each side of a split
    #[serde(default = "default_min_child_weight")]
    pub min_child_weight: f64,

    #[serde(default = "default_min_split_gain")]
    pub min_split_gain: f64,
}

fn default_n_rounds() -> usize {
    100
}

fn default_max_depth() -> usize {
    6
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_lambda() -> f64 {
    1.0
}

fn default_min_child_weight() -> f64 {
    1e-3
}

fn default_min_split_gain() -> f64 {
    1e-6
}

impl Default for GradientBoostConfig {
    fn default() -> Self {
        Self {
            n_rounds: default_n_rounds(),
            max_depth: default_max_depth(),
            learning_rate: default_learning_rate(),
            lambda: default_lambda(),
            min_child_weight: default_min_child_weight(),
            min_split_gain: default_min_split_gain(),
        }
    }
}

impl GradientBoostConfig {
    fn validate(&self) -> Result<()> {
        if self.n_rounds == 0 {
            return Err(Error::config("gradient_boosting needs at least one round"));
        }
        if !(self.learning_rate > 0.0) || !(self.lambda >= 0.0) || !(self.min_child_weight >= 0.0)
        {
            return Err(Error::config(
                "gradient_boosting learning_rate must be positive; lambda and min_child_weight non-negative",
            ));
        }
        Ok(())
    }
}

/// Second-order split score: node weight is the hessian sum, target the
/// gradient sum
struct NewtonCriterion<'a> {
    config: &'a GradientBoostConfig,
}

impl NewtonCriterion<'_> {
    fn score(&self, stats: &NodeStats) -> f64 {
        stats.target * stats.target / (stats.weight + self.config.lambda)
    }
}

impl SplitCriterion for NewtonCriterion<'_> {
    fn leaf_value(&self, stats: &NodeStats) -> f64 {
        let denominator = stats.weight + self.config.lambda;
        if denominator <= 0.0 {
            return 0.0;
        }
        -self.config.learning_rate * stats.target / denominator
    }

    fn gain(&self, parent: &NodeStats, left: &NodeStats, right: &NodeStats) -> f64 {
        self.score(left) + self.score(right) - self.score(parent)
    }

    fn admissible(&self, left: &NodeStats, right: &NodeStats) -> bool {
        left.count > 0
            && right.count > 0
            && left.weight >= self.config.min_child_weight
            && right.weight >= self.config.min_child_weight
    }

    fn min_gain(&self) -> f64 {
        self.config.min_split_gain
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoost {
    config: GradientBoostConfig,
    /// Training log-odds; the margin every prediction starts from
    base_margin: f64,
    trees: Vec<DecisionTree>,
}

impl GradientBoost {
    pub fn new(config: GradientBoostConfig) -> Self {
        Self {
            config,
            base_margin: 0.0,
            trees: Vec::new(),
        }
    }

    pub fn base_margin(&self) -> f64 {
        self.base_margin
    }

    fn margin(&self, row: &SparseVector) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }
}

impl ScamModel for GradientBoost {
    fn name(&self) -> &str {
        "gradient_boosting"
    }

    fn fit(&mut self, rows: &[SparseVector], labels: &[bool], n_features: usize) -> Result<()> {
        check_training_input(rows, labels)?;
        self.config.validate()?;

        let n = rows.len();
        let positives = labels.iter().filter(|l| **l).count() as f64;
        let rate = (positives / n as f64).clamp(1e-6, 1.0 - 1e-6);
        let base_margin = (rate / (1.0 - rate)).ln();

        let columns = FeatureColumns::from_rows(rows, n_features);
        let criterion = NewtonCriterion {
            config: &self.config,
        };
        let targets: Vec<f64> = labels.iter().map(|l| if *l { 1.0 } else { 0.0 }).collect();
        let mut margins = vec![base_margin; n];
        let mut trees = Vec::with_capacity(self.config.n_rounds);

        for _ in 0..self.config.n_rounds {
            let stats: Vec<NodeStats> = margins
                .iter()
                .zip(&targets)
                .map(|(margin, y)| {
                    let p = sigmoid(*margin);
                    NodeStats::new((p * (1.0 - p)).max(1e-16), p - y)
                })
                .collect();

            let params = GrowParams {
                max_depth: self.config.max_depth,
                min_samples_split: 2,
                max_features: None,
            };
            let tree =
                TreeGrower::new(rows, &columns, &stats, &criterion, params, None).grow((0..n).collect());

            for (margin, row) in margins.iter_mut().zip(rows) {
                *margin += tree.predict(row);
            }
            trees.push(tree);
        }

        debug!(rounds = trees.len(), base_margin, "Fitted gradient boosting");
        self.base_margin = base_margin;
        self.trees = trees;
        Ok(())
    }

    fn predict_probability(&self, row: &SparseVector) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        sigmoid(self.margin(row)).clamp(0.0, 1.0)
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::model("gradient_boosting has no trees"));
        }
        if !self.base_margin.is_finite() {
            return Err(Error::model("gradient_boosting has non-finite base margin"));
        }
        for tree in &self.trees {
            tree.validate(n_features)?;
        }
        Ok(())
    }
}
