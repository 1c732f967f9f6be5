//! Bagged Gini trees

use super::tree::{DecisionTree, FeatureColumns, GrowParams, NodeStats, SplitCriterion, TreeGrower};
use super::{check_training_input, ScamModel};
use crate::vectorizer::SparseVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestConfig {
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Candidate features per node; `None` means `sqrt(n_features)`
    #[serde(default)]
    pub max_features: Option<usize>,

    /// Seed for bootstrap draws and feature sampling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_n_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    15
}

fn default_min_samples_split() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            max_features: None,
            seed: default_seed(),
        }
    }
}

/// Weighted Gini impurity; node weight is the bootstrap multiplicity
struct Gini;

impl Gini {
    fn impurity(stats: &NodeStats) -> f64 {
        if stats.weight <= 0.0 {
            return 0.0;
        }
        2.0 * stats.target * (stats.weight - stats.target) / stats.weight
    }
}

impl SplitCriterion for Gini {
    fn leaf_value(&self, stats: &NodeStats) -> f64 {
        if stats.weight <= 0.0 {
            0.0
        } else {
            (stats.target / stats.weight).clamp(0.0, 1.0)
        }
    }

    fn gain(&self, parent: &NodeStats, left: &NodeStats, right: &NodeStats) -> f64 {
        Self::impurity(parent) - Self::impurity(left) - Self::impurity(right)
    }

    fn admissible(&self, left: &NodeStats, right: &NodeStats) -> bool {
        left.count > 0 && right.count > 0
    }

    fn min_gain(&self) -> f64 {
        1e-12
    }

    fn is_pure(&self, stats: &NodeStats) -> bool {
        stats.target <= 1e-12 || stats.target >= stats.weight - 1e-12
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: RandomForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: RandomForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl ScamModel for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, rows: &[SparseVector], labels: &[bool], n_features: usize) -> Result<()> {
        check_training_input(rows, labels)?;
        if self.config.n_trees == 0 {
            return Err(Error::config("random_forest needs at least one tree"));
        }

        let n = rows.len();
        let columns = FeatureColumns::from_rows(rows, n_features);
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features.max(1));

        let mut seeder = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_trees);

        for _ in 0..self.config.n_trees {
            let mut rng = StdRng::seed_from_u64(seeder.gen());

            let mut multiplicity = vec![0usize; n];
            for _ in 0..n {
                multiplicity[rng.gen_range(0..n)] += 1;
            }

            let stats: Vec<NodeStats> = multiplicity
                .iter()
                .zip(labels)
                .map(|(&m, &label)| {
                    let weight = m as f64;
                    NodeStats::new(weight, if label { weight } else { 0.0 })
                })
                .collect();
            let in_bag: Vec<usize> = (0..n).filter(|&i| multiplicity[i] > 0).collect();

            let params = GrowParams {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                max_features: Some(max_features),
            };
            let tree =
                TreeGrower::new(rows, &columns, &stats, &Gini, params, Some(rng)).grow(in_bag);
            trees.push(tree);
        }

        debug!(
            trees = trees.len(),
            max_features,
            "Fitted random forest"
        );
        self.trees = trees;
        Ok(())
    }

    fn predict_probability(&self, row: &SparseVector) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        (sum / self.trees.len() as f64).clamp(0.0, 1.0)
    }

    fn validate(&self, n_features: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::model("random_forest has no trees"));
        }
        for tree in &self.trees {
            tree.validate(n_features)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    fn small_config() -> RandomForestConfig {
        RandomForestConfig {
            n_trees: 25,
            min_samples_split: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_separates_classes() {
        let (rows, labels) = fixtures::separable();
        let mut model = RandomForest::new(small_config());
        model.fit(&rows, &labels, 3).unwrap();

        assert_eq!(model.trees().len(), 25);
        assert!(model.predict_probability(&fixtures::scam_row()) > 0.5);
        assert!(model.predict_probability(&fixtures::legit_row()) < 0.5);
        assert!(model.validate(3).is_ok());
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (rows, labels) = fixtures::separable();
        let mut a = RandomForest::new(small_config());
        let mut b = RandomForest::new(small_config());
        a.fit(&rows, &labels, 3).unwrap();
        b.fit(&rows, &labels, 3).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (rows, labels) = fixtures::separable();
        let mut model = RandomForest::new(small_config());
        model.fit(&rows, &labels, 3).unwrap();

        for row in &rows {
            let p = model.predict_probability(row);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_gini_impurity() {
        assert_eq!(Gini::impurity(&NodeStats::new(4.0, 2.0)), 2.0);
        assert_eq!(Gini::impurity(&NodeStats::new(4.0, 4.0)), 0.0);
        assert!(Gini.is_pure(&NodeStats::new(3.0, 0.0)));
        assert!(!Gini.is_pure(&NodeStats::new(3.0, 1.0)));
    }
}
