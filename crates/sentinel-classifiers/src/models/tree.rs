//! Regression/classification trees over sparse TF-IDF rows
//!
//! Random forest and gradient boosting share one greedy grower; they differ
//! only in the [`SplitCriterion`] and in how candidate features are drawn.
//! A row goes left when `value <= threshold`, absent entries count as 0.

use crate::vectorizer::SparseVector;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sentinel_core::{Error, Result};

/// Node of a flattened tree; children always follow their parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
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

/// A fitted tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn predict(&self, row: &SparseVector) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }

    /// Reject trees whose traversal could panic or loop
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::model("Tree has no nodes"));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(Error::model(format!("Leaf {} has non-finite value", idx)));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::model(format!(
                            "Split {} uses feature {} of {}",
                            idx, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::model(format!(
                            "Split {} has non-finite threshold",
                            idx
                        )));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(Error::model(format!(
                                "Split {} points to invalid child {}",
                                idx, child
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Column-major copy of the training rows
#[derive(Debug, Clone)]
pub struct FeatureColumns {
    columns: Vec<Vec<(usize, f64)>>,
}

impl FeatureColumns {
    pub fn from_rows(rows: &[SparseVector], n_features: usize) -> Self {
        let mut columns = vec![Vec::new(); n_features];
        for (row_idx, row) in rows.iter().enumerate() {
            for (feature, value) in row.iter() {
                if feature < n_features {
                    columns[feature].push((row_idx, value));
                }
            }
        }
        Self { columns }
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    fn column(&self, feature: usize) -> &[(usize, f64)] {
        &self.columns[feature]
    }
}

/// Additive node statistics: sample count, weight, weighted target
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    pub count: usize,
    pub weight: f64,
    pub target: f64,
}

impl NodeStats {
    pub fn new(weight: f64, target: f64) -> Self {
        Self {
            count: 1,
            weight,
            target,
        }
    }

    fn add(&mut self, other: &NodeStats) {
        self.count += other.count;
        self.weight += other.weight;
        self.target += other.target;
    }

    fn minus(&self, other: &NodeStats) -> NodeStats {
        NodeStats {
            count: self.count - other.count,
            weight: self.weight - other.weight,
            target: self.target - other.target,
        }
    }
}

/// Scoring rule plugged into the grower
pub trait SplitCriterion {
    fn leaf_value(&self, stats: &NodeStats) -> f64;

    /// Improvement of splitting `parent` into `left` and `right`
    fn gain(&self, parent: &NodeStats, left: &NodeStats, right: &NodeStats) -> f64;

    fn admissible(&self, left: &NodeStats, right: &NodeStats) -> bool;

    /// Smallest gain worth a split
    fn min_gain(&self) -> f64;

    fn is_pure(&self, _stats: &NodeStats) -> bool {
        false
    }
}

/// Growth limits and feature sampling for one tree
pub struct GrowParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// `Some(k)`: draw features at random until `k` non-constant ones were
    /// evaluated; `None`: evaluate every feature
    pub max_features: Option<usize>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

enum FeatureEval {
    Constant,
    Evaluated(Option<SplitCandidate>),
}

/// Greedy depth-first tree builder
pub struct TreeGrower<'a, C: SplitCriterion> {
    rows: &'a [SparseVector],
    columns: &'a FeatureColumns,
    stats: &'a [NodeStats],
    criterion: &'a C,
    params: GrowParams,
    rng: Option<StdRng>,
    in_node: Vec<bool>,
    nodes: Vec<TreeNode>,
}

impl<'a, C: SplitCriterion> TreeGrower<'a, C> {
    /// `stats[i]` describes row `i`; `rng` is required with `max_features`
    pub fn new(
        rows: &'a [SparseVector],
        columns: &'a FeatureColumns,
        stats: &'a [NodeStats],
        criterion: &'a C,
        params: GrowParams,
        rng: Option<StdRng>,
    ) -> Self {
        Self {
            rows,
            columns,
            stats,
            criterion,
            params,
            rng,
            in_node: vec![false; rows.len()],
            nodes: Vec::new(),
        }
    }

    /// Grow a tree over the given row indices
    pub fn grow(mut self, samples: Vec<usize>) -> DecisionTree {
        self.grow_node(samples, 0);
        DecisionTree { nodes: self.nodes }
    }

    fn grow_node(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let mut stats = NodeStats::default();
        for &row in &samples {
            stats.add(&self.stats[row]);
        }

        let idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            value: self.criterion.leaf_value(&stats),
        });

        if depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || self.criterion.is_pure(&stats)
        {
            return idx;
        }

        let Some(split) = self.best_split(&samples, &stats) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&row| self.rows[row].get(split.feature) <= split.threshold);

        let left = self.grow_node(left_rows, depth + 1);
        let right = self.grow_node(right_rows, depth + 1);
        self.nodes[idx] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&mut self, samples: &[usize], parent: &NodeStats) -> Option<SplitCandidate> {
        for &row in samples {
            self.in_node[row] = true;
        }

        let n_features = self.columns.n_features();
        let mut best: Option<SplitCandidate> = None;
        let consider = |eval: FeatureEval, best: &mut Option<SplitCandidate>| -> bool {
            match eval {
                FeatureEval::Constant => false,
                FeatureEval::Evaluated(candidate) => {
                    if let Some(c) = candidate {
                        if best.as_ref().map_or(true, |b| c.gain > b.gain) {
                            *best = Some(c);
                        }
                    }
                    true
                }
            }
        };

        match (self.params.max_features, self.rng.as_mut()) {
            (Some(max_features), Some(rng)) => {
                // Partial Fisher-Yates; constant features do not use up the budget
                let mut order: Vec<usize> = (0..n_features).collect();
                let mut visited = 0;
                for i in 0..n_features {
                    if visited >= max_features {
                        break;
                    }
                    let j = rng.gen_range(i..n_features);
                    order.swap(i, j);
                    let eval = evaluate_feature(
                        self.columns,
                        self.stats,
                        &self.in_node,
                        self.criterion,
                        order[i],
                        samples.len(),
                        parent,
                    );
                    if consider(eval, &mut best) {
                        visited += 1;
                    }
                }
            }
            _ => {
                for feature in 0..n_features {
                    let eval = evaluate_feature(
                        self.columns,
                        self.stats,
                        &self.in_node,
                        self.criterion,
                        feature,
                        samples.len(),
                        parent,
                    );
                    consider(eval, &mut best);
                }
            }
        }

        for &row in samples {
            self.in_node[row] = false;
        }
        best
    }
}

/// Sweep one feature's non-zero entries from the largest value down
fn evaluate_feature<C: SplitCriterion>(
    columns: &FeatureColumns,
    stats: &[NodeStats],
    in_node: &[bool],
    criterion: &C,
    feature: usize,
    node_count: usize,
    parent: &NodeStats,
) -> FeatureEval {
    let mut entries: Vec<(f64, NodeStats)> = columns
        .column(feature)
        .iter()
        .filter(|(row, _)| in_node[*row])
        .map(|(row, value)| (*value, stats[*row]))
        .collect();

    if entries.is_empty() {
        return FeatureEval::Constant;
    }
    let has_zeros = entries.len() < node_count;
    if !has_zeros && entries.iter().all(|(v, _)| *v == entries[0].0) {
        return FeatureEval::Constant;
    }

    entries.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut right = NodeStats::default();
    let mut best: Option<SplitCandidate> = None;
    for j in 0..entries.len() {
        right.add(&entries[j].1);
        let next = match entries.get(j + 1) {
            Some((v, _)) => *v,
            None if has_zeros => 0.0,
            None => break,
        };
        if entries[j].0 <= next {
            continue;
        }

        let left = parent.minus(&right);
        if !criterion.admissible(&left, &right) {
            continue;
        }
        let gain = criterion.gain(parent, &left, &right);
        if gain > criterion.min_gain() && best.as_ref().map_or(true, |b| gain > b.gain) {
            best = Some(SplitCandidate {
                feature,
                threshold: (entries[j].0 + next) / 2.0,
                gain,
            });
        }
    }

    FeatureEval::Evaluated(best)
}
