//! Random-forest classifier.
//!
//! Trees are stored the way the fitting library exports them: parallel
//! arrays indexed by node id, root at 0, `-1` children marking a leaf.
//! `value[node]` holds per-class weights at that node.

use serde::{Deserialize, Serialize};

use super::{check_width, Classifier};
use crate::{DiabetestError, Result};

/// Sentinel child index for leaves.
pub const LEAF: i64 = -1;

/// One fitted binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn node_count(&self) -> usize { self.children_left.len() }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    /// Depth of the deepest leaf (root alone is depth 0).
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node, d)) = stack.pop() {
            if self.is_leaf(node) {
                max = max.max(d);
            } else {
                stack.push((self.children_left[node] as usize, d + 1));
                stack.push((self.children_right[node] as usize, d + 1));
            }
        }
        max
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!("node arrays disagree in length (expected {})", n));
        }

        for node in 0..n {
            let (l, r) = (self.children_left[node], self.children_right[node]);
            if l == LEAF || r == LEAF {
                if l != r {
                    return Err(format!("node {} has exactly one child", node));
                }
                let row = &self.value[node];
                if row.len() != n_classes {
                    return Err(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        row.len(),
                        n_classes
                    ));
                }
                if row.iter().any(|w| !w.is_finite() || *w < 0.0) || row.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has invalid class weights", node));
                }
                continue;
            }

            // Children must come after their parent, which also rules out cycles.
            for child in [l, r] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has out-of-order child {}", node, child));
                }
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", node, f));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("node {} has a non-finite threshold", node));
            }
        }
        Ok(())
    }

    /// Follow `x` to its leaf. Goes left when `x[feature] <= threshold`.
    pub fn leaf_for(&self, x: &[f64]) -> usize {
        let mut node = 0usize;
        while !self.is_leaf(node) {
            let f = self.feature[node] as usize;
            node = if x[f] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Normalized class distribution at the leaf reached by `x`.
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let row = &self.value[self.leaf_for(x)];
        let total: f64 = row.iter().sum();
        row.iter().map(|w| w / total).collect()
    }
}

/// Mean of per-tree leaf distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn new(n_features: usize, n_classes: usize, trees: Vec<DecisionTree>) -> Self {
        Self { n_features, n_classes, trees }
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(DiabetestError::InvalidArtifact("forest has no trees".into()));
        }
        if self.n_classes < 2 {
            return Err(DiabetestError::InvalidArtifact(format!(
                "forest has {} classes",
                self.n_classes
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|msg| DiabetestError::InvalidArtifact(format!("tree {}: {}", i, msg)))?;
        }
        Ok(())
    }
}

impl Classifier for ForestClassifier {
    fn n_features(&self) -> usize { self.n_features }

    fn n_classes(&self) -> usize { self.n_classes }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_width(self.n_features, x)?;

        let mut acc = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.predict_proba(x)) {
                *a += p;
            }
        }
        let n = self.trees.len() as f64;
        acc.iter_mut().for_each(|a| *a /= n);
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single split on feature `f` at `t`; left leaf weights `l`, right `r`.
    fn stump(f: i64, t: f64, l: [f64; 2], r: [f64; 2]) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![f, -2, -2],
            threshold: vec![t, -2.0, -2.0],
            value: vec![vec![l[0] + r[0], l[1] + r[1]], l.to_vec(), r.to_vec()],
        }
    }

    #[test]
    fn test_threshold_goes_left_inclusive() {
        let t = stump(0, 1.0, [3.0, 1.0], [1.0, 3.0]);
        assert_eq!(t.leaf_for(&[1.0]), 1);
        assert_eq!(t.leaf_for(&[1.0001]), 2);
        assert_eq!(t.predict_proba(&[0.0]), vec![0.75, 0.25]);
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = ForestClassifier::new(
            2,
            2,
            vec![
                stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]),
                stump(1, 0.0, [1.0, 1.0], [0.0, 4.0]),
            ],
        );
        forest.validate().unwrap();
        let p = forest.predict_proba(&[1.0, -1.0]).unwrap();
        // tree 0 -> [0, 1], tree 1 -> [0.5, 0.5]
        assert!((p[0] - 0.25).abs() < 1e-12);
        assert!((p[1] - 0.75).abs() < 1e-12);
        assert!((forest.positive_probability(&[1.0, -1.0]).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_depth() {
        let mut t = stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]);
        assert_eq!(t.depth(), 1);
        t.children_left[2] = 3;
        t.children_right[2] = 4;
        t.feature[2] = 0;
        t.threshold[2] = 5.0;
        t.children_left.extend([LEAF, LEAF]);
        t.children_right.extend([LEAF, LEAF]);
        t.feature.extend([-2, -2]);
        t.threshold.extend([-2.0, -2.0]);
        t.value.extend([vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(t.depth(), 2);
        assert_eq!(t.leaf_for(&[6.0]), 4);
    }

    #[test]
    fn test_validate_rejects_bad_trees() {
        let ok = stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]);

        let mut cyclic = ok.clone();
        cyclic.children_left[0] = 0;
        let mut bad_feature = ok.clone();
        bad_feature.feature[0] = 7;
        let mut short = ok.clone();
        short.threshold.pop();
        let mut one_child = ok.clone();
        one_child.children_right[1] = 2;
        let mut empty_leaf = ok.clone();
        empty_leaf.value[1] = vec![0.0, 0.0];

        for tree in [cyclic, bad_feature, short, one_child, empty_leaf] {
            let forest = ForestClassifier::new(2, 2, vec![tree]);
            assert!(matches!(forest.validate(), Err(DiabetestError::InvalidArtifact(_))));
        }
        assert!(ForestClassifier::new(2, 2, vec![]).validate().is_err());
        assert!(ForestClassifier::new(2, 2, vec![ok]).validate().is_ok());
    }

    #[test]
    fn test_width_checked() {
        let forest = ForestClassifier::new(2, 2, vec![stump(0, 0.0, [1.0, 0.0], [0.0, 1.0])]);
        assert!(matches!(
            forest.predict_proba(&[0.0]),
            Err(DiabetestError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }
}
