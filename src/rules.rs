use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Error;
use crate::structs::Tree;

// --- Rule Structures ---

/// `parent -> left right`. Identity ignores the probability.
#[derive(Debug, Clone)]
pub struct BinaryRule {
    pub parent: String,
    pub left: String,
    pub right: String,
    pub probability: f64,
}

/// `parent -> child`. Identity ignores the probability.
#[derive(Debug, Clone)]
pub struct UnaryRule {
    pub parent: String,
    pub child: String,
    pub probability: f64,
}

impl BinaryRule {
    pub fn new(parent: &str, left: &str, right: &str, probability: f64) -> Self {
        BinaryRule {
            parent: parent.to_string(),
            left: left.to_string(),
            right: right.to_string(),
            probability,
        }
    }

    fn key(&self) -> (&str, &str, &str) {
        (&self.parent, &self.left, &self.right)
    }
}

impl UnaryRule {
    pub fn new(parent: &str, child: &str, probability: f64) -> Self {
        UnaryRule {
            parent: parent.to_string(),
            child: child.to_string(),
            probability,
        }
    }

    fn key(&self) -> (&str, &str) {
        (&self.parent, &self.child)
    }
}

impl PartialEq for BinaryRule {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for BinaryRule {}

impl Hash for BinaryRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialEq for UnaryRule {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for UnaryRule {}

impl Hash for UnaryRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for BinaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {} {}", self.parent, self.left, self.right, self.probability)
    }
}

impl fmt::Display for UnaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}", self.parent, self.child, self.probability)
    }
}

// --- Rule Extraction---

/// Production counts gathered from binarized trees.
#[derive(Debug, Default)]
pub struct RuleCounts {
    pub unary: HashMap<UnaryRule, u64>,
    pub binary: HashMap<BinaryRule, u64>,
    /// How often each parent symbol headed any counted production.
    pub parents: HashMap<String, u64>,
}

impl RuleCounts {
    /// Counts the productions of one tree. Preterminals belong to the
    /// lexicon and are skipped; a node with more than two children means
    /// the tree was never binarized.
    pub fn tally(&mut self, node: &Tree) -> Result<(), Error> {
        if node.is_leaf() || node.is_preterminal() {
            return Ok(());
        }
        match node.children.as_slice() {
            [child] => {
                let rule = UnaryRule::new(&node.label, &child.label, 0.0);
                *self.unary.entry(rule).or_insert(0) += 1;
            }
            [left, right] => {
                let rule = BinaryRule::new(&node.label, &left.label, &right.label, 0.0);
                *self.binary.entry(rule).or_insert(0) += 1;
            }
            _ => return Err(Error::IllegalTree(format!("{}", node))),
        }
        *self.parents.entry(node.label.clone()).or_insert(0) += 1;

        for child in &node.children {
            self.tally(child)?;
        }
        Ok(())
    }

    /// Relative frequency of each production given its parent.
    pub fn into_rules(self) -> (Vec<BinaryRule>, Vec<UnaryRule>) {
        let parents = self.parents;
        let relative = |parent: &str, count: u64| -> f64 {
            match parents.get(parent) {
                Some(total) if *total > 0 => count as f64 / *total as f64,
                _ => 0.0,
            }
        };

        let binary = self
            .binary
            .into_iter()
            .map(|(mut rule, count)| {
                rule.probability = relative(&rule.parent, count);
                rule
            })
            .collect();
        let unary = self
            .unary
            .into_iter()
            .map(|(mut rule, count)| {
                rule.probability = relative(&rule.parent, count);
                rule
            })
            .collect();
        (binary, unary)
    }
}
