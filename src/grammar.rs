use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use tracing::info;

use crate::error::Error;
use crate::rules::{BinaryRule, RuleCounts, UnaryRule};
use crate::structs::Tree;

pub type SymbolId = usize;

// --- Grammar Structures ---

/// A binary rule over interned symbols, scored as a cost (`-ln p`).
#[derive(Debug, Clone, Copy)]
pub struct BinaryEdge {
    pub parent: SymbolId,
    pub left: SymbolId,
    pub right: SymbolId,
    pub cost: f64,
}

/// A unary rule over interned symbols, scored as a cost (`-ln p`).
#[derive(Debug, Clone, Copy)]
pub struct UnaryEdge {
    pub parent: SymbolId,
    pub child: SymbolId,
    pub cost: f64,
}

/// An immutable PCFG whose rules are indexed by their children.
#[derive(Debug, Clone)]
pub struct Grammar {
    binary_rules: Vec<BinaryRule>,
    unary_rules: Vec<UnaryRule>,

    binary_rules_by_left_child: HashMap<String, Vec<usize>>,
    binary_rules_by_right_child: HashMap<String, Vec<usize>>,
    unary_rules_by_child: HashMap<String, Vec<usize>>,
    non_terminals: HashSet<String>,

    symbol_to_id: HashMap<String, SymbolId>,
    id_to_symbol: Vec<String>,
    binary_edges_by_left: Vec<Vec<BinaryEdge>>,
    unary_edges_by_child: Vec<Vec<UnaryEdge>>,
}

impl Grammar {
    /// Relative-frequency estimate over already binarized trees.
    pub fn from_trees(trees: &[Tree]) -> Result<Grammar, Error> {
        let mut counts = RuleCounts::default();
        for tree in trees {
            counts.tally(tree)?;
        }
        let (binary, unary) = counts.into_rules();
        let grammar = Grammar::from_rules(binary, unary);
        info!(
            trees = trees.len(),
            binary = grammar.binary_rules.len(),
            unary = grammar.unary_rules.len(),
            non_terminals = grammar.non_terminals.len(),
            "estimated grammar"
        );
        Ok(grammar)
    }

    pub fn from_rules(mut binary_rules: Vec<BinaryRule>, mut unary_rules: Vec<UnaryRule>) -> Grammar {
        // Sorted order makes symbol ids, and with them chart tie-breaking, reproducible.
        binary_rules.sort_by(|a, b| {
            (&a.parent, &a.left, &a.right).cmp(&(&b.parent, &b.left, &b.right))
        });
        unary_rules.sort_by(|a, b| (&a.parent, &a.child).cmp(&(&b.parent, &b.child)));

        let mut symbols: BTreeSet<&str> = BTreeSet::new();
        for rule in &binary_rules {
            symbols.extend([rule.parent.as_str(), rule.left.as_str(), rule.right.as_str()]);
        }
        for rule in &unary_rules {
            symbols.extend([rule.parent.as_str(), rule.child.as_str()]);
        }
        let id_to_symbol: Vec<String> = symbols.into_iter().map(String::from).collect();
        let symbol_to_id: HashMap<String, SymbolId> = id_to_symbol
            .iter()
            .enumerate()
            .map(|(id, s)| (s.clone(), id))
            .collect();

        let mut binary_rules_by_left_child: HashMap<String, Vec<usize>> = HashMap::new();
        let mut binary_rules_by_right_child: HashMap<String, Vec<usize>> = HashMap::new();
        let mut unary_rules_by_child: HashMap<String, Vec<usize>> = HashMap::new();
        let mut non_terminals = HashSet::new();
        let mut binary_edges_by_left = vec![Vec::new(); id_to_symbol.len()];
        let mut unary_edges_by_child = vec![Vec::new(); id_to_symbol.len()];

        for (idx, rule) in binary_rules.iter().enumerate() {
            binary_rules_by_left_child.entry(rule.left.clone()).or_default().push(idx);
            binary_rules_by_right_child.entry(rule.right.clone()).or_default().push(idx);
            non_terminals.insert(rule.parent.clone());
            if rule.probability > 0.0 {
                let edge = BinaryEdge {
                    parent: symbol_to_id[&rule.parent],
                    left: symbol_to_id[&rule.left],
                    right: symbol_to_id[&rule.right],
                    cost: -rule.probability.ln(),
                };
                binary_edges_by_left[edge.left].push(edge);
            }
        }
        for (idx, rule) in unary_rules.iter().enumerate() {
            unary_rules_by_child.entry(rule.child.clone()).or_default().push(idx);
            non_terminals.insert(rule.parent.clone());
            if rule.probability > 0.0 {
                let edge = UnaryEdge {
                    parent: symbol_to_id[&rule.parent],
                    child: symbol_to_id[&rule.child],
                    cost: -rule.probability.ln(),
                };
                unary_edges_by_child[edge.child].push(edge);
            }
        }

        Grammar {
            binary_rules,
            unary_rules,
            binary_rules_by_left_child,
            binary_rules_by_right_child,
            unary_rules_by_child,
            non_terminals,
            symbol_to_id,
            id_to_symbol,
            binary_edges_by_left,
            unary_edges_by_child,
        }
    }

    pub fn binary_rules(&self) -> &[BinaryRule] {
        &self.binary_rules
    }

    pub fn unary_rules(&self) -> &[UnaryRule] {
        &self.unary_rules
    }

    pub fn binary_rules_by_left_child<'a>(&'a self, left: &str) -> impl Iterator<Item = &'a BinaryRule> + 'a {
        Self::lookup(&self.binary_rules_by_left_child, left).map(move |idx| &self.binary_rules[idx])
    }

    pub fn binary_rules_by_right_child<'a>(&'a self, right: &str) -> impl Iterator<Item = &'a BinaryRule> + 'a {
        Self::lookup(&self.binary_rules_by_right_child, right).map(move |idx| &self.binary_rules[idx])
    }

    pub fn unary_rules_by_child<'a>(&'a self, child: &str) -> impl Iterator<Item = &'a UnaryRule> + 'a {
        Self::lookup(&self.unary_rules_by_child, child).map(move |idx| &self.unary_rules[idx])
    }

    fn lookup<'a>(index: &'a HashMap<String, Vec<usize>>, key: &str) -> impl Iterator<Item = usize> + 'a {
        index.get(key).into_iter().flatten().copied()
    }

    /// Every symbol that heads at least one rule.
    pub fn non_terminals(&self) -> &HashSet<String> {
        &self.non_terminals
    }

    // --- Interned view used by the chart ---

    pub fn symbol_id(&self, symbol: &str) -> Option<SymbolId> {
        self.symbol_to_id.get(symbol).copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &str {
        &self.id_to_symbol[id]
    }

    pub fn num_symbols(&self) -> usize {
        self.id_to_symbol.len()
    }

    pub fn binary_edges_by_left(&self, left: SymbolId) -> &[BinaryEdge] {
        &self.binary_edges_by_left[left]
    }

    pub fn unary_edges_by_child(&self, child: SymbolId) -> &[UnaryEdge] {
        &self.unary_edges_by_child[child]
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self.binary_rules.iter().map(|r| r.to_string()).collect();
        lines.extend(self.unary_rules.iter().map(|r| r.to_string()));
        lines.sort();
        for line in lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
