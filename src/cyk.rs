use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use crate::grammar::{Grammar, SymbolId};
use crate::lexicon::TagScorer;
use crate::structs::Tree;

#[derive(Debug, Clone, Copy)]
struct ChartEntry {
    cost: f64,
    backpointer: BackPointer,
}

#[derive(Debug, Clone, Copy)]
enum BackPointer {
    Terminal,
    Unary {
        child: SymbolId,
    },
    Binary {
        split_point: usize,
        left: SymbolId,
        right: SymbolId,
    },
}

type Cell = BTreeMap<SymbolId, ChartEntry>;

/// Best cost per symbol for every span `start..end` of a sentence.
#[derive(Debug)]
pub struct Chart {
    cells: Vec<Vec<Cell>>,
    unary_passes: usize,
}

impl Chart {
    fn new(n: usize) -> Self {
        Chart {
            cells: vec![vec![Cell::new(); n + 1]; n + 1],
            unary_passes: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cost of the best derivation of `symbol` over `start..end`, if any.
    pub fn cost(&self, start: usize, end: usize, symbol: SymbolId) -> Option<f64> {
        self.cell(start, end)?.get(&symbol).map(|e| e.cost)
    }

    /// Symbols derivable over `start..end`, in id order.
    pub fn symbols(&self, start: usize, end: usize) -> Vec<SymbolId> {
        self.cell(start, end)
            .map(|cell| cell.keys().copied().collect())
            .unwrap_or_default()
    }

    fn cell(&self, start: usize, end: usize) -> Option<&Cell> {
        self.cells.get(start).and_then(|row| row.get(end))
    }

    /// Largest number of improving unary passes any single cell needed.
    pub fn max_unary_passes(&self) -> usize {
        self.unary_passes
    }
}

/// The winning derivation of a sentence, still in annotated form.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub tree: Tree,
    /// Summed `-ln p` over every rule and tagging used.
    pub cost: f64,
}

/// Viterbi CYK with unary closure. `None` for an empty sentence or when
/// `start_symbol` cannot cover the whole input.
pub fn parse_sentence<S>(grammar: &Grammar, lexicon: &S, words: &[String], start_symbol: &str) -> Option<Derivation>
where
    S: TagScorer + ?Sized,
{
    let n = words.len();
    if n == 0 {
        return None;
    }

    let Some(start_symbol_id) = grammar.symbol_id(start_symbol) else {
        debug!(start_symbol, "start symbol not in grammar");
        return None;
    };

    let started = Instant::now();
    let chart = fill_chart(grammar, lexicon, words);
    debug!(words = n, elapsed = ?started.elapsed(), unary_passes = chart.unary_passes, "filled chart");

    let cost = chart.cost(0, n, start_symbol_id)?;
    let started = Instant::now();
    let tree = reconstruct_tree(grammar, &chart, start_symbol_id, 0, n, words);
    debug!(elapsed = ?started.elapsed(), cost, "reconstructed tree");

    Some(Derivation { tree, cost })
}

/// Runs the bottom-up fill for every span of `words`.
pub fn fill_chart<S>(grammar: &Grammar, lexicon: &S, words: &[String]) -> Chart
where
    S: TagScorer + ?Sized,
{
    let n = words.len();
    let mut chart = Chart::new(n);

    let tags: Vec<(SymbolId, &str)> = lexicon
        .tags()
        .into_iter()
        .filter_map(|tag| grammar.symbol_id(tag).map(|id| (id, tag)))
        .collect();

    // Fill chart with tag scores for individual words
    for (i, word) in words.iter().enumerate() {
        let mut cell = Cell::new();
        for &(tag_id, tag) in &tags {
            let score = lexicon.score(word, tag);
            if score > 0.0 {
                cell.insert(
                    tag_id,
                    ChartEntry {
                        cost: -score.ln(),
                        backpointer: BackPointer::Terminal,
                    },
                );
            }
        }
        let passes = apply_unary_closure(grammar, &mut cell);
        chart.unary_passes = chart.unary_passes.max(passes);
        chart.cells[i][i + 1] = cell;
    }

    //  Main CYK loop: fill cells for spans of length > 1
    for span in 2..=n {
        for start in 0..=(n - span) {
            let end = start + span;
            let mut target = Cell::new();

            for split in (start + 1)..end {
                let left_cell = &chart.cells[start][split];
                let right_cell = &chart.cells[split][end];

                // Try all binary rules A → B C with B on the left
                for (&left, left_entry) in left_cell {
                    for rule in grammar.binary_edges_by_left(left) {
                        let Some(right_entry) = right_cell.get(&rule.right) else {
                            continue;
                        };
                        let new_cost = left_entry.cost + right_entry.cost + rule.cost;
                        relax(
                            &mut target,
                            rule.parent,
                            new_cost,
                            BackPointer::Binary {
                                split_point: split,
                                left,
                                right: rule.right,
                            },
                        );
                    }
                }
            }

            let passes = apply_unary_closure(grammar, &mut target);
            chart.unary_passes = chart.unary_passes.max(passes);
            chart.cells[start][end] = target;
        }
    }

    chart
}

// Keeps the entry only when it is new or strictly cheaper; returns whether it changed.
fn relax(cell: &mut Cell, symbol: SymbolId, cost: f64, backpointer: BackPointer) -> bool {
    let improves = cell.get(&symbol).map_or(true, |current| cost < current.cost);
    if improves {
        cell.insert(symbol, ChartEntry { cost, backpointer });
    }
    improves
}

// Like `relax`, except that a unary derivation also takes over a lexical
// entry of equal cost, as long as its chain does not lead back to `parent`.
fn relax_unary(cell: &mut Cell, parent: SymbolId, child: SymbolId, cost: f64) -> bool {
    let takes_over_terminal = cell.get(&parent).is_some_and(|current| {
        cost == current.cost
            && matches!(current.backpointer, BackPointer::Terminal)
            && !unary_chain_reaches(cell, child, parent)
    });
    if takes_over_terminal {
        cell.insert(
            parent,
            ChartEntry {
                cost,
                backpointer: BackPointer::Unary { child },
            },
        );
        return true;
    }
    relax(cell, parent, cost, BackPointer::Unary { child })
}

// Follows unary backpointers from `from` and reports whether `target` is on the chain.
fn unary_chain_reaches(cell: &Cell, from: SymbolId, target: SymbolId) -> bool {
    let mut current = from;
    for _ in 0..=cell.len() {
        if current == target {
            return true;
        }
        match cell.get(&current).map(|entry| entry.backpointer) {
            Some(BackPointer::Unary { child }) => current = child,
            _ => return false,
        }
    }
    true
}

// Sweeps the cell with A → B rules until a pass changes nothing.
// Returns the number of passes that did change something.
fn apply_unary_closure(grammar: &Grammar, cell: &mut Cell) -> usize {
    let mut passes = 0;
    loop {
        let mut changed = false;
        let present: Vec<SymbolId> = cell.keys().copied().collect();
        for child in present {
            for rule in grammar.unary_edges_by_child(child) {
                let child_cost = cell[&child].cost;
                let new_cost = child_cost + rule.cost;
                changed |= relax_unary(cell, rule.parent, child, new_cost);
            }
        }
        if !changed {
            return passes;
        }
        passes += 1;
    }
}

// Rebuilds the tree for `symbol` over `i..j` by following backpointers.
fn reconstruct_tree(grammar: &Grammar, chart: &Chart, symbol: SymbolId, i: usize, j: usize, words: &[String]) -> Tree {
    let label = grammar.symbol(symbol).to_string();
    let entry = chart.cells[i][j]
        .get(&symbol)
        .unwrap_or_else(|| panic!("reconstruct_tree: symbol '{}' missing from span ({},{})", label, i, j));

    match entry.backpointer {
        BackPointer::Terminal => Tree::new(label, vec![Tree::leaf(words[i].clone())]),
        BackPointer::Unary { child } => {
            let child_tree = reconstruct_tree(grammar, chart, child, i, j, words);
            Tree::new(label, vec![child_tree])
        }
        BackPointer::Binary { split_point, left, right } => {
            let left_tree = reconstruct_tree(grammar, chart, left, i, split_point, words);
            let right_tree = reconstruct_tree(grammar, chart, right, split_point, j, words);
            Tree::new(label, vec![left_tree, right_tree])
        }
    }
}
