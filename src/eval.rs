use std::collections::HashSet;
use std::fmt;

use crate::parser::ROOT_LABEL;
use crate::structs::Tree;

const PUNCTUATION_TAGS: [&str; 5] = ["''", "``", ".", ":", ","];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LabeledConstituent {
    label: String,
    start: usize,
    end: usize,
}

/// Running labeled-bracket scores over a test set.
#[derive(Debug)]
pub struct LabeledConstituentEval {
    labels_to_ignore: HashSet<String>,
    punctuation_tags: HashSet<String>,
    correct: usize,
    guessed: usize,
    gold: usize,
    exact: usize,
    total: usize,
}

/// Precision, recall, F1 and exact-match rate, all in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub exact: f64,
}

impl Default for LabeledConstituentEval {
    fn default() -> Self {
        LabeledConstituentEval::new([ROOT_LABEL], PUNCTUATION_TAGS)
    }
}

impl LabeledConstituentEval {
    pub fn new<I, P>(labels_to_ignore: I, punctuation_tags: P) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        LabeledConstituentEval {
            labels_to_ignore: labels_to_ignore.into_iter().map(Into::into).collect(),
            punctuation_tags: punctuation_tags.into_iter().map(Into::into).collect(),
            correct: 0,
            guessed: 0,
            gold: 0,
            exact: 0,
            total: 0,
        }
    }

    /// Adds one sentence and returns its own scores. A missing guess
    /// scores zero against every gold constituent.
    pub fn evaluate(&mut self, guess: Option<&Tree>, gold: &Tree) -> Scores {
        let guessed = guess.map(|t| self.constituents(t)).unwrap_or_default();
        let gold = self.constituents(gold);
        let correct = guessed.intersection(&gold).count();

        self.correct += correct;
        self.guessed += guessed.len();
        self.gold += gold.len();
        let is_exact = guess.is_some() && correct == guessed.len() && correct == gold.len();
        if is_exact {
            self.exact += 1;
        }
        self.total += 1;

        scores(correct, guessed.len(), gold.len(), usize::from(is_exact), 1)
    }

    pub fn summary(&self) -> Scores {
        scores(self.correct, self.guessed, self.gold, self.exact, self.total)
    }

    fn constituents(&self, tree: &Tree) -> HashSet<LabeledConstituent> {
        let mut set = HashSet::new();
        if !tree.is_leaf() {
            self.add_constituents(tree, &mut set, 0);
        }
        set
    }

    // Words are dropped first, so preterminals act as the leaves here.
    fn add_constituents(&self, node: &Tree, set: &mut HashSet<LabeledConstituent>, start: usize) -> usize {
        if node.is_preterminal() || node.is_leaf() {
            return if self.punctuation_tags.contains(&node.label) { 0 } else { 1 };
        }
        let mut end = start;
        for child in &node.children {
            end += self.add_constituents(child, set, end);
        }
        if !self.labels_to_ignore.contains(&node.label) {
            set.insert(LabeledConstituent {
                label: node.label.clone(),
                start,
                end,
            });
        }
        end - start
    }
}

fn scores(correct: usize, guessed: usize, gold: usize, exact: usize, total: usize) -> Scores {
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(correct, guessed);
    let recall = ratio(correct, gold);
    let f1 = if precision > 0.0 && recall > 0.0 {
        2.0 / (1.0 / precision + 1.0 / recall)
    } else {
        0.0
    };
    Scores {
        precision,
        recall,
        f1,
        exact: ratio(exact, total),
    }
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P: {:.2} R: {:.2} F1: {:.2} EX: {:.2}",
            self.precision * 100.0,
            self.recall * 100.0,
            self.f1 * 100.0,
            self.exact * 100.0
        )
    }
}
