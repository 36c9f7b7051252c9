use std::collections::{BTreeSet, HashMap};

use tracing::info;

use crate::structs::Tree;

/// Words seen fewer times than this get type-based backoff mass.
const RARE_WORD_THRESHOLD: f64 = 10.0;
const SMOOTHING: f64 = 1.0;

/// Anything that can score a word under a preterminal tag.
pub trait TagScorer {
    /// Every tag worth trying on a word, in a stable order.
    fn tags(&self) -> Vec<&str>;

    /// Estimate of P(word | tag); zero rules the pairing out.
    fn score(&self, word: &str, tag: &str) -> f64;
}

/// Smoothed word/tag emission model counted from training trees.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    word_tag_counts: HashMap<String, HashMap<String, f64>>,
    tag_counts: HashMap<String, f64>,
    word_counts: HashMap<String, f64>,
    type_tag_counts: HashMap<String, f64>,
    total_tokens: f64,
    total_word_types: f64,
    tags: BTreeSet<String>,
}

impl Lexicon {
    /// Tallies every (word, preterminal) pair of the given trees.
    pub fn from_trees(trees: &[Tree]) -> Lexicon {
        let mut lexicon = Lexicon::default();
        for tree in trees {
            lexicon.tally_tree(tree);
        }
        info!(
            tokens = lexicon.total_tokens,
            word_types = lexicon.total_word_types,
            tags = lexicon.tags.len(),
            "estimated lexicon"
        );
        lexicon
    }

    // Each word is counted with the preterminal directly above it; leaves
    // without one contribute nothing.
    fn tally_tree(&mut self, node: &Tree) {
        if node.is_preterminal() {
            self.tally_tagging(&node.children[0].label, &node.label);
            return;
        }
        for child in &node.children {
            self.tally_tree(child);
        }
    }

    fn tally_tagging(&mut self, word: &str, tag: &str) {
        if !self.is_known(word) {
            self.total_word_types += 1.0;
            *self.type_tag_counts.entry(tag.to_string()).or_insert(0.0) += 1.0;
        }
        self.total_tokens += 1.0;
        *self.tag_counts.entry(tag.to_string()).or_insert(0.0) += 1.0;
        *self.word_counts.entry(word.to_string()).or_insert(0.0) += 1.0;
        *self
            .word_tag_counts
            .entry(word.to_string())
            .or_default()
            .entry(tag.to_string())
            .or_insert(0.0) += 1.0;
        self.tags.insert(tag.to_string());
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.word_counts.contains_key(word)
    }

    /// Known words in sorted order.
    pub fn words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.word_counts.keys().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    pub fn word_count(&self, word: &str) -> f64 {
        self.word_counts.get(word).copied().unwrap_or(0.0)
    }

    pub fn tag_count(&self, tag: &str) -> f64 {
        self.tag_counts.get(tag).copied().unwrap_or(0.0)
    }

    pub fn word_tag_count(&self, word: &str, tag: &str) -> f64 {
        self.word_tag_counts
            .get(word)
            .and_then(|tags| tags.get(tag))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total_tokens(&self) -> f64 {
        self.total_tokens
    }

    pub fn total_word_types(&self) -> f64 {
        self.total_word_types
    }
}

impl TagScorer for Lexicon {
    fn tags(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }

    /// P(tag | word) / P(tag) * P(word), with rare words borrowing the
    /// tag's share of word types.
    fn score(&self, word: &str, tag: &str) -> f64 {
        let c_tag = self.tag_count(tag);
        if c_tag == 0.0 {
            return 0.0;
        }
        let p_tag = c_tag / self.total_tokens;
        let mut c_word = self.word_count(word);
        let mut c_tag_and_word = self.word_tag_count(word, tag);
        if c_word < RARE_WORD_THRESHOLD {
            c_word += SMOOTHING;
            c_tag_and_word += self.type_tag_counts.get(tag).copied().unwrap_or(0.0) / self.total_word_types;
        }
        let p_word = (SMOOTHING + c_word) / (self.total_tokens + self.total_word_types);
        let p_tag_given_word = c_tag_and_word / c_word;
        p_tag_given_word / p_tag * p_word
    }
}
