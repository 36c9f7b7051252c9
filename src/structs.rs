use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::vec::Vec;

use crate::pcfg::ParserKind;

// --- Data Structures ---

/// A labeled n-ary tree. Leaves carry words, every other node a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tree<L = String> {
    pub label: L,
    pub children: Vec<Tree<L>>,
}

impl<L> Tree<L> {
    pub fn new(label: L, children: Vec<Tree<L>>) -> Self {
        Tree { label, children }
    }

    pub fn leaf(label: L) -> Self {
        Tree { label, children: Vec::new() }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A node whose only child is a leaf.
    pub fn is_preterminal(&self) -> bool {
        self.children.len() == 1 && self.children[0].is_leaf()
    }

    /// Leaf labels, left to right.
    pub fn yield_labels(&self) -> Vec<&L> {
        let mut out = Vec::new();
        collect_yield(self, &mut out);
        out
    }

    /// Preterminal labels, left to right. Lines up with `yield_labels`
    /// for any tree whose leaves all hang under preterminals.
    pub fn preterminal_yield(&self) -> Vec<&L> {
        let mut out = Vec::new();
        collect_preterminals(self, &mut out);
        out
    }
}

fn collect_yield<'a, L>(node: &'a Tree<L>, out: &mut Vec<&'a L>) {
    if node.is_leaf() {
        out.push(&node.label);
    }
    for child in &node.children {
        collect_yield(child, out);
    }
}

fn collect_preterminals<'a, L>(node: &'a Tree<L>, out: &mut Vec<&'a L>) {
    if node.is_leaf() {
        return;
    }
    if node.is_preterminal() {
        out.push(&node.label);
        return;
    }
    for child in &node.children {
        collect_preterminals(child, out);
    }
}

impl Tree<String> {
    /// Words of the sentence this tree spans.
    pub fn words(&self) -> Vec<String> {
        self.yield_labels().into_iter().cloned().collect()
    }

    pub fn tags(&self) -> Vec<String> {
        self.preterminal_yield().into_iter().cloned().collect()
    }

    /// Overwrites the leaves, left to right, with `words`. Callers pass
    /// exactly one word per leaf.
    pub fn set_words(&mut self, words: &[String]) {
        debug_assert_eq!(self.yield_labels().len(), words.len(), "one word per leaf");
        let mut idx = 0;
        set_words_recursive(self, words, &mut idx);
    }
}

fn set_words_recursive(node: &mut Tree<String>, words: &[String], idx: &mut usize) {
    if node.is_leaf() {
        if let Some(word) = words.get(*idx) {
            node.label = word.clone();
        }
        *idx += 1;
        return;
    }
    for child in &mut node.children {
        set_words_recursive(child, words, idx);
    }
}

impl<L: fmt::Display> fmt::Display for Tree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return write!(f, "{}", self.label);
        }
        write!(f, "({}", self.label)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}

// --- Command Line ---

#[derive(Parser, Debug)]
#[command(name = "pcfg_tool", about = "Tools for PCFG-based parsing of natural language sentences", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Reads bracketed trees from stdin and writes the induced PCFG.
    Induce(InduceArgs),
    /// Trains a parser, then parses one sentence per stdin line.
    Parse(ParseArgs),
    /// Trains a parser and scores it against held-out trees.
    Evaluate(EvaluateArgs),
}

#[derive(Parser, Debug)]
pub struct InduceArgs {
    #[arg()]
    pub grammar_output_prefix: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Treebank file with one or more bracketed training trees.
    #[arg(long)]
    pub train: PathBuf,

    #[arg(long, value_enum, default_value_t = ParserKind::Pcfg)]
    pub parser: ParserKind,
}

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub train: PathBuf,

    #[arg(long)]
    pub test: PathBuf,

    #[arg(long, value_enum, default_value_t = ParserKind::Pcfg)]
    pub parser: ParserKind,

    /// Test sentences longer than this are skipped.
    #[arg(long, default_value_t = 20)]
    pub max_length: usize,

    /// Print every guessed and gold tree.
    #[arg(long)]
    pub render: bool,
}
