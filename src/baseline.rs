use std::collections::HashMap;

use crate::error::Error;
use crate::lexicon::{Lexicon, TagScorer};
use crate::parser::ROOT_LABEL;
use crate::pcfg::Parser;
use crate::structs::Tree;

const FALLBACK_CATEGORY: &str = "S";

/// Tags each word with its most likely tag, then reuses a training tree
/// with the same tag sequence or builds a right-branching one.
#[derive(Debug, Default)]
pub struct BaselineParser {
    trained: Option<BaselineModel>,
}

#[derive(Debug, Default)]
struct BaselineModel {
    lexicon: Lexicon,
    /// Training trees per tag sequence, in first-seen order, with counts.
    known_parses: HashMap<Vec<String>, Vec<(Tree, u64)>>,
    span_to_categories: HashMap<usize, HashMap<String, u64>>,
    category_totals: HashMap<String, u64>,
}

impl Parser for BaselineParser {
    fn train(&mut self, trees: &[Tree]) -> Result<(), Error> {
        let mut model = BaselineModel {
            lexicon: Lexicon::from_trees(trees),
            ..BaselineModel::default()
        };
        for tree in trees {
            model.tally_spans(tree);
            let tags = tree.tags();
            // Reused trees get one word per tag, so every leaf needs its own tag.
            if tags.len() != tree.yield_labels().len() {
                continue;
            }
            let parses = model.known_parses.entry(tags).or_default();
            match parses.iter_mut().find(|(known, _)| known == tree) {
                Some((_, count)) => *count += 1,
                None => parses.push((tree.clone(), 1)),
            }
        }
        self.trained = Some(model);
        Ok(())
    }

    fn best_parse(&self, sentence: &[String]) -> Result<Option<Tree>, Error> {
        let model = self.trained.as_ref().ok_or(Error::NotTrained)?;
        if sentence.is_empty() {
            return Ok(None);
        }
        let Some(tags) = model.tagging(sentence) else {
            return Ok(None);
        };
        if let Some(parses) = model.known_parses.get(&tags) {
            if let Some(tree) = most_frequent_parse(parses) {
                let mut parse = tree.clone();
                parse.set_words(sentence);
                return Ok(Some(parse));
            }
        }
        Ok(Some(model.right_branching_parse(sentence, &tags)))
    }
}

fn most_frequent_parse(parses: &[(Tree, u64)]) -> Option<&Tree> {
    let mut best: Option<&(Tree, u64)> = None;
    for entry in parses {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(tree, _)| tree)
}

// Highest count wins; ties go to the smallest label.
fn arg_max(counts: &HashMap<String, u64>) -> Option<&str> {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(label, _)| label.as_str())
}

impl BaselineModel {
    // Returns the number of words under `tree`.
    fn tally_spans(&mut self, tree: &Tree) -> usize {
        if tree.is_leaf() || tree.is_preterminal() {
            return 1;
        }
        let span: usize = tree.children.iter().map(|child| self.tally_spans(child)).sum();
        if tree.label != ROOT_LABEL {
            *self
                .span_to_categories
                .entry(span)
                .or_default()
                .entry(tree.label.clone())
                .or_insert(0) += 1;
            *self.category_totals.entry(tree.label.clone()).or_insert(0) += 1;
        }
        span
    }

    fn tagging(&self, sentence: &[String]) -> Option<Vec<String>> {
        sentence.iter().map(|word| self.best_tag(word)).collect()
    }

    fn best_tag(&self, word: &str) -> Option<String> {
        let mut best: Option<(&str, f64)> = None;
        // Tags arrive sorted, so a strict comparison keeps the smallest on ties.
        for tag in self.lexicon.tags() {
            let score = self.lexicon.score(word, tag);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((tag, score));
            }
        }
        best.map(|(tag, _)| tag.to_string())
    }

    fn category_for_span(&self, span: usize) -> String {
        self.span_to_categories
            .get(&span)
            .and_then(arg_max)
            .or_else(|| arg_max(&self.category_totals))
            .unwrap_or(FALLBACK_CATEGORY)
            .to_string()
    }

    fn right_branching_parse(&self, words: &[String], tags: &[String]) -> Tree {
        let mut position = words.len() - 1;
        let mut tree = tag_tree(&words[position], &tags[position]);
        let mut span = 1;
        while position > 0 {
            position -= 1;
            span += 1;
            let left = tag_tree(&words[position], &tags[position]);
            tree = Tree::new(self.category_for_span(span), vec![left, tree]);
        }
        Tree::new(ROOT_LABEL.to_string(), vec![tree])
    }
}

fn tag_tree(word: &str, tag: &str) -> Tree {
    Tree::new(tag.to_string(), vec![Tree::leaf(word.to_string())])
}
