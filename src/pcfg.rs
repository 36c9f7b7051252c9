use std::sync::Arc;

use tracing::{debug, info};

use crate::baseline::BaselineParser;
use crate::cyk::{parse_sentence, Derivation};
use crate::error::Error;
use crate::grammar::Grammar;
use crate::lexicon::Lexicon;
use crate::parser::ROOT_LABEL;
use crate::structs::Tree;
use crate::transformations::{annotate_tree, unannotate_tree};

/// Maps sentences to trees. How a parser learns from its training
/// trees is up to the implementation.
pub trait Parser {
    /// Learns from `trees`, replacing whatever an earlier call learned.
    fn train(&mut self, trees: &[Tree]) -> Result<(), Error>;

    /// Best tree for `sentence`, or `None` when it cannot be parsed.
    fn best_parse(&self, sentence: &[String]) -> Result<Option<Tree>, Error>;
}

/// The parsers the command line can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ParserKind {
    /// Markovized, binarized PCFG with CYK decoding
    Pcfg,
    /// Most frequent tagging with a right-branching fallback
    Baseline,
}

impl ParserKind {
    pub fn build(self) -> AnyParser {
        match self {
            ParserKind::Pcfg => AnyParser::Pcfg(PcfgParser::default()),
            ParserKind::Baseline => AnyParser::Baseline(BaselineParser::default()),
        }
    }
}

#[derive(Debug)]
pub enum AnyParser {
    Pcfg(PcfgParser),
    Baseline(BaselineParser),
}

impl Parser for AnyParser {
    fn train(&mut self, trees: &[Tree]) -> Result<(), Error> {
        match self {
            AnyParser::Pcfg(p) => p.train(trees),
            AnyParser::Baseline(p) => p.train(trees),
        }
    }

    fn best_parse(&self, sentence: &[String]) -> Result<Option<Tree>, Error> {
        match self {
            AnyParser::Pcfg(p) => p.best_parse(sentence),
            AnyParser::Baseline(p) => p.best_parse(sentence),
        }
    }
}

// --- PCFG ---

/// A trained grammar and lexicon. Cheap to clone and safe to share
/// across threads; nothing in it changes after training.
#[derive(Debug, Clone)]
pub struct PcfgModel {
    grammar: Arc<Grammar>,
    lexicon: Arc<Lexicon>,
}

impl PcfgModel {
    /// Estimates both models from raw treebank trees.
    pub fn train(trees: &[Tree]) -> Result<PcfgModel, Error> {
        let annotated: Vec<Tree> = trees.iter().map(annotate_tree).collect();
        let lexicon = Lexicon::from_trees(&annotated);
        let grammar = Grammar::from_trees(&annotated)?;
        Ok(PcfgModel::new(grammar, lexicon))
    }

    pub fn new(grammar: Grammar, lexicon: Lexicon) -> PcfgModel {
        PcfgModel {
            grammar: Arc::new(grammar),
            lexicon: Arc::new(lexicon),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Best derivation in annotated form, with its cost.
    pub fn derivation(&self, sentence: &[String]) -> Option<Derivation> {
        parse_sentence(self.grammar.as_ref(), self.lexicon.as_ref(), sentence, ROOT_LABEL)
    }

    /// Best tree with binarization and markovization undone.
    pub fn parse(&self, sentence: &[String]) -> Option<Tree> {
        match self.derivation(sentence) {
            Some(derivation) => Some(unannotate_tree(derivation.tree)),
            None => {
                debug!(words = sentence.len(), "no parse");
                None
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PcfgParser {
    model: Option<PcfgModel>,
}

impl PcfgParser {
    /// A shareable handle on the trained model.
    pub fn model(&self) -> Result<PcfgModel, Error> {
        self.model.clone().ok_or(Error::NotTrained)
    }
}

impl Parser for PcfgParser {
    fn train(&mut self, trees: &[Tree]) -> Result<(), Error> {
        if self.model.is_some() {
            info!("retraining; previous grammar and lexicon are replaced");
        }
        self.model = Some(PcfgModel::train(trees)?);
        Ok(())
    }

    fn best_parse(&self, sentence: &[String]) -> Result<Option<Tree>, Error> {
        let model = self.model.as_ref().ok_or(Error::NotTrained)?;
        Ok(model.parse(sentence))
    }
}
