//! Probabilistic context-free grammar estimation from treebank trees and
//! Viterbi CYK parsing under the estimated grammar.
//!
//! ```
//! use pcfg_tool::parser::parse_trees;
//! use pcfg_tool::pcfg::{Parser, PcfgParser};
//!
//! let trees = parse_trees("(ROOT (S (NP (NNS dogs)) (VP (VBP run))))").unwrap();
//! let mut parser = PcfgParser::default();
//! parser.train(&trees).unwrap();
//!
//! let sentence = vec!["dogs".to_string(), "run".to_string()];
//! let tree = parser.best_parse(&sentence).unwrap().unwrap();
//! assert_eq!(tree.to_string(), "(ROOT (S (NP (NNS dogs)) (VP (VBP run))))");
//! ```

pub mod baseline;
pub mod cyk;
pub mod error;
pub mod eval;
pub mod grammar;
pub mod lexicon;
pub mod output;
pub mod parser;
pub mod pcfg;
pub mod rules;
pub mod structs;
pub mod transformations;


pub use crate::error::Error;
pub use crate::structs::Tree;
