use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, opt};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, terminated};
use nom::IResult;

use crate::error::Error;
use crate::structs::Tree;

/// Label given to the unlabeled outer bracket of treebank files: `( (S ...) )`.
pub const ROOT_LABEL: &str = "ROOT";

// --- Tree Parsing  ---

/// Reads exactly one bracketed tree, e.g. `(NP (DT the) (NN dog))`.
pub fn parse_tree(input: &str) -> Result<Tree, Error> {
    let (_, raw) = all_consuming(delimited(multispace0, node, multispace0))(input)
        .map_err(|e| Error::TreeSyntax(format!("{e}")))?;
    finish_tree(raw)
}

/// Reads every bracketed tree in `input`; trees may span several lines.
pub fn parse_trees(input: &str) -> Result<Vec<Tree>, Error> {
    let (_, raws) = all_consuming(terminated(many0(preceded(multispace0, node)), multispace0))(input)
        .map_err(|e| Error::TreeSyntax(format!("{e}")))?;
    raws.into_iter().map(finish_tree).collect()
}

fn label(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '(' && c != ')')(input)
}

fn terminal_leaf(input: &str) -> IResult<&str, Tree> {
    map(label, |l| Tree::leaf(l.to_string()))(input)
}

fn node(input: &str) -> IResult<&str, Tree> {
    let (input, _) = char('(')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, node_label) = opt(label)(input)?;
    let (input, children) = many0(preceded(multispace0, alt((node, terminal_leaf))))(input)?;
    let (input, _) = preceded(multispace0, char(')'))(input)?;
    Ok((input, Tree::new(node_label.unwrap_or("").to_string(), children)))
}

// An empty label is only accepted on the outermost bracket, which then becomes ROOT.
fn finish_tree(mut raw: Tree) -> Result<Tree, Error> {
    if raw.label.is_empty() {
        if raw.is_leaf() {
            return Err(Error::TreeSyntax("Node label cannot be empty".to_string()));
        }
        raw.label = ROOT_LABEL.to_string();
    }
    for child in &raw.children {
        check_labels(child)?;
    }
    Ok(raw)
}

fn check_labels(node: &Tree) -> Result<(), Error> {
    if node.label.is_empty() {
        return Err(Error::TreeSyntax("Node label cannot be empty".to_string()));
    }
    node.children.iter().try_for_each(check_labels)
}
