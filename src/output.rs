use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::info;

use crate::grammar::Grammar;
use crate::lexicon::{Lexicon, TagScorer};
use crate::structs::Tree;

// --- Tree Rendering ---

/// Multi-line Penn Treebank layout. Preterminals stay on the line of a
/// preterminal left sibling unless they are coordinators.
pub fn render_penn(tree: &Tree) -> String {
    let mut out = String::new();
    render_node(tree, 0, false, false, true, &mut out);
    out.push('\n');
    out
}

fn render_node(
    node: &Tree,
    indent: usize,
    first_sibling: bool,
    left_sibling_preterminal: bool,
    top_level: bool,
    out: &mut String,
) {
    let suppress_indent = node.is_preterminal()
        && (first_sibling || (left_sibling_preterminal && !is_coordinator(node)));
    if suppress_indent {
        out.push(' ');
    } else {
        if !top_level {
            out.push('\n');
        }
        out.push_str(&"  ".repeat(indent));
    }
    if node.is_leaf() || node.is_preterminal() {
        out.push_str(&node.to_string());
        return;
    }
    out.push('(');
    out.push_str(&node.label);
    // The first child counts as following a preterminal.
    let mut left_preterminal = true;
    for (idx, child) in node.children.iter().enumerate() {
        render_node(child, indent + 1, idx == 0, left_preterminal, false, out);
        left_preterminal = child.is_preterminal() && !is_coordinator(child);
    }
    out.push(')');
}

fn is_coordinator(node: &Tree) -> bool {
    node.label.starts_with("CC")
}

// --- Grammar Writing---

/// Writes `PREFIX.rules`, `PREFIX.lexicon` and `PREFIX.words`, or the rule
/// listing to stdout when no prefix is given.
pub fn write_pcfg_output(grammar: &Grammar, lexicon: &Lexicon, output_prefix: Option<&str>) -> io::Result<()> {
    let Some(prefix) = output_prefix else {
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        write!(writer, "{}", grammar)?;
        writer.flush()?;
        return Ok(());
    };

    let rules_output_filename = format!("{}.rules", prefix);
    let lexicon_output_filename = format!("{}.lexicon", prefix);
    let words_output_filename = format!("{}.words", prefix);

    let mut rules_writer = BufWriter::new(File::create(&rules_output_filename)?);
    write!(rules_writer, "{}", grammar)?;

    let mut lexicon_writer = BufWriter::new(File::create(&lexicon_output_filename)?);
    let mut words_writer = BufWriter::new(File::create(&words_output_filename)?);
    let tags = lexicon.tags();
    for word in lexicon.words() {
        writeln!(words_writer, "{}", word)?;
        // "TAG word PROB" for every tag the word was actually seen with
        for tag in &tags {
            if lexicon.word_tag_count(word, tag) > 0.0 {
                writeln!(lexicon_writer, "{} {} {}", tag, word, lexicon.score(word, tag))?;
            }
        }
    }

    rules_writer.flush()?;
    lexicon_writer.flush()?;
    words_writer.flush()?;

    info!(
        rules = %rules_output_filename,
        lexicon = %lexicon_output_filename,
        words = %words_output_filename,
        "wrote grammar"
    );
    Ok(())
}
