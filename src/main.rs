use std::fs;
use std::io::{self, BufRead, BufWriter, Read, Write};
use std::path::Path;

use clap::Parser as _;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pcfg_tool::error::Error;
use pcfg_tool::eval::LabeledConstituentEval;
use pcfg_tool::output::{render_penn, write_pcfg_output};
use pcfg_tool::parser::parse_trees;
use pcfg_tool::pcfg::{Parser, PcfgModel};
use pcfg_tool::structs::{Cli, Commands, EvaluateArgs, InduceArgs, ParseArgs, Tree};
use pcfg_tool::transformations::normalize_tree;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Induce(args) => induce(args),
        Commands::Parse(args) => parse(args),
        Commands::Evaluate(args) => evaluate(args),
    }
}

fn induce(args: InduceArgs) -> Result<(), Error> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    let trees = normalize_all(parse_trees(&text)?);

    let model = PcfgModel::train(&trees)?;
    write_pcfg_output(model.grammar(), model.lexicon(), args.grammar_output_prefix.as_deref())?;
    Ok(())
}

fn parse(args: ParseArgs) -> Result<(), Error> {
    let trees = read_treebank(&args.train)?;
    let mut parser = args.parser.build();
    parser.train(&trees)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for line in io::stdin().lock().lines() {
        let line = line?;
        let sentence: Vec<String> = line.split_whitespace().map(String::from).collect();
        if sentence.is_empty() {
            continue;
        }
        match parser.best_parse(&sentence)? {
            Some(tree) => writeln!(writer, "{}", tree)?,
            None => writeln!(writer, "(NOPARSE {})", sentence.join(" "))?,
        }
    }
    writer.flush()?;
    Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<(), Error> {
    let train_trees = read_treebank(&args.train)?;
    let test_trees = read_treebank(&args.test)?;
    info!(train = train_trees.len(), test = test_trees.len(), parser = ?args.parser, "loaded treebanks");

    let mut parser = args.parser.build();
    parser.train(&train_trees)?;

    let mut eval = LabeledConstituentEval::default();
    for gold in select_by_length(&test_trees, args.max_length) {
        let sentence = gold.words();
        let guess = parser.best_parse(&sentence)?;
        let scores = eval.evaluate(guess.as_ref(), gold);
        if args.render {
            match &guess {
                Some(tree) => println!("Guess:\n{}", render_penn(tree)),
                None => println!("Guess:\n(NOPARSE {})\n", sentence.join(" ")),
            }
            println!("Gold:\n{}", render_penn(gold));
            println!("{}\n", scores);
        }
    }
    println!("[Average] {}", eval.summary());
    Ok(())
}

/// Test trees whose sentences are at most `max_length` words long.
fn select_by_length(trees: &[Tree], max_length: usize) -> impl Iterator<Item = &Tree> {
    trees.iter().filter(move |tree| tree.words().len() <= max_length)
}

fn read_treebank(path: &Path) -> Result<Vec<Tree>, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
    Ok(normalize_all(parse_trees(&text)?))
}

fn normalize_all(trees: Vec<Tree>) -> Vec<Tree> {
    let total = trees.len();
    let normalized: Vec<Tree> = trees.into_iter().filter_map(normalize_tree).collect();
    if normalized.len() < total {
        warn!(dropped = total - normalized.len(), "skipped trees with no words left after normalization");
    }
    normalized
}
