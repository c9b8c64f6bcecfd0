//! Command-line argument parsing and dispatch for `kb`.
//!
//! The CLI is a thin synchronous driver over [`kb_session::Session`]: one
//! process, one [`kb_session::Session`], one command. There is no
//! persistent server and no registry/credential machinery — a fresh
//! session is built for every invocation, optionally preloaded from a
//! `--theory-dir`.
//!
//! # Examples
//!
//! ```bash
//! # Assert facts from a file
//! kb learn theory.sys2
//!
//! # Prove a goal, piping DSL from stdin
//! echo "isA Fido Mammal" | kb prove --theory-dir ./theories
//!
//! # Find every binding that satisfies a pattern
//! kb query "isA Fido ?what"
//! ```

use std::error::Error;
use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kb_session::{QueryOptions, Session, SessionConfig, Verdict};

use crate::config;

/// Command-line interface for the kb reasoning engine.
#[derive(Parser)]
#[command(name = "kb")]
#[command(about = "A knowledge-base reasoning engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands.
///
/// - [`Learn`][Commands::Learn] - assert statements into a fresh session
/// - [`Prove`][Commands::Prove] - prove a single goal statement
/// - [`Query`][Commands::Query] - find every binding satisfying a pattern
#[derive(Subcommand)]
pub enum Commands {
    /// Assert DSL statements, read from a file or stdin.
    ///
    /// Every statement in the input is applied as one atomic unit: either
    /// all of them take effect, or none do.
    ///
    /// # Example
    ///
    /// ```bash
    /// kb learn theory.sys2
    /// echo "isA Fido Dog" | kb learn
    /// ```
    Learn {
        /// DSL source file. Reads stdin if omitted.
        file: Option<PathBuf>,

        #[command(flatten)]
        shared: SharedArgs,
    },

    /// Prove the first goal statement found in the input.
    ///
    /// # Example
    ///
    /// ```bash
    /// kb prove --theory-dir ./theories "isA Fido Mammal"
    /// ```
    Prove {
        /// DSL source file, or a literal goal statement. Reads stdin if
        /// neither is given and no statement text follows.
        file: Option<PathBuf>,

        #[command(flatten)]
        shared: SharedArgs,
    },

    /// Find every binding that satisfies a query pattern.
    ///
    /// Prints one JSON object per match to stdout.
    ///
    /// # Example
    ///
    /// ```bash
    /// kb query "isA ?who Dog"
    /// ```
    Query {
        /// DSL source file, or a literal query pattern. Reads stdin if
        /// neither is given.
        file: Option<PathBuf>,

        /// Maximum number of matches to return.
        #[arg(long)]
        max_results: Option<usize>,

        #[command(flatten)]
        shared: SharedArgs,
    },
}

/// Flags shared by every subcommand.
#[derive(clap::Args)]
pub struct SharedArgs {
    /// Session configuration file (`.toml` or `.json`). Unset keys keep
    /// their documented defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory of `.sys2`/`.sys2dsl` theory files to preload, in
    /// lexicographic order, before running the command.
    #[arg(long)]
    pub theory_dir: Option<PathBuf>,
}

pub fn run_cli() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Learn { file, shared } => cmd_learn(file, shared),
        Commands::Prove { file, shared } => cmd_prove(file, shared),
        Commands::Query { file, max_results, shared } => cmd_query(file, max_results, shared),
    }
}

fn build_session(shared: &SharedArgs) -> Result<Session, Box<dyn Error>> {
    let config = match &shared.config {
        Some(path) => config::load(path)?,
        None => SessionConfig::default(),
    };
    let mut session = Session::new(config);
    if let Some(dir) = &shared.theory_dir {
        let reports = session.load_theory_dir(dir)?;
        for report in reports {
            for err in &report.errors {
                eprintln!("{}: {}", report.path.display(), err);
            }
        }
    }
    Ok(session)
}

/// Reads DSL text from `file` if given, otherwise from stdin.
fn read_input(file: Option<PathBuf>) -> Result<String, Box<dyn Error>> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn cmd_learn(file: Option<PathBuf>, shared: SharedArgs) -> Result<(), Box<dyn Error>> {
    let mut session = build_session(&shared)?;
    let text = read_input(file)?;
    let report = session.learn(&text);

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if report.success {
        println!("{} fact(s) added", report.facts_added);
        Ok(())
    } else {
        for error in &report.errors {
            eprintln!("error: {error}");
        }
        Err("learn failed; no facts were added".into())
    }
}

fn cmd_prove(file: Option<PathBuf>, shared: SharedArgs) -> Result<(), Box<dyn Error>> {
    let mut session = build_session(&shared)?;
    let text = read_input(file)?;
    let report = session.prove(&text);

    match report.verdict {
        Verdict::Proven => println!("{}", session.describe_result(&report)),
        Verdict::NotProven => println!("not proven"),
        Verdict::Unknown => println!("unknown: {}", report.failure_trace.as_deref().unwrap_or("no further detail")),
        Verdict::TimedOut => println!("timed out"),
    }
    Ok(())
}

fn cmd_query(file: Option<PathBuf>, max_results: Option<usize>, shared: SharedArgs) -> Result<(), Box<dyn Error>> {
    let mut session = build_session(&shared)?;
    let text = read_input(file)?;
    let matches = session.query(&text, QueryOptions { max_results, timeout_ms: None })?;

    for m in &matches {
        println!("{}", serde_json::to_string(&QueryMatchView::from(m))?);
    }
    println!("{} match(es)", matches.len());
    Ok(())
}

/// A JSON-serializable view of a [`kb_session::QueryMatch`]; the session
/// type itself carries no `Serialize` impl since its bindings are most
/// useful in-process as a `Vec<(String, String)>`.
#[derive(serde::Serialize)]
struct QueryMatchView {
    bindings: std::collections::BTreeMap<String, String>,
    proof: String,
}

impl From<&kb_session::QueryMatch> for QueryMatchView {
    fn from(m: &kb_session::QueryMatch) -> Self {
        Self { bindings: m.bindings.iter().cloned().collect(), proof: m.proof.clone() }
    }
}
