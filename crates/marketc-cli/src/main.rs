use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use marketc_core::{codegen, normalizer, parser, validator, Error, MarketAst, MarketModel};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// marketc - binary prediction market compiler
///
/// Check, format, hash, and compile market DSL documents into Solidity.
#[derive(Parser)]
#[command(name = "marketc", version, about, long_about = None)]
struct Cli {
    /// Suppress output on success
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a market document (syntax + every semantic rule)
    Check {
        /// Path to .dsl file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile a market document to a Solidity contract
    Build {
        /// Path to .dsl file
        file: PathBuf,
        /// Directory the contract is written to
        #[arg(long, short, default_value = "contracts")]
        out_dir: PathBuf,
        /// Print the contract instead of writing it
        #[arg(long, conflicts_with = "out_dir")]
        stdout: bool,
        /// Output a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Print a market document in canonical form
    Fmt {
        /// Path to .dsl file
        file: PathBuf,
    },

    /// Compute the semantic hash (SHA-256) of a market
    Hash {
        /// Path to .dsl file
        file: PathBuf,
    },

    /// Print the market grammar
    Grammar,

    /// Scaffold a new market document
    Init {
        /// Market question
        question: Option<String>,
    },

    /// Show version information
    Version,
}

/// Exit codes: 0 success, 1 document rejected, 2 usage or I/O error
const EXIT_OK: i32 = 0;
const EXIT_REJECTED: i32 = 1;
const EXIT_ERROR: i32 = 2;

/// Non-zero placeholder; the generated constructor reverts on the zero address
const SCAFFOLD_ORACLE: &str = "0x00000000000000000000000000000000000000a1";

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let quiet = cli.quiet;

    let exit_code = match cli.command {
        Commands::Check { file, json } => cmd_check(&file, json, quiet),
        Commands::Build { file, out_dir, stdout, json } => {
            cmd_build(&file, &out_dir, stdout, json, quiet)
        }
        Commands::Fmt { file } => cmd_fmt(&file),
        Commands::Hash { file } => cmd_hash(&file),
        Commands::Grammar => {
            print!("{}", parser::grammar::render());
            EXIT_OK
        }
        Commands::Init { question } => cmd_init(question),
        Commands::Version => {
            println!(
                "marketc {} (marketc-core {})",
                env!("CARGO_PKG_VERSION"),
                marketc_core::VERSION
            );
            EXIT_OK
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("MARKETC_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

// ── Commands ──────────────────────────────────────────────

fn cmd_check(file: &Path, json: bool, quiet: bool) -> i32 {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(e) => return io_failure(e),
    };

    let (ast, errors) = match parser::parse(&source) {
        Ok(ast) => {
            let errors = validator::check(&ast);
            (Some(ast), errors)
        }
        Err(e) => (None, vec![e]),
    };
    tracing::debug!(file = %file.display(), errors = errors.len(), "checked document");
    if let Some(ast) = &ast {
        warn_zero_oracle(file, &ast.oracle);
    }

    if json {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "valid": errors.is_empty(),
            "errors": errors.len(),
            "diagnostics": errors.iter().map(Error::to_json).collect::<Vec<_>>(),
            "ast": ast,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else if errors.is_empty() {
        if !quiet {
            println!("{} {} is valid", "✓".green().bold(), file.display());
        }
    } else {
        for e in &errors {
            report(file, e);
        }
    }

    if errors.is_empty() {
        EXIT_OK
    } else {
        EXIT_REJECTED
    }
}

fn cmd_build(file: &Path, out_dir: &Path, to_stdout: bool, json: bool, quiet: bool) -> i32 {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(e) => return io_failure(e),
    };

    let (model, contract) = match compile_stages(&source) {
        Ok(pair) => {
            warn_zero_oracle(file, pair.0.oracle());
            pair
        }
        Err(e) => {
            if json {
                println!("{}", serde_json::json!({ "compiled": false, "error": e.to_json() }));
            } else {
                report(file, &e);
            }
            return EXIT_REJECTED;
        }
    };

    if to_stdout {
        print!("{}", contract.source());
        return EXIT_OK;
    }

    let path = out_dir.join(contract.file_name());
    if let Err(e) = write_artifact(&path, contract.source()) {
        return io_failure(e);
    }
    tracing::info!(path = %path.display(), bytes = contract.source().len(), "wrote contract");

    if json {
        let summary = serde_json::json!({
            "compiled": true,
            "path": path.display().to_string(),
            "file_name": contract.file_name(),
            "semantic_hash": normalizer::semantic_hash(&model),
            "market": model,
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    } else if !quiet {
        println!("{} wrote {}", "✓".green().bold(), path.display());
    }
    EXIT_OK
}

fn cmd_fmt(file: &Path) -> i32 {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(e) => return io_failure(e),
    };
    match normalizer::normalize(&source) {
        Ok(canonical) => {
            print!("{}", canonical);
            EXIT_OK
        }
        Err(e) => {
            report(file, &e);
            EXIT_REJECTED
        }
    }
}

fn cmd_hash(file: &Path) -> i32 {
    let source = match read_source(file) {
        Ok(s) => s,
        Err(e) => return io_failure(e),
    };
    match parser::parse(&source).and_then(|ast| validator::validate(&ast)) {
        Ok(model) => {
            println!("{}", normalizer::semantic_hash(&model));
            EXIT_OK
        }
        Err(e) => {
            report(file, &e);
            EXIT_REJECTED
        }
    }
}

fn cmd_init(question: Option<String>) -> i32 {
    match scaffold(question.as_deref().unwrap_or("Will it happen?")) {
        Ok(text) => {
            print!("{}", text);
            eprintln!(
                "{} replace the oracle address before building",
                "note:".cyan().bold()
            );
            EXIT_OK
        }
        Err(e) => io_failure(e),
    }
}

// ── Helpers ───────────────────────────────────────────────

fn compile_stages(source: &str) -> marketc_core::Result<(MarketModel, marketc_core::GeneratedContract)> {
    let ast = parser::parse(source)?;
    tracing::debug!(question = %ast.question, fee_percent = ast.fee, "parsed");
    let model = validator::validate(&ast)?;
    tracing::debug!(fee_bps = model.fee_bps(), oracle = model.oracle(), "validated");
    let contract = codegen::generate(&model)?;
    tracing::debug!(file_name = contract.file_name(), "generated");
    Ok((model, contract))
}

fn scaffold(question: &str) -> anyhow::Result<String> {
    if question.contains('"') {
        bail!("question may not contain '\"'");
    }
    let ast = MarketAst {
        question: question.to_string(),
        outcomes: ("Yes".to_string(), "No".to_string()),
        oracle: SCAFFOLD_ORACLE.to_string(),
        fee: 1,
        mechanism: "pool".to_string(),
    };
    let model = validator::validate(&ast)?;
    Ok(normalizer::canonical_source(&model))
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    tracing::debug!(path = %path.display(), "reading source");
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn write_artifact(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))
}

fn report(file: &Path, error: &Error) {
    let location = match error {
        Error::Syntax { line, column, .. } => format!("{}:{}:{}", file.display(), line, column),
        _ => file.display().to_string(),
    };
    eprintln!("{} {}: {}", "error".red().bold(), location, error);
}

/// The contract compiles, but its constructor rejects the zero address
fn warn_zero_oracle(file: &Path, oracle: &str) {
    if oracle.eq_ignore_ascii_case(ZERO_ADDRESS) {
        eprintln!(
            "{} {}: oracle is the zero address; the contract constructor will revert",
            "warning:".yellow().bold(),
            file.display()
        );
    }
}

fn io_failure(error: anyhow::Error) -> i32 {
    eprintln!("{} {:#}", "error:".red().bold(), error);
    EXIT_ERROR
}
