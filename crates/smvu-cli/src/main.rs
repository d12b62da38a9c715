//! Command-line interface for the smvu model checker.

use clap::{Parser, Subcommand};
use miette::{Diagnostic, NamedSource, SourceSpan};
use smvu_mc::{check, EU_LABEL};
use smvu_syntax::{dump, parse};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI error with source context for pretty printing.
#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("failed to read file: {message}")]
    Io { message: String },

    #[error("parse error: {message}")]
    #[diagnostic(code(smvu::parse_error))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<Arc<String>>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("check error: {message}")]
    Check { message: String },
}

impl CliError {
    fn from_parse_error(e: smvu_syntax::ParseError, source: Arc<String>, filename: &str) -> Self {
        let span = line_span(&source, e.line());
        CliError::Parse {
            message: e.to_string(),
            src: NamedSource::new(filename, source),
            span,
        }
    }
}

/// Byte span of a 1-indexed source line, for diagnostic labels.
fn line_span(source: &str, line: u32) -> SourceSpan {
    let mut offset = 0usize;
    for (idx, text) in source.lines().enumerate() {
        if idx as u32 + 1 == line {
            return (offset, text.len()).into();
        }
        offset += text.len() + 1;
    }
    (source.len().saturating_sub(1), 0).into()
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "smvu", version)]
#[command(about = "E [ p U q ] model checker for a line-oriented SMV subset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a model file and show a summary
    Parse {
        /// Input file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the parsed model structure
    Dump {
        /// Input file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check the model's property and report the satisfying states
    Check {
        /// Input file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();

    let filter = if matches!(
        &cli.command,
        Commands::Parse { verbose: true, .. } | Commands::Check { verbose: true, .. }
    ) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command {
        Commands::Parse { file, verbose } => cmd_parse(&file, verbose),
        Commands::Dump { file } => cmd_dump(&file),
        Commands::Check { file, verbose } => cmd_check(&file, verbose),
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn load(file: &PathBuf) -> CliResult<(String, Arc<String>)> {
    let filename = file.display().to_string();
    let source = Arc::new(fs::read_to_string(file).map_err(|e| CliError::Io {
        message: e.to_string(),
    })?);
    Ok((filename, source))
}

fn cmd_parse(file: &PathBuf, verbose: bool) -> CliResult<()> {
    let (filename, source) = load(file)?;
    let model =
        parse(&source).map_err(|e| CliError::from_parse_error(e, source.clone(), &filename))?;

    if verbose {
        println!("{:#?}", model);
    } else {
        let transitions: usize = model.states.iter().map(|s| s.transitions.len()).sum();
        println!("{} states, {} transitions", model.states.len(), transitions);
        println!("initial state: {}", model.initial_state().name);
        println!("spec: {}", model.spec);
    }

    println!("parse: ok");
    Ok(())
}

fn cmd_dump(file: &PathBuf) -> CliResult<()> {
    let (filename, source) = load(file)?;
    let model =
        parse(&source).map_err(|e| CliError::from_parse_error(e, source.clone(), &filename))?;
    print!("{}", dump(&model));
    Ok(())
}

fn cmd_check(file: &PathBuf, _verbose: bool) -> CliResult<()> {
    let (filename, source) = load(file)?;

    info!("parsing...");
    let mut model =
        parse(&source).map_err(|e| CliError::from_parse_error(e, source.clone(), &filename))?;

    info!("model checking...");
    let outcome = check(&mut model).map_err(|e| CliError::Check {
        message: e.to_string(),
    })?;

    let holds = model.initial_state().satisfies(EU_LABEL);
    let satisfying = if outcome.satisfying.is_empty() {
        "(none)".to_string()
    } else {
        outcome.satisfying.join(", ")
    };

    println!();
    println!("Result: {}", if holds { "HOLDS" } else { "FAILS" });
    println!("  Initial state: {}", model.initial_state().name);
    println!(
        "  Satisfying states: {} ({})",
        satisfying,
        outcome.satisfying.len()
    );
    println!("  Saturation scans: {}", outcome.scans);

    if !holds {
        std::process::exit(1);
    }
    Ok(())
}
