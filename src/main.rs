//! CLI entry point for `sqlnorm`.

use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use sqlnorm::normalizer::{NormalizeOptions, Normalizer, Numbering};
use sqlnorm::output::{self, NormalizedInput, OutputFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sqlnorm",
    about = "Replace literal constants in PostgreSQL statements with positional placeholders"
)]
struct Cli {
    /// Input SQL files (stdin when omitted)
    input: Vec<PathBuf>,

    /// JSON file with normalizer options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Placeholder numbering scope: per-statement or script
    #[arg(long)]
    numbering: Option<Numbering>,

    /// Reuse SELECT target placeholders in matching GROUP BY elements
    #[arg(long)]
    match_group_by: bool,

    /// Leave function, procedure and DO bodies untouched
    #[arg(long)]
    keep_routine_bodies: bool,

    /// Treat every non-empty line as an independent query
    #[arg(long)]
    per_line: bool,

    /// Output format: text, json or markdown
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Options: config file first, flags on top.
    let mut options = match &cli.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => match NormalizeOptions::from_json(&content) {
                Ok(options) => options,
                Err(e) => {
                    eprintln!("Error parsing config {}: {e}", path.display());
                    process::exit(2);
                }
            },
            Err(e) => {
                eprintln!("Error reading config {}: {e}", path.display());
                process::exit(2);
            }
        },
        None => NormalizeOptions::default(),
    };
    if let Some(numbering) = cli.numbering {
        options.numbering = numbering;
    }
    options.match_group_by_targets |= cli.match_group_by;
    options.keep_routine_bodies |= cli.keep_routine_bodies;
    let normalizer = Normalizer::new(options);

    let sources = match read_sources(&cli.input) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let results = if cli.per_line {
        normalize_lines(&normalizer, &sources)
    } else {
        let mut results = Vec::with_capacity(sources.len());
        for (label, sql) in &sources {
            let result = normalizer.normalize_detailed(sql);
            if let Err(e) = &result {
                eprintln!("{label}: {e}");
                process::exit(2);
            }
            results.push(NormalizedInput::new(label.clone(), result));
        }
        results
    };

    if cli.verbose {
        for input in &results {
            if let Some(normalization) = &input.normalization {
                eprintln!(
                    "{}: {} statements, {} substitutions",
                    input.label,
                    normalization.statements.len(),
                    normalization.substitution_count()
                );
            }
        }
    }

    let rendered = match output::render(cli.format, &results) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error rendering output: {e}");
            process::exit(2);
        }
    };
    match &cli.output {
        Some(path) => {
            if let Err(e) = output::write_output(path, &rendered) {
                eprintln!("Error writing output: {e}");
                process::exit(2);
            }
        }
        None => print!("{rendered}"),
    }

    let failed: Vec<&NormalizedInput> = results.iter().filter(|r| r.is_error()).collect();
    if !failed.is_empty() {
        for input in &failed {
            if let Some(error) = &input.error {
                eprintln!("{}: {error}", input.label);
            }
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SQLNORM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "sqlnorm=debug" } else { "sqlnorm=warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `(label, text)` for every input file, or for stdin when none is given.
fn read_sources(paths: &[PathBuf]) -> Result<Vec<(String, String)>, String> {
    if paths.is_empty() {
        let mut sql = String::new();
        std::io::stdin()
            .read_to_string(&mut sql)
            .map_err(|e| format!("Error reading stdin: {e}"))?;
        return Ok(vec![("<stdin>".to_string(), sql)]);
    }
    paths
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .map(|sql| (path.display().to_string(), sql))
                .map_err(|e| format!("Error reading {}: {e}", path.display()))
        })
        .collect()
}

/// Normalize every non-blank line of every source in parallel.
fn normalize_lines(normalizer: &Normalizer, sources: &[(String, String)]) -> Vec<NormalizedInput> {
    let lines: Vec<(String, &str)> = sources
        .iter()
        .flat_map(|(label, sql)| {
            sql.lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(move |(idx, line)| (format!("{label}:{}", idx + 1), line))
        })
        .collect();
    let texts: Vec<&str> = lines.iter().map(|(_, line)| *line).collect();
    normalizer
        .normalize_batch_detailed(&texts)
        .into_iter()
        .zip(lines)
        .map(|(result, (label, _))| NormalizedInput::new(label, result))
        .collect()
}
