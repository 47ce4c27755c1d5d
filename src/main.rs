use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edscope::config::{self, OutputFormat};
use edscope::core::{self, DiffFile, DiffParser};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edscope")]
#[command(about = "Parse normal (ed-style) diff output into structured per-line changes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    output_format: Option<OutputFormat>,

    #[arg(
        short,
        long,
        global = true,
        help = "Output file path (prints to stdout if not provided)"
    )]
    output: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Parse a diff and print its hunks")]
    Parse {
        #[arg(long, help = "Path to diff file (reads from stdin if not provided)")]
        diff: Option<PathBuf>,
    },
    #[command(about = "Print insertion/deletion counts for a diff")]
    Stats {
        #[arg(long, help = "Path to diff file (reads from stdin if not provided)")]
        diff: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::Config::load().unwrap_or_default();
    config.merge_with_cli(cli.output_format, cli.verbose);

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse { diff } => {
            let parsed = load_diff(diff)?;
            let output = match config.output_format {
                OutputFormat::Json => serde_json::to_string_pretty(&parsed)?,
                OutputFormat::Normal => core::render::to_normal_diff(&parsed),
                OutputFormat::Markdown => core::render::to_markdown(&parsed),
            };
            write_output(&output, cli.output)?;
        }
        Commands::Stats { diff } => {
            let stats = load_diff(diff)?.stats();
            let output = match config.output_format {
                OutputFormat::Json => serde_json::to_string_pretty(&stats)?,
                OutputFormat::Normal => stats.summary(),
                OutputFormat::Markdown => format!(
                    "| Hunks | Insertions | Deletions |\n|---|---|---|\n| {} | {} | {} |",
                    stats.hunks, stats.added, stats.removed
                ),
            };
            write_output(&output, cli.output)?;
        }
    }

    Ok(())
}

fn load_diff(diff_path: Option<PathBuf>) -> Result<DiffFile> {
    let parsed = if let Some(path) = diff_path {
        info!("Parsing diff file: {}", path.display());
        DiffParser::parse_diff_file(&path)?
    } else if std::io::stdin().is_terminal() {
        anyhow::bail!("No diff provided: pass --diff <FILE> or pipe diff text on stdin");
    } else {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read diff from stdin")?;
        DiffParser::parse_diff(&buffer)?
    };

    info!("Parsed {} hunks", parsed.hunks.len());
    Ok(parsed)
}

fn write_output(output: &str, output_path: Option<PathBuf>) -> Result<()> {
    if let Some(path) = output_path {
        std::fs::write(&path, output)
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
    } else {
        println!("{}", output);
    }

    Ok(())
}
