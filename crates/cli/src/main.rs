mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// FDS assembly-group preprocessor.
#[derive(Parser)]
#[command(name = "blockaid", version, about = "FDS assembly-group preprocessor")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file overriding the default limits
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand every top-level &GRP record of an input file
    Expand {
        /// Path to the .fds input file
        file: PathBuf,
        /// Write the expanded file here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the bounding box of every assembly without expanding
    Bounds {
        /// Path to the .fds input file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = match cli.config.as_deref().map(config::read_config).transpose() {
        Ok(cfg) => cfg.unwrap_or_default(),
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Expand { file, out } => {
            commands::expand::cmd_expand(&file, out.as_deref(), &config, cli.output, cli.quiet);
        }
        Commands::Bounds { file } => {
            commands::bounds::cmd_bounds(&file, &config, cli.output, cli.quiet);
        }
    }
}

/// Log to stderr, filtered by `BLOCKAID_LOG`.
fn init_logging(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_env("BLOCKAID_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Report an error message in the appropriate format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
