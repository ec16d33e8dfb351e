//! Readmark CLI - Reading progress for EPUB books

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a per-page or per-minute character rate (must be at least 1)
fn parse_rate(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("rate must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a percentage between 0 and 100
fn parse_percent(s: &str) -> Result<f64, String> {
    let n: f64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if (0.0..=100.0).contains(&n) {
        Ok(n)
    } else {
        Err("percent must be between 0 and 100".to_string())
    }
}

#[derive(Parser)]
#[command(name = "readmark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show reading progress for one or more CFI locations
    Progress {
        /// EPUB file path
        input: String,

        /// CFI locations, e.g. "epubcfi(/6/4!/4/2/1:0)"
        #[arg(required = true)]
        locations: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Characters per virtual page
        #[arg(long, value_parser = parse_rate)]
        chars_per_page: Option<usize>,

        /// Characters read per minute
        #[arg(long, value_parser = parse_rate)]
        chars_per_minute: Option<usize>,
    },

    /// Show the character weight of each linear section
    Spine {
        /// EPUB file path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the CFI found at a percentage of a section's text
    Locate {
        /// EPUB file path
        input: String,

        /// Spine index of the section
        section: usize,

        /// Percentage of the section's text (0-100)
        #[arg(value_parser = parse_percent)]
        percent: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "readmark_cli=debug,readmark_core=debug"
    } else {
        "readmark_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Progress {
            input,
            locations,
            json,
            chars_per_page,
            chars_per_minute,
        } => {
            let rates = commands::Rates {
                chars_per_page,
                chars_per_minute,
            };
            commands::progress(&input, &locations, rates, json).await
        }

        Commands::Spine { input, json } => commands::spine(&input, json).await,

        Commands::Locate {
            input,
            section,
            percent,
        } => commands::locate(&input, section, percent).await,
    }
}
