use aln_cli::commands;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "aln")]
#[command(about = "ALN - Framing toolkit for noisy serial and radio links", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode packets described in JSON into wire frames
    Pack {
        /// Input JSON file (array of packet specs)
        #[arg(short, long)]
        input: String,

        /// Output file for the encoded frames
        #[arg(short, long)]
        output: String,

        /// Framing parameters as JSON
        #[arg(long)]
        config: Option<String>,
    },

    /// Parse a capture and recover packets
    Scan {
        /// Input file to scan ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output JSON file for recovered packets
        #[arg(short, long)]
        output: Option<String>,

        /// Show statistics only
        #[arg(long)]
        stats_only: bool,

        /// Feed the parser in chunks of this many bytes
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Framing parameters as JSON
        #[arg(long)]
        config: Option<String>,
    },

    /// Report every dropped frame in a capture
    Verify {
        /// Input file to verify ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Framing parameters as JSON
        #[arg(long)]
        config: Option<String>,
    },

    /// Encode or decode a control word
    Fec {
        /// Control word (or flags with --encode), hex or decimal
        #[arg(short, long)]
        word: String,

        /// Treat the value as flags and print the protected word
        #[arg(long)]
        encode: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Pack {
            input,
            output,
            config,
        } => commands::pack::execute(&input, &output, config.as_deref()),

        Commands::Scan {
            input,
            output,
            stats_only,
            chunk_size,
            config,
        } => commands::scan::execute(
            &input,
            output.as_deref(),
            stats_only,
            chunk_size,
            config.as_deref(),
        ),

        Commands::Verify { input, config } => {
            commands::verify::execute(&input, config.as_deref()).map(|_| ())
        }

        Commands::Fec { word, encode } => commands::fec::execute(&word, encode),
    }
}
