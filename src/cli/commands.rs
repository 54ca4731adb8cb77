use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `nutrilens` - validates and finalizes AI-generated nutrition UI directives.
#[derive(Parser, Debug)]
#[command(name = "nutrilens")]
#[command(version)]
#[command(about = "Validate and finalize AI-generated nutrition UI directives.", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: ~/.nutrilens/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline over a raw generator candidate and print the result
    Finalize {
        /// Candidate JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Omit the heuristic score
        #[arg(long)]
        no_score: bool,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Print only the heuristic score of a candidate's finalized sequence
    Score {
        /// Candidate JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Re-run a recorded session through the analyzer and pipeline
    Replay {
        /// Session JSON file (`{"turns": [{"request", "response"}]}`), or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Stop with an error at the first failed turn
        #[arg(long)]
        fail_fast: bool,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the schema contract handed to the generator
    Contract,

    /// Start the HTTP gateway
    Serve {
        /// Host to bind to (default: gateway.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: gateway.port, 0 for a random port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
