use clap::{Args, Parser, Subcommand};
use qadesk_core::DatasetFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qadesk")]
#[command(about = "Answer API support questions from a curated Q&A dataset", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that take precedence over the config file
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Q&A dataset to load
    #[arg(long, global = true, env = "QADESK_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Dataset format: text or json (default: inferred from the extension)
    #[arg(long, global = true)]
    pub format: Option<DatasetFormat>,

    /// Minimum similarity for an answer to be returned (default from config: 0.3)
    #[arg(long, global = true)]
    pub threshold: Option<f64>,

    /// Directory for the audit, error and feedback logs
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive question loop
    Chat {
        /// Word that ends the session (default from config: exit)
        #[arg(long)]
        exit_word: Option<String>,

        /// Do not ask for feedback after each answer
        #[arg(long)]
        no_feedback: bool,
    },

    /// Mask sensitive data in text (reads stdin when no text is given)
    Mask {
        /// Text to mask
        text: Vec<String>,

        /// Print per-category redaction counts
        #[arg(long)]
        report: bool,
    },

    /// Show the stored questions most similar to a query
    Search {
        /// The query to rank questions against
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of results to show
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Start the HTTP server
    Serve {
        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,
    },
}
