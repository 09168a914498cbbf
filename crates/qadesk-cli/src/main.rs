mod cli;
mod commands;
mod startup;

use anyhow::Result;
use clap::Parser;
use qadesk_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with answers on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let mut config = Config::load()?;
    startup::apply_overrides(&mut config, &cli.overrides)?;

    match cli.command {
        cli::Commands::Ask { question, json } => {
            commands::ask::handle(&config, question.join(" "), json).await
        }
        cli::Commands::Chat {
            exit_word,
            no_feedback,
        } => {
            if let Some(word) = exit_word {
                config.chat.exit_word = word;
            }
            if no_feedback {
                config.chat.ask_feedback = false;
            }
            commands::chat::handle(&config).await
        }
        cli::Commands::Mask { text, report } => commands::mask::handle(text, report).await,
        cli::Commands::Search { query, limit } => {
            commands::search::handle(&config, query.join(" "), limit).await
        }
        cli::Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            commands::serve::handle(&config, host, port).await
        }
    }
}
