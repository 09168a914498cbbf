use anyhow::Result;
use qadesk_config::{ChatConfig, Config};
use qadesk_engine::{QaService, ResponseKind};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::startup;

const QUESTION_PROMPT: &str = "Ask your API-related question: ";
const FEEDBACK_PROMPT: &str = "Was this helpful? Leave feedback or press Enter to skip: ";

pub async fn handle(config: &Config) -> Result<()> {
    let service = startup::build_service(config).await?;

    println!(
        "Loaded {} questions. Type '{}' to quit.",
        service.dataset().len(),
        config.chat.exit_word
    );

    let stdin = BufReader::new(tokio::io::stdin());
    run(&service, &config.chat, stdin, tokio::io::stdout()).await
}

/// Question loop until the exit word or end of input
async fn run<R, W>(service: &QaService, chat: &ChatConfig, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        writer.write_all(QUESTION_PROMPT.as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.eq_ignore_ascii_case(&chat.exit_word) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let response = service.respond(query);
        writer.write_all(format!("{}\n", response.text).as_bytes()).await?;

        if chat.ask_feedback && response.kind == ResponseKind::Answered {
            writer.write_all(FEEDBACK_PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(feedback) = lines.next_line().await? else {
                break;
            };
            let feedback = feedback.trim();
            if !feedback.is_empty() {
                if let Err(e) = service.record_feedback(query, feedback) {
                    warn!(error = %e, "could not record feedback");
                }
            }
        }
    }

    writer.write_all(b"Goodbye!\n").await?;
    writer.flush().await?;
    Ok(())
}
