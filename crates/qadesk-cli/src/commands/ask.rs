use anyhow::Result;
use qadesk_config::Config;

use crate::startup;

pub async fn handle(config: &Config, question: String, json: bool) -> Result<()> {
    let service = startup::build_service(config).await?;
    let response = service.respond(&question);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.text);
    }

    Ok(())
}
