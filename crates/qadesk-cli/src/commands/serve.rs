use anyhow::Result;
use qadesk_config::Config;
use qadesk_server::QaServer;
use std::sync::Arc;

use crate::startup;

pub async fn handle(config: &Config, host: String, port: u16) -> Result<()> {
    let service = Arc::new(startup::build_service(config).await?);

    println!("Starting qadesk server on {}:{}", host, port);
    QaServer::serve(service, &host, port).await?;

    Ok(())
}
