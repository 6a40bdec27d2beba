use anyhow::Result;
use colored::Colorize;
use delight_core::DelightClient;

use super::chat::print_reply;
use crate::config::CliConfig;
use crate::output::{print_json, OutputFormat};

pub async fn handle_poll_command(
    config: &CliConfig,
    poll_path: &str,
    max_attempts: Option<u32>,
    once: bool,
    format: &OutputFormat,
) -> Result<()> {
    let client = DelightClient::new(config.client().clone())?;

    let result = if once {
        client.poll_once(poll_path).await?
    } else {
        let attempts = max_attempts.unwrap_or(config.client().max_attempts);
        if matches!(format, OutputFormat::Text) {
            println!(
                "{} {} {} {}",
                "→".blue(),
                "Polling".cyan(),
                poll_path.yellow(),
                format!("(up to {} attempts)", attempts).dimmed()
            );
        }
        client.poll(poll_path, attempts).await?
    };

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => print_reply(&result),
    }

    Ok(())
}
