use anyhow::Result;
use clap::Args;
use colored::Colorize;
use delight_core::{
    CancellationToken, ChatRequest, ClientConfig, DelightClient, DelightResult, PollResult,
};

use crate::config::CliConfig;
use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct MessageArgs {
    #[arg(help = "Message text")]
    pub text: String,

    #[arg(short, long, env = "DELIGHT_WEBHOOK_ID", help = "Webhook id of the target agent")]
    pub webhook: String,

    #[arg(long, env = "DELIGHT_USER_ID", help = "Sender id")]
    pub user_id: String,

    #[arg(long, env = "DELIGHT_USERNAME", help = "Sender display name")]
    pub username: String,

    #[arg(long, help = "Use this message id instead of a generated one")]
    pub message_id: Option<String>,
}

impl MessageArgs {
    pub fn to_request(&self) -> ChatRequest {
        let request = ChatRequest::new(
            self.text.clone(),
            self.webhook.clone(),
            self.user_id.clone(),
            self.username.clone(),
        );
        match &self.message_id {
            Some(id) => request.with_message_id(id.clone()),
            None => request,
        }
    }
}

pub async fn handle_send_command(
    config: &CliConfig,
    message: MessageArgs,
    format: &OutputFormat,
) -> Result<()> {
    let client = DelightClient::new(config.client().clone())?;
    let result = client.send_chat(&message.to_request()).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), "Message accepted".green());
            if !result.text.is_empty() {
                println!("  {:<12} {}", "Text:".bold(), result.text);
            }
            println!("  {:<12} {}", "Poll path:".bold(), result.poll_path.yellow());
            if result.should_end_conversation {
                println!("  {}", "The agent ended the conversation".dimmed());
            }
            println!();
            println!(
                "  {} delight poll {}",
                "Next:".dimmed(),
                result.poll_path
            );
        }
    }

    Ok(())
}

pub async fn handle_chat_command(
    config: &CliConfig,
    message: MessageArgs,
    max_attempts: Option<u32>,
    deadline_secs: Option<u64>,
    retry_transient: bool,
    format: &OutputFormat,
) -> Result<()> {
    let client_config =
        chat_client_config(config.client(), max_attempts, deadline_secs, retry_transient)?;
    let client = DelightClient::new(client_config)?;
    let options = client.poll_options();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    if matches!(format, OutputFormat::Text) {
        println!(
            "{} {} {}",
            "→".blue(),
            "Sending to agent".cyan(),
            message.webhook.yellow()
        );
    }

    let result = client
        .send_and_await_reply_with(&message.to_request(), &options, &cancel)
        .await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => print_reply(&result),
    }

    Ok(())
}

/// Layer the `chat` flags over the loaded client config, validated the same
/// way as values from config files.
fn chat_client_config(
    base: &ClientConfig,
    max_attempts: Option<u32>,
    deadline_secs: Option<u64>,
    retry_transient: bool,
) -> DelightResult<ClientConfig> {
    let mut config = base.clone();
    if let Some(attempts) = max_attempts {
        config.max_attempts = attempts;
    }
    if deadline_secs.is_some() {
        config.deadline_secs = deadline_secs;
    }
    if retry_transient {
        config.retry_transient_errors = true;
    }
    config.validate()?;
    Ok(config)
}

pub fn print_reply(result: &PollResult) {
    match result.reply() {
        Some(text) => {
            println!("{} {}", "✓".green().bold(), "Reply".green());
            println!();
            for line in text.lines() {
                println!("  {}", line);
            }
        }
        None if result.completed => {
            println!("{} {}", "✓".green().bold(), "Completed with no text".green());
        }
        None => {
            println!("{} {}", "…".yellow(), "Reply not completed yet".yellow());
            if let Some(ref partial) = result.text {
                println!("  {} {}", "Partial:".dimmed(), partial);
            }
        }
    }
    println!();
    println!("  {} {}", "uuid:".dimmed(), result.uuid);
}
