use clap::{Parser, Subcommand};
use colored::Colorize;
use delight_core::{CliErrorDisplay, DelightError};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{
    handle_chat_command, handle_config_command, handle_poll_command, handle_send_command,
    ConfigCommand, MessageArgs,
};
use config::CliConfig;
use output::OutputFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "delight")]
#[command(version = VERSION)]
#[command(about = "Delight - talk to a conversational agent from the terminal")]
#[command(long_about = r#"
Delight sends a chat message to an agent's webhook and polls until the
agent's reply is ready.

Use 'delight chat --webhook <ID> --user-id <ID> --username <NAME> "Hello"'
for a full round trip, or 'delight send' and 'delight poll' to drive the two
phases separately.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, env = "DELIGHT_BASE_URL", help = "Override the API base URL")]
    base_url: Option<String>,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Submit a chat message without waiting for the reply")]
    Send {
        #[command(flatten)]
        message: MessageArgs,
    },

    #[command(about = "Poll a reply by its poll path")]
    Poll {
        #[arg(help = "Poll path returned by 'delight send'")]
        poll_path: String,

        #[arg(short, long, help = "Number of poll attempts (defaults to config)")]
        max_attempts: Option<u32>,

        #[arg(long, help = "Fetch once and print whatever the server has")]
        once: bool,
    },

    #[command(about = "Send a message and wait for the agent's reply")]
    Chat {
        #[command(flatten)]
        message: MessageArgs,

        #[arg(short, long, help = "Number of poll attempts (defaults to config)")]
        max_attempts: Option<u32>,

        #[arg(long, help = "Give up waiting after this many seconds")]
        deadline_secs: Option<u64>,

        #[arg(long, help = "Keep polling through connection errors and timeouts")]
        retry_transient: bool,
    },

    #[command(about = "Inspect or initialize configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommand>,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.base_url.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(&e));
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose, &config);

    match run(cli, config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<DelightError>() {
                Some(err) => eprintln!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(err)),
                None => eprintln!("{}: {}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, config: &CliConfig) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.inner.log_level()))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    if config.inner.logging.json_format {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

async fn run(cli: Cli, config: CliConfig) -> anyhow::Result<()> {
    debug!(base_url = %config.base_url(), format = ?cli.format, "Dispatching command");

    match cli.command {
        Commands::Send { message } => handle_send_command(&config, message, &cli.format).await,
        Commands::Poll {
            poll_path,
            max_attempts,
            once,
        } => handle_poll_command(&config, &poll_path, max_attempts, once, &cli.format).await,
        Commands::Chat {
            message,
            max_attempts,
            deadline_secs,
            retry_transient,
        } => {
            handle_chat_command(
                &config,
                message,
                max_attempts,
                deadline_secs,
                retry_transient,
                &cli.format,
            )
            .await
        }
        Commands::Config { action } => handle_config_command(&config, action, &cli.format),
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Delight Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!("  {:<15} {}", "Default API:".bold(), delight_core::DEFAULT_BASE_URL);
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("delight {}", VERSION);
    }

    Ok(())
}
