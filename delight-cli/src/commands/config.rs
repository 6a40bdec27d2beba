use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use delight_core::{ensure_config_dir, get_config_paths, DelightConfig};
use std::path::{Path, PathBuf};

use crate::config::CliConfig;
use crate::output::{kv_table, print_json, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    #[command(about = "Show the effective configuration")]
    Show,

    #[command(about = "Write a default config.toml to the user config directory")]
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,

        #[arg(long, help = "Write to this path instead")]
        path: Option<PathBuf>,
    },

    #[command(about = "List the config file locations that are searched")]
    Path,
}

pub fn handle_config_command(
    config: &CliConfig,
    action: Option<ConfigCommand>,
    format: &OutputFormat,
) -> Result<()> {
    match action {
        Some(ConfigCommand::Show) | None => cmd_config_show(config, format),
        Some(ConfigCommand::Init { force, path }) => cmd_config_init(force, path),
        Some(ConfigCommand::Path) => cmd_config_path(),
    }
}

fn cmd_config_show(config: &CliConfig, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&config.inner),
        OutputFormat::Text => {
            let value = serde_json::to_value(&config.inner)?;
            println!("{}", "Delight Configuration".cyan().bold());
            println!("{}", kv_table(&value));
        }
    }
    Ok(())
}

fn cmd_config_init(force: bool, path: Option<PathBuf>) -> Result<()> {
    let target = match path {
        Some(p) => p,
        None => ensure_config_dir()?.join("config.toml"),
    };

    write_default_config(&target, force)?;

    println!(
        "{} Wrote default configuration to {}",
        "✓".green().bold(),
        target.display().to_string().yellow()
    );
    Ok(())
}

fn cmd_config_path() -> Result<()> {
    println!("{}", "Config files (later entries win)".cyan().bold());
    for path in get_config_paths() {
        let marker = if path.exists() {
            "✓".green()
        } else {
            "·".dimmed()
        };
        println!("  {} {}", marker, path.display());
    }
    Ok(())
}

pub fn write_default_config(target: &Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }

    let text = toml::to_string_pretty(&DelightConfig::default())
        .context("Failed to render default configuration")?;
    std::fs::write(target, text)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config.toml");

        write_default_config(&target, false).unwrap();
        let text = std::fs::read_to_string(&target).unwrap();
        assert!(text.contains("[client]"));
        assert!(text.contains("base_url = \"https://qa.delight.global\""));
        assert!(text.contains("max_attempts = 30"));

        let parsed: DelightConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.client, DelightConfig::default().client);
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config.toml");
        std::fs::write(&target, "# mine").unwrap();

        assert!(write_default_config(&target, false).is_err());
        assert!(write_default_config(&target, true).is_ok());
    }
}
