//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use linkshelf_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
///
/// Tokens are never printed, only whether they are set.
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config = Config::load_with_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "github_username": config.github_username,
                    "github_token_set": config.github_token.is_some(),
                    "github_exclude_repo": config.github_exclude_repo,
                    "vercel_token_set": config.vercel_token.is_some(),
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!(
                "  github_username:     {}",
                config.github_username.as_deref().unwrap_or("(not set)")
            );
            println!("  github_token:        {}", secret(&config.github_token));
            println!(
                "  github_exclude_repo: {}",
                config.github_exclude_repo.as_deref().unwrap_or("(not set)")
            );
            println!("  vercel_token:        {}", secret(&config.vercel_token));
            println!(
                "  log_file:            {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config = Config::load_with_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if is_secret(&key) { "********" } else { value.as_str() };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            if value.trim().is_empty() {
                bail!("data_dir must not be empty");
            }
            config.data_dir = value.into();
        }
        "github_username" => config.github_username = optional(value),
        "github_token" => config.github_token = optional(value),
        "github_exclude_repo" => config.github_exclude_repo = optional(value),
        "vercel_token" => config.vercel_token = optional(value),
        "log_file" if value == "default" => config.log_file = Some(config.default_log_path()),
        "log_file" => config.log_file = optional(value).map(PathBuf::from),
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, github_username, github_token, github_exclude_repo, \
                 vercel_token, log_file",
                key
            );
        }
    }
    Ok(())
}

/// Empty or "none" clears an optional key
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

fn is_secret(key: &str) -> bool {
    key.ends_with("_token")
}

fn secret(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "(set)"
    } else {
        "(not set)"
    }
}
