use colored::*;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config_path: Option<&PathBuf>, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => {
            let path = config_path
                .cloned()
                .or_else(|| config.source.clone())
                .unwrap_or_else(|| Config::allsign_dir().join("allsign.yaml"));
            set(&key, &value, config, &path)
        }
    }
}

/// Config with the API key masked for display
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    shown.credentials.api_key = shown.credentials.api_key.as_deref().map(mask);
    shown
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    let shown = redacted(config);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&shown)?);
        }
        OutputFormat::Text => {
            println!("{}", "AllSign Configuration".bold());
            println!();

            println!("log_level: {}", shown.log_level.as_filter());
            println!();

            println!("{}:", "credentials".cyan());
            println!("  api_key: {}", shown.credentials.api_key.as_deref().unwrap_or("(not set)"));
            println!("  base_url: {}", shown.credentials.base_url.as_deref().unwrap_or("(not set)"));
            println!(
                "  environment: {}",
                shown
                    .credentials
                    .environment
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();

            println!("{}:", "execution".cyan());
            println!("  continue_on_fail: {}", shown.execution.continue_on_fail);
            println!("  output_dir: {}", shown.execution.output_dir.display());
            println!();

            println!("{}:", "http".cyan());
            println!(
                "  timeout_secs: {}",
                shown
                    .http
                    .timeout_secs
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            );
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    let unset = String::new;
    match key {
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        "credentials.api_key" => Some(config.credentials.api_key.as_deref().map(mask).unwrap_or_else(unset)),
        "credentials.base_url" => Some(config.credentials.base_url.clone().unwrap_or_else(unset)),
        "credentials.environment" => Some(
            config
                .credentials
                .environment
                .map(|e| e.to_string())
                .unwrap_or_else(unset),
        ),
        "execution.continue_on_fail" => Some(config.execution.continue_on_fail.to_string()),
        "execution.output_dir" => Some(config.execution.output_dir.display().to_string()),
        "http.timeout_secs" => Some(config.http.timeout_secs.map(|t| t.to_string()).unwrap_or_else(unset)),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn apply(key: &str, value: &str, config: &mut Config) -> Result<()> {
    let optional = |v: &str| if v.is_empty() { None } else { Some(v.to_string()) };

    match key {
        "log_level" | "log-level" => config.log_level = value.parse()?,
        "credentials.api_key" => config.credentials.api_key = optional(value),
        "credentials.base_url" => config.credentials.base_url = optional(value),
        "credentials.environment" => {
            config.credentials.environment = if value.is_empty() { None } else { Some(value.parse()?) };
        }
        "execution.continue_on_fail" => {
            config.execution.continue_on_fail =
                value.parse().context("Invalid boolean value (use 'true' or 'false')")?;
        }
        "execution.output_dir" => config.execution.output_dir = value.into(),
        "http.timeout_secs" => {
            config.http.timeout_secs = if value.is_empty() {
                None
            } else {
                Some(value.parse().context("Invalid timeout (use a whole number of seconds)")?)
            };
        }
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }
    Ok(())
}

fn set(key: &str, value: &str, config: &Config, config_path: &Path) -> Result<()> {
    let display_value = if key == "credentials.api_key" { mask(value) } else { value.to_string() };
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), display_value.green());

    let mut new_config = config.clone();
    apply(key, value, &mut new_config)?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml_str = serde_yaml::to_string(&new_config).context("Failed to serialize config")?;
    fs::write(config_path, yaml_str).context("Failed to write config file")?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}
