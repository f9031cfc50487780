//! Diagnose AllSign setup issues

use colored::*;
use eyre::Result;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::credentials::Endpoint;
use crate::templates::test_credentials;
use crate::transport::UreqTransport;

pub fn run(offline: bool, verbose: bool, config: &Config) -> Result<()> {
    println!("{}", "AllSign Doctor".bold());
    println!("{}", "═".repeat(50));
    println!();

    let mut issues = 0;

    // Config file
    match config_file(config) {
        Ok(path) => println!("{} Config file: {}", "✓".green(), path.display()),
        Err(expected) => {
            println!("{} Config file missing: {} (using defaults)", "⚠".yellow(), expected.display());
            println!("  Run {} to create it", "allsign config set credentials.api_key <key>".cyan());
        }
    }

    // Endpoint
    let endpoint = Endpoint::from_config(&config.credentials);
    let source = match &endpoint {
        Endpoint::Literal(_) => "base_url".to_string(),
        Endpoint::Environment(env) => format!("environment: {}", env),
    };
    println!("{} Endpoint: {} ({})", "✓".green(), endpoint.base_url(), source.dimmed());

    // API key
    let has_key = config.api_key().is_some();
    if has_key {
        let from_env = std::env::var("ALLSIGN_API_KEY").is_ok_and(|k| !k.trim().is_empty());
        println!(
            "{} API key configured (from {})",
            "✓".green(),
            if from_env { "ALLSIGN_API_KEY" } else { "config" }
        );
    } else {
        println!("{} No API key configured", "✗".red());
        println!("  Set {} or run {}", "ALLSIGN_API_KEY".cyan(), "allsign config set credentials.api_key <key>".cyan());
        issues += 1;
    }

    // Output directory
    let output_dir = Config::expand_path(&config.execution.output_dir);
    if output_dir.is_dir() {
        println!("{} Output directory: {}", "✓".green(), output_dir.display());
    } else {
        println!("{} Output directory missing: {} (created on first download)", "⚠".yellow(), output_dir.display());
    }

    println!();

    // Credential test
    println!("{}", "Connectivity:".bold());
    if offline {
        println!("  {} Skipped (--offline)", "⚠".yellow());
    } else if has_key {
        let credentials = config.resolve_credentials()?.resolve();
        let transport = UreqTransport::new(Some(Duration::from_secs(config.http.timeout_secs.unwrap_or(10))));
        match test_credentials(&credentials, &transport) {
            Ok(body) => {
                println!("  {} Credential test passed", "✓".green());
                if verbose {
                    println!("    {}", body.to_string().dimmed());
                }
            }
            Err(err) => {
                let status = err
                    .status()
                    .map(|s| format!("HTTP {}", s))
                    .unwrap_or_else(|| "no response".to_string());
                println!("  {} Credential test failed: {} ({})", "✗".red(), err.best_message(), status);
                issues += 1;
            }
        }
    } else {
        println!("  {} Skipped (no API key)", "⚠".yellow());
    }

    println!();

    if issues == 0 {
        println!("{} No issues found", "✓".green());
    } else {
        println!("{} {} issue(s) found", "✗".red(), issues);
    }

    Ok(())
}

/// The file the config was loaded from, or where one would be created
fn config_file(config: &Config) -> Result<PathBuf, PathBuf> {
    config
        .source
        .clone()
        .ok_or_else(|| Config::allsign_dir().join("allsign.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_config_file_reports_loaded_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("custom.yaml");
        fs::write(&path, "log_level: warn\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config_file(&config), Ok(path));
    }

    #[test]
    fn test_config_file_missing_on_defaults() {
        let expected = config_file(&Config::default()).unwrap_err();
        assert!(expected.ends_with("allsign.yaml"));
    }
}
