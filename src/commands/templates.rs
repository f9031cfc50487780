use colored::*;
use eyre::Result;
use std::time::Duration;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::templates::load_templates;
use crate::transport::UreqTransport;

pub fn run(format: OutputFormat, config: &Config) -> Result<()> {
    let credentials = config.resolve_credentials()?.resolve();
    let transport = UreqTransport::new(config.http.timeout_secs.map(Duration::from_secs));
    let options = load_templates(&credentials, &transport);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&options)?),
        OutputFormat::Text => {
            for option in &options {
                if option.value.is_empty() {
                    println!("{} {}", "⚠".yellow(), option.name);
                } else {
                    println!("  {} {}", option.value.cyan(), option.name);
                }
            }
        }
    }

    Ok(())
}
