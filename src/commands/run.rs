//! Run one operation over a set of input items

use colored::*;
use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{OutputFormat, RunArgs};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::item::{BinaryData, Item, OutputItem, OutputSummary};
use crate::operations::Resource;
use crate::params::{ParameterSet, Parameters};
use crate::transport::UreqTransport;

/// One entry of an `--input` file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InputItem {
    json: Value,
    parameters: Option<Value>,
    binary: IndexMap<String, BinarySource>,
}

#[derive(Debug, Deserialize)]
struct BinarySource {
    path: PathBuf,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

pub fn run(args: RunArgs, quiet: bool, config: &Config) -> Result<()> {
    let resource: Resource = args.resource.parse()?;
    let format = OutputFormat::resolve(args.format);

    let mut shared = match &args.params {
        Some(path) => Parameters::from_value(load_document(path)?)
            .context(format!("Invalid parameters in {}", path.display()))?,
        None => Parameters::new(),
    };
    for pair in &args.param {
        let (name, value) = parse_param(pair)?;
        shared.set(name, value);
    }

    let (mut items, per_item) = match &args.input {
        Some(path) => load_items(path)?,
        None => (vec![Item::default()], Vec::new()),
    };
    for spec in &args.binary {
        let (property, path) = spec
            .split_once('=')
            .ok_or_else(|| eyre::eyre!("Invalid --binary '{}': expected PROPERTY=PATH", spec))?;
        let data = read_binary(Path::new(path), None, None)?;
        for item in &mut items {
            item.binary.insert(property.to_string(), data.clone());
        }
    }

    let params = ParameterSet { shared, per_item };
    let credentials = config.resolve_credentials()?.resolve();
    let transport = UreqTransport::new(config.http.timeout_secs.map(Duration::from_secs));
    let continue_on_fail = args.continue_on_fail || config.execution.continue_on_fail;

    log::info!(
        "run {}/{} against {} ({} item(s), continue_on_fail={})",
        resource,
        args.operation,
        credentials.base_url,
        items.len(),
        continue_on_fail
    );

    let records = Dispatcher::new(credentials, &transport)
        .continue_on_fail(continue_on_fail)
        .execute(resource, &args.operation, &params, &items)
        .inspect_err(|e| {
            eprintln!("{} {}", "✗".red(), e.message);
            eprintln!("  {} (item {})", e.description.dimmed(), e.item_index);
        })?;

    let failed = records.iter().filter(|r| r.is_error()).count();
    if failed > 0 {
        log::warn!("{} of {} record(s) are errors", failed, records.len());
    }

    let output_dir = Config::expand_path(args.output_dir.as_ref().unwrap_or(&config.execution.output_dir));
    let summaries = records
        .iter()
        .map(|record| {
            let written = write_binary(record, &output_dir)?;
            Ok(record.summary(written.map(|p| p.display().to_string())))
        })
        .collect::<Result<Vec<_>>>()?;

    print_records(&summaries, format, quiet)
}

/// Split `key=value`; the value is JSON when it parses, else a plain string
fn parse_param(pair: &str) -> Result<(String, Value)> {
    let (name, raw) = pair
        .split_once('=')
        .ok_or_else(|| eyre::eyre!("Invalid --param '{}': expected KEY=VALUE", pair))?;
    if name.is_empty() {
        eyre::bail!("Invalid --param '{}': empty key", pair);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

/// Read a YAML or JSON file into a JSON value
fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).context(format!("Failed to parse {}", path.display()))
}

fn load_items(path: &Path) -> Result<(Vec<Item>, Vec<Parameters>)> {
    let entries: Vec<InputItem> = serde_json::from_value(load_document(path)?)
        .context(format!("{} must contain a list of items", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut items = Vec::with_capacity(entries.len());
    let mut per_item = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let mut item = Item::new(entry.json);
        for (property, source) in entry.binary {
            let path = Config::expand_path(&source.path);
            let path = if path.is_relative() { base.join(path) } else { path };
            item.binary.insert(property, read_binary(&path, source.file_name, source.mime_type)?);
        }
        let overrides = Parameters::from_value(entry.parameters.unwrap_or(Value::Null))
            .context(format!("Invalid parameters for item {}", index))?;
        items.push(item);
        per_item.push(overrides);
    }

    log::debug!("Loaded {} item(s) from {}", items.len(), path.display());
    Ok((items, per_item))
}

fn read_binary(path: &Path, file_name: Option<String>, mime_type: Option<String>) -> Result<BinaryData> {
    let data = fs::read(path).context(format!("Failed to read binary file {}", path.display()))?;
    let file_name = file_name.or_else(|| path.file_name().map(|n| n.to_string_lossy().to_string()));
    let mime_type = mime_type.or_else(|| guess_mime(path).map(str::to_string));

    let mut binary = BinaryData::new(data);
    binary.file_name = file_name;
    binary.mime_type = mime_type;
    Ok(binary)
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

/// Write a record's attachment into `dir`, returning the written path
fn write_binary(record: &OutputItem, dir: &Path) -> Result<Option<PathBuf>> {
    let Some((property, binary)) = &record.binary else {
        return Ok(None);
    };

    // Only the final component of a server-provided name is trusted
    let name = binary
        .file_name
        .as_deref()
        .and_then(|n| Path::new(n).file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("{}.bin", property));

    fs::create_dir_all(dir).context(format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, &binary.data).context(format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} bytes to {}", binary.data.len(), path.display());
    Ok(Some(path))
}

fn print_records(summaries: &[OutputSummary], format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summaries)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(summaries)?),
        OutputFormat::Text => {
            for (index, summary) in summaries.iter().enumerate() {
                if summary.failed {
                    println!("{} [{}] {}", "✗".red(), index, summary.json["error"].as_str().unwrap_or_default());
                    continue;
                }
                println!("{} [{}]", "✓".green(), index);
                if !quiet {
                    println!("{}", serde_json::to_string_pretty(&summary.json)?);
                }
                if let Some(binary) = &summary.binary {
                    println!(
                        "  {} {} ({} bytes) → {}",
                        "→".blue(),
                        binary.property.cyan(),
                        binary.size,
                        binary.path.as_deref().unwrap_or("-")
                    );
                }
            }
            if summaries.is_empty() && !quiet {
                println!("{} No records returned", "⚠".yellow());
            }
        }
    }
    Ok(())
}
