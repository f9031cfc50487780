use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::operations::{self, Resource};

#[derive(Serialize)]
struct OperationInfo {
    resource: String,
    operation: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
}

pub fn run(resource: Option<&str>, format: OutputFormat) -> Result<()> {
    let resources = match resource {
        Some(name) => vec![name.parse::<Resource>()?],
        None => Resource::ALL.to_vec(),
    };

    let rows: Vec<OperationInfo> = resources
        .iter()
        .flat_map(|r| operations::operations_for(*r))
        .map(|def| OperationInfo {
            resource: def.resource.to_string(),
            operation: def.operation,
            method: def.method,
            path: def.path,
            description: def.description,
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&rows)?),
        OutputFormat::Text => {
            let mut current = String::new();
            for row in &rows {
                if row.resource != current {
                    if !current.is_empty() {
                        println!();
                    }
                    println!("{}", row.resource.bold());
                    current = row.resource.clone();
                }
                println!(
                    "  {:<28} {:<14} {}",
                    row.operation.cyan(),
                    row.method.green(),
                    row.path.dimmed()
                );
                println!("  {:<28} {}", "", row.description);
            }
        }
    }

    Ok(())
}
