use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "allsign",
    about = "AllSign e-signature API connector",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/allsign/logs/allsign.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to allsign.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an operation against the AllSign API
    Run(RunArgs),

    /// List supported resources and operations
    Operations {
        /// Only show operations for this resource
        #[arg(long, short = 'r')]
        resource: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// List document templates available to the account
    Templates {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Diagnose configuration and test credentials
    Doctor {
        /// Skip the credential test request
        #[arg(long)]
        offline: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Resource (document, signer, signatureField, signature, folder, contact)
    pub resource: String,

    /// Operation (e.g. create, getAll, download)
    pub operation: String,

    /// YAML or JSON file with shared parameters
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Single parameter as key=value (value parsed as JSON when possible)
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub param: Vec<String>,

    /// YAML or JSON file with the input items
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Attach a file to every item as PROPERTY=PATH
    #[arg(long, short = 'b', value_name = "PROPERTY=PATH")]
    pub binary: Vec<String>,

    /// Emit {error} records instead of aborting on the first failure
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Directory for downloaded files (default from config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format (default: text for TTY, json for pipes)
    #[arg(long, short = 'o', value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (dot notation)
        key: String,

        /// Value to set
        value: String,
    },
}
