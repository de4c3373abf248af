//! Toolchain configuration CLI.
//!
//! ```text
//! toolchain.toml / toolchain.json
//!     → config::loader (parse, validate)
//!     → RootConfig
//!     → validate | show | networks | probe <name>
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use chain_toolchain_config::blockchain::probe_network;
use chain_toolchain_config::config::{Format, LoadOptions, RootConfig};
use chain_toolchain_config::observability::{init_logging, LogFormat};
use chain_toolchain_config::{load_config_with, ConfigError};

#[derive(Parser)]
#[command(name = "chain-config")]
#[command(about = "Validate and inspect smart-contract toolchain configuration", long_about = None)]
struct Cli {
    /// Configuration document (.toml or .json).
    #[arg(short, long, default_value = "toolchain.toml")]
    config: PathBuf,

    /// Reject unknown keys instead of preserving them.
    #[arg(long)]
    strict: bool,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format (pretty or json).
    #[arg(long, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the document and report whether it is valid
    Validate,
    /// Print the normalized document
    Show {
        /// Output format (toml or json).
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// List configured networks
    Networks,
    /// Dial a network's endpoint and check its chain id
    Probe {
        /// Network profile name.
        name: String,

        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format)?;

    let options = LoadOptions { strict: cli.strict };
    let config = match load_config_with(&cli.config, options) {
        Ok(config) => config,
        Err(e) => {
            print_load_error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    match cli.command {
        Commands::Validate => {
            println!(
                "{}: ok ({} networks, {} {})",
                cli.config.display(),
                config.networks().len(),
                config.compiler().name(),
                config.compiler().version()
            );
        }
        Commands::Show { format } => {
            let format = match format.to_ascii_lowercase().as_str() {
                "toml" => Format::Toml,
                "json" => Format::Json,
                other => {
                    eprintln!("Error: unknown output format '{}', expected toml or json", other);
                    return Ok(ExitCode::FAILURE);
                }
            };
            match config.to_document(format) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Networks => print_networks(&config),
        Commands::Probe { name, timeout_secs } => {
            let Some(profile) = config.network(&name) else {
                eprintln!("Error: no network named '{}'", name);
                return Ok(ExitCode::FAILURE);
            };

            let report = match probe_network(profile, Duration::from_secs(timeout_secs)).await {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            };

            println!(
                "{} {} chain_id={} block={}",
                report.network, report.endpoint, report.chain_id.0, report.block_number
            );
            if let Err(e) = report.ensure_accepted() {
                eprintln!("Error: {}", e);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_load_error(err: &ConfigError) {
    match err {
        ConfigError::Validation(errors) => {
            eprintln!("Error: configuration is invalid");
            for e in errors {
                eprintln!("  {}", e);
            }
        }
        other => eprintln!("Error: {}", other),
    }
}

fn print_networks(config: &RootConfig) {
    for profile in config.networks().values() {
        let endpoint = profile
            .endpoint()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| profile.socket_address());
        println!(
            "{:<24} {:<32} network_id={}",
            profile.name(),
            endpoint,
            profile.network_id()
        );
    }
}
