//! Zonegate CLI
//!
//! Runs the auth-request service and offers read-only views of the audit log
//! and of a subject's zone access.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use zonegate_core::effects::{AuditStoreEffects, IdentityEffects};
use zonegate_core::UserRef;
use zonegate_effects::JsonlAuditStore;
use zonegate_server::{Gateway, ServerConfig};

#[derive(Parser)]
#[command(name = "zonegate")]
#[command(about = "Zonegate - zone access decisions for reverse proxies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "ZONEGATE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the auth-request service
    Serve {
        /// Listen address
        #[arg(short, long)]
        bind: Option<String>,

        /// Directory seed file
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Audit log file
        #[arg(long)]
        audit_log: Option<PathBuf>,
    },

    /// Show the most recent audit records
    Audit {
        /// Number of records
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Show what a subject may access, without recording anything
    Inspect {
        /// Restrict the report to one zone
        #[arg(short, long)]
        zone: Option<String>,

        /// Session token of the subject; anonymous when omitted
        #[arg(short, long)]
        session: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            bind,
            directory,
            audit_log,
        } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            if directory.is_some() {
                config.directory_path = directory;
            }
            if audit_log.is_some() {
                config.audit_log_path = audit_log;
            }
            zonegate_server::serve(config).await?;
        }

        Commands::Audit { limit } => {
            show_audit(&config, limit).await?;
        }

        Commands::Inspect { zone, session } => {
            config.validate()?;
            inspect(&config, zone.as_deref(), session.as_deref()).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading config file");
            ServerConfig::load_from_file(path)?
        }
        None => ServerConfig::default(),
    };
    config.merge_with_env()?;
    Ok(config)
}

async fn show_audit(config: &ServerConfig, limit: usize) -> Result<()> {
    let Some(path) = &config.audit_log_path else {
        bail!("No audit log file configured");
    };
    let store = JsonlAuditStore::open(path).await?;
    for entry in store.recent(limit).await? {
        println!(
            "{} {:<14} zone={} user={} {}{}",
            entry.timestamp.to_rfc3339(),
            entry.action.display_name(),
            entry.zone_code,
            entry.username,
            entry.message,
            if entry.extra_data.is_empty() {
                String::new()
            } else {
                format!(" ({})", entry.extra_data)
            }
        );
    }
    Ok(())
}

async fn inspect(config: &ServerConfig, zone: Option<&str>, session: Option<&str>) -> Result<()> {
    let gateway = Gateway::from_config(config).await?;

    let user = match session {
        Some(token) => match gateway.directory.resolve_session(token).await? {
            Some(profile) => UserRef::with_session(profile, token),
            None => bail!("Unknown session token"),
        },
        None => UserRef::Anonymous,
    };

    let reports = gateway.state.engine.access_overview(&user, zone).await?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
