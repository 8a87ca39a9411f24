//! geolite-kit - GeoLite2 provisioning and lookup CLI
//!
//! This is the composition root that wires configuration, the
//! provisioner and the resolver together.

use anyhow::Context;
use clap::{Parser, Subcommand};
use geolite_kit::{load_config, load_config_file, LookupOutcome, Provisioner, Resolver};
use std::path::PathBuf;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "geolite-kit", version, about = "Download GeoLite2 databases and look up IP locations")]
struct Cli {
    /// JSON config file (otherwise GEOIP_* environment variables are used)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database destination: a .mmdb file or a directory
    #[arg(long, global = true)]
    mmdb: Option<String>,

    /// Provider license key
    #[arg(long, global = true)]
    license_key: Option<String>,

    /// Database edition (e.g. GeoLite2-City, GeoLite2-Country)
    #[arg(long, global = true)]
    edition: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download and install the latest database
    Refresh,
    /// Resolve IP addresses against the installed database
    Lookup {
        #[arg(required = true)]
        ips: Vec<String>,
        /// Print the full record and report lookup errors
        #[arg(long)]
        raw: bool,
    },
    /// Check country codes against the supported list
    ValidateCountry {
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_config(),
    };
    if let Some(mmdb) = cli.mmdb {
        cfg.mmdb = Some(mmdb);
    }
    if let Some(key) = cli.license_key {
        cfg.license_key = Some(key);
    }
    if let Some(edition) = cli.edition {
        cfg.edition_id = edition;
    }

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Refresh => {
            let provisioning = cfg.provisioning()?;
            tracing::info!(
                "refreshing {} into {}",
                provisioning.edition_id,
                provisioning.database_path().display()
            );

            let installed = Provisioner::new().refresh(&provisioning, None).await?;
            println!("{}", installed.display());
        }
        Command::Lookup { ips, raw } => {
            let path = cfg
                .database_path()
                .context("no database configured (set GEOIP_MMDB or --mmdb)")?;

            let resolver = Resolver::maxmind();
            resolver
                .load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;

            let mut failed = 0;
            for ip in &ips {
                if raw {
                    match resolver.raw_lookup(ip) {
                        Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                        Err(e) => {
                            failed += 1;
                            eprintln!("{}: {}", ip, e);
                        }
                    }
                    continue;
                }

                let location = match resolver.lookup(ip) {
                    LookupOutcome::Found(location) => Some(location),
                    LookupOutcome::NotFound => None,
                };
                let line = serde_json::json!({ "ip": ip, "location": location });
                println!("{}", line);
            }

            if failed > 0 {
                anyhow::bail!("{} of {} lookups failed", failed, ips.len());
            }
        }
        Command::ValidateCountry { codes } => {
            let mut unsupported = Vec::new();
            for code in &codes {
                let ok = Resolver::is_valid_country_code(code);
                println!("{}\t{}", code.trim(), if ok { "supported" } else { "unsupported" });
                if !ok {
                    unsupported.push(code.trim().to_string());
                }
            }

            if !unsupported.is_empty() {
                anyhow::bail!("unsupported country codes: {}", unsupported.join(", "));
            }
        }
    }

    Ok(())
}
