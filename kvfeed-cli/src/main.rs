//! kvfeed: load-balancer configuration in Consul, as a change feed.
//!
//! Usage:
//!   kvfeed keygen
//!   kvfeed --secret-key <hex> put-host example.com --cert cert.pem --key key.pem
//!   kvfeed put backend backend.json
//!   kvfeed watch
//!
//! `watch` prints one JSON event per line until interrupted.

mod config;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::{Overrides, Settings};
use kvfeed_crypto::SecretKey;
use kvfeed_engine::{Engine, EngineResult};
use kvfeed_store::ConsulStore;
use kvfeed_types::{
    Backend, BackendKey, EntityKind, Frontend, FrontendKey, Host, HostKey, HostSettings, KeyPair,
    Listener, ListenerKey,
};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kvfeed")]
#[command(about = "Store and watch load-balancer configuration in Consul")]
struct Args {
    /// JSON config file with `engine` and `consul` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Consul agent address
    #[arg(long)]
    consul: Option<String>,

    /// Consul ACL token
    #[arg(long, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Key prefix all entities live under
    #[arg(long)]
    prefix: Option<String>,

    /// Hex-encoded 32-byte key for sealing host key pairs
    #[arg(long, env = "KVFEED_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Skip unrecognized keys while watching instead of failing
    #[arg(long)]
    skip_unrecognized: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print change events as JSON lines until interrupted
    Watch {
        /// Events buffered before the watch waits for the printer
        #[arg(long, default_value = "64")]
        buffer: usize,
    },
    /// Generate a new secret key
    Keygen,
    /// Store a host, sealing its certificate key pair
    PutHost {
        name: String,
        /// PEM certificate file
        #[arg(long, requires = "key")]
        cert: Option<PathBuf>,
        /// PEM private key file
        #[arg(long, requires = "cert")]
        key: Option<PathBuf>,
        /// Serve this host for unmatched SNI names
        #[arg(long)]
        default: bool,
    },
    /// Store an entity from a JSON file (`-` reads stdin)
    Put { kind: EntityKind, file: PathBuf },
    /// Print one entity as JSON
    Get { kind: EntityKind, id: String },
    /// Remove one entity
    Delete { kind: EntityKind, id: String },
    /// Print every entity of a kind as JSON
    List { kind: EntityKind },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Command::Keygen = args.command {
        println!("{}", SecretKey::generate().to_hex());
        return Ok(());
    }

    let settings = Settings::load(args.config.as_deref())?.apply(Overrides {
        consul_address: args.consul,
        consul_token: args.token,
        prefix: args.prefix,
        secret_key: args.secret_key,
        skip_unrecognized: args.skip_unrecognized,
    });
    let store = ConsulStore::new(settings.consul).context("failed to create Consul client")?;
    let engine = Engine::new(Arc::new(store), settings.engine).context("invalid engine config")?;

    match args.command {
        Command::Keygen => {}
        Command::Watch { buffer } => run_watch(&engine, buffer).await?,
        Command::PutHost {
            name,
            cert,
            key,
            default,
        } => {
            let key_pair = match (cert, key) {
                (Some(cert), Some(key)) => Some(KeyPair::new(read_file(&cert)?, read_file(&key)?)),
                _ => None,
            };
            let host = Host::new(
                name,
                HostSettings {
                    default,
                    key_pair,
                    ..Default::default()
                },
            )?;
            engine.upsert_host(&host).await?;
            info!(host = %host.name, "host stored");
        }
        Command::Put { kind, file } => {
            let raw = read_input(&file)?;
            put_entity(&engine, kind, &raw).await?;
        }
        Command::Get { kind, id } => match kind {
            EntityKind::Host => print_json(&engine.get_host(&HostKey::new(id)).await?)?,
            EntityKind::Listener => {
                print_json(&engine.get_listener(&ListenerKey::new(id)).await?)?
            }
            EntityKind::Backend => print_json(&engine.get_backend(&BackendKey::new(id)).await?)?,
            EntityKind::Frontend => {
                print_json(&engine.get_frontend(&FrontendKey::new(id)).await?)?
            }
        },
        Command::Delete { kind, id } => {
            match kind {
                EntityKind::Host => engine.delete_host(&HostKey::new(&id)).await?,
                EntityKind::Listener => engine.delete_listener(&ListenerKey::new(&id)).await?,
                EntityKind::Backend => engine.delete_backend(&BackendKey::new(&id)).await?,
                EntityKind::Frontend => engine.delete_frontend(&FrontendKey::new(&id)).await?,
            }
            info!(kind = %kind, id = %id, "deleted");
        }
        Command::List { kind } => match kind {
            EntityKind::Host => print_json(&engine.hosts().await?)?,
            EntityKind::Listener => print_json(&engine.listeners().await?)?,
            EntityKind::Backend => print_json(&engine.backends().await?)?,
            EntityKind::Frontend => print_json(&engine.frontends().await?)?,
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run_watch(engine: &Engine, buffer: usize) -> Result<()> {
    if buffer == 0 {
        bail!("--buffer must be at least 1");
    }
    let (events_tx, mut events_rx) = mpsc::channel(buffer);
    let (cancel_tx, cancel_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, stopping watch"),
            Err(e) => warn!(error = %e, "failed to listen for interrupt"),
        }
        let _ = cancel_tx.send(true);
    });

    let printer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(event) = events_rx.recv().await {
            writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let watched = engine.subscribe(events_tx, cancel_rx).await;
    // The printer ends once the watch drops its sender.
    let printed = printer.await.context("event printer panicked")?;
    watch_outcome(watched, printed)
}

/// A failed printer closes the channel, so its error explains a
/// `ChannelClosed` watch result and is reported first.
fn watch_outcome(watched: EngineResult<()>, printed: Result<()>) -> Result<()> {
    printed.context("failed to print events")?;
    watched.context("watch session failed")
}

async fn put_entity(engine: &Engine, kind: EntityKind, raw: &str) -> Result<()> {
    let id = match kind {
        EntityKind::Host => {
            let host: Host = serde_json::from_str(raw).context("invalid host JSON")?;
            engine.upsert_host(&host).await?;
            host.name
        }
        EntityKind::Listener => {
            let listener: Listener = serde_json::from_str(raw).context("invalid listener JSON")?;
            engine.upsert_listener(&listener).await?;
            listener.id
        }
        EntityKind::Backend => {
            let backend: Backend = serde_json::from_str(raw).context("invalid backend JSON")?;
            engine.upsert_backend(&backend).await?;
            backend.id
        }
        EntityKind::Frontend => {
            let frontend: Frontend = serde_json::from_str(raw).context("invalid frontend JSON")?;
            engine.upsert_frontend(&frontend).await?;
            frontend.id
        }
    };
    info!(kind = %kind, id = %id, "stored");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvfeed_engine::EngineError;

    #[test]
    fn printer_failure_is_reported_over_closed_channel() {
        let err = watch_outcome(
            Err(EngineError::ChannelClosed),
            Err(anyhow::anyhow!("broken pipe")),
        )
        .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to print events"));
        assert!(message.contains("broken pipe"));
    }

    #[test]
    fn watch_error_is_reported_when_printer_succeeds() {
        let err = watch_outcome(Err(EngineError::ChannelClosed), Ok(())).unwrap_err();
        assert!(format!("{err:#}").contains("event channel closed"));
    }

    #[test]
    fn clean_cancel_is_ok() {
        assert!(watch_outcome(Ok(()), Ok(())).is_ok());
    }
}
