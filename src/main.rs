use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nbx::{Batch, Config, NetboxClient, Operation, ResourceKind};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Bulk read/mutate client for NetBox-style inventory APIs
#[derive(Parser, Debug)]
#[command(name = "nbx", version, about, long_about = None)]
struct Args {
    /// Backend config JSON file ({"url": ..., "apikey": ...})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (logs go to stderr; report JSON goes to stdout)
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a full inventory snapshot, or read one from a file
    Snapshot {
        /// Read the snapshot from this file instead of a live backend
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// Write the snapshot to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Create records of one kind from a JSON file
    Create {
        /// Resource kind key, e.g. devices, ip_addresses, vlans
        kind: ResourceKind,

        /// JSON file with one record object or an array of records
        data: PathBuf,
    },

    /// Update records of one kind from a JSON file (records need an id)
    Update {
        kind: ResourceKind,
        data: PathBuf,
    },

    /// Delete records of one kind from a JSON file (records need an id)
    Delete {
        kind: ResourceKind,
        data: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.log_level);

    match args.command {
        Command::Snapshot {
            ref from_file,
            ref out,
        } => {
            let client = match from_file {
                Some(path) => NetboxClient::from_snapshot_file(path),
                None => connect(args.config.as_deref()).await?,
            };
            let Some(snapshot) = client.load_snapshot().await? else {
                anyhow::bail!("backend unavailable: startup probe did not return 200");
            };
            match out {
                Some(path) => snapshot
                    .to_file(path)
                    .with_context(|| format!("failed to write snapshot to {}", path.display()))?,
                None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            }
        }
        Command::Create { kind, ref data } => {
            mutate(args.config.as_deref(), kind, data, Operation::Create).await?;
        }
        Command::Update { kind, ref data } => {
            mutate(args.config.as_deref(), kind, data, Operation::Update).await?;
        }
        Command::Delete { kind, ref data } => {
            mutate(args.config.as_deref(), kind, data, Operation::Delete).await?;
        }
    }

    Ok(())
}

async fn connect(config: Option<&Path>) -> Result<NetboxClient> {
    let path = config.context("--config is required when not reading from a snapshot file")?;
    let config = Config::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    let client = NetboxClient::connect(&config)
        .await
        .context("failed to connect to the backend")?;
    Ok(client)
}

async fn mutate(
    config: Option<&Path>,
    kind: ResourceKind,
    data: &Path,
    operation: Operation,
) -> Result<()> {
    let client = connect(config).await?;
    let batch = read_batch(data)?;

    let report = match operation {
        Operation::Create => client.create(kind, batch).await?,
        Operation::Update => client.update(kind, batch).await?,
        Operation::Delete => client.delete(kind, batch).await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_batch(path: &Path) -> Result<Batch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(Batch::from(value))
}
