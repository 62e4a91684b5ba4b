use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use logship::app;
use logship::ConsoleReporter;
use logship_core::config::{LoadOptions, Settings};
use tokio_util::sync::CancellationToken;

/// Configuration and usage errors.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(
    name = "logship",
    version,
    about = "Ship web-server access logs from HDFS into OpenSearch"
)]
struct Cli {
    /// TOML file layered over the built-in defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where the log lives: `webhdfs` or a local `file`.
    #[arg(long, value_name = "KIND", value_parser = ["webhdfs", "file"])]
    source_kind: Option<String>,

    /// WebHDFS NameNode base URL, e.g. http://namenode:9870.
    #[arg(long, value_name = "URL")]
    namenode: Option<String>,

    /// HDFS user name sent as `user.name`.
    #[arg(long)]
    user: Option<String>,

    /// Path of the access log to ingest.
    #[arg(long)]
    path: Option<String>,

    /// OpenSearch base URL, e.g. http://opensearch-node1:9200.
    #[arg(long, value_name = "URL")]
    opensearch: Option<String>,

    /// Target index.
    #[arg(long)]
    index: Option<String>,

    /// Print only the final tally.
    #[arg(long, short)]
    quiet: bool,

    /// Write diagnostics to FILE instead of stderr.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let flags = [
            ("source.kind", &self.source_kind),
            ("source.namenode_url", &self.namenode),
            ("source.user", &self.user),
            ("source.path", &self.path),
            ("sink.url", &self.opensearch),
            ("sink.index", &self.index),
        ];
        flags.into_iter().fold(
            LoadOptions {
                file: self.config.clone(),
                overrides: Vec::new(),
            },
            |options, (key, value)| match value {
                Some(value) => options.with_override(key, value.clone()),
                None => options,
            },
        )
    }
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }
    Ok(())
}

fn bootstrap(cli: &Cli) -> anyhow::Result<Settings> {
    init_logging(cli.log_file.as_deref())?;
    let settings = Settings::load(&cli.load_options()).context("loading configuration")?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match bootstrap(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("logship: {err:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; finishing current line");
            on_interrupt.cancel();
        }
    });

    let report = app::run(&settings, ConsoleReporter::stdout(cli.quiet), cancel).await;
    if let Some(reason) = &report.abort {
        eprintln!("logship: {reason}");
    }
    ExitCode::from(report.exit_code())
}
