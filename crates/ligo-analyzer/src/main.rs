use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use clap::Parser;
use ligo_analyzer::LigoLanguageServer;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "ligo-analyzer.log";

#[derive(Parser, Debug)]
#[command(name = "ligo-analyzer", version, about)]
struct Args {
    /// Log lookups and search commands at debug level.
    #[arg(long, short)]
    verbose: bool,

    /// Log file path; defaults to `~/.ligo-analyzer/ligo-analyzer.log`.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_log_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".ligo-analyzer");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir.join(LOG_FILE_NAME);
        }
    }
    std::env::temp_dir().join(LOG_FILE_NAME)
}

fn log_filter(
    verbose: bool,
    tower_lsp_verbose: &str,
) -> EnvFilter {
    if verbose {
        EnvFilter::new(format!("ligo_analyzer=debug,tower_lsp={tower_lsp_verbose}"))
    } else {
        EnvFilter::new("ligo_analyzer=info,tower_lsp=warn")
    }
}

/// Install the stderr and file layers and return the file log path.
fn init_tracing(args: &Args) -> PathBuf {
    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path.file_name().unwrap_or(OsStr::new(LOG_FILE_NAME)),
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false)
        .with_filter(log_filter(args.verbose, "info"));

    // stdout carries the protocol, so console logs go to stderr.
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(log_filter(args.verbose, "debug"));

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
    log_path
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let log_path = init_tracing(&args);

    info!("Starting ligo-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let (service, socket) = LspService::new(|client| LigoLanguageServer::new(client));
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket).serve(service).await;

    info!("ligo-analyzer stopped");
}
