// # dnsyncd - dnsync Daemon
//
// This is a THIN integration layer: all reconciliation and scheduling logic
// lives in dnsync-core.
//
// The dnsyncd daemon is responsible for:
// 1. Parsing command-line flags
// 2. Initializing logging
// 3. Loading the configuration file
// 4. Constructing the Cloudflare provider and the outbound IP source
// 5. Running the sync engine until SIGINT/SIGTERM
//
// ## Example
//
// ```bash
// cat > config.json <<EOF
// {
//   "apiKey": "your_global_api_key",
//   "apiEmail": "you@example.com",
//   "interval": "10m",
//   "domains": ["home.example.com"]
// }
// EOF
//
// dnsyncd --config config.json --log-level info
// ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use dnsync_core::{SyncConfig, SyncEngine};
use dnsync_ip_outbound::OutboundIpSource;
use dnsync_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DnsyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DnsyncExitCode> for ExitCode {
    fn from(code: DnsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsyncExitCode::ConfigError.into();
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return DnsyncExitCode::ConfigError.into();
        }
    };

    info!("Configuration loaded: {} domain(s)", config.domains.len());

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config, cli.dry_run).await {
            error!("{:#}", e);
            DnsyncExitCode::ConfigError
        } else {
            DnsyncExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Load and validate the configuration file
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let config = SyncConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config file {}", cli.config.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run the daemon until a shutdown signal arrives
///
/// Every error returned from here happens before the first pass completes
/// and is fatal.
async fn run_daemon(config: SyncConfig, dry_run: bool) -> Result<()> {
    let provider = CloudflareProvider::new(&config.api_key, &config.api_email, dry_run)
        .context("Failed to create Cloudflare client")?;

    // Nobody consumes engine events here; dropping the receiver disables them
    let (engine, _) = SyncEngine::new(
        Box::new(OutboundIpSource::new()),
        Arc::new(provider),
        config,
    )
    .context("Failed to create sync engine")?;

    let shutdown = shutdown_signal().context("Failed to install signal handlers")?;

    engine
        .run_until(shutdown)
        .await
        .context("Failed to determine current IP")?;

    info!("Daemon stopped");
    Ok(())
}

/// Build a future that resolves on SIGTERM or SIGINT
///
/// The handlers are installed eagerly so a signal arriving during the
/// first pass is not lost.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Build a future that resolves on Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal: SIGINT");
    })
}
