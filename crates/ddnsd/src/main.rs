// # ddnsd - DDNS Update Daemon
//
// Thin integration layer: everything that decides what happens to a request
// lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers and building the configured one
// 4. Serving the update endpoint until SIGINT/SIGTERM
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Endpoint
// - `DDNS_USER`: User name callers must present
// - `DDNS_PASSWORD`: Password callers must present
// - `DDNS_REQUIRE_IPV4`: Reject requests without `ipv4` (default: true)
// - `DDNS_LISTEN_ADDR`: Bind address (default: 0.0.0.0:8787)
//
// ### Porkbun
// - `DDNS_PORKBUN_API_KEY`: API key
// - `DDNS_PORKBUN_SECRET_API_KEY`: Secret API key
// - `DDNS_PORKBUN_DOMAIN`: Registered domain
// - `DDNS_PORKBUN_A_RECORD_ID` / `DDNS_PORKBUN_AAAA_RECORD_ID`: Record IDs
// - `DDNS_PORKBUN_SUBDOMAIN`: Subdomain, used when no record ID is set
// - `DDNS_PORKBUN_API_BASE`: API base URL (default: Porkbun JSON API v3)
//
// ### Runtime
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `DDNS_MODE`: `live` (default) or `dry-run`, which logs provider updates
//   instead of sending them
//
// ## Example
//
// ```bash
// export DDNS_USER=router
// export DDNS_PASSWORD=change-me
// export DDNS_PORKBUN_API_KEY=pk1_...
// export DDNS_PORKBUN_SECRET_API_KEY=sk1_...
// export DDNS_PORKBUN_DOMAIN=example.com
// export DDNS_PORKBUN_A_RECORD_ID=253884100
//
// ddnsd
// curl 'http://localhost:8787/?user=router&password=change-me&ipv4=203.0.113.7'
// ```

mod server;

use anyhow::{Context, Result};
use ddns_core::config::{PorkbunSettings, ProviderConfig, RecordTargets, UpdaterConfig};
use ddns_core::{Credentials, DnsProvider, UpdateHandler};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Default bind address
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8787";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    updater: UpdaterConfig,
    listen_addr: SocketAddr,
    log_level: Level,
    dry_run: bool,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load and validate configuration from any key/value source
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            var(key).with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let credentials = Credentials::new(required("DDNS_USER")?, required("DDNS_PASSWORD")?);

        let a_record_id = var("DDNS_PORKBUN_A_RECORD_ID");
        let aaaa_record_id = var("DDNS_PORKBUN_AAAA_RECORD_ID");
        let records = if a_record_id.is_some() || aaaa_record_id.is_some() {
            RecordTargets::ById {
                a_record_id,
                aaaa_record_id,
            }
        } else if let Some(subdomain) = lookup("DDNS_PORKBUN_SUBDOMAIN") {
            RecordTargets::ByNameType {
                subdomain: subdomain.trim().to_string(),
            }
        } else {
            anyhow::bail!(
                "No Porkbun record configured. Set DDNS_PORKBUN_A_RECORD_ID / \
                DDNS_PORKBUN_AAAA_RECORD_ID, or DDNS_PORKBUN_SUBDOMAIN (empty for the apex)"
            );
        };

        let mut settings = PorkbunSettings::new(
            required("DDNS_PORKBUN_API_KEY")?,
            required("DDNS_PORKBUN_SECRET_API_KEY")?,
            required("DDNS_PORKBUN_DOMAIN")?,
            records,
        );
        if let Some(api_base) = var("DDNS_PORKBUN_API_BASE") {
            settings = settings.with_api_base(api_base);
        }

        let require_ipv4 = match var("DDNS_REQUIRE_IPV4") {
            None => true,
            Some(v) => parse_bool(&v)
                .with_context(|| format!("DDNS_REQUIRE_IPV4 must be true or false. Got: {}", v))?,
        };

        let updater = UpdaterConfig::new(credentials, ProviderConfig::Porkbun(settings))
            .with_require_ipv4(require_ipv4);
        updater.validate()?;

        let listen_addr = var("DDNS_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr.parse().with_context(|| {
            format!("DDNS_LISTEN_ADDR must be an address like 0.0.0.0:8787. Got: {}", listen_addr)
        })?;

        let log_level = var("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                log_level
            ),
        };

        let dry_run = match var("DDNS_MODE").map(|v| v.to_lowercase()).as_deref() {
            None | Some("live") => false,
            Some("dry-run") => true,
            Some(other) => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            updater,
            listen_addr,
            log_level,
            dry_run,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn main() -> ExitCode {
    // Load and validate configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let registry = ddns_core::ProviderRegistry::new();

    #[cfg(feature = "porkbun")]
    {
        info!("Registering Porkbun provider");
        ddns_provider_porkbun::register(&registry, config.dry_run);
    }

    let provider: Arc<dyn DnsProvider> = registry
        .create_provider(&config.updater.provider)
        .context("Failed to create DNS provider")?
        .into();

    info!(
        "Provider: {} [mode: {}] (IPv4 {})",
        provider.provider_name(),
        if config.dry_run { "DRY-RUN" } else { "LIVE" },
        if config.updater.require_ipv4 { "required" } else { "optional" }
    );

    let handler = UpdateHandler::new(
        config.updater.credentials,
        provider,
        config.updater.require_ipv4,
    );
    let app = server::build_app(Arc::new(handler));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down gracefully");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to set up signal handlers: {}", e);
            return;
        }
    };

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!("Received shutdown signal: {}", received);
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => error!("Failed to wait for CTRL-C: {}", e),
    }
}
