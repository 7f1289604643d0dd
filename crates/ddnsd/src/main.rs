// # ddnsd - DDNS Update Endpoint
//
// This daemon is a THIN integration layer:
// - DO NOT add request validation or DNS logic here
// - All DDNS logic lives in ddns-core and the provider crates
//
// The ddnsd daemon is responsible for:
// 1. Reading process settings from environment variables
// 2. Loading the per-domain configuration file
// 3. Initializing tracing (console + rolling file)
// 4. Registering providers and choosing the IP resolver
// 5. Serving `GET /domains/{domain}?token={token}` until SIGTERM/SIGINT
//
// ## Configuration
//
// - `DDNS_CONFIG`: JSON file with the `Domains` map (default `appsettings.json`)
// - `DDNS_LISTEN_ADDR`: HTTP bind address (default `0.0.0.0:5000`)
// - `DDNS_ENVIRONMENT`: `production` or `development` (default `production`)
// - `DDNS_IP_ECHO_URL`: echo service used in development (default `https://ip.tool.lu`)
// - `DDNS_CONFIG_CACHE_TTL_SECS`: domain config cache window, 0 disables (default 60)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `LOG`: log file path (default `logs/ddns.log`)
//
// ## Example
//
// ```bash
// export DDNS_CONFIG=/etc/ddns/appsettings.json
// export DDNS_LISTEN_ADDR=127.0.0.1:5000
// export LOG=/var/log/ddns/ddns.log
//
// ddnsd
// curl "http://127.0.0.1:5000/domains/home.example.com?token=..."
// ```

mod logging;
mod routes;

use anyhow::{Context, Result};
use ddns_core::traits::IpResolver;
use ddns_core::{
    DdnsConfig, DdnsEngine, DomainConfigResolver, Environment, ForwardedIpResolver,
    ProviderRegistry,
};
use ddns_ip_http::EchoIpResolver;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

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

/// Process settings
#[derive(Debug, Clone, PartialEq)]
struct Config {
    config_path: PathBuf,
    listen_addr: SocketAddr,
    environment: Environment,
    ip_echo_url: String,
    cache_ttl: Duration,
    log_level: String,
    log_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let listen_addr = var("DDNS_LISTEN_ADDR", "0.0.0.0:5000");
        let environment = var("DDNS_ENVIRONMENT", "production");
        let cache_ttl = var("DDNS_CONFIG_CACHE_TTL_SECS", "60");

        Ok(Self {
            config_path: PathBuf::from(var("DDNS_CONFIG", "appsettings.json")),
            listen_addr: listen_addr
                .parse()
                .with_context(|| format!("DDNS_LISTEN_ADDR '{}' is not a socket address", listen_addr))?,
            environment: environment
                .parse()
                .with_context(|| format!("DDNS_ENVIRONMENT '{}' is not valid", environment))?,
            ip_echo_url: var("DDNS_IP_ECHO_URL", ddns_ip_http::DEFAULT_ECHO_URL),
            cache_ttl: Duration::from_secs(cache_ttl.parse().with_context(|| {
                format!("DDNS_CONFIG_CACHE_TTL_SECS '{}' is not a number of seconds", cache_ttl)
            })?),
            log_level: var("DDNS_LOG_LEVEL", "info"),
            log_path: PathBuf::from(var("LOG", "logs/ddns.log")),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if logging::parse_level(&self.log_level).is_none() {
            anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            );
        }

        if self.environment.is_development()
            && !self.ip_echo_url.starts_with("https://")
            && !self.ip_echo_url.starts_with("http://")
        {
            anyhow::bail!(
                "DDNS_IP_ECHO_URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_echo_url
            );
        }

        if !self.config_path.is_file() {
            anyhow::bail!(
                "DDNS_CONFIG file does not exist: {}",
                self.config_path.display()
            );
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let domains = match load_domains(&config) {
        Ok(domains) => domains,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let log_level = logging::parse_level(&config.log_level).unwrap_or(tracing::Level::INFO);
    let _log_guard = match logging::init(log_level, &config.log_path) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!("Starting ddnsd");
    info!(
        "Configuration loaded: {} domain(s) from {}",
        domains.domains.len(),
        config.config_path.display()
    );

    // Enter tokio runtime
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
        if let Err(e) = run_daemon(config, domains).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Read and check the domain configuration file
fn load_domains(config: &Config) -> Result<DdnsConfig> {
    let domains = DdnsConfig::from_file(&config.config_path)
        .with_context(|| format!("Failed to load {}", config.config_path.display()))?;
    domains.validate()?;
    Ok(domains)
}

/// Register every provider compiled into this binary
fn build_registry() -> Result<ProviderRegistry> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "aliyun")]
    {
        info!("Registering Aliyun provider");
        ddns_provider_aliyun::register(&registry)?;
    }

    Ok(registry)
}

/// Pick the caller IP resolver for the environment
fn build_ip_resolver(config: &Config) -> Result<Arc<dyn IpResolver>> {
    if config.environment.is_development() {
        warn!(
            "Development environment: caller IP comes from {}",
            config.ip_echo_url
        );
        Ok(Arc::new(EchoIpResolver::new(config.ip_echo_url.clone())?))
    } else {
        Ok(Arc::new(ForwardedIpResolver::new()))
    }
}

/// Warn about entries that every request would reject
fn report_domain_problems(domains: &DdnsConfig, registry: &ProviderRegistry) {
    for name in domains.incomplete_domains() {
        warn!("Domain {} has an incomplete configuration", name);
    }

    let mut names: Vec<&String> = domains.domains.keys().collect();
    names.sort();
    for name in names {
        let provider = &domains.domains[name].provider;
        if !provider.is_empty() && !registry.has_provider(provider) {
            warn!(
                "Domain {} uses provider '{}', registered: {:?}",
                name,
                provider,
                registry.list_providers()
            );
        }
    }
}

/// Run the daemon
async fn run_daemon(config: Config, domains: DdnsConfig) -> Result<()> {
    let registry = build_registry()?;
    report_domain_problems(&domains, &registry);

    let ip_resolver = build_ip_resolver(&config)?;
    info!("IP resolver: {}", ip_resolver.name());

    let config_resolver = DomainConfigResolver::new(Arc::new(domains), config.cache_ttl);
    let engine = Arc::new(DdnsEngine::new(
        ip_resolver,
        config_resolver,
        Arc::new(registry),
    ));

    let shutdown = shutdown_signal()?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        routes::router(engine).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let signal = shutdown.await;
        info!("Received shutdown signal: {}", signal);
        info!("Shutting down daemon");
    })
    .await
    .context("HTTP server failed")?;

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Handlers are installed before the returned future is polled, so a
/// failure to install them is a startup error.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
        }
        "SIGINT"
    })
}
