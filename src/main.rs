//! AIRE Marketplace - multi-tenant resort booking service
//!
//! Partners get isolated storefronts under their own subdomain, list resorts
//! and receive bookings with generated itineraries and split payments.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::ServiceExt;
use axum_server::tls_rustls::RustlsConfig;
use tower::Layer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use aire_marketplace::config::{LogFormat, LogTarget};
use aire_marketplace::middleware::tenant_gatekeeper;
use aire_marketplace::services::{
    ActionThrottle, EmailService, GeminiGenerator, StripeGateway,
};
use aire_marketplace::{build_router, db, AppConfig, AppState};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("AIRE Marketplace {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before the runtime, so we know the worker
    // count; before logging, so we know the log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: AppConfig) -> Result<()> {
    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("AIRE Marketplace starting up");
    info!(
        base_domain = %config.tenancy.base_domain,
        "Tenant routing configured"
    );

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    let itinerary = Arc::new(
        GeminiGenerator::new(config.itinerary.clone())
            .context("Failed to initialize itinerary client")?,
    );
    if config.itinerary.api_key.is_empty() {
        info!("Itinerary API key not set; bookings will use the fallback itinerary");
    }

    let payments = Arc::new(
        StripeGateway::new(config.payments.clone())
            .context("Failed to initialize payment gateway client")?,
    );

    let email = Arc::new(
        EmailService::new(config.email.as_ref()).context("Failed to initialize email service")?,
    );
    if !email.is_configured() {
        info!("Email not configured; sends will be mocked");
    }

    let throttle_secs = config
        .email
        .as_ref()
        .map(|e| e.test_throttle_secs)
        .unwrap_or(60);
    let throttle = Arc::new(ActionThrottle::new(std::time::Duration::from_secs(
        throttle_secs,
    )));

    let state = AppState {
        config: config.clone(),
        db,
        itinerary,
        payments,
        email,
        throttle,
    };

    let router = build_router(state.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(CompressionLayer::new());

    // The gatekeeper wraps the router so its URI rewrite runs before routing
    let app = axum::middleware::from_fn_with_state(state, tenant_gatekeeper).layer(router);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    match &config.server.tls {
        Some(tls) => {
            info!("Listening on https://{}", addr);
            let rustls_config = RustlsConfig::from_pem_file(&tls.cert_file, &tls.key_file)
                .await
                .context("Failed to load TLS certificate")?;
            // `axum_server` drives the service with `Request<Incoming>`, while the
            // gatekeeper middleware only speaks axum's `Body`. Coerce the incoming
            // body into `Body` (the same wrap `axum::serve` applies internally) so
            // the wrapped service type-checks.
            let make_service = tower::ServiceExt::map_request(
                app,
                |req: Request<_>| req.map(axum::body::Body::new),
            )
            .into_make_service();
            axum_server::bind_rustls(addr, rustls_config)
                .serve(make_service)
                .await
                .context("Server error")?;
        }
        None => {
            info!("Listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind server address")?;
            let make_service = ServiceExt::<Request>::into_make_service(app);
            axum::serve(listener, make_service)
                .await
                .context("Server error")?;
        }
    }

    Ok(())
}

/// Initialize tracing according to the logging configuration.
/// Returns the appender guard when logging to a file.
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.logging.target {
        LogTarget::Console => {
            let builder = tracing_subscriber::fmt().with_env_filter(filter);
            match config.logging.format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Compact => builder.compact().init(),
                LogFormat::Pretty => builder.init(),
            }
            None
        }
        LogTarget::File => {
            let appender = tracing_appender::rolling::daily(
                &config.logging.log_dir,
                &config.logging.log_prefix,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false);
            match config.logging.format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Compact => builder.compact().init(),
                LogFormat::Pretty => builder.init(),
            }
            Some(guard)
        }
        LogTarget::Both => {
            let appender = tracing_appender::rolling::daily(
                &config.logging.log_dir,
                &config.logging.log_prefix,
            );
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file_writer.and(std::io::stdout))
                .with_ansi(false);
            match config.logging.format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Compact => builder.compact().init(),
                LogFormat::Pretty => builder.init(),
            }
            Some(guard)
        }
    }
}

/// Make sure the SQLite database directory exists before connecting.
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    let url = &config.database.url;
    if let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create data directory {:?}", parent))?;
                }
            }
        }
    }
    Ok(())
}

fn print_help() {
    println!("AIRE Marketplace {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("    aire-marketplace [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print this help message");
    println!("    -V, --version    Print version information");
    println!();
    println!("CONFIGURATION:");
    println!("    Reads config.yaml from the working directory,");
    println!("    /etc/aire-marketplace/config.yaml or the path in AIRE_CONFIG.");
    println!("    Environment overrides: AIRE_HOST, AIRE_PORT, AIRE_BASE_DOMAIN,");
    println!("    DATABASE_URL, JWT_SECRET, STRIPE_SECRET_KEY, STRIPE_WEBHOOK_SECRET,");
    println!("    GEMINI_API_KEY, RUST_LOG");
}
