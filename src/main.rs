//! Status page service entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use status_page::api::{create_router, AppState};
use status_page::broadcast::{BroadcastService, DeliveryPool, EmailCourier};
use status_page::chat::SlackClient;
use status_page::config::Config;
use status_page::email::SendGridClient;
use status_page::metrics;
use status_page::status::StatusHistoryReader;
use status_page::store::{KeyValueStore, MemoryStore, RedisStore, SubscriberStore};
use status_page::utils::{build_http_client, shutdown_signal, write_port_file, DEFAULT_PORT_FILE};
use status_page::StatusPageService;

/// Slack-backed status page with email subscriptions.
#[derive(Parser, Debug)]
#[command(name = "status-page")]
#[command(about = "Status page that broadcasts Slack status updates to email subscribers")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeOptions,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeOptions {
    /// HTTP port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind an ephemeral local port and write the address to the port file.
    #[arg(long)]
    addr: bool,

    /// Where `--addr` writes the bound address.
    #[arg(long, default_value = DEFAULT_PORT_FILE)]
    port_file: PathBuf,

    /// Keep subscribers in process memory instead of Redis.
    #[arg(long)]
    memory_store: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the status page (default).
    Serve(ServeOptions),

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("status_page=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if args.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Serve(options)) => cmd_serve(options).await,
        None => cmd_serve(args.serve).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("STATUS PAGE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Connecting to Redis... ");
    match RedisStore::connect(&config.redis_address, &config.redis_password, config.redis_db).await
    {
        Ok(_) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Redis: {} (db {})", config.redis_address, config.redis_db);
    println!("  Slack Channel: {}", config.slack_channel);
    println!("  Email From: {}", config.email_from);
    println!("  Email Subject: {}", config.email_subject);
    println!(
        "  Unsubscribe Links: {}",
        if config.domain.is_empty() { "Disabled" } else { config.domain.as_str() }
    );
    println!("  History Count: {}", config.history_count);
    println!(
        "  Delivery: {} workers, queue of {}",
        config.delivery_workers, config.delivery_queue_capacity
    );
    println!("  Display Offset: {}", config.display_offset());
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Wire the service from configuration.
async fn build_service(config: &Config, memory_store: bool) -> anyhow::Result<StatusPageService> {
    let http = build_http_client(config.http_timeout())?;

    let store: Arc<dyn KeyValueStore> = if memory_store {
        warn!("Using in-memory store; subscribers are lost on restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            RedisStore::connect(&config.redis_address, &config.redis_password, config.redis_db)
                .await?,
        )
    };

    let chat = Arc::new(SlackClient::new(
        http.clone(),
        &config.slack_api_url,
        &config.slack_token,
    ));
    let reader = StatusHistoryReader::new(chat, &config.slack_channel, config.display_offset());

    let mailer = Arc::new(SendGridClient::new(
        http,
        &config.sendgrid_api_url,
        &config.sendgrid_api_key,
    ));
    let courier = EmailCourier::new(
        mailer,
        &config.email_from,
        &config.email_subject,
        &config.domain,
    );
    let pool = DeliveryPool::start(
        courier,
        config.delivery_workers,
        config.delivery_queue_capacity,
    );

    let broadcaster = BroadcastService::new(
        reader.clone(),
        SubscriberStore::new(store.clone()),
        pool,
    );

    Ok(StatusPageService::new(
        reader,
        store,
        broadcaster,
        &config.page_title,
        config.history_count,
    ))
}

/// Serve the status page until shutdown.
async fn cmd_serve(options: ServeOptions) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    // Override with CLI args if provided
    if let Some(port) = options.port {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Slack channel: {}", config.slack_channel);

    if config.metrics_enabled {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
        metrics::install_prometheus(metrics_addr)?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }
    metrics::init_metrics();

    let service = build_service(&config, options.memory_store).await?;
    let pool = service.broadcaster().pool().clone();

    let listener = if options.addr {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local = listener.local_addr()?;
        write_port_file(&options.port_file, local)?;
        info!("Wrote {} to {}", local, options.port_file.display());
        listener
    } else {
        TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.port))).await?
    };
    info!("HTTP server listening on {}", listener.local_addr()?);

    let router = create_router(AppState::new(service));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_deliveries(&pool, Duration::from_secs(config.shutdown_drain_secs)).await;

    info!("Status page stopped");
    Ok(())
}

/// Give queued deliveries a bounded chance to finish.
async fn drain_deliveries(pool: &DeliveryPool, limit: Duration) {
    let pending = pool.pending();
    if pending == 0 {
        return;
    }

    info!("Draining {} pending deliveries...", pending);
    if tokio::time::timeout(limit, pool.wait_idle()).await.is_err() {
        warn!("Dropped {} deliveries still pending after {:?}", pool.pending(), limit);
    }
}
