use anyhow::{Context, Result};
use clap::Parser;
use jobly_server::auth::AuthKeys;
use jobly_server::{AppState, Config, error, router, telemetry};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "jobly-server", version, about = "Jobly job board API")]
struct Cli {
    /// TOML config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Postgres connection URL
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Apply pending migrations before serving
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    config.validate()?;

    telemetry::init(&config.log)?;
    error::hide_internal_details(config.is_production());
    if config.uses_dev_secret() {
        warn!("using the development secret; set SECRET_KEY");
    }

    let pool = jobly::create_pool_with_config(&config.database.url, config.database.max_connections)
        .context("failed to create connection pool")?;
    if cli.migrate || config.database.migrate_on_start {
        jobly::migrate::run_pool(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let state = AppState::new(
        pool,
        AuthKeys::new(&config.auth.secret, config.auth.token_ttl_secs),
    );
    let app = router(state);

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid host {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, environment = %config.server.environment, "jobly-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
