use actix_middleware::JwtAuthConfig;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::info;

use matchmaking_service::config::Config;
use matchmaking_service::db::init_pool;
use matchmaking_service::handlers;
use matchmaking_service::logging::init_tracing;
use matchmaking_service::state::AppState;
use matchmaking_service::workers::reaper;

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        reaper_enabled = config.reaper.enabled,
        sfu_configured = config.sfu.is_configured(),
        "Starting matchmaking-service"
    );

    let jwt = JwtAuthConfig::new(&config.auth.jwt_secret, config.auth.jwt_audience.as_deref())
        .context("Invalid JWT configuration")?;

    let pool = init_pool(config.database.clone())
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool, &config);
    let reaper_handle = state.reaper.clone();

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    let server = HttpServer::new(move || {
        let jwt = jwt.clone();
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(|cfg| handlers::configure(cfg, jwt))
    })
    .bind(&http_addr)
    .with_context(|| format!("Failed to bind HTTP server on {}", http_addr))?
    .disable_signals()
    .run();
    let server_handle = server.handle();
    info!(addr = %http_addr, "HTTP server listening");

    let mut join_set = JoinSet::new();
    join_set.spawn(async move {
        server
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
    });
    if config.reaper.enabled {
        join_set.spawn(reaper::run(reaper_handle, config.reaper.interval));
    } else {
        info!("Random-call reaper disabled by configuration");
    }

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
        Some(result) = join_set.join_next() => {
            match result {
                Ok(Ok(())) => info!("Background task exited"),
                Ok(Err(e)) => tracing::error!(error = %e, "Background task failed"),
                Err(e) => tracing::error!(error = %e, "Background task panicked"),
            }
        }
    }

    server_handle.stop(true).await;
    join_set.abort_all();
    info!("matchmaking-service stopped");
    Ok(())
}
