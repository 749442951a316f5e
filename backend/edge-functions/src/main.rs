use actix_middleware::JwtAuthConfig;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::info;

use edge_functions::config::Config;
use edge_functions::db::init_pool;
use edge_functions::handlers;
use edge_functions::logging::init_tracing;
use edge_functions::state::{AppState, Integrations};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        products = config.payments.products.len(),
        sfu_configured = config.sfu.is_configured(),
        "Starting edge-functions"
    );

    let jwt = JwtAuthConfig::new(&config.auth.jwt_secret, config.auth.jwt_audience.as_deref())
        .context("Invalid JWT configuration")?;

    let pool = init_pool(config.database.clone())
        .await
        .context("Failed to initialize database")?;

    let integrations = Integrations::from_config(&config)
        .await
        .context("Failed to configure integrations")?;
    let state = AppState::new(pool, &config, integrations).context("Failed to build app state")?;

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!(addr = %http_addr, "HTTP server listening");

    HttpServer::new(move || {
        let jwt = jwt.clone();
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(|cfg| handlers::configure(cfg, jwt))
    })
    .bind(&http_addr)
    .with_context(|| format!("Failed to bind HTTP server on {}", http_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("edge-functions stopped");
    Ok(())
}
