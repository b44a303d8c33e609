mod http;

use crate::http::Config;
use env_logger::Env;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Logging comes up before configuration so load failures are reported.
    env_logger::Builder::from_env(Env::default().filter_or("LOG_LEVEL", "info")).init();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    log::set_max_level(config.log_level.to_level_filter());

    let state = http::router::AppState {
        config: config.clone(),
    };
    let app = http::router::build_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on {}", addr);
    info!("PayPal environment: {:?}", config.paypal.environment());

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
