use std::sync::{Arc, Mutex};

use watchdesk_admin_api::{config, facade::Facade, server};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up WATCHDESK_PORT, STORAGE_DATA_DIR, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting WatchDesk mock admin API in {:?} mode", config.environment);

    let facade = Arc::new(Mutex::new(Facade::with_default_storage()));
    let app = server::app(facade);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 WatchDesk mock admin API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
