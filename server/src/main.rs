mod config;
mod routes;
mod state;

use tables::TableStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("invalid server config");

    let store = TableStore::open(&config.tables_dir);
    tracing::info!(dir = %config.tables_dir.display(), tables = store.len(), "table store ready");

    let state = state::AppState::new(store);
    let app = routes::app(state);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "roll table server listening");
    axum::serve(listener, app).await.expect("server failed");
}
