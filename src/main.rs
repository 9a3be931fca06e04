mod config;
mod error;
mod prompt;
mod routes;
mod services;
mod state;
mod store;
mod translate;
mod upstream;

use services::gateway::Gateway;
use store::StateStore;
use store::storage::{FileStorage, KvStorage, MemoryStorage};
use translate::Translator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cfg = config::AppConfig::from_env().expect("invalid configuration");

    let gateway = Gateway::init(&cfg.upstream, cfg.limits.max_prompt_chars).expect("upstream client init failed");
    if !gateway.is_configured() {
        tracing::warn!("REPLICATE_API_TOKEN not set; generation requests will fail with E_CONFIGURATION");
    }
    let translator = Translator::from_config(&cfg.translate);

    let storage: Box<dyn KvStorage> = if cfg.store.path.as_os_str().is_empty() {
        tracing::warn!("STORE_PATH is empty; history and usage are kept in memory only");
        Box::new(MemoryStorage::new(cfg.store.capacity_bytes))
    } else {
        let file =
            FileStorage::open(cfg.store.path.clone(), cfg.store.capacity_bytes).expect("state store open failed");
        tracing::info!(path = %file.path().display(), "state store opened");
        Box::new(file)
    };
    let store = StateStore::open(storage, cfg.store.history_limit, cfg.store.usage_retention_days);
    let store = store::spawn_store(store);

    let state = state::AppState::new(gateway, translator, store, cfg.limits);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = cfg.port, "fluxgate listening");
    axum::serve(listener, app).await.expect("server failed");
}
