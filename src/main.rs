mod config;
mod content_loader;
mod hot_reload;
mod listing;
mod markdown;
mod models;
mod routes;
mod slug;
mod state;
mod templates;

use std::{net::SocketAddr, sync::Arc};

use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::hot_reload::start_template_watcher;
use crate::routes::build_router;
use crate::state::{AppState, RouterState};
use crate::templates::Templates;

#[tokio::main]
async fn main() {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load configuration");
    info!(
        development = config.development,
        endpoint = %config.posts_endpoint,
        order = ?config.date_order,
        "Configuration loaded"
    );

    let templates = Templates::load(&config.templates_dir)
        .await
        .expect("Failed to load templates");
    let state = Arc::new(AppState::new(&config, templates));

    let (tx, _rx) = broadcast::channel(1);
    if config.development {
        info!("Hot reload enabled. Check logs for template change events.");
        start_template_watcher(tx.clone(), state.clone(), config.templates_dir.clone());
    }

    let router_state = RouterState {
        app_state: state,
        broadcaster: tx,
    };
    let app = build_router(router_state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await.expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
