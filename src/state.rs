use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::{Config, DateOrder};
use crate::content_loader::PostSource;
use crate::templates::Templates;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub templates: RwLock<Templates>,
    pub http: reqwest::Client,
    pub source: PostSource,
    pub owner_name: String,
    pub date_order: DateOrder,
    pub is_development: bool,
}

impl AppState {
    pub fn new(config: &Config, templates: Templates) -> Self {
        Self {
            templates: RwLock::new(templates),
            http: reqwest::Client::new(),
            source: PostSource {
                endpoint: config.posts_endpoint.clone(),
                timeout: config.fetch_timeout(),
            },
            owner_name: config.owner_name.clone(),
            date_order: config.date_order,
            is_development: config.development,
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
