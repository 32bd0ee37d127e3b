use std::{path::Path as FsPath, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, get_service},
    Router,
};
use tower_http::services::ServeDir;
use tracing::{debug, info};

use crate::content_loader::fetch_posts;
use crate::hot_reload::ws_handler;
use crate::listing::{find_by_slug, sort_for_home};
use crate::state::{AppState, RouterState};
use crate::templates::{render_home, render_post, render_static, SiteContext, StaticPage};

pub fn build_router(router_state: RouterState, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/home", get(homepage))
        .route("/post/{slug}", get(show_post))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .nest_service("/static", get_service(ServeDir::new(static_dir)))
        .route("/ws", get(ws_handler))
        .with_state(router_state)
}

async fn homepage(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut posts = fetch_posts(&state.http, &state.source).await;
    sort_for_home(&mut posts, state.date_order);
    debug!(count = posts.len(), "Rendering home page");

    let site = SiteContext::now(&state.owner_name);
    let templates = state.templates.read().await;
    Html(render_home(&templates, &posts, &site, state.is_development))
}

async fn show_post(Path(slug): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let posts = fetch_posts(&state.http, &state.source).await;
    let Some(post) = find_by_slug(&posts, &slug) else {
        info!(%slug, "No post matches slug");
        return (StatusCode::NOT_FOUND, "Post not found").into_response();
    };

    let site = SiteContext::now(&state.owner_name);
    let templates = state.templates.read().await;
    Html(render_post(&templates, post, &site, state.is_development)).into_response()
}

async fn about(State(state): State<Arc<AppState>>) -> Html<String> {
    static_page(&state, StaticPage::About).await
}

async fn contact(State(state): State<Arc<AppState>>) -> Html<String> {
    static_page(&state, StaticPage::Contact).await
}

async fn static_page(state: &AppState, page: StaticPage) -> Html<String> {
    let site = SiteContext::now(&state.owner_name);
    let templates = state.templates.read().await;
    Html(render_static(&templates, page, &site, state.is_development))
}
