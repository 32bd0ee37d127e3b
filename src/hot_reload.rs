use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use notify_debouncer_full::{
    new_debouncer, DebouncedEvent,
    notify::{RecursiveMode, Watcher, Error as NotifyError},
};
use tracing::{debug, error, info};

use crate::state::{AppState, RefreshBroadcaster};
use crate::templates::reload_templates;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, tx))
}

async fn handle_socket(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    if rx.recv().await.is_ok()
        && socket.send(Message::Text("reload".into())).await.is_err()
    {
        debug!("Client disconnected before reload message could be sent");
    }
}

/// Editor scratch files (Emacs `.#name`, `name~` backups, vim `.swp`).
fn is_temp_file(event: &DebouncedEvent) -> bool {
    event.event.paths.iter().any(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|s| s.starts_with(".#") || s.ends_with('~') || s.ends_with(".swp"))
    })
}

fn is_relevant(event: &DebouncedEvent) -> bool {
    (event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) && !is_temp_file(event)
}

/// Reloads templates when files under `dir` change and tells connected
/// browsers to refresh.
pub fn start_template_watcher(tx: RefreshBroadcaster, app_state: Arc<AppState>, dir: PathBuf) {
    info!("Starting template watcher for hot-reload on {}", dir.display());
    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = tokio::sync::mpsc::channel(1);

        let debouncer = new_debouncer(Duration::from_millis(200), None, move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| {
            match res {
                Ok(events) => {
                    let relevant: Vec<&DebouncedEvent> = events.iter().filter(|e| is_relevant(e)).collect();
                    if !relevant.is_empty() {
                        debug!("Relevant file change detected: {:?}", relevant.iter().flat_map(|e| &e.event.paths).map(|p| p.display()).collect::<Vec<_>>());
                        if let Err(e) = watcher_tx.blocking_send(()) {
                            error!("Failed to send watcher event: {}", e);
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Watcher error: {}", e);
                    }
                }
            }
        });

        let mut debouncer = match debouncer {
            Ok(debouncer) => debouncer,
            Err(e) => {
                error!("Failed to create debouncer, hot reload disabled: {}", e);
                return;
            }
        };
        if let Err(e) = debouncer.watcher().watch(&dir, RecursiveMode::Recursive) {
            error!("Failed to watch {}, hot reload disabled: {}", dir.display(), e);
            return;
        }

        while watcher_rx.recv().await.is_some() {
            info!("Template change detected, reloading and sending signal...");
            reload_templates(&app_state, dir.clone()).await;

            if let Err(e) = tx.send(()) {
                debug!("No browser listening for reload: {}", e);
            }
        }
    });
}
