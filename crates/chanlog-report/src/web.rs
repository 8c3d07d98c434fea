//! HTML viewer over HTTP.
//!
//! The snapshot is reloaded on every request, so pages reflect the last save
//! of a running ingest process.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use chanlog_core::{
    query::{self, Detail, OrderKey},
    render,
    snapshot::{LoadStatus, SnapshotPersister},
    store::ActivityStore,
};

#[derive(Clone)]
pub struct WebState {
    pub persister: Arc<SnapshotPersister>,
}

impl WebState {
    fn load(&self) -> ActivityStore {
        let (store, status) = self.persister.load();
        if let LoadStatus::Discarded(e) = status {
            tracing::warn!("snapshot unusable: {e}");
        }
        store
    }
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/list", get(list_default))
        .route("/list/:order", get(list_ordered))
        .route("/user/:nick", get(user_detail))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve(bind_addr: &str, state: WebState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("report viewer listening on http://{bind_addr}/list");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn list_default(State(state): State<WebState>) -> Html<String> {
    list_page(&state.load(), OrderKey::Nick)
}

/// Unrecognized orderings fall back to nick order.
async fn list_ordered(State(state): State<WebState>, Path(order): Path<String>) -> Html<String> {
    let key = order.parse().unwrap_or_default();
    list_page(&state.load(), key)
}

async fn user_detail(State(state): State<WebState>, Path(nick): Path<String>) -> Response {
    let store = state.load();
    match query::detail(&store, &nick) {
        Detail::Found(record) => Html(render::detail_html(record)).into_response(),
        Detail::NotFound => not_found().await.into_response(),
    }
}

async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html("<h2>Not found</h2>"))
}

fn list_page(store: &ActivityStore, key: OrderKey) -> Html<String> {
    Html(render::list_html(&query::list(store, key)))
}
