//! parl-viewer library - read-only viewer for the parliamentarian dataset
//!
//! Loads the list index once, fetches per-entity detail documents on demand
//! (with a bounded-concurrency prefetch for the summary) and serves
//! server-rendered pages comparing AI and human classifications.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod api;
pub mod loader;
pub mod render;
pub mod report;
pub mod session;
pub mod sources;
pub mod summary;

use loader::{load_list, DataLocation, DetailStore, JsonSource, ListLoadFailure};
use session::{Roster, Session};

/// Outcome of the startup list load
pub enum Catalog {
    Ready(Arc<Session>),
    /// Every page renders this failure; there is no partial UI
    Failed(ListLoadFailure),
}

impl Catalog {
    /// Loads the list index and builds the session around it.
    pub async fn load(source: Arc<dyn JsonSource>, location: &DataLocation) -> Self {
        match load_list(source.as_ref(), location).await {
            Ok(entities) => {
                let store = DetailStore::new(source, location.details_root.clone());
                Catalog::Ready(Arc::new(Session::new(Roster::new(entities), store)))
            }
            Err(e) => {
                error!(url = %location.list_url, error = %e, "List load failed");
                Catalog::Failed(ListLoadFailure::from_error(&e, location))
            }
        }
    }

    pub fn session(&self) -> Option<&Arc<Session>> {
        match self {
            Catalog::Ready(session) => Some(session),
            Catalog::Failed(_) => None,
        }
    }

    /// Warms the detail cache in the background.
    pub fn spawn_warmup(&self) {
        if let Some(session) = self.session() {
            let session = Arc::clone(session);
            tokio::spawn(async move {
                let report = session.prefetch_all().await;
                info!(
                    fetched = report.fetched,
                    failed = report.failed,
                    "Detail cache warm-up finished"
                );
            });
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::index_page))
        .route("/api/summary", get(api::get_summary))
        .route("/api/entity/:id", get(api::get_entity))
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/static/app.css", get(api::serve_app_css))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
