//! Summary API: cross-tabulation and entries as JSON

use axum::{
    extract::{Query, State},
    Json,
};
use parl_common::CrossTab;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::loader::PrefetchReport;
use crate::summary::{crosstab, SummaryEntry};
use crate::{AppState, Catalog};

/// Query parameters for the summary
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// Text filter (name, party, departement, commune)
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub query: String,
    pub roster_total: usize,
    pub shown: usize,
    pub mismatches: usize,
    pub prefetch: PrefetchReport,
    pub matrix: CrossTab,
    pub entries: Vec<SummaryEntry>,
}

/// GET /api/summary
///
/// Prefetches the filtered entities' documents before answering.
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let session = match state.catalog.as_ref() {
        Catalog::Ready(session) => session,
        Catalog::Failed(failure) => return Err(ApiError::Unavailable(failure.clone())),
    };

    let text = query.q.unwrap_or_default().trim().to_string();
    let entities = session.roster().filter(&text);
    let prefetch = session.store().prefetch(entities.iter().copied()).await;
    let entries = session.summary_entries(&entities);

    Ok(Json(SummaryResponse {
        query: text,
        roster_total: session.roster().len(),
        shown: entries.len(),
        mismatches: entries.iter().filter(|entry| entry.mismatch).count(),
        prefetch,
        matrix: crosstab(&entries),
        entries,
    }))
}
