//! Entity API: one detail document with its labels

use axum::{
    extract::{Path, State},
    Json,
};
use parl_common::DetailDocument;
use serde::Serialize;

use super::ApiError;
use crate::sources::used_source_indices;
use crate::summary::SummaryEntry;
use crate::{AppState, Catalog};

#[derive(Debug, Serialize)]
pub struct EntityResponse {
    #[serde(flatten)]
    pub summary: SummaryEntry,
    pub used_sources: Vec<usize>,
    pub details: DetailDocument,
}

/// GET /api/entity/:id
pub async fn get_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EntityResponse>, ApiError> {
    let session = match state.catalog.as_ref() {
        Catalog::Ready(session) => session,
        Catalog::Failed(failure) => return Err(ApiError::Unavailable(failure.clone())),
    };

    let entity = session
        .roster()
        .get(&id)
        .ok_or_else(|| ApiError::UnknownEntity(id.clone()))?;

    let details = session
        .load_detail(entity)
        .await
        .map_err(|message| ApiError::DetailUnavailable { id, message })?;

    Ok(Json(EntityResponse {
        summary: SummaryEntry::build(entity, Some(&*details)),
        used_sources: used_source_indices(Some(&*details), details.search_results.len()),
        details: DetailDocument::clone(&details),
    }))
}
