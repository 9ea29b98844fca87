//! HTML pages: summary view and detail view
//!
//! The page is addressed by its query string (`id`, `q`, `human`, `ai`), so
//! reloading or sharing a link restores the same view. Summary staleness is
//! tracked per browser through the `parl_client` cookie.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use parl_common::Entity;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::loader::ListLoadFailure;
use crate::render::detail::render_detail;
use crate::render::layout::{page, Sidebar};
use crate::render::states::{self, DETAIL_LOAD_FAILED, LOADING_REFRESH_SECS, LOADING_SUMMARY};
use crate::render::summary::{render_summary, SummaryView};
use crate::render::Location;
use crate::session::{Session, SummaryOutcome};
use crate::summary::{identity_fields, MatrixFilter};
use crate::{AppState, Catalog};

const APP_TITLE: &str = "Parlementaires suivis";

/// Cookie naming the browser whose summary requests supersede each other
pub const CLIENT_COOKIE: &str = "parl_client";

/// Query parameters of the main page
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub id: Option<String>,
    pub q: Option<String>,
    pub human: Option<String>,
    pub ai: Option<String>,
}

/// GET /
pub async fn index_page(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let session = match state.catalog.as_ref() {
        Catalog::Ready(session) => session,
        Catalog::Failed(failure) => return list_failure_page(failure),
    };

    let (client, is_new_client) = match client_key(&headers) {
        Some(key) => (key, false),
        None => (session.new_client_id(), true),
    };

    let mut response = render_page(session, &client, &params).await;
    if is_new_client {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", CLIENT_COOKIE, client);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Client key from the request cookies, if the browser sent one.
fn client_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CLIENT_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        .map(str::to_string)
}

async fn render_page(session: &Session, client: &str, params: &PageQuery) -> Response {
    let query = params.q.as_deref().unwrap_or_default().trim();
    let filter = MatrixFilter::from_query(params.human.as_deref(), params.ai.as_deref());
    let visible = session.roster().filter(query);

    let requested_id = params.id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    if let Some(id) = requested_id {
        return match session.roster().get(id) {
            Some(entity) => detail_page(session, client, entity, query, &visible).await,
            None => {
                debug!(id, "Unknown entity id, redirecting to summary");
                Redirect::to(&Location::summary(query, filter).href()).into_response()
            }
        };
    }

    summary_page(session, client, query, filter, &visible).await
}

fn sidebar<'a>(session: &Session, query: &'a str, visible: &'a [&'a Entity], active_id: Option<&'a str>) -> Sidebar<'a> {
    Sidebar {
        query,
        meta: session.roster().meta_text(visible.len()),
        entities: visible,
        active_id,
    }
}

async fn summary_page(
    session: &Session,
    client: &str,
    query: &str,
    filter: Option<MatrixFilter>,
    visible: &[&Entity],
) -> Response {
    let ticket = session.begin_summary(client);
    let side = sidebar(session, query, visible, None);

    match session.load_summary(&ticket, visible).await {
        SummaryOutcome::Ready(entries) => {
            let main = render_summary(&SummaryView {
                entries: &entries,
                roster_total: session.roster().len(),
                query,
                filter,
            });
            Html(page(APP_TITLE, Some(&side), &main, None)).into_response()
        }
        SummaryOutcome::Superseded => {
            let main = states::loading(LOADING_SUMMARY);
            Html(page(APP_TITLE, Some(&side), &main, Some(LOADING_REFRESH_SECS))).into_response()
        }
    }
}

async fn detail_page(
    session: &Session,
    client: &str,
    entity: &Entity,
    query: &str,
    visible: &[&Entity],
) -> Response {
    session.begin_detail(client);
    let side = sidebar(session, query, visible, entity.key());

    match session.load_detail(entity).await {
        Ok(details) => {
            let title = identity_fields(entity, Some(&*details)).display_name;
            let main = render_detail(entity, &details);
            Html(page(&title, Some(&side), &main, None)).into_response()
        }
        Err(message) => {
            warn!(id = entity.key(), error = %message, "Member load failed");
            let main = states::error(DETAIL_LOAD_FAILED, Some(&message));
            (
                StatusCode::BAD_GATEWAY,
                Html(page(APP_TITLE, Some(&side), &main, None)),
            )
                .into_response()
        }
    }
}

/// Full-page list error, without sidebar or partial content.
fn list_failure_page(failure: &ListLoadFailure) -> Response {
    let main = states::error(&failure.message, Some(&failure.details));
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(page(APP_TITLE, None, &main, None)),
    )
        .into_response()
}
