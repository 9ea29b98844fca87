//! Loading, error and empty placeholders for the main pane

use super::escape_html;

pub const LOADING_SUMMARY: &str = "Chargement du recapitulatif...";
pub const DETAIL_LOAD_FAILED: &str = "Impossible de charger les details.";

/// Seconds before a loading page reloads itself
pub const LOADING_REFRESH_SECS: u32 = 1;

pub fn loading(message: &str) -> String {
    format!(
        r#"<div class="loading-state"><p>{}</p></div>"#,
        escape_html(message)
    )
}

/// Short message with an optional diagnostic line.
pub fn error(message: &str, details: Option<&str>) -> String {
    let details_html = details
        .filter(|d| !d.is_empty())
        .map(|d| format!(r#"<div class="error-details">{}</div>"#, escape_html(d)))
        .unwrap_or_default();
    format!(
        r#"<div class="error-state"><p>{}</p>{}</div>"#,
        escape_html(message),
        details_html
    )
}

pub fn empty(message: &str) -> String {
    format!(
        r#"<div class="empty-state"><p>{}</p></div>"#,
        escape_html(message)
    )
}
