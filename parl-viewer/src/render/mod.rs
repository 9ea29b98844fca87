//! Server-side HTML rendering
//!
//! Every value interpolated into markup goes through [`escape_html`];
//! [`format_markdown`] escapes first and only then adds its own tags.

pub mod detail;
pub mod layout;
pub mod states;
pub mod summary;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::summary::MatrixFilter;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());

/// Base used only to borrow the URL crate's query encoder
const LINK_BASE: &str = "http://viewer.local/";

/// Escapes `& < > " '` for element content and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escaped text with `**bold**` and `*emphasis*` turned into tags.
///
/// ```
/// use parl_viewer::render::format_markdown;
///
/// assert_eq!(
///     format_markdown("**Oui** selon <la> *presse*"),
///     "<strong>Oui</strong> selon &lt;la&gt; <em>presse</em>"
/// );
/// ```
pub fn format_markdown(value: &str) -> String {
    let escaped = escape_html(value);
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    EMPHASIS.replace_all(&bold, "<em>$1</em>").into_owned()
}

/// Addressable state of the viewer: selected entity, text filter and matrix filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub id: Option<String>,
    pub query: String,
    pub filter: Option<MatrixFilter>,
}

impl Location {
    pub fn summary(query: &str, filter: Option<MatrixFilter>) -> Self {
        Self {
            id: None,
            query: query.to_string(),
            filter,
        }
    }

    /// Detail view of `id`, keeping the text filter.
    pub fn detail(id: &str, query: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            query: query.to_string(),
            filter: None,
        }
    }

    /// Root-relative link to this location.
    pub fn href(&self) -> String {
        let Ok(mut url) = Url::parse(LINK_BASE) else {
            return "/".to_string();
        };
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(id) = &self.id {
                pairs.append_pair("id", id);
            }
            if !self.query.trim().is_empty() {
                pairs.append_pair("q", self.query.trim());
            }
            if let Some(filter) = &self.filter {
                pairs.append_pair("human", filter.human.as_str());
                pairs.append_pair("ai", filter.ai.as_str());
            }
        }
        match url.query() {
            Some(query) if !query.is_empty() => format!("/?{}", query),
            _ => "/".to_string(),
        }
    }
}
