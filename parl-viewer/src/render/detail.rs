//! Detail view of one parliamentarian

use std::cmp::Reverse;
use std::collections::HashSet;

use parl_common::dates::{format_analysis_timestamp, format_date, sort_key};
use parl_common::model::{scalar_text, Article};
use parl_common::text::{is_missing, pick_value};
use parl_common::{AiLabel, DetailDocument, Entity, HumanLabel};
use serde_json::Value;

use super::{escape_html, format_markdown};
use crate::sources::used_source_indices;
use crate::summary::{identity_fields, position_value, POSITION_FALLBACK};

/// "Departement: X - Commune: Y", or "Informations incompletes".
pub fn meta_line(departement: &str, commune: &str) -> String {
    let mut parts = Vec::new();
    if !departement.is_empty() {
        parts.push(format!("Departement: {}", departement));
    }
    if !commune.is_empty() {
        parts.push(format!("Commune: {}", commune));
    }
    if parts.is_empty() {
        "Informations incompletes".to_string()
    } else {
        parts.join(" - ")
    }
}

fn tags(parti: &str, departement: &str, commune: &str) -> String {
    let labels: Vec<String> = [("Parti", parti), ("Departement", departement), ("Commune", commune)]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect();

    if labels.is_empty() {
        return r#"<span class="tag">Infos manquantes</span>"#.to_string();
    }
    labels
        .iter()
        .map(|tag| format!(r#"<span class="tag">{}</span>"#, escape_html(tag)))
        .collect()
}

/// Text form of a free-form value, as shown in the justification block.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn justification_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => is_missing(Some(s)),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn justification_item(entry: &Value) -> String {
    let Value::Object(fields) = entry else {
        return format!(
            r#"<li class="justification-item">{}</li>"#,
            format_markdown(&value_text(entry))
        );
    };

    let field = |name: &str| {
        let text = fields.get(name).and_then(scalar_text);
        pick_value(text.as_deref(), None)
    };
    let source = field("source");
    let explication = field("explication");

    if source.is_empty() && explication.is_empty() {
        return format!(
            r#"<li class="justification-item">{}</li>"#,
            escape_html(&entry.to_string())
        );
    }

    let mut html = String::from(r#"<li class="justification-item">"#);
    if !source.is_empty() {
        html.push_str(&format!(
            r#"<div class="justification-source">{}</div>"#,
            escape_html(&source)
        ));
    }
    if !explication.is_empty() {
        html.push_str(&format!(
            r#"<div class="justification-text">{}</div>"#,
            format_markdown(&explication)
        ));
    }
    html.push_str("</li>");
    html
}

pub fn justification(details: &DetailDocument) -> String {
    let value = details.analysis.as_ref().and_then(|a| a.justification.as_ref());
    if justification_missing(value) {
        return r#"<div class="info-hint">Aucune justification disponible.</div>"#.to_string();
    }

    match value {
        Some(Value::Array(entries)) => {
            let items: String = entries.iter().map(justification_item).collect();
            format!(r#"<ul class="justification-list">{}</ul>"#, items)
        }
        Some(other) => format!(
            r#"<div class="justification-text">{}</div>"#,
            format_markdown(&value_text(other))
        ),
        None => String::new(),
    }
}

fn article_card(article: &Article, source_index: usize, used: bool) -> String {
    let title = pick_value(article.title.as_deref(), Some("Sans titre"));
    let snippet = pick_value(article.snippet.as_deref(), None);
    let source = pick_value(article.source.as_deref(), Some("Source inconnue"));
    let link = pick_value(article.link.as_deref(), None);
    let date = format_date(article.date.as_deref());

    let title_html = if link.is_empty() {
        format!(r#"<span class="article-title">{}</span>"#, escape_html(&title))
    } else {
        format!(
            r#"<a class="article-title" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            escape_html(&link),
            escape_html(&title)
        )
    };
    let snippet_html = if snippet.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="article-snippet">{}</div>"#, escape_html(&snippet))
    };
    let badge = if used {
        r#"<span class="article-badge">Utilise par IA</span>"#
    } else {
        ""
    };

    format!(
        r#"<article class="article-card{used_class}">
    {title_html}
    {snippet_html}
    <div class="article-meta">{meta} {badge}</div>
</article>"#,
        used_class = if used { " is-used" } else { "" },
        title_html = title_html,
        snippet_html = snippet_html,
        meta = escape_html(&format!("{} - {} - Source {}", source, date, source_index)),
        badge = badge,
    )
}

/// Articles newest first; each keeps its 1-based position in the document.
pub fn articles(details: &DetailDocument) -> String {
    let results = &details.search_results;
    if results.is_empty() {
        return r#"<div class="list-empty">Aucun article disponible.</div>"#.to_string();
    }

    let used: HashSet<usize> = used_source_indices(Some(details), results.len())
        .into_iter()
        .collect();

    let mut numbered: Vec<(usize, &Article)> =
        results.iter().enumerate().map(|(i, a)| (i + 1, a)).collect();
    numbered.sort_by_key(|(_, article)| Reverse(sort_key(article.date.as_deref())));

    numbered
        .into_iter()
        .map(|(index, article)| article_card(article, index, used.contains(&index)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Main pane for `entity` with its loaded document.
pub fn render_detail(entity: &Entity, details: &DetailDocument) -> String {
    let fields = identity_fields(entity, Some(details));
    let position = position_value(entity, Some(details));
    let ai = AiLabel::from_details(Some(details));
    let human = HumanLabel::from_position(position.as_deref());
    let analyzed_at =
        format_analysis_timestamp(details.analysis.as_ref().and_then(|a| a.analysis_at.as_deref()));

    format!(
        r#"<div class="member-header">
    <div class="member-title">
        <div class="member-kicker">Parlementaire suivi</div>
        <h2>{name}</h2>
        <div class="member-sub">{meta}</div>
    </div>
    <div class="member-tags">{tags}</div>
</div>

<section class="info-grid">
    <div class="info-card">
        <div class="info-label">Classification IA</div>
        <div class="status-pill {ai_class}">{ai_label}</div>
        <div class="info-hint">Est-il present sur une liste ?</div>
        <div class="info-hint">Analyse IA : {analyzed_at}</div>
    </div>
    <div class="info-card">
        <div class="info-label">Position (humain)</div>
        <div class="status-pill {human_class}">{human_label}</div>
        <div class="info-value">{position}</div>
    </div>
</section>

<section>
    <div class="section-title">Justification IA</div>
    <div class="info-card justification-card">{justification}</div>
</section>

<section>
    <div class="section-title">Articles ({article_count})</div>
    <div class="articles-list">
{articles}
    </div>
</section>"#,
        name = escape_html(&fields.display_name),
        meta = escape_html(&meta_line(&fields.departement, &fields.commune)),
        tags = tags(&fields.parti, &fields.departement, &fields.commune),
        ai_class = ai.css_class(),
        ai_label = escape_html(ai.as_str()),
        analyzed_at = escape_html(&analyzed_at),
        human_class = human.css_class(),
        human_label = escape_html(human.as_str()),
        position = escape_html(position.as_deref().unwrap_or(POSITION_FALLBACK)),
        justification = justification(details),
        article_count = details.search_results.len(),
        articles = articles(details),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> DetailDocument {
        DetailDocument::from_json(value).unwrap()
    }

    #[test]
    fn test_meta_line_fallback() {
        assert_eq!(meta_line("Var", "Toulon"), "Departement: Var - Commune: Toulon");
        assert_eq!(meta_line("", "Toulon"), "Commune: Toulon");
        assert_eq!(meta_line("", ""), "Informations incompletes");
    }

    #[test]
    fn test_tags_fallback() {
        assert_eq!(tags("", "", ""), r#"<span class="tag">Infos manquantes</span>"#);
        assert!(tags("LR", "", "").contains("Parti: LR"));
    }

    #[test]
    fn test_justification_variants() {
        assert!(justification(&document(json!({}))).contains("Aucune justification disponible."));
        assert!(justification(&document(json!({"analysis": {"justification": "nan"}})))
            .contains("Aucune justification disponible."));

        let html = justification(&document(json!({
            "analysis": {"justification": "Il est **tete de liste**."}
        })));
        assert!(html.contains("<strong>tete de liste</strong>"));

        let html = justification(&document(json!({
            "analysis": {"justification": [
                {"source": "Source 1", "explication": "Cite *officiellement*"},
                {"autre": 3},
                "Libre"
            ]}
        })));
        assert!(html.contains(r#"<div class="justification-source">Source 1</div>"#));
        assert!(html.contains("<em>officiellement</em>"));
        assert!(html.contains("{&quot;autre&quot;:3}"));
        assert!(html.contains(r#"<li class="justification-item">Libre</li>"#));
    }

    #[test]
    fn test_articles_sorted_newest_first_with_used_badge() {
        let doc = document(json!({
            "analysis": {"used_sources": [2]},
            "search_results": [
                {"title": "Ancien", "date": "2023-01-05", "source": "Le Monde"},
                {"title": "Recent", "date": "2024-03-01", "link": "https://example.org/a?x=1&y=2"},
                {"title": "Sans date"}
            ]
        }));
        let html = articles(&doc);

        let recent = html.find("Recent").unwrap();
        let old = html.find("Ancien").unwrap();
        let undated = html.find("Sans date").unwrap();
        assert!(recent < old && old < undated);

        assert!(html.contains("Source inconnue - 1 mars 2024 - Source 2"));
        assert!(html.contains("Le Monde - 5 janv. 2023 - Source 1"));
        assert!(html.contains("Date inconnue - Source 3"));
        assert_eq!(html.matches("Utilise par IA").count(), 1);
        assert!(html.contains("https://example.org/a?x=1&amp;y=2"));
    }

    #[test]
    fn test_no_articles() {
        assert!(articles(&DetailDocument::default()).contains("Aucun article disponible."));
    }

    #[test]
    fn test_render_detail_cards() {
        let entity: Entity = serde_json::from_value(json!({
            "id": "1", "full_name": "A B", "departement": "Var"
        }))
        .unwrap();
        let doc = document(json!({
            "analysis": {"status": "non", "analysis_at": "2024-01-12T14:05:00Z"},
            "identity": {"position": "Tête de liste"}
        }));

        let html = render_detail(&entity, &doc);
        assert!(html.contains("<h2>A B</h2>"));
        assert!(html.contains(r#"<div class="status-pill status-non">NON</div>"#));
        assert!(html.contains(r#"<div class="status-pill status-oui">OUI</div>"#));
        assert!(html.contains("Analyse IA : 12 janv. 2024, 14:05"));
        assert!(html.contains("Departement: Var"));
        assert!(html.contains("Articles (0)"));
    }

    #[test]
    fn test_render_detail_without_position() {
        let entity: Entity = serde_json::from_value(json!({"id": "1"})).unwrap();
        let html = render_detail(&entity, &DetailDocument::default());
        assert!(html.contains(r#"<div class="status-pill status-empty">Non renseigne</div>"#));
        assert!(html.contains(r#"<div class="info-value">Non renseigne</div>"#));
        assert!(html.contains("Date d&#39;analyse inconnue"));
    }
}
