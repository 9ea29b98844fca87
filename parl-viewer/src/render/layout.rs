//! Page shell and sidebar entity list

use parl_common::text::pick_value;
use parl_common::Entity;

use super::{escape_html, Location};
use crate::summary::display_name;

/// Sidebar content for one page
pub struct Sidebar<'a> {
    pub query: &'a str,
    pub meta: String,
    pub entities: &'a [&'a Entity],
    pub active_id: Option<&'a str>,
}

/// Full HTML document. `refresh_secs` adds an automatic reload.
pub fn page(title: &str, sidebar: Option<&Sidebar<'_>>, main: &str, refresh_secs: Option<u32>) -> String {
    let refresh = refresh_secs
        .map(|secs| format!(r#"<meta http-equiv="refresh" content="{}">"#, secs))
        .unwrap_or_default();
    let sidebar_html = sidebar.map(render_sidebar).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {refresh}
    <title>{title}</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
<div class="app-shell">
    {sidebar_html}
    <main id="mainContent" class="main-pane">
        {main}
    </main>
</div>
</body>
</html>
"#,
        refresh = refresh,
        title = escape_html(title),
        sidebar_html = sidebar_html,
        main = main,
    )
}

fn render_sidebar(sidebar: &Sidebar<'_>) -> String {
    let home = Location::summary(sidebar.query, None).href();

    format!(
        r#"<aside class="sidebar">
        <div class="sidebar-header">
            <a class="home-btn" id="homeBtn" href="{home}">Recapitulatif</a>
            <div class="sidebar-meta" id="sidebarMeta">{meta}</div>
        </div>
        <form class="sidebar-filter" method="get" action="/">
            <input type="search" id="parliamentFilterInput" name="q" value="{query}" placeholder="Filtrer (nom, parti, departement...)">
            <button type="submit">Filtrer</button>
            <a class="clear-btn" id="clearSearchBtn" href="/">Effacer</a>
        </form>
        <nav class="parliament-list" id="parliamentList">
            {list}
        </nav>
    </aside>"#,
        home = escape_html(&home),
        meta = escape_html(&sidebar.meta),
        query = escape_html(sidebar.query),
        list = entity_list(sidebar.entities, sidebar.active_id, sidebar.query),
    )
}

/// "parti - departement - commune", or "Infos manquantes".
pub fn entity_meta_line(entity: &Entity) -> String {
    let parts: Vec<String> = [&entity.parti, &entity.departement, &entity.commune]
        .into_iter()
        .map(|field| pick_value(field.as_deref(), None))
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        "Infos manquantes".to_string()
    } else {
        parts.join(" - ")
    }
}

/// Name from the list record alone.
pub fn entity_name(entity: &Entity) -> String {
    display_name(
        &pick_value(entity.full_name.as_deref(), None),
        &pick_value(entity.prenom.as_deref(), None),
        &pick_value(entity.nom.as_deref(), None),
    )
}

pub fn entity_list(entities: &[&Entity], active_id: Option<&str>, query: &str) -> String {
    if entities.is_empty() {
        return r#"<div class="list-empty">Aucun resultat.</div>"#.to_string();
    }

    entities
        .iter()
        .map(|entity| {
            let id = entity.key();
            let active = id.is_some() && id == active_id;
            let class = if active { "parliament-item active" } else { "parliament-item" };
            let body = format!(
                r#"<span class="parliament-name">{}</span><span class="parliament-meta">{}</span>"#,
                escape_html(&entity_name(entity)),
                escape_html(&entity_meta_line(entity)),
            );
            match id {
                Some(id) => format!(
                    r#"<a class="{}" href="{}">{}</a>"#,
                    class,
                    escape_html(&Location::detail(id, query).href()),
                    body
                ),
                None => format!(r#"<div class="{}">{}</div>"#, class, body),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(value: serde_json::Value) -> Entity {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_meta_line_and_name_fallbacks() {
        let full = entity(json!({"id": "1", "full_name": "A B", "parti": "LR", "commune": "Nice"}));
        assert_eq!(entity_name(&full), "A B");
        assert_eq!(entity_meta_line(&full), "LR - Nice");

        let bare = entity(json!({"id": "2", "parti": "nan"}));
        assert_eq!(entity_name(&bare), "Nom inconnu");
        assert_eq!(entity_meta_line(&bare), "Infos manquantes");
    }

    #[test]
    fn test_entity_list_marks_active_and_escapes() {
        let a = entity(json!({"id": "1", "full_name": "<b>A</b>"}));
        let b = entity(json!({"id": "2", "full_name": "B"}));
        let html = entity_list(&[&a, &b], Some("2"), "");

        assert!(html.contains("&lt;b&gt;A&lt;/b&gt;"));
        assert!(html.contains(r#"<a class="parliament-item active" href="/?id=2">"#));
        assert!(html.contains(r#"<a class="parliament-item" href="/?id=1">"#));
    }

    #[test]
    fn test_empty_list() {
        assert!(entity_list(&[], None, "").contains("Aucun resultat."));
    }

    #[test]
    fn test_page_refresh_and_title() {
        let html = page("Vue & test", None, "<p>x</p>", Some(2));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="2">"#));
        assert!(html.contains("<title>Vue &amp; test</title>"));
        assert!(!page("t", None, "", None).contains("http-equiv"));
    }
}
