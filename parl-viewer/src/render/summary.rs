//! Summary view: comparison matrix and entity table

use parl_common::{AiLabel, CrossTab, HumanLabel};

use super::{escape_html, states, Location};
use crate::summary::{crosstab, filter_entries, MatrixFilter, SummaryEntry};

/// Inputs of the summary view
pub struct SummaryView<'a> {
    /// Entries of the text-filtered list
    pub entries: &'a [SummaryEntry],
    /// Size of the whole roster
    pub roster_total: usize,
    pub query: &'a str,
    pub filter: Option<MatrixFilter>,
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "n/a"
    } else {
        value
    }
}

fn matrix_cell(view: &SummaryView<'_>, human: HumanLabel, ai: AiLabel, count: usize) -> String {
    let cell = MatrixFilter { human, ai };
    if count == 0 {
        return r#"<td class="matrix-cell"><span class="matrix-cell-btn" aria-disabled="true">0</span></td>"#
            .to_string();
    }
    let active = view.filter == Some(cell);
    let target = Location::summary(view.query, MatrixFilter::toggle(view.filter, cell));
    format!(
        r#"<td class="matrix-cell"><a class="matrix-cell-btn{}" href="{}" data-human="{}" data-ai="{}">{}</a></td>"#,
        if active { " is-active" } else { "" },
        escape_html(&target.href()),
        escape_html(human.as_str()),
        escape_html(ai.as_str()),
        count
    )
}

fn matrix(view: &SummaryView<'_>, tab: &CrossTab) -> String {
    let header: String = AiLabel::ALL
        .iter()
        .map(|ai| format!("<th>{}</th>", escape_html(ai.as_str())))
        .collect();

    let rows: String = tab
        .rows()
        .map(|(human, counts)| {
            let cells: String = AiLabel::ALL
                .iter()
                .zip(counts.iter())
                .map(|(&ai, &count)| matrix_cell(view, human, ai, count))
                .collect();
            format!(
                r#"<tr><th>{}</th>{}<td class="matrix-total">{}</td></tr>"#,
                escape_html(human.as_str()),
                cells,
                tab.human_total(human)
            )
        })
        .collect();

    let footer: String = AiLabel::ALL
        .iter()
        .map(|&ai| format!(r#"<td class="matrix-total">{}</td>"#, tab.ai_total(ai)))
        .collect();

    format!(
        r#"<table class="summary-table summary-matrix">
    <thead><tr><th>Humain \ IA</th>{header}<th>Total</th></tr></thead>
    <tbody>{rows}</tbody>
    <tfoot><tr><th>Total</th>{footer}<td class="matrix-total">{total}</td></tr></tfoot>
</table>"#,
        header = header,
        rows = rows,
        footer = footer,
        total = tab.total(),
    )
}

fn entry_row(entry: &SummaryEntry, query: &str) -> String {
    let name = escape_html(&entry.identity.display_name);
    let name_cell = if entry.id.is_empty() {
        name
    } else {
        format!(
            r#"<a href="{}">{}</a>"#,
            escape_html(&Location::detail(&entry.id, query).href()),
            name
        )
    };

    format!(
        r#"<tr class="{mismatch}" data-member-id="{id}">
    <td class="cell-name">{name}</td>
    <td>{parti}</td>
    <td>{departement}</td>
    <td>{commune}</td>
    <td class="cell-status"><span class="status-pill {ai_class}">{ai}</span></td>
    <td class="cell-status"><span class="status-pill {human_class}">{human}</span></td>
    <td class="cell-position">{position}</td>
</tr>"#,
        mismatch = if entry.mismatch { "is-mismatch" } else { "" },
        id = escape_html(&entry.id),
        name = name_cell,
        parti = escape_html(or_na(&entry.identity.parti)),
        departement = escape_html(or_na(&entry.identity.departement)),
        commune = escape_html(or_na(&entry.identity.commune)),
        ai_class = entry.ai.css_class(),
        ai = escape_html(entry.ai.as_str()),
        human_class = entry.human.css_class(),
        human = escape_html(entry.human.as_str()),
        position = escape_html(entry.position_text()),
    )
}

/// "N suivis" when the text filter keeps everyone, else "N affiches sur M".
pub fn count_note(shown: usize, roster_total: usize) -> String {
    if shown == roster_total {
        format!("{} suivis", shown)
    } else {
        format!("{} affiches sur {}", shown, roster_total)
    }
}

pub fn render_summary(view: &SummaryView<'_>) -> String {
    if view.entries.is_empty() {
        return states::empty("Aucun parlementaire.");
    }

    let tab = crosstab(view.entries);
    let rows = filter_entries(view.entries, view.filter);

    let filter_banner = view
        .filter
        .map(|filter| {
            format!(
                r#"<div class="summary-filter">
        <div class="summary-filter-label">{}</div>
        <a class="summary-filter-clear" href="{}">Tout afficher</a>
    </div>"#,
                escape_html(&format!(
                    "Filtre actif: Humain {} / IA {} ({})",
                    filter.human,
                    filter.ai,
                    rows.len()
                )),
                escape_html(&Location::summary(view.query, None).href()),
            )
        })
        .unwrap_or_default();

    let table_rows: String = rows
        .iter()
        .map(|entry| entry_row(entry, view.query))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<div class="summary-header">
    <div>
        <div class="member-kicker">Recapitulatif</div>
        <h2>Parlementaires suivis</h2>
        <div class="member-sub">{note}</div>
        {filter_banner}
    </div>
</div>

<section class="summary-section">
    <div class="section-title">Comparaison IA / Humain</div>
    <div class="summary-table-wrapper">
{matrix}
    </div>
</section>

<section class="summary-section">
    <div class="section-title">Tous les parlementaires</div>
    <div class="summary-table-wrapper">
        <table class="summary-table summary-table-main">
            <thead>
                <tr><th>Nom</th><th>Parti</th><th>Departement</th><th>Commune</th><th>IA</th><th>Humain</th><th>Position</th></tr>
            </thead>
            <tbody>
{table_rows}
            </tbody>
        </table>
    </div>
</section>"#,
        note = escape_html(&count_note(view.entries.len(), view.roster_total)),
        filter_banner = filter_banner,
        matrix = matrix(view, &tab),
        table_rows = table_rows,
    )
}
