//! Summary entries: each entity joined with its detail document and labels

use parl_common::labels::is_mismatch;
use parl_common::text::{pick_value, present};
use parl_common::{AiLabel, CrossTab, DetailDocument, Entity, HumanLabel};
use serde::Serialize;

/// Shown when neither the entity nor its document carries a position
pub const POSITION_FALLBACK: &str = "Non renseigne";

/// Display identity after applying the document's identity override
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityFields {
    pub display_name: String,
    pub parti: String,
    pub departement: String,
    pub commune: String,
}

/// Full name, else "prenom nom", else "Nom inconnu".
pub fn display_name(full_name: &str, prenom: &str, nom: &str) -> String {
    if !full_name.is_empty() {
        return full_name.to_string();
    }
    let joined = [prenom, nom]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        "Nom inconnu".to_string()
    } else {
        joined
    }
}

/// Identity fields, with the document's `identity` object taking precedence
/// over the list record field by field.
pub fn identity_fields(entity: &Entity, details: Option<&DetailDocument>) -> IdentityFields {
    let identity = details.and_then(|d| d.identity.as_ref());
    let pick = |from_identity: Option<&Option<String>>, from_entity: &Option<String>| {
        pick_value(
            from_identity.and_then(|value| value.as_deref()),
            from_entity.as_deref(),
        )
    };

    let full_name = pick(identity.map(|i| &i.full_name), &entity.full_name);
    let prenom = pick(identity.map(|i| &i.prenom), &entity.prenom);
    let nom = pick(identity.map(|i| &i.nom), &entity.nom);

    IdentityFields {
        display_name: display_name(&full_name, &prenom, &nom),
        parti: pick(identity.map(|i| &i.parti), &entity.parti),
        departement: pick(identity.map(|i| &i.departement), &entity.departement),
        commune: pick(identity.map(|i| &i.commune), &entity.commune),
    }
}

/// Human-reported position: the list record's, else the document's.
pub fn position_value(entity: &Entity, details: Option<&DetailDocument>) -> Option<String> {
    let from_identity = details
        .and_then(|d| d.identity.as_ref())
        .and_then(|i| i.position.as_deref());
    present(entity.position.as_deref())
        .or_else(|| present(from_identity))
        .map(str::to_string)
}

/// One summary table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    /// Entity id, empty when the list record has none
    pub id: String,
    #[serde(flatten)]
    pub identity: IdentityFields,
    pub position: Option<String>,
    pub ai: AiLabel,
    pub human: HumanLabel,
    pub mismatch: bool,
}

impl SummaryEntry {
    pub fn build(entity: &Entity, details: Option<&DetailDocument>) -> Self {
        let position = position_value(entity, details);
        let ai = AiLabel::from_details(details);
        let human = HumanLabel::from_position(position.as_deref());

        Self {
            id: entity.key().unwrap_or_default().to_string(),
            identity: identity_fields(entity, details),
            position,
            ai,
            human,
            mismatch: is_mismatch(ai, human),
        }
    }

    pub fn position_text(&self) -> &str {
        self.position.as_deref().unwrap_or(POSITION_FALLBACK)
    }
}

/// (human, AI) cell restricting the summary table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixFilter {
    pub human: HumanLabel,
    pub ai: AiLabel,
}

impl MatrixFilter {
    /// Reads the filter from query parameters; unknown or partial labels mean no filter.
    pub fn from_query(human: Option<&str>, ai: Option<&str>) -> Option<Self> {
        Some(Self {
            human: HumanLabel::parse(human?)?,
            ai: AiLabel::parse(ai?)?,
        })
    }

    /// Filter after selecting `cell`: selecting the active cell clears it.
    pub fn toggle(current: Option<Self>, cell: Self) -> Option<Self> {
        if current == Some(cell) {
            None
        } else {
            Some(cell)
        }
    }

    pub fn matches(&self, entry: &SummaryEntry) -> bool {
        entry.human == self.human && entry.ai == self.ai
    }
}

pub fn crosstab(entries: &[SummaryEntry]) -> CrossTab {
    CrossTab::build(entries.iter().map(|entry| (entry.human, entry.ai)))
}

/// Table rows after the optional matrix filter
pub fn filter_entries(entries: &[SummaryEntry], filter: Option<MatrixFilter>) -> Vec<&SummaryEntry> {
    entries
        .iter()
        .filter(|entry| filter.map_or(true, |f| f.matches(entry)))
        .collect()
}
