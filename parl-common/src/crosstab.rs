//! Cross-tabulation of human labels against AI labels

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::labels::{AiLabel, HumanLabel};

const HUMAN_COUNT: usize = HumanLabel::ALL.len();
const AI_COUNT: usize = AiLabel::ALL.len();

/// Count matrix (human label x AI label) with row, column and grand totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossTab {
    cells: [[usize; AI_COUNT]; HUMAN_COUNT],
    human_totals: [usize; HUMAN_COUNT],
    ai_totals: [usize; AI_COUNT],
    total: usize,
}

impl CrossTab {
    /// Tallies one (human, AI) pair per entity in a single pass.
    ///
    /// ```
    /// use parl_common::{AiLabel, CrossTab, HumanLabel};
    ///
    /// let tab = CrossTab::build([
    ///     (HumanLabel::Oui, AiLabel::Oui),
    ///     (HumanLabel::Oui, AiLabel::Non),
    ///     (HumanLabel::Autre, AiLabel::NonAnalyse),
    /// ]);
    /// assert_eq!(tab.count(HumanLabel::Oui, AiLabel::Oui), 1);
    /// assert_eq!(tab.human_total(HumanLabel::Oui), 2);
    /// assert_eq!(tab.total(), 3);
    /// ```
    pub fn build<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (HumanLabel, AiLabel)>,
    {
        let mut tab = Self::default();
        for (human, ai) in pairs {
            tab.cells[human.index()][ai.index()] += 1;
            tab.human_totals[human.index()] += 1;
            tab.ai_totals[ai.index()] += 1;
            tab.total += 1;
        }
        tab
    }

    pub fn count(&self, human: HumanLabel, ai: AiLabel) -> usize {
        self.cells[human.index()][ai.index()]
    }

    pub fn human_total(&self, human: HumanLabel) -> usize {
        self.human_totals[human.index()]
    }

    pub fn ai_total(&self, ai: AiLabel) -> usize {
        self.ai_totals[ai.index()]
    }

    /// Grand total, equal to the number of tallied entities
    pub fn total(&self) -> usize {
        self.total
    }

    /// Rows in display order, each with its cells in AI column order
    pub fn rows(&self) -> impl Iterator<Item = (HumanLabel, &[usize; AI_COUNT])> + '_ {
        HumanLabel::ALL
            .into_iter()
            .map(move |human| (human, &self.cells[human.index()]))
    }
}

#[derive(Serialize)]
struct RowView<'a> {
    human: HumanLabel,
    counts: &'a [usize; AI_COUNT],
    total: usize,
}

impl Serialize for CrossTab {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows()
            .map(|(human, counts)| RowView {
                human,
                counts,
                total: self.human_total(human),
            })
            .collect();

        let mut state = serializer.serialize_struct("CrossTab", 5)?;
        state.serialize_field("ai_categories", &AiLabel::ALL)?;
        state.serialize_field("human_categories", &HumanLabel::ALL)?;
        state.serialize_field("rows", &rows)?;
        state.serialize_field("ai_totals", &self.ai_totals)?;
        state.serialize_field("total", &self.total)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<(HumanLabel, AiLabel)> {
        vec![
            (HumanLabel::Oui, AiLabel::Oui),
            (HumanLabel::Oui, AiLabel::Oui),
            (HumanLabel::Oui, AiLabel::Non),
            (HumanLabel::Incertain, AiLabel::Incertain),
            (HumanLabel::NonRenseigne, AiLabel::NonAnalyse),
            (HumanLabel::Autre, AiLabel::ErreurJson),
            (HumanLabel::Autre, AiLabel::Oui),
        ]
    }

    #[test]
    fn test_empty_input() {
        let tab = CrossTab::build(Vec::new());
        assert_eq!(tab.total(), 0);
        assert!(tab.rows().all(|(_, cells)| cells.iter().all(|&c| c == 0)));
    }

    #[test]
    fn test_cells_sum_to_entity_count() {
        let pairs = sample();
        let tab = CrossTab::build(pairs.iter().copied());
        let cell_sum: usize = tab.rows().map(|(_, cells)| cells.iter().sum::<usize>()).sum();
        assert_eq!(cell_sum, pairs.len());
        assert_eq!(tab.total(), pairs.len());
    }

    #[test]
    fn test_row_and_column_totals_match_cells() {
        let tab = CrossTab::build(sample());
        for (human, cells) in tab.rows() {
            assert_eq!(tab.human_total(human), cells.iter().sum::<usize>());
        }
        for ai in AiLabel::ALL {
            let column: usize = HumanLabel::ALL.iter().map(|&h| tab.count(h, ai)).sum();
            assert_eq!(tab.ai_total(ai), column);
        }
        let column_sum: usize = AiLabel::ALL.iter().map(|&a| tab.ai_total(a)).sum();
        assert_eq!(column_sum, tab.total());
    }

    #[test]
    fn test_specific_cells() {
        let tab = CrossTab::build(sample());
        assert_eq!(tab.count(HumanLabel::Oui, AiLabel::Oui), 2);
        assert_eq!(tab.count(HumanLabel::Oui, AiLabel::Non), 1);
        assert_eq!(tab.count(HumanLabel::Autre, AiLabel::ErreurJson), 1);
        assert_eq!(tab.count(HumanLabel::Incertain, AiLabel::Non), 0);
        assert_eq!(tab.ai_total(AiLabel::Oui), 3);
    }

    #[test]
    fn test_serialized_shape() {
        let tab = CrossTab::build(vec![(HumanLabel::Oui, AiLabel::Non)]);
        let json = serde_json::to_value(&tab).unwrap();
        assert_eq!(json["ai_categories"][3], "ERREUR JSON");
        assert_eq!(json["human_categories"][2], "Non renseigne");
        assert_eq!(json["rows"][0]["human"], "OUI");
        assert_eq!(json["rows"][0]["counts"][2], 1);
        assert_eq!(json["rows"][0]["total"], 1);
        assert_eq!(json["ai_totals"][2], 1);
        assert_eq!(json["total"], 1);
    }
}
