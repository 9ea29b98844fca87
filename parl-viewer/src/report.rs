//! Command-line report: the comparison matrix without the web UI

use parl_common::{AiLabel, CrossTab};
use serde::Serialize;

use crate::loader::PrefetchReport;
use crate::session::Session;
use crate::summary::crosstab;

#[derive(Debug, Serialize)]
pub struct Report {
    pub query: String,
    pub roster_total: usize,
    pub shown: usize,
    pub mismatches: usize,
    pub prefetch: PrefetchReport,
    pub matrix: CrossTab,
}

impl Report {
    /// Prefetches the filtered entities and tallies their labels.
    pub async fn build(session: &Session, query: &str) -> Self {
        let query = query.trim();
        let entities = session.roster().filter(query);
        let prefetch = session.store().prefetch(entities.iter().copied()).await;
        let entries = session.summary_entries(&entities);

        Self {
            query: query.to_string(),
            roster_total: session.roster().len(),
            shown: entries.len(),
            mismatches: entries.iter().filter(|entry| entry.mismatch).count(),
            prefetch,
            matrix: crosstab(&entries),
        }
    }

    /// Fixed-width text table followed by the counters.
    pub fn to_text(&self) -> String {
        const FIRST: usize = 14;
        const CELL: usize = 12;

        let mut out = format!("{:<FIRST$}", "Humain \\ IA");
        for ai in AiLabel::ALL {
            out.push_str(&format!("{:>CELL$}", ai.as_str()));
        }
        out.push_str(&format!("{:>CELL$}\n", "Total"));

        for (human, counts) in self.matrix.rows() {
            out.push_str(&format!("{:<FIRST$}", human.as_str()));
            for count in counts {
                out.push_str(&format!("{:>CELL$}", count));
            }
            out.push_str(&format!("{:>CELL$}\n", self.matrix.human_total(human)));
        }

        out.push_str(&format!("{:<FIRST$}", "Total"));
        for ai in AiLabel::ALL {
            out.push_str(&format!("{:>CELL$}", self.matrix.ai_total(ai)));
        }
        out.push_str(&format!("{:>CELL$}\n\n", self.matrix.total()));

        if self.shown == self.roster_total {
            out.push_str(&format!("{} suivis\n", self.shown));
        } else {
            out.push_str(&format!("{} affiches sur {}\n", self.shown, self.roster_total));
        }
        out.push_str(&format!("Desaccords IA / humain: {}\n", self.mismatches));
        if self.prefetch.failed > 0 {
            out.push_str(&format!("Details en echec: {}\n", self.prefetch.failed));
        }
        out
    }
}
