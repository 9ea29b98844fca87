//! Session context: roster, detail cache and summary request sequencing
//!
//! A summary request prefetches every detail document of the filtered list
//! before it can render. A later request from the same client (another
//! summary, or a detail view) cancels that client's earlier ticket; the
//! earlier request still fills the cache but reports
//! [`SummaryOutcome::Superseded`] instead of rendering. Clients are keyed
//! independently, so one client never suppresses another's summary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use parl_common::text::normalize;
use parl_common::{DetailDocument, Entity};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::loader::{DetailStore, PrefetchReport};
use crate::summary::SummaryEntry;

/// Shown by the detail view when the store holds no error for the entity
pub const MISSING_DETAILS: &str = "Details manquants.";

/// Immutable entity list with an id index
#[derive(Debug, Default)]
pub struct Roster {
    entities: Vec<Entity>,
    by_id: HashMap<String, usize>,
}

impl Roster {
    pub fn new(entities: Vec<Entity>) -> Self {
        // Later records win on duplicate ids.
        let by_id = entities
            .iter()
            .enumerate()
            .filter_map(|(index, entity)| entity.key().map(|id| (id.to_string(), index)))
            .collect();
        Self { entities, by_id }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.by_id
            .get(id.trim())
            .and_then(|&index| self.entities.get(index))
    }

    /// Entities whose name, party or location contains `query`, ignoring
    /// case and accents. A blank query keeps everything.
    pub fn filter(&self, query: &str) -> Vec<&Entity> {
        let needle = normalize(query.trim());
        if needle.is_empty() {
            return self.entities.iter().collect();
        }
        self.entities
            .iter()
            .filter(|entity| haystack(entity).contains(&needle))
            .collect()
    }

    /// Sidebar counter for `visible` entities out of the roster.
    pub fn meta_text(&self, visible: usize) -> String {
        let total = self.len();
        if total == 0 {
            "Aucun parlementaire".to_string()
        } else if visible == total {
            format!("{} suivis", total)
        } else {
            format!("{} / {} visibles", visible, total)
        }
    }
}

fn haystack(entity: &Entity) -> String {
    let fields = [
        &entity.full_name,
        &entity.nom,
        &entity.prenom,
        &entity.parti,
        &entity.departement,
        &entity.commune,
    ];
    let joined = fields
        .iter()
        .map(|field| field.as_deref().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}

/// Handle of one summary request
#[derive(Debug, Clone)]
pub struct SummaryTicket {
    client: String,
    seq: u64,
    token: CancellationToken,
}

impl SummaryTicket {
    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
pub enum SummaryOutcome {
    Ready(Vec<SummaryEntry>),
    /// A later request took over; the caller must not render this one
    Superseded,
}

/// Pending summary of one client
#[derive(Debug)]
struct PendingSummary {
    seq: u64,
    token: CancellationToken,
}

pub struct Session {
    roster: Roster,
    store: DetailStore,
    summary_seq: AtomicU64,
    client_seq: AtomicU64,
    /// At most one pending summary per client key
    pending: Mutex<HashMap<String, PendingSummary>>,
}

impl Session {
    pub fn new(roster: Roster, store: DetailStore) -> Self {
        Self {
            roster,
            store,
            summary_seq: AtomicU64::new(0),
            client_seq: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn store(&self) -> &DetailStore {
        &self.store
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, PendingSummary>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh key for a client that has none yet.
    pub fn new_client_id(&self) -> String {
        let n = self.client_seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{:x}-{}", std::process::id(), n)
    }

    /// Number of clients with a summary in flight
    pub fn pending_summaries(&self) -> usize {
        self.pending().len()
    }

    /// Starts a summary request for `client`, superseding that client's
    /// earlier one. Other clients are unaffected.
    pub fn begin_summary(&self, client: &str) -> SummaryTicket {
        let token = CancellationToken::new();
        let mut pending = self.pending();
        let seq = self.summary_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = pending.insert(
            client.to_string(),
            PendingSummary {
                seq,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
            debug!(client, seq = previous.seq, "Summary superseded by a newer one");
        }
        SummaryTicket {
            client: client.to_string(),
            seq,
            token,
        }
    }

    /// Navigating to a detail view supersedes the client's pending summary.
    pub fn begin_detail(&self, client: &str) {
        if let Some(previous) = self.pending().remove(client) {
            previous.token.cancel();
            debug!(client, seq = previous.seq, "Detail view superseded pending summary");
        }
    }

    /// True while the ticket's client has issued no later request.
    pub fn is_current(&self, ticket: &SummaryTicket) -> bool {
        !ticket.is_cancelled()
            && self
                .pending()
                .get(&ticket.client)
                .is_some_and(|pending| pending.seq == ticket.seq)
    }

    /// Prefetches `entities`, then builds their summary entries if `ticket`
    /// is still current.
    pub async fn load_summary(&self, ticket: &SummaryTicket, entities: &[&Entity]) -> SummaryOutcome {
        self.store.prefetch(entities.iter().copied()).await;

        {
            let mut pending = self.pending();
            let current = !ticket.is_cancelled()
                && pending
                    .get(&ticket.client)
                    .is_some_and(|entry| entry.seq == ticket.seq);
            if !current {
                debug!(seq = ticket.seq, "Summary request superseded, render suppressed");
                return SummaryOutcome::Superseded;
            }
            pending.remove(&ticket.client);
        }
        SummaryOutcome::Ready(self.summary_entries(entities))
    }

    /// Entries from whatever is cached now, without fetching.
    pub fn summary_entries(&self, entities: &[&Entity]) -> Vec<SummaryEntry> {
        entities
            .iter()
            .map(|entity| {
                let details = entity.key().and_then(|id| self.store.detail(id));
                SummaryEntry::build(entity, details.as_deref())
            })
            .collect()
    }

    /// Document for the detail view, or the message explaining its absence.
    pub async fn load_detail(&self, entity: &Entity) -> Result<Arc<DetailDocument>, String> {
        if let Some(details) = self.store.fetch_details(entity).await {
            return Ok(details);
        }
        Err(entity
            .key()
            .and_then(|id| self.store.failure(id))
            .unwrap_or_else(|| MISSING_DETAILS.to_string()))
    }

    /// Prefetches every entity of the roster.
    pub async fn prefetch_all(&self) -> PrefetchReport {
        self.store.prefetch(self.roster.entities()).await
    }
}
