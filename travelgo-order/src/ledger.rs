use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use travelgo_core::{BookingLedger, BookingResult, LedgerEntry, NewLedgerEntry, RemoveOutcome};
use travelgo_shared::{BookingId, OwnerId};

struct LedgerState {
    next_id: i64,
    entries: BTreeMap<BookingId, LedgerEntry>,
}

/// In-memory booking ledger with monotonically assigned ids
pub struct LedgerBook {
    state: Mutex<LedgerState>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                next_id: 1,
                entries: BTreeMap::new(),
            }),
        }
    }

    pub async fn get(&self, booking_id: BookingId) -> Option<LedgerEntry> {
        self.state.lock().await.entries.get(&booking_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }
}

impl Default for LedgerBook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingLedger for LedgerBook {
    async fn append(&self, entry: NewLedgerEntry) -> BookingResult<BookingId> {
        let mut state = self.state.lock().await;
        let id = BookingId(state.next_id);
        state.next_id += 1;

        state.entries.insert(
            id,
            LedgerEntry {
                id,
                owner: entry.owner,
                service_id: entry.service_id,
                details: entry.details,
                total_price: entry.total_price,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> BookingResult<Vec<LedgerEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<LedgerEntry> = state
            .entries
            .values()
            .filter(|e| &e.owner == owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn remove(&self, booking_id: BookingId, owner: &OwnerId) -> BookingResult<RemoveOutcome> {
        let mut state = self.state.lock().await;
        let owned = state
            .entries
            .get(&booking_id)
            .map(|e| &e.owner == owner)
            .unwrap_or(false);

        if !owned {
            return Ok(RemoveOutcome::NotFoundOrForbidden);
        }

        Ok(state
            .entries
            .remove(&booking_id)
            .map(RemoveOutcome::Removed)
            .unwrap_or(RemoveOutcome::NotFoundOrForbidden))
    }
}
