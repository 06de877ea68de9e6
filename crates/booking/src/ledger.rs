//! Record of reservations taken during one order attempt.

use common::ClassId;
use inventory_store::{GrantedSeats, InventoryStore};

/// Seats to hand back to one class if the attempt fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationEntry {
    pub class_id: ClassId,
    pub seats: u32,
}

/// Outcome of replaying a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompensationReport {
    /// Entries whose seats were handed back.
    pub restored: usize,
    /// Entries whose restoring increment failed and were left unrestored.
    pub failed: usize,
}

impl CompensationReport {
    /// Returns true if every recorded reservation was reversed.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Append-only ledger of successful decrements for a single order attempt.
///
/// The ledger is consumed either by [`CompensationLedger::compensate_all`] on
/// failure or by [`CompensationLedger::into_granted`] on success, so it can be
/// replayed at most once.
#[derive(Debug, Default)]
pub struct CompensationLedger {
    entries: Vec<CompensationEntry>,
}

impl CompensationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a decrement that has just been applied.
    pub fn record(&mut self, class_id: ClassId, seats: u32) {
        self.entries.push(CompensationEntry { class_id, seats });
    }

    pub fn entries(&self) -> &[CompensationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reverses every recorded decrement, in the order they were applied.
    ///
    /// Best-effort: a failed increment is logged and the rest still run.
    #[tracing::instrument(skip_all, fields(entries = self.entries.len()))]
    pub async fn compensate_all<S: InventoryStore + ?Sized>(self, store: &S) -> CompensationReport {
        let mut report = CompensationReport::default();

        for entry in self.entries {
            match store
                .unconditional_increment(&entry.class_id, entry.seats)
                .await
            {
                Ok(()) => {
                    report.restored += 1;
                    tracing::info!(
                        class_id = %entry.class_id,
                        seats = entry.seats,
                        "reservation rolled back"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    metrics::counter!("compensation_failures_total").increment(1);
                    tracing::error!(
                        class_id = %entry.class_id,
                        seats = entry.seats,
                        error = %e,
                        "failed to roll back reservation"
                    );
                }
            }
        }

        if report.restored + report.failed > 0 {
            metrics::counter!("reservation_compensations_total").increment(1);
        }
        report
    }

    /// Discards the ledger after a fully successful attempt, yielding what was granted.
    pub fn into_granted(self) -> Vec<GrantedSeats> {
        self.entries
            .into_iter()
            .map(|entry| GrantedSeats {
                class_id: entry.class_id,
                seats: entry.seats,
            })
            .collect()
    }
}
