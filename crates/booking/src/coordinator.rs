//! Reservation coordinator driving the per-item decrement sequence.

use inventory_store::{DecrementResult, GrantedSeats, InventoryStore};

use crate::decrement::ConditionalDecrement;
use crate::error::{InsufficientInventory, ReservationFailure};
use crate::ledger::CompensationLedger;
use crate::request::{ReservationItem, ReservationRequest};

/// Turns a reservation request into committed reservations, or into no net
/// change at all.
///
/// Items are reserved strictly one at a time in request order. The first
/// failure stops the sequence, and every reservation already taken is
/// reversed before returning. Later items are never attempted.
pub struct ReservationCoordinator<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: InventoryStore + ?Sized> ReservationCoordinator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Reserves every item of the request.
    ///
    /// The same class may appear more than once; each occurrence is its own
    /// guarded decrement and sees the effect of the earlier ones.
    #[tracing::instrument(skip_all, fields(items = request.items().len()))]
    pub async fn reserve(
        &self,
        request: &ReservationRequest,
    ) -> Result<Vec<GrantedSeats>, ReservationFailure> {
        let decrement = ConditionalDecrement::new(self.store);
        let mut ledger = CompensationLedger::new();

        for item in request.items() {
            match decrement.apply(item).await {
                Ok(DecrementResult::Applied(_)) => {
                    ledger.record(item.class_id().clone(), item.seats());
                }
                Ok(DecrementResult::NotSatisfied) => {
                    let shortfall = self.describe_shortfall(item).await;
                    tracing::warn!(
                        class_id = %shortfall.class_id,
                        requested = shortfall.requested,
                        available = ?shortfall.available,
                        reserved_before = ledger.len(),
                        "not enough seats, rolling back"
                    );
                    let compensation = ledger.compensate_all(self.store).await;
                    return Err(ReservationFailure::Insufficient {
                        shortfall,
                        compensation,
                    });
                }
                Err(source) => {
                    tracing::error!(
                        class_id = %item.class_id(),
                        error = %source,
                        reserved_before = ledger.len(),
                        "store failed while reserving, rolling back"
                    );
                    let compensation = ledger.compensate_all(self.store).await;
                    return Err(ReservationFailure::Infrastructure {
                        class_id: item.class_id().clone(),
                        source,
                        compensation,
                    });
                }
            }
        }

        Ok(ledger.into_granted())
    }

    /// Re-reads the failed class for the error report. Purely diagnostic:
    /// a failed read only drops the extra detail.
    async fn describe_shortfall(&self, item: &ReservationItem) -> InsufficientInventory {
        let (title, available) = match self.store.find_class(item.class_id()).await {
            Ok(Some(class)) => (Some(class.title), Some(class.available_seats)),
            Ok(None) => (None, Some(0)),
            Err(e) => {
                tracing::warn!(
                    class_id = %item.class_id(),
                    error = %e,
                    "could not re-read class for diagnostics"
                );
                (None, None)
            }
        };

        InsufficientInventory {
            class_id: item.class_id().clone(),
            title,
            requested: item.seats(),
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use common::ClassId;
    use inventory_store::{ClassRecord, InMemoryInventoryStore};

    use super::*;
    use crate::ledger::CompensationReport;

    fn request(items: &[(&str, u32)]) -> ReservationRequest {
        ReservationRequest::new(
            "Ada",
            "07700900000",
            items
                .iter()
                .map(|(id, seats)| ReservationItem::new(*id, *seats))
                .collect(),
        )
        .unwrap()
    }

    fn store() -> InMemoryInventoryStore {
        InMemoryInventoryStore::seeded([
            ClassRecord::new("a", "Class A", 5),
            ClassRecord::new("b", "Class B", 4),
            ClassRecord::new("c", "Class C", 2),
        ])
    }

    async fn seats(store: &InMemoryInventoryStore, id: &str) -> Option<u32> {
        store.available_seats(&ClassId::new(id)).await
    }

    #[tokio::test]
    async fn grants_every_item_in_order() {
        let store = store();
        let coordinator = ReservationCoordinator::new(&store);

        let granted = coordinator
            .reserve(&request(&[("b", 1), ("a", 3)]))
            .await
            .unwrap();

        assert_eq!(
            granted,
            vec![GrantedSeats::new("b", 1), GrantedSeats::new("a", 3)]
        );
        assert_eq!(seats(&store, "a").await, Some(2));
        assert_eq!(seats(&store, "b").await, Some(3));
    }

    #[tokio::test]
    async fn failure_reverses_prior_items_and_skips_later_ones() {
        let store = store();
        let coordinator = ReservationCoordinator::new(&store);

        let result = coordinator
            .reserve(&request(&[("a", 3), ("b", 10), ("c", 1)]))
            .await;

        let Err(ReservationFailure::Insufficient {
            shortfall,
            compensation,
        }) = result
        else {
            panic!("expected insufficient inventory");
        };
        assert_eq!(shortfall.class_id, ClassId::new("b"));
        assert_eq!(shortfall.title.as_deref(), Some("Class B"));
        assert_eq!(shortfall.requested, 10);
        assert_eq!(shortfall.available, Some(4));
        assert_eq!(compensation, CompensationReport { restored: 1, failed: 0 });

        assert_eq!(seats(&store, "a").await, Some(5));
        assert_eq!(seats(&store, "b").await, Some(4));
        assert_eq!(seats(&store, "c").await, Some(2));
        assert_eq!(store.calls().conditional_decrement, 2);
    }

    #[tokio::test]
    async fn repeated_class_sees_earlier_decrement() {
        let store = InMemoryInventoryStore::seeded([ClassRecord::new("a", "Class A", 3)]);
        let coordinator = ReservationCoordinator::new(&store);

        let result = coordinator.reserve(&request(&[("a", 2), ("a", 2)])).await;

        let Err(ReservationFailure::Insufficient { shortfall, .. }) = result else {
            panic!("expected insufficient inventory");
        };
        assert_eq!(shortfall.available, Some(1));
        assert_eq!(seats(&store, "a").await, Some(3));
    }

    #[tokio::test]
    async fn unknown_class_reports_zero_available() {
        let store = store();
        let coordinator = ReservationCoordinator::new(&store);

        let result = coordinator.reserve(&request(&[("ghost", 1)])).await;

        let Err(ReservationFailure::Insufficient { shortfall, .. }) = result else {
            panic!("expected insufficient inventory");
        };
        assert_eq!(shortfall.title, None);
        assert_eq!(shortfall.available, Some(0));
    }

    #[tokio::test]
    async fn failed_diagnostic_read_keeps_primary_failure() {
        let store = store();
        store.set_fail_on_find(true).await;
        let coordinator = ReservationCoordinator::new(&store);

        let result = coordinator.reserve(&request(&[("a", 1), ("c", 5)])).await;

        let Err(ReservationFailure::Insufficient { shortfall, .. }) = result else {
            panic!("expected insufficient inventory");
        };
        assert_eq!(shortfall.class_id, ClassId::new("c"));
        assert_eq!(shortfall.title, None);
        assert_eq!(shortfall.available, None);
        assert_eq!(seats(&store, "a").await, Some(5));
    }

    #[tokio::test]
    async fn store_failure_mid_sequence_is_compensated() {
        let store = store();
        store.fail_decrement_of("c").await;
        let coordinator = ReservationCoordinator::new(&store);

        let result = coordinator
            .reserve(&request(&[("a", 1), ("b", 1), ("c", 1)]))
            .await;

        let Err(ReservationFailure::Infrastructure {
            class_id,
            compensation,
            ..
        }) = result
        else {
            panic!("expected infrastructure failure");
        };
        assert_eq!(class_id, ClassId::new("c"));
        assert_eq!(compensation.restored, 2);
        assert_eq!(seats(&store, "a").await, Some(5));
        assert_eq!(seats(&store, "b").await, Some(4));
        assert_eq!(store.calls().find_class, 0);
    }

    #[tokio::test]
    async fn failed_compensation_does_not_change_outcome() {
        let store = store();
        store.fail_increment_of("a").await;
        let coordinator = ReservationCoordinator::new(&store);

        let result = coordinator.reserve(&request(&[("a", 2), ("c", 9)])).await;

        let Err(ReservationFailure::Insufficient {
            shortfall,
            compensation,
        }) = result
        else {
            panic!("expected insufficient inventory");
        };
        assert_eq!(shortfall.class_id, ClassId::new("c"));
        assert_eq!(compensation, CompensationReport { restored: 0, failed: 1 });
        assert_eq!(seats(&store, "a").await, Some(3));
    }
}
