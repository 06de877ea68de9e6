//! Guarded single-class seat reservation.

use inventory_store::{DecrementResult, InventoryStore, StoreError};

use crate::request::ReservationItem;

/// Takes the seats of one reservation item in a single atomic store call.
///
/// The guard (`available >= requested`) is evaluated by the store at the
/// moment of mutation. There is deliberately no read-then-write path here.
pub struct ConditionalDecrement<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: InventoryStore + ?Sized> ConditionalDecrement<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Applies the reservation, returning the post-decrement record or
    /// [`DecrementResult::NotSatisfied`]. Store failures are returned as-is
    /// and never retried.
    pub async fn apply(&self, item: &ReservationItem) -> Result<DecrementResult, StoreError> {
        let result = self
            .store
            .conditional_decrement(item.class_id(), item.seats())
            .await;

        let outcome = match &result {
            Ok(DecrementResult::Applied(class)) => {
                tracing::debug!(
                    class_id = %item.class_id(),
                    seats = item.seats(),
                    remaining = class.available_seats,
                    "seats reserved"
                );
                "applied"
            }
            Ok(DecrementResult::NotSatisfied) => "not_satisfied",
            Err(_) => "error",
        };
        metrics::counter!("seat_decrements_total", "outcome" => outcome).increment(1);

        result
    }
}
