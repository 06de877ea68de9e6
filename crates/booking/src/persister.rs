//! Writes the order record once every reservation is committed.

use inventory_store::{GrantedSeats, InventoryStore, NewOrder, OrderRecord, StoreError};

use crate::request::ReservationRequest;

/// Performs the single insert of a fully reserved order.
///
/// A failure here is returned as-is; reversing the already-committed
/// reservations is left to manual reconciliation.
pub struct OrderPersister<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: InventoryStore + ?Sized> OrderPersister<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip_all, fields(items = granted.len()))]
    pub async fn persist(
        &self,
        request: &ReservationRequest,
        granted: &[GrantedSeats],
    ) -> Result<OrderRecord, StoreError> {
        let order = NewOrder {
            name: request.name().to_string(),
            phone: request.phone().to_string(),
            items: granted.to_vec(),
        };

        let record = self.store.insert_order(order).await?;
        tracing::info!(order_id = %record.id, "order inserted");
        Ok(record)
    }
}
