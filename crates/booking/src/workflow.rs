//! Order placement entry point.

use std::sync::Arc;

use inventory_store::{InventoryStore, OrderRecord, StoreError};
use tracing::Instrument;

use crate::coordinator::ReservationCoordinator;
use crate::error::OrderError;
use crate::persister::OrderPersister;
use crate::request::{PlaceOrder, ReservationRequest};
use crate::state::WorkflowState;

/// Validates an order, reserves its seats, and records it.
///
/// The storage handle is created once per process and injected here; the
/// workflow keeps no other shared state, so one instance serves any number
/// of concurrent placements.
pub struct OrderWorkflow<S: InventoryStore> {
    store: Arc<S>,
}

impl<S: InventoryStore> Clone for OrderWorkflow<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: InventoryStore> OrderWorkflow<S> {
    /// Creates a workflow over the given store handle.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places an order: `Validating → Reserving → Persisting → Committed`.
    ///
    /// The attempt runs on its own task and always reaches a terminal state,
    /// even if the returned future is dropped midway. A reservation taken
    /// before the caller goes away is still either recorded or compensated.
    #[tracing::instrument(skip_all)]
    pub async fn place_order(&self, order: PlaceOrder) -> Result<OrderRecord, OrderError>
    where
        S: 'static,
    {
        let workflow = self.clone();
        let task = tokio::spawn(async move { workflow.execute(order).await }.in_current_span());

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::error!(error = %e, "order task cancelled before finishing");
                Err(OrderError::Interrupted)
            }
        }
    }

    /// Lists every persisted order, oldest first.
    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.store.list_orders().await
    }

    async fn execute(&self, order: PlaceOrder) -> Result<OrderRecord, OrderError> {
        metrics::counter!("order_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.run(order).await;

        metrics::histogram!("order_workflow_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        match &result {
            Ok(order) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(
                    order_id = %order.id,
                    seats = order.total_seats(),
                    "order committed"
                );
            }
            Err(e) => {
                metrics::counter!("orders_rejected_total", "kind" => e.kind()).increment(1);
                if matches!(e, OrderError::PersistenceInconsistency { .. }) {
                    tracing::error!(
                        error = %e,
                        "seats reserved but order not recorded, needs reconciliation"
                    );
                } else {
                    tracing::warn!(kind = e.kind(), error = %e, "order not placed");
                }
            }
        }
        result
    }

    async fn run(&self, order: PlaceOrder) -> Result<OrderRecord, OrderError> {
        let mut state = WorkflowState::default();

        let request = match ReservationRequest::validate(order) {
            Ok(request) => request,
            Err(e) => {
                advance(&mut state, false);
                return Err(e.into());
            }
        };
        advance(&mut state, true);

        let store = &*self.store;
        let granted = match ReservationCoordinator::new(store).reserve(&request).await {
            Ok(granted) => granted,
            Err(failure) => {
                advance(&mut state, false);
                return Err(failure.into());
            }
        };
        advance(&mut state, true);

        match OrderPersister::new(store).persist(&request, &granted).await {
            Ok(record) => {
                advance(&mut state, true);
                Ok(record)
            }
            Err(source) => {
                advance(&mut state, false);
                Err(OrderError::PersistenceInconsistency { granted, source })
            }
        }
    }
}

fn advance(state: &mut WorkflowState, succeeded: bool) {
    let next = if succeeded {
        state.on_success()
    } else {
        state.on_failure()
    };
    if let Some(next) = next {
        tracing::debug!(from = %state, to = %next, "workflow transition");
        if next.is_terminal() {
            tracing::debug!(state = %next, "workflow finished");
        }
        *state = next;
    }
}
