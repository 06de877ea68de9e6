use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    ClassId, ClassRecord, DecrementResult, NewOrder, OrderId, OrderRecord, Result, StoreError,
    store::InventoryStore,
};

/// Number of calls made against each storage operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCalls {
    pub conditional_decrement: usize,
    pub unconditional_increment: usize,
    pub find_class: usize,
    pub insert_order: usize,
    pub insert_class: usize,
    pub list: usize,
}

impl StoreCalls {
    /// Total number of calls across every operation.
    pub fn total(&self) -> usize {
        self.conditional_decrement
            + self.unconditional_increment
            + self.find_class
            + self.insert_order
            + self.insert_class
            + self.list
    }
}

#[derive(Debug, Default)]
struct CallCounters {
    conditional_decrement: AtomicUsize,
    unconditional_increment: AtomicUsize,
    find_class: AtomicUsize,
    insert_order: AtomicUsize,
    insert_class: AtomicUsize,
    list: AtomicUsize,
}

impl CallCounters {
    fn snapshot(&self) -> StoreCalls {
        StoreCalls {
            conditional_decrement: self.conditional_decrement.load(Ordering::SeqCst),
            unconditional_increment: self.unconditional_increment.load(Ordering::SeqCst),
            find_class: self.find_class.load(Ordering::SeqCst),
            insert_order: self.insert_order.load(Ordering::SeqCst),
            insert_class: self.insert_class.load(Ordering::SeqCst),
            list: self.list.load(Ordering::SeqCst),
        }
    }
}

/// Injected failures, each surfaced as [`StoreError::Unavailable`].
#[derive(Debug, Default)]
struct Faults {
    decrement: HashSet<ClassId>,
    increment: HashSet<ClassId>,
    find_class: bool,
    insert_order: bool,
}

#[derive(Debug, Default)]
struct InMemoryState {
    classes: BTreeMap<ClassId, ClassRecord>,
    orders: Vec<OrderRecord>,
    faults: Faults,
}

/// In-memory inventory store.
///
/// Each operation runs under a single write lock, so the guarded decrement is
/// atomic with respect to every other caller sharing the store. Besides
/// serving as the default backend, it records per-operation call counts and
/// supports injected failures for exercising compensation paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    state: Arc<RwLock<InMemoryState>>,
    calls: Arc<CallCounters>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given classes.
    ///
    /// Later entries replace earlier ones with the same identity.
    pub fn seeded(classes: impl IntoIterator<Item = ClassRecord>) -> Self {
        let classes = classes
            .into_iter()
            .map(|class| (class.id.clone(), class))
            .collect();
        Self {
            state: Arc::new(RwLock::new(InMemoryState {
                classes,
                ..InMemoryState::default()
            })),
            calls: Arc::default(),
        }
    }

    /// Returns the calls made so far against each operation.
    pub fn calls(&self) -> StoreCalls {
        self.calls.snapshot()
    }

    /// Returns the current seat count of a class, bypassing call accounting.
    pub async fn available_seats(&self, class_id: &ClassId) -> Option<u32> {
        self.state
            .read()
            .await
            .classes
            .get(class_id)
            .map(|class| class.available_seats)
    }

    /// Returns the number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Makes every decrement of the given class fail as if the store were down.
    pub async fn fail_decrement_of(&self, class_id: impl Into<ClassId>) {
        self.state
            .write()
            .await
            .faults
            .decrement
            .insert(class_id.into());
    }

    /// Makes every restoring increment of the given class fail.
    pub async fn fail_increment_of(&self, class_id: impl Into<ClassId>) {
        self.state
            .write()
            .await
            .faults
            .increment
            .insert(class_id.into());
    }

    /// Configures lookups to fail.
    pub async fn set_fail_on_find(&self, fail: bool) {
        self.state.write().await.faults.find_class = fail;
    }

    /// Configures order inserts to fail.
    pub async fn set_fail_on_insert_order(&self, fail: bool) {
        self.state.write().await.faults.insert_order = fail;
    }

    /// Removes every injected failure.
    pub async fn clear_faults(&self) {
        self.state.write().await.faults = Faults::default();
    }
}

fn injected(operation: &str) -> StoreError {
    StoreError::Unavailable(format!("injected failure on {operation}"))
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn conditional_decrement(
        &self,
        class_id: &ClassId,
        seats: u32,
    ) -> Result<DecrementResult> {
        self.calls
            .conditional_decrement
            .fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;

        if state.faults.decrement.contains(class_id) {
            return Err(injected("conditional_decrement"));
        }

        match state.classes.get_mut(class_id) {
            Some(class) if class.available_seats >= seats => {
                class.available_seats -= seats;
                Ok(DecrementResult::Applied(class.clone()))
            }
            _ => Ok(DecrementResult::NotSatisfied),
        }
    }

    async fn unconditional_increment(&self, class_id: &ClassId, seats: u32) -> Result<()> {
        self.calls
            .unconditional_increment
            .fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;

        if state.faults.increment.contains(class_id) {
            return Err(injected("unconditional_increment"));
        }

        let Some(class) = state.classes.get_mut(class_id) else {
            tracing::warn!(%class_id, seats, "increment matched no class");
            return Ok(());
        };

        class.available_seats = class.available_seats.checked_add(seats).ok_or_else(|| {
            StoreError::InvalidRecord(format!("seat count overflow for class {class_id}"))
        })?;
        Ok(())
    }

    async fn find_class(&self, class_id: &ClassId) -> Result<Option<ClassRecord>> {
        self.calls.find_class.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;

        if state.faults.find_class {
            return Err(injected("find_class"));
        }

        Ok(state.classes.get(class_id).cloned())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<OrderRecord> {
        self.calls.insert_order.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;

        if state.faults.insert_order {
            return Err(injected("insert_order"));
        }

        let record = OrderRecord {
            id: OrderId::new(),
            name: order.name,
            phone: order.phone,
            items: order.items,
            created_at: Utc::now(),
        };
        state.orders.push(record.clone());
        Ok(record)
    }

    async fn insert_class(&self, class: ClassRecord) -> Result<()> {
        self.calls.insert_class.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;

        if state.classes.contains_key(&class.id) {
            return Err(StoreError::DuplicateClass(class.id));
        }
        state.classes.insert(class.id.clone(), class);
        Ok(())
    }

    async fn list_classes(&self) -> Result<Vec<ClassRecord>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.read().await.classes.values().cloned().collect())
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.read().await.orders.clone())
    }
}
