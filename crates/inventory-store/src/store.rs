use async_trait::async_trait;

use crate::{ClassId, ClassRecord, DecrementResult, NewOrder, OrderRecord, Result};

/// Core trait for inventory storage.
///
/// Every method is a single-record operation; the store offers no
/// multi-record transactions. All implementations must be thread-safe
/// (Send + Sync) and are shared across concurrent order placements.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Takes `seats` from a class if and only if it currently has at least
    /// that many available.
    ///
    /// The check and the mutation happen in one atomic storage operation.
    /// An unknown class yields [`DecrementResult::NotSatisfied`].
    async fn conditional_decrement(&self, class_id: &ClassId, seats: u32)
    -> Result<DecrementResult>;

    /// Returns `seats` to a class without any guard.
    async fn unconditional_increment(&self, class_id: &ClassId, seats: u32) -> Result<()>;

    /// Looks up a class by identity.
    async fn find_class(&self, class_id: &ClassId) -> Result<Option<ClassRecord>>;

    /// Inserts a new order. The store assigns the identity and creation timestamp.
    async fn insert_order(&self, order: NewOrder) -> Result<OrderRecord>;

    /// Adds a class to the catalog.
    async fn insert_class(&self, class: ClassRecord) -> Result<()>;

    /// Lists every class in the catalog, ordered by identity.
    async fn list_classes(&self) -> Result<Vec<ClassRecord>>;

    /// Lists every persisted order, oldest first.
    async fn list_orders(&self) -> Result<Vec<OrderRecord>>;
}
