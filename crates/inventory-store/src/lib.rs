pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod seed;
pub mod store;

pub use common::{ClassId, OrderId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryInventoryStore, StoreCalls};
pub use postgres::PostgresInventoryStore;
pub use record::{ClassRecord, DecrementResult, GrantedSeats, Money, NewOrder, OrderRecord};
pub use store::InventoryStore;
