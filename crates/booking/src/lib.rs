//! All-or-nothing seat booking across scheduled classes.
//!
//! The store only offers single-record atomic updates, so placing an order
//! is a saga:
//! 1. Validate the raw request into a [`ReservationRequest`]
//! 2. Take seats class by class with guarded decrements, recording each one
//!    in a [`CompensationLedger`]
//! 3. Persist the order once every item is reserved
//!
//! If any item cannot be reserved, every decrement already applied is
//! reversed before the failure is returned.

pub mod coordinator;
pub mod decrement;
pub mod error;
pub mod ledger;
pub mod persister;
pub mod request;
pub mod state;
pub mod workflow;

pub use coordinator::ReservationCoordinator;
pub use decrement::ConditionalDecrement;
pub use error::{InsufficientInventory, OrderError, ReservationFailure, ValidationError};
pub use ledger::{CompensationEntry, CompensationLedger, CompensationReport};
pub use persister::OrderPersister;
pub use request::{PlaceOrder, ReservationItem, ReservationRequest};
pub use state::WorkflowState;
pub use workflow::OrderWorkflow;
