//! Order placement error taxonomy.

use common::ClassId;
use inventory_store::{GrantedSeats, StoreError};
use thiserror::Error;

use crate::ledger::CompensationReport;
use crate::state::WorkflowState;

/// The raw request is malformed. Nothing was read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is absent, blank, or not text.
    #[error("name is required")]
    MissingName,

    /// Phone is absent, blank, or not text.
    #[error("phone is required")]
    MissingPhone,

    /// No class identities were supplied.
    #[error("at least one class must be requested")]
    NoItems,

    /// A class identity is neither a non-blank string nor an integer.
    #[error("class identity at position {index} is invalid")]
    InvalidClassId { index: usize },
}

/// The first item of an order that could not be reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientInventory {
    pub class_id: ClassId,
    /// `None` when the class does not exist or could not be re-read.
    pub title: Option<String>,
    pub requested: u32,
    /// Seats left when the reservation failed; `None` if the re-read failed.
    pub available: Option<u32>,
}

impl InsufficientInventory {
    /// Title for display, falling back to the class identity.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(self.class_id.as_str())
    }
}

impl std::fmt::Display for InsufficientInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Not enough spots for class \"{}\" (requested {}, ",
            self.display_title(),
            self.requested
        )?;
        match self.available {
            Some(available) => write!(f, "available {available})")?,
            None => write!(f, "availability unknown)")?,
        }
        write!(f, ". Order not placed.")
    }
}

impl std::error::Error for InsufficientInventory {}

/// Why the reservation phase failed. Every decrement applied before the
/// failure has already been compensated (best-effort).
#[derive(Debug, Error)]
pub enum ReservationFailure {
    /// An item's guard condition did not hold.
    #[error("{shortfall}")]
    Insufficient {
        shortfall: InsufficientInventory,
        compensation: CompensationReport,
    },

    /// The store failed while reserving an item.
    #[error("Store failed while reserving class {class_id}: {source}")]
    Infrastructure {
        class_id: ClassId,
        #[source]
        source: StoreError,
        compensation: CompensationReport,
    },
}

/// Errors that can end an order placement.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was malformed; no storage call was made.
    #[error("Invalid order data: {0}")]
    Validation(#[from] ValidationError),

    /// One item could not be reserved; all prior reservations were reversed.
    #[error("{shortfall}")]
    InsufficientInventory {
        shortfall: InsufficientInventory,
        compensation: CompensationReport,
    },

    /// The store failed mid-sequence; prior reservations were reversed on a
    /// best-effort basis. The whole order may be retried.
    #[error("Inventory store unavailable while reserving class {class_id}: {source}")]
    Infrastructure {
        class_id: ClassId,
        #[source]
        source: StoreError,
        compensation: CompensationReport,
    },

    /// Every reservation committed but the order record was not written.
    /// Seats stay taken; this needs manual reconciliation and must not be retried.
    #[error("Order not recorded despite reserved inventory: {source}")]
    PersistenceInconsistency {
        granted: Vec<GrantedSeats>,
        #[source]
        source: StoreError,
    },

    /// The placement task was torn down before finishing, which only happens
    /// when the runtime shuts down. Seats may be taken without an order.
    #[error("Order placement was interrupted before it finished")]
    Interrupted,
}

impl OrderError {
    /// Stable name of the error kind, as reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "ValidationError",
            OrderError::InsufficientInventory { .. } => "InsufficientInventory",
            OrderError::Infrastructure { .. } => "InfrastructureError",
            OrderError::PersistenceInconsistency { .. } => "PersistenceInconsistency",
            OrderError::Interrupted => "Interrupted",
        }
    }

    /// The workflow state the attempt ended in.
    pub fn terminal_state(&self) -> WorkflowState {
        match self {
            OrderError::Validation(_) => WorkflowState::Rejected,
            OrderError::InsufficientInventory { .. } | OrderError::Infrastructure { .. } => {
                WorkflowState::Compensated
            }
            OrderError::PersistenceInconsistency { .. } | OrderError::Interrupted => {
                WorkflowState::Inconsistent
            }
        }
    }
}

impl From<ReservationFailure> for OrderError {
    fn from(failure: ReservationFailure) -> Self {
        match failure {
            ReservationFailure::Insufficient {
                shortfall,
                compensation,
            } => OrderError::InsufficientInventory {
                shortfall,
                compensation,
            },
            ReservationFailure::Infrastructure {
                class_id,
                source,
                compensation,
            } => OrderError::Infrastructure {
                class_id,
                source,
                compensation,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortfall(title: Option<&str>, available: Option<u32>) -> InsufficientInventory {
        InsufficientInventory {
            class_id: ClassId::new("music-theory"),
            title: title.map(str::to_string),
            requested: 3,
            available,
        }
    }

    #[test]
    fn shortfall_message_names_class_and_counts() {
        let message = shortfall(Some("Music Theory"), Some(2)).to_string();
        assert_eq!(
            message,
            "Not enough spots for class \"Music Theory\" (requested 3, available 2). Order not placed."
        );
    }

    #[test]
    fn shortfall_without_title_falls_back_to_identity() {
        let message = shortfall(None, None).to_string();
        assert_eq!(
            message,
            "Not enough spots for class \"music-theory\" (requested 3, availability unknown). Order not placed."
        );
    }

    #[test]
    fn kinds_and_terminal_states() {
        let validation = OrderError::from(ValidationError::NoItems);
        assert_eq!(validation.kind(), "ValidationError");
        assert_eq!(validation.terminal_state(), WorkflowState::Rejected);

        let insufficient = OrderError::from(ReservationFailure::Insufficient {
            shortfall: shortfall(Some("Music Theory"), Some(0)),
            compensation: CompensationReport::default(),
        });
        assert_eq!(insufficient.kind(), "InsufficientInventory");
        assert_eq!(insufficient.terminal_state(), WorkflowState::Compensated);

        let infrastructure = OrderError::from(ReservationFailure::Infrastructure {
            class_id: ClassId::new("music-theory"),
            source: StoreError::Unavailable("down".to_string()),
            compensation: CompensationReport::default(),
        });
        assert_eq!(infrastructure.kind(), "InfrastructureError");
        assert_eq!(infrastructure.terminal_state(), WorkflowState::Compensated);

        let inconsistent = OrderError::PersistenceInconsistency {
            granted: vec![GrantedSeats::new("music-theory", 1)],
            source: StoreError::Unavailable("down".to_string()),
        };
        assert_eq!(inconsistent.kind(), "PersistenceInconsistency");
        assert_eq!(inconsistent.terminal_state(), WorkflowState::Inconsistent);

        assert_eq!(OrderError::Interrupted.kind(), "Interrupted");
        assert_eq!(
            OrderError::Interrupted.terminal_state(),
            WorkflowState::Inconsistent
        );
    }
}
