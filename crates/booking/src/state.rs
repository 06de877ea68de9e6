//! Order workflow state machine.

/// The state of one order placement attempt.
///
/// State transitions:
/// ```text
/// Validating ──► Reserving ──► Persisting ──► Committed
///     │              │              │
///     ▼              ▼              ▼
///  Rejected     Compensated    Inconsistent
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkflowState {
    /// Checking the raw request. No storage access yet.
    #[default]
    Validating,

    /// Taking seats item by item.
    Reserving,

    /// All seats taken; writing the order record.
    Persisting,

    /// Order recorded (terminal state).
    Committed,

    /// Request was malformed; nothing touched (terminal state).
    Rejected,

    /// Reservation failed and prior reservations were reversed (terminal state).
    Compensated,

    /// Seats were taken but the order was not recorded (terminal state).
    Inconsistent,
}

impl WorkflowState {
    /// The state reached when the current step succeeds.
    pub fn on_success(&self) -> Option<WorkflowState> {
        match self {
            WorkflowState::Validating => Some(WorkflowState::Reserving),
            WorkflowState::Reserving => Some(WorkflowState::Persisting),
            WorkflowState::Persisting => Some(WorkflowState::Committed),
            _ => None,
        }
    }

    /// The state reached when the current step fails.
    pub fn on_failure(&self) -> Option<WorkflowState> {
        match self {
            WorkflowState::Validating => Some(WorkflowState::Rejected),
            WorkflowState::Reserving => Some(WorkflowState::Compensated),
            WorkflowState::Persisting => Some(WorkflowState::Inconsistent),
            _ => None,
        }
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Committed
                | WorkflowState::Rejected
                | WorkflowState::Compensated
                | WorkflowState::Inconsistent
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Validating => "Validating",
            WorkflowState::Reserving => "Reserving",
            WorkflowState::Persisting => "Persisting",
            WorkflowState::Committed => "Committed",
            WorkflowState::Rejected => "Rejected",
            WorkflowState::Compensated => "Compensated",
            WorkflowState::Inconsistent => "Inconsistent",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
