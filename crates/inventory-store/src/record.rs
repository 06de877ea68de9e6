//! Durable records owned by the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ClassId, OrderId};

/// Money amount represented in pence to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from the minor currency unit.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns the amount in the minor currency unit.
    pub fn cents(&self) -> i64 {
        self.cents
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.abs();
        write!(f, "{sign}£{}.{:02}", abs / 100, abs % 100)
    }
}

/// A scheduled class and its remaining capacity.
///
/// `available_seats` is only ever changed through guarded decrements and
/// restoring increments while orders are being placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: ClassId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub price: Money,
    pub rating: u8,
    pub image: String,
    pub available_seats: u32,
}

impl ClassRecord {
    /// Creates a class with the given capacity and empty descriptive metadata.
    pub fn new(id: impl Into<ClassId>, title: impl Into<String>, available_seats: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            location: String::new(),
            price: Money::default(),
            rating: 0,
            image: String::new(),
            available_seats,
        }
    }
}

/// Seats granted for one class within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedSeats {
    pub class_id: ClassId,
    pub seats: u32,
}

impl GrantedSeats {
    pub fn new(class_id: impl Into<ClassId>, seats: u32) -> Self {
        Self {
            class_id: class_id.into(),
            seats,
        }
    }
}

/// An order ready to be inserted; identity and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub name: String,
    pub phone: String,
    pub items: Vec<GrantedSeats>,
}

/// A persisted order. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub name: String,
    pub phone: String,
    pub items: Vec<GrantedSeats>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Class identities in the order they were requested.
    pub fn class_ids(&self) -> Vec<ClassId> {
        self.items.iter().map(|item| item.class_id.clone()).collect()
    }

    /// Granted seat counts, aligned with [`OrderRecord::class_ids`].
    pub fn spaces(&self) -> Vec<u32> {
        self.items.iter().map(|item| item.seats).collect()
    }

    /// Total seats granted across every line item.
    pub fn total_seats(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.seats)).sum()
    }
}

/// Outcome of a guarded decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecrementResult {
    /// The guard held and the seats were taken; carries the post-decrement record.
    Applied(ClassRecord),
    /// The class does not exist or has fewer seats than requested. Nothing changed.
    NotSatisfied,
}

impl DecrementResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, DecrementResult::Applied(_))
    }
}
