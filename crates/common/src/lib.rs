//! Shared identity types for the class booking system.

pub mod types;

pub use types::{ClassId, OrderId};
