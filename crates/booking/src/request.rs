//! Inbound order shape and its validation into a reservation request.

use common::ClassId;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;

/// An order as submitted by a client, before any validation.
///
/// Fields are kept loose so that malformed input reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrder {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default, rename = "lessonIDs")]
    pub lesson_ids: Option<Value>,
    #[serde(default)]
    pub spaces: Option<Value>,
}

impl PlaceOrder {
    /// Builds a well-formed order from typed parts.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        lessons: impl IntoIterator<Item = (ClassId, u32)>,
    ) -> Self {
        let (ids, spaces): (Vec<Value>, Vec<Value>) = lessons
            .into_iter()
            .map(|(id, seats)| (Value::from(id.as_str()), Value::from(seats)))
            .unzip();
        Self {
            name: Some(Value::from(name.into())),
            phone: Some(Value::from(phone.into())),
            lesson_ids: Some(Value::Array(ids)),
            spaces: Some(Value::Array(spaces)),
        }
    }
}

/// One line of a reservation request. Always asks for at least one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationItem {
    class_id: ClassId,
    seats: u32,
}

impl ReservationItem {
    /// Creates an item, raising a zero seat count to one.
    pub fn new(class_id: impl Into<ClassId>, seats: u32) -> Self {
        Self {
            class_id: class_id.into(),
            seats: seats.max(1),
        }
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }
}

/// A validated order: customer details plus items in client order.
///
/// Built fresh for each placement attempt and owned by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    name: String,
    phone: String,
    items: Vec<ReservationItem>,
}

impl ReservationRequest {
    /// Validates a raw order.
    ///
    /// Seat counts are coerced rather than rejected: anything that is not a
    /// number of at least one becomes 1, fractions are truncated, and if the
    /// counts do not line up with the class list every item gets 1.
    pub fn validate(order: PlaceOrder) -> Result<Self, ValidationError> {
        let name = text_field(order.name.as_ref()).ok_or(ValidationError::MissingName)?;
        let phone = text_field(order.phone.as_ref()).ok_or(ValidationError::MissingPhone)?;

        let ids = match order.lesson_ids {
            Some(Value::Array(ids)) if !ids.is_empty() => ids,
            _ => return Err(ValidationError::NoItems),
        };

        let class_ids = ids
            .iter()
            .enumerate()
            .map(|(index, id)| class_id(id).ok_or(ValidationError::InvalidClassId { index }))
            .collect::<Result<Vec<_>, _>>()?;

        let seats: Vec<u32> = match order.spaces {
            Some(Value::Array(spaces)) if spaces.len() == class_ids.len() => {
                spaces.iter().map(coerce_seats).collect()
            }
            _ => vec![1; class_ids.len()],
        };

        let items = class_ids
            .into_iter()
            .zip(seats)
            .map(|(id, seats)| ReservationItem::new(id, seats))
            .collect();

        Self::new(name, phone, items)
    }

    /// Creates a request from already-typed parts.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        items: Vec<ReservationItem>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        let phone = phone.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if phone.is_empty() {
            return Err(ValidationError::MissingPhone);
        }
        if items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        Ok(Self { name, phone, items })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Items in the order the client supplied them.
    pub fn items(&self) -> &[ReservationItem] {
        &self.items
    }

    /// Total seats requested across every item.
    pub fn total_seats(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.seats)).sum()
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn class_id(value: &Value) -> Option<ClassId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(ClassId::new(s.trim())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(ClassId::new(n.to_string())),
        _ => None,
    }
}

fn coerce_seats(value: &Value) -> u32 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        // Float-to-int casts saturate, so huge counts clamp to u32::MAX.
        Some(n) if n.is_finite() && n >= 1.0 => n.trunc() as u32,
        _ => 1,
    }
}
