//! Domain data structures for places, services, and pickup schedules.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a `ReCollect` place (usually a UUID-like string).
pub struct PlaceId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a `ReCollect` service.
///
/// Older API generations hand these out as integers, newer ones as strings,
/// so both convert into the same opaque value.
pub struct ServiceId(pub String);

impl fmt::Display for PlaceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(id: &str) -> Self {
        PlaceId(id.to_owned())
    }
}

impl From<String> for PlaceId {
    fn from(id: String) -> Self {
        PlaceId(id)
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        ServiceId(id.to_owned())
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        ServiceId(id)
    }
}

impl From<u32> for ServiceId {
    fn from(id: u32) -> Self {
        ServiceId(id.to_string())
    }
}

impl From<u64> for ServiceId {
    fn from(id: u64) -> Self {
        ServiceId(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Category of collected material, e.g. `garbage` or `recycle`.
pub struct PickupType {
    /// Machine name used by the provider.
    pub name: String,
    /// Human-readable label, when the provider sends one.
    pub friendly_name: Option<String>,
}

impl PickupType {
    /// Pickup type that only carries a name.
    #[must_use]
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            friendly_name: None,
        }
    }

    /// Pickup type with a human-readable label.
    #[must_use]
    pub fn with_friendly_name<N: Into<String>, F: Into<String>>(name: N, friendly_name: F) -> Self {
        Self {
            name: name.into(),
            friendly_name: Some(friendly_name.into()),
        }
    }

    /// Label to show to people: the friendly name if present, otherwise the name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

impl From<&str> for PickupType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PickupType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Scheduled collection on a specific day.
pub struct PickupEvent {
    /// Date of the pickup.
    pub date: NaiveDate,
    /// Materials collected on that day, in provider order.
    pub pickup_types: Vec<PickupType>,
    /// Service area the schedule belongs to, if known.
    pub area_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Inclusive start/end range for requested schedules.
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range only when both bounds are known.
    #[must_use]
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        Some(Self {
            start: start?,
            end: end?,
        })
    }
}

/// Earliest event on or after `today`.
///
/// Provider data is usually sorted, but nothing guarantees it, so the whole
/// slice is scanned. Events sharing the earliest date resolve to the one the
/// provider listed first.
#[must_use]
pub fn next_pickup_event(events: &[PickupEvent], today: NaiveDate) -> Option<&PickupEvent> {
    events
        .iter()
        .filter(|event| event.date >= today)
        .min_by_key(|event| event.date)
}
