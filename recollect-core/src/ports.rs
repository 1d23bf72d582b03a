//! Error type and the trait describing a pickup schedule source.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Error as ReqwestError;

use crate::model::{DateRange, PickupEvent, next_pickup_event};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the `ReCollect` API.
pub enum RecollectError {
    /// The HTTP exchange failed: connection, timeout, status, or body decoding.
    #[error("Request error: {0}")]
    Request(#[from] ReqwestError),
    /// The API answered, but without a usable result.
    #[error("Data error: {0}")]
    Data(String),
}

#[async_trait]
/// Source of pickup schedules for a single place and service.
pub trait PickupPort: Send + Sync {
    /// Fetch pickup events, optionally limited to a date range.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Request`] when the provider request fails.
    async fn pickup_events(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<PickupEvent>, RecollectError>;

    /// Fetch the schedule and return the first pickup on or after `today`.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Request`] when the provider request fails and
    /// [`RecollectError::Data`] when no pickup is scheduled on or after `today`.
    async fn next_pickup_event(&self, today: NaiveDate) -> Result<PickupEvent, RecollectError> {
        let events = self.pickup_events(None).await?;
        next_pickup_event(&events, today).cloned().ok_or_else(|| {
            RecollectError::Data(format!("No pickup events found on or after {today}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::PickupType;

    struct StaticPort {
        events: Vec<PickupEvent>,
        requested: Mutex<Vec<Option<DateRange>>>,
    }

    impl StaticPort {
        fn new(events: Vec<PickupEvent>) -> Self {
            Self {
                events,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PickupPort for StaticPort {
        async fn pickup_events(
            &self,
            range: Option<DateRange>,
        ) -> Result<Vec<PickupEvent>, RecollectError> {
            self.requested.lock().expect("lock").push(range);
            Ok(self.events.clone())
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn garbage_on(on: NaiveDate) -> PickupEvent {
        PickupEvent {
            date: on,
            pickup_types: vec![PickupType::with_friendly_name("garbage", "Trash")],
            area_name: Some("Atlantis".to_owned()),
        }
    }

    #[tokio::test]
    async fn next_pickup_event_fetches_without_range() {
        let port = StaticPort::new(vec![garbage_on(date(2020, 11, 2))]);

        let next = port
            .next_pickup_event(date(2020, 10, 31))
            .await
            .expect("upcoming event");

        assert_eq!(next.date, date(2020, 11, 2));
        assert_eq!(*port.requested.lock().expect("lock"), vec![None]);
    }

    #[tokio::test]
    async fn next_pickup_event_reports_data_error_when_nothing_is_left() {
        let port = StaticPort::new(vec![garbage_on(date(2020, 11, 2))]);

        let err = port
            .next_pickup_event(date(2020, 12, 1))
            .await
            .expect_err("no upcoming event");

        assert!(matches!(err, RecollectError::Data(_)));
    }

    #[tokio::test]
    async fn next_pickup_event_reports_data_error_for_empty_schedule() {
        let port = StaticPort::new(Vec::new());

        let err = port
            .next_pickup_event(date(2020, 12, 1))
            .await
            .expect_err("no events at all");

        assert!(matches!(err, RecollectError::Data(_)));
    }
}
