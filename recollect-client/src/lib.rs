//! Client for the `ReCollect` waste pickup schedule API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::instrument;

use recollect_core::{
    model::{DateRange, PickupEvent, PickupType, PlaceId, ServiceId},
    ports::{PickupPort, RecollectError},
};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.recollect.net";

/// Timeout for requests made through a one-shot session.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DATE_FORMAT: &str = "%Y-%m-%d";
const PICKUP_EVENT_TYPE: &str = "pickup";
const USER_AGENT: &str = concat!("recollect-client/", env!("CARGO_PKG_VERSION"));

/// Response from /api/places/{place}/services/{service}/events
#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<EventEntry>,
    // "zones" and other top-level keys are not needed
}

/// Single entry of the events list.
#[derive(Debug, Deserialize)]
struct EventEntry {
    day: Option<String>,
    // Holiday notices and similar entries carry no flags at all.
    flags: Option<Vec<FlagEntry>>,
}

/// Flag attached to an event. Anything that isn't an object is kept as
/// `Unknown` so one odd flag can't spoil the whole response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlagEntry {
    Record(FlagRecord),
    Unknown(#[expect(dead_code, reason = "only consumes the value")] IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct FlagRecord {
    event_type: Option<String>,
    name: Option<String>,
    subject: Option<String>,
    area_name: Option<String>,
}

/// HTTP session used for one request.
enum Session<'a> {
    /// Caller-owned client, left untouched after the request.
    Shared(&'a Client),
    /// Client created for this request only, dropped with the session.
    OneShot(Client),
}

impl Session<'_> {
    fn client(&self) -> &Client {
        match *self {
            Session::Shared(client) => client,
            Session::OneShot(ref client) => client,
        }
    }
}

/// Pickup schedule client bound to one place and service.
#[derive(Debug, Clone)]
pub struct PickupClient {
    place_id: PlaceId,
    service_id: ServiceId,
    api_url: String,
    session: Option<Client>,
    timeout: Duration,
}

impl PickupClient {
    /// Create a client for the given place and service.
    ///
    /// When `session` is `None`, every request runs on its own short-lived
    /// HTTP client with [`DEFAULT_TIMEOUT`]. A provided session is reused for
    /// all requests and its configuration is left to the caller.
    #[must_use]
    pub fn new<P: Into<PlaceId>, S: Into<ServiceId>>(
        place_id: P,
        service_id: S,
        session: Option<Client>,
    ) -> Self {
        let place_id = place_id.into();
        let service_id = service_id.into();
        let api_url = events_url(DEFAULT_BASE_URL, &place_id, &service_id);

        Self {
            place_id,
            service_id,
            api_url,
            session,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at another host, e.g. a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.api_url = events_url(base_url, &self.place_id, &self.service_id);
        self
    }

    /// Timeout for requests made without a shared session.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Place this client queries.
    #[must_use]
    pub const fn place_id(&self) -> &PlaceId {
        &self.place_id
    }

    /// Service this client queries.
    #[must_use]
    pub const fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    /// Events endpoint, without query parameters.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch pickup events.
    ///
    /// The range is only sent when both `start_date` and `end_date` are
    /// given; a single bound is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Request`] when the HTTP exchange fails.
    pub async fn get_pickup_events(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PickupEvent>, RecollectError> {
        let range = DateRange::from_bounds(start_date, end_date);
        if range.is_none() && (start_date.is_some() || end_date.is_some()) {
            tracing::debug!(
                ?start_date,
                ?end_date,
                "Ignoring date filter, both bounds are required"
            );
        }
        self.load_events(range).await
    }

    /// Fetch pickup events between two dates (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Request`] when the HTTP exchange fails.
    pub async fn get_pickup_events_in(
        &self,
        range: DateRange,
    ) -> Result<Vec<PickupEvent>, RecollectError> {
        self.load_events(Some(range)).await
    }

    /// Fetch the next pickup on or after today's local date.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Request`] when the HTTP exchange fails and
    /// [`RecollectError::Data`] when nothing is scheduled from today on.
    pub async fn get_next_pickup_event(&self) -> Result<PickupEvent, RecollectError> {
        self.get_next_pickup_event_from(Local::now().date_naive()).await
    }

    /// Fetch the next pickup on or after `today`.
    ///
    /// # Errors
    ///
    /// Returns [`RecollectError::Request`] when the HTTP exchange fails and
    /// [`RecollectError::Data`] when nothing is scheduled from `today` on.
    pub async fn get_next_pickup_event_from(
        &self,
        today: NaiveDate,
    ) -> Result<PickupEvent, RecollectError> {
        PickupPort::next_pickup_event(self, today).await
    }

    fn session(&self) -> Result<Session<'_>, RecollectError> {
        if let Some(client) = &self.session {
            return Ok(Session::Shared(client));
        }

        tracing::debug!(timeout_secs = self.timeout.as_secs(), "Creating one-shot session");
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;
        Ok(Session::OneShot(client))
    }

    #[instrument(skip(self), fields(place_id = %self.place_id, service_id = %self.service_id))]
    async fn load_events(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<PickupEvent>, RecollectError> {
        let session = self.session()?;

        let mut req = session.client().get(&self.api_url);
        if let Some(range) = range {
            req = req.query(&[
                ("after", range.start.format(DATE_FORMAT).to_string()),
                ("before", range.end.format(DATE_FORMAT).to_string()),
            ]);
        }
        // Reminder-only entries are rarely actual pickups.
        req = req.query(&[("hide", "reminder_only")]);

        let response = fetch_json::<EventsResponse>(req).await?;
        tracing::debug!(
            url = %self.api_url,
            entries = response.events.len(),
            "Data received"
        );

        Ok(parse_events(response))
    }
}

#[async_trait]
impl PickupPort for PickupClient {
    async fn pickup_events(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<PickupEvent>, RecollectError> {
        self.load_events(range).await
    }
}

fn events_url(base_url: &str, place_id: &PlaceId, service_id: &ServiceId) -> String {
    format!(
        "{}/api/places/{place_id}/services/{service_id}/events",
        base_url.trim_end_matches('/')
    )
}

/// Turn the raw response into pickup events, in provider order.
///
/// Only `pickup` flags count. Entries without flags, or whose flags are all
/// of another kind, are dropped. The area name is carried forward from the
/// first pickup flag that has one; earlier events keep `None`.
fn parse_events(response: EventsResponse) -> Vec<PickupEvent> {
    let mut area_name: Option<String> = None;
    let mut events = Vec::with_capacity(response.events.len());

    for entry in response.events {
        let Some(flags) = entry.flags else {
            continue;
        };

        let mut pickup_types = Vec::new();
        for flag in flags {
            let FlagEntry::Record(flag) = flag else {
                continue;
            };
            if flag.event_type.as_deref() != Some(PICKUP_EVENT_TYPE) {
                continue;
            }

            // The area name sometimes only exists on the flags.
            if area_name.is_none() {
                area_name = flag.area_name.filter(|name| !name.is_empty());
            }

            let Some(name) = flag.name else {
                tracing::warn!(day = ?entry.day, "Skipping pickup flag without a name");
                continue;
            };
            pickup_types.push(PickupType {
                name,
                friendly_name: flag.subject,
            });
        }

        if pickup_types.is_empty() {
            continue;
        }

        let Some(day) = entry.day.as_deref() else {
            tracing::warn!("Skipping pickup event without a day");
            continue;
        };
        let date = match NaiveDate::parse_from_str(day, DATE_FORMAT) {
            Ok(date) => date,
            Err(err) => {
                tracing::warn!(day, error = %err, "Skipping pickup event with malformed day");
                continue;
            }
        };

        events.push(PickupEvent {
            date,
            pickup_types,
            area_name: area_name.clone(),
        });
    }

    events
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, RecollectError> {
    req.send()
        .await
        .map_err(RecollectError::from)?
        .error_for_status()
        .map_err(RecollectError::from)?
        .json()
        .await
        .map_err(RecollectError::from)
}
