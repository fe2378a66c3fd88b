//! Google Calendar provider implementation
//!
//! Implements the `ProviderClient` port against the Calendar v3 REST API:
//! paged event listing over a time window, deletion by identifier and event
//! creation for exports.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use finsync_core::ProviderClient;
use finsync_domain::{
    FinSyncError, ProviderConfig, ProviderEvent, ProviderEventDraft, ProviderEventTime, Result,
};
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::token::AccessTokenSource;
use crate::errors::{status_to_error, InfraError};
use crate::http::HttpClient;

const DATE_FORMAT: &str = "%Y-%m-%d";
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const PAGE_SIZE: &str = "250";
const DEFAULT_TIME_ZONE: &str = "UTC";

/// Google Calendar provider
pub struct GoogleCalendarProvider {
    http: HttpClient,
    base_url: Url,
    calendar_id: String,
    time_zone: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleCalendarProvider {
    pub fn new(config: &ProviderConfig, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|err| {
            FinSyncError::Config(format!("invalid provider API base URL: {err}"))
        })?;

        Ok(Self {
            http: HttpClient::new()?,
            base_url,
            calendar_id: config.calendar_id.clone(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            tokens,
        })
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// IANA zone used to interpret local times of exported events.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let base = &self.base_url;
            let mut segments = url.path_segments_mut().map_err(|_| {
                FinSyncError::Config(format!("provider API base URL cannot be a base: {base}"))
            })?;
            segments.pop_if_empty().extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn fetch_page(
        &self,
        token: &str,
        params: &[(&str, String)],
    ) -> Result<GoogleEventsResponse> {
        let request =
            self.http.request(Method::GET, self.events_url(None)?).bearer_auth(token).query(params);
        let response = ensure_success(self.http.send(request).await?, "list events").await?;
        let page = response.json().await.map_err(InfraError::from)?;
        Ok(page)
    }
}

#[async_trait]
impl ProviderClient for GoogleCalendarProvider {
    #[instrument(skip(self), fields(calendar_id = %self.calendar_id))]
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<ProviderEvent>> {
        let token = self.tokens.access_token().await?;
        let base_params = vec![
            ("timeMin", time_min.to_rfc3339()),
            ("timeMax", time_max.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];

        let mut events = Vec::new();
        let mut page_cursor: Option<String> = None;
        let mut cancelled = 0usize;

        loop {
            let mut params = base_params.clone();
            if let Some(ref cursor) = page_cursor {
                params.push(("pageToken", cursor.clone()));
            }

            let page = self.fetch_page(&token, &params).await?;
            for item in page.items {
                if item.status.as_deref() == Some("cancelled") {
                    cancelled += 1;
                    continue;
                }
                events.push(item.into_provider_event());
            }

            page_cursor = page.next_page_token.filter(|cursor| !cursor.is_empty());
            if page_cursor.is_none() {
                break;
            }
        }

        debug!(fetched = events.len(), cancelled, "listed provider events");
        Ok(events)
    }

    #[instrument(skip(self), fields(calendar_id = %self.calendar_id))]
    async fn delete_event(&self, provider_id: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let request = self
            .http
            .request(Method::DELETE, self.events_url(Some(provider_id))?)
            .bearer_auth(&token);
        let response = self.http.send(request).await?;

        // already gone on the provider side
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            debug!(provider_id, status = %response.status(), "provider event already deleted");
            return Ok(());
        }

        ensure_success(response, "delete event").await?;
        Ok(())
    }

    #[instrument(skip(self, draft), fields(calendar_id = %self.calendar_id, date = %draft.date))]
    async fn create_event(&self, draft: &ProviderEventDraft) -> Result<String> {
        let body = GoogleEventInsert::from_draft(draft, &self.time_zone)?;
        let token = self.tokens.access_token().await?;
        let request = self
            .http
            .request(Method::POST, self.events_url(None)?)
            .bearer_auth(&token)
            .json(&body);

        let response = ensure_success(self.http.send(request).await?, "create event").await?;
        let created: GoogleCreatedEvent = response.json().await.map_err(InfraError::from)?;

        if created.id.is_empty() {
            return Err(FinSyncError::ProviderUnavailable(
                "provider returned an event without an identifier".into(),
            ));
        }
        debug!(provider_id = %created.id, "provider event created");
        Ok(created.id)
    }
}

async fn ensure_success(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(operation, %status, body = %body, "provider request failed");
    Err(status_to_error(status.as_u16(), status.canonical_reason()))
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleCalendarEvent>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleCalendarEvent {
    #[serde(default)]
    id: String,
    status: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    start: Option<EventDateTime>,
    end: Option<EventDateTime>,
}

impl GoogleCalendarEvent {
    fn into_provider_event(self) -> ProviderEvent {
        let start = self.start.map(|s| s.parse(&self.id)).unwrap_or_default();
        let end = self.end.map(|e| e.parse(&self.id));
        ProviderEvent {
            id: self.id,
            summary: self.summary,
            description: self.description,
            start,
            end,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl EventDateTime {
    /// Malformed values are dropped so the event surfaces as unmappable.
    fn parse(&self, event_id: &str) -> ProviderEventTime {
        let date = self.date.as_deref().and_then(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|err| warn!(event_id, raw, error = %err, "unparseable all-day date"))
                .ok()
        });
        let date_time = self.date_time.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map_err(|err| warn!(event_id, raw, error = %err, "unparseable event dateTime"))
                .ok()
        });
        ProviderEventTime { date, date_time }
    }
}

#[derive(Debug, Serialize)]
struct GoogleEventInsert {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start: EventDateTime,
    end: EventDateTime,
}

impl GoogleEventInsert {
    /// All-day events end on the following day; timed events span one hour.
    fn from_draft(draft: &ProviderEventDraft, time_zone: &str) -> Result<Self> {
        let (start, end) = match draft.time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            None => {
                let next_day = draft.date.succ_opt().ok_or_else(|| {
                    FinSyncError::InvalidInput(format!("date out of range: {}", draft.date))
                })?;
                (
                    EventDateTime {
                        date: Some(draft.date.format(DATE_FORMAT).to_string()),
                        ..EventDateTime::default()
                    },
                    EventDateTime {
                        date: Some(next_day.format(DATE_FORMAT).to_string()),
                        ..EventDateTime::default()
                    },
                )
            }
            Some(raw) => {
                let time = parse_time(raw)?;
                let starts_at = draft.date.and_time(time);
                let ends_at = starts_at + Duration::hours(1);
                let local = |at: chrono::NaiveDateTime| EventDateTime {
                    date_time: Some(at.format(LOCAL_DATE_TIME_FORMAT).to_string()),
                    time_zone: Some(time_zone.to_string()),
                    ..EventDateTime::default()
                };
                (local(starts_at), local(ends_at))
            }
        };

        Ok(Self {
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            start,
            end,
        })
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|err| FinSyncError::InvalidInput(format!("invalid time '{raw}': {err}")))
}

#[derive(Debug, Deserialize)]
struct GoogleCreatedEvent {
    #[serde(default)]
    id: String,
}
