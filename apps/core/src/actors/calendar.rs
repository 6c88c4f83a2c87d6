use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration as StdDuration;
use tokio::time::timeout;
use tracing::info;
use url::Url;

use crate::actors::messages::{ActorError, AppError};
use crate::actors::traits::CalendarBackend;
use crate::models::EventDraft;

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// REST client for the external calendar provider.
///
/// The provider exposes a Google-Calendar-shaped API: events are created
/// under `calendars/{calendar_id}/events` with `start`/`end` date-times and
/// deleted by provider id. Success/failure is all the core cares about.
pub struct CalendarClient {
    client: Client,
    base_url: Url,
    auth_token: String,
    calendar_id: String,
}

impl CalendarClient {
    pub fn new(base_url: &str, auth_token: String) -> Result<Self, AppError> {
        // A trailing slash is required for Url::join to append path segments.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| AppError::Config(format!("Invalid calendar base URL: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            base_url,
            auth_token,
            calendar_id: "primary".to_string(),
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.auth_token);
        if let Ok(value) = auth_value.parse() {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn events_url(&self) -> Result<Url, AppError> {
        Ok(self
            .base_url
            .join(&format!("calendars/{}/events", self.calendar_id))?)
    }

    /// Builds the provider's event body from a draft.
    ///
    /// All-day drafts (no time) start at midnight; the end is start plus the
    /// parsed duration.
    fn build_event_body(draft: &EventDraft) -> serde_json::Value {
        let start_time = draft.time.unwrap_or(NaiveTime::MIN);
        let start = NaiveDateTime::new(draft.date, start_time);
        let end = start + Duration::minutes(draft.duration_minutes);

        serde_json::json!({
            "summary": draft.title,
            "description": draft.description,
            "start": { "dateTime": start.format("%Y-%m-%dT%H:%M:%S").to_string() },
            "end": { "dateTime": end.format("%Y-%m-%dT%H:%M:%S").to_string() },
            "reminders": {
                "useDefault": false,
                "overrides": [
                    { "method": "popup", "minutes": 30 }
                ]
            }
        })
    }
}

#[async_trait]
impl CalendarBackend for CalendarClient {
    async fn create_event(&self, draft: &EventDraft) -> Result<String, AppError> {
        let body = Self::build_event_body(draft);
        let url = self.events_url()?;

        let request_future = self
            .client
            .post(url)
            .headers(self.headers())
            .json(&body)
            .send();

        let res = timeout(REQUEST_TIMEOUT, request_future).await??;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Actor(ActorError::Calendar(format!(
                "Event creation failed with status {}: {}",
                status, body
            ))));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::Actor(ActorError::Calendar(e.to_string())))?;

        let event_id = json["id"]
            .as_str()
            .ok_or_else(|| {
                AppError::Actor(ActorError::Calendar(
                    "Provider response missing event id".to_string(),
                ))
            })?
            .to_string();

        info!("Created calendar event: {}", event_id);
        Ok(event_id)
    }

    async fn delete_event(&self, remote_id: &str) -> Result<(), AppError> {
        let url = self
            .base_url
            .join(&format!("calendars/{}/events/{}", self.calendar_id, remote_id))?;

        let request_future = self.client.delete(url).headers(self.headers()).send();

        let res = timeout(REQUEST_TIMEOUT, request_future).await??;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::Actor(ActorError::Calendar(format!(
                "Event deletion failed with status {}",
                status
            ))));
        }

        info!("Deleted calendar event: {}", remote_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn draft() -> EventDraft {
        EventDraft {
            title: "Biology review".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(15, 0, 0),
            duration_minutes: 90,
            description: "Chapter 4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_event_success() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let client =
            CalendarClient::new(&format!("{}/", mock_server.uri()), "token".to_string()).unwrap();

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_partial_json(json!({
                "summary": "Biology review",
                "start": { "dateTime": "2025-06-01T15:00:00" },
                "end": { "dateTime": "2025-06-01T16:30:00" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "evt_42" })))
            .mount(&mock_server)
            .await;

        // 2. Act
        let result = client.create_event(&draft()).await;

        // 3. Assert
        assert_eq!(result.unwrap(), "evt_42");
    }

    #[tokio::test]
    async fn test_create_event_provider_error() {
        let mock_server = MockServer::start().await;
        let client =
            CalendarClient::new(&format!("{}/", mock_server.uri()), "token".to_string()).unwrap();

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&mock_server)
            .await;

        let result = client.create_event(&draft()).await;

        assert!(result.is_err());
        if let Err(AppError::Actor(ActorError::Calendar(msg))) = result {
            assert!(msg.contains("403"));
        } else {
            panic!("Expected ActorError::Calendar");
        }
    }

    #[tokio::test]
    async fn test_delete_event_success() {
        let mock_server = MockServer::start().await;
        let client =
            CalendarClient::new(&format!("{}/", mock_server.uri()), "token".to_string()).unwrap();

        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/evt_42"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        assert!(client.delete_event("evt_42").await.is_ok());
    }

    #[test]
    fn test_all_day_event_starts_at_midnight() {
        let mut d = draft();
        d.time = None;
        d.duration_minutes = 60;

        let body = CalendarClient::build_event_body(&d);
        assert_eq!(body["start"]["dateTime"], "2025-06-01T00:00:00");
        assert_eq!(body["end"]["dateTime"], "2025-06-01T01:00:00");
    }
}
