//! Push, background sync and notification-click handling for the service worker.

use crate::config::{
    BACKGROUND_SYNC_TAG, NOTIFICATION_BADGE, NOTIFICATION_ICON, NOTIFICATION_VIBRATE,
};
use crate::error::WorkerError;
use serde::{Deserialize, Serialize};

/// Body of a push message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl PushPayload {
    pub fn parse(text: &str) -> Result<Self, WorkerError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Value attached to the notification's `data` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub date_of_arrival: f64,
    pub primary_key: u32,
}

/// Everything needed for `showNotification(title, options)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSpec {
    pub title: String,
    pub body: String,
    pub icon: &'static str,
    pub badge: &'static str,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

/// Build the notification for a push that arrived at `arrived_at_ms` (epoch millis).
pub fn notification_for(payload: PushPayload, arrived_at_ms: f64) -> NotificationSpec {
    NotificationSpec {
        title: payload.title,
        body: payload.body,
        icon: NOTIFICATION_ICON,
        badge: NOTIFICATION_BADGE,
        vibrate: NOTIFICATION_VIBRATE.to_vec(),
        data: NotificationData {
            date_of_arrival: arrived_at_ms,
            primary_key: 1,
        },
    }
}

pub fn is_background_sync(tag: &str) -> bool {
    tag == BACKGROUND_SYNC_TAG
}

/// Path component of an absolute or relative URL, without query or fragment.
fn url_path(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(idx) => {
            let after_scheme = &url[idx + 3..];
            match after_scheme.find('/') {
                Some(slash) => &after_scheme[slash..],
                None => "/",
            }
        }
        None => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Index of the first window client already showing `path`, if any.
pub fn focus_target(client_urls: &[String], path: &str) -> Option<usize> {
    client_urls.iter().position(|url| url_path(url) == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_payload_builds_fixed_notification() {
        let payload = PushPayload::parse(r#"{"title": "Neues Foto", "body": "Schau mal!"}"#).unwrap();
        let spec = notification_for(payload, 1_700_000_000_000.0);

        assert_eq!(spec.title, "Neues Foto");
        assert_eq!(spec.body, "Schau mal!");
        assert_eq!(spec.icon, "/static/icon-192.png");
        assert_eq!(spec.badge, "/static/icon-192.png");
        assert_eq!(spec.vibrate, vec![100, 50, 100]);
        assert_eq!(
            serde_json::to_value(&spec.data).unwrap(),
            serde_json::json!({"dateOfArrival": 1_700_000_000_000.0, "primaryKey": 1})
        );
    }

    #[test]
    fn push_payload_tolerates_missing_fields() {
        assert_eq!(PushPayload::parse("{}").unwrap(), PushPayload::default());
        assert!(matches!(PushPayload::parse("not json"), Err(WorkerError::Payload(_))));
    }

    #[test]
    fn only_the_known_sync_tag_is_handled() {
        assert!(is_background_sync("background-sync"));
        assert!(!is_background_sync("periodic"));
    }

    #[test]
    fn focus_target_matches_root_window() {
        let clients = vec![
            "https://snap.example/gallery".to_string(),
            "https://snap.example/?utm=push".to_string(),
        ];
        assert_eq!(focus_target(&clients, "/"), Some(1));
        assert_eq!(focus_target(&clients[..1], "/"), None);
        assert_eq!(focus_target(&["https://snap.example".to_string()], "/"), Some(0));
        assert_eq!(focus_target(&[], "/"), None);
    }
}
