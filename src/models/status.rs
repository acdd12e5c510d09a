use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The chat member who recorded a status.
///
/// Mirrors the `from` object HipChat sends with every room message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUser {
    #[serde(default)]
    pub id: u64,
    /// Display name, e.g. "Ada Lovelace".
    pub name: String,
    /// Unique handle without the leading `@`.
    pub mention_name: String,
}

/// A single status update.
///
/// Field names on the wire match the stored room document
/// (`{user, message, date, expiry}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub user: StatusUser,
    /// Raw status text (markdown supported).
    pub message: String,
    #[serde(rename = "date")]
    pub recorded_at: DateTime<Utc>,
    /// When the status goes stale. `None` never expires.
    #[serde(rename = "expiry", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StatusEntry {
    /// A status is expired once its expiry lies strictly in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < now)
    }
}

/// Statuses of one room keyed by mention-name.
pub type StatusCollection = BTreeMap<String, StatusEntry>;

/// Per-room settings stored next to the statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOptions {
    /// Whether the aggregate report includes expired statuses by default.
    #[serde(rename = "showExpired", default)]
    pub show_expired: bool,
}

/// The persisted document for one room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomData {
    #[serde(rename = "users", default)]
    pub statuses: StatusCollection,
    #[serde(default)]
    pub options: RoomOptions,
}

impl RoomData {
    /// Statuses to show in a report, optionally hiding expired ones.
    pub fn visible_statuses(&self, show_expired: bool, now: DateTime<Utc>) -> StatusCollection {
        self.statuses
            .iter()
            .filter(|(_, entry)| show_expired || !entry.is_expired(now))
            .map(|(mention, entry)| (mention.clone(), entry.clone()))
            .collect()
    }
}

/// Identity of a tenant room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomKey {
    pub client_id: String,
    pub group_id: u64,
    pub capabilities_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(expires_at: Option<DateTime<Utc>>) -> StatusEntry {
        StatusEntry {
            user: StatusUser {
                id: 1,
                name: "Ada".to_string(),
                mention_name: "ada".to_string(),
            },
            message: "did things".to_string(),
            recorded_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn status_without_expiry_never_expires() {
        let far_future = Utc::now() + Duration::days(365 * 100);
        assert!(!entry(None).is_expired(far_future));
    }

    #[test]
    fn status_expires_strictly_after_expiry() {
        let now = Utc::now();
        assert!(!entry(Some(now)).is_expired(now));
        assert!(entry(Some(now)).is_expired(now + Duration::seconds(1)));
    }

    #[test]
    fn room_document_uses_stored_field_names() {
        let mut data = RoomData::default();
        data.statuses.insert("ada".to_string(), entry(None));
        data.options.show_expired = true;

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["options"]["showExpired"], true);
        assert!(json["users"]["ada"]["date"].is_string());
        assert!(json["users"]["ada"]["expiry"].is_null());
    }

    #[test]
    fn visible_statuses_hides_expired_unless_asked() {
        let now = Utc::now();
        let mut data = RoomData::default();
        data.statuses.insert("old".to_string(), entry(Some(now - Duration::hours(1))));
        data.statuses.insert("new".to_string(), entry(Some(now + Duration::hours(1))));

        let hidden = data.visible_statuses(false, now);
        assert_eq!(hidden.keys().collect::<Vec<_>>(), vec!["new"]);
        assert_eq!(data.visible_statuses(true, now).len(), 2);
    }
}
