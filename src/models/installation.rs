use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RoomKey;

/// A room the add-on has been installed into.
///
/// Created from the HipChat install callback. The OAuth credentials are used to
/// request short-lived tokens for the room's REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    pub oauth_id: String,
    pub oauth_secret: String,
    pub group_id: u64,
    pub room_id: u64,
    pub capabilities_url: String,
    /// Token endpoint taken from the HipChat capabilities document.
    pub token_url: String,
    /// REST API base, always ending in `/`.
    pub api_url: String,
    pub installed_at: DateTime<Utc>,
}

impl Installation {
    /// The key under which this room's statuses are stored.
    pub fn room_key(&self) -> RoomKey {
        RoomKey {
            client_id: self.oauth_id.clone(),
            group_id: self.group_id,
            capabilities_url: self.capabilities_url.clone(),
        }
    }
}

/// Body of the HipChat install callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallInput {
    pub oauth_id: String,
    pub oauth_secret: String,
    pub capabilities_url: String,
    pub room_id: u64,
    pub group_id: u64,
}
