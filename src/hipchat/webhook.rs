use serde::{Deserialize, Serialize};

use crate::models::StatusUser;

/// The slash command this add-on answers to.
pub const COMMAND: &str = "/standup";

/// Body of a `room_message` webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub oauth_client_id: String,
    pub item: WebhookItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookItem {
    pub message: RoomMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMessage {
    /// The full chat line, including the command keyword.
    pub message: String,
    pub from: StatusUser,
}

impl WebhookPayload {
    /// The text after `/standup`, trimmed.
    pub fn command_text(&self) -> &str {
        let line = self.item.message.message.trim();
        line.strip_prefix(COMMAND).unwrap_or(line).trim()
    }

    pub fn sender(&self) -> &StatusUser {
        &self.item.message.from
    }
}
