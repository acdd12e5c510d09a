//! HipChat Connect plumbing: the capability descriptor, webhook payloads and
//! the REST calls the add-on makes back into a room.

mod client;
mod descriptor;
mod webhook;

pub use client::HipChatClient;
pub use descriptor::capabilities;
pub use webhook::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Installation;

/// HipChat API errors.
#[derive(Debug, Error)]
pub enum HipChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: token request rejected")]
    Unauthorized,

    #[error("HipChat API error: {0}")]
    Api(String),

    #[error("Invalid capabilities document: {0}")]
    InvalidCapabilities(String),
}

/// A message posted into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Text(String),
    Html(String),
}

impl Notification {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }

    pub fn html(message: impl Into<String>) -> Self {
        Self::Html(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Text(message) | Self::Html(message) => message,
        }
    }

    pub fn format(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Html(_) => "html",
        }
    }
}

/// A member currently in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub mention_name: String,
    #[serde(default)]
    pub name: String,
    /// IANA timezone name, e.g. `Europe/Berlin`.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Endpoints advertised by a HipChat server's capabilities document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub token_url: String,
    /// REST API base, always ending in `/`.
    pub api_url: String,
}

/// The calls the add-on makes into HipChat.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Post a notification into the installation's room.
    async fn send_notification(
        &self,
        installation: &Installation,
        notification: Notification,
    ) -> Result<(), HipChatError>;

    /// List the members currently in the installation's room.
    async fn room_participants(
        &self,
        installation: &Installation,
    ) -> Result<Vec<Participant>, HipChatError>;

    /// Read the token and API endpoints from a capabilities document.
    async fn resolve_endpoints(&self, capabilities_url: &str)
        -> Result<ApiEndpoints, HipChatError>;
}
