//! HTTP client for the HipChat REST API.
//!
//! Every call requests a fresh client-credentials token scoped to what the
//! call needs; tokens are not cached.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ApiEndpoints, ChatApi, HipChatError, Notification, Participant};
use crate::models::Installation;

const SCOPE_SEND_NOTIFICATION: &str = "send_notification";
const SCOPE_VIEW_GROUP: &str = "view_group";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RoomResponse {
    #[serde(default)]
    participants: Vec<Participant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapabilitiesDocument {
    capabilities: Capabilities,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Capabilities {
    oauth2_provider: Option<OAuth2Provider>,
    hipchat_api_provider: Option<ApiProvider>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuth2Provider {
    token_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiProvider {
    url: String,
}

/// HipChat REST client.
#[derive(Debug, Clone)]
pub struct HipChatClient {
    client: Client,
    from_name: String,
}

impl HipChatClient {
    /// `from_name` is the sender label shown on notifications.
    pub fn new(from_name: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            from_name: from_name.into(),
        }
    }

    async fn token(&self, installation: &Installation, scope: &str) -> Result<String, HipChatError> {
        let response = self
            .client
            .post(&installation.token_url)
            .basic_auth(&installation.oauth_id, Some(&installation.oauth_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", scope)])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(HipChatError::Unauthorized);
        }
        let token: TokenResponse = self.handle_response(response).await?;
        Ok(token.access_token)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, HipChatError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(HipChatError::Api(format!("{}: {}", status, body)))
        }
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), HipChatError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(HipChatError::Api(format!("{}: {}", status, body)))
        }
    }
}

#[async_trait]
impl ChatApi for HipChatClient {
    async fn send_notification(
        &self,
        installation: &Installation,
        notification: Notification,
    ) -> Result<(), HipChatError> {
        let token = self.token(installation, SCOPE_SEND_NOTIFICATION).await?;
        let url = format!("{}room/{}/notification", installation.api_url, installation.room_id);

        tracing::debug!(room_id = installation.room_id, message_format = notification.format(), "Sending notification");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "message": notification.message(),
                "message_format": notification.format(),
                "from": self.from_name,
                "notify": false,
            }))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn room_participants(
        &self,
        installation: &Installation,
    ) -> Result<Vec<Participant>, HipChatError> {
        let token = self.token(installation, SCOPE_VIEW_GROUP).await?;
        let url = format!("{}room/{}", installation.api_url, installation.room_id);

        let response = self
            .client
            .get(&url)
            .query(&[("expand", "participants")])
            .bearer_auth(token)
            .send()
            .await?;
        let room: RoomResponse = self.handle_response(response).await?;
        Ok(room.participants)
    }

    async fn resolve_endpoints(
        &self,
        capabilities_url: &str,
    ) -> Result<ApiEndpoints, HipChatError> {
        let response = self.client.get(capabilities_url).send().await?;
        let document: CapabilitiesDocument = self.handle_response(response).await?;

        let token_url = document
            .capabilities
            .oauth2_provider
            .map(|provider| provider.token_url)
            .ok_or_else(|| HipChatError::InvalidCapabilities("missing oauth2Provider".into()))?;
        let api_url = document
            .capabilities
            .hipchat_api_provider
            .map(|provider| provider.url)
            .ok_or_else(|| HipChatError::InvalidCapabilities("missing hipchatApiProvider".into()))?;

        Ok(ApiEndpoints {
            token_url,
            api_url: with_trailing_slash(api_url),
        })
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_gets_trailing_slash() {
        assert_eq!(
            with_trailing_slash("https://api.hipchat.com/v2".to_string()),
            "https://api.hipchat.com/v2/"
        );
        assert_eq!(
            with_trailing_slash("https://api.hipchat.com/v2/".to_string()),
            "https://api.hipchat.com/v2/"
        );
    }

    #[test]
    fn capabilities_document_parses() {
        let json = r#"{
            "name": "HipChat",
            "capabilities": {
                "oauth2Provider": {"tokenUrl": "https://api.hipchat.com/v2/oauth/token"},
                "hipchatApiProvider": {"url": "https://api.hipchat.com/v2/"}
            }
        }"#;
        let document: CapabilitiesDocument = serde_json::from_str(json).unwrap();
        assert_eq!(
            document.capabilities.oauth2_provider.unwrap().token_url,
            "https://api.hipchat.com/v2/oauth/token"
        );
    }

    #[test]
    fn participants_without_timezone_parse() {
        let json = r#"{"participants": [{"mention_name": "ada", "name": "Ada"}]}"#;
        let room: RoomResponse = serde_json::from_str(json).unwrap();
        assert_eq!(room.participants[0].timezone, None);
    }
}
