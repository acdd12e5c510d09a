//! Shared fixtures for the integration specs.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use standup::db::Database;
use standup::hipchat::{ApiEndpoints, ChatApi, HipChatError, Notification, Participant};
use standup::models::*;

/// In-memory stand-in for HipChat that records every notification.
#[derive(Default)]
pub struct FakeChat {
    sent: Mutex<Vec<(u64, Notification)>>,
    participants: Vec<Participant>,
    failing_rooms: HashSet<u64>,
}

impl FakeChat {
    pub fn with_participants(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            ..Self::default()
        }
    }

    /// Make every API call for `room_id` fail.
    pub fn failing_for(mut self, room_id: u64) -> Self {
        self.failing_rooms.insert(room_id);
        self
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, notification)| notification.clone())
            .collect()
    }

    pub fn notifications_for(&self, room_id: u64) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(room, _)| *room == room_id)
            .map(|(_, notification)| notification.clone())
            .collect()
    }

    pub fn last(&self) -> Notification {
        self.notifications()
            .pop()
            .expect("no notification was sent")
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn check(&self, installation: &Installation) -> Result<(), HipChatError> {
        if self.failing_rooms.contains(&installation.room_id) {
            Err(HipChatError::Api("500 Internal Server Error: boom".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatApi for FakeChat {
    async fn send_notification(
        &self,
        installation: &Installation,
        notification: Notification,
    ) -> Result<(), HipChatError> {
        self.check(installation)?;
        self.sent
            .lock()
            .unwrap()
            .push((installation.room_id, notification));
        Ok(())
    }

    async fn room_participants(
        &self,
        installation: &Installation,
    ) -> Result<Vec<Participant>, HipChatError> {
        self.check(installation)?;
        Ok(self.participants.clone())
    }

    async fn resolve_endpoints(
        &self,
        capabilities_url: &str,
    ) -> Result<ApiEndpoints, HipChatError> {
        if capabilities_url.contains("invalid") {
            return Err(HipChatError::InvalidCapabilities(
                "missing oauth2Provider".to_string(),
            ));
        }
        Ok(ApiEndpoints {
            token_url: "https://api.hipchat.test/v2/oauth/token".to_string(),
            api_url: "https://api.hipchat.test/v2/".to_string(),
        })
    }
}

pub fn installation(oauth_id: &str, room_id: u64) -> Installation {
    Installation {
        oauth_id: oauth_id.to_string(),
        oauth_secret: "secret".to_string(),
        group_id: 1,
        room_id,
        capabilities_url: "https://api.hipchat.test/v2/capabilities".to_string(),
        token_url: "https://api.hipchat.test/v2/oauth/token".to_string(),
        api_url: "https://api.hipchat.test/v2/".to_string(),
        installed_at: Utc::now(),
    }
}

pub fn user(mention_name: &str, name: &str) -> StatusUser {
    StatusUser {
        id: 1,
        name: name.to_string(),
        mention_name: mention_name.to_string(),
    }
}

pub fn participant(mention_name: &str, timezone: Option<&str>) -> Participant {
    Participant {
        mention_name: mention_name.to_string(),
        name: mention_name.to_string(),
        timezone: timezone.map(str::to_string),
    }
}

pub fn setup_db() -> Database {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    db
}
