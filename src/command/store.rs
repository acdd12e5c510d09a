use anyhow::Result;
use async_trait::async_trait;

use crate::db::Database;
use crate::models::{RoomData, RoomKey, RoomOptions, StatusEntry};

/// Persistence seen by the dispatcher: one document per room.
///
/// Each call is atomic on its own. Nothing spans calls, so two members
/// recording at once both land, while two records by the same member race and
/// the later one wins.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// `None` when the room has never been written to.
    async fn find_room_data(&self, key: &RoomKey) -> Result<Option<RoomData>>;

    /// Replace the whole room document.
    async fn upsert_room_data(&self, key: &RoomKey, data: &RoomData) -> Result<()>;

    /// Store `entry` under its mention-name, keeping everyone else's status.
    async fn put_status(&self, key: &RoomKey, entry: StatusEntry) -> Result<()>;

    /// Replace the room options, keeping the statuses.
    async fn set_options(&self, key: &RoomKey, options: RoomOptions) -> Result<()>;
}

#[async_trait]
impl RoomRepository for Database {
    async fn find_room_data(&self, key: &RoomKey) -> Result<Option<RoomData>> {
        self.get_room_data(key)
    }

    async fn upsert_room_data(&self, key: &RoomKey, data: &RoomData) -> Result<()> {
        self.save_room_data(key, data)
    }

    async fn put_status(&self, key: &RoomKey, entry: StatusEntry) -> Result<()> {
        self.upsert_status(key, entry)
    }

    async fn set_options(&self, key: &RoomKey, options: RoomOptions) -> Result<()> {
        self.set_room_options(key, options)
    }
}
