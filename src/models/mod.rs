//! Domain models for the standup add-on.
//!
//! # Core Concepts
//!
//! - [`StatusEntry`]: One member's latest status update in a room, keyed by
//!   mention-name. Recording a new status replaces the previous one.
//! - [`RoomData`]: Everything persisted for a room: the status collection and
//!   the room's [`RoomOptions`].
//! - [`RoomKey`]: The `(client_id, group_id, capabilities_url)` triple that
//!   identifies a tenant room.
//! - [`Installation`]: The credentials and endpoints HipChat hands over when the
//!   add-on is installed into a room.

mod installation;
mod status;

pub use installation::*;
pub use status::*;
