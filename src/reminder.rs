//! Scheduled standup reminder.
//!
//! Meant to be run hourly (e.g. from cron via `standup remind`). For every
//! installed room it pings the members whose local time has reached the
//! reminder hour and posts the current report, as long as the room has at
//! least one status to show.

use anyhow::Result;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::hipchat::{ChatApi, Notification, Participant};
use crate::models::Installation;
use crate::command::{report, RoomRepository};

/// What happened during one reminder run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSummary {
    /// Rooms that received a reminder.
    pub reminded: usize,
    /// Rooms with nothing to report or nobody at the reminder hour.
    pub skipped: usize,
    /// Rooms where a store or API call failed.
    pub failed: usize,
}

/// Remind every room. A failing room is logged and does not stop the batch.
pub async fn remind_all(
    installations: &[Installation],
    rooms: &dyn RoomRepository,
    chat: &dyn ChatApi,
    hour: u32,
    now: DateTime<Utc>,
) -> ReminderSummary {
    let mut summary = ReminderSummary::default();

    for installation in installations {
        match remind_room(installation, rooms, chat, hour, now).await {
            Ok(true) => summary.reminded += 1,
            Ok(false) => summary.skipped += 1,
            Err(err) => {
                tracing::warn!(
                    room_id = installation.room_id,
                    "Reminder failed for room: {:#}",
                    err
                );
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        reminded = summary.reminded,
        skipped = summary.skipped,
        failed = summary.failed,
        "Reminder run finished"
    );
    summary
}

/// Remind a single room. Returns `false` when the room has no status to show
/// (including rooms that have never been used) or no member is due.
pub async fn remind_room(
    installation: &Installation,
    rooms: &dyn RoomRepository,
    chat: &dyn ChatApi,
    hour: u32,
    now: DateTime<Utc>,
) -> Result<bool> {
    let Some(data) = rooms.find_room_data(&installation.room_key()).await? else {
        tracing::debug!(room_id = installation.room_id, "No statuses stored for room yet");
        return Ok(false);
    };

    let show_expired = data.options.show_expired;
    if data.visible_statuses(show_expired, now).is_empty() {
        return Ok(false);
    }

    let participants = chat.room_participants(installation).await?;
    let mentions = due_mentions(&participants, hour, now);
    if mentions.is_empty() {
        return Ok(false);
    }

    chat.send_notification(
        installation,
        Notification::text(format!("Standup for {}", mentions.join(" "))),
    )
    .await?;
    chat.send_notification(installation, report(Some(&data), show_expired, now))
        .await?;

    Ok(true)
}

/// `@mention` of every participant whose local hour equals `hour`.
///
/// Participants without a timezone, or with one that does not parse, are left out.
pub fn due_mentions(participants: &[Participant], hour: u32, now: DateTime<Utc>) -> Vec<String> {
    participants
        .iter()
        .filter(|participant| {
            participant
                .timezone
                .as_deref()
                .and_then(|tz| tz.parse::<Tz>().ok())
                .is_some_and(|tz| now.with_timezone(&tz).hour() == hour)
        })
        .map(|participant| format!("@{}", participant.mention_name))
        .collect()
}
