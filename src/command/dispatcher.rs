use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::expiry::resolve_expiry;
use super::registry::{Parameter, ParameterKind, ParameterRegistry};
use super::render::{render_all, render_one, LINE_BREAK};
use super::store::RoomRepository;
use super::tokenizer::{tokenize, Flags, ParsedCommand};
use crate::hipchat::{ChatApi, Notification};
use crate::models::{Installation, RoomData, RoomOptions, StatusEntry, StatusUser};

pub const NO_STATUS_FOUND: &str =
    "No status found. Type '/standup I did this' to add your own status.";
pub const STATUS_RECORDED: &str = "Status recorded. Type '/standup' to see the full report.";
pub const NO_STANDALONE_OPTION: &str =
    "None of these options work without a status. Type '/standup --help' to see the available options.";

/// Runs one `/standup` command end to end.
///
/// Every path sends at most one notification, except options that also show
/// the report afterwards. Writes always complete before the acknowledgement is
/// sent.
pub struct Dispatcher {
    registry: Arc<ParameterRegistry>,
    rooms: Arc<dyn RoomRepository>,
    chat: Arc<dyn ChatApi>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ParameterRegistry>,
        rooms: Arc<dyn RoomRepository>,
        chat: Arc<dyn ChatApi>,
    ) -> Self {
        Self {
            registry,
            rooms,
            chat,
        }
    }

    /// Handle the text following `/standup`, sent by `from` in the
    /// installation's room.
    pub async fn dispatch(
        &self,
        installation: &Installation,
        from: &StatusUser,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let command = tokenize(text, &self.registry);

        if command.status.is_empty() {
            self.run_options(installation, &command.flags, now).await
        } else if let Some(mention) = single_mention(&command.status) {
            self.display_one(installation, mention, now).await
        } else {
            self.record(installation, from, command, now).await
        }
    }

    async fn run_options(
        &self,
        installation: &Installation,
        flags: &Flags,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !flags.is_empty() {
            let standalone = flags
                .iter()
                .filter_map(|(alias, _)| self.registry.resolve(alias).ok())
                .find(|parameter| parameter.usable_without_status);

            let Some(parameter) = standalone else {
                return self
                    .notify(installation, Notification::text(NO_STANDALONE_OPTION))
                    .await;
            };

            let argument = flags.argument_for(parameter).unwrap_or_default();
            self.run_handler(installation, parameter, argument).await?;

            if !parameter.show_statuses_after {
                return Ok(());
            }
        }

        self.display_all(installation, flags, now).await
    }

    async fn run_handler(
        &self,
        installation: &Installation,
        parameter: &Parameter,
        argument: &str,
    ) -> Result<()> {
        match parameter.kind {
            ParameterKind::ToggleExpired => self.toggle_expired(installation).await,
            ParameterKind::Help => self.notify(installation, self.help(argument)).await,
            // Only change how the report below is filtered
            ParameterKind::All | ParameterKind::NoExpired => Ok(()),
            ParameterKind::Expiry => Ok(()),
        }
    }

    async fn toggle_expired(&self, installation: &Installation) -> Result<()> {
        let key = installation.room_key();
        let current = self
            .rooms
            .find_room_data(&key)
            .await?
            .map(|data| data.options)
            .unwrap_or_default();

        let options = RoomOptions {
            show_expired: !current.show_expired,
        };
        self.rooms.set_options(&key, options).await?;

        tracing::info!(
            client_id = %key.client_id,
            show_expired = options.show_expired,
            "Room default for expired statuses changed"
        );

        let message = if options.show_expired {
            "Expired statuses are now shown by default."
        } else {
            "Expired statuses are now hidden by default."
        };
        self.notify(installation, Notification::text(message)).await
    }

    fn help(&self, argument: &str) -> Notification {
        let query = argument.trim();
        if query.is_empty() {
            return Notification::html(help_overview(&self.registry));
        }

        match self.registry.lookup(query) {
            Ok(parameter) => Notification::html(help_detail(parameter)),
            Err(err) => {
                tracing::debug!("Help requested for {}", err);
                Notification::text(format!(
                    "Unknown option '{}'. Type '/standup --help' to list the available options.",
                    query
                ))
            }
        }
    }

    async fn display_all(
        &self,
        installation: &Installation,
        flags: &Flags,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let data = self.rooms.find_room_data(&installation.room_key()).await?;
        let defaults = data.as_ref().map(|data| data.options).unwrap_or_default();
        let show_expired = self.show_expired(flags, defaults);

        self.notify(installation, report(data.as_ref(), show_expired, now))
            .await
    }

    /// `--all` beats `--no-expired`; without either the room default applies.
    fn show_expired(&self, flags: &Flags, defaults: RoomOptions) -> bool {
        let given = |kind| {
            self.registry
                .by_kind(kind)
                .is_some_and(|parameter| flags.contains(parameter))
        };

        if given(ParameterKind::All) {
            true
        } else if given(ParameterKind::NoExpired) {
            false
        } else {
            defaults.show_expired
        }
    }

    async fn display_one(
        &self,
        installation: &Installation,
        mention: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let data = self.rooms.find_room_data(&installation.room_key()).await?;

        let notification = match data.as_ref().and_then(|data| data.statuses.get(mention)) {
            Some(entry) => Notification::html(render_one(entry, now)),
            None => Notification::text(NO_STATUS_FOUND),
        };
        self.notify(installation, notification).await
    }

    async fn record(
        &self,
        installation: &Installation,
        from: &StatusUser,
        command: ParsedCommand,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let misplaced = command.flags.iter().find(|(alias, _)| {
            self.registry
                .resolve(alias)
                .is_ok_and(|parameter| !parameter.usable_with_status)
        });
        if let Some((alias, _)) = misplaced {
            return self
                .notify(
                    installation,
                    Notification::text(format!(
                        "{} cannot be used together with a status. Type '/standup --help' to see the available options.",
                        alias
                    )),
                )
                .await;
        }

        let expires_at = match resolve_expiry(&command.flags, &self.registry, now) {
            Ok(expires_at) => expires_at,
            Err(err) => {
                tracing::info!(user = %from.mention_name, "Rejected status: {}", err);
                return self
                    .notify(
                        installation,
                        Notification::text(format!(
                            "Status not recorded: {}. Type '/standup --help=expiry' for the accepted formats.",
                            err
                        )),
                    )
                    .await;
            }
        };

        let entry = StatusEntry {
            user: from.clone(),
            message: command.status,
            recorded_at: now,
            expires_at,
        };
        self.rooms.put_status(&installation.room_key(), entry).await?;

        tracing::info!(user = %from.mention_name, ?expires_at, "Status recorded");
        self.notify(installation, Notification::text(STATUS_RECORDED))
            .await
    }

    async fn notify(&self, installation: &Installation, notification: Notification) -> Result<()> {
        self.chat
            .send_notification(installation, notification)
            .await?;
        Ok(())
    }
}

/// The aggregate report for a room, or the "no status" notice when nothing
/// is left to show.
pub fn report(data: Option<&RoomData>, show_expired: bool, now: DateTime<Utc>) -> Notification {
    let statuses = data
        .map(|data| data.visible_statuses(show_expired, now))
        .unwrap_or_default();

    if statuses.is_empty() {
        Notification::text(NO_STATUS_FOUND)
    } else {
        Notification::html(render_all(&statuses, now))
    }
}

/// `@name` with nothing else asks for one member's status.
fn single_mention(status: &str) -> Option<&str> {
    status
        .strip_prefix('@')
        .filter(|name| !name.is_empty() && !name.contains(char::is_whitespace))
}

fn help_overview(registry: &ParameterRegistry) -> String {
    let mut lines = vec!["<b>Usage:</b> /standup [options] [status]".to_string()];
    lines.extend(registry.iter().map(|parameter| {
        format!(
            "<code>{}</code>: {}",
            parameter.canonical_alias(),
            parameter.short_description
        )
    }));
    lines.join(LINE_BREAK)
}

fn help_detail(parameter: &Parameter) -> String {
    let canonical = parameter.canonical_alias();
    let others: Vec<&str> = parameter
        .aliases
        .iter()
        .map(String::as_str)
        .filter(|alias| *alias != canonical)
        .collect();

    let mut detail = format!("<b>{}</b>", canonical);
    if !others.is_empty() {
        detail.push_str(&format!(" (also {})", others.join(", ")));
    }
    detail.push_str(&format!(": {}", parameter.long_description));
    detail
}
