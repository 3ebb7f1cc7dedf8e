//! Slash commands: reminder toggles and Markdown task listings.

use crate::context::AppContext;
use crate::prefs::DailyPrefsStore;
use crate::repository::{Scope, TaskListRepository};
use channel_tasks_core::render::render_listing;
use channel_tasks_core::{DailyPrefs, ListingScope, TaskFilter};
use serde::{Deserialize, Serialize};

const UNKNOWN_CHANNEL_NAME: &str = "This Channel";

/// What a slash command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    EnableReminders,
    DisableReminders,
    ResetReminders,
    ChannelTasks(TaskFilter),
    PrivateTasks(TaskFilter),
}

/// A trigger registered with the chat host.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CommandRegistration {
    pub trigger: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub action: CommandAction,
}

const fn register(
    trigger: &'static str,
    description: &'static str,
    action: CommandAction,
) -> CommandRegistration {
    CommandRegistration {
        trigger,
        description,
        action,
    }
}

pub const REGISTRATIONS: &[CommandRegistration] = &[
    register("tasks-message-on", "Enable daily task reminders", CommandAction::EnableReminders),
    register("tasks-message-off", "Disable daily task reminders", CommandAction::DisableReminders),
    register("tasks-message-reset", "Reset daily task reminder", CommandAction::ResetReminders),
    register(
        "tasks",
        "Show all tasks in this channel",
        CommandAction::ChannelTasks(TaskFilter::All),
    ),
    register(
        "tasks-mine",
        "Show tasks assigned to me in this channel",
        CommandAction::ChannelTasks(TaskFilter::Mine),
    ),
    register(
        "tasks-overdue",
        "Show tasks due in the past in this channel",
        CommandAction::ChannelTasks(TaskFilter::Overdue),
    ),
    register(
        "tasks-today",
        "Show tasks due today in this channel",
        CommandAction::ChannelTasks(TaskFilter::Today),
    ),
    register(
        "tasks-incomplete",
        "Show incomplete tasks in this channel",
        CommandAction::ChannelTasks(TaskFilter::Incomplete),
    ),
    register(
        "tasks-complete",
        "Show completed tasks in this channel",
        CommandAction::ChannelTasks(TaskFilter::Complete),
    ),
    register(
        "tasks-todo",
        "Show which tasks to focus on next in this channel (incomplete, assigned to me, prioritized by deadline)",
        CommandAction::ChannelTasks(TaskFilter::Todo),
    ),
    register(
        "tasks-private",
        "Show all private tasks",
        CommandAction::PrivateTasks(TaskFilter::All),
    ),
    register(
        "tasks-private-overdue",
        "Show private tasks due in the past",
        CommandAction::PrivateTasks(TaskFilter::Overdue),
    ),
    register(
        "tasks-private-today",
        "Show private tasks due today",
        CommandAction::PrivateTasks(TaskFilter::Today),
    ),
    register(
        "tasks-private-incomplete",
        "Show incomplete private tasks",
        CommandAction::PrivateTasks(TaskFilter::Incomplete),
    ),
    register(
        "tasks-private-complete",
        "Show completed private tasks",
        CommandAction::PrivateTasks(TaskFilter::Complete),
    ),
    register(
        "tasks-private-todo",
        "Show which private tasks to focus on next (incomplete, prioritized by deadline)",
        CommandAction::PrivateTasks(TaskFilter::Todo),
    ),
    register(
        "t",
        "Show all tasks in this channel (alias for /tasks)",
        CommandAction::ChannelTasks(TaskFilter::All),
    ),
    register(
        "tmine",
        "Show tasks assigned to me in this channel (alias for /tasks-mine)",
        CommandAction::ChannelTasks(TaskFilter::Mine),
    ),
    register(
        "ttodo",
        "Show which tasks to focus on next in this channel (alias for /tasks-todo)",
        CommandAction::ChannelTasks(TaskFilter::Todo),
    ),
    register(
        "tp",
        "Show all private tasks (alias for /tasks-private)",
        CommandAction::PrivateTasks(TaskFilter::All),
    ),
    register(
        "tptodo",
        "Show which private tasks to focus on next (alias for /tasks-private-todo)",
        CommandAction::PrivateTasks(TaskFilter::Todo),
    ),
];

/// Looks up the action of a command line such as `/tasks-todo extra words`.
pub fn parse_command(command: &str) -> Option<CommandAction> {
    let first = command.split_whitespace().next()?;
    let trigger = first.strip_prefix('/').unwrap_or(first);
    REGISTRATIONS
        .iter()
        .find(|registration| registration.trigger == trigger)
        .map(|registration| registration.action)
}

/// A command invocation forwarded by the chat host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandResponse {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub response_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl CommandResponse {
    /// A reply only the invoking user can see.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: "ephemeral".to_string(),
            text: text.into(),
        }
    }
}

pub struct CommandHandler<'a> {
    context: &'a AppContext,
}

impl<'a> CommandHandler<'a> {
    pub fn new(context: &'a AppContext) -> Self {
        Self { context }
    }

    /// Runs a command. Unknown triggers get an empty response.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, request: &CommandRequest) -> CommandResponse {
        let Some(action) = parse_command(&request.command) else {
            tracing::debug!("Ignoring unknown command {:?}", request.command);
            return CommandResponse::default();
        };
        if request.user_id.is_empty() {
            return CommandResponse::ephemeral("❌ Could not identify the user running this command.");
        }

        match action {
            CommandAction::EnableReminders => {
                self.update_prefs(
                    &request.user_id,
                    DailyPrefs::enable,
                    "✅ Daily task reminders are now **enabled**. You'll receive a summary of your assigned tasks when you first log in each day.",
                )
                .await
            }
            CommandAction::DisableReminders => {
                self.update_prefs(
                    &request.user_id,
                    DailyPrefs::disable,
                    "🔕 Daily task reminders are now **disabled**.",
                )
                .await
            }
            CommandAction::ResetReminders => {
                self.update_prefs(
                    &request.user_id,
                    DailyPrefs::reset,
                    "🔄 Daily task reminder has been **reset**. You will receive a new summary on your next action.",
                )
                .await
            }
            CommandAction::ChannelTasks(filter) => {
                self.list_channel_tasks(&request.channel_id, &request.user_id, filter)
                    .await
            }
            CommandAction::PrivateTasks(filter) => {
                self.list_private_tasks(&request.user_id, filter).await
            }
        }
    }

    async fn update_prefs(
        &self,
        user_id: &str,
        change: fn(&mut DailyPrefs),
        confirmation: &str,
    ) -> CommandResponse {
        let prefs_store = DailyPrefsStore::new(self.context.store.as_ref());
        match prefs_store.update(user_id, change).await {
            Ok(_) => CommandResponse::ephemeral(confirmation),
            Err(err) => {
                tracing::error!("Failed to save preferences of {}: {}", user_id, err);
                CommandResponse::ephemeral("❌ Could not save your reminder preferences.")
            }
        }
    }

    async fn list_channel_tasks(
        &self,
        channel_id: &str,
        user_id: &str,
        filter: TaskFilter,
    ) -> CommandResponse {
        if channel_id.is_empty() {
            return CommandResponse::ephemeral("❌ This command must be run in a channel.");
        }
        let channel_name = match self.context.host.channel(channel_id).await {
            Ok(channel) => channel.display_name,
            Err(err) => {
                tracing::debug!("Falling back to a generic channel name: {}", err);
                UNKNOWN_CHANNEL_NAME.to_string()
            }
        };
        let list = TaskListRepository::new(self.context.store.as_ref())
            .load(&Scope::channel(channel_id))
            .await;
        let window = self.context.clock.day_window();
        CommandResponse::ephemeral(render_listing(
            &list,
            filter,
            &window,
            ListingScope::Channel {
                name: &channel_name,
            },
            Some(user_id),
        ))
    }

    async fn list_private_tasks(&self, user_id: &str, filter: TaskFilter) -> CommandResponse {
        let list = TaskListRepository::new(self.context.store.as_ref())
            .load(&Scope::private(user_id))
            .await;
        let window = self.context.clock.day_window();
        CommandResponse::ephemeral(render_listing(
            &list,
            filter,
            &window,
            ListingScope::Private,
            None,
        ))
    }
}
