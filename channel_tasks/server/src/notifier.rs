//! The once-a-day task digest.
//!
//! The first activity of a user on a calendar day (logging in, posting, opening the
//! channel task list, or an explicit activity ping) triggers the digest. The day is
//! recorded before anything is sent, then the digest is composed and delivered on a
//! detached task. Delivery failures are logged and never retried.

use crate::context::AppContext;
use crate::host::HostError;
use crate::prefs::DailyPrefsStore;
use crate::repository::{Scope, ServiceError, TaskListRepository};
use channel_tasks_core::{DigestEntry, DigestSections, DigestState};
use serde::Deserialize;
use tokio::task::JoinHandle;

/// Activity reported by the chat host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    UserLoggedIn {
        user_id: String,
    },
    MessagePosted {
        user_id: String,
        #[serde(default)]
        channel_id: String,
    },
}

/// What an observed activity did.
#[derive(Debug)]
pub enum ActivityOutcome {
    /// The activity came from the bot itself.
    Ignored,
    Disabled,
    AlreadyNotified,
    /// Today's digest was claimed and is being delivered by the returned task.
    Dispatched(JoinHandle<()>),
}

pub struct DailyNotifier<'a> {
    context: &'a AppContext,
}

impl<'a> DailyNotifier<'a> {
    pub fn new(context: &'a AppContext) -> Self {
        Self { context }
    }

    /// Routes a host event to the digest trigger.
    #[tracing::instrument(skip(self))]
    pub async fn handle_event(&self, event: &HostEvent) -> Result<ActivityOutcome, ServiceError> {
        match event {
            HostEvent::UserLoggedIn { user_id } => self.check_and_notify(user_id).await,
            HostEvent::MessagePosted { user_id, .. } if self.context.is_bot(user_id) => {
                Ok(ActivityOutcome::Ignored)
            }
            HostEvent::MessagePosted { user_id, .. } => self.check_and_notify(user_id).await,
        }
    }

    /// Sends today's digest to `user_id` unless reminders are off or it was already sent.
    ///
    /// The date of the digest is saved before this returns. Composing and sending happen
    /// on a spawned task whose handle is returned in [`ActivityOutcome::Dispatched`].
    ///
    /// # Returns
    ///
    /// An error only when the date of the digest could not be saved, in which case
    /// nothing is sent.
    #[tracing::instrument(skip(self))]
    pub async fn check_and_notify(&self, user_id: &str) -> Result<ActivityOutcome, ServiceError> {
        let today = self.context.clock.day_window().today_key();
        let prefs_store = DailyPrefsStore::new(self.context.store.as_ref());
        let mut prefs = prefs_store.load(user_id).await;

        if !prefs.mark_notified(&today) {
            return Ok(match prefs.state(&today) {
                DigestState::Disabled => ActivityOutcome::Disabled,
                _ => ActivityOutcome::AlreadyNotified,
            });
        }
        prefs_store.save(user_id, &prefs).await?;

        let context = self.context.clone();
        let user_id = user_id.to_string();
        let handle = tokio::spawn(async move {
            if let Err(err) = send_daily_summary(&context, &user_id).await {
                tracing::error!("Failed to send daily summary to {}: {}", user_id, err);
            }
        });
        Ok(ActivityOutcome::Dispatched(handle))
    }
}

/// Gathers the tasks relevant to `user_id` and sends the digest over a direct message.
///
/// Channel tasks count when the user is among their assignees; private tasks count when
/// they have a deadline. A failure to list the user's channels only drops the channel
/// tasks.
///
/// # Returns
///
/// * `Ok(true)` - The digest was sent
/// * `Ok(false)` - There was nothing to report, so no message was sent
#[tracing::instrument(skip(context))]
pub async fn send_daily_summary(context: &AppContext, user_id: &str) -> Result<bool, HostError> {
    let window = context.clock.day_window();
    let repository = TaskListRepository::new(context.store.as_ref());

    let mut entries = Vec::new();
    match context.host.channels_for_user(user_id).await {
        Ok(channels) => {
            for channel in channels {
                let list = repository.load(&Scope::channel(&channel.id)).await;
                entries.extend(DigestEntry::from_channel(&list, &channel.display_name, user_id));
            }
        }
        Err(err) => tracing::warn!("Failed to list channels of {}: {}", user_id, err),
    }
    let private = repository.load(&Scope::private(user_id)).await;
    entries.extend(DigestEntry::from_private(&private));

    let Some(message) = DigestSections::categorize(entries, &window).compose(&window) else {
        tracing::info!("No tasks to report to {}", user_id);
        return Ok(false);
    };
    context.host.send_direct_message(user_id, &message).await?;
    tracing::info!("Sent daily summary to {}", user_id);
    Ok(true)
}
