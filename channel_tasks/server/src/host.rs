//! Access to the chat platform hosting the task lists.
//!
//! The [`ChatHost`] trait covers the three things the service needs from Mattermost:
//! looking up a user's channels, resolving a channel's display name, and delivering a
//! direct message from the bot account. [`MattermostChatHost`] talks to the REST API v4;
//! [`LoggingChatHost`] stands in when no server is configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the chat host.
#[derive(Error, Debug)]
pub enum HostError {
    /// The HTTP request failed or returned an error status
    #[error("Chat host request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// No chat server is configured for this instance
    #[error("No chat host configured")]
    NotConfigured,
}

/// The parts of a Mattermost channel the service cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub display_name: String,
}

impl Channel {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Operations the service performs against the chat platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatHost: Send + Sync {
    /// Lists every channel, across all teams, that `user_id` is a member of.
    async fn channels_for_user(&self, user_id: &str) -> Result<Vec<Channel>, HostError>;

    /// Fetches a single channel by id.
    async fn channel(&self, channel_id: &str) -> Result<Channel, HostError>;

    /// Posts `message` to the direct channel between the bot and `user_id`.
    async fn send_direct_message(&self, user_id: &str, message: &str) -> Result<(), HostError>;
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

#[derive(Debug, Serialize)]
struct NewPost<'a> {
    channel_id: &'a str,
    message: &'a str,
}

/// [`ChatHost`] over the Mattermost REST API v4, authenticated with a bot access token.
pub struct MattermostChatHost {
    base_url: String,
    token: String,
    bot_user_id: String,
    http_client: reqwest::Client,
}

impl MattermostChatHost {
    /// Creates a host client, asking the server for the bot's user id when none is given.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Address of the Mattermost server, without the `/api/v4` suffix.
    /// * `token` - Access token of the bot account.
    /// * `bot_user_id` - User id of the bot account, if already known.
    #[tracing::instrument(skip(token))]
    pub async fn connect(
        base_url: &str,
        token: &str,
        bot_user_id: Option<String>,
    ) -> Result<Self, HostError> {
        let mut host = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            bot_user_id: bot_user_id.unwrap_or_default(),
            http_client: reqwest::Client::new(),
        };
        if host.bot_user_id.is_empty() {
            let me: User = host.get_json("/users/me").await?;
            host.bot_user_id = me.id;
        }
        tracing::info!("Connected to Mattermost as bot user {}", host.bot_user_id);
        Ok(host)
    }

    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, HostError> {
        let response = self
            .http_client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, HostError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChatHost for MattermostChatHost {
    #[tracing::instrument(skip(self))]
    async fn channels_for_user(&self, user_id: &str) -> Result<Vec<Channel>, HostError> {
        self.get_json(&format!("/users/{}/channels", user_id)).await
    }

    #[tracing::instrument(skip(self))]
    async fn channel(&self, channel_id: &str) -> Result<Channel, HostError> {
        self.get_json(&format!("/channels/{}", channel_id)).await
    }

    #[tracing::instrument(skip(self, message))]
    async fn send_direct_message(&self, user_id: &str, message: &str) -> Result<(), HostError> {
        let members = [user_id, self.bot_user_id.as_str()];
        let direct: Channel = self.post_json("/channels/direct", &members[..]).await?;
        let post = NewPost {
            channel_id: &direct.id,
            message,
        };
        let _: serde_json::Value = self.post_json("/posts", &post).await?;
        Ok(())
    }
}

/// [`ChatHost`] used when no Mattermost server is configured: messages are only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingChatHost;

#[async_trait]
impl ChatHost for LoggingChatHost {
    async fn channels_for_user(&self, _user_id: &str) -> Result<Vec<Channel>, HostError> {
        Ok(Vec::new())
    }

    async fn channel(&self, _channel_id: &str) -> Result<Channel, HostError> {
        Err(HostError::NotConfigured)
    }

    async fn send_direct_message(&self, user_id: &str, message: &str) -> Result<(), HostError> {
        tracing::info!(user_id, "Direct message not delivered, no chat host:\n{}", message);
        Ok(())
    }
}
