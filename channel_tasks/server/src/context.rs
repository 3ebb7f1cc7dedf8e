use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::host::{ChatHost, LoggingChatHost, MattermostChatHost};
use crate::store::{InMemoryKvStore, KvStore, SeaOrmKvStore};
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;

/// Everything a handler needs to serve a request. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn KvStore>,
    pub host: Arc<dyn ChatHost>,
    pub clock: Arc<dyn Clock>,
    /// User id of the bot account; its own posts never count as activity.
    pub bot_user_id: Option<String>,
}

impl AppContext {
    pub fn new(store: Arc<dyn KvStore>, host: Arc<dyn ChatHost>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            host,
            clock,
            bot_user_id: None,
        }
    }

    pub fn with_bot_user_id(mut self, bot_user_id: impl Into<String>) -> Self {
        self.bot_user_id = Some(bot_user_id.into());
        self
    }

    /// Builds the context described by `config`, connecting to Postgres and Mattermost
    /// when they are configured.
    #[tracing::instrument(skip(config))]
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn KvStore> = match config.db_url.as_deref() {
            Some(db_url) => {
                let db = Database::connect(db_url).await?;
                migration::Migrator::up(&db, None).await?;
                tracing::info!("Database migrations applied successfully");
                Arc::new(SeaOrmKvStore::new(db))
            }
            None => {
                tracing::warn!("DB_URL is not set, task lists are kept in memory only");
                Arc::new(InMemoryKvStore::new())
            }
        };

        let mut bot_user_id = config.bot_user_id.clone();
        let host: Arc<dyn ChatHost> = match config.mattermost_credentials() {
            Some((url, token)) => {
                let host = MattermostChatHost::connect(url, token, bot_user_id.clone()).await?;
                bot_user_id = Some(host.bot_user_id().to_string());
                Arc::new(host)
            }
            None => {
                tracing::warn!("MATTERMOST_URL or BOT_TOKEN is not set, digests are only logged");
                Arc::new(LoggingChatHost)
            }
        };

        let context = Self::new(store, host, Arc::new(SystemClock));
        Ok(match bot_user_id {
            Some(bot_user_id) => context.with_bot_user_id(bot_user_id),
            None => context,
        })
    }

    pub fn is_bot(&self, user_id: &str) -> bool {
        self.bot_user_id.as_deref() == Some(user_id)
    }
}
