use crate::repository::ServiceError;
use crate::store::KvStore;
use channel_tasks_core::DailyPrefs;

/// Per-user reminder preferences, stored under `daily_prefs_<user id>`.
pub struct DailyPrefsStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> DailyPrefsStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    fn key(user_id: &str) -> String {
        format!("daily_prefs_{}", user_id)
    }

    /// Loads the preferences of `user_id`, falling back to the defaults (reminders on,
    /// never sent) when nothing usable is stored.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, user_id: &str) -> DailyPrefs {
        match self.store.get(&Self::key(user_id)).await {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!("Discarding undecodable preferences of {}: {}", user_id, err);
                DailyPrefs::default()
            }),
            Ok(None) => DailyPrefs::default(),
            Err(err) => {
                tracing::warn!("Failed to read preferences of {}: {}", user_id, err);
                DailyPrefs::default()
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn save(&self, user_id: &str, prefs: &DailyPrefs) -> Result<(), ServiceError> {
        let bytes = serde_json::to_vec(prefs)?;
        self.store.set(&Self::key(user_id), bytes).await?;
        Ok(())
    }

    /// Loads, changes and saves the preferences of `user_id`.
    ///
    /// # Returns
    ///
    /// The preferences as saved.
    pub async fn update(
        &self,
        user_id: &str,
        change: impl FnOnce(&mut DailyPrefs),
    ) -> Result<DailyPrefs, ServiceError> {
        let mut prefs = self.load(user_id).await;
        change(&mut prefs);
        self.save(user_id, &prefs).await?;
        Ok(prefs)
    }
}
