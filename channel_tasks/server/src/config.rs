use serde::Deserialize;

/// Server settings, read from environment variables (`PORT`, `DB_URL`, `MATTERMOST_URL`,
/// `BOT_TOKEN`, `BOT_USER_ID`).
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Postgres connection string. Task lists are kept in memory when unset.
    pub db_url: Option<String>,
    /// Base URL of the Mattermost server, e.g. `https://chat.example.com`.
    pub mattermost_url: Option<String>,
    pub bot_token: Option<String>,
    pub bot_user_id: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(environment)
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Returns the Mattermost URL and bot token when both are set.
    pub fn mattermost_credentials(&self) -> Option<(&str, &str)> {
        match (self.mattermost_url.as_deref(), self.bot_token.as_deref()) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => Some((url, token)),
            _ => None,
        }
    }
}

fn default_port() -> u16 {
    8080
}
