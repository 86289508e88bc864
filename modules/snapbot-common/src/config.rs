use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Contains only secrets and env-specific values; every component takes
/// the pieces it needs through its constructor.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Reddit (script-app OAuth)
    pub reddit_username: String,
    pub reddit_password: String,
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub user_agent: String,

    // Capture service
    pub snapito_api_key: String,
    pub snapito_base_url: String,

    // Image host
    pub imgur_client_id: String,

    // Processing
    pub subreddits: Vec<String>,
    pub comment_limit: u32,

    // Driver loop
    pub loop_sleep_secs: u64,
    pub loop_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: required("DATABASE_URL")?,
            reddit_username: required("REDDIT_BOT_USER")?,
            reddit_password: required("REDDIT_BOT_PASSWORD")?,
            reddit_client_id: required("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required("REDDIT_CLIENT_SECRET")?,
            user_agent: std::env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| "snapbot 0.1 by /u/snapshot_bot".to_string()),
            snapito_api_key: required("SNAPITO_API_KEY")?,
            snapito_base_url: std::env::var("SNAP_API_URL")
                .unwrap_or_else(|_| "http://api.snapito.com".to_string()),
            imgur_client_id: required("IMGUR_API_KEY")?,
            subreddits: std::env::var("SUBREDDIT_LIST")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
            comment_limit: std::env::var("COMMENT_LIMIT")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("COMMENT_LIMIT must be a number")?,
            loop_sleep_secs: std::env::var("LOOP_SLEEP")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("LOOP_SLEEP must be a number of seconds")?,
            loop_timeout_secs: std::env::var("LOOP_TIMEOUT")
                .unwrap_or_else(|_| "480".to_string())
                .parse()
                .context("LOOP_TIMEOUT must be a number of seconds")?,
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  REDDIT_BOT_USER: {}", self.reddit_username);
        tracing::info!("  SNAPITO_API_KEY: {}", preview(&self.snapito_api_key));
        tracing::info!("  IMGUR_API_KEY: {}", preview(&self.imgur_client_id));
        tracing::info!("  SUBREDDIT_LIST: {}", self.subreddits.join(","));
        tracing::info!("  COMMENT_LIMIT: {}", self.comment_limit);
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} environment variable is required"))
}
