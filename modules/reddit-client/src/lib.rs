pub mod error;
pub mod types;

pub use error::{RedditError, Result};
pub use types::CommentData;

use std::time::Duration;

use tracing::{debug, info};
use types::{Listing, ReplyEnvelope, TokenResponse};

const WWW_BASE: &str = "https://www.reddit.com";
const OAUTH_BASE: &str = "https://oauth.reddit.com";

/// Authenticated Reddit client for a script app. Holds one bearer token
/// for the process lifetime; the bot's runs are short enough that token
/// refresh is not handled here.
pub struct RedditClient {
    client: reqwest::Client,
    token: String,
}

impl RedditClient {
    /// Log in with the script-app password grant and return an
    /// authenticated client.
    pub async fn login(
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
        user_agent: &str,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .expect("Failed to build HTTP client");

        info!(username, "Logging into Reddit");

        let resp = client
            .post(format!("{WWW_BASE}/api/v1/access_token"))
            .basic_auth(client_id, Some(client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token_resp: TokenResponse = resp.json().await?;
        match token_resp.access_token {
            Some(token) => Ok(Self { client, token }),
            None => Err(RedditError::Login(
                token_resp.error.unwrap_or_else(|| "no access token in response".to_string()),
            )),
        }
    }

    /// Most-recent comments for a subreddit, newest first as Reddit
    /// returns them.
    pub async fn subreddit_comments(&self, subreddit: &str, limit: u32) -> Result<Vec<CommentData>> {
        let resp = self
            .client
            .get(format!("{OAUTH_BASE}/r/{subreddit}/comments"))
            .query(&[("limit", limit.to_string()), ("raw_json", "1".to_string())])
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let listing: Listing = resp.json().await?;
        let comments: Vec<CommentData> = listing
            .data
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t1")
            .map(|thing| thing.data)
            .collect();

        debug!(subreddit, count = comments.len(), "fetched comments");
        Ok(comments)
    }

    /// Post a reply under a thing (`t1_...` comment fullname). Classifies
    /// Reddit's RATELIMIT error so callers can treat it as transient.
    pub async fn post_comment(&self, parent_fullname: &str, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{OAUTH_BASE}/api/comment"))
            .bearer_auth(&self.token)
            .form(&[
                ("api_type", "json"),
                ("thing_id", parent_fullname),
                ("text", text),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ReplyEnvelope = resp.json().await?;
        if let Some((code, message, _)) = envelope.json.errors.into_iter().next() {
            if code == "RATELIMIT" {
                return Err(RedditError::RateLimited(message));
            }
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: format!("{code}: {message}"),
            });
        }

        debug!(parent = parent_fullname, "reply posted");
        Ok(())
    }
}
