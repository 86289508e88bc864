// Trait abstractions for the snapshot pipeline's external dependencies.
//
// CommentSource: comment listings + replies (Reddit).
// MediaHost: album creation + URL side-loads (Imgur).
// SnapshotLedger: the Postgres processing ledger.
//
// These enable deterministic testing with the mocks in `testing`:
// no network, no database. `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use imgur_client::{Album, ImgurClient, UploadedImage};
use reddit_client::{CommentData, RedditClient, RedditError};
use snapbot_common::{Comment, CommentKey};
use snapbot_ledger::{Ledger, SnapshotRecord};

/// Error from posting a reply. Rate limiting is the one transient failure
/// the snapshot command handles specially.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// CommentSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Most-recent comments for a subreddit, source order preserved.
    async fn recent_comments(&self, subreddit: &str, limit: u32) -> Result<Vec<Comment>>;

    /// Post a reply under a comment.
    async fn reply(&self, comment: &Comment, text: &str) -> std::result::Result<(), ReplyError>;
}

#[async_trait]
impl CommentSource for RedditClient {
    async fn recent_comments(&self, subreddit: &str, limit: u32) -> Result<Vec<Comment>> {
        let raw = self.subreddit_comments(subreddit, limit).await?;
        Ok(raw.into_iter().map(comment_from_data).collect())
    }

    async fn reply(&self, comment: &Comment, text: &str) -> std::result::Result<(), ReplyError> {
        match self.post_comment(&comment.fullname(), text).await {
            Ok(()) => Ok(()),
            Err(RedditError::RateLimited(msg)) => Err(ReplyError::RateLimited(msg)),
            Err(err) => Err(ReplyError::Other(err.into())),
        }
    }
}

/// Convert a raw Reddit comment into the processor-facing type. Deleted
/// accounts come back as the literal `[deleted]` author.
fn comment_from_data(data: CommentData) -> Comment {
    let author = data.author.filter(|a| a != "[deleted]");
    let created_utc =
        DateTime::from_timestamp(data.created_utc as i64, 0).unwrap_or_else(Utc::now);

    Comment {
        id: data.id,
        link_id: data.link_id,
        author,
        body: data.body,
        created_utc,
        permalink: data.permalink,
        subreddit: data.subreddit,
    }
}

// ---------------------------------------------------------------------------
// MediaHost
// ---------------------------------------------------------------------------

#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn create_album(&self, title: &str, description: &str) -> Result<Album>;

    async fn upload_from_url(
        &self,
        image_url: &str,
        title: &str,
        description: &str,
        album_deletehash: &str,
    ) -> Result<UploadedImage>;
}

#[async_trait]
impl MediaHost for ImgurClient {
    async fn create_album(&self, title: &str, description: &str) -> Result<Album> {
        Ok(self.create_album(title, description).await?)
    }

    async fn upload_from_url(
        &self,
        image_url: &str,
        title: &str,
        description: &str,
        album_deletehash: &str,
    ) -> Result<UploadedImage> {
        Ok(self
            .upload_from_url(image_url, title, description, album_deletehash)
            .await?)
    }
}

// ---------------------------------------------------------------------------
// SnapshotLedger
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SnapshotLedger: Send + Sync {
    async fn find(&self, key: &CommentKey) -> Result<Option<SnapshotRecord>>;

    async fn mark_seen(
        &self,
        key: &CommentKey,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn record_urls(&self, key: &CommentKey, urls: &[String]) -> Result<()>;

    async fn finish_no_urls(&self, key: &CommentKey) -> Result<()>;

    async fn record_album(
        &self,
        key: &CommentKey,
        album_id: &str,
        album_deletehash: &str,
    ) -> Result<()>;

    async fn record_uploads(&self, key: &CommentKey, image_links: &[String]) -> Result<()>;

    async fn record_reply_text(&self, key: &CommentKey, text: &str) -> Result<()>;

    async fn finish_replied(&self, key: &CommentKey) -> Result<()>;

    async fn queue_reply(&self, key: &CommentKey, text: &str) -> Result<()>;
}

#[async_trait]
impl SnapshotLedger for Ledger {
    async fn find(&self, key: &CommentKey) -> Result<Option<SnapshotRecord>> {
        Ledger::find(self, key).await
    }

    async fn mark_seen(
        &self,
        key: &CommentKey,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        Ledger::mark_seen(self, key, author, created_at).await
    }

    async fn record_urls(&self, key: &CommentKey, urls: &[String]) -> Result<()> {
        Ledger::record_urls(self, key, urls).await
    }

    async fn finish_no_urls(&self, key: &CommentKey) -> Result<()> {
        Ledger::finish_no_urls(self, key).await
    }

    async fn record_album(
        &self,
        key: &CommentKey,
        album_id: &str,
        album_deletehash: &str,
    ) -> Result<()> {
        Ledger::record_album(self, key, album_id, album_deletehash).await
    }

    async fn record_uploads(&self, key: &CommentKey, image_links: &[String]) -> Result<()> {
        Ledger::record_uploads(self, key, image_links).await
    }

    async fn record_reply_text(&self, key: &CommentKey, text: &str) -> Result<()> {
        Ledger::record_reply_text(self, key, text).await
    }

    async fn finish_replied(&self, key: &CommentKey) -> Result<()> {
        Ledger::finish_replied(self, key).await
    }

    async fn queue_reply(&self, key: &CommentKey, text: &str) -> Result<()> {
        Ledger::queue_reply(self, key, text).await
    }
}
