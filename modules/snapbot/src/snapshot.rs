//! The snapshot command: trigger detection, URL extraction, capture,
//! album upload, reply, with every stage recorded in the ledger so a
//! comment is processed at most once end-to-end.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use imgur_client::{album_link, Album};
use snapbot_common::{Comment, CommentKey};
use snapbot_ledger::{LedgerStage, SnapshotRecord};
use snapito_client::SnapitoClient;

use crate::command::Command;
use crate::extract::extract_urls;
use crate::reply::compose_reply;
use crate::traits::{CommentSource, MediaHost, ReplyError, SnapshotLedger};

pub struct SnapshotCommand {
    trigger: String,
    bot_user: String,
    snapito: SnapitoClient,
    host: Arc<dyn MediaHost>,
    ledger: Arc<dyn SnapshotLedger>,
    source: Arc<dyn CommentSource>,
}

impl SnapshotCommand {
    pub fn new(
        bot_user: &str,
        snapito: SnapitoClient,
        host: Arc<dyn MediaHost>,
        ledger: Arc<dyn SnapshotLedger>,
        source: Arc<dyn CommentSource>,
    ) -> Self {
        Self {
            trigger: format!("/u/{bot_user}"),
            bot_user: bot_user.to_string(),
            snapito,
            host,
            ledger,
            source,
        }
    }

    async fn run_pipeline(&self, comment: &Comment, author: &str, key: &CommentKey) -> Result<()> {
        self.ledger
            .mark_seen(key, author, comment.created_utc)
            .await?;

        let urls = extract_urls(&comment.body);
        self.ledger.record_urls(key, &urls).await?;

        if urls.is_empty() {
            info!(key = %key, "No URLs to process, skipping");
            return self.ledger.finish_no_urls(key).await;
        }

        let album = self.create_album(author, &comment.permalink).await?;
        self.ledger
            .record_album(key, &album.id, &album.deletehash)
            .await?;

        let image_links = self
            .capture_and_upload(&urls, author, &comment.permalink, &album)
            .await?;
        self.ledger.record_uploads(key, &image_links).await?;

        let reply_text = compose_reply(&urls, &image_links, &album.link());
        self.ledger.record_reply_text(key, &reply_text).await?;

        self.send_reply(comment, key, &reply_text).await
    }

    async fn create_album(&self, author: &str, permalink: &str) -> Result<Album> {
        let title = format!("{author}'s snapshot");
        let description = format!(
            "Snapshot for {author} at {permalink}.\nSnapshot by: {}",
            self.trigger
        );

        let album = self
            .host
            .create_album(&title, &description)
            .await
            .context("creating album")?;
        debug!(album_id = %album.id, "created album");
        Ok(album)
    }

    /// Capture and upload every URL in extraction order. The resulting
    /// links correlate with `urls` by position. The first failure aborts
    /// the comment; earlier uploads stay orphaned in the album.
    async fn capture_and_upload(
        &self,
        urls: &[String],
        author: &str,
        permalink: &str,
        album: &Album,
    ) -> Result<Vec<String>> {
        info!(count = urls.len(), "capturing urls");

        let mut image_links = Vec::with_capacity(urls.len());
        for url in urls {
            let capture = self.snapito.capture_url(url);
            debug!(url = %url, capture = %capture, "requesting capture");

            let title = image_title(url, Utc::now());
            let description = format!(
                "Snapshot for {author} at {permalink}.\nURL: {url}\n\nSnapshot by: {}",
                self.trigger
            );

            let image = self
                .host
                .upload_from_url(&capture, &title, &description, &album.deletehash)
                .await
                .with_context(|| format!("uploading capture for {url}"))?;

            info!(url = %url, image_id = %image.id, link = %image.link, "capture uploaded");
            image_links.push(image.link);
        }

        Ok(image_links)
    }

    async fn send_reply(&self, comment: &Comment, key: &CommentKey, text: &str) -> Result<()> {
        match self.source.reply(comment, text).await {
            Ok(()) => {
                self.ledger.finish_replied(key).await?;
                info!(key = %key, "reply posted");
                Ok(())
            }
            Err(ReplyError::RateLimited(msg)) => {
                // Not terminal: a future poll resumes from ReplyPending
                // without redoing album or upload work.
                warn!(key = %key, msg = %msg, "reply rate limited, queueing");
                self.ledger.queue_reply(key, text).await?;
                Ok(())
            }
            Err(ReplyError::Other(err)) => Err(err.context("posting reply")),
        }
    }

    /// Resume a rate-limited reply: everything needed to post again is in
    /// the ledger, so no album or upload calls are repeated.
    async fn resume_reply(
        &self,
        comment: &Comment,
        key: &CommentKey,
        record: &SnapshotRecord,
    ) -> Result<()> {
        let text = match &record.reply_text {
            Some(text) => text.clone(),
            None => {
                let urls = record.snapshot_urls.clone().unwrap_or_default();
                let links = record.image_links.clone().unwrap_or_default();
                let album = record.album_id.as_deref().map(album_link).unwrap_or_default();
                compose_reply(&urls, &links, &album)
            }
        };

        self.send_reply(comment, key, &text).await
    }
}

#[async_trait]
impl Command for SnapshotCommand {
    fn name(&self) -> &str {
        "SnapshotBot"
    }

    async fn process(&self, comment: &Comment) -> Result<()> {
        // Applicability: cheap checks before any ledger read.
        let Some(author) = comment.author.as_deref() else {
            return Ok(());
        };
        if author == self.bot_user || !comment.body.contains(&self.trigger) {
            return Ok(());
        }

        debug!(
            submission_id = %comment.link_id,
            comment_id = %comment.id,
            author,
            "trigger matched"
        );

        let key = comment.key();
        match self.ledger.find(&key).await? {
            Some(record) if record.is_terminal() => {
                debug!(key = %key, "already processed, skipping");
                Ok(())
            }
            Some(record) if record.stage == LedgerStage::ReplyPending => {
                info!(key = %key, "resuming pending reply");
                self.resume_reply(comment, &key, &record).await
            }
            // A non-terminal record from a failed earlier attempt: start
            // over. Side effects past the seen stage (album, uploads) are
            // not rediscovered; reprocessing creates fresh ones.
            _ => self.run_pipeline(comment, author, &key).await,
        }
    }
}

/// Per-image title: truncated URL plus capture timestamp.
fn image_title(url: &str, now: DateTime<Utc>) -> String {
    let title_url: String = if url.chars().count() > 30 {
        let head: String = url.chars().take(30).collect();
        format!("{head}..")
    } else {
        url.to_string()
    };
    format!("Snapshot {title_url} [{now}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn image_title_truncates_long_urls() {
        let now = Utc.with_ymd_and_hms(2013, 5, 31, 12, 0, 0).unwrap();
        let url = "http://example.com/a/very/long/path/that/keeps/going";
        let title = image_title(url, now);
        assert!(title.starts_with("Snapshot http://example.com/a/very/lon"));
        assert!(title.contains(".."));
        assert!(title.contains("2013-05-31"));
    }

    #[test]
    fn image_title_keeps_short_urls_whole() {
        let now = Utc.with_ymd_and_hms(2013, 5, 31, 12, 0, 0).unwrap();
        let title = image_title("http://example.com", now);
        assert!(title.contains("http://example.com"));
        assert!(!title.contains(".."));
    }
}
