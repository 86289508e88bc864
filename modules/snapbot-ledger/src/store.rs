//! Ledger: keyed document store backed by Postgres.
//!
//! Append/upsert-only by key: `mark_seen` creates or resets a row, every
//! later transition widens it. No deletes in normal operation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgQueryResult;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use snapbot_common::CommentKey;

use crate::types::{LedgerStage, SnapshotRecord};

#[derive(Clone)]
pub struct Ledger {
    pool: PgPool,
}

impl Ledger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent DDL, run at startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshot_log (
                submission_id    TEXT         NOT NULL,
                comment_id       TEXT         NOT NULL,
                author           TEXT         NOT NULL,
                created_at       TIMESTAMPTZ  NOT NULL,
                stage            TEXT         NOT NULL,
                snapshot_urls    JSONB,
                album_id         TEXT,
                album_deletehash TEXT,
                image_links      JSONB,
                reply_text       TEXT,
                reply_completed  BOOLEAN,
                updated_at       TIMESTAMPTZ  NOT NULL DEFAULT now(),
                PRIMARY KEY (submission_id, comment_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reply_queue (
                id            BIGSERIAL    PRIMARY KEY,
                submission_id TEXT         NOT NULL,
                comment_id    TEXT         NOT NULL,
                reply_text    TEXT         NOT NULL,
                queued_at     TIMESTAMPTZ  NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a row by key. `None` means the comment has never been seen.
    pub async fn find(&self, key: &CommentKey) -> Result<Option<SnapshotRecord>> {
        let row = sqlx::query_as::<_, SnapshotRecord>(
            r#"
            SELECT submission_id, comment_id, author, created_at, stage,
                   snapshot_urls, album_id, album_deletehash, image_links,
                   reply_text, reply_completed
            FROM snapshot_log
            WHERE submission_id = $1 AND comment_id = $2
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// First sighting of a comment: create the row, or reset a previous
    /// non-terminal attempt back to the start. Reprocessing restarts from
    /// extraction, so downstream fields are cleared.
    pub async fn mark_seen(
        &self,
        key: &CommentKey,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO snapshot_log (submission_id, comment_id, author, created_at, stage)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (submission_id, comment_id) DO UPDATE SET
                author = EXCLUDED.author,
                created_at = EXCLUDED.created_at,
                stage = EXCLUDED.stage,
                snapshot_urls = NULL,
                album_id = NULL,
                album_deletehash = NULL,
                image_links = NULL,
                reply_text = NULL,
                reply_completed = NULL,
                updated_at = now()
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(author)
        .bind(created_at)
        .bind(LedgerStage::Seen.as_str())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, "ledger: seen");
        Ok(())
    }

    /// Record the extracted URL list, in extraction order.
    pub async fn record_urls(&self, key: &CommentKey, urls: &[String]) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE snapshot_log
            SET snapshot_urls = $3, stage = $4, updated_at = now()
            WHERE submission_id = $1 AND comment_id = $2
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(Json(urls))
        .bind(LedgerStage::Extracted.as_str())
        .execute(&self.pool)
        .await?;

        ensure_row(result, key, "record_urls")
    }

    /// Terminal: extraction found no URLs. "Nothing to do" is a successful
    /// outcome and must not be retried.
    pub async fn finish_no_urls(&self, key: &CommentKey) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE snapshot_log
            SET reply_completed = TRUE, stage = $3, updated_at = now()
            WHERE submission_id = $1 AND comment_id = $2
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(LedgerStage::NoUrls.as_str())
        .execute(&self.pool)
        .await?;

        ensure_row(result, key, "finish_no_urls")
    }

    /// Record the destination album.
    pub async fn record_album(
        &self,
        key: &CommentKey,
        album_id: &str,
        album_deletehash: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE snapshot_log
            SET album_id = $3, album_deletehash = $4, stage = $5, updated_at = now()
            WHERE submission_id = $1 AND comment_id = $2
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(album_id)
        .bind(album_deletehash)
        .bind(LedgerStage::AlbumCreated.as_str())
        .execute(&self.pool)
        .await?;

        ensure_row(result, key, "record_album")
    }

    /// Record uploaded image links, positionally correlated with
    /// `snapshot_urls`.
    pub async fn record_uploads(&self, key: &CommentKey, image_links: &[String]) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE snapshot_log
            SET image_links = $3, stage = $4, updated_at = now()
            WHERE submission_id = $1 AND comment_id = $2
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(Json(image_links))
        .bind(LedgerStage::Uploaded.as_str())
        .execute(&self.pool)
        .await?;

        ensure_row(result, key, "record_uploads")
    }

    /// Persist the composed reply before attempting to post it, so the
    /// text survives a failed or rate-limited post.
    pub async fn record_reply_text(&self, key: &CommentKey, text: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE snapshot_log
            SET reply_text = $3, reply_completed = FALSE, stage = $4, updated_at = now()
            WHERE submission_id = $1 AND comment_id = $2
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(text)
        .bind(LedgerStage::ReplyPending.as_str())
        .execute(&self.pool)
        .await?;

        ensure_row(result, key, "record_reply_text")
    }

    /// Terminal: reply posted.
    pub async fn finish_replied(&self, key: &CommentKey) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE snapshot_log
            SET reply_completed = TRUE, stage = $3, updated_at = now()
            WHERE submission_id = $1 AND comment_id = $2
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(LedgerStage::Done.as_str())
        .execute(&self.pool)
        .await?;

        ensure_row(result, key, "finish_replied")
    }

    /// Push a rate-limited reply onto the queue table. Insert-only; no
    /// consumer drains it yet; the resume path re-sends from
    /// `snapshot_log` instead.
    pub async fn queue_reply(&self, key: &CommentKey, text: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reply_queue (submission_id, comment_id, reply_text)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&key.submission_id)
        .bind(&key.comment_id)
        .bind(text)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, "ledger: reply queued");
        Ok(())
    }
}

/// Stage transitions update an existing row; a zero-row update means the
/// `seen` write never happened and the state machine is out of order.
fn ensure_row(result: PgQueryResult, key: &CommentKey, op: &str) -> Result<()> {
    if result.rows_affected() == 0 {
        anyhow::bail!("no ledger row for {key} during {op}");
    }
    debug!(key = %key, op, "ledger: updated");
    Ok(())
}

// ---------------------------------------------------------------------------
// sqlx::FromRow for SnapshotRecord
// ---------------------------------------------------------------------------

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SnapshotRecord {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;

        let stage_str: String = row.try_get("stage")?;
        let stage = LedgerStage::parse(&stage_str).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown ledger stage: {stage_str}").into())
        })?;

        let snapshot_urls: Option<Json<Vec<String>>> = row.try_get("snapshot_urls")?;
        let image_links: Option<Json<Vec<String>>> = row.try_get("image_links")?;

        Ok(SnapshotRecord {
            submission_id: row.try_get("submission_id")?,
            comment_id: row.try_get("comment_id")?,
            author: row.try_get("author")?,
            created_at: row.try_get("created_at")?,
            stage,
            snapshot_urls: snapshot_urls.map(|j| j.0),
            album_id: row.try_get("album_id")?,
            album_deletehash: row.try_get("album_deletehash")?,
            image_links: image_links.map(|j| j.0),
            reply_text: row.try_get("reply_text")?,
            reply_completed: row.try_get("reply_completed")?,
        })
    }
}
