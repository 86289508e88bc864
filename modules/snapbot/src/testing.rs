// Test mocks for the processor and snapshot pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockSource (CommentSource): per-subreddit comment lists, records replies
// - MockHost (MediaHost): records albums/uploads, deterministic ids
// - MockLedger (SnapshotLedger): stateful in-memory record map with call counters
//
// Plus helpers for constructing test comments.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use imgur_client::{Album, UploadedImage};
use snapbot_common::{Comment, CommentKey};
use snapbot_ledger::{LedgerStage, SnapshotRecord};

use crate::traits::{CommentSource, MediaHost, ReplyError, SnapshotLedger};

// ---------------------------------------------------------------------------
// Comment helpers
// ---------------------------------------------------------------------------

/// Build a comment by `someone` in r/pics under submission `t3_92dd8`.
pub fn test_comment(id: &str, body: &str) -> Comment {
    test_comment_by(Some("someone"), id, body)
}

pub fn test_comment_by(author: Option<&str>, id: &str, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        link_id: "t3_92dd8".to_string(),
        author: author.map(|a| a.to_string()),
        body: body.to_string(),
        created_utc: Utc.with_ymd_and_hms(2013, 5, 31, 12, 0, 0).unwrap(),
        permalink: format!("/r/pics/comments/92dd8/_/{id}/"),
        subreddit: "pics".to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// HashMap-based comment source. Builder pattern: `.on_subreddit()`,
/// `.failing_subreddit()`, `.rate_limited()`.
pub struct MockSource {
    comments: HashMap<String, Vec<Comment>>,
    failing: HashSet<String>,
    rate_limited: bool,
    pub replies: Mutex<Vec<(String, String)>>,
    pub fetch_calls: AtomicU32,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            comments: HashMap::new(),
            failing: HashSet::new(),
            rate_limited: false,
            replies: Mutex::new(Vec::new()),
            fetch_calls: AtomicU32::new(0),
        }
    }

    pub fn on_subreddit(mut self, name: &str, comments: Vec<Comment>) -> Self {
        self.comments.insert(name.to_string(), comments);
        self
    }

    /// Fetching this subreddit fails.
    pub fn failing_subreddit(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Every reply attempt is rate limited.
    pub fn rate_limited(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    pub fn reply_count(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommentSource for MockSource {
    async fn recent_comments(&self, subreddit: &str, limit: u32) -> Result<Vec<Comment>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(subreddit) {
            anyhow::bail!("MockSource: fetch failure for r/{subreddit}");
        }

        Ok(self
            .comments
            .get(subreddit)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn reply(&self, comment: &Comment, text: &str) -> std::result::Result<(), ReplyError> {
        if self.rate_limited {
            return Err(ReplyError::RateLimited(
                "you are doing that too much".to_string(),
            ));
        }
        self.replies
            .lock()
            .unwrap()
            .push((comment.id.clone(), text.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockHost
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockUpload {
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub album_deletehash: String,
}

/// Records albums and uploads. Ids are deterministic: `album0`/`hash0`,
/// `img0`, `img1`, ... in call order.
pub struct MockHost {
    album_counter: AtomicU32,
    upload_counter: AtomicU32,
    fail_uploads_after: Option<usize>,
    pub albums: Mutex<Vec<(String, String)>>,
    pub uploads: Mutex<Vec<MockUpload>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            album_counter: AtomicU32::new(0),
            upload_counter: AtomicU32::new(0),
            fail_uploads_after: None,
            albums: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Uploads beyond the first `n` fail.
    pub fn fail_uploads_after(mut self, n: usize) -> Self {
        self.fail_uploads_after = Some(n);
        self
    }

    pub fn album_count(&self) -> usize {
        self.albums.lock().unwrap().len()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaHost for MockHost {
    async fn create_album(&self, title: &str, description: &str) -> Result<Album> {
        let n = self.album_counter.fetch_add(1, Ordering::SeqCst);
        self.albums
            .lock()
            .unwrap()
            .push((title.to_string(), description.to_string()));
        Ok(Album {
            id: format!("album{n}"),
            deletehash: format!("hash{n}"),
        })
    }

    async fn upload_from_url(
        &self,
        image_url: &str,
        title: &str,
        description: &str,
        album_deletehash: &str,
    ) -> Result<UploadedImage> {
        {
            let uploads = self.uploads.lock().unwrap();
            if let Some(limit) = self.fail_uploads_after {
                if uploads.len() >= limit {
                    anyhow::bail!("MockHost: upload failure after {limit} uploads");
                }
            }
        }

        let n = self.upload_counter.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push(MockUpload {
            image_url: image_url.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            album_deletehash: album_deletehash.to_string(),
        });

        Ok(UploadedImage {
            id: format!("img{n}"),
            link: format!("https://i.example/img{n}.png"),
        })
    }
}

// ---------------------------------------------------------------------------
// MockLedger
// ---------------------------------------------------------------------------

/// Stateful in-memory ledger. Mirrors the Postgres store's semantics:
/// `mark_seen` creates or resets a row, other transitions require one.
pub struct MockLedger {
    records: Mutex<HashMap<CommentKey, SnapshotRecord>>,
    pub queued: Mutex<Vec<(CommentKey, String)>>,
    finds: AtomicU32,
    writes: AtomicU32,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            queued: Mutex::new(Vec::new()),
            finds: AtomicU32::new(0),
            writes: AtomicU32::new(0),
        }
    }

    /// Pre-populate a record, bypassing the write counter.
    pub fn seed(&self, record: SnapshotRecord) {
        self.records.lock().unwrap().insert(record.key(), record);
    }

    pub fn get(&self, key: &CommentKey) -> Option<SnapshotRecord> {
        self.records.lock().unwrap().get(key).cloned()
    }

    pub fn find_count(&self) -> u32 {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    fn update(
        &self,
        key: &CommentKey,
        op: &str,
        f: impl FnOnce(&mut SnapshotRecord),
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        match records.get_mut(key) {
            Some(record) => {
                f(record);
                Ok(())
            }
            None => anyhow::bail!("no ledger row for {key} during {op}"),
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotLedger for MockLedger {
    async fn find(&self, key: &CommentKey) -> Result<Option<SnapshotRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(key))
    }

    async fn mark_seen(
        &self,
        key: &CommentKey,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().insert(
            key.clone(),
            SnapshotRecord {
                submission_id: key.submission_id.clone(),
                comment_id: key.comment_id.clone(),
                author: author.to_string(),
                created_at,
                stage: LedgerStage::Seen,
                snapshot_urls: None,
                album_id: None,
                album_deletehash: None,
                image_links: None,
                reply_text: None,
                reply_completed: None,
            },
        );
        Ok(())
    }

    async fn record_urls(&self, key: &CommentKey, urls: &[String]) -> Result<()> {
        self.update(key, "record_urls", |record| {
            record.snapshot_urls = Some(urls.to_vec());
            record.stage = LedgerStage::Extracted;
        })
    }

    async fn finish_no_urls(&self, key: &CommentKey) -> Result<()> {
        self.update(key, "finish_no_urls", |record| {
            record.reply_completed = Some(true);
            record.stage = LedgerStage::NoUrls;
        })
    }

    async fn record_album(
        &self,
        key: &CommentKey,
        album_id: &str,
        album_deletehash: &str,
    ) -> Result<()> {
        self.update(key, "record_album", |record| {
            record.album_id = Some(album_id.to_string());
            record.album_deletehash = Some(album_deletehash.to_string());
            record.stage = LedgerStage::AlbumCreated;
        })
    }

    async fn record_uploads(&self, key: &CommentKey, image_links: &[String]) -> Result<()> {
        self.update(key, "record_uploads", |record| {
            record.image_links = Some(image_links.to_vec());
            record.stage = LedgerStage::Uploaded;
        })
    }

    async fn record_reply_text(&self, key: &CommentKey, text: &str) -> Result<()> {
        self.update(key, "record_reply_text", |record| {
            record.reply_text = Some(text.to_string());
            record.reply_completed = Some(false);
            record.stage = LedgerStage::ReplyPending;
        })
    }

    async fn finish_replied(&self, key: &CommentKey) -> Result<()> {
        self.update(key, "finish_replied", |record| {
            record.reply_completed = Some(true);
            record.stage = LedgerStage::Done;
        })
    }

    async fn queue_reply(&self, key: &CommentKey, text: &str) -> Result<()> {
        self.queued
            .lock()
            .unwrap()
            .push((key.clone(), text.to_string()));
        Ok(())
    }
}
