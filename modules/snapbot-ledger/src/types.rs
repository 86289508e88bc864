use chrono::{DateTime, Utc};
use snapbot_common::CommentKey;

/// Explicit processing stage, persisted as text. Replaces the implicit
/// which-fields-are-null state machine: every transition names the stage
/// it lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStage {
    /// Comment observed, nothing computed yet.
    Seen,
    /// URL extraction finished (list may be empty).
    Extracted,
    /// Terminal: extraction found nothing to do.
    NoUrls,
    /// Destination album exists on the image host.
    AlbumCreated,
    /// All captures uploaded, links recorded.
    Uploaded,
    /// Reply text persisted but not yet posted (or the post was rate
    /// limited). A future poll resumes from here without redoing uploads.
    ReplyPending,
    /// Terminal: reply posted.
    Done,
}

impl LedgerStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStage::Seen => "seen",
            LedgerStage::Extracted => "extracted",
            LedgerStage::NoUrls => "no_urls",
            LedgerStage::AlbumCreated => "album_created",
            LedgerStage::Uploaded => "uploaded",
            LedgerStage::ReplyPending => "reply_pending",
            LedgerStage::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "seen" => Some(LedgerStage::Seen),
            "extracted" => Some(LedgerStage::Extracted),
            "no_urls" => Some(LedgerStage::NoUrls),
            "album_created" => Some(LedgerStage::AlbumCreated),
            "uploaded" => Some(LedgerStage::Uploaded),
            "reply_pending" => Some(LedgerStage::ReplyPending),
            "done" => Some(LedgerStage::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for LedgerStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    pub submission_id: String,
    pub comment_id: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub stage: LedgerStage,
    pub snapshot_urls: Option<Vec<String>>,
    pub album_id: Option<String>,
    pub album_deletehash: Option<String>,
    pub image_links: Option<Vec<String>>,
    pub reply_text: Option<String>,
    pub reply_completed: Option<bool>,
}

impl SnapshotRecord {
    pub fn key(&self) -> CommentKey {
        CommentKey {
            submission_id: self.submission_id.clone(),
            comment_id: self.comment_id.clone(),
        }
    }

    /// Terminal rows must never be reprocessed. This is the idempotency
    /// gate the whole bot leans on.
    pub fn is_terminal(&self) -> bool {
        self.reply_completed == Some(true)
    }
}
