use chrono::{DateTime, Utc};

// --- Comments ---

/// A single comment as seen by the processor. Read-only to the core;
/// all processing state lives in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Bare comment id (no `t1_` prefix), e.g. `c0b7e4z`.
    pub id: String,
    /// Fullname of the parent submission, e.g. `t3_92dd8`.
    pub link_id: String,
    /// Author username. `None` for deleted accounts.
    pub author: Option<String>,
    pub body: String,
    pub created_utc: DateTime<Utc>,
    /// Site-relative permalink, e.g. `/r/pics/comments/92dd8/_/c0b7e4z/`.
    pub permalink: String,
    pub subreddit: String,
}

impl Comment {
    /// Composite ledger key for this comment.
    pub fn key(&self) -> CommentKey {
        CommentKey {
            submission_id: self.link_id.clone(),
            comment_id: self.id.clone(),
        }
    }

    /// Fullname used when replying (`t1_<id>`).
    pub fn fullname(&self) -> String {
        format!("t1_{}", self.id)
    }
}

// --- Ledger key ---

/// Composite ledger key. A comment id is only guaranteed unique within its
/// submission, so the pair is what the ledger indexes on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentKey {
    pub submission_id: String,
    pub comment_id: String,
}

impl std::fmt::Display for CommentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.submission_id, self.comment_id)
    }
}
