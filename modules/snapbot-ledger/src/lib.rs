//! Processing ledger backed by Postgres.
//!
//! One row per `(submission_id, comment_id)`, progressively widened as each
//! processing stage completes. A row with `reply_completed = true` is
//! terminal and gates reprocessing on every future poll.

pub mod store;
pub mod types;

pub use store::Ledger;
pub use types::{LedgerStage, SnapshotRecord};
