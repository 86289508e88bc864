//! Snapshot command behavior over mock boundaries: applicability, the
//! idempotency gate, the no-URL short-circuit, positional reply
//! composition, failure propagation, and the rate-limit resume path.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use snapbot::command::Command;
use snapbot::snapshot::SnapshotCommand;
use snapbot::testing::{test_comment, test_comment_by, MockHost, MockLedger, MockSource};
use snapbot_common::CommentKey;
use snapbot_ledger::{LedgerStage, SnapshotRecord};
use snapito_client::SnapitoClient;

struct Harness {
    source: Arc<MockSource>,
    host: Arc<MockHost>,
    ledger: Arc<MockLedger>,
    command: SnapshotCommand,
}

fn harness() -> Harness {
    harness_with(MockSource::new(), MockHost::new())
}

fn harness_with(source: MockSource, host: MockHost) -> Harness {
    let source = Arc::new(source);
    let host = Arc::new(host);
    let ledger = Arc::new(MockLedger::new());
    let snapito = SnapitoClient::new("http://api.snapito.test", "testkey");

    let command = SnapshotCommand::new(
        "snapshot_bot",
        snapito,
        host.clone(),
        ledger.clone(),
        source.clone(),
    );

    Harness {
        source,
        host,
        ledger,
        command,
    }
}

fn terminal_record(key: &CommentKey) -> SnapshotRecord {
    SnapshotRecord {
        submission_id: key.submission_id.clone(),
        comment_id: key.comment_id.clone(),
        author: "someone".to_string(),
        created_at: Utc.with_ymd_and_hms(2013, 5, 31, 12, 0, 0).unwrap(),
        stage: LedgerStage::Done,
        snapshot_urls: Some(vec!["http://example.com".to_string()]),
        album_id: Some("album9".to_string()),
        album_deletehash: Some("hash9".to_string()),
        image_links: Some(vec!["https://i.example/img9.png".to_string()]),
        reply_text: Some("earlier reply".to_string()),
        reply_completed: Some(true),
    }
}

// ---------------------------------------------------------------------------
// Applicability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comment_without_trigger_touches_nothing() {
    let h = harness();
    let comment = test_comment("c1", "just a link http://example.com");

    h.command.process(&comment).await.unwrap();

    assert_eq!(h.ledger.find_count(), 0);
    assert_eq!(h.ledger.write_count(), 0);
    assert_eq!(h.host.album_count(), 0);
    assert_eq!(h.host.upload_count(), 0);
    assert_eq!(h.source.reply_count(), 0);
}

#[tokio::test]
async fn bots_own_comments_are_skipped() {
    let h = harness();
    let comment = test_comment_by(
        Some("snapshot_bot"),
        "c1",
        "/u/snapshot_bot http://example.com",
    );

    h.command.process(&comment).await.unwrap();

    assert_eq!(h.ledger.find_count(), 0);
    assert_eq!(h.ledger.write_count(), 0);
}

#[tokio::test]
async fn deleted_authors_are_skipped() {
    let h = harness();
    let comment = test_comment_by(None, "c1", "/u/snapshot_bot http://example.com");

    h.command.process(&comment).await.unwrap();

    assert_eq!(h.ledger.find_count(), 0);
    assert_eq!(h.ledger.write_count(), 0);
}

// ---------------------------------------------------------------------------
// Idempotency gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn terminal_record_blocks_all_external_calls() {
    let h = harness();
    let comment = test_comment("c1", "/u/snapshot_bot http://example.com");
    h.ledger.seed(terminal_record(&comment.key()));

    h.command.process(&comment).await.unwrap();

    assert_eq!(h.ledger.find_count(), 1);
    assert_eq!(h.ledger.write_count(), 0);
    assert_eq!(h.host.album_count(), 0);
    assert_eq!(h.host.upload_count(), 0);
    assert_eq!(h.source.reply_count(), 0);
}

#[tokio::test]
async fn terminal_record_is_unchanged_by_reprocessing() {
    let h = harness();
    let comment = test_comment("c1", "/u/snapshot_bot http://example.com");
    let before = terminal_record(&comment.key());
    h.ledger.seed(before.clone());

    h.command.process(&comment).await.unwrap();
    h.command.process(&comment).await.unwrap();

    assert_eq!(h.ledger.get(&comment.key()), Some(before));
}

// ---------------------------------------------------------------------------
// No-URL short-circuit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trigger_without_urls_is_terminal_with_empty_list() {
    let h = harness();
    let comment = test_comment("c1", "hey /u/snapshot_bot nothing to see");

    h.command.process(&comment).await.unwrap();

    let record = h.ledger.get(&comment.key()).unwrap();
    assert_eq!(record.stage, LedgerStage::NoUrls);
    assert!(record.is_terminal());
    assert_eq!(record.snapshot_urls.as_deref(), Some(&[][..]));
    assert_eq!(h.host.album_count(), 0);
    assert_eq!(h.host.upload_count(), 0);
    assert_eq!(h.source.reply_count(), 0);
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_url_end_to_end() {
    let h = harness();
    let comment = test_comment("c1", "check this out /u/snapshot_bot http://example.com");

    h.command.process(&comment).await.unwrap();

    // Ledger reached the terminal stage with every field widened.
    let record = h.ledger.get(&comment.key()).unwrap();
    assert_eq!(record.stage, LedgerStage::Done);
    assert!(record.is_terminal());
    assert_eq!(
        record.snapshot_urls.as_deref(),
        Some(&["http://example.com".to_string()][..])
    );
    assert_eq!(record.album_id.as_deref(), Some("album0"));
    assert_eq!(
        record.image_links.as_deref(),
        Some(&["https://i.example/img0.png".to_string()][..])
    );

    // One album, one upload, and the upload targeted the capture URL
    // inside the created album.
    assert_eq!(h.host.album_count(), 1);
    let uploads = h.host.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        uploads[0].image_url,
        "http://api.snapito.test/web/testkey/full/http://example.com?type=png"
    );
    assert_eq!(uploads[0].album_deletehash, "hash0");
    assert!(uploads[0].description.contains("someone"));
    assert!(uploads[0].description.contains("http://example.com"));

    // The posted reply carries the bullet and the album link.
    let replies = h.source.replies.lock().unwrap().clone();
    assert_eq!(replies.len(), 1);
    let (reply_to, text) = &replies[0];
    assert_eq!(reply_to, "c1");
    assert!(text.contains("* http://example.com - [[snapshot](https://i.example/img0.png)]"));
    assert!(text.contains("* [Snapshot Album](https://imgur.com/a/album0)"));
    assert_eq!(record.reply_text.as_deref(), Some(text.as_str()));
}

#[tokio::test]
async fn uploads_and_bullets_preserve_extraction_order() {
    let h = harness();
    let comment = test_comment(
        "c1",
        "/u/snapshot_bot see http://example.com and http://example.org",
    );

    h.command.process(&comment).await.unwrap();

    let uploads = h.host.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 2);
    assert!(uploads[0].image_url.contains("http://example.com"));
    assert!(uploads[1].image_url.contains("http://example.org"));

    let replies = h.source.replies.lock().unwrap().clone();
    let text = &replies[0].1;
    let first = text
        .find("* http://example.com - [[snapshot](https://i.example/img0.png)]")
        .expect("first bullet");
    let second = text
        .find("* http://example.org - [[snapshot](https://i.example/img1.png)]")
        .expect("second bullet");
    assert!(first < second);
}

// ---------------------------------------------------------------------------
// Failure propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_failure_aborts_and_leaves_orphans() {
    let h = harness_with(MockSource::new(), MockHost::new().fail_uploads_after(1));
    let comment = test_comment(
        "c1",
        "/u/snapshot_bot http://example.com and http://example.org",
    );

    let err = h.command.process(&comment).await.unwrap_err();
    assert!(err.to_string().contains("http://example.org"));

    // The first upload stays orphaned in the album; no reply, no terminal
    // marker, so the next poll reprocesses from scratch.
    assert_eq!(h.host.upload_count(), 1);
    assert_eq!(h.source.reply_count(), 0);
    let record = h.ledger.get(&comment.key()).unwrap();
    assert_eq!(record.stage, LedgerStage::AlbumCreated);
    assert!(!record.is_terminal());
    assert!(record.image_links.is_none());
}

// ---------------------------------------------------------------------------
// Rate-limit + resume
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_reply_queues_and_stays_pending() {
    let h = harness_with(MockSource::new().rate_limited(), MockHost::new());
    let comment = test_comment("c1", "/u/snapshot_bot http://example.com");

    h.command.process(&comment).await.unwrap();

    let record = h.ledger.get(&comment.key()).unwrap();
    assert_eq!(record.stage, LedgerStage::ReplyPending);
    assert_eq!(record.reply_completed, Some(false));
    assert!(!record.is_terminal());
    assert!(record.reply_text.is_some());

    let queued = h.ledger.queued.lock().unwrap().clone();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].1, record.reply_text.clone().unwrap());
}

#[tokio::test]
async fn pending_reply_resumes_without_redoing_uploads() {
    let h = harness();
    let comment = test_comment("c1", "/u/snapshot_bot http://example.com");

    let mut pending = terminal_record(&comment.key());
    pending.stage = LedgerStage::ReplyPending;
    pending.reply_completed = Some(false);
    pending.reply_text = Some("persisted reply text".to_string());
    h.ledger.seed(pending);

    h.command.process(&comment).await.unwrap();

    // No second album, no re-upload, straight to the post.
    assert_eq!(h.host.album_count(), 0);
    assert_eq!(h.host.upload_count(), 0);

    let replies = h.source.replies.lock().unwrap().clone();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].1, "persisted reply text");

    let record = h.ledger.get(&comment.key()).unwrap();
    assert_eq!(record.stage, LedgerStage::Done);
    assert!(record.is_terminal());
}

#[tokio::test]
async fn pending_reply_without_text_is_recomposed_from_the_ledger() {
    let h = harness();
    let comment = test_comment("c1", "/u/snapshot_bot http://example.com");

    let mut pending = terminal_record(&comment.key());
    pending.stage = LedgerStage::ReplyPending;
    pending.reply_completed = Some(false);
    pending.reply_text = None;
    h.ledger.seed(pending);

    h.command.process(&comment).await.unwrap();

    assert_eq!(h.host.upload_count(), 0);
    let replies = h.source.replies.lock().unwrap().clone();
    assert_eq!(replies.len(), 1);
    let text = &replies[0].1;
    assert!(text.contains("* http://example.com - [[snapshot](https://i.example/img9.png)]"));
    assert!(text.contains("* [Snapshot Album](https://imgur.com/a/album9)"));
}
