//! Processor batch-isolation tests: a failing command or subreddit never
//! aborts the run.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use snapbot::command::Command;
use snapbot::processor::CommentProcessor;
use snapbot::testing::{test_comment, MockSource};
use snapbot_common::Comment;

struct AlwaysFails {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl Command for AlwaysFails {
    fn name(&self) -> &str {
        "AlwaysFails"
    }

    async fn process(&self, _comment: &Comment) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("synthetic failure")
    }
}

struct Recorder {
    tag: &'static str,
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Command for Recorder {
    fn name(&self) -> &str {
        self.tag
    }

    async fn process(&self, comment: &Comment) -> Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.tag, comment.id));
        Ok(())
    }
}

#[tokio::test]
async fn run_survives_failing_commands() {
    let source = Arc::new(
        MockSource::new()
            .on_subreddit(
                "pics",
                vec![test_comment("c1", "first"), test_comment("c2", "second")],
            )
            .on_subreddit("funny", vec![test_comment("c3", "third")]),
    );

    let fail_calls = Arc::new(AtomicU32::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut processor = CommentProcessor::new(
        source.clone(),
        vec!["pics".to_string(), "funny".to_string()],
        50,
    );
    processor.register_command(Box::new(AlwaysFails {
        calls: fail_calls.clone(),
    }));
    processor.register_command(Box::new(Recorder {
        tag: "ok",
        seen: seen.clone(),
    }));

    let stats = processor.run().await;

    // One failure per (comment, command) pair for the failing command; the
    // healthy command still saw every comment.
    assert_eq!(stats.comments_fetched, 3);
    assert_eq!(stats.commands_run, 6);
    assert_eq!(stats.commands_failed, 3);
    assert_eq!(fail_calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["ok:c1", "ok:c2", "ok:c3"]
    );
}

#[tokio::test]
async fn empty_subreddit_list_is_a_noop() {
    let source = Arc::new(MockSource::new());

    let mut processor = CommentProcessor::new(source.clone(), Vec::new(), 50);
    processor.register_command(Box::new(AlwaysFails {
        calls: Arc::new(AtomicU32::new(0)),
    }));

    let stats = processor.run().await;

    assert_eq!(stats.subreddits_scanned, 0);
    assert_eq!(stats.commands_run, 0);
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_failure_skips_only_that_subreddit() {
    let source = Arc::new(
        MockSource::new()
            .failing_subreddit("pics")
            .on_subreddit("funny", vec![test_comment("c1", "hello")]),
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut processor = CommentProcessor::new(
        source,
        vec!["pics".to_string(), "funny".to_string()],
        50,
    );
    processor.register_command(Box::new(Recorder {
        tag: "ok",
        seen: seen.clone(),
    }));

    let stats = processor.run().await;

    assert_eq!(stats.subreddits_failed, 1);
    assert_eq!(stats.subreddits_scanned, 1);
    assert_eq!(seen.lock().unwrap().as_slice(), ["ok:c1"]);
}

#[tokio::test]
async fn commands_execute_in_registration_order_per_comment() {
    let source = Arc::new(MockSource::new().on_subreddit(
        "pics",
        vec![test_comment("c1", "first"), test_comment("c2", "second")],
    ));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut processor = CommentProcessor::new(source, vec!["pics".to_string()], 50);
    processor.register_command(Box::new(Recorder {
        tag: "a",
        seen: seen.clone(),
    }));
    processor.register_command(Box::new(Recorder {
        tag: "b",
        seen: seen.clone(),
    }));

    processor.run().await;

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["a:c1", "b:c1", "a:c2", "b:c2"]
    );
}

#[tokio::test]
async fn comment_limit_caps_the_fetch() {
    let source = Arc::new(MockSource::new().on_subreddit(
        "pics",
        vec![
            test_comment("c1", "one"),
            test_comment("c2", "two"),
            test_comment("c3", "three"),
        ],
    ));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut processor = CommentProcessor::new(source, vec!["pics".to_string()], 2);
    processor.register_command(Box::new(Recorder {
        tag: "ok",
        seen: seen.clone(),
    }));

    let stats = processor.run().await;

    assert_eq!(stats.comments_fetched, 2);
    assert_eq!(seen.lock().unwrap().as_slice(), ["ok:c1", "ok:c2"]);
}
