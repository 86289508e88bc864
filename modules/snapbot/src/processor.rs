//! Comment processor: scans recent comments per subreddit and runs every
//! registered command over each one. Failures are isolated per
//! (comment, command) pair; a run always completes.

use std::sync::Arc;

use tracing::{error, info};

use snapbot_common::Comment;

use crate::command::Command;
use crate::traits::CommentSource;

pub struct CommentProcessor {
    source: Arc<dyn CommentSource>,
    subreddits: Vec<String>,
    comment_limit: u32,
    commands: Vec<Box<dyn Command>>,
}

/// Counters for one `run()`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub subreddits_scanned: u32,
    pub subreddits_failed: u32,
    pub comments_fetched: u32,
    pub commands_run: u32,
    pub commands_failed: u32,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "subreddits: {} scanned, {} failed; comments: {}; commands: {} run, {} failed",
            self.subreddits_scanned,
            self.subreddits_failed,
            self.comments_fetched,
            self.commands_run,
            self.commands_failed
        )
    }
}

impl CommentProcessor {
    pub fn new(source: Arc<dyn CommentSource>, subreddits: Vec<String>, comment_limit: u32) -> Self {
        Self {
            source,
            subreddits,
            comment_limit,
            commands: Vec::new(),
        }
    }

    /// Register a command to execute per comment. Registration order is
    /// execution order.
    pub fn register_command(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    /// Process the latest comments for every configured subreddit.
    ///
    /// Never fails: a fetch error skips that subreddit, a command error
    /// skips that (comment, command) pair, and both are logged. Safe to
    /// call on a timer; overlapping comment windows across runs are
    /// expected and handled by each command's idempotency gate.
    pub async fn run(&self) -> RunStats {
        let mut stats = RunStats::default();
        info!("Executing run");

        for subreddit in &self.subreddits {
            info!(subreddit = %subreddit, "Processing subreddit");

            let comments = match self
                .source
                .recent_comments(subreddit, self.comment_limit)
                .await
            {
                Ok(comments) => comments,
                Err(err) => {
                    let chain = format!("{err:#}");
                    error!(subreddit = %subreddit, error = %chain, "Failed to fetch comments, skipping subreddit");
                    stats.subreddits_failed += 1;
                    continue;
                }
            };

            stats.subreddits_scanned += 1;
            stats.comments_fetched += comments.len() as u32;

            self.process_comments(subreddit, &comments, &mut stats).await;
        }

        info!("Completed run");
        stats
    }

    async fn process_comments(&self, subreddit: &str, comments: &[Comment], stats: &mut RunStats) {
        for comment in comments {
            for command in &self.commands {
                stats.commands_run += 1;
                if let Err(err) = command.execute(comment).await {
                    stats.commands_failed += 1;
                    let chain = format!("{err:#}");
                    error!(
                        command = command.name(),
                        subreddit,
                        submission_id = %comment.link_id,
                        comment_id = %comment.id,
                        error = %chain,
                        "Command failed, continuing batch"
                    );
                }
            }
        }
    }
}
