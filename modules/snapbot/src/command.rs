use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use snapbot_common::Comment;

/// A unit of work run against every scanned comment.
///
/// Implementors decide applicability inside `process`; a non-applicable
/// comment is a silent `Ok`. All effects are external (ledger writes,
/// reply posts) and must be self-contained per command, so one command
/// failing never blocks another.
#[async_trait]
pub trait Command: Send + Sync {
    /// Name used for logging and error attribution.
    fn name(&self) -> &str;

    /// The extension point: do this command's work for one comment.
    async fn process(&self, comment: &Comment) -> Result<()>;

    /// The only entry point the processor calls.
    async fn execute(&self, comment: &Comment) -> Result<()> {
        debug!(
            command = self.name(),
            submission_id = %comment.link_id,
            comment_id = %comment.id,
            "executing"
        );
        self.process(comment).await
    }
}
