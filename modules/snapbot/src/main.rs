use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use imgur_client::ImgurClient;
use reddit_client::RedditClient;
use snapbot::processor::CommentProcessor;
use snapbot::snapshot::SnapshotCommand;
use snapbot::traits::{CommentSource, MediaHost, SnapshotLedger};
use snapbot_common::Config;
use snapbot_ledger::Ledger;
use snapito_client::SnapitoClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("snapbot=info".parse()?))
        .init();

    info!("snapbot starting...");

    // Load config
    let config = Config::from_env()?;

    // Connect to Postgres and run migrations. An unavailable ledger is fatal.
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    let ledger = Ledger::new(pool);
    ledger.migrate().await?;

    // Log into Reddit
    let reddit = Arc::new(
        RedditClient::login(
            &config.reddit_client_id,
            &config.reddit_client_secret,
            &config.reddit_username,
            &config.reddit_password,
            &config.user_agent,
        )
        .await?,
    );

    let snapito = SnapitoClient::new(&config.snapito_base_url, &config.snapito_api_key);
    let imgur: Arc<dyn MediaHost> = Arc::new(ImgurClient::new(&config.imgur_client_id));
    let ledger: Arc<dyn SnapshotLedger> = Arc::new(ledger);
    let source: Arc<dyn CommentSource> = reddit;

    let mut processor = CommentProcessor::new(
        source.clone(),
        config.subreddits.clone(),
        config.comment_limit,
    );
    processor.register_command(Box::new(SnapshotCommand::new(
        &config.reddit_username,
        snapito,
        imgur,
        ledger,
        source,
    )));

    // Poll until the timeout elapses, sleeping between runs.
    let deadline = Instant::now() + Duration::from_secs(config.loop_timeout_secs);
    loop {
        let stats = processor.run().await;
        info!("Run complete. {stats}");

        if Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(Duration::from_secs(config.loop_sleep_secs)).await;
    }

    info!("Done looping");
    Ok(())
}
