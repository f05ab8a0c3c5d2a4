//! The crawler: one account per iteration, fixed sleep between iterations.
//!
//! The account snapshot and cursor belong to a single `Crawler` value and are
//! never shared. When the cursor runs off the end of the snapshot the list is
//! fetched again, so follows and unfollows on the remote side take effect
//! once per full cycle.

use crate::error::{CrawlError, Result};
use crate::handoff::HandoffSender;
use facebot_core::{Account, ApiSession, MediaApi, MediaItem};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Sleep between crawl iterations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Polls remote accounts round-robin and emits their recent media.
pub struct Crawler {
    api: Arc<dyn MediaApi>,
    out: HandoffSender<MediaItem>,
    interval: Duration,
    accounts: Vec<Account>,
    cursor: usize,
}

impl Crawler {
    /// Create a crawler that emits onto `out`.
    #[must_use]
    pub fn new(api: Arc<dyn MediaApi>, out: HandoffSender<MediaItem>) -> Self {
        Self {
            api,
            out,
            interval: DEFAULT_INTERVAL,
            accounts: Vec::new(),
            cursor: 0,
        }
    }

    /// Set the sleep between iterations.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Return the account at the cursor and advance it.
    ///
    /// The account list is refetched whenever the cursor has reached the end
    /// of the snapshot, including when the snapshot is empty.
    ///
    /// # Errors
    /// `NoAccounts` if the refreshed list is empty; `Remote` if listing fails.
    pub async fn next_account(&mut self, session: &dyn ApiSession) -> Result<Account> {
        if self.cursor >= self.accounts.len() {
            self.accounts = session.list_accounts().await?;
            self.cursor = 0;
            debug!("Refreshed account snapshot: {} accounts", self.accounts.len());
        }

        let account = self
            .accounts
            .get(self.cursor)
            .cloned()
            .ok_or(CrawlError::NoAccounts)?;
        self.cursor += 1;
        Ok(account)
    }

    /// Run one crawl iteration and return the number of items emitted.
    ///
    /// The session is closed before emission starts, on success and on
    /// failure alike; emission can block for as long as the consumer takes.
    pub async fn crawl_once(&mut self) -> Result<usize> {
        let session = self.api.open_session().await?;
        let discovered = self.discover(session.as_ref()).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close crawl session: {}", e);
        }
        let (account, media) = discovered?;

        info!("Crawled @{}: {} recent items", account.username, media.len());

        let count = media.len();
        for item in media {
            self.out
                .send(item)
                .await
                .map_err(|_| CrawlError::ConsumerGone)?;
        }
        Ok(count)
    }

    async fn discover(&mut self, session: &dyn ApiSession) -> Result<(Account, Vec<MediaItem>)> {
        let account = self.next_account(session).await?;
        let media = session.list_recent_media(&account).await?;
        Ok((account, media))
    }

    /// Crawl forever, sleeping the fixed interval after every iteration.
    ///
    /// Failed iterations are logged and not retried. Returns only if the
    /// consumer has gone away.
    pub async fn run(mut self) {
        info!("Crawler started (interval {:?})", self.interval);
        loop {
            match self.crawl_once().await {
                Ok(count) => debug!("Crawl iteration emitted {} items", count),
                Err(CrawlError::ConsumerGone) => {
                    warn!("Discovery consumer gone; crawler stopping");
                    return;
                }
                Err(e) => error!("Crawl iteration failed: {}", e),
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run the crawler as a background task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
