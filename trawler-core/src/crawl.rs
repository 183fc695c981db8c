use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::warn;
use trawler_scanner::{CrawlResult, Crawler, ProgressCallback, ScanError};

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub url: String,
    pub threads: usize,
    pub max_depth: usize,
    pub timeout_secs: u64,
    /// Overrides the crawler's default `Trawler/<version>` agent
    pub user_agent: Option<String>,
    pub show_progress_bars: bool,
}

/// How a crawl ended. Every variant still carries a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlStatus {
    Completed,
    /// Stopped by the shutdown signal
    Interrupted,
    /// The worker pool failed; the message says why
    Aborted(String),
}

#[derive(Debug)]
pub struct CrawlRun {
    pub result: CrawlResult,
    pub status: CrawlStatus,
}

/// Run one crawl until it finishes or `shutdown` resolves.
///
/// Only configuration problems (an unusable start URL, a client that cannot
/// be built) are returned as errors. An interrupted or aborted crawl still
/// yields whatever was collected up to that point.
pub async fn execute_crawl<S>(options: CrawlOptions, shutdown: S) -> Result<CrawlRun>
where
    S: Future<Output = ()>,
{
    let CrawlOptions {
        url,
        threads,
        max_depth,
        timeout_secs,
        user_agent,
        show_progress_bars,
    } = options;

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    // Counter for tracking processed URLs
    let processed_count = Arc::new(AtomicUsize::new(0));

    let mut crawler = Crawler::with_timeout(timeout_secs).with_max_depth(max_depth);
    if let Some(user_agent) = user_agent {
        crawler = crawler.with_user_agent(user_agent);
    }
    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let count_clone = processed_count.clone();
        let callback: ProgressCallback = Arc::new(move |_worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!("Crawling... {} URLs processed ({})", count, url));
        });
        crawler = crawler.with_progress_callback(callback);
    }

    let status = tokio::select! {
        finished = crawler.crawl(&url, threads) => match finished {
            Ok(result) => {
                finish_progress(&progress_bar, &processed_count, "Crawl complete!");
                return Ok(CrawlRun { result, status: CrawlStatus::Completed });
            }
            Err(e @ (ScanError::InvalidUrl(_) | ScanError::HttpError(_))) => {
                finish_progress(&progress_bar, &processed_count, "Crawl failed");
                return Err(e).with_context(|| format!("cannot crawl {}", url));
            }
            Err(e) => {
                warn!("Crawl of {} aborted: {}", url, e);
                CrawlStatus::Aborted(e.to_string())
            }
        },
        _ = shutdown => {
            warn!("Crawl of {} interrupted", url);
            CrawlStatus::Interrupted
        }
    };

    finish_progress(&progress_bar, &processed_count, "Crawl stopped early");
    Ok(CrawlRun {
        result: crawler.snapshot().await,
        status,
    })
}

fn finish_progress(progress_bar: &Option<Arc<ProgressBar>>, processed: &AtomicUsize, msg: &str) {
    if let Some(pb) = progress_bar {
        let total = processed.load(Ordering::Relaxed);
        pb.finish_with_message(format!("{} {} URLs processed", msg, total));
    }
}
