use crate::aggregate::ResultStore;
use crate::error::{Result, ScanError};
use crate::frontier::{Frontier, Scope, normalize_url};
use crate::result::{Category, CrawlResult, CrawlTarget, TargetKind};
use crate::worker::Worker;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tracing::{debug, info};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

const DEFAULT_USER_AGENT: &str = concat!("Trawler/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Shared work queue for the worker pool.
///
/// `pending` counts queued plus in-flight targets. Children are pushed before
/// their parent is marked complete, so it only reaches zero once the whole
/// reachable graph has been processed.
struct WorkQueue {
    items: Mutex<VecDeque<CrawlTarget>>,
    pending: AtomicUsize,
    notify: Notify,
}

impl WorkQueue {
    fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            pending: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    async fn push(&self, targets: Vec<CrawlTarget>) {
        if targets.is_empty() {
            return;
        }
        self.pending.fetch_add(targets.len(), Ordering::SeqCst);
        self.items.lock().await.extend(targets);
        self.notify.notify_waiters();
    }

    /// Next target, or `None` once nothing is queued or in flight.
    async fn next(&self) -> Option<CrawlTarget> {
        loop {
            // Register before checking so a push between the check and the
            // await still wakes us.
            let mut notified = std::pin::pin!(self.notify.notified());
            notified.as_mut().enable();

            if let Some(target) = self.items.lock().await.pop_front() {
                return Some(target);
            }
            if self.pending.load(Ordering::SeqCst) == 0 {
                return None;
            }

            notified.await;
        }
    }

    fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}

/// Depth-bounded crawler over a pool of workers.
///
/// Each call to [`Crawler::crawl`] starts from an empty frontier and result
/// store; the store of the latest crawl stays reachable through
/// [`Crawler::snapshot`].
pub struct Crawler {
    results: Mutex<Arc<ResultStore>>,
    max_depth: usize,
    timeout: Duration,
    user_agent: String,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(Arc::new(ResultStore::new())),
            max_depth: 3,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            progress_callback: None,
        }
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self::new().with_request_timeout(Duration::from_secs(timeout_secs))
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn build_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .connect_timeout(self.timeout / 2)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .http2_adaptive_window(true)
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(client)
    }

    /// Crawl everything reachable from `start_url` within the depth bound.
    ///
    /// The crawler keeps a handle on this crawl's result store, so if this
    /// future is dropped part way (e.g. on Ctrl-C) whatever was gathered is
    /// still available from [`Crawler::snapshot`]. Dropping the future also
    /// aborts every pool task.
    pub async fn crawl(&self, start_url: &str, workers: usize) -> Result<CrawlResult> {
        info!(
            "Starting crawl of {} with {} workers (max depth {})",
            start_url, workers, self.max_depth
        );

        let parsed = Url::parse(start_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", start_url, e)))?;
        let start = normalize_url(parsed).ok_or_else(|| {
            ScanError::InvalidUrl(format!("{} is not an http(s) URL with a host", start_url))
        })?;
        let scope = Scope::new(start.host_str().unwrap_or_default());

        let client = self.build_client()?;
        let frontier = Arc::new(Frontier::new());
        let store = Arc::new(ResultStore::new());
        *self.results.lock().await = store.clone();

        let worker = Arc::new(Worker::new(
            client,
            scope,
            self.max_depth,
            frontier.clone(),
        ));
        let queue = Arc::new(WorkQueue::new());

        // The start page is the first link on record
        frontier.try_claim(start.as_str(), TargetKind::Page, 0).await;
        let mut facts = CrawlResult::new();
        facts.insert(Category::Link, start.as_str());
        store.merge(facts).await;
        queue.push(vec![CrawlTarget::page(start.as_str(), 0)]).await;

        let mut pool = JoinSet::new();
        for worker_id in 0..workers.max(1) {
            let worker = worker.clone();
            let queue = queue.clone();
            let results = store.clone();
            let progress_cb = self.progress_callback.clone();

            pool.spawn(async move {
                debug!("Worker {} started", worker_id);

                while let Some(target) = queue.next().await {
                    if worker.is_eligible(&target)
                        && let Some(ref callback) = progress_cb
                    {
                        callback(worker_id, target.url.clone());
                    }

                    let outcome = worker.process(&target).await;
                    results.merge(outcome.facts).await;
                    queue.push(outcome.new_targets).await;
                    queue.complete();
                }

                debug!("Worker {} finished", worker_id);
            });
        }

        while let Some(joined) = pool.join_next().await {
            joined?;
        }

        let results = store.snapshot().await;
        info!(
            "Crawl complete. {} pages claimed, {} scripts claimed",
            frontier.seen_count(TargetKind::Page).await,
            frontier.seen_count(TargetKind::Script).await
        );
        Ok(results)
    }

    /// Everything gathered so far, including from an interrupted crawl.
    pub async fn snapshot(&self) -> CrawlResult {
        let store = self.results.lock().await.clone();
        store.snapshot().await
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}
