use crate::result::CrawlResult;
use tokio::sync::Mutex;

/// The single sink every worker's facts are merged into.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<CrawlResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn merge(&self, facts: CrawlResult) {
        if facts.is_empty() {
            return;
        }
        self.inner.lock().await.merge(facts);
    }

    /// Copy of everything gathered so far. Safe to call mid-crawl.
    pub async fn snapshot(&self) -> CrawlResult {
        self.inner.lock().await.clone()
    }
}
