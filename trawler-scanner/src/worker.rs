use crate::classify::{
    classify, extract_document_links, extract_emails, extract_endpoints, is_document_link,
};
use crate::error::{Result, ScanError};
use crate::extract::{ParsedPage, parse_html};
use crate::frontier::{Frontier, Scope, resolve_url};
use crate::result::{Category, CrawlResult, CrawlTarget, TargetKind};
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Everything a worker learned from one target
#[derive(Debug, Default)]
pub struct WorkOutcome {
    pub new_targets: Vec<CrawlTarget>,
    pub facts: CrawlResult,
}

/// A successful GET
#[derive(Debug)]
pub struct Fetched {
    /// Final URL after redirects
    pub url: Url,
    pub status_code: u16,
    pub body: String,
}

/// Fetches one target, extracts its facts and claims its children.
///
/// All per-node failures stay in here: a target that cannot be fetched or
/// parsed produces an empty outcome and a log line, never an error.
pub struct Worker {
    client: Client,
    scope: Scope,
    max_depth: usize,
    frontier: Arc<Frontier>,
}

impl Worker {
    pub fn new(client: Client, scope: Scope, max_depth: usize, frontier: Arc<Frontier>) -> Self {
        Self {
            client,
            scope,
            max_depth,
            frontier,
        }
    }

    pub fn is_eligible(&self, target: &CrawlTarget) -> bool {
        target.depth <= self.max_depth
    }

    pub async fn process(&self, target: &CrawlTarget) -> WorkOutcome {
        if !self.is_eligible(target) {
            debug!(
                "Skipping {} at depth {} (max {})",
                target.url, target.depth, self.max_depth
            );
            return WorkOutcome::default();
        }

        let fetched = match self.fetch(&target.url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Skipping {}: {}", target.url, e);
                return WorkOutcome::default();
            }
        };

        if fetched.body.trim().is_empty() {
            warn!(
                "Empty body from {} (status {}), nothing to classify",
                fetched.url, fetched.status_code
            );
            return WorkOutcome::default();
        }

        match target.kind {
            // parsed whatever the declared content type
            TargetKind::Page => self.process_page(target, &fetched).await,
            TargetKind::Script => WorkOutcome {
                new_targets: Vec::new(),
                facts: self.process_script(&fetched.body),
            },
        }
    }

    async fn fetch(&self, url: &str) -> Result<Fetched> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status_code = response.status().as_u16();

        if !response.status().is_success() {
            return Err(ScanError::UnexpectedStatus {
                url: url.to_string(),
                status: status_code,
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let body = response.text().await?;

        debug!(
            "Fetched {} ({} bytes, {}) in {:?}",
            final_url,
            body.len(),
            content_type,
            start.elapsed()
        );

        Ok(Fetched {
            url: final_url,
            status_code,
            body,
        })
    }

    /// Emails and secrets over the raw body
    fn scan_text(&self, body: &str) -> CrawlResult {
        let mut facts = CrawlResult::new();
        facts.extend(Category::Email, extract_emails(body));
        facts.extend_secrets(classify(body));
        facts
    }

    async fn process_page(&self, target: &CrawlTarget, fetched: &Fetched) -> WorkOutcome {
        let parsed = match parse_html(&fetched.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Could not parse {}: {}", fetched.url, e);
                ParsedPage::default()
            }
        };

        let base = parsed
            .base_href
            .as_deref()
            .and_then(|href| fetched.url.join(href).ok())
            .unwrap_or_else(|| fetched.url.clone());

        let mut facts = self.scan_text(&fetched.body);
        let mut new_targets = Vec::new();

        facts.extend(Category::Comment, parsed.comments);

        for src in &parsed.images {
            if let Some(image) = resolve_url(&base, src) {
                facts.insert(Category::Image, image.as_str());
            }
        }

        for href in &parsed.anchors {
            let Some(link) = resolve_url(&base, href) else {
                continue;
            };

            if !self.scope.contains(&link) {
                debug!("  -> {} is out of scope", link);
                facts.insert(Category::ExternalLink, link.as_str());
            } else if is_document_link(link.as_str()) {
                facts.insert(Category::Document, link.as_str());
            } else {
                facts.insert(Category::Link, link.as_str());

                // past the bound a link is recorded but never claimed
                let depth = target.depth + 1;
                if depth <= self.max_depth
                    && self
                        .frontier
                        .try_claim(link.as_str(), TargetKind::Page, depth)
                        .await
                {
                    new_targets.push(CrawlTarget::page(link.as_str(), depth));
                }
            }
        }

        for src in &parsed.scripts {
            let Some(script) = resolve_url(&base, src) else {
                continue;
            };

            facts.insert(Category::JsFile, script.as_str());
            if self
                .frontier
                .try_claim(script.as_str(), TargetKind::Script, target.depth)
                .await
            {
                // scripts are leaves, they inherit the page's depth
                new_targets.push(CrawlTarget::script(script.as_str(), target.depth));
            }
        }

        debug!(
            "{}: {} new targets, {} comments, {} images",
            fetched.url,
            new_targets.len(),
            facts.comments.len(),
            facts.images.len()
        );

        WorkOutcome { new_targets, facts }
    }

    fn process_script(&self, body: &str) -> CrawlResult {
        let mut facts = CrawlResult::new();
        let endpoints = extract_endpoints(body);

        for raw in endpoints.urls {
            let Ok(url) = Url::parse(&raw) else {
                continue;
            };
            if !self.scope.contains(&url) {
                facts.insert(Category::ExternalLink, raw);
            } else if !is_document_link(&raw) {
                facts.insert(Category::Link, raw);
            }
        }

        for doc in extract_document_links(body) {
            match Url::parse(&doc) {
                Ok(url) if self.scope.contains(&url) => {
                    facts.insert(Category::Document, doc);
                }
                _ => {
                    facts.insert(Category::ExternalLink, doc);
                }
            }
        }

        facts.extend(Category::PossibleEndpoint, endpoints.paths);
        facts.extend_secrets(classify(body));
        facts
    }
}
