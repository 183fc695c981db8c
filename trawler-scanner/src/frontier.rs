use crate::result::TargetKind;
use std::collections::HashMap;
use tokio::sync::Mutex;
use url::Url;

/// Claimed URLs for pages and scripts, with the shallowest depth each was
/// claimed at.
///
/// A claim is never released. A page can be claimed again only from a
/// strictly shallower depth, so it is always expanded from its shortest
/// path; scripts are leaves and are claimed once.
#[derive(Debug, Default)]
pub struct Frontier {
    pages: Mutex<HashMap<String, usize>>,
    scripts: Mutex<HashMap<String, usize>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `url` for processing at `depth`.
    pub async fn try_claim(&self, url: &str, kind: TargetKind, depth: usize) -> bool {
        let mut claims = match kind {
            TargetKind::Page => self.pages.lock().await,
            TargetKind::Script => self.scripts.lock().await,
        };

        if let Some(best) = claims.get_mut(url) {
            if kind == TargetKind::Page && depth < *best {
                *best = depth;
                return true;
            }
            return false;
        }

        claims.insert(url.to_string(), depth);
        true
    }

    pub async fn seen_count(&self, kind: TargetKind) -> usize {
        match kind {
            TargetKind::Page => self.pages.lock().await.len(),
            TargetKind::Script => self.scripts.lock().await.len(),
        }
    }
}

/// Resolve a reference found on a page into a normalized absolute URL.
///
/// Only http(s) targets survive. Query and fragment are dropped, so the
/// result is scheme, host, port and path.
pub fn resolve_url(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    // Skip empty, javascript:, mailto:, tel:, data: and in-page anchors
    if reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with("javascript:")
        || reference.starts_with("mailto:")
        || reference.starts_with("tel:")
        || reference.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(reference).ok()?;
    normalize_url(resolved)
}

pub fn normalize_url(mut url: Url) -> Option<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

/// The domain a crawl is contained to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    domain: String,
}

impl Scope {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_lowercase(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Same host or a subdomain of it. Ports are ignored.
    pub fn contains(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                host == self.domain || host.ends_with(&format!(".{}", self.domain))
            }
            None => false,
        }
    }
}
