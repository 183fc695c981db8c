use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What a URL was discovered as. Pages and scripts are deduplicated
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Page,
    Script,
}

/// One unit of traversal work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: String,
    pub depth: usize,
    pub kind: TargetKind,
}

impl CrawlTarget {
    pub fn page(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
            kind: TargetKind::Page,
        }
    }

    pub fn script(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
            kind: TargetKind::Script,
        }
    }
}

/// Structural (non-secret) finding categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Email,
    Link,
    Comment,
    ExternalLink,
    JsFile,
    PossibleEndpoint,
    Image,
    Document,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Email,
        Category::Link,
        Category::Comment,
        Category::ExternalLink,
        Category::JsFile,
        Category::PossibleEndpoint,
        Category::Image,
        Category::Document,
    ];

    /// Key used for this category in the output file
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Email => "emails",
            Category::Link => "links",
            Category::Comment => "comments",
            Category::ExternalLink => "external_link",
            Category::JsFile => "js_files",
            Category::PossibleEndpoint => "possible_endpoints",
            Category::Image => "images",
            Category::Document => "documents",
        }
    }
}

/// Deduplicated, categorized snapshot of everything a crawl discovered.
///
/// Workers fill a private instance per target; the aggregator unions them.
/// Ordered sets keep two snapshots with the same content equal no matter
/// which order the workers finished in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub emails: BTreeSet<String>,
    pub links: BTreeSet<String>,
    pub comments: BTreeSet<String>,
    pub external_link: BTreeSet<String>,
    pub js_files: BTreeSet<String>,
    pub possible_endpoints: BTreeSet<String>,
    pub images: BTreeSet<String>,
    pub sensitive_data: BTreeMap<String, BTreeSet<String>>,
    pub documents: BTreeSet<String>,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Email => &self.emails,
            Category::Link => &self.links,
            Category::Comment => &self.comments,
            Category::ExternalLink => &self.external_link,
            Category::JsFile => &self.js_files,
            Category::PossibleEndpoint => &self.possible_endpoints,
            Category::Image => &self.images,
            Category::Document => &self.documents,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::Email => &mut self.emails,
            Category::Link => &mut self.links,
            Category::Comment => &mut self.comments,
            Category::ExternalLink => &mut self.external_link,
            Category::JsFile => &mut self.js_files,
            Category::PossibleEndpoint => &mut self.possible_endpoints,
            Category::Image => &mut self.images,
            Category::Document => &mut self.documents,
        }
    }

    pub fn insert(&mut self, category: Category, value: impl Into<String>) -> bool {
        self.get_mut(category).insert(value.into())
    }

    pub fn extend<I>(&mut self, category: Category, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.get_mut(category).extend(values);
    }

    /// Merge classifier output (secret category -> matches) into
    /// `sensitive_data`.
    pub fn extend_secrets(&mut self, secrets: BTreeMap<String, BTreeSet<String>>) {
        for (name, matches) in secrets {
            if matches.is_empty() {
                continue;
            }
            self.sensitive_data.entry(name).or_default().extend(matches);
        }
    }

    /// Union another partial result into this one.
    pub fn merge(&mut self, other: CrawlResult) {
        let CrawlResult {
            emails,
            links,
            comments,
            external_link,
            js_files,
            possible_endpoints,
            images,
            sensitive_data,
            documents,
        } = other;

        self.emails.extend(emails);
        self.links.extend(links);
        self.comments.extend(comments);
        self.external_link.extend(external_link);
        self.js_files.extend(js_files);
        self.possible_endpoints.extend(possible_endpoints);
        self.images.extend(images);
        self.documents.extend(documents);
        self.extend_secrets(sensitive_data);
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_empty()) && self.sensitive_data.is_empty()
    }

    /// Total number of secret matches across all secret categories
    pub fn secret_count(&self) -> usize {
        self.sensitive_data.values().map(|v| v.len()).sum()
    }
}
