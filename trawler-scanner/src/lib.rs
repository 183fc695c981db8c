pub mod aggregate;
pub mod classify;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod frontier;
pub mod patterns;
pub mod result;
pub mod worker;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use result::{Category, CrawlResult, CrawlTarget, TargetKind};
