pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{CrawlSettings, expand_output_path, parse_url_line};

// Re-export crawl functionality from trawler-core
pub use trawler_core::crawl::{CrawlOptions, CrawlRun, CrawlStatus, execute_crawl};
