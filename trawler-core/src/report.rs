// Output file and console summary for a crawl snapshot

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::{self, OpenOptions};
use std::path::Path;
use trawler_scanner::{Category, CrawlResult};

pub const DEFAULT_OUTPUT: &str = "recon_output.json";

/// Fail early if the report could not be written later on.
///
/// Creates the file (and missing parent directories) when it does not exist;
/// an existing file is left untouched until the report overwrites it.
pub fn ensure_writable(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("output path {} is not writable", path.display()))?;
    Ok(())
}

pub fn render_json(result: &CrawlResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize crawl results")
}

/// Write the snapshot as a single JSON object.
pub fn write_report(path: &Path, result: &CrawlResult) -> Result<()> {
    let json = render_json(result)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Generate a console summary from a snapshot
pub fn generate_summary(result: &CrawlResult) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");

    for category in Category::ALL {
        let count = result.get(category).len();
        let count_str = if count == 0 {
            count.to_string().dimmed()
        } else {
            count.to_string().cyan()
        };
        report.push_str(&format!("  {:<20} {}\n", category.as_str(), count_str));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if result.sensitive_data.is_empty() {
        report.push_str(&format!("{}\n", "No sensitive data found".green()));
        return report;
    }

    report.push_str(&format!(
        "# Sensitive data: {} matches in {} categories\n",
        result.secret_count(),
        result.sensitive_data.len()
    ));
    for (name, matches) in &result.sensitive_data {
        report.push_str(&format!(
            "  {:<32} {}\n",
            name.yellow(),
            matches.len().to_string().red().bold()
        ));
    }
    report.push('\n');

    report
}
