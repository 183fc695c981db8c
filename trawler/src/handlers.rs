use clap::ArgMatches;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use trawler_core::crawl::{CrawlOptions, CrawlStatus, execute_crawl};
use trawler_core::report::{ensure_writable, generate_summary, write_report};
use url::Url;

const VERBOSE_FILTER: &str = "trawler=debug,trawler_core=debug,trawler_scanner=debug";

/// Everything `crawl` needs, resolved from the command line
pub struct CrawlSettings {
    pub options: CrawlOptions,
    pub output: PathBuf,
    pub verbose: bool,
}

impl CrawlSettings {
    pub fn from_matches(sub_matches: &ArgMatches, show_progress_bars: bool) -> Result<Self, String> {
        let raw_url = sub_matches
            .get_one::<String>("url")
            .ok_or_else(|| "--url is required".to_string())?;
        let url = parse_url_line(raw_url)
            .ok_or_else(|| format!("Invalid start URL '{}'", raw_url))?;

        let output = sub_matches
            .get_one::<PathBuf>("output")
            .map(|p| expand_output_path(p))
            .unwrap_or_else(|| PathBuf::from(trawler_core::report::DEFAULT_OUTPUT));

        Ok(Self {
            options: CrawlOptions {
                url,
                threads: sub_matches.get_one::<usize>("threads").copied().unwrap_or(10).max(1),
                max_depth: sub_matches.get_one::<usize>("depth").copied().unwrap_or(3),
                timeout_secs: sub_matches.get_one::<u64>("timeout").copied().unwrap_or(10),
                user_agent: sub_matches.get_one::<String>("user-agent").cloned(),
                show_progress_bars,
            },
            output,
            verbose: sub_matches.get_flag("verbose"),
        })
    }
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some()
    {
        return Some(line.to_string());
    }

    // `example.com:8080` parses with "example.com" as its scheme, so only
    // lines without an explicit scheme get one added
    if line.contains("://") {
        return None;
    }
    let with_scheme = format!("http://{}", line);
    match Url::parse(&with_scheme) {
        Ok(url) if url.host_str().is_some() => Some(with_scheme),
        _ => None,
    }
}

pub fn expand_output_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), msg);
    std::process::exit(1);
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) {
    let settings = match CrawlSettings::from_matches(sub_matches, !quiet) {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };
    init_tracing(settings.verbose);

    let output = settings.output;
    if let Err(e) = ensure_writable(&output) {
        fail(format!("{:#}", e));
    }

    if !quiet {
        println!(
            "\n{} {}",
            "Crawling".bright_white().bold(),
            settings.options.url.bright_cyan()
        );
        println!("Workers: {}", settings.options.threads);
        println!("Max depth: {}", settings.options.max_depth);
        println!("Timeout: {}s", settings.options.timeout_secs);
        println!("Output: {}\n", output.display());
    }

    let run = match execute_crawl(settings.options, shutdown_signal()).await {
        Ok(run) => run,
        Err(e) => fail(format!("Crawl failed: {:#}", e)),
    };

    match &run.status {
        CrawlStatus::Completed => println!("\n{} Crawl complete!\n", "✓".green().bold()),
        CrawlStatus::Interrupted => println!(
            "\n{} Crawl interrupted, saving partial results\n",
            "⚠".yellow().bold()
        ),
        CrawlStatus::Aborted(reason) => eprintln!(
            "\n{} Crawl aborted ({}), saving partial results\n",
            "⚠".yellow().bold(),
            reason
        ),
    }

    if let Err(e) = write_report(&output, &run.result) {
        fail(format!("{:#}", e));
    }

    print!("{}", generate_summary(&run.result));
    println!(
        "{} Crawling complete! Results saved to {}",
        "✓".green().bold(),
        output.display().to_string().bright_white()
    );
}
