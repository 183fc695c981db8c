use colored::Colorize;

pub mod crawl;
pub mod report;

const BANNER: &str = r#"
  _                     _
 | |_ _ __ __ ___      _| | ___ _ __
 | __| '__/ _` \ \ /\ / / |/ _ \ '__|
 | |_| | | (_| |\ V  V /| |  __/ |
  \__|_|  \__,_| \_/\_/ |_|\___|_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "recon crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
