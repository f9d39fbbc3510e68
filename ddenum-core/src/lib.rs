pub mod catalog;
pub mod classify;
pub mod enumerate;
pub mod model;
pub mod posture;
pub mod report;
pub mod verdict;

use colored::Colorize;

pub use classify::classify;
pub use enumerate::{EnumerateOptions, Enumerator, ProbeResultCallback, execute_enumeration};
pub use model::{EnumerationReport, ProbeResult, RunMetadata, VerdictCounts};
pub use verdict::{Summary, Verdict, VerdictKind};

const BANNER: &str = r#"
     _     _
  __| | __| | ___ _ __  _   _ _ __ ___
 / _` |/ _` |/ _ \ '_ \| | | | '_ ` _ \
| (_| | (_| |  __/ | | | |_| | | | | | |
 \__,_|\__,_|\___|_| |_|\__,_|_| |_| |_|
"#;

pub fn print_banner() {
    eprintln!("{}", BANNER.bright_cyan().bold());
    eprintln!(
        "  {} v{}",
        "Datadog credential permission enumerator".yellow(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("  {}\n", "For authorized security testing only.".dimmed());
}
