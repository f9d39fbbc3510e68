use anyhow::Context;
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use ddenum_core::catalog;
use ddenum_core::enumerate::{EnumerateOptions, ProbeResultCallback, execute_enumeration};
use ddenum_core::model::{EnumerationReport, ProbeResult};
use ddenum_core::posture::{Finding, Severity, analyze_report};
use ddenum_core::report::{ReportFormat, render_report, save_report};
use ddenum_core::verdict::Verdict;
use ddenum_scanner::credentials::{CredentialContext, Region};
use ddenum_scanner::dispatcher::GatingPolicy;
use ddenum_scanner::error::ConfigurationError;
use ddenum_scanner::probe::Category;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const API_KEY_ENV: &str = "DD_API_KEY";
pub const APP_KEY_ENV: &str = "DD_APP_KEY";

// Helper functions for the enumerate handler

/// Positional argument first, then the environment. Blank values count as absent.
pub fn pick_key(arg: Option<&str>, env_value: Option<String>) -> Option<String> {
    arg.map(str::to_string)
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env_value.filter(|k| !k.trim().is_empty()))
}

/// Build the credential context from resolved keys and either a region or an explicit URL
pub fn build_context(
    api_key: Option<&str>,
    app_key: Option<&str>,
    region: &str,
    api_url: Option<&str>,
) -> Result<CredentialContext, ConfigurationError> {
    let api_key = api_key.ok_or(ConfigurationError::EmptyApiKey)?;
    match api_url {
        Some(url) => CredentialContext::with_base_url(api_key, app_key, url),
        None => CredentialContext::build(api_key, app_key, region),
    }
}

/// Parse `--category` values, rejecting unknown names
pub fn parse_categories<'a, I>(values: I) -> Result<Vec<Category>, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut categories = Vec::new();
    for value in values {
        let category = Category::from_str(value).ok_or_else(|| {
            let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
            format!("Unknown category '{}' (expected one of: {})", value, known.join(", "))
        })?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    Ok(categories)
}

/// warn by default, then info, debug, trace
pub fn verbosity_level(count: u8) -> Level {
    match count {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Exit status for a finished run: failure only when the key could not be checked at all
pub fn exit_code(report: &EnumerationReport) -> i32 {
    if report.validation_failed() { 1 } else { 0 }
}

fn verdict_marker(verdict: &Verdict) -> ColoredString {
    match verdict {
        Verdict::Accessible(_) => "✓".green().bold(),
        Verdict::Forbidden { .. } => "✗".red().bold(),
        Verdict::NotFound => "?".yellow(),
        Verdict::SkippedMissingCredential => "-".dimmed(),
        Verdict::TransportFailure(_) => "!".bright_red().bold(),
    }
}

fn verdict_label(verdict: &Verdict) -> ColoredString {
    let label = verdict.label();
    match verdict {
        Verdict::Accessible(_) => label.green(),
        Verdict::Forbidden { .. } => label.red(),
        Verdict::NotFound => label.yellow(),
        Verdict::SkippedMissingCredential => label.dimmed(),
        Verdict::TransportFailure(_) => label.bright_red(),
    }
}

/// One console line per probe, with the summary appended when there is one
pub fn format_verdict_line(result: &ProbeResult) -> String {
    let mut line = format!(
        "{} {:<28} {}",
        verdict_marker(&result.verdict),
        result.probe.label,
        verdict_label(&result.verdict)
    );
    if let Some(summary) = result.verdict.summary() {
        let text = summary.to_string();
        if !text.is_empty() {
            line.push_str(&format!("  {}", text.bright_white()));
        }
    }
    line
}

/// Catalog listing for `--list-probes`
pub fn probe_listing() -> String {
    let mut out = String::new();
    for category in catalog::categories() {
        out.push_str(&format!("{}\n", category.title().bright_blue().bold()));
        for probe in catalog::by_category(&[category]) {
            let key_note = if probe.requires_app_key { "" } else { " (API key only)" };
            out.push_str(&format!(
                "  {:<24} {:<6} {}{}\n",
                probe.id,
                probe.method.as_str(),
                probe.path,
                key_note.dimmed()
            ));
        }
    }
    out.push_str(&format!(
        "\n{} {}\n",
        "Regions:".blue(),
        Region::ALL.iter().map(|r| r.code()).collect::<Vec<_>>().join(", ")
    ));
    out
}

/// Write the rendered report, or print it when no path was given
pub fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => save_report(content, path)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.as_str().to_uppercase();
    match severity {
        Severity::Critical => label.bright_red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.blue(),
        Severity::Info => label.dimmed(),
    }
}

fn print_findings(findings: &[Finding]) {
    if findings.is_empty() {
        eprintln!("{} No posture findings", "✓".green().bold());
        return;
    }
    eprintln!("{}", "POSTURE FINDINGS".bright_white().bold());
    for finding in findings {
        eprintln!(
            "  {} {} [{}]",
            "•".yellow(),
            finding.title.bright_white(),
            severity_label(finding.severity)
        );
    }
}

fn progress_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn handle_list_probes() {
    print!("{}", probe_listing());
}

/// Run a full enumeration from parsed arguments and return the process exit code
pub async fn handle_enumerate(matches: &ArgMatches) -> i32 {
    let quiet = matches.get_flag("quiet");

    let api_key = pick_key(
        matches.get_one::<String>("API_KEY").map(String::as_str),
        std::env::var(API_KEY_ENV).ok(),
    );
    let app_key = pick_key(
        matches.get_one::<String>("APP_KEY").map(String::as_str),
        std::env::var(APP_KEY_ENV).ok(),
    );
    let region = matches
        .get_one::<String>("region")
        .map(String::as_str)
        .unwrap_or("us1");
    let api_url = matches.get_one::<String>("api-url").map(String::as_str);

    let context = match build_context(api_key.as_deref(), app_key.as_deref(), region, api_url) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            return 1;
        }
    };

    let categories = match parse_categories(
        matches
            .get_many::<String>("category")
            .into_iter()
            .flatten()
            .map(String::as_str),
    ) {
        Ok(categories) => categories,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            return 1;
        }
    };

    let format = matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = matches.get_one::<std::path::PathBuf>("output");
    let timeout = Duration::from_secs(*matches.get_one::<u64>("timeout").unwrap_or(&10));
    let gating = if matches.get_flag("attempt-all") {
        GatingPolicy::Attempt
    } else {
        GatingPolicy::Skip
    };

    if !quiet {
        print_divider();
        eprintln!(
            "{} Target: {} ({})",
            "→".blue(),
            context.base_url().as_str().bright_white(),
            context.region_label()
        );
        eprintln!("{} API key: {}", "→".blue(), context.masked_api_key().bright_white());
        if !context.has_app_key() {
            let note = match gating {
                GatingPolicy::Skip => "probes that need one will be skipped",
                GatingPolicy::Attempt => "probes that need one will be sent with the API key only",
            };
            eprintln!("{} No application key supplied: {}", "⚠".yellow().bold(), note);
        }
        print_divider();
    }

    let mut options = EnumerateOptions::new(context);
    options.categories = categories;
    options.timeout = timeout;
    options.gating = gating;

    let spinner = (!quiet).then(progress_spinner);
    let callback: Option<ProbeResultCallback> = spinner.clone().map(|spinner| {
        let callback: ProbeResultCallback = Arc::new(move |idx: usize, total: usize, result: &ProbeResult| {
            spinner.suspend(|| eprintln!("{}", format_verdict_line(result)));
            spinner.set_message(format!("[{}/{}] {}", idx, total, result.probe.label));
        });
        callback
    });

    let report = match execute_enumeration(options, callback).await {
        Ok(report) => report,
        Err(e) => {
            if let Some(ref spinner) = spinner {
                spinner.finish_and_clear();
            }
            eprintln!("{} Enumeration failed: {}", "✗".red().bold(), e);
            return 1;
        }
    };

    if let Some(ref spinner) = spinner {
        spinner.finish_and_clear();
    }

    let findings = analyze_report(&report);

    if !quiet {
        let counts = report.counts();
        eprintln!();
        eprintln!(
            "{} {} accessible, {} forbidden, {} not found, {} skipped, {} errors",
            "✓".green().bold(),
            counts.accessible.to_string().green(),
            counts.forbidden,
            counts.not_found,
            counts.skipped,
            counts.transport_failure
        );
        print_findings(&findings);
        eprintln!();
    }

    let rendered = match render_report(format, &report, &findings) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("{} Failed to render report: {}", "✗".red().bold(), e);
            return 1;
        }
    };

    if let Err(e) = write_output(&rendered, output.map(|p| p.as_path())) {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        return 1;
    }
    if let Some(path) = output
        && !quiet
    {
        eprintln!(
            "{} Report saved: {}",
            "✓".green().bold(),
            path.display().to_string().bright_white()
        );
    }

    if report.validation_failed() && !quiet {
        eprintln!(
            "{} Key validation could not complete; check the region and network",
            "✗".red().bold()
        );
    }

    exit_code(&report)
}
