// Report rendering for a finished enumeration

use crate::model::{EnumerationReport, ProbeResult};
use crate::posture::Finding;
use crate::verdict::Verdict;
use ddenum_scanner::credentials::CredentialMode;
use ddenum_scanner::probe::Category;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

/// Render in the requested format
pub fn render_report(
    format: ReportFormat,
    report: &EnumerationReport,
    findings: &[Finding],
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report, findings)),
        ReportFormat::Json => generate_json_report(report, findings),
        ReportFormat::Markdown => Ok(generate_markdown_report(report, findings)),
    }
}

/// Results grouped by category, in catalog order
fn grouped(report: &EnumerationReport) -> Vec<(Category, Vec<&ProbeResult>)> {
    let mut groups: Vec<(Category, Vec<&ProbeResult>)> = Vec::new();
    for result in report.results() {
        let same_category = groups
            .last()
            .is_some_and(|(category, _)| *category == result.probe.category);
        if same_category && let Some((_, items)) = groups.last_mut() {
            items.push(result);
        } else {
            groups.push((result.probe.category, vec![result]));
        }
    }
    groups
}

fn verdict_marker(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Accessible(_) => "[+]",
        Verdict::Forbidden { .. } => "[x]",
        Verdict::NotFound => "[?]",
        Verdict::SkippedMissingCredential => "[-]",
        Verdict::TransportFailure(_) => "[!]",
    }
}

pub fn generate_text_report(report: &EnumerationReport, findings: &[Finding]) -> String {
    let meta = report.metadata();
    let counts = report.counts();
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                     DATADOG CREDENTIAL ENUMERATION REPORT\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&format!("Region:       {}\n", meta.region));
    out.push_str(&format!("Endpoint:     {}\n", meta.base_url));
    out.push_str(&format!("API Key:      {}\n", meta.api_key_hint));
    out.push_str(&format!("Credentials:  {}\n", format_mode(meta.credential_mode)));
    out.push_str(&format!(
        "Scan Date:    {}\n",
        meta.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ms) = meta.duration_ms() {
        out.push_str(&format!("Duration:     {:.1} seconds\n", ms as f64 / 1000.0));
    }
    out.push('\n');

    out.push_str(RULE);
    out.push_str("\nSUMMARY\n");
    out.push_str(RULE);
    out.push_str("\n\n");
    out.push_str(&format!("Probes:       {}\n", counts.total()));
    out.push_str(&format!("  [+] Accessible   {}\n", counts.accessible));
    out.push_str(&format!("  [x] Forbidden    {}\n", counts.forbidden));
    out.push_str(&format!("  [?] Not found    {}\n", counts.not_found));
    out.push_str(&format!("  [-] Skipped      {}\n", counts.skipped));
    out.push_str(&format!("  [!] Errors       {}\n", counts.transport_failure));
    out.push('\n');

    out.push_str(RULE);
    out.push_str("\nRESULTS\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    for (category, results) in grouped(report) {
        out.push_str(&format!("## {}\n", category.title()));
        for result in results {
            out.push_str(&format!(
                "  {} {:<28} {}\n",
                verdict_marker(&result.verdict),
                result.probe.label,
                result.verdict.label()
            ));
            if let Some(summary) = result.verdict.summary() {
                let line = summary.to_string();
                if !line.is_empty() {
                    out.push_str(&format!("        {}\n", line));
                }
                for sample in &summary.samples {
                    out.push_str(&format!("          - {}\n", sample));
                }
                if summary.remaining > 0 {
                    out.push_str(&format!("          ... and {} more\n", summary.remaining));
                }
            }
        }
        out.push('\n');
    }

    if !findings.is_empty() {
        out.push_str(RULE);
        out.push_str("\nPOSTURE FINDINGS\n");
        out.push_str(RULE);
        out.push_str("\n\n");
        for (idx, finding) in findings.iter().enumerate() {
            out.push_str(&format!(
                "[{}] {} ({})\n",
                idx + 1,
                finding.title,
                finding.severity.as_str().to_uppercase()
            ));
            out.push_str(&wrap_text(&finding.description, 80, "  "));
            if let Some(ref remediation) = finding.remediation {
                out.push_str("  Remediation:\n");
                out.push_str(&wrap_text(remediation, 80, "    "));
            }
            out.push('\n');
        }
    }

    out.push_str(RULE);
    out.push_str("\nGenerated by ddenum. For authorized security testing only.\n");
    out
}

pub fn generate_json_report(
    report: &EnumerationReport,
    findings: &[Finding],
) -> Result<String, serde_json::Error> {
    let meta = report.metadata();
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "ddenum",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
                "disclaimer": "For authorized security testing only"
            },
            "run": meta,
            "summary": {
                "total_probes": report.len(),
                "verdicts": report.counts(),
                "duration_ms": meta.duration_ms(),
            },
            "results": report.results(),
            "findings": findings,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(report: &EnumerationReport, findings: &[Finding]) -> String {
    let meta = report.metadata();
    let counts = report.counts();
    let mut out = String::new();

    out.push_str("# Datadog Credential Enumeration\n\n");
    out.push_str(&format!("- **Region:** {}\n", meta.region));
    out.push_str(&format!("- **Endpoint:** `{}`\n", meta.base_url));
    out.push_str(&format!("- **API key:** `{}`\n", meta.api_key_hint));
    out.push_str(&format!("- **Credentials:** {}\n", format_mode(meta.credential_mode)));
    out.push_str(&format!("- **Started:** {}\n\n", meta.started_at.to_rfc3339()));

    out.push_str("## Summary\n\n");
    out.push_str("| Accessible | Forbidden | Not found | Skipped | Errors |\n");
    out.push_str("|---|---|---|---|---|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        counts.accessible, counts.forbidden, counts.not_found, counts.skipped, counts.transport_failure
    ));

    out.push_str("## Results\n\n");
    out.push_str("| Category | Probe | Path | Verdict | Summary |\n");
    out.push_str("|---|---|---|---|---|\n");
    for entry in report.results() {
        let summary = entry
            .verdict
            .summary()
            .map(|s| s.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "| {} | {} | `{}` | {} | {} |\n",
            entry.probe.category.title(),
            entry.probe.label,
            entry.probe.path,
            escape_cell(&entry.verdict.label()),
            escape_cell(&summary)
        ));
    }
    out.push('\n');

    if !findings.is_empty() {
        out.push_str("## Findings\n\n");
        for finding in findings {
            out.push_str(&format!(
                "### {} ({})\n\n{}\n\n",
                finding.title,
                finding.severity.as_str(),
                finding.description
            ));
            if let Some(ref remediation) = finding.remediation {
                out.push_str(&format!("_Remediation:_ {}\n\n", remediation));
            }
        }
    }

    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn format_mode(mode: CredentialMode) -> &'static str {
    match mode {
        CredentialMode::ApiKeyOnly => "API key only",
        CredentialMode::ApiAndApplicationKey => "API key + application key",
    }
}

/// Keep remote text inside one table cell
fn escape_cell(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace('|', "\\|")
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        let wrapped = wrap_text("one two three four", 12, "  ");
        assert_eq!(wrapped, "  one two\n  three four\n");
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("Acme\nCorp|x"), "Acme Corp\\|x");
        assert_eq!(escape_cell("a\r\nb\rc"), "a b c");
    }

    #[test]
    fn test_format_mode() {
        assert_eq!(format_mode(CredentialMode::ApiKeyOnly), "API key only");
        assert_eq!(
            format_mode(CredentialMode::ApiAndApplicationKey),
            "API key + application key"
        );
    }
}
