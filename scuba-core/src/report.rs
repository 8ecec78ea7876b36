// Report aggregation and rendering

use crate::audit::{AuditRecord, AuditStatus};
use crate::links::{OriginAllowlist, strip_origin};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const MAX_PATH_WIDTH: usize = 60;
const PASS_GLYPH: &str = "✓";
const FAIL_GLYPH: &str = "✗";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Pages carrying at least one advisory issue.
    pub warnings: usize,
}

/// Audit records in visit order.
#[derive(Debug, Clone)]
pub struct Report {
    seed: String,
    allowlist: OriginAllowlist,
    started_at: i64,
    finished_at: Option<i64>,
    records: Vec<AuditRecord>,
}

impl Report {
    pub fn new(seed: impl Into<String>, allowlist: OriginAllowlist) -> Self {
        Self {
            seed: seed.into(),
            allowlist,
            started_at: Utc::now().timestamp(),
            finished_at: None,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now().timestamp());
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// True when no record failed. Drives the process exit status.
    pub fn is_passing(&self) -> bool {
        self.records.iter().all(AuditRecord::is_pass)
    }

    pub fn summary(&self) -> ReportSummary {
        let passed = self.records.iter().filter(|r| r.is_pass()).count();
        ReportSummary {
            total: self.records.len(),
            passed,
            failed: self.records.len() - passed,
            warnings: self.records.iter().filter(|r| r.has_warnings()).count(),
        }
    }

    /// URL as shown in reports: origin stripped when internal.
    pub fn display_url(&self, url: &str) -> String {
        strip_origin(url, &self.allowlist)
    }
}

pub fn render(report: &Report, format: ReportFormat, colorize: bool) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report, colorize)),
        ReportFormat::Json => generate_json_report(report),
        ReportFormat::Markdown => Ok(generate_markdown_report(report)),
    }
}

pub fn generate_text_report(report: &Report, colorize: bool) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                           SCUBA SMOKE AUDIT REPORT\n");
    out.push_str(RULE);
    out.push_str("\n\n");
    out.push_str(&format!("Seed:         {}\n", report.seed));
    out.push_str(&format!("Scan Date:    {}\n", format_timestamp(report.started_at)));
    if let Some(finished_at) = report.finished_at {
        out.push_str(&format!("Duration:     {} seconds\n", finished_at - report.started_at));
    }
    out.push('\n');

    let rows: Vec<(String, String)> = report
        .records
        .iter()
        .map(|r| (truncate_path(&report.display_url(&r.url)), format_issues(r)))
        .collect();
    let width = rows
        .iter()
        .map(|(path, _)| path.chars().count())
        .max()
        .unwrap_or(0)
        .max("PAGE".len());

    out.push_str(&format!("     {:<width$}  ISSUES\n", "PAGE", width = width));
    for (record, (path, issues)) in report.records.iter().zip(rows.iter()) {
        let glyph = status_glyph(record.status(), colorize);
        let padding = width.saturating_sub(path.chars().count());
        out.push_str(&format!(
            "  {}  {}{}  {}\n",
            glyph,
            path,
            " ".repeat(padding),
            issues
        ));
    }
    out.push('\n');

    let summary = report.summary();
    out.push_str(RULE);
    out.push('\n');
    out.push_str("Summary:\n");
    out.push_str(&format!("  Pages audited: {}\n", summary.total));
    out.push_str(&format!("  Passed:        {}\n", summary.passed));
    out.push_str(&format!("  Failed:        {}\n", summary.failed));
    out.push_str(&format!("  With warnings: {}\n", summary.warnings));

    out
}

pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Scuba",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": Utc::now().to_rfc3339(),
                "format": "json"
            },
            "run": {
                "seed": report.seed,
                "origins": report.allowlist.origins(),
                "start_time": format_iso8601_timestamp(report.started_at),
                "end_time": report.finished_at.map(format_iso8601_timestamp),
                "passed": report.is_passing()
            },
            "summary": report.summary(),
            "records": report.records
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(report: &Report) -> String {
    let mut out = String::new();
    let summary = report.summary();

    out.push_str("# Scuba Smoke Audit\n\n");
    out.push_str(&format!("- **Seed:** {}\n", report.seed));
    out.push_str(&format!("- **Scan date:** {}\n", format_timestamp(report.started_at)));
    out.push_str(&format!(
        "- **Result:** {} passed, {} failed, {} with warnings\n\n",
        summary.passed, summary.failed, summary.warnings
    ));

    out.push_str("| Status | Page | HTTP | Issues |\n");
    out.push_str("|--------|------|------|--------|\n");
    for record in &report.records {
        let http = record
            .http_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "| {} {} | `{}` | {} | {} |\n",
            status_glyph(record.status(), false),
            record.status().as_str(),
            report.display_url(&record.url),
            http,
            format_issues(record).replace('|', "\\|")
        ));
    }

    out
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn format_issues(record: &AuditRecord) -> String {
    if record.issues().is_empty() {
        return "none".to_string();
    }
    record
        .issues()
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn status_glyph(status: AuditStatus, colorize: bool) -> String {
    match (status, colorize) {
        (AuditStatus::Pass, true) => PASS_GLYPH.green().bold().to_string(),
        (AuditStatus::Fail, true) => FAIL_GLYPH.red().bold().to_string(),
        (AuditStatus::Pass, false) => PASS_GLYPH.to_string(),
        (AuditStatus::Fail, false) => FAIL_GLYPH.to_string(),
    }
}

fn truncate_path(path: &str) -> String {
    if path.chars().count() > MAX_PATH_WIDTH {
        let head: String = path.chars().take(MAX_PATH_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        path.to_string()
    }
}

fn format_timestamp(timestamp: i64) -> String {
    let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_iso8601_timestamp(timestamp: i64) -> String {
    let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    datetime.to_rfc3339()
}
