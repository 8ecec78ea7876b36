use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scuba_core::report::{render, save_report};
use scuba_core::{AuditConfig, CrawlOrchestrator, ProgressCallback, Report, ReportFormat};
use scuba_driver::HttpDriver;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use url::Url;

const CONFIG_FILE_NAME: &str = "scuba.json";

/// How a completed audit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Passed,
    Failed,
}

impl AuditOutcome {
    pub fn from_report(report: &Report) -> Self {
        if report.is_passing() {
            AuditOutcome::Passed
        } else {
            AuditOutcome::Failed
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AuditOutcome::Passed => 0,
            AuditOutcome::Failed => 1,
        }
    }
}

impl From<AuditOutcome> for ExitCode {
    fn from(outcome: AuditOutcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

/// Exit code for runs that never produced a report.
pub const FATAL_EXIT_CODE: u8 = 2;

pub fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_banner() {
    println!();
    println!("{}", r"   ____                     ".bright_cyan().bold());
    println!("{}", r"  / __/______ __ / /  ___ _ ".bright_cyan().bold());
    println!("{}", r" _\ \/ __/ // // _ \/ _ `/ ".bright_cyan().bold());
    println!("{}", r"/___/\__/\_,_//_.__/\_,_/  ".bright_cyan().bold());
    println!(
        "  {} {}",
        "website smoke audits".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// The audit configuration for a run: the `--config` file (or defaults) with
/// command line flags layered on top.
pub fn build_config(args: &ArgMatches, seed: &Url) -> Result<AuditConfig> {
    let mut config = match args.get_one::<String>("config") {
        Some(path) => AuditConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => AuditConfig::default(),
    };

    if let Some(origins) = args.get_many::<String>("origin") {
        // Extra origins widen the allowlist; the seed's own origin stays in it.
        let seed_origin = seed.origin().ascii_serialization();
        if !config.origins.contains(&seed_origin) {
            config.origins.insert(0, seed_origin);
        }
        for origin in origins {
            if !config.origins.contains(origin) {
                config.origins.push(origin.clone());
            }
        }
    }

    if let Some(paths) = args.get_many::<String>("special-path") {
        config.special_layout_paths = paths.cloned().collect();
    }

    if let Some(secs) = args.get_one::<u64>("seed-timeout") {
        config.seed_timeout_ms = secs.saturating_mul(1000);
    }
    if let Some(secs) = args.get_one::<u64>("nav-timeout") {
        config.navigation_timeout_ms = secs.saturating_mul(1000);
    }
    if let Some(secs) = args.get_one::<u64>("idle-timeout") {
        config.idle_timeout_ms = secs.saturating_mul(1000);
    }
    if let Some(millis) = args.get_one::<u64>("settle") {
        config.settle_delay_ms = *millis;
    }

    config.validate()?;
    Ok(config)
}

pub fn report_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

/// Path part of a URL for progress display.
pub fn display_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path();
            if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            }
        }
        Err(_) => url.to_string(),
    }
}

pub async fn handle_audit(args: &ArgMatches, quiet: bool) -> Result<AuditOutcome> {
    let seed = args
        .get_one::<Url>("url")
        .context("A seed URL is required (--url)")?;
    let config = build_config(args, seed)?;
    let format = report_format(args);
    let output = args.get_one::<PathBuf>("output");

    let no_color = args.get_flag("no-color");
    if no_color {
        colored::control::set_override(false);
    }
    let colorize = !no_color && output.is_none() && std::io::stdout().is_terminal();

    if !quiet {
        print_divider();
        println!("{}", "  SMOKE AUDIT".bright_white().bold());
        print_divider();
        println!("  {} {}", "Seed:".bold(), seed);
        let allowlist = config.allowlist(seed)?;
        println!("  {} {}", "Origins:".bold(), allowlist.origins().join(", "));
        println!(
            "  {} {}s per page, {}s for the seed",
            "Timeouts:".bold(),
            config.navigation_timeout().as_secs(),
            config.seed_timeout().as_secs()
        );
        println!();
    }

    let driver = HttpDriver::new().context("Failed to build the HTTP driver")?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Collecting links from the seed page...");

    let progress = spinner.clone();
    let callback: ProgressCallback = Arc::new(move |position: usize, total: usize, url: &str| {
        progress.set_message(format!("Auditing {}/{}: {}", position, total, display_path(url)));
    });

    let orchestrator = CrawlOrchestrator::new(driver, config).with_progress_callback(callback);
    let result = orchestrator.run(seed.as_str()).await;
    spinner.finish_and_clear();

    let report = result.context("Audit aborted")?;
    let rendered = render(&report, format, colorize)?;

    match output {
        Some(path) => {
            save_report(&rendered, path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            if !quiet {
                println!("{} Report saved to {}", "✓".green().bold(), path.display());
            }
        }
        None => print!("{}", rendered),
    }

    let outcome = AuditOutcome::from_report(&report);
    if !quiet {
        match outcome {
            AuditOutcome::Passed => println!("\n{} All pages passed", "✓".green().bold()),
            AuditOutcome::Failed => println!(
                "\n{} {} page(s) failed",
                "✗".red().bold(),
                report.summary().failed
            ),
        }
    }
    Ok(outcome)
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(crate::commands::DEFAULT_CONFIG_PATH);
    let force = args.get_flag("force");

    print_divider();
    println!("{}", "  SCUBA INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let written = write_default_config(path, force)?;

    println!(
        "{} Default configuration written to {}",
        "✓".green().bold(),
        written.display().to_string().bright_white()
    );
    println!(
        "  Edit the selectors and origins, then run {}",
        format!("scuba audit -u <URL> -c {}", written.display()).cyan()
    );
    println!();
    Ok(())
}

/// Write the default configuration as JSON. A directory path (or one ending
/// in `/`) gets `scuba.json` appended. Refuses to overwrite unless `force`.
pub fn write_default_config(path: &str, force: bool) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(path);
    let mut target = PathBuf::from(expanded.as_ref());
    if target.is_dir() || path.ends_with('/') {
        target = target.join(CONFIG_FILE_NAME);
    }

    if target.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite it.",
            target.display()
        );
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_config_dir(parent)?;
    }

    let content = AuditConfig::default().to_json()?;
    fs::write(&target, content)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

fn create_config_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}
