use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use warranty_tracker_sdk::basis::{parse_instant, ReportRecord, WarrantyBasis};
use warranty_tracker_sdk::clock::{Clock, FixedClock, SystemClock};
use warranty_tracker_sdk::error::Error;
use warranty_tracker_sdk::eval::{compute_all, PeriodState, PeriodStatus, WarrantyReport};
use warranty_tracker_sdk::period::{Anchor, Schedule};

const BAR_WIDTH: usize = 20;

pub(crate) fn load_schedule(path: Option<PathBuf>) -> Result<Schedule> {
    match path {
        Some(path) => {
            let schedule = Schedule::load(&path)
                .with_context(|| format!("Failed to load schedule from {:?}", path))?;
            info!(path = %path.display(), "loaded custom schedule");
            Ok(schedule)
        }
        None => Ok(Schedule::standard().clone()),
    }
}

/// Reads "now" exactly once per command, from `--now` when given.
pub(crate) fn resolve_now(now: Option<String>) -> Result<DateTime<Utc>> {
    let clock: Box<dyn Clock> = match now {
        Some(t) => Box::new(FixedClock::new(
            parse_instant(&t).context("Invalid --now (use YYYY-MM-DD or RFC 3339)")?,
        )),
        None => Box::new(SystemClock),
    };
    Ok(clock.now())
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).floor() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn days_column(period: &PeriodStatus) -> String {
    match period.state {
        PeriodState::NotStarted => format!("starts in {} days", period.days_until_start),
        PeriodState::Active => format!("{} days left", period.remaining_days),
        PeriodState::Expired => "-".to_string(),
    }
}

fn print_report(report: &WarrantyReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Evaluated at {}", report.evaluated_at.format("%Y-%m-%d %H:%M UTC"));
    println!();
    println!(
        "{:<30} {:<12} {:<12} {:<12} {:<30} {:<20}",
        "Period", "State", "Start", "End", "Progress", "Days"
    );
    println!(
        "{:-<30} {:-<12} {:-<12} {:-<12} {:-<30} {:-<20}",
        "", "", "", "", "", ""
    );
    for period in report.iter() {
        println!(
            "{:<30} {:<12} {:<12} {:<12} {:<30} {:<20}",
            period.kind.label(),
            period.state.label(),
            period.start_date.format("%Y-%m-%d").to_string(),
            period.end_date.format("%Y-%m-%d").to_string(),
            format!("{} {:>5.1}%", progress_bar(period.progress_percent), period.progress_percent),
            days_column(period),
        );
    }

    match report.next_transition() {
        Some(at) => println!("\nNext change: {}", at.format("%Y-%m-%d")),
        None => println!("\nAll warranty and maintenance periods have ended."),
    }
    Ok(())
}

pub async fn status(
    schedule_path: Option<PathBuf>,
    inspection_date: String,
    now: Option<String>,
    json: bool,
) -> Result<()> {
    let schedule = load_schedule(schedule_path)?;
    let start_date = parse_instant(&inspection_date)
        .context("Invalid --inspection-date (use YYYY-MM-DD or RFC 3339)")?;
    let basis = WarrantyBasis::new(start_date, resolve_now(now)?);

    let report = compute_all(&schedule, &basis)?;
    print_report(&report, json)
}

pub async fn report(
    schedule_path: Option<PathBuf>,
    file: PathBuf,
    now: Option<String>,
    json: bool,
) -> Result<()> {
    let schedule = load_schedule(schedule_path)?;
    let content = fs::read_to_string(&file).context("Failed to read report file")?;
    let record = ReportRecord::from_json(&content).context("Failed to parse report JSON")?;

    let basis = match WarrantyBasis::from_report(&record, resolve_now(now)?) {
        Ok(basis) => basis,
        Err(Error::ReportNotCompleted(status)) => {
            if json {
                println!("null");
            } else {
                println!("No active warranty: report status is '{}'.", status);
                println!("\nHint: warranty periods start once the report is completed.");
            }
            return Ok(());
        }
        Err(e) => return Err(e).context(format!("Invalid report in {:?}", file)),
    };

    let report = compute_all(&schedule, &basis)?;
    print_report(&report, json)
}

pub async fn periods(schedule_path: Option<PathBuf>) -> Result<()> {
    let schedule = load_schedule(schedule_path)?;

    println!("{:<16} {:<30} {:<10} {:<20}", "Kind", "Period", "Days", "Starts");
    println!("{:-<16} {:-<30} {:-<10} {:-<20}", "", "", "", "");
    for def in schedule.definitions() {
        let starts = match def.anchor {
            Anchor::Inspection => "at inspection".to_string(),
            Anchor::EndOf { period } => format!("when {} ends", period),
        };
        println!(
            "{:<16} {:<30} {:<10} {:<20}",
            def.kind.as_str(),
            def.kind.label(),
            def.duration_days,
            starts
        );
    }
    Ok(())
}

pub async fn init(out: PathBuf) -> Result<()> {
    if out.exists() {
        anyhow::bail!("Schedule file already exists at {:?}", out);
    }

    let content = Schedule::standard().to_toml_string()?;
    fs::write(&out, content).with_context(|| format!("Failed to write {:?}", out))?;
    println!("Standard schedule written to {:?}.", out);
    println!("\nHint: edit the durations, then pass it with:");
    println!("  warranty --schedule {} status --inspection-date <date>", out.display());
    Ok(())
}
