//! `proxguard-cli` – ProxGuard command line interface
//!
//! This binary is the entry point for a ProxGuard sensor node.  It:
//!
//! 1. Loads `~/.proxguard/config.toml` (or `--config`), writing defaults on
//!    first run.
//! 2. Picks a sensor source: a recorded `--scenario` file or the built-in
//!    `--simulate` approach.
//! 3. Runs the fusion loop, posting every event to the signing service (or
//!    only logging it with `--dry-run`), and prints one status line per tick.
//! 4. Intercepts **Ctrl-C** to finish the current tick and exit cleanly.

mod config;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use colored::{ColoredString, Colorize};
use tracing::{info, warn};

use proxguard_hal::{RangeSensor, Scenario, SimApproach, VisionSensor};
use proxguard_runtime::{EventSink, HttpSink, LogSink, SensorLoop, TickReport, init_tracing};
use proxguard_types::EventType;

/// Ticks generated for `--simulate` when `--ticks` is not given.
const DEFAULT_SIM_TICKS: u64 = 24;

/// ProxGuard: fused ultrasonic + camera proximity alerts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file (default: ~/.proxguard/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a recorded scenario TOML file.
    #[arg(short, long, conflicts_with = "simulate")]
    scenario: Option<PathBuf>,

    /// Drive the loop with a synthetic approaching object.
    #[arg(long, default_value_t = false)]
    simulate: bool,

    /// Stop after this many ticks.
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Log events instead of posting them to the signer.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let telemetry = init_tracing("proxguard");

    print_banner();
    if telemetry.is_exporting() {
        println!("  {} spans to the OTLP collector", "Exporting".green());
    }

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after this tick …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will terminate immediately");
    }

    match run(&cli, &shutdown) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, shutdown: &AtomicBool) -> Result<(), String> {
    // ── Configuration ─────────────────────────────────────────────────────
    let path = cli.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_or_init(&path)?;
    cfg.validate()?;
    println!("  Config loaded from {}", path.display().to_string().bold());

    // ── Sensor source ─────────────────────────────────────────────────────
    let (range, camera, max_ticks) = sensors(cli)?;

    // ── Event sink ────────────────────────────────────────────────────────
    let sink: Box<dyn EventSink> = if cli.dry_run {
        println!("  Dry run: events are logged, not sent.");
        Box::new(LogSink)
    } else {
        let timeout = Duration::from_millis(cfg.send_timeout_ms);
        let sink = HttpSink::new(cfg.signer_url.clone(), timeout).map_err(|e| e.to_string())?;
        println!("  Posting to {}", sink.url().bold());
        Box::new(sink)
    };

    println!("  Sensor id {}", cfg.sensor_id.bold());
    println!("{}", "-".repeat(60).dimmed());

    let mut sensor_loop = SensorLoop::new(&cfg.fusion, cfg.sensor_id.clone(), range, camera, sink);
    info!(
        sensor_id = %cfg.sensor_id,
        sink = sensor_loop.sink_name(),
        interval_s = cfg.fusion.loop_interval_s,
        "sensor loop starting"
    );

    let mut tally: BTreeMap<EventType, u64> = BTreeMap::new();
    let mut dropped = 0u64;
    let ticks = sensor_loop.run(shutdown, max_ticks, |report| {
        print_report(report);
        *tally.entry(report.event.event_type).or_default() += 1;
        if !report.delivered {
            dropped += 1;
        }
    });

    print_summary(ticks, &tally, dropped);
    Ok(())
}

type Sensors = (Box<dyn RangeSensor>, Box<dyn VisionSensor>, Option<u64>);

/// Resolve the sensor pair and the tick limit from the command line.
fn sensors(cli: &Cli) -> Result<Sensors, String> {
    if let Some(path) = &cli.scenario {
        let scenario = Scenario::load(path).map_err(|e| e.to_string())?;
        if scenario.is_empty() {
            return Err(format!("scenario {} has no ticks", path.display()));
        }
        let limit = cli.ticks.unwrap_or(scenario.len() as u64);
        println!(
            "  Replaying {} ({} ticks)",
            path.display().to_string().bold(),
            scenario.len()
        );
        let (range, camera) = scenario.into_sensors();
        return Ok((Box::new(range), Box::new(camera), Some(limit)));
    }

    if cli.simulate {
        let limit = cli.ticks.unwrap_or(DEFAULT_SIM_TICKS);
        let length = usize::try_from(limit).map_err(|_| "tick count too large".to_string())?;
        println!("  Simulating an approaching object ({limit} ticks)");
        let (range, camera) = SimApproach::default().into_sensors(length);
        return Ok((Box::new(range), Box::new(camera), Some(limit)));
    }

    Err("no sensor source; pass --scenario <FILE> or --simulate".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Console output
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-width tag shown in front of each tick line.
fn marker_label(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Normal => "          ",
        EventType::MotionDetected => " MOTION   ",
        EventType::ObjectApproaching => " APPROACH ",
        EventType::DistanceAlert => " DISTANCE ",
        EventType::CollisionWarning => "!COLLISION!",
    }
}

fn marker(event_type: EventType) -> ColoredString {
    let label = marker_label(event_type);
    match event_type {
        EventType::Normal => label.normal(),
        EventType::MotionDetected => label.cyan(),
        EventType::ObjectApproaching => label.yellow(),
        EventType::DistanceAlert => label.yellow().bold(),
        EventType::CollisionWarning => label.red().bold(),
    }
}

fn status_line(report: &TickReport) -> String {
    let p = &report.event.payload;
    let severity = p
        .severity
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "dist={:>6.1}cm | vel={:>7.1} cm/s | cam_approach={:>5} | correlated={:>5} | severity={:<8} | {}",
        p.distance_cm,
        p.velocity_cm_s,
        p.camera_approaching,
        p.correlated,
        severity,
        report.event.event_type
    )
}

fn print_report(report: &TickReport) {
    println!("[{}] {}", marker(report.event.event_type), status_line(report));
    for reason in report
        .event
        .payload
        .reasons
        .iter()
        .chain(report.tracker.reasons().iter())
    {
        println!("            └─ {}", reason.dimmed());
    }
}

fn print_summary(ticks: u64, tally: &BTreeMap<EventType, u64>, dropped: u64) {
    println!("{}", "-".repeat(60).dimmed());
    println!("  {} ticks", ticks.to_string().bold());
    for (event_type, count) in tally {
        println!("    {:<20} {}", event_type.as_str(), count);
    }
    if dropped > 0 {
        println!("  {} {} event(s) not delivered", "⚠".yellow(), dropped);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___                ___                     _ "#.bold().cyan());
    println!("{}", r#"  / _ \_ _ _____ __  / __|_  _ __ _ _ _ __| |"#.bold().cyan());
    println!("{}", r#" |  _/ '_/ _ \ \ / | (_ | || / _` | '_/ _` |"#.bold().cyan());
    println!("{}", r#" |_| |_| \___/_\_\  \___|\_,_\__,_|_| \__,_|"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "ProxGuard".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Fused proximity alerts");
    println!();
}
