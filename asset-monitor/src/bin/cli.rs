//! Command-line interface for the asset monitor.
//!
//! Queries a running daemon through its HTTP API.

use std::env;

use anyhow::{Context, Result};

use asset_monitor::api_client;

const DEFAULT_ALERT_LIMIT: usize = 20;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: asset-monitor-cli <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status           Show monitor status");
        eprintln!("  alerts [limit]   Show the most recent alerts");
        eprintln!();
        eprintln!("Environment:");
        eprintln!(
            "  ASSET_MONITOR_API_URL    API base URL (default: {})",
            api_client::DEFAULT_BASE_URL
        );
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status().await?,
        "alerts" => {
            let limit = match args.get(2) {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid limit: {raw}"))?,
                None => DEFAULT_ALERT_LIMIT,
            };
            cmd_alerts(limit).await?
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring ASSET_MONITOR_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("ASSET_MONITOR_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

/// Print a summary of the monitor state.
async fn cmd_status() -> Result<()> {
    let client = make_client();
    let status = client.get_status().await?;

    println!("Alerts:     {}", if status.alerts_enabled { "enabled" } else { "disabled" });
    println!("Interval:   {} s", status.read_interval_seconds);
    println!("Debounce:   {} s", status.debounce_seconds);
    println!(
        "Thresholds: temp {:.2}C, pressure {:.2}bar, vibration {:.2}mm/s",
        status.thresholds.temperature_celsius,
        status.thresholds.pressure_bar,
        status.thresholds.vibration_mm_s
    );
    println!("Cycles:     {}", status.cycles);
    println!(
        "Outcomes:   {} triggered, {} suppressed, {} invalid, {} errors",
        status.alerts_triggered, status.alerts_suppressed, status.invalid_readings, status.errors
    );

    match status.last_reading {
        Some(r) => println!(
            "Last read:  temp {:.2}C, pressure {:.2}bar, vibration {:.2}mm/s",
            r.temperature_celsius, r.pressure_bar, r.vibration_mm_s
        ),
        None => println!("Last read:  (none)"),
    }

    match status.last_alert_at {
        Some(at) => println!("Last alert: {:.3}", at),
        None => println!("Last alert: (none)"),
    }

    Ok(())
}

/// Print recent alerts, oldest first.
async fn cmd_alerts(limit: usize) -> Result<()> {
    let client = make_client();
    let alerts = client.get_alerts(limit).await?;

    if alerts.is_empty() {
        println!("No alerts recorded.");
        return Ok(());
    }

    for alert in &alerts {
        println!("{:.3}  {}", alert.triggered_at, alert.message);
    }

    Ok(())
}
