//! WeatherBox - Most important weather alert for a US location
//!
//! Geocodes a city and state, collects the active alerts for the covering
//! forecast zone and county, and prints the single most important one.
//!
//! Usage:
//!   cargo run --release -- <city> <state>      # One lookup, printed to stdout
//!   cargo run --release -- --endpoint 8080     # HTTP endpoint on port 8080
//!
//! Environment:
//!   WEATHERBOX_CONFIG     - path to weatherbox.toml (default ./weatherbox.toml)
//!   WEATHERBOX_USER_AGENT - User-Agent sent to api.weather.gov
//!   RUST_LOG              - log filter (default info)

use env_logger::Env;
use std::env;
use weatherbox::config::load_config;
use weatherbox::{endpoint, WeatherAlert, WeatherAlertService};

const TEXT_PREVIEW_CHARS: usize = 200;

enum Mode {
    Lookup { city: String, state: String },
    Endpoint { port: u16 },
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <city> <state>", program);
    eprintln!("       {} --endpoint PORT", program);
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> Mode {
    let program = args.first().map(String::as_str).unwrap_or("weatherbox");

    match args.get(1).map(String::as_str) {
        Some("--endpoint") => match args.get(2).and_then(|p| p.parse().ok()) {
            Some(port) if args.len() == 3 => Mode::Endpoint { port },
            _ => {
                eprintln!("Error: --endpoint requires a port number");
                usage(program);
            }
        },
        Some(_) if args.len() == 3 => Mode::Lookup {
            city: args[1].clone(),
            state: args[2].clone(),
        },
        _ => usage(program),
    }
}

/// First `max` characters, with `...` appended when anything was cut.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn print_alert(alert: &WeatherAlert) {
    println!("Alert:        {}", alert.headline);
    println!("Event:        {}", alert.event);
    println!("Severity:     {}", alert.severity);
    println!("Urgency:      {}", alert.urgency);
    match alert.expires {
        Some(expires) => println!("Expires:      {}", expires.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Expires:      (not given)"),
    }
    println!("Description:  {}", truncate(&alert.description, TEXT_PREVIEW_CHARS));
    if !alert.instruction.is_empty() {
        println!("Instructions: {}", truncate(&alert.instruction, TEXT_PREVIEW_CHARS));
    }
}

fn run_lookup(service: &WeatherAlertService, city: &str, state: &str) -> Result<(), weatherbox::AlertError> {
    let coordinates = service.get_coordinates(city, state)?;
    let alert = service.get_most_important_alert_for_coordinates(&coordinates)?;

    println!("\n=== Weather Alerts ===");
    println!("Location:     {}, {}", city, state);
    println!("Coordinates:  {}", coordinates);
    println!();

    match alert {
        Some(alert) => print_alert(&alert),
        None => println!("No active alerts for this area."),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mode = parse_args(&args);

    let config = load_config().unwrap_or_else(|e| {
        eprintln!("❌ Configuration error: {}", e);
        std::process::exit(1);
    });

    let service = WeatherAlertService::new(config).unwrap_or_else(|e| {
        eprintln!("❌ Failed to initialize service: {}", e);
        std::process::exit(1);
    });

    match mode {
        Mode::Lookup { city, state } => {
            if let Err(e) = run_lookup(&service, &city, &state) {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
        Mode::Endpoint { port } => {
            println!("🚀 Starting HTTP endpoint server...");
            if let Err(e) = endpoint::start_endpoint_server(port, service) {
                eprintln!("❌ Endpoint server error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
