//! Batch alert lookup by SAME code
//!
//! Fetches active alerts for each SAME (Specific Area Message Encoding)
//! county code concurrently and prints the most important alert per code.
//! Codes that failed or have nothing active are listed as such.
//!
//! Usage:
//!   cargo run --bin same_code_alerts -- 045019 017143
//!
//! Environment:
//!   WEATHERBOX_CONFIG - path to weatherbox.toml (default ./weatherbox.toml)
//!   RUST_LOG          - log filter (default info)

use env_logger::Env;
use weatherbox::config::load_config;
use weatherbox::WeatherAlertService;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let codes: Vec<String> = std::env::args().skip(1).collect();
    if codes.is_empty() {
        eprintln!("Usage: same_code_alerts <same_code>...");
        std::process::exit(1);
    }

    println!("📡 SAME Code Alert Lookup");
    println!("================================\n");

    let service = WeatherAlertService::new(load_config()?)?;
    let selected = service.get_most_important_alerts(&codes)?;

    let mut with_alert = 0;
    for (code, alert) in &selected {
        match alert {
            Some(alert) => {
                with_alert += 1;
                println!("{}  [{} / {}] {}", code, alert.severity, alert.urgency, alert.event);
                println!("        {}", alert.headline);
            }
            None => println!("{}  no active alert", code),
        }
    }

    println!("\n================================");
    println!("Codes queried:      {}", selected.len());
    println!("Codes with alerts:  {}", with_alert);

    Ok(())
}
