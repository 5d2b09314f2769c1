//! Watch fan sensors for a minute and reset stalled fan control

use std::time::Duration;

use radeon_adl::monitor::{Monitor, MonitorConfig, TerminalBell};
use radeon_adl::Adl;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let adl = Adl::open_default()?;
    let config = MonitorConfig::default()
        .with_interval(Duration::from_secs(2))
        .with_samples(30);

    let mut monitor = Monitor::new(adl, config).with_alert(TerminalBell);
    monitor.run(|report| {
        for entry in &report.adapters {
            if let Some(sample) = entry.sample {
                println!("adapter {}: {} ({:?})", entry.adapter, sample, entry.outcome);
            }
        }
        report.has_stalled()
    })?;

    monitor.export_json("fan_watchdog.json")?;
    println!("Reports written to fan_watchdog.json");
    Ok(())
}
