//! Command-line interface for radeon-adl

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use radeon_adl::controller::Gamma;
use radeon_adl::ffi::{AdlFunctions, ADL_DISPLAY_SLSMAPCONFIG_GET_OPTION_RELATIVETO_LANDSCAPE};
use radeon_adl::monitor::{Monitor, MonitorConfig, Outcome, TerminalBell};
use radeon_adl::overdrive::TemperatureKind;
use radeon_adl::powerxpress::PxGpu;
use radeon_adl::{Adl, AdlConfig, AdlLibrary};

#[derive(Parser)]
#[command(name = "radeonctl")]
#[command(version = radeon_adl::VERSION)]
#[command(about = "Query and tune AMD Radeon GPUs through the AMD Display Library", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// ADL shared library to load instead of the platform default
    #[arg(long, global = true, env = "ADL_LIBRARY_PATH")]
    library: Option<PathBuf>,

    /// Include adapters that are not currently connected
    #[arg(long, global = true)]
    all_adapters: bool,

    /// Log verbosity
    #[arg(short, long, global = true, value_enum, default_value_t = Verbosity::Normal)]
    verbosity: Verbosity,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary of every active AMD GPU
    Info,

    /// List adapter entries reported by the driver
    Adapters,

    /// Read PMLog sensors
    Sensors {
        /// Adapter index (all active adapters if not specified)
        #[arg(short, long)]
        adapter: Option<i32>,
    },

    /// Watch fan sensors and reset stalled fan control
    Monitor {
        /// Seconds between checks
        #[arg(short, long, default_value_t = 2)]
        interval: u64,

        /// Stop after this many checks
        #[arg(short, long)]
        samples: Option<u32>,

        /// Fan reading treated as a stall
        #[arg(long, default_value_t = radeon_adl::monitor::STALLED_FAN_RPM)]
        stall_rpm: i32,

        /// Export collected reports to a JSON file on exit
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Do not ring the terminal bell when a fan stays stalled
        #[arg(long)]
        no_alert: bool,
    },

    /// Show or set controller gamma
    Gamma {
        #[arg(short, long, default_value_t = 0)]
        adapter: i32,

        #[arg(short, long, default_value_t = 0)]
        controller: i32,

        /// New gamma as `r,g,b` or a single value for all channels
        #[arg(long)]
        set: Option<String>,
    },

    /// Display maps, targets and modes
    Displays {
        #[arg(short, long, default_value_t = 0)]
        adapter: i32,
    },

    /// Eyefinity (SLS) configurations
    Sls {
        #[arg(short, long, default_value_t = 0)]
        adapter: i32,
    },

    /// OverdriveN state
    Overdrive {
        #[arg(short, long, default_value_t = 0)]
        adapter: i32,

        /// Return fan control to driver defaults
        #[arg(long)]
        reset_fan: bool,
    },

    /// Switchable graphics
    Powerxpress {
        #[arg(short, long, default_value_t = 0)]
        adapter: i32,

        /// Switch to `integrated` or `discrete`
        #[arg(long)]
        switch: Option<PxGpu>,
    },

    /// Radeon USB LED bar
    Led {
        #[arg(short, long, default_value_t = 0)]
        adapter: i32,

        /// Persist the current LED configuration
        #[arg(long)]
        save: bool,
    },

    /// Workstation features (ECC, SDI, stereo, GL-Sync)
    Workstation {
        #[arg(short, long, default_value_t = 0)]
        adapter: i32,
    },

    /// Entry points exported by the loaded driver
    Symbols {
        /// Only list entry points the driver lacks
        #[arg(long)]
        missing: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Minimal,
    Normal,
    Detailed,
    Debug,
}

impl Verbosity {
    fn filter(self) -> &'static str {
        match self {
            Verbosity::Minimal => "error",
            Verbosity::Normal => "warn",
            Verbosity::Detailed => "info",
            Verbosity::Debug => "debug",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.verbosity.filter()))
        .init();

    let config = config(&cli);
    match &cli.command {
        Commands::Version => {
            println!("radeonctl v{}", radeon_adl::version());
            println!("Bindings for the AMD Display Library");
            match radeon_adl::find_library(&config) {
                Some(path) => println!("Driver library: {}", path.display()),
                None => println!("Driver library: not found"),
            }
        }

        Commands::Symbols { missing } => {
            let library = AdlLibrary::open(&config)?;
            symbols(&cli, library.functions(), *missing)?;
        }

        Commands::Info => {
            let adl = Adl::open(&config)?;
            let gpus = radeon_adl::collect_gpu_info(&adl)?;
            if gpus.is_empty() {
                bail!("no active AMD adapter found");
            }
            emit(cli.format, &gpus, |gpus| {
                for gpu in gpus {
                    println!("GPU {}: {}", gpu.index, gpu.name);
                    println!("  UDID:    {} (bus {})", gpu.udid, gpu.bus);
                    if !gpu.asic_family.is_empty() {
                        println!("  Family:  {}", gpu.asic_family.join(", "));
                    }
                    if let Some(driver) = &gpu.driver_version {
                        println!("  Driver:  {}", driver);
                    }
                    if let Some(software) = &gpu.software_version {
                        println!("  Software: {}", software);
                    }
                    if let Some(memory) = &gpu.memory {
                        println!(
                            "  Memory:  {} MiB {}",
                            memory.size_bytes / (1024 * 1024),
                            memory.memory_type
                        );
                    }
                    if let Some(clocks) = &gpu.clocks {
                        println!("  Clocks:  core {} MHz, memory {} MHz", clocks.core_mhz, clocks.memory_mhz);
                    }
                    for reading in &gpu.sensors {
                        println!("  {}", reading);
                    }
                }
            })?;
        }

        Commands::Adapters => {
            let adl = Adl::open(&config)?;
            let adapters = adl.adapter_infos()?;
            emit(cli.format, &adapters, |adapters| {
                for adapter in adapters {
                    let active = adl.is_active(adapter.index).unwrap_or(false);
                    println!(
                        "[{:>2}] {} {} bus {} {}",
                        adapter.index,
                        if active { "*" } else { " " },
                        adapter.name,
                        adapter.bus,
                        adapter.udid
                    );
                }
            })?;
        }

        Commands::Sensors { adapter } => {
            let adl = Adl::open(&config)?;
            let indexes = match adapter {
                Some(index) => vec![adl.adapter(*index)?.index],
                None => adl.active_amd_adapters()?.iter().map(|a| a.index).collect(),
            };
            let mut all = Vec::new();
            for index in indexes {
                let snapshot = adl
                    .pmlog_snapshot(index)
                    .with_context(|| format!("reading sensors of adapter {index}"))?;
                all.push((index, snapshot.readings()));
            }
            emit(cli.format, &all, |all| {
                for (index, readings) in all {
                    println!("Adapter {}:", index);
                    for reading in readings {
                        println!("  {}", reading);
                    }
                }
            })?;
        }

        Commands::Monitor { interval, samples, stall_rpm, json_output, no_alert } => {
            let adl = Adl::open(&config)?;
            let config = MonitorConfig {
                interval: Duration::from_secs(*interval),
                stall_rpm: *stall_rpm,
                samples: *samples,
                ..MonitorConfig::default()
            };
            let interrupted = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&interrupted);
            ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
                .context("installing the Ctrl-C handler")?;

            let format = cli.format;
            let mut monitor = Monitor::new(adl, config);
            if !*no_alert {
                monitor = monitor.with_alert(TerminalBell);
            }
            monitor.run(|report| {
                match format {
                    OutputFormat::Json => {
                        if let Ok(line) = serde_json::to_string(report) {
                            println!("{}", line);
                        }
                    }
                    OutputFormat::Text => {
                        for entry in &report.adapters {
                            let sample = entry
                                .sample
                                .map(|s| s.to_string())
                                .unwrap_or_else(|| "no reading".to_string());
                            let note = match &entry.outcome {
                                Outcome::Healthy => String::new(),
                                Outcome::Recovered => " (fan control reset)".to_string(),
                                Outcome::StillStalled => " STALLED".to_string(),
                                Outcome::Failed(reason) => format!(" ({reason})"),
                            };
                            println!(
                                "{} adapter {}: {}{}",
                                report.timestamp.format("%H:%M:%S"),
                                entry.adapter,
                                sample,
                                note
                            );
                        }
                    }
                }
                interrupted.load(Ordering::SeqCst)
            })?;
            if interrupted.load(Ordering::SeqCst) {
                log::info!("Exiting!");
            }
            if let Some(path) = json_output {
                monitor.export_json(path)?;
                println!("Reports exported to: {}", path.display());
            }
        }

        Commands::Gamma { adapter, controller, set } => {
            let adl = Adl::open(&config)?;
            if let Some(value) = set {
                let gamma = parse_gamma(value)?;
                adl.set_gamma(*adapter, *controller, gamma)?;
            }
            let range = adl.gamma(*adapter, *controller)?;
            emit(cli.format, &range, |range| {
                let show = |label: &str, g: &Gamma| {
                    println!("{:<8} r {:.2}  g {:.2}  b {:.2}", label, g.red, g.green, g.blue)
                };
                show("current", &range.current);
                show("default", &range.default);
                show("min", &range.min);
                show("max", &range.max);
            })?;
        }

        Commands::Displays { adapter } => {
            let adl = Adl::open(&config)?;
            let maps = adl.display_map_config(*adapter, 0)?;
            emit(cli.format, &maps, |maps| {
                for map in &maps.maps {
                    println!(
                        "Map {}: {}x{} @ {:.2} Hz",
                        map.index, map.mode.width, map.mode.height, map.mode.refresh_rate
                    );
                    for target in maps.targets_for(map) {
                        println!(
                            "  display {} (adapter {})",
                            target.display.logical_index, target.display.logical_adapter
                        );
                    }
                }
            })?;
        }

        Commands::Sls { adapter } => {
            let adl = Adl::open(&config)?;
            let mut maps = Vec::new();
            for index in adl.sls_map_indexes(*adapter, 0)? {
                maps.push(adl.sls_map(
                    *adapter,
                    index,
                    ADL_DISPLAY_SLSMAPCONFIG_GET_OPTION_RELATIVETO_LANDSCAPE,
                )?);
            }
            emit(cli.format, &maps, |maps| {
                if maps.is_empty() {
                    println!("No SLS configuration");
                }
                for map in maps {
                    println!(
                        "SLS {}: {}x{} grid, {} displays, {}",
                        map.index,
                        map.grid.columns,
                        map.grid.rows,
                        map.targets.len(),
                        if map.value & 1 != 0 { "active" } else { "inactive" }
                    );
                }
            })?;
        }

        Commands::Overdrive { adapter, reset_fan } => {
            let adl = Adl::open(&config)?;
            if *reset_fan {
                adl.reset_fan_control(*adapter)?;
                println!("Fan control reset to defaults");
            }
            let report = OverdriveReport {
                caps: adl.overdrive_caps(*adapter)?,
                odn: adl.odn_capabilities(*adapter).ok(),
                fan: adl.fan_control(*adapter).ok(),
                power: adl.power_limit(*adapter).ok(),
                core_temperature: adl.temperature(*adapter, TemperatureKind::Core).ok(),
                hotspot_temperature: adl.temperature(*adapter, TemperatureKind::Hotspot).ok(),
            };
            emit(cli.format, &report, |report| {
                println!(
                    "Overdrive {}: {}",
                    report.caps.version,
                    if report.caps.enabled { "enabled" } else { "disabled" }
                );
                if let Some(odn) = &report.odn {
                    println!(
                        "  Engine clock: {}-{} MHz",
                        odn.engine_clock.min / 100,
                        odn.engine_clock.max / 100
                    );
                }
                if let Some(fan) = &report.fan {
                    println!("  Fan: {} (target {})", fan.current_speed, fan.target_speed);
                }
                if let Some(power) = &report.power {
                    println!("  Power limit: {:+}%", power.tdp_limit);
                }
                if let Some(temp) = report.core_temperature {
                    println!("  Core: {:.1} \u{00b0}C", temp);
                }
                if let Some(temp) = report.hotspot_temperature {
                    println!("  Hotspot: {:.1} \u{00b0}C", temp);
                }
            })?;
        }

        Commands::Powerxpress { adapter, switch } => {
            let adl = Adl::open(&config)?;
            if let Some(gpu) = switch {
                let result = adl.set_active_gpu(*adapter, *gpu)?;
                println!("Switch to {}: {:?}", gpu, result);
            }
            let version = adl.powerxpress_version(*adapter)?;
            let active = adl.active_gpu(*adapter)?;
            let auto = adl.auto_switch_config(*adapter).ok();
            emit(cli.format, &(version, active, auto), |(version, active, auto)| {
                println!("PowerXpress {}", version);
                println!("Active GPU: {}", active);
                if let Some(auto) = auto {
                    println!(
                        "Auto switch: AC->DC {}, DC->AC {}",
                        auto.on_ac_to_dc, auto.on_dc_to_ac
                    );
                }
            })?;
        }

        Commands::Led { adapter, save } => {
            let adl = Adl::open(&config)?;
            if !adl.usb_led_supported(*adapter)? {
                bail!("adapter {adapter} has no USB LED bar");
            }
            if *save {
                adl.save_usb_led(*adapter)?;
            }
            let controls = adl.usb_led_controls(*adapter)?;
            emit(cli.format, &controls.names(), |names| {
                println!("Supported LED controls: {}", names.join(", "));
            })?;
        }

        Commands::Workstation { adapter } => {
            let adl = Adl::open(&config)?;
            let connectors = adl.glsync_connector_count(*adapter).unwrap_or(0);
            let report = WorkstationReport {
                caps: adl.workstation_caps(*adapter)?,
                ecc: adl.ecc_state(*adapter).ok(),
                ecc_errors: adl.ecc_data(*adapter).ok(),
                sdi: adl.sdi_supported(*adapter).ok(),
                stereo: adl.stereo(*adapter).ok(),
                glsync_modules: (0..connectors)
                    .filter_map(|c| adl.glsync_module(*adapter, c).ok())
                    .filter(|m| m.is_present())
                    .collect(),
            };
            emit(cli.format, &report, |report| {
                println!("Capabilities: {:#x} (valid {:#x})", report.caps.caps, report.caps.valid);
                if let Some(ecc) = &report.ecc {
                    println!(
                        "ECC: {}{}",
                        ecc.current,
                        if ecc.is_pending() { format!(" ({} after reboot)", ecc.desired) } else { String::new() }
                    );
                }
                if let Some(errors) = &report.ecc_errors {
                    println!(
                        "ECC errors: {} corrected, {} uncorrected",
                        errors.single_bit_errors, errors.double_bit_errors
                    );
                }
                if let Some(sdi) = report.sdi {
                    println!("SDI: {}", if sdi { "supported" } else { "not supported" });
                }
                for module in &report.glsync_modules {
                    println!("GL-Sync module {:#x} on port {}", module.module_id, module.gpu_port);
                }
            })?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct OverdriveReport {
    caps: radeon_adl::overdrive::OverdriveCaps,
    odn: Option<radeon_adl::overdrive::OdnCapabilities>,
    fan: Option<radeon_adl::overdrive::FanControl>,
    power: Option<radeon_adl::overdrive::PowerLimit>,
    core_temperature: Option<f64>,
    hotspot_temperature: Option<f64>,
}

#[derive(Serialize)]
struct WorkstationReport {
    caps: radeon_adl::workstation::WorkstationCaps,
    ecc: Option<radeon_adl::workstation::EccState>,
    ecc_errors: Option<radeon_adl::workstation::EccData>,
    sdi: Option<bool>,
    stereo: Option<radeon_adl::workstation::StereoState>,
    glsync_modules: Vec<radeon_adl::workstation::GlSyncModule>,
}

fn config(cli: &Cli) -> AdlConfig {
    let config = if cli.all_adapters {
        AdlConfig::all_adapters()
    } else {
        AdlConfig::from_env()
    };
    match &cli.library {
        Some(path) => config.with_library(path),
        None => config,
    }
}

fn symbols(cli: &Cli, functions: &AdlFunctions, missing: bool) -> Result<()> {
    let names: Vec<&str> = AdlFunctions::NAMES
        .iter()
        .copied()
        .filter(|name| functions.has(name) != missing)
        .collect();
    emit(cli.format, &names, |names| {
        for name in names {
            println!("{}", name);
        }
        println!(
            "\n{} of {} entry points resolved",
            functions.resolved_names().len(),
            AdlFunctions::NAMES.len()
        );
    })
}

fn parse_gamma(value: &str) -> Result<Gamma> {
    let channels = value
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid gamma '{value}'"))?;
    match channels.as_slice() {
        [all] => Ok(Gamma::uniform(*all)),
        [red, green, blue] => Ok(Gamma { red: *red, green: *green, blue: *blue }),
        _ => bail!("gamma needs one value or three comma-separated values"),
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    match format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
