//! heatctl host binary.
//!
//! Runs the control engine against the simulated plant at the configured
//! scan period, with a stdin console acting as one more external client
//! of the register gateway.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                      │
//! │  SimulatedPlant    LogEventSink   FileStorage   HostClock    │
//! │  (Input+Output)    (EventSink)    (Storage)     (chrono)     │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │        ControlEngine (pure scan logic)                 │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │        ▲ staged writes          │ published image            │
//! │        └────── RegisterGateway ◀┘  ◀── console thread        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `heatctl [config.json]`.  `RUST_LOG` overrides the log filter.

use std::fmt::Write as _;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use heatctl::adapters::log_sink::LogEventSink;
use heatctl::adapters::sim::SimulatedPlant;
use heatctl::adapters::storage::FileStorage;
use heatctl::adapters::time::HostClock;
use heatctl::app::commands::{ClientId, RegisterWrite};
use heatctl::app::service::ControlEngine;
use heatctl::config::PlantConfig;
use heatctl::plant::{PumpId, ReasonCode};
use heatctl::registers::RegisterGateway;
use heatctl::registers::map::HOUR_UNKNOWN;

static GATEWAY: RegisterGateway = RegisterGateway::new();
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

const CONSOLE_SUBMIT_TIMEOUT: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    init_logging();
    info!("heatctl v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let config = load_config(std::env::args().nth(1).as_deref())?;

    // ── 2. Retained state ─────────────────────────────────────
    let mut storage = FileStorage::open(&config.state_dir)
        .with_context(|| format!("opening state directory {}", config.state_dir))?;

    let mut engine = ControlEngine::new(config.clone());
    engine.restore_setpoints(&storage);

    // ── 3. Day clock from local time ──────────────────────────
    let clock = HostClock::new();
    engine.sync_clock_ms(clock.ms_of_day());
    info!("Day clock seeded at {:02}:xx local", clock.current_hour());

    // ── 4. Plant + console ────────────────────────────────────
    let mut plant = SimulatedPlant::new(config.cycle_period_ms);
    let mut sink = LogEventSink::new();

    thread::Builder::new()
        .name("console".into())
        .spawn(console)
        .context("spawning console thread")?;

    engine.start(&mut sink);

    // ── 5. Scan loop ──────────────────────────────────────────
    let period = Duration::from_millis(u64::from(config.cycle_period_ms));
    while !SHUTDOWN.load(Ordering::Relaxed) {
        let started = Instant::now();
        engine.scan(&mut plant, &GATEWAY, &mut sink);
        engine.auto_save_if_needed(&mut storage);

        let elapsed = started.elapsed();
        engine.note_scan_duration(elapsed);
        match period.checked_sub(elapsed) {
            Some(rest) => thread::sleep(rest),
            None => warn!("Scan overran its period ({:?})", elapsed),
        }
    }

    engine
        .force_save_if_dirty(&mut storage)
        .context("saving setpoints on shutdown")?;
    info!(
        "heatctl stopped after {} scans ({} s uptime)",
        engine.cycle_count(),
        clock.uptime_secs()
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&str>) -> Result<PlantConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(PlantConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config = PlantConfig::from_json(&text).with_context(|| format!("loading {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

// ── Console client ────────────────────────────────────────────

const HELP: &str = "commands:
  read <addr> [count]              read registers from the latest image
  write <client> <addr> <value>    stage a write (client: operator|maintenance|aux)
  reset <pump>                     zero a pump's counters (pump: ww|hk|br)
  status                           summary of the latest image
  quit";

fn console() {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            SHUTDOWN.store(true, Ordering::Relaxed);
            break;
        }
        match run_command(line) {
            Ok(out) => println!("{out}"),
            Err(e) => println!("error: {e:#}"),
        }
    }
}

fn run_command(line: &str) -> Result<String> {
    let args: Vec<&str> = line.split_whitespace().collect();
    match args.as_slice() {
        ["read", addr, rest @ ..] => {
            let addr: u16 = addr.parse().context("address")?;
            let count = match rest {
                [] => 1,
                [n] => n.parse().context("count")?,
                _ => bail!("usage: read <addr> [count]"),
            };
            let words = GATEWAY.read_block(addr, count)?;
            Ok(words
                .iter()
                .enumerate()
                .map(|(i, w)| format!("{:>5}: {:>5}  0x{:04x}", usize::from(addr) + i, w, w))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        ["write", client, addr, value] => {
            let client = ClientId::parse(client).context("unknown client")?;
            let addr: u16 = addr.parse().context("address")?;
            let value = parse_word(value)?;
            GATEWAY.submit_with_timeout(
                RegisterWrite::new(client, addr, value),
                CONSOLE_SUBMIT_TIMEOUT,
            )?;
            Ok(format!("staged {addr} = {value}"))
        }
        ["reset", pump] => {
            let pump = PumpId::parse(pump).context("unknown pump")?;
            GATEWAY.request_reset(ClientId::Maintenance, pump)?;
            Ok(format!("reset of {pump} staged"))
        }
        ["status"] => Ok(status_summary()),
        _ => Ok(HELP.to_string()),
    }
}

/// Accept unsigned words and negative values (two's complement).
fn parse_word(s: &str) -> Result<u16> {
    if let Ok(v) = s.parse::<u16>() {
        return Ok(v);
    }
    let v: i16 = s.parse().context("value must fit a 16-bit word")?;
    Ok(v as u16)
}

fn status_summary() -> String {
    let img = GATEWAY.snapshot();
    let status = img.status();
    let hour = match img.measurement[heatctl::registers::map::M_HOUR] {
        HOUR_UNKNOWN => "--".to_string(),
        h => format!("{h:02}"),
    };
    let mut out = format!(
        "scan #{} | hour {} | status 0x{:04x} | outputs 0b{:08b} | uptime {} s",
        img.sequence,
        hour,
        status.word(),
        img.outputs,
        img.uptime_secs()
    );
    for pump in PumpId::ALL {
        let _ = write!(
            out,
            "\n  {:<9} {:<3} {:<16} {:>8.2} h {:>5} starts",
            pump.label(),
            if status.pump_active(pump) { "ON" } else { "OFF" },
            img.reason(pump).unwrap_or(ReasonCode::NoDemand),
            f64::from(img.runtime_centi_hours(pump)) / 100.0,
            img.starts(pump)
        );
    }
    out
}
