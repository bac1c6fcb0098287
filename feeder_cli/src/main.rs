//! Feeder control application: wires the controller to real pins or
//! the simulated rig and drives it from a 10 ms poll loop, with stdin
//! commands and JSONL telemetry.

mod bridge;
mod cli;
mod output;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};

use bridge::Command;
use feeder_core::{FeedCfg, Feeder, StateReport};
use feeder_traits::{Adc, Clock, LimitSwitch, MonotonicClock, Motor};

const POLL_MS: u64 = 10;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = cli::Args::parse();

    let config = load_config(&args.config)?;
    init_logging(&args, &config)?;

    run(&args, &config)
}

fn load_config(path: &Path) -> Result<feeder_config::Config> {
    if !path.exists() {
        return Ok(feeder_config::Config::default());
    }
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let config = feeder_config::load_toml(&text)
        .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Console logging goes to stderr (stdout carries telemetry and status
/// screens); an optional JSON-lines file sink comes from the config.
fn init_logging(args: &cli::Args, config: &feeder_config::Config) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter).with(console);

    if let Some(file) = config.logging.file.as_deref() {
        let path = Path::new(file);
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .map_or_else(|| "feeder.log".into(), std::ffi::OsStr::to_os_string);
        let appender = match config.logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = cli::FILE_GUARD.set(guard);
        registry.with(fmt::layer().json().with_writer(writer)).init();
    } else {
        registry.init();
    }
    Ok(())
}

#[cfg(not(feature = "hardware"))]
fn run(args: &cli::Args, config: &feeder_config::Config) -> Result<()> {
    let rig = feeder_hardware::SimRig::new(1_500.0, 0.0);
    tracing::info!("running against the simulated rig");
    let feeder = build_feeder(args, config, rig.adc(), rig.motor(), rig.limit_switch())?;
    poll_loop(args, feeder, move || rig.tick(POLL_MS))
}

#[cfg(feature = "hardware")]
fn run(args: &cli::Args, config: &feeder_config::Config) -> Result<()> {
    let adc = feeder_hardware::hx711::Hx711::open(config.pins.adc_dt, config.pins.adc_sck)?;
    let motor = feeder_hardware::gpio::GpioMotor::open(config.pins.motor)?;
    let switch = feeder_hardware::gpio::GpioSwitch::open(config.pins.limit_switch)?;
    tracing::info!(
        adc_dt = config.pins.adc_dt,
        adc_sck = config.pins.adc_sck,
        motor = config.pins.motor,
        limit_switch = config.pins.limit_switch,
        "pins claimed"
    );
    let feeder = build_feeder(args, config, adc, motor, switch)?;
    poll_loop(args, feeder, || {})
}

fn build_feeder<A: Adc, M: Motor, L: LimitSwitch>(
    args: &cli::Args,
    config: &feeder_config::Config,
    adc: A,
    motor: M,
    limit: L,
) -> Result<Feeder<A, M, L>> {
    let mut feed_cfg = if args.debug {
        FeedCfg::debug()
    } else {
        FeedCfg::default()
    };
    if !args.debug {
        feed_cfg.cooldown_ms = config.feeding.cooldown_ms;
    }
    feed_cfg.deficit_threshold_mg = config.feeding.deficit_threshold_mg;

    Feeder::builder()
        .with_adc(adc)
        .with_motor(motor)
        .with_limit_switch(limit)
        .with_calibration(config.calibration.into())
        .with_grams_per_day(config.feeding.grams_per_day)
        .with_feed_cfg(feed_cfg)
        .build()
}

fn poll_loop<A: Adc, M: Motor, L: LimitSwitch>(
    args: &cli::Args,
    mut feeder: Feeder<A, M, L>,
    mut advance_sim: impl FnMut(),
) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
            .wrap_err("failed to install signal handler")?;
    }
    let commands = bridge::spawn_stdin_bridge();
    let clock = MonotonicClock::new();
    let start = clock.now();
    let mut last_report = StateReport::default();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("interrupted; shutting down");
            break;
        }
        if let Some(limit_ms) = args.duration_ms
            && clock.ms_since(start) >= limit_ms
        {
            break;
        }

        let mut quit = false;
        while let Ok(cmd) = commands.try_recv() {
            tracing::info!(?cmd, "command");
            match cmd {
                Command::Feed => feeder.feed(),
                Command::Reset => feeder.reset(),
                Command::Maintenance => feeder.enter_maintenance(),
                Command::TareReservoir => feeder.tare_reservoir(),
                Command::TareBowl => feeder.tare_bowl(),
                Command::AdjustDeficit(mg) => feeder.adjust_deficit(mg),
                Command::SetRate(g) => feeder.set_grams_per_day(g),
                Command::Status => {
                    output::print_report(&feeder.state_report(), &feeder.error_report());
                }
                Command::Quit => quit = true,
            }
        }
        if quit {
            break;
        }

        feeder.update()?;
        advance_sim();

        output::emit_telemetry(feeder.telemetry_mut(), args.json);
        if !args.json {
            let report = feeder.state_report();
            if report != last_report {
                output::print_report(&report, &feeder.error_report());
                last_report = report;
            }
        }

        clock.sleep(Duration::from_millis(POLL_MS));
    }

    feeder.halt()
}
