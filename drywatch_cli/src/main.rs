use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

mod cli;
mod error_fmt;
mod sim;
mod sink;

use cli::{Cli, Commands};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    // Config first; logging setup depends on it.
    let cfg = if args.config.exists() {
        drywatch_config::load_path(&args.config)?
    } else {
        drywatch_config::Config::default()
    };
    cfg.validate().wrap_err("validating config")?;

    init_logging(&args, &cfg)?;
    if !args.config.exists() {
        tracing::warn!(path = %args.config.display(), "config file not found, using defaults");
    }

    // Ctrl-C requests a graceful stop of the polling loop.
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_flag.store(true, Ordering::Relaxed);
    })
    .wrap_err("installing ctrl-c handler")?;

    let result = match args.cmd {
        Commands::Watch => run_watch(&cfg, args.json, shutdown),
        Commands::Simulate {
            frames,
            interval_ms,
            error,
        } => sim::run_simulation(&cfg, args.json, frames, interval_ms, error, shutdown),
    };

    if let Err(err) = result {
        tracing::error!("{}", error_fmt::humanize(&err));
        return Err(err);
    }
    Ok(())
}

/// Console logging to stderr (stdout carries JSONL publications), or a file
/// when the config asks for one.
fn init_logging(args: &Cli, cfg: &drywatch_config::Config) -> eyre::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = args
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(file) = &cfg.logging.file {
        let path = std::path::Path::new(file);
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let name = path.file_name().unwrap_or_else(|| "drywatch.log".as_ref());
        let appender = match cfg.logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = cli::FILE_GUARD.set(guard);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[cfg(feature = "hardware")]
fn run_watch(
    cfg: &drywatch_config::Config,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    use std::time::Duration;

    use drywatch_core::{EdgePump, SnifferBuilder};
    use drywatch_hardware::GpioProbe;

    let probe = GpioProbe::new(cfg.pins.scl, cfg.pins.sda, cfg.pins.pullup)
        .wrap_err("attaching gpio probe")?;

    let (mut sniffer, capture) = SnifferBuilder::new()
        .with_sink(sink::make_sink(json))
        .with_config(cfg)
        .build()
        .wrap_err("building sniffer")?;

    let _pump = EdgePump::spawn(probe, capture, Duration::from_millis(5));

    tracing::info!(
        scl = cfg.pins.scl,
        sda = cfg.pins.sda,
        "monitoring bus, ctrl-c to stop"
    );
    while !shutdown.load(Ordering::Relaxed) {
        sniffer.poll();
        std::thread::sleep(Duration::from_millis(1));
    }

    let stats = sniffer.stats();
    if cfg.diagnostics.statistics {
        tracing::info!(
            valid = stats.valid_frames,
            invalid = stats.invalid_frames,
            dropped_bytes = stats.dropped_bytes,
            "monitor stopped"
        );
    }
    Ok(())
}

#[cfg(not(feature = "hardware"))]
fn run_watch(
    _cfg: &drywatch_config::Config,
    _json: bool,
    _shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    eyre::bail!("no gpio support in this build; rebuild with --features hardware or use `simulate`")
}
