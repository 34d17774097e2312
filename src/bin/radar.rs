use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use pcl_radar::config::{Config, Mode};
use pcl_radar::coordinator::Coordinator;

/// Passive coherent-location radar signal-processing pipeline.
#[derive(Parser, Debug)]
#[command(name = "pcl-radar", version, about)]
struct Args {
    /// Path to a JSON configuration file. Falls back to built-in defaults.
    #[arg(long, env = "PCL_RADAR_CONFIG")]
    config: Option<PathBuf>,

    /// Override `mode` from the config file.
    #[arg(long, value_enum)]
    mode: Option<ArgMode>,

    /// Override `file.path` when `--mode file`.
    #[arg(long)]
    file: Option<String>,

    /// Override the broadcast server bind address, e.g. `0.0.0.0:9001`.
    #[arg(long)]
    bind: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ArgMode {
    File,
    Udp,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            info!("no --config given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(mode) = args.mode {
        config.mode = match mode {
            ArgMode::File => Mode::File,
            ArgMode::Udp => Mode::Udp,
        };
    }
    if let Some(path) = args.file {
        config.file.path = path;
    }
    if let Some(bind) = args.bind {
        config.broadcast_addr = bind;
    }

    config.validate().context("validating configuration")?;
    info!("pcl-radar starting");

    let coordinator = Coordinator::new(config);
    let shutdown = coordinator.shutdown_flag();
    let counters = coordinator.counters();

    ctrlc::set_handler(move || {
        info!("shutdown signal received");
        shutdown.store(true, Ordering::SeqCst);
    })
    .context("installing ctrlc handler")?;

    let counters_for_log = counters;
    thread::spawn(move || loop {
        thread::sleep(Duration::from_secs(5));
        let snapshot = counters_for_log.snapshot();
        info!(
            "counters: detections={} tracks_born={} tracks_died={}",
            snapshot.detections_total, snapshot.tracks_born, snapshot.tracks_died
        );
    });

    coordinator.run().context("running coordinator")?;
    Ok(())
}
