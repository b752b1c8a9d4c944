//! Daemon lifecycle: startup, serving and shutdown.
//!
//! `Pilight` uses a builder so that normal startup and `--at` rehearsals
//! share one path:
//!
//! - Normal startup: `Pilight::new(debug_enabled).run()`
//! - Rehearsal: `Pilight::new(debug_enabled).starting_at(dt).run()`

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Offset};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{self, CommandDefaults, CommandSurface};
use crate::config::{self, Backend, Config};
use crate::constants::*;
use crate::geo::{self, SolarWindow};
use crate::hardware::{self, MotionWatcher};
use crate::io::{lock, signals};
use crate::light::{ActuationCoordinator, LightScheduler};
use crate::remote::RemoteForwarder;
use crate::time_source::{OffsetTimeSource, RealTimeSource, TimeSource};

pub struct Pilight {
    debug_enabled: bool,
    start_at: Option<DateTime<Local>>,
}

impl Pilight {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            start_at: None,
        }
    }

    /// Run with the wall clock shifted to begin at `start`.
    pub fn starting_at(mut self, start: DateTime<Local>) -> Self {
        self.start_at = Some(start);
        self
    }

    /// Run until a termination signal arrives.
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        runtime.block_on(self.run_async())
    }

    async fn run_async(self) -> Result<()> {
        log_version!();
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Debug output enabled");
        }

        let config = config::load()?;
        let backend = hardware::resolve_backend(config.backend(), Path::new(SYSFS_GPIO_ROOT));
        config.log_config(backend);

        let _lock = lock::acquire(&lock::runtime_dir(), config.port())?;

        let clock: Arc<dyn TimeSource> = match self.start_at {
            Some(start) => {
                log_block_start!("Clock starts at {}", start.format("%Y-%m-%d %H:%M:%S"));
                Arc::new(OffsetTimeSource::new(start))
            }
            None => Arc::new(RealTimeSource),
        };

        let window = open_solar_window(&config, clock.as_ref())?;

        let relay = hardware::open_relay(&config, backend)?;
        log_block_start!("Relay on {}", relay.describe());
        let coordinator = ActuationCoordinator::new(Box::new(relay));
        coordinator.force_off();

        let forwarder = RemoteForwarder::new(config.remote_target())?;
        let scheduler = LightScheduler::new(Arc::clone(&coordinator), window, clock);
        let surface = CommandSurface::new(
            scheduler,
            forwarder,
            CommandDefaults {
                delay: config.delay(),
                divider: config.halloween_divider(),
                cycles: config.halloween_loop(),
            },
        );

        let (trigger, shutdown) = signals::shutdown_channel();
        signals::install_signal_handler(trigger)?;

        let mut watcher = if config.pir_enabled() {
            Some(start_motion(&config, backend, &surface, shutdown.clone())?)
        } else {
            None
        };

        let listener = api::bind(config.bind_address(), config.port()).await?;
        crate::logger::Log::set_timestamps(true);
        api::serve_on(listener, Arc::clone(&surface), shutdown.wait()).await?;

        if let Some(watcher) = watcher.as_mut() {
            watcher.stop();
        }
        coordinator.force_off();
        log_block_start!("Light off, stopped");
        log_end!();

        Ok(())
    }
}

/// Build today's daylight window. Failing here is fatal.
fn open_solar_window(config: &Config, clock: &dyn TimeSource) -> Result<Option<Arc<SolarWindow>>> {
    let Some(model) = geo::model_from_config(config)? else {
        return Ok(None);
    };
    let description = model.describe();
    let window = SolarWindow::new(model, clock.now())
        .with_context(|| format!("Cannot compute today's daylight window ({description})"))?;
    Ok(Some(Arc::new(window)))
}

fn start_motion(
    config: &Config,
    backend: Backend,
    surface: &Arc<CommandSurface>,
    shutdown: signals::Shutdown,
) -> Result<MotionWatcher> {
    let line = hardware::open_motion_line(config, backend)?;
    log_block_start!("Watching motion on {}", line.describe());

    let interval = Duration::from_millis(
        config
            .motion_poll_interval
            .unwrap_or(DEFAULT_MOTION_POLL_INTERVAL),
    );
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let watcher = MotionWatcher::spawn(line, interval, tx);

    let surface = Arc::clone(surface);
    tokio::spawn(async move {
        let stop = shutdown.wait();
        tokio::pin!(stop);
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(()) => surface.motion_detected(),
                    None => break,
                },
                _ = &mut stop => break,
            }
        }
    });

    Ok(watcher)
}

/// `pilight sun`: print the daylight window for today and exit.
pub fn print_daylight(start_at: Option<DateTime<Local>>) -> Result<()> {
    log_version!();
    let config = config::load()?;
    let now = start_at.unwrap_or_else(Local::now);

    let Some(model) = geo::model_from_config(&config)? else {
        log_block_start!("Gating is off; the light answers at any hour");
        log_end!();
        return Ok(());
    };

    log_block_start!("Daylight for {} ({})", now.date_naive(), model.describe());
    let window = model
        .compute(now.date_naive(), now.offset().fix())
        .context("Cannot compute the daylight window")?;
    log_indented!("Sunrise: {}", window.sunrise.format("%H:%M:%S"));
    log_indented!("Sunset:  {}", window.sunset.format("%H:%M:%S"));
    log_end!();
    Ok(())
}
