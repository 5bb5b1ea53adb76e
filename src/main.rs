pub mod config;
pub mod gpio;
pub mod input;

use crate::config::AppConfig;
use crate::gpio::BlinkHandle;
use crate::input::PollerHandle;
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

// Grace period for subsystems to finish after cancellation
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    AppConfig::ensure_default_config().await?;
    let config = AppConfig::load().await?;
    info!("Starting with config: {:?}", config);

    let cancel = CancellationToken::new();
    let mut subsystems: JoinSet<Result<&'static str>> = JoinSet::new();

    if config.input.enabled {
        let poller = PollerHandle::spawn(&config.input, cancel.child_token(), |event| {
            println!("{}", event)
        })
        .wrap_err("Joystick startup failed")?;

        subsystems.spawn(async move {
            let events = poller.wait().await?;
            info!("Joystick poller stopped after {} events", events);
            Ok::<_, color_eyre::Report>("joystick")
        });
    } else {
        info!("Joystick input disabled");
    }

    if config.gpio.enabled {
        let blinker = BlinkHandle::spawn(&config.gpio, cancel.child_token())
            .wrap_err("GPIO startup failed")?;

        subsystems.spawn(async move {
            let cycles = blinker.wait().await?;
            info!("Blinker stopped after {} cycles", cycles);
            Ok::<_, color_eyre::Report>("blinker")
        });
    } else {
        info!("GPIO blinker disabled");
    }

    if subsystems.is_empty() {
        warn!("Nothing enabled in {}", AppConfig::config_path().display());
        return Ok(());
    }

    let outcome = supervise(&mut subsystems).await;

    cancel.cancel();
    // A poller blocked in read() cannot observe the token; don't wait on it forever
    while let Ok(Some(joined)) =
        tokio::time::timeout(SHUTDOWN_TIMEOUT, subsystems.join_next()).await
    {
        match joined {
            Ok(Ok(name)) => info!("{} shut down", name),
            Ok(Err(e)) => warn!("Subsystem failed during shutdown: {:#}", e),
            Err(e) => warn!("Subsystem task failed during shutdown: {}", e),
        }
    }

    outcome
}

// Runs until Ctrl-C or the first subsystem ends
async fn supervise(subsystems: &mut JoinSet<Result<&'static str>>) -> Result<()> {
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.wrap_err("Failed to listen for Ctrl-C")?;
            info!("Ctrl-C received, shutting down");
            Ok(())
        }
        Some(joined) = subsystems.join_next() => match joined {
            Ok(Ok(name)) => {
                info!("{} finished", name);
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Subsystem stopped: {:#}", e);
                Err(e)
            }
            Err(e) => Err(eyre!("Subsystem task panicked: {}", e)),
        },
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
