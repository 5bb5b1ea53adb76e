use chrono::{Local, TimeDelta};
use statum::{machine, state};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::decoder::{decode, DecodedEvent};
use super::error::InputError;
use super::record::InputRecord;
use crate::config::InputConfig;

// Poller settings
#[derive(Clone, Debug)]
pub struct PollSettings {
    pub stats_interval_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            stats_interval_secs: 10,
        }
    }
}

impl From<&InputConfig> for PollSettings {
    fn from(config: &InputConfig) -> Self {
        Self {
            stats_interval_secs: config.stats_interval_secs,
        }
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum PollState {
    Opened,
    Reading,
}

#[machine]
pub struct EventPoller<S: PollState> {
    // Byte stream delivering whole records
    stream: Box<dyn Read + Send>,

    settings: PollSettings,

    // Checked between records; a blocked read is not interrupted
    cancel: CancellationToken,
}

impl EventPoller<Opened> {
    /// Opens the device node read-only
    pub fn open(
        path: &Path,
        settings: Option<PollSettings>,
        cancel: CancellationToken,
    ) -> Result<Self, InputError> {
        info!("Opening joystick device {}", path.display());
        let file = File::open(path).map_err(|source| {
            error!("Could not open {}: {}", path.display(), source);
            InputError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("Opened joystick at {}", path.display());
        Ok(Self::from_reader(file, settings, cancel))
    }

    pub fn from_reader<R: Read + Send + 'static>(
        reader: R,
        settings: Option<PollSettings>,
        cancel: CancellationToken,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating EventPoller with settings: {:?}", settings);
        Self::new(Box::new(reader), settings, cancel)
    }

    pub fn start_reading(self) -> EventPoller<Reading> {
        debug!("EventPoller transitioning to Reading state");
        self.transition()
    }
}

impl EventPoller<Reading> {
    /// Blocks until one record arrives and decodes it
    pub fn poll_next(&mut self) -> Result<DecodedEvent, InputError> {
        let record = InputRecord::read_from(&mut self.stream)?;
        let event = decode(&record);
        debug!(
            "Record t={} type={:#04x} init={} -> {:?}",
            record.timestamp,
            record.raw_type,
            record.is_init(),
            event
        );
        Ok(event)
    }

    /// Reads and emits records until cancelled or the stream fails.
    ///
    /// Returns the number of emitted events on cancellation. Read failures,
    /// including end of stream, stop the loop and are returned unchanged.
    pub fn run_poll_loop<F>(&mut self, mut emit: F) -> Result<u64, InputError>
    where
        F: FnMut(&DecodedEvent),
    {
        info!("Starting joystick poll loop");

        let mut total: u64 = 0;
        let mut window_count: u64 = 0;
        let mut last_log_time = Local::now();
        let log_interval = stats_interval(self.settings.stats_interval_secs);

        loop {
            if self.cancel.is_cancelled() {
                info!("Poll loop cancelled after {} events", total);
                return Ok(total);
            }

            let event = match self.poll_next() {
                Ok(event) => event,
                Err(e) => {
                    error!("Poll loop stopped after {} events: {}", total, e);
                    return Err(e);
                }
            };

            emit(&event);
            total += 1;
            window_count += 1;

            if let Some(log_interval) = log_interval {
                let now = Local::now();
                if now - last_log_time > log_interval {
                    info!(
                        "Poll loop stats: {} events in last {} seconds (avg {:.2}/sec)",
                        window_count,
                        log_interval.num_seconds(),
                        window_count as f64 / log_interval.num_seconds() as f64
                    );
                    window_count = 0;
                    last_log_time = now;
                }
            }
        }
    }
}

// None disables stats; out-of-range values are treated as disabled
fn stats_interval(secs: u64) -> Option<TimeDelta> {
    if secs == 0 {
        return None;
    }
    let interval = i64::try_from(secs).ok().and_then(TimeDelta::try_seconds);
    if interval.is_none() {
        warn!("Stats interval of {} seconds is out of range, stats disabled", secs);
    }
    interval
}

/// Owns the dedicated reader thread
///
/// Reads block the thread, so the loop runs outside the async runtime and
/// reports its outcome over a oneshot channel.
pub struct PollerHandle {
    result_rx: oneshot::Receiver<Result<u64, InputError>>,
}

impl PollerHandle {
    /// Opens the device and starts the poll loop on its own thread.
    ///
    /// Failing to open the device is returned here, before any thread exists.
    pub fn spawn<F>(
        config: &InputConfig,
        cancel: CancellationToken,
        emit: F,
    ) -> Result<Self, InputError>
    where
        F: FnMut(&DecodedEvent) + Send + 'static,
    {
        let poller = EventPoller::<Opened>::open(
            &config.device_path,
            Some(PollSettings::from(config)),
            cancel,
        )?;
        Self::spawn_poller(poller, emit)
    }

    pub fn spawn_poller<F>(poller: EventPoller<Opened>, emit: F) -> Result<Self, InputError>
    where
        F: FnMut(&DecodedEvent) + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("js-poll".into())
            .spawn(move || {
                let mut reading = poller.start_reading();
                let result = reading.run_poll_loop(emit);
                if result_tx.send(result).is_err() {
                    warn!("Poll result dropped, handle no longer listening");
                }
            })
            .map_err(|e| InputError::ThreadError(e.to_string()))?;

        info!("Joystick poll thread started");
        Ok(Self { result_rx })
    }

    /// Waits for the poll loop to finish
    pub async fn wait(self) -> Result<u64, InputError> {
        self.result_rx.await.map_err(|_| {
            InputError::ThreadError("poll thread exited without reporting".to_string())
        })?
    }
}
