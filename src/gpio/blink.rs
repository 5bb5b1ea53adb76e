use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::controller::{FunctionSelectMode, GpioController};
use super::error::GpioError;
use super::pin::Pin;
use super::registers::{map_registers, RegisterBlock};
use crate::config::GpioConfig;

#[derive(Clone, Debug)]
pub struct BlinkSettings {
    pub pin: Pin,
    /// Time spent in each of the high and low phases
    pub period: Duration,
}

impl TryFrom<&GpioConfig> for BlinkSettings {
    type Error = GpioError;

    fn try_from(config: &GpioConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            pin: Pin::new(config.pin)?,
            period: Duration::from_millis(config.period_ms),
        })
    }
}

/// Configures the pin as output once, then toggles it until cancelled.
///
/// Returns the number of completed high/low cycles. The pin is cleared on the
/// way out so a cancelled blinker never leaves the output high.
pub async fn run_blink_loop<B: RegisterBlock>(
    controller: &mut GpioController<B>,
    settings: &BlinkSettings,
    cancel: &CancellationToken,
) -> u64 {
    let pin = settings.pin;
    controller.configure(pin);
    info!("Blinking {} every {:?}", pin, settings.period);

    let mut cycles: u64 = 0;
    loop {
        controller.set_pin(pin);
        if !pause(settings.period, cancel).await {
            break;
        }
        controller.clear_pin(pin);
        if !pause(settings.period, cancel).await {
            break;
        }
        cycles += 1;
        debug!("{} completed blink cycle {}", pin, cycles);
    }

    controller.clear_pin(pin);
    info!("Blink loop on {} cancelled after {} cycles", pin, cycles);
    cycles
}

// false when cancelled
async fn pause(period: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(period) => true,
    }
}

/// Owns the async blink task and, through it, the register mapping
pub struct BlinkHandle {
    task: JoinHandle<u64>,
}

impl BlinkHandle {
    /// Maps the registers and starts blinking.
    ///
    /// The pin is validated before `/dev/mem` is touched. Mapping failures are
    /// returned here; the mapping is released when the task ends.
    pub fn spawn(config: &GpioConfig, cancel: CancellationToken) -> Result<Self, GpioError> {
        let settings = BlinkSettings::try_from(config)?;
        let block = map_registers(&config.mem_path, config.base_address)?;
        let mode = FunctionSelectMode::from(config.strict_function_select);

        let task = tokio::spawn(async move {
            let mut controller = GpioController::new(block, mode);
            run_blink_loop(&mut controller, &settings, &cancel).await
        });

        info!("Blink task started on {}", config.pin);
        Ok(Self { task })
    }

    pub async fn wait(self) -> Result<u64, GpioError> {
        self.task
            .await
            .map_err(|e| GpioError::TaskError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::registers::fake::FakeRegisters;
    use std::path::PathBuf;

    fn settings(period_ms: u64) -> BlinkSettings {
        BlinkSettings {
            pin: Pin::new(17).unwrap(),
            period: Duration::from_millis(period_ms),
        }
    }

    #[tokio::test]
    async fn cancelled_blinker_configures_once_and_ends_low() {
        let mut gpio =
            GpioController::new(FakeRegisters::default(), FunctionSelectMode::Compatible);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let cycles = run_blink_loop(&mut gpio, &settings(1000), &cancel).await;

        assert_eq!(cycles, 0);
        assert_eq!(
            gpio.block().writes,
            vec![(1, 1 << 21), (7, 1 << 17), (10, 1 << 17)]
        );
        assert!(!gpio.read_level(Pin::new(17).unwrap()));
    }

    #[tokio::test]
    async fn alternates_set_and_clear_until_cancelled() {
        let mut gpio =
            GpioController::new(FakeRegisters::default(), FunctionSelectMode::Compatible);
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            stopper.cancel();
        });

        let cycles = run_blink_loop(&mut gpio, &settings(5), &cancel).await;
        assert!(cycles >= 1);

        let writes = &gpio.block().writes;
        assert_eq!(writes[0], (1, 1 << 21));
        assert_eq!(
            writes.iter().filter(|(index, _)| *index == 1).count(),
            1,
            "function select written once"
        );
        // the final clear may follow a clear when cancelled in the low phase
        for pair in writes[1..writes.len() - 1].windows(2) {
            assert_ne!(pair[0].0, pair[1].0, "set and clear must alternate");
        }
        assert_eq!(writes[1], (7, 1 << 17));
        assert_eq!(*writes.last().unwrap(), (10, 1 << 17));
        assert!(!gpio.read_level(Pin::new(17).unwrap()));
    }

    #[test]
    fn invalid_pin_fails_before_mapping() {
        let config = GpioConfig {
            pin: 60,
            mem_path: PathBuf::from("/nonexistent/mem"),
            ..GpioConfig::default()
        };
        let settings = BlinkSettings::try_from(&config);
        assert!(matches!(settings, Err(GpioError::InvalidPin(60))));
    }

    #[tokio::test]
    async fn spawn_reports_unopenable_memory_device() {
        let config = GpioConfig {
            mem_path: PathBuf::from("/nonexistent/mem"),
            ..GpioConfig::default()
        };
        let result = BlinkHandle::spawn(&config, CancellationToken::new());
        assert!(matches!(result, Err(GpioError::Open { .. })));
    }
}
