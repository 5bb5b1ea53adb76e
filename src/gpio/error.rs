use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the register controller
#[derive(Debug, Error)]
pub enum GpioError {
    /// The memory device could not be opened, usually missing privileges
    #[error("Unable to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// mmap rejected the register window
    #[error("Memory mapping of {base:#x} failed")]
    Map {
        base: u64,
        #[source]
        source: io::Error,
    },

    #[error("Blink task error: {0}")]
    TaskError(String),

    #[error("Invalid GPIO pin {0}, expected 0..={max}", max = super::pin::MAX_PIN)]
    InvalidPin(u8),
}
