use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the joystick subsystem
#[derive(Debug, Error)]
pub enum InputError {
    /// The device node could not be opened; fatal at startup
    #[error("Could not open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The OS reported an error while reading a record
    #[error("Failed to read joystick event")]
    Read(#[source] io::Error),

    /// A read returned fewer bytes than one record; zero means end of stream
    #[error("Short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("Poll thread error: {0}")]
    ThreadError(String),
}

impl InputError {
    /// True for failures that happen after the device was opened
    pub fn is_stream_error(&self) -> bool {
        matches!(self, InputError::Read(_) | InputError::ShortRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn os_error_appears_once_in_the_chain() {
        let err = InputError::Open {
            path: PathBuf::from("/dev/input/js0"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let source = err.source().unwrap().to_string();
        assert_eq!(err.to_string(), "Could not open /dev/input/js0");
        assert!(!err.to_string().contains(&source));

        let err = InputError::Read(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(err.source().is_some());
        assert!(!err.to_string().contains(&err.source().unwrap().to_string()));
    }
}
