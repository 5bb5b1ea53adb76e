//! Joystick input subsystem
//!
//! Reads fixed-size records from a Linux joystick character device and turns
//! them into typed events:
//!
//! 1. [`record`] - Binary layout of one 8-byte record
//! 2. [`decoder`] - Classification into axis / button / unknown events
//! 3. [`poll_loop`] - Blocking read loop and its thread handle
//!
//! ```text
//! /dev/input/js0 ──► InputRecord ──► DecodedEvent ──► emit (stdout)
//! ```

pub mod decoder;
pub mod error;
pub mod poll_loop;
pub mod record;

pub use decoder::{decode, DecodedEvent};
pub use error::InputError;
pub use poll_loop::{EventPoller, PollSettings, PollerHandle};
pub use record::{InputRecord, RECORD_SIZE};
