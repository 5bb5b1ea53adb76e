//! Direct-register GPIO output for BCM283x-family peripherals
//!
//! Bypasses the kernel GPIO driver and writes the peripheral registers
//! through a memory-mapped window:
//!
//! 1. [`pin`] - Pin number to register index / bit position
//! 2. [`registers`] - Register block access and the `/dev/mem` mapping
//! 3. [`controller`] - Function select, set and clear operations
//! 4. [`blink`] - Periodic set/clear loop
//!
//! # Register layout
//!
//! ```text
//! word  0..=5   GPFSEL  3 bits per pin, 10 pins per word
//! word  7, 8    GPSET   write 1 to drive high
//! word 10, 11   GPCLR   write 1 to drive low
//! word 13, 14   GPLEV   current level
//! ```
//!
//! Nothing here synchronises access. The function-select update is a
//! read-modify-write, so concurrent configuration of pins sharing a word must
//! be serialised by the caller.

pub mod blink;
pub mod controller;
pub mod error;
pub mod pin;
pub mod registers;

pub use blink::{run_blink_loop, BlinkHandle, BlinkSettings};
pub use controller::{FunctionSelectMode, GpioController};
pub use error::GpioError;
pub use pin::Pin;
pub use registers::{map_registers, MappedRegisters, RegisterBlock, BLOCK_SIZE};
