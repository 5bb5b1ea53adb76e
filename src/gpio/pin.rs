//! Pin number to register arithmetic

use super::error::GpioError;
use std::fmt;

/// Highest pin exposed by the register block
pub const MAX_PIN: u8 = 53;

pub const FSEL_BITS: u32 = 3;
pub const FSEL_MASK: u32 = 0b111;
pub const FSEL_OUTPUT: u32 = 0b001;

const PINS_PER_FSEL: u8 = 10;
const PINS_PER_BANK: u8 = 32;

pub const GPSET0: usize = 7;
pub const GPCLR0: usize = 10;
pub const GPLEV0: usize = 13;

/// A validated GPIO pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pin(u8);

impl Pin {
    pub fn new(number: u8) -> Result<Self, GpioError> {
        if number > MAX_PIN {
            return Err(GpioError::InvalidPin(number));
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Function-select word holding this pin's 3-bit field
    pub fn function_register(self) -> usize {
        (self.0 / PINS_PER_FSEL) as usize
    }

    pub fn function_shift(self) -> u32 {
        (self.0 % PINS_PER_FSEL) as u32 * FSEL_BITS
    }

    /// Bit within the set/clear/level word of this pin's bank
    pub fn bit_mask(self) -> u32 {
        1 << (self.0 % PINS_PER_BANK)
    }

    fn bank(self) -> usize {
        (self.0 / PINS_PER_BANK) as usize
    }

    pub fn set_register(self) -> usize {
        GPSET0 + self.bank()
    }

    pub fn clear_register(self) -> usize {
        GPCLR0 + self.bank()
    }

    pub fn level_register(self) -> usize {
        GPLEV0 + self.bank()
    }
}

impl TryFrom<u8> for Pin {
    type Error = GpioError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Pin::new(number)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}
