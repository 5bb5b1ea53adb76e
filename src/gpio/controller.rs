use tracing::{debug, info};

use super::pin::{Pin, FSEL_MASK, FSEL_OUTPUT};
use super::registers::RegisterBlock;

/// How the function-select field is written when selecting output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionSelectMode {
    /// OR the output code into the field, leaving any set bits in place
    #[default]
    Compatible,
    /// Clear the 3-bit field, then write the output code
    Strict,
}

impl From<bool> for FunctionSelectMode {
    fn from(strict: bool) -> Self {
        if strict {
            FunctionSelectMode::Strict
        } else {
            FunctionSelectMode::Compatible
        }
    }
}

/// Single owner of a register block
pub struct GpioController<B: RegisterBlock> {
    block: B,
    mode: FunctionSelectMode,
}

impl<B: RegisterBlock> GpioController<B> {
    pub fn new(block: B, mode: FunctionSelectMode) -> Self {
        debug!("Creating GpioController in {:?} mode", mode);
        Self { block, mode }
    }

    /// Selects output for `pin` using the configured mode
    pub fn configure(&mut self, pin: Pin) {
        match self.mode {
            FunctionSelectMode::Compatible => self.configure_output(pin),
            FunctionSelectMode::Strict => self.configure_output_strict(pin),
        }
    }

    /// ORs the output code into the pin's function-select field.
    ///
    /// Bits already set in the field are kept, so a pin previously in an
    /// alternate function can end up with a code other than output.
    pub fn configure_output(&mut self, pin: Pin) {
        let index = pin.function_register();
        let value = self.block.read(index) | (FSEL_OUTPUT << pin.function_shift());
        self.block.write(index, value);
        info!("{} configured as output (fsel[{}] = {:#010x})", pin, index, value);
    }

    pub fn configure_output_strict(&mut self, pin: Pin) {
        let index = pin.function_register();
        let shift = pin.function_shift();
        let value = (self.block.read(index) & !(FSEL_MASK << shift)) | (FSEL_OUTPUT << shift);
        self.block.write(index, value);
        info!(
            "{} configured as output, strict (fsel[{}] = {:#010x})",
            pin, index, value
        );
    }

    /// Drives `pin` high. Write-1-to-set, other pins are unaffected.
    pub fn set_pin(&mut self, pin: Pin) {
        self.block.write(pin.set_register(), pin.bit_mask());
        debug!("{} set", pin);
    }

    /// Drives `pin` low. Write-1-to-clear, other pins are unaffected.
    pub fn clear_pin(&mut self, pin: Pin) {
        self.block.write(pin.clear_register(), pin.bit_mask());
        debug!("{} cleared", pin);
    }

    pub fn read_level(&self, pin: Pin) -> bool {
        self.block.read(pin.level_register()) & pin.bit_mask() != 0
    }

    /// Current 3-bit function code of `pin`
    pub fn function_of(&self, pin: Pin) -> u32 {
        (self.block.read(pin.function_register()) >> pin.function_shift()) & FSEL_MASK
    }

    pub fn block(&self) -> &B {
        &self.block
    }
}
