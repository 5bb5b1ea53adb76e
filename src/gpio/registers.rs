//! Register block access
//!
//! [`RegisterBlock`] is the seam between the pin logic and the hardware:
//! [`MappedRegisters`] backs it with a `/dev/mem` mapping of the peripheral
//! window.

use rppal::system::DeviceInfo;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr;
use tracing::{debug, error, info, warn};

use super::error::GpioError;

/// Size of the mapped register window in bytes
pub const BLOCK_SIZE: usize = 4 * 1024;

const WORDS: usize = BLOCK_SIZE / std::mem::size_of::<u32>();

/// Word-addressed 32-bit register storage
pub trait RegisterBlock {
    fn read(&self, index: usize) -> u32;
    fn write(&mut self, index: usize, value: u32);
}

/// Exclusive mapping of the GPIO register window, unmapped on drop
#[derive(Debug)]
pub struct MappedRegisters {
    base: *mut u32,
    physical_base: u64,
}

// SAFETY: the mapping is process-wide memory with a single owner; moving the
// owner to another thread does not create aliasing access.
unsafe impl Send for MappedRegisters {}

impl RegisterBlock for MappedRegisters {
    fn read(&self, index: usize) -> u32 {
        debug_assert!(index < WORDS, "register index {} outside block", index);
        // SAFETY: callers index through `Pin`, whose registers all lie below word 15
        unsafe { ptr::read_volatile(self.base.add(index)) }
    }

    fn write(&mut self, index: usize, value: u32) {
        debug_assert!(index < WORDS, "register index {} outside block", index);
        // SAFETY: callers index through `Pin`, whose registers all lie below word 15
        unsafe { ptr::write_volatile(self.base.add(index), value) }
    }
}

impl Drop for MappedRegisters {
    fn drop(&mut self) {
        // SAFETY: base/BLOCK_SIZE are exactly what mmap returned
        let rc = unsafe { libc::munmap(self.base.cast(), BLOCK_SIZE) };
        if rc != 0 {
            warn!(
                "munmap of GPIO block at {:#x} failed: {}",
                self.physical_base,
                io::Error::last_os_error()
            );
        } else {
            debug!("Unmapped GPIO block at {:#x}", self.physical_base);
        }
    }
}

/// Maps the register window at `base` through the memory device at `path`.
///
/// The device handle is closed as soon as the mapping exists. Both failures
/// are configuration problems (privileges, wrong board) and are not retried.
pub fn map_registers(path: &Path, base: u64) -> Result<MappedRegisters, GpioError> {
    log_board();

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(path)
        .map_err(|source| {
            error!("Unable to open {}: {}", path.display(), source);
            GpioError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

    let offset = libc::off_t::try_from(base).map_err(|_| GpioError::Map {
        base,
        source: io::Error::new(io::ErrorKind::InvalidInput, "base address exceeds off_t"),
    })?;

    // SAFETY: fresh mapping chosen by the kernel, checked against MAP_FAILED
    let mapped = unsafe {
        libc::mmap(
            ptr::null_mut(),
            BLOCK_SIZE,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            file.as_raw_fd(),
            offset,
        )
    };
    if mapped == libc::MAP_FAILED {
        let source = io::Error::last_os_error();
        error!("Memory mapping of {:#x} failed: {}", base, source);
        return Err(GpioError::Map { base, source });
    }
    drop(file);

    info!(
        "Mapped {} bytes of GPIO registers at {:#x} via {}",
        BLOCK_SIZE,
        base,
        path.display()
    );
    Ok(MappedRegisters {
        base: mapped.cast(),
        physical_base: base,
    })
}

fn log_board() {
    match DeviceInfo::new() {
        Ok(device) => info!("Detected {:?} ({:?})", device.model(), device.soc()),
        Err(e) => warn!("Could not identify board, using configured base: {}", e),
    }
}
