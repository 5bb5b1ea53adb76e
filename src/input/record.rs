//! Binary layout of a joystick record
//!
//! Matches the kernel's `struct js_event`: a millisecond timestamp, a signed
//! value, a type byte and an axis/button number, all in native byte order.

use super::error::InputError;
use std::io::Read;

pub const RECORD_SIZE: usize = 8;

/// Set on records the driver synthesises to report initial state
pub const JS_EVENT_INIT: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRecord {
    /// Event time in milliseconds, informational only
    pub timestamp: u32,
    pub value: i16,
    pub raw_type: u8,
    pub number: u8,
}

impl InputRecord {
    pub fn from_bytes(bytes: [u8; RECORD_SIZE]) -> Self {
        Self {
            timestamp: u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            value: i16::from_ne_bytes([bytes[4], bytes[5]]),
            raw_type: bytes[6],
            number: bytes[7],
        }
    }

    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0..4].copy_from_slice(&self.timestamp.to_ne_bytes());
        bytes[4..6].copy_from_slice(&self.value.to_ne_bytes());
        bytes[6] = self.raw_type;
        bytes[7] = self.number;
        bytes
    }

    /// Whether this record replays state at open time rather than a live change
    pub fn is_init(&self) -> bool {
        self.raw_type & JS_EVENT_INIT != 0
    }

    /// Reads exactly one record with a single `read` call.
    ///
    /// The device delivers whole records, so anything shorter is reported as
    /// [`InputError::ShortRead`] instead of being buffered. End of stream shows
    /// up as a short read of zero bytes.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self, InputError> {
        let mut buf = [0u8; RECORD_SIZE];
        let got = reader.read(&mut buf).map_err(InputError::Read)?;
        if got != RECORD_SIZE {
            return Err(InputError::ShortRead {
                expected: RECORD_SIZE,
                got,
            });
        }
        Ok(Self::from_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_native_endian_layout() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&123_456u32.to_ne_bytes());
        bytes.extend_from_slice(&(-120i16).to_ne_bytes());
        bytes.push(0x02);
        bytes.push(3);

        let record = InputRecord::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(
            record,
            InputRecord {
                timestamp: 123_456,
                value: -120,
                raw_type: 0x02,
                number: 3,
            }
        );
        assert!(!record.is_init());
    }

    #[test]
    fn init_flag_is_reported() {
        let record = InputRecord {
            timestamp: 0,
            value: 1,
            raw_type: 0x81,
            number: 0,
        };
        assert!(record.is_init());
    }

    #[test]
    fn partial_record_is_an_error() {
        let mut stream = Cursor::new(vec![1u8, 2, 3]);
        match InputRecord::read_from(&mut stream) {
            Err(InputError::ShortRead { expected, got }) => {
                assert_eq!(expected, RECORD_SIZE);
                assert_eq!(got, 3);
            }
            other => panic!("expected short read, got {:?}", other),
        }
    }

    #[test]
    fn end_of_stream_is_a_zero_length_short_read() {
        let mut stream = Cursor::new(Vec::<u8>::new());
        let err = InputRecord::read_from(&mut stream).unwrap_err();
        assert!(matches!(err, InputError::ShortRead { got: 0, .. }));
        assert!(err.is_stream_error());
    }
}
