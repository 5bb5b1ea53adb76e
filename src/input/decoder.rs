//! Classification of joystick records
//!
//! The type byte carries the init flag in its high bit and the event class in
//! the remaining seven. Decoding drops the flag; use
//! [`InputRecord::is_init`](super::record::InputRecord::is_init) first if the
//! distinction matters.

use super::record::{InputRecord, JS_EVENT_INIT};
use std::fmt;

pub const JS_EVENT_BUTTON: u8 = 0x01;
pub const JS_EVENT_AXIS: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedEvent {
    Axis { index: u8, value: i16 },
    Button { index: u8, value: i16 },
    /// Any other class code, e.g. sync records; not an error
    Unknown,
}

/// Classifies a record. Never fails and never alters the value.
pub fn decode(record: &InputRecord) -> DecodedEvent {
    match record.raw_type & !JS_EVENT_INIT {
        JS_EVENT_AXIS => DecodedEvent::Axis {
            index: record.number,
            value: record.value,
        },
        JS_EVENT_BUTTON => DecodedEvent::Button {
            index: record.number,
            value: record.value,
        },
        _ => DecodedEvent::Unknown,
    }
}

impl fmt::Display for DecodedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedEvent::Axis { index, value } => write!(f, "AXIS {} VALUE {}", index, value),
            DecodedEvent::Button { index, value } => {
                write!(f, "BUTTON {} VALUE {}", index, value)
            }
            DecodedEvent::Unknown => write!(f, "some other input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw_type: u8, number: u8, value: i16) -> InputRecord {
        InputRecord {
            timestamp: 0,
            value,
            raw_type,
            number,
        }
    }

    #[test]
    fn axis_record_decodes_to_axis() {
        assert_eq!(
            decode(&record(0x02, 3, -120)),
            DecodedEvent::Axis {
                index: 3,
                value: -120
            }
        );
    }

    #[test]
    fn init_flag_is_ignored_for_buttons() {
        assert_eq!(
            decode(&record(0x81, 0, 1)),
            DecodedEvent::Button { index: 0, value: 1 }
        );
    }

    #[test]
    fn unrecognised_class_is_unknown() {
        assert_eq!(decode(&record(0x05, 7, 0)), DecodedEvent::Unknown);
    }

    #[test]
    fn every_type_byte_decodes_and_init_bit_never_matters() {
        for raw_type in 0..=u8::MAX {
            let live = record(raw_type & !JS_EVENT_INIT, 9, i16::MIN);
            let replay = record(raw_type | JS_EVENT_INIT, 9, i16::MIN);
            assert_eq!(decode(&live), decode(&replay), "type byte {raw_type:#04x}");

            let expected = match raw_type & !JS_EVENT_INIT {
                0x01 => DecodedEvent::Button {
                    index: 9,
                    value: i16::MIN,
                },
                0x02 => DecodedEvent::Axis {
                    index: 9,
                    value: i16::MIN,
                },
                _ => DecodedEvent::Unknown,
            };
            assert_eq!(decode(&record(raw_type, 9, i16::MIN)), expected);
        }
    }

    #[test]
    fn console_lines() {
        assert_eq!(
            DecodedEvent::Axis {
                index: 3,
                value: -120
            }
            .to_string(),
            "AXIS 3 VALUE -120"
        );
        assert_eq!(
            DecodedEvent::Button { index: 0, value: 1 }.to_string(),
            "BUTTON 0 VALUE 1"
        );
        assert_eq!(DecodedEvent::Unknown.to_string(), "some other input");
    }
}
