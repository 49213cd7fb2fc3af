// src/tests/common.rs

//! Common helpers for tests.

use crate::common::Count;
use crate::data::datetime::{TimeDelta, TimestampShifter, DIRECTIVE_TABLE};

/// A [`TimestampShifter`] against the default-locale directive table.
pub fn shifter_default(
    format: &str,
    delta: TimeDelta,
) -> TimestampShifter {
    TimestampShifter::new(format, delta, &DIRECTIVE_TABLE).unwrap()
}

/// Shift all matches of `format` within `input` by `delta`; returns the
/// substituted text and the count of shifts applied.
pub fn shift_str(
    format: &str,
    delta: TimeDelta,
    input: &str,
) -> (String, Count) {
    let shifter = shifter_default(format, delta);
    let (shifted, count) = shifter.shift_bytes(input.as_bytes()).unwrap();

    (String::from_utf8(shifted).unwrap(), count)
}
