// src/data/timediff.rs

//! The [`TimeDiff`]: a signed time difference parsed from the
//! command-line literal `+-Hours[:Minutes[:Seconds[:Milliseconds]]]`.
//!
//! The original literal is retained; it names the output file
//! (`chat.log` shifted by `+0:30` is written to `chat +0:30.log`).
//!
//! [`TimeDiff`]: self::TimeDiff

use std::fmt;

extern crate chrono;
use chrono::TimeDelta;

extern crate lazy_static;
use lazy_static::lazy_static;

extern crate regex;
use regex::Regex;

/// The accepted time difference literal syntax: sign mandatory, hours
/// mandatory, each subsequent unit optional but gap-free.
pub const TIMEDIFF_PATTERN: &str = r"^(?P<sign>[+-])(?P<hours>\d+)(:(?P<minutes>\d+))?(:(?P<seconds>\d+))?(:(?P<milliseconds>\d+))?$";

lazy_static! {
    static ref TIMEDIFF_REGEX: Regex =
        Regex::new(TIMEDIFF_PATTERN).expect("TIMEDIFF_PATTERN must compile");
}

/// A validated time difference: the signed [`TimeDelta`] applied to every
/// matched timestamp, and the original literal it was parsed from.
///
/// Immutable once parsed; shared read-only across all files and matches.
///
/// [`TimeDelta`]: https://docs.rs/chrono/0.4.40/chrono/struct.TimeDelta.html
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeDiff {
    pub delta: TimeDelta,
    pub literal: String,
}

impl TimeDiff {
    /// Validate and convert a time difference literal,
    /// e.g. `"+2"`, `"-1:30"`, `"+0:0:30"`, `"-4:0:45"`.
    ///
    /// The error is a plain message; this is the contract of a clap value
    /// parser.
    pub fn parse(literal: &str) -> Result<TimeDiff, String> {
        let captures = match TIMEDIFF_REGEX.captures(literal) {
            Some(captures) => captures,
            None => {
                return Err(format!(
                    "time difference {:?} should be described as '+-H[:M[:S[:MS]]]'",
                    literal,
                ))
            }
        };
        let unit = |name: &str| -> Result<i64, String> {
            match captures.name(name) {
                Some(matched) => matched
                    .as_str()
                    .parse::<i64>()
                    .map_err(|err| format!("bad {} in {:?}: {}", name, literal, err)),
                None => Ok(0),
            }
        };
        let hours = unit("hours")?;
        let minutes = unit("minutes")?;
        let seconds = unit("seconds")?;
        let milliseconds = unit("milliseconds")?;
        let delta = TimeDelta::try_hours(hours)
            .and_then(|delta| delta.checked_add(&TimeDelta::try_minutes(minutes)?))
            .and_then(|delta| delta.checked_add(&TimeDelta::try_seconds(seconds)?))
            .and_then(|delta| delta.checked_add(&TimeDelta::try_milliseconds(milliseconds)?))
            .ok_or_else(|| format!("time difference {:?} is too large", literal))?;
        let delta = match captures
            .name("sign")
            .map(|matched| matched.as_str())
        {
            Some("-") => -delta,
            _ => delta,
        };

        Ok(TimeDiff {
            delta,
            literal: String::from(literal),
        })
    }
}

impl fmt::Display for TimeDiff {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.write_str(self.literal.as_str())
    }
}
