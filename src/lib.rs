// src/lib.rs

//! _tslib_ implements the timestamp shifting engine behind the _timeshift_
//! program: compile a [`strftime`] format string into a regular expression,
//! find every occurrence of that format within lines of text, and rewrite
//! each occurrence shifted by a fixed [`TimeDiff`].
//!
//! The most relevant modules are:
//! - [`data::datetime`] the directive table, format compiler, and
//!   [`TimestampShifter`]
//! - [`readers::fileshifter`] the per-file processing loop
//!
//! [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html
//! [`TimeDiff`]: crate::data::timediff::TimeDiff
//! [`TimestampShifter`]: crate::data::datetime::TimestampShifter

pub mod common;
pub mod data;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;
