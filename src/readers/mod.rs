// src/readers/mod.rs

//! The `readers` module drives per-file processing: read a file line by
//! line, pass each line through the [`TimestampShifter`], and write the
//! substituted lines to a side file (optionally renamed over the
//! original on success).
//!
//! _The "readers" are not rust "Readers"; the structs here do not
//! implement the trait [`Read`]. These are "readers" in an informal
//! sense._
//!
//! [`TimestampShifter`]: crate::data::datetime::TimestampShifter
//! [`Read`]: std::io::Read

pub mod fileshifter;
