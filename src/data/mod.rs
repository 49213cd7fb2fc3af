// src/data/mod.rs

//! The `data` module holds the algorithmic core of _timeshift_.
//!
//! ## Definitions of data
//!
//! ### Directive
//!
//! A "directive" is a `%`-prefixed [`strftime`] token denoting one date/time
//! component, e.g. `%H` for the 24-hour clock hour, `%b` for the abbreviated
//! month name. The [`DirectiveTable`] maps every supported directive to a
//! regular expression fragment matching the text that directive renders.
//!
//! ### Format String
//!
//! A "format string" is a user-supplied sequence of literal characters and
//! directives describing how a timestamp is rendered in the source text,
//! e.g. `%Y-%m-%dT%H:%M:%S`. It is the single source of truth for locating
//! (via the compiled pattern), parsing (via chrono), and re-rendering
//! (via chrono) a timestamp.
//!
//! ### Time Difference
//!
//! A "time difference" is the signed duration added to every located
//! timestamp, written `+H[:M[:S[:MS]]]`, represented by a [`TimeDiff`].
//!
//! [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html
//! [`DirectiveTable`]: crate::data::datetime::DirectiveTable
//! [`TimeDiff`]: crate::data::timediff::TimeDiff

pub mod datetime;
pub mod timediff;
