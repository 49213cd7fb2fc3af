// src/data/datetime.rs

//! The directive table, format compiler, and [`TimestampShifter`].
//!
//! Finding and shifting timestamps requires:
//! 1. compiling the user-passed [`strftime`] format string into a regular
//!    expression that matches the textual shape of that format
//!    ([`regexp_for_format`])
//! 2. searching each line of text for non-overlapping matches of that
//!    regular expression
//! 3. for each match, parsing the matched text back into an instant with
//!    chrono, adding the configured [`TimeDelta`], and re-rendering the
//!    shifted instant with the same format string
//!    ([`TimestampShifter::shift_bytes`])
//!
//! The most relevant documents to understand this file are:
//! - `chrono` crate [`strftime`] format.
//! - `regex` crate [Regular Expression syntax].
//!
//! The regular expression only _locates_ timestamps; chrono interprets them.
//! The numeric fragments are deliberately lax about semantic range (`%d`
//! accepts `"39"`); shape precision finds real timestamps, chrono rejects
//! impossible values loudly during the per-match parse.
//!
//! [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html
//! [Regular Expression syntax]: https://docs.rs/regex/1.11.1/regex/index.html#syntax
//! [`regexp_for_format`]: self::regexp_for_format
//! [`TimestampShifter`]: self::TimestampShifter
//! [`TimestampShifter::shift_bytes`]: self::TimestampShifter#method.shift_bytes
//! [`TimeDelta`]: https://docs.rs/chrono/0.4.40/chrono/struct.TimeDelta.html

use crate::common::Count;

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write;

extern crate chrono;
#[doc(hidden)]
pub use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use chrono::format::{parse as chrono_parse, Parsed, StrftimeItems};

extern crate lazy_static;
use lazy_static::lazy_static;

extern crate regex;
use regex::bytes::Regex;

extern crate si_trace_print;
#[allow(unused_imports)]
use si_trace_print::{dpfn, dpfo, dpfx};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// types, constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The regular expression "class" used here, specifically for matching
/// datetime substrings within lines of `[u8]` data.
pub type DateTimeRegex = Regex;

/// An assembled regular expression pattern string, or fragment of one.
pub type RegexPattern = String;

/// Default timestamp format, an ISO-8601-like pattern.
pub const TIMESTAMP_FORMAT_DEFAULT: &str = "%Y-%m-%dT%H:%M:%S";

/// Regular expression capture group name for the `%Z` timezone name
/// directive. The matched zone text is carried over verbatim into the
/// shifted rendering; zone names are matched as text, never interpreted.
pub const CGN_TZNAME: &str = "tzname";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ShiftError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Errors raised while compiling a format string or shifting a matched
/// timestamp.
#[derive(Debug, PartialEq)]
pub enum ShiftError {
    /// The format string references a directive with no
    /// [`DirectiveTable`] entry, e.g. `%Q`, or ends with a lone `%`.
    UnsupportedDirective(String),
    /// The assembled pattern was rejected by the regex engine
    /// (e.g. `%Z` occurring twice duplicates a capture group name).
    BadPattern(String),
    /// A located match did not parse under the format string; the lax
    /// numeric fragments accepted a semantically impossible value.
    ParseMatch {
        text: String,
        error: chrono::format::ParseError,
    },
    /// The shifted instant could not be rendered with the format string,
    /// or the shift overflowed the representable datetime range.
    Render { text: String },
    /// A located match was not valid UTF-8.
    NotUtf8 { text_lossy: String },
}

impl fmt::Display for ShiftError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            ShiftError::UnsupportedDirective(directive) => {
                write!(f, "unsupported directive {:?} in the timestamp format", directive)
            }
            ShiftError::BadPattern(msg) => {
                write!(f, "format compiled to an unusable pattern: {}", msg)
            }
            ShiftError::ParseMatch { text, error } => {
                write!(f, "matched text {:?} does not parse under the format: {}", text, error)
            }
            ShiftError::Render { text } => {
                write!(f, "shifted timestamp for match {:?} could not be rendered", text)
            }
            ShiftError::NotUtf8 { text_lossy } => {
                write!(f, "matched text {:?} is not valid UTF-8", text_lossy)
            }
        }
    }
}

impl std::error::Error for ShiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShiftError::ParseMatch { error, .. } => Some(error),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LocaleNames
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Human-readable weekday/month names, AM/PM markers, timezone names, and
/// the composite date/time templates for one locale.
///
/// An explicit immutable value, built once and passed by reference into the
/// [`DirectiveTable`], rather than ambient global state; tests inject
/// custom instances.
///
/// The default is the C/POSIX (English) locale. chrono parses English
/// names only, so name-based directives (`%a` `%A` `%b` `%B`) require the
/// source data to carry English names; this is a declared limitation of
/// the tool, surfaced in the command-line help.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocaleNames {
    /// `%a` names, `"Sun"` first
    pub weekday_abbrevs: Vec<String>,
    /// `%A` names, `"Sunday"` first
    pub weekdays: Vec<String>,
    /// `%b` names, `"Jan"` first
    pub month_abbrevs: Vec<String>,
    /// `%B` names, `"January"` first
    pub months: Vec<String>,
    /// `%p` markers
    pub day_parts: Vec<String>,
    /// `%Z` names; matched as text, never interpreted
    pub timezone_names: Vec<String>,
    /// `%c` template, composed of simple directives only
    pub d_t_fmt: String,
    /// `%x` template, composed of simple directives only
    pub d_fmt: String,
    /// `%X` template, composed of simple directives only
    pub t_fmt: String,
}

impl Default for LocaleNames {
    fn default() -> LocaleNames {
        fn strings(names: &[&str]) -> Vec<String> {
            names.iter().map(|name| String::from(*name)).collect()
        }

        LocaleNames {
            weekday_abbrevs: strings(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]),
            weekdays: strings(&[
                "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
            ]),
            month_abbrevs: strings(&[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            months: strings(&[
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]),
            day_parts: strings(&["AM", "PM"]),
            timezone_names: strings(&[
                "UTC", "GMT", "EST", "EDT", "CST", "CDT", "MST", "MDT", "PST", "PDT",
            ]),
            // the C locale composite representations, same recipes chrono
            // uses for `%c` `%x` `%X`
            d_t_fmt: String::from("%a %b %e %H:%M:%S %Y"),
            d_fmt: String::from("%m/%d/%y"),
            t_fmt: String::from("%H:%M:%S"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DirectiveTable
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// regular expression fragments for the fixed-shape numeric directives;
// one or two digits, optionally zero-leading, favoring shape over
// semantic range

/// `%w` weekday number
const RP_WEEKDAY_NUM: &str = "[0-6]";
/// `%d` day of month
const RP_DAY: &str = "[0-3]?[0-9]";
/// `%e` day of month, leading zero replaced by a space
const RP_DAY_SPACE: &str = "(?: ?[1-3]?[0-9])";
/// `%m` month number
const RP_MONTH: &str = "[0-1]?[0-9]";
/// `%y` year without century
const RP_YEAR2: &str = "[0-9]{1,2}";
/// `%Y` year with century
const RP_YEAR4: &str = "[0-9]{1,4}";
/// `%H` hour, 24-hour clock
const RP_HOUR: &str = "[0-2]?[0-9]";
/// `%k` hour, 24-hour clock, space-padded
const RP_HOUR_SPACE: &str = "(?: ?[0-9]|1[0-9]|2[0-3])";
/// `%I` hour, 12-hour clock
const RP_HOUR12: &str = "[0-1]?[0-9]";
/// `%l` hour, 12-hour clock, space-padded
const RP_HOUR12_SPACE: &str = "(?: ?[0-9]|1[0-2])";
/// `%M` minute, `%S` second
const RP_MINSEC: &str = "[0-5]?[0-9]";
/// `%f` fractional seconds, nanosecond resolution per chrono
const RP_FRACTIONAL: &str = "[0-9]{1,9}";
/// `%z` UTC offset `+0930`
const RP_TZ_OFFSET: &str = "[+-][0-9]{4}";
/// `%:z` UTC offset `+09:30`
const RP_TZ_OFFSET_COLON: &str = "[+-][0-9]{2}:[0-9]{2}";
/// `%j` day of year
const RP_ORDINAL: &str = "[0-3]?[0-9]?[0-9]";
/// `%U` `%W` week number
const RP_WEEK: &str = "[0-5]?[0-9]";

/// The locale-composite directives; each resolves through a
/// [`LocaleNames`] template. The templates must reference simple
/// directives only; one-level recursion, checked at table construction.
pub const DIRECTIVES_COMPOSITE: [&str; 3] = ["%c", "%x", "%X"];

/// Mapping from every supported directive to a regular expression fragment
/// matching the textual form that directive produces.
///
/// Two layers, built in two phases:
/// 1. _simple_ fragments: fixed character-class patterns plus alternations
///    of the locale name lists
/// 2. _recursive_ fragments: the locale composite representations
///    `%c` `%x` `%X`, each derived by compiling its locale template against
///    the phase-1 table
///
/// Read-only once built. A process-wide instance for [`LocaleNames::default`]
/// is memoized in [`struct@DIRECTIVE_TABLE`].
pub struct DirectiveTable {
    directives: BTreeMap<String, RegexPattern>,
    locale: LocaleNames,
}

impl DirectiveTable {
    /// Build the table for the passed locale.
    ///
    /// Fails with [`ShiftError::UnsupportedDirective`] if a locale
    /// composite template references a directive absent from the simple
    /// layer (including another composite directive).
    pub fn new(locale: LocaleNames) -> Result<DirectiveTable, ShiftError> {
        dpfn!("DirectiveTable::new(…)");
        let mut directives = DirectiveTable::directives_simple(&locale);
        // phase 2: compile every composite template against the
        // simple-fragment layer only, before inserting any of them; a
        // template referencing another composite must fail, not resolve
        // through an earlier loop iteration
        let mut fragments = Vec::<(&str, RegexPattern)>::with_capacity(DIRECTIVES_COMPOSITE.len());
        for (directive, template) in [
            ("%c", locale.d_t_fmt.as_str()),
            ("%x", locale.d_fmt.as_str()),
            ("%X", locale.t_fmt.as_str()),
        ] {
            fragments.push((directive, regexp_for_format_table(template, &directives)?));
        }
        for (directive, fragment) in fragments {
            directives.insert(String::from(directive), fragment);
        }
        dpfx!("DirectiveTable::new({} directives)", directives.len());

        Ok(DirectiveTable { directives, locale })
    }

    /// Phase 1: the simple-fragment layer.
    fn directives_simple(locale: &LocaleNames) -> BTreeMap<String, RegexPattern> {
        let mut directives = BTreeMap::<String, RegexPattern>::new();
        let mut insert = |directive: &str, fragment: RegexPattern| {
            directives.insert(String::from(directive), fragment);
        };

        insert("%a", rp_alternation(&locale.weekday_abbrevs));
        insert("%A", rp_alternation(&locale.weekdays));
        insert("%w", String::from(RP_WEEKDAY_NUM));
        insert("%d", String::from(RP_DAY));
        insert("%e", String::from(RP_DAY_SPACE));
        insert("%b", rp_alternation(&locale.month_abbrevs));
        insert("%B", rp_alternation(&locale.months));
        insert("%m", String::from(RP_MONTH));
        insert("%y", String::from(RP_YEAR2));
        insert("%Y", String::from(RP_YEAR4));
        insert("%H", String::from(RP_HOUR));
        insert("%k", String::from(RP_HOUR_SPACE));
        insert("%I", String::from(RP_HOUR12));
        insert("%l", String::from(RP_HOUR12_SPACE));
        insert("%p", rp_alternation(&locale.day_parts));
        insert("%M", String::from(RP_MINSEC));
        insert("%S", String::from(RP_MINSEC));
        insert("%f", String::from(RP_FRACTIONAL));
        insert("%z", String::from(RP_TZ_OFFSET));
        insert("%:z", String::from(RP_TZ_OFFSET_COLON));
        insert("%Z", rp_named_alternation(CGN_TZNAME, &locale.timezone_names));
        insert("%j", String::from(RP_ORDINAL));
        insert("%U", String::from(RP_WEEK));
        insert("%W", String::from(RP_WEEK));
        insert("%%", String::from("%"));

        directives
    }

    /// Fragment for the passed directive, `None` if unsupported.
    pub fn fragment(
        &self,
        directive: &str,
    ) -> Option<&str> {
        self.directives
            .get(directive)
            .map(|fragment| fragment.as_str())
    }

    /// The locale this table was built from.
    pub const fn locale(&self) -> &LocaleNames {
        &self.locale
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// A non-capturing alternation of the passed names, each regex-escaped.
fn rp_alternation(names: &[String]) -> RegexPattern {
    let escaped: Vec<String> = names.iter().map(|name| regex::escape(name)).collect();

    format!("(?:{})", escaped.join("|"))
}

/// A named-capture alternation of the passed names, each regex-escaped.
fn rp_named_alternation(
    group: &str,
    names: &[String],
) -> RegexPattern {
    let escaped: Vec<String> = names.iter().map(|name| regex::escape(name)).collect();

    format!("(?P<{}>{})", group, escaped.join("|"))
}

lazy_static! {
    /// The process-wide [`DirectiveTable`] for [`LocaleNames::default`].
    /// Built lazily on first use, read-only thereafter.
    pub static ref DIRECTIVE_TABLE: DirectiveTable =
        DirectiveTable::new(LocaleNames::default())
            .expect("directive table for the default locale must build");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// format compiler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One token of a format string.
enum FormatToken {
    /// an ordinary character, emitted regex-escaped
    Literal(char),
    /// a `%`-prefixed directive, e.g. `"%H"`, `"%:z"`
    Directive(String),
}

/// Tokenize a format string into literals and directives.
///
/// A `%` takes the following character as the directive letter; `%:`
/// takes one more (the chrono `%:z` form). A trailing lone `%` is an
/// unsupported directive.
fn format_tokens(format: &str) -> Result<Vec<FormatToken>, ShiftError> {
    let mut tokens = Vec::<FormatToken>::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            tokens.push(FormatToken::Literal(c));
            continue;
        }
        let directive: String = match chars.next() {
            Some(':') => match chars.next() {
                Some(c3) => format!("%:{}", c3),
                None => return Err(ShiftError::UnsupportedDirective(String::from("%:"))),
            },
            Some(c2) => format!("%{}", c2),
            None => return Err(ShiftError::UnsupportedDirective(String::from("%"))),
        };
        tokens.push(FormatToken::Directive(directive));
    }

    Ok(tokens)
}

/// Construct the regular expression pattern that matches the textual shape
/// of the passed format string.
///
/// Walks the format string, emitting each literal character regex-escaped
/// and each directive as its table fragment, concatenated in original
/// order; the pattern mirrors the format exactly.
pub fn regexp_for_format(
    format: &str,
    table: &DirectiveTable,
) -> Result<RegexPattern, ShiftError> {
    regexp_for_format_table(format, &table.directives)
}

/// [`regexp_for_format`] against a bare fragment mapping; also used during
/// phase 2 of table construction, before the [`DirectiveTable`] exists.
fn regexp_for_format_table(
    format: &str,
    directives: &BTreeMap<String, RegexPattern>,
) -> Result<RegexPattern, ShiftError> {
    let mut pattern = RegexPattern::with_capacity(format.len() * 4);
    let mut buf = [0u8; 4];
    for token in format_tokens(format)? {
        match token {
            FormatToken::Literal(c) => {
                pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
            FormatToken::Directive(directive) => match directives.get(&directive) {
                Some(fragment) => pattern.push_str(fragment),
                None => return Err(ShiftError::UnsupportedDirective(directive)),
            },
        }
    }

    Ok(pattern)
}

/// Compile the pattern for the passed format string, case-insensitively
/// (locale names match regardless of capitalization in the source text).
pub fn regex_for_format(
    format: &str,
    table: &DirectiveTable,
) -> Result<DateTimeRegex, ShiftError> {
    let pattern = regexp_for_format(format, table)?;

    DateTimeRegex::new(&format!("(?i){}", pattern))
        .map_err(|err| ShiftError::BadPattern(err.to_string()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FormatFields
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which datetime components a format string supplies.
///
/// chrono requires a complete date and time to resolve an instant; fields
/// a format does not supply are defaulted before resolution (year 1900,
/// month 1, day 1, hour 0, minute 0 — second and fractional default to
/// zero inside chrono itself).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct FormatFields {
    year: bool,
    month: bool,
    day: bool,
    ordinal: bool,
    hour24: bool,
    hour12: bool,
    ampm: bool,
    minute: bool,
    offset: bool,
}

impl FormatFields {
    fn merge(
        &mut self,
        other: FormatFields,
    ) {
        self.year |= other.year;
        self.month |= other.month;
        self.day |= other.day;
        self.ordinal |= other.ordinal;
        self.hour24 |= other.hour24;
        self.hour12 |= other.hour12;
        self.ampm |= other.ampm;
        self.minute |= other.minute;
        self.offset |= other.offset;
    }
}

/// Scan a format string for the datetime components it supplies.
/// Composite directives are scanned through their locale templates
/// (one level; templates are composite-free, enforced at table
/// construction).
fn scan_format(
    format: &str,
    locale: &LocaleNames,
) -> Result<FormatFields, ShiftError> {
    scan_format_inner(format, Some(locale))
}

fn scan_format_inner(
    format: &str,
    locale: Option<&LocaleNames>,
) -> Result<FormatFields, ShiftError> {
    let mut fields = FormatFields::default();
    for token in format_tokens(format)? {
        let directive = match token {
            FormatToken::Directive(directive) => directive,
            FormatToken::Literal(_) => continue,
        };
        match directive.as_str() {
            "%Y" | "%y" => fields.year = true,
            "%m" | "%b" | "%B" => fields.month = true,
            "%d" | "%e" => fields.day = true,
            "%j" => fields.ordinal = true,
            "%H" | "%k" => fields.hour24 = true,
            "%I" | "%l" => fields.hour12 = true,
            "%p" => fields.ampm = true,
            "%M" => fields.minute = true,
            "%z" | "%:z" => fields.offset = true,
            "%c" => {
                if let Some(locale_) = locale {
                    fields.merge(scan_format_inner(&locale_.d_t_fmt, None)?);
                }
            }
            "%x" => {
                if let Some(locale_) = locale {
                    fields.merge(scan_format_inner(&locale_.d_fmt, None)?);
                }
            }
            "%X" => {
                if let Some(locale_) = locale {
                    fields.merge(scan_format_inner(&locale_.t_fmt, None)?);
                }
            }
            _ => {}
        }
    }

    Ok(fields)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TimestampShifter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An instant parsed from one match; carries its own UTC offset when the
/// format supplies one, naive otherwise.
enum ParsedInstant {
    Fixed(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

/// Finds every occurrence of one timestamp format within lines of text and
/// rewrites each occurrence shifted by a fixed [`TimeDelta`].
///
/// Immutable once built; one instance serves every file of an invocation.
///
/// [`TimeDelta`]: https://docs.rs/chrono/0.4.40/chrono/struct.TimeDelta.html
pub struct TimestampShifter {
    /// the user-passed format string
    format: String,
    /// `format` with composite directives expanded to the locale
    /// templates; the parse template and render template (chrono resolves
    /// `%c` `%x` `%X` with its own fixed recipes, which need not agree
    /// with an injected locale)
    format_expanded: String,
    /// locates occurrences of `format` within a line; never interprets them
    regex: DateTimeRegex,
    /// which components `format` supplies, for defaulting the rest
    fields: FormatFields,
    /// the signed shift applied to every match
    delta: TimeDelta,
}

impl fmt::Debug for TimestampShifter {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("TimestampShifter")
            .field("format", &self.format)
            .field("regex", &self.regex.as_str())
            .field("delta", &self.delta)
            .finish()
    }
}

impl TimestampShifter {
    /// Compile the passed format string against the passed
    /// [`DirectiveTable`].
    ///
    /// Fails with [`ShiftError::UnsupportedDirective`] for a directive
    /// absent from the table; callers must not open any file before this
    /// returns `Ok`.
    pub fn new(
        format: &str,
        delta: TimeDelta,
        table: &DirectiveTable,
    ) -> Result<TimestampShifter, ShiftError> {
        dpfn!("TimestampShifter::new({:?}, {:?})", format, delta);
        let regex = regex_for_format(format, table)?;
        let format_expanded = expand_composites(format, table.locale())?;
        let fields = scan_format(&format_expanded, table.locale())?;
        dpfx!("TimestampShifter::new pattern {:?}", regex.as_str());

        Ok(TimestampShifter {
            format: String::from(format),
            format_expanded,
            regex,
            fields,
            delta,
        })
    }

    /// Find every non-overlapping occurrence of the compiled pattern in
    /// `data` and replace each with its time-shifted rendering, leaving
    /// all other bytes untouched (non-UTF-8 bytes outside matches survive
    /// verbatim).
    ///
    /// Matches are processed left-to-right in the order they appear.
    /// Returns the substituted bytes and the count of shifts applied;
    /// data with zero matches is returned unchanged.
    ///
    /// A match that fails to parse under the format string fails the
    /// whole call; partial, undetected corruption is strictly worse than
    /// aborting.
    pub fn shift_bytes(
        &self,
        data: &[u8],
    ) -> Result<(Vec<u8>, Count), ShiftError> {
        let mut shifted = Vec::<u8>::with_capacity(data.len() + 8);
        let mut count: Count = 0;
        let mut at: usize = 0;
        for captures in self.regex.captures_iter(data) {
            let matched = match captures.get(0) {
                Some(matched) => matched,
                None => continue,
            };
            let text: &str = match std::str::from_utf8(matched.as_bytes()) {
                Ok(text) => text,
                Err(_) => {
                    return Err(ShiftError::NotUtf8 {
                        text_lossy: String::from_utf8_lossy(matched.as_bytes()).into_owned(),
                    })
                }
            };
            let tzname: Option<&str> = match captures.name(CGN_TZNAME) {
                Some(matched_tz) => match std::str::from_utf8(matched_tz.as_bytes()) {
                    Ok(name) => Some(name),
                    Err(_) => {
                        return Err(ShiftError::NotUtf8 {
                            text_lossy: String::from_utf8_lossy(matched_tz.as_bytes()).into_owned(),
                        })
                    }
                },
                None => None,
            };
            let replacement = self.shift_match(text, tzname)?;
            shifted.extend_from_slice(&data[at..matched.start()]);
            shifted.extend_from_slice(replacement.as_bytes());
            at = matched.end();
            count += 1;
        }
        shifted.extend_from_slice(&data[at..]);

        Ok((shifted, count))
    }

    /// Transform one matched timestamp: parse with the format string,
    /// add the delta, re-render with the format string.
    ///
    /// When the format contains `%Z`, the matched zone text substitutes
    /// for `%Z` in both the parse and the render template, so the zone
    /// name round-trips verbatim (it is never interpreted).
    fn shift_match(
        &self,
        text: &str,
        tzname: Option<&str>,
    ) -> Result<String, ShiftError> {
        let format: std::borrow::Cow<str> = match tzname {
            Some(name) => std::borrow::Cow::Owned(format_with_tzname(&self.format_expanded, name)),
            None => std::borrow::Cow::Borrowed(self.format_expanded.as_str()),
        };
        let instant = self.parse_instant(text, &format)?;
        let mut rendered = String::with_capacity(text.len() + 4);
        let render_err = |_| ShiftError::Render {
            text: String::from(text),
        };
        match instant {
            ParsedInstant::Fixed(datetime) => {
                let shifted = datetime
                    .checked_add_signed(self.delta)
                    .ok_or_else(|| ShiftError::Render {
                        text: String::from(text),
                    })?;
                write!(rendered, "{}", shifted.format(&format)).map_err(render_err)?;
            }
            ParsedInstant::Naive(datetime) => {
                let shifted = datetime
                    .checked_add_signed(self.delta)
                    .ok_or_else(|| ShiftError::Render {
                        text: String::from(text),
                    })?;
                write!(rendered, "{}", shifted.format(&format)).map_err(render_err)?;
            }
        }

        Ok(rendered)
    }

    /// Parse one matched timestamp into an absolute instant using the
    /// format string as the parse template (the compiled pattern only
    /// locates text; chrono interprets it).
    ///
    /// Components the format does not supply are defaulted with the
    /// `Parsed::set_*` calls; the conflict error when a component was
    /// already parsed is deliberately ignored, leaving the parsed value
    /// in place.
    fn parse_instant(
        &self,
        text: &str,
        format: &str,
    ) -> Result<ParsedInstant, ShiftError> {
        let mut parsed = Parsed::new();
        chrono_parse(&mut parsed, text, StrftimeItems::new(format)).map_err(|error| {
            ShiftError::ParseMatch {
                text: String::from(text),
                error,
            }
        })?;
        let fields = &self.fields;
        if !fields.year {
            let _ = parsed.set_year(1900);
        }
        if !fields.month && !fields.ordinal {
            let _ = parsed.set_month(1);
        }
        if !fields.day && !fields.ordinal {
            let _ = parsed.set_day(1);
        }
        if fields.hour12 && !fields.ampm {
            // a 12-hour clock without an AM/PM marker reads as AM
            let _ = parsed.set_ampm(false);
        }
        if !fields.hour24 && !fields.hour12 {
            let _ = parsed.set_hour(0);
        }
        if !fields.minute {
            let _ = parsed.set_minute(0);
        }
        if fields.offset {
            let datetime = parsed
                .to_datetime()
                .map_err(|error| ShiftError::ParseMatch {
                    text: String::from(text),
                    error,
                })?;

            return Ok(ParsedInstant::Fixed(datetime));
        }
        let datetime =
            parsed
                .to_naive_datetime_with_offset(0)
                .map_err(|error| ShiftError::ParseMatch {
                    text: String::from(text),
                    error,
                })?;

        Ok(ParsedInstant::Naive(datetime))
    }
}

/// Replace each composite directive in the format string with its locale
/// template, producing the parse/render template. One level only; the
/// templates themselves are composite-free (enforced at table
/// construction).
fn expand_composites(
    format: &str,
    locale: &LocaleNames,
) -> Result<String, ShiftError> {
    let mut expanded = String::with_capacity(format.len() * 2);
    for token in format_tokens(format)? {
        match token {
            FormatToken::Literal(c) => expanded.push(c),
            FormatToken::Directive(directive) => match directive.as_str() {
                "%c" => expanded.push_str(&locale.d_t_fmt),
                "%x" => expanded.push_str(&locale.d_fmt),
                "%X" => expanded.push_str(&locale.t_fmt),
                _ => expanded.push_str(&directive),
            },
        }
    }

    Ok(expanded)
}

/// Replace each `%Z` directive in the format string with the passed zone
/// text, directive-aware (a literal `%%Z` is left alone).
fn format_with_tzname(
    format: &str,
    tzname: &str,
) -> String {
    let mut replaced = String::with_capacity(format.len() + tzname.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            replaced.push(c);
            continue;
        }
        match chars.next() {
            Some('Z') => replaced.push_str(tzname),
            Some(c2) => {
                replaced.push('%');
                replaced.push(c2);
            }
            None => replaced.push('%'),
        }
    }

    replaced
}
