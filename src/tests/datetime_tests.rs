// src/tests/datetime_tests.rs

//! Tests for `datetime.rs`: the directive table, the format compiler, and
//! the [`TimestampShifter`].
//!
//! [`TimestampShifter`]: crate::data::datetime::TimestampShifter

use crate::tests::common::{shift_str, shifter_default};

use crate::data::datetime::{
    regexp_for_format,
    DirectiveTable,
    LocaleNames,
    ShiftError,
    TimeDelta,
    TimestampShifter,
    DIRECTIVES_COMPOSITE,
    DIRECTIVE_TABLE,
    TIMESTAMP_FORMAT_DEFAULT,
};

use ::chrono::NaiveDate;
use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DirectiveTable
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_directive_table_default_fragments() {
    let table = &*DIRECTIVE_TABLE;
    assert!(!table.is_empty());
    assert!(table.fragment("%a").unwrap().contains("Mon"));
    assert!(table.fragment("%B").unwrap().contains("January"));
    assert_eq!(table.fragment("%%"), Some("%"));
    assert_eq!(table.fragment("%Q"), None);
    for directive in DIRECTIVES_COMPOSITE {
        assert!(
            table.fragment(directive).is_some(),
            "composite directive {:?} missing from the table",
            directive,
        );
    }
}

#[test]
fn test_directive_table_composite_matches_compiled_template() {
    // the recursive layer is exactly the compiled locale template
    let table = &*DIRECTIVE_TABLE;
    let compiled = regexp_for_format(&table.locale().d_t_fmt, table).unwrap();
    assert_eq!(table.fragment("%c"), Some(compiled.as_str()));
}

#[test]
fn test_directive_table_rejects_bad_composite_template() {
    // an unexpected directive in a locale composite template fails at
    // table-construction time
    let locale = LocaleNames {
        d_fmt: String::from("%Q/%d/%y"),
        ..LocaleNames::default()
    };
    match DirectiveTable::new(locale) {
        Err(ShiftError::UnsupportedDirective(directive)) => assert_eq!(directive, "%Q"),
        Err(err) => panic!("unexpected error {:?}", err),
        Ok(_) => panic!("table built from a template referencing %Q"),
    }
}

#[test]
fn test_directive_table_rejects_composite_in_composite_template() {
    // the composite templates resolve through the simple layer only; a
    // template referencing another composite directive must fail, in
    // every template position
    for locale in [
        LocaleNames {
            d_fmt: String::from("%c"),
            ..LocaleNames::default()
        },
        LocaleNames {
            t_fmt: String::from("%H:%M %x"),
            ..LocaleNames::default()
        },
    ] {
        match DirectiveTable::new(locale) {
            Err(ShiftError::UnsupportedDirective(directive)) => {
                assert!(DIRECTIVES_COMPOSITE.contains(&directive.as_str()));
            }
            Err(err) => panic!("unexpected error {:?}", err),
            Ok(_) => panic!("table built from a template referencing a composite"),
        }
    }
}

#[test]
fn test_directive_table_injected_composite_time() {
    // an injected locale redefines what `%X` matches, and the shifter
    // parses/renders through the same template
    let locale = LocaleNames {
        t_fmt: String::from("%H-%M"),
        ..LocaleNames::default()
    };
    let table = DirectiveTable::new(locale).unwrap();
    let shifter =
        TimestampShifter::new("%X", TimeDelta::try_minutes(1).unwrap(), &table).unwrap();
    let (shifted, count) = shifter.shift_bytes(b"at 10-30 sharp").unwrap();
    assert_eq!(shifted, b"at 10-31 sharp".to_vec());
    assert_eq!(count, 1);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// format compiler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_regexp_for_format_concatenation_order() {
    let table = &*DIRECTIVE_TABLE;
    let pattern = regexp_for_format("%H:%M", table).unwrap();
    let hour = table.fragment("%H").unwrap();
    let minute = table.fragment("%M").unwrap();
    assert_eq!(pattern, format!("{}:{}", hour, minute));
}

#[test]
fn test_regexp_for_format_escapes_literals() {
    let table = &*DIRECTIVE_TABLE;
    let pattern = regexp_for_format("%H.%M", table).unwrap();
    assert!(pattern.contains("\\."), "literal '.' not escaped: {:?}", pattern);
}

#[test_case("%Q"; "unknown letter")]
#[test_case("%H:%M %q"; "unknown letter after valid ones")]
#[test_case("%:q"; "unknown colon form")]
#[test_case("%H:%M%"; "trailing lone percent")]
fn test_unsupported_directive(format: &str) {
    match TimestampShifter::new(format, TimeDelta::zero(), &DIRECTIVE_TABLE) {
        Err(ShiftError::UnsupportedDirective(_)) => {}
        Err(err) => panic!("unexpected error {:?}", err),
        Ok(_) => panic!("format {:?} compiled", format),
    }
}

#[test]
fn test_duplicate_timezone_name_directive_rejected() {
    // `%Z` twice duplicates the named capture group
    match TimestampShifter::new("%Z %H %Z", TimeDelta::zero(), &DIRECTIVE_TABLE) {
        Err(ShiftError::BadPattern(_)) => {}
        Err(err) => panic!("unexpected error {:?}", err),
        Ok(_) => panic!("format with two %Z compiled"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// shape fidelity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// for any rendered instant, the compiled pattern for the same format must
// produce exactly one match spanning the entire rendered text; a zero
// delta must reproduce the text byte for byte
#[test_case(TIMESTAMP_FORMAT_DEFAULT)]
#[test_case("%H:%M:%S")]
#[test_case("%H:%M:%S.%f")]
#[test_case("%a %b %e %H:%M:%S %Y")]
#[test_case("%c"; "locale date time")]
#[test_case("%x"; "locale date")]
#[test_case("%X"; "locale time")]
#[test_case("%A %B %d, %Y")]
#[test_case("%y%m%d %I:%M %p")]
#[test_case("%j of %Y")]
fn test_shape_fidelity(format: &str) {
    let datetime = NaiveDate::from_ymd_opt(2020, 3, 15)
        .unwrap()
        .and_hms_opt(14, 30, 5)
        .unwrap();
    let rendered = datetime.format(format).to_string();
    let (shifted, count) = shift_str(format, TimeDelta::zero(), &rendered);
    assert_eq!(count, 1, "rendered text {:?} matched {} times", rendered, count);
    assert_eq!(shifted, rendered);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// shifting
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case(
    "%H:%M:%S", 1800,
    "(20:49:47) aidaho: hi",
    "(21:19:47) aidaho: hi";
    "im log half hour forwards"
)]
#[test_case(
    "%Y-%m-%dT%H:%M:%SZ", -7380,
    "<time>2015-08-07T11:07:42Z</time>",
    "<time>2015-08-07T09:04:42Z</time>";
    "gps track two hours three minutes backwards"
)]
#[test_case(
    "%H:%M:%S", 20,
    "23:59:50",
    "00:00:10";
    "calendar aware day boundary"
)]
#[test_case(
    "%H:%M:%S", 60,
    "(20:49:47) hi (21:11:12) yo",
    "(20:50:47) hi (21:12:12) yo";
    "two matches shifted independently"
)]
#[test_case(
    "%H.%M", 60,
    "10x30 or 10.30",
    "10x30 or 10.31";
    "escaped literal dot does not match x"
)]
#[test_case(
    "100%% load at %H:%M", 3600,
    "100% load at 23:30",
    "100% load at 00:30";
    "literal percent directive"
)]
#[test_case(
    "%Y-%m-%dT%H:%M:%S%z", 3600,
    "2015-08-07T11:07:42+0300",
    "2015-08-07T12:07:42+0300";
    "utc offset matched as text and preserved"
)]
#[test_case(
    "%H:%M:%S %Z", -3600,
    "11:07:42 UTC",
    "10:07:42 UTC";
    "timezone name round trips verbatim"
)]
#[test_case(
    "%H:%M:%S %Z", -3600,
    "11:07:42 utc",
    "10:07:42 utc";
    "lowercase timezone name round trips verbatim"
)]
#[test_case(
    "%d/%b/%Y:%H:%M:%S", 86400,
    "10/Oct/2000:13:55:36 \"GET /apache.gif\"",
    "11/Oct/2000:13:55:36 \"GET /apache.gif\"";
    "clf access log a day forwards"
)]
#[test_case(
    "%I:%M %p", 3600,
    "lunch at 11:30 AM",
    "lunch at 12:30 PM";
    "twelve hour clock across noon"
)]
#[test_case(
    "%I:%M", 60,
    "09:59",
    "10:00";
    "twelve hour clock without marker reads as am"
)]
#[test_case(
    "%y%m%d", 86400,
    "log-150807.txt",
    "log-150808.txt";
    "compact date inside a file name"
)]
#[test_case(
    "%j of %Y", 86400,
    "day 061 of 2020",
    "day 062 of 2020";
    "ordinal day forwards"
)]
fn test_shift_line(
    format: &str,
    delta_seconds: i64,
    input: &str,
    expect: &str,
) {
    let delta = TimeDelta::try_seconds(delta_seconds).unwrap();
    let (shifted, _count) = shift_str(format, delta, input);
    assert_eq!(shifted, expect);
}

#[test]
fn test_no_match_passthrough() {
    let delta = TimeDelta::try_hours(4).unwrap();
    let (shifted, count) = shift_str("%H:%M:%S", delta, "no timestamps in here");
    assert_eq!(shifted, "no timestamps in here");
    assert_eq!(count, 0);
}

#[test]
fn test_delta_inverse() {
    let input = "started 2015-08-07T11:07:42 exactly";
    let forwards = TimeDelta::try_minutes(90).unwrap();
    let (shifted, _) = shift_str(TIMESTAMP_FORMAT_DEFAULT, forwards, input);
    assert_eq!(shifted, "started 2015-08-07T12:37:42 exactly");
    let (back, _) = shift_str(TIMESTAMP_FORMAT_DEFAULT, -forwards, &shifted);
    assert_eq!(back, input);
}

#[test]
fn test_millisecond_delta() {
    let delta = TimeDelta::try_milliseconds(500).unwrap();
    let (shifted, _) = shift_str("%H:%M:%S.%f", delta, "at 10:00:01.700000000");
    assert_eq!(shifted, "at 10:00:02.200000000");
}

#[test]
fn test_bytes_outside_matches_survive() {
    let shifter = shifter_default("%H:%M:%S", TimeDelta::try_minutes(30).unwrap());
    // 0xFF is not valid UTF-8; it is outside the match and must pass
    // through untouched
    let (shifted, count) = shifter
        .shift_bytes(b"\xff\xfe (20:49:47) hi\n")
        .unwrap();
    assert_eq!(shifted, b"\xff\xfe (21:19:47) hi\n".to_vec());
    assert_eq!(count, 1);
}

// "39" satisfies the deliberately lax day-of-month regex shape (one or
// two digits, first digit 0-3); chrono rejects it during the per-match
// parse, loudly
#[test]
fn test_lax_day_shape_matches_then_parse_fails() {
    let shifter = shifter_default("%Y-%m-%d", TimeDelta::try_hours(1).unwrap());
    match shifter.shift_bytes(b"2015-08-39") {
        Err(ShiftError::ParseMatch { text, .. }) => assert_eq!(text, "2015-08-39"),
        Err(err) => panic!("unexpected error {:?}", err),
        Ok((shifted, _)) => panic!("impossible day shifted to {:?}", shifted),
    }
}

#[test]
fn test_shift_beyond_datetime_range_is_an_error() {
    // far past chrono's representable ceiling
    let delta = TimeDelta::try_hours(2_000_000_000_000).unwrap();
    let shifter = shifter_default("%Y-%m-%dT%H:%M:%S", delta);
    match shifter.shift_bytes(b"9999-12-31T23:30:00") {
        Err(ShiftError::Render { .. }) => {}
        Err(err) => panic!("unexpected error {:?}", err),
        Ok((shifted, _)) => panic!("out-of-range shift rendered {:?}", shifted),
    }
}
