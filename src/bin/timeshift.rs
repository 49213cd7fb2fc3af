// src/bin/timeshift.rs

//! Driver program _timeshift_ drives the [_tslib_].
//!
//! Processes user-passed command-line arguments, then processes the
//! passed files one at a time. For each file, every line is searched for
//! occurrences of the user-described timestamp format; each occurrence is
//! parsed, shifted by the user-passed time difference, and re-rendered in
//! place. The result is written to a side file
//! (`"<stem> <timediff><extension>"`), optionally renamed over the
//! original (`--overwrite`), or only printed (`--not-really`).
//!
//! A fatal error for one file does not stop processing of subsequent
//! files; the process exits nonzero if any file failed.
//!
//! [_tslib_]: tslib

#![allow(non_camel_case_types)]

use std::process::ExitCode;

extern crate clap;
use clap::Parser;

extern crate const_format;
use const_format::concatcp;

extern crate si_trace_print;
#[allow(unused_imports)]
use si_trace_print::{dpfn, dpfo, dpfx};

use ::tslib::common::FPath;
use ::tslib::data::datetime::{TimestampShifter, DIRECTIVE_TABLE, TIMESTAMP_FORMAT_DEFAULT};
use ::tslib::data::timediff::TimeDiff;
use ::tslib::printer::printers::{print_error, print_processing};
use ::tslib::readers::fileshifter::FileShifter;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const CLI_HELP_AFTER: &str = concatcp!(
    "\
Describe the timestamp format with strftime directives
(https://docs.rs/chrono/latest/chrono/format/strftime/):

  %Y %y %m %b %B %d %e %j   date components and month names
  %H %k %I %l %p %M %S %f   time components and the AM/PM marker
  %a %A %w %U %W            weekday names and week numbers
  %z %:z %Z                 UTC offset and timezone name (matched as text)
  %c %x %X %%               locale composite representations, literal '%'

Say an IM log looks like:

  (20:49:47) aidaho: Hey, did you know we found liquid water on Mars?

the brackets contain timestamps described by \"%H:%M:%S\". A GPS track line

  <time>2015-08-07T11:07:42Z</time>

is described by \"%Y-%m-%dT%H:%M:%SZ\".

The time difference is '+-Hours[:Minutes[:Seconds[:Milliseconds]]]'.
Preceding positions cannot be skipped, nullify them instead:
'+2' is two hours forwards, '-1:30' is ninety minutes backwards,
'+0:0:30' is thirty seconds forwards, '-4:0:45' is four hours and
forty-five seconds backwards.

Examples:

  timeshift --format=\"%H:%M:%S\" --time-diff=\"+0:30\" chat.log
  timeshift --format=\"%Y-%m-%dT%H:%M:%SZ\" --time-diff=\"-02:03\" track.gpx

Month, weekday, and AM/PM names are matched and parsed in English
(the C locale); data carrying such names in another language will not
match. The default format is \"",
    TIMESTAMP_FORMAT_DEFAULT,
    "\".",
);

// the `about` is taken from `Cargo.toml:[package]:description`
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    after_help = CLI_HELP_AFTER,
    before_help = "TimeShift rewrites every timestamp occurrence in the passed file(s) by a fixed time difference, preserving the original textual format."
)]
struct CLI_Args {
    /// Input file(s).
    #[arg(required = true, value_name = "FILE")]
    files: Vec<FPath>,

    /// Timestamp format of the data source, in strftime directives.
    #[arg(
        short = 'f',
        long,
        value_name = "TIME_FORMAT",
        default_value = TIMESTAMP_FORMAT_DEFAULT,
    )]
    format: String,

    /// Shift timestamps by this time difference.
    #[arg(
        short = 't',
        long = "time-diff",
        value_name = "+-H[:M[:S[:MS]]]",
        value_parser = cli_parse_timediff,
    )]
    timediff: TimeDiff,

    /// Write into the source file(s); the original is replaced only after
    /// a fully successful pass.
    #[arg(long)]
    overwrite: bool,

    /// Print changes instead of doing them. Implies '--verbose'.
    #[arg(short = 'n', long = "not-really")]
    not_really: bool,

    /// Print processed lines.
    #[arg(long)]
    verbose: bool,
}

/// clap argument value parser for `--time-diff`.
fn cli_parse_timediff(timediff: &str) -> std::result::Result<TimeDiff, String> {
    TimeDiff::parse(timediff)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// main
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn main() -> ExitCode {
    let args = CLI_Args::parse();
    dpfn!("main() args {:?}", args);

    // the format must compile before any file is opened
    let shifter = match TimestampShifter::new(&args.format, args.timediff.delta, &DIRECTIVE_TABLE) {
        Ok(shifter) => shifter,
        Err(err) => {
            print_error(&err.to_string());
            dpfx!("main() ExitCode 1");

            return ExitCode::from(1);
        }
    };
    let fileshifter = FileShifter::new(
        &shifter,
        &args.timediff.literal,
        args.overwrite,
        args.not_really,
        args.verbose,
    );

    // a fatal error for one file must not stop processing of the rest
    let mut ret = ExitCode::SUCCESS;
    for path in args.files.iter() {
        print_processing(path);
        match fileshifter.process(path) {
            Ok(summary) => {
                dpfo!("processed {:?}", summary);
            }
            Err(err) => {
                print_error(&format!("{:#}", err));
                ret = ExitCode::from(1);
            }
        }
        if args.not_really {
            // readability of the dry-run output
            println!();
        }
    }
    dpfx!("main() {:?}", ret);

    ret
}
