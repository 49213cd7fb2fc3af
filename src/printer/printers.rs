// src/printer/printers.rs

//! Helper functions for printing to the console.
//!
//! Byte-oriented where processed lines are echoed (`--verbose`,
//! `--not-really`); lines are written through without `char`
//! interpretation so non-UTF-8 bytes survive.

use crate::common::FPath;

use std::io::Write;

#[doc(hidden)]
pub use ::termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Color`] for the per-file "Processing:" banner.
///
/// [`Color`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.Color.html
pub const COLOR_BANNER: Color = Color::Cyan;

/// [`Color`] for user-facing error messages.
///
/// [`Color`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.Color.html
pub const COLOR_ERROR: Color = Color::Red;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// printer functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Print colored output to terminal if possible using the passed stream,
/// otherwise print plain output.
///
/// See an example <https://docs.rs/termcolor/1.4.1/termcolor/#detecting-presence-of-a-terminal>.
pub fn print_colored(
    color: Color,
    value: &[u8],
    out: &mut termcolor::StandardStream,
) -> std::io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    out.write_all(value)?;
    out.reset()?;
    out.flush()?;

    Ok(())
}

/// Print colored output to terminal on stderr.
pub fn print_colored_stderr(
    color: Color,
    value: &[u8],
) -> std::io::Result<()> {
    let mut stderr = termcolor::StandardStream::stderr(ColorChoice::Auto);
    let _stderr_lock = std::io::stderr().lock();

    print_colored(color, value, &mut stderr)
}

/// Print a user-facing error message, red, to stderr.
pub fn print_error(message: &str) {
    let message_ = format!("ERROR: {}\n", message);
    if print_colored_stderr(COLOR_ERROR, message_.as_bytes()).is_err() {
        // last resort
        eprintln!("{}", message_);
    }
}

/// Print the per-file banner, e.g. `Processing: chat.log`, to stdout.
pub fn print_processing(path: &FPath) {
    let mut stdout = termcolor::StandardStream::stdout(ColorChoice::Auto);
    let banner = format!("Processing: {}\n", path);
    if print_colored(COLOR_BANNER, banner.as_bytes(), &mut stdout).is_err() {
        println!("Processing: {}", path);
    }
}

/// Safely write the `buffer` to stdout, taking the stdout lock.
///
/// Used to echo processed lines in `--verbose` and `--not-really` modes;
/// the buffer carries its own line ending (or none, for a last line
/// missing one).
pub fn write_stdout(buffer: &[u8]) {
    let stdout = std::io::stdout();
    let mut stdout_lock = stdout.lock();
    match stdout_lock.write_all(buffer) {
        Ok(_) => {}
        Err(_err) => {
            // XXX: this will error when stdout is truncated, like due to
            //      `timeshift … | head`; Broken pipe (os error 32)
        }
    }
    match stdout_lock.flush() {
        Ok(_) => {}
        Err(_err) => {}
    }
}
