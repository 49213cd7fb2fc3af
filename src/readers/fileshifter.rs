// src/readers/fileshifter.rs

//! Implements a [`FileShifter`], the per-file driver around a
//! [`TimestampShifter`].
//!
//! One file is processed at a time, one line at a time, one match at a
//! time; no shared mutable state exists across files.
//!
//! The destination is always written as a side file first
//! (`"<stem> <timediff><extension>"`); only after a fully successful,
//! error-free pass does `--overwrite` delete the original and rename the
//! side file over it. A fatal error for one file removes its partial side
//! file and never touches the original.
//!
//! [`FileShifter`]: self::FileShifter
//! [`TimestampShifter`]: crate::data::datetime::TimestampShifter

use crate::common::{Count, FPath, File, NLu8, Path};
use crate::data::datetime::TimestampShifter;
use crate::printer::printers::write_stdout;

use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};

extern crate anyhow;
use anyhow::Context;

extern crate si_trace_print;
#[allow(unused_imports)]
use si_trace_print::{dpfn, dpfo, dpfx};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileShifter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Accumulated facts about one processed file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryFileShift {
    /// the processed file
    pub path: FPath,
    /// the written destination; `None` in `--not-really` mode
    pub path_output: Option<FPath>,
    /// count of lines read
    pub count_lines: Count,
    /// count of timestamps shifted across all lines
    pub count_shifts: Count,
}

/// Drives one file at a time through a [`TimestampShifter`]:
/// read lines, substitute matches, write the side file, then handle
/// `--overwrite`/`--not-really`/`--verbose` bookkeeping.
///
/// [`TimestampShifter`]: crate::data::datetime::TimestampShifter
pub struct FileShifter<'a> {
    /// the compiled format and delta; shared read-only across files
    shifter: &'a TimestampShifter,
    /// the time difference literal, embedded in the output file name
    timediff_literal: &'a str,
    /// replace the original file on success
    overwrite: bool,
    /// dry-run; write nothing, print every processed line
    not_really: bool,
    /// print every processed line
    verbose: bool,
}

impl<'a> FileShifter<'a> {
    pub fn new(
        shifter: &'a TimestampShifter,
        timediff_literal: &'a str,
        overwrite: bool,
        not_really: bool,
        verbose: bool,
    ) -> FileShifter<'a> {
        FileShifter {
            shifter,
            timediff_literal,
            overwrite,
            // dry-run mode always prints the processed lines
            not_really,
            verbose: verbose || not_really,
        }
    }

    /// Process one file start to finish.
    ///
    /// On any error after the side file was created, the side file is
    /// removed; the original is replaced only after a fully successful
    /// pass with `--overwrite`.
    pub fn process(
        &self,
        path: &FPath,
    ) -> anyhow::Result<SummaryFileShift> {
        dpfn!("FileShifter::process({:?})", path);
        let file = File::open(path).with_context(|| format!("failed to read {:?}", path))?;
        let mut reader = BufReader::new(file);
        let path_output = path_output(path, self.timediff_literal);
        let mut writer: Option<BufWriter<File>> = match self.not_really {
            true => None,
            false => {
                let file_output = File::create(&path_output)
                    .with_context(|| format!("failed to create {:?}", path_output))?;

                Some(BufWriter::new(file_output))
            }
        };

        let mut summary = SummaryFileShift {
            path: path.clone(),
            path_output: match self.not_really {
                true => None,
                false => Some(path_output.clone()),
            },
            ..SummaryFileShift::default()
        };
        match self.shift_lines(&mut reader, writer.as_mut(), path, &mut summary) {
            Ok(_) => {}
            Err(err) => {
                // never leave a partial side file behind
                drop(writer);
                if !self.not_really {
                    let _ = fs::remove_file(&path_output);
                }
                dpfx!("FileShifter::process({:?}) Err", path);

                return Err(err);
            }
        }
        if let Some(writer_) = writer.as_mut() {
            if let Err(err) = writer_.flush() {
                drop(writer);
                let _ = fs::remove_file(&path_output);

                return Err(err).with_context(|| format!("failed to write {:?}", path_output));
            }
        }
        drop(writer);

        // replace the original only after the fully successful pass
        if self.overwrite && !self.not_really {
            fs::remove_file(path).with_context(|| format!("failed to remove {:?}", path))?;
            fs::rename(&path_output, path)
                .with_context(|| format!("failed to rename {:?} to {:?}", path_output, path))?;
            summary.path_output = Some(path.clone());
        }
        dpfx!("FileShifter::process({:?}) {:?}", path, summary);

        Ok(summary)
    }

    /// The line loop: read every line (line ending included), shift every
    /// match within it, echo and write the result.
    fn shift_lines(
        &self,
        reader: &mut BufReader<File>,
        mut writer: Option<&mut BufWriter<File>>,
        path: &FPath,
        summary: &mut SummaryFileShift,
    ) -> anyhow::Result<()> {
        let mut line = Vec::<u8>::with_capacity(256);
        loop {
            line.clear();
            let size = reader
                .read_until(NLu8, &mut line)
                .with_context(|| format!("failed to read {:?}", path))?;
            if size == 0 {
                break;
            }
            summary.count_lines += 1;
            let (shifted, count) = self
                .shifter
                .shift_bytes(&line)
                .with_context(|| format!("failed shifting {:?} line {}", path, summary.count_lines))?;
            summary.count_shifts += count;
            if self.verbose {
                write_stdout(&shifted);
            }
            if let Some(writer_) = writer.as_mut() {
                writer_
                    .write_all(&shifted)
                    .with_context(|| format!("failed to write line {}", summary.count_lines))?;
            }
        }
        dpfo!(
            "shift_lines({:?}): {} lines, {} shifts",
            path,
            summary.count_lines,
            summary.count_shifts,
        );

        Ok(())
    }
}

/// Derive the side-file path: `"<stem> <timediff literal><extension>"`
/// alongside the original, e.g. `chat.log` shifted by `+0:30` is written
/// to `chat +0:30.log`.
pub fn path_output(
    path: &FPath,
    timediff_literal: &str,
) -> FPath {
    let path_ = Path::new(path);
    let name = match (path_.file_stem(), path_.extension()) {
        (Some(stem), Some(extension)) => format!(
            "{} {}.{}",
            stem.to_string_lossy(),
            timediff_literal,
            extension.to_string_lossy(),
        ),
        (Some(stem), None) => format!("{} {}", stem.to_string_lossy(), timediff_literal),
        // a bare path like "/"; nothing sensible to derive from
        (None, _) => format!("{} {}", path, timediff_literal),
    };
    match path_.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.join(name).to_string_lossy().into_owned()
        }
        _ => name,
    }
}
