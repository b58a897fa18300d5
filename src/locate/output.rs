//! Incremental parsing of locator standard output.
//!
//! The locator prints `key:value` lines. Only two keys matter:
//!
//! ```text
//! Input:/home/me/thesis/chapter2.tex
//! Line:42
//! ```
//!
//! Output arrives in arbitrary chunks, so partial lines are buffered until
//! their newline shows up.

use std::path::PathBuf;

use super::LocateError;
use crate::host::NavigationRequest;

const INPUT_PREFIX: &str = "Input:";
const LINE_PREFIX: &str = "Line:";

/// Accumulator for one locator invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocatorResult {
    /// Resolved source file.
    pub input: Option<String>,
    /// 1-based source line.
    pub line: Option<u32>,
    partial: String,
}

impl LocatorResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of output. Complete lines are parsed immediately.
    pub fn feed(&mut self, chunk: &str) {
        self.partial.push_str(chunk);
        while let Some(end) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=end).collect();
            self.parse_line(&line);
        }
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.parse_line(&line);
        }
    }

    fn parse_line(&mut self, line: &str) {
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(rest) = line.strip_prefix(INPUT_PREFIX) {
            self.input = Some(normalize_input_path(rest.trim_start(), cfg!(windows)));
        } else if let Some(rest) = line.strip_prefix(LINE_PREFIX) {
            // A malformed value leaves any earlier line untouched.
            if let Ok(line) = rest.trim().parse::<u32>() {
                self.line = Some(line);
            }
        }
    }

    /// Whether both fields have been populated.
    pub fn is_complete(&self) -> bool {
        self.input.is_some() && self.line.is_some()
    }

    /// Turn a completed result into a navigation request (zero-based line).
    pub fn into_request(self) -> Option<NavigationRequest> {
        let file = PathBuf::from(self.input?);
        let line = self.line?;
        Some(NavigationRequest::new(file, line.saturating_sub(1)))
    }
}

/// Decide the outcome of an invocation from its exit code and output.
///
/// `code` is `None` when the process was terminated by a signal.
pub fn conclude(
    code: Option<i32>,
    mut result: LocatorResult,
) -> Result<NavigationRequest, LocateError> {
    result.finish();
    match code {
        Some(0) => result.into_request().ok_or(LocateError::Incomplete),
        code => Err(LocateError::Exited { code }),
    }
}

/// Replace the first backslash with a forward slash on Windows.
///
/// Only a single separator is rewritten; this is not a path translator.
fn normalize_input_path(raw: &str, windows: bool) -> String {
    if windows {
        raw.replacen('\\', "/", 1)
    } else {
        raw.to_string()
    }
}
