//! G-code text sinks.
//!
//! Each nesting level indents the line by two spaces so the generated program
//! mirrors the structure of the document that produced it.

use crate::error::Result;
use crate::motion::{MotionCommand, MotionSink};
use std::io::Write;

const INDENT_WIDTH: usize = 2;

fn render_line(level: usize, command: &MotionCommand) -> String {
    format!("{:width$}{}\n", "", command, width = level * INDENT_WIDTH)
}

/// Renders commands into an in-memory G-code program.
#[derive(Debug, Clone, Default)]
pub struct GcodeText {
    text: String,
}

impl GcodeText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

impl MotionSink for GcodeText {
    fn emit(&mut self, level: usize, command: MotionCommand) {
        self.text.push_str(&render_line(level, &command));
    }
}

/// Streams G-code to a writer.
///
/// Sinks cannot fail mid-traversal, so the first write error is latched and
/// every later command is dropped; `finish` reports it.
pub struct GcodeWriter<W: Write> {
    out: W,
    error: Option<std::io::Error>,
    lines_written: usize,
}

impl<W: Write> GcodeWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            error: None,
            lines_written: 0,
        }
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flushes and returns the writer, or the first I/O error seen.
    pub fn finish(mut self) -> Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err.into());
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> MotionSink for GcodeWriter<W> {
    fn emit(&mut self, level: usize, command: MotionCommand) {
        if self.error.is_some() {
            return;
        }
        match self.out.write_all(render_line(level, &command).as_bytes()) {
            Ok(()) => self.lines_written += 1,
            Err(err) => {
                tracing::warn!("G-code output failed after {} lines: {}", self.lines_written, err);
                self.error = Some(err);
            }
        }
    }
}
