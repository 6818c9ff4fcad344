//! Abstract motion commands and the stream the toolpath generators write to.
//!
//! Generators never format G-code themselves. They call into a
//! [`MotionStream`], which tags each command with a nesting level and hands it
//! to a [`MotionSink`]. Sinks decide whether the command becomes text
//! ([`crate::GcodeText`]), bytes on a writer ([`crate::GcodeWriter`]) or a
//! record for inspection ([`MotionLog`]).

use std::fmt;

/// Optional axis words and feed rate carried by a move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub feed: Option<f64>,
}

impl Axes {
    pub fn at_xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn at_z(z: f64) -> Self {
        Self {
            z: Some(z),
            ..Self::default()
        }
    }

    pub fn at_xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            feed: None,
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_feed(mut self, feed: f64) -> Self {
        self.feed = Some(feed);
        self
    }
}

/// Modal and program-control codes used to frame a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalCode {
    /// G17
    SelectPlaneXy,
    /// G21
    UnitsMm,
    /// G40
    CompensationOff,
    /// G90
    AbsoluteDistance,
    /// M02
    EndProgram,
}

impl ModalCode {
    pub fn code(&self) -> &'static str {
        match self {
            ModalCode::SelectPlaneXy => "G17",
            ModalCode::UnitsMm => "G21",
            ModalCode::CompensationOff => "G40",
            ModalCode::AbsoluteDistance => "G90",
            ModalCode::EndProgram => "M02",
        }
    }
}

/// One emitted instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionCommand {
    /// Non-cutting travel (G00).
    Rapid {
        axes: Axes,
        comment: Option<String>,
    },
    /// Cutting feed (G01).
    Linear {
        axes: Axes,
        comment: Option<String>,
    },
    /// Annotation only.
    Comment(String),
    /// Program framing code.
    Modal {
        code: ModalCode,
        comment: Option<String>,
    },
}

impl MotionCommand {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            MotionCommand::Rapid { .. } => Some("G00"),
            MotionCommand::Linear { .. } => Some("G01"),
            MotionCommand::Comment(_) => None,
            MotionCommand::Modal { code, .. } => Some(code.code()),
        }
    }

    pub fn axes(&self) -> Option<&Axes> {
        match self {
            MotionCommand::Rapid { axes, .. } | MotionCommand::Linear { axes, .. } => Some(axes),
            _ => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            MotionCommand::Rapid { comment, .. }
            | MotionCommand::Linear { comment, .. }
            | MotionCommand::Modal { comment, .. } => comment.as_deref(),
            MotionCommand::Comment(text) => Some(text),
        }
    }

    pub fn is_rapid(&self) -> bool {
        matches!(self, MotionCommand::Rapid { .. })
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, MotionCommand::Linear { .. })
    }
}

/// Parentheses would end a G-code comment early.
fn encode_comment(comment: &str) -> String {
    comment.replace('(', "{").replace(')', "}")
}

fn write_axis(f: &mut fmt::Formatter<'_>, letter: char, value: Option<f64>) -> fmt::Result {
    match value {
        Some(v) => write!(f, " {}{:.5}", letter, v),
        None => Ok(()),
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let MotionCommand::Comment(text) = self {
            return write!(f, "({})", encode_comment(text));
        }
        if let Some(code) = self.code() {
            f.write_str(code)?;
        }
        if let Some(axes) = self.axes() {
            write_axis(f, 'X', axes.x)?;
            write_axis(f, 'Y', axes.y)?;
            write_axis(f, 'Z', axes.z)?;
            write_axis(f, 'F', axes.feed)?;
        }
        match self.comment() {
            Some(comment) if !comment.is_empty() => write!(f, " ({})", encode_comment(comment)),
            _ => Ok(()),
        }
    }
}

/// Receiver of motion commands, in emission order.
pub trait MotionSink {
    fn emit(&mut self, level: usize, command: MotionCommand);
}

/// Safe-height retract parameters.
pub trait RetractParameters {
    /// Z height clear of the material.
    fn safe_height(&self) -> f64;
    /// Feed used for the vertical rapid.
    fn rapid_z(&self) -> f64;
}

/// In-memory sink recording every command with its nesting level.
#[derive(Debug, Clone, Default)]
pub struct MotionLog {
    pub entries: Vec<(usize, MotionCommand)>,
}

impl MotionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn commands(&self) -> impl Iterator<Item = &MotionCommand> {
        self.entries.iter().map(|(_, command)| command)
    }

    /// Everything except comments.
    pub fn moves(&self) -> impl Iterator<Item = &MotionCommand> {
        self.commands()
            .filter(|c| matches!(c, MotionCommand::Rapid { .. } | MotionCommand::Linear { .. }))
    }
}

impl MotionSink for MotionLog {
    fn emit(&mut self, level: usize, command: MotionCommand) {
        self.entries.push((level, command));
    }
}

fn non_empty(comment: String) -> Option<String> {
    if comment.is_empty() {
        None
    } else {
        Some(comment)
    }
}

/// Handle through which toolpath generators emit commands.
///
/// `indent` hands out a child stream one level deeper that borrows the same
/// sink, so output stays in strict call order.
pub struct MotionStream<'a> {
    sink: &'a mut dyn MotionSink,
    level: usize,
}

impl<'a> MotionStream<'a> {
    pub fn new(sink: &'a mut dyn MotionSink) -> Self {
        Self { sink, level: 0 }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn indent(&mut self) -> MotionStream<'_> {
        MotionStream {
            sink: &mut *self.sink,
            level: self.level + 1,
        }
    }

    pub fn emit(&mut self, command: MotionCommand) {
        self.sink.emit(self.level, command);
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.emit(MotionCommand::Comment(text.into()));
    }

    pub fn rapid(&mut self, comment: impl Into<String>, axes: Axes) {
        self.emit(MotionCommand::Rapid {
            axes,
            comment: non_empty(comment.into()),
        });
    }

    pub fn linear(&mut self, comment: impl Into<String>, axes: Axes) {
        self.emit(MotionCommand::Linear {
            axes,
            comment: non_empty(comment.into()),
        });
    }

    pub fn modal(&mut self, code: ModalCode, comment: impl Into<String>) {
        self.emit(MotionCommand::Modal {
            code,
            comment: non_empty(comment.into()),
        });
    }

    /// Rapid straight up to the safe height.
    pub fn safe_height<R: RetractParameters + ?Sized>(&mut self, retract: &R) {
        self.rapid(
            "raise cutter to safe height",
            Axes::at_z(retract.safe_height()).with_feed(retract.rapid_z()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Retract;

    impl RetractParameters for Retract {
        fn safe_height(&self) -> f64 {
            6.35
        }
        fn rapid_z(&self) -> f64 {
            1524.0
        }
    }

    #[test]
    fn test_display_linear_with_comment() {
        let cmd = MotionCommand::Linear {
            axes: Axes::at_xy(1.0, 2.5).with_feed(635.0),
            comment: Some("cut (outer)".to_string()),
        };
        assert_eq!(
            cmd.to_string(),
            "G01 X1.00000 Y2.50000 F635.00000 (cut {outer})"
        );
    }

    #[test]
    fn test_display_comment_only() {
        let cmd = MotionCommand::Comment("depth:(1)".to_string());
        assert_eq!(cmd.to_string(), "({depth:{1}})");
    }

    #[test]
    fn test_display_modal() {
        let cmd = MotionCommand::Modal {
            code: ModalCode::UnitsMm,
            comment: Some("mm mode".to_string()),
        };
        assert_eq!(cmd.to_string(), "G21 (mm mode)");
    }

    #[test]
    fn test_indent_levels() {
        let mut log = MotionLog::new();
        {
            let mut stream = MotionStream::new(&mut log);
            stream.comment("root");
            {
                let mut child = stream.indent();
                child.comment("child");
                child.indent().comment("grandchild");
            }
            stream.comment("root again");
        }
        let levels: Vec<usize> = log.entries.iter().map(|(level, _)| *level).collect();
        assert_eq!(levels, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_safe_height() {
        let mut log = MotionLog::new();
        MotionStream::new(&mut log).safe_height(&Retract);
        assert_eq!(log.len(), 1);
        let cmd = &log.entries[0].1;
        assert!(cmd.is_rapid());
        let axes = cmd.axes().copied().unwrap_or_default();
        assert_eq!(axes.z, Some(6.35));
        assert_eq!(axes.feed, Some(1524.0));
        assert_eq!(axes.x, None);
    }

    #[test]
    fn test_empty_comment_is_dropped() {
        let mut log = MotionLog::new();
        MotionStream::new(&mut log).linear("", Axes::at_z(-1.0));
        assert_eq!(log.entries[0].1.comment(), None);
        assert_eq!(log.entries[0].1.to_string(), "G01 Z-1.00000");
    }
}
