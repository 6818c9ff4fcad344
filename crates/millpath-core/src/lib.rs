//! # Millpath Core
//!
//! Core types shared by every Millpath crate.
//!
//! - **Geometry**: points, polylines, zone collections, bounds and arc length
//! - **Motion**: the abstract motion-command model and the [`MotionStream`]
//!   handle the toolpath generators write through
//! - **G-code**: text sinks that render motion commands as G-code
//! - **Units**: the numeric distance resolver (`"1/4in"` → millimetres)
//! - **Ranges**: floating point stepping used by multi-pass operations

pub mod error;
pub mod gcode;
pub mod geometry;
pub mod motion;
pub mod range;
pub mod units;

pub use error::{CoreError, Result};
pub use gcode::{GcodeText, GcodeWriter};
pub use geometry::{segment_length, Bounds, Point, Polyline, Transform, Zones};
pub use motion::{
    Axes, ModalCode, MotionCommand, MotionLog, MotionSink, MotionStream, RetractParameters,
};
pub use range::FloatRange;
pub use units::{mm_from_inch, parse_distance, resolve_distance, LengthUnit};
