//! # Millpath
//!
//! Toolpath generation for CNC milling from 2D vector outlines.
//!
//! ## Architecture
//!
//! Millpath is organized as a workspace with multiple crates:
//!
//! 1. **millpath-core** - Geometry, motion commands, G-code sinks, distance units
//! 2. **millpath-settings** - Per-element cut settings, style resolution, profiles
//! 3. **millpath-camtools** - Curve flattening, depth-ramp contours with tabs,
//!    scanline pockets, edge offsets, spiral fills
//! 4. **millpath-designer** - Element tree, recursive export, document programs
//! 5. **millpath** - This facade
//!
//! ## Features
//!
//! - **Ramped contours**: every pass descends gradually along the outline
//! - **Retention tabs**: periodic uncut bridges that hold the part in the stock
//! - **Pocket clearing**: horizontal scanline hatching or contour-parallel rings
//! - **Tool compensation**: inside/outside offsets by the tool radius

use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub use millpath_core::{
    mm_from_inch, parse_distance, resolve_distance, Axes, Bounds, CoreError, FloatRange,
    GcodeText, GcodeWriter, LengthUnit, ModalCode, MotionCommand, MotionLog, MotionSink,
    MotionStream, Point, Polyline, RetractParameters, Transform, Zones,
};

pub use millpath_settings::{
    CutSettings, EdgeMode, FillMode, SettingsError, SettingsProfile, StyleProperties,
};

pub use millpath_camtools::{
    apply_edge_mode, contour, cut_polyline_at_depth, flatten, offset_closed, pocket,
    scanline_intersections, spiral, spiral_rings, CamToolError, PathCommand, SafeHeightLatch,
    ZonesBuilder,
};

pub use millpath_designer::{
    export_program, page_to_machine, visit_element, DesignerError, Document, Element,
    ElementKind, PageCorner, ProgramHeader,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, so G-code can go to stdout
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(())
}

/// Exports `document` as G-code to `out`, stamping the header with the
/// current time.
pub fn export_to_writer<W: Write>(document: &Document, out: W) -> anyhow::Result<W> {
    let header = document.header().generated_now();
    document
        .write_gcode(out, &header)
        .with_context(|| format!("failed to write G-code for {:?}", document.name))
}

/// Loads a JSON document from `input` and writes its G-code program to
/// `output`.
pub fn export_document_file(input: &Path, output: &Path) -> anyhow::Result<()> {
    let document = Document::load(input)
        .with_context(|| format!("failed to load document {}", input.display()))?;
    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut out = export_to_writer(&document, BufWriter::new(file))?;
    out.flush()
        .with_context(|| format!("failed to flush {}", output.display()))?;

    tracing::info!(
        "wrote {} ({} top-level elements) to {}",
        document.name,
        document.elements.len(),
        output.display()
    );
    Ok(())
}
