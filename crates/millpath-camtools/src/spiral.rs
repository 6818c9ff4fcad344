//! Contour-parallel ("spiral") clearing of closed outlines.

use crate::error::{CamToolError, Result};
use crate::offset::offset_closed;
use millpath_core::{Axes, FloatRange, MotionStream, Polyline, Zones};
use millpath_settings::CutSettings;

/// Upper bound on rings per outline; reached only with a pathological
/// step-over.
const MAX_RINGS: usize = 10_000;

/// Inward offset rings of a closed polyline, outermost first.
///
/// The first ring sits `first_offset` inside the outline and each following
/// ring another `step` further in, until the offset vanishes.
pub fn spiral_rings(polyline: &Polyline, first_offset: f64, step: f64) -> Result<Vec<Polyline>> {
    if !(step > 0.0 && step.is_finite()) {
        return Err(CamToolError::InvalidParameters(format!(
            "ring step-over must be positive, got {}",
            step
        )));
    }

    let mut rings = Vec::new();
    let mut offset = first_offset;
    for _ in 0..MAX_RINGS {
        let level = offset_closed(polyline, offset)?;
        if level.is_empty() {
            return Ok(rings);
        }
        rings.extend(level);
        offset += step;
    }
    Err(CamToolError::InvalidParameters(format!(
        "more than {} rings at step-over {}",
        MAX_RINGS, step
    )))
}

/// Clears the inside of every closed polyline with offset rings.
///
/// Rings are cut innermost first at each depth pass, so the tool works
/// outward into uncut material.
pub fn spiral(stream: &mut MotionStream<'_>, settings: &CutSettings, zones: &Zones) {
    if settings.depth == 0.0 {
        stream.comment("depth is 0, skipping spiral");
        return;
    }

    let mut rings = Vec::new();
    for polyline in zones.closed() {
        match spiral_rings(polyline, settings.tool_radius(), settings.tool_step_over) {
            Ok(mut level) => {
                level.reverse();
                rings.extend(level);
            }
            Err(err) => {
                tracing::warn!("spiral: {}", err);
                stream.comment(format!("spiral: {}, skipping polyline", err));
            }
        }
    }
    if rings.is_empty() {
        stream.comment("spiral: nothing to clear");
        return;
    }
    tracing::debug!("spiral: {} rings", rings.len());

    for depth in FloatRange::new(
        -settings.start_depth,
        -settings.depth,
        -settings.depth_increment,
    )
    .inclusive()
    {
        stream.comment(format!("depth: {:.5}", depth));
        let mut ring_stream = stream.indent();
        for ring in &rings {
            let Some(start) = ring.first() else {
                continue;
            };
            ring_stream.safe_height(settings);
            ring_stream.rapid(
                "rapid to start of ring",
                Axes::at_xy(start.x, start.y).with_feed(settings.rapid_xy),
            );
            ring_stream.linear("plunge", Axes::at_z(depth).with_feed(settings.feed_z));
            for p in ring.points.iter().skip(1) {
                ring_stream.linear("", Axes::at_xy(p.x, p.y).with_feed(settings.feed_xy));
            }
        }
        ring_stream.safe_height(settings);
    }
}
