//! Even-odd scanline pocketing of closed outlines.

use millpath_core::{Axes, Bounds, FloatRange, MotionStream, Zones};
use millpath_settings::CutSettings;

/// X coordinates where the horizontal line at `y` crosses the closed
/// polylines of `zones`, sorted ascending.
///
/// Each segment's Y span is half-open (lower end inclusive, upper end
/// exclusive), so a scanline through a shared vertex is counted once.
/// Horizontal segments never cross. Open polylines bound no area and are
/// ignored.
pub fn scanline_intersections(zones: &Zones, y: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for polyline in zones.closed() {
        for (p0, p1) in polyline.segments() {
            if p0.y == p1.y {
                continue;
            }
            let crosses = (p0.y <= y && y < p1.y) || (p1.y <= y && y < p0.y);
            if !crosses {
                continue;
            }
            xs.push((y - p0.y) * (p1.x - p0.x) / (p1.y - p0.y) + p0.x);
        }
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Clears the inside of every closed polyline with horizontal scan passes.
///
/// For each depth pass, scanlines run from the bottom of the outlines plus the
/// tool radius to the top minus the tool radius, one step-over apart. Sorted
/// crossings alternate between a travel to the next entry point and a cut
/// across to the following exit point.
pub fn pocket(stream: &mut MotionStream<'_>, settings: &CutSettings, zones: &Zones) {
    if settings.depth == 0.0 {
        stream.comment("depth is 0, skipping pocket");
        return;
    }
    let mut bounds = Bounds::new();
    for polyline in zones.closed() {
        polyline.accumulate_bounds(&mut bounds);
    }
    if bounds.is_empty() {
        stream.comment("no closed polylines to pocket");
        return;
    }
    stream.comment(format!("pocket bounds: {}", bounds));

    let radius = settings.tool_radius();
    for depth in FloatRange::new(
        -settings.start_depth,
        -settings.depth,
        -settings.depth_increment,
    )
    .inclusive()
    {
        stream.comment(format!("depth: {:.5}", depth));
        let mut scan = stream.indent();
        for y in FloatRange::new(bounds.y0 + radius, bounds.y1 - radius, settings.tool_step_over) {
            scan.comment(format!("y: {:.5}", y));
            let mut segments = scan.indent();
            let xs = scanline_intersections(zones, y);
            if xs.len() % 2 != 0 {
                tracing::warn!(
                    "pocket: {} crossings at y={:.5}; last travel has no matching cut",
                    xs.len(),
                    y
                );
            }

            let mut up = true;
            for x in xs {
                if up {
                    segments.safe_height(settings);
                    segments.rapid(
                        "rapid to scan start",
                        Axes::at_xy(x, y).with_feed(settings.rapid_xy),
                    );
                } else {
                    segments.linear("plunge", Axes::at_z(depth).with_feed(settings.feed_z));
                    segments.linear("scan", Axes::at_xy(x, y).with_feed(settings.feed_xy));
                    segments.safe_height(settings);
                }
                up = !up;
            }
        }
    }
}
