//! Tool-radius offsets of closed outlines.
//!
//! Offsets are computed with `cavalier_contours`, whose results may contain
//! arc segments (encoded as vertex bulges). Those are flattened back into
//! line segments so the cutters only ever see polylines.

use crate::error::{CamToolError, Result};
use cavalier_contours::polyline::{
    PlineSource, PlineSourceMut, PlineVertex, Polyline as CavcPolyline,
};
use millpath_core::{MotionStream, Point, Polyline, Zones};
use millpath_settings::{CutSettings, EdgeMode};
use std::f64::consts::PI;
use std::panic;

/// Arc flattening resolution: one segment per this many radians of sweep.
const ARC_STEP: f64 = PI / 18.0;
const BULGE_EPSILON: f64 = 1e-9;
const POINT_EPSILON: f64 = 1e-9;

fn signed_area(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

/// Distinct vertices of a closed polyline, counter-clockwise.
fn to_cavc(polyline: &Polyline) -> CavcPolyline<f64> {
    let mut points: Vec<Point> = Vec::with_capacity(polyline.len());
    for &p in &polyline.points {
        if points
            .last()
            .is_some_and(|last: &Point| last.distance_to(&p) < POINT_EPSILON)
        {
            continue;
        }
        points.push(p);
    }
    if points.len() > 1 && points[0].distance_to(&points[points.len() - 1]) < POINT_EPSILON {
        points.pop();
    }

    let mut closed_ring = points.clone();
    if let Some(&first) = points.first() {
        closed_ring.push(first);
    }
    if signed_area(&closed_ring) < 0.0 {
        points.reverse();
    }

    let mut pline = CavcPolyline::<f64>::new();
    for p in points {
        pline.add_vertex(PlineVertex::new(p.x, p.y, 0.0));
    }
    pline.set_is_closed(true);
    pline
}

/// Points strictly between `v1` and `v2` along the arc described by `v1`'s
/// bulge.
fn arc_points(v1: &PlineVertex<f64>, v2: &PlineVertex<f64>) -> Vec<Point> {
    let dx = v2.x - v1.x;
    let dy = v2.y - v1.y;
    let chord = (dx * dx + dy * dy).sqrt();
    if chord < POINT_EPSILON {
        return Vec::new();
    }

    let sweep = 4.0 * v1.bulge.atan();
    let radius = chord / (2.0 * (sweep.abs() / 2.0).sin());
    let center_distance = radius * (sweep.abs() / 2.0).cos();
    let side = v1.bulge.signum();
    let cx = (v1.x + v2.x) / 2.0 - dy / chord * center_distance * side;
    let cy = (v1.y + v2.y) / 2.0 + dx / chord * center_distance * side;

    let start = (v1.y - cy).atan2(v1.x - cx);
    let segments = (sweep.abs() / ARC_STEP).ceil().max(1.0) as usize;
    (1..segments)
        .map(|i| {
            let angle = start + sweep * i as f64 / segments as f64;
            Point::new(cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

fn from_cavc(pline: &CavcPolyline<f64>) -> Polyline {
    let vertices = &pline.vertex_data;
    let count = vertices.len();
    let mut points = Vec::with_capacity(count + 1);
    for (i, v) in vertices.iter().enumerate() {
        points.push(Point::new(v.x, v.y));
        let wraps = i + 1 == count;
        if wraps && !pline.is_closed() {
            break;
        }
        if v.bulge.abs() > BULGE_EPSILON {
            points.extend(arc_points(v, &vertices[(i + 1) % count]));
        }
    }
    if pline.is_closed() {
        if let Some(&first) = points.first() {
            points.push(first);
        }
    }
    Polyline::with_points(points, pline.is_closed())
}

/// Offsets a closed polyline by `distance`: positive moves inward, negative
/// outward.
///
/// Returns no polylines when an inward offset consumes the whole shape.
pub fn offset_closed(polyline: &Polyline, distance: f64) -> Result<Vec<Polyline>> {
    if !polyline.closed {
        return Err(CamToolError::InvalidParameters(
            "only closed polylines can be offset".to_string(),
        ));
    }
    if !distance.is_finite() {
        return Err(CamToolError::InvalidParameters(format!(
            "offset distance {} is not finite",
            distance
        )));
    }

    let pline = to_cavc(polyline);
    if pline.vertex_count() < 3 {
        return Err(CamToolError::InvalidParameters(format!(
            "closed polyline has only {} distinct points",
            pline.vertex_count()
        )));
    }

    let offsets = panic::catch_unwind(panic::AssertUnwindSafe(|| pline.parallel_offset(distance)))
        .map_err(|_| CamToolError::Geometry(format!("parallel offset by {} panicked", distance)))?;

    Ok(offsets.iter().map(from_cavc).collect())
}

/// Applies the edge mode to every closed polyline of `zones`.
///
/// Open polylines are cut on the line whatever the mode. Closed polylines
/// that vanish under the offset are dropped with a comment.
pub fn apply_edge_mode(stream: &mut MotionStream<'_>, settings: &CutSettings, zones: &Zones) -> Zones {
    let distance = match settings.edge_mode {
        EdgeMode::Center => return zones.clone(),
        EdgeMode::Inside => settings.tool_radius(),
        EdgeMode::Outside => -settings.tool_radius(),
    };

    let mut result = Zones::new();
    for polyline in zones {
        if !polyline.closed {
            result.push(polyline.clone());
            continue;
        }
        match offset_closed(polyline, distance) {
            Ok(offsets) if offsets.is_empty() => {
                tracing::warn!("{} offset removed {}", settings.edge_mode, polyline);
                stream.comment(format!(
                    "edge mode {}: tool does not fit, skipping polyline",
                    settings.edge_mode
                ));
            }
            Ok(offsets) => {
                for offset in offsets {
                    result.push(offset);
                }
            }
            Err(err) => {
                tracing::warn!("edge offset failed: {}", err);
                stream.comment(format!("edge mode {}: {}, skipping polyline", settings.edge_mode, err));
            }
        }
    }
    tracing::debug!("edge mode {}: {} -> {}", settings.edge_mode, zones, result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use millpath_core::MotionLog;

    fn square(size: f64, clockwise: bool) -> Polyline {
        let mut pts = vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
            Point::new(0.0, 0.0),
        ];
        if clockwise {
            pts.reverse();
        }
        Polyline::with_points(pts, true)
    }

    #[test]
    fn test_signed_area_orientation() {
        assert_eq!(signed_area(&square(10.0, false).points), 100.0);
        assert_eq!(signed_area(&square(10.0, true).points), -100.0);
    }

    #[test]
    fn test_inward_offset_of_square() {
        for clockwise in [false, true] {
            let offsets = offset_closed(&square(10.0, clockwise), 1.0).expect("offset");
            assert_eq!(offsets.len(), 1);
            let bounds = offsets[0].bounds();
            assert!((bounds.x0 - 1.0).abs() < 1e-6);
            assert!((bounds.x1 - 9.0).abs() < 1e-6);
            assert!((bounds.y0 - 1.0).abs() < 1e-6);
            assert!((bounds.y1 - 9.0).abs() < 1e-6);
            assert!(offsets[0].closed);
            assert_eq!(offsets[0].first(), offsets[0].last());
        }
    }

    #[test]
    fn test_outward_offset_rounds_corners() {
        let offsets = offset_closed(&square(10.0, false), -1.0).expect("offset");
        assert_eq!(offsets.len(), 1);
        let ring = &offsets[0];
        let bounds = ring.bounds();
        assert!((bounds.x0 + 1.0).abs() < 1e-6);
        assert!((bounds.x1 - 11.0).abs() < 1e-6);
        // corner arcs are flattened into extra points
        assert!(ring.len() > 9);
        for p in &ring.points {
            let dx = (p.x - 5.0).abs() - 5.0;
            let dy = (p.y - 5.0).abs() - 5.0;
            let outside = (dx.max(0.0).powi(2) + dy.max(0.0).powi(2)).sqrt();
            assert!(outside <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_inward_offset_collapses() {
        let offsets = offset_closed(&square(4.0, false), 3.0).expect("offset");
        assert!(offsets.is_empty());
    }

    #[test]
    fn test_offset_rejects_open_and_degenerate() {
        let open = Polyline::with_points(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], false);
        assert!(matches!(
            offset_closed(&open, 1.0),
            Err(CamToolError::InvalidParameters(_))
        ));
        let sliver = Polyline::with_points(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 0.0)],
            true,
        );
        assert!(offset_closed(&sliver, 1.0).is_err());
    }

    #[test]
    fn test_arc_points_semicircle() {
        // bulge 1 is a half circle, counter-clockwise from v1 to v2
        let v1 = PlineVertex::new(1.0, 0.0, 1.0);
        let v2 = PlineVertex::new(-1.0, 0.0, 0.0);
        let points = arc_points(&v1, &v2);
        assert!(!points.is_empty());
        for p in &points {
            assert!((p.x.hypot(p.y) - 1.0).abs() < 1e-9);
            assert!(p.y > 0.0);
        }
    }

    #[test]
    fn test_apply_edge_mode() {
        let mut zones = Zones::new();
        zones.push(square(10.0, false));
        zones.push(square(2.0, false));
        zones.push(Polyline::with_points(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)],
            false,
        ));
        let settings = CutSettings {
            tool_diameter: 3.0,
            edge_mode: EdgeMode::Inside,
            ..CutSettings::default()
        };

        let mut log = MotionLog::new();
        let result = apply_edge_mode(&mut MotionStream::new(&mut log), &settings, &zones);
        // the 2mm square cannot fit a 3mm tool; the open line stays
        assert_eq!(result.len(), 2);
        assert_eq!(log.len(), 1);
        assert!(result.polylines[0].closed);
        assert!(!result.polylines[1].closed);

        let center = CutSettings::default();
        let same = apply_edge_mode(&mut MotionStream::new(&mut log), &center, &zones);
        assert_eq!(same, zones);
    }
}
