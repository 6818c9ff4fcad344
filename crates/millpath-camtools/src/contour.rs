//! Depth-ramped contour cutting with retention tabs.
//!
//! [`cut_polyline_at_depth`] cuts one pass, descending linearly over the
//! polyline's arc length. [`contour`] repeats passes one depth increment at
//! a time until the full depth is reached.
//!
//! Depths passed to the cutter are signed Z values: more negative is deeper.

use millpath_core::{segment_length, Axes, FloatRange, MotionStream, Point, Polyline, Zones};
use millpath_settings::CutSettings;

/// Tracks whether the cutter must retract before its next rapid.
///
/// A retract is needed only while every pass so far has ended on an open
/// polyline; once a closed pass has been cut the tool is back near its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeHeightLatch {
    needed: bool,
}

impl SafeHeightLatch {
    pub fn new() -> Self {
        Self { needed: true }
    }

    pub fn needed(&self) -> bool {
        self.needed
    }

    /// Folds in the result of one pass.
    pub fn record(&mut self, pass_needs_retract: bool) {
        self.needed = pass_needs_retract && self.needed;
    }
}

impl Default for SafeHeightLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Tab window along the polyline, in arc length.
struct TabWindow {
    start: f64,
    end: f64,
    interval: f64,
    width: f64,
}

impl TabWindow {
    /// A window that never opens on a path of length `total`.
    fn disabled(total: f64) -> Self {
        Self {
            start: total + 1.0,
            end: total + 1.0,
            interval: 0.0,
            width: 0.0,
        }
    }

    fn from_settings(settings: &CutSettings, total: f64) -> Self {
        match (settings.tab_start_interval, settings.tab_width) {
            (Some(interval), Some(width)) if settings.has_tabs() => Self {
                start: interval,
                end: interval + width,
                interval,
                width,
            },
            _ => Self::disabled(total),
        }
    }

    fn is_active(&self) -> bool {
        self.interval > 0.0
    }

    fn advance(&mut self) {
        self.start += self.interval;
        self.end = self.start + self.width;
    }
}

/// Position of `length` within the segment `[start, end]`, as a fraction.
fn segment_fraction(length: f64, start: f64, end: f64) -> f64 {
    if end > start {
        (length - start) / (end - start)
    } else {
        0.0
    }
}

/// Cuts one pass along `polyline`, ramping Z from `start_depth` at the first
/// point to `final_depth` at the last.
///
/// Material inside each tab window is left standing at `-tab_depth`: the
/// cutter lifts at the tab start, skims across and plunges back afterwards.
/// Tabs are only honoured once the ramp is at or below the tab depth, which
/// assumes `final_depth <= start_depth` (the ramp only descends).
///
/// Returns true when the polyline is open, meaning the next operation must
/// retract to safe height first. An empty polyline emits nothing and returns
/// `need_safe_height` unchanged.
pub fn cut_polyline_at_depth(
    stream: &mut MotionStream<'_>,
    polyline: &Polyline,
    settings: &CutSettings,
    start_depth: f64,
    final_depth: f64,
    need_safe_height: bool,
) -> bool {
    let Some(first) = polyline.first() else {
        return need_safe_height;
    };

    let total = polyline.length();
    let depth_range = final_depth - start_depth;
    let ramp_depth = |length: f64| {
        let fraction = if total > 0.0 { length / total } else { 1.0 };
        start_depth + fraction * depth_range
    };

    let tab_depth = settings.tab_depth();
    let mut tab = TabWindow::from_settings(settings, total);
    let mut in_tab = false;
    let mut tab_start_depth = start_depth;

    stream.comment(format!(
        "cutting polyline ramp: {:.5} -> {:.5} need safe height: {}",
        start_depth, final_depth, need_safe_height
    ));
    if need_safe_height {
        stream.safe_height(settings);
    }
    stream.rapid(
        "rapid to start of polyline",
        Axes::at_xy(first.x, first.y).with_feed(settings.rapid_xy),
    );
    stream.linear(
        "plunge to start depth",
        Axes::at_z(start_depth).with_feed(settings.feed_z),
    );

    let mut length = 0.0;
    let mut p0 = first;
    for p1 in polyline.points.iter().skip(1).copied() {
        let start_l = length;
        let end_l = length + segment_length(p0, p1);
        let d = ramp_depth(end_l);

        if tab.is_active() {
            while !in_tab && tab.start < start_l {
                tab.advance();
            }
        }

        let at = |l: f64| p0.lerp(&p1, segment_fraction(l, start_l, end_l));

        loop {
            if !in_tab {
                if end_l < tab.start || d > -tab_depth {
                    // the segment ends before the tab, or the ramp is still
                    // above the tab top
                    stream.linear(
                        format!("ramp d:{:.5}", d),
                        Axes::at_xyz(p1.x, p1.y, d).with_feed(settings.feed_xy),
                    );
                    break;
                }

                let tab_point: Point = at(tab.start);
                tab_start_depth = ramp_depth(tab.start);
                stream.linear(
                    "ramp to tab start",
                    Axes::at_xyz(tab_point.x, tab_point.y, tab_start_depth)
                        .with_feed(settings.feed_xy),
                );
                stream.linear(
                    "lift to tab depth",
                    Axes::at_z(-tab_depth).with_feed(settings.rapid_z),
                );
                in_tab = true;
            }

            if tab.end < end_l {
                let tab_point = at(tab.end);
                stream.linear(
                    "skim tab top to tab end",
                    Axes::at_xy(tab_point.x, tab_point.y).with_feed(settings.feed_xy),
                );
                stream.linear(
                    "plunge after tab",
                    Axes::at_z(tab_start_depth).with_feed(settings.feed_z),
                );
                tab.advance();
                in_tab = false;
            } else {
                stream.linear(
                    "skim tab top",
                    Axes::at_xy(p1.x, p1.y).with_feed(settings.feed_xy),
                );
                break;
            }
        }

        length = end_l;
        p0 = p1;
    }

    stream.comment(format!("polyline closed: {}", polyline.closed));
    !polyline.closed
}

/// Cuts every polyline of `zones` from the start depth to the full depth.
///
/// Each pass goes one depth increment deeper than the last; the sequence ends
/// with a flat pass at the full depth. The retract latch starts fresh for
/// every polyline.
pub fn contour(stream: &mut MotionStream<'_>, settings: &CutSettings, zones: &Zones) {
    for polyline in zones {
        stream.comment(format!("polyline: {}", polyline));
        let mut latch = SafeHeightLatch::new();
        let mut passes = 0usize;
        for depth in FloatRange::new(
            settings.start_depth,
            settings.depth,
            settings.depth_increment,
        )
        .inclusive()
        {
            let next_depth = (depth + settings.depth_increment).min(settings.depth);
            let open = cut_polyline_at_depth(
                stream,
                polyline,
                settings,
                -depth,
                -next_depth,
                latch.needed(),
            );
            latch.record(open);
            passes += 1;
        }
        tracing::debug!("contour: {} passes over {}", passes, polyline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millpath_core::{MotionCommand, MotionLog};

    fn line(length: f64) -> Polyline {
        Polyline::with_points(vec![Point::new(0.0, 0.0), Point::new(length, 0.0)], false)
    }

    fn square() -> Polyline {
        Polyline::with_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
                Point::new(0.0, 0.0),
            ],
            true,
        )
    }

    fn settings() -> CutSettings {
        CutSettings {
            depth: 10.0,
            depth_increment: 2.0,
            ..CutSettings::default()
        }
        .validated()
    }

    fn cut(polyline: &Polyline, settings: &CutSettings, start: f64, end: f64) -> (MotionLog, bool) {
        let mut log = MotionLog::new();
        let result = {
            let mut stream = MotionStream::new(&mut log);
            cut_polyline_at_depth(&mut stream, polyline, settings, start, end, true)
        };
        (log, result)
    }

    fn z_values(log: &MotionLog) -> Vec<f64> {
        log.moves().filter_map(|c| c.axes().and_then(|a| a.z)).collect()
    }

    #[test]
    fn test_empty_polyline_is_noop() {
        let (log, result) = cut(&Polyline::new(), &settings(), 0.0, -2.0);
        assert!(log.is_empty());
        assert!(result);

        let mut log = MotionLog::new();
        let mut stream = MotionStream::new(&mut log);
        assert!(!cut_polyline_at_depth(
            &mut stream,
            &Polyline::new(),
            &settings(),
            0.0,
            -2.0,
            false
        ));
    }

    #[test]
    fn test_open_needs_retract_closed_does_not() {
        assert!(cut(&line(10.0), &settings(), 0.0, -2.0).1);
        assert!(!cut(&square(), &settings(), 0.0, -2.0).1);
    }

    #[test]
    fn test_preamble_order() {
        let (log, _) = cut(&line(10.0), &settings(), -1.0, -3.0);
        let moves: Vec<&MotionCommand> = log.moves().collect();
        assert!(moves[0].is_rapid());
        assert_eq!(moves[0].axes().and_then(|a| a.z), Some(settings().safe_height));
        assert!(moves[1].is_rapid());
        assert_eq!(moves[1].axes().and_then(|a| a.x), Some(0.0));
        assert_eq!(moves[1].axes().and_then(|a| a.z), None);
        assert!(moves[2].is_linear());
        assert_eq!(moves[2].axes().and_then(|a| a.z), Some(-1.0));
    }

    #[test]
    fn test_ramp_depth_endpoints() {
        let (log, _) = cut(&square(), &settings(), -2.0, -4.0);
        let z = z_values(&log);
        // safe height, plunge, then one per side
        assert_eq!(z[1], -2.0);
        assert!((z[z.len() - 1] + 4.0).abs() < 1e-9);
        assert!((z[2] + 2.5).abs() < 1e-9);
        assert!((z[3] + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_polyline_goes_to_final_depth() {
        let polyline = Polyline::with_points(vec![Point::new(1.0, 1.0), Point::new(1.0, 1.0)], false);
        let (log, _) = cut(&polyline, &settings(), 0.0, -2.0);
        let z = z_values(&log);
        assert_eq!(z.last().copied(), Some(-2.0));
        assert!(z.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_single_point_contour_pecks_like_a_drill() {
        let mut zones = Zones::new();
        zones.push(Polyline::with_points(vec![Point::new(3.0, 4.0)], false));
        let mut log = MotionLog::new();
        contour(&mut MotionStream::new(&mut log), &settings(), &zones);

        let plunges: Vec<f64> = log
            .moves()
            .filter(|c| c.comment() == Some("plunge to start depth"))
            .filter_map(|c| c.axes().and_then(|a| a.z))
            .collect();
        assert_eq!(plunges, vec![0.0, -2.0, -4.0, -6.0, -8.0, -10.0]);
        assert!(log
            .moves()
            .filter(|c| c.is_rapid())
            .filter_map(|c| c.axes())
            .filter(|a| a.x.is_some())
            .all(|a| a.x == Some(3.0) && a.y == Some(4.0)));
    }

    #[test]
    fn test_latch() {
        let mut latch = SafeHeightLatch::new();
        assert!(latch.needed());
        latch.record(true);
        assert!(latch.needed());
        latch.record(false);
        assert!(!latch.needed());
        latch.record(true);
        assert!(!latch.needed());
    }

    #[test]
    fn test_contour_pass_sequence() {
        let settings = CutSettings {
            depth: 5.0,
            depth_increment: 2.0,
            ..CutSettings::default()
        }
        .validated();
        let mut zones = Zones::new();
        zones.push(square());
        let mut log = MotionLog::new();
        contour(&mut MotionStream::new(&mut log), &settings, &zones);

        let plunges: Vec<f64> = log
            .moves()
            .filter(|c| c.comment() == Some("plunge to start depth"))
            .filter_map(|c| c.axes().and_then(|a| a.z))
            .collect();
        // 0, 2, 4 and the final flat pass at 5
        assert_eq!(plunges, vec![0.0, -2.0, -4.0, -5.0]);

        // closed: only the first pass retracts
        let retracts = log.moves().filter(|c| c.comment() == Some("raise cutter to safe height")).count();
        assert_eq!(retracts, 1);
    }

    #[test]
    fn test_contour_open_retracts_every_pass() {
        let settings = CutSettings {
            depth: 4.0,
            depth_increment: 2.0,
            ..CutSettings::default()
        }
        .validated();
        let mut zones = Zones::new();
        zones.push(line(10.0));
        let mut log = MotionLog::new();
        contour(&mut MotionStream::new(&mut log), &settings, &zones);
        let retracts = log.moves().filter(|c| c.comment() == Some("raise cutter to safe height")).count();
        // passes at 0, 2 and 4
        assert_eq!(retracts, 3);
    }
}
