//! Curve flattening.
//!
//! Converts move/line/cubic/close path commands into [`Zones`], mapping every
//! point through the element's transform on the way in.

use lyon::geom::CubicBezierSegment;
use millpath_core::{FloatRange, Point, Polyline, Transform, Zones};
use serde::{Deserialize, Serialize};

/// One absolute path command in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

/// Accumulates flattened polylines.
///
/// Owns the polyline being built; it is pushed into the zones when the next
/// subpath starts, when the subpath is closed, or on [`ZonesBuilder::finish`].
pub struct ZonesBuilder<'a> {
    transform: &'a Transform,
    increment: f64,
    zones: Zones,
    current: Option<Polyline>,
    /// First point of the current subpath, machine space.
    initial: Point,
    /// Pen position, machine space.
    pen: Point,
}

impl<'a> ZonesBuilder<'a> {
    /// `increment` is the parametric step for curves and must already be in
    /// (0, 1].
    pub fn new(increment: f64, transform: &'a Transform) -> Self {
        let origin = Point::default().transformed(transform);
        Self {
            transform,
            increment,
            zones: Zones::new(),
            current: None,
            initial: origin,
            pen: origin,
        }
    }

    fn commit(&mut self) {
        if let Some(polyline) = self.current.take() {
            if polyline.len() == 1 {
                tracing::debug!("subpath is a lone point at {}", polyline.points[0]);
            }
            self.zones.push(polyline);
        }
    }

    /// The polyline being extended, starting one at the pen if there is none.
    fn current(&mut self) -> &mut Polyline {
        let pen = self.pen;
        self.current
            .get_or_insert_with(|| Polyline::with_points(vec![pen], false))
    }

    pub fn move_to(&mut self, to: Point) {
        self.commit();
        let p = to.transformed(self.transform);
        self.current = Some(Polyline::with_points(vec![p], false));
        self.initial = p;
        self.pen = p;
    }

    pub fn line_to(&mut self, to: Point) {
        let p = to.transformed(self.transform);
        self.current().points.push(p);
        self.pen = p;
    }

    /// Samples the curve at `t = 0, increment, 2 * increment, ...` below 1,
    /// then appends the exact end point.
    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        let curve = CubicBezierSegment {
            from: self.pen.into(),
            ctrl1: ctrl1.transformed(self.transform).into(),
            ctrl2: ctrl2.transformed(self.transform).into(),
            to: to.transformed(self.transform).into(),
        };
        let end: Point = curve.to.into();
        let increment = self.increment;
        let polyline = self.current();
        for t in FloatRange::new(0.0, 1.0, increment) {
            polyline.points.push(curve.sample(t).into());
        }
        polyline.points.push(end);
        self.pen = end;
    }

    /// Appends the subpath's first point and marks it closed.
    pub fn close(&mut self) {
        let initial = self.initial;
        if let Some(polyline) = self.current.as_mut() {
            polyline.points.push(initial);
            polyline.closed = true;
        }
        self.commit();
        self.pen = initial;
    }

    pub fn push(&mut self, command: &PathCommand) {
        match *command {
            PathCommand::MoveTo(to) => self.move_to(to),
            PathCommand::LineTo(to) => self.line_to(to),
            PathCommand::CubicTo { ctrl1, ctrl2, to } => self.cubic_to(ctrl1, ctrl2, to),
            PathCommand::Close => self.close(),
        }
    }

    pub fn finish(mut self) -> Zones {
        self.commit();
        self.zones
    }
}

/// Flattens `commands` into machine-space polylines.
pub fn flatten(commands: &[PathCommand], increment: f64, transform: &Transform) -> Zones {
    let mut builder = ZonesBuilder::new(increment, transform);
    for command in commands {
        builder.push(command);
    }
    let zones = builder.finish();
    tracing::debug!("flattened {} commands into {}", commands.len(), zones);
    zones
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square() -> Vec<PathCommand> {
        vec![
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(10.0, 0.0)),
            PathCommand::LineTo(p(10.0, 10.0)),
            PathCommand::LineTo(p(0.0, 10.0)),
            PathCommand::Close,
        ]
    }

    #[test]
    fn test_closed_square() {
        let zones = flatten(&square(), 0.1, &Transform::identity());
        assert_eq!(zones.len(), 1);
        let polyline = &zones.polylines[0];
        assert!(polyline.closed);
        assert_eq!(polyline.len(), 5);
        assert_eq!(polyline.first(), polyline.last());
        assert_eq!(polyline.length(), 40.0);
    }

    #[test]
    fn test_open_path() {
        let commands = vec![
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::LineTo(p(3.0, 4.0)),
        ];
        let zones = flatten(&commands, 0.1, &Transform::identity());
        assert_eq!(zones.len(), 1);
        assert!(!zones.polylines[0].closed);
        assert_eq!(zones.polylines[0].length(), 5.0);
    }

    #[test]
    fn test_curve_sample_count() {
        let commands = vec![
            PathCommand::MoveTo(p(0.0, 0.0)),
            PathCommand::CubicTo {
                ctrl1: p(0.0, 10.0),
                ctrl2: p(10.0, 10.0),
                to: p(10.0, 0.0),
            },
        ];
        let zones = flatten(&commands, 0.25, &Transform::identity());
        // move point, t = 0, 0.25, 0.5, 0.75, then the end point
        assert_eq!(zones.polylines[0].len(), 6);
        assert_eq!(zones.polylines[0].last(), Some(p(10.0, 0.0)));
        let mid = zones.polylines[0].points[3];
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!((mid.y - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_transform_applied() {
        let t = Transform::translation(100.0, 50.0);
        let zones = flatten(&square(), 0.1, &t);
        let polyline = &zones.polylines[0];
        assert_eq!(polyline.first(), Some(p(100.0, 50.0)));
        assert_eq!(polyline.points[2], p(110.0, 60.0));
    }

    #[test]
    fn test_subpaths_split_on_move_and_close() {
        let mut commands = square();
        commands.push(PathCommand::LineTo(p(-5.0, 0.0)));
        commands.push(PathCommand::MoveTo(p(20.0, 0.0)));
        commands.push(PathCommand::LineTo(p(30.0, 0.0)));
        let zones = flatten(&commands, 0.1, &Transform::identity());
        assert_eq!(zones.len(), 3);
        assert!(zones.polylines[0].closed);
        // drawing after a close continues from the subpath start
        assert_eq!(zones.polylines[1].points, vec![p(0.0, 0.0), p(-5.0, 0.0)]);
        assert!(!zones.polylines[2].closed);
    }

    #[test]
    fn test_lone_move_is_kept_as_point() {
        let commands = vec![
            PathCommand::MoveTo(p(1.0, 1.0)),
            PathCommand::MoveTo(p(2.0, 2.0)),
            PathCommand::LineTo(p(3.0, 3.0)),
        ];
        let zones = flatten(&commands, 0.1, &Transform::identity());
        assert_eq!(zones.len(), 2);
        assert_eq!(zones.polylines[0].points, vec![p(1.0, 1.0)]);
        assert!(!zones.polylines[0].closed);
        assert_eq!(zones.polylines[1].first(), Some(p(2.0, 2.0)));
    }

    #[test]
    fn test_empty_commands() {
        assert!(flatten(&[], 0.1, &Transform::identity()).is_empty());
    }
}
