//! Drawable element tree.
//!
//! Elements carry already-resolved cut settings and a transform into their
//! parent's coordinate space. Containers hold children in drawing order.

use lyon::geom::{point, vector, Angle, Arc};
use millpath_camtools::PathCommand;
use millpath_core::{Point, Transform};
use millpath_settings::{CutSettings, StyleProperties};
use serde::{Deserialize, Deserializer, Serialize};
use std::f64::consts::PI;

fn identity() -> Transform {
    Transform::identity()
}

fn default_settings() -> CutSettings {
    CutSettings::default().validated()
}

/// Settings read from a document are clamped like any other.
fn validated_settings<'de, D>(deserializer: D) -> Result<CutSettings, D::Error>
where
    D: Deserializer<'de>,
{
    CutSettings::deserialize(deserializer).map(CutSettings::validated)
}

/// What an element is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Layer { children: Vec<Element> },
    Group { children: Vec<Element> },
    Path { commands: Vec<PathCommand> },
    Rectangle { x: f64, y: f64, width: f64, height: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    /// Anything the exporter does not cut, kept by tag name.
    Unrecognized { tag: String },
}

impl ElementKind {
    /// Tag name used in annotations.
    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Layer { .. } => "layer",
            ElementKind::Group { .. } => "group",
            ElementKind::Path { .. } => "path",
            ElementKind::Rectangle { .. } => "rectangle",
            ElementKind::Circle { .. } => "circle",
            ElementKind::Ellipse { .. } => "ellipse",
            ElementKind::Unrecognized { tag } => tag.as_str(),
        }
    }

    pub fn children(&self) -> Option<&[Element]> {
        match self {
            ElementKind::Layer { children } | ElementKind::Group { children } => Some(children),
            _ => None,
        }
    }

    /// Outline of a leaf shape as path commands; `None` for containers and
    /// unrecognized elements.
    pub fn path_commands(&self) -> Option<Vec<PathCommand>> {
        match *self {
            ElementKind::Path { ref commands } => Some(commands.clone()),
            ElementKind::Rectangle {
                x,
                y,
                width,
                height,
            } => Some(rectangle_commands(x, y, width, height)),
            ElementKind::Circle { cx, cy, r } => Some(ellipse_commands(cx, cy, r, r)),
            ElementKind::Ellipse { cx, cy, rx, ry } => Some(ellipse_commands(cx, cy, rx, ry)),
            _ => None,
        }
    }
}

fn rectangle_commands(x: f64, y: f64, width: f64, height: f64) -> Vec<PathCommand> {
    vec![
        PathCommand::MoveTo(Point::new(x, y)),
        PathCommand::LineTo(Point::new(x + width, y)),
        PathCommand::LineTo(Point::new(x + width, y + height)),
        PathCommand::LineTo(Point::new(x, y + height)),
        PathCommand::Close,
    ]
}

/// Full ellipse starting at angle zero, as cubic arcs.
fn ellipse_commands(cx: f64, cy: f64, rx: f64, ry: f64) -> Vec<PathCommand> {
    let arc = Arc {
        center: point(cx, cy),
        radii: vector(rx, ry),
        x_rotation: Angle::radians(0.0),
        start_angle: Angle::radians(0.0),
        sweep_angle: Angle::radians(2.0 * PI),
    };

    let mut commands = vec![PathCommand::MoveTo(Point::new(cx + rx, cy))];
    arc.for_each_cubic_bezier(&mut |segment| {
        commands.push(PathCommand::CubicTo {
            ctrl1: segment.ctrl1.into(),
            ctrl2: segment.ctrl2.into(),
            to: segment.to.into(),
        });
    });
    commands.push(PathCommand::Close);
    commands
}

/// One node of the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Maps this element's coordinates into its parent's.
    #[serde(default = "identity")]
    pub transform: Transform,
    /// Always clamped; see [`CutSettings::validated`].
    #[serde(default = "default_settings", deserialize_with = "validated_settings")]
    pub settings: CutSettings,
    pub kind: ElementKind,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            label: None,
            transform: Transform::identity(),
            settings: default_settings(),
            kind,
        }
    }

    pub fn layer(id: impl Into<String>, children: Vec<Element>) -> Self {
        Self::new(id, ElementKind::Layer { children })
    }

    pub fn group(id: impl Into<String>, children: Vec<Element>) -> Self {
        Self::new(id, ElementKind::Group { children })
    }

    pub fn path(id: impl Into<String>, commands: Vec<PathCommand>) -> Self {
        Self::new(id, ElementKind::Path { commands })
    }

    pub fn rectangle(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            id,
            ElementKind::Rectangle {
                x,
                y,
                width,
                height,
            },
        )
    }

    pub fn circle(id: impl Into<String>, cx: f64, cy: f64, r: f64) -> Self {
        Self::new(id, ElementKind::Circle { cx, cy, r })
    }

    pub fn ellipse(id: impl Into<String>, cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Self::new(id, ElementKind::Ellipse { cx, cy, rx, ry })
    }

    pub fn unrecognized(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Unrecognized { tag: tag.into() })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Uses `settings` after clamping them.
    pub fn with_settings(mut self, settings: CutSettings) -> Self {
        self.settings = settings.validated();
        self
    }

    /// Resolves the element's composed style.
    pub fn with_style(mut self, style: &StyleProperties) -> Self {
        self.settings = CutSettings::from_style(style);
        self
    }

    /// Transform from this element's space to machine space, given the
    /// parent's.
    pub fn effective_transform(&self, parent: &Transform) -> Transform {
        self.transform.then(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_commands() {
        let commands = ElementKind::Rectangle {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        }
        .path_commands()
        .expect("rectangle has an outline");
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], PathCommand::MoveTo(Point::new(1.0, 2.0)));
        assert_eq!(commands[2], PathCommand::LineTo(Point::new(4.0, 6.0)));
        assert_eq!(commands[4], PathCommand::Close);
    }

    #[test]
    fn test_circle_commands_stay_on_circle() {
        let commands = ElementKind::Circle {
            cx: 5.0,
            cy: 5.0,
            r: 2.0,
        }
        .path_commands()
        .expect("circle has an outline");
        assert_eq!(commands[0], PathCommand::MoveTo(Point::new(7.0, 5.0)));
        assert_eq!(commands.last(), Some(&PathCommand::Close));
        let curves: Vec<Point> = commands
            .iter()
            .filter_map(|c| match c {
                PathCommand::CubicTo { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert!(curves.len() >= 4);
        for to in curves {
            assert!(((to.x - 5.0).hypot(to.y - 5.0) - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_containers_have_no_outline() {
        assert!(Element::layer("l", vec![]).kind.path_commands().is_none());
        assert!(Element::unrecognized("t", "text").kind.path_commands().is_none());
        assert_eq!(Element::unrecognized("t", "text").kind.tag(), "text");
    }

    #[test]
    fn test_effective_transform_applies_local_first() {
        let parent = Transform::translation(100.0, 0.0);
        let child = Element::rectangle("r", 0.0, 0.0, 1.0, 1.0)
            .with_transform(Transform::scale(2.0, 2.0));
        let t = child.effective_transform(&parent);
        let p = Point::new(1.0, 1.0).transformed(&t);
        assert_eq!(p, Point::new(102.0, 2.0));
    }

    #[test]
    fn test_json_round_trip() {
        let element = Element::group(
            "g1",
            vec![
                Element::circle("c1", 0.0, 0.0, 3.0).with_label("hole"),
                Element::unrecognized("t1", "text"),
            ],
        )
        .with_transform(Transform::translation(1.0, 2.0));
        let json = serde_json::to_string(&element).expect("serialize");
        assert!(json.contains("\"type\":\"group\""));
        let back: Element = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, element);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{"id":"r","kind":{"type":"rectangle","x":0,"y":0,"width":1,"height":1}}"#;
        let element: Element = serde_json::from_str(json).expect("deserialize");
        assert_eq!(element.transform, Transform::identity());
        assert_eq!(element.settings, CutSettings::default().validated());
    }

    #[test]
    fn test_json_settings_are_clamped() {
        let json = r#"{
            "id": "r",
            "settings": {
                "depth": 5.0,
                "depth_increment": -1.0,
                "tab_height": 9.0,
                "tab_width": 50.0,
                "tab_start_interval": 20.0,
                "curve_increment": 3.0
            },
            "kind": {"type": "rectangle", "x": 0, "y": 0, "width": 1, "height": 1}
        }"#;
        let element: Element = serde_json::from_str(json).expect("deserialize");
        assert_eq!(element.settings.depth_increment, 0.1);
        assert_eq!(element.settings.tab_width, Some(20.0));
        assert_eq!(element.settings.tab_height, 5.0);
        assert_eq!(element.settings.curve_increment, 1.0);
        assert_eq!(element.settings, element.settings.clone().validated());
    }
}
