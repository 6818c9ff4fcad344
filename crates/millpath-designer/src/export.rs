//! Recursive export of an element tree to motion commands.
//!
//! Containers are visited in reverse drawing order, so the elements drawn last
//! are cut first, and each container ends with a retract. Leaf shapes are
//! flattened, offset for their edge mode, contoured and optionally filled.

use crate::element::{Element, ElementKind};
use chrono::{DateTime, Utc};
use lyon::geom::vector;
use millpath_camtools::{apply_edge_mode, contour, flatten, pocket, spiral};
use millpath_core::{ModalCode, MotionSink, MotionStream, Transform};
use millpath_settings::FillMode;

/// Machine transform for a page whose bottom-left corner is at
/// (`left`, `bottom`) in document units with Y pointing down.
///
/// Flips Y, then translates, so the page's bottom edge lands on machine
/// `Y = 0` and Y grows upward.
pub fn page_to_machine(left: f64, bottom: f64) -> Transform {
    Transform::scale(1.0, -1.0).then_translate(vector(left, bottom))
}

/// Descriptive comments at the top of a program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramHeader {
    pub name: String,
    pub generated: Option<DateTime<Utc>>,
}

impl ProgramHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generated: None,
        }
    }

    /// Stamps the header with the current time.
    pub fn generated_now(mut self) -> Self {
        self.generated = Some(Utc::now());
        self
    }
}

/// Visits one element: annotates it, then dispatches on its kind one level
/// deeper.
pub fn visit_element(stream: &mut MotionStream<'_>, element: &Element, transform: &Transform) {
    stream.comment(format!(
        "visit: {} id:{} label:{}",
        element.kind.tag(),
        element.id,
        element.label.as_deref().unwrap_or("")
    ));
    let mut child = stream.indent();
    match &element.kind {
        ElementKind::Layer { children } | ElementKind::Group { children } => {
            export_container(&mut child, element, children, transform)
        }
        ElementKind::Path { .. }
        | ElementKind::Rectangle { .. }
        | ElementKind::Circle { .. }
        | ElementKind::Ellipse { .. } => export_shape(&mut child, element, transform),
        ElementKind::Unrecognized { tag } => export_ignore(&mut child, tag),
    }
}

fn export_container(
    stream: &mut MotionStream<'_>,
    element: &Element,
    children: &[Element],
    transform: &Transform,
) {
    if !element.settings.visible {
        stream.comment("display:none, skipping layer");
        tracing::debug!("skipping hidden {} {}", element.kind.tag(), element.id);
        return;
    }

    let effective = element.effective_transform(transform);
    stream.comment(format!("{} children: {}", element.kind.tag(), children.len()));
    for child in children.iter().rev() {
        visit_element(&mut stream.indent(), child, &effective);
    }
    stream.safe_height(&element.settings);
}

fn export_shape(stream: &mut MotionStream<'_>, element: &Element, transform: &Transform) {
    let settings = &element.settings;
    stream.comment(format!(
        "export {} id:{}",
        element.kind.tag(),
        element.id
    ));

    if settings.depth == 0.0 {
        stream.comment("depth is 0, skipping path");
        return;
    }
    if !settings.visible {
        stream.comment("display:none, skipping path");
        return;
    }
    let Some(commands) = element.kind.path_commands() else {
        return;
    };

    stream.comment(format!("settings: {}", settings));
    let effective = element.effective_transform(transform);
    let zones = flatten(&commands, settings.curve_increment, &effective);
    stream.comment(format!("zones: {}", zones));
    tracing::debug!("{} {}: {}", element.kind.tag(), element.id, zones);

    let outline = apply_edge_mode(&mut stream.indent(), settings, &zones);
    contour(&mut stream.indent(), settings, &outline);
    match settings.fill_mode {
        FillMode::None => {}
        FillMode::Hatch => pocket(&mut stream.indent(), settings, &zones),
        FillMode::Spiral => spiral(&mut stream.indent(), settings, &zones),
    }
}

fn export_ignore(stream: &mut MotionStream<'_>, tag: &str) {
    stream.comment(format!("ignoring element of unrecognized type: {}", tag));
    tracing::debug!("ignoring unrecognized element {}", tag);
}

fn setup_machine(stream: &mut MotionStream<'_>) {
    stream.modal(ModalCode::SelectPlaneXy, "XY plane");
    stream.modal(ModalCode::UnitsMm, "mm mode");
    stream.modal(ModalCode::CompensationOff, "compensation off");
    stream.modal(ModalCode::AbsoluteDistance, "absolute distance mode");
}

/// Writes a complete program: header, machine setup, every top-level element
/// under `transform`, and the end-of-program code.
pub fn export_program(
    sink: &mut dyn MotionSink,
    header: &ProgramHeader,
    elements: &[Element],
    transform: &Transform,
) {
    let mut root = MotionStream::new(sink);
    root.comment("Millpath G-code export");
    let mut stream = root.indent();
    stream.comment(format!("Name: {}", header.name));
    if let Some(generated) = header.generated {
        stream.comment(format!(
            "Generated: {}",
            generated.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    stream.comment("Setting up machine");
    setup_machine(&mut stream.indent());

    stream.comment("Traversing document tree");
    for element in elements {
        visit_element(&mut stream.indent(), element, transform);
    }

    stream.modal(ModalCode::EndProgram, "end of program");
    tracing::info!("exported program {:?} ({} top-level elements)", header.name, elements.len());
}
