//! Whole documents: a named list of top-level elements plus page placement.

use crate::element::Element;
use crate::error::Result;
use crate::export::{export_program, page_to_machine, ProgramHeader};
use millpath_core::{GcodeText, GcodeWriter, MotionSink, Transform};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Bottom-left corner of the page in document units (Y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageCorner {
    pub left: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    /// `None` when element coordinates are already machine coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageCorner>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page: None,
            elements: Vec::new(),
        }
    }

    pub fn with_page(mut self, left: f64, bottom: f64) -> Self {
        self.page = Some(PageCorner { left, bottom });
        self
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Transform applied above the top-level elements.
    pub fn machine_transform(&self) -> Transform {
        match self.page {
            Some(page) => page_to_machine(page.left, page.bottom),
            None => Transform::identity(),
        }
    }

    pub fn header(&self) -> ProgramHeader {
        ProgramHeader::new(self.name.clone())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document = Self::from_json(&content)?;
        tracing::debug!(
            "loaded document {:?} ({} elements) from {}",
            document.name,
            document.elements.len(),
            path.display()
        );
        Ok(document)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Exports the program into any sink.
    pub fn export(&self, sink: &mut dyn MotionSink, header: &ProgramHeader) {
        export_program(sink, header, &self.elements, &self.machine_transform());
    }

    /// Renders the program as G-code text.
    pub fn to_gcode(&self, header: &ProgramHeader) -> String {
        let mut text = GcodeText::new();
        self.export(&mut text, header);
        text.into_string()
    }

    /// Streams the program as G-code to `out`.
    pub fn write_gcode<W: Write>(&self, out: W, header: &ProgramHeader) -> Result<W> {
        let mut writer = GcodeWriter::new(out);
        self.export(&mut writer, header);
        Ok(writer.finish()?)
    }
}
