//! # Millpath Designer
//!
//! The drawable element tree and its export to a G-code program.
//!
//! ## Elements
//! - **Containers**: layers and groups, exported in reverse drawing order
//! - **Shapes**: paths, rectangles, circles and ellipses
//! - **Unrecognized**: kept in the tree, annotated and otherwise ignored
//!
//! ## Export
//!
//! ```text
//! export_program
//!   ├── header comments, machine setup (G17 G21 G40 G90)
//!   ├── visit_element (per top-level element)
//!   │     ├── layer/group -> children reversed, then retract
//!   │     └── shape -> flatten -> edge offset -> contour -> pocket/spiral
//!   └── M02
//! ```

pub mod document;
pub mod element;
pub mod error;
pub mod export;

pub use document::{Document, PageCorner};
pub use element::{Element, ElementKind};
pub use error::{DesignerError, Result};
pub use export::{export_program, page_to_machine, visit_element, ProgramHeader};
