//! # Millpath CAM Tools
//!
//! Toolpath generators that turn flattened 2D outlines into motion.
//!
//! ## Generators
//!
//! - **Flattener**: cubic path commands to polylines at a parametric increment
//! - **Ramp cutter**: one polyline from a start depth to a final depth, lifting
//!   over retention tabs
//! - **Contour**: repeated ramp passes down to the full depth
//! - **Pocket**: even-odd scanline clearing of closed outlines
//! - **Spiral**: contour-parallel ring clearing of closed outlines
//! - **Edge offsets**: tool-radius compensation for inside/outside cuts
//!
//! Every generator writes through a [`millpath_core::MotionStream`] and never
//! fails; degenerate geometry is skipped.

pub mod contour;
pub mod error;
pub mod flatten;
pub mod offset;
pub mod pocket;
pub mod spiral;

pub use contour::{contour, cut_polyline_at_depth, SafeHeightLatch};
pub use error::{CamToolError, Result};
pub use flatten::{flatten, PathCommand, ZonesBuilder};
pub use offset::{apply_edge_mode, offset_closed};
pub use pocket::{pocket, scanline_intersections};
pub use spiral::{spiral, spiral_rings};
