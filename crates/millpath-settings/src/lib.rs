//! Cut settings for Millpath
//!
//! Every drawable element carries one resolved [`CutSettings`] record:
//! depths, feeds, tool geometry, tab geometry and the edge/fill modes.
//!
//! - [`CutSettings::validated`] clamps out-of-range values before anything
//!   reaches the toolpath generators, which never re-check them.
//! - [`StyleProperties`] resolves a composed style property map
//!   (`-gcode-depth: 1/8in` and friends) into settings.
//! - Settings files are JSON or TOML, chosen by extension.

pub mod error;
pub mod persistence;
pub mod settings;
pub mod style;

pub use error::{Result, SettingsError};
pub use persistence::SettingsProfile;
pub use settings::{CutSettings, EdgeMode, FillMode};
pub use style::StyleProperties;
