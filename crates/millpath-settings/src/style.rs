//! Resolution of composed style properties into [`CutSettings`].
//!
//! The host has already applied inheritance; what arrives here is the flat
//! property map of one element, e.g. `-gcode-depth: 1/8in`.

use crate::settings::{CutSettings, EdgeMode, FillMode, DEFAULT_STEP_OVER_RATIO};
use millpath_core::resolve_distance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A composed style property map for one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProperties {
    properties: BTreeMap<String, String>,
}

impl StyleProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Builder form of [`StyleProperties::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Parses an inline declaration list such as
    /// `"display:inline; -gcode-depth: 3mm"`. Malformed declarations are
    /// skipped.
    pub fn parse_inline(text: &str) -> Self {
        let mut style = Self::new();
        for declaration in text.split(';') {
            let Some((key, value)) = declaration.split_once(':') else {
                if !declaration.trim().is_empty() {
                    tracing::debug!("ignoring style declaration {:?}", declaration);
                }
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            style.set(key, value.trim());
        }
        style
    }

    fn distance(&self, key: &str, default: f64) -> f64 {
        resolve_distance(self.get(key), default)
    }

    fn optional_distance(&self, key: &str) -> Option<f64> {
        let text = self.get(key)?;
        match millpath_core::parse_distance(text) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("{}: {}", key, err);
                None
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for StyleProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.properties {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

impl CutSettings {
    /// Resolves an element's style into validated settings.
    ///
    /// Missing or unparsable values fall back to the defaults. Unknown mode
    /// names are logged and replaced by the default mode.
    pub fn from_style(style: &StyleProperties) -> Self {
        let defaults = CutSettings::default();

        let tool = style.get("-gcode-tool").unwrap_or("default").to_string();
        let tool_diameter = style.distance(
            &format!("-gcode-tool-{}-diameter", tool),
            defaults.tool_diameter,
        );
        let tool_step_over = style.distance(
            &format!("-gcode-tool-{}-stepover", tool),
            tool_diameter * DEFAULT_STEP_OVER_RATIO,
        );
        // a bare -gcode-stepover overrides the per-tool value
        let tool_step_over = style.distance("-gcode-stepover", tool_step_over);

        let edge_mode = style
            .get("-gcode-edge-mode")
            .map(|value| {
                value.parse::<EdgeMode>().unwrap_or_else(|err| {
                    tracing::warn!("{}; cutting on the line", err);
                    EdgeMode::Center
                })
            })
            .unwrap_or_default();
        let fill_mode = style
            .get("-gcode-fill-mode")
            .map(|value| {
                value.parse::<FillMode>().unwrap_or_else(|err| {
                    tracing::warn!("{}; not filling", err);
                    FillMode::None
                })
            })
            .unwrap_or_default();

        let settings = CutSettings {
            visible: style.get("display").map(str::trim) != Some("none"),
            depth: style.distance("-gcode-depth", defaults.depth),
            start_depth: style.distance("-gcode-start-depth", defaults.start_depth),
            depth_increment: style.distance("-gcode-depth-increment", defaults.depth_increment),
            tab_height: style.distance("-gcode-tab-height", defaults.tab_height),
            tab_width: style.optional_distance("-gcode-tab-width"),
            tab_start_interval: style.optional_distance("-gcode-tab-start-interval"),
            tool,
            tool_diameter,
            tool_step_over,
            // A plain ratio; unit suffixes would be meaningless.
            curve_increment: style.distance("-gcode-curve-increment", defaults.curve_increment),
            edge_mode,
            fill_mode,
            feed_xy: style.distance("-gcode-feed-xy", defaults.feed_xy),
            feed_z: style.distance("-gcode-feed-z", defaults.feed_z),
            rapid_xy: style.distance("-gcode-rapid-xy", defaults.rapid_xy),
            rapid_z: style.distance("-gcode-rapid-z", defaults.rapid_z),
            safe_height: defaults.safe_height,
        };
        settings.validated()
    }
}
