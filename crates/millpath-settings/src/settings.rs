//! The resolved per-element cut settings record.
//!
//! All lengths are millimetres and all feeds millimetres per minute. Depths
//! are positive distances below the stock surface; the cutters negate them
//! when emitting Z.

use crate::error::SettingsError;
use millpath_core::{mm_from_inch, RetractParameters};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default depth per pass: 0.1in.
pub const DEFAULT_DEPTH_INCREMENT: f64 = 2.54;
/// Depth per pass used in place of a negative increment.
pub const NEGATIVE_DEPTH_INCREMENT_FALLBACK: f64 = 0.1;
/// Default tool diameter: 0.25in.
pub const DEFAULT_TOOL_DIAMETER: f64 = 6.35;
/// Default step-over as a fraction of the tool diameter.
pub const DEFAULT_STEP_OVER_RATIO: f64 = 0.8;
/// Default parametric increment for curve flattening.
pub const DEFAULT_CURVE_INCREMENT: f64 = 0.05;

/// Where the cutter runs relative to the drawn line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    /// Tool centre on the line.
    #[default]
    Center,
    /// Tool kept inside closed shapes.
    Inside,
    /// Tool kept outside closed shapes.
    Outside,
}

impl FromStr for EdgeMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "center" | "centre" => Ok(EdgeMode::Center),
            "inside" => Ok(EdgeMode::Inside),
            "outside" => Ok(EdgeMode::Outside),
            other => Err(SettingsError::UnknownMode {
                kind: "edge",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeMode::Center => "center",
            EdgeMode::Inside => "inside",
            EdgeMode::Outside => "outside",
        };
        f.write_str(s)
    }
}

/// How the interior of closed shapes is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Outline only.
    #[default]
    None,
    /// Back-and-forth scanlines.
    #[serde(alias = "pocket")]
    Hatch,
    /// Contour-parallel rings.
    Spiral,
}

impl FromStr for FillMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(FillMode::None),
            "hatch" | "pocket" => Ok(FillMode::Hatch),
            "spiral" => Ok(FillMode::Spiral),
            other => Err(SettingsError::UnknownMode {
                kind: "fill",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FillMode::None => "none",
            FillMode::Hatch => "hatch",
            FillMode::Spiral => "spiral",
        };
        f.write_str(s)
    }
}

/// Cutting parameters for one drawable element.
///
/// Build one with [`CutSettings::default`], a profile file or
/// [`CutSettings::from_style`], then call [`CutSettings::validated`] before
/// handing it to the toolpath generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutSettings {
    /// False when the element is hidden (`display: none`).
    pub visible: bool,
    /// Total cut depth.
    pub depth: f64,
    /// Depth at which the first pass starts.
    pub start_depth: f64,
    /// Depth added per pass.
    pub depth_increment: f64,
    /// Height of material left standing under each tab.
    pub tab_height: f64,
    /// Length of each tab along the path.
    pub tab_width: Option<f64>,
    /// Path length from one tab start to the next.
    pub tab_start_interval: Option<f64>,
    /// Tool name, used to look up tool-specific style properties.
    pub tool: String,
    pub tool_diameter: f64,
    /// Distance between neighbouring fill passes.
    pub tool_step_over: f64,
    /// Parametric step used when flattening curves, in (0, 1].
    pub curve_increment: f64,
    pub edge_mode: EdgeMode,
    pub fill_mode: FillMode,
    pub feed_xy: f64,
    pub feed_z: f64,
    pub rapid_xy: f64,
    pub rapid_z: f64,
    /// Z height clear of the stock.
    pub safe_height: f64,
}

impl Default for CutSettings {
    fn default() -> Self {
        Self {
            visible: true,
            depth: 0.0,
            start_depth: 0.0,
            depth_increment: DEFAULT_DEPTH_INCREMENT,
            tab_height: 0.0,
            tab_width: None,
            tab_start_interval: None,
            tool: "default".to_string(),
            tool_diameter: DEFAULT_TOOL_DIAMETER,
            tool_step_over: DEFAULT_TOOL_DIAMETER * DEFAULT_STEP_OVER_RATIO,
            curve_increment: DEFAULT_CURVE_INCREMENT,
            edge_mode: EdgeMode::Center,
            fill_mode: FillMode::None,
            feed_xy: mm_from_inch(25.0),
            feed_z: mm_from_inch(10.0),
            rapid_xy: mm_from_inch(60.0),
            rapid_z: mm_from_inch(60.0),
            safe_height: mm_from_inch(0.25),
        }
    }
}

fn positive_or(value: f64, default: f64, key: &str) -> f64 {
    if value > 0.0 && value.is_finite() {
        value
    } else {
        tracing::warn!("{} = {} is not positive; using {}", key, value, default);
        default
    }
}

fn non_negative(value: f64, key: &str) -> f64 {
    if value >= 0.0 && value.is_finite() {
        value
    } else {
        tracing::warn!("{} = {} is negative; using 0", key, value);
        0.0
    }
}

impl CutSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps every parameter into the range the toolpath generators assume.
    ///
    /// - depths and tab sizes are non-negative
    /// - `0 < depth_increment <= depth` (or zero when depth is zero); a
    ///   negative increment becomes 0.1, zero or non-finite the default
    /// - `0 < curve_increment <= 1`
    /// - tab height never exceeds depth, tab width never exceeds the interval
    /// - feeds, tool diameter and step-over are positive
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        self.depth = non_negative(self.depth, "depth");
        self.start_depth = non_negative(self.start_depth, "start_depth");

        if self.depth_increment < 0.0 {
            tracing::warn!(
                "depth_increment = {} is negative; using {}",
                self.depth_increment,
                NEGATIVE_DEPTH_INCREMENT_FALLBACK
            );
            self.depth_increment = NEGATIVE_DEPTH_INCREMENT_FALLBACK;
        } else if !self.depth_increment.is_finite()
            || (self.depth_increment == 0.0 && self.depth > 0.0)
        {
            tracing::warn!(
                "depth_increment = {} is not usable; using {}",
                self.depth_increment,
                DEFAULT_DEPTH_INCREMENT
            );
            self.depth_increment = DEFAULT_DEPTH_INCREMENT;
        }
        if self.depth_increment > self.depth {
            self.depth_increment = self.depth;
        }

        if self.curve_increment.is_nan() || self.curve_increment <= 0.0 {
            self.curve_increment = DEFAULT_CURVE_INCREMENT;
        }
        if self.curve_increment > 1.0 {
            self.curve_increment = 1.0;
        }

        self.tab_height = non_negative(self.tab_height, "tab_height").min(self.depth);
        self.tab_start_interval = self
            .tab_start_interval
            .map(|interval| non_negative(interval, "tab_start_interval"));
        self.tab_width = self.tab_width.map(|width| {
            let width = non_negative(width, "tab_width");
            match self.tab_start_interval {
                Some(interval) if width > interval => {
                    tracing::warn!("tab_width {} exceeds tab interval {}", width, interval);
                    interval
                }
                _ => width,
            }
        });

        self.tool_diameter = positive_or(self.tool_diameter, defaults.tool_diameter, "tool_diameter");
        self.tool_step_over = positive_or(
            self.tool_step_over,
            self.tool_diameter * DEFAULT_STEP_OVER_RATIO,
            "tool_step_over",
        );

        self.feed_xy = positive_or(self.feed_xy, defaults.feed_xy, "feed_xy");
        self.feed_z = positive_or(self.feed_z, defaults.feed_z, "feed_z");
        self.rapid_xy = positive_or(self.rapid_xy, defaults.rapid_xy, "rapid_xy");
        self.rapid_z = positive_or(self.rapid_z, defaults.rapid_z, "rapid_z");
        if !self.safe_height.is_finite() {
            self.safe_height = defaults.safe_height;
        }

        self
    }

    /// Tabs are cut only when height, width and interval are all non-zero.
    pub fn has_tabs(&self) -> bool {
        self.tab_height != 0.0
            && self.tab_width.is_some_and(|w| w != 0.0)
            && self.tab_start_interval.is_some_and(|i| i != 0.0)
    }

    /// Depth below the surface at which the cutter rides over a tab.
    pub fn tab_depth(&self) -> f64 {
        self.depth - self.tab_height
    }

    /// Tool radius, used for scan margins and edge offsets.
    pub fn tool_radius(&self) -> f64 {
        self.tool_diameter / 2.0
    }

    /// True when an element with these settings produces any motion.
    pub fn is_cuttable(&self) -> bool {
        self.visible && self.depth != 0.0
    }
}

impl RetractParameters for CutSettings {
    fn safe_height(&self) -> f64 {
        self.safe_height
    }

    fn rapid_z(&self) -> f64 {
        self.rapid_z
    }
}

fn write_optional(f: &mut fmt::Formatter<'_>, value: Option<f64>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{}", v),
        None => f.write_str("-"),
    }
}

impl fmt::Display for CutSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "depth:{} start:{} increment:{} tool:{} diameter:{} stepover:{} tab height:{} width:",
            self.depth,
            self.start_depth,
            self.depth_increment,
            self.tool,
            self.tool_diameter,
            self.tool_step_over,
            self.tab_height,
        )?;
        write_optional(f, self.tab_width)?;
        f.write_str(" interval:")?;
        write_optional(f, self.tab_start_interval)?;
        write!(
            f,
            " edge:{} fill:{} feed xy:{} z:{} rapid xy:{} z:{}",
            self.edge_mode, self.fill_mode, self.feed_xy, self.feed_z, self.rapid_xy, self.rapid_z
        )
    }
}
