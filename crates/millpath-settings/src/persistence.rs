//! Settings profiles on disk.
//!
//! A profile is a named [`CutSettings`] record stored as JSON or TOML; the
//! format follows the file extension.

use crate::error::{Result, SettingsError};
use crate::settings::CutSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileFormat {
    Json,
    Toml,
}

impl ProfileFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ProfileFormat::Json),
            Some("toml") => Ok(ProfileFormat::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// A named, reusable set of cut settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: CutSettings,
}

impl SettingsProfile {
    pub fn new(name: impl Into<String>, settings: CutSettings) -> Self {
        Self {
            name: name.into(),
            description: None,
            settings,
        }
    }

    /// Load a profile from a `.json` or `.toml` file.
    ///
    /// Hard errors (empty name, non-finite numbers) are rejected; everything
    /// else is clamped through [`CutSettings::validated`].
    pub fn load(path: &Path) -> Result<Self> {
        let format = ProfileFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let mut profile: Self = match format {
            ProfileFormat::Json => serde_json::from_str(&content)?,
            ProfileFormat::Toml => toml::from_str(&content)?,
        };

        profile.validate()?;
        profile.settings = profile.settings.validated();
        tracing::debug!("loaded settings profile {:?} from {}", profile.name, path.display());
        Ok(profile)
    }

    /// Save the profile to a `.json` or `.toml` file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let format = ProfileFormat::from_path(path)?;

        let content = match format {
            ProfileFormat::Json => serde_json::to_string_pretty(self)?,
            ProfileFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        tracing::debug!("saved settings profile {:?} to {}", self.name, path.display());
        Ok(())
    }

    /// Rejects profiles that clamping cannot repair.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "name".to_string(),
                reason: "profile name must not be empty".to_string(),
            });
        }

        let s = &self.settings;
        let numbers = [
            ("depth", s.depth),
            ("start_depth", s.start_depth),
            ("depth_increment", s.depth_increment),
            ("tab_height", s.tab_height),
            ("tool_diameter", s.tool_diameter),
            ("tool_step_over", s.tool_step_over),
            ("curve_increment", s.curve_increment),
            ("feed_xy", s.feed_xy),
            ("feed_z", s.feed_z),
            ("rapid_xy", s.rapid_xy),
            ("rapid_z", s.rapid_z),
            ("safe_height", s.safe_height),
        ];
        for (key, value) in numbers {
            if !value.is_finite() {
                return Err(SettingsError::InvalidSetting {
                    key: key.to_string(),
                    reason: format!("{} is not a finite number", value),
                });
            }
        }

        if s.tool.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "tool".to_string(),
                reason: "tool name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
