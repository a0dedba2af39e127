//! Settings loading, validation, and conversion.

use super::model::Settings;
use crate::error::{LockError, Result};
use crate::process_lock::AcquireOptions;
use std::path::Path;

impl Settings {
    /// Load settings from a YAML file.
    ///
    /// Unknown fields are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockError::Config(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let settings = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings from a YAML string and validate them.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)
            .map_err(|e| LockError::Config(format!("failed to parse settings YAML: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LockError::Config(format!("failed to serialize settings: {}", e)))
    }

    /// Validate settings values.
    ///
    /// Every duration must be a finite, non-negative number of seconds.
    pub fn validate(&self) -> Result<()> {
        self.acquire_options().map(|_| ()).map_err(|e| match e {
            LockError::InvalidArgument(msg) => {
                LockError::Config(format!("settings validation failed: {}", msg))
            }
            other => other,
        })
    }

    /// Convert to the options taken by the cross-process locks.
    pub fn acquire_options(&self) -> Result<AcquireOptions> {
        Ok(
            AcquireOptions::from_secs(self.delay_secs, self.max_delay_secs, self.timeout_secs)?
                .with_blocking(self.blocking),
        )
    }
}
