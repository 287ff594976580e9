//! Configuration

use crate::error::HealError;
use heal_dom::DEFAULT_SCAN_CAP;
use heal_patch::DEFAULT_TESTS_DIR;
use heal_report::DEFAULT_REPORTS_DIR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Self-heal configuration
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealConfig {
    /// Repository root all paths resolve against
    pub repo_root: PathBuf,
    /// Directory tried as a prefix for unqualified test paths
    pub tests_dir: String,
    /// Where apply reports go, relative to `repo_root` unless absolute
    pub reports_dir: PathBuf,
    /// Cap on fallback-stage snapshot candidates
    pub snapshot_scan_cap: usize,
    /// Stamped on every proposal set
    pub adapter_version: String,
    /// Heals below this confidence are demoted to analysis
    pub min_heal_confidence: f64,
}

impl HealConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With repository root
    #[inline]
    #[must_use]
    pub fn with_repo_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.repo_root = root.into();
        self
    }

    /// With tests directory
    #[inline]
    #[must_use]
    pub fn with_tests_dir(mut self, dir: impl Into<String>) -> Self {
        self.tests_dir = dir.into();
        self
    }

    /// With reports directory
    #[inline]
    #[must_use]
    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = dir.into();
        self
    }

    /// With snapshot scan cap
    #[inline]
    #[must_use]
    pub fn with_snapshot_scan_cap(mut self, cap: usize) -> Self {
        self.snapshot_scan_cap = cap;
        self
    }

    /// With adapter version
    #[inline]
    #[must_use]
    pub fn with_adapter_version(mut self, version: impl Into<String>) -> Self {
        self.adapter_version = version.into();
        self
    }

    /// With heal confidence floor
    #[inline]
    #[must_use]
    pub fn with_min_heal_confidence(mut self, floor: f64) -> Self {
        self.min_heal_confidence = floor;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `HealError::Config` on malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, HealError> {
        let config: Self = toml::from_str(text).map_err(|e| HealError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `HealError::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, HealError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HealError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Reject values no component can work with
    ///
    /// # Errors
    /// `HealError::Config` naming the offending key.
    pub fn validate(&self) -> Result<(), HealError> {
        if !(0.0..=1.0).contains(&self.min_heal_confidence) {
            return Err(HealError::config(format!(
                "min_heal_confidence must be within [0, 1], got {}",
                self.min_heal_confidence
            )));
        }
        if self.snapshot_scan_cap == 0 {
            return Err(HealError::config("snapshot_scan_cap must be at least 1"));
        }
        if self.tests_dir.trim().is_empty() {
            return Err(HealError::config("tests_dir must not be empty"));
        }
        Ok(())
    }

    /// Absolute reports directory
    #[must_use]
    pub fn reports_path(&self) -> PathBuf {
        if self.reports_dir.is_absolute() {
            self.reports_dir.clone()
        } else {
            self.repo_root.join(&self.reports_dir)
        }
    }
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            tests_dir: DEFAULT_TESTS_DIR.to_string(),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            snapshot_scan_cap: DEFAULT_SCAN_CAP,
            adapter_version: format!("heal-core/{}", crate::VERSION),
            min_heal_confidence: 0.0,
        }
    }
}
