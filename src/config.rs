use serde::{Deserialize, Serialize};

/// Subject collection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SlsaConfig {
    /// Recurse into child TaskRuns of a PipelineRun
    pub deep_inspection_enabled: bool,

    /// Read deprecated PipelineResource image outputs on TaskRuns
    pub legacy_resources: bool,
}

impl Default for SlsaConfig {
    /// Default configuration:
    /// - Deep inspection: disabled
    /// - Legacy resources: enabled
    fn default() -> Self {
        Self {
            deep_inspection_enabled: false,
            legacy_resources: true,
        }
    }
}

impl SlsaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursion into child runs.
    pub fn with_deep_inspection(mut self, enabled: bool) -> Self {
        self.deep_inspection_enabled = enabled;
        self
    }

    /// Enables or disables the legacy resource-output path.
    pub fn with_legacy_resources(mut self, enabled: bool) -> Self {
        self.legacy_resources = enabled;
        self
    }
}
