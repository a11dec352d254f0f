//! Engine configuration.

use weft_diagnostic::Severity;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of deferred-selector or reference hops followed while
    /// resolving a single selector.
    pub max_selector_depth: usize,
    /// Severity of relation problems whose message provider leaves it unset.
    pub default_severity: Severity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_selector_depth: 64,
            default_severity: Severity::Error,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector recursion limit.
    pub fn max_selector_depth(mut self, depth: usize) -> Self {
        self.max_selector_depth = depth;
        self
    }

    /// Set the default severity of relation problems.
    pub fn default_severity(mut self, severity: Severity) -> Self {
        self.default_severity = severity;
        self
    }
}
