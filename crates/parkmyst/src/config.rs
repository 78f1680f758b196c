//! Session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do when dispatch reaches an instance that is already `started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReentryPolicy {
    /// Ignore the activation; `on_start` is not called a second time.
    #[default]
    Coalesce,
    /// Report the activation as a [`Reentry`](parkmyst_core::EngineError::Reentry) error.
    Reject,
}

/// Runtime settings of a [`Session`](crate::Session).
///
/// Every field has a default, so a partial JSON object is enough.
///
/// # Examples
///
/// ```
/// use parkmyst::{ReentryPolicy, SessionConfig};
/// use std::time::Duration;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "hookTimeoutMs": 250 }"#).unwrap();
/// assert_eq!(config.reentry, ReentryPolicy::Coalesce);
/// assert_eq!(config.hook_timeout(), Some(Duration::from_millis(250)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub reentry: ReentryPolicy,
    /// Upper bound for a single hook call. `None` means no timeout.
    pub hook_timeout_ms: Option<u64>,
    /// Maximum signals processed by one drive before it is cut off.
    pub max_signals: usize,
    /// Fail the build when any instance configuration is rejected.
    pub strict: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reentry: ReentryPolicy::Coalesce,
            hook_timeout_ms: None,
            max_signals: 10_000,
            strict: false,
        }
    }
}

impl SessionConfig {
    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_reentry(mut self, reentry: ReentryPolicy) -> Self {
        self.reentry = reentry;
        self
    }

    pub fn with_max_signals(mut self, max_signals: usize) -> Self {
        self.max_signals = max_signals;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}
