use std::time::Duration;

use serde::Deserialize;

/// Engine tuning. Defaults mirror the product: a 60 s background poll, lock
/// windows visible only inside the last 60 s, 30 s per question in both
/// flows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Background status poll cadence, in seconds.
    pub poll_interval_secs: u64,
    /// A break is rendered only while its remaining time is at or below this
    /// many seconds. Longer breaks are tracked but hidden.
    pub lock_visibility_cutoff_secs: u64,
    /// Server-side answer window per check-in question, in seconds. Used to
    /// derive `timeToAnswer` and as the value reported by forced submits.
    pub question_window_secs: u64,
    /// Client-local per-question timeout of the daily wizard, in seconds.
    pub wizard_question_timeout_secs: u64,
    /// Minimum share of substantively answered questions for a wizard
    /// sitting to count as passed.
    pub pass_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            lock_visibility_cutoff_secs: 60,
            question_window_secs: 30,
            wizard_question_timeout_secs: 30,
            pass_threshold: 0.5,
        }
    }
}

impl EngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn wizard_question_timeout(&self) -> Duration {
        Duration::from_secs(self.wizard_question_timeout_secs)
    }
}
