//! Provider health bookkeeping.
//!
//! Each provider settles into a state at startup: `MissingCredentials`
//! when configuration is absent (the feature is degraded, the process
//! still serves), `Healthy`/`Error` once the startup probe completes.

use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderState {
    Unknown,
    Healthy,
    MissingCredentials,
    Error,
}

impl ProviderState {
    /// A feature counts as available until a probe or missing credential
    /// says otherwise.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Healthy | Self::Unknown)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceStatuses {
    pub translation: ProviderState,
    pub moderation: ProviderState,
    pub explanation: ProviderState,
}

/// Process-wide service status board.
#[derive(Debug)]
pub struct StatusBoard {
    statuses: RwLock<ServiceStatuses>,
    startup_time: String,
}

impl StatusBoard {
    pub fn new(translation_configured: bool, llm_configured: bool) -> Self {
        let initial = |configured: bool| {
            if configured {
                ProviderState::Unknown
            } else {
                ProviderState::MissingCredentials
            }
        };

        Self {
            statuses: RwLock::new(ServiceStatuses {
                translation: initial(translation_configured),
                moderation: initial(llm_configured),
                explanation: initial(llm_configured),
            }),
            startup_time: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn snapshot(&self) -> ServiceStatuses {
        *self.statuses.read()
    }

    pub fn startup_time(&self) -> &str {
        &self.startup_time
    }

    pub fn set_translation(&self, state: ProviderState) {
        self.statuses.write().translation = state;
    }

    /// Moderation, intent, grading and explanation share one LLM provider,
    /// so a single probe settles them together.
    pub fn set_llm(&self, state: ProviderState) {
        let mut statuses = self.statuses.write();
        statuses.moderation = state;
        statuses.explanation = state;
    }

    pub fn explanation_available(&self) -> bool {
        self.statuses.read().explanation.is_available()
    }

    /// Overall verdict: healthy only while no provider is degraded.
    pub fn overall(&self) -> &'static str {
        let statuses = self.statuses.read();
        let all_ok = [statuses.translation, statuses.moderation, statuses.explanation]
            .iter()
            .all(|s| s.is_available());
        if all_ok {
            "healthy"
        } else {
            "degraded"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_degrade_board() {
        let board = StatusBoard::new(true, false);
        assert_eq!(board.overall(), "degraded");
        assert!(!board.explanation_available());
        assert_eq!(board.snapshot().translation, ProviderState::Unknown);
    }

    #[test]
    fn probe_settles_states() {
        let board = StatusBoard::new(true, true);
        assert_eq!(board.overall(), "healthy");

        board.set_llm(ProviderState::Healthy);
        board.set_translation(ProviderState::Error);
        assert_eq!(board.overall(), "degraded");
        assert!(board.explanation_available());
    }
}
