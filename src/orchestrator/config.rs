use std::time::Duration;

/// One speaker slot the orchestrator drives.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    /// Slot identifier ("A", "B", "self", ...)
    pub id: String,

    /// Short code of the language captured on this slot
    pub language: String,
}

/// Tunables for the orchestration loop.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Capture slots: two for a shared-device conversation, one for a
    /// remote session
    pub slots: Vec<SlotConfig>,

    /// How long an error stays displayed before the channel resets
    pub error_display: Duration,

    /// Upper bound on a single translation call
    pub translate_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            slots: vec![
                SlotConfig {
                    id: "A".to_string(),
                    language: "es".to_string(),
                },
                SlotConfig {
                    id: "B".to_string(),
                    language: "en".to_string(),
                },
            ],
            error_display: Duration::from_secs(5),
            translate_timeout: Duration::from_secs(15),
        }
    }
}
