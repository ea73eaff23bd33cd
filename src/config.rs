use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub conversation: ConversationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct ConversationConfig {
    /// Language captured on the first slot
    pub slot_a_language: String,

    /// Language captured on the second slot
    pub slot_b_language: String,

    /// Seconds an error notice stays up before the channel resets
    pub error_display_secs: u64,

    /// Upper bound in seconds on a single translation call
    pub translate_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Event transport: "nats" or "local"
    pub transport: String,

    pub nats_url: String,

    /// Subject shared by every participant of this application instance
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_subject() -> String {
    crate::session::DEFAULT_SUBJECT.to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
