use chrono::TimeDelta;
use confique::Config;

/// Bearer access token settings
#[derive(Debug, Config, Clone)]
pub struct TokenConfig {
    /// Lifetime of issued access tokens in hours (default: 24)
    #[config(env = "AUTHONOMY_TOKEN_VALIDITY_HOURS", default = 24)]
    pub validity_hours: u32,
}

impl TokenConfig {
    pub fn validity(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.validity_hours))
    }
}
