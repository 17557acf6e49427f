use confique::Config;

/// External SSI service issuing DIDs, schemas and credentials
#[derive(Debug, Config, Clone)]
pub struct IdentityConfig {
    /// Base URL of the SSI service (default: http://localhost:3000/v1)
    #[config(env = "AUTHONOMY_IDENTITY_URL", default = "http://localhost:3000/v1")]
    pub url: String,

    /// Request timeout in seconds (default: 10)
    #[config(env = "AUTHONOMY_IDENTITY_TIMEOUT", default = 10)]
    pub timeout: u64,
}

impl IdentityConfig {
    /// Returns the URL of `path` on the SSI service
    pub fn get_url(&self, path: &str) -> String {
        let base = self.url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
