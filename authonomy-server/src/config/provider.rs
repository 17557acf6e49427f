use confique::Config;

/// Social login provider settings
#[derive(Debug, Config, Clone)]
pub struct ProviderConfig {
    /// Facebook Graph API base URL
    #[config(
        env = "AUTHONOMY_PROVIDER_GRAPH_URL",
        default = "https://graph.facebook.com/v14.0"
    )]
    pub graph_url: String,

    /// Request timeout in seconds (default: 10)
    #[config(env = "AUTHONOMY_PROVIDER_TIMEOUT", default = 10)]
    pub timeout: u64,
}
