const DEFAULT_BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// HTTP host configuration.
#[derive(Debug, Clone)]
pub struct ApiIngressConfig {
    /// `host:port` to listen on; resolved when the listener binds.
    pub bind_addr: String,
    /// Maximum accepted request body size.
    pub body_limit_bytes: usize,
}

impl ApiIngressConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self::new("0.0.0.0:8080")
    }
}
