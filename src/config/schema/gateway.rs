use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 3000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Allow binding to a non-loopback address (default: false)
    #[serde(default)]
    pub allow_public_bind: bool,
    /// Origins allowed by CORS; empty disables the CORS layer
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            allow_public_bind: false,
            cors_origins: Vec::new(),
        }
    }
}
