use super::Config;
use crate::core::pipeline::RowPolicy;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NUTRILENS_GATEWAY_HOST")
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(port_str) = std::env::var("NUTRILENS_GATEWAY_PORT")
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(backend) = std::env::var("NUTRILENS_OBSERVABILITY")
            && !backend.is_empty()
        {
            self.observability.backend = backend;
        }

        if let Ok(policy) = std::env::var("NUTRILENS_ROW_POLICY")
            && !policy.is_empty()
        {
            match policy.parse::<RowPolicy>() {
                Ok(policy) => self.pipeline.row_policy = policy,
                Err(_) => tracing::warn!(value = %policy, "ignoring unknown NUTRILENS_ROW_POLICY"),
            }
        }
    }
}
