use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "log" | "none"
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_backend() -> String {
    "log".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}
