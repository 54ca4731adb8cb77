use serde::{Deserialize, Serialize};

use crate::core::pipeline::RowPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// What to do with a malformed row in a list-valued prop
    #[serde(default)]
    pub row_policy: RowPolicy,
    /// Attach a heuristic score to every finalized turn (default: true)
    #[serde(default = "default_true")]
    pub include_score: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            row_policy: RowPolicy::default(),
            include_score: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reject_whole_directives() {
        let config = PipelineConfig::default();
        assert_eq!(config.row_policy, RowPolicy::RejectDirective);
        assert!(config.include_score);
    }

    #[test]
    fn row_policy_is_snake_case_in_toml() {
        let decoded: PipelineConfig = toml::from_str("row_policy = \"filter_rows\"").unwrap();
        assert_eq!(decoded.row_policy, RowPolicy::FilterRows);
        assert!(decoded.include_score);
        assert!(toml::from_str::<PipelineConfig>("row_policy = \"lenient\"").is_err());

        let encoded = toml::to_string(&PipelineConfig::default()).unwrap();
        assert!(encoded.contains("row_policy = \"reject_directive\""));
    }
}
