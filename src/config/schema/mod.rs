mod core;
mod gateway;
mod observability;
mod pipeline;

pub use core::Config;
pub use gateway::GatewayConfig;
pub use observability::ObservabilityConfig;
pub use pipeline::PipelineConfig;
