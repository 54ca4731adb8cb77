pub mod contract;
pub mod directive;
pub mod pipeline;
pub mod session;
