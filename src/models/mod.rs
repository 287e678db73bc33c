//! Data model shared across the engine and the admin API

mod health;
mod proxy;
mod selection;

pub use health::{
    AggregateStats, DomainStats, PoolStats, ProxyHealth, RequestOutcome, TierStats,
};
pub use proxy::{
    FailureReason, ProxyEndpoint, ProxyPoolConfig, ProxyTier, RotationStrategy, TenantPlan,
};
pub use selection::{SelectionReason, SelectionRequest, SelectionResult};
