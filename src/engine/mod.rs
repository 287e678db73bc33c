//! Proxy health tracking and selection

pub mod registry;
pub mod risk;
pub mod rotation;
pub mod selector;
pub mod tiers;
pub mod tracker;

pub use registry::PoolRegistry;
pub use risk::{RiskAssessment, RiskClassifier, StaticRiskClassifier};
pub use selector::SelectionEngine;
pub use tiers::TierPolicy;
pub use tracker::{HealthTracker, TrackerConfig};
