//! Stratum - Proxy Health & Selection Engine
//!
//! Decides which outbound proxy endpoint a web-fetching platform should use
//! for each request, based on tiered pools, per-proxy health history, and
//! tenant plan entitlements.
//!
//! ## Features
//!
//! - Tiered proxy pools (datacenter, ISP, residential) with runtime
//!   add/remove
//! - Sliding-window health tracking with per-domain block detection
//! - Automatic cooldown with lazy, timer-free expiry
//! - Plan-based tier entitlements with escalation to more capable tiers
//! - Rotation strategies per pool (round-robin, least-used, healthiest)
//! - Sticky sessions for multi-request flows
//! - Admin REST API for pools, health, cooldowns, and statistics

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use config::Config;
pub use engine::SelectionEngine;
pub use error::{Result, StratumError};
