//! API request handlers

pub mod health;
pub mod plans;
pub mod pools;
pub mod proxies;
pub mod stats;
