//! Pool registry
//!
//! Holds the configured proxy pools behind a copy-on-write snapshot
//! (`arc-swap`), so selection reads never block behind `add_pool` /
//! `remove_pool` mutations.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;
use url::Url;

use crate::error::{Result, StratumError};
use crate::models::{ProxyEndpoint, ProxyPoolConfig, ProxyTier};

/// Registry of configured proxy pools
pub struct PoolRegistry {
    pools: ArcSwap<Vec<Arc<ProxyPoolConfig>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            pools: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Register a pool. Validates endpoint URLs and rejects duplicate
    /// pool IDs and duplicate endpoint IDs.
    pub fn add_pool(&self, pool: ProxyPoolConfig) -> Result<()> {
        if pool.id.is_empty() {
            return Err(StratumError::InvalidPoolConfig(
                "pool id must not be empty".to_string(),
            ));
        }
        if pool.endpoints.is_empty() {
            return Err(StratumError::InvalidPoolConfig(format!(
                "pool {} has no endpoints",
                pool.id
            )));
        }
        for endpoint in &pool.endpoints {
            Url::parse(&endpoint.url).map_err(|e| {
                StratumError::InvalidPoolConfig(format!(
                    "endpoint {} has an invalid URL: {}",
                    endpoint.id, e
                ))
            })?;
        }

        let current = self.pools.load();
        if current.iter().any(|p| p.id == pool.id) {
            return Err(StratumError::PoolAlreadyExists { id: pool.id });
        }
        let known_endpoint = |id: &str| {
            current
                .iter()
                .flat_map(|p| p.endpoints.iter())
                .any(|e| e.id == id)
        };
        for endpoint in &pool.endpoints {
            if known_endpoint(&endpoint.id) {
                return Err(StratumError::InvalidPoolConfig(format!(
                    "endpoint id {} already registered in another pool",
                    endpoint.id
                )));
            }
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        info!(
            pool_id = %pool.id,
            tier = %pool.tier,
            endpoints = pool.endpoints.len(),
            strategy = %pool.rotation_strategy,
            "Pool registered"
        );
        next.push(Arc::new(pool));
        self.pools.store(Arc::new(next));
        Ok(())
    }

    /// Remove a pool by ID. Health history of its proxies is retained by
    /// the tracker so re-adding the pool resumes with learned state.
    pub fn remove_pool(&self, pool_id: &str) -> Result<()> {
        let current = self.pools.load();
        if !current.iter().any(|p| p.id == pool_id) {
            return Err(StratumError::PoolNotFound {
                id: pool_id.to_string(),
            });
        }
        let next: Vec<Arc<ProxyPoolConfig>> = current
            .iter()
            .filter(|p| p.id != pool_id)
            .cloned()
            .collect();
        self.pools.store(Arc::new(next));
        info!(pool_id, "Pool removed");
        Ok(())
    }

    /// Consistent snapshot of all pools
    pub fn snapshot(&self) -> Arc<Vec<Arc<ProxyPoolConfig>>> {
        self.pools.load_full()
    }

    pub fn pool(&self, pool_id: &str) -> Option<Arc<ProxyPoolConfig>> {
        self.pools.load().iter().find(|p| p.id == pool_id).cloned()
    }

    /// Pools for one tier, in registration order
    pub fn pools_for_tier(&self, tier: ProxyTier) -> Vec<Arc<ProxyPoolConfig>> {
        self.pools
            .load()
            .iter()
            .filter(|p| p.tier == tier)
            .cloned()
            .collect()
    }

    pub fn has_tier(&self, tier: ProxyTier) -> bool {
        self.pools.load().iter().any(|p| p.tier == tier)
    }

    pub fn pool_count(&self) -> usize {
        self.pools.load().len()
    }

    /// Locate an endpoint by proxy ID along with its owning pool
    pub fn endpoint(&self, proxy_id: &str) -> Option<(Arc<ProxyPoolConfig>, ProxyEndpoint)> {
        for pool in self.pools.load().iter() {
            if let Some(ep) = pool.endpoints.iter().find(|e| e.id == proxy_id) {
                return Some((pool.clone(), ep.clone()));
            }
        }
        None
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
