//! Tier entitlement policy
//!
//! Pure mapping from a tenant plan to the ordered list of proxy tiers the
//! plan may use, cheapest first. Thresholds are configuration, not
//! algorithm: the selector only asks "is tier X allowed" and "give me the
//! ordered allowed list".

use std::collections::HashMap;

use crate::models::{ProxyTier, TenantPlan};

/// Plan to allowed-tier mapping
#[derive(Debug, Clone)]
pub struct TierPolicy {
    plans: HashMap<TenantPlan, Vec<ProxyTier>>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        let mut plans = HashMap::new();
        plans.insert(TenantPlan::Free, vec![ProxyTier::Datacenter]);
        plans.insert(
            TenantPlan::Starter,
            vec![ProxyTier::Datacenter, ProxyTier::Isp],
        );
        plans.insert(
            TenantPlan::Team,
            vec![ProxyTier::Datacenter, ProxyTier::Isp],
        );
        plans.insert(
            TenantPlan::Enterprise,
            vec![ProxyTier::Datacenter, ProxyTier::Isp, ProxyTier::Residential],
        );
        Self { plans }
    }
}

impl TierPolicy {
    /// Override the tier list for one plan; tiers are stored sorted
    /// cheapest-first so escalation order is preserved regardless of input
    pub fn with_plan(mut self, plan: TenantPlan, mut tiers: Vec<ProxyTier>) -> Self {
        tiers.sort();
        tiers.dedup();
        self.plans.insert(plan, tiers);
        self
    }

    /// Ordered allowed tiers for a plan, cheapest first
    pub fn allowed_tiers(&self, plan: TenantPlan) -> &[ProxyTier] {
        self.plans.get(&plan).map(|t| t.as_slice()).unwrap_or(&[])
    }

    pub fn is_allowed(&self, plan: TenantPlan, tier: ProxyTier) -> bool {
        self.allowed_tiers(plan).contains(&tier)
    }

    /// Cheapest tier the plan may use
    pub fn cheapest_tier(&self, plan: TenantPlan) -> Option<ProxyTier> {
        self.allowed_tiers(plan).first().copied()
    }
}
