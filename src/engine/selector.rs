//! Selection orchestration
//!
//! For each outbound fetch the engine decides which proxy endpoint to use:
//! sticky-session reuse, then the preferred or risk-based tier, rotation
//! within the tier, escalation across the tenant's allowed tiers, and
//! finally an exhaustion error. Selection adds no network latency: the
//! only awaited call is the risk classifier, and no proxy lock is held
//! across it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::registry::PoolRegistry;
use super::risk::RiskClassifier;
use super::rotation::{self, RotationCursors};
use super::tiers::TierPolicy;
use super::tracker::{HealthTracker, TrackerConfig};
use crate::error::{Result, StratumError};
use crate::models::{
    AggregateStats, FailureReason, PoolStats, ProxyEndpoint, ProxyHealth, ProxyPoolConfig,
    ProxyTier, RotationStrategy, SelectionReason, SelectionRequest, SelectionResult, TenantPlan,
};

/// The proxy health & selection engine.
///
/// Explicitly constructed and injected; holds the health tracker, the pool
/// registry, the tier policy, and the risk classifier collaborator.
pub struct SelectionEngine {
    tracker: Arc<HealthTracker>,
    registry: Arc<PoolRegistry>,
    tier_policy: TierPolicy,
    classifier: Arc<dyn RiskClassifier>,
    cursors: RotationCursors,
}

impl SelectionEngine {
    pub fn new(
        tracker_config: TrackerConfig,
        tier_policy: TierPolicy,
        classifier: Arc<dyn RiskClassifier>,
    ) -> Self {
        Self {
            tracker: Arc::new(HealthTracker::new(tracker_config)),
            registry: Arc::new(PoolRegistry::new()),
            tier_policy,
            classifier,
            cursors: RotationCursors::new(),
        }
    }

    pub fn tracker(&self) -> &HealthTracker {
        &self.tracker
    }

    // ==================== Pool management ====================

    /// Register a pool and start tracking its endpoints. Tracking is
    /// idempotent, so re-adding a previously removed pool resumes with the
    /// health history its proxies had accumulated.
    pub fn add_pool(&self, pool: ProxyPoolConfig) -> Result<()> {
        let pool_id = pool.id.clone();
        let tier = pool.tier;
        let endpoint_ids: Vec<String> = pool.endpoints.iter().map(|e| e.id.clone()).collect();

        self.registry.add_pool(pool)?;
        for id in &endpoint_ids {
            self.tracker.initialize_proxy(id, &pool_id, tier);
        }
        Ok(())
    }

    pub fn remove_pool(&self, pool_id: &str) -> Result<()> {
        self.registry.remove_pool(pool_id)?;
        self.cursors.forget(pool_id);
        Ok(())
    }

    /// Owned snapshot of the pool configurations, for the admin API
    pub fn pools(&self) -> Vec<ProxyPoolConfig> {
        self.registry
            .snapshot()
            .iter()
            .map(|p| p.as_ref().clone())
            .collect()
    }

    pub fn pool(&self, pool_id: &str) -> Option<ProxyPoolConfig> {
        self.registry.pool(pool_id).map(|p| p.as_ref().clone())
    }

    // ==================== Selection ====================

    /// Choose a proxy for an outbound fetch.
    ///
    /// Fails with `NoProxyConfigured` when no pool exists for any tier the
    /// plan allows, or `ProxyExhausted` when pools exist but every allowed
    /// tier is out of healthy proxies for this domain.
    pub async fn select_proxy(&self, request: &SelectionRequest) -> Result<SelectionResult> {
        // Sticky reuse comes first: an existing pin wins if it is still
        // healthy for the domain and within the plan's entitlements.
        if let Some(session_id) = &request.sticky_session_id {
            if let Some(proxy_id) = self.tracker.sticky_proxy(session_id) {
                if self.tracker.is_healthy_for_domain(&proxy_id, &request.domain) {
                    if let Some((pool, endpoint)) = self.registry.endpoint(&proxy_id) {
                        if self.tier_policy.is_allowed(request.plan, pool.tier) {
                            self.tracker.set_sticky_proxy(session_id, &proxy_id);
                            self.tracker.mark_used(&proxy_id);
                            debug!(
                                session_id,
                                proxy_id,
                                domain = %request.domain,
                                "Reusing sticky proxy"
                            );
                            return Ok(SelectionResult {
                                endpoint,
                                tier: pool.tier,
                                reason: SelectionReason::StickySession,
                            });
                        }
                    }
                }
            }
        }

        let allowed = self.tier_policy.allowed_tiers(request.plan);
        if allowed.is_empty() {
            return Err(StratumError::NoProxyConfigured {
                plan: request.plan.to_string(),
            });
        }

        // Resolve the target tier before touching any proxy state; the
        // classifier may be slow and must not be awaited under a lock.
        let (target, base_reason) = match request.preferred_tier {
            Some(tier) if self.tier_policy.is_allowed(request.plan, tier) => {
                (tier, Some(SelectionReason::PreferredTier))
            }
            _ => match self.classifier.classify(&request.domain).await {
                Ok(verdict) if allowed.contains(&verdict.minimum_tier) => {
                    (verdict.minimum_tier, Some(SelectionReason::RiskBased))
                }
                Ok(verdict) => {
                    debug!(
                        domain = %request.domain,
                        risk_tier = %verdict.minimum_tier,
                        plan = %request.plan,
                        "Risk tier not allowed by plan; using cheapest allowed tier"
                    );
                    (allowed[0], None)
                }
                Err(e) => {
                    warn!(
                        domain = %request.domain,
                        error = %e,
                        "Risk classification failed; using cheapest allowed tier"
                    );
                    (allowed[0], None)
                }
            },
        };

        // Walk the target tier, then each more capable allowed tier.
        for &tier in allowed.iter().filter(|t| **t >= target) {
            let found = self.try_tier(
                tier,
                &request.domain,
                request.preferred_country.as_deref(),
                None,
            );
            if let Some((endpoint, strategy)) = found {
                let reason = if tier == target {
                    base_reason.unwrap_or_else(|| rotation::strategy_reason(strategy))
                } else {
                    SelectionReason::Escalated { from: target, to: tier }
                };
                if let Some(session_id) = &request.sticky_session_id {
                    self.tracker.set_sticky_proxy(session_id, &endpoint.id);
                }
                self.tracker.mark_used(&endpoint.id);
                info!(
                    proxy_id = %endpoint.id,
                    tier = %tier,
                    domain = %request.domain,
                    tenant = %request.tenant_id,
                    reason = %reason,
                    "Proxy selected"
                );
                return Ok(SelectionResult {
                    endpoint,
                    tier,
                    reason,
                });
            }
        }

        if allowed.iter().any(|t| self.registry.has_tier(*t)) {
            Err(StratumError::ProxyExhausted {
                domain: request.domain.clone(),
            })
        } else {
            Err(StratumError::NoProxyConfigured {
                plan: request.plan.to_string(),
            })
        }
    }

    /// Retry candidate after a recorded failure, without re-running risk
    /// classification: another healthy proxy in the failed proxy's tier
    /// first, then the escalation walk. Returns None when every remaining
    /// allowed tier is exhausted; the caller must treat the fetch as
    /// failed rather than retry through the engine.
    pub fn select_fallback(
        &self,
        failed_proxy_id: &str,
        domain: &str,
        plan: TenantPlan,
    ) -> Option<SelectionResult> {
        let failed_tier = self
            .registry
            .endpoint(failed_proxy_id)
            .map(|(pool, _)| pool.tier)
            .or_else(|| self.tracker.get_health(failed_proxy_id).map(|h| h.tier))?;

        let allowed = self.tier_policy.allowed_tiers(plan);
        for &tier in allowed.iter().filter(|t| **t >= failed_tier) {
            let found = self.try_tier(tier, domain, None, Some(failed_proxy_id));
            if let Some((endpoint, strategy)) = found {
                let reason = if tier == failed_tier {
                    rotation::strategy_reason(strategy)
                } else {
                    SelectionReason::Escalated {
                        from: failed_tier,
                        to: tier,
                    }
                };
                self.tracker.mark_used(&endpoint.id);
                info!(
                    failed_proxy_id,
                    proxy_id = %endpoint.id,
                    tier = %tier,
                    domain,
                    "Fallback proxy selected"
                );
                return Some(SelectionResult {
                    endpoint,
                    tier,
                    reason,
                });
            }
        }
        None
    }

    /// One tier of the selection walk: pools in registration order, each
    /// pool's endpoints filtered to healthy-for-domain (and country), then
    /// the pool's own rotation strategy applied.
    fn try_tier(
        &self,
        tier: ProxyTier,
        domain: &str,
        country: Option<&str>,
        exclude: Option<&str>,
    ) -> Option<(ProxyEndpoint, RotationStrategy)> {
        for pool in self.registry.pools_for_tier(tier) {
            let candidates: Vec<&ProxyEndpoint> = pool
                .endpoints
                .iter()
                .filter(|e| exclude.map(|x| e.id != x).unwrap_or(true))
                .filter(|e| country.map(|c| e.matches_country(c)).unwrap_or(true))
                .filter(|e| self.tracker.is_healthy_for_domain(&e.id, domain))
                .collect();

            if let Some(endpoint) = rotation::pick(&pool, &candidates, &self.tracker, &self.cursors)
            {
                return Some((endpoint.clone(), pool.rotation_strategy));
            }
        }
        None
    }

    // ==================== Outcome recording ====================

    pub fn record_success(&self, proxy_id: &str, domain: &str, latency_ms: u64) {
        self.tracker.record_success(proxy_id, domain, latency_ms);
    }

    pub fn record_failure(&self, proxy_id: &str, domain: &str, reason: FailureReason) {
        self.tracker.record_failure(proxy_id, domain, reason);
    }

    pub fn clear_sticky_session(&self, session_id: &str) {
        self.tracker.clear_sticky_proxy(session_id);
    }

    // ==================== Admin / observability ====================

    pub fn proxy_health(&self, proxy_id: &str) -> Result<ProxyHealth> {
        self.tracker
            .get_health(proxy_id)
            .ok_or_else(|| StratumError::ProxyNotFound {
                id: proxy_id.to_string(),
            })
    }

    pub fn force_cooldown(
        &self,
        proxy_id: &str,
        reason: FailureReason,
        duration_minutes: Option<i64>,
    ) -> Result<()> {
        if self.tracker.force_cooldown(proxy_id, reason, duration_minutes) {
            Ok(())
        } else {
            Err(StratumError::ProxyNotFound {
                id: proxy_id.to_string(),
            })
        }
    }

    pub fn clear_cooldown(&self, proxy_id: &str) -> Result<()> {
        if self.tracker.clear_cooldown(proxy_id) {
            Ok(())
        } else {
            Err(StratumError::ProxyNotFound {
                id: proxy_id.to_string(),
            })
        }
    }

    pub fn clear_domain_blocks(&self, domain: &str) -> usize {
        self.tracker.clear_domain_blocks(domain)
    }

    pub fn aggregate_stats(&self) -> AggregateStats {
        self.tracker.aggregate_stats()
    }

    pub fn pool_stats(&self) -> Vec<PoolStats> {
        self.registry
            .snapshot()
            .iter()
            .map(|pool| {
                let healthy = pool
                    .endpoints
                    .iter()
                    .filter(|e| {
                        self.tracker
                            .get_health(&e.id)
                            .map(|h| h.is_healthy)
                            .unwrap_or(false)
                    })
                    .count();
                PoolStats {
                    pool_id: pool.id.clone(),
                    name: pool.name.clone(),
                    tier: pool.tier,
                    rotation_strategy: pool.rotation_strategy.to_string(),
                    endpoints: pool.endpoints.len(),
                    healthy_endpoints: healthy,
                    total_requests: self.tracker.pool_request_total(&pool.id),
                }
            })
            .collect()
    }

    pub fn healthy_proxy_count(&self, tier: ProxyTier) -> usize {
        self.tracker.healthy_count(Some(tier))
    }

    pub fn has_tier_proxies(&self, tier: ProxyTier) -> bool {
        self.registry.has_tier(tier)
    }

    pub fn available_tiers(&self, plan: TenantPlan) -> Vec<ProxyTier> {
        self.tier_policy.allowed_tiers(plan).to_vec()
    }
}
