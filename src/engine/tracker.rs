//! Per-proxy health tracking
//!
//! Owns the sliding-window outcome history, per-domain block state, the
//! cooldown state machine, and sticky-session affinity. All mutations on a
//! given proxy are atomic with respect to each other: every record lives in
//! a `DashMap` and is only touched while holding its entry lock. Cooldown
//! expiry is evaluated lazily on read; the engine runs no timers.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::models::{
    AggregateStats, DomainStats, FailureReason, ProxyHealth, ProxyTier, RequestOutcome, TierStats,
};

/// Tunables for health tracking, all overridable per deployment
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Sliding window length per proxy
    pub health_window: usize,
    /// How long an automatic cooldown lasts
    pub cooldown_minutes: i64,
    /// Failure share that trips cooldown; a proxy is healthy while its
    /// success rate stays at or above `1 - block_threshold`
    pub block_threshold: f64,
    /// Consecutive block-like failures before a domain is marked blocked
    pub consecutive_failure_threshold: u32,
    /// Idle time after which a sticky session is evicted; None keeps
    /// entries until the caller clears them
    pub sticky_session_ttl: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            health_window: 100,
            cooldown_minutes: 60,
            block_threshold: 0.3,
            consecutive_failure_threshold: 3,
            sticky_session_ttl: None,
        }
    }
}

impl TrackerConfig {
    /// Success rate at or above which a proxy counts as healthy
    pub fn healthy_rate_floor(&self) -> f64 {
        1.0 - self.block_threshold
    }
}

struct StickyEntry {
    proxy_id: String,
    last_used: DateTime<Utc>,
}

/// Tracks outcome history and health state for every registered proxy
pub struct HealthTracker {
    config: TrackerConfig,
    proxies: DashMap<String, ProxyHealth>,
    sticky: RwLock<HashMap<String, StickyEntry>>,
}

impl HealthTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            proxies: DashMap::new(),
            sticky: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Register a proxy. Idempotent: a proxy already known keeps its
    /// accumulated history, so pools can be reconfigured without losing
    /// learned health.
    pub fn initialize_proxy(&self, proxy_id: &str, pool_id: &str, tier: ProxyTier) {
        self.proxies
            .entry(proxy_id.to_string())
            .or_insert_with(|| {
                debug!(proxy_id, pool_id, tier = %tier, "Tracking new proxy");
                ProxyHealth::new(proxy_id, pool_id, tier)
            });
    }

    pub fn is_tracked(&self, proxy_id: &str) -> bool {
        self.proxies.contains_key(proxy_id)
    }

    /// Record a successful fetch through a proxy
    pub fn record_success(&self, proxy_id: &str, domain: &str, latency_ms: u64) {
        let now = Utc::now();
        let floor = self.config.healthy_rate_floor();

        let mut health = match self.proxies.get_mut(proxy_id) {
            Some(h) => h,
            None => {
                warn!(proxy_id, "Recorded success for unknown proxy");
                return;
            }
        };

        health.refresh_cooldown(now, floor);
        health.total_requests += 1;
        health.push_outcome(
            RequestOutcome {
                timestamp: now,
                success: true,
                latency_ms: Some(latency_ms),
                domain: domain.to_string(),
                failure_reason: None,
            },
            self.config.health_window,
        );

        let stats = health
            .domain_stats
            .entry(domain.to_string())
            .or_insert_with(DomainStats::default);
        stats.success_count += 1;
        stats.last_success = Some(now);
        stats.consecutive_failures = 0;
        if stats.is_blocked {
            stats.is_blocked = false;
            stats.block_detected_at = None;
            health.blocked_domains.remove(domain);
            info!(proxy_id, domain, "Domain block cleared after success");
        }

        // Success never clears an active cooldown; only expiry does.
        health.recompute_is_healthy(floor);
    }

    /// Record a failed fetch through a proxy. Never fails itself; feeds
    /// domain-block and cooldown state.
    pub fn record_failure(&self, proxy_id: &str, domain: &str, reason: FailureReason) {
        let now = Utc::now();
        let floor = self.config.healthy_rate_floor();

        let mut health = match self.proxies.get_mut(proxy_id) {
            Some(h) => h,
            None => {
                warn!(proxy_id, "Recorded failure for unknown proxy");
                return;
            }
        };

        health.refresh_cooldown(now, floor);
        health.total_requests += 1;
        health.total_failures += 1;
        health.push_outcome(
            RequestOutcome {
                timestamp: now,
                success: false,
                latency_ms: None,
                domain: domain.to_string(),
                failure_reason: Some(reason),
            },
            self.config.health_window,
        );

        let stats = health
            .domain_stats
            .entry(domain.to_string())
            .or_insert_with(DomainStats::default);
        stats.failure_count += 1;
        stats.last_failure = Some(now);
        stats.consecutive_failures += 1;

        if stats.consecutive_failures >= self.config.consecutive_failure_threshold
            && reason.triggers_domain_block()
            && !stats.is_blocked
        {
            stats.is_blocked = true;
            stats.block_detected_at = Some(now);
            let consecutive = stats.consecutive_failures;
            health.blocked_domains.insert(domain.to_string());
            warn!(
                proxy_id,
                domain,
                reason = %reason,
                consecutive,
                "Domain blocked for proxy"
            );
        }

        health.recompute_is_healthy(floor);

        if health.success_rate < floor && !health.is_in_cooldown {
            let until = now + Duration::minutes(self.config.cooldown_minutes);
            health.enter_cooldown(reason, until);
            warn!(
                proxy_id,
                reason = %reason,
                success_rate = health.success_rate,
                until = %until,
                "Proxy entered cooldown"
            );
        }
    }

    /// Snapshot of a proxy's health, lazily clearing expired cooldown first
    pub fn get_health(&self, proxy_id: &str) -> Option<ProxyHealth> {
        let floor = self.config.healthy_rate_floor();
        let mut health = self.proxies.get_mut(proxy_id)?;
        if health.refresh_cooldown(Utc::now(), floor) {
            debug!(proxy_id, "Cooldown expired");
        }
        Some(health.clone())
    }

    /// False if the proxy is unknown, in cooldown, overall unhealthy, or
    /// blocked for this specific domain
    pub fn is_healthy_for_domain(&self, proxy_id: &str, domain: &str) -> bool {
        let floor = self.config.healthy_rate_floor();
        match self.proxies.get_mut(proxy_id) {
            Some(mut health) => {
                health.refresh_cooldown(Utc::now(), floor);
                health.is_usable_for_domain(domain)
            }
            None => false,
        }
    }

    /// Proxy IDs passing `is_healthy_for_domain`, optionally restricted to
    /// one tier. Order is unspecified; callers apply rotation.
    pub fn healthy_proxies_for_domain(&self, domain: &str, tier: Option<ProxyTier>) -> Vec<String> {
        let now = Utc::now();
        let floor = self.config.healthy_rate_floor();
        self.proxies
            .iter_mut()
            .filter_map(|mut entry| {
                entry.refresh_cooldown(now, floor);
                let matches_tier = tier.map(|t| entry.tier == t).unwrap_or(true);
                if matches_tier && entry.is_usable_for_domain(domain) {
                    Some(entry.proxy_id.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Count proxies that are healthy and out of cooldown, ignoring
    /// per-domain blocks
    pub fn healthy_count(&self, tier: Option<ProxyTier>) -> usize {
        let now = Utc::now();
        let floor = self.config.healthy_rate_floor();
        self.proxies
            .iter_mut()
            .filter_map(|mut entry| {
                if !tier.map(|t| entry.tier == t).unwrap_or(true) {
                    return None;
                }
                entry.refresh_cooldown(now, floor);
                entry.is_healthy.then_some(())
            })
            .count()
    }

    /// Administrative cooldown entry; same fields as automatic entry
    pub fn force_cooldown(
        &self,
        proxy_id: &str,
        reason: FailureReason,
        duration_minutes: Option<i64>,
    ) -> bool {
        let minutes = duration_minutes.unwrap_or(self.config.cooldown_minutes);
        match self.proxies.get_mut(proxy_id) {
            Some(mut health) => {
                let until = Utc::now() + Duration::minutes(minutes);
                health.enter_cooldown(reason, until);
                info!(proxy_id, reason = %reason, minutes, "Cooldown forced");
                true
            }
            None => false,
        }
    }

    /// Administrative cooldown exit; same fields as lazy expiry
    pub fn clear_cooldown(&self, proxy_id: &str) -> bool {
        let floor = self.config.healthy_rate_floor();
        match self.proxies.get_mut(proxy_id) {
            Some(mut health) => {
                health.cooldown_until = None;
                health.cooldown_reason = None;
                health.is_in_cooldown = false;
                health.recompute_is_healthy(floor);
                info!(proxy_id, "Cooldown cleared");
                true
            }
            None => false,
        }
    }

    /// Clear the block and consecutive-failure count for a domain across
    /// every tracked proxy, e.g. after a site-wide block lifts. Returns the
    /// number of proxies whose block was cleared.
    pub fn clear_domain_blocks(&self, domain: &str) -> usize {
        let mut cleared = 0;
        for mut entry in self.proxies.iter_mut() {
            if let Some(stats) = entry.domain_stats.get_mut(domain) {
                stats.consecutive_failures = 0;
                if stats.is_blocked {
                    stats.is_blocked = false;
                    stats.block_detected_at = None;
                    cleared += 1;
                }
            }
            entry.blocked_domains.remove(domain);
        }
        if cleared > 0 {
            info!(domain, cleared, "Domain blocks cleared");
        }
        cleared
    }

    // ==================== Sticky sessions ====================

    /// Look up the pinned proxy for a session, evicting the entry first if
    /// it has outlived the configured TTL
    pub fn sticky_proxy(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sticky.write();
        if let Some(ttl) = self.config.sticky_session_ttl {
            if let Some(entry) = sessions.get(session_id) {
                if Utc::now() - entry.last_used > ttl {
                    sessions.remove(session_id);
                    debug!(session_id, "Sticky session expired");
                    return None;
                }
            }
        }
        sessions.get_mut(session_id).map(|entry| {
            entry.last_used = Utc::now();
            entry.proxy_id.clone()
        })
    }

    pub fn set_sticky_proxy(&self, session_id: &str, proxy_id: &str) {
        self.sticky.write().insert(
            session_id.to_string(),
            StickyEntry {
                proxy_id: proxy_id.to_string(),
                last_used: Utc::now(),
            },
        );
    }

    pub fn clear_sticky_proxy(&self, session_id: &str) {
        self.sticky.write().remove(session_id);
    }

    pub fn sticky_session_count(&self) -> usize {
        self.sticky.read().len()
    }

    // ==================== Selection bookkeeping ====================

    /// Stamp a proxy as used by a selection decision
    pub fn mark_used(&self, proxy_id: &str) {
        if let Some(mut health) = self.proxies.get_mut(proxy_id) {
            health.last_used = Some(Utc::now());
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.proxies.len()
    }

    /// Sum of lifetime request counters for one pool
    pub fn pool_request_total(&self, pool_id: &str) -> u64 {
        self.proxies
            .iter()
            .filter(|e| e.pool_id == pool_id)
            .map(|e| e.total_requests)
            .sum()
    }

    // ==================== Aggregate statistics ====================

    /// Totals across all proxies plus a per-tier breakdown. Cooldown expiry
    /// is re-evaluated per proxy while iterating, so counts reflect the
    /// current time even for proxies nothing has read recently.
    pub fn aggregate_stats(&self) -> AggregateStats {
        let now = Utc::now();
        let floor = self.config.healthy_rate_floor();

        let mut total = 0usize;
        let mut healthy = 0usize;
        let mut in_cooldown = 0usize;
        let mut rate_sum = 0.0;
        let mut latency_sum = 0.0;
        let mut latency_samples = 0usize;
        let mut tiers: BTreeMap<String, TierStats> = BTreeMap::new();

        for mut entry in self.proxies.iter_mut() {
            entry.refresh_cooldown(now, floor);

            total += 1;
            if entry.is_healthy {
                healthy += 1;
            }
            if entry.is_in_cooldown {
                in_cooldown += 1;
            }
            rate_sum += entry.success_rate;
            if entry.avg_latency_ms > 0.0 {
                latency_sum += entry.avg_latency_ms;
                latency_samples += 1;
            }

            tiers
                .entry(entry.tier.as_str().to_string())
                .or_default()
                .fold(entry.success_rate, entry.is_healthy);
        }

        AggregateStats {
            total_proxies: total,
            healthy_proxies: healthy,
            in_cooldown,
            avg_success_rate: if total == 0 { 0.0 } else { rate_sum / total as f64 },
            avg_latency_ms: if latency_samples == 0 {
                0.0
            } else {
                latency_sum / latency_samples as f64
            },
            tiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> HealthTracker {
        HealthTracker::new(TrackerConfig::default())
    }

    fn small_window_tracker() -> HealthTracker {
        HealthTracker::new(TrackerConfig {
            health_window: 10,
            ..TrackerConfig::default()
        })
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let t = tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);
        t.record_success("p1", "example.com", 100);
        t.record_success("p1", "example.com", 100);

        // Re-registration must not reset accumulated history
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);
        let h = t.get_health("p1").unwrap();
        assert_eq!(h.total_requests, 2);
    }

    #[test]
    fn test_success_rate_matches_window_contents() {
        let t = small_window_tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        for _ in 0..7 {
            t.record_success("p1", "example.com", 50);
        }
        for _ in 0..3 {
            t.record_failure("p1", "example.com", FailureReason::Timeout);
        }

        let h = t.get_health("p1").unwrap();
        assert!((h.success_rate - 0.7).abs() < 1e-9);
        assert!(h.success_rate >= 0.0 && h.success_rate <= 1.0);
    }

    #[test]
    fn test_lifetime_counters_survive_eviction() {
        let t = HealthTracker::new(TrackerConfig {
            health_window: 5,
            ..TrackerConfig::default()
        });
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        for _ in 0..20 {
            t.record_success("p1", "example.com", 10);
        }
        for _ in 0..4 {
            t.record_failure("p1", "example.com", FailureReason::Timeout);
        }

        let h = t.get_health("p1").unwrap();
        assert_eq!(h.total_requests, 24);
        assert_eq!(h.total_failures, 4);
        // Window only holds the last 5 outcomes: 1 success, 4 failures
        assert!((h.success_rate - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_domain_block_requires_consecutive_trigger_reasons() {
        let t = tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        t.record_failure("p1", "hard.com", FailureReason::Blocked);
        t.record_failure("p1", "hard.com", FailureReason::Blocked);
        let h = t.get_health("p1").unwrap();
        assert!(!h.blocked_domains.contains("hard.com"));

        t.record_failure("p1", "hard.com", FailureReason::Captcha);
        let h = t.get_health("p1").unwrap();
        assert!(h.blocked_domains.contains("hard.com"));
        let ds = h.domain_stats.get("hard.com").unwrap();
        assert!(ds.is_blocked);
        assert!(ds.block_detected_at.is_some());
        assert_eq!(ds.consecutive_failures, 3);

        // Further failures keep counting but do not re-detect the block
        let detected = ds.block_detected_at;
        t.record_failure("p1", "hard.com", FailureReason::Blocked);
        let h = t.get_health("p1").unwrap();
        let ds = h.domain_stats.get("hard.com").unwrap();
        assert_eq!(ds.consecutive_failures, 4);
        assert_eq!(ds.block_detected_at, detected);
        assert!(h.blocked_domains.contains("hard.com"));
    }

    #[test]
    fn test_timeouts_never_block_a_domain() {
        let t = tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        for _ in 0..5 {
            t.record_failure("p1", "slow.com", FailureReason::Timeout);
        }
        let h = t.get_health("p1").unwrap();
        assert!(!h.blocked_domains.contains("slow.com"));
        assert!(!h.domain_stats.get("slow.com").unwrap().is_blocked);
    }

    #[test]
    fn test_success_resets_consecutive_failures_and_clears_block() {
        let t = tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        for _ in 0..3 {
            t.record_failure("p1", "hard.com", FailureReason::RateLimited);
        }
        assert!(t
            .get_health("p1")
            .unwrap()
            .blocked_domains
            .contains("hard.com"));

        t.record_success("p1", "hard.com", 80);
        let h = t.get_health("p1").unwrap();
        assert!(!h.blocked_domains.contains("hard.com"));
        let ds = h.domain_stats.get("hard.com").unwrap();
        assert!(!ds.is_blocked);
        assert!(ds.block_detected_at.is_none());
        assert_eq!(ds.consecutive_failures, 0);
    }

    #[test]
    fn test_domain_block_is_independent_of_cooldown() {
        let t = small_window_tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        // Plenty of successes elsewhere keep the overall rate healthy
        for _ in 0..7 {
            t.record_success("p1", "easy.com", 40);
        }
        for _ in 0..3 {
            t.record_failure("p1", "hard.com", FailureReason::Blocked);
        }

        let h = t.get_health("p1").unwrap();
        assert!(h.blocked_domains.contains("hard.com"));
        // 7/10 = 0.7 is exactly the healthy floor, so no cooldown
        assert!(!h.is_in_cooldown);
        assert!(h.is_healthy);
        assert!(!t.is_healthy_for_domain("p1", "hard.com"));
        assert!(t.is_healthy_for_domain("p1", "easy.com"));
    }

    #[test]
    fn test_cooldown_entry_scenario() {
        // healthWindow=10, blockThreshold=0.3: 6 successes then 4 blocked
        // failures leaves the rate at 0.6 < 0.7, so the proxy cools down.
        let t = small_window_tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        for _ in 0..6 {
            t.record_success("p1", "example.com", 100);
        }
        for _ in 0..4 {
            t.record_failure("p1", "example.com", FailureReason::Blocked);
        }

        let h = t.get_health("p1").unwrap();
        assert!((h.success_rate - 0.6).abs() < 1e-9);
        assert!(h.is_in_cooldown);
        assert!(!h.is_healthy);
        assert_eq!(h.cooldown_reason, Some(FailureReason::Blocked));
        assert!(h.cooldown_until.is_some());
    }

    #[test]
    fn test_success_does_not_clear_active_cooldown() {
        let t = small_window_tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        for _ in 0..10 {
            t.record_failure("p1", "example.com", FailureReason::Network);
        }
        assert!(t.get_health("p1").unwrap().is_in_cooldown);

        t.record_success("p1", "example.com", 50);
        let h = t.get_health("p1").unwrap();
        assert!(h.is_in_cooldown);
        assert!(!h.is_healthy);
    }

    #[test]
    fn test_cooldown_expiry_observed_lazily() {
        let t = tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);

        assert!(t.force_cooldown("p1", FailureReason::Blocked, Some(0)));
        // cooldown_until == now at force time, so the next read clears it
        let h = t.get_health("p1").unwrap();
        assert!(!h.is_in_cooldown);
        assert!(h.cooldown_until.is_none());
        assert!(h.cooldown_reason.is_none());
        assert!(h.is_healthy);
        assert!(t.is_healthy_for_domain("p1", "example.com"));
    }

    #[test]
    fn test_force_and_clear_cooldown() {
        let t = tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Isp);

        assert!(t.force_cooldown("p1", FailureReason::Other, Some(60)));
        assert!(t.get_health("p1").unwrap().is_in_cooldown);
        assert!(!t.is_healthy_for_domain("p1", "example.com"));

        assert!(t.clear_cooldown("p1"));
        let h = t.get_health("p1").unwrap();
        assert!(!h.is_in_cooldown);
        assert!(h.is_healthy);

        assert!(!t.force_cooldown("nope", FailureReason::Other, None));
        assert!(!t.clear_cooldown("nope"));
    }

    #[test]
    fn test_clear_domain_blocks_across_proxies() {
        let t = tracker();
        t.initialize_proxy("p1", "pool1", ProxyTier::Datacenter);
        t.initialize_proxy("p2", "pool1", ProxyTier::Datacenter);

        for _ in 0..3 {
            t.record_failure("p1", "hard.com", FailureReason::Blocked);
            t.record_failure("p2", "hard.com", FailureReason::Captcha);
        }
        assert_eq!(t.healthy_proxies_for_domain("hard.com", None).len(), 0);

        let cleared = t.clear_domain_blocks("hard.com");
        assert_eq!(cleared, 2);
        let h = t.get_health("p1").unwrap();
        assert!(!h.blocked_domains.contains("hard.com"));
        assert_eq!(
            h.domain_stats.get("hard.com").unwrap().consecutive_failures,
            0
        );
    }

    #[test]
    fn test_unknown_proxy_lookups() {
        let t = tracker();
        assert!(t.get_health("ghost").is_none());
        assert!(!t.is_healthy_for_domain("ghost", "example.com"));
        // Recording for an unknown proxy is a no-op, not a panic
        t.record_success("ghost", "example.com", 10);
        t.record_failure("ghost", "example.com", FailureReason::Other);
        assert_eq!(t.tracked_count(), 0);
    }

    #[test]
    fn test_healthy_proxies_for_domain_tier_filter() {
        let t = tracker();
        t.initialize_proxy("dc1", "pool-dc", ProxyTier::Datacenter);
        t.initialize_proxy("res1", "pool-res", ProxyTier::Residential);

        let dc = t.healthy_proxies_for_domain("example.com", Some(ProxyTier::Datacenter));
        assert_eq!(dc, vec!["dc1".to_string()]);

        let all = t.healthy_proxies_for_domain("example.com", None);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_sticky_sessions_roundtrip_and_clear() {
        let t = tracker();
        assert!(t.sticky_proxy("s1").is_none());

        t.set_sticky_proxy("s1", "p1");
        assert_eq!(t.sticky_proxy("s1").as_deref(), Some("p1"));
        assert_eq!(t.sticky_session_count(), 1);

        t.clear_sticky_proxy("s1");
        assert!(t.sticky_proxy("s1").is_none());
        assert_eq!(t.sticky_session_count(), 0);
    }

    #[test]
    fn test_sticky_session_ttl_eviction() {
        let t = HealthTracker::new(TrackerConfig {
            sticky_session_ttl: Some(Duration::seconds(0)),
            ..TrackerConfig::default()
        });
        t.set_sticky_proxy("s1", "p1");
        // Zero TTL means any later read sees an expired entry
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(t.sticky_proxy("s1").is_none());
        assert_eq!(t.sticky_session_count(), 0);
    }

    #[test]
    fn test_aggregate_stats() {
        let t = small_window_tracker();
        t.initialize_proxy("dc1", "pool-dc", ProxyTier::Datacenter);
        t.initialize_proxy("dc2", "pool-dc", ProxyTier::Datacenter);
        t.initialize_proxy("res1", "pool-res", ProxyTier::Residential);

        for _ in 0..10 {
            t.record_success("dc1", "example.com", 100);
        }
        for _ in 0..10 {
            t.record_failure("dc2", "example.com", FailureReason::Network);
        }

        let stats = t.aggregate_stats();
        assert_eq!(stats.total_proxies, 3);
        assert_eq!(stats.healthy_proxies, 2);
        assert_eq!(stats.in_cooldown, 1);
        // dc1 rate 1.0, dc2 rate 0.0, res1 prior 1.0
        assert!((stats.avg_success_rate - 2.0 / 3.0).abs() < 1e-9);
        // Only dc1 has recorded latency
        assert!((stats.avg_latency_ms - 100.0).abs() < 1e-9);

        let dc = stats.tiers.get("datacenter").unwrap();
        assert_eq!(dc.proxies, 2);
        assert_eq!(dc.healthy, 1);
        assert!((dc.avg_success_rate - 0.5).abs() < 1e-9);

        let res = stats.tiers.get("residential").unwrap();
        assert_eq!(res.proxies, 1);
        assert_eq!(res.healthy, 1);
        assert!((res.avg_success_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_healthy_count_per_tier() {
        let t = tracker();
        t.initialize_proxy("dc1", "pool-dc", ProxyTier::Datacenter);
        t.initialize_proxy("dc2", "pool-dc", ProxyTier::Datacenter);
        t.initialize_proxy("isp1", "pool-isp", ProxyTier::Isp);

        t.force_cooldown("dc2", FailureReason::Blocked, Some(60));

        assert_eq!(t.healthy_count(Some(ProxyTier::Datacenter)), 1);
        assert_eq!(t.healthy_count(Some(ProxyTier::Isp)), 1);
        assert_eq!(t.healthy_count(None), 2);
    }
}
