use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{FailureReason, ProxyTier};

/// One recorded fetch outcome, kept in a bounded FIFO per proxy
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub latency_ms: Option<u64>,
    pub domain: String,
    pub failure_reason: Option<FailureReason>,
}

/// Per-(proxy, domain) outcome history
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomainStats {
    pub success_count: u64,
    pub failure_count: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub is_blocked: bool,
    pub block_detected_at: Option<DateTime<Utc>>,
}

/// Mutable health record for one proxy endpoint.
///
/// `success_rate` and `avg_latency_ms` are always recomputed from the live
/// sliding window; `total_requests`/`total_failures` are lifetime counters
/// and survive window eviction. `is_healthy`/`is_in_cooldown` are derived
/// and re-evaluated on every mutation plus lazily on read, since cooldown
/// expiry is time-based.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyHealth {
    pub proxy_id: String,
    pub pool_id: String,
    pub tier: ProxyTier,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub total_requests: u64,
    pub total_failures: u64,
    pub domain_stats: HashMap<String, DomainStats>,
    pub blocked_domains: HashSet<String>,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub cooldown_reason: Option<FailureReason>,
    pub is_healthy: bool,
    pub is_in_cooldown: bool,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) window: VecDeque<RequestOutcome>,
}

impl ProxyHealth {
    /// Fresh record with an optimistic prior: no history counts as healthy
    pub fn new(proxy_id: impl Into<String>, pool_id: impl Into<String>, tier: ProxyTier) -> Self {
        Self {
            proxy_id: proxy_id.into(),
            pool_id: pool_id.into(),
            tier,
            success_rate: 1.0,
            avg_latency_ms: 0.0,
            total_requests: 0,
            total_failures: 0,
            domain_stats: HashMap::new(),
            blocked_domains: HashSet::new(),
            cooldown_until: None,
            cooldown_reason: None,
            is_healthy: true,
            is_in_cooldown: false,
            last_used: None,
            created_at: Utc::now(),
            window: VecDeque::new(),
        }
    }

    /// Append an outcome, evicting the oldest entry once the window is full,
    /// then recompute the window-derived statistics.
    pub(crate) fn push_outcome(&mut self, outcome: RequestOutcome, window_size: usize) {
        self.window.push_back(outcome);
        while self.window.len() > window_size {
            self.window.pop_front();
        }
        self.recompute_window_stats();
    }

    /// Recompute `success_rate` (successes / window length) and
    /// `avg_latency_ms` (mean over successful outcomes only).
    pub(crate) fn recompute_window_stats(&mut self) {
        if self.window.is_empty() {
            self.success_rate = 1.0;
            self.avg_latency_ms = 0.0;
            return;
        }

        let successes = self.window.iter().filter(|o| o.success).count();
        self.success_rate = successes as f64 / self.window.len() as f64;

        let latencies: Vec<u64> = self
            .window
            .iter()
            .filter(|o| o.success)
            .filter_map(|o| o.latency_ms)
            .collect();
        self.avg_latency_ms = if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<u64>() as f64 / latencies.len() as f64
        };
    }

    /// Re-derive `is_healthy` from the current rate and cooldown state.
    /// `healthy_rate_floor` is `1 - block_threshold`.
    pub(crate) fn recompute_is_healthy(&mut self, healthy_rate_floor: f64) {
        self.is_healthy = self.success_rate >= healthy_rate_floor && !self.is_in_cooldown;
    }

    /// Clear cooldown if it has expired as of `now`. Returns true if cleared.
    pub(crate) fn refresh_cooldown(&mut self, now: DateTime<Utc>, healthy_rate_floor: f64) -> bool {
        match self.cooldown_until {
            Some(until) if now >= until => {
                self.cooldown_until = None;
                self.cooldown_reason = None;
                self.is_in_cooldown = false;
                self.recompute_is_healthy(healthy_rate_floor);
                true
            }
            Some(_) => {
                self.is_in_cooldown = true;
                false
            }
            None => {
                self.is_in_cooldown = false;
                false
            }
        }
    }

    pub(crate) fn enter_cooldown(
        &mut self,
        reason: FailureReason,
        until: DateTime<Utc>,
    ) {
        self.cooldown_until = Some(until);
        self.cooldown_reason = Some(reason);
        self.is_in_cooldown = true;
        self.is_healthy = false;
    }

    /// Whether this proxy may serve the given domain right now
    pub fn is_usable_for_domain(&self, domain: &str) -> bool {
        self.is_healthy && !self.is_in_cooldown && !self.blocked_domains.contains(domain)
    }
}

/// Totals across all tracked proxies
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    pub total_proxies: usize,
    pub healthy_proxies: usize,
    pub in_cooldown: usize,
    pub avg_success_rate: f64,
    pub avg_latency_ms: f64,
    pub tiers: BTreeMap<String, TierStats>,
}

/// Per-tier slice of the aggregate statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct TierStats {
    pub proxies: usize,
    pub healthy: usize,
    /// Running mean maintained incrementally as proxies are folded in
    pub avg_success_rate: f64,
}

impl TierStats {
    /// Fold one proxy's success rate into the running mean:
    /// `(prev_mean * (n - 1) + rate) / n` with n already incremented.
    pub(crate) fn fold(&mut self, success_rate: f64, healthy: bool) {
        self.proxies += 1;
        if healthy {
            self.healthy += 1;
        }
        let n = self.proxies as f64;
        self.avg_success_rate = (self.avg_success_rate * (n - 1.0) + success_rate) / n;
    }
}

/// Per-pool statistics for the admin API
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub pool_id: String,
    pub name: String,
    pub tier: ProxyTier,
    pub rotation_strategy: String,
    pub endpoints: usize,
    pub healthy_endpoints: usize,
    pub total_requests: u64,
}
