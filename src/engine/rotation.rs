//! Rotation strategies
//!
//! Given the healthy candidate endpoints of one pool, pick the one to use
//! next. Round-robin keeps a per-pool cursor; least-used and healthiest
//! rank candidates by tracker statistics with deterministic tie-breaking.

use std::collections::HashSet;

use dashmap::DashMap;

use super::tracker::HealthTracker;
use crate::models::{ProxyEndpoint, ProxyPoolConfig, RotationStrategy, SelectionReason};

/// Per-pool round-robin cursors
#[derive(Default)]
pub struct RotationCursors {
    cursors: DashMap<String, usize>,
}

impl RotationCursors {
    pub fn new() -> Self {
        Self {
            cursors: DashMap::new(),
        }
    }

    fn start(&self, pool_id: &str) -> usize {
        self.cursors.get(pool_id).map(|c| *c).unwrap_or(0)
    }

    fn store(&self, pool_id: &str, next: usize) {
        self.cursors.insert(pool_id.to_string(), next);
    }

    pub fn forget(&self, pool_id: &str) {
        self.cursors.remove(pool_id);
    }
}

/// The selection reason emitted when rotation itself justifies the pick
pub fn strategy_reason(strategy: RotationStrategy) -> SelectionReason {
    match strategy {
        RotationStrategy::RoundRobin => SelectionReason::RoundRobin,
        RotationStrategy::LeastUsed => SelectionReason::LeastUsed,
        RotationStrategy::Healthiest => SelectionReason::Healthiest,
    }
}

/// Apply a pool's rotation strategy to its candidate set.
///
/// `candidates` must already be filtered to healthy-for-domain endpoints
/// (and country, if requested), in pool endpoint order.
pub fn pick<'a>(
    pool: &'a ProxyPoolConfig,
    candidates: &[&'a ProxyEndpoint],
    tracker: &HealthTracker,
    cursors: &RotationCursors,
) -> Option<&'a ProxyEndpoint> {
    if candidates.is_empty() {
        return None;
    }

    match pool.rotation_strategy {
        RotationStrategy::RoundRobin => pick_round_robin(pool, candidates, cursors),
        RotationStrategy::LeastUsed => pick_least_used(candidates, tracker),
        RotationStrategy::Healthiest => pick_healthiest(candidates, tracker),
    }
}

/// Advance the pool cursor modulo the endpoint count, skipping endpoints
/// that are not in the candidate set, until a candidate is found.
fn pick_round_robin<'a>(
    pool: &'a ProxyPoolConfig,
    candidates: &[&'a ProxyEndpoint],
    cursors: &RotationCursors,
) -> Option<&'a ProxyEndpoint> {
    let candidate_ids: HashSet<&str> = candidates.iter().map(|e| e.id.as_str()).collect();
    let len = pool.endpoints.len();
    let start = cursors.start(&pool.id);

    for offset in 0..len {
        let idx = (start + offset) % len;
        let endpoint = &pool.endpoints[idx];
        if candidate_ids.contains(endpoint.id.as_str()) {
            cursors.store(&pool.id, (idx + 1) % len);
            return Some(endpoint);
        }
    }
    None
}

/// Lowest lifetime request count wins; ties go to the earlier endpoint
fn pick_least_used<'a>(
    candidates: &[&'a ProxyEndpoint],
    tracker: &HealthTracker,
) -> Option<&'a ProxyEndpoint> {
    let mut best: Option<(&'a ProxyEndpoint, u64)> = None;
    for endpoint in candidates {
        let requests = tracker
            .get_health(&endpoint.id)
            .map(|h| h.total_requests)
            .unwrap_or(0);
        match best {
            Some((_, best_requests)) if requests >= best_requests => {}
            _ => best = Some((endpoint, requests)),
        }
    }
    best.map(|(e, _)| e)
}

/// Highest success rate wins; ties go to the lower average latency
fn pick_healthiest<'a>(
    candidates: &[&'a ProxyEndpoint],
    tracker: &HealthTracker,
) -> Option<&'a ProxyEndpoint> {
    let mut best: Option<(&'a ProxyEndpoint, f64, f64)> = None;
    for endpoint in candidates {
        let (rate, latency) = tracker
            .get_health(&endpoint.id)
            .map(|h| (h.success_rate, h.avg_latency_ms))
            .unwrap_or((0.0, f64::MAX));
        let better = match best {
            None => true,
            Some((_, best_rate, best_latency)) => {
                rate > best_rate || (rate == best_rate && latency < best_latency)
            }
        };
        if better {
            best = Some((endpoint, rate, latency));
        }
    }
    best.map(|(e, _, _)| e)
}
