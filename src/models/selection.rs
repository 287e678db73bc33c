use serde::Serialize;

use super::{ProxyEndpoint, ProxyTier, TenantPlan};

/// Input to a selection decision; never stored
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub domain: String,
    pub tenant_id: String,
    pub plan: TenantPlan,
    pub preferred_tier: Option<ProxyTier>,
    pub preferred_country: Option<String>,
    pub sticky_session_id: Option<String>,
}

impl SelectionRequest {
    pub fn new(domain: impl Into<String>, tenant_id: impl Into<String>, plan: TenantPlan) -> Self {
        Self {
            domain: domain.into(),
            tenant_id: tenant_id.into(),
            plan,
            preferred_tier: None,
            preferred_country: None,
            sticky_session_id: None,
        }
    }

    pub fn with_preferred_tier(mut self, tier: ProxyTier) -> Self {
        self.preferred_tier = Some(tier);
        self
    }

    pub fn with_preferred_country(mut self, country: impl Into<String>) -> Self {
        self.preferred_country = Some(country.into());
        self
    }

    pub fn with_sticky_session(mut self, session_id: impl Into<String>) -> Self {
        self.sticky_session_id = Some(session_id.into());
        self
    }
}

/// Why a particular proxy was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    StickySession,
    PreferredTier,
    RiskBased,
    Escalated { from: ProxyTier, to: ProxyTier },
    RoundRobin,
    LeastUsed,
    Healthiest,
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionReason::StickySession => write!(f, "sticky_session"),
            SelectionReason::PreferredTier => write!(f, "preferred_tier"),
            SelectionReason::RiskBased => write!(f, "risk_based"),
            SelectionReason::Escalated { from, to } => write!(f, "escalated:{}->{}", from, to),
            SelectionReason::RoundRobin => write!(f, "round_robin"),
            SelectionReason::LeastUsed => write!(f, "least_used"),
            SelectionReason::Healthiest => write!(f, "healthiest"),
        }
    }
}

impl Serialize for SelectionReason {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Output of a selection decision; never stored
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResult {
    pub endpoint: ProxyEndpoint,
    pub tier: ProxyTier,
    pub reason: SelectionReason,
}
