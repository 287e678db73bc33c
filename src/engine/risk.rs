//! Domain risk classification interface
//!
//! The classifier maps a target domain to the minimum proxy tier expected
//! to fetch it successfully. It is an external collaborator: the selector
//! treats it as a black box, awaits it before taking any locks, and falls
//! back to the cheapest allowed tier when it errors.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ProxyTier;

/// Verdict returned by a risk classifier
#[derive(Debug, Clone, Copy)]
pub struct RiskAssessment {
    pub minimum_tier: ProxyTier,
    pub confidence: f64,
}

/// Maps a domain to the minimum tier required to fetch it. Any
/// implementation can be substituted: a static rule table, a learned
/// model, or a remote service.
#[async_trait]
pub trait RiskClassifier: Send + Sync {
    async fn classify(&self, domain: &str) -> Result<RiskAssessment>;
}

/// Rule-table classifier: longest matching domain suffix wins, otherwise
/// the default tier applies. Suitable for development and tests.
pub struct StaticRiskClassifier {
    rules: Vec<(String, ProxyTier)>,
    default_tier: ProxyTier,
}

impl StaticRiskClassifier {
    pub fn new(rules: Vec<(String, ProxyTier)>, default_tier: ProxyTier) -> Self {
        Self {
            rules,
            default_tier,
        }
    }
}

impl Default for StaticRiskClassifier {
    fn default() -> Self {
        Self::new(Vec::new(), ProxyTier::Datacenter)
    }
}

#[async_trait]
impl RiskClassifier for StaticRiskClassifier {
    async fn classify(&self, domain: &str) -> Result<RiskAssessment> {
        let domain = domain.to_lowercase();
        let mut best: Option<(&str, ProxyTier)> = None;
        for (suffix, tier) in &self.rules {
            let matches = domain == *suffix || domain.ends_with(&format!(".{}", suffix));
            if matches {
                let longer = best.map(|(s, _)| suffix.len() > s.len()).unwrap_or(true);
                if longer {
                    best = Some((suffix, *tier));
                }
            }
        }
        match best {
            Some((_, tier)) => Ok(RiskAssessment {
                minimum_tier: tier,
                confidence: 0.9,
            }),
            None => Ok(RiskAssessment {
                minimum_tier: self.default_tier,
                confidence: 0.5,
            }),
        }
    }
}
