//! Grading policy: award tier thresholds, run-distance cutoff, station domain caps.
//!
//! `GradingPolicy::default()` carries the normative values. A JSON policy file
//! may override them; `validate_domains()` must pass before the policy is used.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grade::{AwardKind, Grade};
use crate::participant::DEFAULT_LONG_RUN_AGE;
use crate::station::Station;

/// One award tier: reached when total ≥ `min_total` and every station grade ≥ `min_grade`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AwardTier {
    pub kind: AwardKind,
    pub min_total: u32,
    pub min_grade: Grade,
}

/// Upper bound of the dense lookup array per station (counts, cm, run seconds).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DomainCaps {
    pub situps: u32,
    pub pullups: u32,
    pub broad_jump: u32,
    pub sit_and_reach: u32,
    pub run_seconds: u32,
}

impl Default for DomainCaps {
    fn default() -> Self {
        Self { situps: 100, pullups: 60, broad_jump: 400, sit_and_reach: 100, run_seconds: 3600 }
    }
}

impl DomainCaps {
    /// `None` for the shuttle run, which is scanned instead of indexed.
    pub fn cap(&self, station: Station) -> Option<u32> {
        match station {
            Station::SitUps => Some(self.situps),
            Station::PullUps => Some(self.pullups),
            Station::BroadJump => Some(self.broad_jump),
            Station::SitAndReach => Some(self.sit_and_reach),
            Station::Run => Some(self.run_seconds),
            Station::ShuttleRun => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GradingPolicy {
    /// Checked in order; first match wins.
    pub tiers: Vec<AwardTier>,
    pub long_run_age: u8,
    pub domain_caps: DomainCaps,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                AwardTier { kind: AwardKind::Gold, min_total: 21, min_grade: Grade::C },
                AwardTier { kind: AwardKind::Silver, min_total: 15, min_grade: Grade::D },
                AwardTier { kind: AwardKind::Bronze, min_total: 6, min_grade: Grade::E },
            ],
            long_run_age: DEFAULT_LONG_RUN_AGE,
            domain_caps: DomainCaps::default(),
        }
    }
}

/// -------- Validation (domain + cross-field consistency) --------

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PolicyError {
    #[error("policy domain error: {0}")]
    Domain(String),
    #[error("policy consistency error: {0}")]
    Consistency(String),
}

impl GradingPolicy {
    pub fn validate_domains(&self) -> Result<(), PolicyError> {
        if self.tiers.is_empty() {
            return Err(PolicyError::Domain("at least one award tier is required".into()));
        }
        if self.tiers.iter().any(|t| t.kind == AwardKind::NoAward) {
            return Err(PolicyError::Domain("'No Award' cannot be a tier".into()));
        }
        for station in Station::ALL {
            if self.domain_caps.cap(station) == Some(0) {
                return Err(PolicyError::Domain(format!("domain cap for {station} must be > 0")));
            }
        }
        if self.long_run_age == 0 {
            return Err(PolicyError::Domain("long_run_age must be > 0".into()));
        }

        // --- Cross-field consistency ---

        for pair in self.tiers.windows(2) {
            let (hi, lo) = (&pair[0], &pair[1]);
            if hi.kind == lo.kind {
                return Err(PolicyError::Consistency(format!("duplicate tier {}", hi.kind)));
            }
            if hi.min_total < lo.min_total || hi.min_grade < lo.min_grade {
                return Err(PolicyError::Consistency(format!(
                    "tier {} must not be easier than {}",
                    hi.kind, lo.kind
                )));
            }
        }
        Ok(())
    }

    pub fn tier(&self, kind: AwardKind) -> Option<&AwardTier> {
        self.tiers.iter().find(|t| t.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let p = GradingPolicy::default();
        assert!(p.validate_domains().is_ok());
        assert_eq!(p.tier(AwardKind::Gold).map(|t| t.min_total), Some(21));
        assert_eq!(p.domain_caps.cap(Station::BroadJump), Some(400));
        assert_eq!(p.domain_caps.cap(Station::Run), Some(3600));
        assert_eq!(p.domain_caps.cap(Station::ShuttleRun), None);
    }

    #[test]
    fn rejects_inverted_tiers() {
        let mut p = GradingPolicy::default();
        p.tiers.swap(0, 1);
        assert!(matches!(p.validate_domains(), Err(PolicyError::Consistency(_))));
    }

    #[test]
    fn rejects_zero_cap() {
        let mut p = GradingPolicy::default();
        p.domain_caps.pullups = 0;
        assert!(matches!(p.validate_domains(), Err(PolicyError::Domain(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p: GradingPolicy = serde_json::from_str(r#"{"long_run_age": 13}"#).unwrap();
        assert_eq!(p.long_run_age, 13);
        assert_eq!(p.tiers.len(), 3);
        assert_eq!(p.tiers[1].kind, AwardKind::Silver);
    }
}
