//! Award derivation from a complete set of station results.
//!
//! Tiers come from `GradingPolicy` and are tried in order; the first tier whose
//! total and minimum-grade thresholds are both met wins.

use nf_core::{Award, AwardKind, EvaluationResult, GradingPolicy};

pub fn derive_award(result: &EvaluationResult, policy: &GradingPolicy) -> Award {
    let missing = result.missing_stations();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
        return Award {
            kind: AwardKind::NoAward,
            reason: format!("incomplete results: missing {}", names.join(", ")),
        };
    }

    let total = result.total_points;
    let Some(min_grade) = result.min_grade() else {
        return Award { kind: AwardKind::NoAward, reason: "incomplete results".into() };
    };

    for tier in &policy.tiers {
        if total >= tier.min_total && min_grade >= tier.min_grade {
            return Award {
                kind: tier.kind,
                reason: format!(
                    "total {total} >= {} and lowest grade {min_grade} >= {}",
                    tier.min_total, tier.min_grade
                ),
            };
        }
    }

    // Explain against the easiest tier.
    let reason = match policy.tiers.last() {
        Some(t) if total < t.min_total => {
            format!("total {total} below {} threshold {}", t.kind, t.min_total)
        }
        Some(t) => format!("lowest grade {min_grade} below {} minimum {}", t.kind, t.min_grade),
        None => "no award tiers configured".into(),
    };
    Award { kind: AwardKind::NoAward, reason }
}
