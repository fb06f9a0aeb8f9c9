//! Aggregation of individual checks into a verdict.

use crate::domain::{CheckStatus, ComplianceCheck, ComplianceResult};

/// Weighted pass ratio in 0-100: each check weighs its severity (critical 3,
/// major 2, minor 1); a pass earns its full weight, a warning half of it.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn overall_score(checks: &[ComplianceCheck]) -> u8 {
    let mut earned = 0.0;
    let mut possible = 0.0;
    for check in checks {
        let weight = f64::from(check.severity.weight());
        possible += weight;
        earned += match check.status {
            CheckStatus::Pass => weight,
            CheckStatus::Warn => weight / 2.0,
            CheckStatus::Fail => 0.0,
        };
    }
    if possible <= 0.0 {
        return 100;
    }
    (earned / possible * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Folds checks into a [`ComplianceResult`].
#[must_use]
pub fn summarize(checks: Vec<ComplianceCheck>) -> ComplianceResult {
    let count = |status: CheckStatus| checks.iter().filter(|c| c.status == status).count();
    let passed_count = count(CheckStatus::Pass);
    let failed_count = count(CheckStatus::Fail);
    let warning_count = count(CheckStatus::Warn);

    let critical_failures: Vec<_> = checks
        .iter()
        .filter(|c| c.is_critical_failure())
        .map(|c| c.id)
        .collect();
    let recommendations = checks
        .iter()
        .filter(|c| c.status != CheckStatus::Pass)
        .map(|c| c.id.remedy().to_string())
        .collect();

    ComplianceResult {
        is_compliant: critical_failures.is_empty(),
        overall_score: overall_score(&checks),
        critical_failures,
        passed_count,
        failed_count,
        warning_count,
        recommendations,
        checks,
    }
}
