//! Multiplicative lifespan adjustment.
//!
//! Composes the categorical factor multipliers onto a base expected-mileage
//! figure, clamping per factor and on the running product so stacked
//! pessimism or optimism cannot run away. Always returns a result; with every
//! factor unknown the output is the base figure at multiplier 1.0.

use crate::domain::{
    AppliedFactor, Confidence, IssueSeverity, KnownIssue, LifespanAnalysis, LifespanFactors,
};
use crate::scoring::config::LifespanConfig;

/// Adjust `base_lifespan_miles` by the resolved factor multipliers.
///
/// The caller supplies the database lifespan or its configured default; this
/// function knows nothing about that fallback policy.
pub fn calculate_adjusted_lifespan(
    base_lifespan_miles: u32,
    factors: &LifespanFactors,
    known_issues: &[KnownIssue],
    config: &LifespanConfig,
) -> LifespanAnalysis {
    let mut applied = Vec::new();
    let mut product = 1.0_f64;

    let lookups: [Option<(f64, &'static str, &'static str)>; 8] = [
        config
            .maintenance
            .lookup(factors.maintenance)
            .map(|(m, v)| (m, "maintenance", v)),
        config
            .driving
            .lookup(factors.driving_conditions)
            .map(|(m, v)| (m, "driving_conditions", v)),
        config
            .accident
            .lookup(factors.accident_history)
            .map(|(m, v)| (m, "accident_history", v)),
        config
            .owners
            .lookup(factors.owner_count)
            .map(|(m, v)| (m, "owner_count", v)),
        config
            .climate
            .lookup(factors.climate_region)
            .map(|(m, v)| (m, "climate_region", v)),
        config
            .transmission
            .lookup(factors.transmission)
            .map(|(m, v)| (m, "transmission", v)),
        config
            .drivetrain
            .lookup(factors.drivetrain)
            .map(|(m, v)| (m, "drivetrain", v)),
        config
            .engine
            .lookup(factors.engine_type)
            .map(|(m, v)| (m, "engine_type", v)),
    ];

    for entry in lookups.into_iter().flatten() {
        let (multiplier, category, value) = entry;
        let clamped = multiplier.clamp(config.factor_floor, config.factor_ceiling);
        product = (product * clamped).clamp(config.product_floor, config.product_ceiling);
        applied.push(AppliedFactor::new(category, value, clamped));
    }

    // One flat penalty for the worst issue tier, not per issue: duplicate
    // complaint clusters for the same underlying defect must not stack.
    if let Some(penalty) = issue_penalty(known_issues, config) {
        product = (product * penalty.0).clamp(config.product_floor, config.product_ceiling);
        applied.push(AppliedFactor::new("known_issues", penalty.1, penalty.0));
    }

    let adjusted = (f64::from(base_lifespan_miles) * product).round() as u32;

    LifespanAnalysis {
        base_lifespan_miles,
        adjusted_lifespan_miles: adjusted,
        total_multiplier: product,
        applied_factors: applied,
        confidence: confidence_from_resolution(factors.resolved_count()),
    }
}

/// Longevity sub-score on the 0-10 scale, from expected life left in the
/// vehicle. Without a mileage reading the full adjusted lifespan counts, at
/// the cost of confidence handled elsewhere.
pub fn longevity_score(
    analysis: &LifespanAnalysis,
    current_mileage: Option<u32>,
    config: &LifespanConfig,
) -> f64 {
    let remaining = f64::from(
        analysis
            .adjusted_lifespan_miles
            .saturating_sub(current_mileage.unwrap_or(0)),
    );
    (remaining / config.longevity_miles_per_point).clamp(0.0, 10.0)
}

fn issue_penalty(issues: &[KnownIssue], config: &LifespanConfig) -> Option<(f64, &'static str)> {
    if issues
        .iter()
        .any(|issue| issue.severity == IssueSeverity::Critical)
    {
        Some((config.critical_issue_penalty, "critical_defect_pattern"))
    } else if issues
        .iter()
        .any(|issue| issue.severity == IssueSeverity::Major)
    {
        Some((config.major_issue_penalty, "major_defect_pattern"))
    } else {
        None
    }
}

fn confidence_from_resolution(resolved: usize) -> Confidence {
    if resolved >= 4 {
        Confidence::High
    } else if resolved >= 2 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AccidentHistory, ClimateRegion, DrivingConditions, Drivetrain, EngineType, FactorImpact,
        MaintenanceQuality, OwnerCount, TransmissionType,
    };

    fn config() -> LifespanConfig {
        LifespanConfig::default()
    }

    fn issue(severity: IssueSeverity) -> KnownIssue {
        KnownIssue {
            component: "POWER TRAIN".to_string(),
            severity,
            description: "transmission failure cluster".to_string(),
            has_safety_incidents: false,
            sample_complaints: vec![],
            affected_years: None,
        }
    }

    #[test]
    fn all_unknown_factors_return_the_base_unchanged() {
        let analysis =
            calculate_adjusted_lifespan(200_000, &LifespanFactors::default(), &[], &config());

        assert_eq!(analysis.adjusted_lifespan_miles, 200_000);
        assert_eq!(analysis.total_multiplier, 1.0);
        assert!(analysis.applied_factors.is_empty());
        assert_eq!(analysis.confidence, Confidence::Low);
    }

    #[test]
    fn resolved_factors_compose_multiplicatively() {
        let factors = LifespanFactors {
            maintenance: MaintenanceQuality::Excellent,
            driving_conditions: DrivingConditions::HighwayPrimary,
            ..LifespanFactors::default()
        };

        let analysis = calculate_adjusted_lifespan(200_000, &factors, &[], &config());

        let expected = 1.15 * 1.10;
        assert!((analysis.total_multiplier - expected).abs() < 1e-9);
        assert_eq!(
            analysis.adjusted_lifespan_miles,
            (200_000.0 * expected).round() as u32
        );
        assert_eq!(analysis.applied_factors.len(), 2);
        assert!(analysis
            .applied_factors
            .iter()
            .all(|factor| factor.impact == FactorImpact::Positive));
        assert_eq!(analysis.confidence, Confidence::Medium);
    }

    #[test]
    fn product_is_clamped_to_the_global_band() {
        let worst = LifespanFactors {
            maintenance: MaintenanceQuality::Poor,
            driving_conditions: DrivingConditions::Severe,
            accident_history: AccidentHistory::Severe,
            owner_count: OwnerCount::Many,
            climate_region: ClimateRegion::CoastalSalt,
            transmission: TransmissionType::Cvt,
            drivetrain: Drivetrain::FourWd,
            engine_type: EngineType::Gasoline,
        };

        let analysis = calculate_adjusted_lifespan(
            200_000,
            &worst,
            &[issue(IssueSeverity::Critical)],
            &config(),
        );

        assert!(analysis.total_multiplier >= 0.4);
        assert!(analysis.total_multiplier <= 1.8);
        assert_eq!(analysis.adjusted_lifespan_miles, 80_000);
        assert_eq!(analysis.confidence, Confidence::High);
    }

    #[test]
    fn critical_issue_penalty_applies_once() {
        let issues = vec![
            issue(IssueSeverity::Critical),
            issue(IssueSeverity::Critical),
            issue(IssueSeverity::Major),
        ];

        let analysis =
            calculate_adjusted_lifespan(200_000, &LifespanFactors::default(), &issues, &config());

        assert!((analysis.total_multiplier - 0.90).abs() < 1e-9);
        assert_eq!(analysis.adjusted_lifespan_miles, 180_000);
        assert_eq!(analysis.applied_factors.len(), 1);
        assert_eq!(analysis.applied_factors[0].category, "known_issues");
    }

    #[test]
    fn major_issue_penalty_is_milder_than_critical() {
        let analysis = calculate_adjusted_lifespan(
            200_000,
            &LifespanFactors::default(),
            &[issue(IssueSeverity::Major)],
            &config(),
        );
        assert!((analysis.total_multiplier - 0.95).abs() < 1e-9);

        let minor_only = calculate_adjusted_lifespan(
            200_000,
            &LifespanFactors::default(),
            &[issue(IssueSeverity::Minor)],
            &config(),
        );
        assert_eq!(minor_only.total_multiplier, 1.0);
    }

    #[test]
    fn longevity_score_tracks_remaining_life() {
        let analysis =
            calculate_adjusted_lifespan(200_000, &LifespanFactors::default(), &[], &config());

        assert_eq!(longevity_score(&analysis, None, &config()), 8.0);
        assert_eq!(longevity_score(&analysis, Some(100_000), &config()), 4.0);
        assert_eq!(longevity_score(&analysis, Some(300_000), &config()), 0.0);

        let long_lived = calculate_adjusted_lifespan(
            280_000,
            &LifespanFactors {
                maintenance: MaintenanceQuality::Excellent,
                ..LifespanFactors::default()
            },
            &[],
            &config(),
        );
        assert_eq!(longevity_score(&long_lived, Some(0), &config()), 10.0);
    }

    #[test]
    fn confidence_tracks_resolved_category_count() {
        let mut factors = LifespanFactors::default();
        factors.maintenance = MaintenanceQuality::Good;
        let analysis = calculate_adjusted_lifespan(180_000, &factors, &[], &config());
        assert_eq!(analysis.confidence, Confidence::Low);

        factors.owner_count = OwnerCount::Single;
        factors.climate_region = ClimateRegion::Arid;
        let analysis = calculate_adjusted_lifespan(180_000, &factors, &[], &config());
        assert_eq!(analysis.confidence, Confidence::Medium);

        factors.drivetrain = Drivetrain::Fwd;
        let analysis = calculate_adjusted_lifespan(180_000, &factors, &[], &config());
        assert_eq!(analysis.confidence, Confidence::High);
    }
}
