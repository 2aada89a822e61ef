//! Weibull remaining-life model.
//!
//! `S(m) = exp(-(m/lambda)^k)`. The scale `lambda` is calibrated so the
//! survival probability at the adjusted lifespan is 0.5 — "expected lifespan"
//! is a median, not a maximum. The shape `k` stays above 1 (failure hazard
//! rises with age), sharpened by reliability and widened by serious known
//! issues. Milestone probabilities are conditional on the mileage already
//! reached; the median and interquartile remaining miles are solved in closed
//! form, not simulated. Calibration is sanity-bounded by
//! [`SURVIVAL_CALIBRATION_NOTE`](crate::scoring::config::SURVIVAL_CALIBRATION_NOTE).

use crate::domain::{
    Confidence, ConfidenceRange, IssueSeverity, KnownIssue, RiskLevel, SurvivalAnalysis,
    SurvivalMilestone,
};
use crate::scoring::config::SurvivalConfig;

/// Inputs to the survival projection.
#[derive(Debug, Clone)]
pub struct SurvivalInputs<'a> {
    pub current_mileage: u32,
    pub vehicle_age_years: u32,
    pub adjusted_lifespan_miles: u32,
    pub base_reliability_score: f64,
    pub known_issues: &'a [KnownIssue],
    pub lifespan_confidence: Confidence,
}

/// Project conditional survival probabilities over future mileage.
pub fn calculate_survival_probabilities(
    inputs: &SurvivalInputs<'_>,
    config: &SurvivalConfig,
) -> SurvivalAnalysis {
    let shape = shape_parameter(inputs, config);
    let scale = scale_parameter(inputs.adjusted_lifespan_miles, shape);
    let current = f64::from(inputs.current_mileage);

    let survival_now = weibull_survival(current, scale, shape);

    let milestones = config
        .checkpoints
        .iter()
        .map(|&additional| {
            let total = inputs.current_mileage.saturating_add(additional);
            let probability = if survival_now > 0.0 {
                (weibull_survival(f64::from(total), scale, shape) / survival_now).clamp(0.0, 1.0)
            } else {
                0.0
            };
            SurvivalMilestone {
                additional_miles: additional,
                total_miles: total,
                probability,
                risk_level: RiskLevel::from_probability(probability),
            }
        })
        .collect();

    let expected_additional_miles = conditional_quantile_miles(current, scale, shape, 0.5);
    let confidence_range = ConfidenceRange {
        low: conditional_quantile_miles(current, scale, shape, 0.75),
        high: conditional_quantile_miles(current, scale, shape, 0.25),
    };

    let mut warnings = Vec::new();
    if inputs.lifespan_confidence == Confidence::Low {
        warnings.push(
            "Few lifespan factors were resolved; the projection leans on model averages"
                .to_string(),
        );
    }
    if inputs.current_mileage > inputs.adjusted_lifespan_miles {
        warnings.push(format!(
            "Current mileage ({}) already exceeds the median expected lifespan ({})",
            inputs.current_mileage, inputs.adjusted_lifespan_miles
        ));
    }
    if inputs.vehicle_age_years > 0
        && f64::from(inputs.current_mileage) / f64::from(inputs.vehicle_age_years) > 20_000.0
    {
        warnings.push("Annual mileage is well above typical use".to_string());
    }

    tracing::debug!(
        shape,
        scale,
        current_mileage = inputs.current_mileage,
        expected_additional_miles,
        "survival curve computed"
    );

    SurvivalAnalysis {
        milestones,
        expected_additional_miles,
        confidence_range,
        model_confidence: inputs.lifespan_confidence,
        warnings,
    }
}

fn shape_parameter(inputs: &SurvivalInputs<'_>, config: &SurvivalConfig) -> f64 {
    let mut shape = config.base_shape
        + (inputs.base_reliability_score - 5.0) * config.shape_per_reliability_point;

    if inputs
        .known_issues
        .iter()
        .any(|issue| issue.severity == IssueSeverity::Critical)
    {
        shape -= config.critical_issue_shape_penalty;
    } else if inputs
        .known_issues
        .iter()
        .any(|issue| issue.severity == IssueSeverity::Major)
    {
        shape -= config.major_issue_shape_penalty;
    }

    shape.clamp(config.shape_floor, config.shape_ceiling)
}

/// Scale such that `S(adjusted_lifespan) = 0.5`.
fn scale_parameter(adjusted_lifespan_miles: u32, shape: f64) -> f64 {
    let lifespan = f64::from(adjusted_lifespan_miles.max(1));
    lifespan / std::f64::consts::LN_2.powf(1.0 / shape)
}

fn weibull_survival(miles: f64, scale: f64, shape: f64) -> f64 {
    if miles <= 0.0 {
        return 1.0;
    }
    (-(miles / scale).powf(shape)).exp()
}

/// Additional miles at which conditional survival equals `probability`.
///
/// From `S(c + x) / S(c) = p`: `x = (c^k + lambda^k * ln(1/p))^(1/k) - c`.
fn conditional_quantile_miles(current: f64, scale: f64, shape: f64, probability: f64) -> u32 {
    let ln_inv_p = (1.0 / probability).ln();
    let total = (current.powf(shape) + scale.powf(shape) * ln_inv_p).powf(1.0 / shape);
    (total - current).max(0.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SurvivalConfig {
        SurvivalConfig::default()
    }

    fn inputs<'a>(
        current_mileage: u32,
        adjusted: u32,
        reliability: f64,
        issues: &'a [KnownIssue],
    ) -> SurvivalInputs<'a> {
        SurvivalInputs {
            current_mileage,
            vehicle_age_years: 8,
            adjusted_lifespan_miles: adjusted,
            base_reliability_score: reliability,
            known_issues: issues,
            lifespan_confidence: Confidence::Medium,
        }
    }

    fn critical_issue() -> KnownIssue {
        KnownIssue {
            component: "POWER TRAIN".to_string(),
            severity: IssueSeverity::Critical,
            description: "transmission failure cluster".to_string(),
            has_safety_incidents: false,
            sample_complaints: vec![],
            affected_years: None,
        }
    }

    #[test]
    fn survival_at_zero_miles_is_certain() {
        let shape = 3.0;
        let scale = scale_parameter(200_000, shape);
        assert_eq!(weibull_survival(0.0, scale, shape), 1.0);
    }

    #[test]
    fn survival_at_the_adjusted_lifespan_is_one_half() {
        let shape = 3.0;
        let scale = scale_parameter(200_000, shape);
        let survival = weibull_survival(200_000.0, scale, shape);
        assert!((survival - 0.5).abs() < 1e-9);
    }

    #[test]
    fn milestone_probabilities_are_monotonically_non_increasing() {
        let analysis = calculate_survival_probabilities(&inputs(80_000, 220_000, 7.0, &[]), &config());

        for pair in analysis.milestones.windows(2) {
            assert!(pair[1].probability <= pair[0].probability + 1e-12);
        }
        for milestone in &analysis.milestones {
            assert!((0.0..=1.0).contains(&milestone.probability));
        }
    }

    #[test]
    fn interquartile_range_brackets_the_median() {
        let analysis = calculate_survival_probabilities(&inputs(60_000, 200_000, 6.0, &[]), &config());

        assert!(analysis.confidence_range.low < analysis.expected_additional_miles);
        assert!(analysis.expected_additional_miles < analysis.confidence_range.high);
    }

    #[test]
    fn critical_issues_widen_the_early_failure_tail() {
        let issues = [critical_issue()];
        let clean = calculate_survival_probabilities(&inputs(50_000, 200_000, 6.0, &[]), &config());
        let flawed =
            calculate_survival_probabilities(&inputs(50_000, 200_000, 6.0, &issues), &config());

        // Lower shape means more probability mass on early failure at the
        // first checkpoints.
        assert!(flawed.milestones[0].probability < clean.milestones[0].probability);
    }

    #[test]
    fn higher_reliability_sharpens_the_cutoff() {
        let reliable =
            calculate_survival_probabilities(&inputs(50_000, 200_000, 9.0, &[]), &config());
        let unreliable =
            calculate_survival_probabilities(&inputs(50_000, 200_000, 2.0, &[]), &config());

        assert!(reliable.milestones[0].probability > unreliable.milestones[0].probability);
    }

    #[test]
    fn past_median_lifespan_is_annotated_not_suppressed() {
        let analysis =
            calculate_survival_probabilities(&inputs(250_000, 200_000, 7.0, &[]), &config());

        assert!(!analysis.milestones.is_empty());
        assert!(analysis
            .warnings
            .iter()
            .any(|warning| warning.contains("exceeds the median expected lifespan")));
    }

    #[test]
    fn low_confidence_inputs_produce_a_warning() {
        let mut input = inputs(40_000, 200_000, 6.0, &[]);
        input.lifespan_confidence = Confidence::Low;
        let analysis = calculate_survival_probabilities(&input, &config());

        assert_eq!(analysis.model_confidence, Confidence::Low);
        assert!(!analysis.warnings.is_empty());
    }
}
