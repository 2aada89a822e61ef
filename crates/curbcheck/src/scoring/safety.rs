//! Safety scoring from NHTSA star ratings and complaint incident flags.

use crate::domain::{
    Confidence, FlagSeverity, FlagType, RedFlag, SafetyBreakdown, SafetyResult,
};
use crate::scoring::config::SafetyConfig;
use crate::sources::{ComplaintRecord, SafetyRatings};

/// Fuse star ratings with a complaint-derived penalty into a 0-10 score.
pub fn calculate_safety_score(
    ratings: Option<&SafetyRatings>,
    complaints: &[ComplaintRecord],
    year: u16,
    config: &SafetyConfig,
) -> SafetyResult {
    let mut breakdown = SafetyBreakdown::default();

    let (base, has_crash_test_data, rating_count) = match ratings {
        Some(ratings) => rated_base(ratings, &mut breakdown, config),
        None => (config.neutral_base_score, false, 0),
    };

    let penalty = incident_penalty(complaints, config);
    breakdown.complaint_penalty = penalty;

    let score = (base - penalty).clamp(0.0, 10.0);

    let confidence = if !has_crash_test_data {
        Confidence::Low
    } else if rating_count >= 3 && !breakdown.component_ratings_only {
        Confidence::High
    } else {
        Confidence::Medium
    };

    tracing::debug!(year, score, has_crash_test_data, "safety scored");

    SafetyResult {
        score,
        breakdown,
        confidence,
        has_crash_test_data,
    }
}

/// Weighted star base on the 0-10 scale, falling back to component ratings
/// when no overall star exists.
fn rated_base(
    ratings: &SafetyRatings,
    breakdown: &mut SafetyBreakdown,
    config: &SafetyConfig,
) -> (f64, bool, usize) {
    let overall = valid_stars(ratings.overall);
    let frontal = valid_stars(ratings.frontal).or_else(|| {
        average_stars(ratings.frontal_driver, ratings.frontal_passenger)
    });
    let side = valid_stars(ratings.side).or_else(|| {
        average_stars(ratings.side_driver, ratings.side_passenger)
    });
    let rollover = valid_stars(ratings.rollover);

    breakdown.overall_stars = overall;
    breakdown.frontal_stars = frontal;
    breakdown.side_stars = side;
    breakdown.rollover_stars = rollover;
    breakdown.component_ratings_only = overall.is_none() && (frontal.is_some() || side.is_some());

    let weighted: [(Option<f64>, f64); 4] = [
        (overall, config.overall_weight),
        (frontal, config.frontal_weight),
        (side, config.side_weight),
        (rollover, config.rollover_weight),
    ];

    let mut total = 0.0;
    let mut weight_sum = 0.0;
    let mut count = 0;
    for (stars, weight) in weighted {
        if let Some(stars) = stars {
            total += stars * weight;
            weight_sum += weight;
            count += 1;
        }
    }

    if count == 0 {
        return (config.neutral_base_score, false, 0);
    }

    // Stars are 1-5; renormalize over present ratings, then map to 0-10.
    let stars = total / weight_sum;
    ((stars / 5.0) * 10.0, true, count)
}

fn valid_stars(value: Option<f64>) -> Option<f64> {
    value.filter(|stars| (1.0..=5.0).contains(stars))
}

fn average_stars(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (valid_stars(a), valid_stars(b)) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Bounded penalty proportional to crash/fire/injury density.
fn incident_penalty(complaints: &[ComplaintRecord], config: &SafetyConfig) -> f64 {
    if complaints.is_empty() {
        return 0.0;
    }

    let incidents = complaints
        .iter()
        .filter(|complaint| complaint.crash || complaint.fire || complaint.injuries > 0)
        .count();
    let density = incidents as f64 / complaints.len() as f64;

    (density * 10.0).min(config.incident_penalty_cap)
}

/// Emit safety-specific red flags for incident clusters and poor rollover stars.
pub fn detect_safety_red_flags(
    result: &SafetyResult,
    complaints: &[ComplaintRecord],
    config: &SafetyConfig,
) -> Vec<RedFlag> {
    let mut flags = Vec::new();

    let crash_count = complaints.iter().filter(|complaint| complaint.crash).count();
    if crash_count >= config.crash_flag_threshold {
        flags.push(RedFlag {
            flag_type: FlagType::SafetyCrash,
            severity: FlagSeverity::High,
            message: format!("{crash_count} complaints for this model involve a crash"),
            advice: "Review the complaint narratives before purchase".to_string(),
            question_to_ask: Some(
                "Has this vehicle ever been in a collision, reported or not?".to_string(),
            ),
        });
    }

    let fire_count = complaints.iter().filter(|complaint| complaint.fire).count();
    if fire_count >= config.fire_flag_threshold {
        flags.push(RedFlag {
            flag_type: FlagType::SafetyFire,
            severity: FlagSeverity::Critical,
            message: format!("{fire_count} complaints for this model involve a fire"),
            advice: "Check for open recalls on fuel and electrical systems".to_string(),
            question_to_ask: Some(
                "Have all fire-related recalls been completed on this vehicle?".to_string(),
            ),
        });
    }

    if let Some(rollover) = result.breakdown.rollover_stars {
        if rollover <= config.rollover_flag_stars {
            flags.push(RedFlag {
                flag_type: FlagType::SafetyRollover,
                severity: FlagSeverity::High,
                message: format!("Rollover rating is only {rollover:.0} stars"),
                advice: "Factor rollover risk into how the vehicle will be used".to_string(),
                question_to_ask: None,
            });
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SafetyConfig {
        SafetyConfig::default()
    }

    fn full_ratings() -> SafetyRatings {
        SafetyRatings {
            overall: Some(5.0),
            frontal: Some(4.0),
            side: Some(5.0),
            rollover: Some(4.0),
            ..SafetyRatings::default()
        }
    }

    fn crash_complaint() -> ComplaintRecord {
        ComplaintRecord {
            component: "AIR BAGS".to_string(),
            crash: true,
            fire: false,
            injuries: 1,
            summary: "airbag failed to deploy in collision".to_string(),
        }
    }

    #[test]
    fn full_star_set_weights_into_ten_point_scale() {
        let result = calculate_safety_score(Some(&full_ratings()), &[], 2020, &config());

        // (5*0.4 + 4*0.2 + 5*0.2 + 4*0.2) / 1.0 = 4.6 stars -> 9.2
        assert!((result.score - 9.2).abs() < 1e-9);
        assert!(result.has_crash_test_data);
        assert_eq!(result.confidence, Confidence::High);
        assert!(!result.breakdown.component_ratings_only);
    }

    #[test]
    fn component_ratings_fall_back_when_overall_is_absent() {
        let ratings = SafetyRatings {
            frontal_driver: Some(4.0),
            frontal_passenger: Some(5.0),
            side_driver: Some(4.0),
            ..SafetyRatings::default()
        };

        let result = calculate_safety_score(Some(&ratings), &[], 2018, &config());

        assert!(result.has_crash_test_data);
        assert!(result.breakdown.component_ratings_only);
        assert_eq!(result.breakdown.frontal_stars, Some(4.5));
        assert_eq!(result.breakdown.side_stars, Some(4.0));
        assert!(result.confidence <= Confidence::Medium);
    }

    #[test]
    fn no_rating_data_is_neutral_and_low_confidence() {
        let result = calculate_safety_score(None, &[], 2012, &config());

        assert_eq!(result.score, config().neutral_base_score);
        assert!(!result.has_crash_test_data);
        assert_eq!(result.confidence, Confidence::Low);

        let not_rated = SafetyRatings::default();
        let result = calculate_safety_score(Some(&not_rated), &[], 2012, &config());
        assert!(!result.has_crash_test_data);
    }

    #[test]
    fn incident_penalty_is_capped_and_floored_at_zero() {
        let complaints = vec![crash_complaint(); 50];
        let ratings = SafetyRatings {
            overall: Some(1.0),
            ..SafetyRatings::default()
        };

        let result = calculate_safety_score(Some(&ratings), &complaints, 2010, &config());

        assert_eq!(result.breakdown.complaint_penalty, config().incident_penalty_cap);
        assert!(result.score >= 0.0);
        assert!(result.score <= 10.0);
    }

    #[test]
    fn crash_and_fire_clusters_raise_flags() {
        let mut complaints = vec![crash_complaint(); 6];
        complaints.extend(vec![
            ComplaintRecord {
                component: "FUEL SYSTEM".to_string(),
                crash: false,
                fire: true,
                injuries: 0,
                summary: "engine bay fire while parked".to_string(),
            };
            2
        ]);

        let result = calculate_safety_score(None, &complaints, 2014, &config());
        let flags = detect_safety_red_flags(&result, &complaints, &config());

        assert!(flags
            .iter()
            .any(|flag| flag.flag_type == FlagType::SafetyCrash
                && flag.severity == FlagSeverity::High));
        assert!(flags
            .iter()
            .any(|flag| flag.flag_type == FlagType::SafetyFire
                && flag.severity == FlagSeverity::Critical));
    }

    #[test]
    fn poor_rollover_rating_raises_a_flag() {
        let ratings = SafetyRatings {
            overall: Some(4.0),
            rollover: Some(2.0),
            ..SafetyRatings::default()
        };

        let result = calculate_safety_score(Some(&ratings), &[], 2016, &config());
        let flags = detect_safety_red_flags(&result, &[], &config());

        assert!(flags
            .iter()
            .any(|flag| flag.flag_type == FlagType::SafetyRollover));
    }
}
