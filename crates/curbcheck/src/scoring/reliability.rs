//! Reliability scoring.
//!
//! Fuses a curated base score, a model-year adjustment, and a bounded
//! complaint-frequency signal into one 0-10 score. The year adjustments are
//! documented heuristics carried as configuration, not statistical fits.

use chrono::Datelike;

use crate::domain::{Confidence, ReliabilityResult};
use crate::scoring::config::ReliabilityConfig;
use crate::sources::{ComplaintRecord, ReliabilityData, SafetyRatings};

/// Full reliability computation for the VIN-decode path.
pub fn calculate_dynamic_reliability(
    make: &str,
    model: &str,
    year: u16,
    complaints: &[ComplaintRecord],
    safety_ratings: Option<&SafetyRatings>,
    database_entry: Option<&ReliabilityData>,
    config: &ReliabilityConfig,
) -> ReliabilityResult {
    let mut factors = Vec::new();

    let base = match database_entry {
        Some(entry) => {
            factors.push(format!(
                "curated base score {:.1} for {make} {model}",
                entry.base_score
            ));
            entry.base_score
        }
        None => {
            factors.push(format!(
                "no curated data for {make} {model}; neutral base {:.1}",
                config.default_base_score
            ));
            config.default_base_score
        }
    };

    let mut score = base;

    match year_adjustment(year, database_entry, config) {
        YearAdjustment::Avoid(penalty) => {
            score += penalty;
            factors.push(format!("{year} is a year to avoid ({penalty:+.1})"));
        }
        YearAdjustment::Recent(bonus) => {
            score += bonus;
            factors.push(format!("recent model year ({bonus:+.1})"));
        }
        YearAdjustment::None => {}
    }

    let complaint_adjustment = complaint_adjustment(complaints.len(), year, config);
    if complaint_adjustment.abs() > f64::EPSILON {
        score += complaint_adjustment;
        factors.push(format!(
            "{} complaints vs expected baseline ({complaint_adjustment:+.2})",
            complaints.len()
        ));
    }

    // Reported complaint volume on the safety-ratings record corroborates the
    // sample when the complaints fetch itself came back empty.
    let corroborated = safety_ratings
        .and_then(|ratings| ratings.complaints_count)
        .map(|count| count as usize >= config.min_complaint_sample)
        .unwrap_or(false);

    let score = score.clamp(0.0, 10.0);
    let confidence = confidence_for(
        database_entry.is_some(),
        complaints.len() >= config.min_complaint_sample || corroborated,
    );

    tracing::debug!(
        make,
        model,
        year,
        score,
        complaint_count = complaints.len(),
        "reliability scored"
    );

    ReliabilityResult {
        score,
        confidence,
        factors,
    }
}

/// Simpler path used when only a precomputed base score is available.
pub fn score_from_complaints(
    complaints: &[ComplaintRecord],
    year: u16,
    base_score: f64,
    config: &ReliabilityConfig,
) -> f64 {
    let mut score = base_score;
    if year >= config.recent_year_cutoff {
        score += config.recent_year_bonus;
    }
    score += complaint_adjustment(complaints.len(), year, config);
    score.clamp(0.0, 10.0)
}

enum YearAdjustment {
    Avoid(f64),
    Recent(f64),
    None,
}

fn year_adjustment(
    year: u16,
    database_entry: Option<&ReliabilityData>,
    config: &ReliabilityConfig,
) -> YearAdjustment {
    if let Some(entry) = database_entry {
        if entry.years_to_avoid.contains(&year) {
            return YearAdjustment::Avoid(config.years_to_avoid_penalty);
        }
    }
    if year >= config.recent_year_cutoff {
        return YearAdjustment::Recent(config.recent_year_bonus);
    }
    YearAdjustment::None
}

/// Bounded adjustment comparing the complaint count to an age-scaled baseline.
///
/// A single outlier-heavy model must not drive the score to zero, so the
/// result is clamped to the configured cap in both directions.
fn complaint_adjustment(count: usize, year: u16, config: &ReliabilityConfig) -> f64 {
    let age = vehicle_age_years(year);
    let expected = (config.expected_complaints_per_age_year * age).max(1.0);
    let ratio = count as f64 / expected;

    // ratio 1.0 is neutral; each doubling costs half a point, each halving
    // earns a quarter.
    let raw = if ratio >= 1.0 {
        -0.5 * (ratio).log2()
    } else {
        0.25 * (1.0 / ratio).log2().min(2.0)
    };

    raw.clamp(-config.complaint_adjustment_cap, config.complaint_adjustment_cap)
}

fn vehicle_age_years(year: u16) -> f64 {
    let current = chrono::Utc::now().year();
    f64::from((current - i32::from(year)).max(1))
}

fn confidence_for(has_database_entry: bool, has_complaint_sample: bool) -> Confidence {
    match (has_database_entry, has_complaint_sample) {
        (true, true) => Confidence::High,
        (false, false) => Confidence::Low,
        _ => Confidence::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IssueSeverity;
    use crate::sources::CuratedIssue;

    fn entry(base: f64, years_to_avoid: Vec<u16>) -> ReliabilityData {
        ReliabilityData {
            base_score: base,
            expected_lifespan_miles: 220_000,
            years_to_avoid,
            known_issues: vec![CuratedIssue {
                severity: IssueSeverity::Moderate,
                component: "ENGINE".to_string(),
                affected_years: None,
            }],
        }
    }

    fn complaints(count: usize) -> Vec<ComplaintRecord> {
        vec![ComplaintRecord::default(); count]
    }

    #[test]
    fn year_to_avoid_takes_the_fixed_penalty() {
        let entry = entry(7.5, vec![2013, 2014]);
        let result = calculate_dynamic_reliability(
            "Nissan",
            "Altima",
            2013,
            &[],
            None,
            Some(&entry),
            &ReliabilityConfig::default(),
        );

        // 7.5 - 2.0, plus a small bonus for the sparse complaint sample.
        assert!(result.score < 7.5 - 2.0 + 1.0);
        assert!(result
            .factors
            .iter()
            .any(|factor| factor.contains("year to avoid")));
    }

    #[test]
    fn recent_year_gets_the_small_bonus() {
        let entry = entry(7.0, vec![]);
        let with_bonus = calculate_dynamic_reliability(
            "Toyota",
            "Camry",
            2021,
            &complaints(40),
            None,
            Some(&entry),
            &ReliabilityConfig::default(),
        );

        assert!(with_bonus
            .factors
            .iter()
            .any(|factor| factor.contains("recent model year")));
    }

    #[test]
    fn missing_database_entry_defaults_to_neutral_base() {
        let result = calculate_dynamic_reliability(
            "Yugo",
            "GV",
            1990,
            &[],
            None,
            None,
            &ReliabilityConfig::default(),
        );

        assert!(result.factors[0].contains("neutral base"));
        assert_eq!(result.confidence, Confidence::Low);
    }

    #[test]
    fn score_is_always_clamped_to_unit_interval_times_ten() {
        let config = ReliabilityConfig::default();
        let heavy = complaints(100_000);
        let result = calculate_dynamic_reliability(
            "Test",
            "Test",
            2023,
            &heavy,
            None,
            None,
            &config,
        );
        assert!(result.score >= 0.0 && result.score <= 10.0);
        assert!(result.score.is_finite());

        let low = score_from_complaints(&heavy, 2023, 0.0, &config);
        assert_eq!(low, 0.0);

        let high = score_from_complaints(&[], 2023, 10.0, &config);
        assert_eq!(high, 10.0);
    }

    #[test]
    fn complaint_adjustment_is_bounded_both_ways() {
        let config = ReliabilityConfig::default();
        assert!(complaint_adjustment(1_000_000, 2010, &config) >= -config.complaint_adjustment_cap);
        assert!(complaint_adjustment(0, 2010, &config) <= config.complaint_adjustment_cap);
    }

    #[test]
    fn confidence_requires_both_signals_for_high() {
        let entry = entry(8.0, vec![]);
        let config = ReliabilityConfig::default();

        let both = calculate_dynamic_reliability(
            "Toyota",
            "Camry",
            2015,
            &complaints(30),
            None,
            Some(&entry),
            &config,
        );
        assert_eq!(both.confidence, Confidence::High);

        let neither =
            calculate_dynamic_reliability("Saab", "9-5", 2009, &[], None, None, &config);
        assert_eq!(neither.confidence, Confidence::Low);
    }
}
