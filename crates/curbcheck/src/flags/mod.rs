//! Red-flag detection.
//!
//! Independent, stateless detectors: a phrase/regex scanner over listing
//! text, a mileage-vs-age consistency check, a price-anomaly check, and a
//! mapper for AI-reported concerns. The aggregated list is a multiset; no
//! deduplication happens here.

pub mod questions;

pub use questions::generate_questions_for_seller;

use chrono::Datelike;

use crate::domain::{FlagSeverity, FlagType, RedFlag};
use crate::extract::listing::parse_listing_signals;
use crate::sources::ExtractedListing;

/// Phrases strongly associated with odometer tampering.
const ROLLBACK_PHRASES: &[&str] = &[
    "true mileage unknown",
    "tmu",
    "mileage exempt",
    "odometer discrepancy",
    "odometer reads",
    "broken odometer",
    "cluster was replaced",
];

/// Phrases shifting mechanical risk onto the buyer.
const AS_IS_PHRASES: &[&str] = &[
    "as-is",
    "as is where is",
    "sold as is",
    "no warranty",
    "no returns",
];

/// Pressure language correlated with problem sales.
const URGENCY_PHRASES: &[&str] = &[
    "must sell today",
    "must go today",
    "first come first serve",
    "cash only",
    "no test drive",
    "serious buyers only",
    "need gone",
];

/// Miles per year above which a mileage claim contradicts typical use badly
/// enough to question, and below which it looks implausibly low.
const MAX_PLAUSIBLE_MILES_PER_YEAR: f64 = 40_000.0;
const MIN_PLAUSIBLE_MILES_PER_YEAR: f64 = 1_500.0;

/// Scan listing text for suspicious language and internal inconsistencies.
pub fn detect_red_flags(listing_text: &str) -> Vec<RedFlag> {
    let lower = listing_text.to_ascii_lowercase();
    let mut flags = Vec::new();

    if let Some(phrase) = first_match(&lower, ROLLBACK_PHRASES) {
        flags.push(RedFlag {
            flag_type: FlagType::OdometerRollback,
            severity: FlagSeverity::Critical,
            message: format!("Listing language suggests odometer problems (\"{phrase}\")"),
            advice: "Verify mileage against title and service records before negotiating"
                .to_string(),
            question_to_ask: Some(
                "Can you show the mileage recorded at the last title transfer?".to_string(),
            ),
        });
    }

    if let Some(phrase) = first_match(&lower, AS_IS_PHRASES) {
        flags.push(RedFlag {
            flag_type: FlagType::AsIsSale,
            severity: FlagSeverity::Medium,
            message: format!("Vehicle is offered \"{phrase}\""),
            advice: "Budget for an independent pre-purchase inspection".to_string(),
            question_to_ask: Some(
                "Why is the vehicle being sold without any warranty?".to_string(),
            ),
        });
    }

    if let Some(phrase) = first_match(&lower, URGENCY_PHRASES) {
        flags.push(RedFlag {
            flag_type: FlagType::UrgencySale,
            severity: FlagSeverity::Low,
            message: format!("Listing uses pressure language (\"{phrase}\")"),
            advice: "Slow the transaction down; urgency often hides problems".to_string(),
            question_to_ask: None,
        });
    }

    if let Some(flag) = detect_mileage_inconsistency(listing_text) {
        flags.push(flag);
    }

    flags
}

/// Flag mileage claims that contradict the vehicle's age.
fn detect_mileage_inconsistency(listing_text: &str) -> Option<RedFlag> {
    let signals = parse_listing_signals(listing_text);
    let mileage = signals.claimed_mileage?;
    let year = signals.claimed_year?;

    let current_year = u16::try_from(chrono::Utc::now().year()).ok()?;
    let age = f64::from(current_year.checked_sub(year)?.max(1));
    let miles_per_year = f64::from(mileage) / age;

    if miles_per_year > MAX_PLAUSIBLE_MILES_PER_YEAR {
        Some(RedFlag {
            flag_type: FlagType::MileageInconsistency,
            severity: FlagSeverity::Medium,
            message: format!(
                "{mileage} miles on a {year} model is {miles_per_year:.0} miles/year, far above typical use"
            ),
            advice: "Ask how the vehicle accumulated this mileage".to_string(),
            question_to_ask: Some("Was this vehicle used commercially?".to_string()),
        })
    } else if miles_per_year < MIN_PLAUSIBLE_MILES_PER_YEAR && age >= 5.0 {
        Some(RedFlag {
            flag_type: FlagType::MileageInconsistency,
            severity: FlagSeverity::Medium,
            message: format!(
                "{mileage} miles on a {year} model is implausibly low for its age"
            ),
            advice: "Low-mileage claims on older vehicles deserve title verification".to_string(),
            question_to_ask: Some(
                "Can you document the mileage history across past owners?".to_string(),
            ),
        })
    } else {
        None
    }
}

/// Flag an asking price far enough outside the fair band to be suspicious.
pub fn detect_price_anomaly(asking_price: f64, low: f64, high: f64) -> Option<RedFlag> {
    if asking_price < low * 0.6 && asking_price > 0.0 {
        Some(RedFlag {
            flag_type: FlagType::PriceAnomaly,
            severity: FlagSeverity::High,
            message: format!(
                "Asking ${asking_price:.0} is far below the fair range ${low:.0}-${high:.0}"
            ),
            advice: "Deep discounts often signal hidden damage or title problems".to_string(),
            question_to_ask: Some("Why is the price so far below market value?".to_string()),
        })
    } else if asking_price > high * 1.5 {
        Some(RedFlag {
            flag_type: FlagType::PriceAnomaly,
            severity: FlagSeverity::Medium,
            message: format!(
                "Asking ${asking_price:.0} is far above the fair range ${low:.0}-${high:.0}"
            ),
            advice: "Bring comparable listings to the negotiation".to_string(),
            question_to_ask: None,
        })
    } else {
        None
    }
}

/// Map AI-reported concerns and inconsistencies onto red flags.
pub fn flags_from_extraction(extracted: &ExtractedListing) -> Vec<RedFlag> {
    let mut flags = Vec::new();

    for concern in &extracted.concerns {
        flags.push(RedFlag {
            flag_type: FlagType::AiConcern,
            severity: FlagSeverity::Medium,
            message: concern.clone(),
            advice: "Raise this concern with the seller directly".to_string(),
            question_to_ask: None,
        });
    }

    for inconsistency in &extracted.inconsistencies {
        flags.push(RedFlag {
            flag_type: FlagType::AiInconsistency,
            severity: FlagSeverity::High,
            message: format!("Listing contradicts itself: {inconsistency}"),
            advice: "Ask the seller to resolve the contradiction in writing".to_string(),
            question_to_ask: None,
        });
    }

    for pattern in &extracted.suspicious_patterns {
        flags.push(RedFlag {
            flag_type: FlagType::SuspiciousPattern,
            severity: FlagSeverity::High,
            message: pattern.clone(),
            advice: "Treat this listing with extra skepticism".to_string(),
            question_to_ask: None,
        });
    }

    if let Some(trust) = extracted.trustworthiness_score {
        if trust < 0.3 {
            flags.push(RedFlag {
                flag_type: FlagType::SuspiciousPattern,
                severity: FlagSeverity::High,
                message: format!("Listing trustworthiness rated very low ({trust:.2})"),
                advice: "Consider passing unless everything checks out in person".to_string(),
                question_to_ask: None,
            });
        }
    }

    flags
}

fn first_match<'a>(haystack: &str, phrases: &[&'a str]) -> Option<&'a str> {
    phrases
        .iter()
        .find(|phrase| haystack.contains(*phrase))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_language_is_critical() {
        let flags = detect_red_flags("runs great, true mileage unknown, $5,000");
        assert!(flags
            .iter()
            .any(|flag| flag.flag_type == FlagType::OdometerRollback
                && flag.severity == FlagSeverity::Critical));
    }

    #[test]
    fn as_is_and_urgency_are_graded_lower() {
        let flags = detect_red_flags("sold as is, must sell today, cash only");

        let as_is = flags
            .iter()
            .find(|flag| flag.flag_type == FlagType::AsIsSale)
            .expect("as-is flag");
        assert_eq!(as_is.severity, FlagSeverity::Medium);

        let urgency = flags
            .iter()
            .find(|flag| flag.flag_type == FlagType::UrgencySale)
            .expect("urgency flag");
        assert_eq!(urgency.severity, FlagSeverity::Low);
    }

    #[test]
    fn clean_listing_raises_no_flags() {
        let flags = detect_red_flags("2018 Honda CR-V, one owner, dealer maintained, 60,000 miles");
        assert!(flags.is_empty());
    }

    #[test]
    fn extreme_annual_mileage_is_flagged() {
        let flags = detect_red_flags("2023 Ford F-150 with 160,000 miles, work truck");
        assert!(flags
            .iter()
            .any(|flag| flag.flag_type == FlagType::MileageInconsistency));
    }

    #[test]
    fn implausibly_low_mileage_on_an_old_car_is_flagged() {
        let flags = detect_red_flags("2005 Toyota Corolla, only 9,000 miles!");
        assert!(flags
            .iter()
            .any(|flag| flag.flag_type == FlagType::MileageInconsistency));
    }

    #[test]
    fn price_anomaly_fires_only_outside_the_band() {
        assert!(detect_price_anomaly(4_000.0, 10_000.0, 13_000.0).is_some());
        assert!(detect_price_anomaly(25_000.0, 10_000.0, 13_000.0).is_some());
        assert!(detect_price_anomaly(11_000.0, 10_000.0, 13_000.0).is_none());
    }

    #[test]
    fn extraction_concerns_map_to_flags() {
        let extracted = ExtractedListing {
            concerns: vec!["seller avoids questions about service history".to_string()],
            inconsistencies: vec!["title status stated twice with different values".to_string()],
            trustworthiness_score: Some(0.2),
            ..ExtractedListing::default()
        };

        let flags = flags_from_extraction(&extracted);

        assert_eq!(flags.len(), 3);
        assert!(flags
            .iter()
            .any(|flag| flag.flag_type == FlagType::AiInconsistency
                && flag.severity == FlagSeverity::High));
    }
}
