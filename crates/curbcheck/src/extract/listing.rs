//! Free-text listing parsing.
//!
//! Two sources of listing facts: a local phrase scanner for factor hints and
//! claimed numbers, and a mapper for whatever partial structure the AI
//! extraction collaborator returned. Both are pure; unmatched text leaves the
//! corresponding category `Unknown`.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{
    AccidentHistory, DrivingConditions, LifespanFactors, MaintenanceQuality, OwnerCount,
};
use crate::sources::ExtractedListing;

/// Signals scanned directly from listing text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingSignals {
    pub factors: LifespanFactors,
    pub claimed_mileage: Option<u32>,
    pub claimed_price: Option<f64>,
    pub claimed_year: Option<u16>,
}

fn mileage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,3}(?:,\d{3})+|\d{4,6})\s*(?:miles|mi\b)|\b(\d{1,3})k\s*(?:miles|mi\b)")
            .expect("mileage pattern compiles")
    })
}

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\s*(\d{1,3}(?:,\d{3})+|\d{3,6})").expect("price pattern compiles")
    })
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(19[5-9]\d|20[0-4]\d)\b").expect("year pattern compiles"))
}

/// Scan listing text for factor phrases and claimed numbers.
pub fn parse_listing_signals(text: &str) -> ListingSignals {
    let lower = text.to_ascii_lowercase();

    let mut factors = LifespanFactors::default();

    factors.maintenance = if contains_any(
        &lower,
        &["dealer maintained", "full service history", "all records", "meticulously maintained"],
    ) {
        MaintenanceQuality::Excellent
    } else if contains_any(&lower, &["well maintained", "regular oil changes", "serviced regularly"])
    {
        MaintenanceQuality::Good
    } else if contains_any(&lower, &["needs work", "mechanic special", "deferred maintenance"]) {
        MaintenanceQuality::Poor
    } else {
        MaintenanceQuality::Unknown
    };

    factors.driving_conditions = if contains_any(&lower, &["highway miles", "mostly highway"]) {
        DrivingConditions::HighwayPrimary
    } else if contains_any(&lower, &["city driving", "city miles", "stop and go"]) {
        DrivingConditions::CityPrimary
    } else if contains_any(&lower, &["off-road", "off road", "towing", "plow"]) {
        DrivingConditions::Severe
    } else {
        DrivingConditions::Unknown
    };

    factors.accident_history = if contains_any(
        &lower,
        &["no accidents", "accident free", "accident-free", "clean carfax", "clean title history"],
    ) {
        AccidentHistory::None
    } else if contains_any(&lower, &["salvage", "rebuilt title", "totaled", "frame damage"]) {
        AccidentHistory::Severe
    } else if contains_any(&lower, &["minor fender", "small accident", "minor accident"]) {
        AccidentHistory::Minor
    } else {
        AccidentHistory::Unknown
    };

    factors.owner_count = if contains_any(&lower, &["one owner", "single owner", "1 owner"]) {
        OwnerCount::Single
    } else if contains_any(&lower, &["two owner", "2 owner", "second owner"]) {
        OwnerCount::Few
    } else {
        OwnerCount::Unknown
    };

    ListingSignals {
        factors,
        claimed_mileage: extract_mileage(text),
        claimed_price: extract_price(text),
        claimed_year: extract_year(text),
    }
}

/// Map the AI collaborator's partial structure onto factor enums.
///
/// Every field is optional; unrecognized values stay `Unknown` rather than
/// erroring, per the engine's missing-data policy.
pub fn factors_from_extraction(extracted: &ExtractedListing) -> LifespanFactors {
    let mut factors = LifespanFactors::default();

    if let Some(quality) = extracted.maintenance_quality.as_deref() {
        factors.maintenance = match quality.to_ascii_lowercase().as_str() {
            "excellent" => MaintenanceQuality::Excellent,
            "good" => MaintenanceQuality::Good,
            "average" => MaintenanceQuality::Average,
            "poor" => MaintenanceQuality::Poor,
            _ => MaintenanceQuality::Unknown,
        };
    }

    if let Some(usage) = extracted.usage_pattern.as_deref() {
        let usage = usage.to_ascii_lowercase();
        factors.driving_conditions = if usage.contains("mixed") {
            DrivingConditions::Mixed
        } else if usage.contains("highway") {
            DrivingConditions::HighwayPrimary
        } else if usage.contains("city") {
            DrivingConditions::CityPrimary
        } else if usage.contains("severe") || usage.contains("towing") {
            DrivingConditions::Severe
        } else {
            DrivingConditions::Unknown
        };
    }

    if let Some(history) = extracted.accident_history.as_deref() {
        let history = history.to_ascii_lowercase();
        factors.accident_history = if history.contains("none") || history.contains("no accident") {
            AccidentHistory::None
        } else if history.contains("severe") || history.contains("salvage") {
            AccidentHistory::Severe
        } else if history.contains("moderate") {
            AccidentHistory::Moderate
        } else if history.contains("minor") {
            AccidentHistory::Minor
        } else {
            AccidentHistory::Unknown
        };
    }

    if let Some(owners) = extracted.owner_count.as_deref() {
        let owners = owners.to_ascii_lowercase();
        factors.owner_count = if owners.contains("single") || owners == "1" || owners.contains("one")
        {
            OwnerCount::Single
        } else if owners == "2" || owners == "3" || owners.contains("few") {
            OwnerCount::Few
        } else if owners.contains("many") || owners.parse::<u8>().map(|n| n >= 4).unwrap_or(false) {
            OwnerCount::Many
        } else {
            OwnerCount::Unknown
        };
    }

    factors
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn extract_mileage(text: &str) -> Option<u32> {
    let captures = mileage_pattern().captures(text)?;
    if let Some(plain) = captures.get(1) {
        plain.as_str().replace(',', "").parse().ok()
    } else {
        captures
            .get(2)
            .and_then(|thousands| thousands.as_str().parse::<u32>().ok())
            .map(|thousands| thousands * 1_000)
    }
}

fn extract_price(text: &str) -> Option<f64> {
    let captures = price_pattern().captures(text)?;
    captures
        .get(1)
        .and_then(|raw| raw.as_str().replace(',', "").parse().ok())
}

fn extract_year(text: &str) -> Option<u16> {
    year_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|raw| raw.as_str().parse().ok())
}
