//! MSRP and fair-price estimation for the no-market-API path.
//!
//! Derives a historical MSRP from VIN attributes via a multiplicative model
//! (category base x engine x drivetrain x brand resale / inflation), then a
//! fair-price band from category depreciation curves, and classifies an
//! asking price against the band.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::domain::{Confidence, DealQuality, PriceEstimate, PriceScore, PriceSource};
use crate::scoring::config::PricingConfig;
use crate::sources::{MarketPriceApi, VehicleAttributes};

/// Brands whose body classes map to the luxury category tiers.
const LUXURY_BRANDS: &[&str] = &[
    "acura",
    "alfa romeo",
    "audi",
    "bmw",
    "cadillac",
    "genesis",
    "infiniti",
    "jaguar",
    "land rover",
    "lexus",
    "lincoln",
    "maserati",
    "mercedes-benz",
    "porsche",
    "tesla",
    "volvo",
];

/// Curated resale-retention multipliers by brand.
const BRAND_RESALE: &[(&str, f64)] = &[
    ("toyota", 1.19),
    ("lexus", 1.15),
    ("honda", 1.12),
    ("porsche", 1.12),
    ("subaru", 1.10),
    ("mazda", 1.05),
    ("gmc", 0.95),
    ("jeep", 0.95),
    ("acura", 0.95),
    ("tesla", 0.95),
    ("ram", 0.93),
    ("ford", 0.92),
    ("chevrolet", 0.90),
    ("kia", 0.88),
    ("hyundai", 0.88),
    ("nissan", 0.85),
    ("volkswagen", 0.85),
    ("bmw", 0.81),
    ("mercedes-benz", 0.80),
    ("audi", 0.79),
    ("volvo", 0.78),
    ("infiniti", 0.76),
    ("cadillac", 0.75),
    ("lincoln", 0.74),
    ("chrysler", 0.72),
    ("dodge", 0.70),
];

/// One of the twelve pricing categories derived from body class and brand tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Pickup,
    Minivan,
    LuxurySuv,
    MidsizeSuv,
    CompactSuv,
    LuxurySedan,
    MidsizeSedan,
    LuxuryCompact,
    Compact,
    Sports,
    Economy,
    Unknown,
}

impl VehicleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Pickup => "pickup",
            VehicleCategory::Minivan => "minivan",
            VehicleCategory::LuxurySuv => "luxury_suv",
            VehicleCategory::MidsizeSuv => "midsize_suv",
            VehicleCategory::CompactSuv => "compact_suv",
            VehicleCategory::LuxurySedan => "luxury_sedan",
            VehicleCategory::MidsizeSedan => "midsize_sedan",
            VehicleCategory::LuxuryCompact => "luxury_compact",
            VehicleCategory::Compact => "compact",
            VehicleCategory::Sports => "sports",
            VehicleCategory::Economy => "economy",
            VehicleCategory::Unknown => "unknown",
        }
    }

    /// Curve family used for depreciation.
    pub fn depreciation_category(&self) -> DepreciationCategory {
        match self {
            VehicleCategory::Pickup => DepreciationCategory::TruckSuv,
            VehicleCategory::LuxurySuv
            | VehicleCategory::LuxurySedan
            | VehicleCategory::LuxuryCompact => DepreciationCategory::Luxury,
            VehicleCategory::MidsizeSuv | VehicleCategory::CompactSuv => {
                DepreciationCategory::TruckSuv
            }
            VehicleCategory::Economy | VehicleCategory::Compact => DepreciationCategory::Economy,
            VehicleCategory::Minivan
            | VehicleCategory::MidsizeSedan
            | VehicleCategory::Sports
            | VehicleCategory::Unknown => DepreciationCategory::Mainstream,
        }
    }
}

/// Depreciation curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationCategory {
    Economy,
    Mainstream,
    TruckSuv,
    Luxury,
}

/// MSRP back-calculation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsrpEstimate {
    pub estimated_msrp: f64,
    pub category: VehicleCategory,
    pub confidence: Confidence,
}

/// Map body class + brand tier onto a pricing category.
pub fn categorize(body_class: Option<&str>, make: &str, model: Option<&str>) -> VehicleCategory {
    let luxury = is_luxury_brand(make);
    let body = body_class.map(|value| value.to_ascii_lowercase()).unwrap_or_default();
    let model_lower = model.map(|value| value.to_ascii_lowercase()).unwrap_or_default();

    if body.contains("pickup") || body.contains("truck") {
        return VehicleCategory::Pickup;
    }
    if body.contains("minivan") || body.contains("van") {
        return VehicleCategory::Minivan;
    }
    if body.contains("sport utility") || body.contains("suv") || body.contains("crossover") {
        if luxury {
            return VehicleCategory::LuxurySuv;
        }
        if body.contains("compact") || model_lower.contains("cross") {
            return VehicleCategory::CompactSuv;
        }
        return VehicleCategory::MidsizeSuv;
    }
    if body.contains("convertible") || body.contains("coupe") || body.contains("roadster") {
        return VehicleCategory::Sports;
    }
    if body.contains("hatchback") {
        return if luxury {
            VehicleCategory::LuxuryCompact
        } else {
            VehicleCategory::Compact
        };
    }
    if body.contains("sedan") || body.contains("wagon") {
        return if luxury {
            VehicleCategory::LuxurySedan
        } else {
            VehicleCategory::MidsizeSedan
        };
    }
    if body.is_empty() {
        return VehicleCategory::Unknown;
    }
    VehicleCategory::Economy
}

/// Estimate the vehicle's original MSRP from decoded attributes.
pub fn estimate_msrp(
    attrs: &VehicleAttributes,
    model: Option<&str>,
    config: &PricingConfig,
) -> MsrpEstimate {
    let category = categorize(attrs.body_class.as_deref(), &attrs.make, model);
    let base = config.base_msrp.for_category(category);

    let is_electric = fuel_contains(attrs, "electric") && !fuel_contains(attrs, "hybrid");
    let engine_multiplier = if is_electric {
        config.ev_premium
    } else {
        engine_multiplier(attrs.displacement_liters)
    };

    let drivetrain_multiplier = drivetrain_multiplier(attrs.drive_type.as_deref(), config);
    let brand_multiplier = brand_resale_multiplier(&attrs.make, model, config);
    let inflation = inflation_divisor(attrs.year, config);

    let estimated_msrp =
        base * engine_multiplier * drivetrain_multiplier * brand_multiplier / inflation;

    let known_attributes = [
        attrs.body_class.is_some(),
        attrs.displacement_liters.is_some() || is_electric,
        attrs.drive_type.is_some(),
        brand_in_table(&attrs.make),
    ]
    .iter()
    .filter(|known| **known)
    .count();

    let confidence = if known_attributes >= 3 {
        Confidence::High
    } else if known_attributes == 2 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    MsrpEstimate {
        estimated_msrp,
        category,
        confidence,
    }
}

/// Formula-based fair-price band from MSRP, age, and mileage.
pub fn estimate_fair_price(
    attrs: &VehicleAttributes,
    mileage: u32,
    config: &PricingConfig,
) -> PriceEstimate {
    let msrp = estimate_msrp(attrs, Some(&attrs.model), config);
    let age = vehicle_age(attrs.year);

    let retained = retained_fraction(msrp.category.depreciation_category(), age, config);
    let mileage_adjustment = mileage_adjustment(age, mileage, config);

    let point = msrp.estimated_msrp * retained * mileage_adjustment * config.regional_adjustment;

    PriceEstimate {
        low: round_to_fifty(point * (1.0 - config.band_spread)),
        high: round_to_fifty(point * (1.0 + config.band_spread)),
        source: PriceSource::Formula,
        confidence: Some(msrp.confidence),
        sample_size: None,
    }
}

/// Try the market-price API, falling back to the formula.
pub async fn estimate_fair_price_with_api(
    api: Option<&dyn MarketPriceApi>,
    attrs: &VehicleAttributes,
    mileage: u32,
    config: &PricingConfig,
) -> PriceEstimate {
    if let Some(api) = api {
        match api
            .fair_price(&attrs.make, &attrs.model, attrs.year, mileage)
            .await
        {
            Ok(quote) => {
                return PriceEstimate {
                    low: quote.low,
                    high: quote.high,
                    source: PriceSource::Api,
                    confidence: Some(Confidence::High),
                    sample_size: quote.sample_size,
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "market price API unavailable, using formula");
            }
        }
    }
    estimate_fair_price(attrs, mileage, config)
}

/// Classify an asking price against the fair band.
///
/// FAIR at both band edges; OVERPRICED strictly beyond the configured
/// multiple of `high`.
pub fn calculate_price_score(
    asking_price: f64,
    low: f64,
    high: f64,
    config: &PricingConfig,
) -> PriceScore {
    let (score, deal_quality, analysis) = if asking_price < low * config.great_deal_fraction {
        (
            9.5,
            DealQuality::Great,
            format!(
                "Asking ${asking_price:.0} is well below the fair range of ${low:.0}-${high:.0}; verify condition and title"
            ),
        )
    } else if asking_price < low {
        (
            8.5,
            DealQuality::Good,
            format!("Asking ${asking_price:.0} is below the fair range of ${low:.0}-${high:.0}"),
        )
    } else if asking_price <= high {
        // Score slides from 7.5 at the bottom of the band to 6.5 at the top.
        let position = if high > low {
            (asking_price - low) / (high - low)
        } else {
            0.5
        };
        (
            7.5 - position,
            DealQuality::Fair,
            format!("Asking ${asking_price:.0} sits inside the fair range of ${low:.0}-${high:.0}"),
        )
    } else if asking_price <= high * config.overpriced_multiple {
        let over = (asking_price - high) / high;
        (
            (4.5 - over * 3.0).max(2.0),
            DealQuality::High,
            format!(
                "Asking ${asking_price:.0} is {:.0}% above the fair range of ${low:.0}-${high:.0}",
                over * 100.0
            ),
        )
    } else {
        (
            1.0,
            DealQuality::Overpriced,
            format!(
                "Asking ${asking_price:.0} is far above the fair range of ${low:.0}-${high:.0}"
            ),
        )
    };

    PriceScore {
        score: score.clamp(0.0, 10.0),
        deal_quality,
        analysis,
    }
}

pub(crate) fn is_luxury_brand(make: &str) -> bool {
    let make = make.trim().to_ascii_lowercase();
    LUXURY_BRANDS.contains(&make.as_str())
}

fn brand_in_table(make: &str) -> bool {
    let make = make.trim().to_ascii_lowercase();
    BRAND_RESALE.iter().any(|(brand, _)| *brand == make)
}

fn brand_resale_multiplier(make: &str, model: Option<&str>, config: &PricingConfig) -> f64 {
    let make_lower = make.trim().to_ascii_lowercase();

    // Wrangler holds value far better than the Jeep brand average.
    if make_lower == "jeep" {
        if let Some(model) = model {
            if model.to_ascii_lowercase().contains("wrangler") {
                return config.wrangler_resale_override;
            }
        }
    }

    BRAND_RESALE
        .iter()
        .find(|(brand, _)| *brand == make_lower)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.0)
}

/// Breakpoint table keyed by displacement liters.
fn engine_multiplier(displacement_liters: Option<f64>) -> f64 {
    match displacement_liters {
        None => 1.0,
        Some(liters) if liters < 1.5 => 0.85,
        Some(liters) if liters < 2.0 => 0.92,
        Some(liters) if liters < 2.5 => 1.0,
        Some(liters) if liters < 3.0 => 1.08,
        Some(liters) if liters < 4.0 => 1.15,
        Some(liters) if liters < 5.5 => 1.25,
        Some(_) => 1.35,
    }
}

fn drivetrain_multiplier(drive_type: Option<&str>, config: &PricingConfig) -> f64 {
    let Some(drive) = drive_type else {
        return 1.0;
    };
    let drive = drive.to_ascii_uppercase();
    if drive.contains("4WD") || drive.contains("4X4") {
        config.drivetrain_four_wd
    } else if drive.contains("AWD") || drive.contains("ALL") {
        config.drivetrain_awd
    } else if drive.contains("RWD") || drive.contains("REAR") {
        config.drivetrain_rwd
    } else {
        config.drivetrain_fwd
    }
}

fn fuel_contains(attrs: &VehicleAttributes, needle: &str) -> bool {
    attrs
        .fuel_type
        .as_deref()
        .map(|fuel| fuel.to_ascii_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Compound inflation divisor back-calculating historical MSRP from today's
/// category baseline.
fn inflation_divisor(year: u16, config: &PricingConfig) -> f64 {
    let age = vehicle_age(year);
    (1.0 + config.inflation_rate).powf(age)
}

fn vehicle_age(year: u16) -> f64 {
    let current = chrono::Utc::now().year();
    f64::from((current - i32::from(year)).max(0))
}

/// Fraction of original value retained after `age` years.
fn retained_fraction(category: DepreciationCategory, age: f64, config: &PricingConfig) -> f64 {
    let curve = config.depreciation.for_category(category);
    if age <= 0.0 {
        return 1.0;
    }
    let after_first_year = 1.0 - curve.first_year_drop;
    let fraction = after_first_year * (1.0 - curve.annual_rate).powf(age - 1.0);
    fraction.max(curve.floor)
}

fn mileage_adjustment(age: f64, mileage: u32, config: &PricingConfig) -> f64 {
    let expected = config.expected_miles_per_year * age.max(1.0);
    let delta_10k = (f64::from(mileage) - expected) / 10_000.0;
    (1.0 - config.mileage_adjustment_per_10k * delta_10k)
        .clamp(config.mileage_adjustment_floor, config.mileage_adjustment_ceiling)
}

fn round_to_fifty(value: f64) -> f64 {
    (value / 50.0).round() * 50.0
}
