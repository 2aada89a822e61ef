//! Scoring rubric configuration.
//!
//! Every multiplier table, weight, and threshold the scoring stages consult
//! lives here as data. The hand-tuned constants (years-to-avoid penalty,
//! recent-year bonus, Weibull calibration) are preserved as configuration to
//! keep behavior stable; they are heuristics, not statistical fits.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AccidentHistory, ClimateRegion, DrivingConditions, Drivetrain, EngineType, MaintenanceQuality,
    OwnerCount, TransmissionType,
};
use crate::scoring::pricing::{DepreciationCategory, VehicleCategory};

/// Empirical calibration anchor for the survival model: only ~15–20% of even
/// reliable vehicles remain on the road at 200k miles. Used to sanity-bound
/// shape/scale choices, not as a literal lookup.
pub const SURVIVAL_CALIBRATION_NOTE: &str =
    "only ~15–20% of even reliable vehicles remain on the road at 200k miles";

/// Top-level rubric consumed by every scoring stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub lifespan: LifespanConfig,
    pub reliability: ReliabilityConfig,
    pub safety: SafetyConfig,
    pub pricing: PricingConfig,
    pub survival: SurvivalConfig,
    pub overall: OverallConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            lifespan: LifespanConfig::default(),
            reliability: ReliabilityConfig::default(),
            safety: SafetyConfig::default(),
            pricing: PricingConfig::default(),
            survival: SurvivalConfig::default(),
            overall: OverallConfig::default(),
        }
    }
}

/// Multiplier tables and clamps for the lifespan adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifespanConfig {
    /// Fallback base lifespan when the reliability database has no entry.
    pub default_base_lifespan_miles: u32,
    /// Per-category multiplier clamp.
    pub factor_floor: f64,
    pub factor_ceiling: f64,
    /// Running-product clamp, applied after every step.
    pub product_floor: f64,
    pub product_ceiling: f64,
    /// Flat penalty applied once when any CRITICAL known issue exists.
    pub critical_issue_penalty: f64,
    /// Flat penalty applied once when a MAJOR (but no CRITICAL) issue exists.
    pub major_issue_penalty: f64,
    /// Miles of remaining expected life worth one point of longevity score.
    pub longevity_miles_per_point: f64,
    pub maintenance: MaintenanceMultipliers,
    pub driving: DrivingMultipliers,
    pub accident: AccidentMultipliers,
    pub owners: OwnerMultipliers,
    pub climate: ClimateMultipliers,
    pub transmission: TransmissionMultipliers,
    pub drivetrain: DrivetrainMultipliers,
    pub engine: EngineMultipliers,
}

impl Default for LifespanConfig {
    fn default() -> Self {
        Self {
            default_base_lifespan_miles: 200_000,
            factor_floor: 0.5,
            factor_ceiling: 1.3,
            product_floor: 0.4,
            product_ceiling: 1.8,
            critical_issue_penalty: 0.90,
            major_issue_penalty: 0.95,
            longevity_miles_per_point: 25_000.0,
            maintenance: MaintenanceMultipliers::default(),
            driving: DrivingMultipliers::default(),
            accident: AccidentMultipliers::default(),
            owners: OwnerMultipliers::default(),
            climate: ClimateMultipliers::default(),
            transmission: TransmissionMultipliers::default(),
            drivetrain: DrivetrainMultipliers::default(),
            engine: EngineMultipliers::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceMultipliers {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
}

impl Default for MaintenanceMultipliers {
    fn default() -> Self {
        Self {
            excellent: 1.15,
            good: 1.05,
            average: 1.0,
            poor: 0.80,
        }
    }
}

impl MaintenanceMultipliers {
    pub fn lookup(&self, value: MaintenanceQuality) -> Option<(f64, &'static str)> {
        match value {
            MaintenanceQuality::Excellent => Some((self.excellent, "excellent")),
            MaintenanceQuality::Good => Some((self.good, "good")),
            MaintenanceQuality::Average => Some((self.average, "average")),
            MaintenanceQuality::Poor => Some((self.poor, "poor")),
            MaintenanceQuality::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingMultipliers {
    pub highway_primary: f64,
    pub city_primary: f64,
    pub mixed: f64,
    pub severe: f64,
}

impl Default for DrivingMultipliers {
    fn default() -> Self {
        Self {
            highway_primary: 1.10,
            city_primary: 0.90,
            mixed: 1.0,
            severe: 0.75,
        }
    }
}

impl DrivingMultipliers {
    pub fn lookup(&self, value: DrivingConditions) -> Option<(f64, &'static str)> {
        match value {
            DrivingConditions::HighwayPrimary => Some((self.highway_primary, "highway_primary")),
            DrivingConditions::CityPrimary => Some((self.city_primary, "city_primary")),
            DrivingConditions::Mixed => Some((self.mixed, "mixed")),
            DrivingConditions::Severe => Some((self.severe, "severe")),
            DrivingConditions::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccidentMultipliers {
    pub none: f64,
    pub minor: f64,
    pub moderate: f64,
    pub severe: f64,
}

impl Default for AccidentMultipliers {
    fn default() -> Self {
        Self {
            none: 1.05,
            minor: 0.95,
            moderate: 0.85,
            severe: 0.70,
        }
    }
}

impl AccidentMultipliers {
    pub fn lookup(&self, value: AccidentHistory) -> Option<(f64, &'static str)> {
        match value {
            AccidentHistory::None => Some((self.none, "none")),
            AccidentHistory::Minor => Some((self.minor, "minor")),
            AccidentHistory::Moderate => Some((self.moderate, "moderate")),
            AccidentHistory::Severe => Some((self.severe, "severe")),
            AccidentHistory::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerMultipliers {
    pub single: f64,
    pub few: f64,
    pub many: f64,
}

impl Default for OwnerMultipliers {
    fn default() -> Self {
        Self {
            single: 1.05,
            few: 1.0,
            many: 0.92,
        }
    }
}

impl OwnerMultipliers {
    pub fn lookup(&self, value: OwnerCount) -> Option<(f64, &'static str)> {
        match value {
            OwnerCount::Single => Some((self.single, "single")),
            OwnerCount::Few => Some((self.few, "few")),
            OwnerCount::Many => Some((self.many, "many")),
            OwnerCount::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateMultipliers {
    pub moderate: f64,
    pub humid: f64,
    pub arid: f64,
    pub coastal_salt: f64,
    pub snow_salt: f64,
}

impl Default for ClimateMultipliers {
    fn default() -> Self {
        Self {
            moderate: 1.05,
            humid: 0.95,
            arid: 1.0,
            coastal_salt: 0.85,
            snow_salt: 0.88,
        }
    }
}

impl ClimateMultipliers {
    pub fn lookup(&self, value: ClimateRegion) -> Option<(f64, &'static str)> {
        match value {
            ClimateRegion::Moderate => Some((self.moderate, "moderate")),
            ClimateRegion::Humid => Some((self.humid, "humid")),
            ClimateRegion::Arid => Some((self.arid, "arid")),
            ClimateRegion::CoastalSalt => Some((self.coastal_salt, "coastal_salt")),
            ClimateRegion::SnowSalt => Some((self.snow_salt, "snow_salt")),
            ClimateRegion::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionMultipliers {
    pub manual: f64,
    pub automatic: f64,
    pub cvt: f64,
}

impl Default for TransmissionMultipliers {
    fn default() -> Self {
        Self {
            manual: 1.05,
            automatic: 1.0,
            cvt: 0.90,
        }
    }
}

impl TransmissionMultipliers {
    pub fn lookup(&self, value: TransmissionType) -> Option<(f64, &'static str)> {
        match value {
            TransmissionType::Manual => Some((self.manual, "manual")),
            TransmissionType::Automatic => Some((self.automatic, "automatic")),
            TransmissionType::Cvt => Some((self.cvt, "cvt")),
            TransmissionType::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainMultipliers {
    pub fwd: f64,
    pub rwd: f64,
    pub awd: f64,
    pub four_wd: f64,
}

impl Default for DrivetrainMultipliers {
    fn default() -> Self {
        Self {
            fwd: 1.0,
            rwd: 1.0,
            awd: 0.95,
            four_wd: 0.93,
        }
    }
}

impl DrivetrainMultipliers {
    pub fn lookup(&self, value: Drivetrain) -> Option<(f64, &'static str)> {
        match value {
            Drivetrain::Fwd => Some((self.fwd, "fwd")),
            Drivetrain::Rwd => Some((self.rwd, "rwd")),
            Drivetrain::Awd => Some((self.awd, "awd")),
            Drivetrain::FourWd => Some((self.four_wd, "4wd")),
            Drivetrain::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineMultipliers {
    pub gasoline: f64,
    pub diesel: f64,
    pub hybrid: f64,
    pub electric: f64,
}

impl Default for EngineMultipliers {
    fn default() -> Self {
        Self {
            gasoline: 1.0,
            diesel: 1.10,
            hybrid: 1.05,
            electric: 1.08,
        }
    }
}

impl EngineMultipliers {
    pub fn lookup(&self, value: EngineType) -> Option<(f64, &'static str)> {
        match value {
            EngineType::Gasoline => Some((self.gasoline, "gasoline")),
            EngineType::Diesel => Some((self.diesel, "diesel")),
            EngineType::Hybrid => Some((self.hybrid, "hybrid")),
            EngineType::Electric => Some((self.electric, "electric")),
            EngineType::Unknown => None,
        }
    }
}

/// Reliability scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityConfig {
    /// Neutral base when the database has no entry for the model.
    pub default_base_score: f64,
    /// Fixed penalty when the model year is in the curated years-to-avoid set.
    /// Hand-tuned heuristic, preserved as configuration.
    pub years_to_avoid_penalty: f64,
    /// Model years at or after this get the recent-year bonus.
    pub recent_year_cutoff: u16,
    /// Small bonus reflecting the general manufacturing-quality trend.
    /// Hand-tuned heuristic, preserved as configuration.
    pub recent_year_bonus: f64,
    /// Expected complaints per year of vehicle age for a typical model.
    pub expected_complaints_per_age_year: f64,
    /// Bound on the dynamic complaint adjustment in either direction.
    pub complaint_adjustment_cap: f64,
    /// Complaint sample size below which confidence cannot be high.
    pub min_complaint_sample: usize,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            default_base_score: 5.0,
            years_to_avoid_penalty: -2.0,
            recent_year_cutoff: 2018,
            recent_year_bonus: 0.5,
            expected_complaints_per_age_year: 12.0,
            complaint_adjustment_cap: 1.5,
            min_complaint_sample: 20,
        }
    }
}

/// Safety scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub overall_weight: f64,
    pub frontal_weight: f64,
    pub side_weight: f64,
    pub rollover_weight: f64,
    /// Base used when no crash-test data exists at all.
    pub neutral_base_score: f64,
    /// Ceiling on the complaint-derived incident penalty.
    pub incident_penalty_cap: f64,
    /// Crash-complaint count at which a red flag is raised.
    pub crash_flag_threshold: usize,
    /// Fire-complaint count at which a critical red flag is raised.
    pub fire_flag_threshold: usize,
    /// Rollover star rating at or below which a red flag is raised.
    pub rollover_flag_stars: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            overall_weight: 0.40,
            frontal_weight: 0.20,
            side_weight: 0.20,
            rollover_weight: 0.20,
            neutral_base_score: 5.0,
            incident_penalty_cap: 3.0,
            crash_flag_threshold: 5,
            fire_flag_threshold: 2,
            rollover_flag_stars: 2.0,
        }
    }
}

/// Price estimation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Compound annual inflation used to back-calculate historical MSRP.
    pub inflation_rate: f64,
    /// Fixed premium applied to battery-electric vehicles, distinct from the
    /// displacement table. Hybrids do not receive it.
    pub ev_premium: f64,
    pub drivetrain_fwd: f64,
    pub drivetrain_rwd: f64,
    pub drivetrain_awd: f64,
    pub drivetrain_four_wd: f64,
    /// Jeep Wrangler retains value far better than the Jeep brand average.
    pub wrangler_resale_override: f64,
    /// Assumed miles per year for the mileage adjustment.
    pub expected_miles_per_year: f64,
    /// Price adjustment per 10k miles away from expected, bounded both ways.
    pub mileage_adjustment_per_10k: f64,
    pub mileage_adjustment_floor: f64,
    pub mileage_adjustment_ceiling: f64,
    /// National default; regional pricing is a collaborator concern.
    pub regional_adjustment: f64,
    /// Half-width of the fair-price band around the depreciated point value.
    pub band_spread: f64,
    /// Asking-price fraction of `low` below which the deal is GREAT.
    pub great_deal_fraction: f64,
    /// Asking-price multiple of `high` beyond which the deal is OVERPRICED.
    pub overpriced_multiple: f64,
    pub base_msrp: CategoryBaseMsrp,
    pub depreciation: DepreciationCurves,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            inflation_rate: 0.03,
            ev_premium: 1.25,
            drivetrain_fwd: 1.00,
            drivetrain_rwd: 1.05,
            drivetrain_awd: 1.15,
            drivetrain_four_wd: 1.18,
            wrangler_resale_override: 1.05,
            expected_miles_per_year: 12_000.0,
            mileage_adjustment_per_10k: 0.04,
            mileage_adjustment_floor: 0.55,
            mileage_adjustment_ceiling: 1.15,
            regional_adjustment: 1.0,
            band_spread: 0.12,
            great_deal_fraction: 0.85,
            overpriced_multiple: 1.5,
            base_msrp: CategoryBaseMsrp::default(),
            depreciation: DepreciationCurves::default(),
        }
    }
}

/// Present-day baseline MSRP per pricing category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryBaseMsrp {
    pub pickup: f64,
    pub minivan: f64,
    pub luxury_suv: f64,
    pub midsize_suv: f64,
    pub compact_suv: f64,
    pub luxury_sedan: f64,
    pub midsize_sedan: f64,
    pub luxury_compact: f64,
    pub compact: f64,
    pub sports: f64,
    pub economy: f64,
    pub unknown: f64,
}

impl Default for CategoryBaseMsrp {
    fn default() -> Self {
        Self {
            pickup: 42_000.0,
            minivan: 38_000.0,
            luxury_suv: 62_000.0,
            midsize_suv: 38_000.0,
            compact_suv: 32_000.0,
            luxury_sedan: 55_000.0,
            midsize_sedan: 30_000.0,
            luxury_compact: 38_000.0,
            compact: 24_000.0,
            sports: 48_000.0,
            economy: 20_000.0,
            unknown: 28_000.0,
        }
    }
}

impl CategoryBaseMsrp {
    pub fn for_category(&self, category: VehicleCategory) -> f64 {
        match category {
            VehicleCategory::Pickup => self.pickup,
            VehicleCategory::Minivan => self.minivan,
            VehicleCategory::LuxurySuv => self.luxury_suv,
            VehicleCategory::MidsizeSuv => self.midsize_suv,
            VehicleCategory::CompactSuv => self.compact_suv,
            VehicleCategory::LuxurySedan => self.luxury_sedan,
            VehicleCategory::MidsizeSedan => self.midsize_sedan,
            VehicleCategory::LuxuryCompact => self.luxury_compact,
            VehicleCategory::Compact => self.compact,
            VehicleCategory::Sports => self.sports,
            VehicleCategory::Economy => self.economy,
            VehicleCategory::Unknown => self.unknown,
        }
    }
}

/// Depreciation curve parameters per curve family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepreciationCurves {
    pub economy: DepreciationCurve,
    pub mainstream: DepreciationCurve,
    pub truck_suv: DepreciationCurve,
    pub luxury: DepreciationCurve,
}

impl Default for DepreciationCurves {
    fn default() -> Self {
        Self {
            economy: DepreciationCurve {
                first_year_drop: 0.15,
                annual_rate: 0.10,
                floor: 0.08,
            },
            mainstream: DepreciationCurve {
                first_year_drop: 0.20,
                annual_rate: 0.12,
                floor: 0.07,
            },
            truck_suv: DepreciationCurve {
                first_year_drop: 0.15,
                annual_rate: 0.09,
                floor: 0.12,
            },
            luxury: DepreciationCurve {
                first_year_drop: 0.28,
                annual_rate: 0.15,
                floor: 0.05,
            },
        }
    }
}

impl DepreciationCurves {
    pub fn for_category(&self, category: DepreciationCategory) -> DepreciationCurve {
        match category {
            DepreciationCategory::Economy => self.economy,
            DepreciationCategory::Mainstream => self.mainstream,
            DepreciationCategory::TruckSuv => self.truck_suv,
            DepreciationCategory::Luxury => self.luxury,
        }
    }
}

/// Value retention curve: one first-year drop, then a compound annual rate,
/// floored so old vehicles never depreciate to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepreciationCurve {
    pub first_year_drop: f64,
    pub annual_rate: f64,
    pub floor: f64,
}

impl Default for DepreciationCurve {
    fn default() -> Self {
        DepreciationCurves::default().mainstream
    }
}

/// Survival model calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    /// Additional-mileage checkpoints evaluated for milestones.
    pub checkpoints: Vec<u32>,
    /// Weibull shape for a neutral (5.0) reliability score. Bounds chosen so
    /// the survival curve respects the 200k-mile calibration anchor.
    pub base_shape: f64,
    /// Shape delta per reliability point away from neutral.
    pub shape_per_reliability_point: f64,
    pub shape_floor: f64,
    pub shape_ceiling: f64,
    /// Shape reductions when curated/clustered issues widen the early-failure tail.
    pub critical_issue_shape_penalty: f64,
    pub major_issue_shape_penalty: f64,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            checkpoints: vec![25_000, 50_000, 75_000, 100_000, 150_000],
            base_shape: 3.0,
            shape_per_reliability_point: 0.15,
            shape_floor: 1.5,
            shape_ceiling: 4.5,
            critical_issue_shape_penalty: 0.5,
            major_issue_shape_penalty: 0.25,
        }
    }
}

/// Verdict weighting and thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallConfig {
    pub reliability_weight: f64,
    pub longevity_weight: f64,
    pub price_weight: f64,
    pub safety_weight: f64,
    pub low_flag_penalty: f64,
    pub medium_flag_penalty: f64,
    pub high_flag_penalty: f64,
    pub critical_flag_penalty: f64,
    /// Ceiling on the total red-flag deduction.
    pub flag_penalty_cap: f64,
    pub buy_threshold: f64,
    pub maybe_threshold: f64,
}

impl Default for OverallConfig {
    fn default() -> Self {
        Self {
            reliability_weight: 0.35,
            longevity_weight: 0.25,
            price_weight: 0.20,
            safety_weight: 0.20,
            low_flag_penalty: 0.1,
            medium_flag_penalty: 0.3,
            high_flag_penalty: 0.6,
            critical_flag_penalty: 1.2,
            flag_penalty_cap: 2.5,
            buy_threshold: 6.5,
            maybe_threshold: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_rubric() {
        let config = ScoringConfig::default();
        assert_eq!(config.lifespan.default_base_lifespan_miles, 200_000);
        assert_eq!(config.reliability.years_to_avoid_penalty, -2.0);
        assert_eq!(config.overall.buy_threshold, 6.5);
        assert_eq!(config.pricing.drivetrain_four_wd, 1.18);
        assert_eq!(config.survival.checkpoints.len(), 5);
    }

    #[test]
    fn config_round_trips_through_json_with_defaults() {
        let config: ScoringConfig = serde_json::from_str("{}").expect("defaults fill in");
        assert_eq!(config, ScoringConfig::default());

        let partial = r#"{"overall": {"buy_threshold": 7.0}}"#;
        let config: ScoringConfig = serde_json::from_str(partial).expect("partial override");
        assert_eq!(config.overall.buy_threshold, 7.0);
        assert_eq!(config.overall.maybe_threshold, 4.0);
    }

    #[test]
    fn unknown_lookups_are_neutral() {
        let lifespan = LifespanConfig::default();
        assert!(lifespan.maintenance.lookup(MaintenanceQuality::Unknown).is_none());
        assert!(lifespan.climate.lookup(ClimateRegion::Unknown).is_none());
        assert!(lifespan.engine.lookup(EngineType::Unknown).is_none());
    }
}
