use serde::{Deserialize, Serialize};

/// Resolved identity of the vehicle under analysis.
///
/// Immutable once produced by VIN decode or listing extraction; `trim` is
/// frequently unresolved because free-text extraction cannot determine it
/// reliably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleIdentity {
    pub year: u16,
    pub make: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
}

impl VehicleIdentity {
    pub fn new(year: u16, make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            year,
            make: make.into(),
            model: model.into(),
            trim: None,
        }
    }

    pub fn label(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

/// Reported maintenance quality for the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceQuality {
    Excellent,
    Good,
    Average,
    Poor,
    #[default]
    Unknown,
}

/// Dominant usage pattern over the vehicle's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivingConditions {
    HighwayPrimary,
    CityPrimary,
    Mixed,
    Severe,
    #[default]
    Unknown,
}

/// Worst reported accident on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccidentHistory {
    None,
    Minor,
    Moderate,
    Severe,
    #[default]
    Unknown,
}

/// Coarse owner-count bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerCount {
    Single,
    Few,
    Many,
    #[default]
    Unknown,
}

/// Climate the vehicle has lived in, as it affects corrosion and wear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateRegion {
    Moderate,
    Humid,
    Arid,
    CoastalSalt,
    SnowSalt,
    #[default]
    Unknown,
}

/// Transmission type as decoded from the VIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionType {
    Manual,
    Automatic,
    Cvt,
    #[default]
    Unknown,
}

/// Drivetrain layout as decoded from the VIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drivetrain {
    Fwd,
    Rwd,
    Awd,
    FourWd,
    #[default]
    Unknown,
}

/// Engine family as decoded from the VIN fuel-type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    Gasoline,
    Diesel,
    Hybrid,
    Electric,
    #[default]
    Unknown,
}

/// Categorical inputs to the lifespan adjustment.
///
/// Every category independently defaults to `Unknown`, which maps to a neutral
/// 1.0x multiplier: missing data must never bias the estimate either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifespanFactors {
    pub maintenance: MaintenanceQuality,
    pub driving_conditions: DrivingConditions,
    pub accident_history: AccidentHistory,
    pub owner_count: OwnerCount,
    pub climate_region: ClimateRegion,
    pub transmission: TransmissionType,
    pub drivetrain: Drivetrain,
    pub engine_type: EngineType,
}

impl LifespanFactors {
    /// Number of categories resolved from concrete data rather than defaulted.
    pub fn resolved_count(&self) -> usize {
        let mut count = 0;
        if self.maintenance != MaintenanceQuality::Unknown {
            count += 1;
        }
        if self.driving_conditions != DrivingConditions::Unknown {
            count += 1;
        }
        if self.accident_history != AccidentHistory::Unknown {
            count += 1;
        }
        if self.owner_count != OwnerCount::Unknown {
            count += 1;
        }
        if self.climate_region != ClimateRegion::Unknown {
            count += 1;
        }
        if self.transmission != TransmissionType::Unknown {
            count += 1;
        }
        if self.drivetrain != Drivetrain::Unknown {
            count += 1;
        }
        if self.engine_type != EngineType::Unknown {
            count += 1;
        }
        count
    }
}

/// Direction a factor pushed the estimate, derived from its multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorImpact {
    Positive,
    Negative,
    Neutral,
}

impl FactorImpact {
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier > 1.0 {
            FactorImpact::Positive
        } else if multiplier < 1.0 {
            FactorImpact::Negative
        } else {
            FactorImpact::Neutral
        }
    }
}

/// One factor that contributed to the adjusted lifespan, for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedFactor {
    pub category: String,
    pub value: String,
    pub multiplier: f64,
    pub impact: FactorImpact,
}

impl AppliedFactor {
    pub fn new(category: &str, value: &str, multiplier: f64) -> Self {
        Self {
            category: category.to_string(),
            value: value.to_string(),
            multiplier,
            impact: FactorImpact::from_multiplier(multiplier),
        }
    }
}

/// Confidence tier attached to each computed sub-result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// Output of the lifespan adjustment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifespanAnalysis {
    pub base_lifespan_miles: u32,
    pub adjusted_lifespan_miles: u32,
    pub total_multiplier: f64,
    pub applied_factors: Vec<AppliedFactor>,
    pub confidence: Confidence,
}

/// Severity tier of a clustered component defect pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    Minor,
    Moderate,
    Major,
    Critical,
}

/// Component-level defect pattern inferred from raw complaint records.
///
/// Computed fresh per request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownIssue {
    pub component: String,
    pub severity: IssueSeverity,
    pub description: String,
    pub has_safety_incidents: bool,
    pub sample_complaints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_years: Option<Vec<u16>>,
}

/// Reliability score with the signals that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityResult {
    pub score: f64,
    pub confidence: Confidence,
    pub factors: Vec<String>,
}

/// Per-rating breakdown backing a safety score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SafetyBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_stars: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontal_stars: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_stars: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollover_stars: Option<f64>,
    pub component_ratings_only: bool,
    pub complaint_penalty: f64,
}

/// Safety score fused from crash-test stars and complaint incident flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyResult {
    pub score: f64,
    pub breakdown: SafetyBreakdown,
    pub confidence: Confidence,
    pub has_crash_test_data: bool,
}

/// Where a price band came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Api,
    Formula,
}

/// Fair-price band, deliberately a range rather than a point estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub low: f64,
    pub high: f64,
    pub source: PriceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u32>,
}

/// Discrete classification of an asking price against the fair band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealQuality {
    Great,
    Good,
    Fair,
    High,
    Overpriced,
}

impl DealQuality {
    pub fn label(&self) -> &'static str {
        match self {
            DealQuality::Great => "great deal",
            DealQuality::Good => "good deal",
            DealQuality::Fair => "fair price",
            DealQuality::High => "above market",
            DealQuality::Overpriced => "overpriced",
        }
    }
}

/// Asking-price evaluation against the estimated fair band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScore {
    pub score: f64,
    pub deal_quality: DealQuality,
    pub analysis: String,
}

/// Bucketed interpretation of a milestone survival probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Moderate,
    Risky,
    Unlikely,
}

impl RiskLevel {
    /// Direct bucketing of a conditional survival probability.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.8 {
            RiskLevel::Safe
        } else if probability >= 0.5 {
            RiskLevel::Moderate
        } else if probability >= 0.2 {
            RiskLevel::Risky
        } else {
            RiskLevel::Unlikely
        }
    }
}

/// Probability of the vehicle reaching one future-mileage checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalMilestone {
    pub additional_miles: u32,
    pub total_miles: u32,
    pub probability: f64,
    pub risk_level: RiskLevel,
}

/// Interquartile range of remaining life in miles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRange {
    pub low: u32,
    pub high: u32,
}

/// Weibull-based remaining-life projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalAnalysis {
    pub milestones: Vec<SurvivalMilestone>,
    pub expected_additional_miles: u32,
    pub confidence_range: ConfidenceRange,
    pub model_confidence: Confidence,
    pub warnings: Vec<String>,
}

/// Severity tier of a detected red flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Category of red flag, so questions and UI grouping can key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    OdometerRollback,
    AsIsSale,
    UrgencySale,
    MileageInconsistency,
    PriceAnomaly,
    SafetyCrash,
    SafetyFire,
    SafetyRollover,
    AiConcern,
    AiInconsistency,
    SuspiciousPattern,
}

/// A single red flag raised by one of the independent detectors.
///
/// Callers treat the aggregated list as a multiset; no deduplication happens
/// at this level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub flag_type: FlagType,
    pub severity: FlagSeverity,
    pub message: String,
    pub advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_to_ask: Option<String>,
}

/// Final buy/pass verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Buy,
    Maybe,
    Pass,
}

/// Composite verdict across all sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallResult {
    pub score: f64,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub summary: String,
}
