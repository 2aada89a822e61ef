//! Composite analysis response assembled by the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    KnownIssue, LifespanAnalysis, OverallResult, PriceEstimate, PriceScore, RedFlag,
    ReliabilityResult, SafetyResult, SurvivalAnalysis, VehicleIdentity,
};
use crate::sources::RecallRecord;

/// Which entry point produced the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Vin,
    Listing,
    Vehicle,
}

/// Everything the engine computed for one request.
///
/// Optional sub-results distinguish "could not compute" (`None`) from
/// "computed with low confidence" (present, with its own confidence tier);
/// the delivery layer relies on that distinction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub mode: AnalysisMode,
    pub vehicle: VehicleIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asking_price: Option<f64>,
    pub lifespan: LifespanAnalysis,
    pub reliability: ReliabilityResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety: Option<SafetyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_estimate: Option<PriceEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_score: Option<PriceScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survival: Option<SurvivalAnalysis>,
    pub known_issues: Vec<KnownIssue>,
    pub recalls: Vec<RecallRecord>,
    pub red_flags: Vec<RedFlag>,
    pub questions_for_seller: Vec<String>,
    pub overall: OverallResult,
    /// Carried through from the AI extraction when the listing path ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_trustworthiness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_impression: Option<String>,
    /// Upstream sources that failed and were defaulted to empty.
    pub degraded_sources: Vec<String>,
}
