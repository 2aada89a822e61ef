//! Collaborator interfaces the engine consumes.
//!
//! Everything that touches the network or disk lives behind these traits so the
//! scoring stages stay pure and the orchestrator can be exercised with
//! in-memory fakes. Implementations are injected at `Analyzer` construction;
//! the engine holds no module-level singletons.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::IssueSeverity;

/// Raw NHTSA complaint record, reduced to the fields the engine consumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub component: String,
    pub crash: bool,
    pub fire: bool,
    pub injuries: u32,
    pub summary: String,
}

/// Raw NHTSA recall record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallRecord {
    pub campaign_number: String,
    pub component: String,
    pub summary: String,
}

/// NHTSA star ratings; any rating may be absent ("Not Rated").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SafetyRatings {
    pub overall: Option<f64>,
    pub frontal: Option<f64>,
    pub side: Option<f64>,
    pub rollover: Option<f64>,
    pub frontal_driver: Option<f64>,
    pub frontal_passenger: Option<f64>,
    pub side_driver: Option<f64>,
    pub side_passenger: Option<f64>,
    pub complaints_count: Option<u32>,
}

/// VIN-decoded vehicle attributes; decoding correctness is assumed upstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleAttributes {
    pub year: u16,
    pub make: String,
    pub model: String,
    pub trim: Option<String>,
    pub body_class: Option<String>,
    pub displacement_liters: Option<f64>,
    pub fuel_type: Option<String>,
    pub drive_type: Option<String>,
    pub transmission_style: Option<String>,
    pub plant_state: Option<String>,
}

/// Curated per-model reliability entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityData {
    pub base_score: f64,
    pub expected_lifespan_miles: u32,
    pub years_to_avoid: Vec<u16>,
    pub known_issues: Vec<CuratedIssue>,
}

/// Known defect recorded in the curated reliability database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedIssue {
    pub severity: IssueSeverity,
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_years: Option<Vec<u16>>,
}

/// Structured facts an AI text-extraction collaborator pulled from a listing.
///
/// Every field is optional; the service may return any subset or nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedListing {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    pub price: Option<f64>,
    pub mileage: Option<u32>,
    pub maintenance_quality: Option<String>,
    pub usage_pattern: Option<String>,
    pub accident_history: Option<String>,
    pub owner_count: Option<String>,
    pub concerns: Vec<String>,
    pub inconsistencies: Vec<String>,
    pub suspicious_patterns: Vec<String>,
    pub trustworthiness_score: Option<f64>,
    pub overall_impression: Option<String>,
    pub suggested_questions: Vec<String>,
}

/// Market-price API quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub low: f64,
    pub high: f64,
    pub sample_size: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("upstream source unavailable: {0}")]
    Unavailable(String),
    #[error("upstream response malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction service unavailable: {0}")]
    Unavailable(String),
    #[error("extraction response malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PriceApiError {
    #[error("market price API unconfigured")]
    Unconfigured,
    #[error("market price API unavailable: {0}")]
    Unavailable(String),
    #[error("no market sample for this vehicle")]
    NoSample,
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("reliability database unreadable: {0}")]
    Unreadable(#[from] csv::Error),
    #[error("reliability database row invalid: {0}")]
    InvalidRow(String),
}

/// NHTSA-shaped vehicle data source.
#[async_trait]
pub trait VehicleDataSource: Send + Sync {
    async fn get_complaints(
        &self,
        make: &str,
        model: &str,
        year: u16,
    ) -> Result<Vec<ComplaintRecord>, SourceError>;

    async fn get_recalls(
        &self,
        make: &str,
        model: &str,
        year: u16,
    ) -> Result<Vec<RecallRecord>, SourceError>;

    async fn get_safety_ratings(
        &self,
        make: &str,
        model: &str,
        year: u16,
    ) -> Result<Option<SafetyRatings>, SourceError>;

    async fn decode_vin(&self, vin: &str) -> Result<Option<VehicleAttributes>, SourceError>;
}

/// Curated reliability lookup keyed by make + model.
pub trait ReliabilityDatabase: Send + Sync {
    fn get_reliability_data(&self, make: &str, model: &str) -> Option<ReliabilityData>;
}

/// AI collaborator turning free-text listings into structured facts.
#[async_trait]
pub trait TextExtractionService: Send + Sync {
    async fn extract(&self, listing_text: &str) -> Result<ExtractedListing, ExtractionError>;
}

/// Optional market-price API.
#[async_trait]
pub trait MarketPriceApi: Send + Sync {
    async fn fair_price(
        &self,
        make: &str,
        model: &str,
        year: u16,
        mileage: u32,
    ) -> Result<MarketQuote, PriceApiError>;
}

/// Injected cache for upstream lookups.
///
/// Owned by the orchestrator's construction so tests never share state through
/// a global.
pub trait AnalysisCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String, ttl: Duration);
}

/// Mutex-backed cache with per-entry expiry, suitable for single-process use.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl AnalysisCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        match guard.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => {
                guard.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        guard.insert(key.to_string(), (value, Instant::now() + ttl));
    }
}

/// Reliability database backed by a bundled CSV file.
///
/// Row format: `make,model,base_score,expected_lifespan_miles,years_to_avoid,
/// known_issues` where `years_to_avoid` is `;`-separated years and
/// `known_issues` is `;`-separated `severity|component` pairs.
pub struct CsvReliabilityDatabase {
    entries: HashMap<(String, String), ReliabilityData>,
}

#[derive(Debug, Deserialize)]
struct ReliabilityRow {
    make: String,
    model: String,
    base_score: f64,
    expected_lifespan_miles: u32,
    #[serde(default)]
    years_to_avoid: String,
    #[serde(default)]
    known_issues: String,
}

impl CsvReliabilityDatabase {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatabaseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for record in csv_reader.deserialize::<ReliabilityRow>() {
            let row = record?;
            let key = (normalize_key(&row.make), normalize_key(&row.model));
            let data = ReliabilityData {
                base_score: row.base_score,
                expected_lifespan_miles: row.expected_lifespan_miles,
                years_to_avoid: parse_years(&row.years_to_avoid)?,
                known_issues: parse_issues(&row.known_issues)?,
            };
            entries.insert(key, data);
        }

        Ok(Self { entries })
    }

    /// Loads the data set bundled with the crate.
    pub fn bundled() -> Self {
        const BUNDLED: &str = include_str!("../data/reliability.csv");
        Self::from_reader(BUNDLED.as_bytes()).expect("bundled reliability data is valid")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReliabilityDatabase for CsvReliabilityDatabase {
    fn get_reliability_data(&self, make: &str, model: &str) -> Option<ReliabilityData> {
        self.entries
            .get(&(normalize_key(make), normalize_key(model)))
            .cloned()
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn parse_years(raw: &str) -> Result<Vec<u16>, DatabaseError> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u16>()
                .map_err(|_| DatabaseError::InvalidRow(format!("bad year '{part}'")))
        })
        .collect()
}

fn parse_issues(raw: &str) -> Result<Vec<CuratedIssue>, DatabaseError> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (severity, component) = part
                .split_once('|')
                .ok_or_else(|| DatabaseError::InvalidRow(format!("bad issue '{part}'")))?;
            let severity = match severity.trim().to_ascii_uppercase().as_str() {
                "MINOR" => IssueSeverity::Minor,
                "MODERATE" => IssueSeverity::Moderate,
                "MAJOR" => IssueSeverity::Major,
                "CRITICAL" => IssueSeverity::Critical,
                other => {
                    return Err(DatabaseError::InvalidRow(format!("bad severity '{other}'")))
                }
            };
            Ok(CuratedIssue {
                severity,
                component: component.trim().to_string(),
                affected_years: None,
            })
        })
        .collect()
}
