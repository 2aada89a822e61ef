//! Request orchestration.
//!
//! The `Analyzer` owns no scoring logic. It resolves the vehicle's identity,
//! gathers inputs from the injected collaborators, and hands them to the pure
//! stages in `scoring`, `extract`, and `flags`. Upstream fetch failures are
//! absorbed: the affected inputs default to empty, the source is recorded as
//! degraded, and the request still completes.

pub mod report;

pub use report::{AnalysisMode, AnalysisReport};

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{
    AccidentHistory, ClimateRegion, Confidence, DrivingConditions, Drivetrain, EngineType,
    KnownIssue, LifespanFactors, MaintenanceQuality, OwnerCount, RedFlag, TransmissionType,
    VehicleIdentity,
};
use crate::error::AnalysisError;
use crate::extract::{cluster_complaints, factors_from_attributes, factors_from_extraction};
use crate::extract::listing::parse_listing_signals;
use crate::flags::{detect_price_anomaly, detect_red_flags, flags_from_extraction};
use crate::flags::questions::generate_questions_for_seller;
use crate::scoring::{
    calculate_adjusted_lifespan, calculate_dynamic_reliability, calculate_overall_score,
    calculate_price_score, calculate_safety_score, calculate_survival_probabilities,
    detect_safety_red_flags, estimate_fair_price_with_api, longevity_score, ScoringConfig,
    SubConfidences, SubScores, SurvivalInputs,
};
use crate::sources::{
    AnalysisCache, ComplaintRecord, InMemoryCache, MarketPriceApi, RecallRecord,
    ReliabilityDatabase, SafetyRatings, SourceError, TextExtractionService, VehicleAttributes,
    VehicleDataSource,
};

/// How long upstream lookups stay cached.
const SOURCE_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Caller-supplied context that is not part of the vehicle's identity.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub mileage: Option<u32>,
    pub asking_price: Option<f64>,
    /// Caller-reported factors; these win over anything inferred later.
    pub factors: LifespanFactors,
}

/// Entry point for all three analysis paths.
pub struct Analyzer<S, R> {
    source: S,
    reliability: R,
    extraction: Option<Arc<dyn TextExtractionService>>,
    price_api: Option<Arc<dyn MarketPriceApi>>,
    cache: Arc<dyn AnalysisCache>,
    config: ScoringConfig,
}

impl<S, R> Analyzer<S, R>
where
    S: VehicleDataSource,
    R: ReliabilityDatabase,
{
    pub fn new(source: S, reliability: R) -> Self {
        Self {
            source,
            reliability,
            extraction: None,
            price_api: None,
            cache: Arc::new(InMemoryCache::default()),
            config: ScoringConfig::default(),
        }
    }

    pub fn with_extraction(mut self, extraction: Arc<dyn TextExtractionService>) -> Self {
        self.extraction = Some(extraction);
        self
    }

    pub fn with_price_api(mut self, price_api: Arc<dyn MarketPriceApi>) -> Self {
        self.price_api = Some(price_api);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn AnalysisCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    /// Analyze a vehicle identified by VIN.
    ///
    /// The decode itself must succeed; everything downstream degrades
    /// gracefully.
    pub async fn analyze_vin(
        &self,
        vin: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalysisReport, AnalysisError> {
        let attrs = self
            .decode_vin_cached(vin)
            .await?
            .ok_or_else(|| AnalysisError::VinNotDecoded(vin.to_string()))?;

        let mut identity = VehicleIdentity::new(attrs.year, attrs.make.clone(), attrs.model.clone());
        identity.trim = attrs.trim.clone();
        tracing::info!(vehicle = %identity.label(), vin, "starting VIN analysis");

        let factors = merge_factors(options.factors, factors_from_attributes(&attrs));
        self.run(PipelineInput {
            mode: AnalysisMode::Vin,
            identity,
            attributes: Some(attrs),
            factors,
            mileage: options.mileage,
            asking_price: options.asking_price,
            listing_flags: Vec::new(),
            listing_trustworthiness: None,
            listing_impression: None,
            extra_questions: Vec::new(),
            degraded: Vec::new(),
        })
        .await
    }

    /// Analyze a free-text listing.
    ///
    /// Identity resolution needs the extraction collaborator for make and
    /// model; the local scanner only recovers numbers and factor phrases. If
    /// neither path yields a full identity the request fails.
    pub async fn analyze_listing(&self, listing_text: &str) -> Result<AnalysisReport, AnalysisError> {
        let mut degraded = Vec::new();

        let extracted = match &self.extraction {
            Some(service) => match service.extract(listing_text).await {
                Ok(extracted) => Some(extracted),
                Err(err) => {
                    tracing::warn!(error = %err, "listing extraction failed; using local scan only");
                    degraded.push("extraction".to_string());
                    None
                }
            },
            None => None,
        };
        let signals = parse_listing_signals(listing_text);

        let year = extracted
            .as_ref()
            .and_then(|e| e.year)
            .or(signals.claimed_year)
            .ok_or(AnalysisError::IdentityUnresolved)?;
        let make = extracted
            .as_ref()
            .and_then(|e| e.make.clone())
            .ok_or(AnalysisError::IdentityUnresolved)?;
        let model = extracted
            .as_ref()
            .and_then(|e| e.model.clone())
            .ok_or(AnalysisError::IdentityUnresolved)?;
        let identity = VehicleIdentity::new(year, make, model);
        tracing::info!(vehicle = %identity.label(), "starting listing analysis");

        let mut listing_flags = detect_red_flags(listing_text);
        let mut factors = signals.factors;
        let mut extra_questions = Vec::new();
        let mut trustworthiness = None;
        let mut impression = None;
        if let Some(extracted) = &extracted {
            factors = merge_factors(factors_from_extraction(extracted), factors);
            listing_flags.extend(flags_from_extraction(extracted));
            extra_questions = extracted.suggested_questions.clone();
            trustworthiness = extracted.trustworthiness_score;
            impression = extracted.overall_impression.clone();
        }

        let mileage = extracted
            .as_ref()
            .and_then(|e| e.mileage)
            .or(signals.claimed_mileage);
        let asking_price = extracted
            .as_ref()
            .and_then(|e| e.price)
            .or(signals.claimed_price);

        self.run(PipelineInput {
            mode: AnalysisMode::Listing,
            identity,
            attributes: None,
            factors,
            mileage,
            asking_price,
            listing_flags,
            listing_trustworthiness: trustworthiness,
            listing_impression: impression,
            extra_questions,
            degraded,
        })
        .await
    }

    /// Analyze a vehicle identified directly by year, make, and model.
    pub async fn analyze_vehicle(
        &self,
        identity: VehicleIdentity,
        options: &AnalysisOptions,
    ) -> Result<AnalysisReport, AnalysisError> {
        tracing::info!(vehicle = %identity.label(), "starting vehicle analysis");
        self.run(PipelineInput {
            mode: AnalysisMode::Vehicle,
            identity,
            attributes: None,
            factors: options.factors,
            mileage: options.mileage,
            asking_price: options.asking_price,
            listing_flags: Vec::new(),
            listing_trustworthiness: None,
            listing_impression: None,
            extra_questions: Vec::new(),
            degraded: Vec::new(),
        })
        .await
    }

    async fn run(&self, input: PipelineInput) -> Result<AnalysisReport, AnalysisError> {
        let identity = input.identity;
        let mut degraded = input.degraded;

        let (complaints, recalls, ratings) = tokio::join!(
            self.complaints_cached(&identity),
            self.recalls_cached(&identity),
            self.ratings_cached(&identity),
        );
        let complaints = settle(complaints, "complaints", &mut degraded);
        let recalls = settle(recalls, "recalls", &mut degraded);
        let ratings = settle(ratings, "safety_ratings", &mut degraded);

        let db_entry = self
            .reliability
            .get_reliability_data(&identity.make, &identity.model);

        let mut known_issues = cluster_complaints(&complaints);
        if let Some(entry) = &db_entry {
            for curated in &entry.known_issues {
                let applies = curated
                    .affected_years
                    .as_ref()
                    .map(|years| years.contains(&identity.year))
                    .unwrap_or(true);
                if applies {
                    known_issues.push(KnownIssue {
                        component: curated.component.clone(),
                        severity: curated.severity,
                        description: format!(
                            "Widely reported for this model: {}",
                            curated.component
                        ),
                        has_safety_incidents: false,
                        sample_complaints: Vec::new(),
                        affected_years: curated.affected_years.clone(),
                    });
                }
            }
            known_issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        }

        let base_lifespan = db_entry
            .as_ref()
            .map(|entry| entry.expected_lifespan_miles)
            .unwrap_or(self.config.lifespan.default_base_lifespan_miles);
        let lifespan = calculate_adjusted_lifespan(
            base_lifespan,
            &input.factors,
            &known_issues,
            &self.config.lifespan,
        );

        let reliability = calculate_dynamic_reliability(
            &identity.make,
            &identity.model,
            identity.year,
            &complaints,
            ratings.as_ref(),
            db_entry.as_ref(),
            &self.config.reliability,
        );

        let safety = if ratings.is_some() || !complaints.is_empty() {
            Some(calculate_safety_score(
                ratings.as_ref(),
                &complaints,
                identity.year,
                &self.config.safety,
            ))
        } else {
            None
        };

        let mut red_flags = input.listing_flags;
        if let Some(safety) = &safety {
            red_flags.extend(detect_safety_red_flags(safety, &complaints, &self.config.safety));
        }

        let attrs = input.attributes.unwrap_or_else(|| VehicleAttributes {
            year: identity.year,
            make: identity.make.clone(),
            model: identity.model.clone(),
            trim: identity.trim.clone(),
            ..VehicleAttributes::default()
        });
        let pricing_mileage = input.mileage.unwrap_or_else(|| {
            let expected = f64::from(vehicle_age_years(identity.year))
                * self.config.pricing.expected_miles_per_year;
            expected.round() as u32
        });
        let price_estimate = estimate_fair_price_with_api(
            self.price_api.as_deref(),
            &attrs,
            pricing_mileage,
            &self.config.pricing,
        )
        .await;

        let price_score = input.asking_price.map(|asking| {
            if let Some(flag) =
                detect_price_anomaly(asking, price_estimate.low, price_estimate.high)
            {
                red_flags.push(flag);
            }
            calculate_price_score(
                asking,
                price_estimate.low,
                price_estimate.high,
                &self.config.pricing,
            )
        });

        let survival = input.mileage.map(|mileage| {
            calculate_survival_probabilities(
                &SurvivalInputs {
                    current_mileage: mileage,
                    vehicle_age_years: vehicle_age_years(identity.year),
                    adjusted_lifespan_miles: lifespan.adjusted_lifespan_miles,
                    base_reliability_score: reliability.score,
                    known_issues: &known_issues,
                    lifespan_confidence: lifespan.confidence,
                },
                &self.config.survival,
            )
        });

        let scores = SubScores {
            reliability: reliability.score,
            longevity: longevity_score(&lifespan, input.mileage, &self.config.lifespan),
            price: price_score.as_ref().map(|score| score.score),
            safety: safety.as_ref().map(|result| result.score),
        };
        let confidences = SubConfidences {
            reliability: reliability.confidence,
            lifespan: lifespan.confidence,
            price: price_score
                .as_ref()
                .map(|_| price_estimate.confidence.unwrap_or(Confidence::Medium)),
            safety: safety.as_ref().map(|result| result.confidence),
        };
        let overall = calculate_overall_score(&scores, &confidences, &red_flags, &self.config.overall);

        let mut questions = generate_questions_for_seller(&identity, &red_flags, &recalls);
        for extra in input.extra_questions {
            if !questions.contains(&extra) {
                questions.push(extra);
            }
        }

        tracing::info!(
            vehicle = %identity.label(),
            score = overall.score,
            recommendation = ?overall.recommendation,
            degraded = degraded.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            generated_at: Utc::now(),
            mode: input.mode,
            vehicle: identity,
            mileage: input.mileage,
            asking_price: input.asking_price,
            lifespan,
            reliability,
            safety,
            price_estimate: Some(price_estimate),
            price_score,
            survival,
            known_issues,
            recalls,
            red_flags,
            questions_for_seller: questions,
            overall,
            listing_trustworthiness: input.listing_trustworthiness,
            listing_impression: input.listing_impression,
            degraded_sources: degraded,
        })
    }

    async fn decode_vin_cached(
        &self,
        vin: &str,
    ) -> Result<Option<VehicleAttributes>, SourceError> {
        let key = format!("vin:{}", vin.trim().to_ascii_uppercase());
        if let Some(hit) = self.cache_get(&key) {
            return Ok(hit);
        }
        let fresh = self.source.decode_vin(vin).await?;
        self.cache_put(&key, &fresh);
        Ok(fresh)
    }

    async fn complaints_cached(
        &self,
        identity: &VehicleIdentity,
    ) -> Result<Vec<ComplaintRecord>, SourceError> {
        let key = source_key("complaints", identity);
        if let Some(hit) = self.cache_get(&key) {
            return Ok(hit);
        }
        let fresh = self
            .source
            .get_complaints(&identity.make, &identity.model, identity.year)
            .await?;
        self.cache_put(&key, &fresh);
        Ok(fresh)
    }

    async fn recalls_cached(
        &self,
        identity: &VehicleIdentity,
    ) -> Result<Vec<RecallRecord>, SourceError> {
        let key = source_key("recalls", identity);
        if let Some(hit) = self.cache_get(&key) {
            return Ok(hit);
        }
        let fresh = self
            .source
            .get_recalls(&identity.make, &identity.model, identity.year)
            .await?;
        self.cache_put(&key, &fresh);
        Ok(fresh)
    }

    async fn ratings_cached(
        &self,
        identity: &VehicleIdentity,
    ) -> Result<Option<SafetyRatings>, SourceError> {
        let key = source_key("ratings", identity);
        if let Some(hit) = self.cache_get(&key) {
            return Ok(hit);
        }
        let fresh = self
            .source
            .get_safety_ratings(&identity.make, &identity.model, identity.year)
            .await?;
        self.cache_put(&key, &fresh);
        Ok(fresh)
    }

    fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key)?;
        serde_json::from_str(&raw).ok()
    }

    fn cache_put<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(raw) = serde_json::to_string(value) {
            self.cache.set(key, raw, SOURCE_CACHE_TTL);
        }
    }
}

struct PipelineInput {
    mode: AnalysisMode,
    identity: VehicleIdentity,
    attributes: Option<VehicleAttributes>,
    factors: LifespanFactors,
    mileage: Option<u32>,
    asking_price: Option<f64>,
    listing_flags: Vec<RedFlag>,
    listing_trustworthiness: Option<f64>,
    listing_impression: Option<String>,
    extra_questions: Vec<String>,
    degraded: Vec<String>,
}

fn settle<T: Default>(
    result: Result<T, SourceError>,
    source: &str,
    degraded: &mut Vec<String>,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(source, error = %err, "upstream lookup failed; continuing without it");
            degraded.push(source.to_string());
            T::default()
        }
    }
}

fn source_key(kind: &str, identity: &VehicleIdentity) -> String {
    format!(
        "{kind}:{}:{}:{}",
        identity.make.to_ascii_lowercase(),
        identity.model.to_ascii_lowercase(),
        identity.year
    )
}

fn vehicle_age_years(year: u16) -> u32 {
    let current = Utc::now().year();
    u32::try_from(current - i32::from(year)).unwrap_or(0).max(1)
}

/// Fill `primary`'s unknown categories from `secondary`.
fn merge_factors(primary: LifespanFactors, secondary: LifespanFactors) -> LifespanFactors {
    LifespanFactors {
        maintenance: if primary.maintenance != MaintenanceQuality::Unknown {
            primary.maintenance
        } else {
            secondary.maintenance
        },
        driving_conditions: if primary.driving_conditions != DrivingConditions::Unknown {
            primary.driving_conditions
        } else {
            secondary.driving_conditions
        },
        accident_history: if primary.accident_history != AccidentHistory::Unknown {
            primary.accident_history
        } else {
            secondary.accident_history
        },
        owner_count: if primary.owner_count != OwnerCount::Unknown {
            primary.owner_count
        } else {
            secondary.owner_count
        },
        climate_region: if primary.climate_region != ClimateRegion::Unknown {
            primary.climate_region
        } else {
            secondary.climate_region
        },
        transmission: if primary.transmission != TransmissionType::Unknown {
            primary.transmission
        } else {
            secondary.transmission
        },
        drivetrain: if primary.drivetrain != Drivetrain::Unknown {
            primary.drivetrain
        } else {
            secondary.drivetrain
        },
        engine_type: if primary.engine_type != EngineType::Unknown {
            primary.engine_type
        } else {
            secondary.engine_type
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_resolved_primary_values() {
        let primary = LifespanFactors {
            maintenance: MaintenanceQuality::Excellent,
            ..LifespanFactors::default()
        };
        let secondary = LifespanFactors {
            maintenance: MaintenanceQuality::Poor,
            climate_region: ClimateRegion::SnowSalt,
            ..LifespanFactors::default()
        };

        let merged = merge_factors(primary, secondary);

        assert_eq!(merged.maintenance, MaintenanceQuality::Excellent);
        assert_eq!(merged.climate_region, ClimateRegion::SnowSalt);
        assert_eq!(merged.drivetrain, Drivetrain::Unknown);
    }

    #[test]
    fn vehicle_age_never_goes_below_one_year() {
        let current = u16::try_from(Utc::now().year()).expect("current year fits");
        assert_eq!(vehicle_age_years(current), 1);
        assert_eq!(vehicle_age_years(current + 1), 1);
        assert!(vehicle_age_years(2015) >= 10);
    }

    #[test]
    fn source_keys_are_case_insensitive_per_vehicle() {
        let a = source_key("complaints", &VehicleIdentity::new(2018, "Honda", "CR-V"));
        let b = source_key("complaints", &VehicleIdentity::new(2018, "HONDA", "cr-v"));
        assert_eq!(a, b);
    }
}
