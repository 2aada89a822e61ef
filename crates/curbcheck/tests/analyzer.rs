//! End-to-end orchestrator tests over in-memory fakes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use curbcheck::domain::{FlagType, Recommendation, VehicleIdentity};
use curbcheck::sources::{
    ComplaintRecord, ExtractedListing, ExtractionError, RecallRecord, SafetyRatings, SourceError,
    TextExtractionService, VehicleAttributes, VehicleDataSource,
};
use curbcheck::{AnalysisError, AnalysisMode, AnalysisOptions, Analyzer, CsvReliabilityDatabase};

#[derive(Default)]
struct FakeSource {
    attributes: Option<VehicleAttributes>,
    complaints: Vec<ComplaintRecord>,
    recalls: Vec<RecallRecord>,
    ratings: Option<SafetyRatings>,
    fail_complaints: bool,
    complaint_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl VehicleDataSource for FakeSource {
    async fn get_complaints(
        &self,
        _make: &str,
        _model: &str,
        _year: u16,
    ) -> Result<Vec<ComplaintRecord>, SourceError> {
        self.complaint_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_complaints {
            return Err(SourceError::Unavailable("complaints endpoint down".into()));
        }
        Ok(self.complaints.clone())
    }

    async fn get_recalls(
        &self,
        _make: &str,
        _model: &str,
        _year: u16,
    ) -> Result<Vec<RecallRecord>, SourceError> {
        Ok(self.recalls.clone())
    }

    async fn get_safety_ratings(
        &self,
        _make: &str,
        _model: &str,
        _year: u16,
    ) -> Result<Option<SafetyRatings>, SourceError> {
        Ok(self.ratings.clone())
    }

    async fn decode_vin(&self, _vin: &str) -> Result<Option<VehicleAttributes>, SourceError> {
        Ok(self.attributes.clone())
    }
}

struct FakeExtraction(ExtractedListing);

#[async_trait]
impl TextExtractionService for FakeExtraction {
    async fn extract(&self, _listing_text: &str) -> Result<ExtractedListing, ExtractionError> {
        Ok(self.0.clone())
    }
}

fn camry_attributes() -> VehicleAttributes {
    VehicleAttributes {
        year: 2018,
        make: "Toyota".to_string(),
        model: "Camry".to_string(),
        body_class: Some("Sedan".to_string()),
        displacement_liters: Some(2.5),
        fuel_type: Some("Gasoline".to_string()),
        drive_type: Some("FWD".to_string()),
        transmission_style: Some("Automatic".to_string()),
        plant_state: Some("KY".to_string()),
        ..VehicleAttributes::default()
    }
}

#[tokio::test]
async fn vin_path_produces_a_full_report() {
    let source = FakeSource {
        attributes: Some(camry_attributes()),
        ratings: Some(SafetyRatings {
            overall: Some(5.0),
            frontal: Some(5.0),
            side: Some(5.0),
            rollover: Some(4.0),
            ..SafetyRatings::default()
        }),
        ..FakeSource::default()
    };
    let analyzer = Analyzer::new(source, CsvReliabilityDatabase::bundled());

    let options = AnalysisOptions {
        mileage: Some(60_000),
        asking_price: Some(18_000.0),
        ..AnalysisOptions::default()
    };
    let report = analyzer
        .analyze_vin("4T1B11HK5JU000000", &options)
        .await
        .expect("report");

    assert_eq!(report.mode, AnalysisMode::Vin);
    assert_eq!(report.vehicle.make, "Toyota");
    assert_eq!(report.lifespan.base_lifespan_miles, 250_000);
    assert!(report.safety.is_some());
    assert!(report.price_estimate.is_some());
    assert!(report.price_score.is_some());
    let survival = report.survival.expect("survival projection");
    assert!(!survival.milestones.is_empty());
    assert!(report.degraded_sources.is_empty());
    assert_eq!(report.overall.recommendation, Recommendation::Buy);
    assert!(report.overall.score > 6.5);
    assert!(report
        .questions_for_seller
        .iter()
        .any(|q| q.contains("maintenance records")));
}

#[tokio::test]
async fn complaints_failure_degrades_instead_of_failing() {
    let source = FakeSource {
        fail_complaints: true,
        ..FakeSource::default()
    };
    let analyzer = Analyzer::new(source, CsvReliabilityDatabase::bundled());

    let report = analyzer
        .analyze_vehicle(
            VehicleIdentity::new(2015, "Zorch", "Quux"),
            &AnalysisOptions::default(),
        )
        .await
        .expect("degraded report, not an error");

    assert!(report.known_issues.is_empty());
    assert_eq!(report.degraded_sources, vec!["complaints".to_string()]);
    assert!(report.safety.is_none());
    assert!(report.survival.is_none());
    assert!(report.overall.score >= 0.0 && report.overall.score <= 10.0);
}

#[tokio::test]
async fn listing_path_merges_extraction_and_local_scan() {
    let extraction = FakeExtraction(ExtractedListing {
        make: Some("Toyota".to_string()),
        model: Some("Camry".to_string()),
        year: Some(2015),
        maintenance_quality: Some("excellent".to_string()),
        trustworthiness_score: Some(0.9),
        overall_impression: Some("straightforward private sale".to_string()),
        suggested_questions: vec!["Is the timing service documented?".to_string()],
        ..ExtractedListing::default()
    });
    let analyzer = Analyzer::new(FakeSource::default(), CsvReliabilityDatabase::bundled())
        .with_extraction(Arc::new(extraction));

    let report = analyzer
        .analyze_listing(
            "2015 Toyota Camry, one owner, 85,000 miles, sold as is. Asking $13,500.",
        )
        .await
        .expect("report");

    assert_eq!(report.mode, AnalysisMode::Listing);
    assert_eq!(report.vehicle.year, 2015);
    assert_eq!(report.mileage, Some(85_000));
    assert_eq!(report.asking_price, Some(13_500.0));
    assert!(report
        .red_flags
        .iter()
        .any(|flag| flag.flag_type == FlagType::AsIsSale));
    assert_eq!(report.listing_trustworthiness, Some(0.9));
    assert!(report
        .questions_for_seller
        .contains(&"Is the timing service documented?".to_string()));
    assert!(report.price_score.is_some());
}

#[tokio::test]
async fn listing_without_identity_is_rejected() {
    let analyzer = Analyzer::new(FakeSource::default(), CsvReliabilityDatabase::bundled());

    let err = analyzer
        .analyze_listing("great runner, cheap, call now")
        .await
        .expect_err("no identity");

    assert!(matches!(err, AnalysisError::IdentityUnresolved));
}

#[tokio::test]
async fn undecodable_vin_is_an_error() {
    let analyzer = Analyzer::new(FakeSource::default(), CsvReliabilityDatabase::bundled());

    let err = analyzer
        .analyze_vin("INVALIDVIN1234567", &AnalysisOptions::default())
        .await
        .expect_err("decode returns none");

    assert!(matches!(err, AnalysisError::VinNotDecoded(_)));
}

#[tokio::test]
async fn repeated_requests_hit_the_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = FakeSource {
        complaint_calls: Arc::clone(&calls),
        ..FakeSource::default()
    };
    let analyzer = Analyzer::new(source, CsvReliabilityDatabase::bundled());
    let identity = VehicleIdentity::new(2019, "Honda", "Civic");

    analyzer
        .analyze_vehicle(identity.clone(), &AnalysisOptions::default())
        .await
        .expect("first run");
    analyzer
        .analyze_vehicle(identity, &AnalysisOptions::default())
        .await
        .expect("second run");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
