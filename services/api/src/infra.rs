use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;

use curbcheck::sources::{
    ComplaintRecord, ExtractedListing, ExtractionError, RecallRecord, SafetyRatings, SourceError,
    TextExtractionService, VehicleAttributes, VehicleDataSource,
};
use curbcheck::{Analyzer, CsvReliabilityDatabase};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type DemoAnalyzer = Analyzer<DemoVehicleSource, CsvReliabilityDatabase>;

/// Wire the analyzer against the bundled reliability data and the canned
/// demo collaborators. Production deployments swap in live NHTSA and
/// extraction clients here.
pub(crate) fn build_demo_analyzer() -> DemoAnalyzer {
    Analyzer::new(DemoVehicleSource, CsvReliabilityDatabase::bundled())
        .with_extraction(Arc::new(DemoExtractionService))
}

/// Canned stand-in for the NHTSA endpoints, covering a handful of vehicles
/// that exercise the interesting scoring paths.
#[derive(Default, Clone)]
pub(crate) struct DemoVehicleSource;

pub(crate) const DEMO_CAMRY_VIN: &str = "4T1C11AK5NU700001";
pub(crate) const DEMO_WRANGLER_VIN: &str = "1C4HJXDG8JW100002";
pub(crate) const DEMO_ROGUE_VIN: &str = "5N1AT2MV6HC800003";

#[async_trait]
impl VehicleDataSource for DemoVehicleSource {
    async fn get_complaints(
        &self,
        make: &str,
        model: &str,
        _year: u16,
    ) -> Result<Vec<ComplaintRecord>, SourceError> {
        let key = (make.to_ascii_lowercase(), model.to_ascii_lowercase());
        Ok(match (key.0.as_str(), key.1.as_str()) {
            ("nissan", "rogue") | ("nissan", "altima") => cvt_complaints(),
            ("jeep", "wrangler") => steering_complaints(),
            _ => Vec::new(),
        })
    }

    async fn get_recalls(
        &self,
        make: &str,
        model: &str,
        _year: u16,
    ) -> Result<Vec<RecallRecord>, SourceError> {
        if make.eq_ignore_ascii_case("jeep") && model.eq_ignore_ascii_case("wrangler") {
            return Ok(vec![RecallRecord {
                campaign_number: "18V-332".to_string(),
                component: "STEERING".to_string(),
                summary: "Steering damper bracket may fracture".to_string(),
            }]);
        }
        Ok(Vec::new())
    }

    async fn get_safety_ratings(
        &self,
        make: &str,
        model: &str,
        _year: u16,
    ) -> Result<Option<SafetyRatings>, SourceError> {
        let key = (make.to_ascii_lowercase(), model.to_ascii_lowercase());
        Ok(match (key.0.as_str(), key.1.as_str()) {
            ("toyota", "camry") => Some(SafetyRatings {
                overall: Some(5.0),
                frontal: Some(5.0),
                side: Some(5.0),
                rollover: Some(4.0),
                ..SafetyRatings::default()
            }),
            ("jeep", "wrangler") => Some(SafetyRatings {
                frontal: Some(4.0),
                side: Some(4.0),
                rollover: Some(3.0),
                ..SafetyRatings::default()
            }),
            ("nissan", "rogue") => Some(SafetyRatings {
                overall: Some(4.0),
                frontal: Some(4.0),
                side: Some(5.0),
                rollover: Some(4.0),
                ..SafetyRatings::default()
            }),
            _ => None,
        })
    }

    async fn decode_vin(&self, vin: &str) -> Result<Option<VehicleAttributes>, SourceError> {
        Ok(match vin.trim().to_ascii_uppercase().as_str() {
            DEMO_CAMRY_VIN => Some(VehicleAttributes {
                year: 2022,
                make: "Toyota".to_string(),
                model: "Camry".to_string(),
                trim: Some("SE".to_string()),
                body_class: Some("Sedan".to_string()),
                displacement_liters: Some(2.5),
                fuel_type: Some("Gasoline".to_string()),
                drive_type: Some("FWD".to_string()),
                transmission_style: Some("Automatic".to_string()),
                plant_state: Some("KY".to_string()),
            }),
            DEMO_WRANGLER_VIN => Some(VehicleAttributes {
                year: 2018,
                make: "Jeep".to_string(),
                model: "Wrangler".to_string(),
                trim: Some("Sport".to_string()),
                body_class: Some("Sport Utility Vehicle".to_string()),
                displacement_liters: Some(3.6),
                fuel_type: Some("Gasoline".to_string()),
                drive_type: Some("4WD".to_string()),
                transmission_style: Some("Manual".to_string()),
                plant_state: Some("OH".to_string()),
            }),
            DEMO_ROGUE_VIN => Some(VehicleAttributes {
                year: 2017,
                make: "Nissan".to_string(),
                model: "Rogue".to_string(),
                trim: None,
                body_class: Some("Sport Utility Vehicle".to_string()),
                displacement_liters: Some(2.5),
                fuel_type: Some("Gasoline".to_string()),
                drive_type: Some("AWD".to_string()),
                transmission_style: Some("Continuously Variable (CVT)".to_string()),
                plant_state: Some("TN".to_string()),
            }),
            _ => None,
        })
    }
}

fn cvt_complaints() -> Vec<ComplaintRecord> {
    let mut complaints: Vec<ComplaintRecord> = (0..8)
        .map(|i| ComplaintRecord {
            component: "POWER TRAIN".to_string(),
            crash: false,
            fire: false,
            injuries: 0,
            summary: format!("Transmission shudders and loses power at highway speed ({i})"),
        })
        .collect();
    complaints.push(ComplaintRecord {
        component: "POWER TRAIN".to_string(),
        crash: true,
        fire: false,
        injuries: 0,
        summary: "Sudden loss of acceleration in traffic led to a rear-end collision".to_string(),
    });
    complaints
}

fn steering_complaints() -> Vec<ComplaintRecord> {
    (0..4)
        .map(|i| ComplaintRecord {
            component: "STEERING".to_string(),
            crash: false,
            fire: false,
            injuries: 0,
            summary: format!("Front-end oscillation after hitting a bump at speed ({i})"),
        })
        .collect()
}

/// Offline stand-in for the AI listing extractor: a brand-table scan that
/// recovers make and model so the listing path works without a live service.
pub(crate) struct DemoExtractionService;

const KNOWN_MAKES: &[&str] = &[
    "toyota", "honda", "ford", "chevrolet", "nissan", "jeep", "subaru", "mazda", "hyundai",
    "kia", "bmw", "audi", "lexus", "volkswagen", "dodge", "ram", "gmc",
];

#[async_trait]
impl TextExtractionService for DemoExtractionService {
    async fn extract(&self, listing_text: &str) -> Result<ExtractedListing, ExtractionError> {
        let lower = listing_text.to_ascii_lowercase();
        let mut extracted = ExtractedListing::default();

        for make in KNOWN_MAKES {
            if let Some(position) = lower.find(make) {
                extracted.make = Some(capitalize(make));
                let rest = &listing_text[position + make.len()..];
                extracted.model = rest
                    .split_whitespace()
                    .next()
                    .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
                    .filter(|word| !word.is_empty())
                    .map(capitalize);
                break;
            }
        }

        Ok(extracted)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_vins_decode_to_distinct_vehicles() {
        let source = DemoVehicleSource;
        let camry = source.decode_vin(DEMO_CAMRY_VIN).await.expect("ok");
        assert_eq!(camry.expect("decoded").make, "Toyota");
        assert!(source.decode_vin("NOPE").await.expect("ok").is_none());
    }

    #[tokio::test]
    async fn demo_extraction_recovers_make_and_model() {
        let extracted = DemoExtractionService
            .extract("Selling my 2017 Nissan Rogue, runs great")
            .await
            .expect("extracts");
        assert_eq!(extracted.make.as_deref(), Some("Nissan"));
        assert_eq!(extracted.model.as_deref(), Some("Rogue"));
    }
}
