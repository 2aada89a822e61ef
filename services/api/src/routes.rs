use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use curbcheck::domain::{LifespanFactors, VehicleIdentity};
use curbcheck::sources::{ReliabilityDatabase, VehicleDataSource};
use curbcheck::{AnalysisOptions, AnalysisReport, Analyzer};

use crate::error::AppError;
use crate::infra::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeVinRequest {
    pub(crate) vin: String,
    #[serde(default)]
    pub(crate) mileage: Option<u32>,
    #[serde(default)]
    pub(crate) asking_price: Option<f64>,
    #[serde(default)]
    pub(crate) factors: LifespanFactors,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeListingRequest {
    pub(crate) listing_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeVehicleRequest {
    pub(crate) year: u16,
    pub(crate) make: String,
    pub(crate) model: String,
    #[serde(default)]
    pub(crate) mileage: Option<u32>,
    #[serde(default)]
    pub(crate) asking_price: Option<f64>,
    #[serde(default)]
    pub(crate) factors: LifespanFactors,
}

pub(crate) fn analysis_router<S, R>(analyzer: Arc<Analyzer<S, R>>) -> axum::Router
where
    S: VehicleDataSource + 'static,
    R: ReliabilityDatabase + 'static,
{
    axum::Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/analyze/vin", post(analyze_vin_endpoint::<S, R>))
        .route(
            "/api/v1/analyze/listing",
            post(analyze_listing_endpoint::<S, R>),
        )
        .route(
            "/api/v1/analyze/vehicle",
            post(analyze_vehicle_endpoint::<S, R>),
        )
        .layer(Extension(analyzer))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn analyze_vin_endpoint<S, R>(
    Extension(analyzer): Extension<Arc<Analyzer<S, R>>>,
    Json(payload): Json<AnalyzeVinRequest>,
) -> Result<Json<AnalysisReport>, AppError>
where
    S: VehicleDataSource + 'static,
    R: ReliabilityDatabase + 'static,
{
    let options = AnalysisOptions {
        mileage: payload.mileage,
        asking_price: payload.asking_price,
        factors: payload.factors,
    };
    let report = analyzer.analyze_vin(&payload.vin, &options).await?;
    Ok(Json(report))
}

pub(crate) async fn analyze_listing_endpoint<S, R>(
    Extension(analyzer): Extension<Arc<Analyzer<S, R>>>,
    Json(payload): Json<AnalyzeListingRequest>,
) -> Result<Json<AnalysisReport>, AppError>
where
    S: VehicleDataSource + 'static,
    R: ReliabilityDatabase + 'static,
{
    let report = analyzer.analyze_listing(&payload.listing_text).await?;
    Ok(Json(report))
}

pub(crate) async fn analyze_vehicle_endpoint<S, R>(
    Extension(analyzer): Extension<Arc<Analyzer<S, R>>>,
    Json(payload): Json<AnalyzeVehicleRequest>,
) -> Result<Json<AnalysisReport>, AppError>
where
    S: VehicleDataSource + 'static,
    R: ReliabilityDatabase + 'static,
{
    let identity = VehicleIdentity::new(payload.year, payload.make, payload.model);
    let options = AnalysisOptions {
        mileage: payload.mileage,
        asking_price: payload.asking_price,
        factors: payload.factors,
    };
    let report = analyzer.analyze_vehicle(identity, &options).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{build_demo_analyzer, DEMO_CAMRY_VIN};
    use curbcheck::AnalysisMode;

    #[tokio::test]
    async fn vin_endpoint_returns_a_report() {
        let analyzer = Arc::new(build_demo_analyzer());
        let request = AnalyzeVinRequest {
            vin: DEMO_CAMRY_VIN.to_string(),
            mileage: Some(40_000),
            asking_price: Some(21_500.0),
            factors: LifespanFactors::default(),
        };

        let Json(report) = analyze_vin_endpoint(Extension(analyzer), Json(request))
            .await
            .expect("report");

        assert_eq!(report.mode, AnalysisMode::Vin);
        assert_eq!(report.vehicle.make, "Toyota");
        assert!(report.price_score.is_some());
        assert!(report.survival.is_some());
    }

    #[tokio::test]
    async fn unknown_vin_maps_to_unprocessable() {
        use axum::response::IntoResponse;

        let analyzer = Arc::new(build_demo_analyzer());
        let request = AnalyzeVinRequest {
            vin: "UNKNOWNVIN0000000".to_string(),
            mileage: None,
            asking_price: None,
            factors: LifespanFactors::default(),
        };

        let err = analyze_vin_endpoint(Extension(analyzer), Json(request))
            .await
            .expect_err("unknown vin");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn vehicle_endpoint_covers_models_without_ratings() {
        let analyzer = Arc::new(build_demo_analyzer());
        let request = AnalyzeVehicleRequest {
            year: 2014,
            make: "Nissan".to_string(),
            model: "Altima".to_string(),
            mileage: Some(120_000),
            asking_price: Some(6_500.0),
            factors: LifespanFactors::default(),
        };

        let Json(report) = analyze_vehicle_endpoint(Extension(analyzer), Json(request))
            .await
            .expect("report");

        assert!(!report.known_issues.is_empty());
        assert!(report.overall.score <= 10.0);
    }

    #[tokio::test]
    async fn listing_endpoint_resolves_identity_via_extraction() {
        let analyzer = Arc::new(build_demo_analyzer());
        let request = AnalyzeListingRequest {
            listing_text:
                "2018 Jeep Wrangler, 60,000 miles, sold as is, $24,000 or best offer".to_string(),
        };

        let Json(report) = analyze_listing_endpoint(Extension(analyzer), Json(request))
            .await
            .expect("report");

        assert_eq!(report.mode, AnalysisMode::Listing);
        assert_eq!(report.vehicle.model, "Wrangler");
        assert!(!report.red_flags.is_empty());
        assert!(!report.recalls.is_empty());
    }
}
