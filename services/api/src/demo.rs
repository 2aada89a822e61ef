use std::path::PathBuf;

use clap::{Args, Subcommand};

use curbcheck::domain::{LifespanFactors, VehicleIdentity};
use curbcheck::{AnalysisOptions, AnalysisReport};

use crate::error::AppError;
use crate::infra::{
    build_demo_analyzer, DemoAnalyzer, DEMO_CAMRY_VIN, DEMO_ROGUE_VIN, DEMO_WRANGLER_VIN,
};

#[derive(Subcommand, Debug)]
pub(crate) enum AnalyzeCommand {
    /// Analyze a vehicle by VIN
    Vin(VinArgs),
    /// Analyze a free-text listing read from a file
    Listing(ListingArgs),
    /// Analyze a vehicle by year, make, and model
    Vehicle(VehicleArgs),
}

#[derive(Args, Debug)]
pub(crate) struct VinArgs {
    /// VIN to decode and analyze
    #[arg(long)]
    vin: String,
    /// Current odometer reading in miles
    #[arg(long)]
    mileage: Option<u32>,
    /// Seller's asking price in dollars
    #[arg(long)]
    asking_price: Option<f64>,
    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ListingArgs {
    /// Path to a text file containing the listing
    #[arg(long)]
    file: PathBuf,
    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct VehicleArgs {
    #[arg(long)]
    year: u16,
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    /// Current odometer reading in miles
    #[arg(long)]
    mileage: Option<u32>,
    /// Seller's asking price in dollars
    #[arg(long)]
    asking_price: Option<f64>,
    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Also print each report as JSON after the summary
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run_analyze(command: AnalyzeCommand) -> Result<(), AppError> {
    let analyzer = build_demo_analyzer();

    match command {
        AnalyzeCommand::Vin(args) => {
            let options = AnalysisOptions {
                mileage: args.mileage,
                asking_price: args.asking_price,
                factors: LifespanFactors::default(),
            };
            let report = analyzer.analyze_vin(&args.vin, &options).await?;
            emit(&report, args.json)
        }
        AnalyzeCommand::Listing(args) => {
            let listing_text = tokio::fs::read_to_string(&args.file).await?;
            let report = analyzer.analyze_listing(&listing_text).await?;
            emit(&report, args.json)
        }
        AnalyzeCommand::Vehicle(args) => {
            let identity = VehicleIdentity::new(args.year, args.make, args.model);
            let options = AnalysisOptions {
                mileage: args.mileage,
                asking_price: args.asking_price,
                factors: LifespanFactors::default(),
            };
            let report = analyzer.analyze_vehicle(identity, &options).await?;
            emit(&report, args.json)
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let analyzer = build_demo_analyzer();

    println!("CurbCheck demo: sample purchases\n");

    demo_vin(
        &analyzer,
        DEMO_CAMRY_VIN,
        Some(40_000),
        Some(21_500.0),
        args.json,
    )
    .await?;
    demo_vin(
        &analyzer,
        DEMO_ROGUE_VIN,
        Some(95_000),
        Some(11_500.0),
        args.json,
    )
    .await?;
    demo_vin(
        &analyzer,
        DEMO_WRANGLER_VIN,
        Some(60_000),
        None,
        args.json,
    )
    .await?;

    let listing = "2018 Jeep Wrangler Sport, 60,000 miles, lots of fun, sold as is. \
                   Must sell today! Asking $24,000.";
    println!("--- Listing: {listing}\n");
    let report = analyzer.analyze_listing(listing).await?;
    emit(&report, args.json)?;

    Ok(())
}

async fn demo_vin(
    analyzer: &DemoAnalyzer,
    vin: &str,
    mileage: Option<u32>,
    asking_price: Option<f64>,
    json: bool,
) -> Result<(), AppError> {
    println!("--- VIN {vin}\n");
    let options = AnalysisOptions {
        mileage,
        asking_price,
        factors: LifespanFactors::default(),
    };
    let report = analyzer.analyze_vin(vin, &options).await?;
    emit(&report, json)
}

fn emit(report: &AnalysisReport, json: bool) -> Result<(), AppError> {
    if json {
        let rendered = serde_json::to_string_pretty(report)
            .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))?;
        println!("{rendered}");
    } else {
        render_report(report);
    }
    Ok(())
}

fn render_report(report: &AnalysisReport) {
    println!("{}", report.vehicle.label());
    if let Some(mileage) = report.mileage {
        println!("  odometer: {mileage} miles");
    }
    if let Some(asking) = report.asking_price {
        println!("  asking:   ${asking:.0}");
    }

    println!(
        "  lifespan: {} miles expected (base {}, x{:.2}, {} confidence)",
        report.lifespan.adjusted_lifespan_miles,
        report.lifespan.base_lifespan_miles,
        report.lifespan.total_multiplier,
        report.lifespan.confidence.label(),
    );
    println!(
        "  reliability: {:.1}/10 ({} confidence)",
        report.reliability.score,
        report.reliability.confidence.label()
    );
    if let Some(safety) = &report.safety {
        println!(
            "  safety: {:.1}/10{}",
            safety.score,
            if safety.has_crash_test_data {
                ""
            } else {
                " (no crash-test data)"
            }
        );
    }
    if let Some(estimate) = &report.price_estimate {
        println!("  fair price: ${:.0} - ${:.0}", estimate.low, estimate.high);
    }
    if let Some(price_score) = &report.price_score {
        println!(
            "  deal: {} ({:.1}/10)",
            price_score.deal_quality.label(),
            price_score.score
        );
    }
    if let Some(survival) = &report.survival {
        println!(
            "  remaining life: ~{} more miles (IQR {} - {})",
            survival.expected_additional_miles,
            survival.confidence_range.low,
            survival.confidence_range.high
        );
        for milestone in &survival.milestones {
            println!(
                "    +{:>7} miles: {:>4.0}% ({:?})",
                milestone.additional_miles,
                milestone.probability * 100.0,
                milestone.risk_level
            );
        }
    }

    if !report.known_issues.is_empty() {
        println!("  known issues:");
        for issue in &report.known_issues {
            println!("    [{:?}] {}", issue.severity, issue.component);
        }
    }
    if !report.red_flags.is_empty() {
        println!("  red flags:");
        for flag in &report.red_flags {
            println!("    [{:?}] {}", flag.severity, flag.message);
        }
    }
    if !report.questions_for_seller.is_empty() {
        println!("  ask the seller:");
        for question in &report.questions_for_seller {
            println!("    - {question}");
        }
    }

    println!(
        "  verdict: {:?} ({:.1}/10, confidence {:.0}%)",
        report.overall.recommendation,
        report.overall.score,
        report.overall.confidence * 100.0
    );
    println!("  {}\n", report.overall.summary);
}
