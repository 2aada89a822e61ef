//! Used-vehicle longevity and valuation scoring engine.
//!
//! The engine turns a VIN, a free-text listing, or a plain year/make/model
//! triple into a full report: adjusted lifespan, reliability and safety
//! scores, a fair-price band with deal grading, a Weibull remaining-life
//! projection, red flags, seller questions, and a final buy/maybe/pass
//! verdict.
//!
//! All scoring stages are pure functions over value objects; everything that
//! touches the network sits behind the traits in [`sources`] and is injected
//! into the [`analysis::Analyzer`].

pub mod analysis;
pub mod domain;
pub mod error;
pub mod extract;
pub mod flags;
pub mod scoring;
pub mod sources;

pub use analysis::{AnalysisMode, AnalysisOptions, AnalysisReport, Analyzer};
pub use error::AnalysisError;
pub use scoring::ScoringConfig;
pub use sources::{CsvReliabilityDatabase, InMemoryCache};
