//! Pure scoring stages.
//!
//! Every function here is synchronous and referentially transparent: missing
//! inputs map to documented neutral defaults, and scores/probabilities are
//! clamped at computation boundaries so invalid values never reach the final
//! verdict.

pub mod config;
pub mod lifespan;
pub mod overall;
pub mod pricing;
pub mod reliability;
pub mod safety;
pub mod survival;

pub use config::{ScoringConfig, SURVIVAL_CALIBRATION_NOTE};
pub use lifespan::{calculate_adjusted_lifespan, longevity_score};
pub use overall::{calculate_overall_score, SubConfidences, SubScores};
pub use pricing::{
    calculate_price_score, estimate_fair_price, estimate_fair_price_with_api, estimate_msrp,
    MsrpEstimate, VehicleCategory,
};
pub use reliability::{calculate_dynamic_reliability, score_from_complaints};
pub use safety::{calculate_safety_score, detect_safety_red_flags};
pub use survival::{calculate_survival_probabilities, SurvivalInputs};
