//! Fact extractors: pure functions turning raw complaint, VIN, and listing
//! inputs into normalized intermediate facts for the scoring stages.

pub mod known_issues;
pub mod listing;
pub mod vin;

pub use known_issues::cluster_complaints;
pub use listing::{factors_from_extraction, parse_listing_signals, ListingSignals};
pub use vin::{climate_region_from_state, factors_from_attributes};
