use crate::sources::SourceError;

/// Errors that abort an analysis request.
///
/// Degraded upstream fetches are absorbed by the orchestrator and never
/// surface here; only a vehicle the engine cannot identify stops a request.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("VIN '{0}' could not be decoded to a vehicle")]
    VinNotDecoded(String),
    #[error("listing does not identify a vehicle; year, make, and model are required")]
    IdentityUnresolved,
    #[error(transparent)]
    Source(#[from] SourceError),
}
