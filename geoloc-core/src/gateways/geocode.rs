use crate::entities::Coordinates;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Missing API key")]
    MissingApiKey,
    #[error("The provider responded with {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// A remote forward geocoding service.
pub trait GeoCodingGateway {
    /// Resolve a free-text address to its best match.
    ///
    /// `Ok(None)` means that the provider did not find anything.
    /// Every call is a billable request.
    fn resolve_address_lat_lng(&self, address: &str) -> Result<Option<Coordinates>, GatewayError>;
}

impl<G> GeoCodingGateway for &G
where
    G: GeoCodingGateway + ?Sized,
{
    fn resolve_address_lat_lng(&self, address: &str) -> Result<Option<Coordinates>, GatewayError> {
        (**self).resolve_address_lat_lng(address)
    }
}

impl<G> GeoCodingGateway for Box<G>
where
    G: GeoCodingGateway + ?Sized,
{
    fn resolve_address_lat_lng(&self, address: &str) -> Result<Option<Coordinates>, GatewayError> {
        (**self).resolve_address_lat_lng(address)
    }
}

impl<G> GeoCodingGateway for Arc<G>
where
    G: GeoCodingGateway + ?Sized,
{
    fn resolve_address_lat_lng(&self, address: &str) -> Result<Option<Coordinates>, GatewayError> {
        (**self).resolve_address_lat_lng(address)
    }
}
