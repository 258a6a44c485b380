use super::{prelude::*, record_lookup};
use std::{thread, time::Duration};

/// Delay after each remote request to stay within the provider's rate limit.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Coordinates),
    NotFound,
    /// The request failed or the response was unusable.
    Failed(String),
    /// The row has no address text, nothing has been requested.
    NoAddress,
}

impl LookupOutcome {
    pub fn result(&self) -> GeocodeResult {
        match self {
            Self::Found(pos) => GeocodeResult::from(*pos),
            Self::NotFound | Self::Failed(_) | Self::NoAddress => GeocodeResult::unresolved(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Resolve a single address.
///
/// Exactly one remote request is issued per address and accounted
/// in the quota, no matter whether it was successful or not.
/// Provider and transport errors are reported as [`LookupOutcome::Failed`];
/// only a failure to persist the quota is returned as an error.
pub fn lookup_address<G, R>(
    geocoder: &G,
    quota_repo: &R,
    pacing: Duration,
    address: Option<&str>,
) -> Result<(LookupOutcome, Option<QuotaState>)>
where
    G: GeoCodingGateway,
    R: QuotaRepo,
{
    let Some(address) = address else {
        return Ok((LookupOutcome::NoAddress, None));
    };
    let outcome = match geocoder.resolve_address_lat_lng(address) {
        Ok(Some(pos)) if pos.is_valid() => {
            log::debug!("Resolved address location '{address}': {pos}");
            LookupOutcome::Found(pos)
        }
        Ok(Some(pos)) => {
            log::warn!("Invalid location {pos} for '{address}'");
            LookupOutcome::Failed(format!("invalid location {pos}"))
        }
        Ok(None) => {
            log::debug!("No location found for '{address}'");
            LookupOutcome::NotFound
        }
        Err(err) => {
            log::warn!("Failed to resolve address location '{address}': {err}");
            LookupOutcome::Failed(err.to_string())
        }
    };
    if !pacing.is_zero() {
        thread::sleep(pacing);
    }
    let quota = record_lookup(quota_repo, today_utc())?;
    Ok((outcome, Some(quota)))
}
