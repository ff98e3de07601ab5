use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::geo::Coordinate;

/// Why the customer's position could not be obtained.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    #[error("Izin lokasi ditolak")]
    PermissionDenied,
    #[error("Lokasi tidak tersedia")]
    PositionUnavailable,
    #[error("Waktu permintaan lokasi habis")]
    Timeout,
}

/// Source of the customer's coordinate. Each call is one request that
/// resolves once.
pub trait LocationProvider {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Ask `provider` for a position, giving up after `timeout`.
pub async fn locate_with_timeout<P>(provider: &P, timeout: Duration) -> Result<Coordinate, LocationError>
where
    P: LocationProvider + Sync,
{
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(Ok(coordinate)) if coordinate.is_valid() => Ok(coordinate),
        Ok(Ok(coordinate)) => {
            tracing::warn!(?coordinate, "Location provider returned an invalid coordinate");
            Err(LocationError::PositionUnavailable)
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(LocationError::Timeout),
    }
}

/// Provider that always answers with the same result.
#[derive(Debug, Clone)]
pub struct FixedLocation(pub Result<Coordinate, LocationError>);

impl FixedLocation {
    pub fn at(coordinate: Coordinate) -> Self {
        Self(Ok(coordinate))
    }

    pub fn failing(reason: LocationError) -> Self {
        Self(Err(reason))
    }
}

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send {
        let result = self.0.clone();
        async move { result }
    }
}
