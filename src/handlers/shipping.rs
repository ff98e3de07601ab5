use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::catalog::BranchInfo;
use crate::location::LocationError;
use crate::shipping::{LocationEvent, QuoteState};
use crate::utils::geo::Coordinate;
use crate::utils::rupiah::format_rupiah;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// `None` when the customer cleared or never shared a location.
    pub location: Option<Coordinate>,
    /// Reason reported by the browser when the position lookup failed.
    #[serde(default)]
    pub error: Option<LocationError>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub state: &'static str,
    pub branch: Option<BranchInfo>,
    pub distance_km: f64,
    pub fee: f64,
    pub fee_display: Option<String>,
}

impl From<&QuoteState> for QuoteResponse {
    fn from(state: &QuoteState) -> Self {
        let quote = state.quote();
        Self {
            state: state.name(),
            branch: quote.branch.as_ref().map(BranchInfo::from),
            distance_km: quote.distance,
            fee: quote.fee,
            fee_display: quote.branch.as_ref().map(|_| format_rupiah(quote.fee.round() as i64)),
        }
    }
}

/// Quote the delivery fee from the nearest branch
pub async fn quote(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<QuoteResponse>> {
    let event = match (payload.location, payload.error) {
        (Some(coordinate), _) => {
            if !coordinate.is_valid() {
                return Err(AppError::BadRequest(
                    "Latitude must be within ±90 and longitude within ±180".to_string(),
                ));
            }
            LocationEvent::Located(coordinate)
        }
        (None, Some(reason)) => LocationEvent::Failed(reason),
        (None, None) => LocationEvent::Cleared,
    };

    let next = QuoteState::NoLocation.apply(&state.calculator, event);
    if let QuoteState::Quoted(q) = &next {
        tracing::debug!(
            branch = q.branch.as_ref().map(|b| b.id.as_str()).unwrap_or_default(),
            distance_km = q.distance,
            fee = q.fee,
            "Quoted delivery fee"
        );
    }

    Ok(Json(QuoteResponse::from(&next)))
}
