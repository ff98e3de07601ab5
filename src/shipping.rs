//! Nearest-branch selection and delivery fee calculation.
//!
//! Everything here is pure: callers own the [`QuoteState`] and feed it
//! [`LocationEvent`]s, getting the next state back.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::location::LocationError;
use crate::utils::geo::{
    is_valid_tolerance_factor, road_distance, Coordinate, ROAD_TOLERANCE_FACTOR,
};

/// Fees are rounded up to a multiple of this many Rupiah.
pub const FEE_ROUNDING_INCREMENT: f64 = 500.0;

pub fn is_valid_rounding_increment(rounding_increment: f64) -> bool {
    rounding_increment.is_finite() && rounding_increment > 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub display_name: String,
    /// Branches without a coordinate are never selected.
    pub coordinate: Option<Coordinate>,
    pub rate_per_km: f64,
    pub minimum_fee: f64,
    pub contact_number: String,
}

impl Branch {
    fn usable_coordinate(&self) -> Option<Coordinate> {
        self.coordinate.filter(Coordinate::is_valid)
    }
}

/// The two Masgan outlets.
pub fn default_branches() -> Vec<Branch> {
    vec![
        Branch {
            id: "medan-kota".to_string(),
            display_name: "Masgan Medan Kota".to_string(),
            coordinate: Some(Coordinate::new(3.5833, 98.6833)),
            rate_per_km: 2000.0,
            minimum_fee: 8000.0,
            contact_number: "6285273598919".to_string(),
        },
        Branch {
            id: "medan-johor".to_string(),
            display_name: "Masgan Medan Johor".to_string(),
            coordinate: Some(Coordinate::new(3.5180, 98.6715)),
            rate_per_km: 2000.0,
            minimum_fee: 8000.0,
            contact_number: "6285273598919".to_string(),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    /// `None` means no quote yet.
    pub branch: Option<Branch>,
    pub distance: f64,
    pub fee: f64,
}

impl ShippingQuote {
    pub fn none() -> Self {
        Self {
            branch: None,
            distance: 0.0,
            fee: 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.branch.is_some()
    }
}

/// Pick the branch closest to `customer`.
///
/// Returns `None` when `branches` is empty or none of them has a usable
/// coordinate. On equal distances the earlier branch in `branches` wins.
/// An invalid `tolerance_factor` is replaced by [`ROAD_TOLERANCE_FACTOR`].
pub fn select_nearest(
    customer: Coordinate,
    branches: &[Branch],
    tolerance_factor: f64,
) -> Option<(&Branch, f64)> {
    let tolerance_factor = if is_valid_tolerance_factor(tolerance_factor) {
        tolerance_factor
    } else {
        tracing::warn!(tolerance_factor, "Invalid tolerance factor, using default");
        ROAD_TOLERANCE_FACTOR
    };
    let mut nearest: Option<(&Branch, f64)> = None;

    for branch in branches {
        let Some(coordinate) = branch.usable_coordinate() else {
            continue;
        };
        let d = road_distance(customer, coordinate, tolerance_factor);
        if d.is_nan() {
            continue;
        }
        match nearest {
            Some((_, best)) if d >= best => {}
            _ => nearest = Some((branch, d)),
        }
    }

    nearest
}

/// Delivery fee for `distance` km from `branch`, never below the branch
/// minimum and always a multiple of `rounding_increment`. An invalid
/// increment is replaced by [`FEE_ROUNDING_INCREMENT`].
pub fn quote_fee(branch: &Branch, distance: f64, rounding_increment: f64) -> f64 {
    let rounding_increment = if is_valid_rounding_increment(rounding_increment) {
        rounding_increment
    } else {
        tracing::warn!(rounding_increment, "Invalid rounding increment, using default");
        FEE_ROUNDING_INCREMENT
    };
    let raw = (distance * branch.rate_per_km).max(branch.minimum_fee);

    (raw / rounding_increment).ceil() * rounding_increment
}

/// Static pricing configuration shared by every quote.
#[derive(Debug, Clone)]
pub struct ShippingCalculator {
    branches: Vec<Branch>,
    tolerance_factor: f64,
    rounding_increment: f64,
}

impl Default for ShippingCalculator {
    fn default() -> Self {
        Self::new(default_branches())
    }
}

impl ShippingCalculator {
    pub fn new(branches: Vec<Branch>) -> Self {
        Self {
            branches,
            tolerance_factor: ROAD_TOLERANCE_FACTOR,
            rounding_increment: FEE_ROUNDING_INCREMENT,
        }
    }

    pub fn with_tolerance_factor(mut self, tolerance_factor: f64) -> AppResult<Self> {
        if !is_valid_tolerance_factor(tolerance_factor) {
            return Err(AppError::BadRequest(format!(
                "Tolerance factor must be a finite number above 1.0, got {}",
                tolerance_factor
            )));
        }
        self.tolerance_factor = tolerance_factor;
        Ok(self)
    }

    pub fn with_rounding_increment(mut self, rounding_increment: f64) -> AppResult<Self> {
        if !is_valid_rounding_increment(rounding_increment) {
            return Err(AppError::BadRequest(format!(
                "Rounding increment must be a finite number above 0, got {}",
                rounding_increment
            )));
        }
        self.rounding_increment = rounding_increment;
        Ok(self)
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn tolerance_factor(&self) -> f64 {
        self.tolerance_factor
    }

    pub fn rounding_increment(&self) -> f64 {
        self.rounding_increment
    }

    pub fn select_nearest(&self, customer: Coordinate) -> Option<(&Branch, f64)> {
        select_nearest(customer, &self.branches, self.tolerance_factor)
    }

    pub fn quote_fee(&self, branch: &Branch, distance: f64) -> f64 {
        quote_fee(branch, distance, self.rounding_increment)
    }

    /// Full quote for a customer location, `None` when no branch qualifies.
    pub fn quote(&self, customer: Coordinate) -> Option<ShippingQuote> {
        let (branch, distance) = self.select_nearest(customer)?;
        Some(ShippingQuote {
            branch: Some(branch.clone()),
            distance,
            fee: self.quote_fee(branch, distance),
        })
    }
}

/// What happened to the customer's location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Located(Coordinate),
    Cleared,
    Failed(LocationError),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "quote", rename_all = "snake_case")]
pub enum QuoteState {
    #[default]
    NoLocation,
    NoQuote,
    Quoted(ShippingQuote),
}

impl QuoteState {
    pub fn apply(self, calculator: &ShippingCalculator, event: LocationEvent) -> QuoteState {
        let next = match event {
            LocationEvent::Located(coordinate) => match calculator.quote(coordinate) {
                Some(quote) => QuoteState::Quoted(quote),
                None => QuoteState::NoQuote,
            },
            LocationEvent::Cleared => QuoteState::NoLocation,
            LocationEvent::Failed(reason) => {
                tracing::warn!(reason = %reason, "Customer location unavailable");
                QuoteState::NoLocation
            }
        };

        tracing::debug!(from = self.name(), to = next.name(), "Shipping quote updated");
        next
    }

    /// The current quote, or an empty one when nothing is quoted.
    pub fn quote(&self) -> ShippingQuote {
        match self {
            QuoteState::Quoted(quote) => quote.clone(),
            _ => ShippingQuote::none(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuoteState::NoLocation => "no_location",
            QuoteState::NoQuote => "no_quote",
            QuoteState::Quoted(_) => "quoted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::geo::distance;

    fn branch(id: &str, coordinate: Option<Coordinate>) -> Branch {
        Branch {
            id: id.to_string(),
            display_name: format!("Branch {}", id),
            coordinate,
            rate_per_km: 2000.0,
            minimum_fee: 8000.0,
            contact_number: "620000".to_string(),
        }
    }

    #[test]
    fn test_fee_uses_minimum_for_short_distance() {
        let a = branch("a", Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(quote_fee(&a, 2.0, 500.0), 8000.0);
    }

    #[test]
    fn test_fee_scales_with_distance() {
        let b = branch("b", Some(Coordinate::new(0.0, 0.0)));
        assert_eq!(quote_fee(&b, 10.0, 500.0), 20000.0);
    }

    #[test]
    fn test_fee_rounds_up_to_increment() {
        let b = branch("b", Some(Coordinate::new(0.0, 0.0)));
        // 4.3 km * 2000 = 8600 -> 9000
        assert_eq!(quote_fee(&b, 4.3, 500.0), 9000.0);
        assert_eq!(quote_fee(&b, 4.25, 500.0), 8500.0);
    }

    #[test]
    fn test_fee_is_monotonic_floor_bounded_and_rounded() {
        let b = branch("b", Some(Coordinate::new(0.0, 0.0)));
        let mut previous = 0.0;
        for step in 0..400 {
            let d = step as f64 * 0.137;
            let fee = quote_fee(&b, d, 500.0);
            assert!(fee >= previous, "fee decreased at {} km", d);
            assert!(fee >= b.minimum_fee);
            assert_eq!(fee % 500.0, 0.0);
            previous = fee;
        }
    }

    #[test]
    fn test_invalid_increment_still_rounds() {
        let b = branch("b", Some(Coordinate::new(0.0, 0.0)));
        for increment in [0.0, -500.0, f64::NAN] {
            let fee = quote_fee(&b, 9.83, increment);
            assert_eq!(fee, 20000.0);
            assert_eq!(fee % FEE_ROUNDING_INCREMENT, 0.0);
        }
    }

    #[test]
    fn test_calculator_rejects_invalid_settings() {
        for factor in [-1.5, 0.0, 1.0, f64::NAN, f64::INFINITY] {
            assert!(ShippingCalculator::default().with_tolerance_factor(factor).is_err());
        }
        for increment in [-500.0, 0.0, f64::NAN] {
            assert!(ShippingCalculator::default().with_rounding_increment(increment).is_err());
        }

        let calculator = ShippingCalculator::default()
            .with_tolerance_factor(2.0)
            .unwrap()
            .with_rounding_increment(1000.0)
            .unwrap();
        assert_eq!(calculator.tolerance_factor(), 2.0);
        assert_eq!(calculator.rounding_increment(), 1000.0);
    }

    #[test]
    fn test_negative_factor_does_not_pick_farthest() {
        let branches = default_branches();
        let customer = branches[0].coordinate.unwrap();
        let (nearest, d) = select_nearest(customer, &branches, -1.5).unwrap();
        assert_eq!(nearest.id, "medan-kota");
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_select_nearest_empty() {
        assert!(select_nearest(Coordinate::new(0.0, 0.0), &[], ROAD_TOLERANCE_FACTOR).is_none());
    }

    #[test]
    fn test_select_nearest_skips_branches_without_coordinate() {
        let branches = vec![branch("a", None), branch("b", None)];
        assert!(select_nearest(Coordinate::new(0.0, 0.0), &branches, 1.5).is_none());

        let branches = vec![
            branch("a", None),
            branch("b", Some(Coordinate::new(f64::NAN, 0.0))),
            branch("c", Some(Coordinate::new(1.0, 1.0))),
        ];
        let (nearest, _) = select_nearest(Coordinate::new(0.0, 0.0), &branches, 1.5).unwrap();
        assert_eq!(nearest.id, "c");
    }

    #[test]
    fn test_select_nearest_picks_minimum_distance() {
        let customer = Coordinate::new(3.56, 98.68);
        let branches = default_branches();
        let (nearest, d) = select_nearest(customer, &branches, ROAD_TOLERANCE_FACTOR).unwrap();

        let expected = branches
            .iter()
            .map(|b| distance(customer, b.coordinate.unwrap()))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(d, expected);
        assert_eq!(distance(customer, nearest.coordinate.unwrap()), expected);
    }

    #[test]
    fn test_select_nearest_tie_goes_to_first_listed() {
        let customer = Coordinate::new(0.0, 0.0);
        let branches = vec![
            branch("a", Some(Coordinate::new(0.0, 1.0))),
            branch("b", Some(Coordinate::new(0.0, -1.0))),
        ];
        for _ in 0..5 {
            let (nearest, _) = select_nearest(customer, &branches, 1.5).unwrap();
            assert_eq!(nearest.id, "a");
        }

        let reversed: Vec<Branch> = branches.into_iter().rev().collect();
        let (nearest, _) = select_nearest(customer, &reversed, 1.5).unwrap();
        assert_eq!(nearest.id, "b");
    }

    #[test]
    fn test_calculator_quote() {
        let calculator = ShippingCalculator::default();
        let medan_kota = calculator.branches()[0].coordinate.unwrap();

        let quote = calculator.quote(medan_kota).unwrap();
        assert_eq!(quote.branch.as_ref().unwrap().id, "medan-kota");
        assert_eq!(quote.distance, 0.0);
        assert_eq!(quote.fee, 8000.0);
    }

    #[test]
    fn test_state_transitions() {
        let calculator = ShippingCalculator::default();
        let here = Coordinate::new(3.5833, 98.6833);
        let there = Coordinate::new(3.5180, 98.6715);

        let state = QuoteState::default();
        assert_eq!(state, QuoteState::NoLocation);

        let state = state.apply(&calculator, LocationEvent::Located(here));
        let QuoteState::Quoted(first) = &state else {
            panic!("expected a quote, got {:?}", state);
        };
        assert_eq!(first.branch.as_ref().unwrap().id, "medan-kota");

        let state = state.apply(&calculator, LocationEvent::Located(there));
        assert_eq!(state.quote().branch.unwrap().id, "medan-johor");

        let state = state.apply(&calculator, LocationEvent::Cleared);
        assert_eq!(state, QuoteState::NoLocation);
        assert!(!state.quote().is_available());

        let state = state.apply(
            &calculator,
            LocationEvent::Failed(LocationError::PermissionDenied),
        );
        assert_eq!(state, QuoteState::NoLocation);
    }

    #[test]
    fn test_state_without_branches_is_no_quote() {
        let calculator = ShippingCalculator::new(vec![branch("a", None)]);
        let state = QuoteState::NoLocation
            .apply(&calculator, LocationEvent::Located(Coordinate::new(0.0, 0.0)));
        assert_eq!(state, QuoteState::NoQuote);
        assert_eq!(state.quote(), ShippingQuote::none());
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_value(QuoteState::NoQuote).unwrap();
        assert_eq!(json["state"], "no_quote");
    }
}
