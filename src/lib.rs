pub mod captcha;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod handlers;
pub mod location;
pub mod menu;
pub mod middleware;
pub mod routes;
pub mod shipping;
pub mod storage;
pub mod storefront;
pub mod utils;

use std::sync::Arc;

use menu::MenuItem;
use shipping::ShippingCalculator;

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub calculator: Arc<ShippingCalculator>,
    pub menu: Arc<Vec<MenuItem>>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let calculator = ShippingCalculator::default()
            .with_tolerance_factor(config.road_tolerance_factor)?
            .with_rounding_increment(config.fee_rounding_increment)?;

        Ok(Self {
            config,
            calculator: Arc::new(calculator),
            menu: Arc::new(menu::default_menu()),
        })
    }
}
