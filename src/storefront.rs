use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::captcha::Captcha;
use crate::cart::Cart;
use crate::checkout::{self, CheckoutError, CustomerDetails, OrderHandoff};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::location::{locate_with_timeout, LocationProvider};
use crate::menu::{self, MenuItem};
use crate::shipping::{LocationEvent, QuoteState, ShippingCalculator, ShippingQuote};
use crate::storage::{FileStore, KeyValueStore};

/// One customer's shopping session: cart, captcha and current shipping quote.
pub struct Storefront<S: KeyValueStore> {
    store: S,
    cart: Cart,
    captcha: Captcha,
    quote_state: QuoteState,
    calculator: ShippingCalculator,
    menu: Vec<MenuItem>,
    whatsapp_number: String,
    location_timeout: Duration,
    rng: StdRng,
}

impl Storefront<FileStore> {
    /// Session backed by the storage file named in `config`.
    pub fn open_local(calculator: ShippingCalculator, config: &Config) -> AppResult<Self> {
        let store = FileStore::open(&config.storage_path)?;
        Ok(Self::open(store, calculator, config))
    }
}

impl<S: KeyValueStore> Storefront<S> {
    /// Restore the saved cart from `store` and start with a fresh captcha.
    pub fn open(store: S, calculator: ShippingCalculator, config: &Config) -> Self {
        let cart = Cart::load(&store);
        let mut rng = StdRng::from_entropy();
        let captcha = Captcha::generate(&mut rng);

        tracing::debug!(items = cart.total_items(), "Storefront session opened");

        Self {
            store,
            cart,
            captcha,
            quote_state: QuoteState::default(),
            calculator,
            menu: menu::default_menu(),
            whatsapp_number: config.whatsapp_number.clone(),
            location_timeout: config.location_timeout(),
            rng,
        }
    }

    pub fn with_menu(mut self, menu: Vec<MenuItem>) -> Self {
        self.menu = menu;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self.captcha = Captcha::generate(&mut self.rng);
        self
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn captcha_question(&self) -> &str {
        self.captcha.question()
    }

    pub fn quote_state(&self) -> &QuoteState {
        &self.quote_state
    }

    pub fn quote(&self) -> ShippingQuote {
        self.quote_state.quote()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn add_to_cart(&mut self, menu_item_id: &str, quantity: u32) -> AppResult<()> {
        let item = menu::find(&self.menu, menu_item_id)
            .ok_or_else(|| AppError::NotFound(format!("Menu item {} not found", menu_item_id)))?;
        self.cart.add(&item.name, item.price, quantity)?;
        self.cart.save(&mut self.store)
    }

    pub fn update_cart_quantity(&mut self, index: usize, delta: i32) -> AppResult<()> {
        self.cart.update_quantity(index, delta)?;
        self.cart.save(&mut self.store)
    }

    pub fn remove_from_cart(&mut self, index: usize) -> AppResult<()> {
        self.cart.remove(index)?;
        self.cart.save(&mut self.store)
    }

    pub fn on_location(&mut self, event: LocationEvent) -> &QuoteState {
        let previous = std::mem::take(&mut self.quote_state);
        self.quote_state = previous.apply(&self.calculator, event);
        &self.quote_state
    }

    /// Ask `provider` for the customer's position and requote.
    pub async fn refresh_location<P>(&mut self, provider: &P) -> &QuoteState
    where
        P: LocationProvider + Sync,
    {
        let event = match locate_with_timeout(provider, self.location_timeout).await {
            Ok(coordinate) => LocationEvent::Located(coordinate),
            Err(reason) => LocationEvent::Failed(reason),
        };
        self.on_location(event)
    }

    /// Validate the form and produce the WhatsApp hand-off.
    ///
    /// A wrong captcha answer replaces the challenge. On success the cart is
    /// emptied and a new challenge is generated. Failing to persist the empty
    /// cart is logged and does not fail the checkout.
    pub fn checkout(&mut self, details: &CustomerDetails, captcha_answer: &str) -> AppResult<OrderHandoff> {
        let quote = self.quote();
        let handoff = match checkout::prepare(
            details,
            &self.cart,
            &quote,
            &self.captcha,
            captcha_answer,
            &self.whatsapp_number,
        ) {
            Ok(handoff) => handoff,
            Err(CheckoutError::WrongCaptcha) => {
                self.captcha = Captcha::generate(&mut self.rng);
                return Err(CheckoutError::WrongCaptcha.into());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            reference = %handoff.reference,
            items = self.cart.total_items(),
            total = handoff.total,
            "Order handed off to WhatsApp"
        );

        // The order is already handed off, so a failed save must not lose it
        if let Err(e) = Cart::new().save(&mut self.store) {
            tracing::warn!(
                reference = %handoff.reference,
                error = %e,
                "Failed to clear saved cart after checkout"
            );
        }
        self.cart.clear();
        self.captcha = Captcha::generate(&mut self.rng);

        Ok(handoff)
    }
}
