//! Turns a cart into a WhatsApp order message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::captcha::Captcha;
use crate::cart::Cart;
use crate::shipping::ShippingQuote;
use crate::utils::rupiah::format_rupiah;

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Checkout form problems, worded as the alerts the customer sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Mohon isi nama Anda")]
    MissingName,
    #[error("Mohon isi alamat pengiriman")]
    MissingAddress,
    #[error("Keranjang masih kosong")]
    EmptyCart,
    #[error("Captcha salah! Silakan coba lagi.")]
    WrongCaptcha,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub address: String,
}

/// Everything needed to hand the order over to WhatsApp.
#[derive(Debug, Clone, Serialize)]
pub struct OrderHandoff {
    pub reference: Uuid,
    pub ordered_at: DateTime<Utc>,
    pub message: String,
    pub whatsapp_url: String,
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub total: i64,
}

/// Checks run in the order the form shows them: name, address, cart, captcha.
pub fn validate(
    details: &CustomerDetails,
    cart: &Cart,
    captcha: &Captcha,
    captcha_answer: &str,
) -> Result<(), CheckoutError> {
    if details.name.trim().is_empty() {
        return Err(CheckoutError::MissingName);
    }
    if details.address.trim().is_empty() {
        return Err(CheckoutError::MissingAddress);
    }
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if !captcha.verify(captcha_answer) {
        return Err(CheckoutError::WrongCaptcha);
    }
    Ok(())
}

fn shipping_fee(quote: &ShippingQuote) -> i64 {
    if quote.is_available() {
        quote.fee.round() as i64
    } else {
        0
    }
}

pub fn compose_message(details: &CustomerDetails, cart: &Cart, quote: &ShippingQuote) -> String {
    let mut message = format!(
        "*Pesanan Baru dari {}*\n\n*Alamat Pengiriman:*\n{}\n\n*Detail Pesanan:*\n",
        details.name.trim(),
        details.address.trim()
    );

    for (i, item) in cart.items().iter().enumerate() {
        message.push_str(&format!(
            "{}. {}\n   Qty: {} x {} = {}\n\n",
            i + 1,
            item.name,
            item.quantity,
            format_rupiah(item.price),
            format_rupiah(item.line_total())
        ));
    }

    let subtotal = cart.subtotal();
    if let Some(branch) = &quote.branch {
        let fee = shipping_fee(quote);
        message.push_str(&format!(
            "*Pengiriman:*\nCabang: {}\nJarak: {:.1} km\nOngkir: {}\n\nSubtotal: {}\n",
            branch.display_name,
            quote.distance,
            format_rupiah(fee),
            format_rupiah(subtotal)
        ));
        message.push_str(&format!("*Total: {}*\n\n", format_rupiah(subtotal + fee)));
    } else {
        message.push_str(&format!("*Total: {}*\n\n", format_rupiah(subtotal)));
    }

    message.push_str("Terima kasih!");
    message
}

/// Percent-encode like JavaScript's `encodeURIComponent`.
pub fn encode_uri_component(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

pub fn whatsapp_url(number: &str, message: &str) -> String {
    format!("{}/{}?text={}", WHATSAPP_BASE_URL, number, encode_uri_component(message))
}

/// Validate the form and build the hand-off. The quoted branch's number is
/// used when there is one, `fallback_number` otherwise.
pub fn prepare(
    details: &CustomerDetails,
    cart: &Cart,
    quote: &ShippingQuote,
    captcha: &Captcha,
    captcha_answer: &str,
    fallback_number: &str,
) -> Result<OrderHandoff, CheckoutError> {
    validate(details, cart, captcha, captcha_answer)?;

    let message = compose_message(details, cart, quote);
    let number = quote
        .branch
        .as_ref()
        .map(|b| b.contact_number.as_str())
        .unwrap_or(fallback_number);
    let subtotal = cart.subtotal();
    let shipping_fee = shipping_fee(quote);

    Ok(OrderHandoff {
        reference: Uuid::new_v4(),
        ordered_at: Utc::now(),
        whatsapp_url: whatsapp_url(number, &message),
        message,
        subtotal,
        shipping_fee,
        total: subtotal + shipping_fee,
    })
}
