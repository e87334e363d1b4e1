//! WhatsApp booking handoff.
//!
//! Booking is a deep link into a WhatsApp chat with a prefilled message; the
//! site never sees a response.

pub const WHATSAPP_BASE_URL: &str = "https://wa.me";
pub const INQUIRY_MESSAGE: &str = "Hello! I would like to inquire about your services.";

/// Prefilled message for renting one product.
#[must_use]
pub fn booking_message(product_name: &str) -> String {
    format!("Hi! I'm interested in renting: {product_name}")
}

/// `https://wa.me/<number>?text=<percent-encoded message>`
#[must_use]
pub fn whatsapp_link(number: &str, message: &str) -> String {
    format!("{WHATSAPP_BASE_URL}/{number}?text={}", urlencoding::encode(message))
}

#[must_use]
pub fn product_booking_link(number: &str, product_name: &str) -> String {
    whatsapp_link(number, &booking_message(product_name))
}

#[must_use]
pub fn inquiry_link(number: &str) -> String {
    whatsapp_link(number, INQUIRY_MESSAGE)
}
