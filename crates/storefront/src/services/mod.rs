//! Business services for the storefront.
//!
//! Services sit between route handlers and the pure `forno-core` functions:
//! they take data already loaded from the database and turn requests into
//! priced, validated results. No I/O happens here.

pub mod checkout;

pub use checkout::{CartLine, CheckoutError, PricedCheckout};
