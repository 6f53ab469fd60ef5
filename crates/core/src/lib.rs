//! Forno Core - Pricing, delivery and shared types library.
//!
//! This crate provides the domain logic used across all Forno components:
//! - `storefront` - Customer-facing menu and checkout API
//! - `admin` - Restaurant administration API (orders, menu, settings)
//! - `cli` - Command-line tools for migrations and delivery quotes
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Settings are always passed in explicitly, so every
//! calculation here can be called concurrently from any handler.
//!
//! # Modules
//!
//! - [`geo`] - Great-circle distance and geocoded addresses
//! - [`delivery`] - Distance-tiered delivery fee zones
//! - [`pizza`] - Multi-flavor pizza pricing
//! - [`order`] - Order line items and total assembly
//! - [`settings`] - Restaurant settings with boundary defaults
//! - [`checkout`] - Customer checkout form validation and Pix instructions
//! - [`menu`] - Menu categories and products
//! - [`stats`] - Admin dashboard statistics
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod delivery;
pub mod geo;
pub mod menu;
pub mod order;
pub mod pizza;
pub mod settings;
pub mod stats;
pub mod types;

pub use checkout::{CheckoutForm, PixInstructions};
pub use delivery::{DeliveryQuote, DeliveryZone, FeeQuote, quote_delivery, resolve_fee};
pub use geo::{Coordinates, GeocodedAddress, haversine_distance_km};
pub use order::{Order, OrderItem, OrderTotals, OutOfRangeError, assemble_total};
pub use pizza::{FlavorSelection, PriceMethod, calculate_pizza_price};
pub use settings::{DeliverySettings, GeneralSettings, RestaurantSettings, SettingsError};
pub use stats::DashboardStats;
pub use types::*;
