//! Forno Storefront library.
//!
//! The customer-facing ordering API as a library, so the router can be built
//! and tested without starting the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod geocoding;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
