//! Forno Admin library.
//!
//! This crate provides the restaurant back office as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! This crate can change orders, prices and payment details and has no
//! login of its own. Only expose it on a private network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod realtime;
pub mod routes;
pub mod state;
