//! Comanda - restaurant ordering backend.
//!
//! Orders move from the table to the kitchen and back through a guarded
//! lifecycle that deducts recipe stock on confirmation and frees the table
//! when the last order finishes. Every change is pushed to connected staff
//! and guests over WebSocket rooms chosen by role.
//!
//! The crate is laid out hexagonally: `domain` holds the rules, `ports` the
//! traits, `application` the use cases, `adapters` the HTTP, WebSocket and
//! storage implementations. [`app`] wires them together and [`client`] is a
//! reconnecting notification client.

pub mod adapters;
pub mod app;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
