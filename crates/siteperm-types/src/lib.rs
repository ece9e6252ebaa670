//! Shared types, adapter traits, and core utilities for the siteperm subsystem.
//!
//! This crate contains the foundational types that are shared between the
//! permission service and all adapter implementations. Keeping them in a
//! separate crate allows adapter crates to compile without the service.

pub mod access_adapter;
pub mod auth;
pub mod error;
pub mod event_bus;
pub mod prelude;
pub mod preference;
pub mod site_registry;
pub mod types;

// vim: ts=4
