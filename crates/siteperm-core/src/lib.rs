//! Core of the siteperm permission subsystem.
//!
//! The [`PermissionService`] orchestrates the access matrix, the super-user
//! registry and the preference store kept by an
//! [`AccessAdapter`](siteperm_types::access_adapter::AccessAdapter), and
//! announces access removal through an injected
//! [`EventBus`](siteperm_types::event_bus::EventBus).

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod event_bus;
pub mod prelude;
pub mod service;
pub mod validate;

pub use event_bus::{BusConfig, ListenerBus};
pub use service::PermissionService;

// vim: ts=4
