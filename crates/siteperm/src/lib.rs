//! siteperm keeps track of which user may do what on which site.
//!
//! # Features
//!
//! - Per-site access matrix with `noaccess`, `view` and `admin` levels
//! - Super-user flag that implies `admin` on every site
//! - Removal notifications published before access is revoked, with
//!   listener veto
//! - Per-user key/value preferences
//! - SQLite storage
//!
//! ```no_run
//! # async fn run() -> siteperm::error::SpResult<()> {
//! use siteperm::{app::AppBuilder, auth::AuthCtx, types::Access};
//!
//! let app = AppBuilder::from_env()?.build().await?;
//! let site = app.access.create_site("example.org").await?;
//!
//! let root = AuthCtx::system();
//! app.service.add_user(&root, "alice", "alice@example.org").await?;
//! app.service.set_user_access(&root, "alice", Access::View, &[site]).await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from siteperm-types
pub use siteperm_types::access_adapter;
pub use siteperm_types::auth;
pub use siteperm_types::error;
pub use siteperm_types::event_bus;
pub use siteperm_types::preference;
pub use siteperm_types::site_registry;
pub use siteperm_types::types;

pub use siteperm_access_adapter_sqlite::AccessAdapterSqlite;
pub use siteperm_core::event_bus::{BusStats, Listener, ListenerId};
pub use siteperm_core::{BusConfig, ListenerBus, PermissionService};

// Local modules
pub mod app;
pub mod config;
pub mod prelude;

// vim: ts=4
