//! App builder - wires storage, notification bus and permission service

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::prelude::*;
use siteperm_access_adapter_sqlite::AccessAdapterSqlite;
use siteperm_core::{BusConfig, ListenerBus, PermissionService};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A running siteperm instance
///
/// `bus` is where removal listeners subscribe. `access` doubles as the site
/// registry, so the platform registers its sites through it.
#[derive(Clone, Debug)]
pub struct App {
	pub service: Arc<PermissionService>,
	pub bus: Arc<ListenerBus>,
	pub access: Arc<AccessAdapterSqlite>,
}

#[derive(Debug)]
pub struct AppBuilder {
	config: Config,
	bus_config: BusConfig,
	init_tracing: bool,
}

impl AppBuilder {
	pub fn new(config: Config) -> Self {
		AppBuilder { config, bus_config: BusConfig::default(), init_tracing: true }
	}

	/// Builder initialised from `SITEPERM_*` environment variables
	pub fn from_env() -> SpResult<Self> {
		Ok(Self::new(Config::from_env()?))
	}

	// Opts
	pub fn db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
		self.config.db_path = db_path.into();
		self
	}
	pub fn db_max_connections(mut self, max: u32) -> Self {
		self.config.db_max_connections = max;
		self
	}
	pub fn log(mut self, log: impl Into<Box<str>>) -> Self {
		self.config.log = log.into();
		self
	}
	pub fn bus_config(mut self, bus_config: BusConfig) -> Self {
		self.bus_config = bus_config;
		self
	}
	/// Leave the global tracing subscriber alone, e.g. when the host
	/// application installs its own
	pub fn init_tracing(mut self, init: bool) -> Self {
		self.init_tracing = init;
		self
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub async fn build(self) -> SpResult<App> {
		if self.init_tracing {
			init_tracing(&self.config.log);
		}
		info!("siteperm V{}", VERSION);

		let access =
			Arc::new(AccessAdapterSqlite::new(&self.config.db_path, self.config.db_max_connections).await?);
		let bus = Arc::new(ListenerBus::with_config(self.bus_config));
		let service = Arc::new(PermissionService::new(access.clone(), access.clone(), bus.clone()));

		info!(
			db_path = %self.config.db_path.display(),
			max_connections = self.config.db_max_connections,
			"siteperm ready"
		);
		Ok(App { service, bus, access })
	}
}

/// Install the global fmt subscriber. A subscriber that is already set
/// (another app in the same process, a test harness) is kept.
fn init_tracing(directives: &str) {
	let filter = tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|err| {
		eprintln!("Invalid log filter '{}': {}, falling back to 'info'", directives, err);
		tracing_subscriber::EnvFilter::new("info")
	});
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

// vim: ts=4
