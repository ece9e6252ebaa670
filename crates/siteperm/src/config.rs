//! Configuration loaded from the environment

use std::path::PathBuf;

use crate::prelude::*;

pub const ENV_DB_PATH: &str = "SITEPERM_DB_PATH";
pub const ENV_DB_MAX_CONNECTIONS: &str = "SITEPERM_DB_MAX_CONNECTIONS";
pub const ENV_LOG: &str = "SITEPERM_LOG";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	/// SQLite database file
	pub db_path: PathBuf,
	pub db_max_connections: u32,
	/// `tracing_subscriber::EnvFilter` directives
	pub log: Box<str>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			db_path: PathBuf::from("./data/siteperm.db"),
			db_max_connections: 5,
			log: "info".into(),
		}
	}
}

impl Config {
	pub fn from_env() -> SpResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Build a config from a variable lookup. Unset or empty variables
	/// keep their defaults.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SpResult<Self> {
		let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let mut config = Self::default();

		if let Some(db_path) = var(ENV_DB_PATH) {
			config.db_path = PathBuf::from(db_path);
		}
		if let Some(max) = var(ENV_DB_MAX_CONNECTIONS) {
			config.db_max_connections = match max.trim().parse::<u32>() {
				Ok(n) if n > 0 => n,
				_ => {
					return Err(Error::validation(format!(
						"{} must be a positive integer, got '{}'",
						ENV_DB_MAX_CONNECTIONS, max
					)));
				}
			};
		}
		if let Some(log) = var(ENV_LOG) {
			config.log = log.into();
		}

		Ok(config)
	}
}


// vim: ts=4
