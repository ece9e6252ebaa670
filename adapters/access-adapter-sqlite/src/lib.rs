//! SQLite access adapter for siteperm

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use siteperm::{
	access_adapter::{AccessAdapter, CreateUserData},
	prelude::*,
	site_registry::SiteRegistry,
	types::{Access, Preference, SiteAccess, User},
};

mod access;
mod preference;
mod schema;
mod site;
mod user;
mod utils;

#[derive(Debug)]
pub struct AccessAdapterSqlite {
	db: SqlitePool,
}

impl AccessAdapterSqlite {
	/// Open (or create) the database at `path`
	pub async fn new(path: impl AsRef<Path>, max_connections: u32) -> SpResult<Self> {
		if let Some(dir) = path.as_ref().parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(max_connections.max(1))
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!("Access adapter opened: {}", path.as_ref().display());
		Ok(Self { db })
	}

	/// Register a new site. Sites are owned by the platform, not by the
	/// permission service.
	pub async fn create_site(&self, name: &str) -> SpResult<SiteId> {
		site::create_site(&self.db, name).await
	}
}

#[async_trait]
impl AccessAdapter for AccessAdapterSqlite {
	// Users
	//*******
	async fn create_user(&self, data: CreateUserData<'_>) -> SpResult<()> {
		user::create_user(&self.db, data).await
	}

	async fn read_user(&self, login: &str) -> SpResult<User> {
		user::read_user(&self.db, login).await
	}

	async fn list_users(&self) -> SpResult<Vec<User>> {
		user::list_users(&self.db).await
	}

	async fn read_login_by_email(&self, email: &str) -> SpResult<Option<Box<str>>> {
		user::read_login_by_email(&self.db, email).await
	}

	async fn delete_user(&self, login: &str) -> SpResult<()> {
		user::delete_user(&self.db, login).await
	}

	// Super-user flag
	//*****************
	async fn update_super_user(&self, login: &str, super_user: bool) -> SpResult<()> {
		user::update_super_user(&self.db, login, super_user).await
	}

	async fn list_super_users(&self) -> SpResult<Vec<Box<str>>> {
		user::list_super_users(&self.db).await
	}

	// Access matrix
	//***************
	async fn list_access(&self, login: &str) -> SpResult<Vec<SiteAccess>> {
		access::list_access(&self.db, login).await
	}

	async fn list_site_access(&self, site_id: SiteId) -> SpResult<Vec<(Box<str>, Access)>> {
		access::list_site_access(&self.db, site_id).await
	}

	async fn update_access(
		&self,
		login: &str,
		access: Access,
		site_ids: &[SiteId],
	) -> SpResult<()> {
		access::update_access(&self.db, login, access, site_ids).await
	}

	// Preferences
	//*************
	async fn read_pref(&self, login: &str, name: &str) -> SpResult<Option<Box<str>>> {
		preference::read_pref(&self.db, login, name).await
	}

	async fn update_pref(&self, login: &str, name: &str, value: &str) -> SpResult<()> {
		preference::update_pref(&self.db, login, name, value).await
	}

	async fn list_prefs(&self, names: &[&str]) -> SpResult<Vec<Preference>> {
		preference::list_prefs(&self.db, names).await
	}
}

#[async_trait]
impl SiteRegistry for AccessAdapterSqlite {
	async fn site_exists(&self, site_id: SiteId) -> SpResult<bool> {
		site::site_exists(&self.db, site_id).await
	}

	async fn list_site_ids(&self) -> SpResult<Vec<SiteId>> {
		site::list_site_ids(&self.db).await
	}
}

// vim: ts=4
