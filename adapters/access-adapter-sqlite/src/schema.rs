//! Database schema initialization and migrations

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Get the current database version from vars table
async fn get_db_version(tx: &mut Transaction<'_, Sqlite>) -> i64 {
	sqlx::query_scalar::<_, String>("SELECT value FROM vars WHERE key = 'db_version'")
		.fetch_optional(&mut **tx)
		.await
		.ok()
		.flatten()
		.and_then(|v| v.parse().ok())
		.unwrap_or(0)
}

/// Set the database version in vars table
async fn set_db_version(tx: &mut Transaction<'_, Sqlite>, version: i64) -> Result<(), sqlx::Error> {
	sqlx::query("INSERT OR REPLACE INTO vars (key, value) VALUES ('db_version', ?)")
		.bind(version.to_string())
		.execute(&mut **tx)
		.await?;
	Ok(())
}

// Current schema version - update this when adding new migrations
const CURRENT_DB_VERSION: i64 = 1;

/// Initialize the database schema and run migrations
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Create vars table first (needed for version tracking)
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
		key text NOT NULL,
		value text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	let version = get_db_version(&mut tx).await;

	// Schema creation - safe to run every time (uses IF NOT EXISTS)

	// Sites (owned by the site registry, referenced by access rows)
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS sites (
			site_id integer NOT NULL,
			name text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(site_id AUTOINCREMENT)
		)",
	)
	.execute(&mut *tx)
	.await?;

	// Users
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
			login text NOT NULL,
			email text,
			super_user integer NOT NULL DEFAULT 0,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(login)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (email)")
		.execute(&mut *tx)
		.await?;

	// Access matrix - one row per (login, site), noaccess is the absence of a row
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS access (
			login text NOT NULL,
			site_id integer NOT NULL,
			access text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(login, site_id)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_access_site_id ON access (site_id)")
		.execute(&mut *tx)
		.await?;

	// User preferences, keyed by login + '_' + name
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS prefs (
			key text NOT NULL,
			login text NOT NULL,
			value text NOT NULL,
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(key)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_prefs_login ON prefs (login)")
		.execute(&mut *tx)
		.await?;

	// Triggers for automatic updated_at
	sqlx::query(
		"CREATE TRIGGER IF NOT EXISTS users_update_at AFTER UPDATE ON users FOR EACH ROW \
			BEGIN UPDATE users SET updated_at = unixepoch() WHERE login = NEW.login; END",
	)
	.execute(&mut *tx)
	.await?;

	// Migrations
	if version < CURRENT_DB_VERSION {
		set_db_version(&mut tx, CURRENT_DB_VERSION).await?;
	}

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
