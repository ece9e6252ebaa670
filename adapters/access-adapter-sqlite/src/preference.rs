//! User preference storage
//!
//! Rows are keyed by `login + '_' + name`. The login is also kept in its
//! own column so preferences of deleted users can be purged and joined.

use sqlx::{Row, SqlitePool};

use crate::utils::*;
use siteperm::{
	prelude::*,
	preference::{PREF_DELIMITER, pref_key, split_pref_key},
	types::Preference,
};

pub(crate) async fn read_pref(db: &SqlitePool, login: &str, name: &str) -> SpResult<Option<Box<str>>> {
	sqlx::query_scalar::<_, String>("SELECT value FROM prefs WHERE key = ?1")
		.bind(pref_key(login, name))
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map(|value| value.map(Into::into))
		.or(Err(Error::DbError))
}

pub(crate) async fn update_pref(db: &SqlitePool, login: &str, name: &str, value: &str) -> SpResult<()> {
	sqlx::query(
		"INSERT OR REPLACE INTO prefs (key, login, value, updated_at) VALUES (?1, ?2, ?3, unixepoch())",
	)
	.bind(pref_key(login, name))
	.bind(login)
	.bind(value)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;
	Ok(())
}

/// List preferences named in `names` for every existing user
pub(crate) async fn list_prefs(db: &SqlitePool, names: &[&str]) -> SpResult<Vec<Preference>> {
	if names.is_empty() {
		return Ok(Vec::new());
	}

	// Keys are matched against the row's own login, so a login containing
	// the delimiter is never confused with another user's preference
	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
		"SELECT p.key, p.login, p.value FROM prefs p JOIN users u ON u.login = p.login WHERE p.key IN (",
	);
	let mut separated = query.separated(", ");
	for name in names {
		separated.push(format!("p.login || '{}' || ", PREF_DELIMITER));
		separated.push_bind_unseparated(*name);
	}
	separated.push_unseparated(") ORDER BY p.login");

	let rows = query.build().fetch_all(db).await.inspect_err(inspect).or(Err(Error::DbError))?;

	let mut prefs = Vec::with_capacity(rows.len());
	for row in rows {
		let key: String = row.try_get("key").inspect_err(inspect).or(Err(Error::DbError))?;
		let login: String = row.try_get("login").inspect_err(inspect).or(Err(Error::DbError))?;
		let value: String = row.try_get("value").inspect_err(inspect).or(Err(Error::DbError))?;

		let Some((key_login, name)) = split_pref_key(&key) else {
			warn!("Malformed preference key: {}", key);
			continue;
		};
		if key_login != login {
			warn!("Preference key {} does not belong to {}", key, login);
			continue;
		}
		prefs.push(Preference { login: login.as_str().into(), name: name.into(), value: value.into() });
	}
	Ok(prefs)
}

// vim: ts=4
