//! Access matrix storage

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use siteperm::{
	prelude::*,
	types::{Access, SiteAccess},
};

fn access_from_row(row: &SqliteRow) -> Result<Access, sqlx::Error> {
	let access: String = row.try_get("access")?;
	access.parse().map_err(|err: Error| sqlx::Error::Decode(err.to_string().into()))
}

/// List stored access rows of a user, ordered by site
pub(crate) async fn list_access(db: &SqlitePool, login: &str) -> SpResult<Vec<SiteAccess>> {
	let rows = sqlx::query("SELECT site_id, access FROM access WHERE login = ?1 ORDER BY site_id")
		.bind(login)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	collect_res(rows.iter().map(|row| {
		Ok(SiteAccess { site: SiteId(row.try_get("site_id")?), access: access_from_row(row)? })
	}))
}

/// List stored access rows of a site, ordered by login
pub(crate) async fn list_site_access(
	db: &SqlitePool,
	site_id: SiteId,
) -> SpResult<Vec<(Box<str>, Access)>> {
	let rows = sqlx::query("SELECT login, access FROM access WHERE site_id = ?1 ORDER BY login")
		.bind(site_id.0)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	collect_res(rows.iter().map(|row| Ok((row.try_get("login")?, access_from_row(row)?))))
}

/// Replace (or remove, for `NoAccess`) the access rows of a user
pub(crate) async fn update_access(
	db: &SqlitePool,
	login: &str,
	access: Access,
	site_ids: &[SiteId],
) -> SpResult<()> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	for site_id in site_ids {
		if access.grants() {
			sqlx::query("INSERT OR REPLACE INTO access (login, site_id, access) VALUES (?1, ?2, ?3)")
				.bind(login)
				.bind(site_id.0)
				.bind(access.as_str())
				.execute(&mut *tx)
				.await
				.inspect_err(inspect)
				.or(Err(Error::DbError))?;
		} else {
			sqlx::query("DELETE FROM access WHERE login = ?1 AND site_id = ?2")
				.bind(login)
				.bind(site_id.0)
				.execute(&mut *tx)
				.await
				.inspect_err(inspect)
				.or(Err(Error::DbError))?;
		}
	}

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(())
}

// vim: ts=4
