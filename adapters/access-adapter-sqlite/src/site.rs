//! Site registry backed by the `sites` table
//!
//! Sites are created by the surrounding platform. The adapter exposes
//! `create_site` for that and implements the read side of
//! [`SiteRegistry`](siteperm::site_registry::SiteRegistry).

use sqlx::SqlitePool;

use crate::utils::*;
use siteperm::prelude::*;

pub(crate) async fn create_site(db: &SqlitePool, name: &str) -> SpResult<SiteId> {
	let res = sqlx::query("INSERT INTO sites (name) VALUES (?1) RETURNING site_id")
		.bind(name)
		.fetch_one(db)
		.await;

	let site_id = map_res(res, |row| sqlx::Row::try_get(row, "site_id").map(SiteId))?;
	info!("Site created: {} ({})", site_id, name);
	Ok(site_id)
}

pub(crate) async fn site_exists(db: &SqlitePool, site_id: SiteId) -> SpResult<bool> {
	let row = sqlx::query_scalar::<_, u32>("SELECT site_id FROM sites WHERE site_id = ?1")
		.bind(site_id.0)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(row.is_some())
}

/// All site ids in creation order
pub(crate) async fn list_site_ids(db: &SqlitePool) -> SpResult<Vec<SiteId>> {
	let ids = sqlx::query_scalar::<_, u32>("SELECT site_id FROM sites ORDER BY site_id")
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(ids.into_iter().map(SiteId).collect())
}

// vim: ts=4
