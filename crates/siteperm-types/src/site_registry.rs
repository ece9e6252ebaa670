//! Site registry contract
//!
//! Sites are created and owned outside of the permission subsystem. The
//! service only needs to check that an id exists and to enumerate all ids
//! when expanding super-user access.

use async_trait::async_trait;

use crate::prelude::*;

#[async_trait]
pub trait SiteRegistry: Send + Sync {
	async fn site_exists(&self, site_id: SiteId) -> SpResult<bool>;

	/// All site ids in creation order
	async fn list_site_ids(&self) -> SpResult<Vec<SiteId>>;
}

// vim: ts=4
