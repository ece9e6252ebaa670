//! Notification bus contract
//!
//! The permission service announces state changes through an injected
//! [`EventBus`]. Publishing is synchronous with respect to the publisher:
//! every listener has run when `publish` returns, and an error from any
//! listener is returned to the publisher, which must then abort.

use async_trait::async_trait;
use serde::Serialize;

use crate::prelude::*;

pub const EV_REMOVE_SITE_ACCESS: &str = "UsersManager.removeSiteAccess";
pub const EV_DELETE_USER: &str = "UsersManager.deleteUser";

/// Events published by the permission service
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
	/// Access of `login` to `site_ids` is about to be removed
	RemoveSiteAccess { login: Box<str>, site_ids: Vec<SiteId> },
	/// User `login` is about to be deleted
	DeleteUser { login: Box<str> },
}

impl Event {
	/// Wire name of the event, used for listener registration
	pub fn name(&self) -> &'static str {
		match self {
			Event::RemoveSiteAccess { .. } => EV_REMOVE_SITE_ACCESS,
			Event::DeleteUser { .. } => EV_DELETE_USER,
		}
	}
}

#[async_trait]
pub trait EventBus: Send + Sync {
	/// Delivers `event` to every listener registered for its name
	async fn publish(&self, event: &Event) -> SpResult<()>;
}


// vim: ts=4
