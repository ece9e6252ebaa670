//! Permission service
//!
//! Orchestrates the access matrix, the super-user registry and the
//! preference store, and publishes removal notifications before an access
//! change is committed.
//!
//! # Read path
//!
//! Super-user access is never written into the access matrix. It is
//! derived when reading: a super user has `admin` access to every site the
//! site registry knows, whatever the stored rows say.
//!
//! # Write path for `set_user_access`
//!
//! 1. validate login, sites and level
//! 2. on a `noaccess` request, publish `UsersManager.removeSiteAccess` with
//!    the requested sites, aborting on listener error
//! 3. commit the matrix change

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use siteperm_types::{
	access_adapter::{AccessAdapter, CreateUserData},
	auth::AuthCtx,
	event_bus::{Event, EventBus},
	site_registry::SiteRegistry,
	types::{Access, SiteAccess, User, UserPreferences, UsersPreferences},
};

use crate::prelude::*;
use crate::validate::{validate_email, validate_login, validate_pref_name};

/// Permission service - main interface for managing user access and preferences
pub struct PermissionService {
	adapter: Arc<dyn AccessAdapter>,
	sites: Arc<dyn SiteRegistry>,
	bus: Arc<dyn EventBus>,
}

impl std::fmt::Debug for PermissionService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermissionService").field("adapter", &self.adapter).finish()
	}
}

impl PermissionService {
	pub fn new(
		adapter: Arc<dyn AccessAdapter>,
		sites: Arc<dyn SiteRegistry>,
		bus: Arc<dyn EventBus>,
	) -> Self {
		Self { adapter, sites, bus }
	}

	/// Read a user for a mutation: an unknown login is a caller error
	async fn require_user(&self, login: &str) -> SpResult<User> {
		match self.adapter.read_user(login).await {
			Err(Error::NotFound) => {
				Err(Error::validation(format!("user '{}' does not exist", login)))
			}
			res => res,
		}
	}

	/// Validate a site list, collapsing duplicates in first-seen order
	async fn require_sites(&self, site_ids: &[SiteId]) -> SpResult<Vec<SiteId>> {
		if site_ids.is_empty() {
			return Err(Error::validation("at least one site id is required"));
		}

		let mut seen = HashSet::with_capacity(site_ids.len());
		let mut sites = Vec::with_capacity(site_ids.len());
		for &site_id in site_ids {
			if !seen.insert(site_id) {
				continue;
			}
			if !self.sites.site_exists(site_id).await? {
				return Err(Error::validation(format!("site {} does not exist", site_id)));
			}
			sites.push(site_id);
		}
		Ok(sites)
	}

	// Users
	//*******

	pub async fn add_user(&self, auth: &AuthCtx, login: &str, email: &str) -> SpResult<()> {
		auth.check_super_user()?;
		validate_login(login)?;
		validate_email(email)?;

		if self.user_exists(auth, login).await? {
			return Err(Error::validation(format!("login '{}' already exists", login)));
		}
		if self.adapter.read_login_by_email(email).await?.is_some() {
			return Err(Error::validation(format!("email '{}' is already in use", email)));
		}

		self.adapter
			.create_user(CreateUserData { login, email: Some(email), super_user: false })
			.await?;

		info!(login = %login, by = %auth.login, "User created");
		Ok(())
	}

	pub async fn user_exists(&self, auth: &AuthCtx, login: &str) -> SpResult<bool> {
		auth.check_super_user()?;
		match self.adapter.read_user(login).await {
			Ok(_) => Ok(true),
			Err(Error::NotFound) => Ok(false),
			Err(err) => Err(err),
		}
	}

	pub async fn get_user(&self, auth: &AuthCtx, login: &str) -> SpResult<User> {
		auth.check_super_user_or_self(login)?;
		self.adapter.read_user(login).await
	}

	pub async fn get_users(&self, auth: &AuthCtx) -> SpResult<Vec<User>> {
		auth.check_super_user()?;
		self.adapter.list_users().await
	}

	/// Delete a user with its access rows and preferences
	///
	/// `UsersManager.deleteUser` is published before anything is removed.
	pub async fn delete_user(&self, auth: &AuthCtx, login: &str) -> SpResult<()> {
		auth.check_super_user()?;
		self.require_user(login).await?;

		self.bus.publish(&Event::DeleteUser { login: login.into() }).await?;
		self.adapter.delete_user(login).await?;

		info!(login = %login, by = %auth.login, "User deleted");
		Ok(())
	}

	// Access matrix
	//***************

	/// Set the access level of a user for a list of sites
	///
	/// A `noaccess` request publishes `UsersManager.removeSiteAccess` exactly
	/// once with the validated site list, before the change is committed,
	/// whether or not rows exist for those sites. Granting `view` or `admin`
	/// never publishes. A listener error aborts the call with nothing
	/// committed.
	pub async fn set_user_access(
		&self,
		auth: &AuthCtx,
		login: &str,
		access: Access,
		site_ids: &[SiteId],
	) -> SpResult<()> {
		auth.check_super_user()?;
		self.require_user(login).await?;
		let site_ids = self.require_sites(site_ids).await?;

		if access == Access::NoAccess {
			debug!(login = %login, sites = ?site_ids, "Site access removal pending");
			self.bus
				.publish(&Event::RemoveSiteAccess { login: login.into(), site_ids: site_ids.clone() })
				.await?;
		}

		self.adapter.update_access(login, access, &site_ids).await?;

		info!(login = %login, access = %access, sites = ?site_ids, by = %auth.login, "User access updated");
		Ok(())
	}

	/// Effective site access of a user
	///
	/// Super users get `admin` on every known site. Others get their stored
	/// rows in site order. Unknown logins get an empty list.
	pub async fn get_sites_access_from_user(
		&self,
		auth: &AuthCtx,
		login: &str,
	) -> SpResult<Vec<SiteAccess>> {
		auth.check_super_user()?;
		let user = match self.adapter.read_user(login).await {
			Ok(user) => user,
			Err(Error::NotFound) => return Ok(Vec::new()),
			Err(err) => return Err(err),
		};

		if user.super_user {
			let sites = self.sites.list_site_ids().await?;
			return Ok(sites
				.into_iter()
				.map(|site| SiteAccess { site, access: Access::Admin })
				.collect());
		}

		self.adapter.list_access(login).await
	}

	/// Stored access rows of a site. Super users are not expanded here.
	pub async fn get_users_access_from_site(
		&self,
		auth: &AuthCtx,
		site_id: SiteId,
	) -> SpResult<Vec<(Box<str>, Access)>> {
		auth.check_super_user()?;
		if !self.sites.site_exists(site_id).await? {
			return Err(Error::validation(format!("site {} does not exist", site_id)));
		}
		self.adapter.list_site_access(site_id).await
	}

	// Super users
	//*************

	/// Set or clear the super-user flag. Stored access rows are kept.
	pub async fn set_super_user_access(
		&self,
		auth: &AuthCtx,
		login: &str,
		super_user: bool,
	) -> SpResult<()> {
		auth.check_super_user()?;
		self.require_user(login).await?;

		self.adapter.update_super_user(login, super_user).await?;

		info!(login = %login, super_user, by = %auth.login, "Super user access updated");
		Ok(())
	}

	pub async fn has_super_user_access(&self, auth: &AuthCtx, login: &str) -> SpResult<bool> {
		auth.check_super_user_or_self(login)?;
		match self.adapter.read_user(login).await {
			Ok(user) => Ok(user.super_user),
			Err(Error::NotFound) => Ok(false),
			Err(err) => Err(err),
		}
	}

	pub async fn get_users_having_super_user_access(
		&self,
		auth: &AuthCtx,
	) -> SpResult<Vec<Box<str>>> {
		auth.check_super_user()?;
		self.adapter.list_super_users().await
	}

	// Preferences
	//*************

	pub async fn set_user_preference(
		&self,
		auth: &AuthCtx,
		login: &str,
		name: &str,
		value: &str,
	) -> SpResult<()> {
		auth.check_super_user_or_self(login)?;
		validate_pref_name(name)?;
		self.require_user(login).await?;

		self.adapter.update_pref(login, name, value).await?;

		debug!(login = %login, name = %name, "User preference stored");
		Ok(())
	}

	pub async fn get_user_preference(
		&self,
		auth: &AuthCtx,
		login: &str,
		name: &str,
	) -> SpResult<Option<Box<str>>> {
		auth.check_super_user_or_self(login)?;
		// A name with the delimiter can never have been stored
		if validate_pref_name(name).is_err() {
			return Ok(None);
		}
		self.adapter.read_pref(login, name).await
	}

	/// Preferences of all users, restricted to `names`
	///
	/// Users are ordered by login and each user's preferences follow the
	/// order of `names`. Users without any of the requested preferences are
	/// left out of the result entirely.
	pub async fn get_all_users_preferences(
		&self,
		auth: &AuthCtx,
		names: &[&str],
	) -> SpResult<UsersPreferences> {
		auth.check_super_user()?;

		// A name with the delimiter can never have been stored
		let names: Vec<&str> =
			names.iter().copied().filter(|name| validate_pref_name(name).is_ok()).collect();
		if names.is_empty() {
			return Ok(UsersPreferences::new());
		}

		let mut stored: BTreeMap<Box<str>, HashMap<Box<str>, Box<str>>> = BTreeMap::new();
		for pref in self.adapter.list_prefs(&names).await? {
			stored.entry(pref.login).or_default().insert(pref.name, pref.value);
		}

		// Each user's map follows the order of the requested names
		let mut result = UsersPreferences::new();
		for (login, mut values) in stored {
			let mut prefs = UserPreferences::default();
			for name in &names {
				if let Some((name, value)) = values.remove_entry(*name) {
					prefs.insert(name, value);
				}
			}
			if !prefs.is_empty() {
				result.insert(login, prefs);
			}
		}
		Ok(result)
	}
}

// vim: ts=4
