//! Adapter that stores users, per-site access rows, super-user flags and
//! user preferences.
//!
//! Adapters only persist. Validation of logins, sites, access levels and
//! preference names is the permission service's job.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
	prelude::*,
	types::{Access, Preference, SiteAccess, User},
};

/// Data needed to create a new user
#[derive(Debug)]
pub struct CreateUserData<'a> {
	pub login: &'a str,
	pub email: Option<&'a str>,
	pub super_user: bool,
}

#[async_trait]
pub trait AccessAdapter: Debug + Send + Sync {
	// Users
	//*******

	/// Creates a user. Fails with `ValidationError` if the login or email is taken.
	async fn create_user(&self, data: CreateUserData<'_>) -> SpResult<()>;

	/// Reads a user. Fails with `NotFound` for an unknown login.
	async fn read_user(&self, login: &str) -> SpResult<User>;

	/// Lists all users ordered by login
	async fn list_users(&self) -> SpResult<Vec<User>>;

	/// Finds the login owning an email address
	async fn read_login_by_email(&self, email: &str) -> SpResult<Option<Box<str>>>;

	/// Deletes a user with all of its access rows and preferences
	async fn delete_user(&self, login: &str) -> SpResult<()>;

	// Super-user flag
	//*****************

	/// Sets the super-user flag. Access rows are left untouched.
	async fn update_super_user(&self, login: &str, super_user: bool) -> SpResult<()>;

	/// Lists logins having the super-user flag, ordered by login
	async fn list_super_users(&self) -> SpResult<Vec<Box<str>>>;

	// Access matrix
	//***************

	/// Lists the stored access rows of a user in site order
	async fn list_access(&self, login: &str) -> SpResult<Vec<SiteAccess>>;

	/// Lists the stored access rows of a site ordered by login
	async fn list_site_access(&self, site_id: SiteId) -> SpResult<Vec<(Box<str>, Access)>>;

	/// Replaces the access row of `login` for every site in `site_ids`.
	/// `Access::NoAccess` removes the rows. Applied atomically.
	async fn update_access(&self, login: &str, access: Access, site_ids: &[SiteId])
		-> SpResult<()>;

	// Preferences
	//*************

	async fn read_pref(&self, login: &str, name: &str) -> SpResult<Option<Box<str>>>;

	/// Stores or overwrites a preference
	async fn update_pref(&self, login: &str, name: &str, value: &str) -> SpResult<()>;

	/// Lists every stored preference whose name is in `names`, across all users
	async fn list_prefs(&self, names: &[&str]) -> SpResult<Vec<Preference>>;
}

// vim: ts=4
