//! Core value types: sites, access levels, users and preferences

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Site identifier, assigned by the site registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Unix timestamp in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Self {
		Self(chrono::Utc::now().timestamp())
	}
}

/// Site-scoped access level
///
/// `NoAccess` is never stored: it is represented by the absence of an
/// access row. Super-user access is not a level either, it is derived
/// from the user's flag at read time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
	#[serde(rename = "noaccess")]
	NoAccess,
	#[serde(rename = "view")]
	View,
	#[serde(rename = "admin")]
	Admin,
}

impl Access {
	pub fn as_str(&self) -> &'static str {
		match self {
			Access::NoAccess => "noaccess",
			Access::View => "view",
			Access::Admin => "admin",
		}
	}

	/// True if this level grants anything at all
	pub fn grants(&self) -> bool {
		!matches!(self, Access::NoAccess)
	}
}

impl fmt::Display for Access {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Access {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"noaccess" => Ok(Access::NoAccess),
			"view" => Ok(Access::View),
			"admin" => Ok(Access::Admin),
			"superuser" => Err(Error::validation(
				"superuser is not a site access level, use setSuperUserAccess instead",
			)),
			_ => Err(Error::validation(format!(
				"invalid access level '{}', expected one of noaccess, view, admin",
				s
			))),
		}
	}
}

/// One (site, access) pair as returned for a user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAccess {
	pub site: SiteId,
	pub access: Access,
}

/// A user account (authentication data is managed elsewhere)
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub login: Box<str>,
	pub email: Option<Box<str>>,
	pub super_user: bool,
	pub created_at: Timestamp,
}

/// A stored preference row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preference {
	pub login: Box<str>,
	pub name: Box<str>,
	pub value: Box<str>,
}

/// Preferences of one user: name -> value, in the order they were requested
pub type UserPreferences = IndexMap<Box<str>, Box<str>>;

/// Preferences of several users: login -> (name -> value), ordered by login
pub type UsersPreferences = BTreeMap<Box<str>, UserPreferences>;


// vim: ts=4
