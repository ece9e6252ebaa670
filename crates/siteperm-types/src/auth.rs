//! Authentication context of the caller

use crate::prelude::*;

/// Context struct for an authenticated caller
#[derive(Clone, Debug)]
pub struct AuthCtx {
	pub login: Box<str>,
	pub super_user: bool,
}

impl AuthCtx {
	pub fn new(login: impl Into<Box<str>>, super_user: bool) -> Self {
		Self { login: login.into(), super_user }
	}

	/// Context with super-user rights, for internal jobs and bootstrap
	pub fn system() -> Self {
		Self { login: "system".into(), super_user: true }
	}

	pub fn check_super_user(&self) -> SpResult<()> {
		if self.super_user {
			return Ok(());
		}
		warn!(subject = %self.login, "Permission denied - super user access required");
		Err(Error::PermissionDenied)
	}

	/// Allows super users and the user acting on their own login
	pub fn check_super_user_or_self(&self, login: &str) -> SpResult<()> {
		if self.super_user || self.login.as_ref() == login {
			return Ok(());
		}
		warn!(
			subject = %self.login,
			target = %login,
			"Permission denied - super user access or the user itself required"
		);
		Err(Error::PermissionDenied)
	}
}


// vim: ts=4
