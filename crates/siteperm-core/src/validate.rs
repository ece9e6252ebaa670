//! Input validation rules applied at the service boundary

use regex::Regex;
use std::sync::LazyLock;

use siteperm_types::preference::PREF_DELIMITER;

use crate::prelude::*;

pub const LOGIN_MIN_LENGTH: usize = 2;
pub const LOGIN_MAX_LENGTH: usize = 100;

static LOGIN_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.@\-]+$").ok());

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
		.ok()
});

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> SpResult<bool> {
	re.as_ref()
		.map(|re| re.is_match(value))
		.ok_or_else(|| Error::Internal("invalid validation pattern".into()))
}

pub fn validate_login(login: &str) -> SpResult<()> {
	let len = login.chars().count();
	if !(LOGIN_MIN_LENGTH..=LOGIN_MAX_LENGTH).contains(&len) {
		return Err(Error::validation(format!(
			"login must be between {} and {} characters long",
			LOGIN_MIN_LENGTH, LOGIN_MAX_LENGTH
		)));
	}
	if !matches(&LOGIN_RE, login)? {
		return Err(Error::validation(format!(
			"login '{}' may only contain letters, digits and the characters _ . @ -",
			login
		)));
	}
	Ok(())
}

pub fn validate_email(email: &str) -> SpResult<()> {
	if !matches(&EMAIL_RE, email)? {
		return Err(Error::validation(format!("invalid email address '{}'", email)));
	}
	Ok(())
}

/// Preference names must not contain the storage key delimiter
pub fn validate_pref_name(name: &str) -> SpResult<()> {
	if name.is_empty() {
		return Err(Error::validation("preference name must not be empty"));
	}
	if name.contains(PREF_DELIMITER) {
		return Err(Error::validation(format!(
			"preference name '{}' must not contain '{}'",
			name, PREF_DELIMITER
		)));
	}
	Ok(())
}


// vim: ts=4
