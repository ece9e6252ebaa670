//! Preference storage key scheme
//!
//! Preferences are stored under a single key built from the login and the
//! preference name joined by [`PREF_DELIMITER`]. Logins may contain the
//! delimiter, names may not, so a key is always split on its last
//! delimiter.

/// Separator between login and preference name in storage keys
pub const PREF_DELIMITER: char = '_';

/// Build the storage key for a user preference
pub fn pref_key(login: &str, name: &str) -> String {
	format!("{}{}{}", login, PREF_DELIMITER, name)
}

/// Split a storage key into (login, name)
///
/// Returns `None` if the key has no delimiter or either side is empty.
pub fn split_pref_key(key: &str) -> Option<(&str, &str)> {
	let (login, name) = key.rsplit_once(PREF_DELIMITER)?;
	if login.is_empty() || name.is_empty() {
		return None;
	}
	Some((login, name))
}


// vim: ts=4
