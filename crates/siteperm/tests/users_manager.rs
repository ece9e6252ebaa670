//! End-to-end user management scenarios on a SQLite-backed app

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use siteperm::app::{App, AppBuilder};
use siteperm::auth::AuthCtx;
use siteperm::config::Config;
use siteperm::error::Error;
use siteperm::event_bus::{EV_DELETE_USER, EV_REMOVE_SITE_ACCESS, Event};
use siteperm::types::{Access, SiteAccess, SiteId, UsersPreferences};

struct TestApp {
	app: App,
	sites: Vec<SiteId>,
	_tmp: TempDir,
}

/// Three sites and one user, `userLogin`, without any access
async fn setup() -> TestApp {
	let tmp = TempDir::new().expect("Failed to create temp directory");
	let app = AppBuilder::new(Config::default())
		.db_path(tmp.path().join("siteperm.db"))
		.db_max_connections(1)
		.log("warn")
		.build()
		.await
		.expect("Failed to build app");

	let mut sites = Vec::new();
	for name in ["site1.example.org", "site2.example.org", "site3.example.org"] {
		sites.push(app.access.create_site(name).await.expect("Failed to create site"));
	}
	app.service
		.add_user(&AuthCtx::system(), "userLogin", "userlogin@example.org")
		.await
		.expect("Failed to add user");

	TestApp { app, sites, _tmp: tmp }
}

/// Record every event published under `name`
fn capture(app: &App, name: &str) -> Arc<Mutex<Vec<Event>>> {
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = events.clone();
	app.bus
		.subscribe(name, move |event| {
			sink.lock().push(event.clone());
			Ok(())
		})
		.expect("Failed to subscribe");
	events
}

/// One user's preferences as (name, value) pairs, in map order
fn entries<'a>(prefs: &'a UsersPreferences, login: &str) -> Vec<(&'a str, &'a str)> {
	prefs.get(login).map_or_else(Vec::new, |p| p.iter().map(|(k, v)| (&**k, &**v)).collect())
}

// Access removal notifications
//******************************

#[tokio::test]
async fn test_removing_access_triggers_event() {
	let t = setup().await;
	let root = AuthCtx::system();
	let both = [t.sites[0], t.sites[1]];

	t.app.service.set_user_access(&root, "userLogin", Access::View, &both).await.unwrap();
	let events = capture(&t.app, EV_REMOVE_SITE_ACCESS);

	t.app.service.set_user_access(&root, "userLogin", Access::NoAccess, &both).await.unwrap();

	assert_eq!(
		*events.lock(),
		vec![Event::RemoveSiteAccess { login: "userLogin".into(), site_ids: both.to_vec() }]
	);
	let access = t.app.service.get_sites_access_from_user(&root, "userLogin").await.unwrap();
	assert!(access.is_empty());
}

#[tokio::test]
async fn test_removing_access_without_prior_access_triggers_event() {
	let t = setup().await;
	let events = capture(&t.app, EV_REMOVE_SITE_ACCESS);

	t.app
		.service
		.set_user_access(&AuthCtx::system(), "userLogin", Access::NoAccess, &t.sites[..2])
		.await
		.unwrap();

	assert_eq!(
		*events.lock(),
		vec![Event::RemoveSiteAccess { login: "userLogin".into(), site_ids: t.sites[..2].to_vec() }]
	);
}

#[tokio::test]
async fn test_adding_access_triggers_nothing() {
	let t = setup().await;
	let root = AuthCtx::system();
	let events = capture(&t.app, EV_REMOVE_SITE_ACCESS);

	t.app.service.set_user_access(&root, "userLogin", Access::Admin, &t.sites[..2]).await.unwrap();
	// Downgrading is not a removal either
	t.app.service.set_user_access(&root, "userLogin", Access::View, &t.sites[..2]).await.unwrap();

	assert!(events.lock().is_empty());
}

#[tokio::test]
async fn test_event_lists_requested_sites_once() {
	let t = setup().await;
	let root = AuthCtx::system();

	t.app.service.set_user_access(&root, "userLogin", Access::Admin, &t.sites[1..2]).await.unwrap();
	let events = capture(&t.app, EV_REMOVE_SITE_ACCESS);

	let requested = [t.sites[2], t.sites[0], t.sites[2], t.sites[1]];
	t.app.service.set_user_access(&root, "userLogin", Access::NoAccess, &requested).await.unwrap();

	assert_eq!(
		*events.lock(),
		vec![Event::RemoveSiteAccess {
			login: "userLogin".into(),
			site_ids: vec![t.sites[2], t.sites[0], t.sites[1]],
		}]
	);
	let access = t.app.service.get_sites_access_from_user(&root, "userLogin").await.unwrap();
	assert!(access.is_empty());
}

#[tokio::test]
async fn test_listener_error_blocks_removal() {
	let t = setup().await;
	let root = AuthCtx::system();
	t.app.service.set_user_access(&root, "userLogin", Access::Admin, &t.sites[..1]).await.unwrap();

	t.app
		.bus
		.subscribe(EV_REMOVE_SITE_ACCESS, |_| Err(Error::Internal("cleanup failed".into())))
		.unwrap();

	let res = t.app.service.set_user_access(&root, "userLogin", Access::NoAccess, &t.sites[..1]).await;
	assert!(matches!(res, Err(Error::Internal(_))));

	let access = t.app.service.get_sites_access_from_user(&root, "userLogin").await.unwrap();
	assert_eq!(access, vec![SiteAccess { site: t.sites[0], access: Access::Admin }]);
}

// Access matrix
//***************

#[tokio::test]
async fn test_set_user_access_is_idempotent() {
	let t = setup().await;
	let root = AuthCtx::system();

	for _ in 0..2 {
		t.app.service.set_user_access(&root, "userLogin", Access::View, &t.sites[..2]).await.unwrap();
	}

	let access = t.app.service.get_sites_access_from_user(&root, "userLogin").await.unwrap();
	assert_eq!(
		access,
		vec![
			SiteAccess { site: t.sites[0], access: Access::View },
			SiteAccess { site: t.sites[1], access: Access::View },
		]
	);
}

#[tokio::test]
async fn test_set_user_access_rejects_bad_input() {
	let t = setup().await;
	let root = AuthCtx::system();

	let res = t.app.service.set_user_access(&root, "userLogin", Access::View, &[]).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = t.app.service.set_user_access(&root, "userLogin", Access::View, &[SiteId(999)]).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = t.app.service.set_user_access(&root, "ghost", Access::View, &t.sites[..1]).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	assert!("superuser".parse::<Access>().is_err());
}

#[tokio::test]
async fn test_users_access_from_site() {
	let t = setup().await;
	let root = AuthCtx::system();
	t.app.service.add_user(&root, "userLogin2", "userlogin2@example.org").await.unwrap();

	t.app.service.set_user_access(&root, "userLogin2", Access::Admin, &t.sites[..1]).await.unwrap();
	t.app.service.set_user_access(&root, "userLogin", Access::View, &t.sites[..1]).await.unwrap();

	let users = t.app.service.get_users_access_from_site(&root, t.sites[0]).await.unwrap();
	assert_eq!(users, vec![("userLogin".into(), Access::View), ("userLogin2".into(), Access::Admin)]);

	let res = t.app.service.get_users_access_from_site(&root, SiteId(999)).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

// Super users
//*************

#[tokio::test]
async fn test_sites_access_for_super_user() {
	let t = setup().await;
	let root = AuthCtx::system();
	t.app.service.add_user(&root, "userLogin2", "userlogin2@example.org").await.unwrap();

	let access = t.app.service.get_sites_access_from_user(&root, "userLogin2").await.unwrap();
	assert!(access.is_empty());

	t.app.service.set_super_user_access(&root, "userLogin2", true).await.unwrap();

	let access = t.app.service.get_sites_access_from_user(&root, "userLogin2").await.unwrap();
	let json = serde_json::to_value(&access).unwrap();
	assert_eq!(
		json,
		serde_json::json!([
			{ "site": t.sites[0].0, "access": "admin" },
			{ "site": t.sites[1].0, "access": "admin" },
			{ "site": t.sites[2].0, "access": "admin" },
		])
	);
	assert!(t.app.service.has_super_user_access(&root, "userLogin2").await.unwrap());
	assert_eq!(
		t.app.service.get_users_having_super_user_access(&root).await.unwrap(),
		vec!["userLogin2".into()]
	);
}

#[tokio::test]
async fn test_sites_access_for_unknown_user() {
	let t = setup().await;

	let access = t.app.service.get_sites_access_from_user(&AuthCtx::system(), "ghost").await.unwrap();
	assert!(access.is_empty());
}

// Preferences
//*************

#[tokio::test]
async fn test_all_users_preferences_empty() {
	let t = setup().await;
	let root = AuthCtx::system();

	let prefs = t.app.service.get_all_users_preferences(&root, &["preferenceName"]).await.unwrap();
	assert!(prefs.is_empty());

	let prefs =
		t.app.service.get_all_users_preferences(&root, &["preferenceName", "otherOne"]).await.unwrap();
	assert!(prefs.is_empty());
}

#[tokio::test]
async fn test_all_users_preferences_multiple() {
	let t = setup().await;
	let root = AuthCtx::system();
	let svc = &t.app.service;

	svc.add_user(&root, "userLogin2", "userlogin2@example.org").await.unwrap();
	svc.set_user_preference(&root, "userLogin2", "myPreferenceName", "valueForUser2").await.unwrap();
	svc.set_user_preference(&root, "userLogin2", "RandomNOTREQUESTED", "RandomNOTREQUESTED").await.unwrap();

	svc.add_user(&root, "userLogin3", "userlogin3@example.org").await.unwrap();
	svc.set_user_preference(&root, "userLogin3", "myPreferenceName", "valueForUser3").await.unwrap();
	svc.set_user_preference(&root, "userLogin3", "otherPreferenceHere", "otherPreferenceVALUE").await.unwrap();
	svc.set_user_preference(&root, "userLogin3", "RandomNOTREQUESTED", "RandomNOTREQUESTED").await.unwrap();

	let prefs = svc
		.get_all_users_preferences(&root, &["myPreferenceName", "otherPreferenceHere", "randomDoesNotExist"])
		.await
		.unwrap();

	let logins: Vec<&str> = prefs.keys().map(|login| &**login).collect();
	assert_eq!(logins, vec!["userLogin2", "userLogin3"]);
	assert_eq!(entries(&prefs, "userLogin2"), vec![("myPreferenceName", "valueForUser2")]);
	assert_eq!(
		entries(&prefs, "userLogin3"),
		vec![("myPreferenceName", "valueForUser3"), ("otherPreferenceHere", "otherPreferenceVALUE")]
	);
}

#[tokio::test]
async fn test_all_users_preferences_login_with_underscore() {
	let t = setup().await;
	let root = AuthCtx::system();
	let svc = &t.app.service;

	svc.add_user(&root, "user_Login2", "userlogin2@example.org").await.unwrap();
	svc.set_user_preference(&root, "user_Login2", "myPreferenceName", "valueForUser2").await.unwrap();
	svc.set_user_preference(&root, "user_Login2", "RandomNOTREQUESTED", "RandomNOTREQUESTED").await.unwrap();

	let prefs = svc
		.get_all_users_preferences(&root, &["myPreferenceName", "otherPreferenceHere", "randomDoesNotExist"])
		.await
		.unwrap();

	assert_eq!(prefs.len(), 1);
	assert_eq!(entries(&prefs, "user_Login2"), vec![("myPreferenceName", "valueForUser2")]);
}

#[tokio::test]
async fn test_preference_name_with_underscore_rejected() {
	let t = setup().await;
	let root = AuthCtx::system();
	let svc = &t.app.service;
	svc.add_user(&root, "userLogin2", "userlogin2@example.org").await.unwrap();
	svc.add_user(&root, "userLogin2_ohOH", "userlogin2b@example.org").await.unwrap();

	// "userLogin2" + "_" + "ohOH_myPreferenceName" would be the same storage
	// key as "userLogin2_ohOH" + "_" + "myPreferenceName"
	svc.set_user_preference(&root, "userLogin2", "myPreferenceName", "valueForUser2").await.unwrap();
	svc.set_user_preference(&root, "userLogin2_ohOH", "myPreferenceName", "otherUserValue").await.unwrap();
	let before = svc.get_all_users_preferences(&root, &["myPreferenceName", "ohOH"]).await.unwrap();

	let res = svc.set_user_preference(&root, "userLogin2", "ohOH_myPreferenceName", "overwritten").await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let after = svc.get_all_users_preferences(&root, &["myPreferenceName", "ohOH"]).await.unwrap();
	assert_eq!(after, before);
	assert_eq!(
		svc.get_user_preference(&root, "userLogin2", "myPreferenceName").await.unwrap().as_deref(),
		Some("valueForUser2")
	);
	assert_eq!(
		svc.get_user_preference(&root, "userLogin2_ohOH", "myPreferenceName").await.unwrap().as_deref(),
		Some("otherUserValue")
	);
	assert_eq!(svc.get_user_preference(&root, "userLogin2", "ohOH").await.unwrap(), None);
	assert_eq!(svc.get_user_preference(&root, "userLogin2", "ohOH_myPreferenceName").await.unwrap(), None);
}

#[tokio::test]
async fn test_all_users_preferences_is_idempotent() {
	let t = setup().await;
	let root = AuthCtx::system();
	let svc = &t.app.service;
	svc.add_user(&root, "userLogin3", "userlogin3@example.org").await.unwrap();

	let names: Vec<String> = (0..6).map(|i| format!("pref{}", i)).collect();
	// Stored in reverse so storage order differs from request order
	for (i, name) in names.iter().enumerate().rev() {
		svc.set_user_preference(&root, "userLogin3", name, &format!("value{}", i)).await.unwrap();
	}
	svc.set_user_preference(&root, "userLogin", "pref3", "other").await.unwrap();

	let requested: Vec<&str> = names.iter().map(String::as_str).collect();
	let first = svc.get_all_users_preferences(&root, &requested).await.unwrap();
	let second = svc.get_all_users_preferences(&root, &requested).await.unwrap();

	assert_eq!(first, second);
	let keys: Vec<&str> = first["userLogin3"].keys().map(|k| &**k).collect();
	assert_eq!(keys, requested);
	let keys: Vec<&str> = second["userLogin3"].keys().map(|k| &**k).collect();
	assert_eq!(keys, requested);
	assert_eq!(entries(&second, "userLogin"), vec![("pref3", "other")]);
}

#[tokio::test]
async fn test_user_manages_own_preferences() {
	let t = setup().await;
	let me = AuthCtx::new("userLogin", false);

	t.app.service.set_user_preference(&me, "userLogin", "lang", "en").await.unwrap();
	let value = t.app.service.get_user_preference(&me, "userLogin", "lang").await.unwrap();
	assert_eq!(value.as_deref(), Some("en"));
}

// Users and authorization
//*************************

#[tokio::test]
async fn test_add_user_validation() {
	let t = setup().await;
	let root = AuthCtx::system();
	let svc = &t.app.service;

	for (login, email) in [
		("userLogin", "fresh@example.org"),
		("fresh", "userlogin@example.org"),
		("x", "x@example.org"),
		("bad login", "bad@example.org"),
		("fresh", "not-an-email"),
	] {
		let res = svc.add_user(&root, login, email).await;
		assert!(matches!(res, Err(Error::ValidationError(_))), "{} / {} should be rejected", login, email);
	}

	let users = svc.get_users(&root).await.unwrap();
	assert_eq!(users.len(), 1);
	assert_eq!(users[0].email.as_deref(), Some("userlogin@example.org"));
}

#[tokio::test]
async fn test_regular_user_is_denied() {
	let t = setup().await;
	let root = AuthCtx::system();
	let svc = &t.app.service;
	svc.add_user(&root, "userLogin2", "userlogin2@example.org").await.unwrap();
	let me = AuthCtx::new("userLogin", false);

	assert!(matches!(
		svc.set_user_access(&me, "userLogin", Access::Admin, &t.sites[..1]).await,
		Err(Error::PermissionDenied)
	));
	assert!(matches!(svc.set_super_user_access(&me, "userLogin", true).await, Err(Error::PermissionDenied)));
	assert!(matches!(svc.get_user(&me, "userLogin2").await, Err(Error::PermissionDenied)));
	assert!(matches!(
		svc.set_user_preference(&me, "userLogin2", "lang", "en").await,
		Err(Error::PermissionDenied)
	));
	assert!(matches!(svc.delete_user(&me, "userLogin2").await, Err(Error::PermissionDenied)));

	assert_eq!(svc.get_user(&me, "userLogin").await.unwrap().login.as_ref(), "userLogin");
	assert!(!svc.has_super_user_access(&me, "userLogin").await.unwrap());
}

#[tokio::test]
async fn test_delete_user() {
	let t = setup().await;
	let root = AuthCtx::system();
	let svc = &t.app.service;

	svc.set_user_access(&root, "userLogin", Access::View, &t.sites[..1]).await.unwrap();
	svc.set_user_preference(&root, "userLogin", "lang", "en").await.unwrap();
	let removals = capture(&t.app, EV_REMOVE_SITE_ACCESS);
	let deletions = capture(&t.app, EV_DELETE_USER);

	svc.delete_user(&root, "userLogin").await.unwrap();

	assert_eq!(*deletions.lock(), vec![Event::DeleteUser { login: "userLogin".into() }]);
	assert!(removals.lock().is_empty());
	assert!(!svc.user_exists(&root, "userLogin").await.unwrap());
	assert!(matches!(svc.get_user(&root, "userLogin").await, Err(Error::NotFound)));
	assert!(svc.get_users_access_from_site(&root, t.sites[0]).await.unwrap().is_empty());

	// The login and email are free again
	svc.add_user(&root, "userLogin", "userlogin@example.org").await.unwrap();
	assert_eq!(svc.get_user_preference(&root, "userLogin", "lang").await.unwrap(), None);

	let res = svc.delete_user(&root, "userLogin2").await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

// vim: ts=4
